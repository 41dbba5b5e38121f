/// Published content store
///
/// Holds the published Job and Internship listings. Rows only ever come
/// into existence through the moderation engine's approval transition,
/// which inserts them inside its own transaction; the store therefore
/// exposes executor-generic insert helpers alongside the usual
/// pool-backed reads.
use crate::error::{PortalError, PortalResult};
use crate::moderation::draft::{InternshipDraft, JobDraft};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

/// Published job listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub title: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub employment_type: Option<String>,
    pub work_model: Option<String>,
    pub experience: Option<String>,
    pub salary: Option<f64>,
    pub skills: Option<String>,
    pub company: String,
    pub job_description: Option<String>,
    /// Content-level lifecycle (open/closed for applications);
    /// independent of moderation
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub opening_start_date: Option<NaiveDate>,
    pub last_apply_date: Option<NaiveDate>,
    pub number_of_openings: Option<i32>,
    pub perks: Option<String>,
    pub company_description: Option<String>,
    /// Owning admin, set at approval time
    pub admin_id: i64,
}

/// Published internship listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Internship {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub duration: Option<String>,
    pub stipend: Option<String>,
    pub qualifications: String,
    pub skills: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub opening_start_date: Option<NaiveDate>,
    pub last_apply_date: Option<NaiveDate>,
    pub number_of_openings: Option<i32>,
    pub perks: Option<String>,
    pub company_description: Option<String>,
    pub admin_id: i64,
}

/// Content store manager
#[derive(Clone)]
pub struct ContentStore {
    db: SqlitePool,
}

impl ContentStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a job from an approved draft. Takes any executor so the
    /// moderation engine can run it inside the decision transaction.
    pub async fn insert_job_with<'e, E>(
        executor: E,
        draft: &JobDraft,
        admin_id: i64,
    ) -> PortalResult<i64>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO job
            (title, location, category, employment_type, work_model, experience, salary, skills,
             company, job_description, status, created_at, updated_at, opening_start_date,
             last_apply_date, number_of_openings, perks, company_description, admin_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.location)
        .bind(&draft.category)
        .bind(&draft.employment_type)
        .bind(&draft.work_model)
        .bind(&draft.experience)
        .bind(draft.salary)
        .bind(&draft.skills)
        .bind(&draft.company)
        .bind(&draft.job_description)
        .bind(&draft.status)
        .bind(&now)
        .bind(&now)
        .bind(draft.opening_start_date.map(|d| d.to_string()))
        .bind(draft.last_apply_date.map(|d| d.to_string()))
        .bind(draft.number_of_openings)
        .bind(&draft.perks)
        .bind(&draft.company_description)
        .bind(admin_id)
        .execute(executor)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Insert an internship from an approved draft
    pub async fn insert_internship_with<'e, E>(
        executor: E,
        draft: &InternshipDraft,
        admin_id: i64,
    ) -> PortalResult<i64>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO internship
            (title, company, location, duration, stipend, qualifications, skills, description,
             status, created_at, updated_at, opening_start_date, last_apply_date,
             number_of_openings, perks, company_description, admin_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.company)
        .bind(&draft.location)
        .bind(&draft.duration)
        .bind(&draft.stipend)
        .bind(&draft.qualifications)
        .bind(&draft.skills)
        .bind(&draft.description)
        .bind(&draft.status)
        .bind(&now)
        .bind(&now)
        .bind(draft.opening_start_date.map(|d| d.to_string()))
        .bind(draft.last_apply_date.map(|d| d.to_string()))
        .bind(draft.number_of_openings)
        .bind(&draft.perks)
        .bind(&draft.company_description)
        .bind(admin_id)
        .execute(executor)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get a published job by id
    pub async fn get_job(&self, id: i64) -> PortalResult<Option<Job>> {
        let row = sqlx::query("SELECT * FROM job WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.map(parse_job).transpose()
    }

    /// Get a published internship by id
    pub async fn get_internship(&self, id: i64) -> PortalResult<Option<Internship>> {
        let row = sqlx::query("SELECT * FROM internship WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.map(parse_internship).transpose()
    }

    /// List published jobs, newest first
    pub async fn list_jobs(&self) -> PortalResult<Vec<Job>> {
        let rows = sqlx::query("SELECT * FROM job ORDER BY id DESC")
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(parse_job).collect()
    }

    /// List published internships, newest first
    pub async fn list_internships(&self) -> PortalResult<Vec<Internship>> {
        let rows = sqlx::query("SELECT * FROM internship ORDER BY id DESC")
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(parse_internship).collect()
    }

    /// Update the content-level status of a job; only the owning admin
    /// may do this
    pub async fn update_job_status(
        &self,
        id: i64,
        admin_id: i64,
        status: &str,
    ) -> PortalResult<Job> {
        let job = self.get_job(id).await?.ok_or(PortalError::JobNotFound(id))?;

        if job.admin_id != admin_id {
            return Err(PortalError::Authorization(
                "Only the posting admin can change this job".to_string(),
            ));
        }

        let now = Utc::now();
        sqlx::query("UPDATE job SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(now.to_rfc3339())
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(Job {
            status: status.to_string(),
            updated_at: now,
            ..job
        })
    }

    /// Update the content-level status of an internship; owner only
    pub async fn update_internship_status(
        &self,
        id: i64,
        admin_id: i64,
        status: &str,
    ) -> PortalResult<Internship> {
        let internship = self
            .get_internship(id)
            .await?
            .ok_or(PortalError::InternshipNotFound(id))?;

        if internship.admin_id != admin_id {
            return Err(PortalError::Authorization(
                "Only the posting admin can change this internship".to_string(),
            ));
        }

        let now = Utc::now();
        sqlx::query("UPDATE internship SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(now.to_rfc3339())
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(Internship {
            status: status.to_string(),
            updated_at: now,
            ..internship
        })
    }

    /// Delete a published job; only the owning admin may do this
    pub async fn delete_job(&self, id: i64, admin_id: i64) -> PortalResult<()> {
        let job = self.get_job(id).await?.ok_or(PortalError::JobNotFound(id))?;

        if job.admin_id != admin_id {
            return Err(PortalError::Authorization(
                "Admin not authorized to delete this job post".to_string(),
            ));
        }

        sqlx::query("DELETE FROM job WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        tracing::info!("Deleted job post: {}", id);
        Ok(())
    }

    /// Delete a published internship; only the owning admin may do this
    pub async fn delete_internship(&self, id: i64, admin_id: i64) -> PortalResult<()> {
        let internship = self
            .get_internship(id)
            .await?
            .ok_or(PortalError::InternshipNotFound(id))?;

        if internship.admin_id != admin_id {
            return Err(PortalError::Authorization(
                "Admin not authorized to delete this internship post".to_string(),
            ));
        }

        sqlx::query("DELETE FROM internship WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        tracing::info!("Deleted internship post: {}", id);
        Ok(())
    }
}

fn parse_timestamp(row: &sqlx::sqlite::SqliteRow, column: &str) -> PortalResult<DateTime<Utc>> {
    let raw: String = row.get(column);
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PortalError::Internal(format!("Invalid timestamp: {}", e)))
}

fn parse_date(row: &sqlx::sqlite::SqliteRow, column: &str) -> Option<NaiveDate> {
    row.try_get::<String, _>(column)
        .ok()
        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

pub(crate) fn parse_job(row: sqlx::sqlite::SqliteRow) -> PortalResult<Job> {
    Ok(Job {
        id: row.get("id"),
        title: row.get("title"),
        location: row.get("location"),
        category: row.get("category"),
        employment_type: row.get("employment_type"),
        work_model: row.get("work_model"),
        experience: row.get("experience"),
        salary: row.get("salary"),
        skills: row.get("skills"),
        company: row.get("company"),
        job_description: row.get("job_description"),
        status: row.get("status"),
        created_at: parse_timestamp(&row, "created_at")?,
        updated_at: parse_timestamp(&row, "updated_at")?,
        opening_start_date: parse_date(&row, "opening_start_date"),
        last_apply_date: parse_date(&row, "last_apply_date"),
        number_of_openings: row.get("number_of_openings"),
        perks: row.get("perks"),
        company_description: row.get("company_description"),
        admin_id: row.get("admin_id"),
    })
}

pub(crate) fn parse_internship(row: sqlx::sqlite::SqliteRow) -> PortalResult<Internship> {
    Ok(Internship {
        id: row.get("id"),
        title: row.get("title"),
        company: row.get("company"),
        location: row.get("location"),
        duration: row.get("duration"),
        stipend: row.get("stipend"),
        qualifications: row.get("qualifications"),
        skills: row.get("skills"),
        description: row.get("description"),
        status: row.get("status"),
        created_at: parse_timestamp(&row, "created_at")?,
        updated_at: parse_timestamp(&row, "updated_at")?,
        opening_start_date: parse_date(&row, "opening_start_date"),
        last_apply_date: parse_date(&row, "last_apply_date"),
        number_of_openings: row.get("number_of_openings"),
        perks: row.get("perks"),
        company_description: row.get("company_description"),
        admin_id: row.get("admin_id"),
    })
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let db = SqlitePool::connect(":memory:").await.unwrap();

    sqlx::query(
        r#"
        CREATE TABLE job (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT, location TEXT, category TEXT, employment_type TEXT,
            work_model TEXT, experience TEXT, salary REAL, skills TEXT,
            company TEXT NOT NULL, job_description TEXT, status TEXT NOT NULL,
            created_at TEXT NOT NULL, updated_at TEXT NOT NULL,
            opening_start_date TEXT, last_apply_date TEXT,
            number_of_openings INTEGER, perks TEXT, company_description TEXT,
            admin_id INTEGER NOT NULL
        )
        "#,
    )
    .execute(&db)
    .await
    .unwrap();

    sqlx::query(
        r#"
        CREATE TABLE internship (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL, company TEXT NOT NULL, location TEXT NOT NULL,
            duration TEXT, stipend TEXT, qualifications TEXT NOT NULL, skills TEXT,
            description TEXT, status TEXT NOT NULL,
            created_at TEXT NOT NULL, updated_at TEXT NOT NULL,
            opening_start_date TEXT, last_apply_date TEXT,
            number_of_openings INTEGER, perks TEXT, company_description TEXT,
            admin_id INTEGER NOT NULL
        )
        "#,
    )
    .execute(&db)
    .await
    .unwrap();

    db
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_draft() -> JobDraft {
        JobDraft {
            title: Some("Engineer".to_string()),
            location: Some("Pune".to_string()),
            category: None,
            employment_type: None,
            work_model: None,
            experience: None,
            salary: Some(900000.0),
            skills: None,
            company: "Acme".to_string(),
            job_description: None,
            status: "OPEN".to_string(),
            opening_start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            last_apply_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            number_of_openings: Some(2),
            perks: None,
            company_description: None,
        }
    }

    #[tokio::test]
    async fn test_insert_job_preserves_draft_fields() {
        let db = test_pool().await;
        let store = ContentStore::new(db.clone());

        let id = ContentStore::insert_job_with(&db, &job_draft(), 11)
            .await
            .unwrap();

        let job = store.get_job(id).await.unwrap().unwrap();
        assert_eq!(job.title.as_deref(), Some("Engineer"));
        assert_eq!(job.company, "Acme");
        assert_eq!(job.salary, Some(900000.0));
        assert_eq!(job.opening_start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(job.last_apply_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(job.number_of_openings, Some(2));
        assert_eq!(job.admin_id, 11);
    }

    #[tokio::test]
    async fn test_status_update_requires_owner() {
        let db = test_pool().await;
        let store = ContentStore::new(db.clone());

        let id = ContentStore::insert_job_with(&db, &job_draft(), 11)
            .await
            .unwrap();

        let err = store.update_job_status(id, 99, "CLOSED").await.unwrap_err();
        assert!(matches!(err, PortalError::Authorization(_)));

        let job = store.update_job_status(id, 11, "CLOSED").await.unwrap();
        assert_eq!(job.status, "CLOSED");
    }

    #[tokio::test]
    async fn test_delete_internship_requires_owner() {
        let db = test_pool().await;
        let store = ContentStore::new(db.clone());

        let draft = InternshipDraft {
            title: "Intern".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            duration: None,
            stipend: None,
            qualifications: "Any".to_string(),
            skills: None,
            description: None,
            status: "OPEN".to_string(),
            opening_start_date: None,
            last_apply_date: None,
            number_of_openings: None,
            perks: None,
            company_description: None,
        };
        let id = ContentStore::insert_internship_with(&db, &draft, 5)
            .await
            .unwrap();

        let err = store.delete_internship(id, 6).await.unwrap_err();
        assert!(matches!(err, PortalError::Authorization(_)));

        store.delete_internship(id, 5).await.unwrap();
        assert!(store.get_internship(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_job_is_none() {
        let store = ContentStore::new(test_pool().await);
        assert!(store.get_job(404).await.unwrap().is_none());

        let err = store.delete_job(404, 1).await.unwrap_err();
        assert!(matches!(err, PortalError::JobNotFound(404)));
    }
}
