/// Moderation engine
///
/// The state machine at the heart of the portal. Governs the admin
/// lifecycle (unapproved -> approved, enabled -> disabled) and the post
/// lifecycle (submitted -> pending -> published | deleted), enforcing
/// the gate before any submission and making each decision atomic and
/// at-most-once.
use crate::{
    content::ContentStore,
    directory::{Admin, AdminDirectory},
    error::{PortalError, PortalResult},
    mailer::Mailer,
    metrics,
    moderation::draft::{DraftContent, PostType},
    moderation::queue::{PendingPost, PendingQueue},
};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Outcome of a moderation decision
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub pending_id: i64,
    pub approved: bool,
    pub post_type: PostType,
    /// Id of the published job/internship; None on rejection
    pub published_id: Option<i64>,
}

/// Outcome of an admin approval, including whether the notification
/// email went out (the approval itself stands either way)
#[derive(Debug, Clone)]
pub struct AdminApproval {
    pub admin: Admin,
    pub notification_sent: bool,
}

/// Moderation engine
#[derive(Clone)]
pub struct ModerationEngine {
    db: SqlitePool,
    directory: AdminDirectory,
    queue: PendingQueue,
    mailer: Arc<Mailer>,
    base_url: String,
}

impl ModerationEngine {
    pub fn new(
        db: SqlitePool,
        directory: AdminDirectory,
        queue: PendingQueue,
        mailer: Arc<Mailer>,
        base_url: String,
    ) -> Self {
        Self {
            db,
            directory,
            queue,
            mailer,
            base_url,
        }
    }

    /// Gate check: existence, then approval, then enabled. All three
    /// must pass before an admin may submit content.
    pub async fn gate_check(&self, admin_id: i64) -> PortalResult<Admin> {
        let admin = self
            .directory
            .find_admin(admin_id)
            .await?
            .ok_or(PortalError::AdminNotFound(admin_id))?;

        if !admin.approved {
            return Err(PortalError::AdminNotApproved(admin_id));
        }

        if !admin.enabled {
            return Err(PortalError::AdminNotEnabled(admin_id));
        }

        Ok(admin)
    }

    /// Submit a draft for moderation. Runs the gate check, snapshots the
    /// draft into the pending queue and leaves the content store alone.
    pub async fn submit_draft(
        &self,
        draft: DraftContent,
        admin_id: i64,
    ) -> PortalResult<PendingPost> {
        self.gate_check(admin_id).await?;

        let post_type = draft.post_type();
        let content = draft.serialize()?;
        let pending = self.queue.enqueue(post_type, &content, admin_id).await?;

        metrics::DRAFTS_SUBMITTED_TOTAL
            .with_label_values(&[post_type.as_str()])
            .inc();
        metrics::PENDING_QUEUE_DEPTH.inc();

        tracing::info!(
            "Draft {} ({}) from admin {} queued for moderation",
            pending.id,
            post_type.as_str(),
            admin_id
        );

        Ok(pending)
    }

    /// Decide on a pending post. The whole transition runs in one
    /// transaction; the conditional delete makes it at-most-once, so a
    /// concurrent second decision on the same id observes
    /// PendingPostNotFound instead of double-publishing.
    pub async fn decide(&self, pending_id: i64, approved: bool) -> PortalResult<Decision> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT id, post_type, content, admin_id, created_at
            FROM pending_post
            WHERE id = ?
            "#,
        )
        .bind(pending_id)
        .fetch_optional(&mut *tx)
        .await?;

        let pending = row
            .map(crate::moderation::queue::parse_pending_post)
            .transpose()?
            .ok_or(PortalError::PendingPostNotFound(pending_id))?;

        let deleted = sqlx::query("DELETE FROM pending_post WHERE id = ?")
            .bind(pending_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            // Lost the race against a concurrent decision
            return Err(PortalError::PendingPostNotFound(pending_id));
        }

        if !approved {
            tx.commit().await?;

            metrics::MODERATION_DECISIONS_TOTAL
                .with_label_values(&["rejected"])
                .inc();
            metrics::PENDING_QUEUE_DEPTH.dec();

            tracing::info!("Pending post {} rejected and deleted", pending_id);

            return Ok(Decision {
                pending_id,
                approved: false,
                post_type: pending.post_type,
                published_id: None,
            });
        }

        // The submitting admin may have been deleted while the draft was
        // queued. Surface that instead of publishing an orphan; the
        // rollback leaves the pending post in place for an explicit
        // rejection.
        let admin_id: Option<i64> = sqlx::query_scalar("SELECT id FROM admin WHERE id = ?")
            .bind(pending.admin_id)
            .fetch_optional(&mut *tx)
            .await?;
        let admin_id = admin_id.ok_or(PortalError::AdminNotFound(pending.admin_id))?;

        let draft = DraftContent::deserialize(&pending.content)?;
        let published_id = match &draft {
            DraftContent::Job(job) => {
                ContentStore::insert_job_with(&mut *tx, job, admin_id).await?
            }
            DraftContent::Internship(internship) => {
                ContentStore::insert_internship_with(&mut *tx, internship, admin_id).await?
            }
        };

        tx.commit().await?;

        metrics::MODERATION_DECISIONS_TOTAL
            .with_label_values(&["approved"])
            .inc();
        metrics::PENDING_QUEUE_DEPTH.dec();

        tracing::info!(
            "Pending post {} approved; published {} {} for admin {}",
            pending_id,
            pending.post_type.as_str(),
            published_id,
            admin_id
        );

        Ok(Decision {
            pending_id,
            approved: true,
            post_type: pending.post_type,
            published_id: Some(published_id),
        })
    }

    /// Approve an admin. The flag flips and commits first; the
    /// notification email is best-effort and never rolls the approval
    /// back.
    pub async fn approve_admin(&self, admin_id: i64) -> PortalResult<AdminApproval> {
        let updated = sqlx::query("UPDATE admin SET approved = 1 WHERE id = ?")
            .bind(admin_id)
            .execute(&self.db)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(PortalError::AdminNotFound(admin_id));
        }

        let admin = self
            .directory
            .find_admin(admin_id)
            .await?
            .ok_or(PortalError::AdminNotFound(admin_id))?;

        metrics::ADMIN_APPROVALS_TOTAL.inc();
        tracing::info!("Admin {} approved", admin_id);

        let notification_sent = match self
            .mailer
            .send_admin_approved_email(&admin.email, &admin.name, &self.base_url)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                metrics::NOTIFICATION_FAILURES_TOTAL.inc();
                tracing::warn!(
                    "Approval email to admin {} failed (approval stands): {}",
                    admin_id,
                    e
                );
                false
            }
        };

        Ok(AdminApproval {
            admin,
            notification_sent,
        })
    }

    /// Disable an admin. One-way: no operation re-enables. No
    /// notification is sent.
    pub async fn disable_admin(&self, admin_id: i64) -> PortalResult<Admin> {
        let updated = sqlx::query("UPDATE admin SET enabled = 0 WHERE id = ?")
            .bind(admin_id)
            .execute(&self.db)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(PortalError::AdminNotFound(admin_id));
        }

        let admin = self
            .directory
            .find_admin(admin_id)
            .await?
            .ok_or(PortalError::AdminNotFound(admin_id))?;

        metrics::ADMIN_DISABLES_TOTAL.inc();
        tracing::info!("Admin {} disabled", admin_id);

        Ok(admin)
    }

    /// All drafts awaiting a decision, for the super admin panel
    pub async fn pending_posts(&self) -> PortalResult<Vec<PendingPost>> {
        self.queue.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::NewAdmin;
    use crate::moderation::draft::{InternshipDraft, JobDraft};
    use chrono::NaiveDate;

    async fn test_pool() -> SqlitePool {
        let db = SqlitePool::connect(":memory:").await.unwrap();

        for ddl in [
            r#"
            CREATE TABLE admin (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                mobile TEXT UNIQUE,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                approved INTEGER NOT NULL DEFAULT 0,
                enabled INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE pending_post (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_type TEXT NOT NULL,
                content TEXT NOT NULL,
                admin_id INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
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
        ] {
            sqlx::query(ddl).execute(&db).await.unwrap();
        }

        db
    }

    fn engine_for(db: &SqlitePool) -> ModerationEngine {
        ModerationEngine::new(
            db.clone(),
            AdminDirectory::new(db.clone()),
            PendingQueue::new(db.clone()),
            Arc::new(Mailer::new(None).unwrap()),
            "http://localhost:8080".to_string(),
        )
    }

    async fn register_admin(db: &SqlitePool, username: &str) -> Admin {
        AdminDirectory::new(db.clone())
            .register_admin(NewAdmin {
                name: format!("{} admin", username),
                mobile: None,
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password: "hunter2hunter2".to_string(),
            })
            .await
            .unwrap()
    }

    fn job_draft() -> JobDraft {
        JobDraft {
            title: Some("Engineer".to_string()),
            location: None,
            category: None,
            employment_type: None,
            work_model: None,
            experience: None,
            salary: None,
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
    async fn test_gate_check_order() {
        let db = test_pool().await;
        let engine = engine_for(&db);

        // Unknown admin fails on existence before anything else
        let err = engine.gate_check(999).await.unwrap_err();
        assert!(matches!(err, PortalError::AdminNotFound(999)));

        // Unapproved fails on approval even when also disabled
        let admin = register_admin(&db, "gates").await;
        sqlx::query("UPDATE admin SET enabled = 0 WHERE id = ?")
            .bind(admin.id)
            .execute(&db)
            .await
            .unwrap();
        let err = engine.gate_check(admin.id).await.unwrap_err();
        assert!(matches!(err, PortalError::AdminNotApproved(_)));

        // Approved but disabled fails on enabled
        engine.approve_admin(admin.id).await.unwrap();
        let err = engine.gate_check(admin.id).await.unwrap_err();
        assert!(matches!(err, PortalError::AdminNotEnabled(_)));
    }

    #[tokio::test]
    async fn test_unapproved_admin_cannot_submit() {
        let db = test_pool().await;
        let engine = engine_for(&db);
        let admin = register_admin(&db, "pending").await;

        let err = engine
            .submit_draft(DraftContent::Job(job_draft()), admin.id)
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::AdminNotApproved(_)));

        // No pending post was created
        assert!(engine.pending_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_admin_cannot_submit() {
        let db = test_pool().await;
        let engine = engine_for(&db);
        let admin = register_admin(&db, "banned").await;

        engine.approve_admin(admin.id).await.unwrap();
        engine.disable_admin(admin.id).await.unwrap();

        let err = engine
            .submit_draft(DraftContent::Job(job_draft()), admin.id)
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::AdminNotEnabled(_)));
        assert!(engine.pending_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_queues_without_publishing() {
        let db = test_pool().await;
        let engine = engine_for(&db);
        let admin = register_admin(&db, "poster").await;
        engine.approve_admin(admin.id).await.unwrap();

        let pending = engine
            .submit_draft(DraftContent::Job(job_draft()), admin.id)
            .await
            .unwrap();

        assert_eq!(pending.post_type, PostType::Job);
        assert_eq!(pending.admin_id, admin.id);

        // Nothing published yet
        let jobs = ContentStore::new(db.clone()).list_jobs().await.unwrap();
        assert!(jobs.is_empty());
    }

    #[tokio::test]
    async fn test_approval_publishes_exact_fields_and_owner() {
        let db = test_pool().await;
        let engine = engine_for(&db);
        let admin = register_admin(&db, "acme").await;
        engine.approve_admin(admin.id).await.unwrap();

        let pending = engine
            .submit_draft(DraftContent::Job(job_draft()), admin.id)
            .await
            .unwrap();

        let decision = engine.decide(pending.id, true).await.unwrap();
        assert!(decision.approved);
        assert_eq!(decision.post_type, PostType::Job);

        let job = ContentStore::new(db.clone())
            .get_job(decision.published_id.unwrap())
            .await
            .unwrap()
            .unwrap();

        // Round-trip fidelity: the published job carries the submitted
        // fields exactly, and ownership points at the submitter
        assert_eq!(job.title.as_deref(), Some("Engineer"));
        assert_eq!(job.company, "Acme");
        assert_eq!(job.opening_start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(job.last_apply_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(job.number_of_openings, Some(2));
        assert_eq!(job.admin_id, admin.id);

        // The queue entry is gone
        assert!(engine.pending_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_internship_approval_path() {
        let db = test_pool().await;
        let engine = engine_for(&db);
        let admin = register_admin(&db, "labs").await;
        engine.approve_admin(admin.id).await.unwrap();

        let draft = InternshipDraft {
            title: "Research Intern".to_string(),
            company: "Acme Labs".to_string(),
            location: "Remote".to_string(),
            duration: Some("6 months".to_string()),
            stipend: None,
            qualifications: "B.E. in progress".to_string(),
            skills: None,
            description: None,
            status: "OPEN".to_string(),
            opening_start_date: None,
            last_apply_date: None,
            number_of_openings: Some(1),
            perks: None,
            company_description: None,
        };
        let pending = engine
            .submit_draft(DraftContent::Internship(draft), admin.id)
            .await
            .unwrap();

        let decision = engine.decide(pending.id, true).await.unwrap();
        let internship = ContentStore::new(db.clone())
            .get_internship(decision.published_id.unwrap())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(internship.title, "Research Intern");
        assert_eq!(internship.duration.as_deref(), Some("6 months"));
        assert_eq!(internship.admin_id, admin.id);
    }

    #[tokio::test]
    async fn test_rejection_deletes_without_publishing() {
        let db = test_pool().await;
        let engine = engine_for(&db);
        let admin = register_admin(&db, "luckless").await;
        engine.approve_admin(admin.id).await.unwrap();

        let pending = engine
            .submit_draft(DraftContent::Job(job_draft()), admin.id)
            .await
            .unwrap();

        let decision = engine.decide(pending.id, false).await.unwrap();
        assert!(!decision.approved);
        assert!(decision.published_id.is_none());

        let store = ContentStore::new(db.clone());
        assert!(store.list_jobs().await.unwrap().is_empty());
        assert!(engine.pending_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_decision_fails_not_found() {
        let db = test_pool().await;
        let engine = engine_for(&db);
        let admin = register_admin(&db, "twice").await;
        engine.approve_admin(admin.id).await.unwrap();

        let pending = engine
            .submit_draft(DraftContent::Job(job_draft()), admin.id)
            .await
            .unwrap();

        engine.decide(pending.id, true).await.unwrap();

        let err = engine.decide(pending.id, true).await.unwrap_err();
        assert!(matches!(err, PortalError::PendingPostNotFound(_)));

        let err = engine.decide(pending.id, false).await.unwrap_err();
        assert!(matches!(err, PortalError::PendingPostNotFound(_)));

        // Exactly one job was published
        assert_eq!(ContentStore::new(db.clone()).list_jobs().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_orphaned_pending_post_surfaces_admin_not_found() {
        let db = test_pool().await;
        let engine = engine_for(&db);
        let admin = register_admin(&db, "ghost").await;
        engine.approve_admin(admin.id).await.unwrap();

        let pending = engine
            .submit_draft(DraftContent::Job(job_draft()), admin.id)
            .await
            .unwrap();

        // Admin deleted while the draft sits in the queue
        AdminDirectory::new(db.clone())
            .delete_admin(admin.id)
            .await
            .unwrap();

        let err = engine.decide(pending.id, true).await.unwrap_err();
        assert!(matches!(err, PortalError::AdminNotFound(_)));

        // The transaction rolled back: the draft is still queued and can
        // still be rejected explicitly
        assert_eq!(engine.pending_posts().await.unwrap().len(), 1);
        engine.decide(pending.id, false).await.unwrap();
        assert!(engine.pending_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_approve_admin_unknown_id() {
        let db = test_pool().await;
        let engine = engine_for(&db);

        let err = engine.approve_admin(404).await.unwrap_err();
        assert!(matches!(err, PortalError::AdminNotFound(404)));
    }

    #[tokio::test]
    async fn test_admin_flag_transitions() {
        let db = test_pool().await;
        let engine = engine_for(&db);
        let admin = register_admin(&db, "flags").await;

        assert!(!admin.approved);
        assert!(admin.enabled);

        let approval = engine.approve_admin(admin.id).await.unwrap();
        assert!(approval.admin.approved);
        // Mailer is unconfigured in tests; the send is skipped, not failed
        assert!(approval.notification_sent);

        let disabled = engine.disable_admin(admin.id).await.unwrap();
        assert!(disabled.approved); // approval never reverts
        assert!(!disabled.enabled);
    }
}
