/// Admin directory
///
/// Holds the Admin and SuperAdmin records behind the moderation engine:
/// registration, credential checks, profile updates and the listing
/// queries the super admin panel uses. The moderation flags themselves
/// (`approved`, `enabled`) are only ever flipped by the engine.

use crate::error::{PortalError, PortalResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

/// Admin record in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
    pub name: String,
    pub mobile: Option<String>,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub approved: bool,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Super admin record in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuperAdmin {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// New admin registration payload
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub name: String,
    pub mobile: Option<String>,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// New super admin registration payload
#[derive(Debug, Clone)]
pub struct NewSuperAdmin {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Partial admin profile update; None fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct AdminUpdate {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Partial super admin profile update; None fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct SuperAdminUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Listing filter for the super admin panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminFilter {
    All,
    Approved,
    NotApproved,
    Enabled,
    Disabled,
}

impl AdminFilter {
    pub fn from_str(s: &str) -> PortalResult<Self> {
        match s.to_lowercase().as_str() {
            "all" => Ok(AdminFilter::All),
            "approved" => Ok(AdminFilter::Approved),
            "not-approved" | "unapproved" => Ok(AdminFilter::NotApproved),
            "enabled" => Ok(AdminFilter::Enabled),
            "disabled" => Ok(AdminFilter::Disabled),
            _ => Err(PortalError::Validation(format!(
                "Invalid admin filter: {}",
                s
            ))),
        }
    }
}

/// Admin directory manager
#[derive(Clone)]
pub struct AdminDirectory {
    db: SqlitePool,
}

impl AdminDirectory {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Register a new admin. Admins start unapproved and enabled.
    pub async fn register_admin(&self, new: NewAdmin) -> PortalResult<Admin> {
        let now = Utc::now();
        let password_hash = hash_password(&new.password)?;

        let result = sqlx::query(
            r#"
            INSERT INTO admin (name, mobile, username, email, password_hash, approved, enabled, created_at)
            VALUES (?, ?, ?, ?, ?, 0, 1, ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.mobile)
        .bind(&new.username)
        .bind(&new.email)
        .bind(&password_hash)
        .bind(now.to_rfc3339())
        .execute(&self.db)
        .await
        .map_err(map_unique_violation)?;

        tracing::info!("Registered admin {} (pending approval)", new.username);

        Ok(Admin {
            id: result.last_insert_rowid(),
            name: new.name,
            mobile: new.mobile,
            username: new.username,
            email: new.email,
            password_hash,
            approved: false,
            enabled: true,
            created_at: now,
        })
    }

    /// Admin login: credential check first, then the moderation gates.
    /// The gate failures are distinct errors so clients can tell
    /// "pending approval" from "disabled".
    pub async fn login_admin(&self, username: &str, password: &str) -> PortalResult<Admin> {
        let admin = self
            .find_admin_by_username(username)
            .await?
            .ok_or_else(|| PortalError::Authentication("Unknown username".to_string()))?;

        if !verify_password(password, &admin.password_hash) {
            tracing::warn!("Invalid credentials for admin: {}", username);
            return Err(PortalError::Authentication("Invalid credentials".to_string()));
        }

        if !admin.approved {
            return Err(PortalError::AdminNotApproved(admin.id));
        }

        if !admin.enabled {
            return Err(PortalError::AdminNotEnabled(admin.id));
        }

        tracing::info!("Admin login successful: {}", username);
        Ok(admin)
    }

    /// Look up an admin by id
    pub async fn find_admin(&self, admin_id: i64) -> PortalResult<Option<Admin>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, mobile, username, email, password_hash, approved, enabled, created_at
            FROM admin
            WHERE id = ?
            "#,
        )
        .bind(admin_id)
        .fetch_optional(&self.db)
        .await?;

        row.map(parse_admin).transpose()
    }

    /// Look up an admin by username
    pub async fn find_admin_by_username(&self, username: &str) -> PortalResult<Option<Admin>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, mobile, username, email, password_hash, approved, enabled, created_at
            FROM admin
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        row.map(parse_admin).transpose()
    }

    /// List admins for the super admin panel
    pub async fn list_admins(&self, filter: AdminFilter) -> PortalResult<Vec<Admin>> {
        let where_clause = match filter {
            AdminFilter::All => "",
            AdminFilter::Approved => "WHERE approved = 1",
            AdminFilter::NotApproved => "WHERE approved = 0",
            AdminFilter::Enabled => "WHERE enabled = 1",
            AdminFilter::Disabled => "WHERE enabled = 0",
        };

        let query = format!(
            "SELECT id, name, mobile, username, email, password_hash, approved, enabled, created_at \
             FROM admin {} ORDER BY id",
            where_clause
        );

        let rows = sqlx::query(&query).fetch_all(&self.db).await?;

        rows.into_iter().map(parse_admin).collect()
    }

    /// Apply a partial profile update to an admin
    pub async fn update_admin(&self, admin_id: i64, update: AdminUpdate) -> PortalResult<Admin> {
        let mut admin = self
            .find_admin(admin_id)
            .await?
            .ok_or(PortalError::AdminNotFound(admin_id))?;

        if let Some(name) = update.name {
            admin.name = name;
        }
        if let Some(mobile) = update.mobile {
            admin.mobile = Some(mobile);
        }
        if let Some(username) = update.username {
            admin.username = username;
        }
        if let Some(email) = update.email {
            admin.email = email;
        }
        if let Some(password) = update.password {
            admin.password_hash = hash_password(&password)?;
        }

        sqlx::query(
            r#"
            UPDATE admin
            SET name = ?, mobile = ?, username = ?, email = ?, password_hash = ?
            WHERE id = ?
            "#,
        )
        .bind(&admin.name)
        .bind(&admin.mobile)
        .bind(&admin.username)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(admin_id)
        .execute(&self.db)
        .await
        .map_err(map_unique_violation)?;

        tracing::info!("Updated admin profile: {}", admin_id);
        Ok(admin)
    }

    /// Delete an admin. Published posts owned by the admin are removed by
    /// the foreign key cascade; queued pending posts are left behind and
    /// surface as AdminNotFound at decision time.
    pub async fn delete_admin(&self, admin_id: i64) -> PortalResult<()> {
        let result = sqlx::query("DELETE FROM admin WHERE id = ?")
            .bind(admin_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PortalError::AdminNotFound(admin_id));
        }

        tracing::info!("Deleted admin: {}", admin_id);
        Ok(())
    }

    /// Register a new super admin. No approval gate applies.
    pub async fn register_super_admin(&self, new: NewSuperAdmin) -> PortalResult<SuperAdmin> {
        let now = Utc::now();
        let password_hash = hash_password(&new.password)?;

        let result = sqlx::query(
            r#"
            INSERT INTO super_admin (name, username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.username)
        .bind(&new.email)
        .bind(&password_hash)
        .bind(now.to_rfc3339())
        .execute(&self.db)
        .await
        .map_err(map_unique_violation)?;

        tracing::info!("Registered super admin {}", new.username);

        Ok(SuperAdmin {
            id: result.last_insert_rowid(),
            name: new.name,
            username: new.username,
            email: new.email,
            password_hash,
            created_at: now,
        })
    }

    /// Super admin login (credential check only)
    pub async fn login_super_admin(
        &self,
        username: &str,
        password: &str,
    ) -> PortalResult<SuperAdmin> {
        let row = sqlx::query(
            r#"
            SELECT id, name, username, email, password_hash, created_at
            FROM super_admin
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        let super_admin = row
            .map(parse_super_admin)
            .transpose()?
            .ok_or_else(|| PortalError::Authentication("Unknown username".to_string()))?;

        if !verify_password(password, &super_admin.password_hash) {
            tracing::warn!("Invalid credentials for super admin: {}", username);
            return Err(PortalError::Authentication("Invalid credentials".to_string()));
        }

        Ok(super_admin)
    }

    /// Look up a super admin by id
    pub async fn find_super_admin(&self, id: i64) -> PortalResult<Option<SuperAdmin>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, username, email, password_hash, created_at
            FROM super_admin
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(parse_super_admin).transpose()
    }

    /// Apply a partial profile update to a super admin
    pub async fn update_super_admin(
        &self,
        id: i64,
        update: SuperAdminUpdate,
    ) -> PortalResult<SuperAdmin> {
        let mut super_admin = self
            .find_super_admin(id)
            .await?
            .ok_or(PortalError::SuperAdminNotFound(id))?;

        if let Some(name) = update.name {
            super_admin.name = name;
        }
        if let Some(username) = update.username {
            super_admin.username = username;
        }
        if let Some(email) = update.email {
            super_admin.email = email;
        }
        if let Some(password) = update.password {
            super_admin.password_hash = hash_password(&password)?;
        }

        sqlx::query(
            r#"
            UPDATE super_admin
            SET name = ?, username = ?, email = ?, password_hash = ?
            WHERE id = ?
            "#,
        )
        .bind(&super_admin.name)
        .bind(&super_admin.username)
        .bind(&super_admin.email)
        .bind(&super_admin.password_hash)
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(map_unique_violation)?;

        tracing::info!("Updated super admin profile: {}", id);
        Ok(super_admin)
    }

    /// Delete a super admin
    pub async fn delete_super_admin(&self, id: i64) -> PortalResult<()> {
        let result = sqlx::query("DELETE FROM super_admin WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PortalError::SuperAdminNotFound(id));
        }

        tracing::info!("Deleted super admin: {}", id);
        Ok(())
    }
}

/// Hash a password with Argon2id and a fresh salt
pub fn hash_password(password: &str) -> PortalResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| PortalError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn map_unique_violation(e: sqlx::Error) -> PortalError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => PortalError::Conflict(
            "Username, email or mobile number already registered".to_string(),
        ),
        _ => PortalError::Database(e),
    }
}

fn parse_admin(row: sqlx::sqlite::SqliteRow) -> PortalResult<Admin> {
    let created_at_str: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| PortalError::Internal(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc);

    Ok(Admin {
        id: row.get("id"),
        name: row.get("name"),
        mobile: row.get("mobile"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        approved: row.get("approved"),
        enabled: row.get("enabled"),
        created_at,
    })
}

fn parse_super_admin(row: sqlx::sqlite::SqliteRow) -> PortalResult<SuperAdmin> {
    let created_at_str: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| PortalError::Internal(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc);

    Ok(SuperAdmin {
        id: row.get("id"),
        name: row.get("name"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at,
    })
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let db = SqlitePool::connect(":memory:").await.unwrap();

    sqlx::query(
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
    )
    .execute(&db)
    .await
    .unwrap();

    sqlx::query(
        r#"
        CREATE TABLE super_admin (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(&db)
    .await
    .unwrap();

    db
}
