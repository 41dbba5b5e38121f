/// Configuration management for the TalentGate portal
use crate::error::{PortalError, PortalResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub email: Option<EmailConfig>,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Public URL used in notification emails (login links)
    pub public_url: String,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub portal_db: PathBuf,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Bearer token lifetime in seconds
    pub token_ttl_secs: i64,
}

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from_address: String,
    /// Address that receives admin registration requests
    pub super_admin_address: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> PortalResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("TG_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("TG_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| PortalError::Validation("Invalid port number".to_string()))?;

        let public_url = env::var("TG_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", hostname, port));
        let version = env::var("TG_VERSION").unwrap_or_else(|_| "0.1.0".to_string());

        let data_directory: PathBuf = env::var("TG_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let portal_db = env::var("TG_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("portal.sqlite"));

        let jwt_secret = env::var("TG_JWT_SECRET")
            .map_err(|_| PortalError::Validation("JWT secret required".to_string()))?;
        let token_ttl_secs = env::var("TG_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .unwrap_or(86400);

        let email = if let Ok(smtp_url) = env::var("TG_EMAIL_SMTP_URL") {
            Some(EmailConfig {
                smtp_url,
                from_address: env::var("TG_EMAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| format!("noreply@{}", hostname)),
                super_admin_address: env::var("TG_SUPER_ADMIN_EMAIL")
                    .map_err(|_| {
                        PortalError::Validation(
                            "Super admin email required when SMTP is configured".to_string(),
                        )
                    })?,
            })
        } else {
            None
        };

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                public_url,
                version,
            },
            storage: StorageConfig {
                data_directory,
                portal_db,
            },
            authentication: AuthConfig {
                jwt_secret,
                token_ttl_secs,
            },
            email,
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> PortalResult<()> {
        if self.service.hostname.is_empty() {
            return Err(PortalError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.authentication.jwt_secret.len() < 32 {
            return Err(PortalError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.authentication.token_ttl_secs <= 0 {
            return Err(PortalError::Validation(
                "Token TTL must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
