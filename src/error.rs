/// Unified error types for the TalentGate portal
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the portal
#[derive(Error, Debug)]
pub enum PortalError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Authorization errors
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Admin id does not resolve
    #[error("Admin not found with id: {0}")]
    AdminNotFound(i64),

    /// Super admin id does not resolve
    #[error("Super admin not found with id: {0}")]
    SuperAdminNotFound(i64),

    /// Pending post id does not resolve (or was already decided)
    #[error("Pending post not found with id: {0}")]
    PendingPostNotFound(i64),

    /// Published job id does not resolve
    #[error("Job not found with id: {0}")]
    JobNotFound(i64),

    /// Published internship id does not resolve
    #[error("Internship not found with id: {0}")]
    InternshipNotFound(i64),

    /// Gate precondition: admin has not been approved by the super admin
    #[error("Admin {0} is not approved. Please wait for approval.")]
    AdminNotApproved(i64),

    /// Gate precondition: admin has been disabled by the super admin
    #[error("Admin {0} is disabled. Please contact the super admin.")]
    AdminNotEnabled(i64),

    /// Conflict errors (e.g., duplicate username/email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Mail delivery failures (notifier unreachable or rejected the message)
    #[error("Mail delivery failed: {0}")]
    Mail(String),

    /// Generic not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert PortalError to HTTP response
impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            PortalError::Authentication(_) => (
                StatusCode::UNAUTHORIZED,
                "AuthenticationRequired",
                self.to_string(),
            ),
            PortalError::Authorization(_) => {
                (StatusCode::FORBIDDEN, "Forbidden", self.to_string())
            }
            PortalError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "InvalidRequest", self.to_string())
            }
            PortalError::AdminNotFound(_) => {
                (StatusCode::NOT_FOUND, "AdminNotFound", self.to_string())
            }
            PortalError::SuperAdminNotFound(_) => {
                (StatusCode::NOT_FOUND, "SuperAdminNotFound", self.to_string())
            }
            PortalError::PendingPostNotFound(_) => {
                (StatusCode::NOT_FOUND, "PendingPostNotFound", self.to_string())
            }
            PortalError::JobNotFound(_) => {
                (StatusCode::NOT_FOUND, "JobNotFound", self.to_string())
            }
            PortalError::InternshipNotFound(_) => {
                (StatusCode::NOT_FOUND, "InternshipNotFound", self.to_string())
            }
            PortalError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", self.to_string()),
            // The two gate failures map to distinct codes so clients can
            // render "pending approval" and "disabled" states differently.
            PortalError::AdminNotApproved(_) => {
                (StatusCode::FORBIDDEN, "AdminNotApproved", self.to_string())
            }
            PortalError::AdminNotEnabled(_) => {
                (StatusCode::FORBIDDEN, "AdminDisabled", self.to_string())
            }
            PortalError::Conflict(_) => (StatusCode::CONFLICT, "Conflict", self.to_string()),
            PortalError::Mail(_) => (
                StatusCode::BAD_GATEWAY,
                "MailDeliveryFailed",
                self.to_string(),
            ),
            PortalError::Database(_) | PortalError::Internal(_) | PortalError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for portal operations
pub type PortalResult<T> = Result<T, PortalError>;
