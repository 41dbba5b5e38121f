/// Admin endpoints: registration, login, profile, draft submission
use crate::{
    auth::{self, AdminAuthContext},
    context::AppContext,
    directory::{Admin, AdminUpdate, NewAdmin},
    error::{PortalError, PortalResult},
    metrics,
    moderation::{DraftContent, InternshipDraft, JobDraft},
};
use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Build admin routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/admin/register", post(register))
        .route("/api/admin/login", post(login))
        .route(
            "/api/admin/me",
            get(me).put(update_profile).delete(delete_account),
        )
        .route("/api/admin/jobs", post(submit_job))
        .route("/api/admin/internships", post(submit_internship))
        .route("/api/admin/jobs/:id", delete(delete_job))
        .route("/api/admin/internships/:id", delete(delete_internship))
        .route("/api/admin/jobs/:id/status", put(update_job_status))
        .route(
            "/api/admin/internships/:id/status",
            put(update_internship_status),
        )
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterAdminRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 10, max = 15))]
    pub mobile: Option<String>,
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Serialize)]
struct RegisterAdminResponse {
    admin: Admin,
    message: String,
}

/// Register a new admin. The account starts unapproved; a notice is
/// sent to the super admin address (best-effort).
async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterAdminRequest>,
) -> PortalResult<Json<RegisterAdminResponse>> {
    req.validate()
        .map_err(|e| PortalError::Validation(e.to_string()))?;

    let admin = ctx
        .directory
        .register_admin(NewAdmin {
            name: req.name,
            mobile: req.mobile,
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    metrics::ADMIN_REGISTRATIONS_TOTAL.inc();

    // Registration stands even if the notice cannot be delivered
    if ctx.mailer.is_configured() {
        if let Err(e) = ctx.mailer.send_registration_request_email(&admin.email).await {
            metrics::NOTIFICATION_FAILURES_TOTAL.inc();
            tracing::warn!("Registration notice for {} failed: {}", admin.email, e);
        }
    } else {
        tracing::warn!("Email not configured, registration notice not sent");
    }

    Ok(Json(RegisterAdminResponse {
        admin,
        message: "Registration received. Await super admin approval.".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    admin: Admin,
}

/// Admin login. Fails with distinct errors for bad credentials,
/// pending approval and disabled accounts.
async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> PortalResult<Json<LoginResponse>> {
    let admin = ctx.directory.login_admin(&req.username, &req.password).await?;

    let token = auth::issue_token(
        admin.id,
        auth::SCOPE_ADMIN,
        &ctx.config.authentication.jwt_secret,
        ctx.config.authentication.token_ttl_secs,
    )?;

    Ok(Json(LoginResponse { token, admin }))
}

/// Get the authenticated admin's profile
async fn me(State(ctx): State<AppContext>, auth: AdminAuthContext) -> PortalResult<Json<Admin>> {
    let admin = ctx
        .directory
        .find_admin(auth.admin_id)
        .await?
        .ok_or(PortalError::AdminNotFound(auth.admin_id))?;

    Ok(Json(admin))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAdminRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 10, max = 15))]
    pub mobile: Option<String>,
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
}

/// Update the authenticated admin's profile (partial)
async fn update_profile(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Json(req): Json<UpdateAdminRequest>,
) -> PortalResult<Json<Admin>> {
    req.validate()
        .map_err(|e| PortalError::Validation(e.to_string()))?;

    let admin = ctx
        .directory
        .update_admin(
            auth.admin_id,
            AdminUpdate {
                name: req.name,
                mobile: req.mobile,
                username: req.username,
                email: req.email,
                password: req.password,
            },
        )
        .await?;

    Ok(Json(admin))
}

/// Self-service account deletion
async fn delete_account(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
) -> PortalResult<Json<serde_json::Value>> {
    ctx.directory.delete_admin(auth.admin_id).await?;

    Ok(Json(serde_json::json!({})))
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    pending_id: i64,
    message: String,
}

/// Submit a job draft for moderation
async fn submit_job(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Json(draft): Json<JobDraft>,
) -> PortalResult<Json<SubmitResponse>> {
    require_non_empty("company", &draft.company)?;
    require_non_empty("status", &draft.status)?;

    let pending = ctx
        .engine
        .submit_draft(DraftContent::Job(draft), auth.admin_id)
        .await?;

    Ok(Json(SubmitResponse {
        pending_id: pending.id,
        message: "Job post sent to super admin for approval.".to_string(),
    }))
}

/// Submit an internship draft for moderation
async fn submit_internship(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Json(draft): Json<InternshipDraft>,
) -> PortalResult<Json<SubmitResponse>> {
    require_non_empty("title", &draft.title)?;
    require_non_empty("company", &draft.company)?;
    require_non_empty("location", &draft.location)?;
    require_non_empty("qualifications", &draft.qualifications)?;
    require_non_empty("status", &draft.status)?;

    let pending = ctx
        .engine
        .submit_draft(DraftContent::Internship(draft), auth.admin_id)
        .await?;

    Ok(Json(SubmitResponse {
        pending_id: pending.id,
        message: "Internship post sent to super admin for approval.".to_string(),
    }))
}

/// Delete one of the admin's published job posts
async fn delete_job(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(id): Path<i64>,
) -> PortalResult<Json<serde_json::Value>> {
    ctx.engine.gate_check(auth.admin_id).await?;
    ctx.content.delete_job(id, auth.admin_id).await?;

    Ok(Json(serde_json::json!({
        "message": "Job post deleted successfully."
    })))
}

/// Delete one of the admin's published internship posts
async fn delete_internship(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(id): Path<i64>,
) -> PortalResult<Json<serde_json::Value>> {
    ctx.engine.gate_check(auth.admin_id).await?;
    ctx.content.delete_internship(id, auth.admin_id).await?;

    Ok(Json(serde_json::json!({
        "message": "Internship post deleted successfully."
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Change the content-level status of an owned job (open/closed)
async fn update_job_status(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> PortalResult<Json<crate::content::Job>> {
    require_non_empty("status", &req.status)?;
    ctx.engine.gate_check(auth.admin_id).await?;

    let job = ctx
        .content
        .update_job_status(id, auth.admin_id, &req.status)
        .await?;

    Ok(Json(job))
}

/// Change the content-level status of an owned internship
async fn update_internship_status(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> PortalResult<Json<crate::content::Internship>> {
    require_non_empty("status", &req.status)?;
    ctx.engine.gate_check(auth.admin_id).await?;

    let internship = ctx
        .content
        .update_internship_status(id, auth.admin_id, &req.status)
        .await?;

    Ok(Json(internship))
}

fn require_non_empty(field: &str, value: &str) -> PortalResult<()> {
    if value.trim().is_empty() {
        return Err(PortalError::Validation(format!(
            "Field '{}' must not be empty",
            field
        )));
    }
    Ok(())
}
