/// Super admin endpoints: account management, admin moderation and the
/// pending post decision queue
use crate::{
    auth::{self, SuperAdminAuthContext},
    context::AppContext,
    directory::{Admin, AdminFilter, NewSuperAdmin, SuperAdmin, SuperAdminUpdate},
    error::{PortalError, PortalResult},
    moderation::{Decision, PendingPost},
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Build super admin routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/super-admin/register", post(register))
        .route("/api/super-admin/login", post(login))
        .route(
            "/api/super-admin/me",
            put(update_profile).delete(delete_account),
        )
        .route("/api/super-admin/admins", get(list_admins))
        .route(
            "/api/super-admin/admins/:id",
            get(get_admin).delete(delete_admin),
        )
        .route("/api/super-admin/admins/:id/approve", post(approve_admin))
        .route("/api/super-admin/admins/:id/disable", post(disable_admin))
        .route("/api/super-admin/pending-posts", get(list_pending_posts))
        .route("/api/super-admin/pending-posts/:id", get(get_pending_post))
        .route(
            "/api/super-admin/pending-posts/:id/decision",
            post(decide_pending_post),
        )
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterSuperAdminRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Register a super admin. No approval gate applies.
async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterSuperAdminRequest>,
) -> PortalResult<Json<SuperAdmin>> {
    req.validate()
        .map_err(|e| PortalError::Validation(e.to_string()))?;

    let super_admin = ctx
        .directory
        .register_super_admin(NewSuperAdmin {
            name: req.name,
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(super_admin))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    super_admin: SuperAdmin,
}

/// Super admin login
async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> PortalResult<Json<LoginResponse>> {
    let super_admin = ctx
        .directory
        .login_super_admin(&req.username, &req.password)
        .await?;

    let token = auth::issue_token(
        super_admin.id,
        auth::SCOPE_SUPER_ADMIN,
        &ctx.config.authentication.jwt_secret,
        ctx.config.authentication.token_ttl_secs,
    )?;

    Ok(Json(LoginResponse { token, super_admin }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSuperAdminRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
}

/// Update the authenticated super admin's profile (partial)
async fn update_profile(
    State(ctx): State<AppContext>,
    auth: SuperAdminAuthContext,
    Json(req): Json<UpdateSuperAdminRequest>,
) -> PortalResult<Json<SuperAdmin>> {
    req.validate()
        .map_err(|e| PortalError::Validation(e.to_string()))?;

    let super_admin = ctx
        .directory
        .update_super_admin(
            auth.super_admin_id,
            SuperAdminUpdate {
                name: req.name,
                username: req.username,
                email: req.email,
                password: req.password,
            },
        )
        .await?;

    Ok(Json(super_admin))
}

/// Self-service super admin deletion
async fn delete_account(
    State(ctx): State<AppContext>,
    auth: SuperAdminAuthContext,
) -> PortalResult<Json<serde_json::Value>> {
    ctx.directory.delete_super_admin(auth.super_admin_id).await?;

    Ok(Json(serde_json::json!({})))
}

#[derive(Debug, Deserialize)]
pub struct ListAdminsQuery {
    /// all | approved | not-approved | enabled | disabled
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListAdminsResponse {
    admins: Vec<Admin>,
}

/// List admins, optionally filtered by moderation state
async fn list_admins(
    State(ctx): State<AppContext>,
    _auth: SuperAdminAuthContext,
    Query(query): Query<ListAdminsQuery>,
) -> PortalResult<Json<ListAdminsResponse>> {
    let filter = match query.state.as_deref() {
        Some(state) => AdminFilter::from_str(state)?,
        None => AdminFilter::All,
    };

    let admins = ctx.directory.list_admins(filter).await?;

    Ok(Json(ListAdminsResponse { admins }))
}

/// Get a single admin
async fn get_admin(
    State(ctx): State<AppContext>,
    _auth: SuperAdminAuthContext,
    Path(id): Path<i64>,
) -> PortalResult<Json<Admin>> {
    let admin = ctx
        .directory
        .find_admin(id)
        .await?
        .ok_or(PortalError::AdminNotFound(id))?;

    Ok(Json(admin))
}

/// Delete an admin
async fn delete_admin(
    State(ctx): State<AppContext>,
    _auth: SuperAdminAuthContext,
    Path(id): Path<i64>,
) -> PortalResult<Json<serde_json::Value>> {
    ctx.directory.delete_admin(id).await?;

    Ok(Json(serde_json::json!({})))
}

#[derive(Debug, Serialize)]
struct ApproveAdminResponse {
    admin: Admin,
    /// False when the approval email could not be delivered; the
    /// approval itself has already taken effect
    notification_sent: bool,
}

/// Approve an admin registration
async fn approve_admin(
    State(ctx): State<AppContext>,
    _auth: SuperAdminAuthContext,
    Path(id): Path<i64>,
) -> PortalResult<Json<ApproveAdminResponse>> {
    let approval = ctx.engine.approve_admin(id).await?;

    Ok(Json(ApproveAdminResponse {
        admin: approval.admin,
        notification_sent: approval.notification_sent,
    }))
}

/// Disable an admin. One-way; there is no re-enable endpoint.
async fn disable_admin(
    State(ctx): State<AppContext>,
    _auth: SuperAdminAuthContext,
    Path(id): Path<i64>,
) -> PortalResult<Json<Admin>> {
    let admin = ctx.engine.disable_admin(id).await?;

    Ok(Json(admin))
}

#[derive(Debug, Serialize)]
struct PendingPostsResponse {
    pending_posts: Vec<PendingPost>,
}

/// List all drafts awaiting a decision
async fn list_pending_posts(
    State(ctx): State<AppContext>,
    _auth: SuperAdminAuthContext,
) -> PortalResult<Json<PendingPostsResponse>> {
    let pending_posts = ctx.engine.pending_posts().await?;

    Ok(Json(PendingPostsResponse { pending_posts }))
}

/// Get a single pending post
async fn get_pending_post(
    State(ctx): State<AppContext>,
    _auth: SuperAdminAuthContext,
    Path(id): Path<i64>,
) -> PortalResult<Json<PendingPost>> {
    let pending = ctx
        .queue
        .get(id)
        .await?
        .ok_or(PortalError::PendingPostNotFound(id))?;

    Ok(Json(pending))
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub approved: bool,
}

/// Approve or reject a pending post
async fn decide_pending_post(
    State(ctx): State<AppContext>,
    _auth: SuperAdminAuthContext,
    Path(id): Path<i64>,
    Json(req): Json<DecisionRequest>,
) -> PortalResult<Json<Decision>> {
    let decision = ctx.engine.decide(id, req.approved).await?;

    Ok(Json(decision))
}
