/// HTTP API
///
/// Thin axum handlers over the directory, content store and moderation
/// engine. Routing only; all state transitions live in the managers.

pub mod admin;
pub mod content;
pub mod health;
pub mod super_admin;

use crate::context::AppContext;
use axum::Router;

/// Build all API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(admin::routes())
        .merge(super_admin::routes())
        .merge(content::routes())
        .merge(health::routes())
}
