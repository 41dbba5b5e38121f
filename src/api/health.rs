/// Health and metrics endpoints
use crate::{context::AppContext, db, metrics};
use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;

/// Build health routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
}

/// Health check handler; verifies database connectivity
async fn health_check(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    let database = match db::test_connection(&ctx.db).await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::error!("Health check database probe failed: {}", e);
            "unavailable"
        }
    };

    Json(json!({
        "status": if database == "ok" { "ok" } else { "degraded" },
        "database": database,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Prometheus text-format metrics
async fn metrics_endpoint() -> String {
    metrics::gather()
}
