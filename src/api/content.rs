/// Public browse endpoints for published listings
use crate::{
    content::{Internship, Job},
    context::AppContext,
    error::{PortalError, PortalResult},
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

/// Build public content routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/jobs", get(list_jobs))
        .route("/api/jobs/:id", get(get_job))
        .route("/api/internships", get(list_internships))
        .route("/api/internships/:id", get(get_internship))
}

#[derive(Debug, Serialize)]
struct JobsResponse {
    jobs: Vec<Job>,
}

async fn list_jobs(State(ctx): State<AppContext>) -> PortalResult<Json<JobsResponse>> {
    let jobs = ctx.content.list_jobs().await?;

    Ok(Json(JobsResponse { jobs }))
}

async fn get_job(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> PortalResult<Json<Job>> {
    let job = ctx
        .content
        .get_job(id)
        .await?
        .ok_or(PortalError::JobNotFound(id))?;

    Ok(Json(job))
}

#[derive(Debug, Serialize)]
struct InternshipsResponse {
    internships: Vec<Internship>,
}

async fn list_internships(
    State(ctx): State<AppContext>,
) -> PortalResult<Json<InternshipsResponse>> {
    let internships = ctx.content.list_internships().await?;

    Ok(Json(InternshipsResponse { internships }))
}

async fn get_internship(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> PortalResult<Json<Internship>> {
    let internship = ctx
        .content
        .get_internship(id)
        .await?
        .ok_or(PortalError::InternshipNotFound(id))?;

    Ok(Json(internship))
}
