use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{roles, AuthUser};
use crate::errors::{parse_id, AppError};
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::JobPosting;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
}

async fn fetch_application(state: &AppState, id: Uuid) -> Result<Application, AppError> {
    sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))
}

async fn fetch_job(state: &AppState, id: Uuid) -> Result<JobPosting, AppError> {
    state
        .store
        .find_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
}

/// GET /api/application/:id
/// Visible to the applicant, the posting's creator and admins.
pub async fn handle_get_application(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Application>, AppError> {
    let application = fetch_application(&state, parse_id(&id)?).await?;
    if auth.id != application.user_id && !auth.is_admin() {
        let job = fetch_job(&state, application.job_id).await?;
        auth.require_owner_or_admin(job.created_by)?;
    }
    Ok(Json(application))
}

/// GET /api/application/job/:job_id
pub async fn handle_job_applications(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job_id): Path<String>,
) -> Result<Json<Vec<Application>>, AppError> {
    auth.require(roles::RECRUITER_OR_ADMIN)?;
    let job = fetch_job(&state, parse_id(&job_id)?).await?;
    auth.require_owner_or_admin(job.created_by)?;

    let applications = sqlx::query_as::<_, Application>(
        "SELECT * FROM applications WHERE job_id = $1 ORDER BY application_date DESC, id",
    )
    .bind(job.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(applications))
}

/// PUT /api/application/:id/status
/// Applicant counters on the posting are left as they are.
pub async fn handle_update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Application>, AppError> {
    auth.require(roles::RECRUITER_OR_ADMIN)?;
    let mut application = fetch_application(&state, parse_id(&id)?).await?;
    let job = fetch_job(&state, application.job_id).await?;
    auth.require_owner_or_admin(job.created_by)?;

    let previous = application.status;
    application.review(update.status)?;
    // Only applies if nobody reviewed it in between.
    let updated = sqlx::query("UPDATE applications SET status = $2 WHERE id = $1 AND status = $3")
        .bind(application.id)
        .bind(application.status)
        .bind(previous)
        .execute(&state.db)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::Conflict(
            "Application was reviewed concurrently".to_string(),
        ));
    }

    info!(
        application_id = %application.id,
        status = application.status.as_str(),
        "Application reviewed"
    );
    Ok(Json(application))
}
