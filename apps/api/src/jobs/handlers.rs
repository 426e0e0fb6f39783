use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::auth::{roles, AuthUser};
use crate::errors::{parse_id, AppError};
use crate::jobs::apply::apply;
use crate::jobs::listing::{self, JobListPage, JobPagination, ListJobsParams};
use crate::models::application::Application;
use crate::models::job::{JobLocation, JobPosting, JobStatus, SoftDelete};
use crate::models::job_seeker::JobSeekerProfile;
use crate::pagination::{PageParams, PageRequest, Pagination};
use crate::state::AppState;

fn salary_range(min: i64, max: i64) -> Result<(), ValidationError> {
    if min > max {
        return Err(ValidationError::new("salary_range")
            .with_message("min_salary must not exceed max_salary".into()));
    }
    Ok(())
}

fn validate_create_salary(req: &CreateJobRequest) -> Result<(), ValidationError> {
    salary_range(req.min_salary, req.max_salary)
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_create_salary"))]
pub struct CreateJobRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(rename = "companyId")]
    pub company_id: Uuid,
    pub location: JobLocation,
    #[serde(default)]
    pub requirement: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(rename = "applicationDeadline")]
    pub application_deadline: DateTime<Utc>,
    #[validate(range(min = 0))]
    pub min_salary: i64,
    #[validate(range(min = 0))]
    pub max_salary: i64,
    #[validate(range(min = 1))]
    pub openings: i32,
}

/// Partial update of the descriptive fields. Counters, applicants, status and the
/// delete flag are not writable here.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateJobRequest {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub location: Option<JobLocation>,
    pub requirement: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    #[serde(rename = "applicationDeadline")]
    pub application_deadline: Option<DateTime<Utc>>,
    #[validate(range(min = 0))]
    pub min_salary: Option<i64>,
    #[validate(range(min = 0))]
    pub max_salary: Option<i64>,
    #[validate(range(min = 1))]
    pub openings: Option<i32>,
}

impl UpdateJobRequest {
    fn apply_to(self, job: &mut JobPosting) -> Result<(), AppError> {
        if let Some(title) = self.title {
            job.title = title;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(location) = self.location {
            job.location = location;
        }
        if let Some(requirement) = self.requirement {
            job.requirement = requirement;
        }
        if let Some(skills) = self.skills {
            job.skills = skills;
        }
        if let Some(deadline) = self.application_deadline {
            job.application_deadline = deadline;
        }
        if let Some(min) = self.min_salary {
            job.min_salary = min;
        }
        if let Some(max) = self.max_salary {
            job.max_salary = max;
        }
        if let Some(openings) = self.openings {
            job.openings = openings;
        }
        if !job.salary_range_is_valid() {
            return Err(AppError::Validation(
                "min_salary must not exceed max_salary".to_string(),
            ));
        }
        job.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct JobEnvelope {
    pub message: &'static str,
    pub job: JobPosting,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct JobPage {
    pub jobs: Vec<JobPosting>,
    pub pagination: JobPagination,
}

#[derive(Debug, Serialize)]
pub struct ApplicantsPage {
    pub applicants: Vec<JobSeekerProfile>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub message: &'static str,
    pub application: Application,
}

fn job_page(jobs: Vec<JobPosting>, total: i64, page: PageRequest) -> JobPage {
    JobPage {
        jobs,
        pagination: JobPagination {
            current_page: page.page,
            page_size: page.limit,
            total_pages: page.total_pages(total),
            total_jobs: total,
        },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Persistence
// ────────────────────────────────────────────────────────────────────────────

/// Postings that are soft-deleted read as missing.
async fn live_job(state: &AppState, id: Uuid) -> Result<JobPosting, AppError> {
    state
        .store
        .find_job(id)
        .await?
        .filter(|job| !job.is_deleted())
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
}

fn require_creator_or_admin(auth: &AuthUser, job: &JobPosting) -> Result<(), AppError> {
    auth.require(roles::RECRUITER_OR_ADMIN)?;
    auth.require_owner_or_admin(job.created_by)
}

async fn insert_job(db: &PgPool, job: &JobPosting) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO jobs
            (id, created_by, title, description, company_id, posted_date, city, state, country,
             work_mode, requirement, skills, application_deadline, min_salary, max_salary,
             openings, applicants, status, applicants_list, is_delete, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18,
                $19, $20, $21, $22)
        "#,
    )
    .bind(job.id)
    .bind(job.created_by)
    .bind(&job.title)
    .bind(&job.description)
    .bind(job.company_id)
    .bind(job.posted_date)
    .bind(&job.location.city)
    .bind(&job.location.state)
    .bind(&job.location.country)
    .bind(job.location.work_mode)
    .bind(&job.requirement)
    .bind(&job.skills)
    .bind(job.application_deadline)
    .bind(job.min_salary)
    .bind(job.max_salary)
    .bind(job.openings)
    .bind(job.applicants)
    .bind(job.status)
    .bind(&job.applicants_list)
    .bind(job.is_delete)
    .bind(job.created_at)
    .bind(job.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

async fn set_job_status(db: &PgPool, id: Uuid, status: JobStatus) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE jobs SET status = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(db)
        .await?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/job/create
pub async fn handle_create_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobEnvelope>), AppError> {
    auth.require(roles::RECRUITER_OR_ADMIN)?;
    req.validate()?;

    let company_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM companies WHERE id = $1)")
            .bind(req.company_id)
            .fetch_one(&state.db)
            .await?;
    if !company_exists {
        return Err(AppError::NotFound("Company not found".to_string()));
    }

    let now = Utc::now();
    let job = JobPosting {
        id: Uuid::new_v4(),
        created_by: auth.id,
        title: req.title,
        description: req.description,
        company_id: req.company_id,
        posted_date: now,
        location: req.location,
        requirement: req.requirement,
        skills: req.skills,
        application_deadline: req.application_deadline,
        min_salary: req.min_salary,
        max_salary: req.max_salary,
        openings: req.openings,
        applicants: 0,
        status: JobStatus::Open,
        applicants_list: Vec::new(),
        is_delete: SoftDelete::No,
        created_at: now,
        updated_at: now,
    };
    insert_job(&state.db, &job).await?;

    info!(job_id = %job.id, created_by = %auth.id, "Job posting created");
    Ok((
        StatusCode::CREATED,
        Json(JobEnvelope {
            message: "Job created successfully",
            job,
        }),
    ))
}

/// GET /api/job/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<JobEnvelope>, AppError> {
    auth.require(roles::ANY_ROLE)?;
    let job = live_job(&state, parse_id(&id)?).await?;
    Ok(Json(JobEnvelope {
        message: "Job found",
        job,
    }))
}

/// PUT /api/job/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<JobEnvelope>, AppError> {
    let id = parse_id(&id)?;
    req.validate()?;

    let mut job = live_job(&state, id).await?;
    require_creator_or_admin(&auth, &job)?;
    req.apply_to(&mut job)?;

    sqlx::query(
        r#"
        UPDATE jobs
        SET title = $2, description = $3, city = $4, state = $5, country = $6, work_mode = $7,
            requirement = $8, skills = $9, application_deadline = $10, min_salary = $11,
            max_salary = $12, openings = $13, updated_at = $14
        WHERE id = $1
        "#,
    )
    .bind(job.id)
    .bind(&job.title)
    .bind(&job.description)
    .bind(&job.location.city)
    .bind(&job.location.state)
    .bind(&job.location.country)
    .bind(job.location.work_mode)
    .bind(&job.requirement)
    .bind(&job.skills)
    .bind(job.application_deadline)
    .bind(job.min_salary)
    .bind(job.max_salary)
    .bind(job.openings)
    .bind(job.updated_at)
    .execute(&state.db)
    .await?;

    Ok(Json(JobEnvelope {
        message: "Job updated successfully",
        job,
    }))
}

/// POST /api/job/delete/:id
/// Soft delete: the posting stays stored with `isDelete = "Yes"`.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let job = live_job(&state, parse_id(&id)?).await?;
    require_creator_or_admin(&auth, &job)?;

    sqlx::query("UPDATE jobs SET is_delete = $2, updated_at = now() WHERE id = $1")
        .bind(job.id)
        .bind(SoftDelete::Yes)
        .execute(&state.db)
        .await?;

    info!(job_id = %job.id, "Job posting deleted");
    Ok(Json(MessageResponse {
        message: "Job deleted successfully",
    }))
}

/// POST /api/job/close/:id
pub async fn handle_close_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut job = live_job(&state, parse_id(&id)?).await?;
    require_creator_or_admin(&auth, &job)?;
    job.close()?;
    set_job_status(&state.db, job.id, job.status).await?;

    info!(job_id = %job.id, "Job closed");
    Ok(Json(MessageResponse {
        message: "Job closed successfully",
    }))
}

/// POST /api/job/reopen/:id
pub async fn handle_reopen_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut job = live_job(&state, parse_id(&id)?).await?;
    require_creator_or_admin(&auth, &job)?;
    job.reopen()?;
    set_job_status(&state.db, job.id, job.status).await?;

    info!(job_id = %job.id, "Job reopened");
    Ok(Json(MessageResponse {
        message: "Job reopened successfully",
    }))
}

/// GET /api/jobs/company/:id
pub async fn handle_jobs_by_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<JobPage>, AppError> {
    let company_id = parse_id(&id)?;
    let page = PageRequest::from_params(&params, state.config.page_limits())?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM jobs WHERE company_id = $1 AND is_delete = 'No'",
    )
    .bind(company_id)
    .fetch_one(&state.db)
    .await?;
    let jobs = sqlx::query_as::<_, JobPosting>(
        r#"
        SELECT * FROM jobs
        WHERE company_id = $1 AND is_delete = 'No'
        ORDER BY created_at DESC, id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(company_id)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(job_page(jobs, total, page)))
}

/// GET /api/jobs/user/:id
pub async fn handle_jobs_by_creator(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<JobPage>, AppError> {
    let creator = parse_id(&id)?;
    let page = PageRequest::from_params(&params, state.config.page_limits())?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM jobs WHERE created_by = $1 AND is_delete = 'No'",
    )
    .bind(creator)
    .fetch_one(&state.db)
    .await?;
    let jobs = sqlx::query_as::<_, JobPosting>(
        r#"
        SELECT * FROM jobs
        WHERE created_by = $1 AND is_delete = 'No'
        ORDER BY created_at DESC, id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(creator)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(job_page(jobs, total, page)))
}

/// GET /api/job/applied/user
pub async fn handle_applied_jobs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PageParams>,
) -> Result<Json<JobPage>, AppError> {
    auth.require(roles::ANY_ROLE)?;
    let page = PageRequest::from_params(&params, state.config.page_limits())?;
    let user = state
        .store
        .find_user(auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM jobs WHERE id = ANY($1) AND is_delete = 'No'",
    )
    .bind(&user.applied_jobs)
    .fetch_one(&state.db)
    .await?;
    let jobs = sqlx::query_as::<_, JobPosting>(
        r#"
        SELECT * FROM jobs
        WHERE id = ANY($1) AND is_delete = 'No'
        ORDER BY created_at DESC, id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(&user.applied_jobs)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(job_page(jobs, total, page)))
}

/// GET /api/job/:id/applicants
pub async fn handle_job_applicants(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<ApplicantsPage>, AppError> {
    let job = live_job(&state, parse_id(&id)?).await?;
    auth.require_owner_or_admin(job.created_by)?;
    let page = PageRequest::from_params(&params, state.config.page_limits())?;

    // Profiles deleted since applying drop out of both the count and the page.
    let (applicants, total) = state
        .store
        .list_profiles_among(&job.applicants_list, page)
        .await?;

    Ok(Json(ApplicantsPage {
        applicants,
        pagination: page.describe(total),
    }))
}

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListJobsParams>,
) -> Result<Json<JobListPage>, AppError> {
    let query = params.into_query(state.config.page_limits())?;
    let page = listing::list_jobs(state.store.as_ref(), auth.id, query).await?;
    Ok(Json(page))
}

/// GET /api/jobs/not-applied
pub async fn handle_list_not_applied(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListJobsParams>,
) -> Result<Json<JobListPage>, AppError> {
    let query = params.into_query(state.config.page_limits())?;
    let page = listing::list_not_applied(state.store.as_ref(), auth.id, query).await?;
    Ok(Json(page))
}

/// POST /api/job/apply/:job_id
pub async fn handle_apply(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job_id): Path<String>,
) -> Result<(StatusCode, Json<ApplyResponse>), AppError> {
    auth.require(roles::JOB_SEEKER)?;
    let application = apply(state.store.as_ref(), &job_id, auth.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplyResponse {
            message: "Application submitted successfully",
            application,
        }),
    ))
}
