use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{roles, AuthUser};
use crate::errors::{parse_id, AppError};
use crate::models::job_seeker::JobSeekerProfile;
use crate::pagination::{PageParams, PageRequest, Pagination};
use crate::profile::completeness::{score, ProfileField, ProfileStatus};
use crate::profile::validation::ProfileInput;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEnvelope {
    pub message: &'static str,
    pub job_seeker: JobSeekerProfile,
    pub profile_status: ProfileStatus,
}

impl ProfileEnvelope {
    fn new(message: &'static str, job_seeker: JobSeekerProfile) -> Self {
        let profile_status = score(&job_seeker);
        Self {
            message,
            job_seeker,
            profile_status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileList {
    pub job_seekers: Vec<JobSeekerProfile>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncompleteQuery {
    pub days_since_update: Option<i64>,
}

/// Reminder row for a profile that still misses essential fields.
#[derive(Debug, Serialize)]
pub struct IncompleteProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "missingEssentialFields")]
    pub missing_essential_fields: Vec<ProfileField>,
    #[serde(rename = "essentialCompletionPercentage")]
    pub essential_completion_percentage: f64,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncompleteProfiles {
    pub incomplete_profiles: Vec<IncompleteProfile>,
    pub count: usize,
}

const DEFAULT_DAYS_SINCE_UPDATE: i64 = 3;

// ────────────────────────────────────────────────────────────────────────────
// Persistence
// ────────────────────────────────────────────────────────────────────────────

async fn fetch_profile(db: &PgPool, id: Uuid) -> Result<JobSeekerProfile, AppError> {
    sqlx::query_as::<_, JobSeekerProfile>("SELECT * FROM job_seekers WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Job-seeker not found".to_string()))
}

async fn insert_profile(db: &PgPool, profile: &JobSeekerProfile) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO job_seekers
            (id, user_id, gender, dob, resume, photo, languages, work_experience, education,
             certifications, skills, years_of_experience, location, preferred_locations,
             expected_salary, availability_status, job_type, applied_jobs, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
        "#,
    )
    .bind(profile.id)
    .bind(profile.user_id)
    .bind(profile.gender)
    .bind(profile.dob)
    .bind(&profile.resume)
    .bind(&profile.photo)
    .bind(&profile.languages)
    .bind(&profile.work_experience)
    .bind(&profile.education)
    .bind(&profile.certifications)
    .bind(&profile.skills)
    .bind(profile.years_of_experience)
    .bind(&profile.location)
    .bind(&profile.preferred_locations)
    .bind(&profile.expected_salary)
    .bind(profile.availability_status)
    .bind(profile.job_type)
    .bind(&profile.applied_jobs)
    .bind(profile.created_at)
    .bind(profile.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

/// Writes the editable columns. `applied_jobs` belongs to the apply workflow and is left alone.
async fn update_profile(db: &PgPool, profile: &JobSeekerProfile) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE job_seekers
        SET gender = $2, dob = $3, resume = $4, photo = $5, languages = $6,
            work_experience = $7, education = $8, certifications = $9, skills = $10,
            years_of_experience = $11, location = $12, preferred_locations = $13,
            expected_salary = $14, availability_status = $15, job_type = $16, updated_at = $17
        WHERE id = $1
        "#,
    )
    .bind(profile.id)
    .bind(profile.gender)
    .bind(profile.dob)
    .bind(&profile.resume)
    .bind(&profile.photo)
    .bind(&profile.languages)
    .bind(&profile.work_experience)
    .bind(&profile.education)
    .bind(&profile.certifications)
    .bind(&profile.skills)
    .bind(profile.years_of_experience)
    .bind(&profile.location)
    .bind(&profile.preferred_locations)
    .bind(&profile.expected_salary)
    .bind(profile.availability_status)
    .bind(profile.job_type)
    .bind(profile.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/job-seeker/create
/// The profile always belongs to the caller; partial data is fine.
pub async fn handle_create_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ProfileInput>,
) -> Result<(StatusCode, Json<ProfileEnvelope>), AppError> {
    auth.require(roles::JOB_SEEKER)?;
    input.validate()?;

    if state.store.find_profile_by_user(auth.id).await?.is_some() {
        return Err(AppError::Conflict(
            "A job seeker profile already exists for this user".to_string(),
        ));
    }

    let mut profile = JobSeekerProfile::empty(auth.id);
    input.apply_to(&mut profile);
    insert_profile(&state.db, &profile).await.map_err(|e| {
        AppError::on_unique_violation(e, "A job seeker profile already exists for this user")
    })?;

    info!(profile_id = %profile.id, user_id = %auth.id, "Job-seeker profile created");
    Ok((
        StatusCode::CREATED,
        Json(ProfileEnvelope::new(
            "Job-seeker profile created successfully",
            profile,
        )),
    ))
}

/// GET /api/job-seeker/me
pub async fn handle_get_my_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfileEnvelope>, AppError> {
    auth.require(roles::JOB_SEEKER)?;
    let profile = state
        .store
        .find_profile_by_user(auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job-seeker not found".to_string()))?;
    Ok(Json(ProfileEnvelope::new("Job-seeker found", profile)))
}

/// GET /api/job-seeker/check-status/:id
pub async fn handle_check_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ProfileStatus>, AppError> {
    auth.require(roles::JOB_SEEKER)?;
    let profile = fetch_profile(&state.db, parse_id(&id)?).await?;
    Ok(Json(score(&profile)))
}

/// GET /api/job-seeker/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ProfileEnvelope>, AppError> {
    auth.require(roles::ANY_ROLE)?;
    let profile = fetch_profile(&state.db, parse_id(&id)?).await?;
    Ok(Json(ProfileEnvelope::new("Job-seeker found", profile)))
}

/// PUT /api/job-seeker/:id
pub async fn handle_update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<ProfileEnvelope>, AppError> {
    let id = parse_id(&id)?;
    input.validate()?;

    let mut profile = fetch_profile(&state.db, id).await?;
    auth.require_owner_or_admin(profile.user_id)?;

    input.apply_to(&mut profile);
    update_profile(&state.db, &profile).await?;

    Ok(Json(ProfileEnvelope::new(
        "Job-seeker updated successfully",
        profile,
    )))
}

/// POST /api/job-seeker/:id/delete
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let profile = fetch_profile(&state.db, parse_id(&id)?).await?;
    auth.require_owner_or_admin(profile.user_id)?;

    sqlx::query("DELETE FROM job_seekers WHERE id = $1")
        .bind(profile.id)
        .execute(&state.db)
        .await?;

    info!(profile_id = %profile.id, "Job-seeker profile deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/job-seekers
pub async fn handle_list_profiles(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PageParams>,
) -> Result<Json<ProfileList>, AppError> {
    auth.require(roles::RECRUITER_OR_ADMIN)?;
    let page = PageRequest::from_params(&params, state.config.page_limits())?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM job_seekers")
        .fetch_one(&state.db)
        .await?;
    let job_seekers = sqlx::query_as::<_, JobSeekerProfile>(
        "SELECT * FROM job_seekers ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
    )
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ProfileList {
        job_seekers,
        pagination: page.describe(total),
    }))
}

/// GET /api/job-seekers/incomplete?daysSinceUpdate=N
/// Profiles untouched for N days that still miss essential fields.
pub async fn handle_incomplete_profiles(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<IncompleteQuery>,
) -> Result<Json<IncompleteProfiles>, AppError> {
    auth.require(roles::ADMIN)?;
    let days = query.days_since_update.unwrap_or(DEFAULT_DAYS_SINCE_UPDATE);
    let cutoff = stale_cutoff(Utc::now(), days)?;

    let stale = sqlx::query_as::<_, JobSeekerProfile>(
        "SELECT * FROM job_seekers WHERE updated_at < $1 ORDER BY updated_at",
    )
    .bind(cutoff)
    .fetch_all(&state.db)
    .await?;

    let incomplete_profiles = incomplete_only(stale);
    Ok(Json(IncompleteProfiles {
        count: incomplete_profiles.len(),
        incomplete_profiles,
    }))
}

/// Profiles last updated before this instant count as stale.
fn stale_cutoff(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, AppError> {
    if days < 0 {
        return Err(AppError::Validation(
            "daysSinceUpdate must not be negative".to_string(),
        ));
    }
    Duration::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or_else(|| AppError::Validation("daysSinceUpdate is out of range".to_string()))
}

fn incomplete_only(profiles: Vec<JobSeekerProfile>) -> Vec<IncompleteProfile> {
    profiles
        .into_iter()
        .filter_map(|profile| {
            let status = score(&profile);
            if status.is_profile_complete {
                return None;
            }
            Some(IncompleteProfile {
                id: profile.id,
                user_id: profile.user_id,
                created_at: profile.created_at,
                updated_at: profile.updated_at,
                missing_essential_fields: status.missing_essential_fields,
                essential_completion_percentage: status.essential_completion_percentage,
                recommendations: status.recommendations,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::completeness::fixtures::essential_profile;

    #[test]
    fn test_stale_cutoff_bounds() {
        let now = Utc::now();
        assert_eq!(stale_cutoff(now, 3).unwrap(), now - Duration::days(3));
        assert_eq!(stale_cutoff(now, 0).unwrap(), now);
        assert!(matches!(stale_cutoff(now, -1), Err(AppError::Validation(_))));
        assert!(matches!(
            stale_cutoff(now, i64::MAX),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            stale_cutoff(now, 1_000_000_000),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_incomplete_only_keeps_profiles_missing_essentials() {
        let complete = essential_profile(Uuid::new_v4());
        let mut partial = essential_profile(Uuid::new_v4());
        partial.resume = None;

        let rows = incomplete_only(vec![complete, partial.clone()]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, partial.id);
        assert_eq!(rows[0].missing_essential_fields, vec![ProfileField::Resume]);
        assert_eq!(rows[0].essential_completion_percentage, 80.0);
    }

    #[test]
    fn test_envelope_carries_shared_status() {
        let envelope = ProfileEnvelope::new("ok", essential_profile(Uuid::new_v4()));
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["profileStatus"]["profileStatus"], "Essential Complete");
        assert_eq!(json["jobSeeker"]["skills"][0], "a");
    }
}
