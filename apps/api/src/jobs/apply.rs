use chrono::Utc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::Application;
use crate::profile::completeness::{self, ProfileStatus};
use crate::store::{ApplicationCommit, JobBoardStore, StoreError};

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("invalid job id '{0}'")]
    InvalidInput(String),

    #[error("job not found")]
    JobNotFound,

    #[error("job-seeker profile not found")]
    ProfileNotFound,

    #[error("job applications are closed")]
    JobClosed,

    #[error("already applied to this job")]
    AlreadyApplied,

    #[error("profile incomplete")]
    ProfileIncomplete(Box<ProfileStatus>),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ApplyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => ApplyError::AlreadyApplied,
            other => ApplyError::Store(other),
        }
    }
}

impl From<ApplyError> for AppError {
    fn from(err: ApplyError) -> Self {
        match err {
            ApplyError::InvalidInput(_) => AppError::Validation("Invalid ID format".to_string()),
            ApplyError::JobNotFound => AppError::NotFound("Job not found".to_string()),
            ApplyError::ProfileNotFound => {
                AppError::NotFound("Job-seeker profile not found".to_string())
            }
            ApplyError::JobClosed => {
                AppError::Conflict("Job applications are closed".to_string())
            }
            ApplyError::AlreadyApplied => {
                AppError::Conflict("You have already applied for this job".to_string())
            }
            ApplyError::ProfileIncomplete(status) => AppError::ProfileIncomplete(status),
            ApplyError::Store(e) => e.into(),
        }
    }
}

/// Applies the job seeker identified by `seeker_user_id` to the posting `job_id`.
///
/// Checks run in a fixed order and the first failure wins. On success the application,
/// the posting's applicant counter and list, the profile's and the user's applied sets
/// are committed together.
pub async fn apply(
    store: &dyn JobBoardStore,
    job_id: &str,
    seeker_user_id: Uuid,
) -> Result<Application, ApplyError> {
    let job_id =
        Uuid::parse_str(job_id).map_err(|_| ApplyError::InvalidInput(job_id.to_string()))?;

    let job = store
        .find_job(job_id)
        .await?
        .filter(|job| !job.is_deleted())
        .ok_or(ApplyError::JobNotFound)?;
    let profile = store
        .find_profile_by_user(seeker_user_id)
        .await?
        .ok_or(ApplyError::ProfileNotFound)?;

    if job.is_closed() {
        return Err(ApplyError::JobClosed);
    }
    if store.find_application(job_id, seeker_user_id).await?.is_some() {
        return Err(ApplyError::AlreadyApplied);
    }

    let status = completeness::score(&profile);
    if !status.can_apply() {
        return Err(ApplyError::ProfileIncomplete(Box::new(status)));
    }

    let application = Application::submitted(job_id, seeker_user_id, Utc::now());
    store
        .record_application(&ApplicationCommit {
            application: application.clone(),
            profile_id: profile.id,
        })
        .await?;

    info!(
        job_id = %job_id,
        user_id = %seeker_user_id,
        application_id = %application.id,
        "Application recorded"
    );
    Ok(application)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::ApplicationStatus;
    use crate::models::job::fixtures::job_posting;
    use crate::models::job::{JobPosting, JobStatus, SoftDelete};
    use crate::models::job_seeker::JobSeekerProfile;
    use crate::models::user::{fixtures::user, Role, User};
    use crate::profile::completeness::fixtures::essential_profile;
    use crate::profile::completeness::ProfileField;
    use crate::store::memory::MemoryStore;

    struct World {
        store: MemoryStore,
        job: JobPosting,
        seeker: User,
        profile: JobSeekerProfile,
    }

    fn world() -> World {
        let store = MemoryStore::new();
        let job = job_posting("Platform Engineer");
        let seeker = user(Role::JobSeeker);
        let profile = essential_profile(seeker.id);
        store.insert_job(job.clone());
        store.insert_user(seeker.clone());
        store.insert_profile(profile.clone());
        World {
            store,
            job,
            seeker,
            profile,
        }
    }

    #[tokio::test]
    async fn test_successful_apply_updates_every_side() {
        let w = world();
        let application = apply(&w.store, &w.job.id.to_string(), w.seeker.id)
            .await
            .unwrap();

        assert_eq!(application.status, ApplicationStatus::Submitted);
        assert_eq!(application.job_id, w.job.id);
        assert_eq!(application.user_id, w.seeker.id);

        let job = w.store.job(w.job.id).unwrap();
        assert_eq!(job.applicants, 1);
        assert_eq!(job.applicants_list, vec![w.profile.id]);
        assert!(w.store.user(w.seeker.id).unwrap().has_applied(w.job.id));
        assert_eq!(
            w.store.profile(w.profile.id).unwrap().applied_jobs,
            vec![w.job.id]
        );
        assert_eq!(w.store.applications_for(w.job.id, w.seeker.id), 1);
    }

    #[tokio::test]
    async fn test_second_apply_conflicts() {
        let w = world();
        let job_id = w.job.id.to_string();
        apply(&w.store, &job_id, w.seeker.id).await.unwrap();

        let second = apply(&w.store, &job_id, w.seeker.id).await;
        assert!(matches!(second, Err(ApplyError::AlreadyApplied)));
        assert_eq!(w.store.applications_for(w.job.id, w.seeker.id), 1);
        assert_eq!(w.store.job(w.job.id).unwrap().applicants, 1);
    }

    #[tokio::test]
    async fn test_lost_race_surfaces_as_already_applied() {
        let w = world();
        let commit = ApplicationCommit {
            application: Application::submitted(w.job.id, w.seeker.id, Utc::now()),
            profile_id: w.profile.id,
        };
        w.store.record_application(&commit).await.unwrap();

        let err: ApplyError = w.store.record_application(&commit).await.unwrap_err().into();
        assert!(matches!(err, ApplyError::AlreadyApplied));
    }

    #[tokio::test]
    async fn test_closed_job_conflicts_without_side_effects() {
        let w = world();
        let mut job = w.job.clone();
        job.status = JobStatus::Closed;
        w.store.insert_job(job);

        let result = apply(&w.store, &w.job.id.to_string(), w.seeker.id).await;
        assert!(matches!(result, Err(ApplyError::JobClosed)));
        assert_eq!(w.store.job(w.job.id).unwrap().applicants, 0);
        assert_eq!(w.store.applications_for(w.job.id, w.seeker.id), 0);
    }

    #[tokio::test]
    async fn test_sixty_percent_profile_is_refused_with_missing_fields() {
        let w = world();
        let mut profile = w.profile.clone();
        profile.photo = None;
        profile.job_type = None;
        w.store.insert_profile(profile);

        match apply(&w.store, &w.job.id.to_string(), w.seeker.id).await {
            Err(ApplyError::ProfileIncomplete(status)) => {
                assert_eq!(status.essential_completion_percentage, 60.0);
                assert_eq!(
                    status.missing_essential_fields,
                    vec![ProfileField::Photo, ProfileField::JobType]
                );
            }
            other => panic!("expected ProfileIncomplete, got {other:?}"),
        }
        assert_eq!(w.store.applications_for(w.job.id, w.seeker.id), 0);
    }

    #[tokio::test]
    async fn test_eighty_percent_profile_may_apply() {
        let w = world();
        let mut profile = w.profile.clone();
        profile.photo = None;
        w.store.insert_profile(profile);

        assert!(apply(&w.store, &w.job.id.to_string(), w.seeker.id)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_precondition_order() {
        let w = world();
        assert!(matches!(
            apply(&w.store, "not-a-uuid", w.seeker.id).await,
            Err(ApplyError::InvalidInput(_))
        ));
        assert!(matches!(
            apply(&w.store, &Uuid::new_v4().to_string(), Uuid::new_v4()).await,
            Err(ApplyError::JobNotFound)
        ));
        // The missing profile is reported before the closed job.
        let mut job = w.job.clone();
        job.status = JobStatus::Closed;
        w.store.insert_job(job);
        assert!(matches!(
            apply(&w.store, &w.job.id.to_string(), Uuid::new_v4()).await,
            Err(ApplyError::ProfileNotFound)
        ));
    }

    #[tokio::test]
    async fn test_soft_deleted_job_is_not_found() {
        let w = world();
        let mut job = w.job.clone();
        job.is_delete = SoftDelete::Yes;
        w.store.insert_job(job);
        assert!(matches!(
            apply(&w.store, &w.job.id.to_string(), w.seeker.id).await,
            Err(ApplyError::JobNotFound)
        ));
    }

    #[test]
    fn test_errors_map_to_http_kinds() {
        assert!(matches!(
            AppError::from(ApplyError::AlreadyApplied),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(ApplyError::JobClosed),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(ApplyError::InvalidInput("x".into())),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(ApplyError::ProfileNotFound),
            AppError::NotFound(_)
        ));
    }
}
