pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::listing::JobQuery;
use crate::models::admin::Admin;
use crate::models::application::Application;
use crate::models::job::JobPosting;
use crate::models::job_seeker::JobSeekerProfile;
use crate::models::user::User;
use crate::pagination::PageRequest;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Duplicate(&'static str),

    #[error("{0} disappeared during the write")]
    Missing(&'static str),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(what) => AppError::Conflict(format!("{what} already exists")),
            StoreError::Missing(what) => AppError::NotFound(format!("{what} not found")),
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

/// Everything one successful apply writes. Stores commit it all or nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationCommit {
    pub application: Application,
    /// Job-seeker profile appended to the posting's `applicants_list`.
    pub profile_id: Uuid,
}

/// Reads and writes performed by the access gate, the apply workflow and the listing query.
#[async_trait]
pub trait JobBoardStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_admin(&self, id: Uuid) -> Result<Option<Admin>, StoreError>;

    async fn find_job(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError>;

    async fn find_profile_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<JobSeekerProfile>, StoreError>;

    async fn find_application(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Application>, StoreError>;

    /// Inserts the application and updates the posting, the profile and the user.
    /// A second application for the same `(job_id, user_id)` yields `Duplicate`.
    async fn record_application(&self, commit: &ApplicationCommit) -> Result<(), StoreError>;

    /// One page of the existing profiles among `ids`, oldest first, plus how many exist.
    async fn list_profiles_among(
        &self,
        ids: &[Uuid],
        page: PageRequest,
    ) -> Result<(Vec<JobSeekerProfile>, i64), StoreError>;

    /// One page of postings matching `query`, plus the total match count.
    async fn list_jobs(&self, query: &JobQuery) -> Result<(Vec<JobPosting>, i64), StoreError>;
}
