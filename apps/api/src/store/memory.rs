use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{ApplicationCommit, JobBoardStore, StoreError};
use crate::jobs::listing::JobQuery;
use crate::models::admin::Admin;
use crate::models::application::Application;
use crate::models::job::JobPosting;
use crate::models::job_seeker::JobSeekerProfile;
use crate::models::user::User;
use crate::pagination::PageRequest;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    admins: HashMap<Uuid, Admin>,
    jobs: HashMap<Uuid, JobPosting>,
    profiles: HashMap<Uuid, JobSeekerProfile>,
    applications: Vec<Application>,
}

/// In-memory store for tests. One mutex guards every table, so a commit is atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn insert_user(&self, user: User) {
        self.tables().users.insert(user.id, user);
    }

    pub fn insert_admin(&self, admin: Admin) {
        self.tables().admins.insert(admin.id, admin);
    }

    pub fn insert_job(&self, job: JobPosting) {
        self.tables().jobs.insert(job.id, job);
    }

    pub fn insert_profile(&self, profile: JobSeekerProfile) {
        self.tables().profiles.insert(profile.id, profile);
    }

    pub fn job(&self, id: Uuid) -> Option<JobPosting> {
        self.tables().jobs.get(&id).cloned()
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        self.tables().users.get(&id).cloned()
    }

    pub fn profile(&self, id: Uuid) -> Option<JobSeekerProfile> {
        self.tables().profiles.get(&id).cloned()
    }

    pub fn applications_for(&self, job_id: Uuid, user_id: Uuid) -> usize {
        self.tables()
            .applications
            .iter()
            .filter(|a| a.job_id == job_id && a.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl JobBoardStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.user(id))
    }

    async fn find_admin(&self, id: Uuid) -> Result<Option<Admin>, StoreError> {
        Ok(self.tables().admins.get(&id).cloned())
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError> {
        Ok(self.job(id))
    }

    async fn find_profile_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<JobSeekerProfile>, StoreError> {
        Ok(self
            .tables()
            .profiles
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn find_application(
        &self,
        job_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Application>, StoreError> {
        Ok(self
            .tables()
            .applications
            .iter()
            .find(|a| a.job_id == job_id && a.user_id == user_id)
            .cloned())
    }

    async fn record_application(&self, commit: &ApplicationCommit) -> Result<(), StoreError> {
        let application = &commit.application;
        let mut tables = self.tables();

        if tables
            .applications
            .iter()
            .any(|a| a.job_id == application.job_id && a.user_id == application.user_id)
        {
            return Err(StoreError::Duplicate("application"));
        }
        if !tables.jobs.contains_key(&application.job_id) {
            return Err(StoreError::Missing("job"));
        }
        if !tables.profiles.contains_key(&commit.profile_id) {
            return Err(StoreError::Missing("job-seeker profile"));
        }

        tables.applications.push(application.clone());
        if let Some(job) = tables.jobs.get_mut(&application.job_id) {
            job.record_applicant(commit.profile_id);
        }
        if let Some(profile) = tables.profiles.get_mut(&commit.profile_id) {
            profile.applied_jobs.push(application.job_id);
        }
        if let Some(user) = tables.users.get_mut(&application.user_id) {
            user.applied_jobs.push(application.job_id);
        }
        Ok(())
    }

    async fn list_profiles_among(
        &self,
        ids: &[Uuid],
        page: PageRequest,
    ) -> Result<(Vec<JobSeekerProfile>, i64), StoreError> {
        let tables = self.tables();
        let mut found: Vec<JobSeekerProfile> = tables
            .profiles
            .values()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        let total = found.len() as i64;
        let profiles = found
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok((profiles, total))
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<(Vec<JobPosting>, i64), StoreError> {
        let tables = self.tables();
        let mut matched: Vec<JobPosting> = tables
            .jobs
            .values()
            .filter(|job| query.matches(job))
            .cloned()
            .collect();
        matched.sort_by(|a, b| query.sort.compare(a, b).then_with(|| a.id.cmp(&b.id)));

        let total = matched.len() as i64;
        let jobs = matched
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit as usize)
            .collect();
        Ok((jobs, total))
    }
}
