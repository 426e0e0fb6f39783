use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
pub enum JobStatus {
    Open,
    Closed,
}

/// Soft-delete marker. Deleted postings stay in storage with `Yes`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "soft_delete")]
pub enum SoftDelete {
    #[default]
    No,
    Yes,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "work_mode", rename_all = "lowercase")]
pub enum WorkMode {
    Remote,
    Onsite,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct JobLocation {
    pub city: String,
    pub state: String,
    pub country: String,
    #[serde(rename = "jobType")]
    pub work_mode: WorkMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPosting {
    pub id: Uuid,
    #[serde(rename = "createdBy")]
    pub created_by: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "companyId")]
    pub company_id: Uuid,
    #[serde(rename = "postedDate")]
    pub posted_date: DateTime<Utc>,
    #[sqlx(flatten)]
    pub location: JobLocation,
    pub requirement: Vec<String>,
    pub skills: Vec<String>,
    #[serde(rename = "applicationDeadline")]
    pub application_deadline: DateTime<Utc>,
    pub min_salary: i64,
    pub max_salary: i64,
    pub openings: i32,
    /// Always equal to `applicants_list.len()`.
    pub applicants: i32,
    pub status: JobStatus,
    /// Job-seeker profile ids, in application order.
    pub applicants_list: Vec<Uuid>,
    #[serde(rename = "isDelete")]
    pub is_delete: SoftDelete,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl JobPosting {
    pub fn is_deleted(&self) -> bool {
        self.is_delete == SoftDelete::Yes
    }

    pub fn is_closed(&self) -> bool {
        self.status == JobStatus::Closed
    }

    pub fn close(&mut self) -> Result<(), AppError> {
        if self.is_closed() {
            return Err(AppError::Conflict("Job is already closed".to_string()));
        }
        self.status = JobStatus::Closed;
        Ok(())
    }

    pub fn reopen(&mut self) -> Result<(), AppError> {
        if !self.is_closed() {
            return Err(AppError::Conflict("Job is already open".to_string()));
        }
        self.status = JobStatus::Open;
        Ok(())
    }

    /// Appends an applicant and bumps the counter in one step so the two never drift.
    pub fn record_applicant(&mut self, seeker_profile_id: Uuid) {
        self.applicants_list.push(seeker_profile_id);
        self.applicants += 1;
    }

    pub fn salary_range_is_valid(&self) -> bool {
        self.min_salary >= 0 && self.max_salary >= 0 && self.min_salary <= self.max_salary
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::job_posting;
    use super::*;

    #[test]
    fn test_close_then_reopen() {
        let mut job = job_posting("Backend Engineer");
        job.close().unwrap();
        assert!(job.is_closed());
        assert!(matches!(job.close(), Err(AppError::Conflict(_))));
        job.reopen().unwrap();
        assert_eq!(job.status, JobStatus::Open);
        assert!(matches!(job.reopen(), Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_record_applicant_keeps_counter_in_sync() {
        let mut job = job_posting("Backend Engineer");
        job.record_applicant(Uuid::new_v4());
        job.record_applicant(Uuid::new_v4());
        assert_eq!(job.applicants, 2);
        assert_eq!(job.applicants_list.len(), 2);
    }

    #[test]
    fn test_soft_delete_serializes_as_yes_no() {
        let mut job = job_posting("Backend Engineer");
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["isDelete"], "No");
        assert_eq!(json["location"]["jobType"], "onsite");
        job.is_delete = SoftDelete::Yes;
        assert!(job.is_deleted());
    }
}
