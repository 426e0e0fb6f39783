use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
pub enum ApplicationStatus {
    Submitted,
    Reject,
    Shortlist,
    Hired,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Reject => "reject",
            ApplicationStatus::Shortlist => "shortlist",
            ApplicationStatus::Hired => "hired",
        }
    }

    /// `hired` and `reject` close the application for further review.
    pub fn is_final(&self) -> bool {
        matches!(self, ApplicationStatus::Hired | ApplicationStatus::Reject)
    }
}

/// A job-seeker's application to one posting. `(job_id, user_id)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub application_date: DateTime<Utc>,
    pub status: ApplicationStatus,
}

impl Application {
    pub fn submitted(job_id: Uuid, user_id: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            job_id,
            application_date: at,
            status: ApplicationStatus::Submitted,
        }
    }

    /// Moves a reviewed application to `target`. Final applications no longer move and
    /// nothing moves back to `submitted`.
    pub fn review(&mut self, target: ApplicationStatus) -> Result<(), AppError> {
        if target == ApplicationStatus::Submitted {
            return Err(AppError::Validation(
                "An application cannot be moved back to submitted".to_string(),
            ));
        }
        if self.status.is_final() {
            return Err(AppError::Conflict(format!(
                "Application is already {}",
                self.status.as_str()
            )));
        }
        self.status = target;
        Ok(())
    }
}
