use crate::errors::AppError;
use crate::models::user::Role;

pub const JOB_SEEKER: &[Role] = &[Role::JobSeeker];
pub const ADMIN: &[Role] = &[Role::Admin];
pub const ANY_USER: &[Role] = &[Role::JobSeeker, Role::Recruiter];
pub const RECRUITER_OR_ADMIN: &[Role] = &[Role::Recruiter, Role::Admin];
pub const ANY_ROLE: &[Role] = &[Role::JobSeeker, Role::Recruiter, Role::Admin];

pub fn authorize(role: Role, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
