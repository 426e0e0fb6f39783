pub mod admin;
pub mod application;
pub mod company;
pub mod contact;
pub mod job;
pub mod job_seeker;
pub mod user;
