pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::admin::handlers as admin;
use crate::applications::handlers as applications;
use crate::companies::handlers as companies;
use crate::contact::handlers as contact;
use crate::jobs::handlers as jobs;
use crate::profile::handlers as profile;
use crate::state::AppState;
use crate::users::handlers as users;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Users
        .route("/user/signup", post(users::handle_signup))
        .route("/user/login", post(users::handle_login))
        .route("/user/refresh-token", post(users::handle_refresh_token))
        .route("/user/logout", post(users::handle_logout))
        .route("/user/profile", get(users::handle_get_user))
        .route("/user/update", put(users::handle_update_user))
        // Admins
        .route("/admin/create", post(admin::handle_create_admin))
        .route("/admin/login", post(admin::handle_admin_login))
        .route("/admin/refresh-token", post(admin::handle_admin_refresh_token))
        .route("/admin/logout", post(admin::handle_admin_logout))
        .route("/admin/update", post(admin::handle_update_admin))
        .route("/admin/delete", post(admin::handle_delete_admin))
        // Companies
        .route("/company/create", post(companies::handle_create_company))
        .route(
            "/company/:id",
            get(companies::handle_get_company).put(companies::handle_update_company),
        )
        .route("/company/:id/delete", post(companies::handle_delete_company))
        .route("/companies", get(companies::handle_list_companies))
        // Job postings
        .route("/job/create", post(jobs::handle_create_job))
        .route("/job/applied/user", get(jobs::handle_applied_jobs))
        .route("/job/apply/:job_id", post(jobs::handle_apply))
        .route("/job/delete/:id", post(jobs::handle_delete_job))
        .route("/job/close/:id", post(jobs::handle_close_job))
        .route("/job/reopen/:id", post(jobs::handle_reopen_job))
        .route(
            "/job/:id",
            get(jobs::handle_get_job).put(jobs::handle_update_job),
        )
        .route("/job/:id/applicants", get(jobs::handle_job_applicants))
        .route("/jobs", get(jobs::handle_list_jobs))
        .route("/jobs/not-applied", get(jobs::handle_list_not_applied))
        .route("/jobs/company/:id", get(jobs::handle_jobs_by_company))
        .route("/jobs/user/:id", get(jobs::handle_jobs_by_creator))
        // Job-seeker profiles
        .route("/job-seeker/create", post(profile::handle_create_profile))
        .route("/job-seeker/me", get(profile::handle_get_my_profile))
        .route(
            "/job-seeker/check-status/:id",
            get(profile::handle_check_status),
        )
        .route(
            "/job-seeker/:id",
            get(profile::handle_get_profile).put(profile::handle_update_profile),
        )
        .route("/job-seeker/:id/delete", post(profile::handle_delete_profile))
        .route("/job-seekers", get(profile::handle_list_profiles))
        .route(
            "/job-seekers/incomplete",
            get(profile::handle_incomplete_profiles),
        )
        // Applications
        .route("/application/:id", get(applications::handle_get_application))
        .route(
            "/application/job/:job_id",
            get(applications::handle_job_applications),
        )
        .route(
            "/application/:id/status",
            put(applications::handle_update_status),
        )
        // Contact
        .route("/contact/create", post(contact::handle_create_contact))
}
