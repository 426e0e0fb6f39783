use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::AppendHeaders,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::auth::session::{
    access_cookie, ensure_current, login_cookies, logout_cookies, presented_refresh_token,
    RefreshRequest, RefreshedToken, SetCookie, SetCookies,
};
use crate::auth::tokens::{TokenKind, TokenPair};
use crate::auth::{roles, AuthUser};
use crate::errors::{parse_id, AppError};
use crate::models::admin::Admin;
use crate::models::user::Role;
use crate::state::AppState;

const DUPLICATE_EMAIL: &str = "An admin with this email already exists";

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAdminRequest {
    #[validate(length(min = 2, max = 50, message = "Username must be 2 to 50 characters"))]
    pub username: String,
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdminLoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAdminRequest {
    #[validate(length(min = 2, max = 50))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAdminRequest {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct AdminEnvelope {
    pub message: &'static str,
    pub admin: Admin,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub message: &'static str,
    pub admin: Admin,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

async fn store_refresh_token(
    db: &PgPool,
    id: Uuid,
    token: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE admins SET refresh_token = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(token)
        .execute(db)
        .await?;
    Ok(())
}

/// Creating an admin is open until the first one exists.
fn creation_allowed(existing_admins: i64, caller: Option<&AuthUser>) -> Result<(), AppError> {
    if existing_admins == 0 {
        return Ok(());
    }
    match caller {
        Some(auth) => auth.require(roles::ADMIN),
        None => Err(AppError::Unauthorized),
    }
}

/// POST /api/admin/create
pub async fn handle_create_admin(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Json(req): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<AdminEnvelope>), AppError> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
        .fetch_one(&state.db)
        .await?;
    creation_allowed(existing, auth.as_ref())?;
    req.validate()?;

    let password_hash = hash_password(&req.password)?;
    let admin = sqlx::query_as::<_, Admin>(
        r#"
        INSERT INTO admins (id, username, email, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.username.trim())
    .bind(req.email.trim().to_lowercase())
    .bind(&password_hash)
    .fetch_one(&state.db)
    .await
    .map_err(|e| AppError::on_unique_violation(e, DUPLICATE_EMAIL))?;

    info!(admin_id = %admin.id, bootstrap = existing == 0, "Admin created");
    Ok((
        StatusCode::CREATED,
        Json(AdminEnvelope {
            message: "Admin created successfully",
            admin,
        }),
    ))
}

/// POST /api/admin/login
pub async fn handle_admin_login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> Result<(AppendHeaders<SetCookies>, Json<AdminLoginResponse>), AppError> {
    req.validate()?;

    let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE email = $1")
        .bind(req.email.trim().to_lowercase())
        .fetch_optional(&state.db)
        .await?;
    let Some(admin) = admin else {
        warn!("Admin login attempt for unknown email");
        return Err(AppError::InvalidCredentials);
    };
    if !verify_password(&req.password, &admin.password_hash)? {
        warn!(admin_id = %admin.id, "Admin login attempt with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let tokens = state.tokens.issue_pair(admin.id, Role::Admin)?;
    store_refresh_token(&state.db, admin.id, Some(&tokens.refresh_token)).await?;

    info!(admin_id = %admin.id, "Admin logged in");
    Ok((
        AppendHeaders(login_cookies(&state, &tokens)),
        Json(AdminLoginResponse {
            message: "Login successful",
            admin,
            tokens,
        }),
    ))
}

/// POST /api/admin/refresh-token
pub async fn handle_admin_refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Result<(AppendHeaders<SetCookie>, Json<RefreshedToken>), AppError> {
    let presented = presented_refresh_token(&headers, body.map(|Json(b)| b))
        .ok_or(AppError::Unauthorized)?;
    let claims = state.tokens.verify(TokenKind::Refresh, &presented)?;
    if claims.role != Role::Admin {
        return Err(AppError::Unauthorized);
    }
    let admin = state
        .store
        .find_admin(claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;
    ensure_current(&claims, &presented, admin.refresh_token.as_deref())?;

    let access_token = state.tokens.issue(TokenKind::Access, admin.id, Role::Admin)?;
    Ok((
        AppendHeaders(access_cookie(&state, &access_token)),
        Json(RefreshedToken {
            message: "Access token refreshed",
            access_token,
        }),
    ))
}

/// POST /api/admin/logout
pub async fn handle_admin_logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<(AppendHeaders<SetCookies>, Json<MessageResponse>), AppError> {
    auth.require(roles::ADMIN)?;
    store_refresh_token(&state.db, auth.id, None).await?;
    info!(admin_id = %auth.id, "Admin logged out");
    Ok((
        AppendHeaders(logout_cookies(&state)),
        Json(MessageResponse {
            message: "Logged out successfully",
        }),
    ))
}

/// POST /api/admin/update
pub async fn handle_update_admin(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateAdminRequest>,
) -> Result<Json<AdminEnvelope>, AppError> {
    auth.require(roles::ADMIN)?;
    req.validate()?;
    let mut admin = state
        .store
        .find_admin(auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

    if let Some(username) = req.username {
        admin.username = username.trim().to_string();
    }
    if let Some(email) = req.email {
        admin.email = email.trim().to_lowercase();
    }
    if let Some(password) = req.password {
        admin.password_hash = hash_password(&password)?;
    }
    admin.updated_at = Utc::now();

    let admin = sqlx::query_as::<_, Admin>(
        r#"
        UPDATE admins SET username = $2, email = $3, password_hash = $4, updated_at = $5
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(admin.id)
    .bind(&admin.username)
    .bind(&admin.email)
    .bind(&admin.password_hash)
    .bind(admin.updated_at)
    .fetch_one(&state.db)
    .await
    .map_err(|e| AppError::on_unique_violation(e, DUPLICATE_EMAIL))?;

    Ok(Json(AdminEnvelope {
        message: "Admin updated",
        admin,
    }))
}

/// POST /api/admin/delete
pub async fn handle_delete_admin(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<DeleteAdminRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require(roles::ADMIN)?;
    let id = parse_id(&req.id)?;
    if id == auth.id {
        return Err(AppError::Conflict("An admin cannot delete itself".to_string()));
    }

    let result = sqlx::query("DELETE FROM admins WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Admin not found".to_string()));
    }

    info!(admin_id = %id, deleted_by = %auth.id, "Admin deleted");
    Ok(Json(MessageResponse {
        message: "Admin deleted",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_admin_needs_no_caller() {
        assert!(creation_allowed(0, None).is_ok());
    }

    #[test]
    fn test_later_admins_need_an_admin_caller() {
        let admin = AuthUser {
            id: Uuid::new_v4(),
            role: Role::Admin,
        };
        let recruiter = AuthUser {
            id: Uuid::new_v4(),
            role: Role::Recruiter,
        };
        assert!(matches!(
            creation_allowed(1, None),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            creation_allowed(1, Some(&recruiter)),
            Err(AppError::Forbidden)
        ));
        assert!(creation_allowed(3, Some(&admin)).is_ok());
    }

    #[test]
    fn test_admin_password_rules_apply_on_update() {
        let req = UpdateAdminRequest {
            password: Some("weak".to_string()),
            ..Default::default()
        };
        assert!(req.validate().unwrap_err().field_errors().contains_key("password"));
    }
}
