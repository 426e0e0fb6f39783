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
use validator::{Validate, ValidationError};

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::auth::session::{
    access_cookie, ensure_current, login_cookies, logout_cookies, presented_refresh_token,
    RefreshRequest, RefreshedToken, SetCookie, SetCookies,
};
use crate::auth::tokens::{TokenKind, TokenPair};
use crate::auth::{roles, AuthUser};
use crate::errors::AppError;
use crate::models::user::{Role, User};
use crate::state::AppState;

fn validate_signup_role(role: &Role) -> Result<(), ValidationError> {
    match role {
        Role::JobSeeker | Role::Recruiter => Ok(()),
        Role::Admin => Err(ValidationError::new("role")
            .with_message("Role must be jobseeker or recruiter".into())),
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 2, max = 39, message = "First name must be 2 to 39 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, max = 39, message = "Last name must be 2 to 39 characters"))]
    pub last_name: String,
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
    #[serde(rename = "phonenumber")]
    #[validate(length(min = 10, message = "Phone number must be at least 10 characters"))]
    pub phonenumber: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[validate(custom(function = "validate_signup_role"))]
    pub role: Option<Role>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 2, max = 39))]
    pub first_name: Option<String>,
    #[validate(length(min = 2, max = 39))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[serde(rename = "phonenumber")]
    #[validate(length(min = 10))]
    pub phonenumber: Option<String>,
}

impl UpdateUserRequest {
    fn apply_to(self, user: &mut User) {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = self.email {
            user.email = normalize_email(&email);
        }
        if let Some(phonenumber) = self.phonenumber {
            user.phonenumber = phonenumber;
        }
        user.updated_at = Utc::now();
    }
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub message: &'static str,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn fetch_user_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(db)
        .await
}

async fn store_refresh_token(
    db: &PgPool,
    id: Uuid,
    token: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET refresh_token = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(token)
        .execute(db)
        .await?;
    Ok(())
}

/// POST /api/user/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>), AppError> {
    req.validate()?;
    let password_hash = hash_password(&req.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, first_name, last_name, image, email, password_hash, role, phonenumber)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.first_name.trim())
    .bind(req.last_name.trim())
    .bind(&req.image)
    .bind(normalize_email(&req.email))
    .bind(&password_hash)
    .bind(req.role.unwrap_or(Role::JobSeeker))
    .bind(&req.phonenumber)
    .fetch_one(&state.db)
    .await
    .map_err(|e| AppError::on_unique_violation(e, "Email is already registered"))?;

    info!(user_id = %user.id, role = user.role.as_str(), "User registered");
    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            message: "User registered successfully",
            user,
        }),
    ))
}

/// POST /api/user/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<(AppendHeaders<SetCookies>, Json<LoginResponse>), AppError> {
    req.validate()?;

    let email = normalize_email(&req.email);
    let Some(user) = fetch_user_by_email(&state.db, &email).await? else {
        warn!("Login attempt for unknown email");
        return Err(AppError::InvalidCredentials);
    };
    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "Login attempt with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let tokens = state.tokens.issue_pair(user.id, user.role)?;
    store_refresh_token(&state.db, user.id, Some(&tokens.refresh_token)).await?;

    info!(user_id = %user.id, "User logged in");
    Ok((
        AppendHeaders(login_cookies(&state, &tokens)),
        Json(LoginResponse {
            message: "Login successful",
            user,
            tokens,
        }),
    ))
}

/// POST /api/user/refresh-token
pub async fn handle_refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Result<(AppendHeaders<SetCookie>, Json<RefreshedToken>), AppError> {
    let presented = presented_refresh_token(&headers, body.map(|Json(b)| b))
        .ok_or(AppError::Unauthorized)?;
    let claims = state.tokens.verify(TokenKind::Refresh, &presented)?;
    let user = state
        .store
        .find_user(claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;
    ensure_current(&claims, &presented, user.refresh_token.as_deref())?;

    let access_token = state.tokens.issue(TokenKind::Access, user.id, user.role)?;
    Ok((
        AppendHeaders(access_cookie(&state, &access_token)),
        Json(RefreshedToken {
            message: "Access token refreshed",
            access_token,
        }),
    ))
}

/// POST /api/user/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<(AppendHeaders<SetCookies>, Json<MessageResponse>), AppError> {
    if !auth.is_admin() {
        store_refresh_token(&state.db, auth.id, None).await?;
    }
    info!(user_id = %auth.id, "User logged out");
    Ok((
        AppendHeaders(logout_cookies(&state)),
        Json(MessageResponse {
            message: "Logged out successfully",
        }),
    ))
}

/// GET /api/user/profile
pub async fn handle_get_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserEnvelope>, AppError> {
    auth.require(roles::ANY_USER)?;
    let user = state
        .store
        .find_user(auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(UserEnvelope {
        message: "User found",
        user,
    }))
}

/// PUT /api/user/update
pub async fn handle_update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserEnvelope>, AppError> {
    auth.require(roles::ANY_USER)?;
    req.validate()?;
    let mut user = state
        .store
        .find_user(auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    req.apply_to(&mut user);

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET first_name = $2, last_name = $3, email = $4, phonenumber = $5,
            updated_at = $6
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(&user.phonenumber)
    .bind(user.updated_at)
    .fetch_one(&state.db)
    .await
    .map_err(|e| AppError::on_unique_violation(e, "Email is already registered"))?;

    Ok(Json(UserEnvelope {
        message: "User updated",
        user,
    }))
}
