pub mod password;
pub mod roles;
pub mod session;
pub mod tokens;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use cookie::{time, Cookie, SameSite};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::Role;
use crate::state::AppState;
use tokens::TokenKind;

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

/// The authenticated caller. Extraction fails with 401 unless the request carries a valid
/// access token whose principal still exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn require(&self, allowed: &[Role]) -> Result<(), AppError> {
        roles::authorize(self.role, allowed)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Passes for `owner` itself and for admins.
    pub fn require_owner_or_admin(&self, owner: Uuid) -> Result<(), AppError> {
        if self.is_admin() || self.id == owner {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Access token from the `accessToken` cookie, else from `Authorization: Bearer`.
pub fn access_token(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, ACCESS_COOKIE).or_else(|| bearer_token(headers))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = access_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let claims = state
            .tokens
            .verify(TokenKind::Access, &token)
            .map_err(|e| {
                warn!("Rejected access token: {e}");
                AppError::Unauthorized
            })?;

        let role = match claims.role {
            Role::Admin => state
                .store
                .find_admin(claims.sub)
                .await?
                .map(|_| Role::Admin),
            _ => state.store.find_user(claims.sub).await?.map(|user| user.role),
        };

        match role {
            Some(role) => Ok(AuthUser {
                id: claims.sub,
                role,
            }),
            None => {
                warn!(principal = %claims.sub, "Token principal no longer exists");
                Err(AppError::Unauthorized)
            }
        }
    }
}

/// `Set-Cookie` value for a session token.
pub fn session_cookie(
    name: &'static str,
    value: String,
    max_age: chrono::Duration,
    secure: bool,
) -> String {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(time::Duration::seconds(max_age.num_seconds()))
        .build()
        .to_string()
}

/// `Set-Cookie` value that removes a session cookie.
pub fn expired_cookie(name: &'static str, secure: bool) -> String {
    let mut cookie = Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .build();
    cookie.make_removal();
    cookie.to_string()
}
