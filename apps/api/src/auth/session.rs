use axum::http::{header, HeaderMap, HeaderName};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::tokens::{Claims, TokenKind, TokenPair};
use super::{cookie_value, expired_cookie, session_cookie, ACCESS_COOKIE, REFRESH_COOKIE};
use crate::errors::AppError;
use crate::state::AppState;

pub type SetCookies = [(HeaderName, String); 2];
pub type SetCookie = [(HeaderName, String); 1];

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedToken {
    pub message: &'static str,
    pub access_token: String,
}

/// Cookies carrying a freshly issued token pair.
pub fn login_cookies(state: &AppState, pair: &TokenPair) -> SetCookies {
    let secure = state.config.is_production();
    [
        (
            header::SET_COOKIE,
            session_cookie(
                ACCESS_COOKIE,
                pair.access_token.clone(),
                state.tokens.ttl(TokenKind::Access),
                secure,
            ),
        ),
        (
            header::SET_COOKIE,
            session_cookie(
                REFRESH_COOKIE,
                pair.refresh_token.clone(),
                state.tokens.ttl(TokenKind::Refresh),
                secure,
            ),
        ),
    ]
}

pub fn logout_cookies(state: &AppState) -> SetCookies {
    let secure = state.config.is_production();
    [
        (header::SET_COOKIE, expired_cookie(ACCESS_COOKIE, secure)),
        (header::SET_COOKIE, expired_cookie(REFRESH_COOKIE, secure)),
    ]
}

pub fn access_cookie(state: &AppState, access_token: &str) -> SetCookie {
    [(
        header::SET_COOKIE,
        session_cookie(
            ACCESS_COOKIE,
            access_token.to_string(),
            state.tokens.ttl(TokenKind::Access),
            state.config.is_production(),
        ),
    )]
}

/// Refresh token from the `refreshToken` cookie, else from the JSON body.
pub fn presented_refresh_token(
    headers: &HeaderMap,
    body: Option<RefreshRequest>,
) -> Option<String> {
    cookie_value(headers, REFRESH_COOKIE).or_else(|| {
        body.and_then(|b| b.refresh_token)
            .filter(|token| !token.is_empty())
    })
}

/// A verified refresh token is only honoured while it is the one on record.
pub fn ensure_current(
    claims: &Claims,
    presented: &str,
    stored: Option<&str>,
) -> Result<(), AppError> {
    if stored != Some(presented) {
        warn!(principal = %claims.sub, "Refresh token is not the current one");
        return Err(AppError::Unauthorized);
    }
    Ok(())
}
