use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::contact::{ContactMessage, ContactStatus};
use crate::state::AppState;

const DEFAULT_SUBJECT: &str = "General Inquiry";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub full_name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

/// A contact request after trimming and defaulting, ready for validation.
#[derive(Debug, PartialEq, Validate)]
pub struct ContactSubmission {
    #[validate(length(min = 2, max = 100, message = "Name must be 2 to 100 characters"))]
    pub full_name: String,
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
    #[validate(length(min = 2, max = 200, message = "Subject must be 2 to 200 characters"))]
    pub subject: String,
    #[validate(length(min = 10, max = 2000, message = "Message must be 10 to 2000 characters"))]
    pub message: String,
}

impl From<ContactRequest> for ContactSubmission {
    fn from(req: ContactRequest) -> Self {
        let subject = req
            .subject
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
        Self {
            full_name: req.full_name.trim().to_string(),
            email: req.email.trim().to_lowercase(),
            subject,
            message: req.message.trim().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactReference {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ContactReceipt {
    pub message: &'static str,
    pub data: ContactReference,
}

/// First `X-Forwarded-For` entry, else the peer address.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "0.0.0.0".to_string())
}

/// POST /api/contact/create
pub async fn handle_create_contact(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactReceipt>), AppError> {
    let submission = ContactSubmission::from(req);
    submission.validate()?;
    let ip = client_ip(&headers, peer.map(|ConnectInfo(addr)| addr));

    let saved = sqlx::query_as::<_, ContactMessage>(
        r#"
        INSERT INTO contact_messages (id, full_name, email, subject, message, status, ip_address)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&submission.full_name)
    .bind(&submission.email)
    .bind(&submission.subject)
    .bind(&submission.message)
    .bind(ContactStatus::Pending)
    .bind(&ip)
    .fetch_one(&state.db)
    .await?;

    info!(contact_id = %saved.id, subject = %saved.subject, "Contact message received");
    Ok((
        StatusCode::CREATED,
        Json(ContactReceipt {
            message: "Your message has been received. Thank you for contacting us!",
            data: ContactReference {
                id: saved.id,
                created_at: saved.created_at,
            },
        }),
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn request(subject: Option<&str>) -> ContactRequest {
        ContactRequest {
            full_name: "  Meera Shah ".to_string(),
            email: " Meera@Example.COM ".to_string(),
            subject: subject.map(str::to_string),
            message: "  I would like a demo of the recruiter tools.  ".to_string(),
        }
    }

    #[test]
    fn test_submission_is_trimmed_and_defaulted() {
        let submission = ContactSubmission::from(request(None));
        assert_eq!(submission.full_name, "Meera Shah");
        assert_eq!(submission.email, "meera@example.com");
        assert_eq!(submission.subject, DEFAULT_SUBJECT);
        assert!(submission.validate().is_ok());
    }

    #[test]
    fn test_short_message_is_rejected() {
        let mut req = request(Some("Demo"));
        req.message = " hi ".to_string();
        let errors = ContactSubmission::from(req).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("message"));
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let peer: SocketAddr = "10.0.0.9:5000".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some(peer)), "10.0.0.9");
        assert_eq!(client_ip(&headers, None), "0.0.0.0");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers, Some(peer)), "203.0.113.7");
    }
}
