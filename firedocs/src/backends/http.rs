//! HTTP plumbing shared by the Google REST clients

use crate::error::{BackendErrorKind, FiredocsError, Result};
use serde::Deserialize;
use std::time::Duration;

/// Build the HTTP client used by every backend
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("firedocs/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(FiredocsError::Network)
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorField,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Status {
        #[serde(default)]
        message: String,
        #[serde(default)]
        status: Option<String>,
    },
    Text(String),
}

/// Extract a failure class and message from a Google API error body
///
/// Handles the RPC-style `{"error": {"message", "status"}}` shape, the
/// Identity Toolkit variant where the message is a code such as
/// `EMAIL_EXISTS`, and the plain `{"error": "..."}` bodies returned by the
/// Realtime Database and the OAuth token endpoint.
pub fn parse_error_body(status: u16, body: &str) -> (BackendErrorKind, String) {
    let by_status = BackendErrorKind::from_status(status);

    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        let text = body.trim();
        let message = if text.is_empty() {
            format!("HTTP {status}")
        } else {
            text.to_string()
        };
        return (by_status, message);
    };

    match envelope.error {
        ErrorField::Status { message, status: rpc_status } => {
            // Identity Toolkit puts the code first: "WEAK_PASSWORD : Password should be..."
            let code = message.split(" : ").next().unwrap_or_default();
            let kind = rpc_status
                .as_deref()
                .and_then(BackendErrorKind::from_code)
                .or_else(|| BackendErrorKind::from_code(code))
                .unwrap_or(by_status);
            let message = if message.is_empty() {
                format!("HTTP {status}")
            } else {
                message
            };
            (kind, message)
        }
        ErrorField::Text(error) => {
            let message = match envelope.error_description {
                Some(description) if !description.is_empty() => {
                    format!("{error}: {description}")
                }
                _ => error,
            };
            (by_status, message)
        }
    }
}

/// Pass successful responses through and turn failures into backend errors
pub async fn check_response(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (kind, message) = parse_error_body(status.as_u16(), &body);
    tracing::debug!("{} request failed with {}: {}", service, status, message);
    Err(FiredocsError::backend(service, kind, message))
}
