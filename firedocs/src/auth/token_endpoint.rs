//! OAuth2 token endpoint client

use super::credentials::{ClientSecrets, TokenResponse};
use crate::backends::http::parse_error_body;
use crate::error::{FiredocsError, Result};
use async_trait::async_trait;

/// The authorization server's token endpoint
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Trade a refresh token for a new access token
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse>;

    /// Trade an authorization code for tokens
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenResponse>;
}

/// Token endpoint named in the OAuth client-secret file
#[derive(Debug, Clone)]
pub struct GoogleTokenEndpoint {
    secrets: ClientSecrets,
    http: reqwest::Client,
}

impl GoogleTokenEndpoint {
    /// Create an endpoint client for the given OAuth client
    pub fn new(secrets: ClientSecrets, http: reqwest::Client) -> Self {
        Self { secrets, http }
    }

    async fn post_form(&self, operation: &str, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(&self.secrets.token_uri)
            .form(params)
            .send()
            .await
            .map_err(|e| FiredocsError::Credential(format!("{operation} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (_, message) = parse_error_body(status.as_u16(), &body);
            tracing::error!("OAuth {} failed with {}: {}", operation, status, message);
            return Err(FiredocsError::Credential(format!(
                "{operation} rejected by authorization server: {message}"
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| FiredocsError::Credential(format!("{operation} response unreadable: {e}")))
    }
}

#[async_trait]
impl TokenEndpoint for GoogleTokenEndpoint {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        self.post_form(
            "token refresh",
            &[
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ],
        )
        .await
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenResponse> {
        self.post_form(
            "code exchange",
            &[
                ("code", code),
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ],
        )
        .await
    }
}
