//! OAuth2 credential material for the Google Docs client

use crate::error::{FiredocsError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A record counts as expired this long before its actual expiry
pub const EXPIRY_SKEW_SECS: i64 = 60;

/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// What a caller must do before a stored record can be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    /// Usable as-is
    Valid,
    /// Expired, but a silent refresh can renew it
    Refreshable,
    /// Only the interactive consent flow can produce a usable record
    RequiresConsent,
}

/// Cached OAuth2 token material
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Bearer token sent to the Docs and Drive APIs
    pub access_token: String,
    /// Long-lived token used for silent refresh
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted
    pub expires_at: DateTime<Utc>,
    /// Scopes granted with this token
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl CredentialRecord {
    /// Build a record from a token endpoint response
    ///
    /// Refresh responses usually omit the refresh token and the scope list, so
    /// the previous values are carried over when absent.
    pub fn from_token_response(
        response: TokenResponse,
        now: DateTime<Utc>,
        previous: Option<&CredentialRecord>,
        requested_scopes: &[String],
    ) -> Self {
        let lifetime = response
            .expires_in
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        let scopes = match response.scope {
            Some(scope) if !scope.trim().is_empty() => {
                scope.split_whitespace().map(str::to_string).collect()
            }
            _ => previous
                .map(|p| p.scopes.clone())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| requested_scopes.to_vec()),
        };

        Self {
            access_token: response.access_token,
            refresh_token: response
                .refresh_token
                .filter(|t| !t.is_empty())
                .or_else(|| previous.and_then(|p| p.refresh_token.clone())),
            expires_at: now + Duration::seconds(lifetime),
            scopes,
        }
    }

    /// Whether the access token is missing or expires within the skew window
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_empty()
            || self.expires_at <= now + Duration::seconds(EXPIRY_SKEW_SECS)
    }

    /// Whether every required scope was granted
    pub fn covers(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Classify this record against the required scopes
    pub fn state(&self, now: DateTime<Utc>, required: &[String]) -> CredentialState {
        if !self.covers(required) {
            return CredentialState::RequiresConsent;
        }
        if !self.is_expired(now) {
            return CredentialState::Valid;
        }
        match &self.refresh_token {
            Some(token) if !token.is_empty() => CredentialState::Refreshable,
            _ => CredentialState::RequiresConsent,
        }
    }

    /// Whether the record is usable right now
    pub fn is_valid(&self, now: DateTime<Utc>, required: &[String]) -> bool {
        self.state(now, required) == CredentialState::Valid
    }
}

/// Response body of the OAuth2 token endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    /// Newly issued access token
    pub access_token: String,
    /// Seconds until the access token expires
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Refresh token, present on code exchange with offline access
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Space-separated granted scopes
    #[serde(default)]
    pub scope: Option<String>,
    /// Usually "Bearer"
    #[serde(default)]
    pub token_type: Option<String>,
}

/// OAuth client identity, read from the client-secret file downloaded from
/// the Google Cloud console
#[derive(Clone, Deserialize)]
pub struct ClientSecrets {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Consent page
    #[serde(default = "ClientSecrets::default_auth_uri")]
    pub auth_uri: String,
    /// Token endpoint
    #[serde(default = "ClientSecrets::default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ClientSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecrets")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// The client-secret file wraps the fields in an "installed" or "web" object
#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    fn default_auth_uri() -> String {
        DEFAULT_AUTH_URI.to_string()
    }

    fn default_token_uri() -> String {
        DEFAULT_TOKEN_URI.to_string()
    }

    /// Parse a client-secret document
    pub fn from_json(content: &str) -> Result<Self> {
        let file: ClientSecretsFile = serde_json::from_str(content)?;
        file.installed.or(file.web).ok_or_else(|| {
            FiredocsError::Config(
                "client secret file has neither an \"installed\" nor a \"web\" section"
                    .to_string(),
            )
        })
    }

    /// Read and parse a client-secret file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FiredocsError::Config(format!(
                "failed to read client secret file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes() -> Vec<String> {
        vec![
            "https://www.googleapis.com/auth/documents".to_string(),
            "https://www.googleapis.com/auth/drive".to_string(),
        ]
    }

    fn record(expires_in: i64, refresh: Option<&str>) -> CredentialRecord {
        CredentialRecord {
            access_token: "ya29.token".to_string(),
            refresh_token: refresh.map(str::to_string),
            expires_at: Utc::now() + Duration::seconds(expires_in),
            scopes: scopes(),
        }
    }

    #[test]
    fn test_state_classification() {
        let now = Utc::now();
        assert_eq!(record(3600, None).state(now, &scopes()), CredentialState::Valid);
        assert_eq!(
            record(-10, Some("1//refresh")).state(now, &scopes()),
            CredentialState::Refreshable
        );
        assert_eq!(
            record(-10, None).state(now, &scopes()),
            CredentialState::RequiresConsent
        );
        // Inside the skew window counts as expired
        assert_eq!(
            record(30, Some("1//refresh")).state(now, &scopes()),
            CredentialState::Refreshable
        );
    }

    #[test]
    fn test_missing_scope_requires_consent() {
        let mut rec = record(3600, Some("1//refresh"));
        rec.scopes = vec!["https://www.googleapis.com/auth/documents".to_string()];
        assert_eq!(
            rec.state(Utc::now(), &scopes()),
            CredentialState::RequiresConsent
        );
    }

    #[test]
    fn test_refresh_keeps_previous_refresh_token_and_scopes() {
        let previous = record(-10, Some("1//refresh"));
        let now = Utc::now();
        let refreshed = CredentialRecord::from_token_response(
            TokenResponse {
                access_token: "ya29.new".to_string(),
                expires_in: Some(3599),
                ..TokenResponse::default()
            },
            now,
            Some(&previous),
            &scopes(),
        );
        assert_eq!(refreshed.access_token, "ya29.new");
        assert_eq!(refreshed.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(refreshed.scopes, previous.scopes);
        assert_eq!(refreshed.expires_at, now + Duration::seconds(3599));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let text = format!("{:?}", record(3600, Some("1//refresh")));
        assert!(!text.contains("ya29.token"));
        assert!(!text.contains("1//refresh"));
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let rec = record(3600, Some("1//refresh"));
        let json = serde_json::to_string(&rec).unwrap();
        let back: CredentialRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(rec, back);
    }

    #[test]
    fn test_client_secrets_installed_and_web() {
        let installed = r#"{"installed":{"client_id":"id.apps.googleusercontent.com","client_secret":"shh","redirect_uris":["http://localhost"]}}"#;
        let secrets = ClientSecrets::from_json(installed).unwrap();
        assert_eq!(secrets.client_id, "id.apps.googleusercontent.com");
        assert_eq!(secrets.token_uri, DEFAULT_TOKEN_URI);

        let web = r#"{"web":{"client_id":"web-id","client_secret":"shh","token_uri":"https://example.test/token"}}"#;
        let secrets = ClientSecrets::from_json(web).unwrap();
        assert_eq!(secrets.token_uri, "https://example.test/token");

        assert!(ClientSecrets::from_json(r#"{"other":{}}"#).is_err());
    }
}
