//! Credentials for the Google backends
//!
//! The Firebase backends authenticate with a service account. The Docs backend
//! acts on behalf of a user and goes through [`CredentialManager`], which keeps a
//! persisted OAuth2 record usable across runs.

use crate::error::Result;
use async_trait::async_trait;

pub mod credentials;
pub mod flow;
pub mod manager;
pub mod service_account;
pub mod store;
pub mod token_endpoint;

pub use credentials::{ClientSecrets, CredentialRecord, CredentialState, TokenResponse};
pub use flow::{Authorizer, LoopbackAuthorizer};
pub use manager::CredentialManager;
pub use service_account::{ServiceAccountKey, ServiceAccountTokenSource, FIREBASE_SCOPES};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use token_endpoint::{GoogleTokenEndpoint, TokenEndpoint};

/// Scopes the Docs backend needs
pub const DOCS_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/documents",
    "https://www.googleapis.com/auth/drive",
];

/// Anything that can hand out a bearer token for an outgoing request
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// A currently valid access token
    async fn access_token(&self) -> Result<String>;
}

/// A fixed token, for emulators and tests
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Owned copy of [`DOCS_SCOPES`]
pub fn docs_scopes() -> Vec<String> {
    DOCS_SCOPES.iter().map(|s| s.to_string()).collect()
}

/// Owned copy of [`FIREBASE_SCOPES`]
pub fn firebase_scopes() -> Vec<String> {
    FIREBASE_SCOPES.iter().map(|s| s.to_string()).collect()
}
