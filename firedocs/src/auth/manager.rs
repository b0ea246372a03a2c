//! Credential lifecycle for the Google Docs client
//!
//! [`CredentialManager::acquire`] is the only way the Docs backend obtains a
//! token. It walks load, validity check, silent refresh and interactive consent
//! in that order, and writes the store only when a record was created or
//! refreshed. Calls are serialized so that concurrent first-time callers share a
//! single consent flow instead of opening one each.

use super::credentials::{CredentialRecord, CredentialState};
use super::flow::Authorizer;
use super::store::CredentialStore;
use super::token_endpoint::TokenEndpoint;
use super::AccessTokenProvider;
use crate::error::{FiredocsError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Owns the stored Google Docs credential and keeps it usable
pub struct CredentialManager {
    store: Arc<dyn CredentialStore>,
    endpoint: Arc<dyn TokenEndpoint>,
    authorizer: Arc<dyn Authorizer>,
    scopes: Vec<String>,
    in_flight: Mutex<()>,
}

impl CredentialManager {
    /// Create a manager for the given scopes
    pub fn new(
        store: Arc<dyn CredentialStore>,
        endpoint: Arc<dyn TokenEndpoint>,
        authorizer: Arc<dyn Authorizer>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            store,
            endpoint,
            authorizer,
            scopes,
            in_flight: Mutex::new(()),
        }
    }

    /// Scopes every returned record covers
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Return a valid credential record, refreshing or re-consenting as needed
    pub async fn acquire(&self) -> Result<CredentialRecord> {
        let _guard = self.in_flight.lock().await;

        let existing = match self.store.load().await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Ignoring unreadable stored credential: {}", e);
                None
            }
        };

        if let Some(record) = &existing {
            match record.state(Utc::now(), &self.scopes) {
                CredentialState::Valid => {
                    tracing::debug!("Stored credential is valid until {}", record.expires_at);
                    return Ok(record.clone());
                }
                CredentialState::Refreshable => match self.refresh(record).await {
                    Ok(refreshed) => return Ok(refreshed),
                    Err(e) => {
                        tracing::warn!("Silent refresh failed, falling back to consent: {}", e);
                    }
                },
                CredentialState::RequiresConsent => {
                    tracing::info!("Stored credential cannot be refreshed for the required scopes");
                }
            }
        }

        self.consent().await
    }

    async fn refresh(&self, record: &CredentialRecord) -> Result<CredentialRecord> {
        let refresh_token = record
            .refresh_token
            .as_deref()
            .ok_or_else(|| FiredocsError::Credential("no refresh token stored".to_string()))?;

        tracing::info!("Refreshing expired Google Docs credential");
        let response = self.endpoint.refresh(refresh_token).await?;
        let refreshed =
            CredentialRecord::from_token_response(response, Utc::now(), Some(record), &self.scopes);
        self.persist(refreshed).await
    }

    async fn consent(&self) -> Result<CredentialRecord> {
        tracing::info!("Starting interactive Google Docs authorization");
        let response = self.authorizer.authorize(&self.scopes).await?;
        let record =
            CredentialRecord::from_token_response(response, Utc::now(), None, &self.scopes);
        self.persist(record).await
    }

    async fn persist(&self, record: CredentialRecord) -> Result<CredentialRecord> {
        if !record.is_valid(Utc::now(), &self.scopes) {
            return Err(FiredocsError::Credential(
                "authorization server returned an unusable credential".to_string(),
            ));
        }
        self.store.save(&record).await?;
        Ok(record)
    }
}

#[async_trait]
impl AccessTokenProvider for CredentialManager {
    async fn access_token(&self) -> Result<String> {
        Ok(self.acquire().await?.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::TokenResponse;
    use crate::auth::store::MemoryCredentialStore;
    use crate::auth::DOCS_SCOPES;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scopes() -> Vec<String> {
        DOCS_SCOPES.iter().map(|s| s.to_string()).collect()
    }

    fn record(expires_in: i64, refresh: Option<&str>) -> CredentialRecord {
        CredentialRecord {
            access_token: "ya29.stored".to_string(),
            refresh_token: refresh.map(str::to_string),
            expires_at: Utc::now() + Duration::seconds(expires_in),
            scopes: scopes(),
        }
    }

    #[derive(Default)]
    struct MockEndpoint {
        refreshes: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl TokenEndpoint for MockEndpoint {
        async fn refresh(&self, _refresh_token: &str) -> Result<TokenResponse> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FiredocsError::Credential("invalid_grant".to_string()));
            }
            Ok(TokenResponse {
                access_token: "ya29.refreshed".to_string(),
                expires_in: Some(3600),
                ..TokenResponse::default()
            })
        }

        async fn exchange_code(&self, _code: &str, _redirect_uri: &str) -> Result<TokenResponse> {
            Err(FiredocsError::Credential("not used".to_string()))
        }
    }

    #[derive(Default)]
    struct MockAuthorizer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Authorizer for MockAuthorizer {
        async fn authorize(&self, _scopes: &[String]) -> Result<TokenResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Give concurrent callers a chance to pile up behind the lock
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            Ok(TokenResponse {
                access_token: "ya29.consented".to_string(),
                expires_in: Some(3600),
                refresh_token: Some("1//consented".to_string()),
                ..TokenResponse::default()
            })
        }
    }

    fn manager(
        store: Arc<MemoryCredentialStore>,
        endpoint: Arc<MockEndpoint>,
        authorizer: Arc<MockAuthorizer>,
    ) -> CredentialManager {
        CredentialManager::new(store, endpoint, authorizer, scopes())
    }

    #[tokio::test]
    async fn test_valid_record_is_returned_without_writes() {
        let store = Arc::new(MemoryCredentialStore::with_record(record(3600, None)));
        let endpoint = Arc::new(MockEndpoint::default());
        let authorizer = Arc::new(MockAuthorizer::default());
        let manager = manager(store.clone(), endpoint.clone(), authorizer.clone());

        let first = manager.acquire().await.unwrap();
        let second = manager.acquire().await.unwrap();

        assert_eq!(first.access_token, "ya29.stored");
        assert_eq!(first, second);
        assert_eq!(store.save_count(), 0);
        assert_eq!(endpoint.refreshes.load(Ordering::SeqCst), 0);
        assert_eq!(authorizer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_record_is_refreshed_and_persisted() {
        let store = Arc::new(MemoryCredentialStore::with_record(record(-60, Some("1//r"))));
        let endpoint = Arc::new(MockEndpoint::default());
        let authorizer = Arc::new(MockAuthorizer::default());
        let manager = manager(store.clone(), endpoint.clone(), authorizer.clone());

        let acquired = manager.acquire().await.unwrap();

        assert_eq!(acquired.access_token, "ya29.refreshed");
        assert_eq!(acquired.refresh_token.as_deref(), Some("1//r"));
        assert!(acquired.expires_at > Utc::now());
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.current().await.unwrap(), acquired);
        assert_eq!(authorizer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_refresh_falls_back_to_consent() {
        let store = Arc::new(MemoryCredentialStore::with_record(record(-60, Some("1//r"))));
        let endpoint = Arc::new(MockEndpoint {
            fail: true,
            ..MockEndpoint::default()
        });
        let authorizer = Arc::new(MockAuthorizer::default());
        let manager = manager(store.clone(), endpoint.clone(), authorizer.clone());

        let acquired = manager.acquire().await.unwrap();

        assert_eq!(acquired.access_token, "ya29.consented");
        assert_eq!(endpoint.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(authorizer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_store_runs_consent_once() {
        let store = Arc::new(MemoryCredentialStore::new());
        let endpoint = Arc::new(MockEndpoint::default());
        let authorizer = Arc::new(MockAuthorizer::default());
        let manager = manager(store.clone(), endpoint, authorizer.clone());

        let acquired = manager.acquire().await.unwrap();
        assert!(acquired.expires_at > Utc::now());
        assert_eq!(acquired.refresh_token.as_deref(), Some("1//consented"));
        assert_eq!(store.save_count(), 1);

        manager.acquire().await.unwrap();
        assert_eq!(authorizer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_acquisitions_share_one_consent() {
        let store = Arc::new(MemoryCredentialStore::new());
        let endpoint = Arc::new(MockEndpoint::default());
        let authorizer = Arc::new(MockAuthorizer::default());
        let manager = Arc::new(manager(store.clone(), endpoint, authorizer.clone()));

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.acquire().await })
            })
            .collect();

        for handle in handles {
            let record = handle.await.unwrap().unwrap();
            assert_eq!(record.access_token, "ya29.consented");
        }
        assert_eq!(authorizer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_scope_triggers_consent() {
        let mut narrow = record(3600, Some("1//r"));
        narrow.scopes = vec![DOCS_SCOPES[0].to_string()];
        let store = Arc::new(MemoryCredentialStore::with_record(narrow));
        let endpoint = Arc::new(MockEndpoint::default());
        let authorizer = Arc::new(MockAuthorizer::default());
        let manager = manager(store, endpoint.clone(), authorizer.clone());

        let acquired = manager.acquire().await.unwrap();
        assert_eq!(acquired.access_token, "ya29.consented");
        assert_eq!(acquired.scopes, scopes());
        assert_eq!(endpoint.refreshes.load(Ordering::SeqCst), 0);
    }
}
