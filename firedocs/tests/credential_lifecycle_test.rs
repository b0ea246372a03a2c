//! Credential acquisition across runs, persisted in a JSON file

use async_trait::async_trait;
use chrono::{Duration, Utc};
use firedocs::auth::{
    docs_scopes, Authorizer, CredentialManager, CredentialRecord, CredentialStore,
    FileCredentialStore, TokenEndpoint, TokenResponse,
};
use firedocs::{AccessTokenProvider, FiredocsError, Result};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Default)]
struct CountingEndpoint {
    refreshes: AtomicUsize,
}

#[async_trait]
impl TokenEndpoint for CountingEndpoint {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if refresh_token == "revoked" {
            return Err(FiredocsError::Credential("invalid_grant".to_string()));
        }
        Ok(TokenResponse {
            access_token: "ya29.refreshed".to_string(),
            expires_in: Some(3599),
            ..TokenResponse::default()
        })
    }

    async fn exchange_code(&self, _code: &str, _redirect_uri: &str) -> Result<TokenResponse> {
        Err(FiredocsError::Credential("unexpected code exchange".to_string()))
    }
}

#[derive(Default)]
struct CountingAuthorizer {
    consents: AtomicUsize,
}

#[async_trait]
impl Authorizer for CountingAuthorizer {
    async fn authorize(&self, scopes: &[String]) -> Result<TokenResponse> {
        self.consents.fetch_add(1, Ordering::SeqCst);
        Ok(TokenResponse {
            access_token: "ya29.consented".to_string(),
            expires_in: Some(3599),
            refresh_token: Some("1//consented".to_string()),
            scope: Some(scopes.join(" ")),
            token_type: Some("Bearer".to_string()),
        })
    }
}

struct Setup {
    _dir: TempDir,
    store: Arc<FileCredentialStore>,
    endpoint: Arc<CountingEndpoint>,
    authorizer: Arc<CountingAuthorizer>,
    manager: CredentialManager,
}

fn setup() -> Setup {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileCredentialStore::new(dir.path().join("token.json")));
    let endpoint = Arc::new(CountingEndpoint::default());
    let authorizer = Arc::new(CountingAuthorizer::default());
    let manager = CredentialManager::new(
        store.clone(),
        endpoint.clone(),
        authorizer.clone(),
        docs_scopes(),
    );
    Setup {
        _dir: dir,
        store,
        endpoint,
        authorizer,
        manager,
    }
}

fn expired_record(refresh_token: &str) -> CredentialRecord {
    CredentialRecord {
        access_token: "ya29.old".to_string(),
        refresh_token: Some(refresh_token.to_string()),
        expires_at: Utc::now() - Duration::minutes(5),
        scopes: docs_scopes(),
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn test_first_run_consents_and_later_runs_reuse() {
    let setup = setup();

    let first = setup.manager.acquire().await.unwrap();
    assert_eq!(first.access_token, "ya29.consented");
    assert!(first.expires_at > Utc::now());
    assert_eq!(setup.authorizer.consents.load(Ordering::SeqCst), 1);

    let persisted = read(setup.store.path());
    let stored: CredentialRecord = serde_json::from_str(&persisted).unwrap();
    assert_eq!(stored, first);

    let second = setup.manager.acquire().await.unwrap();
    assert_eq!(second, first);
    assert_eq!(setup.authorizer.consents.load(Ordering::SeqCst), 1);
    assert_eq!(setup.endpoint.refreshes.load(Ordering::SeqCst), 0);
    assert_eq!(read(setup.store.path()), persisted);
}

#[tokio::test]
async fn test_expired_record_is_refreshed_and_keeps_refresh_token() {
    let setup = setup();
    setup.store.save(&expired_record("1//stored")).await.unwrap();

    let record = setup.manager.acquire().await.unwrap();
    assert_eq!(record.access_token, "ya29.refreshed");
    assert_eq!(record.refresh_token.as_deref(), Some("1//stored"));
    assert!(record.expires_at > Utc::now());
    assert_eq!(setup.authorizer.consents.load(Ordering::SeqCst), 0);

    let stored = setup.store.load().await.unwrap().unwrap();
    assert_eq!(stored, record);
}

#[tokio::test]
async fn test_revoked_refresh_token_falls_back_to_consent() {
    let setup = setup();
    setup.store.save(&expired_record("revoked")).await.unwrap();

    let record = setup.manager.acquire().await.unwrap();
    assert_eq!(record.access_token, "ya29.consented");
    assert_eq!(setup.endpoint.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(setup.authorizer.consents.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreadable_record_is_replaced() {
    let setup = setup();
    std::fs::write(setup.store.path(), "{ not json").unwrap();

    let token = setup.manager.access_token().await.unwrap();
    assert_eq!(token, "ya29.consented");
    let stored = setup.store.load().await.unwrap().unwrap();
    assert_eq!(stored.access_token, "ya29.consented");
}
