//! Wiring of the REST backends from configuration

use super::firestore::Firestore;
use super::google_docs::GoogleDocs;
use super::http::build_client;
use super::identity_toolkit::IdentityToolkit;
use super::realtime_db::RealtimeDatabase;
use super::Backends;
use crate::auth::{
    docs_scopes, firebase_scopes, ClientSecrets, CredentialManager, FileCredentialStore,
    GoogleTokenEndpoint, LoopbackAuthorizer, ServiceAccountKey, ServiceAccountTokenSource,
};
use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;

/// REST backends together with the Docs credential manager they share
pub struct RemoteBackends {
    /// The four ports
    pub backends: Backends,
    /// Manager of the persisted Google Docs credential
    pub credentials: Arc<CredentialManager>,
    /// Firebase project the ports talk to
    pub project_id: String,
}

impl RemoteBackends {
    /// Build every port from `config`
    ///
    /// Fails if the service-account key or the OAuth client secret cannot be
    /// loaded. No network call is made here.
    pub fn connect(config: &Config) -> Result<Self> {
        config.require_files()?;
        let http = build_client(config.http_timeout_secs)?;

        let key = ServiceAccountKey::from_file(&config.service_account_key)?;
        let project_id = config
            .project_id
            .clone()
            .unwrap_or_else(|| key.project_id.clone());
        let firebase_tokens = Arc::new(ServiceAccountTokenSource::new(
            key,
            firebase_scopes(),
            http.clone(),
        )?);

        let database_url = config
            .database_url
            .clone()
            .unwrap_or_else(|| RealtimeDatabase::default_url(&project_id));
        tracing::info!(
            "Connecting to project {} (database {})",
            project_id,
            database_url
        );

        let credentials = Arc::new(credential_manager(config, http.clone())?);

        let backends = Backends {
            identity: Arc::new(IdentityToolkit::new(
                &project_id,
                http.clone(),
                firebase_tokens.clone(),
            )),
            tree_store: Arc::new(RealtimeDatabase::new(
                &database_url,
                http.clone(),
                firebase_tokens.clone(),
            )?),
            document_store: Arc::new(Firestore::new(&project_id, http.clone(), firebase_tokens)?),
            docs: Arc::new(GoogleDocs::new(http, credentials.clone())),
        };

        Ok(Self {
            backends,
            credentials,
            project_id,
        })
    }
}

/// Credential manager for the Google Docs scopes, persisting to the configured token cache
pub fn credential_manager(config: &Config, http: reqwest::Client) -> Result<CredentialManager> {
    let secrets = ClientSecrets::from_file(&config.client_secret)?;
    let endpoint = Arc::new(GoogleTokenEndpoint::new(secrets.clone(), http));
    let authorizer = Arc::new(LoopbackAuthorizer::new(
        secrets,
        endpoint.clone(),
        config.oauth_redirect_host.clone(),
    ));
    let store = Arc::new(FileCredentialStore::new(config.token_cache.clone()));
    Ok(CredentialManager::new(store, endpoint, authorizer, docs_scopes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FiredocsError;
    use tempfile::TempDir;

    #[test]
    fn test_connect_requires_key_files() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            service_account_key: dir.path().join("missing-key.json"),
            client_secret: dir.path().join("missing-secret.json"),
            ..Config::default()
        };
        let err = RemoteBackends::connect(&config).err().unwrap();
        assert!(matches!(err, FiredocsError::Config(_)));
        assert!(err.to_string().contains("service_account_key"));
    }

    #[test]
    fn test_credential_manager_uses_docs_scopes() {
        let dir = TempDir::new().unwrap();
        let secret = dir.path().join("credentials.json");
        std::fs::write(
            &secret,
            r#"{"installed":{"client_id":"id","client_secret":"s","auth_uri":"https://accounts.google.com/o/oauth2/auth","token_uri":"https://oauth2.googleapis.com/token"}}"#,
        )
        .unwrap();
        let config = Config {
            client_secret: secret,
            token_cache: dir.path().join("token.json"),
            ..Config::default()
        };
        let manager = credential_manager(&config, reqwest::Client::new()).unwrap();
        assert_eq!(manager.scopes(), docs_scopes().as_slice());
    }
}
