//! Configuration management for firedocs
//!
//! Values are layered the same way for every process: built-in defaults, then
//! `FIREDOCS_*` environment variables, then a `firedocs.yaml` file (highest
//! precedence). The CLI applies its own flags on top of the result.

use crate::common::env_loader::EnvLoader;
use crate::error::FiredocsError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILENAME: &str = "firedocs.yaml";
const DEFAULT_SERVICE_ACCOUNT_KEY: &str = "service-account-key.json";
const DEFAULT_CLIENT_SECRET: &str = "credentials.json";
const DEFAULT_TOKEN_CACHE_FILE: &str = "google-docs-token.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const MAX_HTTP_TIMEOUT_SECS: u64 = 600;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file from disk
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        /// Path to the configuration file that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML content from a configuration file
    #[error("Invalid YAML syntax in {path}:\n{source}\n\nHint: Check for proper indentation and YAML formatting")]
    YamlParse {
        /// Path to the configuration file with invalid YAML content
        path: PathBuf,
        /// Underlying YAML parsing error
        #[source]
        source: serde_yaml::Error,
    },

    /// Invalid configuration value for a specific field
    #[error("Invalid configuration value for '{field}': {value}\n{hint}")]
    InvalidValue {
        /// Name of the configuration field
        field: String,
        /// The invalid value that was provided
        value: String,
        /// Helpful hint about how to fix the issue
        hint: String,
    },

    /// A file the backends need at startup does not exist
    #[error("Required file for '{field}' not found: {path}")]
    MissingFile {
        /// Name of the configuration field pointing at the file
        field: String,
        /// Path that was checked
        path: PathBuf,
    },
}

impl From<ConfigError> for FiredocsError {
    fn from(error: ConfigError) -> Self {
        FiredocsError::Config(error.to_string())
    }
}

/// Configuration settings for firedocs
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Firebase service-account key file (default: "service-account-key.json")
    pub service_account_key: PathBuf,
    /// OAuth client-secret file for the Google Docs client (default: "credentials.json")
    pub client_secret: PathBuf,
    /// Realtime Database URL; derived from the project id when unset
    pub database_url: Option<String>,
    /// Project id override; the service-account key's project is used when unset
    pub project_id: Option<String>,
    /// Where the Google Docs credential record is persisted
    pub token_cache: PathBuf,
    /// Timeout applied to every backend HTTP request (default: 30)
    pub http_timeout_secs: u64,
    /// Host name used in the OAuth loopback redirect URI (default: "localhost")
    pub oauth_redirect_host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_account_key: PathBuf::from(DEFAULT_SERVICE_ACCOUNT_KEY),
            client_secret: PathBuf::from(DEFAULT_CLIENT_SECRET),
            database_url: None,
            project_id: None,
            token_cache: Self::default_token_cache(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            oauth_redirect_host: "localhost".to_string(),
        }
    }
}

impl Config {
    /// Create a configuration instance with values loaded from:
    /// 1. YAML file (highest precedence)
    /// 2. Environment variables
    /// 3. Defaults (lowest precedence)
    ///
    /// An explicitly given YAML file must load; a discovered one that fails to
    /// load is logged and skipped.
    pub fn load(explicit_yaml: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_vars();

        match explicit_yaml {
            Some(path) => {
                let yaml_config = YamlConfig::load_from_file(path)?;
                yaml_config.apply_to_config(&mut config);
            }
            None => match YamlConfig::load_or_default() {
                Ok(yaml_config) => yaml_config.apply_to_config(&mut config),
                Err(e) => {
                    tracing::warn!(
                        "Failed to load YAML configuration, falling back to env vars and defaults: {}",
                        e
                    );
                }
            },
        }

        config.validate()?;
        Ok(config)
    }

    /// Default location of the persisted Google Docs credential
    pub fn default_token_cache() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join(".firedocs"))
            .unwrap_or_else(|| PathBuf::from(".firedocs"))
            .join(DEFAULT_TOKEN_CACHE_FILE)
    }

    /// Apply environment variable configuration to this config
    fn apply_env_vars(&mut self) {
        let loader = EnvLoader::new("FIREDOCS");

        self.service_account_key =
            loader.load_path("SERVICE_ACCOUNT_KEY", self.service_account_key.clone());
        self.client_secret = loader.load_path("CLIENT_SECRET", self.client_secret.clone());
        self.token_cache = loader.load_path("TOKEN_CACHE", self.token_cache.clone());
        if let Some(url) = loader.load_optional::<String>("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(project) = loader.load_optional::<String>("PROJECT_ID") {
            self.project_id = Some(project);
        }
        self.http_timeout_secs = loader.load_parsed("HTTP_TIMEOUT_SECS", self.http_timeout_secs);
        self.oauth_redirect_host =
            loader.load_string("OAUTH_REDIRECT_HOST", &self.oauth_redirect_host);
    }

    /// Find the firedocs.yaml configuration file
    ///
    /// The search order is:
    /// 1. Current working directory: `firedocs.yaml`
    /// 2. `~/.config/firedocs/firedocs.yaml`
    pub fn find_yaml_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(CONFIG_FILENAME)];
        if let Some(home_dir) = dirs::home_dir() {
            search_paths.push(home_dir.join(".config").join("firedocs").join(CONFIG_FILENAME));
        }

        let found = search_paths.into_iter().find(|path| path.is_file());
        match &found {
            Some(path) => tracing::debug!("Found configuration file: {:?}", path),
            None => tracing::debug!("No firedocs.yaml configuration file found"),
        }
        found
    }

    /// Validate the current configuration settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http_timeout_secs == 0 || self.http_timeout_secs > MAX_HTTP_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                field: "http_timeout_secs".to_string(),
                value: self.http_timeout_secs.to_string(),
                hint: format!("Timeout must be between 1 and {MAX_HTTP_TIMEOUT_SECS} seconds"),
            });
        }

        if let Some(url) = &self.database_url {
            let parsed = url::Url::parse(url).map_err(|e| ConfigError::InvalidValue {
                field: "database_url".to_string(),
                value: url.clone(),
                hint: format!("Expected an absolute URL such as https://my-app-default-rtdb.firebaseio.com ({e})"),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidValue {
                    field: "database_url".to_string(),
                    value: url.clone(),
                    hint: "Database URL must use http or https".to_string(),
                });
            }
        }

        if self.oauth_redirect_host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "oauth_redirect_host".to_string(),
                value: self.oauth_redirect_host.clone(),
                hint: "Redirect host cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Check that the service-account key and OAuth client secret exist
    pub fn require_files(&self) -> Result<(), ConfigError> {
        for (field, path) in [
            ("service_account_key", &self.service_account_key),
            ("client_secret", &self.client_secret),
        ] {
            if !path.is_file() {
                return Err(ConfigError::MissingFile {
                    field: field.to_string(),
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }
}

/// YAML configuration file contents; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YamlConfig {
    /// Firebase service-account key file
    pub service_account_key: Option<PathBuf>,
    /// OAuth client-secret file
    pub client_secret: Option<PathBuf>,
    /// Realtime Database URL
    pub database_url: Option<String>,
    /// Project id override
    pub project_id: Option<String>,
    /// Credential record location
    pub token_cache: Option<PathBuf>,
    /// HTTP timeout in seconds
    pub http_timeout_secs: Option<u64>,
    /// OAuth loopback redirect host
    pub oauth_redirect_host: Option<String>,
}

impl YamlConfig {
    /// Apply YAML configuration values to an existing Config
    /// YAML values take precedence over existing values
    pub fn apply_to_config(&self, config: &mut Config) {
        if let Some(ref path) = self.service_account_key {
            config.service_account_key = path.clone();
        }
        if let Some(ref path) = self.client_secret {
            config.client_secret = path.clone();
        }
        if let Some(ref url) = self.database_url {
            config.database_url = Some(url.clone());
        }
        if let Some(ref project) = self.project_id {
            config.project_id = Some(project.clone());
        }
        if let Some(ref path) = self.token_cache {
            config.token_cache = path.clone();
        }
        if let Some(timeout) = self.http_timeout_secs {
            config.http_timeout_secs = timeout;
        }
        if let Some(ref host) = self.oauth_redirect_host {
            config.oauth_redirect_host = host.clone();
        }
    }

    /// Load YAML configuration from a file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::info!("Loading YAML configuration from: {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        // An empty file is a valid, empty configuration
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Try to load YAML configuration, returning default if file not found
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Config::find_yaml_config_file() {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    fn clear_env() {
        for key in [
            "FIREDOCS_SERVICE_ACCOUNT_KEY",
            "FIREDOCS_CLIENT_SECRET",
            "FIREDOCS_TOKEN_CACHE",
            "FIREDOCS_DATABASE_URL",
            "FIREDOCS_PROJECT_ID",
            "FIREDOCS_HTTP_TIMEOUT_SECS",
            "FIREDOCS_OAUTH_REDIRECT_HOST",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(
            config.service_account_key,
            PathBuf::from("service-account-key.json")
        );
        assert_eq!(config.client_secret, PathBuf::from("credentials.json"));
        assert_eq!(config.http_timeout_secs, 30);
        assert!(config.token_cache.ends_with("google-docs-token.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_overrides_defaults_and_yaml_overrides_env() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let yaml_path = temp_dir.path().join("firedocs.yaml");
        std::fs::write(&yaml_path, "project_id: from-yaml\n").unwrap();

        env::set_var("FIREDOCS_PROJECT_ID", "from-env");
        env::set_var("FIREDOCS_HTTP_TIMEOUT_SECS", "45");

        let config = Config::load(Some(&yaml_path)).unwrap();
        assert_eq!(config.project_id.as_deref(), Some("from-yaml"));
        assert_eq!(config.http_timeout_secs, 45);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_explicit_yaml_errors_are_fatal() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let yaml_path = temp_dir.path().join("firedocs.yaml");
        std::fs::write(&yaml_path, "no_such_key: true\n").unwrap();

        let result = Config::load(Some(&yaml_path));
        assert!(matches!(result, Err(ConfigError::YamlParse { .. })));

        let missing = temp_dir.path().join("missing.yaml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(ConfigError::FileRead { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            http_timeout_secs: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "http_timeout_secs"
        ));

        let config = Config {
            database_url: Some("ftp://example.com".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            database_url: Some("not a url".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_require_files() {
        let temp_dir = TempDir::new().unwrap();
        let key = temp_dir.path().join("key.json");
        let secret = temp_dir.path().join("secret.json");
        std::fs::write(&key, "{}").unwrap();

        let config = Config {
            service_account_key: key,
            client_secret: secret.clone(),
            ..Config::default()
        };
        match config.require_files() {
            Err(ConfigError::MissingFile { field, path }) => {
                assert_eq!(field, "client_secret");
                assert_eq!(path, secret);
            }
            other => panic!("expected missing client secret, got {other:?}"),
        }

        std::fs::write(&secret, "{}").unwrap();
        assert!(config.require_files().is_ok());
    }
}
