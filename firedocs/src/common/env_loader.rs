//! Environment variable loading utilities
//!
//! Typed lookups with fallbacks, used to layer `FIREDOCS_*` variables over the
//! configuration defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Load an environment variable with a string default
pub fn load_env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Load an environment variable with type conversion and default
///
/// A value that does not parse is logged and replaced by `default`.
pub fn load_env_parsed<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    let Ok(raw) = env::var(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a valid value", key, raw);
            default
        }
    }
}

/// Load an environment variable as an Option<T>
///
/// Empty values count as unset.
pub fn load_env_optional<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| v.parse().ok())
}

/// Builder for loading multiple environment variables with consistent prefix
#[derive(Debug)]
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    /// Create a new environment loader with the given prefix
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    fn key(&self, suffix: &str) -> String {
        format!("{}_{}", self.prefix, suffix)
    }

    /// Load a string value with default
    pub fn load_string(&self, suffix: &str, default: &str) -> String {
        load_env_string(&self.key(suffix), default)
    }

    /// Load a parsed value with default
    pub fn load_parsed<T>(&self, suffix: &str, default: T) -> T
    where
        T: FromStr,
    {
        load_env_parsed(&self.key(suffix), default)
    }

    /// Load an optional value
    pub fn load_optional<T>(&self, suffix: &str) -> Option<T>
    where
        T: FromStr,
    {
        load_env_optional(&self.key(suffix))
    }

    /// Load a path, keeping `current` when the variable is unset
    pub fn load_path(&self, suffix: &str, current: PathBuf) -> PathBuf {
        self.load_optional::<PathBuf>(suffix).unwrap_or(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_env_string() {
        let key = "FIREDOCS_TEST_STRING_VAR";
        let default = "default_value";

        env::remove_var(key);
        assert_eq!(load_env_string(key, default), default);

        env::set_var(key, "test_value");
        assert_eq!(load_env_string(key, default), "test_value");

        env::remove_var(key);
    }

    #[test]
    #[serial]
    fn test_load_env_parsed() {
        let key = "FIREDOCS_TEST_PARSED_VAR";
        let default = 42u64;

        env::remove_var(key);
        assert_eq!(load_env_parsed(key, default), default);

        env::set_var(key, "123");
        assert_eq!(load_env_parsed::<u64>(key, default), 123);

        // Unparseable values fall back to the default
        env::set_var(key, "invalid");
        assert_eq!(load_env_parsed(key, default), default);

        env::remove_var(key);
    }

    #[test]
    #[serial]
    fn test_load_env_optional_treats_empty_as_unset() {
        let key = "FIREDOCS_TEST_OPTIONAL_VAR";

        env::remove_var(key);
        assert_eq!(load_env_optional::<String>(key), None);

        env::set_var(key, "   ");
        assert_eq!(load_env_optional::<String>(key), None);

        env::set_var(key, "value");
        assert_eq!(load_env_optional::<String>(key), Some("value".to_string()));

        env::remove_var(key);
    }

    #[test]
    #[serial]
    fn test_env_loader_prefix() {
        let loader = EnvLoader::new("FIREDOCS_LOADER_TEST");

        env::remove_var("FIREDOCS_LOADER_TEST_PATH");
        assert_eq!(
            loader.load_path("PATH", PathBuf::from("fallback.json")),
            PathBuf::from("fallback.json")
        );

        env::set_var("FIREDOCS_LOADER_TEST_PATH", "/tmp/key.json");
        assert_eq!(
            loader.load_path("PATH", PathBuf::from("fallback.json")),
            PathBuf::from("/tmp/key.json")
        );

        env::remove_var("FIREDOCS_LOADER_TEST_PATH");
    }
}
