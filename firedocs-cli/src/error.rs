//! Error handling for the firedocs CLI
//!
//! Errors keep their source chain and carry the exit code the process should
//! end with.

use crate::exit_codes::{EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_SUCCESS};
use std::error::Error;
use std::fmt;

/// CLI-specific result type that preserves error information
pub type CliResult<T> = Result<T, CliError>;

/// CLI error type that includes both error information and suggested exit code
#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub exit_code: i32,
    pub source: Option<Box<dyn Error + Send + Sync>>,
}

impl CliError {
    /// Create a new CLI error with a message and exit code
    pub fn new(message: impl Into<String>, exit_code: i32) -> Self {
        Self {
            message: message.into(),
            exit_code,
            source: None,
        }
    }

    /// Create a CLI error from another error with a specific exit code
    pub fn from_error<E: Error + Send + Sync + 'static>(error: E, exit_code: i32) -> Self {
        Self {
            message: error.to_string(),
            exit_code,
            source: Some(Box::new(error)),
        }
    }

    /// Create a CLI error from startup plumbing, keeping the context chain in the message
    pub fn from_anyhow(error: anyhow::Error, exit_code: i32) -> Self {
        Self::new(format!("{error:#}"), exit_code)
    }

    /// Create a CLI error with the general failure exit code
    pub fn general<E: Error + Send + Sync + 'static>(error: E) -> Self {
        Self::from_error(error, EXIT_FAILURE)
    }

    /// Create a CLI error with the configuration failure exit code
    pub fn config<E: Error + Send + Sync + 'static>(error: E) -> Self {
        Self::from_error(error, EXIT_CONFIG_ERROR)
    }

    /// Get the full error chain as a formatted string
    pub fn full_chain(&self) -> String {
        let mut result = self.message.clone();

        let mut current_source = self.source();
        while let Some(err) = current_source {
            result.push_str(&format!("\n  Caused by: {err}"));
            current_source = err.source();
        }

        result
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {
    // The message already is the wrapped error's text, so the chain starts below it
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .and_then(|e| e.source())
    }
}

/// Startup failures from the library map to exit codes by kind
impl From<firedocs::FiredocsError> for CliError {
    fn from(error: firedocs::FiredocsError) -> Self {
        match error {
            firedocs::FiredocsError::Config(_) | firedocs::FiredocsError::InvalidArguments(_) => {
                Self::config(error)
            }
            other => Self::general(other),
        }
    }
}

impl From<firedocs::ConfigError> for CliError {
    fn from(error: firedocs::ConfigError) -> Self {
        Self::config(error)
    }
}

/// Convert a CliResult to an exit code, printing the full error chain if needed
pub fn handle_cli_result<T>(result: CliResult<T>) -> i32 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            tracing::error!("{}", e.message);
            eprintln!("Error: {}", e.full_chain());
            e.exit_code
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firedocs::FiredocsError;

    #[test]
    fn test_config_errors_use_config_exit_code() {
        let error = CliError::from(FiredocsError::Config("missing key".to_string()));
        assert_eq!(error.exit_code, EXIT_CONFIG_ERROR);

        let error = CliError::from(FiredocsError::Credential("denied".to_string()));
        assert_eq!(error.exit_code, EXIT_FAILURE);
    }

    #[test]
    fn test_full_chain_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let error = CliError::general(FiredocsError::Io(io));
        assert_eq!(
            error.full_chain(),
            "IO error: no such file\n  Caused by: no such file"
        );
    }

    #[test]
    fn test_anyhow_context_is_kept() {
        let error = anyhow::anyhow!("inner").context("outer");
        let error = CliError::from_anyhow(error, EXIT_CONFIG_ERROR);
        assert_eq!(error.message, "outer: inner");
        assert_eq!(handle_cli_result::<()>(Err(error)), EXIT_CONFIG_ERROR);
    }
}
