//! Unified error handling for the firedocs library
//!
//! Every backend port operation returns [`Result`]. The tool dispatch layer turns
//! any [`FiredocsError`] into a failure envelope using its `Display` text, so the
//! messages here are what an MCP client ultimately reads.

use std::fmt;
use std::io;
use thiserror::Error;

/// Classification of a failure reported by a remote backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BackendErrorKind {
    /// The backend rejected the request arguments
    InvalidArgument,
    /// The addressed entity does not exist
    NotFound,
    /// The entity being created already exists
    AlreadyExists,
    /// The caller is authenticated but not allowed to perform the operation
    PermissionDenied,
    /// The caller's credentials were rejected
    Unauthenticated,
    /// Quota or rate limits were exceeded
    ResourceExhausted,
    /// The backend could not be reached or is temporarily unavailable
    Unavailable,
    /// The backend failed internally
    Internal,
    /// Anything the classifier did not recognise
    Unknown,
}

impl BackendErrorKind {
    /// Map an HTTP status code to a failure class
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 412 | 422 => Self::InvalidArgument,
            401 => Self::Unauthenticated,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            409 => Self::AlreadyExists,
            429 => Self::ResourceExhausted,
            500 => Self::Internal,
            502..=504 => Self::Unavailable,
            _ => Self::Unknown,
        }
    }

    /// Map a Google RPC status name (e.g. `NOT_FOUND`) or an Identity Toolkit
    /// error code (e.g. `USER_NOT_FOUND`) to a failure class
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        let kind = match code {
            "INVALID_ARGUMENT" | "FAILED_PRECONDITION" | "OUT_OF_RANGE" => Self::InvalidArgument,
            "NOT_FOUND" | "USER_NOT_FOUND" | "EMAIL_NOT_FOUND" => Self::NotFound,
            "ALREADY_EXISTS" | "EMAIL_EXISTS" | "DUPLICATE_LOCAL_ID" => Self::AlreadyExists,
            "PERMISSION_DENIED" | "INSUFFICIENT_PERMISSION" => Self::PermissionDenied,
            "UNAUTHENTICATED" | "INVALID_ID_TOKEN" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => {
                Self::Unauthenticated
            }
            "RESOURCE_EXHAUSTED" | "QUOTA_EXCEEDED" | "TOO_MANY_ATTEMPTS_TRY_LATER" => {
                Self::ResourceExhausted
            }
            "UNAVAILABLE" | "DEADLINE_EXCEEDED" => Self::Unavailable,
            "INTERNAL" | "INTERNAL_ERROR" | "DATA_LOSS" => Self::Internal,
            _ if code.starts_with("INVALID_") || code.starts_with("MISSING_") => {
                Self::InvalidArgument
            }
            _ if code.starts_with("WEAK_PASSWORD") => Self::InvalidArgument,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InvalidArgument => "invalid argument",
            Self::NotFound => "not found",
            Self::AlreadyExists => "already exists",
            Self::PermissionDenied => "permission denied",
            Self::Unauthenticated => "unauthenticated",
            Self::ResourceExhausted => "resource exhausted",
            Self::Unavailable => "unavailable",
            Self::Internal => "internal error",
            Self::Unknown => "unknown error",
        };
        f.write_str(text)
    }
}

/// The main error type for the firedocs library
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FiredocsError {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Tool arguments were missing or malformed
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// No tool with this name is registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A remote backend rejected or failed the request
    #[error("{service} {kind}: {message}")]
    Backend {
        /// Which backend produced the failure
        service: &'static str,
        /// Failure class
        kind: BackendErrorKind,
        /// Message text reported by the backend
        message: String,
    },

    /// The request never produced a response (DNS, TLS, connection, timeout)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Obtaining or refreshing an OAuth credential failed
    #[error("Credential error: {0}")]
    Credential(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A document was created but filling it with content failed
    #[error("Document {document_id} was created but inserting its content failed: {source}")]
    PartialCreate {
        /// Id of the document left behind by the first phase
        document_id: String,
        /// Failure of the second phase
        #[source]
        source: Box<FiredocsError>,
    },

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl FiredocsError {
    /// Construct a backend failure
    pub fn backend(
        service: &'static str,
        kind: BackendErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self::Backend {
            service,
            kind,
            message: message.into(),
        }
    }

    /// Construct a not-found backend failure
    pub fn not_found(service: &'static str, message: impl Into<String>) -> Self {
        Self::backend(service, BackendErrorKind::NotFound, message)
    }

    /// Construct an argument error
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    /// The backend failure class, if this error came from a backend
    pub fn backend_kind(&self) -> Option<BackendErrorKind> {
        match self {
            Self::Backend { kind, .. } => Some(*kind),
            Self::Network(_) => Some(BackendErrorKind::Unavailable),
            Self::PartialCreate { source, .. } => source.backend_kind(),
            _ => None,
        }
    }

    /// Whether this is a backend not-found failure
    pub fn is_not_found(&self) -> bool {
        self.backend_kind() == Some(BackendErrorKind::NotFound)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, FiredocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(BackendErrorKind::from_status(404), BackendErrorKind::NotFound);
        assert_eq!(
            BackendErrorKind::from_status(403),
            BackendErrorKind::PermissionDenied
        );
        assert_eq!(
            BackendErrorKind::from_status(400),
            BackendErrorKind::InvalidArgument
        );
        assert_eq!(
            BackendErrorKind::from_status(503),
            BackendErrorKind::Unavailable
        );
        assert_eq!(BackendErrorKind::from_status(418), BackendErrorKind::Unknown);
    }

    #[test]
    fn test_code_classification() {
        assert_eq!(
            BackendErrorKind::from_code("USER_NOT_FOUND"),
            Some(BackendErrorKind::NotFound)
        );
        assert_eq!(
            BackendErrorKind::from_code("EMAIL_EXISTS"),
            Some(BackendErrorKind::AlreadyExists)
        );
        assert_eq!(
            BackendErrorKind::from_code("INVALID_EMAIL"),
            Some(BackendErrorKind::InvalidArgument)
        );
        assert_eq!(
            BackendErrorKind::from_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            Some(BackendErrorKind::InvalidArgument)
        );
        assert_eq!(BackendErrorKind::from_code("SOMETHING_ELSE"), None);
    }

    #[test]
    fn test_backend_error_message() {
        let err = FiredocsError::not_found("identity", "no user record for uid 'abc'");
        assert_eq!(
            err.to_string(),
            "identity not found: no user record for uid 'abc'"
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_partial_create_names_document() {
        let err = FiredocsError::PartialCreate {
            document_id: "doc-123".to_string(),
            source: Box::new(FiredocsError::backend(
                "docs",
                BackendErrorKind::PermissionDenied,
                "caller lacks write access",
            )),
        };
        let message = err.to_string();
        assert!(message.contains("doc-123"));
        assert!(message.contains("caller lacks write access"));
        assert_eq!(err.backend_kind(), Some(BackendErrorKind::PermissionDenied));
    }
}
