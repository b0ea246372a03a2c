//! # firedocs
//!
//! MCP tools for Firebase and Google Docs.
//!
//! ## Features
//!
//! - **Firebase Authentication**: create, read, update, delete and list users,
//!   and generate email verification and password reset links
//! - **Realtime Database**: set, get, update, delete and ordered queries on
//!   slash-delimited paths
//! - **Cloud Firestore**: collections and documents with JSON data
//! - **Google Docs**: read and create documents as the signed-in user
//! - **Credential lifecycle**: a persisted OAuth2 credential that is reused,
//!   refreshed, or re-obtained through the browser consent flow as needed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use firedocs::backends::memory::MemoryBackends;
//! use firedocs::mcp::{ToolContext, ToolHandlers, ToolRegistry};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let memory = MemoryBackends::new();
//! let registry = ToolRegistry::with_all_tools();
//! let context = ToolContext::new(Arc::new(ToolHandlers::new(memory.backends())));
//!
//! let args = serde_json::json!({"path": "users/123", "data": {"name": "Ana"}});
//! let envelope = registry
//!     .call_tool("set_data", args.as_object().cloned().unwrap_or_default(), &context)
//!     .await;
//! assert!(envelope.is_success());
//! # }
//! ```

#![warn(missing_docs)]

/// Credentials for the Google backends
pub mod auth;

/// Backend ports and their REST and in-memory implementations
pub mod backends;

/// Shared helpers
pub mod common;

/// Configuration loading
pub mod config;

/// Error types
pub mod error;

/// Model Context Protocol (MCP) server support
pub mod mcp;

pub use auth::{AccessTokenProvider, CredentialManager, CredentialRecord};
pub use backends::{Backends, RemoteBackends};
pub use config::{Config, ConfigError};
pub use error::{BackendErrorKind, FiredocsError, Result};
pub use mcp::{McpServer, ToolEnvelope, ToolRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
