//! Common utilities module
//!
//! Small helpers shared by configuration loading and the backend clients.

/// Environment variable loading utilities
pub mod env_loader;

pub use env_loader::{load_env_optional, load_env_parsed, load_env_string, EnvLoader};
