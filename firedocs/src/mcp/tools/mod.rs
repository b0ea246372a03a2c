//! MCP tools, one submodule per backend
//!
//! Tools are grouped by the service they call. Each family exposes a
//! `register_*_tools` function and [`register_all_tools`] wires them all up.

pub mod database;
pub mod docs;
pub mod firestore;
pub mod identity;

use super::tool_registry::ToolRegistry;

pub use database::register_database_tools;
pub use docs::register_docs_tools;
pub use firestore::register_firestore_tools;
pub use identity::register_identity_tools;

/// Register every firedocs tool with the registry
pub fn register_all_tools(registry: &mut ToolRegistry) {
    register_identity_tools(registry);
    register_database_tools(registry);
    register_firestore_tools(registry);
    register_docs_tools(registry);
}
