//! Cloud Firestore tools

pub mod create;
pub mod delete;
pub mod get;
pub mod list_collections;
pub mod list_documents;
pub mod update;

use crate::mcp::tool_registry::ToolRegistry;

/// Register all Firestore tools with the registry
pub fn register_firestore_tools(registry: &mut ToolRegistry) {
    registry.register(list_collections::ListCollectionsTool::new());
    registry.register(list_documents::ListDocumentsTool::new());
    registry.register(get::GetFirestoreDocumentTool::new());
    registry.register(create::CreateFirestoreDocumentTool::new());
    registry.register(update::UpdateFirestoreDocumentTool::new());
    registry.register(delete::DeleteFirestoreDocumentTool::new());
}
