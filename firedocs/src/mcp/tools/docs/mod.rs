//! Google Docs tools

pub mod create;
pub mod get;

use crate::mcp::tool_registry::ToolRegistry;

/// Register the Google Docs tools with the registry
pub fn register_docs_tools(registry: &mut ToolRegistry) {
    registry.register(get::GetDocumentTool::new());
    registry.register(create::CreateDocumentTool::new());
}
