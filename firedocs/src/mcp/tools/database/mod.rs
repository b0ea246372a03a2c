//! Realtime Database tools
//!
//! Paths are slash-delimited and normalized before use; see
//! [`crate::backends::DatabasePath`].

pub mod delete;
pub mod get;
pub mod query;
pub mod set;
pub mod update;

use crate::mcp::tool_registry::ToolRegistry;

/// Register all Realtime Database tools with the registry
pub fn register_database_tools(registry: &mut ToolRegistry) {
    registry.register(set::SetDataTool::new());
    registry.register(get::GetDataTool::new());
    registry.register(update::UpdateDataTool::new());
    registry.register(delete::DeleteDataTool::new());
    registry.register(query::QueryDataTool::new());
}
