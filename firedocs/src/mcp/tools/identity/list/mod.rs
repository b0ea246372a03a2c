//! User listing tool for MCP operations

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::EmptyRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for listing user accounts
#[derive(Default)]
pub struct ListUsersTool;

impl ListUsersTool {
    /// Creates a new instance of the ListUsersTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for ListUsersTool {
    fn name(&self) -> &'static str {
        "list_users"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        context: &ToolContext,
    ) -> Result<Map<String, Value>> {
        let request: EmptyRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_list_users(request).await
    }
}
