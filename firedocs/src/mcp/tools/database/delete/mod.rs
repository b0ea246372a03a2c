//! Realtime Database delete tool

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::PathRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for removing a database path
#[derive(Default)]
pub struct DeleteDataTool;

impl DeleteDataTool {
    /// Creates a new instance of the DeleteDataTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for DeleteDataTool {
    fn name(&self) -> &'static str {
        "delete_data"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Slash-delimited database path"
                }
            },
            "required": [
                "path"
            ]
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        context: &ToolContext,
    ) -> Result<Map<String, Value>> {
        let request: PathRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_delete_data(request).await
    }
}
