//! Realtime Database multi-child update tool

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::UpdateDataRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for merging children into a database path
#[derive(Default)]
pub struct UpdateDataTool;

impl UpdateDataTool {
    /// Creates a new instance of the UpdateDataTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for UpdateDataTool {
    fn name(&self) -> &'static str {
        "update_data"
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
                },
                "data": {
                    "type": "object",
                    "description": "Children to write, keyed by path relative to `path`"
                }
            },
            "required": [
                "path",
                "data"
            ]
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        context: &ToolContext,
    ) -> Result<Map<String, Value>> {
        let request: UpdateDataRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_update_data(request).await
    }
}
