//! Realtime Database read tool

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::PathRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for reading the value at a database path
#[derive(Default)]
pub struct GetDataTool;

impl GetDataTool {
    /// Creates a new instance of the GetDataTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for GetDataTool {
    fn name(&self) -> &'static str {
        "get_data"
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
        context.tool_handlers.handle_get_data(request).await
    }
}
