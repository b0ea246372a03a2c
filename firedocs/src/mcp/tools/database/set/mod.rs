//! Realtime Database write tool

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::SetDataRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for writing a value at a database path
#[derive(Default)]
pub struct SetDataTool;

impl SetDataTool {
    /// Creates a new instance of the SetDataTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for SetDataTool {
    fn name(&self) -> &'static str {
        "set_data"
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
                    "description": "Slash-delimited database path, such as users/123"
                },
                "data": {
                    "description": "JSON value to store at the path"
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
        let request: SetDataRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_set_data(request).await
    }
}
