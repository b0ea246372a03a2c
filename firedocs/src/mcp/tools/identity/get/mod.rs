//! User lookup tool for MCP operations

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::UserIdRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for looking up a user account
#[derive(Default)]
pub struct GetUserTool;

impl GetUserTool {
    /// Creates a new instance of the GetUserTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for GetUserTool {
    fn name(&self) -> &'static str {
        "get_user"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "uid": {
                    "type": "string",
                    "description": "The user's uid"
                }
            },
            "required": [
                "uid"
            ]
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        context: &ToolContext,
    ) -> Result<Map<String, Value>> {
        let request: UserIdRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_get_user(request).await
    }
}
