//! User update tool
//!
//! Only the fields present in the call are sent; everything else on the
//! account is left as it was.

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::UpdateUserRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for changing a user account
#[derive(Default)]
pub struct UpdateUserTool;

impl UpdateUserTool {
    /// Creates a new instance of the UpdateUserTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for UpdateUserTool {
    fn name(&self) -> &'static str {
        "update_user"
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
                },
                "email": {
                    "type": "string",
                    "description": "New email address"
                },
                "display_name": {
                    "type": "string",
                    "description": "New display name"
                },
                "password": {
                    "type": "string",
                    "description": "New password"
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
        let request: UpdateUserRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_update_user(request).await
    }
}
