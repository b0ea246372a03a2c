//! User account creation tool

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::CreateUserRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for creating user accounts
#[derive(Default)]
pub struct CreateUserTool;

impl CreateUserTool {
    /// Creates a new instance of the CreateUserTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for CreateUserTool {
    fn name(&self) -> &'static str {
        "create_user"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "email": {
                    "type": "string",
                    "description": "Email address of the new user"
                },
                "password": {
                    "type": "string",
                    "description": "Initial password, at least 6 characters"
                },
                "display_name": {
                    "type": "string",
                    "description": "Optional display name"
                }
            },
            "required": [
                "email",
                "password"
            ]
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        context: &ToolContext,
    ) -> Result<Map<String, Value>> {
        let request: CreateUserRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_create_user(request).await
    }
}
