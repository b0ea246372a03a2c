//! Password reset link tool

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::PasswordResetLinkRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for generating password reset links
#[derive(Default)]
pub struct PasswordResetLinkTool;

impl PasswordResetLinkTool {
    /// Creates a new instance of the PasswordResetLinkTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for PasswordResetLinkTool {
    fn name(&self) -> &'static str {
        "generate_password_reset_link"
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
                    "description": "Email address of the account"
                },
                "action_url": {
                    "type": "string",
                    "description": "URL to continue to after the reset"
                }
            },
            "required": [
                "email"
            ]
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        context: &ToolContext,
    ) -> Result<Map<String, Value>> {
        let request: PasswordResetLinkRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_password_reset_link(request).await
    }
}
