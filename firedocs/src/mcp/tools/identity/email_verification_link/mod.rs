//! Email verification link tool

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::EmailVerificationLinkRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for generating email verification links
#[derive(Default)]
pub struct EmailVerificationLinkTool;

impl EmailVerificationLinkTool {
    /// Creates a new instance of the EmailVerificationLinkTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for EmailVerificationLinkTool {
    fn name(&self) -> &'static str {
        "generate_email_verification_link"
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
                "action_url": {
                    "type": "string",
                    "description": "URL to continue to after verification"
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
        let request: EmailVerificationLinkRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_email_verification_link(request).await
    }
}
