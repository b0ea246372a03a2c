//! Google Docs creation tool
//!
//! Creation happens in two steps: the Drive file, then the initial text.

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::CreateDocumentRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for creating a Google Docs document
#[derive(Default)]
pub struct CreateDocumentTool;

impl CreateDocumentTool {
    /// Creates a new instance of the CreateDocumentTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for CreateDocumentTool {
    fn name(&self) -> &'static str {
        "create_document"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Title of the new document"
                },
                "content": {
                    "type": "string",
                    "description": "Initial body text; empty by default",
                    "default": ""
                }
            },
            "required": [
                "title"
            ]
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        context: &ToolContext,
    ) -> Result<Map<String, Value>> {
        let request: CreateDocumentRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_create_document(request).await
    }
}
