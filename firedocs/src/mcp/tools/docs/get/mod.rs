//! Google Docs read tool

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::DocumentIdRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for reading a Google Docs document
#[derive(Default)]
pub struct GetDocumentTool;

impl GetDocumentTool {
    /// Creates a new instance of the GetDocumentTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for GetDocumentTool {
    fn name(&self) -> &'static str {
        "get_document"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "document_id": {
                    "type": "string",
                    "description": "Google Docs document id"
                }
            },
            "required": [
                "document_id"
            ]
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        context: &ToolContext,
    ) -> Result<Map<String, Value>> {
        let request: DocumentIdRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_get_document(request).await
    }
}
