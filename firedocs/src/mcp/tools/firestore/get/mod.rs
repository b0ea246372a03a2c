//! Firestore document read tool

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::FirestoreDocumentRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for reading a Firestore document
#[derive(Default)]
pub struct GetFirestoreDocumentTool;

impl GetFirestoreDocumentTool {
    /// Creates a new instance of the GetFirestoreDocumentTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for GetFirestoreDocumentTool {
    fn name(&self) -> &'static str {
        "firestore_get_document"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "collection": {
                    "type": "string",
                    "description": "Collection path"
                },
                "document_id": {
                    "type": "string",
                    "description": "Document id within the collection"
                }
            },
            "required": [
                "collection",
                "document_id"
            ]
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        context: &ToolContext,
    ) -> Result<Map<String, Value>> {
        let request: FirestoreDocumentRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_firestore_get_document(request).await
    }
}
