//! Firestore document deletion tool

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::FirestoreDocumentRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for deleting a Firestore document
#[derive(Default)]
pub struct DeleteFirestoreDocumentTool;

impl DeleteFirestoreDocumentTool {
    /// Creates a new instance of the DeleteFirestoreDocumentTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for DeleteFirestoreDocumentTool {
    fn name(&self) -> &'static str {
        "firestore_delete_document"
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
        context.tool_handlers.handle_firestore_delete_document(request).await
    }
}
