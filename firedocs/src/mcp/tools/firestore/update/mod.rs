//! Firestore field update tool

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::FirestoreUpdateDocumentRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for updating fields of a Firestore document
#[derive(Default)]
pub struct UpdateFirestoreDocumentTool;

impl UpdateFirestoreDocumentTool {
    /// Creates a new instance of the UpdateFirestoreDocumentTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for UpdateFirestoreDocumentTool {
    fn name(&self) -> &'static str {
        "firestore_update_document"
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
                },
                "data": {
                    "type": "object",
                    "description": "Fields to overwrite"
                }
            },
            "required": [
                "collection",
                "document_id",
                "data"
            ]
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        context: &ToolContext,
    ) -> Result<Map<String, Value>> {
        let request: FirestoreUpdateDocumentRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_firestore_update_document(request).await
    }
}
