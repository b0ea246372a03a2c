//! Firestore document creation tool
//!
//! This module provides the CreateFirestoreDocumentTool for adding documents
//! through the MCP protocol.

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::FirestoreCreateDocumentRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for creating a Firestore document
#[derive(Default)]
pub struct CreateFirestoreDocumentTool;

impl CreateFirestoreDocumentTool {
    /// Creates a new instance of the CreateFirestoreDocumentTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for CreateFirestoreDocumentTool {
    fn name(&self) -> &'static str {
        "firestore_create_document"
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
                "data": {
                    "type": "object",
                    "description": "Document fields"
                },
                "document_id": {
                    "type": "string",
                    "description": "Id for the new document; generated when absent"
                }
            },
            "required": [
                "collection",
                "data"
            ]
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        context: &ToolContext,
    ) -> Result<Map<String, Value>> {
        let request: FirestoreCreateDocumentRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_firestore_create_document(request).await
    }
}
