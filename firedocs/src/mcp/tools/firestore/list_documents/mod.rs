//! Firestore document listing tool

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::CollectionRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for listing the documents of a collection
#[derive(Default)]
pub struct ListDocumentsTool;

impl ListDocumentsTool {
    /// Creates a new instance of the ListDocumentsTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for ListDocumentsTool {
    fn name(&self) -> &'static str {
        "firestore_list_documents"
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
                    "description": "Collection path, such as users or users/u1/orders"
                }
            },
            "required": [
                "collection"
            ]
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        context: &ToolContext,
    ) -> Result<Map<String, Value>> {
        let request: CollectionRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_firestore_list_documents(request).await
    }
}
