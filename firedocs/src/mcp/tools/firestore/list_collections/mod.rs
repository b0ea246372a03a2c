//! Firestore collection listing tool

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::EmptyRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for listing root collections
#[derive(Default)]
pub struct ListCollectionsTool;

impl ListCollectionsTool {
    /// Creates a new instance of the ListCollectionsTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for ListCollectionsTool {
    fn name(&self) -> &'static str {
        "firestore_list_collections"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        context: &ToolContext,
    ) -> Result<Map<String, Value>> {
        let request: EmptyRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_firestore_list_collections(request).await
    }
}
