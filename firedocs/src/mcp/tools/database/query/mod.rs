//! Realtime Database query tool
//!
//! Children are ordered first and the limit is applied to the ordered list.

use crate::error::Result;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::QueryDataRequest;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Tool for ordered reads of database children
#[derive(Default)]
pub struct QueryDataTool;

impl QueryDataTool {
    /// Creates a new instance of the QueryDataTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for QueryDataTool {
    fn name(&self) -> &'static str {
        "query_data"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Slash-delimited database path"
                },
                "order_by": {
                    "type": "string",
                    "description": "`$key`, `$value`, or a child path to order by"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Return only the first N children after ordering"
                }
            },
            "required": [
                "path"
            ]
        })
    }

    async fn execute(
        &self,
        arguments: Map<String, Value>,
        context: &ToolContext,
    ) -> Result<Map<String, Value>> {
        let request: QueryDataRequest = BaseToolImpl::parse_arguments(arguments)?;
        context.tool_handlers.handle_query_data(request).await
    }
}
