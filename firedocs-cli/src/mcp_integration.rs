//! Integration layer for calling MCP tools from CLI commands
//!
//! The `call` and `tools` commands go through the same registry and handlers
//! as the MCP server, so a tool behaves the same from both surfaces.

use firedocs::backends::Backends;
use firedocs::mcp::{ToolContext, ToolEnvelope, ToolHandlers, ToolRegistry};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::{CliError, CliResult};
use crate::exit_codes::EXIT_CONFIG_ERROR;

/// CLI-specific tool context that can execute MCP tools
pub struct CliToolContext {
    tool_registry: ToolRegistry,
    tool_context: ToolContext,
}

impl CliToolContext {
    /// Create a tool context over the given backends
    pub fn new(backends: Backends) -> Self {
        Self {
            tool_registry: ToolRegistry::with_all_tools(),
            tool_context: ToolContext::new(Arc::new(ToolHandlers::new(backends))),
        }
    }

    /// Execute a tool by name
    pub async fn execute_tool(
        &self,
        tool_name: &str,
        arguments: Map<String, Value>,
    ) -> ToolEnvelope {
        self.tool_registry
            .call_tool(tool_name, arguments, &self.tool_context)
            .await
    }

    /// Names of every registered tool
    pub fn tool_names(&self) -> Vec<String> {
        self.tool_registry.list_tool_names()
    }
}

/// Parse the `--args` JSON text into an argument map
pub fn parse_tool_arguments(raw: &str) -> CliResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(_) => Err(CliError::new(
            "Tool arguments must be a JSON object",
            EXIT_CONFIG_ERROR,
        )),
        Err(e) => Err(CliError::from_error(e, EXIT_CONFIG_ERROR)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_tool_arguments() {
        let args = parse_tool_arguments(r#"{"path": "a/b"}"#).unwrap();
        assert_eq!(args["path"], json!("a/b"));
        assert!(parse_tool_arguments("null").unwrap().is_empty());

        let err = parse_tool_arguments("[1, 2]").unwrap_err();
        assert_eq!(err.exit_code, EXIT_CONFIG_ERROR);
        assert!(parse_tool_arguments("{not json").is_err());
    }

    #[tokio::test]
    async fn test_execute_tool_offline() {
        let context = CliToolContext::new(Backends::in_memory());
        assert_eq!(context.tool_names().len(), 20);

        let args =
            parse_tool_arguments(r#"{"path": "users/123", "data": {"name": "Ana"}}"#).unwrap();
        let envelope = context.execute_tool("set_data", args).await;
        assert!(envelope.is_success());

        let args = parse_tool_arguments(r#"{"path": "users/123"}"#).unwrap();
        let envelope = context.execute_tool("get_data", args).await;
        assert_eq!(
            envelope.to_value(),
            json!({"success": true, "data": {"name": "Ana"}})
        );
    }
}
