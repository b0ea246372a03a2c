//! Tool registry for MCP operations
//!
//! Each tool is a small type implementing [`McpTool`]. The registry resolves a
//! tool by name and runs it inside the failure boundary of
//! [`ToolRegistry::call_tool`], which always produces a [`ToolEnvelope`].

use super::envelope::ToolEnvelope;
use super::tool_handlers::ToolHandlers;
use crate::error::{FiredocsError, Result};
use rmcp::model::Tool;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Context shared by all tools during execution
#[derive(Clone)]
pub struct ToolContext {
    /// The tool handlers instance containing the backend calls
    pub tool_handlers: Arc<ToolHandlers>,
}

impl ToolContext {
    /// Create a new tool context
    pub fn new(tool_handlers: Arc<ToolHandlers>) -> Self {
        Self { tool_handlers }
    }
}

/// Trait defining the interface for all MCP tools
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Get the tool's name
    fn name(&self) -> &'static str;

    /// Get the tool's description
    fn description(&self) -> &'static str;

    /// Get the tool's JSON schema for arguments
    fn schema(&self) -> Value;

    /// Execute the tool and return the success payload
    async fn execute(
        &self,
        arguments: Map<String, Value>,
        context: &ToolContext,
    ) -> Result<Map<String, Value>>;
}

/// Registry for managing MCP tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn McpTool>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Create a registry holding every firedocs tool
    pub fn with_all_tools() -> Self {
        let mut registry = Self::new();
        super::tools::register_all_tools(&mut registry);
        registry
    }

    /// Register a tool; a second tool with the same name is rejected
    pub fn register<T: McpTool + 'static>(&mut self, tool: T) -> bool {
        let name = tool.name();
        if self.tools.contains_key(name) {
            tracing::error!("Tool '{}' is already registered, keeping the first one", name);
            return false;
        }
        self.tools.insert(name.to_string(), Box::new(tool));
        true
    }

    /// Get a tool by name
    pub fn get_tool(&self, name: &str) -> Option<&dyn McpTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    /// List all registered tool names, sorted
    pub fn list_tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get all registered tools as Tool objects for MCP list_tools response
    pub fn list_tools(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self
            .tools
            .values()
            .map(|tool| {
                let schema_map = match tool.schema() {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };

                Tool {
                    name: tool.name().into(),
                    description: Some(tool.description().into()),
                    input_schema: Arc::new(schema_map),
                    annotations: None,
                }
            })
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Run a tool by name; every outcome, including an unknown name, becomes an envelope
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
        context: &ToolContext,
    ) -> ToolEnvelope {
        let Some(tool) = self.get_tool(name) else {
            tracing::warn!("Call to unknown tool '{}'", name);
            return FiredocsError::UnknownTool(name.to_string()).into();
        };

        tracing::debug!("Calling tool {}", name);
        match tool.execute(arguments, context).await {
            Ok(payload) => ToolEnvelope::success(payload),
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", name, e);
                e.into()
            }
        }
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Base implementation providing common utility methods for MCP tools
pub struct BaseToolImpl;

impl BaseToolImpl {
    /// Parse tool arguments from a JSON map into a typed struct
    pub fn parse_arguments<T: serde::de::DeserializeOwned>(
        arguments: Map<String, Value>,
    ) -> Result<T> {
        serde_json::from_value(Value::Object(arguments))
            .map_err(|e| FiredocsError::invalid_arguments(e.to_string()))
    }
}
