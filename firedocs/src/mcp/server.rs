//! MCP server exposing the firedocs tools

use super::tool_handlers::ToolHandlers;
use super::tool_registry::{ToolContext, ToolRegistry};
use crate::backends::Backends;
use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{Error as McpError, RoleServer, ServerHandler};
use std::sync::Arc;

const INSTRUCTIONS: &str = "Firebase and Google Docs tools. Use the user tools (create_user, get_user, update_user, delete_user, list_users and the link generators) for Firebase Authentication, the *_data tools for Realtime Database paths, the firestore_* tools for Firestore collections and documents, and get_document/create_document for Google Docs. Every tool returns a JSON object with a boolean 'success' field and either the result fields or an 'error' message.";

/// MCP server for the Firebase and Google Docs tools
#[derive(Clone)]
pub struct McpServer {
    tool_registry: Arc<ToolRegistry>,
    /// Tool context containing shared state for tool execution
    pub tool_context: Arc<ToolContext>,
}

impl McpServer {
    /// Create a server whose tools run against `backends`
    pub fn new(backends: Backends) -> Self {
        let tool_handlers = Arc::new(ToolHandlers::new(backends));
        let tool_registry = ToolRegistry::with_all_tools();
        tracing::debug!("Registered {} tools", tool_registry.len());
        Self {
            tool_registry: Arc::new(tool_registry),
            tool_context: Arc::new(ToolContext::new(tool_handlers)),
        }
    }

    /// The tool registry
    pub fn tool_registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    fn capabilities() -> ServerCapabilities {
        ServerCapabilities {
            prompts: None,
            tools: Some(ToolsCapability {
                list_changed: Some(false),
            }),
            resources: None,
            logging: None,
            completions: None,
            experimental: None,
        }
    }

    fn implementation() -> Implementation {
        Implementation {
            name: "firedocs".into(),
            version: crate::VERSION.into(),
        }
    }
}

impl ServerHandler for McpServer {
    async fn initialize(
        &self,
        request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<InitializeResult, McpError> {
        tracing::info!(
            "MCP client connecting: {} v{}",
            request.client_info.name,
            request.client_info.version
        );

        Ok(InitializeResult {
            protocol_version: ProtocolVersion::default(),
            capabilities: Self::capabilities(),
            instructions: Some(INSTRUCTIONS.into()),
            server_info: Self::implementation(),
        })
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_registry.list_tools(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let envelope = self
            .tool_registry
            .call_tool(
                &request.name,
                request.arguments.unwrap_or_default(),
                &self.tool_context,
            )
            .await;
        Ok(envelope.into_call_tool_result())
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: Self::capabilities(),
            server_info: Self::implementation(),
            instructions: Some(INSTRUCTIONS.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_registers_every_tool() {
        let server = McpServer::new(Backends::in_memory());
        let names = server.tool_registry().list_tool_names();
        assert_eq!(names.len(), 20);
        for expected in [
            "create_user",
            "generate_password_reset_link",
            "query_data",
            "firestore_get_document",
            "create_document",
        ] {
            assert!(names.iter().any(|name| name == expected), "{expected} missing");
        }
    }

    #[test]
    fn test_server_info() {
        let server = McpServer::new(Backends::in_memory());
        let info = server.get_info();
        assert_eq!(info.server_info.name, "firedocs");
        assert_eq!(info.server_info.version, crate::VERSION);
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.prompts.is_none());
    }
}
