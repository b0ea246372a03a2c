//! Model Context Protocol (MCP) server support
//!
//! This module exposes the Firebase and Google Docs operations as MCP tools.
//! Every tool call produces a [`ToolEnvelope`].

pub mod envelope;
pub mod server;
pub mod tool_handlers;
pub mod tool_registry;
pub mod tools;
pub mod types;

pub use envelope::ToolEnvelope;
pub use server::McpServer;
pub use tool_handlers::ToolHandlers;
pub use tool_registry::{BaseToolImpl, McpTool, ToolContext, ToolRegistry};
