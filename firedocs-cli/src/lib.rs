//! firedocs CLI Library
//!
//! Command-line definitions, exit codes, error mapping, logging setup and the
//! tool-calling layer shared by the `firedocs` binary and its tests.

/// Command-line interface definitions and argument parsing
pub mod cli;
/// Error type carrying an exit code
pub mod error;
/// Exit codes used by the CLI application
pub mod exit_codes;
/// Logging setup
pub mod logging;
/// Calling MCP tools from CLI commands
pub mod mcp_integration;
