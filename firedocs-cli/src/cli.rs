use clap::{Parser, Subcommand};
use firedocs::Config;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "firedocs")]
#[command(version)]
#[command(about = "An MCP server for Firebase and Google Docs")]
#[command(long_about = "
firedocs is an MCP (Model Context Protocol) server exposing Firebase
Authentication, the Realtime Database, Cloud Firestore and Google Docs as
tools. Firebase calls use a service-account key; Google Docs calls act as
the user who signed in through the browser consent flow.

Example usage:
  firedocs serve                        # Run as MCP server over stdio
  firedocs login                        # Sign in to Google Docs ahead of time
  firedocs tools                        # List the available tools
  firedocs call get_data --args '{\"path\": \"users/123\"}'
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file to load instead of the discovered firedocs.yaml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Use in-memory backends instead of the Google services
    #[arg(long, global = true)]
    pub offline: bool,

    /// Firebase service-account key file
    #[arg(long, global = true, value_name = "FILE")]
    pub service_account_key: Option<PathBuf>,

    /// OAuth client-secret file for Google Docs
    #[arg(long, global = true, value_name = "FILE")]
    pub client_secret: Option<PathBuf>,

    /// Realtime Database URL
    #[arg(long, global = true, value_name = "URL")]
    pub database_url: Option<String>,

    /// Firebase project id
    #[arg(long, global = true, value_name = "ID")]
    pub project_id: Option<String>,

    /// Where the Google Docs credential is stored
    #[arg(long, global = true, value_name = "FILE")]
    pub token_cache: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run as MCP server over stdio
    #[command(long_about = "
Runs firedocs as an MCP server on stdin/stdout. When stdin is not a
terminal, logs go to ~/.firedocs/mcp.log (override the file name with
FIREDOCS_LOG_FILE).

The Google Docs credential is obtained on the first Docs tool call, which
may open the browser consent flow. Run `firedocs login` beforehand to
avoid that.

Example:
  firedocs serve
  firedocs serve --offline   # in-memory backends, no credentials needed
")]
    Serve,
    /// Obtain or refresh the Google Docs credential
    #[command(long_about = "
Makes sure a usable Google Docs credential is stored. A valid stored
credential is reused, an expired one is refreshed, and otherwise the
browser consent flow runs. Only the OAuth client-secret file is needed.

Example:
  firedocs login
  firedocs login --token-cache ./token.json
")]
    Login,
    /// Invoke a single tool and print its result
    #[command(long_about = "
Runs one tool through the same dispatch as the MCP server and prints the
JSON result. The exit code is 0 when the result has success=true and 1
otherwise.

Examples:
  firedocs call list_users
  firedocs --offline call set_data --args '{\"path\": \"a/b\", \"data\": 1}'
")]
    Call {
        /// Tool name
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// List the registered tool names
    Tools,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn try_parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    /// Logging level for the chosen flags; MCP mode always logs at debug
    pub fn log_level(&self, is_mcp_mode: bool) -> Level {
        if is_mcp_mode {
            Level::DEBUG
        } else if self.quiet {
            Level::ERROR
        } else if self.verbose {
            Level::TRACE
        } else if self.debug {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }

    /// Apply the command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(path) = &self.service_account_key {
            config.service_account_key = path.clone();
        }
        if let Some(path) = &self.client_secret {
            config.client_secret = path.clone();
        }
        if let Some(url) = &self.database_url {
            config.database_url = Some(url.clone());
        }
        if let Some(project) = &self.project_id {
            config.project_id = Some(project.clone());
        }
        if let Some(path) = &self.token_cache {
            config.token_cache = path.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_help_works() {
        let result = Cli::try_parse_from_args(["firedocs", "--help"]);
        assert!(result.is_err());

        let error = result.unwrap_err();
        assert_eq!(error.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_works() {
        let result = Cli::try_parse_from_args(["firedocs", "--version"]);
        let error = result.unwrap_err();
        assert_eq!(error.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_no_subcommand() {
        let cli = Cli::try_parse_from_args(["firedocs"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(!cli.quiet);
        assert!(!cli.offline);
    }

    #[test]
    fn test_cli_serve_subcommand() {
        let cli = Cli::try_parse_from_args(["firedocs", "serve", "--offline"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));
        assert!(cli.offline);
    }

    #[test]
    fn test_cli_call_defaults_to_empty_args() {
        let cli = Cli::try_parse_from_args(["firedocs", "call", "list_users"]).unwrap();
        match cli.command {
            Some(Commands::Call { tool, args }) => {
                assert_eq!(tool, "list_users");
                assert_eq!(args, "{}");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_call_requires_tool_name() {
        let result = Cli::try_parse_from_args(["firedocs", "call"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_levels() {
        let cli = Cli::try_parse_from_args(["firedocs", "tools", "--quiet"]).unwrap();
        assert_eq!(cli.log_level(false), Level::ERROR);
        assert_eq!(cli.log_level(true), Level::DEBUG);

        let cli = Cli::try_parse_from_args(["firedocs", "--debug", "tools"]).unwrap();
        assert_eq!(cli.log_level(false), Level::DEBUG);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from_args([
            "firedocs",
            "--project-id",
            "demo",
            "--database-url",
            "https://demo.firebaseio.com",
            "--token-cache",
            "/tmp/token.json",
            "login",
        ])
        .unwrap();
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.project_id.as_deref(), Some("demo"));
        assert_eq!(
            config.database_url.as_deref(),
            Some("https://demo.firebaseio.com")
        );
        assert_eq!(config.token_cache, PathBuf::from("/tmp/token.json"));
    }
}
