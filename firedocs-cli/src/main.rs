use anyhow::Context;
use clap::CommandFactory;
use firedocs::backends::{credential_manager, http::build_client, Backends, RemoteBackends};
use firedocs::mcp::{McpServer, ToolEnvelope, ToolRegistry};
use firedocs::Config;
use firedocs_cli::cli::{Cli, Commands};
use firedocs_cli::error::{handle_cli_result, CliError, CliResult};
use firedocs_cli::exit_codes::{EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_SUCCESS};
use firedocs_cli::logging;
use firedocs_cli::mcp_integration::{parse_tool_arguments, CliToolContext};
use is_terminal::IsTerminal;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // Fast path for help
    let Some(command) = &cli.command else {
        if let Err(e) = Cli::command().print_help() {
            eprintln!("Failed to print help: {e}");
        }
        process::exit(EXIT_SUCCESS);
    };

    // stdout belongs to the protocol when a client drives the server
    let is_mcp_mode = matches!(command, Commands::Serve) && !std::io::stdin().is_terminal();
    logging::init(cli.log_level(is_mcp_mode), is_mcp_mode);

    let exit_code = match command {
        Commands::Serve => {
            tracing::info!("Starting MCP server");
            run_server(&cli).await
        }
        Commands::Login => {
            tracing::info!("Running login");
            handle_cli_result(run_login(&cli).await)
        }
        Commands::Call { tool, args } => {
            tracing::debug!("Calling tool {}", tool);
            handle_cli_result(run_call(&cli, tool, args).await)
        }
        Commands::Tools => {
            for name in ToolRegistry::with_all_tools().list_tool_names() {
                println!("{name}");
            }
            EXIT_SUCCESS
        }
    };

    process::exit(exit_code);
}

/// Defaults, environment, YAML, then command-line flags
fn load_config(cli: &Cli) -> CliResult<Config> {
    let mut config = Config::load(cli.config.as_deref())
        .context("Failed to load configuration")
        .map_err(|e| CliError::from_anyhow(e, EXIT_CONFIG_ERROR))?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

fn build_backends(cli: &Cli) -> CliResult<Backends> {
    if cli.offline {
        tracing::info!("Using in-memory backends");
        return Ok(Backends::in_memory());
    }
    let config = load_config(cli)?;
    let remote = RemoteBackends::connect(&config)?;
    Ok(remote.backends)
}

async fn run_server(cli: &Cli) -> i32 {
    use rmcp::serve_server;
    use rmcp::transport::io::stdio;
    use tokio_util::sync::CancellationToken;

    let backends = match build_backends(cli) {
        Ok(backends) => backends,
        Err(e) => return handle_cli_result::<()>(Err(e)),
    };
    let server = McpServer::new(backends);

    let ct = CancellationToken::new();
    let ct_signal = ct.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                ct_signal.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    let serving = async move {
        match serve_server(server, stdio()).await {
            Ok(running) => {
                tracing::info!("MCP server started");
                match running.waiting().await {
                    Ok(reason) => {
                        tracing::info!("MCP server stopped: {:?}", reason);
                        EXIT_SUCCESS
                    }
                    Err(e) => {
                        tracing::error!("MCP server task failed: {}", e);
                        EXIT_FAILURE
                    }
                }
            }
            Err(e) => {
                tracing::error!("MCP server error: {}", e);
                EXIT_FAILURE
            }
        }
    };

    tokio::select! {
        code = serving => code,
        _ = ct.cancelled() => {
            tracing::info!("MCP server exited on shutdown signal");
            EXIT_SUCCESS
        }
    }
}

async fn run_login(cli: &Cli) -> CliResult<()> {
    if cli.offline {
        return Err(CliError::new(
            "login talks to Google and cannot run with --offline",
            EXIT_CONFIG_ERROR,
        ));
    }
    let config = load_config(cli)?;
    let http = build_client(config.http_timeout_secs)?;
    let manager = credential_manager(&config, http)?;
    let record = manager.acquire().await?;
    println!(
        "Google Docs credential stored in {}; access token valid until {}",
        config.token_cache.display(),
        record.expires_at.to_rfc3339()
    );
    Ok(())
}

async fn run_call(cli: &Cli, tool: &str, args: &str) -> CliResult<()> {
    let arguments = parse_tool_arguments(args)?;
    let context = CliToolContext::new(build_backends(cli)?);
    let envelope = context.execute_tool(tool, arguments).await;

    let text = serde_json::to_string_pretty(&envelope).map_err(CliError::general)?;
    println!("{text}");

    match envelope {
        ToolEnvelope::Success(_) => Ok(()),
        ToolEnvelope::Failure(message) => Err(CliError::new(
            format!("{tool} failed: {message}"),
            EXIT_FAILURE,
        )),
    }
}
