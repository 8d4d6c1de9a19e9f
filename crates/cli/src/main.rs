//! Tabletalk CLI
//!
//! Main entry point for the tabletalk command-line tool.
//! Answers natural-language questions about a Postgres database by
//! retrieving relevant table schemas, generating SQL via an LLM, executing
//! it, and synthesizing an answer.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, DescribeCommand, TablesCommand};
use tabletalk_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Tabletalk - ask your database questions in plain language
#[derive(Parser, Debug)]
#[command(name = "tabletalk")]
#[command(about = "Natural-language-to-SQL assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "TABLETALK_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "TABLETALK_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (ollama, openai)
    #[arg(short, long, global = true, env = "TABLETALK_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "TABLETALK_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a one-shot question against the database
    Ask(AskCommand),

    /// Interactive question-and-answer loop
    Chat(ChatCommand),

    /// Pre-populate the table summary cache
    Describe(DescribeCommand),

    /// List database tables and cached summaries
    Tables(TablesCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides; the final workspace path is validated here
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    )?;

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("tabletalk starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    // Ensure .tabletalk directory exists
    config.ensure_tabletalk_dir()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Describe(_) => "describe",
        Commands::Tables(_) => "tables",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Describe(cmd) => cmd.execute(&config).await,
        Commands::Tables(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
