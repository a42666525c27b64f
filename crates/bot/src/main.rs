//! kbot: Notion knowledge base bot for Telegram
//!
//! Main entry point for the kbot binary.
//! Answers chat questions from a Notion database using an LLM.

mod assistant;
mod commands;
mod gateway;

use clap::{Parser, Subcommand};
use commands::{AskCommand, PagesCommand, RunCommand};
use kbot_core::{config::BotConfig, logging, AppError, AppResult};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Instrument;

/// kbot - answer questions from your Notion knowledge base over Telegram
#[derive(Parser, Debug)]
#[command(name = "kbot")]
#[command(about = "Answer questions from a Notion knowledge base over Telegram", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "KBOT_CONFIG")]
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

    /// Pages retrieved per question
    #[arg(long, global = true)]
    max_results: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the Telegram bot (default)
    Run(RunCommand),

    /// Answer a single question and print the reply
    Ask(AskCommand),

    /// List all pages in the knowledge base
    Pages(PagesCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    install_panic_hook();

    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::MissingConfig(names)) => {
            eprintln!("❌ Missing required environment variables:");
            for name in names {
                eprintln!("  - {}", name);
            }
            eprintln!("\nPlease create a .env file and fill in the required values.");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    // Load configuration from .env, config file, and environment
    let config = BotConfig::load(cli.config)?;

    // Apply CLI overrides
    let config = config.with_overrides(cli.log_level, cli.verbose, cli.no_color, cli.max_results);

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_format)?;

    tracing::info!("kbot starting");
    tracing::debug!("Database: {}", config.notion_database_id);
    tracing::debug!("Model: {}", config.model);
    tracing::debug!("Max search results: {}", config.max_search_results);

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Run(RunCommand::default()));

    let command_name = match &command {
        Commands::Run(_) => "run",
        Commands::Ask(_) => "ask",
        Commands::Pages(_) => "pages",
    };
    let span = tracing::info_span!("command", name = command_name);

    // Route to command handlers
    let result = async {
        match command {
            Commands::Run(cmd) => cmd.execute(&config).await,
            Commands::Ask(cmd) => cmd.execute(&config).await,
            Commands::Pages(cmd) => cmd.execute(&config).await,
        }
    }
    .instrument(span)
    .await;

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

/// Log panics from any thread and terminate the process with status 1.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("Uncaught panic: {}", info);
        default_hook(info);
        std::process::exit(1);
    }));
}
