//! Course Assistant CLI
//!
//! Answers course FAQ questions with retrieval-augmented generation and keeps
//! a history of answers and user feedback.

mod commands;

use anyhow::Context;
use assistant_core::{config::AppConfig, logging};
use clap::{Parser, Subcommand};
use commands::{
    AskCommand, FeedbackCommand, IngestCommand, InitDbCommand, RecentCommand, StatsCommand,
};
use std::path::PathBuf;

/// Course Assistant - answers course questions from the FAQ
#[derive(Parser, Debug)]
#[command(name = "course-assistant")]
#[command(about = "Answers course questions from the FAQ database", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "COURSE_ASSISTANT_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the SQLite database
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recreate the conversation, feedback and document tables
    InitDb(InitDbCommand),

    /// Load FAQ documents into the document store
    Ingest(IngestCommand),

    /// Answer a course question
    Ask(AskCommand),

    /// Rate a previous answer
    Feedback(FeedbackCommand),

    /// List recent conversations
    Recent(RecentCommand),

    /// Show feedback statistics
    Stats(StatsCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::InitDb(_) => "init-db",
            Commands::Ingest(_) => "ingest",
            Commands::Ask(_) => "ask",
            Commands::Feedback(_) => "feedback",
            Commands::Recent(_) => "recent",
            Commands::Stats(_) => "stats",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?.with_overrides(
        cli.database,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;
    config.validate()?;

    tracing::debug!("Database: {:?}", config.database_path);
    tracing::debug!("Ollama endpoint: {}", config.ollama.endpoint);
    tracing::debug!("OpenAI endpoint: {}", config.openai.endpoint);

    let command_name = cli.command.name();
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::InitDb(cmd) => cmd.execute(&config),
        Commands::Ingest(cmd) => cmd.execute(&config),
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Feedback(cmd) => cmd.execute(&config),
        Commands::Recent(cmd) => cmd.execute(&config),
        Commands::Stats(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::debug!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result.with_context(|| format!("'{}' failed", command_name))
}
