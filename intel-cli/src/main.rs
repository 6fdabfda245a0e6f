use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "intel", about = "Run instruct prompts and inspect evaluations")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Inspect stored evaluation results
    Evals(commands::evals::EvalsArgs),
    /// Complete an instruction with a control model
    Instruct(commands::instruct::InstructArgs),
    /// List models served by the API
    Models,
    /// Show how a model tokenizes text
    Tokenize(commands::tokenize::TokenizeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Config(args) => commands::config::run(args),
        Commands::Evals(args) => commands::evals::run(args).await,
        Commands::Instruct(args) => commands::instruct::run(args).await,
        Commands::Models => commands::models::run().await,
        Commands::Tokenize(args) => commands::tokenize::run(args).await,
    }
}
