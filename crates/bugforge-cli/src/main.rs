//! Bugforge CLI - Entity extraction and procedural bug synthesis
//!
//! A command-line interface for extracting functions and classes from source
//! trees and producing seeded, reproducible bug rewrites of them.
//!
//! # Usage
//!
//! ```bash
//! # List extractable entities under a directory
//! bugforge extract src/
//!
//! # Produce bug rewrites with a fixed seed
//! bugforge mutate src/ --seed 7 --json
//!
//! # Show the modifier catalog for Python
//! bugforge modifiers --language py
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod commands;
mod progress;

/// Bugforge - Procedural bug synthesis over tree-sitter syntax trees
#[derive(Parser, Debug)]
#[command(name = "bugforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Path to configuration file (replaces the workspace config)
    #[arg(long, short = 'c', global = true, env = "BUGFORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract functions, methods and classes from source files
    Extract(commands::extract::ExtractArgs),

    /// Apply procedural modifiers and emit bug rewrites
    Mutate(commands::mutate::MutateArgs),

    /// List the modifier catalog
    Modifiers(commands::modifiers::ModifiersArgs),

    /// List supported languages and file extensions
    Languages(commands::languages::LanguagesArgs),

    /// View and manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over flags and config
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let level = if cli.global.quiet {
                "error".to_string()
            } else if cli.global.verbose {
                "debug".to_string()
            } else {
                commands::configured_log_level(&cli.global)
            };
            EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"))
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Extract(args) => commands::extract::execute(args, cli.global),
        Commands::Mutate(args) => commands::mutate::execute(args, cli.global),
        Commands::Modifiers(args) => commands::modifiers::execute(args, cli.global),
        Commands::Languages(args) => commands::languages::execute(args, cli.global),
        Commands::Config(cmd) => commands::config::execute(cmd, cli.global),
    }
}
