// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! # repograph CLI
//!
//! Turns a Git repository into an architecture diagram.
//!
//! ## Commands
//!
//! - `repograph serve` - Run the HTTP API (`/generate/stream`, `/generate/cost`, ...)
//! - `repograph generate <owner>/<repo>` - Run one generation and print its progress
//! - `repograph cost <owner>/<repo>` - Estimate the cost of a generation
//! - `repograph platforms` - List AI platforms and models

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{CostArgs, GenerateArgs, ServeArgs};

/// repograph - architecture diagrams from Git repositories
#[derive(Parser)]
#[command(name = "repograph")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "REPOGRAPH_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "REPOGRAPH_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "REPOGRAPH_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve(ServeArgs),

    /// Generate a diagram for one repository
    Generate(GenerateArgs),

    /// Estimate the cost of generating a diagram
    Cost(CostArgs),

    /// List supported AI platforms, models and reasoning efforts
    Platforms,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_json)?;

    match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, cli.config).await,
        Commands::Generate(args) => commands::generate::execute(args, cli.config).await,
        Commands::Cost(args) => commands::cost::execute(args, cli.config).await,
        Commands::Platforms => commands::platforms::execute(cli.config),
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if json {
        builder.json().init();
    } else {
        builder.with_target(false).compact().init();
    }

    Ok(())
}
