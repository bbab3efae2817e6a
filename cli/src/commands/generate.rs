// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! `repograph generate`: run one generation locally and stream its progress.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use futures::StreamExt;
use repograph_core::{DiagramGenerationService, PipelineEvent};
use std::io::Write;
use std::path::PathBuf;

use super::RepoArgs;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Extra instructions for the diagram (max 1000 characters)
    #[arg(short, long, default_value = "")]
    pub instructions: String,

    /// Write the final Mermaid diagram to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Hide streamed model output, show only progress messages
    #[arg(short, long)]
    pub quiet: bool,
}

pub async fn execute(args: GenerateArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let request = args.repo.to_request(args.instructions)?;
    let service = DiagramGenerationService::from_config(&config);

    let mut events = service.generate(request);
    let mut stdout = std::io::stdout();

    while let Some(event) = events.next().await {
        match event {
            PipelineEvent::Started { message }
            | PipelineEvent::ExplanationSent { message }
            | PipelineEvent::MappingSent { message }
            | PipelineEvent::DiagramSent { message } => {
                eprintln!("{}", message.cyan());
            }
            PipelineEvent::Explanation { message }
            | PipelineEvent::Mapping { message }
            | PipelineEvent::Diagram { message } => {
                eprintln!("{}", message.bold());
            }
            PipelineEvent::ExplanationChunk { chunk }
            | PipelineEvent::MappingChunk { chunk }
            | PipelineEvent::DiagramChunk { chunk } => {
                if !args.quiet {
                    eprint!("{}", chunk.dimmed());
                }
            }
            PipelineEvent::Complete {
                diagram,
                ai_platform,
                ai_model,
                ..
            } => {
                eprintln!();
                eprintln!(
                    "{}",
                    format!("✓ Diagram generated with {ai_platform} ({ai_model})").green()
                );
                match &args.output {
                    Some(path) => {
                        std::fs::write(path, &diagram)
                            .with_context(|| format!("Failed to write diagram to {:?}", path))?;
                        eprintln!("  Written to {}", path.display());
                    }
                    None => {
                        writeln!(stdout, "{diagram}").context("Failed to write diagram")?;
                    }
                }
                return Ok(());
            }
            PipelineEvent::Error { error } => {
                eprintln!();
                bail!("Generation failed: {error}");
            }
        }
    }

    bail!("Generation ended without a result")
}
