// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! `repograph cost`: estimate what a generation would cost.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use repograph_core::DiagramGenerationService;
use std::path::PathBuf;

use super::RepoArgs;

#[derive(Args, Debug)]
pub struct CostArgs {
    #[command(flatten)]
    pub repo: RepoArgs,
}

pub async fn execute(args: CostArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let request = args.repo.to_request(String::new())?;
    let service = DiagramGenerationService::from_config(&config);

    let (platform, model) = service.resolve_ai_choice(&request);
    let cost = service
        .estimate_cost(&request)
        .await
        .with_context(|| format!("Failed to estimate cost for {}", args.repo.repository))?;

    println!(
        "{} {} with {} ({}): {}",
        "Estimated cost for".bold(),
        args.repo.repository,
        platform,
        model,
        cost.green()
    );

    Ok(())
}
