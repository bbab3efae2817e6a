// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! `repograph platforms`: print the AI platform catalog.

use anyhow::Result;
use colored::Colorize;
use repograph_core::domain::catalog;
use std::path::PathBuf;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_path)?;

    println!("{}", "AI Platforms:".bold());
    for (id, info) in catalog::available_platforms() {
        let key = if info.requires_api_key {
            "API key required".dimmed()
        } else {
            "no API key".dimmed()
        };
        println!("  {} ({}) - {} [{}]", info.name.bold(), id, info.description, key);
        for model in &info.models {
            let marker = if *model == info.default_model { " (default)" } else { "" };
            println!("    - {}{}", model, marker);
        }
    }
    println!();

    println!("{}", "Reasoning effort:".bold());
    for (level, description) in catalog::reasoning_effort_options() {
        println!("  {:<8} {}", level, description);
    }
    println!();

    println!("{}", "Defaults:".bold());
    println!("  Platform: {}", config.defaults.ai_platform);
    println!("  Model: {}", config.defaults.ai_model);
    println!("  Reasoning effort: {}", config.defaults.reasoning_effort);

    Ok(())
}
