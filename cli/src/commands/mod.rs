// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the repograph CLI

pub mod cost;
pub mod generate;
pub mod platforms;
pub mod serve;

pub use self::cost::CostArgs;
pub use self::generate::GenerateArgs;
pub use self::serve::ServeArgs;

use anyhow::{Context, Result};
use clap::Args;
use repograph_core::domain::llm::ReasoningEffort;
use repograph_core::{GenerationRequest, ServiceConfig};
use std::path::PathBuf;

/// Repository and model selection shared by `generate` and `cost`.
#[derive(Args, Debug)]
pub struct RepoArgs {
    /// Repository as `<owner>/<repo>`
    #[arg(value_name = "OWNER/REPO")]
    pub repository: String,

    /// Git platform (github, gitlab, gitea)
    #[arg(long, default_value = "github")]
    pub platform: String,

    /// Git access token for private repositories
    #[arg(long, env = "REPOGRAPH_GIT_TOKEN", hide_env_values = true)]
    pub git_token: Option<String>,

    /// Custom Git API base URL (self-hosted GitLab/Gitea, GitHub Enterprise)
    #[arg(long, value_name = "URL")]
    pub git_api_url: Option<String>,

    /// AI platform (openai, claude, deepseek)
    #[arg(long)]
    pub ai_platform: Option<String>,

    /// Model id on the selected AI platform
    #[arg(long)]
    pub ai_model: Option<String>,

    /// Reasoning effort (low, medium, high)
    #[arg(long)]
    pub effort: Option<ReasoningEffort>,

    /// Your own LLM API key; lifts the free-tier size limit
    #[arg(long, env = "REPOGRAPH_CALLER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl RepoArgs {
    pub fn to_request(&self, instructions: String) -> Result<GenerationRequest> {
        let (owner, repo) = self
            .repository
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty())
            .with_context(|| {
                format!("Repository must be <owner>/<repo>, got '{}'", self.repository)
            })?;

        let mut request = GenerationRequest::new(self.platform.clone(), owner, repo);
        request.instructions = instructions;
        request.git_token = self.git_token.clone();
        request.git_api_url = self.git_api_url.clone();
        request.ai_platform = self.ai_platform.clone();
        request.ai_model = self.ai_model.clone();
        request.reasoning_effort = self.effort;
        request.api_key = self.api_key.clone();
        Ok(request)
    }
}

pub fn load_config(config_path: Option<PathBuf>) -> Result<ServiceConfig> {
    let config = ServiceConfig::load_or_default(config_path).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;
    Ok(config)
}
