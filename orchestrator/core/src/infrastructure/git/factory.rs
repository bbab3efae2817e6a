// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

// Git Provider Factory
//
// Resolves a platform identifier to a concrete adapter. Per-request token
// and API base override the configured defaults.

use super::gitea::GiteaAdapter;
use super::github::GitHubAdapter;
use super::gitlab::GitLabAdapter;
use crate::domain::config::{resolve_secret, GitConfig, GitPlatformConfig};
use crate::domain::git::{GitError, GitProvider, GitProviderFactory};
use std::sync::Arc;
use tracing::debug;

pub struct DefaultGitProviderFactory {
    config: GitConfig,
}

impl DefaultGitProviderFactory {
    pub fn new(config: GitConfig) -> Self {
        Self { config }
    }

    fn settings(
        defaults: &GitPlatformConfig,
        token: Option<&str>,
        base_url: Option<&str>,
    ) -> (String, Option<String>) {
        let api_base = base_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(&defaults.api_url)
            .to_string();
        let token = token
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| resolve_secret(defaults.token.as_deref()));
        (api_base, token)
    }
}

impl Default for DefaultGitProviderFactory {
    fn default() -> Self {
        Self::new(GitConfig::default())
    }
}

impl GitProviderFactory for DefaultGitProviderFactory {
    fn create(
        &self,
        platform: &str,
        token: Option<&str>,
        base_url: Option<&str>,
    ) -> Result<Arc<dyn GitProvider>, GitError> {
        let provider: Arc<dyn GitProvider> = match platform.to_lowercase().as_str() {
            "github" => {
                let (api_base, token) = Self::settings(&self.config.github, token, base_url);
                Arc::new(GitHubAdapter::new(api_base, token))
            }
            "gitlab" => {
                let (api_base, token) = Self::settings(&self.config.gitlab, token, base_url);
                Arc::new(GitLabAdapter::new(api_base, token))
            }
            "gitea" => {
                let (api_base, token) = Self::settings(&self.config.gitea, token, base_url);
                Arc::new(GiteaAdapter::new(api_base, token))
            }
            _ => return Err(GitError::UnsupportedPlatform(platform.to_string())),
        };

        debug!(platform = provider.platform(), "Created git provider");
        Ok(provider)
    }
}
