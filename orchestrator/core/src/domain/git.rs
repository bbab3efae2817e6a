// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Git hosting capability.
//!
//! Each provider wraps one hosting API and translates its pagination and
//! transfer-encoding conventions into this uniform contract. Adapters live in
//! `infrastructure::git`.

use async_trait::async_trait;
use std::sync::Arc;

/// README filenames tried, in order, by every provider.
pub const README_CANDIDATES: [&str; 4] = ["README.md", "README", "README.txt", "Readme.md"];

/// Branch assumed when the upstream reports none.
pub const FALLBACK_BRANCH: &str = "main";

#[async_trait]
pub trait GitProvider: Send + Sync {
    /// Platform identifier (`github`, `gitlab`, `gitea`).
    fn platform(&self) -> &'static str;

    async fn check_repository_exists(&self, owner: &str, repo: &str) -> Result<bool, GitError>;

    /// `Ok(None)` when the repository is reachable but reports no default branch.
    async fn get_default_branch(&self, owner: &str, repo: &str)
        -> Result<Option<String>, GitError>;

    /// Newline-joined list of tracked paths, filtered by [`should_include_file`].
    /// Paginated listings are fully drained.
    async fn get_file_tree(&self, owner: &str, repo: &str) -> Result<String, GitError>;

    /// Decoded README text from the first matching [`README_CANDIDATES`] entry.
    async fn get_readme(&self, owner: &str, repo: &str) -> Result<String, GitError>;

    /// Browsable URL for a file. No network access.
    fn get_file_url(&self, owner: &str, repo: &str, path: &str, branch: &str) -> String;

    /// Browsable URL for a directory. No network access.
    fn get_directory_url(&self, owner: &str, repo: &str, path: &str, branch: &str) -> String;
}

/// Maps a platform identifier plus credentials to a provider instance.
/// Instances are not cached by the factory.
pub trait GitProviderFactory: Send + Sync {
    fn create(
        &self,
        platform: &str,
        token: Option<&str>,
        base_url: Option<&str>,
    ) -> Result<Arc<dyn GitProvider>, GitError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{provider} API returned status code {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to connect to {provider} API: {message}")]
    Network {
        provider: &'static str,
        message: String,
    },

    #[error("Malformed {provider} response: {message}")]
    Malformed {
        provider: &'static str,
        message: String,
    },
}

const EXCLUDED_PATTERNS: &[&str] = &[
    // Dependencies
    "node_modules/",
    "vendor/",
    "venv/",
    // Compiled files
    ".min.",
    ".pyc",
    ".pyo",
    ".pyd",
    ".so",
    ".dll",
    ".class",
    // Asset files
    ".jpg",
    ".jpeg",
    ".png",
    ".gif",
    ".ico",
    ".svg",
    ".ttf",
    ".woff",
    ".webp",
    // Cache and temporary files
    "__pycache__/",
    ".cache/",
    ".tmp/",
    // Lock files and logs
    "yarn.lock",
    "poetry.lock",
    // Editor configuration
    ".vscode/",
    ".idea/",
];

const EXCLUDED_SUFFIXES: &[&str] = &[".log"];

/// Static exclusion predicate shared by all providers.
pub fn should_include_file(path: &str) -> bool {
    let lowered = path.to_lowercase();
    !EXCLUDED_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
        && !EXCLUDED_SUFFIXES
            .iter()
            .any(|suffix| lowered.ends_with(suffix))
}

/// Strip an API suffix (`/api/v1`, `/api/v4`, `/api/v3`) from a base URL to get
/// the browsable host, adding a scheme when one is missing.
pub fn web_base_from_api(api_base: &str) -> String {
    let trimmed = api_base.trim_end_matches('/');
    let domain = trimmed.split("/api/").next().unwrap_or(trimmed);
    let domain = domain.strip_suffix("/api").unwrap_or(domain);
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}
