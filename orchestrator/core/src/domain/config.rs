// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

// Service Configuration
//
// Defines the configuration schema for a repograph service instance:
// - HTTP bind address and port
// - Process-wide default AI platform, model and reasoning effort
// - Git platform API bases and access tokens
// - LLM provider endpoints and API keys
// - Repository cache capacity and per-phase deadline

use crate::domain::catalog::{self, DEFAULT_FREE_TIER_TOKEN_LIMIT};
use crate::domain::llm::ReasoningEffort;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Network bind address (e.g. "0.0.0.0" or "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_ai_platform")]
    pub ai_platform: String,

    #[serde(default = "default_ai_model")]
    pub ai_model: String,

    #[serde(default)]
    pub reasoning_effort: ReasoningEffort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    #[serde(default = "default_github")]
    pub github: GitPlatformConfig,

    #[serde(default = "default_gitlab")]
    pub gitlab: GitPlatformConfig,

    #[serde(default = "default_gitea")]
    pub gitea: GitPlatformConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitPlatformConfig {
    pub api_url: String,

    /// Access token (supports "env:VAR_NAME" for environment variables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_openai")]
    pub openai: LlmEndpointConfig,

    #[serde(default = "default_anthropic")]
    pub anthropic: LlmEndpointConfig,

    #[serde(default = "default_deepseek")]
    pub deepseek: LlmEndpointConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmEndpointConfig {
    /// API base URL, without the operation path
    pub endpoint: String,

    /// API key (supports "env:VAR_NAME" for environment variables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of repositories kept in memory
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Deadline for each streaming LLM phase
    #[serde(default = "default_phase_timeout")]
    pub phase_timeout_secs: u64,

    /// Combined file-tree + README size above which a caller key is required
    #[serde(default = "default_free_tier_limit")]
    pub free_tier_token_limit: usize,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8000
}

fn default_ai_platform() -> String {
    "openai".to_string()
}

fn default_ai_model() -> String {
    "o3-mini".to_string()
}

fn default_github() -> GitPlatformConfig {
    GitPlatformConfig {
        api_url: "https://api.github.com".to_string(),
        token: None,
    }
}

fn default_gitlab() -> GitPlatformConfig {
    GitPlatformConfig {
        api_url: "https://gitlab.com/api/v4".to_string(),
        token: None,
    }
}

fn default_gitea() -> GitPlatformConfig {
    GitPlatformConfig {
        api_url: "https://gitea.com/api/v1".to_string(),
        token: None,
    }
}

fn default_openai() -> LlmEndpointConfig {
    LlmEndpointConfig {
        endpoint: "https://api.openai.com/v1".to_string(),
        api_key: None,
    }
}

fn default_anthropic() -> LlmEndpointConfig {
    LlmEndpointConfig {
        endpoint: "https://api.anthropic.com/v1".to_string(),
        api_key: None,
    }
}

fn default_deepseek() -> LlmEndpointConfig {
    LlmEndpointConfig {
        endpoint: "https://api.deepseek.com/v1".to_string(),
        api_key: None,
    }
}

fn default_cache_capacity() -> usize {
    100
}

fn default_phase_timeout() -> u64 {
    300
}

fn default_free_tier_limit() -> usize {
    DEFAULT_FREE_TIER_TOKEN_LIMIT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_api_port(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            ai_platform: default_ai_platform(),
            ai_model: default_ai_model(),
            reasoning_effort: ReasoningEffort::default(),
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            github: default_github(),
            gitlab: default_gitlab(),
            gitea: default_gitea(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai: default_openai(),
            anthropic: default_anthropic(),
            deepseek: default_deepseek(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            phase_timeout_secs: default_phase_timeout(),
            free_tier_token_limit: default_free_tier_limit(),
        }
    }
}

/// Resolve a secret from config (supports "env:VAR_NAME" syntax).
/// Unset variables and empty values resolve to `None`.
pub fn resolve_secret(value: Option<&str>) -> Option<String> {
    match value {
        Some(v) if v.starts_with("env:") => {
            let var_name = &v["env:".len()..];
            std::env::var(var_name).ok().filter(|s| !s.is_empty())
        }
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => None,
    }
}

impl ServiceConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. REPOGRAPH_CONFIG_PATH environment variable
    /// 2. ./repograph.yaml (working directory)
    /// 3. ~/.repograph/config.yaml (user home)
    /// 4. /etc/repograph/config.yaml (system, Unix) or C:\ProgramData\Repograph\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("REPOGRAPH_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./repograph.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".repograph").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/repograph/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Repograph\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // 1. Explicit CLI path (Fail if missing/invalid)
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        // 2. Discovery (Env -> Cwd -> Home -> System)
        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::info!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    /// This allows container deployments to override config via env vars
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(val) = var("DEFAULT_AI_PLATFORM") {
            tracing::info!("Environment override: DEFAULT_AI_PLATFORM={}", val);
            self.defaults.ai_platform = val;
        }
        if let Some(val) = var("DEFAULT_AI_MODEL") {
            tracing::info!("Environment override: DEFAULT_AI_MODEL={}", val);
            self.defaults.ai_model = val;
        }
        if let Some(val) = var("DEFAULT_REASONING_EFFORT") {
            match val.parse::<ReasoningEffort>() {
                Ok(effort) => {
                    tracing::info!("Environment override: DEFAULT_REASONING_EFFORT={}", effort);
                    self.defaults.reasoning_effort = effort;
                }
                Err(_) => {
                    tracing::warn!(
                        "Invalid value for DEFAULT_REASONING_EFFORT: '{}'. Expected low/medium/high. Ignoring.",
                        val
                    );
                }
            }
        }

        if let Some(val) = var("GITHUB_PAT") {
            self.git.github.token = Some(val);
        }
        if let Some(val) = var("GITLAB_PAT") {
            self.git.gitlab.token = Some(val);
        }
        if let Some(val) = var("GITLAB_API_URL") {
            self.git.gitlab.api_url = val;
        }
        if let Some(val) = var("GITEA_PAT") {
            self.git.gitea.token = Some(val);
        }
        if let Some(val) = var("GITEA_API_URL") {
            self.git.gitea.api_url = val;
        }

        if let Some(val) = var("OPENAI_API_KEY") {
            self.llm.openai.api_key = Some(val);
        }
        if let Some(val) = var("ANTHROPIC_API_KEY") {
            self.llm.anthropic.api_key = Some(val);
        }
        if let Some(val) = var("DEEPSEEK_API_KEY") {
            self.llm.deepseek.api_key = Some(val);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if catalog::default_model(&self.defaults.ai_platform).is_none() {
            anyhow::bail!(
                "Unknown default AI platform: '{}'. Expected one of: openai, claude, deepseek",
                self.defaults.ai_platform
            );
        }

        if self.defaults.ai_model.is_empty() {
            anyhow::bail!("defaults.ai_model cannot be empty");
        }

        if self.cache.capacity == 0 {
            anyhow::bail!("cache.capacity must be greater than zero");
        }

        if self.generation.phase_timeout_secs == 0 {
            anyhow::bail!("generation.phase_timeout_secs must be greater than zero");
        }

        for (name, platform) in [
            ("github", &self.git.github),
            ("gitlab", &self.git.gitlab),
            ("gitea", &self.git.gitea),
        ] {
            if platform.api_url.is_empty() {
                anyhow::bail!("git.{}.api_url cannot be empty", name);
            }
        }

        for (name, endpoint) in [
            ("openai", &self.llm.openai),
            ("anthropic", &self.llm.anthropic),
            ("deepseek", &self.llm.deepseek),
        ] {
            if endpoint.endpoint.is_empty() {
                anyhow::bail!("llm.{}.endpoint cannot be empty", name);
            }
        }

        Ok(())
    }
}
