// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Generation
//!
//! The immutable request that fully specifies one pipeline run, the run
//! stages, and the run-level error taxonomy.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Request validation and error classification

use crate::domain::git::GitError;
use crate::domain::llm::{LLMError, ReasoningEffort};
use crate::domain::repository::CacheKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of free-text instructions, in characters.
pub const MAX_INSTRUCTIONS_CHARS: usize = 1000;

/// Showcase repositories whose diagrams are curated and never regenerated.
pub const PROTECTED_REPOSITORIES: [&str; 5] = [
    "fastapi",
    "streamlit",
    "flask",
    "api-analytics",
    "monkeytype",
];

/// Sentinel the model emits when it cannot act on the caller's instructions.
pub const BAD_INSTRUCTIONS_SENTINEL: &str = "BAD_INSTRUCTIONS";

fn default_git_platform() -> String {
    "github".to_string()
}

/// One diagram generation request. Wire names follow the public HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Git platform identifier (`github`, `gitlab`, `gitea`).
    #[serde(default = "default_git_platform")]
    pub platform: String,

    #[serde(rename = "username", alias = "owner")]
    pub owner: String,

    pub repo: String,

    #[serde(default)]
    pub instructions: String,

    /// Caller-supplied LLM API key. Its presence lifts the free-tier gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_token: Option<String>,

    /// Custom Git API base URL (self-hosted GitLab/Gitea, GitHub Enterprise).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_platform: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl GenerationRequest {
    pub fn new(platform: impl Into<String>, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            owner: owner.into(),
            repo: repo.into(),
            instructions: String::new(),
            api_key: None,
            git_token: None,
            git_api_url: None,
            ai_platform: None,
            ai_model: None,
            reasoning_effort: None,
        }
    }

    /// Reject oversized instructions and protected repositories.
    /// Performs no network access.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.instructions.chars().count() > MAX_INSTRUCTIONS_CHARS {
            return Err(GenerationError::Validation(format!(
                "Instructions exceed maximum length of {MAX_INSTRUCTIONS_CHARS} characters"
            )));
        }
        if PROTECTED_REPOSITORIES.contains(&self.repo.as_str()) {
            return Err(GenerationError::Validation(
                "Example repos cannot be regenerated".to_string(),
            ));
        }
        Ok(())
    }

    pub fn has_caller_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            platform: self.platform.to_lowercase(),
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            token: self.git_token.clone(),
            base_url: self.git_api_url.clone(),
        }
    }
}

/// Pipeline run stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Validating,
    Fetching,
    BudgetCheck,
    Explaining,
    Mapping,
    Diagramming,
    Postprocessing,
    Complete,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::Fetching => "fetching",
            Self::BudgetCheck => "budget_check",
            Self::Explaining => "explaining",
            Self::Mapping => "mapping",
            Self::Diagramming => "diagramming",
            Self::Postprocessing => "postprocessing",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run-level error taxonomy. Every variant surfaces to the caller as exactly
/// one terminal `error` event (streaming) or an `{ "error": .. }` body (cost).
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    UnsupportedPlatform(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    QuotaExceeded(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Connectivity(String),

    #[error("The instructions provided are invalid or ambiguous")]
    SemanticVeto,

    #[error("The {0} phase did not finish within {1} seconds")]
    Timeout(PipelineStage, u64),
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::UnsupportedPlatform(_) => "unsupported_platform",
            Self::NotFound(_) => "not_found",
            Self::QuotaExceeded(_) => "quota_exceeded",
            Self::Upstream(_) => "upstream",
            Self::Connectivity(_) => "connectivity",
            Self::SemanticVeto => "semantic_veto",
            Self::Timeout(..) => "timeout",
        }
    }
}

impl From<GitError> for GenerationError {
    fn from(err: GitError) -> Self {
        let message = err.to_string();
        match err {
            GitError::UnsupportedPlatform(_) => Self::UnsupportedPlatform(message),
            GitError::NotFound(_) => Self::NotFound(message),
            GitError::Network { .. } => Self::Connectivity(message),
            GitError::Status { status: 404, .. } => Self::NotFound(message),
            GitError::Status { .. } | GitError::Malformed { .. } => Self::Upstream(message),
        }
    }
}

impl From<LLMError> for GenerationError {
    fn from(err: LLMError) -> Self {
        let message = err.to_string();
        match err {
            LLMError::UnsupportedPlatform(_) => Self::UnsupportedPlatform(message),
            LLMError::Network { .. } => Self::Connectivity(message),
            LLMError::InvalidInput(_) => Self::Validation(message),
            LLMError::Status { .. } | LLMError::Provider(_) | LLMError::Tokenizer(_) => {
                Self::Upstream(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest::new("github", "octocat", "Hello-World")
    }

    #[test]
    fn accepts_instructions_at_the_limit() {
        let mut req = request();
        req.instructions = "x".repeat(MAX_INSTRUCTIONS_CHARS);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_instructions_over_the_limit() {
        let mut req = request();
        req.instructions = "x".repeat(MAX_INSTRUCTIONS_CHARS + 1);
        let err = req.validate().unwrap_err();
        assert!(matches!(err, GenerationError::Validation(_)));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let mut req = request();
        req.instructions = "é".repeat(MAX_INSTRUCTIONS_CHARS);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_protected_repositories() {
        for repo in PROTECTED_REPOSITORIES {
            let req = GenerationRequest::new("github", "someone", repo);
            assert!(matches!(req.validate(), Err(GenerationError::Validation(_))));
        }
    }

    #[test]
    fn deserializes_wire_format_with_defaults() {
        let req: GenerationRequest = serde_json::from_str(
            r#"{"username":"octocat","repo":"Hello-World","reasoning_effort":"high"}"#,
        )
        .unwrap();

        assert_eq!(req.platform, "github");
        assert_eq!(req.owner, "octocat");
        assert_eq!(req.instructions, "");
        assert_eq!(req.reasoning_effort, Some(ReasoningEffort::High));
        assert!(!req.has_caller_key());
    }

    #[test]
    fn cache_key_ignores_llm_choice_and_instructions() {
        let mut a = request();
        let mut b = request();
        a.instructions = "focus on the backend".into();
        b.ai_platform = Some("claude".into());
        b.api_key = Some("sk-test".into());
        assert_eq!(a.cache_key(), b.cache_key());

        b.git_token = Some("ghp_x".into());
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn classifies_provider_errors() {
        let err: GenerationError = GitError::Status {
            provider: "GitHub",
            status: 404,
            body: "Not Found".into(),
        }
        .into();
        assert_eq!(err.kind(), "not_found");

        let err: GenerationError = LLMError::Network {
            provider: "OpenAI".into(),
            message: "connection refused".into(),
        }
        .into();
        assert_eq!(err.kind(), "connectivity");
    }
}
