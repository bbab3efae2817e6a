// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Llm
//!
//! Provider-agnostic interface to chat-style language models.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Anti-corruption boundary between the generation pipeline
//!   and vendor APIs. Adapters live in `infrastructure::llm`.

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

/// Lazy, finite, non-restartable sequence of text fragments.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LLMError>> + Send>>;

/// Domain interface for LLM providers.
///
/// Implementations must be safe to share across concurrent pipeline runs and
/// must not keep per-call mutable state.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Platform identifier as listed in the catalog (e.g. `openai`).
    fn platform(&self) -> &str;

    /// Model identifier as listed in the catalog (e.g. `o3-mini`).
    fn model(&self) -> &str;

    /// Blocking completion: waits for the full response text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LLMError>;

    /// Streaming completion. Errors surface as stream items; the stream ends
    /// after the upstream terminal marker or the end of the body.
    fn complete_stream(&self, request: CompletionRequest) -> TextStream;

    /// Count tokens with this provider's own tokenizer. Counts from different
    /// providers are not comparable.
    async fn count_tokens(&self, text: &str) -> Result<usize, LLMError>;
}

/// Maps a platform/model identifier plus configured credentials to a provider.
pub trait LLMProviderFactory: Send + Sync {
    fn create(&self, platform: &str, model: &str) -> Result<Arc<dyn LLMProvider>, LLMError>;
}

/// A single completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub input: PromptInput,
    /// Caller-supplied key; falls back to the configured key when absent.
    pub api_key: Option<String>,
    pub reasoning_effort: ReasoningEffort,
}

impl CompletionRequest {
    /// The caller's key, or `configured` when the caller sent none or a blank one.
    pub fn resolve_api_key<'a>(&'a self, configured: Option<&'a str>) -> Option<&'a str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .or(configured)
    }
}

/// Structured user input, rendered as XML-tagged sections in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptInput {
    sections: Vec<(String, String)>,
}

impl PromptInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.sections.push((key.into(), value.into()));
        self
    }

    pub fn sections(&self) -> &[(String, String)] {
        &self.sections
    }

    /// Render as the user message sent upstream.
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|(key, value)| format!("<{key}>\n{value}\n</{key}>"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Caller-selectable quality/latency trade-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    #[default]
    Medium,
    High,
}

impl ReasoningEffort {
    pub const ALL: [ReasoningEffort; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low - faster, possibly lower quality",
            Self::Medium => "Medium - balances speed and quality",
            Self::High => "High - better quality, slower",
        }
    }
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReasoningEffort {
    type Err = LLMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(LLMError::InvalidInput(format!(
                "unknown reasoning effort '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    /// Transport-level failure reaching the upstream API.
    #[error("Failed to connect to {provider} API: {message}")]
    Network { provider: String, message: String },

    /// Non-success HTTP status from the upstream API.
    #[error("{provider} API returned status code {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    /// Malformed or unexpected upstream payload.
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Unsupported AI platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
