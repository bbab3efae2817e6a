// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Factory - Platform/Model Resolution
//
// Resolves a catalog platform id and model id to a provider adapter using
// the configured endpoints and API keys. Unknown models on a known
// platform resolve to that platform's default model.

use super::anthropic::AnthropicAdapter;
use super::deepseek::DeepSeekAdapter;
use super::openai::OpenAIAdapter;
use crate::domain::catalog::{self, ANTHROPIC_MODELS, DEEPSEEK_MODELS, OPENAI_MODELS};
use crate::domain::config::{resolve_secret, LlmConfig};
use crate::domain::llm::{LLMError, LLMProvider, LLMProviderFactory};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct DefaultLLMProviderFactory {
    config: LlmConfig,
}

impl DefaultLLMProviderFactory {
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }

    fn pick_model(platform: &'static str, requested: &str, supported: &[&str]) -> String {
        if supported.contains(&requested) {
            return requested.to_string();
        }
        let fallback = catalog::default_model(platform).unwrap_or(supported[0]);
        if !requested.is_empty() {
            warn!(platform, requested, fallback, "Unknown model; using platform default");
        }
        fallback.to_string()
    }
}

impl Default for DefaultLLMProviderFactory {
    fn default() -> Self {
        Self::new(LlmConfig::default())
    }
}

impl LLMProviderFactory for DefaultLLMProviderFactory {
    fn create(&self, platform: &str, model: &str) -> Result<Arc<dyn LLMProvider>, LLMError> {
        let provider: Arc<dyn LLMProvider> = match platform.to_lowercase().as_str() {
            "openai" => Arc::new(OpenAIAdapter::new(
                self.config.openai.endpoint.clone(),
                resolve_secret(self.config.openai.api_key.as_deref()),
                Self::pick_model("openai", model, &OPENAI_MODELS),
            )),
            "claude" => Arc::new(AnthropicAdapter::new(
                self.config.anthropic.endpoint.clone(),
                resolve_secret(self.config.anthropic.api_key.as_deref()),
                Self::pick_model("claude", model, &ANTHROPIC_MODELS),
            )),
            "deepseek" => Arc::new(DeepSeekAdapter::new(
                self.config.deepseek.endpoint.clone(),
                resolve_secret(self.config.deepseek.api_key.as_deref()),
                Self::pick_model("deepseek", model, &DEEPSEEK_MODELS),
            )),
            _ => return Err(LLMError::UnsupportedPlatform(platform.to_string())),
        };

        debug!(
            platform = provider.platform(),
            model = provider.model(),
            "Created LLM provider"
        );
        Ok(provider)
    }
}
