// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

// DeepSeek LLM Provider Adapter
//
// DeepSeek speaks the OpenAI chat completions dialect; reasoning effort is
// expressed as a sampling temperature.

use super::chat::{delta_content, ChatMessage, ChatRequest, ChatResponse};
use super::sse::{send_checked, stream_completion, Dialect};
use super::tokenizer::{estimate_by_words, Encoding};
use crate::domain::llm::{CompletionRequest, LLMError, LLMProvider, ReasoningEffort, TextStream};
use async_trait::async_trait;
use tracing::warn;

const PROVIDER: &str = "DeepSeek";
const MAX_TOKENS: u32 = 4000;

pub struct DeepSeekAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

fn temperature(effort: ReasoningEffort) -> f32 {
    match effort {
        ReasoningEffort::Low => 0.7,
        ReasoningEffort::Medium => 0.5,
        ReasoningEffort::High => 0.2,
    }
}

impl DeepSeekAdapter {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        }
    }

    fn build(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<reqwest::RequestBuilder, LLMError> {
        let api_key = request
            .resolve_api_key(self.api_key.as_deref())
            .ok_or_else(|| {
                LLMError::InvalidInput(
                    "DeepSeek API key not configured; supply one with the request".to_string(),
                )
            })?;

        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(request.system_prompt.clone()),
                ChatMessage::user(request.input.render()),
            ],
            max_completion_tokens: None,
            max_tokens: Some(MAX_TOKENS),
            temperature: Some(temperature(request.reasoning_effort)),
            reasoning_effort: None,
            stream,
        };

        Ok(self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(api_key)
            .json(&body))
    }
}

#[async_trait]
impl LLMProvider for DeepSeekAdapter {
    fn platform(&self) -> &str {
        "deepseek"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LLMError> {
        let response = send_checked(PROVIDER, self.build(request, false)?).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LLMError::Provider(format!("Failed to parse DeepSeek response: {e}")))?;
        parsed.into_text(PROVIDER)
    }

    fn complete_stream(&self, request: CompletionRequest) -> TextStream {
        stream_completion(
            self.build(&request, true),
            Dialect {
                provider: PROVIDER,
                heartbeat: None,
                extract: delta_content,
            },
        )
    }

    async fn count_tokens(&self, text: &str) -> Result<usize, LLMError> {
        match Encoding::Cl100kBase.count(text) {
            Ok(count) => Ok(count),
            Err(e) => {
                warn!(error = %e, "cl100k_base unavailable; estimating DeepSeek tokens by words");
                Ok(estimate_by_words(text))
            }
        }
    }
}
