// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

// Anthropic LLM Provider Adapter
//
// Anti-Corruption Layer for the Anthropic Messages API. Tokens are counted
// by the upstream count_tokens endpoint since no local encoding is published.

use super::sse::{send_checked, stream_completion, Delta, Dialect};
use super::tokenizer::Encoding;
use crate::domain::llm::{CompletionRequest, LLMError, LLMProvider, ReasoningEffort, TextStream};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const PROVIDER: &str = "Anthropic";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

pub struct AnthropicAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<AnthropicMessage>,
    stream: bool,
}

#[derive(Serialize)]
struct CountTokensRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct CountTokensResponse {
    input_tokens: usize,
}

fn temperature(effort: ReasoningEffort) -> f32 {
    match effort {
        ReasoningEffort::Low => 0.7,
        ReasoningEffort::Medium => 0.3,
        ReasoningEffort::High => 0.0,
    }
}

/// Catalog ids name a model family; the API wants a concrete alias.
fn upstream_model(model: &str) -> String {
    match model {
        "claude-3-5-sonnet" => "claude-3-5-sonnet-latest".to_string(),
        other => other.to_string(),
    }
}

fn stream_event(value: &Value) -> Delta {
    match value.get("type").and_then(Value::as_str) {
        Some("content_block_delta") => value
            .pointer("/delta/text")
            .and_then(Value::as_str)
            .map_or(Delta::Skip, |text| Delta::Text(text.to_string())),
        Some("message_stop") => Delta::Stop,
        Some("error") => Delta::Fail(
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown streaming error")
                .to_string(),
        ),
        _ => Delta::Skip,
    }
}

impl AnthropicAdapter {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        }
    }

    fn post(&self, path: &str, api_key: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/{path}", self.endpoint))
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
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
                    "Anthropic API key not configured; supply one with the request".to_string(),
                )
            })?;

        let body = MessagesRequest {
            model: upstream_model(&self.model),
            max_tokens: MAX_TOKENS,
            temperature: temperature(request.reasoning_effort),
            system: request.system_prompt.clone(),
            messages: vec![AnthropicMessage {
                role: "user",
                content: request.input.render(),
            }],
            stream,
        };
        Ok(self.post("messages", api_key).json(&body))
    }
}

#[async_trait]
impl LLMProvider for AnthropicAdapter {
    fn platform(&self) -> &str {
        "claude"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LLMError> {
        let response = send_checked(PROVIDER, self.build(request, false)?).await?;
        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LLMError::Provider(format!("Failed to parse Anthropic response: {e}")))?;

        Ok(parsed
            .content
            .into_iter()
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .concat())
    }

    fn complete_stream(&self, request: CompletionRequest) -> TextStream {
        stream_completion(
            self.build(&request, true),
            Dialect {
                provider: PROVIDER,
                heartbeat: Some("event: ping"),
                extract: stream_event,
            },
        )
    }

    async fn count_tokens(&self, text: &str) -> Result<usize, LLMError> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("No Anthropic key configured; approximating token count locally");
            return Encoding::Cl100kBase.count(text);
        };

        let body = CountTokensRequest {
            model: upstream_model(&self.model),
            messages: vec![AnthropicMessage {
                role: "user",
                content: text.to_string(),
            }],
        };
        let response = send_checked(
            PROVIDER,
            self.post("messages/count_tokens", api_key).json(&body),
        )
        .await?;
        let parsed: CountTokensResponse = response
            .json()
            .await
            .map_err(|e| LLMError::Provider(format!("Failed to parse token count: {e}")))?;
        Ok(parsed.input_tokens)
    }
}
