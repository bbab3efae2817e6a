// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

// OpenAI LLM Provider Adapter
//
// Anti-Corruption Layer for the OpenAI chat completions API, restricted to
// the o-series reasoning models. Sampling is fixed upstream; the reasoning
// effort is forwarded as-is.

use super::chat::{delta_content, ChatMessage, ChatRequest, ChatResponse};
use super::sse::{send_checked, stream_completion, Dialect};
use super::tokenizer::Encoding;
use crate::domain::llm::{CompletionRequest, LLMError, LLMProvider, TextStream};
use async_trait::async_trait;

const PROVIDER: &str = "OpenAI";
const MAX_COMPLETION_TOKENS: u32 = 12_000;

pub struct OpenAIAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAIAdapter {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        }
    }

    /// o1-mini accepts neither a system role nor a reasoning effort.
    fn is_legacy_reasoner(&self) -> bool {
        self.model == "o1-mini"
    }

    fn body(&self, request: &CompletionRequest, stream: bool) -> ChatRequest {
        let user = request.input.render();
        let (messages, reasoning_effort) = if self.is_legacy_reasoner() {
            (
                vec![ChatMessage::user(format!("{}\n\n{user}", request.system_prompt))],
                None,
            )
        } else {
            (
                vec![
                    ChatMessage::system(request.system_prompt.clone()),
                    ChatMessage::user(user),
                ],
                Some(request.reasoning_effort.as_str().to_string()),
            )
        };

        ChatRequest {
            model: self.model.clone(),
            messages,
            max_completion_tokens: Some(MAX_COMPLETION_TOKENS),
            max_tokens: None,
            temperature: None,
            reasoning_effort,
            stream,
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
                    "OpenAI API key not configured; supply one with the request".to_string(),
                )
            })?;

        Ok(self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(api_key)
            .json(&self.body(request, stream)))
    }
}

#[async_trait]
impl LLMProvider for OpenAIAdapter {
    fn platform(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LLMError> {
        let response = send_checked(PROVIDER, self.build(request, false)?).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LLMError::Provider(format!("Failed to parse OpenAI response: {e}")))?;
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
        Encoding::O200kBase.count(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::{PromptInput, ReasoningEffort};
    use futures::TryStreamExt;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn request(api_key: Option<&str>) -> CompletionRequest {
        CompletionRequest {
            system_prompt: "You explain repositories.".to_string(),
            input: PromptInput::new().with("readme", "# Demo"),
            api_key: api_key.map(str::to_string),
            reasoning_effort: ReasoningEffort::High,
        }
    }

    #[tokio::test]
    async fn streams_deltas_with_caller_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-caller")
            .match_body(Matcher::PartialJson(json!({
                "model": "o3-mini",
                "reasoning_effort": "high",
                "max_completion_tokens": 12000,
                "stream": true
            })))
            .with_status(200)
            .with_body(concat!(
                "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"flowchart\"}}]}\n\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\" TD\"}}]}\n\n",
                "data: [DONE]\n\n",
            ))
            .create_async()
            .await;

        let adapter = OpenAIAdapter::new(server.url(), Some("sk-server".into()), "o3-mini");
        let chunks: Vec<String> = adapter
            .complete_stream(request(Some("sk-caller")))
            .try_collect()
            .await
            .unwrap();

        assert_eq!(chunks.concat(), "flowchart TD");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn blank_caller_key_falls_back_to_configured_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-server")
            .with_status(200)
            .with_body(concat!(
                "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\n",
                "data: [DONE]\n\n",
            ))
            .create_async()
            .await;

        let adapter = OpenAIAdapter::new(server.url(), Some("sk-server".into()), "o3-mini");
        let chunks: Vec<String> = adapter
            .complete_stream(request(Some("")))
            .try_collect()
            .await
            .unwrap();

        assert_eq!(chunks, vec!["ok"]);
        mock.assert_async().await;
    }

    #[test]
    fn legacy_model_folds_system_prompt() {
        let adapter = OpenAIAdapter::new("http://unused", None, "o1-mini");
        let body = adapter.body(&request(None), false);
        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].role, "user");
        assert!(body.messages[0].content.starts_with("You explain repositories."));
        assert!(body.reasoning_effort.is_none());
    }

    #[tokio::test]
    async fn blocking_completion_returns_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(json!({"model": "o4-mini", "stream": false})))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#)
            .create_async()
            .await;

        let adapter = OpenAIAdapter::new(server.url(), Some("sk".into()), "o4-mini");
        assert_eq!(adapter.complete(&request(None)).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn status_error_is_preserved() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key"}}"#)
            .create_async()
            .await;

        let adapter = OpenAIAdapter::new(server.url(), Some("bad".into()), "o3-mini");
        let err = adapter.complete(&request(None)).await.unwrap_err();
        assert!(matches!(err, LLMError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let adapter = OpenAIAdapter::new("http://127.0.0.1:9", None, "o3-mini");
        let err = adapter.complete(&request(None)).await.unwrap_err();
        assert!(matches!(err, LLMError::InvalidInput(_)));
    }
}
