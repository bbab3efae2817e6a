// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

// OpenAI-compatible chat completions wire format, shared by the OpenAI and
// DeepSeek adapters.

use super::sse::Delta;
use crate::domain::llm::LLMError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(super) struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<String>,
    pub stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl ChatResponse {
    pub fn into_text(self, provider: &str) -> Result<String, LLMError> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LLMError::Provider(format!("{provider}: no choices in response")))
    }
}

/// `choices[0].delta.content` of a streamed chunk.
pub(super) fn delta_content(value: &Value) -> Delta {
    value
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .map_or(Delta::Skip, |text| Delta::Text(text.to_string()))
}
