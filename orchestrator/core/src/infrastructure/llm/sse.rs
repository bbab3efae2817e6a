// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

// Server-Sent Events Decoder
//
// Turns a streaming completion response into a TextStream. Lines are read
// incrementally from the byte stream; only `data:` lines carry payloads.
// `data: [DONE]` ends the stream, malformed JSON payloads are skipped.

use crate::domain::llm::{LLMError, TextStream};
use futures::StreamExt;
use serde_json::Value;
use tracing::{trace, warn};

const DATA_PREFIX: &str = "data:";
const DONE_MARKER: &str = "[DONE]";

/// What a provider extracted from one decoded payload.
#[derive(Debug, PartialEq)]
pub(crate) enum Delta {
    Text(String),
    Skip,
    Stop,
    Fail(String),
}

/// Per-provider stream conventions.
pub(crate) struct Dialect<F> {
    pub provider: &'static str,
    /// Non-data line the upstream sends to keep the connection open.
    pub heartbeat: Option<&'static str>,
    pub extract: F,
}

enum Step {
    Continue,
    Emit(String),
    End,
    Fail(String),
}

/// Incremental newline splitter. Keeps raw bytes so multi-byte characters
/// split across chunks decode correctly.
#[derive(Default)]
pub(crate) struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            lines.push(decode_line(&raw));
        }
        lines
    }

    /// Flush a trailing line that had no terminating newline.
    pub fn finish(&mut self) -> Vec<String> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        let raw = std::mem::take(&mut self.buffer);
        vec![decode_line(&raw)]
    }
}

fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(['\n', '\r'])
        .to_string()
}

fn interpret<F>(dialect: &Dialect<F>, line: &str) -> Step
where
    F: Fn(&Value) -> Delta,
{
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        if dialect.heartbeat.is_some_and(|marker| line.trim() == marker) {
            trace!(provider = dialect.provider, "SSE heartbeat");
        }
        return Step::Continue;
    };

    let payload = payload.trim();
    if payload == DONE_MARKER {
        return Step::End;
    }
    if payload.is_empty() {
        return Step::Continue;
    }

    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(e) => {
            warn!(provider = dialect.provider, error = %e, "Skipping malformed SSE payload");
            return Step::Continue;
        }
    };

    match (dialect.extract)(&value) {
        Delta::Text(text) if text.is_empty() => Step::Continue,
        Delta::Text(text) => Step::Emit(text),
        Delta::Skip => Step::Continue,
        Delta::Stop => Step::End,
        Delta::Fail(message) => Step::Fail(message),
    }
}

/// Issue a request and convert transport failures and non-success statuses.
pub(crate) async fn send_checked(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, LLMError> {
    let response = request.send().await.map_err(|e| LLMError::Network {
        provider: provider.to_string(),
        message: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LLMError::Status {
            provider: provider.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Send `request` and decode its SSE body lazily. Nothing is sent until the
/// stream is first polled.
pub(crate) fn stream_completion<F>(
    request: Result<reqwest::RequestBuilder, LLMError>,
    dialect: Dialect<F>,
) -> TextStream
where
    F: Fn(&Value) -> Delta + Send + Sync + 'static,
{
    Box::pin(async_stream::stream! {
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                yield Err(e);
                return;
            }
        };

        let response = match send_checked(dialect.provider, request).await {
            Ok(response) => response,
            Err(e) => {
                yield Err(e);
                return;
            }
        };

        let mut bytes = response.bytes_stream();
        let mut decoder = LineDecoder::default();

        loop {
            let (lines, finished) = match bytes.next().await {
                Some(Ok(chunk)) => (decoder.push(&chunk), false),
                Some(Err(e)) => {
                    yield Err(LLMError::Network {
                        provider: dialect.provider.to_string(),
                        message: format!("stream interrupted: {e}"),
                    });
                    return;
                }
                None => (decoder.finish(), true),
            };

            for line in lines {
                match interpret(&dialect, &line) {
                    Step::Continue => {}
                    Step::Emit(text) => yield Ok(text),
                    Step::End => return,
                    Step::Fail(message) => {
                        yield Err(LLMError::Provider(format!("{}: {message}", dialect.provider)));
                        return;
                    }
                }
            }

            if finished {
                break;
            }
        }
    })
}
