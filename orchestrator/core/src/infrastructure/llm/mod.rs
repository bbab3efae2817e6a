// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Infrastructure - Anti-Corruption Layer Implementations
//
// Each provider adapter translates between the domain LLMProvider interface
// and one vendor API. Streaming responses share the SSE decoder.

pub mod anthropic;
mod chat;
pub mod deepseek;
pub mod factory;
pub mod openai;
mod sse;
mod tokenizer;

pub use factory::DefaultLLMProviderFactory;
