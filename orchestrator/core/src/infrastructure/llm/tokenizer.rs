// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! BPE token counting for providers that publish their encoding.

use crate::domain::llm::LLMError;
use std::sync::LazyLock;
use tiktoken_rs::CoreBPE;

static O200K_BASE: LazyLock<Result<CoreBPE, String>> =
    LazyLock::new(|| tiktoken_rs::o200k_base().map_err(|e| e.to_string()));

static CL100K_BASE: LazyLock<Result<CoreBPE, String>> =
    LazyLock::new(|| tiktoken_rs::cl100k_base().map_err(|e| e.to_string()));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoding {
    O200kBase,
    Cl100kBase,
}

impl Encoding {
    pub fn count(self, text: &str) -> Result<usize, LLMError> {
        let bpe = match self {
            Self::O200kBase => &*O200K_BASE,
            Self::Cl100kBase => &*CL100K_BASE,
        };
        bpe.as_ref()
            .map(|bpe| bpe.encode_with_special_tokens(text).len())
            .map_err(|e| LLMError::Tokenizer(e.clone()))
    }
}

/// Rough upper estimate used when no tokenizer is available.
pub(crate) fn estimate_by_words(text: &str) -> usize {
    text.split_whitespace().count() * 4
}
