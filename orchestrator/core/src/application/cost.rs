// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Generation cost estimate.

use crate::domain::catalog::Pricing;

/// Prompt overhead added to every estimate, in tokens.
pub const PROMPT_OVERHEAD_TOKENS: usize = 3000;

/// Expected output across the three phases, in tokens.
pub const ESTIMATED_OUTPUT_TOKENS: usize = 8000;

/// The file tree is sent twice (explanation and mapping phases).
pub fn estimate_usd(file_tree_tokens: usize, readme_tokens: usize, pricing: Pricing) -> f64 {
    let input_tokens = file_tree_tokens * 2 + readme_tokens + PROMPT_OVERHEAD_TOKENS;
    input_tokens as f64 * pricing.input + ESTIMATED_OUTPUT_TOKENS as f64 * pricing.output
}

/// `$X.XX USD`
pub fn format_usd(amount: f64) -> String {
    format!("${amount:.2} USD")
}
