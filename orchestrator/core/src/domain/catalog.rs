// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Static AI platform catalog: supported models, context ceilings and
//! per-token prices used for admission control and cost estimates.

use crate::domain::llm::ReasoningEffort;
use serde::Serialize;
use std::collections::BTreeMap;

/// Ceiling applied when the platform/model pair is not listed.
pub const DEFAULT_TOKEN_LIMIT: usize = 195_000;

/// Above this combined size, runs without a caller key are refused.
pub const DEFAULT_FREE_TIER_TOKEN_LIMIT: usize = 50_000;

pub const OPENAI_MODELS: [&str; 3] = ["o1-mini", "o3-mini", "o4-mini"];
pub const ANTHROPIC_MODELS: [&str; 1] = ["claude-3-5-sonnet"];
pub const DEEPSEEK_MODELS: [&str; 1] = ["deepseek-chat"];

/// USD per token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub input: f64,
    pub output: f64,
}

pub const DEFAULT_PRICING: Pricing = Pricing {
    input: 0.000_001_1,
    output: 0.000_004_4,
};

struct ModelEntry {
    platform: &'static str,
    model: &'static str,
    token_limit: usize,
    pricing: Pricing,
}

const MODELS: &[ModelEntry] = &[
    ModelEntry {
        platform: "openai",
        model: "o1-mini",
        token_limit: 128_000,
        pricing: DEFAULT_PRICING,
    },
    ModelEntry {
        platform: "openai",
        model: "o3-mini",
        token_limit: 195_000,
        pricing: DEFAULT_PRICING,
    },
    ModelEntry {
        platform: "openai",
        model: "o4-mini",
        token_limit: 195_000,
        pricing: DEFAULT_PRICING,
    },
    ModelEntry {
        platform: "claude",
        model: "claude-3-5-sonnet",
        token_limit: 180_000,
        pricing: Pricing {
            input: 0.000_003,
            output: 0.000_015,
        },
    },
    ModelEntry {
        platform: "deepseek",
        model: "deepseek-chat",
        token_limit: 128_000,
        pricing: Pricing {
            input: 0.000_001,
            output: 0.000_003,
        },
    },
];

fn lookup(platform: &str, model: &str) -> Option<&'static ModelEntry> {
    MODELS
        .iter()
        .find(|entry| entry.platform.eq_ignore_ascii_case(platform) && entry.model == model)
}

/// Context ceiling for a platform/model pair.
pub fn token_limit(platform: &str, model: &str) -> usize {
    lookup(platform, model).map_or(DEFAULT_TOKEN_LIMIT, |entry| entry.token_limit)
}

/// Per-token prices for a platform/model pair.
pub fn pricing(platform: &str, model: &str) -> Pricing {
    lookup(platform, model).map_or(DEFAULT_PRICING, |entry| entry.pricing)
}

/// Default model for a platform, if the platform is known.
pub fn default_model(platform: &str) -> Option<&'static str> {
    match platform.to_lowercase().as_str() {
        "openai" => Some("o3-mini"),
        "claude" => Some("claude-3-5-sonnet"),
        "deepseek" => Some("deepseek-chat"),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformInfo {
    pub name: &'static str,
    pub models: Vec<&'static str>,
    pub default_model: &'static str,
    pub description: &'static str,
    pub requires_api_key: bool,
}

/// Platform id → display metadata, as served by the catalog endpoint.
pub fn available_platforms() -> BTreeMap<&'static str, PlatformInfo> {
    BTreeMap::from([
        (
            "openai",
            PlatformInfo {
                name: "OpenAI",
                models: OPENAI_MODELS.to_vec(),
                default_model: "o3-mini",
                description: "OpenAI reasoning models",
                requires_api_key: true,
            },
        ),
        (
            "claude",
            PlatformInfo {
                name: "Claude",
                models: ANTHROPIC_MODELS.to_vec(),
                default_model: "claude-3-5-sonnet",
                description: "Anthropic Claude models",
                requires_api_key: true,
            },
        ),
        (
            "deepseek",
            PlatformInfo {
                name: "DeepSeek",
                models: DEEPSEEK_MODELS.to_vec(),
                default_model: "deepseek-chat",
                description: "DeepSeek chat models",
                requires_api_key: true,
            },
        ),
    ])
}

pub fn reasoning_effort_options() -> BTreeMap<&'static str, &'static str> {
    ReasoningEffort::ALL
        .iter()
        .map(|effort| (effort.as_str(), effort.description()))
        .collect()
}
