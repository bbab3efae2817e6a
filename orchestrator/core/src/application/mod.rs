// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod cost;
pub mod generation;
pub mod prompts;

pub use generation::{check_token_budget, DiagramGenerationService, EventStream, GenerationSettings};
