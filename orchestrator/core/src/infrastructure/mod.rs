// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod cache;
pub mod git;
pub mod llm;

pub use cache::RepositoryCache;
