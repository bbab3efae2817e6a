// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

use crate::domain::git::GitProvider;
use std::fmt;
use std::sync::Arc;

/// Identity of one memoizable repository fetch. Independent of the LLM
/// choice and the caller's instructions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub platform: String,
    pub owner: String,
    pub repo: String,
    pub token: Option<String>,
    pub base_url: Option<String>,
}

/// Repository metadata shared read-only by every phase of a run, and by
/// concurrent runs that hit the same cache entry.
#[derive(Clone)]
pub struct RepositoryData {
    pub default_branch: String,
    /// Newline-joined, filtered path list.
    pub file_tree: String,
    pub readme: String,
    /// Provider that produced this entry; reused for URL construction.
    pub provider: Arc<dyn GitProvider>,
}

impl fmt::Debug for RepositoryData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryData")
            .field("default_branch", &self.default_branch)
            .field("file_tree_len", &self.file_tree.len())
            .field("readme_len", &self.readme.len())
            .field("provider", &self.provider.platform())
            .finish()
    }
}

impl PartialEq for RepositoryData {
    fn eq(&self, other: &Self) -> bool {
        self.default_branch == other.default_branch
            && self.file_tree == other.file_tree
            && self.readme == other.readme
            && self.provider.platform() == other.provider.platform()
    }
}
