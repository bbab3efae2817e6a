// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

// Repository Data Cache
//
// Process-wide LRU memoization of (default branch, file tree, README) per
// repository identity. The lock covers bookkeeping only and is never held
// across a provider call, so concurrent misses on one key may fetch twice.

use crate::domain::git::{GitError, GitProvider, FALLBACK_BRANCH};
use crate::domain::repository::{CacheKey, RepositoryData};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

pub struct RepositoryCache {
    entries: Mutex<LruCache<CacheKey, Arc<RepositoryData>>>,
}

impl RepositoryCache {
    /// A zero capacity is clamped to one entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Return the cached entry for `key`, or fetch it through `provider`.
    /// Failed fetches are not cached.
    pub async fn get_or_fetch(
        &self,
        key: &CacheKey,
        provider: Arc<dyn GitProvider>,
    ) -> Result<Arc<RepositoryData>, GitError> {
        let cached = self.entries.lock().get(key).cloned();
        if let Some(data) = cached {
            metrics::counter!("repograph_cache_lookups_total", "result" => "hit").increment(1);
            debug!(platform = %key.platform, owner = %key.owner, repo = %key.repo, "Repository cache hit");
            return Ok(data);
        }

        metrics::counter!("repograph_cache_lookups_total", "result" => "miss").increment(1);
        debug!(platform = %key.platform, owner = %key.owner, repo = %key.repo, "Repository cache miss");

        let default_branch = provider
            .get_default_branch(&key.owner, &key.repo)
            .await?
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string());
        let file_tree = provider.get_file_tree(&key.owner, &key.repo).await?;
        let readme = provider.get_readme(&key.owner, &key.repo).await?;

        let data = Arc::new(RepositoryData {
            default_branch,
            file_tree,
            readme,
            provider,
        });
        self.entries.lock().put(key.clone(), Arc::clone(&data));
        Ok(data)
    }
}
