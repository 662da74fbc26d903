//! Backend resource cache for library LUTs.
//!
//! Resources are created on first use by a chain and live until the owning
//! library disposes them. There is no capacity limit and no eviction: the
//! set is bounded by the user's library.
//!
//! The cache is single-owner. Callers sharing it across threads must wrap
//! it (for example in a mutex) themselves.

use std::collections::HashMap;

use lutmix_lut::LutDocument;
use tracing::{debug, trace};

use crate::backend::{SamplingBackend, SamplingResource};
use crate::{EngineResult, LutId};

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that required an upload.
    pub misses: u64,
    /// Entries released through [`LutCache::dispose`].
    pub disposals: u64,
}

/// LUT resource cache keyed by library identity.
///
/// Generic over the backend whose resources it holds.
pub struct LutCache<B: SamplingBackend> {
    backend: B,
    /// Cached resources by id.
    entries: HashMap<LutId, B::Resource>,
    /// Total cached bytes.
    total_bytes: u64,
    stats: CacheStats,
}

impl<B: SamplingBackend> LutCache<B> {
    /// Create an empty cache over `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            entries: HashMap::new(),
            total_bytes: 0,
            stats: CacheStats::default(),
        }
    }

    /// Returns the resource for `id`, uploading `lut` on a miss.
    ///
    /// A failed upload leaves the cache unchanged.
    pub fn get_or_create(&mut self, id: LutId, lut: &LutDocument) -> EngineResult<&B::Resource> {
        if self.entries.contains_key(&id) {
            self.stats.hits += 1;
            trace!(%id, "cache hit");
        } else {
            let resource = self.backend.upload(lut)?;
            self.stats.misses += 1;
            self.total_bytes += resource.size_bytes();
            debug!(%id, size = lut.size(), backend = self.backend.name(), "uploaded LUT resource");
            self.entries.insert(id, resource);
        }
        Ok(&self.entries[&id])
    }

    /// Returns the cached resource without creating one.
    pub fn get(&self, id: LutId) -> Option<&B::Resource> {
        self.entries.get(&id)
    }

    /// Whether `id` has a resource.
    pub fn contains(&self, id: LutId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Releases the resource for `id`. No-op when absent.
    ///
    /// Returns true when an entry was removed.
    pub fn dispose(&mut self, id: LutId) -> bool {
        match self.entries.remove(&id) {
            Some(resource) => {
                self.total_bytes = self.total_bytes.saturating_sub(resource.size_bytes());
                self.stats.disposals += 1;
                debug!(%id, "disposed LUT resource");
                self.backend.release(resource);
                true
            }
            None => false,
        }
    }

    /// Releases every resource.
    pub fn dispose_all(&mut self) {
        let ids: Vec<LutId> = self.entries.keys().copied().collect();
        for id in ids {
            self.dispose(id);
        }
    }

    /// Number of cached resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes held by cached resources.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Backend the resources belong to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Hit/miss/disposal counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl<B: SamplingBackend + Default> Default for LutCache<B> {
    fn default() -> Self {
        Self::new(B::default())
    }
}
