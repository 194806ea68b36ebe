//! LRU memory tier.
//!
//! The [`ChunkCache`] holds whole [`Chunk`] values: content, placeholders
//! and the request records attached to them. Entries evicted from here take
//! their request records with them.

use std::sync::atomic::{AtomicU64, Ordering};

use hashlink::LruCache;
use metrics::Gauge;
use parking_lot::Mutex;
use vertex_swarm_api::{Chunk, ChunkAddress};

/// LRU cache of chunks.
pub struct ChunkCache {
    cache: Mutex<LruCache<ChunkAddress, Chunk>>,
    hits: AtomicU64,
    misses: AtomicU64,
    size: Gauge,
}

impl std::fmt::Debug for ChunkCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkCache")
            .field("stats", &self.stats())
            .finish()
    }
}

impl ChunkCache {
    /// Create a new cache with the given capacity (at least one entry).
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(capacity.max(1))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            size: metrics::gauge!("storer.cache.size"),
        }
    }

    /// Get a chunk, marking it most recently used.
    pub fn get(&self, address: &ChunkAddress) -> Option<Chunk> {
        let mut cache = self.cache.lock();
        match cache.get(address) {
            Some(chunk) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(chunk.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert or replace a chunk, evicting the least recently used entry if full.
    pub fn put(&self, chunk: Chunk) {
        let mut cache = self.cache.lock();
        cache.insert(*chunk.address(), chunk);
        self.size.set(cache.len() as f64);
    }

    /// Check if a chunk is in the cache, without touching its recency.
    pub fn contains(&self, address: &ChunkAddress) -> bool {
        self.cache.lock().contains_key(address)
    }

    /// Get the number of cached chunks.
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let cache = self.cache.lock();

        CacheStats {
            capacity: cache.capacity(),
            size: cache.len(),
            hits,
            misses,
            hit_rate: if hits + misses > 0 {
                (hits as f64 / (hits + misses) as f64) * 100.0
            } else {
                0.0
            },
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Maximum cache capacity.
    pub capacity: usize,
    /// Current cache size.
    pub size: usize,
    /// Cache hits.
    pub hits: u64,
    /// Cache misses.
    pub misses: u64,
    /// Hit rate percentage.
    pub hit_rate: f64,
}
