//! Two-tier local store.
//!
//! This module provides [`LocalStore`] which implements the
//! [`SwarmLocalStore`] trait from swarm-api.

use std::path::Path;

use tracing::{debug, trace};
use vertex_swarm_api::{Chunk, ChunkAddress, LocalStoreConfig, SwarmLocalStore, SwarmResult};

use crate::{
    CacheStats, ChunkCache, ChunkStore, MemoryChunkStore, RedbChunkStore, StorerError,
    StorerResult,
};

/// Local store backed by an LRU memory tier and a durable [`ChunkStore`].
///
/// Lookups try the memory tier first and promote durable hits into it.
/// Writes go to both tiers; only content is persisted.
#[derive(Debug)]
pub struct LocalStore<S: ChunkStore> {
    /// Durable tier.
    store: S,
    /// Memory tier.
    cache: ChunkCache,
}

impl<S: ChunkStore> LocalStore<S> {
    /// Create a local store over `store` with a memory tier sized by `config`.
    pub fn new(store: S, config: &impl LocalStoreConfig) -> Self {
        Self::with_cache(store, ChunkCache::new(config.cache_chunks() as usize))
    }

    /// Create with a custom memory tier.
    pub fn with_cache(store: S, cache: ChunkCache) -> Self {
        Self { store, cache }
    }

    /// The durable tier.
    pub fn durable(&self) -> &S {
        &self.store
    }

    /// Get memory-tier statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn load(&self, address: &ChunkAddress) -> StorerResult<Option<Chunk>> {
        let Some(data) = self.store.get(address)? else {
            return Ok(None);
        };
        let chunk = Chunk::new(*address, data).map_err(|err| StorerError::InvalidChunk {
            address: *address,
            reason: err.to_string(),
        })?;
        Ok(Some(chunk))
    }
}

impl LocalStore<MemoryChunkStore> {
    /// Create a store whose durable tier lives in memory.
    pub fn in_memory(config: &impl LocalStoreConfig) -> Self {
        Self::new(MemoryChunkStore::new(), config)
    }
}

impl LocalStore<RedbChunkStore> {
    /// Open a store whose durable tier is the redb database at `path`.
    pub fn open(path: impl AsRef<Path>, config: &impl LocalStoreConfig) -> StorerResult<Self> {
        Ok(Self::new(RedbChunkStore::open(path)?, config))
    }
}

impl<S: ChunkStore> SwarmLocalStore for LocalStore<S> {
    fn put(&self, chunk: Chunk) -> SwarmResult<()> {
        let address = *chunk.address();

        if let Some(data) = chunk.data() {
            self.store.put(&address, data)?;
            trace!(%address, size = chunk.size(), "persisted chunk");
        }

        self.cache.put(chunk);
        Ok(())
    }

    fn get(&self, address: &ChunkAddress) -> SwarmResult<Option<Chunk>> {
        if let Some(chunk) = self.cache.get(address) {
            trace!(%address, "memory tier hit");
            return Ok(Some(chunk));
        }

        let Some(chunk) = self.load(address)? else {
            return Ok(None);
        };

        debug!(%address, "promoting chunk from durable tier");
        self.cache.put(chunk.clone());
        Ok(Some(chunk))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::LocalStoreArgs;
    use tempfile::tempdir;
    use vertex_swarm_api::{RequestRecord, SwarmError};

    fn test_address(n: u8) -> ChunkAddress {
        let mut bytes = [0u8; 32];
        bytes[0] = n;
        ChunkAddress::new(bytes)
    }

    fn small(cache_chunks: u64) -> LocalStoreArgs {
        LocalStoreArgs {
            cache_chunks,
            ..Default::default()
        }
    }

    #[test]
    fn test_put_get() {
        let store = LocalStore::in_memory(&LocalStoreArgs::default());
        store
            .put(Chunk::from_payload(test_address(1), b"chunk data 1"))
            .unwrap();

        let chunk = store.get(&test_address(1)).unwrap().unwrap();
        assert_eq!(chunk.payload().unwrap().as_ref(), b"chunk data 1");
        assert!(store.get(&test_address(2)).unwrap().is_none());
    }

    #[test]
    fn test_placeholder_is_not_persisted() {
        let store = LocalStore::in_memory(&LocalStoreArgs::default());
        store.put(Chunk::placeholder(test_address(1))).unwrap();

        let chunk = store.get(&test_address(1)).unwrap().unwrap();
        assert!(!chunk.has_data());
        assert!(!store.durable().contains(&test_address(1)).unwrap());
    }

    #[test]
    fn test_upsert_keeps_record() {
        let store = LocalStore::in_memory(&LocalStoreArgs::default());
        let mut placeholder = Chunk::placeholder(test_address(1));
        let record = placeholder.attach_request(Arc::new(RequestRecord::new())).clone();
        store.put(placeholder).unwrap();

        let mut entry = store.get(&test_address(1)).unwrap().unwrap();
        assert!(entry.fill_from(&Chunk::from_payload(test_address(1), b"filled")));
        store.put(entry).unwrap();

        let entry = store.get(&test_address(1)).unwrap().unwrap();
        assert!(entry.has_data());
        assert!(Arc::ptr_eq(entry.request().unwrap(), &record));
    }

    #[test]
    fn test_evicted_content_is_promoted_back() {
        let store = LocalStore::in_memory(&small(1));
        store
            .put(Chunk::from_payload(test_address(1), b"one"))
            .unwrap();
        store
            .put(Chunk::from_payload(test_address(2), b"two"))
            .unwrap();

        let chunk = store.get(&test_address(1)).unwrap().unwrap();
        assert_eq!(chunk.payload().unwrap().as_ref(), b"one");
        assert_eq!(chunk.size(), 3);

        // The promoted copy now answers from memory.
        assert!(store.get(&test_address(1)).unwrap().unwrap().has_data());
        let stats = store.cache_stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
        assert_eq!((stats.size, stats.capacity), (1, 1));
    }

    #[test]
    fn test_evicted_placeholder_is_gone() {
        let store = LocalStore::in_memory(&small(1));
        store.put(Chunk::placeholder(test_address(1))).unwrap();
        store.put(Chunk::placeholder(test_address(2))).unwrap();

        assert!(store.get(&test_address(1)).unwrap().is_none());
    }

    #[test]
    fn test_redb_tier_survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chunks.redb");
        {
            let store = LocalStore::open(&path, &LocalStoreArgs::default()).unwrap();
            store
                .put(Chunk::from_payload(test_address(9), b"hello-chunk"))
                .unwrap();
        }

        let store = LocalStore::open(&path, &LocalStoreArgs::default()).unwrap();
        let chunk = store.get(&test_address(9)).unwrap().unwrap();
        assert_eq!(chunk.size(), 11);
        assert_eq!(chunk.payload().unwrap().as_ref(), b"hello-chunk");
    }

    #[test]
    fn test_corrupt_durable_entry_is_storage_error() {
        let store = LocalStore::in_memory(&small(1));
        store.durable().put(&test_address(1), &[1, 2, 3]).unwrap();

        let err = store.get(&test_address(1)).unwrap_err();
        assert!(matches!(err, SwarmError::Storage { .. }));
    }
}
