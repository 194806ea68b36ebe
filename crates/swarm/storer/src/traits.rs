//! Durable tier backend trait.
//!
//! The [`ChunkStore`] trait abstracts over storage backends for chunk
//! content, allowing redb on disk or plain memory.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;
use vertex_swarm_api::ChunkAddress;

use crate::StorerResult;

/// Durable chunk content backend.
///
/// Values are span-prefixed chunk content. Placeholders and request records
/// never reach this tier.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (Send + Sync).
pub trait ChunkStore: Send + Sync {
    /// Store a chunk's content.
    ///
    /// If content already exists for the address it is kept: the first write
    /// wins.
    fn put(&self, address: &ChunkAddress, data: &[u8]) -> StorerResult<()>;

    /// Get a chunk's content.
    ///
    /// Returns `None` if the chunk doesn't exist.
    fn get(&self, address: &ChunkAddress) -> StorerResult<Option<Bytes>>;

    /// Check if a chunk exists.
    fn contains(&self, address: &ChunkAddress) -> StorerResult<bool>;

    /// Get the count of stored chunks.
    fn count(&self) -> StorerResult<u64>;
}

/// In-memory durable tier, for tests and simulated nodes.
#[derive(Debug, Default)]
pub struct MemoryChunkStore {
    chunks: RwLock<HashMap<ChunkAddress, Bytes>>,
}

impl MemoryChunkStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChunkStore for MemoryChunkStore {
    fn put(&self, address: &ChunkAddress, data: &[u8]) -> StorerResult<()> {
        self.chunks
            .write()
            .entry(*address)
            .or_insert_with(|| Bytes::copy_from_slice(data));
        Ok(())
    }

    fn get(&self, address: &ChunkAddress) -> StorerResult<Option<Bytes>> {
        Ok(self.chunks.read().get(address).cloned())
    }

    fn contains(&self, address: &ChunkAddress) -> StorerResult<bool> {
        Ok(self.chunks.read().contains_key(address))
    }

    fn count(&self) -> StorerResult<u64> {
        Ok(self.chunks.read().len() as u64)
    }
}
