//! Local chunk storage.

use crate::{Chunk, SwarmResult};
use vertex_swarm_primitives::ChunkAddress;

/// Local two-tier chunk storage used by the distributed chunk store.
///
/// Implementations must tell a stored placeholder apart from a missing chunk:
/// `get` returns `Some` for a content-less entry and `None` only when nothing
/// is stored for the address. Entries, and the request records they carry,
/// may be evicted at any time.
#[auto_impl::auto_impl(&, Arc)]
pub trait SwarmLocalStore: Send + Sync {
    /// Insert or replace the entry for the chunk's address.
    fn put(&self, chunk: Chunk) -> SwarmResult<()>;

    /// Look up an entry.
    fn get(&self, address: &ChunkAddress) -> SwarmResult<Option<Chunk>>;
}
