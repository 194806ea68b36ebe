//! Neighborhood awareness using overlay addresses.

use std::vec::Vec;

use vertex_swarm_primitives::{ChunkAddress, OverlayAddress};

use crate::PeerHandle;

/// Peer discovery: who is "close" to a chunk in the overlay address space.
#[auto_impl::auto_impl(&, Arc)]
pub trait SwarmTopology: Send + Sync {
    /// Get our own overlay address.
    fn self_address(&self) -> OverlayAddress;

    /// Connected peers closest to `address`, closest first.
    ///
    /// At most `max` peers are returned; `0` means the topology's default.
    fn closest_peers(&self, address: &ChunkAddress, max: usize) -> Vec<PeerHandle>;
}
