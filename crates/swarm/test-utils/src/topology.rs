//! Fixed peer set topology.

use parking_lot::RwLock;
use vertex_swarm_api::{ChunkAddress, OverlayAddress, PeerHandle, SwarmTopology};
use vertex_swarm_primitives::closer_to;

/// Topology over a fixed, mutable set of peers.
///
/// `closest_peers` orders the peers by XOR distance to the chunk.
#[derive(Debug)]
pub struct StaticTopology {
    self_address: OverlayAddress,
    peers: RwLock<Vec<PeerHandle>>,
    default_max: usize,
}

impl StaticTopology {
    /// Default number of peers returned when the caller asks for 0.
    pub const DEFAULT_MAX_PEERS: usize = 8;

    /// Create an empty topology.
    pub fn new(self_address: OverlayAddress) -> Self {
        Self::with_peers(self_address, Vec::new())
    }

    /// Create a topology knowing `peers`.
    pub fn with_peers(self_address: OverlayAddress, peers: Vec<PeerHandle>) -> Self {
        Self {
            self_address,
            peers: RwLock::new(peers),
            default_max: Self::DEFAULT_MAX_PEERS,
        }
    }

    /// Change the number of peers returned when the caller asks for 0.
    pub fn with_default_max(mut self, default_max: usize) -> Self {
        self.default_max = default_max;
        self
    }

    /// Add a peer, replacing any peer with the same address.
    pub fn add_peer(&self, peer: PeerHandle) {
        let mut peers = self.peers.write();
        let address = peer.address();
        peers.retain(|known| known.address() != address);
        peers.push(peer);
    }

    /// Remove a peer.
    pub fn remove_peer(&self, address: &OverlayAddress) {
        self.peers.write().retain(|known| known.address() != *address);
    }

    /// Number of known peers.
    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    /// Whether no peers are known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SwarmTopology for StaticTopology {
    fn self_address(&self) -> OverlayAddress {
        self.self_address
    }

    fn closest_peers(&self, address: &ChunkAddress, max: usize) -> Vec<PeerHandle> {
        let max = if max == 0 { self.default_max } else { max };
        let mut peers = self.peers.read().clone();
        peers.sort_by(|a, b| closer_to(address, &a.address(), &b.address()));
        peers.truncate(max);
        peers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RecordingPeer, overlay};

    #[test]
    fn test_closest_first_and_capped() {
        let topology = StaticTopology::new(overlay(0));
        for n in [0x0F, 0xF0, 0x01] {
            topology.add_peer(RecordingPeer::new(overlay(n)).handle());
        }

        let target = ChunkAddress::new([0x00; 32]);
        let closest = topology
            .closest_peers(&target, 2)
            .iter()
            .map(|p| p.address())
            .collect::<Vec<_>>();
        assert_eq!(closest, vec![overlay(0x01), overlay(0x0F)]);
        assert_eq!(topology.closest_peers(&target, 0).len(), 3);
    }

    #[test]
    fn test_add_replaces_same_address() {
        let topology = StaticTopology::new(overlay(0));
        topology.add_peer(RecordingPeer::new(overlay(1)).handle());
        topology.add_peer(RecordingPeer::new(overlay(1)).handle());
        assert_eq!(topology.len(), 1);

        topology.remove_peer(&overlay(1));
        assert!(topology.is_empty());
    }
}
