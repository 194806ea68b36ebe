//! In-process network of stores.
//!
//! Each [`SimNode`] runs a real [`NetStore`] over an in-memory
//! [`LocalStore`]. Nodes reach each other through [`LoopbackPeer`] handles
//! that call straight into the remote store's inbound entry points.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::trace;
use vertex_swarm_api::{
    ChunkAddress, OverlayAddress, PeerAddress, PeerError, PeerHandle, PeersOffer,
    RetrieveRequest, StoreRequest, SwarmPeer,
};
use vertex_swarm_netstore::{NetStore, NetStoreConfig};
use vertex_swarm_storer::{LocalStore, LocalStoreArgs, MemoryChunkStore};
use vertex_tasks::TaskExecutor;

use crate::StaticTopology;

/// Store type run by every simulated node.
pub type SimStore = NetStore<LocalStore<MemoryChunkStore>, Arc<StaticTopology>>;

/// One node of a [`LoopbackNetwork`].
#[derive(Debug)]
pub struct SimNode {
    overlay: OverlayAddress,
    store: SimStore,
    topology: Arc<StaticTopology>,
    announcements: Mutex<Vec<(OverlayAddress, ChunkAddress)>>,
    offers: Mutex<Vec<(OverlayAddress, PeersOffer)>>,
}

impl SimNode {
    /// The node's identity.
    pub fn overlay(&self) -> OverlayAddress {
        self.overlay
    }

    /// The node's store.
    pub fn store(&self) -> &SimStore {
        &self.store
    }

    /// The node's peer set.
    pub fn topology(&self) -> &Arc<StaticTopology> {
        &self.topology
    }

    /// Announcements received, as `(sender, chunk)`.
    pub fn announcements(&self) -> Vec<(OverlayAddress, ChunkAddress)> {
        self.announcements.lock().clone()
    }

    /// Peers offers received, as `(sender, offer)`.
    pub fn offers(&self) -> Vec<(OverlayAddress, PeersOffer)> {
        self.offers.lock().clone()
    }
}

/// Handle through which `origin` talks to `target`.
#[derive(Debug)]
pub struct LoopbackPeer {
    target_overlay: OverlayAddress,
    target: Weak<SimNode>,
    origin: Weak<SimNode>,
}

impl LoopbackPeer {
    /// Handle for `origin` to reach `target`.
    pub fn new(origin: &Arc<SimNode>, target: &Arc<SimNode>) -> Self {
        Self {
            target_overlay: target.overlay,
            target: Arc::downgrade(target),
            origin: Arc::downgrade(origin),
        }
    }

    fn nodes(&self) -> Result<(Arc<SimNode>, Arc<SimNode>), PeerError> {
        let target = self.target.upgrade().ok_or(PeerError::Disconnected)?;
        let origin = self.origin.upgrade().ok_or(PeerError::Disconnected)?;
        Ok((origin, target))
    }

    /// How `target` sees `origin`.
    fn reverse(origin: &Arc<SimNode>, target: &Arc<SimNode>) -> PeerHandle {
        Arc::new(Self::new(target, origin))
    }
}

#[async_trait]
impl SwarmPeer for LoopbackPeer {
    fn address(&self) -> OverlayAddress {
        self.target_overlay
    }

    fn endpoint(&self) -> PeerAddress {
        PeerAddress::new(self.target_overlay, format!("/loopback/{}", self.target_overlay))
    }

    async fn announce(&self, address: ChunkAddress) -> Result<(), PeerError> {
        let (origin, target) = self.nodes()?;
        trace!(from = %origin.overlay, to = %target.overlay, %address, "loopback announce");
        target.announcements.lock().push((origin.overlay, address));
        Ok(())
    }

    async fn retrieve(&self, request: RetrieveRequest) -> Result<(), PeerError> {
        let (origin, target) = self.nodes()?;
        trace!(from = %origin.overlay, to = %target.overlay, address = %request.address, "loopback retrieve");
        target
            .store
            .add_retrieve_request(Self::reverse(&origin, &target), request)
            .map_err(|err| PeerError::Rejected(err.to_string()))
    }

    async fn deliver(&self, request: StoreRequest) -> Result<(), PeerError> {
        let (origin, target) = self.nodes()?;
        trace!(from = %origin.overlay, to = %target.overlay, address = %request.address, "loopback deliver");
        target
            .store
            .add_store_request(Self::reverse(&origin, &target), request)
            .map_err(|err| PeerError::Rejected(err.to_string()))
    }

    async fn offer_peers(&self, offer: PeersOffer) -> Result<(), PeerError> {
        let (origin, target) = self.nodes()?;
        target.offers.lock().push((origin.overlay, offer));
        Ok(())
    }
}

/// Several nodes in one process.
#[derive(Debug)]
pub struct LoopbackNetwork {
    nodes: Vec<Arc<SimNode>>,
}

impl LoopbackNetwork {
    /// Create unconnected nodes, one per overlay address.
    pub fn new(
        overlays: impl IntoIterator<Item = OverlayAddress>,
        config: &NetStoreConfig,
        cache: &LocalStoreArgs,
        executor: &TaskExecutor,
    ) -> Self {
        let nodes = overlays
            .into_iter()
            .map(|overlay| {
                let topology = Arc::new(StaticTopology::new(overlay));
                Arc::new(SimNode {
                    overlay,
                    store: NetStore::new(
                        LocalStore::in_memory(cache),
                        Arc::clone(&topology),
                        executor.clone(),
                        config.clone(),
                    ),
                    topology,
                    announcements: Mutex::new(Vec::new()),
                    offers: Mutex::new(Vec::new()),
                })
            })
            .collect();
        Self { nodes }
    }

    /// Connect two nodes both ways. Unknown indices are ignored.
    pub fn connect(&self, a: usize, b: usize) {
        let (Some(left), Some(right)) = (self.nodes.get(a), self.nodes.get(b)) else {
            return;
        };
        if a == b {
            return;
        }
        left.topology.add_peer(Arc::new(LoopbackPeer::new(left, right)));
        right.topology.add_peer(Arc::new(LoopbackPeer::new(right, left)));
    }

    /// Connect every pair of nodes.
    pub fn connect_all(&self) {
        for a in 0..self.nodes.len() {
            for b in a + 1..self.nodes.len() {
                self.connect(a, b);
            }
        }
    }

    /// Node by index.
    pub fn node(&self, index: usize) -> Option<&Arc<SimNode>> {
        self.nodes.get(index)
    }

    /// All nodes.
    pub fn nodes(&self) -> &[Arc<SimNode>] {
        &self.nodes
    }
}
