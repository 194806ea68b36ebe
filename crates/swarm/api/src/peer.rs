//! Outbound operations on a single peer.

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use vertex_swarm_primitives::{ChunkAddress, OverlayAddress};

use crate::{PeerAddress, PeersOffer, RetrieveRequest, StoreRequest};

/// Errors from sending to a peer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeerError {
    /// The peer could not be reached.
    #[error("peer unreachable: {0}")]
    Unreachable(String),

    /// The connection to the peer is gone.
    #[error("peer disconnected")]
    Disconnected,

    /// The peer refused the message.
    #[error("rejected by peer: {0}")]
    Rejected(String),
}

/// A connected peer.
///
/// Handles are stateless capabilities: they may be invoked concurrently and
/// the store never holds a lock across a call.
#[async_trait]
pub trait SwarmPeer: Debug + Send + Sync {
    /// Stable identity of the peer.
    fn address(&self) -> OverlayAddress;

    /// Address to share with other peers.
    fn endpoint(&self) -> PeerAddress;

    /// Tell the peer this node now holds a chunk.
    async fn announce(&self, address: ChunkAddress) -> Result<(), PeerError>;

    /// Ask the peer for a chunk.
    async fn retrieve(&self, request: RetrieveRequest) -> Result<(), PeerError>;

    /// Send chunk content to the peer.
    async fn deliver(&self, request: StoreRequest) -> Result<(), PeerError>;

    /// Offer the peer closer candidates for a chunk it asked for.
    async fn offer_peers(&self, offer: PeersOffer) -> Result<(), PeerError>;
}

/// Shared handle to a peer.
pub type PeerHandle = Arc<dyn SwarmPeer>;
