//! Diagnostic events.
//!
//! Events are published on a lossy broadcast channel. Nothing in the store
//! depends on them being observed.

use tokio::time::Instant;
use vertex_swarm_api::{ChunkAddress, OverlayAddress, PeerError, RequestId};

/// Kind of outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SendKind {
    /// Chunk announcement.
    Announce,
    /// Retrieve request.
    Retrieve,
    /// Content delivery.
    Deliver,
    /// Peers offer.
    OfferPeers,
}

/// Something observable happened in the store.
#[derive(Debug, Clone)]
pub enum NetStoreEvent {
    /// A network search was started.
    SearchStarted {
        /// The chunk searched for.
        address: ChunkAddress,
        /// Search id.
        id: RequestId,
        /// Peers asked.
        peers: usize,
        /// Deadline handed to the asked peers.
        deadline: Instant,
    },

    /// Content arrived for a chunk that was being searched for.
    Found {
        /// The chunk.
        address: ChunkAddress,
        /// Peer that supplied it, if it came from the network.
        source: Option<OverlayAddress>,
    },

    /// Content was sent straight back to an asking peer.
    Delivered {
        /// The chunk.
        address: ChunkAddress,
        /// Id of the answered request.
        id: RequestId,
        /// The asking peer.
        peer: OverlayAddress,
    },

    /// An asking peer was offered closer peers while this node searches.
    PeersOffered {
        /// The chunk.
        address: ChunkAddress,
        /// Id of the answered request.
        id: RequestId,
        /// The asking peer.
        peer: OverlayAddress,
        /// Number of peers offered.
        offered: usize,
    },

    /// Newly arrived content was sent on to waiting requesters.
    Propagated {
        /// The chunk.
        address: ChunkAddress,
        /// Deliveries scheduled.
        deliveries: usize,
    },

    /// A freshly stored chunk was announced.
    Announced {
        /// The chunk.
        address: ChunkAddress,
        /// Peers notified.
        peers: usize,
    },

    /// An outbound message failed. It is not retried.
    SendFailed {
        /// The chunk the message was about.
        address: ChunkAddress,
        /// The destination peer.
        peer: OverlayAddress,
        /// Which message.
        kind: SendKind,
        /// Why.
        error: PeerError,
    },

    /// A local get gave up waiting for the network.
    GetTimedOut {
        /// The chunk.
        address: ChunkAddress,
    },
}
