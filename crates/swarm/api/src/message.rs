//! Retrieval protocol messages.
//!
//! These are the conceptual messages exchanged between nodes. Wire encoding
//! is the transport's concern; deadlines are local monotonic instants.

use bytes::Bytes;
use tokio::time::Instant;
use vertex_swarm_primitives::{ChunkAddress, OverlayAddress, PrimitivesError, RequestId, span_of};

/// Ask a peer for a chunk.
///
/// The asking peer is not part of the message: it is whoever the message
/// arrived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveRequest {
    /// The chunk being searched for.
    pub address: ChunkAddress,
    /// Search id, shared by every hop of one search.
    pub id: RequestId,
    /// Until when the asker waits for an answer.
    pub deadline: Option<Instant>,
    /// How many closer peers the asker wants offered (0 = responder's default).
    pub max_peers: u32,
}

/// Deliver chunk content to a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRequest {
    /// The delivered chunk.
    pub address: ChunkAddress,
    /// Search id this delivery answers.
    pub id: RequestId,
    /// Span-prefixed content.
    pub data: Bytes,
    /// Deadline of the request being answered, if any.
    pub deadline: Option<Instant>,
}

impl StoreRequest {
    /// Declared content length from the span prefix.
    pub fn span(&self) -> Result<u64, PrimitivesError> {
        span_of(&self.data)
    }
}

/// Offer of peers closer to a chunk, sent while this node keeps searching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeersOffer {
    /// The chunk being searched for.
    pub address: ChunkAddress,
    /// Search id this offer answers.
    pub id: RequestId,
    /// Candidate peers, closest first.
    pub peers: Vec<PeerAddress>,
    /// How long this node commits to keep searching.
    pub deadline: Instant,
}

/// Address of a peer as shared with other peers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerAddress {
    /// Overlay address (identity).
    pub overlay: OverlayAddress,
    /// Transport address, opaque to the store.
    pub underlay: String,
}

impl PeerAddress {
    /// Create a peer address.
    pub fn new(overlay: OverlayAddress, underlay: impl Into<String>) -> Self {
        Self {
            overlay,
            underlay: underlay.into(),
        }
    }
}
