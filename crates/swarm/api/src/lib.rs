//! Swarm API - Core abstractions for chunk retrieval
//!
//! This crate defines the data model and the capability boundaries of the
//! distributed chunk store. Implementations (caches, topologies, transports)
//! live elsewhere in `vertex-swarm-storer`, `vertex-swarm-test-utils`, etc.
//!
//! # Core Concepts
//!
//! - [`Chunk`] - Unit of storage, possibly a content-less placeholder
//! - [`RequestRecord`] - Per-chunk bookkeeping of an in-flight or finished search
//! - [`SwarmLocalStore`] - Two-tier chunk cache contract
//! - [`SwarmTopology`] - Who is closest to a chunk
//! - [`SwarmPeer`] - Outbound operations on a single peer
//!
//! # Protocol Messages
//!
//! - [`RetrieveRequest`] - Ask a peer for a chunk
//! - [`StoreRequest`] - Deliver chunk content to a peer
//! - [`PeersOffer`] - Point an asker at closer peers
//!
//! # Design Principles
//!
//! - Traits define *what*, implementations define *how*
//! - No transport concepts leak into the API
//! - Peers are compared by [`OverlayAddress`], never by handle identity

#![warn(missing_docs)]

mod chunk;
mod config;
mod error;
mod message;
mod peer;
mod request;
mod store;
mod topology;

pub use chunk::*;
pub use config::*;
pub use error::*;
pub use message::*;
pub use peer::*;
pub use request::*;
pub use store::*;
pub use topology::*;

// Re-export primitive types for convenience
pub use vertex_swarm_primitives::{ChunkAddress, OverlayAddress, RequestId, SPAN_SIZE};
