//! Core primitive types for Swarm chunk retrieval.
//!
//! This crate provides fundamental types used across the retrieval stack,
//! kept separate to avoid circular dependencies.

mod address;
mod proximity;
mod request;
mod span;

pub use address::{ChunkAddress, OverlayAddress};
pub use proximity::{MAX_PO, closer_to, proximity};
pub use request::RequestId;
pub use span::{SPAN_SIZE, span_of, with_span};

/// Size in bytes of chunk and overlay addresses.
pub const HASH_SIZE: usize = 32;

/// Errors from primitive parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrimitivesError {
    /// Chunk data is too short to hold the span prefix.
    #[error("chunk data too short for span: {len} < {SPAN_SIZE}")]
    SpanTooShort {
        /// Length of the data that was given.
        len: usize,
    },

    /// Address bytes of the wrong length.
    #[error("invalid address length: expected {HASH_SIZE}, got {0}")]
    InvalidAddressLength(usize),
}
