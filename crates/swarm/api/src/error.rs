//! Error types for Swarm API operations.
//!
//! Each error variant contains typed data (not strings) where the caller can
//! act on it.

use std::string::String;
use vertex_swarm_primitives::{ChunkAddress, PrimitivesError};

/// Error type for Swarm API operations.
#[derive(Debug, thiserror::Error)]
pub enum SwarmError {
    /// Chunk not found locally and the network search did not complete in time.
    #[error("chunk not found: {address}")]
    ChunkNotFound {
        /// The address of the chunk that wasn't found.
        address: ChunkAddress,
    },

    /// Chunk data too short to carry its span prefix.
    #[error("malformed chunk content: {len} bytes is shorter than the span prefix")]
    MalformedContent {
        /// Length of the rejected data.
        len: usize,
    },

    /// Storage operation failed.
    #[error("storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
    },

    /// Network operation failed.
    #[error("network error: {message}")]
    Network {
        /// Description of the network failure.
        message: String,
    },
}

impl From<PrimitivesError> for SwarmError {
    fn from(err: PrimitivesError) -> Self {
        match err {
            PrimitivesError::SpanTooShort { len } => SwarmError::MalformedContent { len },
            other => SwarmError::Network {
                message: other.to_string(),
            },
        }
    }
}

/// Result type for Swarm API operations.
pub type SwarmResult<T> = core::result::Result<T, SwarmError>;
