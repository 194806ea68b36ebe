//! Storer error types.

use vertex_swarm_api::{ChunkAddress, SwarmError};

/// Errors from storer operations.
#[derive(Debug, thiserror::Error)]
pub enum StorerError {
    /// Database error.
    #[error("database error: {0}")]
    Database(String),

    /// Chunk not found.
    #[error("chunk not found: {0}")]
    NotFound(ChunkAddress),

    /// Stored bytes do not form a valid chunk.
    #[error("invalid chunk {address}: {reason}")]
    InvalidChunk {
        /// Address the bytes were stored under.
        address: ChunkAddress,
        /// What is wrong with them.
        reason: String,
    },
}

/// Result type for storer operations.
pub type StorerResult<T> = Result<T, StorerError>;

impl From<StorerError> for SwarmError {
    fn from(err: StorerError) -> Self {
        SwarmError::Storage {
            message: err.to_string(),
        }
    }
}

impl From<redb::DatabaseError> for StorerError {
    fn from(err: redb::DatabaseError) -> Self {
        StorerError::Database(err.to_string())
    }
}

impl From<redb::TransactionError> for StorerError {
    fn from(err: redb::TransactionError) -> Self {
        StorerError::Database(err.to_string())
    }
}

impl From<redb::TableError> for StorerError {
    fn from(err: redb::TableError) -> Self {
        StorerError::Database(err.to_string())
    }
}

impl From<redb::StorageError> for StorerError {
    fn from(err: redb::StorageError) -> Self {
        StorerError::Database(err.to_string())
    }
}

impl From<redb::CommitError> for StorerError {
    fn from(err: redb::CommitError) -> Self {
        StorerError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_storage_error() {
        let err: SwarmError = StorerError::Database("disk on fire".into()).into();
        assert!(matches!(err, SwarmError::Storage { message } if message.contains("disk on fire")));
    }
}
