//! Chunk and overlay addresses.
//!
//! Both are 32-byte hashes, but they name different things: a [`ChunkAddress`]
//! identifies content, an [`OverlayAddress`] identifies a peer. Keeping them
//! apart means a peer can never be compared against a chunk by accident.

use core::fmt;

use alloy_primitives::B256;

use crate::{HASH_SIZE, PrimitivesError};

macro_rules! address_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub B256);

        impl $name {
            /// Create from raw bytes.
            pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
                Self(B256::new(bytes))
            }

            /// Create from a slice, failing unless it is exactly 32 bytes.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, PrimitivesError> {
                B256::try_from(bytes)
                    .map(Self)
                    .map_err(|_| PrimitivesError::InvalidAddressLength(bytes.len()))
            }

            /// Raw address bytes.
            pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
                &self.0.0
            }
        }

        impl From<[u8; HASH_SIZE]> for $name {
            fn from(bytes: [u8; HASH_SIZE]) -> Self {
                Self::new(bytes)
            }
        }

        impl From<B256> for $name {
            fn from(hash: B256) -> Self {
                Self(hash)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                self.0.as_slice()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

address_type!(
    /// Content address of a chunk.
    ChunkAddress
);

address_type!(
    /// Overlay address of a peer, its stable identity in the network.
    OverlayAddress
);
