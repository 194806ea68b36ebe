//! Local chunk storage.
//!
//! [`LocalStore`] implements [`SwarmLocalStore`](vertex_swarm_api::SwarmLocalStore)
//! with two tiers:
//!
//! - a bounded LRU memory tier ([`ChunkCache`]) holding whole chunks,
//!   including content-less placeholders and their request records;
//! - a durable tier ([`ChunkStore`]) holding span-prefixed content only,
//!   backed by redb ([`RedbChunkStore`]) or memory ([`MemoryChunkStore`]).

mod args;
mod cache;
mod error;
mod redb_store;
mod store;
mod traits;

pub use args::LocalStoreArgs;
pub use cache::{CacheStats, ChunkCache};
pub use error::{StorerError, StorerResult};
pub use redb_store::RedbChunkStore;
pub use store::LocalStore;
pub use traits::{ChunkStore, MemoryChunkStore};
