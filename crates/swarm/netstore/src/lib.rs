//! Distributed chunk store.
//!
//! [`NetStore`] fronts a local chunk cache with the network. A lookup that
//! misses locally starts a search among the peers closest to the chunk; asks
//! arriving from other peers are answered from the cache, or recorded and
//! relayed; content arriving from anywhere is propagated to everyone who was
//! waiting for it.
//!
//! # Per-chunk state
//!
//! ```text
//! (absent) --first miss--> Searching --content arrives--> Found
//! ```
//!
//! All state for one chunk lives in its cache entry and is only touched under
//! that chunk's lock stripe, so operations on one chunk are totally ordered.
//! Outbound messages are spawned on a [`TaskExecutor`](vertex_tasks::TaskExecutor)
//! and never block or fail the caller; their outcome is visible through
//! [`NetStoreEvent`]s and metrics.

mod args;
mod config;
mod events;
mod locks;
mod metrics;
mod store;

pub use args::RetrievalArgs;
pub use config::NetStoreConfig;
pub use events::{NetStoreEvent, SendKind};
pub use store::NetStore;
