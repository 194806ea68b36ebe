//! Configuration traits for retrieval components.
//!
//! Traits define *what* configuration is needed; CLI args implement the traits
//! directly and builders receive `impl ConfigTrait`.

use core::time::Duration;

/// How long a local `get` waits for a network search.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(3);

/// How long a relayed ask stays interested in a delivery.
pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum requesters served per request id when content arrives.
pub const DEFAULT_REQUESTER_COUNT: usize = 3;

/// Default memory-tier capacity in chunks.
pub const DEFAULT_CACHE_CAPACITY: u64 = 4096;

/// Default number of lock stripes guarding per-chunk state.
pub const DEFAULT_LOCK_STRIPES: usize = 256;

/// Default bound on concurrently running outbound sends.
pub const DEFAULT_MAX_CONCURRENT_SENDS: usize = 1024;

/// Configuration for network retrieval.
///
/// # Defaults
///
/// - Search timeout: 3 s
/// - Relay timeout: 10 s
/// - Requester count: 3
/// - Max peers offered: topology default
pub trait RetrievalConfig {
    /// How long a local `get` waits, and the longest search this node commits to.
    fn search_timeout(&self) -> Duration;

    /// Deadline given to asks relayed on behalf of other peers.
    fn relay_timeout(&self) -> Duration;

    /// Requesters served per request id when content arrives.
    fn requester_count(&self) -> usize;

    /// Peers requested when searching or announcing (0 = topology default).
    fn max_peers(&self) -> usize;

    /// Number of lock stripes guarding per-chunk state.
    fn lock_stripes(&self) -> usize {
        DEFAULT_LOCK_STRIPES
    }
}

/// Configuration for the local chunk store.
pub trait LocalStoreConfig {
    /// Memory-tier capacity in number of chunks.
    fn cache_chunks(&self) -> u64;
}
