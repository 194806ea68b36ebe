//! Resolved retrieval settings.

use std::time::Duration;

use vertex_swarm_api::{
    DEFAULT_LOCK_STRIPES, DEFAULT_RELAY_TIMEOUT, DEFAULT_REQUESTER_COUNT, DEFAULT_SEARCH_TIMEOUT,
    RetrievalConfig,
};

/// Settings a [`NetStore`](crate::NetStore) runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetStoreConfig {
    /// How long a local get waits, and the longest search committed to a peer.
    pub search_timeout: Duration,
    /// How long a relayed ask stays interested in a delivery.
    pub relay_timeout: Duration,
    /// Requesters served per request id when content arrives.
    pub requester_count: usize,
    /// Peers asked or offered per search (0 = topology default).
    pub max_peers: usize,
    /// Number of lock stripes.
    pub lock_stripes: usize,
}

impl Default for NetStoreConfig {
    fn default() -> Self {
        Self {
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
            relay_timeout: DEFAULT_RELAY_TIMEOUT,
            requester_count: DEFAULT_REQUESTER_COUNT,
            max_peers: 0,
            lock_stripes: DEFAULT_LOCK_STRIPES,
        }
    }
}

impl NetStoreConfig {
    /// Resolve settings from any [`RetrievalConfig`].
    pub fn from_config(config: &impl RetrievalConfig) -> Self {
        Self {
            search_timeout: config.search_timeout(),
            relay_timeout: config.relay_timeout(),
            requester_count: config.requester_count(),
            max_peers: config.max_peers(),
            lock_stripes: config.lock_stripes(),
        }
    }
}
