//! Retrieval CLI arguments.

use std::time::Duration;

use clap::Args;
use serde::{Deserialize, Serialize};
use vertex_swarm_api::{
    DEFAULT_LOCK_STRIPES, DEFAULT_MAX_CONCURRENT_SENDS, DEFAULT_RELAY_TIMEOUT,
    DEFAULT_REQUESTER_COUNT, DEFAULT_SEARCH_TIMEOUT, RetrievalConfig,
};

/// Retrieval configuration arguments.
#[derive(Debug, Args, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[command(next_help_heading = "Retrieval")]
#[serde(default)]
pub struct RetrievalArgs {
    /// How long a local get waits for the network, in milliseconds.
    #[arg(long = "retrieval.search-timeout", value_name = "MS", default_value_t = DEFAULT_SEARCH_TIMEOUT.as_millis() as u64)]
    pub search_timeout_ms: u64,

    /// How long a relayed ask waits for a delivery, in milliseconds.
    #[arg(long = "retrieval.relay-timeout", value_name = "MS", default_value_t = DEFAULT_RELAY_TIMEOUT.as_millis() as u64)]
    pub relay_timeout_ms: u64,

    /// Requesters served per request id when content arrives.
    #[arg(long = "retrieval.requester-count", default_value_t = DEFAULT_REQUESTER_COUNT)]
    pub requester_count: usize,

    /// Peers asked per search (0 = topology default).
    #[arg(long = "retrieval.max-peers", default_value_t = 0)]
    pub max_peers: usize,

    /// Number of lock stripes guarding per-chunk state.
    #[arg(long = "retrieval.lock-stripes", default_value_t = DEFAULT_LOCK_STRIPES)]
    pub lock_stripes: usize,

    /// Maximum outbound sends running at once.
    #[arg(long = "retrieval.max-concurrent-sends", default_value_t = DEFAULT_MAX_CONCURRENT_SENDS)]
    pub max_concurrent_sends: usize,
}

impl Default for RetrievalArgs {
    fn default() -> Self {
        Self {
            search_timeout_ms: DEFAULT_SEARCH_TIMEOUT.as_millis() as u64,
            relay_timeout_ms: DEFAULT_RELAY_TIMEOUT.as_millis() as u64,
            requester_count: DEFAULT_REQUESTER_COUNT,
            max_peers: 0,
            lock_stripes: DEFAULT_LOCK_STRIPES,
            max_concurrent_sends: DEFAULT_MAX_CONCURRENT_SENDS,
        }
    }
}

impl RetrievalConfig for RetrievalArgs {
    fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }

    fn relay_timeout(&self) -> Duration {
        Duration::from_millis(self.relay_timeout_ms)
    }

    fn requester_count(&self) -> usize {
        self.requester_count
    }

    fn max_peers(&self) -> usize {
        self.max_peers
    }

    fn lock_stripes(&self) -> usize {
        self.lock_stripes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NetStoreConfig;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        retrieval: RetrievalArgs,
    }

    #[test]
    fn test_defaults() {
        let config = NetStoreConfig::from_config(&RetrievalArgs::default());
        assert_eq!(config, NetStoreConfig::default());
        assert_eq!(config.search_timeout, Duration::from_secs(3));
        assert_eq!(config.relay_timeout, Duration::from_secs(10));
        assert_eq!(config.requester_count, 3);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "vertex",
            "--retrieval.search-timeout",
            "500",
            "--retrieval.requester-count",
            "5",
        ]);
        assert_eq!(cli.retrieval.search_timeout(), Duration::from_millis(500));
        assert_eq!(cli.retrieval.requester_count(), 5);
        assert_eq!(cli.retrieval.relay_timeout(), DEFAULT_RELAY_TIMEOUT);
    }

    #[test]
    fn test_partial_toml() {
        let args: RetrievalArgs = toml::from_str("relay_timeout_ms = 2500\n").unwrap();
        assert_eq!(args.relay_timeout(), Duration::from_millis(2500));
        assert_eq!(args.search_timeout(), DEFAULT_SEARCH_TIMEOUT);
    }
}
