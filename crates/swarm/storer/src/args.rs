//! Local store CLI arguments.

use clap::Args;
use serde::{Deserialize, Serialize};
use vertex_swarm_api::{DEFAULT_CACHE_CAPACITY, LocalStoreConfig};

/// Local store configuration arguments.
#[derive(Debug, Args, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[command(next_help_heading = "Local Store")]
#[serde(default)]
pub struct LocalStoreArgs {
    /// Memory-tier capacity in number of chunks.
    #[arg(long = "localstore.cache-chunks", default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_chunks: u64,
}

impl Default for LocalStoreArgs {
    fn default() -> Self {
        Self {
            cache_chunks: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl LocalStoreConfig for LocalStoreArgs {
    fn cache_chunks(&self) -> u64 {
        self.cache_chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml() {
        let args: LocalStoreArgs = toml::from_str("").unwrap();
        assert_eq!(args, LocalStoreArgs::default());

        let args: LocalStoreArgs = toml::from_str("cache_chunks = 16\n").unwrap();
        assert_eq!(args.cache_chunks(), 16);
    }
}
