//! Config file loading.
//!
//! Priority (highest wins):
//!
//! 1. CLI arguments that differ from their defaults
//! 2. Config file (TOML)
//! 3. Defaults

use std::{fs, path::Path};

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use vertex_observability::LogArgs;
use vertex_swarm_netstore::RetrievalArgs;
use vertex_swarm_storer::LocalStoreArgs;

use crate::cli::NodeArgs;

/// Contents of a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct VertexConfig {
    pub(crate) log: LogArgs,
    pub(crate) retrieval: RetrievalArgs,
    pub(crate) localstore: LocalStoreArgs,
}

impl VertexConfig {
    /// Load the configuration from the given path.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse config file {}", path.display()))
    }

    /// Serialize to TOML.
    pub(crate) fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply command line arguments over the file values.
    pub(crate) fn with_cli(&self, cli: &NodeArgs) -> Self {
        let defaults = NodeArgs::default();
        let cli_localstore = &cli.localstore;
        let (file, cli, def) = (&self.retrieval, &cli.retrieval, &defaults.retrieval);

        let retrieval = RetrievalArgs {
            search_timeout_ms: pick(
                file.search_timeout_ms,
                cli.search_timeout_ms,
                def.search_timeout_ms,
            ),
            relay_timeout_ms: pick(
                file.relay_timeout_ms,
                cli.relay_timeout_ms,
                def.relay_timeout_ms,
            ),
            requester_count: pick(file.requester_count, cli.requester_count, def.requester_count),
            max_peers: pick(file.max_peers, cli.max_peers, def.max_peers),
            lock_stripes: pick(file.lock_stripes, cli.lock_stripes, def.lock_stripes),
            max_concurrent_sends: pick(
                file.max_concurrent_sends,
                cli.max_concurrent_sends,
                def.max_concurrent_sends,
            ),
        };

        let localstore = LocalStoreArgs {
            cache_chunks: pick(
                self.localstore.cache_chunks,
                cli_localstore.cache_chunks,
                defaults.localstore.cache_chunks,
            ),
        };

        Self {
            log: self.log.clone(),
            retrieval,
            localstore,
        }
    }
}

/// The CLI value if it was changed from the default, otherwise the file value.
fn pick<T: PartialEq>(file: T, cli: T, default: T) -> T {
    if cli != default { cli } else { file }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[retrieval]\nsearch_timeout_ms = 1500\n\n[localstore]\ncache_chunks = 64\n\n[log]\njson = true"
        )
        .unwrap();

        let config = VertexConfig::load(file.path()).unwrap();
        assert_eq!(config.retrieval.search_timeout_ms, 1500);
        assert_eq!(config.retrieval.relay_timeout_ms, 10_000);
        assert_eq!(config.localstore.cache_chunks, 64);
        assert!(config.log.json);
    }

    #[test]
    fn test_cli_overrides_only_changed_values() {
        let file = VertexConfig {
            retrieval: RetrievalArgs {
                search_timeout_ms: 1500,
                requester_count: 5,
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = NodeArgs {
            retrieval: RetrievalArgs {
                search_timeout_ms: 800,
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = file.with_cli(&cli);
        assert_eq!(merged.retrieval.search_timeout_ms, 800);
        assert_eq!(merged.retrieval.requester_count, 5);
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = VertexConfig::default();
        let parsed: VertexConfig = toml::from_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(VertexConfig::load(&dir.path().join("absent.toml")).is_err());
    }
}
