//! CLI entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::Result;
use tracing::info;
use vertex_observability::{LogArgs, init_logging};
use vertex_swarm_netstore::RetrievalArgs;
use vertex_swarm_storer::LocalStoreArgs;

use crate::{config::VertexConfig, dev};

/// Vertex Swarm - distributed chunk store
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Logging configuration (applies to all subcommands).
    #[command(flatten)]
    pub(crate) logs: LogArgs,

    /// Path to a TOML config file. Command line values take precedence.
    #[arg(long, global = true, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub(crate) command: Commands,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Run an in-process network of stores and fetch chunks across it.
    Dev(DevArgs),

    /// Print the effective configuration as TOML.
    Config(NodeArgs),
}

/// Store configuration shared by commands.
#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct NodeArgs {
    #[command(flatten)]
    pub(crate) retrieval: RetrievalArgs,

    #[command(flatten)]
    pub(crate) localstore: LocalStoreArgs,
}

/// Arguments for the `dev` command.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DevArgs {
    #[command(flatten)]
    pub(crate) node: NodeArgs,

    /// Number of simulated nodes.
    #[arg(long, default_value_t = 4)]
    pub(crate) nodes: usize,

    /// Number of chunks uploaded to the first node.
    #[arg(long, default_value_t = 16)]
    pub(crate) chunks: usize,

    /// Payload size of each chunk in bytes.
    #[arg(long, default_value_t = 4096)]
    pub(crate) chunk_size: usize,

    /// Connect every node to every other node instead of a chain.
    #[arg(long)]
    pub(crate) mesh: bool,
}

/// Parse arguments, set up error reporting and logging, and dispatch.
pub(crate) async fn run() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let file = cli
        .config
        .as_deref()
        .map(VertexConfig::load)
        .transpose()?
        .unwrap_or_default();

    let mut logs = file.log.clone();
    logs.merge_from_cli(&cli.logs);
    init_logging(&logs)?;

    info!("Starting Vertex Swarm {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Dev(args) => {
            let config = file.with_cli(&args.node);
            dev::run(&config, &args).await?;
        }
        Commands::Config(args) => {
            let mut config = file.with_cli(&args);
            config.log = logs;
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_dev() {
        let cli = Cli::parse_from([
            "vertex",
            "-v",
            "dev",
            "--nodes",
            "3",
            "--mesh",
            "--retrieval.search-timeout",
            "1000",
        ]);
        assert_eq!(cli.logs.verbosity, 1);
        let Commands::Dev(args) = cli.command else {
            panic!("expected dev command");
        };
        assert_eq!(args.nodes, 3);
        assert!(args.mesh);
        assert_eq!(args.node.retrieval.search_timeout_ms, 1000);
    }
}
