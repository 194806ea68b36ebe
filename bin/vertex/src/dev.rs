//! Dev command - run an in-process network of stores.
//!
//! Uploads random chunks to the first node and fetches every one of them
//! from the last node, so each fetch is relayed across the network.

use std::time::Instant;

use eyre::{Result, bail, eyre};
use rand::RngCore;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use vertex_swarm_api::{Chunk, ChunkAddress, OverlayAddress};
use vertex_swarm_netstore::{NetStoreConfig, NetStoreEvent};
use vertex_swarm_primitives::proximity;
use vertex_swarm_test_utils::LoopbackNetwork;
use vertex_tasks::TaskExecutor;

use crate::{cli::DevArgs, config::VertexConfig};

/// Outcome of a dev run.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct DevReport {
    pub(crate) fetched: usize,
    pub(crate) missing: usize,
}

/// Run the dev command.
pub(crate) async fn run(config: &VertexConfig, args: &DevArgs) -> Result<()> {
    let report = simulate(config, args).await?;
    info!(
        fetched = report.fetched,
        missing = report.missing,
        "dev run complete"
    );
    if report.missing > 0 {
        bail!("{} of {} chunks could not be fetched", report.missing, args.chunks);
    }
    Ok(())
}

async fn simulate(config: &VertexConfig, args: &DevArgs) -> Result<DevReport> {
    if args.nodes < 2 {
        bail!("dev network needs at least 2 nodes, got {}", args.nodes);
    }

    let executor = TaskExecutor::try_current(config.retrieval.max_concurrent_sends)?;
    let mut rng = rand::rng();

    let overlays = (0..args.nodes)
        .map(|_| {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            OverlayAddress::new(bytes)
        })
        .collect::<Vec<_>>();

    let network = LoopbackNetwork::new(
        overlays,
        &NetStoreConfig::from_config(&config.retrieval),
        &config.localstore,
        &executor,
    );
    if args.mesh {
        network.connect_all();
    } else {
        for i in 1..args.nodes {
            network.connect(i - 1, i);
        }
    }

    let uploader = network.node(0).ok_or_else(|| eyre!("missing first node"))?;
    let fetcher = network
        .node(args.nodes - 1)
        .ok_or_else(|| eyre!("missing last node"))?;
    info!(
        nodes = args.nodes,
        mesh = args.mesh,
        uploader = %uploader.overlay(),
        fetcher = %fetcher.overlay(),
        "dev network ready"
    );

    let mut events = fetcher.store().subscribe();
    executor.spawn_critical("dev-events", async move {
        loop {
            match events.recv().await {
                Ok(NetStoreEvent::SendFailed { address, peer, kind, error }) => {
                    warn!(%address, %peer, %kind, %error, "send failed");
                }
                Ok(event) => debug!(?event, "fetcher event"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "event stream lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut addresses = Vec::with_capacity(args.chunks);
    for _ in 0..args.chunks {
        let mut address = [0u8; 32];
        rng.fill_bytes(&mut address);
        let mut payload = vec![0u8; args.chunk_size];
        rng.fill_bytes(&mut payload);

        let address = ChunkAddress::new(address);
        uploader.store().put(Chunk::from_payload(address, &payload))?;
        addresses.push(address);
    }
    info!(chunks = addresses.len(), "uploaded chunks");

    let mut report = DevReport::default();
    for address in addresses {
        let started = Instant::now();
        match fetcher.store().get(&address).await {
            Ok(chunk) => {
                report.fetched += 1;
                debug!(
                    %address,
                    size = chunk.size(),
                    po = proximity(address.as_ref(), fetcher.overlay().as_ref()),
                    elapsed = ?started.elapsed(),
                    "fetched chunk"
                );
            }
            Err(err) => {
                report.missing += 1;
                warn!(%address, %err, "fetch failed");
            }
        }
    }

    debug!(stats = ?fetcher.store().cache().cache_stats(), "fetcher cache");

    // Sends still queued for a permit are no longer needed.
    executor.close();
    Ok(report)
}
