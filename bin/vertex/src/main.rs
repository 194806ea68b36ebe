//! Vertex Swarm retrieval node binary.

mod cli;
mod config;
mod dev;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    cli::run().await
}
