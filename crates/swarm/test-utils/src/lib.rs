//! Test utilities for the retrieval stack.
//!
//! - [`RecordingPeer`]: a peer that records everything sent to it
//! - [`StaticTopology`]: a fixed peer set ordered by proximity
//! - [`LoopbackNetwork`]: several stores in one process, wired together

mod loopback;
mod peer;
mod topology;

pub use loopback::{LoopbackNetwork, LoopbackPeer, SimNode, SimStore};
pub use peer::{RecordedMessage, RecordingPeer};
pub use topology::StaticTopology;

use vertex_swarm_api::OverlayAddress;

/// Overlay address with every byte set to `n`.
pub fn overlay(n: u8) -> OverlayAddress {
    OverlayAddress::new([n; 32])
}
