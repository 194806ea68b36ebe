//! Striped per-chunk locks.

use parking_lot::{Mutex, MutexGuard};
use vertex_swarm_api::ChunkAddress;

/// Fixed table of mutexes, one selected per chunk address.
///
/// Guards are plain synchronous locks and must never be held across an
/// `.await`.
#[derive(Debug)]
pub(crate) struct StripedLocks {
    stripes: Box<[Mutex<()>]>,
}

impl StripedLocks {
    pub(crate) fn new(count: usize) -> Self {
        Self {
            stripes: (0..count.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    fn index(&self, address: &ChunkAddress) -> usize {
        let hash = address
            .as_bytes()
            .iter()
            .take(8)
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
        (hash % self.stripes.len() as u64) as usize
    }

    /// Lock the stripe owning `address`.
    #[allow(clippy::indexing_slicing)] // index is reduced modulo len
    pub(crate) fn lock(&self, address: &ChunkAddress) -> MutexGuard<'_, ()> {
        self.stripes[self.index(address)].lock()
    }
}
