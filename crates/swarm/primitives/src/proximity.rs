use core::cmp::Ordering;

use crate::{ChunkAddress, OverlayAddress};

/// Maximum proximity order tracked for routing.
pub const MAX_PO: u8 = 31;

/// Proximity order of two byte strings: the number of common leading bits,
/// capped at [`MAX_PO`] (0 farthest, `MAX_PO` closest or equal).
pub fn proximity(one: &[u8], other: &[u8]) -> u8 {
    let bytes = (MAX_PO as usize / 8 + 1).min(one.len()).min(other.len());
    for (i, (a, b)) in one.iter().zip(other).take(bytes).enumerate() {
        let oxo = a ^ b;
        if oxo != 0 {
            return (i * 8) as u8 + oxo.leading_zeros() as u8;
        }
    }
    MAX_PO
}

/// Orders two peers by XOR distance to a chunk, closest first.
pub fn closer_to(target: &ChunkAddress, a: &OverlayAddress, b: &OverlayAddress) -> Ordering {
    let target = target.as_bytes();
    let a = a.as_bytes();
    let b = b.as_bytes();
    for ((t, x), y) in target.iter().zip(a).zip(b) {
        match (t ^ x).cmp(&(t ^ y)) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}
