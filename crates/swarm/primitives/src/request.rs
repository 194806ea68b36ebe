use core::fmt;

/// Identifier of a network search.
///
/// Chosen at random by the node that starts a search and carried unchanged by
/// every forwarded request, so relays can recognise the same search arriving
/// from different peers. Always fits in 63 bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequestId(u64);

impl RequestId {
    /// Largest representable id.
    pub const MAX: u64 = i64::MAX as u64;

    /// Create from a raw value; the top bit is cleared.
    pub const fn new(id: u64) -> Self {
        Self(id & Self::MAX)
    }

    /// Generate a fresh random id.
    pub fn random() -> Self {
        Self::new(rand::random::<u64>())
    }

    /// The raw id value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestId({:016x})", self.0)
    }
}
