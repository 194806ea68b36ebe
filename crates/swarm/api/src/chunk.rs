//! The chunk, the unit of storage.

use std::sync::Arc;

use bytes::Bytes;
use vertex_swarm_primitives::{ChunkAddress, OverlayAddress, SPAN_SIZE, span_of, with_span};

use crate::{RequestRecord, SwarmResult};

/// A chunk as held by the local store.
///
/// A chunk may exist without content. Such a placeholder carries the
/// [`RequestRecord`] of a search that is waiting for the content to arrive,
/// and is distinct from the chunk being absent altogether.
///
/// Cloning is cheap: content is reference counted and the request record is
/// shared between all clones.
#[derive(Debug, Clone)]
pub struct Chunk {
    address: ChunkAddress,
    /// Span-prefixed content.
    data: Option<Bytes>,
    size: u64,
    source: Option<OverlayAddress>,
    request: Option<Arc<RequestRecord>>,
}

impl Chunk {
    /// Create a chunk from span-prefixed data.
    ///
    /// The size is decoded from the span; data shorter than the prefix is
    /// rejected.
    pub fn new(address: ChunkAddress, data: Bytes) -> SwarmResult<Self> {
        let size = span_of(&data)?;
        Ok(Self {
            address,
            data: Some(data),
            size,
            source: None,
            request: None,
        })
    }

    /// Create a chunk from a bare payload, prefixing it with its span.
    pub fn from_payload(address: ChunkAddress, payload: &[u8]) -> Self {
        Self {
            address,
            data: Some(with_span(payload)),
            size: payload.len() as u64,
            source: None,
            request: None,
        }
    }

    /// Create a content-less placeholder.
    pub fn placeholder(address: ChunkAddress) -> Self {
        Self {
            address,
            data: None,
            size: 0,
            source: None,
            request: None,
        }
    }

    /// Set the peer that supplied the content.
    pub fn with_source(mut self, source: OverlayAddress) -> Self {
        self.source = Some(source);
        self
    }

    /// The chunk's address.
    pub fn address(&self) -> &ChunkAddress {
        &self.address
    }

    /// Span-prefixed content, if present.
    pub fn data(&self) -> Option<&Bytes> {
        self.data.as_ref()
    }

    /// Content without the span prefix, if present.
    pub fn payload(&self) -> Option<Bytes> {
        self.data
            .as_ref()
            .map(|data| data.slice(SPAN_SIZE.min(data.len())..))
    }

    /// Whether content has arrived.
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Declared content length.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Peer that supplied the content, if it came from the network.
    pub fn source(&self) -> Option<&OverlayAddress> {
        self.source.as_ref()
    }

    /// The attached request record, if a search was ever started.
    pub fn request(&self) -> Option<&Arc<RequestRecord>> {
        self.request.as_ref()
    }

    /// Attach a request record. An existing record is kept.
    pub fn attach_request(&mut self, record: Arc<RequestRecord>) -> &Arc<RequestRecord> {
        self.request.get_or_insert(record)
    }

    /// Fill a placeholder with the content of `other`.
    ///
    /// Returns `false` and leaves the chunk untouched if it already has
    /// content: the first write wins.
    pub fn fill_from(&mut self, other: &Chunk) -> bool {
        if self.data.is_some() {
            return false;
        }
        self.data = other.data.clone();
        self.size = other.size;
        if other.source.is_some() {
            self.source = other.source;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SwarmError;

    fn address() -> ChunkAddress {
        ChunkAddress::new([0xAA; 32])
    }

    #[test]
    fn test_new_decodes_span() {
        let chunk = Chunk::new(address(), with_span(b"hello-chunk")).unwrap();
        assert_eq!(chunk.size(), 11);
        assert_eq!(chunk.payload().unwrap().as_ref(), b"hello-chunk");
    }

    #[test]
    fn test_new_rejects_short_data() {
        let err = Chunk::new(address(), Bytes::from_static(&[1, 2, 3])).unwrap_err();
        assert!(matches!(err, SwarmError::MalformedContent { len: 3 }));
    }

    #[test]
    fn test_fill_first_write_wins() {
        let mut chunk = Chunk::placeholder(address());
        assert!(!chunk.has_data());

        let first = Chunk::from_payload(address(), b"first");
        let second = Chunk::from_payload(address(), b"second");
        assert!(chunk.fill_from(&first));
        assert!(!chunk.fill_from(&second));
        assert_eq!(chunk.payload().unwrap().as_ref(), b"first");
        assert_eq!(chunk.size(), 5);
    }

    #[test]
    fn test_attach_keeps_existing_record() {
        let mut chunk = Chunk::placeholder(address());
        let first = Arc::new(RequestRecord::new());
        chunk.attach_request(first.clone());
        chunk.attach_request(Arc::new(RequestRecord::new()));
        assert!(Arc::ptr_eq(chunk.request().unwrap(), &first));

        // Clones share the record.
        let clone = chunk.clone();
        assert!(Arc::ptr_eq(clone.request().unwrap(), &first));
    }
}
