//! Span prefix handling.
//!
//! Chunk data on the wire starts with an 8-byte little-endian span: the
//! declared length of the content that follows.

use bytes::{BufMut, Bytes, BytesMut};

use crate::PrimitivesError;

/// Size of the span prefix in bytes.
pub const SPAN_SIZE: usize = 8;

/// Decode the span prefix of chunk data.
pub fn span_of(data: &[u8]) -> Result<u64, PrimitivesError> {
    let prefix: [u8; SPAN_SIZE] = data
        .get(..SPAN_SIZE)
        .and_then(|prefix| prefix.try_into().ok())
        .ok_or(PrimitivesError::SpanTooShort { len: data.len() })?;
    Ok(u64::from_le_bytes(prefix))
}

/// Prefix a payload with its span.
pub fn with_span(payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(SPAN_SIZE + payload.len());
    buf.put_u64_le(payload.len() as u64);
    buf.put_slice(payload);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_of_prefixed_payload() {
        let data = with_span(b"hello-chunk");
        assert_eq!(data.len(), SPAN_SIZE + 11);
        assert_eq!(&data[..SPAN_SIZE], &11u64.to_le_bytes());
        assert_eq!(span_of(&data), Ok(11));
    }

    #[test]
    fn test_span_too_short() {
        assert_eq!(
            span_of(&[1, 2, 3]),
            Err(PrimitivesError::SpanTooShort { len: 3 })
        );
        assert_eq!(span_of(&[]), Err(PrimitivesError::SpanTooShort { len: 0 }));
    }

    #[test]
    fn test_span_is_declared_not_actual() {
        // The span is what the sender declared; it is not checked against the body.
        let mut data = 4096u64.to_le_bytes().to_vec();
        data.extend_from_slice(b"short");
        assert_eq!(span_of(&data), Ok(4096));
    }
}
