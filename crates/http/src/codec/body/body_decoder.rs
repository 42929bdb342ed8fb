use crate::protocol::{ParseError, PayloadItem, PayloadSize};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// Decodes a response body bounded by its `Content-Length`.
///
/// The bound is what keeps a connection reusable: bytes past the body are never
/// split off the buffer, so they remain in place for the next response head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyDecoder {
    remaining: u64,
}

impl BodyDecoder {
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }

    /// Body bytes not decoded yet.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl From<PayloadSize> for BodyDecoder {
    fn from(payload_size: PayloadSize) -> Self {
        Self::new(payload_size.length())
    }
}

impl Decoder for BodyDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// Yields the buffered part of the body, or [`PayloadItem::Eof`] once it is complete.
    ///
    /// `Ok(None)` means the buffer is empty while body bytes are still expected.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.remaining == 0 {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let take = usize::try_from(self.remaining).map_or(src.len(), |remaining| remaining.min(src.len()));
        let chunk = src.split_to(take).freeze();
        self.remaining -= chunk.len() as u64;
        Ok(Some(PayloadItem::Chunk(chunk)))
    }
}
