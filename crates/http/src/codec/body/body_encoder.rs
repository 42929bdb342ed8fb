use crate::protocol::{PayloadItem, PayloadSize, SendError};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::warn;

/// Writes a request body of exactly the announced `Content-Length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyEncoder {
    remaining: u64,
}

impl BodyEncoder {
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }

    /// Whether every announced byte has been written.
    pub fn is_finish(&self) -> bool {
        self.remaining == 0
    }
}

impl From<PayloadSize> for BodyEncoder {
    fn from(payload_size: PayloadSize) -> Self {
        Self::new(payload_size.length())
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for BodyEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let PayloadItem::Chunk(bytes) = item else {
            return Ok(());
        };

        if !bytes.has_remaining() {
            return Ok(());
        }

        if self.remaining == 0 {
            warn!(size = bytes.remaining(), "drop body bytes beyond content-length");
            return Ok(());
        }

        // bytes past the announced length would be read as the next message
        let take = usize::try_from(self.remaining).map_or(bytes.remaining(), |remaining| remaining.min(bytes.remaining()));
        dst.put(bytes.take(take));
        self.remaining -= take as u64;
        Ok(())
    }
}
