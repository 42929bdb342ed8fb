//! HTTP request encoder module
//!
//! [`RequestEncoder`] writes a complete [`Request`]: the head through
//! [`HeaderEncoder`] and the in-memory body through [`BodyEncoder`]. The body
//! length used for framing is taken from the live body buffer at encode time.

use crate::codec::body::BodyEncoder;
use crate::codec::header::HeaderEncoder;
use crate::protocol::{PayloadItem, PayloadSize, Request, SendError};
use bytes::BytesMut;
use tokio_util::codec::Encoder;
use tracing::error;

#[derive(Debug)]
pub struct RequestEncoder {
    header_encoder: HeaderEncoder,
}

impl RequestEncoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for RequestEncoder {
    fn default() -> Self {
        Self { header_encoder: HeaderEncoder }
    }
}

impl<'a> Encoder<&'a Request> for RequestEncoder {
    type Error = SendError;

    fn encode(&mut self, request: &'a Request, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload_size = PayloadSize::new(request.content_length());
        self.header_encoder.encode((request, payload_size), dst)?;

        let mut body_encoder = BodyEncoder::from(payload_size);
        body_encoder.encode(PayloadItem::Chunk(request.body()), dst)?;
        body_encoder.encode(PayloadItem::<&[u8]>::Eof, dst)?;

        if !body_encoder.is_finish() {
            error!(content_length = payload_size.length(), "request body shorter than content-length");
            return Err(SendError::io(std::io::Error::from(std::io::ErrorKind::InvalidData)));
        }

        Ok(())
    }
}
