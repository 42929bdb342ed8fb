//! HTTP response decoder module
//!
//! This module decodes HTTP responses using a streaming approach. It handles both
//! head parsing and payload decoding through a state machine pattern.
//!
//! # Components
//!
//! - [`ResponseDecoder`]: Main decoder that coordinates head and payload parsing
//! - Head parsing: Uses [`HeaderDecoder`] for parsing the status line and headers
//! - Payload handling: Uses [`BodyDecoder`] bounded to `Content-Length`
//!
//! # Example
//!
//! ```no_run
//! use micro_http_client::codec::ResponseDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = ResponseDecoder::new();
//! let mut buffer = BytesMut::from(&b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nok"[..]);
//! let head = decoder.decode(&mut buffer);
//! let body = decoder.decode(&mut buffer);
//! ```

use crate::codec::body::BodyDecoder;
use crate::codec::header::HeaderDecoder;
use crate::protocol::{Message, ParseError, PayloadItem, ResponseHead};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// A decoder for HTTP responses that handles both head and payload
///
/// The decoder operates in two phases:
/// 1. Head parsing: Decodes the status line and headers using [`HeaderDecoder`]
/// 2. Payload parsing: Emits at most `Content-Length` body bytes using
///    [`BodyDecoder`], then an EOF marker
///
/// # State Machine
///
/// The decoder maintains its state through the `body_decoder` field:
/// - `None`: Currently parsing a head
/// - `Some(BodyDecoder)`: Currently parsing payload
#[derive(Debug)]
pub struct ResponseDecoder {
    header_decoder: HeaderDecoder,
    body_decoder: Option<BodyDecoder>,
}

impl ResponseDecoder {
    /// Creates a new `ResponseDecoder` instance
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns true while the body of the last decoded head has not reached EOF
    pub fn is_payload_pending(&self) -> bool {
        self.body_decoder.is_some()
    }

    /// Returns the number of body bytes still expected for the last decoded head
    pub fn payload_remaining(&self) -> u64 {
        self.body_decoder.as_ref().map_or(0, BodyDecoder::remaining)
    }
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self { header_decoder: HeaderDecoder, body_decoder: None }
    }
}

impl Decoder for ResponseDecoder {
    type Item = Message<ResponseHead>;
    type Error = ParseError;

    /// Attempts to decode an HTTP response from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Message::Header(_)))`: Successfully decoded response head
    /// - `Ok(Some(Message::Payload(_)))`: Successfully decoded a payload chunk or EOF
    /// - `Ok(None)`: Need more data to proceed
    /// - `Err(_)`: Encountered a parsing error
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // body of the last head first
        if let Some(body_decoder) = &mut self.body_decoder {
            let message = match body_decoder.decode(src)? {
                Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
                Some(item @ PayloadItem::Eof) => {
                    // response complete, next decode starts a head
                    self.body_decoder.take();
                    Some(Message::Payload(item))
                }
                None => None,
            };

            return Ok(message);
        }

        // parse response head
        let message = match self.header_decoder.decode(src)? {
            Some((head, payload_size)) => {
                self.body_decoder = Some(payload_size.into());
                Some(Message::Header(head))
            }
            None => None,
        };

        Ok(message)
    }

    /// Decodes the last frames once the transport reached end of data.
    ///
    /// A partial head left in the buffer means the peer closed in the middle of a
    /// response, which is reported as [`ParseError::UnexpectedEof`].
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(message) => Ok(Some(message)),
            None if src.is_empty() => Ok(None),
            None => Err(ParseError::UnexpectedEof),
        }
    }
}
