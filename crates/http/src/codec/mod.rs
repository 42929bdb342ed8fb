//! HTTP codec module for encoding requests and decoding responses
//!
//! This module provides the client side of HTTP/1.x message processing. It uses a
//! state machine pattern to handle both heads and payload data.
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestEncoder`]: Encodes outgoing HTTP requests
//!   - Head encoding via [`header`] module
//!   - Payload encoding via [`body`] module
//!
//! - Response handling:
//!   - [`ResponseDecoder`]: Decodes incoming HTTP responses
//!   - Head parsing via [`header`] module
//!   - Payload decoding via [`body`] module
//!
//! # Example
//!
//! ```no_run
//! use micro_http_client::codec::{RequestEncoder, ResponseDecoder};
//! use micro_http_client::protocol::Request;
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::BytesMut;
//!
//! // Encode outgoing request
//! let request = Request::get("/index.html");
//! let mut request_buffer = BytesMut::new();
//! RequestEncoder::new().encode(&request, &mut request_buffer).unwrap();
//!
//! // Decode incoming response
//! let mut decoder = ResponseDecoder::new();
//! let mut response_buffer = BytesMut::new();
//! let response = decoder.decode(&mut response_buffer);
//! ```
//!
//! # Features
//!
//! - Streaming processing of HTTP responses
//! - Content-Length based payload handling
//! - Efficient header parsing and encoding
//! - State machine based processing

mod body;
mod header;
mod request_encoder;
mod response_decoder;

pub use request_encoder::RequestEncoder;
pub use response_decoder::ResponseDecoder;
