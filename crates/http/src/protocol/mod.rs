//! Core HTTP/1.x client protocol types.
//!
//! This module holds the data model of one request/response exchange together with
//! the error taxonomy used across the crate.
//!
//! # Architecture
//!
//! - **Message Handling** ([`message`]): items produced by the codecs
//!   - [`Message`]: Represents either a response head or payload chunks
//!   - [`PayloadItem`]: Handles individual payload chunks and EOF
//!   - [`PayloadSize`]: Tracks the `Content-Length` framing of a message
//!
//! - **Request Building** ([`request`]): [`Request`] accumulates the request line,
//!   headers and an in-memory body; framing headers are computed on write
//!
//! - **Response Parsing** ([`response`]): [`Response`] holds the parsed [`StatusLine`]
//!   and headers, and drives parsing/draining over a [`ResponseSource`]
//!
//! - **Body Streaming** ([`body`]): [`BodyStream`] is the bounded view over a
//!   response body that borrows the transport
//!
//! - **Error Handling** ([`error`]):
//!   - [`HttpError`]: Top-level error type
//!   - [`ConnectError`]: Transport establishment errors
//!   - [`ParseError`]: Response parsing errors
//!   - [`SendError`]: Request sending errors
//!
//! # Framing
//!
//! Only `Content-Length` framing is supported. A response without a usable
//! `content-length` header has an empty body, it never fails the exchange.

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod request;
pub use request::BodyWriter;
pub use request::Request;
pub use request::RequestLine;

mod response;
pub use response::Response;
pub use response::ResponseHead;
pub use response::ResponseSource;
pub use response::StatusLine;
pub(crate) use response::content_length;

mod error;
pub use error::ConnectError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
pub use error::TransportState;

pub mod body;
pub use body::BodyStream;
