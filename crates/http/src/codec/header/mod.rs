//! HTTP head processing module
//!
//! # Components
//!
//! - [`HeaderDecoder`]: Decodes response status line and headers from raw bytes
//!   - Supports HTTP/1.0 and HTTP/1.1 responses
//!   - Handles header field validation
//!   - Manages header size limits
//!   - Derives the body length from `Content-Length`
//!
//! - [`HeaderEncoder`]: Encodes request line and headers to bytes
//!   - Implements standard HTTP/1.1 header formatting
//!   - Synthesizes the `Connection` header when the caller did not set one
//!   - Always writes the computed `Content-Length`

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;
