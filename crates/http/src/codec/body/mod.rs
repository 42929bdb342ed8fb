//! Body framing for requests and responses
//!
//! Only `Content-Length` framing is supported. A body is a run of exactly the
//! announced number of bytes, zero meaning no body at all, so both directions only
//! track how many bytes are left.
//!
//! - [`BodyDecoder`]: splits at most the remaining length off the read buffer,
//!   then reports EOF
//! - [`BodyEncoder`]: copies at most the remaining length into the write buffer

mod body_decoder;
mod body_encoder;

pub use body_decoder::BodyDecoder;
pub use body_encoder::BodyEncoder;
