//! HTTP header encoder implementation for serializing HTTP request heads
//!
//! This module encodes the request line and header fields of a [`Request`] into raw
//! bytes and appends the framing headers the client is responsible for.
//!
//! # Framing headers
//!
//! - `Connection` is synthesized from [`Request::is_persistent`] only when the caller
//!   did not set one, a caller value always wins
//! - `Content-Length` is always computed from the body and written after the caller
//!   headers; a caller supplied `Content-Length` is never written

use crate::ensure;
use crate::protocol::{PayloadSize, Request, SendError};

use bytes::{BufMut, BytesMut};

use http::{Version, header};
use std::io;
use std::io::{ErrorKind, Write};
use tokio_util::codec::Encoder;
use tracing::error;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for HTTP request heads implementing the [`Encoder`] trait.
#[derive(Debug)]
pub struct HeaderEncoder;

impl<'a> Encoder<(&'a Request, PayloadSize)> for HeaderEncoder {
    type Error = SendError;

    /// Encodes the request line and headers into the provided bytes buffer.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - HTTP version is not supported (only HTTP/1.0 and HTTP/1.1 supported)
    /// - The request target is empty or contains whitespace or control characters
    fn encode(&mut self, item: (&'a Request, PayloadSize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (request, payload_size) = item;

        match request.version() {
            Version::HTTP_10 | Version::HTTP_11 => {}
            v => {
                error!(http_version = ?v, "unsupported http version");
                return Err(io::Error::from(ErrorKind::Unsupported).into());
            }
        }

        let target = request.target();
        ensure!(!target.is_empty(), SendError::invalid_request_line("empty request target"));
        ensure!(
            target.bytes().all(|b| b.is_ascii_graphic() || b >= 0x80),
            SendError::invalid_request_line(format!("request target {target:?} contains whitespace or control characters"))
        );

        dst.reserve(INIT_HEADER_SIZE);
        write!(FastWrite(dst), "{}\r\n", request.request_line())?;

        let headers = request.headers();
        for (header_name, header_value) in headers.iter() {
            if header_name == header::CONTENT_LENGTH {
                continue;
            }
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }

        if !headers.contains_key(header::CONNECTION) {
            if request.is_persistent() {
                dst.put_slice(b"Connection: keep-alive\r\n");
            } else {
                dst.put_slice(b"Connection: close\r\n");
            }
        }

        write!(FastWrite(dst), "Content-Length: {}\r\n", payload_size.length())?;
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// Fast writer implementation for writing to BytesMut.
///
/// This is an optimization to avoid unnecessary bounds checking when writing
/// to the bytes buffer, since we've already reserved enough space.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    /// Writes a buffer into this writer, returning how many bytes were written.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    /// Flush this output stream, ensuring that all intermediately buffered contents reach their destination.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderValue, Method};

    fn encode(request: &Request) -> Result<BytesMut, SendError> {
        let mut dst = BytesMut::new();
        HeaderEncoder.encode((request, PayloadSize::new(request.content_length())), &mut dst)?;
        Ok(dst)
    }

    #[test]
    fn minimal_get() {
        let request = Request::get("/x");
        let dst = encode(&request).unwrap();
        assert_eq!(&dst[..], b"GET /x HTTP/1.1\r\nConnection: close\r\nContent-Length: 0\r\n\r\n");
    }

    #[test]
    fn persistent_request_asks_for_keep_alive() {
        let mut request = Request::get("/x");
        request.set_persistent(true);
        let dst = encode(&request).unwrap();
        assert_eq!(&dst[..], b"GET /x HTTP/1.1\r\nConnection: keep-alive\r\nContent-Length: 0\r\n\r\n");
    }

    #[test]
    fn caller_connection_header_wins() {
        let mut request = Request::get("/x");
        request.set_persistent(true);
        request.set_header(header::CONNECTION, HeaderValue::from_static("Upgrade"));

        let dst = encode(&request).unwrap();
        let text = std::str::from_utf8(&dst).unwrap();
        assert!(text.contains("connection: Upgrade\r\n"));
        assert!(!text.contains("keep-alive"));
        assert!(!text.contains("Connection: close"));
    }

    #[test]
    fn caller_content_length_is_replaced() {
        let mut request = Request::post("/upload");
        request.set_header(header::CONTENT_LENGTH, HeaderValue::from_static("999"));
        request.body_mut().put_slice(b"abc");

        let dst = encode(&request).unwrap();
        let text = std::str::from_utf8(&dst).unwrap();
        assert!(!text.contains("999"));
        assert!(text.ends_with("Content-Length: 3\r\n\r\n"));
    }

    #[test]
    fn caller_headers_come_first() {
        let mut request = Request::new(Method::PUT, "/items/1");
        request.set_header(header::HOST, HeaderValue::from_static("example.com"));

        let dst = encode(&request).unwrap();
        assert_eq!(&dst[..], b"PUT /items/1 HTTP/1.1\r\nhost: example.com\r\nConnection: close\r\nContent-Length: 0\r\n\r\n");
    }

    #[test]
    fn reject_bad_target() {
        let request = Request::get("");
        assert!(matches!(encode(&request), Err(SendError::InvalidRequestLine { .. })));

        let request = Request::get("/a b");
        assert!(matches!(encode(&request), Err(SendError::InvalidRequestLine { .. })));

        let request = Request::get("/a\r\nInjected: yes");
        assert!(matches!(encode(&request), Err(SendError::InvalidRequestLine { .. })));
    }

    #[test]
    fn reject_unsupported_version() {
        let mut request = Request::get("/");
        request.request_line_mut().set_version(Version::HTTP_2);
        assert!(matches!(encode(&request), Err(SendError::Io { .. })));
    }
}
