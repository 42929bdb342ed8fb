//! HTTP header decoder implementation for parsing HTTP response heads
//!
//! This module decodes the status line and header fields of a response from raw
//! bytes into a [`ResponseHead`], and works out how many body bytes follow.
//!
//! # Features
//!
//! - Header parsing using `httparse`
//! - Support for HTTP/1.0 and HTTP/1.1
//! - Built-in protection against oversized heads
//! - Lenient `Content-Length`: a missing or malformed value means no body
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header size: 8KB
//!
//! # Implementation Details
//!
//! The decoder works in multiple stages:
//!
//! 1. Parse raw bytes using `httparse`
//! 2. Record header name/value byte ranges
//! 3. Split the head off the buffer and build the `HeaderMap` from shared slices
//! 4. Determine the payload size from `Content-Length`

use bytes::BytesMut;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Version};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;

use crate::protocol::{ParseError, PayloadSize, ResponseHead, StatusLine};

/// Maximum number of headers allowed in a response
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decoder for HTTP response heads implementing the [`Decoder`] trait.
///
/// This decoder parses raw bytes into a structured [`ResponseHead`] and determines the
/// [`PayloadSize`] from the `Content-Length` header.
#[derive(Debug)]
pub struct HeaderDecoder;

impl Decoder for HeaderDecoder {
    type Item = (ResponseHead, PayloadSize);
    type Error = ParseError;

    /// Attempts to decode a response head from the provided bytes buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((head, payload_size)))` if a complete head was successfully parsed
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if parsing failed
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if:
    /// - The status code is not a three digit number in `100..=999`
    /// - The status line is not `HTTP/1.x CODE REASON`
    /// - The number of headers exceeds `MAX_HEADER_NUM`
    /// - The total header size exceeds `MAX_HEADER_BYTES`
    /// - Headers contain invalid characters
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut res = httparse::Response::new(&mut headers);

        let parsed_result = res.parse(src).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            Error::Status => ParseError::invalid_status_code(e),
            Error::Version => ParseError::invalid_status_line(e),
            e => ParseError::invalid_header(e),
        });

        match parsed_result? {
            Status::Complete(body_offset) => {
                trace!(head_size = body_offset, "parsed response head");
                ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

                let version = match res.version {
                    Some(0) => Version::HTTP_10,
                    Some(1) => Version::HTTP_11,
                    v => return Err(ParseError::InvalidVersion(v)),
                };

                let code = res.code.ok_or_else(|| ParseError::invalid_status_code("missing status code"))?;
                let code = StatusCode::from_u16(code).map_err(ParseError::invalid_status_code)?;
                let reason = res.reason.unwrap_or_default().to_owned();

                let header_count = res.headers.len();
                let mut header_index = [EMPTY_HEADER_INDEX; MAX_HEADER_NUM];
                HeaderIndex::record(src, res.headers, &mut header_index);

                // Split header portion from source buffer, the body stays in `src`
                let header_bytes = src.split_to(body_offset).freeze();

                let mut headers = HeaderMap::with_capacity(header_count);
                for index in &header_index[..header_count] {
                    let name = HeaderName::from_bytes(&header_bytes[index.name.0..index.name.1]).map_err(ParseError::invalid_header)?;
                    let value = HeaderValue::from_maybe_shared(header_bytes.slice(index.value.0..index.value.1))
                        .map_err(ParseError::invalid_header)?;
                    headers.append(name, value);
                }

                let head = ResponseHead::new(StatusLine::new(version, code, reason), headers);
                let payload_size = PayloadSize::new(head.content_length());
                trace!(status = code.as_u16(), payload_size = payload_size.length(), "decoded response head");

                Ok(Some((head, payload_size)))
            }
            // If parsing incomplete, ensure current buffer size does not exceed limit
            Status::Partial => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                Ok(None)
            }
        }
    }
}

/// Stores the byte range positions of a header's name and value within the original buffer.
#[derive(Clone, Copy)]
struct HeaderIndex {
    /// Start and end byte positions of the header name
    pub(crate) name: (usize, usize),
    /// Start and end byte positions of the header value
    pub(crate) value: (usize, usize),
}

const EMPTY_HEADER_INDEX: HeaderIndex = HeaderIndex { name: (0, 0), value: (0, 0) };

impl HeaderIndex {
    /// Records the byte positions of header names and values from the parsed headers.
    fn record(bytes: &[u8], headers: &[httparse::Header<'_>], indices: &mut [HeaderIndex]) {
        let bytes_ptr = bytes.as_ptr() as usize;
        for (header, indices) in headers.iter().zip(indices.iter_mut()) {
            let name_start = header.name.as_ptr() as usize - bytes_ptr;
            let name_end = name_start + header.name.len();
            indices.name = (name_start, name_end);
            let value_start = header.value.as_ptr() as usize - bytes_ptr;
            let value_end = value_start + header.value.len();
            indices.value = (value_start, value_end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_bytes_mut_lens() {
        let str = indoc! {r##"
        HTTP/1.1 200 OK
        Content-Type: text/plain
        Content-Length: 3

        123"##};

        let mut bytes = BytesMut::from(str);

        let (head, payload_size) = HeaderDecoder.decode(&mut bytes).unwrap().unwrap();

        assert_eq!(payload_size, PayloadSize::Length(3));
        assert_eq!(head.status().code(), StatusCode::OK);
        assert_eq!(bytes.len(), 3);
        assert_eq!(&bytes[..], &b"123"[..]);
    }

    #[test]
    fn from_nginx() {
        let str = indoc! {r##"
        HTTP/1.1 301 Moved Permanently
        Server: nginx/1.25.3
        Date: Tue, 14 Oct 2025 08:12:54 GMT
        Content-Type: text/html
        Content-Length: 169
        Connection: keep-alive
        Location: https://example.com/

        "##};

        let mut buf = BytesMut::from(str);

        let (head, payload_size) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(payload_size, PayloadSize::Length(169));

        let status = head.status();
        assert_eq!(status.version(), Version::HTTP_11);
        assert_eq!(status.code(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(status.reason(), "Moved Permanently");

        assert_eq!(head.headers().len(), 6);
        assert_eq!(head.headers().get(http::header::SERVER), Some(&HeaderValue::from_static("nginx/1.25.3")));
        assert_eq!(head.headers().get(http::header::CONNECTION), Some(&HeaderValue::from_static("keep-alive")));
        assert_eq!(head.headers().get(http::header::LOCATION), Some(&HeaderValue::from_static("https://example.com/")));
    }

    #[test]
    fn http_10_without_reason() {
        let mut buf = BytesMut::from(&b"HTTP/1.0 204 \r\n\r\n"[..]);

        let (head, payload_size) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();

        assert!(payload_size.is_empty());
        assert_eq!(head.status().version(), Version::HTTP_10);
        assert_eq!(head.status().code(), StatusCode::NO_CONTENT);
        assert_eq!(head.status().reason(), "");
    }

    #[test]
    fn malformed_content_length_means_empty() {
        let mut buf = BytesMut::from(&b"HTTP/1.1 200 OK\r\nContent-Length: 12abc\r\n\r\nbody"[..]);

        let (head, payload_size) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();

        assert!(payload_size.is_empty());
        assert_eq!(head.headers().get(http::header::CONTENT_LENGTH), Some(&HeaderValue::from_static("12abc")));
        assert_eq!(&buf[..], b"body");
    }

    #[test]
    fn partial_head() {
        let mut buf = BytesMut::from(&b"HTTP/1.1 200 OK\r\nServer: x\r\n"[..]);
        assert!(HeaderDecoder.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 28);
    }

    #[test]
    fn invalid_status_code() {
        let mut buf = BytesMut::from(&b"HTTP/1.1 abc OK\r\n\r\n"[..]);
        assert!(matches!(HeaderDecoder.decode(&mut buf), Err(ParseError::InvalidStatusCode { .. })));

        let mut buf = BytesMut::from(&b"HTTP/1.1 000 Zero\r\n\r\n"[..]);
        assert!(matches!(HeaderDecoder.decode(&mut buf), Err(ParseError::InvalidStatusCode { .. })));
    }

    #[test]
    fn invalid_status_line() {
        let mut buf = BytesMut::from(&b"ICY 200 OK\r\n\r\n"[..]);
        assert!(matches!(HeaderDecoder.decode(&mut buf), Err(ParseError::InvalidStatusLine { .. })));
    }

    #[test]
    fn too_large_head() {
        let mut str = String::from("HTTP/1.1 200 OK\r\n");
        while str.len() <= MAX_HEADER_BYTES {
            str.push_str("X-Padding: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\r\n");
        }
        let mut buf = BytesMut::from(str.as_str());

        let result = HeaderDecoder.decode(&mut buf);
        assert!(matches!(result, Err(ParseError::TooManyHeaders { .. } | ParseError::TooLargeHeader { .. })));
    }
}
