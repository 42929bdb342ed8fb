//! HTTP response head handling and the parse/clear lifecycle of a [`Response`].
//!
//! A [`Response`] only stores the parsed status line and headers. The body stays on
//! the transport: after [`Response::parse`] the [`ResponseDecoder`] inside the source
//! holds a bound of exactly `content-length` bytes, and [`Response::body_stream`]
//! hands out a [`BodyStream`] restricted to that bound. Whatever the caller leaves
//! unread is discarded by [`Response::clear`] before the next parse.

use std::fmt;

use bytes::Bytes;
use http::header::{AsHeaderName, CONNECTION, CONTENT_LENGTH};
use http::{HeaderMap, HeaderValue, StatusCode, Version};
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;

use futures::StreamExt;
use tracing::{debug, error};

use crate::codec::ResponseDecoder;
use crate::protocol::body::BodyStream;
use crate::protocol::{Message, ParseError};

/// The read half of a transport framed with a [`ResponseDecoder`].
pub type ResponseSource<R> = FramedRead<R, ResponseDecoder>;

/// The parsed status line: `VERSION CODE REASON`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    version: Version,
    code: StatusCode,
    reason: String,
}

impl StatusLine {
    pub fn new<S: Into<String>>(version: Version, code: StatusCode, reason: S) -> Self {
        Self { version, code, reason: reason.into() }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    /// The reason phrase as sent by the server, possibly empty.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {} {}", self.version, self.code.as_str(), self.reason)
    }
}

/// Status line and headers of a response, as produced by the decoder.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    status: StatusLine,
    headers: HeaderMap,
}

impl ResponseHead {
    pub fn new(status: StatusLine, headers: HeaderMap) -> Self {
        Self { status, headers }
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn content_length(&self) -> u64 {
        content_length(&self.headers)
    }

    pub fn into_parts(self) -> (StatusLine, HeaderMap) {
        (self.status, self.headers)
    }
}

/// A response received over a client session.
///
/// The same value is meant to be reused across exchanges: [`Response::clear`] drops
/// the unread body of the previous exchange and resets the head.
#[derive(Debug, Default)]
pub struct Response {
    status: Option<StatusLine>,
    headers: HeaderMap,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// The status line, or `None` while the response is invalid or not parsed yet.
    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        self.status.as_ref().map(StatusLine::code)
    }

    pub fn is_valid(&self) -> bool {
        self.status.is_some()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the header value as text, or `default` if it is absent or not visible ASCII.
    pub fn header_or<'a, K: AsHeaderName>(&'a self, name: K, default: &'a str) -> &'a str {
        self.headers.get(name).and_then(|value| value.to_str().ok()).unwrap_or(default)
    }

    /// The declared body size. A missing or malformed `content-length` counts as zero.
    pub fn content_length(&self) -> u64 {
        content_length(&self.headers)
    }

    /// Whether the server is willing to keep the connection open after this response.
    ///
    /// HTTP/1.1 is persistent unless `Connection: close` is present, HTTP/1.0 only
    /// with an explicit `Connection: keep-alive`. An invalid response is never persistent.
    pub fn keep_alive(&self) -> bool {
        let Some(status) = &self.status else {
            return false;
        };

        let has_token = |token: &str| {
            self.headers
                .get_all(CONNECTION)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .flat_map(|value| value.split(','))
                .any(|item| item.trim().eq_ignore_ascii_case(token))
        };

        match status.version() {
            Version::HTTP_11 => !has_token("close"),
            Version::HTTP_10 => has_token("keep-alive"),
            _ => false,
        }
    }

    /// Resets status and headers without touching the transport.
    pub fn reset(&mut self) {
        self.status = None;
        self.headers.clear();
    }

    /// Discards any unread body left on `source`, then resets status and headers.
    ///
    /// Returns only after the body is fully consumed, so the next parse starts at the
    /// first byte of the next response.
    pub async fn clear<R>(&mut self, source: &mut ResponseSource<R>) -> Result<(), ParseError>
    where
        R: AsyncRead + Unpin,
    {
        let result = BodyStream::new(source).skip().await.map(|_| ());
        self.reset();
        result
    }

    /// Reads one response head from `source`.
    ///
    /// On success the decoder restricts the following body to `content-length` bytes.
    /// On failure the response is left invalid.
    pub async fn parse<R>(&mut self, source: &mut ResponseSource<R>) -> Result<(), ParseError>
    where
        R: AsyncRead + Unpin,
    {
        self.clear(source).await?;

        match source.next().await {
            Some(Ok(Message::Header(head))) => {
                let (status, headers) = head.into_parts();
                self.status = Some(status);
                self.headers = headers;
                Ok(())
            }

            Some(Ok(Message::Payload(_))) => {
                error!("receive payload while expecting response head");
                Err(ParseError::invalid_body("receive payload while expecting response head"))
            }

            Some(Err(e)) => Err(e),

            None => Err(ParseError::UnexpectedEof),
        }
    }

    /// Returns the bounded view over the body pending on `source`.
    ///
    /// The body always belongs to the last head parsed from `source`, so `self` must be
    /// that response. The view ends after `content-length` bytes whatever else is
    /// buffered on the source. It is empty when `self` holds no parsed head, or when the
    /// pending body is larger than `self` announced and so can't be its body.
    pub fn body_stream<'a, R>(&self, source: &'a mut ResponseSource<R>) -> BodyStream<'a, R>
    where
        R: AsyncRead + Unpin,
    {
        let pending = source.decoder().payload_remaining();
        if !self.is_valid() || pending > self.content_length() {
            debug!(pending, content_length = self.content_length(), "body does not belong to response");
            return BodyStream::detached(source);
        }
        BodyStream::new(source)
    }

    /// Reads the remaining body into memory.
    pub async fn read_body<R>(&self, source: &mut ResponseSource<R>) -> Result<Bytes, ParseError>
    where
        R: AsyncRead + Unpin,
    {
        self.body_stream(source).collect_bytes().await
    }
}

impl From<ResponseHead> for Response {
    fn from(head: ResponseHead) -> Self {
        let (status, headers) = head.into_parts();
        Self { status: Some(status), headers }
    }
}

/// Parses the last `content-length` value, falling back to zero when it is absent or
/// not an unsigned integer.
pub(crate) fn content_length(headers: &HeaderMap) -> u64 {
    headers.get_all(CONTENT_LENGTH).iter().next_back().and_then(parse_length).unwrap_or(0)
}

fn parse_length(value: &HeaderValue) -> Option<u64> {
    value.to_str().ok()?.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.append(*name, HeaderValue::from_static(value));
        }
        headers
    }

    fn framed(bytes: &'static [u8]) -> ResponseSource<&'static [u8]> {
        FramedRead::new(bytes, ResponseDecoder::new())
    }

    #[test]
    fn content_length_is_lenient() {
        assert_eq!(content_length(&headers(&[])), 0);
        assert_eq!(content_length(&headers(&[("content-length", "42")])), 42);
        assert_eq!(content_length(&headers(&[("content-length", " 7 ")])), 7);
        assert_eq!(content_length(&headers(&[("content-length", "abc")])), 0);
        assert_eq!(content_length(&headers(&[("content-length", "-1")])), 0);
        assert_eq!(content_length(&headers(&[("content-length", "99999999999999999999999")])), 0);
        assert_eq!(content_length(&headers(&[("content-length", "3"), ("content-length", "5")])), 5);
    }

    #[test]
    fn keep_alive_depends_on_version_and_connection() {
        let ok = || StatusLine::new(Version::HTTP_11, StatusCode::OK, "OK");

        let response = Response::from(ResponseHead::new(ok(), headers(&[])));
        assert!(response.keep_alive());

        let response = Response::from(ResponseHead::new(ok(), headers(&[("connection", "Close")])));
        assert!(!response.keep_alive());

        let http10 = StatusLine::new(Version::HTTP_10, StatusCode::OK, "OK");
        let response = Response::from(ResponseHead::new(http10.clone(), headers(&[])));
        assert!(!response.keep_alive());

        let response = Response::from(ResponseHead::new(http10, headers(&[("connection", "upgrade, keep-alive")])));
        assert!(response.keep_alive());

        assert!(!Response::new().keep_alive());
    }

    #[tokio::test]
    async fn parse_bounds_body_and_leaves_remainder() {
        let mut source = framed(b"HTTP/1.1 200 OK\r\ncontent-length: 5\r\n\r\nhelloEXTRA");
        let mut response = Response::new();

        response.parse(&mut source).await.unwrap();

        assert_eq!(response.status_code(), Some(StatusCode::OK));
        assert_eq!(response.status().unwrap().reason(), "OK");
        assert_eq!(response.content_length(), 5);

        let body = response.read_body(&mut source).await.unwrap();
        assert_eq!(&body[..], b"hello");
        assert_eq!(&source.read_buffer()[..], b"EXTRA");
    }

    #[tokio::test]
    async fn missing_or_bad_content_length_means_no_body() {
        let mut source = framed(b"HTTP/1.1 204 No Content\r\n\r\nHTTP/1.1 200 OK\r\ncontent-length: nope\r\n\r\n");
        let mut response = Response::new();

        response.parse(&mut source).await.unwrap();
        assert_eq!(response.status_code(), Some(StatusCode::NO_CONTENT));
        assert!(response.read_body(&mut source).await.unwrap().is_empty());

        response.parse(&mut source).await.unwrap();
        assert_eq!(response.status_code(), Some(StatusCode::OK));
        assert_eq!(response.content_length(), 0);
        assert!(response.read_body(&mut source).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_drains_unread_body() {
        let wire = indoc! {"
            HTTP/1.1 200 OK
            Content-Length: 11

            first bodyXHTTP/1.1 404 Not Found
            Content-Length: 4

            gone"};
        let mut source = framed(wire.as_bytes());
        let mut response = Response::new();

        response.parse(&mut source).await.unwrap();
        assert_eq!(response.status_code(), Some(StatusCode::OK));

        response.clear(&mut source).await.unwrap();
        assert!(!response.is_valid());
        assert!(response.headers().is_empty());

        response.parse(&mut source).await.unwrap();
        assert_eq!(response.status_code(), Some(StatusCode::NOT_FOUND));
        assert_eq!(response.status().unwrap().reason(), "Not Found");
        assert_eq!(&response.read_body(&mut source).await.unwrap()[..], b"gone");
    }

    #[tokio::test]
    async fn body_stays_with_the_response_that_announced_it() {
        let mut source = framed(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nokHTTP/1.1 200 OK\r\nContent-Length: 9\r\n\r\nlong body");
        let mut first = Response::new();
        first.parse(&mut source).await.unwrap();
        assert_eq!(&first.read_body(&mut source).await.unwrap()[..], b"ok");

        let mut second = Response::new();
        second.parse(&mut source).await.unwrap();

        // neither an unparsed response nor a stale shorter one can read the new body
        assert!(Response::new().body_stream(&mut source).is_eof());
        assert!(first.read_body(&mut source).await.unwrap().is_empty());
        assert_eq!(source.decoder().payload_remaining(), 9);

        assert_eq!(&second.read_body(&mut source).await.unwrap()[..], b"long body");
    }

    #[tokio::test]
    async fn parse_drops_previous_body() {
        let mut source = framed(b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nabcHTTP/1.1 202 Accepted\r\n\r\n");
        let mut response = Response::new();

        response.parse(&mut source).await.unwrap();
        response.parse(&mut source).await.unwrap();

        assert_eq!(response.status_code(), Some(StatusCode::ACCEPTED));
    }

    #[tokio::test]
    async fn invalid_status_line_is_not_parsed() {
        let mut source = framed(b"HTTP/1.1 2x0 OK\r\n\r\n");
        let mut response = Response::new();

        let result = response.parse(&mut source).await;
        assert!(matches!(result, Err(ParseError::InvalidStatusCode { .. })));
        assert!(!response.is_valid());

        let mut source = framed(b"SMTP ready\r\n\r\n");
        let result = response.parse(&mut source).await;
        assert!(matches!(result, Err(ParseError::InvalidStatusLine { .. })));
    }

    #[tokio::test]
    async fn end_of_data_before_head_completes() {
        let mut source = framed(b"HTTP/1.1 200 OK\r\ncontent-len");
        let mut response = Response::new();

        let result = response.parse(&mut source).await;
        assert!(matches!(result, Err(ParseError::UnexpectedEof)));

        let mut source = framed(b"");
        let result = response.parse(&mut source).await;
        assert!(matches!(result, Err(ParseError::UnexpectedEof)));
    }

    #[test]
    fn status_line_display() {
        let status = StatusLine::new(Version::HTTP_11, StatusCode::NOT_FOUND, "Not Found");
        assert_eq!(status.to_string(), "HTTP/1.1 404 Not Found");
    }
}
