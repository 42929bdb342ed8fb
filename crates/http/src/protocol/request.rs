//! HTTP request construction.
//!
//! A [`Request`] accumulates a request line, a header map and a body buffer. It is
//! serialized by [`RequestEncoder`](crate::codec::RequestEncoder), which owns the
//! framing headers: `Content-Length` always reflects the live body size and a
//! `Connection` header is synthesized from [`Request::is_persistent`] unless the
//! caller already set one.

use std::fmt;
use std::io;

use bytes::{BufMut, BytesMut};
use http::header::{AsHeaderName, IntoHeaderName};
use http::{HeaderMap, HeaderValue, Method, Version};
use tokio::io::AsyncWrite;

use crate::connection::RequestWriter;
use crate::protocol::SendError;

/// The first line of a request: `METHOD TARGET VERSION`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: Method,
    target: String,
    version: Version,
}

impl RequestLine {
    pub fn new<T: Into<String>>(method: Method, target: T, version: Version) -> Self {
        Self { method, target: target.into(), version }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    pub fn set_target<T: Into<String>>(&mut self, target: T) {
        self.target = target.into();
    }

    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}

/// An empty line: `GET`, no target, `HTTP/1.1`.
impl Default for RequestLine {
    fn default() -> Self {
        Self { method: Method::GET, target: String::new(), version: Version::HTTP_11 }
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `Version`'s Debug output is the wire form, e.g. "HTTP/1.1"
        write!(f, "{} {} {:?}", self.method, self.target, self.version)
    }
}

/// An outgoing HTTP request.
///
/// The body is an in-memory buffer that can be populated incrementally through
/// [`Request::body_writer`] or [`Request::body_mut`] before the request is written.
#[derive(Debug, Clone, Default)]
pub struct Request {
    request_line: RequestLine,
    headers: HeaderMap,
    body: BytesMut,
    persistent: bool,
}

impl Request {
    pub fn new<T: Into<String>>(method: Method, target: T) -> Self {
        Self { request_line: RequestLine::new(method, target, Version::HTTP_11), ..Default::default() }
    }

    pub fn get<T: Into<String>>(target: T) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn post<T: Into<String>>(target: T) -> Self {
        Self::new(Method::POST, target)
    }

    /// Resets the request line and the headers.
    ///
    /// The body buffer and the persistence flag are left as they are, call
    /// [`Request::clear_body`] to drop the body as well.
    pub fn clear(&mut self) {
        self.request_line = RequestLine::default();
        self.headers.clear();
    }

    pub fn clear_body(&mut self) {
        self.body.clear();
    }

    pub fn request_line(&self) -> &RequestLine {
        &self.request_line
    }

    pub fn request_line_mut(&mut self) -> &mut RequestLine {
        &mut self.request_line
    }

    pub fn set_request_line(&mut self, request_line: RequestLine) {
        self.request_line = request_line;
    }

    pub fn method(&self) -> &Method {
        self.request_line.method()
    }

    pub fn target(&self) -> &str {
        self.request_line.target()
    }

    pub fn version(&self) -> Version {
        self.request_line.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Inserts a header, replacing any previous values of the same name.
    pub fn set_header<K: IntoHeaderName>(&mut self, name: K, value: HeaderValue) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Returns the header value as text, or `default` if it is absent or not visible ASCII.
    pub fn header_or<'a, K: AsHeaderName>(&'a self, name: K, default: &'a str) -> &'a str {
        self.headers.get(name).and_then(|value| value.to_str().ok()).unwrap_or(default)
    }

    /// Whether the connection should stay open after this exchange.
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn set_persistent(&mut self, persistent: bool) {
        self.persistent = persistent;
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut BytesMut {
        &mut self.body
    }

    /// Returns a [`std::io::Write`] handle appending to the body.
    pub fn body_writer(&mut self) -> BodyWriter<'_> {
        BodyWriter(&mut self.body)
    }

    /// The number of body bytes, always computed from the live buffer.
    pub fn content_length(&self) -> u64 {
        self.body.len() as u64
    }

    /// Serializes the request onto `writer` and flushes it.
    pub async fn write_to<W>(&self, writer: &mut W) -> Result<(), SendError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut request_writer = RequestWriter::with_capacity(writer, self.body.len() + 512);
        request_writer.write(self)?;
        request_writer.flush().await
    }
}

/// Appends to a request body buffer.
#[derive(Debug)]
pub struct BodyWriter<'a>(&'a mut BytesMut);

impl io::Write for BodyWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    #[test]
    fn request_line_display() {
        let line = RequestLine::new(Method::GET, "/x", Version::HTTP_11);
        assert_eq!(line.to_string(), "GET /x HTTP/1.1");

        let line = RequestLine::new(Method::DELETE, "/items/1", Version::HTTP_10);
        assert_eq!(line.to_string(), "DELETE /items/1 HTTP/1.0");
    }

    #[test]
    fn content_length_follows_body() {
        let mut request = Request::post("/upload");
        assert_eq!(request.content_length(), 0);

        write!(request.body_writer(), "hello {}", "world").unwrap();
        assert_eq!(request.content_length(), 11);

        request.body_mut().put_slice(b"!!");
        assert_eq!(request.content_length(), 13);
        assert_eq!(request.body(), b"hello world!!");
    }

    #[test]
    fn clear_keeps_body() {
        let mut request = Request::post("/upload");
        request.set_header(http::header::HOST, HeaderValue::from_static("example.com"));
        request.body_writer().write_all(b"payload").unwrap();

        request.clear();

        assert_eq!(request.request_line(), &RequestLine::default());
        assert!(request.headers().is_empty());
        assert_eq!(request.body(), b"payload");

        request.clear_body();
        assert_eq!(request.content_length(), 0);
    }

    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &[u8]) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn write_to_reports_sink_failure() {
        let mut request = Request::post("/upload");
        request.body_mut().put_slice(b"payload");

        let result = request.write_to(&mut BrokenPipe).await;
        assert!(matches!(result, Err(SendError::Io { ref source }) if source.kind() == io::ErrorKind::BrokenPipe));
    }

    #[tokio::test]
    async fn write_to_serializes_whole_request() {
        let mut request = Request::post("/upload");
        request.body_mut().put_slice(b"payload");

        let mut sink = Vec::new();
        request.write_to(&mut sink).await.unwrap();
        assert_eq!(&sink[..], b"POST /upload HTTP/1.1\r\nConnection: close\r\nContent-Length: 7\r\n\r\npayload");
    }

    #[test]
    fn header_lookup_with_default() {
        let mut request = Request::get("/");
        request.set_header(http::header::ACCEPT, HeaderValue::from_static("*/*"));

        assert_eq!(request.header_or(http::header::ACCEPT, "none"), "*/*");
        assert_eq!(request.header_or("x-missing", "none"), "none");
    }
}
