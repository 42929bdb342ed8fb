//! Bounded streaming of response bodies.
//!
//! [`BodyStream`] is a cursor over the framed read half of a transport. It never owns
//! the transport: it borrows the [`ResponseSource`] for as long as the body is being
//! read, which also keeps the owning session from writing the next request before the
//! current body is done.
//!
//! The bound itself is enforced by the [`ResponseDecoder`](crate::codec::ResponseDecoder):
//! after a response head it only emits `content-length` payload bytes followed by an
//! EOF marker, so bytes of the next response stay in the read buffer.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use http_body::{Body, Frame, SizeHint};
use http_body_util::BodyExt;
use tokio::io::AsyncRead;
use tokio::time::Sleep;
use tracing::{debug, error};

use crate::protocol::response::ResponseSource;
use crate::protocol::{Message, ParseError, PayloadItem};

/// A readable view restricted to the body of the last parsed response.
///
/// Implements both [`Stream`] and [`http_body::Body`]. Once the declared length is
/// consumed the view reports end of data, even if the transport holds more bytes.
pub struct BodyStream<'conn, R> {
    source: &'conn mut ResponseSource<R>,
    remaining: u64,
    eof: bool,
    read_timeout: Option<Duration>,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl<'conn, R> BodyStream<'conn, R>
where
    R: AsyncRead + Unpin,
{
    /// Creates a view over the pending body of `source`.
    ///
    /// If no body is pending (no response parsed, or the body is already consumed) the
    /// view is empty and never touches the transport.
    pub fn new(source: &'conn mut ResponseSource<R>) -> Self {
        let decoder = source.decoder();
        let eof = !decoder.is_payload_pending();
        let remaining = decoder.payload_remaining();
        Self { source, remaining, eof, read_timeout: None, sleep: None }
    }

    /// Creates a view that is already at end of data and never touches `source`.
    pub(crate) fn detached(source: &'conn mut ResponseSource<R>) -> Self {
        Self { source, remaining: 0, eof: true, read_timeout: None, sleep: None }
    }

    /// Fails a read with [`ParseError::Timeout`] if no data arrives within `timeout`.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Number of body bytes not yet read.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Reads the next chunk, `None` once the body is complete.
    pub async fn chunk(&mut self) -> Option<Result<Bytes, ParseError>> {
        self.next().await
    }

    /// Reads and drops everything left in the body, returning the number of bytes skipped.
    pub async fn skip(mut self) -> Result<u64, ParseError> {
        let mut size: u64 = 0;
        while let Some(chunk) = self.next().await {
            size += chunk?.len() as u64;
        }

        if size > 0 {
            debug!(size = size, "skip response body");
        }
        Ok(size)
    }

    /// Collects the rest of the body into one buffer.
    pub async fn collect_bytes(self) -> Result<Bytes, ParseError> {
        let capacity = usize::try_from(self.remaining).unwrap_or(usize::MAX).min(64 * 1024);
        let mut stream = self;
        let mut buffer = BytesMut::with_capacity(capacity);
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer.freeze())
    }

    /// Collects the rest of the body through the [`http_body`] interface.
    pub async fn into_bytes(self) -> Result<Bytes, ParseError> {
        Ok(BodyExt::collect(self).await?.to_bytes())
    }

    fn poll_timeout(&mut self, cx: &mut Context<'_>) -> Poll<ParseError> {
        let Some(timeout) = self.read_timeout else {
            return Poll::Pending;
        };

        let sleep = self.sleep.get_or_insert_with(|| Box::pin(tokio::time::sleep(timeout)));
        match sleep.as_mut().poll(cx) {
            Poll::Ready(()) => {
                self.sleep = None;
                self.eof = true;
                Poll::Ready(ParseError::timeout(timeout))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<R> Stream for BodyStream<'_, R>
where
    R: AsyncRead + Unpin,
{
    type Item = Result<Bytes, ParseError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.eof {
            return Poll::Ready(None);
        }

        let polled = this.source.poll_next_unpin(cx);
        if polled.is_ready() {
            this.sleep = None;
        }

        match polled {
            Poll::Ready(Some(Ok(Message::Payload(PayloadItem::Chunk(bytes))))) => {
                this.remaining = this.remaining.saturating_sub(bytes.len() as u64);
                Poll::Ready(Some(Ok(bytes)))
            }

            Poll::Ready(Some(Ok(Message::Payload(PayloadItem::Eof)))) => {
                this.eof = true;
                Poll::Ready(None)
            }

            Poll::Ready(Some(Ok(Message::Header(_)))) => {
                error!("receive response head while reading body");
                this.eof = true;
                Poll::Ready(Some(Err(ParseError::invalid_body("receive response head while reading body"))))
            }

            Poll::Ready(Some(Err(e))) => {
                this.eof = true;
                Poll::Ready(Some(Err(e)))
            }

            Poll::Ready(None) => {
                error!(remaining = this.remaining, "stream closed before body completed");
                this.eof = true;
                let reason = format!("stream closed with {} body bytes missing", this.remaining);
                Poll::Ready(Some(Err(ParseError::invalid_body(reason))))
            }

            Poll::Pending => match this.poll_timeout(cx) {
                Poll::Ready(e) => Poll::Ready(Some(Err(e))),
                Poll::Pending => Poll::Pending,
            },
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.eof { (0, Some(0)) } else { (0, None) }
    }
}

impl<R> Body for BodyStream<'_, R>
where
    R: AsyncRead + Unpin,
{
    type Data = Bytes;
    type Error = ParseError;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        self.poll_next(cx).map(|item| item.map(|result| result.map(Frame::data)))
    }

    fn is_end_stream(&self) -> bool {
        self.eof
    }

    fn size_hint(&self) -> SizeHint {
        if self.eof { SizeHint::with_exact(0) } else { SizeHint::with_exact(self.remaining) }
    }
}

impl<R> std::fmt::Debug for BodyStream<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BodyStream").field("remaining", &self.remaining).field("eof", &self.eof).finish()
    }
}
