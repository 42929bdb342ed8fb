//! A client session over one transport.
//!
//! [`HttpClient`] owns at most one open transport, split into a framed read half and a
//! buffered [`RequestWriter`]. Every exchange runs strictly one after the other: the
//! session methods take `&mut self`, and a [`BodyStream`] handed out for the current
//! response borrows the read half, so the next request can't be written before the
//! body is done.
//!
//! Health of the transport is tracked with a [`TransportState`]. Once a read or write
//! fails the session refuses further exchanges with
//! [`HttpError::TransportUnavailable`] until it is reconnected.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::FramedRead;
use tracing::{debug, error, info, warn};

use crate::codec::ResponseDecoder;
use crate::connection::config::ClientConfig;
use crate::connection::connector::{Connector, TcpConnector, parse_port};
use crate::connection::request_writer::RequestWriter;
use crate::protocol::{
    BodyStream, ConnectError, HttpError, ParseError, Request, Response, ResponseSource, SendError, TransportState,
};

/// The bounded body view handed out by a session over `IO`.
pub type SessionBody<'a, IO> = BodyStream<'a, ReadHalf<IO>>;

/// Outcome of [`HttpClient::do_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    /// `prepare` declined, nothing was sent
    Skipped,
    /// The response status code was not numeric, `process` was not invoked.
    ///
    /// The session stays connected but its transport is [`TransportState::Failed`],
    /// so every later exchange fails with [`HttpError::TransportUnavailable`] until
    /// the session is reconnected.
    Abandoned,
    /// `process` ran; `keep_alive` tells whether the session is still connected
    Processed { keep_alive: bool },
}

struct Transport<IO> {
    framed_read: ResponseSource<ReadHalf<IO>>,
    writer: RequestWriter<WriteHalf<IO>>,
    state: TransportState,
}

impl<IO> Transport<IO>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    fn new(io: IO, config: &ClientConfig) -> Self {
        let (reader, writer) = tokio::io::split(io);
        Self {
            framed_read: FramedRead::with_capacity(reader, ResponseDecoder::new(), config.read_buffer_size()),
            writer: RequestWriter::with_capacity(writer, config.write_buffer_size()),
            state: TransportState::Healthy,
        }
    }

    async fn write_request(&mut self, request: &Request, write_timeout: Duration) -> Result<(), SendError> {
        // an encode failure happens before any byte reaches the transport
        if let Err(e) = self.writer.write(request) {
            self.writer.clear_buf();
            error!(cause = %e, request_line = %request.request_line(), "can't encode request");
            return Err(e);
        }

        let result = match timeout(write_timeout, self.writer.flush()).await {
            Ok(result) => result,
            Err(_) => Err(SendError::timeout(write_timeout)),
        };

        if let Err(e) = &result {
            self.writer.clear_buf();
            self.state = TransportState::Failed;
            warn!(cause = %e, "failed to write request, transport marked failed");
        }
        result
    }

    async fn read_head(&mut self, response: &mut Response, read_timeout: Duration) -> Result<(), ParseError> {
        let result = match timeout(read_timeout, response.parse(&mut self.framed_read)).await {
            Ok(result) => result,
            Err(_) => Err(ParseError::timeout(read_timeout)),
        };

        if let Err(e) = &result {
            self.mark_read_failure(e);
        }
        result
    }

    /// Drops whatever is left of the current response body.
    async fn skip_body(&mut self, read_timeout: Duration) -> Result<u64, ParseError> {
        let result = BodyStream::new(&mut self.framed_read).with_read_timeout(read_timeout).skip().await;
        if let Err(e) = &result {
            self.mark_read_failure(e);
        }
        result
    }

    fn mark_read_failure(&mut self, e: &ParseError) {
        // the read offset is unknown after any failure, the next head can't be located
        self.state = match e {
            ParseError::UnexpectedEof => TransportState::Eof,
            _ => TransportState::Failed,
        };
        warn!(cause = %e, state = %self.state, "failed to read response");
    }
}

/// An HTTP/1.x client session.
///
/// The type parameter is the transport stream, [`TcpStream`] unless the session was
/// built with [`HttpClient::from_stream`] or connected through a custom [`Connector`].
pub struct HttpClient<IO = TcpStream> {
    config: ClientConfig,
    host: Option<String>,
    port: Option<String>,
    transport: Option<Transport<IO>>,
}

impl HttpClient {
    /// Creates a disconnected session with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a session connected to `host:port` over TCP.
    pub async fn open(host: &str, port: &str, config: ClientConfig) -> Result<Self, ConnectError> {
        let mut client = Self::with_config(config);
        client.connect(host, port).await?;
        Ok(client)
    }

    pub async fn open_with_port(host: &str, port: u16, config: ClientConfig) -> Result<Self, ConnectError> {
        Self::open(host, &port.to_string(), config).await
    }

    /// Connects over TCP, replacing the current transport if there is one.
    pub async fn connect(&mut self, host: &str, port: &str) -> Result<(), ConnectError> {
        self.connect_with(&TcpConnector, host, port).await
    }

    pub async fn connect_port(&mut self, host: &str, port: u16) -> Result<(), ConnectError> {
        self.connect(host, &port.to_string()).await
    }

    /// Connects again to the last host and port.
    pub async fn reconnect(&mut self) -> Result<(), ConnectError> {
        self.reconnect_with(&TcpConnector).await
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<IO> HttpClient<IO> {
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The host of the last connect attempt.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// The port text of the last connect attempt.
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// Whether a transport is open. An open transport may still be unhealthy, see [`HttpClient::state`].
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    pub fn state(&self) -> TransportState {
        self.transport.as_ref().map_or(TransportState::Closed, |transport| transport.state)
    }
}

impl<IO> HttpClient<IO>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a disconnected session.
    pub fn with_config(config: ClientConfig) -> Self {
        Self { config, host: None, port: None, transport: None }
    }

    /// Creates a session over an already open stream.
    pub fn from_stream(io: IO, config: ClientConfig) -> Self {
        let transport = Transport::new(io, &config);
        Self { config, host: None, port: None, transport: Some(transport) }
    }

    /// Connects through `connector`, replacing the current transport if there is one.
    ///
    /// `host` and `port` are remembered for [`HttpClient::reconnect_with`] even when
    /// the attempt fails. On failure the session stays disconnected.
    pub async fn connect_with<C>(&mut self, connector: &C, host: &str, port: &str) -> Result<(), ConnectError>
    where
        C: Connector<Stream = IO>,
    {
        if self.is_connected() {
            debug!("already connected, close current transport first");
            self.disconnect().await;
        }

        self.host = Some(host.to_owned());
        self.port = Some(port.to_owned());
        let port_number = parse_port(port)?;

        let connect_timeout = self.config.connect_timeout();
        let stream = match timeout(connect_timeout, connector.connect(host, port_number)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                warn!(host, port, cause = %e, "failed to connect");
                return Err(e);
            }
            Err(_) => {
                warn!(host, port, timeout = ?connect_timeout, "connect timeout");
                return Err(ConnectError::timeout(connect_timeout));
            }
        };

        self.transport = Some(Transport::new(stream, &self.config));
        info!(host, port, "connected");
        Ok(())
    }

    pub async fn reconnect_with<C>(&mut self, connector: &C) -> Result<(), ConnectError>
    where
        C: Connector<Stream = IO>,
    {
        let (Some(host), Some(port)) = (self.host.clone(), self.port.clone()) else {
            return Err(ConnectError::NoTarget);
        };
        self.connect_with(connector, &host, &port).await
    }

    /// Shuts down and drops the transport. Calling it on a disconnected session does nothing.
    pub async fn disconnect(&mut self) {
        let Some(mut transport) = self.transport.take() else {
            return;
        };

        match timeout(self.config.write_timeout(), transport.writer.get_mut().shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(cause = %e, "shutdown transport failed"),
            Err(_) => debug!("shutdown transport timeout"),
        }
        info!(state = %transport.state, "disconnected");
    }

    fn healthy_transport(&mut self) -> Result<&mut Transport<IO>, HttpError> {
        match self.transport.as_mut() {
            Some(transport) if transport.state.is_healthy() => Ok(transport),
            Some(transport) => {
                warn!(state = %transport.state, "transport is not healthy, refuse to send");
                Err(HttpError::transport_unavailable(transport.state))
            }
            None => Err(HttpError::transport_unavailable(TransportState::Closed)),
        }
    }

    /// Sends `request` and parses the response head into `response`.
    ///
    /// The unread body of the previous exchange is drained first. On success the body
    /// of the new response is pending on the transport, read it with
    /// [`HttpClient::body_stream`] or leave it to be drained by the next exchange.
    ///
    /// Fails without writing anything when the session is disconnected or its transport
    /// is unhealthy. A failed read or write marks the transport, it is not closed.
    pub async fn send_request(&mut self, request: &Request, response: &mut Response) -> Result<(), HttpError> {
        let read_timeout = self.config.read_timeout();
        let write_timeout = self.config.write_timeout();
        let transport = self.healthy_transport()?;

        response.reset();
        transport.skip_body(read_timeout).await?;
        transport.write_request(request, write_timeout).await?;

        if !transport.state.is_healthy() {
            return Err(HttpError::transport_unavailable(transport.state));
        }

        transport.read_head(response, read_timeout).await?;
        Ok(())
    }

    /// Returns the bounded view over the body of `response`, `None` while disconnected.
    pub fn body_stream(&mut self, response: &Response) -> Option<SessionBody<'_, IO>> {
        let read_timeout = self.config.read_timeout();
        let transport = self.transport.as_mut()?;
        Some(response.body_stream(&mut transport.framed_read).with_read_timeout(read_timeout))
    }

    /// Reads the rest of the body of `response` into memory.
    pub async fn read_body(&mut self, response: &Response) -> Result<Bytes, HttpError> {
        let read_timeout = self.config.read_timeout();
        let transport =
            self.transport.as_mut().ok_or_else(|| HttpError::transport_unavailable(TransportState::Closed))?;

        let result = response.body_stream(&mut transport.framed_read).with_read_timeout(read_timeout).collect_bytes().await;
        if let Err(e) = &result {
            transport.mark_read_failure(e);
        }
        Ok(result?)
    }

    /// Runs one complete exchange.
    ///
    /// `prepare` fills a fresh request whose persistence follows
    /// [`ClientConfig::keep_alive`], returning `false` skips the exchange without any
    /// I/O. `process` receives the response and its bounded body and returns whether
    /// the connection is still usable.
    ///
    /// A response whose status code is not numeric abandons the exchange: `process` is
    /// not invoked and the session stays connected with a failed transport. Any other
    /// malformed response is handed to `process` as an invalid [`Response`]. Transport
    /// failures return an error and close the session.
    ///
    /// After `process` the unread body is drained. The session disconnects when
    /// `process` returns `false`, or when the request or the response did not ask for
    /// a persistent connection.
    pub async fn do_request<P, F>(&mut self, prepare: P, process: F) -> Result<Exchange, HttpError>
    where
        P: FnOnce(&mut Request) -> bool,
        F: AsyncFnOnce(&Response, SessionBody<'_, IO>) -> bool,
    {
        let mut request = Request::default();
        request.set_persistent(self.config.keep_alive());
        if !prepare(&mut request) {
            debug!("request not prepared, skip exchange");
            return Ok(Exchange::Skipped);
        }

        let read_timeout = self.config.read_timeout();
        let write_timeout = self.config.write_timeout();
        let transport = self.healthy_transport()?;

        if let Err(e) = transport.skip_body(read_timeout).await {
            self.disconnect().await;
            return Err(e.into());
        }

        if let Err(e) = transport.write_request(&request, write_timeout).await {
            if !transport.state.is_healthy() {
                self.disconnect().await;
            }
            return Err(e.into());
        }

        let mut response = Response::new();
        match transport.read_head(&mut response, read_timeout).await {
            Ok(()) => {}
            Err(ParseError::InvalidStatusCode { reason }) => {
                warn!(reason = %reason, "status code is not numeric, abandon exchange");
                return Ok(Exchange::Abandoned);
            }
            Err(e) if e.is_transport_error() => {
                self.disconnect().await;
                return Err(e.into());
            }
            Err(e) => debug!(cause = %e, "hand invalid response to processor"),
        }

        let keep_alive = request.is_persistent() && response.keep_alive();
        let body = response.body_stream(&mut transport.framed_read).with_read_timeout(read_timeout);
        let usable = process(&response, body).await;
        let drained = transport.skip_body(read_timeout).await.is_ok();

        let reusable = usable && keep_alive && drained && transport.state.is_healthy();
        if !usable {
            info!("processor reports connection unusable");
        }
        if !reusable {
            self.disconnect().await;
        }

        debug!(status = ?response.status_code(), keep_alive = reusable, "exchange finished");
        Ok(Exchange::Processed { keep_alive: reusable })
    }
}

impl<IO> fmt::Debug for HttpClient<IO> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("state", &self.state())
            .field("config", &self.config)
            .finish()
    }
}
