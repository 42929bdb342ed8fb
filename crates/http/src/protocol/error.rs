use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("connect error: {source}")]
    ConnectError {
        #[from]
        source: ConnectError,
    },

    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: SendError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: ParseError,
    },

    #[error("transport unavailable, state: {state}")]
    TransportUnavailable { state: TransportState },
}

impl HttpError {
    pub fn transport_unavailable(state: TransportState) -> Self {
        Self::TransportUnavailable { state }
    }
}

/// Health of the transport owned by a client session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportState {
    /// Open and usable for the next exchange
    Healthy,
    /// Peer closed its write side
    Eof,
    /// A read, write or timeout failure happened
    Failed,
    /// No transport is open
    Closed,
}

impl TransportState {
    #[inline]
    pub fn is_healthy(&self) -> bool {
        matches!(self, TransportState::Healthy)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let str = match self {
            TransportState::Healthy => "healthy",
            TransportState::Eof => "eof",
            TransportState::Failed => "failed",
            TransportState::Closed => "closed",
        };
        f.write_str(str)
    }
}

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("invalid port: {port}")]
    InvalidPort { port: String },

    #[error("can't resolve {host}:{port}, cause: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("no address resolved for {host}:{port}")]
    NoAddress { host: String, port: u16 },

    #[error("no previous host and port to reconnect to")]
    NoTarget,

    #[error("connect timeout after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ConnectError {
    pub fn invalid_port<S: ToString>(port: S) -> Self {
        Self::InvalidPort { port: port.to_string() }
    }

    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout { timeout }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid status line: {reason}")]
    InvalidStatusLine { reason: String },

    #[error("invalid status code: {reason}")]
    InvalidStatusCode { reason: String },

    #[error("invalid http version: {0:?}")]
    InvalidVersion(Option<u8>),

    #[error("stream closed before the response head completed")]
    UnexpectedEof,

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("read timeout after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_status_line<S: ToString>(str: S) -> Self {
        Self::InvalidStatusLine { reason: str.to_string() }
    }

    pub fn invalid_status_code<S: ToString>(str: S) -> Self {
        Self::InvalidStatusCode { reason: str.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout { timeout }
    }

    /// Returns true if the error came from the transport rather than from the bytes on it.
    ///
    /// After such an error the transport offset is unknown and the connection can't be reused.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, ParseError::Io { .. } | ParseError::Timeout { .. })
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid request line: {reason}")]
    InvalidRequestLine { reason: String },

    #[error("write timeout after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_request_line<S: ToString>(str: S) -> Self {
        Self::InvalidRequestLine { reason: str.to_string() }
    }

    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout { timeout }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
