//! HTTP client session handling
//!
//! This module drives request/response exchanges over a single transport.
//!
//! # Components
//!
//! - [`HttpClient`]: the session, which
//!   - opens and closes the transport through a [`Connector`]
//!   - writes requests and parses response heads under the configured timeouts
//!   - tracks transport health and refuses to send on an unhealthy transport
//!   - runs complete exchanges with [`HttpClient::do_request`]
//! - [`ClientConfig`]: timeouts, persistence and buffer sizes
//! - [`RequestWriter`]: buffered request serialization onto any `AsyncWrite`

mod config;
mod connector;
mod http_client;
mod request_writer;

pub use config::ClientConfig;
pub use config::ClientConfigBuilder;
pub use config::ConfigBuildError;
pub use config::DEFAULT_TIMEOUT;
pub use connector::Connector;
pub use connector::LocalConnector;
pub use connector::TcpConnector;
pub use http_client::Exchange;
pub use http_client::HttpClient;
pub use http_client::SessionBody;
pub use request_writer::RequestWriter;
