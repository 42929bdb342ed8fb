//! An asynchronous micro HTTP/1.x client implementation
//!
//! This crate provides the client-side framing layer of HTTP/1.x built on top of tokio:
//! it serializes requests with authoritative framing headers, parses response heads
//! within fixed limits, and exposes each response body as a stream bounded to exactly its
//! declared `Content-Length`, so a connection stays reusable whatever the caller reads.
//!
//! # Features
//!
//! - Request building with computed `Content-Length` and synthesized `Connection` headers
//! - Response head parsing with header count and size limits
//! - Bounded body streams implementing `futures::Stream` and `http_body::Body`
//! - Keep-alive sessions that drain unread bodies between exchanges
//! - Connect, read and write timeouts
//!
//! # Example
//!
//! ```no_run
//! use micro_http_client::connection::{ClientConfig, Exchange, HttpClient};
//! use tracing::{Level, error, info};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     let config = ClientConfig::builder().keep_alive(true).build().expect("valid config");
//!     let mut client = match HttpClient::open("127.0.0.1", "8080", config).await {
//!         Ok(client) => client,
//!         Err(e) => {
//!             error!(cause = %e, "connect error");
//!             return;
//!         }
//!     };
//!
//!     let exchange = client
//!         .do_request(
//!             |request| {
//!                 request.request_line_mut().set_target("/");
//!                 true
//!             },
//!             async |response, body| {
//!                 info!(status = ?response.status_code(), "receive response");
//!                 match body.collect_bytes().await {
//!                     Ok(bytes) => info!(size = bytes.len(), "receive body"),
//!                     Err(e) => error!(cause = %e, "read body error"),
//!                 }
//!                 true
//!             },
//!         )
//!         .await;
//!
//!     match exchange {
//!         Ok(Exchange::Processed { keep_alive }) => info!(keep_alive, "exchange finished"),
//!         Ok(other) => info!(?other, "exchange not processed"),
//!         Err(e) => error!(cause = %e, "exchange failed"),
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`connection`]: Client session, configuration and transport establishment
//! - [`protocol`]: Request/response types, bounded body streams and errors
//! - [`codec`]: Protocol encoding/decoding implementation
//!
//! # Error Handling
//!
//! - [`protocol::HttpError`]: Top-level error type
//! - [`protocol::ConnectError`]: Transport establishment errors
//! - [`protocol::ParseError`]: Response parsing errors
//! - [`protocol::SendError`]: Request sending errors
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 only
//! - Only `Content-Length` framing, no chunked transfer encoding
//! - No pipelining, one exchange at a time per session
//! - No TLS support
//! - Maximum response head size: 8KB
//! - Maximum number of response headers: 64

pub mod codec;
pub mod connection;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
