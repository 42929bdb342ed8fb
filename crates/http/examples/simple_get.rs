use std::env;

use http::HeaderValue;
use http::header::{ACCEPT, HOST};
use micro_http_client::connection::{ClientConfig, HttpClient};
use micro_http_client::protocol::{Request, Response};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Fetches a path twice over one keep-alive connection.
///
/// usage: `cargo run --example simple_get -- 127.0.0.1 8080 /`
#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut args = env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".to_owned());
    let port = args.next().unwrap_or_else(|| "8080".to_owned());
    let target = args.next().unwrap_or_else(|| "/".to_owned());

    let config = ClientConfig::builder().keep_alive(true).build().expect("default timeouts are valid");
    let mut client = match HttpClient::open(&host, &port, config).await {
        Ok(client) => client,
        Err(e) => {
            error!(cause = %e, "connect error");
            return;
        }
    };

    let mut request = Request::get(target.as_str());
    request.set_persistent(true);
    if let Ok(value) = HeaderValue::from_str(&format!("{host}:{port}")) {
        request.set_header(HOST, value);
    }
    request.set_header(ACCEPT, HeaderValue::from_static("*/*"));

    let mut response = Response::new();
    for round in 1..=2 {
        if let Err(e) = client.send_request(&request, &mut response).await {
            error!(round, cause = %e, "request failed");
            return;
        }

        let status = response.status().map(ToString::to_string).unwrap_or_default();
        info!(round, status = %status, content_length = response.content_length(), "receive response head");

        match client.read_body(&response).await {
            Ok(body) => info!(round, body = %String::from_utf8_lossy(&body), "receive response body"),
            Err(e) => {
                error!(round, cause = %e, "read body failed");
                return;
            }
        }

        if !response.keep_alive() {
            warn!("server closes the connection, stop");
            break;
        }
    }

    client.disconnect().await;
}
