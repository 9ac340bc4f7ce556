//! Clients for the two status sources: Plex and Home Assistant.

pub mod hass;
pub mod lenient;
pub mod plex;
pub mod plex_events;

use serde::de::DeserializeOwned;
use std::time::Duration;

/// Failure talking to an upstream service.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} returned HTTP {status} for {url}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("{service} response could not be decoded: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid {service} URL `{url}`")]
    Url { service: &'static str, url: String },
    #[error("{service} notification socket failed: {source}")]
    WebSocket {
        service: &'static str,
        #[source]
        source: Box<tokio_tungstenite::tungstenite::Error>,
    },
}

/// Shared HTTP client with a bounded per-request timeout.
pub(crate) fn http_client(
    service: &'static str,
    timeout: Duration,
) -> Result<reqwest::Client, UpstreamError> {
    reqwest::Client::builder()
        .user_agent(format!("nowplaying/{}", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .map_err(|source| UpstreamError::Transport { service, source })
}

/// Send a request, require a 2xx status and decode the JSON body.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, UpstreamError> {
    let response = request
        .send()
        .await
        .map_err(|source| UpstreamError::Transport { service, source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status {
            service,
            status,
            url: response.url().to_string(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|source| UpstreamError::Decode { service, source })
}

/// Strip trailing slashes so paths can be appended with `format!`.
pub(crate) fn base_url(host: &str) -> String {
    host.trim().trim_end_matches('/').to_string()
}
