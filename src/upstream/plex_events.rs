//! Plex push notifications: keeps the session cache current.

use super::plex::PlexClient;
use super::{lenient, UpstreamError};
use crate::state::SessionCache;
use futures_util::StreamExt;
use reqwest::Url;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

pub type NotificationSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "NotificationContainer")]
    container: NotificationContainer,
}

#[derive(Debug, Deserialize)]
struct NotificationContainer {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(rename = "PlaySessionStateNotification", default)]
    play_sessions: Vec<PlaySessionState>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaySessionState {
    #[serde(default, deserialize_with = "lenient::string")]
    session_key: String,
}

/// Session key carried by a "playing" notification; other messages yield `None`.
pub fn playing_session_key(text: &str) -> Option<String> {
    let envelope: Envelope = serde_json::from_str(text).ok()?;
    if envelope.container.kind != "playing" {
        return None;
    }
    envelope
        .container
        .play_sessions
        .into_iter()
        .next()
        .map(|state| state.session_key)
        .filter(|key| !key.is_empty())
}

pub async fn connect(url: &Url) -> Result<NotificationSocket, UpstreamError> {
    let (socket, _) = connect_async(url.as_str())
        .await
        .map_err(|source| UpstreamError::WebSocket {
            service: "plex",
            source: Box::new(source),
        })?;
    Ok(socket)
}

#[derive(Clone)]
pub struct SessionFeed {
    pub plex: Arc<PlexClient>,
    /// Usually `PlexClient::notifications_url`.
    pub notifications: Url,
    pub cache: SessionCache,
    pub reconnect_delay: Duration,
}

impl SessionFeed {
    /// Look up the session behind a notification and cache it.
    pub async fn ingest(&self, session_key: &str) {
        match self.plex.session(session_key).await {
            Ok(Some(session)) => {
                debug!(session_key, title = %session.title, "plex session updated");
                self.cache.record_session(session);
            }
            Ok(None) => {
                debug!(session_key, "plex session no longer listed");
            }
            Err(err) => {
                warn!(session_key, "failed to fetch plex sessions: {err}");
            }
        }
    }

    async fn drain(&self, socket: &mut NotificationSocket) {
        while let Some(message) = socket.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    if let Some(key) = playing_session_key(&text) {
                        self.ingest(&key).await;
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    warn!("plex notification socket error: {err}");
                    break;
                }
            }
        }
    }
}

/// Consume notifications on an already-open socket, reconnecting after a
/// fixed delay whenever the connection drops.
pub fn spawn_feed(feed: SessionFeed, socket: NotificationSocket) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut socket = socket;
        loop {
            feed.drain(&mut socket).await;
            warn!(
                delay_secs = feed.reconnect_delay.as_secs(),
                "plex notification socket closed, reconnecting"
            );

            socket = loop {
                tokio::time::sleep(feed.reconnect_delay).await;
                match connect(&feed.notifications).await {
                    Ok(socket) => {
                        info!("plex notification socket reconnected");
                        break socket;
                    }
                    Err(err) => warn!("plex reconnect failed: {err}"),
                }
            };
        }
    })
}
