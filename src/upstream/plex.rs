//! Plex Media Server: identity check and active session lookups.

use super::{base_url, fetch_json, http_client, lenient, UpstreamError};
use crate::config::PlexConfig;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SERVICE: &str = "plex";
const TOKEN_HEADER: &str = "X-Plex-Token";

/// One active playback session as listed by `/status/sessions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSession {
    #[serde(default, deserialize_with = "lenient::string")]
    pub session_key: String,
    /// Show name for episodes.
    #[serde(default, deserialize_with = "lenient::string")]
    pub grandparent_title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    /// Milliseconds watched.
    #[serde(default, deserialize_with = "lenient::u64_or_zero")]
    pub view_offset: u64,
    /// Milliseconds total.
    #[serde(default, deserialize_with = "lenient::u64_or_zero")]
    pub duration: u64,
    /// Season number.
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub parent_index: u32,
    /// Episode number.
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub index: u32,
    #[serde(default, rename = "Media")]
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub video_resolution: Option<String>,
}

impl MediaSession {
    /// Resolution label of the first media item.
    pub fn resolution(&self) -> Option<&str> {
        self.media
            .first()
            .and_then(|item| item.video_resolution.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerIdentity {
    #[serde(default)]
    pub machine_identifier: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    media_container: T,
}

#[derive(Debug, Default, Deserialize)]
struct SessionList {
    #[serde(default, rename = "Metadata")]
    metadata: Vec<MediaSession>,
}

pub struct PlexClient {
    http: reqwest::Client,
    base: String,
    token: String,
}

impl PlexClient {
    pub fn new(config: &PlexConfig, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            http: http_client(SERVICE, timeout)?,
            base: base_url(&config.host),
            token: config.token.clone(),
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{}", self.base, path))
            .header(TOKEN_HEADER, &self.token)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Confirm the server is reachable and the token works.
    pub async fn identity(&self) -> Result<ServerIdentity, UpstreamError> {
        let envelope: Envelope<ServerIdentity> = fetch_json(SERVICE, self.get("/identity")).await?;
        Ok(envelope.media_container)
    }

    pub async fn sessions(&self) -> Result<Vec<MediaSession>, UpstreamError> {
        let envelope: Envelope<SessionList> =
            fetch_json(SERVICE, self.get("/status/sessions")).await?;
        Ok(envelope.media_container.metadata)
    }

    /// Find the active session with the given key, if it is still listed.
    pub async fn session(&self, session_key: &str) -> Result<Option<MediaSession>, UpstreamError> {
        let sessions = self.sessions().await?;
        Ok(sessions
            .into_iter()
            .find(|session| session.session_key == session_key))
    }

    /// Websocket endpoint for server push notifications.
    pub fn notifications_url(&self) -> Result<Url, UpstreamError> {
        let invalid = || UpstreamError::Url {
            service: SERVICE,
            url: self.base.clone(),
        };

        let mut url = Url::parse(&format!("{}/:/websockets/notifications", self.base))
            .map_err(|_| invalid())?;
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            "http" | "ws" => "ws",
            _ => return Err(invalid()),
        };
        url.set_scheme(scheme).map_err(|_| invalid())?;
        url.query_pairs_mut().append_pair(TOKEN_HEADER, &self.token);
        Ok(url)
    }
}
