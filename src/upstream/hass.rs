//! Home Assistant REST API: media player entity states.

use super::{base_url, fetch_json, http_client, lenient, UpstreamError};
use crate::config::HassConfig;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const SERVICE: &str = "home assistant";

/// Lifecycle state of a `media_player` entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PlayerState {
    Playing,
    Paused,
    /// `idle`, `off`, `standby`, `unavailable`, ...
    Other(String),
    #[default]
    Unknown,
}

impl From<String> for PlayerState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "playing" => PlayerState::Playing,
            "paused" => PlayerState::Paused,
            "" => PlayerState::Unknown,
            _ => PlayerState::Other(value),
        }
    }
}

impl PlayerState {
    /// Playing or paused: something is loaded on the device.
    pub fn is_active(&self) -> bool {
        matches!(self, PlayerState::Playing | PlayerState::Paused)
    }

    pub fn as_str(&self) -> &str {
        match self {
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::Other(state) => state,
            PlayerState::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntityState<A> {
    #[serde(default)]
    pub entity_id: String,
    #[serde(default)]
    pub state: PlayerState,
    #[serde(default)]
    pub attributes: A,
}

/// Attributes of the streaming device (the Apple TV player itself).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeviceAttributes {
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub media_album_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub media_artist: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub media_title: Option<String>,
    /// Seconds.
    #[serde(default, deserialize_with = "lenient::optional_f64")]
    pub media_position: Option<f64>,
    /// Seconds.
    #[serde(default, deserialize_with = "lenient::optional_f64")]
    pub media_duration: Option<f64>,
}

/// Attributes of the Plex client entity mirrored into Home Assistant.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MirrorAttributes {
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub media_series_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub media_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_u32")]
    pub media_season: Option<u32>,
    #[serde(default, deserialize_with = "lenient::optional_u32")]
    pub media_episode: Option<u32>,
    #[serde(default, deserialize_with = "lenient::optional_f64")]
    pub media_position: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_f64")]
    pub media_duration: Option<f64>,
}

pub type DeviceState = EntityState<DeviceAttributes>;
pub type MirrorState = EntityState<MirrorAttributes>;

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

pub struct HassClient {
    http: reqwest::Client,
    base: String,
    token: String,
    device_entity: String,
    mirror_entity: String,
}

impl HassClient {
    pub fn new(config: &HassConfig, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            http: http_client(SERVICE, timeout)?,
            base: base_url(&config.host),
            token: config.token.clone(),
            device_entity: config.device_entity.clone(),
            mirror_entity: config.mirror_entity.clone(),
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{}", self.base, path))
            .bearer_auth(&self.token)
    }

    /// Hit `/api/` to confirm the hub is up and the token is accepted.
    pub async fn check(&self) -> Result<String, UpstreamError> {
        let status: ApiStatus = fetch_json(SERVICE, self.get("/api/")).await?;
        Ok(status.message)
    }

    pub async fn entity_state<A>(&self, entity_id: &str) -> Result<EntityState<A>, UpstreamError>
    where
        A: DeserializeOwned + Default,
    {
        fetch_json(SERVICE, self.get(&format!("/api/states/{entity_id}"))).await
    }

    pub async fn device_state(&self) -> Result<DeviceState, UpstreamError> {
        self.entity_state(&self.device_entity).await
    }

    pub async fn mirror_state(&self) -> Result<MirrorState, UpstreamError> {
        self.entity_state(&self.mirror_entity).await
    }

    pub fn device_entity(&self) -> &str {
        &self.device_entity
    }

    pub fn mirror_entity(&self) -> &str {
        &self.mirror_entity
    }
}
