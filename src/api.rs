use crate::notification::Notification;
use crate::now_playing::NowPlaying;
use crate::reconcile::reconcile;
use crate::state::{CachedStatus, SessionCache};
use crate::upstream::hass::{DeviceState, HassClient, MirrorState};
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct AppState {
    pub cache: SessionCache,
    pub hass: Arc<HassClient>,
    pub icon: Arc<str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(now_playing_frame))
        .route("/health", get(health))
        .route("/api/now-playing", get(cached_now_playing))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// The LaMetric polling endpoint. Always answers 200.
async fn now_playing_frame(State(state): State<AppState>) -> Response {
    let now_playing = refresh(&state.hass, &state.cache).await;
    let payload = Notification::single(now_playing.render(), state.icon.as_ref());
    (
        [(header::CONTENT_TYPE, "application/json")],
        payload.to_json_bytes(),
    )
        .into_response()
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

async fn cached_now_playing(State(state): State<AppState>) -> Json<CachedStatus> {
    Json(state.cache.snapshot())
}

/// Fetch both hub entities concurrently. A failed lookup is logged and
/// reported as an absent snapshot.
pub async fn hub_snapshot(hass: &HassClient) -> (DeviceState, MirrorState) {
    let (device, mirror) = tokio::join!(hass.device_state(), hass.mirror_state());

    let device = device.unwrap_or_else(|err| {
        warn!(entity = hass.device_entity(), "device lookup failed: {err}");
        DeviceState::default()
    });
    let mirror = mirror.unwrap_or_else(|err| {
        warn!(entity = hass.mirror_entity(), "mirror lookup failed: {err}");
        MirrorState::default()
    });
    (device, mirror)
}

/// Pull both hub entities, reconcile against the cached Plex session and
/// store the result.
pub async fn refresh(hass: &HassClient, cache: &SessionCache) -> NowPlaying {
    let (device, mirror) = hub_snapshot(hass).await;

    let cached = cache.session();
    let now_playing = reconcile(&device, &mirror, cached.as_ref());
    debug!(
        device = device.state.as_str(),
        mirror = mirror.state.as_str(),
        cached_session = cached.as_ref().map(|s| s.session_key.as_str()),
        text = %now_playing,
        "reconciled"
    );

    cache.set_now_playing(now_playing.clone());
    now_playing
}
