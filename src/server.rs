use crate::api::{self, AppState};
use crate::config::Config;
use crate::state::SessionCache;
use crate::upstream::hass::HassClient;
use crate::upstream::plex::PlexClient;
use crate::upstream::plex_events::{self, SessionFeed};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Connect to both upstreams, start the Plex event feed and serve until
/// Ctrl+C. Any startup failure aborts before the listener is bound.
pub async fn run(config: Config) -> Result<()> {
    let timeout = config.request_timeout();
    let plex = Arc::new(PlexClient::new(&config.plex, timeout)?);
    let hass = Arc::new(HassClient::new(&config.hass, timeout)?);

    let identity = plex
        .identity()
        .await
        .with_context(|| format!("failed to reach Plex at {}", config.plex.host))?;
    info!(
        machine = %identity.machine_identifier,
        version = %identity.version,
        "plex connection ok"
    );

    let status = hass
        .check()
        .await
        .with_context(|| format!("failed to reach Home Assistant at {}", config.hass.host))?;
    info!(status = %status, "home assistant connection ok");

    let cache = SessionCache::new();
    let notifications = plex.notifications_url()?;
    let socket = plex_events::connect(&notifications)
        .await
        .context("failed to subscribe to Plex notifications")?;
    plex_events::spawn_feed(
        SessionFeed {
            plex: plex.clone(),
            notifications,
            cache: cache.clone(),
            reconnect_delay: config.reconnect_delay(),
        },
        socket,
    );

    let app = api::router(AppState {
        cache,
        hass,
        icon: Arc::from(config.display.icon.as_str()),
    });

    let bind = format!("0.0.0.0:{}", config.server.port);
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    info!(
        address = %bind,
        device_entity = %config.hass.device_entity,
        mirror_entity = %config.hass.mirror_entity,
        "nowplaying starting"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("nowplaying server failed")?;

    info!("nowplaying stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl+C: {err}");
        std::future::pending::<()>().await;
    }
}
