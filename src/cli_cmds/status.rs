use anyhow::{bail, Result};
use tracing::warn;

use crate::api;
use crate::config::Config;
use crate::reconcile::{reconcile, select_session};
use crate::upstream::hass::HassClient;
use crate::upstream::plex::PlexClient;
use crate::upstream::plex_events;

/// One-shot status: the Plex session list stands in for the event feed.
pub async fn cmd_status(config: &Config) -> Result<()> {
    let timeout = config.request_timeout();
    let plex = PlexClient::new(&config.plex, timeout)?;
    let hass = HassClient::new(&config.hass, timeout)?;

    let ((device, mirror), sessions) = tokio::join!(api::hub_snapshot(&hass), plex.sessions());
    let sessions = sessions.unwrap_or_else(|err| {
        warn!("failed to fetch plex sessions: {err}");
        Vec::new()
    });

    let session = select_session(&sessions, &mirror);
    let now_playing = reconcile(&device, &mirror, session);
    println!("{}", now_playing.render());
    Ok(())
}

pub async fn cmd_check(config: &Config) -> Result<()> {
    let timeout = config.request_timeout();
    let plex = PlexClient::new(&config.plex, timeout)?;
    let hass = HassClient::new(&config.hass, timeout)?;
    let mut failures = 0;

    match plex.identity().await {
        Ok(identity) => println!(
            "✓ Plex {} (server {}, version {})",
            config.plex.host, identity.machine_identifier, identity.version
        ),
        Err(err) => {
            println!("✗ Plex: {err}");
            failures += 1;
        }
    }

    let subscribed = match plex.notifications_url() {
        Ok(url) => plex_events::connect(&url).await,
        Err(err) => Err(err),
    };
    match subscribed {
        Ok(mut socket) => {
            if let Err(err) = socket.close(None).await {
                warn!("failed to close plex notification socket: {err}");
            }
            println!("✓ Plex notifications");
        }
        Err(err) => {
            println!("✗ Plex notifications: {err}");
            failures += 1;
        }
    }

    match hass.check().await {
        Ok(message) => println!("✓ Home Assistant {} ({message})", config.hass.host),
        Err(err) => {
            println!("✗ Home Assistant: {err}");
            failures += 1;
        }
    }

    match hass.device_state().await {
        Ok(state) => println!("✓ {} is {}", hass.device_entity(), state.state.as_str()),
        Err(err) => {
            println!("✗ {}: {err}", hass.device_entity());
            failures += 1;
        }
    }

    match hass.mirror_state().await {
        Ok(state) => println!("✓ {} is {}", hass.mirror_entity(), state.state.as_str()),
        Err(err) => {
            println!("✗ {}: {err}", hass.mirror_entity());
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{failures} check(s) failed");
    }
    Ok(())
}
