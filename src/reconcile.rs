//! Merge the hub's view of the living room with the cached Plex session.

use crate::now_playing::{non_empty, ratio, NowPlaying, LIVE_TV_APP};
use crate::upstream::hass::{DeviceAttributes, DeviceState, MirrorAttributes, MirrorState, PlayerState};
use crate::upstream::plex::MediaSession;

/// Decide what is playing.
///
/// Precedence, first match wins:
/// 1. the streaming device is neither playing nor paused: nothing;
/// 2. the mirrored Plex player is playing: the cached Plex session when its
///    show and title agree with the mirror, otherwise the mirror's own fields;
/// 3. anything else on the device: live TV, or artist and title from the
///    device itself.
pub fn reconcile(
    device: &DeviceState,
    mirror: &MirrorState,
    cached: Option<&MediaSession>,
) -> NowPlaying {
    if !device.state.is_active() {
        return NowPlaying::nothing();
    }

    if mirror.state == PlayerState::Playing {
        let empty = MediaSession::default();
        let session = cached.unwrap_or(&empty);
        if mirror_matches(&mirror.attributes, session) {
            return NowPlaying::from_session(session);
        }
        return from_mirror(&mirror.attributes);
    }

    from_device(&device.attributes)
}

/// Pick the active Plex session the mirror is describing, if any. Used when
/// there is no event feed to remember the last session.
pub fn select_session<'a>(
    sessions: &'a [MediaSession],
    mirror: &MirrorState,
) -> Option<&'a MediaSession> {
    sessions
        .iter()
        .find(|session| mirror_matches(&mirror.attributes, session))
}

/// Absent mirror fields compare as empty strings.
fn mirror_matches(mirror: &MirrorAttributes, session: &MediaSession) -> bool {
    mirror.media_series_title.as_deref().unwrap_or("") == session.grandparent_title
        && mirror.media_title.as_deref().unwrap_or("") == session.title
}

fn from_mirror(mirror: &MirrorAttributes) -> NowPlaying {
    NowPlaying {
        progress: ratio(
            mirror.media_position.unwrap_or(0.0),
            mirror.media_duration.unwrap_or(0.0),
        ),
        show_title: mirror.media_series_title.as_deref().and_then(non_empty),
        title: mirror.media_title.clone().unwrap_or_default(),
        resolution: None,
        season: Some(mirror.media_season.unwrap_or(0)),
        episode: Some(mirror.media_episode.unwrap_or(0)),
    }
}

fn from_device(device: &DeviceAttributes) -> NowPlaying {
    if device.media_album_name.as_deref() == Some(LIVE_TV_APP) {
        return NowPlaying::live_tv();
    }

    NowPlaying {
        progress: ratio(
            device.media_position.unwrap_or(0.0),
            device.media_duration.unwrap_or(0.0),
        ),
        title: format!(
            "{} {}",
            device.media_artist.as_deref().unwrap_or(""),
            device.media_title.as_deref().unwrap_or("")
        ),
        ..NowPlaying::default()
    }
}
