use crate::now_playing::NowPlaying;
use crate::upstream::plex::MediaSession;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct CacheData {
    now_playing: NowPlaying,
    session: Option<MediaSession>,
    updated_at: Option<DateTime<Utc>>,
}

/// What `/api/now-playing` reports.
#[derive(Debug, Clone, Serialize)]
pub struct CachedStatus {
    pub text: String,
    pub now_playing: NowPlaying,
    pub session_key: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Latest reconciled status plus the last Plex session seen on the event
/// feed. Every write replaces the previous value.
#[derive(Clone, Default)]
pub struct SessionCache {
    inner: Arc<RwLock<CacheData>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheData> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheData> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn now_playing(&self) -> NowPlaying {
        self.read().now_playing.clone()
    }

    pub fn session(&self) -> Option<MediaSession> {
        self.read().session.clone()
    }

    pub fn set_now_playing(&self, now_playing: NowPlaying) {
        let mut inner = self.write();
        inner.now_playing = now_playing;
        inner.updated_at = Some(Utc::now());
    }

    /// Store a session from the event feed. The reconciled status is left
    /// alone; only a status request replaces it.
    pub fn record_session(&self, session: MediaSession) {
        let mut inner = self.write();
        inner.session = Some(session);
        inner.updated_at = Some(Utc::now());
    }

    pub fn snapshot(&self) -> CachedStatus {
        let inner = self.read();
        CachedStatus {
            text: inner.now_playing.render(),
            now_playing: inner.now_playing.clone(),
            session_key: inner
                .session
                .as_ref()
                .map(|session| session.session_key.clone()),
            updated_at: inner.updated_at,
        }
    }
}
