//! Remote scrobbling contract used by the transport.
//!
//! Only the "now playing" announcement is driven from here. It is best-effort:
//! the transport logs failures and playback never waits on the service.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::library::Track;
use crate::secrets::SecretStore;

/// Secret-store key holding the scrobbling session key.
pub const SESSION_KEY: &str = "lastfm.session_key";
/// Secret-store key holding the account name the session belongs to.
pub const SESSION_USER: &str = "lastfm.username";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub key: String,
    pub username: Option<String>,
}

/// Payload of a now-playing announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub artist: String,
    pub track: String,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub track_number: Option<u32>,
    pub duration_secs: Option<u64>,
}

impl From<&Track> for NowPlaying {
    fn from(track: &Track) -> Self {
        Self {
            artist: track.artist.clone().unwrap_or_default(),
            track: track.title.clone(),
            album: track.album.clone(),
            album_artist: track.album_artist.clone(),
            track_number: track.track_number,
            duration_secs: track.duration.map(|d| d.as_secs()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("not authenticated with the scrobbling service")]
    NotAuthenticated,
    #[error("scrobbling request failed: {0}")]
    Request(String),
}

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Whether the user linked an account. Cheap; checked before every announcement.
    fn is_connected(&self) -> bool;

    /// Cached or freshly obtained credentials. Failures yield `None`.
    async fn session(&self) -> Option<Session>;

    async fn update_now_playing(
        &self,
        now_playing: &NowPlaying,
        session: &Session,
    ) -> Result<(), ProviderError>;
}

/// Provider for when no account is linked.
#[derive(Debug, Default, Clone, Copy)]
pub struct Offline;

#[async_trait]
impl MetadataProvider for Offline {
    fn is_connected(&self) -> bool {
        false
    }

    async fn session(&self) -> Option<Session> {
        None
    }

    async fn update_now_playing(
        &self,
        _now_playing: &NowPlaying,
        _session: &Session,
    ) -> Result<(), ProviderError> {
        Err(ProviderError::NotAuthenticated)
    }
}

/// Session lookup shared by provider implementations: the first successful
/// read from the secret store is kept until `invalidate`.
pub struct SessionCache {
    store: Arc<dyn SecretStore>,
    cached: Mutex<Option<Session>>,
}

impl SessionCache {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            store,
            cached: Mutex::new(None),
        }
    }

    pub fn get(&self) -> Option<Session> {
        if let Ok(cached) = self.cached.lock() {
            if let Some(session) = cached.as_ref() {
                return Some(session.clone());
            }
        }

        let key = match self.store.get(SESSION_KEY) {
            Ok(Some(key)) if !key.trim().is_empty() => key,
            Ok(_) => {
                debug!("no scrobbling session stored");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "could not read scrobbling session");
                return None;
            }
        };
        let username = self.store.get(SESSION_USER).ok().flatten();

        let session = Session { key, username };
        if let Ok(mut cached) = self.cached.lock() {
            *cached = Some(session.clone());
        }
        Some(session)
    }

    /// Store a new session (after the user linked an account) and cache it.
    pub fn store(&self, session: Session) -> Result<(), crate::secrets::SecretError> {
        self.store.insert(SESSION_KEY, &session.key)?;
        match session.username.as_deref() {
            Some(user) => self.store.insert(SESSION_USER, user)?,
            None => self.store.remove(SESSION_USER)?,
        }
        if let Ok(mut cached) = self.cached.lock() {
            *cached = Some(session);
        }
        Ok(())
    }

    /// Forget the cached session; the next `get` reads the store again.
    pub fn invalidate(&self) {
        if let Ok(mut cached) = self.cached.lock() {
            *cached = None;
        }
    }
}
