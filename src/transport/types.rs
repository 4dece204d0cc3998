//! Small shared types of the transport: playback state and its handle.

use std::sync::{Arc, Mutex};

use crate::library::Track;

/// Coarse view of where the transport is, derived from `PlaybackState`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportStatus {
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Default)]
/// Playback information shared with the UI.
pub struct PlaybackState {
    /// Track loaded into the engine, if any.
    pub current: Option<Track>,
    /// Whether the engine is actively advancing.
    pub playing: bool,
    /// Seconds into the current track, driven by the ticker.
    pub progress_secs: u64,
    /// Unix time (seconds) of the last successful load.
    pub started_at: Option<u64>,
    /// Set by an explicit stop, cleared when playback begins again.
    pub stopped: bool,
}

impl PlaybackState {
    pub fn status(&self) -> TransportStatus {
        if self.playing {
            TransportStatus::Playing
        } else if self.current.is_none() || self.stopped {
            TransportStatus::Stopped
        } else {
            TransportStatus::Paused
        }
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackState>>;
