use crate::config;
use crate::library::Track;
use crate::transport::{PlaybackModes, Transport};

pub fn playback_modes(settings: &config::Settings) -> PlaybackModes {
    PlaybackModes {
        loop_track: settings.playback.loop_track,
        loop_queue: settings.playback.loop_queue,
        shuffle: settings.playback.shuffle,
    }
}

/// Queue the whole library and apply the configured volume. Nothing starts playing.
pub async fn apply_playback_defaults(
    transport: &mut Transport,
    tracks: Vec<Track>,
    settings: &config::Settings,
) {
    transport.set_queue(tracks, 0);
    transport.set_volume(settings.audio.volume).await;
}
