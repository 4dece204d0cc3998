//! Playback transport: the queue, the modes and the engine, driven together.
//!
//! `Transport` is owned by one task and mutated through `&mut self`, so two
//! `play` calls can never interleave. Observers read the shared
//! `PlaybackHandle`; the only other writer is the ticker task, which adds one
//! second of progress per tick while playing.

mod queue;
mod types;

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::engine::{AudioEngine, EngineError};
use crate::library::Track;
use crate::notify::{Notification, NotificationSink};
use crate::scrobble::{MetadataProvider, NowPlaying};

pub use queue::{PlaybackModes, Queue};
pub use types::{PlaybackHandle, PlaybackState, TransportStatus};

const DEFAULT_TICK: Duration = Duration::from_secs(1);
const DEFAULT_ERROR_DISMISS: Duration = Duration::from_secs(5);

pub struct Transport {
    engine: Arc<dyn AudioEngine>,
    metadata: Arc<dyn MetadataProvider>,
    notifier: Arc<dyn NotificationSink>,
    state: PlaybackHandle,
    queue: Queue,
    modes: PlaybackModes,
    volume: u8,
    ticker: Option<JoinHandle<()>>,
    tick_interval: Duration,
    error_dismiss: Duration,
    rng: StdRng,
}

impl Transport {
    pub fn new(
        engine: Arc<dyn AudioEngine>,
        metadata: Arc<dyn MetadataProvider>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            engine,
            metadata,
            notifier,
            state: PlaybackHandle::default(),
            queue: Queue::default(),
            modes: PlaybackModes::default(),
            volume: 100,
            ticker: None,
            tick_interval: DEFAULT_TICK,
            error_dismiss: DEFAULT_ERROR_DISMISS,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        // interval() panics on a zero period.
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_error_dismiss(mut self, dismiss: Duration) -> Self {
        self.error_dismiss = dismiss;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_modes(mut self, modes: PlaybackModes) -> Self {
        self.modes = modes;
        self
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.state.clone()
    }

    /// Copy of the shared state. A poisoned lock reads as the default state.
    pub fn snapshot(&self) -> PlaybackState {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn modes(&self) -> PlaybackModes {
        self.modes
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().map(|s| s.playing).unwrap_or(false)
    }

    /// Whether a ticker task is alive.
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Load `track` unless it is already the current one, then make sure it plays.
    pub async fn play(&mut self, track: &Track) -> Result<(), EngineError> {
        self.start(track, false).await
    }

    pub async fn toggle_playback(&mut self) {
        let (loaded, playing) = self
            .state
            .lock()
            .map(|s| (s.current.is_some(), s.playing))
            .unwrap_or((false, false));
        if !loaded {
            trace!("toggle ignored, nothing loaded");
            return;
        }
        if playing {
            self.pause_playback().await;
        } else {
            self.begin_playback().await;
        }
    }

    pub async fn begin_playback(&mut self) {
        if self.is_playing() {
            return;
        }
        self.cancel_ticker();
        self.engine.resume().await;
        self.ticker = Some(self.spawn_ticker());
        self.update(|s| {
            // The engine rewinds on stop.
            if s.stopped {
                s.progress_secs = 0;
            }
            s.playing = true;
            s.stopped = false;
        });
    }

    pub async fn pause_playback(&mut self) {
        self.engine.pause().await;
        self.cancel_ticker();
        self.update(|s| s.playing = false);
    }

    /// Halt output. The current track and its progress are kept for display
    /// until playback begins again, which starts the track over.
    pub async fn stop_playback(&mut self) {
        self.engine.stop().await;
        self.cancel_ticker();
        self.update(|s| {
            s.playing = false;
            s.stopped = true;
        });
    }

    pub fn set_queue(&mut self, tracks: Vec<Track>, offset: usize) {
        debug!(len = tracks.len(), offset, "queue replaced");
        self.queue.replace(tracks, offset);
    }

    pub fn insert_into_queue(&mut self, tracks: Vec<Track>) {
        self.queue.insert_after_cursor(tracks);
    }

    pub fn add_to_queue(&mut self, tracks: Vec<Track>) {
        self.queue.append(tracks);
    }

    /// Move to the next track per the current modes and play it.
    ///
    /// Returns `Ok(false)` when the cursor lands on no track; playback state is
    /// left alone in that case.
    pub async fn attempt_play_next(&mut self) -> Result<bool, EngineError> {
        self.advance(false).await
    }

    pub async fn attempt_play_previous(&mut self) -> Result<bool, EngineError> {
        self.queue.step_back();
        self.play_at_cursor(false).await
    }

    pub async fn jump_to_song(&mut self, index: usize) -> Result<bool, EngineError> {
        self.queue.set_cursor(index);
        self.play_at_cursor(false).await
    }

    pub fn toggle_loop_mode(&mut self) -> bool {
        self.modes.loop_track = !self.modes.loop_track;
        self.modes.loop_track
    }

    pub fn toggle_loop_queue_mode(&mut self) -> bool {
        self.modes.loop_queue = !self.modes.loop_queue;
        self.modes.loop_queue
    }

    pub fn toggle_shuffle_mode(&mut self) -> bool {
        self.modes.shuffle = !self.modes.shuffle;
        self.modes.shuffle
    }

    /// Jump to an absolute position in the current track.
    pub async fn seek(&mut self, seconds: u64) -> Result<(), EngineError> {
        let loaded = self
            .state
            .lock()
            .map(|s| s.current.is_some())
            .unwrap_or(false);
        if !loaded {
            trace!("seek ignored, nothing loaded");
            return Ok(());
        }
        if let Err(e) = self.engine.seek(Duration::from_secs(seconds)).await {
            warn!(seconds, error = %e, "seek failed");
            return Err(e);
        }
        self.update(|s| s.progress_secs = seconds);
        self.restart_ticker();
        Ok(())
    }

    pub async fn seek_by(&mut self, delta_secs: i64) -> Result<(), EngineError> {
        let progress = self.snapshot().progress_secs;
        let target = if delta_secs < 0 {
            progress.saturating_sub(delta_secs.unsigned_abs())
        } else {
            progress.saturating_add(delta_secs.unsigned_abs())
        };
        self.seek(target).await
    }

    pub async fn set_volume(&mut self, percent: u8) {
        self.volume = percent.min(100);
        self.engine.set_volume(f32::from(self.volume) / 100.0).await;
    }

    /// Poll hook for the front end: moves on once the engine ran dry.
    ///
    /// Reaching the end of the queue stops playback. Returns whether a new
    /// track was requested.
    pub async fn advance_if_finished(&mut self) -> Result<bool, EngineError> {
        if !self.is_playing() || !self.engine.is_drained().await {
            return Ok(false);
        }
        debug!("track finished");
        // The old output is gone, so even a track sharing its file must be reloaded.
        let started = self.advance(true).await?;
        if !started {
            info!("end of queue");
            self.stop_playback().await;
        }
        Ok(started)
    }

    async fn advance(&mut self, reload: bool) -> Result<bool, EngineError> {
        let replay = self.queue.advance(self.modes, &mut self.rng);
        self.play_at_cursor(reload || replay).await
    }

    async fn play_at_cursor(&mut self, reload: bool) -> Result<bool, EngineError> {
        let Some(track) = self.queue.current().cloned() else {
            debug!(cursor = self.queue.cursor(), "no track at cursor");
            return Ok(false);
        };
        self.start(&track, reload).await?;
        Ok(true)
    }

    async fn start(&mut self, track: &Track, reload: bool) -> Result<(), EngineError> {
        if !track.has_file() {
            debug!(title = %track.title, "track has no file");
            return Ok(());
        }

        let loaded = self
            .state
            .lock()
            .map(|s| s.current.as_ref().is_some_and(|c| c.same_file(track)))
            .unwrap_or(false);

        if reload || !loaded {
            if let Err(e) = self.engine.load_and_play(&track.path).await {
                warn!(path = %track.path.display(), error = %e, "could not start track");
                self.notifier.notify(Notification::error(
                    format!("Could not play {}: {e}", track.title),
                    self.error_dismiss,
                ));
                return Err(e);
            }
            let now = unix_now();
            self.update(|s| {
                s.current = Some(track.clone());
                s.progress_secs = 0;
                s.started_at = Some(now);
            });
            self.restart_ticker();
            info!(title = %track.title, path = %track.path.display(), "now playing");
            self.announce(track);
        }

        self.begin_playback().await;
        Ok(())
    }

    fn announce(&self, track: &Track) {
        if !self.metadata.is_connected() {
            return;
        }
        let provider = Arc::clone(&self.metadata);
        let now_playing = NowPlaying::from(track);
        tokio::spawn(async move {
            let Some(session) = provider.session().await else {
                debug!("no scrobbling session, skipping now-playing");
                return;
            };
            match provider.update_now_playing(&now_playing, &session).await {
                Ok(()) => debug!(track = %now_playing.track, "now-playing sent"),
                Err(e) => warn!(track = %now_playing.track, error = %e, "now-playing failed"),
            }
        });
    }

    fn spawn_ticker(&self) -> JoinHandle<()> {
        let state = self.state.clone();
        let period = self.tick_interval;
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if let Ok(mut s) = state.lock() {
                    s.progress_secs = s.progress_secs.saturating_add(1);
                }
            }
        })
    }

    /// Re-phase the ticker after progress was set while playing, so the next
    /// tick lands one full interval later.
    fn restart_ticker(&mut self) {
        if !self.is_playing() {
            return;
        }
        self.cancel_ticker();
        self.ticker = Some(self.spawn_ticker());
    }

    fn cancel_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    fn update(&self, f: impl FnOnce(&mut PlaybackState)) {
        if let Ok(mut s) = self.state.lock() {
            f(&mut s);
        }
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod fakes;
