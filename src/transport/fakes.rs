//! In-memory collaborators for transport tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::engine::{AudioEngine, EngineError};
use crate::notify::{Notification, NotificationSink};
use crate::scrobble::{MetadataProvider, NowPlaying, ProviderError, Session};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(PathBuf),
    Resume,
    Pause,
    Stop,
    Seek(Duration),
    Volume(f32),
}

#[derive(Default)]
pub struct FakeEngine {
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<PathBuf>>,
    drained: AtomicBool,
    fail_seek: AtomicBool,
}

impl FakeEngine {
    pub fn fail_on(&self, path: impl Into<PathBuf>) {
        self.failing.lock().unwrap().insert(path.into());
    }

    pub fn fail_seeks(&self) {
        self.fail_seek.store(true, Ordering::SeqCst);
    }

    pub fn set_drained(&self, drained: bool) {
        self.drained.store(drained, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn loads(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Load(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AudioEngine for FakeEngine {
    async fn load_and_play(&self, path: &Path) -> Result<(), EngineError> {
        if self.failing.lock().unwrap().contains(path) {
            return Err(EngineError::Decode {
                path: path.to_path_buf(),
                reason: "unsupported format".into(),
            });
        }
        self.record(Call::Load(path.to_path_buf()));
        // A fresh load has something to play again.
        self.set_drained(false);
        Ok(())
    }

    async fn resume(&self) {
        self.record(Call::Resume);
    }

    async fn pause(&self) {
        self.record(Call::Pause);
    }

    async fn stop(&self) {
        self.record(Call::Stop);
    }

    async fn seek(&self, position: Duration) -> Result<(), EngineError> {
        if self.fail_seek.load(Ordering::SeqCst) {
            return Err(EngineError::Seek("not seekable".into()));
        }
        self.record(Call::Seek(position));
        Ok(())
    }

    async fn set_volume(&self, volume: f32) {
        self.record(Call::Volume(volume));
    }

    async fn is_drained(&self) -> bool {
        self.drained.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingSink {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn seen(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
pub struct FakeProvider {
    pub connected: bool,
    pub session: Option<Session>,
    pub fail: bool,
    pub announced: Mutex<Vec<NowPlaying>>,
}

impl FakeProvider {
    pub fn connected() -> Self {
        Self {
            connected: true,
            session: Some(Session {
                key: "k".into(),
                username: Some("listener".into()),
            }),
            ..Self::default()
        }
    }

    pub fn announced(&self) -> Vec<NowPlaying> {
        self.announced.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataProvider for FakeProvider {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn session(&self) -> Option<Session> {
        self.session.clone()
    }

    async fn update_now_playing(
        &self,
        now_playing: &NowPlaying,
        _session: &Session,
    ) -> Result<(), ProviderError> {
        self.announced.lock().unwrap().push(now_playing.clone());
        if self.fail {
            Err(ProviderError::Request("503".into()))
        } else {
            Ok(())
        }
    }
}
