use std::path::Path;
use std::sync::Mutex;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::warn;

use super::thread::{EngineCmd, spawn_audio_thread};
use super::{AudioEngine, EngineError};

/// Handle to the audio thread. Dropping it stops playback and joins the thread.
pub struct RodioEngine {
    tx: Sender<EngineCmd>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl RodioEngine {
    /// Open the default output device on a new audio thread.
    pub fn spawn() -> Result<Self, EngineError> {
        let (tx, rx) = mpsc::channel::<EngineCmd>();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let join = spawn_audio_thread(rx, ready_tx);

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                tx,
                join: Mutex::new(Some(join)),
            }),
            Ok(Err(e)) => {
                let _ = join.join();
                Err(e)
            }
            Err(_) => {
                let _ = join.join();
                Err(EngineError::Disconnected)
            }
        }
    }

    fn send(&self, cmd: EngineCmd) -> Result<(), EngineError> {
        self.tx.send(cmd).map_err(|_| EngineError::Disconnected)
    }

    fn send_or_warn(&self, cmd: EngineCmd) {
        if let Err(e) = self.send(cmd) {
            warn!(error = %e, "audio command dropped");
        }
    }

    /// Stop output and wait for the audio thread to exit. Safe to call twice.
    pub fn shutdown(&self) {
        let _ = self.send(EngineCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[async_trait]
impl AudioEngine for RodioEngine {
    async fn load_and_play(&self, path: &Path) -> Result<(), EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCmd::Load {
            path: path.to_path_buf(),
            reply,
        })?;
        rx.await.map_err(|_| EngineError::Disconnected)?
    }

    async fn resume(&self) {
        self.send_or_warn(EngineCmd::Resume);
    }

    async fn pause(&self) {
        self.send_or_warn(EngineCmd::Pause);
    }

    async fn stop(&self) {
        self.send_or_warn(EngineCmd::Stop);
    }

    async fn seek(&self, position: Duration) -> Result<(), EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCmd::Seek { position, reply })?;
        rx.await.map_err(|_| EngineError::Disconnected)?
    }

    async fn set_volume(&self, volume: f32) {
        self.send_or_warn(EngineCmd::SetVolume(volume));
    }

    async fn is_drained(&self) -> bool {
        let (reply, rx) = oneshot::channel();
        if self.send(EngineCmd::Drained { reply }).is_err() {
            return true;
        }
        rx.await.unwrap_or(true)
    }
}
