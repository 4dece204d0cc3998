//! Audio engine contract and the `rodio`-backed implementation.
//!
//! The transport only ever talks to `dyn AudioEngine`. `RodioEngine` runs the
//! actual output on a dedicated thread and answers over channels, so no
//! `rodio` object is shared across threads.

mod player;
mod sink;
mod thread;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

pub use player::RodioEngine;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("could not open {}: {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not decode {}: {}", .path.display(), .reason)]
    Decode { path: PathBuf, reason: String },
    #[error("seek failed: {0}")]
    Seek(String),
    #[error("audio output unavailable: {0}")]
    Device(String),
    #[error("audio thread is not running")]
    Disconnected,
}

#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Replace whatever is loaded with `path` and start it. On error nothing changes.
    async fn load_and_play(&self, path: &Path) -> Result<(), EngineError>;
    async fn resume(&self);
    async fn pause(&self);
    /// Halt output and rewind. A later `resume` starts the track over.
    async fn stop(&self);
    async fn seek(&self, position: Duration) -> Result<(), EngineError>;
    /// Linear gain, 0.0 ..= 1.0.
    async fn set_volume(&self, volume: f32);
    /// True when nothing is left to play (track finished or nothing loaded).
    async fn is_drained(&self) -> bool;
}

#[cfg(test)]
mod tests;
