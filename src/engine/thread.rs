use std::path::PathBuf;
use std::sync::mpsc::{Receiver, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{OutputStreamBuilder, Sink};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::EngineError;
use super::sink::create_sink;

#[derive(Debug)]
pub(super) enum EngineCmd {
    /// Replace the current sink with one playing `path`.
    Load {
        path: PathBuf,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    Resume,
    Pause,
    Stop,
    Seek {
        position: Duration,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    SetVolume(f32),
    Drained {
        reply: oneshot::Sender<bool>,
    },
    /// Stop output and leave the thread.
    Quit,
}

/// Start the audio thread. `ready` receives exactly one message: whether the
/// output device could be opened.
pub(super) fn spawn_audio_thread(
    rx: Receiver<EngineCmd>,
    ready: SyncSender<Result<(), EngineError>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                let _ = ready.send(Err(EngineError::Device(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped, which would land on the TUI.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));
        info!("audio output opened");

        let mut sink: Option<Sink> = None;
        let mut volume: f32 = 1.0;

        while let Ok(cmd) = rx.recv() {
            match cmd {
                EngineCmd::Load { path, reply } => {
                    let result = create_sink(&stream, &path).map(|new_sink| {
                        new_sink.set_volume(volume);
                        if let Some(old) = sink.take() {
                            old.stop();
                        }
                        new_sink.play();
                        sink = Some(new_sink);
                    });
                    match &result {
                        Ok(()) => debug!(path = %path.display(), "loaded"),
                        Err(e) => warn!(error = %e, "load failed"),
                    }
                    let _ = reply.send(result);
                }
                EngineCmd::Resume => {
                    if let Some(s) = sink.as_ref() {
                        s.play();
                    }
                }
                EngineCmd::Pause => {
                    if let Some(s) = sink.as_ref() {
                        s.pause();
                    }
                }
                EngineCmd::Stop => {
                    // Keep the sink so a later Resume starts the track over.
                    if let Some(s) = sink.as_ref() {
                        s.pause();
                        if let Err(e) = s.try_seek(Duration::ZERO) {
                            debug!(error = %e, "rewind on stop failed");
                        }
                    }
                }
                EngineCmd::Seek { position, reply } => {
                    let result = match sink.as_ref() {
                        Some(s) => s
                            .try_seek(position)
                            .map_err(|e| EngineError::Seek(e.to_string())),
                        None => Err(EngineError::Seek("nothing loaded".to_string())),
                    };
                    let _ = reply.send(result);
                }
                EngineCmd::SetVolume(v) => {
                    volume = v.clamp(0.0, 1.0);
                    if let Some(s) = sink.as_ref() {
                        s.set_volume(volume);
                    }
                }
                EngineCmd::Drained { reply } => {
                    let _ = reply.send(sink.as_ref().map(Sink::empty).unwrap_or(true));
                }
                EngineCmd::Quit => {
                    if let Some(s) = sink.take() {
                        s.stop();
                    }
                    break;
                }
            }
        }
        debug!("audio thread finished");
    })
}
