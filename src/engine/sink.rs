//! Opening files and wrapping them in `rodio` sinks.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, Sink};

use super::EngineError;

pub(super) fn open_source(path: &Path) -> Result<Decoder<BufReader<File>>, EngineError> {
    let file = File::open(path).map_err(|source| EngineError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    Decoder::new(BufReader::new(file)).map_err(|e| EngineError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Create a paused `Sink` for `path` on the stream's mixer.
pub(super) fn create_sink(stream: &OutputStream, path: &Path) -> Result<Sink, EngineError> {
    let source = open_source(path)?;
    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}
