use std::path::{Path, PathBuf};
use std::time::Duration;

/// A playable audio item as produced by the library scanner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub track_number: Option<u32>,
    pub duration: Option<Duration>,
    pub cover: Option<PathBuf>,
    pub display: String,
}

impl Track {
    /// Whether the track points at something the engine could load.
    pub fn has_file(&self) -> bool {
        !self.path.as_os_str().is_empty()
    }

    /// Two tracks are the same playable item when they share a file.
    pub fn same_file(&self, other: &Track) -> bool {
        self.path == other.path
    }

    /// Artist credited for the album, falling back to the track artist.
    pub fn effective_album_artist(&self) -> Option<&str> {
        self.album_artist
            .as_deref()
            .or(self.artist.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Directory holding the file.
    pub fn location(&self) -> Option<&Path> {
        self.path.parent()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub title: String,
    pub artist: String,
    pub cover: Option<PathBuf>,
    /// Directory the album's files live in.
    pub location: PathBuf,
}
