//! Batch tag editing.
//!
//! An edit is applied to every selected track and written out one file at a
//! time. Failures do not stop the batch; the user gets a single summary
//! notification at the end.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::config::WriteOptions;
use lofty::error::LoftyError;
use lofty::file::TaggedFileExt;
use lofty::tag::{Accessor, ItemKey, Tag, TagExt};
use tracing::{debug, warn};

use crate::library::{COVER_FILE_NAME, Track};
use crate::notify::{Notification, NotificationSink};

#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("could not read tags of {}: {}", .path.display(), .source)]
    Read { path: PathBuf, source: LoftyError },
    #[error("could not write tags of {}: {}", .path.display(), .source)]
    Write { path: PathBuf, source: LoftyError },
    #[error("could not copy cover to {}: {}", .path.display(), .source)]
    Cover { path: PathBuf, source: io::Error },
}

/// Overrides to apply to a selection of tracks. `None` or blank keeps the
/// track's own value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackEdit {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub track_number: Option<u32>,
    pub cover: Option<PathBuf>,
}

impl TrackEdit {
    pub fn apply(&self, track: &Track) -> Track {
        let mut out = track.clone();
        if let Some(title) = pick(&self.title) {
            out.title = title;
        }
        if let Some(artist) = pick(&self.artist) {
            out.artist = Some(artist);
        }
        if let Some(album) = pick(&self.album) {
            out.album = Some(album);
        }
        if let Some(album_artist) = pick(&self.album_artist) {
            out.album_artist = Some(album_artist);
        }
        if let Some(n) = self.track_number {
            out.track_number = Some(n);
        }
        if let Some(cover) = self.cover.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            out.cover = Some(cover.clone());
        }
        out
    }
}

fn pick(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub trait TagWriter {
    fn write_tags(&self, album_dir: &Path, track: &Track) -> Result<(), TagError>;
}

/// Writes tags in place with `lofty` and places the cover next to the album.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTagWriter;

impl TagWriter for LoftyTagWriter {
    fn write_tags(&self, album_dir: &Path, track: &Track) -> Result<(), TagError> {
        let read_err = |source| TagError::Read {
            path: track.path.clone(),
            source,
        };
        let mut tagged = lofty::read_from_path(&track.path).map_err(read_err)?;
        if tagged.primary_tag().is_none() {
            let tag_type = tagged.primary_tag_type();
            tagged.insert_tag(Tag::new(tag_type));
        }
        let Some(tag) = tagged.primary_tag_mut() else {
            // insert_tag only refuses tag types the format cannot hold.
            warn!(path = %track.path.display(), "format cannot hold a tag, skipped");
            return Ok(());
        };

        tag.set_title(track.title.clone());
        if let Some(artist) = &track.artist {
            tag.set_artist(artist.clone());
        }
        if let Some(album) = &track.album {
            tag.set_album(album.clone());
        }
        if let Some(album_artist) = &track.album_artist {
            tag.insert_text(ItemKey::AlbumArtist, album_artist.clone());
        }
        if let Some(n) = track.track_number {
            tag.set_track(n);
        }
        tag.save_to_path(&track.path, WriteOptions::default())
            .map_err(|source| TagError::Write {
                path: track.path.clone(),
                source,
            })?;

        if let Some(cover) = &track.cover {
            let dest = album_dir.join(COVER_FILE_NAME);
            if cover != &dest {
                std::fs::copy(cover, &dest).map_err(|source| TagError::Cover {
                    path: dest.clone(),
                    source,
                })?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// Tracks as written, in selection order.
    pub updated: Vec<Track>,
    pub failed: Vec<(PathBuf, TagError)>,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.updated.len() + self.failed.len()
    }
}

pub fn commit_batch(
    writer: &dyn TagWriter,
    sink: &dyn NotificationSink,
    dismiss: Duration,
    album_dir: &Path,
    tracks: &[Track],
    edit: &TrackEdit,
) -> BatchReport {
    let mut report = BatchReport::default();
    if tracks.is_empty() {
        return report;
    }

    for track in tracks {
        let edited = edit.apply(track);
        match writer.write_tags(album_dir, &edited) {
            Ok(()) => report.updated.push(edited),
            Err(e) => {
                warn!(path = %track.path.display(), error = %e, "tag update failed");
                report.failed.push((track.path.clone(), e));
            }
        }
    }

    let total = report.attempted();
    let notification = if report.failed.is_empty() {
        Notification::info(format!("Updated {total} tracks"), dismiss)
    } else {
        Notification::error(
            format!("Failed to update {} of {total} tracks", report.failed.len()),
            dismiss,
        )
    };
    debug!(total, failed = report.failed.len(), "batch edit finished");
    sink.notify(notification);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Severity;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Notification>>,
    }

    impl NotificationSink for Recorder {
        fn notify(&self, notification: Notification) {
            self.seen.lock().unwrap().push(notification);
        }
    }

    /// Fails for any path containing "bad".
    #[derive(Default)]
    struct PickyWriter {
        written: Mutex<Vec<Track>>,
    }

    impl TagWriter for PickyWriter {
        fn write_tags(&self, _album_dir: &Path, track: &Track) -> Result<(), TagError> {
            if track.path.to_string_lossy().contains("bad") {
                return Err(TagError::Cover {
                    path: track.path.clone(),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
                });
            }
            self.written.lock().unwrap().push(track.clone());
            Ok(())
        }
    }

    fn track(file: &str, title: &str) -> Track {
        Track {
            path: PathBuf::from(format!("/music/album/{file}")),
            title: title.into(),
            artist: Some("Old Artist".into()),
            album: Some("Old Album".into()),
            track_number: Some(1),
            ..Track::default()
        }
    }

    #[test]
    fn apply_skips_blank_and_missing_overrides() {
        let edit = TrackEdit {
            title: Some("   ".into()),
            artist: Some(" New Artist ".into()),
            album_artist: Some("Various".into()),
            track_number: Some(7),
            cover: Some(PathBuf::new()),
            ..TrackEdit::default()
        };
        let out = edit.apply(&track("a.mp3", "Keep Me"));

        assert_eq!(out.title, "Keep Me");
        assert_eq!(out.artist.as_deref(), Some("New Artist"));
        assert_eq!(out.album.as_deref(), Some("Old Album"));
        assert_eq!(out.album_artist.as_deref(), Some("Various"));
        assert_eq!(out.track_number, Some(7));
        assert_eq!(out.cover, None);
    }

    #[test]
    fn empty_selection_makes_no_calls() {
        let writer = PickyWriter::default();
        let sink = Recorder::default();
        let report = commit_batch(
            &writer,
            &sink,
            Duration::from_secs(3),
            Path::new("/music/album"),
            &[],
            &TrackEdit::default(),
        );

        assert_eq!(report.attempted(), 0);
        assert!(writer.written.lock().unwrap().is_empty());
        assert!(sink.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn all_successful_sends_one_info() {
        let writer = PickyWriter::default();
        let sink = Recorder::default();
        let edit = TrackEdit {
            album: Some("New Album".into()),
            ..TrackEdit::default()
        };
        let report = commit_batch(
            &writer,
            &sink,
            Duration::from_secs(3),
            Path::new("/music/album"),
            &[track("a.mp3", "A"), track("b.mp3", "B")],
            &edit,
        );

        assert_eq!(report.updated.len(), 2);
        assert!(report
            .updated
            .iter()
            .all(|t| t.album.as_deref() == Some("New Album")));
        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].severity, Severity::Info);
        assert_eq!(seen[0].message, "Updated 2 tracks");
        assert_eq!(seen[0].auto_dismiss, Duration::from_secs(3));
    }

    #[test]
    fn failures_do_not_stop_the_batch() {
        let writer = PickyWriter::default();
        let sink = Recorder::default();
        let report = commit_batch(
            &writer,
            &sink,
            Duration::from_secs(5),
            Path::new("/music/album"),
            &[
                track("a.mp3", "A"),
                track("bad.mp3", "B"),
                track("c.mp3", "C"),
            ],
            &TrackEdit::default(),
        );

        assert_eq!(writer.written.lock().unwrap().len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, PathBuf::from("/music/album/bad.mp3"));
        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].severity, Severity::Error);
        assert_eq!(seen[0].message, "Failed to update 1 of 3 tracks");
    }

    #[test]
    fn lofty_writer_reports_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();
        let t = Track {
            path: path.clone(),
            title: "Noise".into(),
            ..Track::default()
        };

        let err = LoftyTagWriter.write_tags(dir.path(), &t).unwrap_err();
        assert!(matches!(err, TagError::Read { .. }));
        assert!(err.to_string().contains("noise.mp3"));
    }
}
