use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::{Accessor, ItemKey};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::display::display_from_fields;
use super::model::Track;

/// File name looked up next to the audio files for album art.
pub const COVER_FILE_NAME: &str = "Cover.jpg";

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn non_blank(v: Option<impl AsRef<str>>) -> Option<String> {
    v.map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Read a single file into a `Track`. Unreadable tags leave the metadata empty
/// and the title falls back to the file stem.
fn read_track(path: &Path, settings: &LibrarySettings) -> Track {
    let mut track = Track {
        path: path.to_path_buf(),
        title: path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string(),
        cover: path
            .parent()
            .map(|dir| dir.join(COVER_FILE_NAME))
            .filter(|p| p.is_file()),
        ..Track::default()
    };

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            track.duration = Some(tagged.properties().duration());

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = non_blank(tag.get_string(&ItemKey::TrackTitle)) {
                    track.title = v;
                }
                track.artist = non_blank(tag.get_string(&ItemKey::TrackArtist));
                track.album = non_blank(tag.get_string(&ItemKey::AlbumTitle));
                track.album_artist = non_blank(tag.get_string(&ItemKey::AlbumArtist));
                track.track_number = tag.track();
            }
        }
        Err(e) => trace!(path = %path.display(), error = %e, "no readable tags"),
    }

    track.display =
        display_from_fields(&track, &settings.display_fields, &settings.display_separator);
    track
}

/// Walk `dir` and collect every audio file the settings accept, sorted by display label.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            tracks.push(read_track(path, settings));
        }
    }

    tracks.sort_by(|a, b| a.display.to_lowercase().cmp(&b.display.to_lowercase()));
    debug!(dir = %dir.display(), count = tracks.len(), "library scan finished");
    tracks
}
