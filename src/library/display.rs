use crate::config::TrackDisplayField;

use super::model::Track;

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Build a display string for a track according to the provided `fields` and separator.
///
/// This composes metadata fields (artist, title, album, filename, path) in the
/// configured order and falls back to `title` when no parts were produced.
/// `Display` uses the track's precomputed label, or "artist, title" while that
/// label is still empty (the scanner builds it through this function).
pub fn display_from_fields(track: &Track, fields: &[TrackDisplayField], sep: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    let title = track.title.trim();

    for f in fields {
        match f {
            TrackDisplayField::Display => {
                if !track.display.trim().is_empty() {
                    parts.push(track.display.clone());
                    continue;
                }
                if let Some(a) = non_blank(track.artist.as_deref()) {
                    parts.push(a.to_string());
                }
                if !title.is_empty() {
                    parts.push(title.to_string());
                }
            }
            TrackDisplayField::Title => {
                if !title.is_empty() {
                    parts.push(title.to_string());
                }
            }
            TrackDisplayField::Artist => {
                if let Some(a) = non_blank(track.artist.as_deref()) {
                    parts.push(a.to_string());
                }
            }
            TrackDisplayField::Album => {
                if let Some(a) = non_blank(track.album.as_deref()) {
                    parts.push(a.to_string());
                }
            }
            TrackDisplayField::AlbumArtist => {
                if let Some(a) = track.effective_album_artist() {
                    parts.push(a.to_string());
                }
            }
            TrackDisplayField::Filename => {
                if let Some(stem) = track.path.file_stem().and_then(|s| s.to_str()) {
                    if !stem.trim().is_empty() {
                        parts.push(stem.to_string());
                    }
                }
            }
            TrackDisplayField::Path => {
                parts.push(track.path.display().to_string());
            }
        }
    }

    if parts.is_empty() {
        track.title.clone()
    } else {
        parts.join(sep)
    }
}
