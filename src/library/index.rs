use std::collections::BTreeSet;

use super::model::{Album, Track};

/// Read-only catalog queries. Each call is answered on demand; callers that
/// want a snapshot keep the returned collection themselves.
pub trait LibraryIndex {
    fn all_tracks(&self) -> Vec<Track>;
    /// Tracks of one album, ordered by track number (untagged tracks last).
    fn tracks_by_album(&self, title: &str, artist: &str) -> Vec<Track>;
    fn all_albums(&self) -> Vec<Album>;
    fn albums_by_artist(&self, artist: &str) -> Vec<Album>;
    /// Distinct album artists, sorted case-insensitively.
    fn all_artists(&self) -> Vec<String>;
}

/// In-memory index over the tracks produced by `scan`.
#[derive(Debug, Clone, Default)]
pub struct Library {
    tracks: Vec<Track>,
}

impl Library {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn album_key(track: &Track) -> Option<(&str, &str)> {
        let title = track.album.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((title, track.effective_album_artist().unwrap_or("")))
    }
}

impl LibraryIndex for Library {
    fn all_tracks(&self) -> Vec<Track> {
        self.tracks.clone()
    }

    fn tracks_by_album(&self, title: &str, artist: &str) -> Vec<Track> {
        let mut tracks: Vec<Track> = self
            .tracks
            .iter()
            .filter(|t| {
                Self::album_key(t)
                    .map(|(a, b)| a.eq_ignore_ascii_case(title) && b.eq_ignore_ascii_case(artist))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        // `None` sorts before `Some`, so untagged tracks are pushed to the end explicitly.
        tracks.sort_by_key(|t| (t.track_number.is_none(), t.track_number));
        tracks
    }

    fn all_albums(&self) -> Vec<Album> {
        let mut albums: Vec<Album> = Vec::new();
        for track in &self.tracks {
            let Some((title, artist)) = Self::album_key(track) else {
                continue;
            };
            let known = albums
                .iter_mut()
                .find(|a| a.title.eq_ignore_ascii_case(title) && a.artist.eq_ignore_ascii_case(artist));
            match known {
                Some(album) => {
                    if album.cover.is_none() {
                        album.cover = track.cover.clone();
                    }
                }
                None => albums.push(Album {
                    title: title.to_string(),
                    artist: artist.to_string(),
                    cover: track.cover.clone(),
                    location: track.location().map(|p| p.to_path_buf()).unwrap_or_default(),
                }),
            }
        }
        albums.sort_by(|a, b| {
            (a.artist.to_lowercase(), a.title.to_lowercase())
                .cmp(&(b.artist.to_lowercase(), b.title.to_lowercase()))
        });
        albums
    }

    fn albums_by_artist(&self, artist: &str) -> Vec<Album> {
        self.all_albums()
            .into_iter()
            .filter(|a| a.artist.eq_ignore_ascii_case(artist))
            .collect()
    }

    fn all_artists(&self) -> Vec<String> {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut artists: Vec<String> = Vec::new();
        for artist in self.tracks.iter().filter_map(Track::effective_album_artist) {
            if seen.insert(artist.to_lowercase()) {
                artists.push(artist.to_string());
            }
        }
        artists.sort_by_key(|a| a.to_lowercase());
        artists
    }
}
