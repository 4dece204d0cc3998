//! Play queue storage and the advance policy.
//!
//! The cursor is signed and deliberately unchecked: it always names the
//! position most recently asked for, even when that position holds no track
//! (end of queue, stepping back from the first track, empty queue). Readers go
//! through `get`/`current`, which bounds-check.

use rand::Rng;

use crate::library::Track;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PlaybackModes {
    /// Repeat the current track. Wins over `shuffle`.
    pub loop_track: bool,
    /// Wrap to the start after the last track.
    pub loop_queue: bool,
    /// Pick a random other track on advance.
    pub shuffle: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Queue {
    tracks: Vec<Track>,
    cursor: isize,
}

impl Queue {
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: isize) -> Option<&Track> {
        usize::try_from(index).ok().and_then(|i| self.tracks.get(i))
    }

    /// Track under the cursor, if the cursor is in bounds.
    pub fn current(&self) -> Option<&Track> {
        self.get(self.cursor)
    }

    /// Cursor as a list index, when it points at a track.
    pub fn current_index(&self) -> Option<usize> {
        self.current().map(|_| self.cursor as usize)
    }

    pub(crate) fn replace(&mut self, tracks: Vec<Track>, offset: usize) {
        self.tracks = tracks;
        self.cursor = to_cursor(offset);
    }

    /// Insert right after the cursor, keeping the given order. The cursor does not move.
    pub(crate) fn insert_after_cursor(&mut self, tracks: Vec<Track>) {
        let at = self
            .cursor
            .saturating_add(1)
            .clamp(0, self.tracks.len() as isize) as usize;
        self.tracks.splice(at..at, tracks);
    }

    pub(crate) fn append(&mut self, tracks: Vec<Track>) {
        self.tracks.extend(tracks);
    }

    pub(crate) fn set_cursor(&mut self, index: usize) {
        self.cursor = to_cursor(index);
    }

    pub(crate) fn step_back(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move the cursor according to `modes`. Returns `true` when the current
    /// track should be replayed from the start rather than moved away from.
    pub(crate) fn advance<R: Rng + ?Sized>(&mut self, modes: PlaybackModes, rng: &mut R) -> bool {
        if modes.loop_track {
            return true;
        }
        self.cursor = if modes.shuffle && self.tracks.len() >= 2 {
            shuffle_pick(self.cursor, self.tracks.len(), rng)
        } else {
            sequential_next(self.cursor, self.tracks.len(), modes.loop_queue)
        };
        false
    }
}

fn to_cursor(index: usize) -> isize {
    isize::try_from(index).unwrap_or(isize::MAX)
}

fn sequential_next(cursor: isize, len: usize, loop_queue: bool) -> isize {
    let next = cursor.saturating_add(1);
    let in_bounds = usize::try_from(next).is_ok_and(|n| n < len);
    if !in_bounds && loop_queue { 0 } else { next }
}

/// Uniform pick over every index except `cursor`; `len` must be at least 2.
fn shuffle_pick<R: Rng + ?Sized>(cursor: isize, len: usize, rng: &mut R) -> isize {
    let len = len as isize;
    if !(0..len).contains(&cursor) {
        return rng.gen_range(0..len);
    }
    // Draw from the other len - 1 slots and step over the cursor.
    let pick = rng.gen_range(0..len - 1);
    if pick >= cursor { pick + 1 } else { pick }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::path::PathBuf;

    fn t(name: &str) -> Track {
        Track {
            path: PathBuf::from(format!("/music/{name}.mp3")),
            title: name.into(),
            ..Track::default()
        }
    }

    fn queue(names: &[&str], offset: usize) -> Queue {
        let mut q = Queue::default();
        q.replace(names.iter().map(|n| t(n)).collect(), offset);
        q
    }

    fn titles(q: &Queue) -> Vec<&str> {
        q.tracks().iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn sequential_advance_runs_off_the_end_without_loop_queue() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut q = queue(&["a", "b"], 0);
        assert!(!q.advance(PlaybackModes::default(), &mut rng));
        assert_eq!(q.cursor(), 1);
        q.advance(PlaybackModes::default(), &mut rng);
        assert_eq!(q.cursor(), 2);
        assert!(q.current().is_none());
    }

    #[test]
    fn loop_queue_wraps_to_start() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut q = queue(&["a", "b"], 1);
        let modes = PlaybackModes {
            loop_queue: true,
            ..PlaybackModes::default()
        };
        q.advance(modes, &mut rng);
        assert_eq!(q.cursor(), 0);
        assert_eq!(q.current().unwrap().title, "a");
    }

    #[test]
    fn loop_track_wins_over_shuffle() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut q = queue(&["a", "b", "c"], 1);
        let modes = PlaybackModes {
            loop_track: true,
            shuffle: true,
            loop_queue: true,
        };
        assert!(q.advance(modes, &mut rng));
        assert_eq!(q.cursor(), 1);
    }

    #[test]
    fn shuffle_never_repeats_cursor_and_covers_the_rest() {
        let mut rng = StdRng::seed_from_u64(7);
        let modes = PlaybackModes {
            shuffle: true,
            ..PlaybackModes::default()
        };
        let mut seen = [0usize; 4];
        for _ in 0..400 {
            let mut q = queue(&["a", "b", "c", "d"], 2);
            q.advance(modes, &mut rng);
            let idx = q.current_index().unwrap();
            assert_ne!(idx, 2);
            seen[idx] += 1;
        }
        assert_eq!(seen[2], 0);
        assert!(seen[0] > 0 && seen[1] > 0 && seen[3] > 0);
    }

    #[test]
    fn shuffle_with_one_track_falls_back_to_sequential() {
        let mut rng = StdRng::seed_from_u64(3);
        let shuffle = PlaybackModes {
            shuffle: true,
            ..PlaybackModes::default()
        };
        let mut q = queue(&["only"], 0);
        q.advance(shuffle, &mut rng);
        assert_eq!(q.cursor(), 1);

        let mut q = queue(&["only"], 0);
        q.advance(
            PlaybackModes {
                loop_queue: true,
                ..shuffle
            },
            &mut rng,
        );
        assert_eq!(q.cursor(), 0);
    }

    #[test]
    fn shuffle_from_out_of_bounds_cursor_lands_in_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut q = queue(&["a", "b"], 5);
        q.advance(
            PlaybackModes {
                shuffle: true,
                ..PlaybackModes::default()
            },
            &mut rng,
        );
        assert!(q.current().is_some());
    }

    #[test]
    fn insert_after_cursor_keeps_order_and_cursor() {
        let mut q = queue(&["a", "b", "c"], 1);
        q.insert_after_cursor(vec![t("x"), t("y")]);
        assert_eq!(titles(&q), vec!["a", "b", "x", "y", "c"]);
        assert_eq!(q.cursor(), 1);
    }

    #[test]
    fn insert_after_out_of_bounds_cursor_clamps() {
        let mut q = queue(&["a"], 9);
        q.insert_after_cursor(vec![t("x")]);
        assert_eq!(titles(&q), vec!["a", "x"]);

        let mut q = queue(&["a"], 0);
        q.step_back();
        q.step_back();
        assert_eq!(q.cursor(), -2);
        q.insert_after_cursor(vec![t("x")]);
        assert_eq!(titles(&q), vec!["x", "a"]);
    }

    #[test]
    fn append_allows_duplicates() {
        let mut q = queue(&["a"], 0);
        q.append(vec![t("a"), t("b")]);
        assert_eq!(titles(&q), vec!["a", "a", "b"]);
    }
}
