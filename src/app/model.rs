//! Application model types: `App` and `Toast`.

use std::time::Instant;

use crate::notify::Notification;

/// A notification on screen together with the moment it goes away.
#[derive(Debug, Clone)]
pub struct Toast {
    pub notification: Notification,
    /// `None` when the delay is too long to represent; such a toast stays up
    /// until replaced.
    pub expires_at: Option<Instant>,
}

/// View state of the terminal front end.
#[derive(Debug, Default)]
pub struct App {
    /// Highlighted row in the queue list.
    pub selected: usize,
    /// Keep `selected` on the track under the queue cursor.
    pub follow_playback: bool,
    pub pending_follow_index: Option<usize>,
    pub current_dir: Option<String>,
    pub metadata_window: bool,
    pub toast: Option<Toast>,
}

impl App {
    pub fn new(follow_playback: bool) -> Self {
        Self {
            follow_playback,
            ..Self::default()
        }
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }
    /// Enable following playback (cursor follows currently playing track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }
    /// Disable follow-playback and clear any pending follow index.
    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
        self.pending_follow_index = None;
    }
    /// Set an index to follow once the transport reports it.
    pub fn set_pending_follow_index(&mut self, idx: usize) {
        self.pending_follow_index = Some(idx);
    }
    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    /// Move the selection onto the playing position while following.
    ///
    /// A pending index wins until the transport actually reaches it, so a jump
    /// does not flicker back to the old track for one frame.
    pub fn sync_follow(&mut self, playing_index: Option<usize>) {
        if !self.follow_playback {
            return;
        }
        let Some(idx) = playing_index else {
            return;
        };
        match self.pending_follow_index {
            Some(pending) if pending != idx => {}
            Some(_) => {
                self.pending_follow_index = None;
                self.selected = idx;
            }
            None => self.selected = idx,
        }
    }

    /// Move selection to the next row, wrapping around.
    pub fn next(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % len;
    }

    /// Move selection to the previous row, wrapping around.
    pub fn prev(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = match self.selected {
            0 => len - 1,
            s if s >= len => len - 1,
            s => s - 1,
        };
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Show `notification`, replacing whatever toast is up.
    pub fn show_toast(&mut self, notification: Notification, now: Instant) {
        let expires_at = now.checked_add(notification.auto_dismiss);
        self.toast = Some(Toast {
            notification,
            expires_at,
        });
    }

    pub fn expire_toast(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| t.expires_at.is_some_and(|at| now >= at)) {
            self.toast = None;
        }
    }
}
