//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::App;
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::library::{Track, display_from_fields};
use crate::notify::Severity;
use crate::transport::{PlaybackModes, PlaybackState, Queue, TransportStatus};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("enter".to_string(), "play selected".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next".to_string());
    map.insert("x".to_string(), "stop".to_string());
    // H/L and +/- are filled dynamically from config.
    map.insert("s".to_string(), "shuffle".to_string());
    map.insert("r".to_string(), "loop track".to_string());
    map.insert("R".to_string(), "loop queue".to_string());
    map.insert("K".to_string(), "metadata".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// What the renderer needs from the transport for one frame.
pub struct PlayerView<'a> {
    pub queue: &'a Queue,
    pub playback: &'a PlaybackState,
    pub modes: PlaybackModes,
    pub volume: u8,
}

/// Render the controls help text, incorporating scrub seconds and volume step.
fn controls_text(controls: &ControlsSettings) -> String {
    let order = [
        "j/k", "h/l", "H/L", "enter", "space/p", "x", "+/-", "gg/G", "s", "r", "R", "K", "q",
    ];
    order
        .iter()
        .filter_map(|k| match *k {
            "H/L" => Some(format!("[H/L] scrub -/+{}s", controls.scrub_seconds)),
            "+/-" => Some(format!("[+/-] volume {}%", controls.volume_step)),
            _ => CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v)),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
pub fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn now_playing_track_text(track: &Track, ui: &UiSettings) -> String {
    let text = display_from_fields(
        track,
        &ui.now_playing_track_fields,
        &ui.now_playing_track_separator,
    );
    if text.trim().is_empty() {
        track.display.clone()
    } else {
        text
    }
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    if ui.now_playing_time_fields.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

fn on_off(v: bool) -> &'static str {
    if v { "ON" } else { "OFF" }
}

fn status_text(app: &App, view: &PlayerView, ui: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    if app.follow_playback {
        parts.push(" CURSOR: Follow".to_string());
    } else {
        parts.push(" CURSOR: Free-roam".to_string());
    }

    let playback = view.playback;
    match &playback.current {
        Some(track) => {
            let song = now_playing_track_text(track, ui);
            let elapsed = Duration::from_secs(playback.progress_secs);
            match now_playing_time_text(elapsed, track.duration, ui) {
                Some(time) => parts.push(format!("Song: {} [{}]", song, time)),
                None => parts.push(format!("Song: {}", song)),
            }
        }
        None => parts.push("Song: -".to_string()),
    }
    let state = match playback.status() {
        TransportStatus::Playing => "Playing",
        TransportStatus::Paused => "Paused",
        TransportStatus::Stopped => "Stopped",
    };
    parts.push(state.to_string());

    parts.push(format!("Shuffle: {}", on_off(view.modes.shuffle)));
    parts.push(format!("Loop track: {}", on_off(view.modes.loop_track)));
    parts.push(format!("Loop queue: {}", on_off(view.modes.loop_queue)));
    parts.push(format!("Vol: {}%", view.volume));

    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {}", dir));
    }

    parts.join(" • ")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Format an optional duration, rounding up partial seconds, showing total seconds.
fn format_duration_mmss_ceil(d: Option<Duration>) -> String {
    let Some(d) = d else {
        return "-".to_string();
    };

    let mut total_secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        total_secs = total_secs.saturating_add(1);
    }

    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{}:{:02} ({}s)", minutes, seconds, total_secs)
}

fn metadata_text(track: Option<&Track>) -> String {
    let Some(track) = track else {
        return "No track selected".to_string();
    };
    format!(
        "Title: {}\nArtist: {}\nAlbum: {}\nAlbum artist: {}\nTrack: {}\nDuration: {}\nPath: {}",
        track.title,
        track.artist.as_deref().unwrap_or("-"),
        track.album.as_deref().unwrap_or("-"),
        track.effective_album_artist().unwrap_or("-"),
        track
            .track_number
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string()),
        format_duration_mmss_ceil(track.duration),
        track.path.display()
    )
}

fn left_padded() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    view: &PlayerView,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" sable ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(app, view, ui_settings))
        .block(Block::bordered().padding(left_padded()).title(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Queue list. Only the visible window is turned into ListItems.
    let tracks = view.queue.tracks();
    let cursor = view.queue.current_index();
    let total = tracks.len();
    let list_height = chunks[2].height.saturating_sub(2) as usize;
    let sel_pos = app.selected.min(total.saturating_sub(1));
    let (start, end) = if total <= list_height || list_height == 0 {
        (0, total)
    } else {
        let half = list_height / 2;
        let mut start = sel_pos.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height)
    };

    let visible_items: Vec<ListItem> = tracks[start..end]
        .iter()
        .enumerate()
        .map(|(offset, track)| {
            let marker = if cursor == Some(start + offset) { "♪ " } else { "  " };
            ListItem::new(format!("{marker}{}", track.display))
        })
        .collect();

    let list = List::new(visible_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" queue ({total}) ")),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ratatui::widgets::ListState::default();
    if total > 0 {
        state.select(Some(sel_pos - start));
    }
    frame.render_stateful_widget(list, chunks[2], &mut state);

    if app.metadata_window {
        let popup_area = centered_rect_sized(72, 11, chunks[2]);
        frame.render_widget(Clear, popup_area);

        let meta_paragraph = Paragraph::new(metadata_text(tracks.get(app.selected)))
            .block(
                Block::default()
                    .padding(left_padded())
                    .borders(Borders::ALL)
                    .title(" metadata (K closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    if let Some(toast) = &app.toast {
        let area = chunks[2];
        let height = 3.min(area.height);
        let toast_area = Rect {
            x: area.x + 1,
            y: area.y + area.height.saturating_sub(height),
            width: area.width.saturating_sub(2),
            height,
        };
        let (title, color) = match toast.notification.severity {
            Severity::Info => (" info ", Color::Green),
            Severity::Warning => (" warning ", Color::Yellow),
            Severity::Error => (" error ", Color::Red),
        };
        frame.render_widget(Clear, toast_area);
        let toast_par = Paragraph::new(toast.notification.message.as_str())
            .fg(color)
            .block(Block::bordered().padding(left_padded()).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(toast_par, toast_area);
    }

    let footer = Paragraph::new(controls_text(controls_settings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(left_padded()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}
