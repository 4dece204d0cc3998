use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::App;
use crate::config;
use crate::engine::EngineError;
use crate::notify::Notification;
use crate::transport::Transport;
use crate::ui::{self, PlayerView};

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: polls the transport, drains notifications,
/// draws, and handles one key per iteration. Returns `Ok(())` on quit.
pub async fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    transport: &mut Transport,
    notifications: &Receiver<Notification>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        log_failure("auto-advance", transport.advance_if_finished().await.map(drop));

        let now = Instant::now();
        while let Ok(notification) = notifications.try_recv() {
            app.show_toast(notification, now);
        }
        app.expire_toast(now);
        app.sync_follow(transport.queue().current_index());

        let playback = transport.snapshot();
        let view = PlayerView {
            queue: transport.queue(),
            playback: &playback,
            modes: transport.modes(),
            volume: transport.volume(),
        };
        terminal.draw(|f| ui::draw(f, app, &view, &settings.ui, &settings.controls))?;

        // crossterm polling blocks; keep the runtime's other tasks moving meanwhile.
        let ready = tokio::task::block_in_place(|| event::poll(Duration::from_millis(50)))?;
        if ready {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, transport, state).await {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Engine failures already reached the user as a toast; only log them here.
fn log_failure(action: &str, result: Result<(), EngineError>) {
    if let Err(e) = result {
        debug!(action, error = %e, "transport action failed");
    }
}

fn on_off(v: bool) -> &'static str {
    if v { "on" } else { "off" }
}

async fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    transport: &mut Transport,
    state: &mut EventLoopState,
) -> bool {
    let len = transport.queue().len();
    let info_dismiss = Duration::from_millis(settings.notifications.info_dismiss_ms);

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback_off();
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            app.follow_playback_off();
            app.select_last(len);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.follow_playback_off();
            app.next(len);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.follow_playback_off();
            app.prev(len);
        }
        KeyCode::Enter => {
            if len > 0 {
                app.follow_playback_on();
                app.set_pending_follow_index(app.selected);
                log_failure("jump", transport.jump_to_song(app.selected).await.map(drop));
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            if transport.snapshot().current.is_some() {
                transport.toggle_playback().await;
            } else if len > 0 {
                // Nothing loaded yet: start from the highlighted row.
                app.follow_playback_on();
                app.set_pending_follow_index(app.selected);
                log_failure("jump", transport.jump_to_song(app.selected).await.map(drop));
            }
        }
        KeyCode::Char('l') => {
            app.follow_playback_on();
            log_failure("next", transport.attempt_play_next().await.map(drop));
        }
        KeyCode::Char('h') => {
            app.follow_playback_on();
            log_failure("previous", transport.attempt_play_previous().await.map(drop));
        }
        KeyCode::Char('x') => transport.stop_playback().await,
        KeyCode::Char('L') => {
            let secs = i64::try_from(settings.controls.scrub_seconds).unwrap_or(i64::MAX);
            log_failure("seek", transport.seek_by(secs).await);
        }
        KeyCode::Char('H') => {
            let secs = i64::try_from(settings.controls.scrub_seconds).unwrap_or(i64::MAX);
            log_failure("seek", transport.seek_by(-secs).await);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let volume = transport
                .volume()
                .saturating_add(settings.controls.volume_step);
            transport.set_volume(volume).await;
        }
        KeyCode::Char('-') => {
            let volume = transport
                .volume()
                .saturating_sub(settings.controls.volume_step);
            transport.set_volume(volume).await;
        }
        KeyCode::Char('s') => {
            let on = transport.toggle_shuffle_mode();
            app.show_toast(
                Notification::info(format!("Shuffle {}", on_off(on)), info_dismiss),
                Instant::now(),
            );
        }
        KeyCode::Char('r') => {
            let on = transport.toggle_loop_mode();
            app.show_toast(
                Notification::info(format!("Loop track {}", on_off(on)), info_dismiss),
                Instant::now(),
            );
        }
        KeyCode::Char('R') => {
            let on = transport.toggle_loop_queue_mode();
            app.show_toast(
                Notification::info(format!("Loop queue {}", on_off(on)), info_dismiss),
                Instant::now(),
            );
        }
        KeyCode::Char('K') => app.toggle_metadata_window(),
        _ => {}
    }

    false
}
