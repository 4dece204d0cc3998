use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::App;
use crate::engine::RodioEngine;
use crate::library::{Library, LibraryIndex, scan};
use crate::notify::ChannelSink;
use crate::scrobble::Offline;
use crate::transport::Transport;

mod event_loop;
mod logging;
mod settings;
mod startup;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let log_path = logging::init_logging();
    let settings = settings::load_settings();

    let dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    info!(dir = %dir.display(), log = ?log_path, "starting");

    let library = Library::new(scan(&dir, &settings.library));
    info!(tracks = library.len(), "library ready");

    let engine = RodioEngine::spawn()?;
    let (sink, notifications) = ChannelSink::new();
    let mut transport = Transport::new(Arc::new(engine), Arc::new(Offline), Arc::new(sink))
        .with_tick_interval(Duration::from_millis(settings.audio.tick_ms))
        .with_error_dismiss(Duration::from_millis(
            settings.notifications.error_dismiss_ms,
        ))
        .with_modes(startup::playback_modes(&settings));
    startup::apply_playback_defaults(&mut transport, library.all_tracks(), &settings).await;

    let mut app = App::new(settings.ui.follow_playback);
    app.set_current_dir(dir.display().to_string());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut transport,
        &notifications,
        &mut state,
    )
    .await;

    transport.stop_playback().await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("shutting down");
    run_result
}
