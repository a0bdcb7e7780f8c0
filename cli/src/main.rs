//! Banter CLI - binary entry point and terminal session management.
//!
//! Bridges [`banter_engine`] (application state) and [`banter_tui`]
//! (rendering) with RAII-based terminal management, so the terminal is
//! restored even on panics or early returns.
//!
//! The event loop runs on a fixed render cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input, apply the resulting actions to the engine
//! 3. Poll finished network tasks into the store
//! 4. Advance reveal animations
//! 5. Render frame

use anyhow::Result;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    },
};
use ratatui::prelude::{CrosstermBackend, Terminal};
use std::{
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use banter_engine::App;
use banter_tui::{UiAction, View, draw, handle_events};

const FRAME_DURATION: Duration = Duration::from_millis(16);

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Without a log file, prefer "no logs" over corrupting the TUI by
    // writing to stdout/stderr.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let candidates = [
        banter_engine::data_dir().join("logs").join("banter.log"),
        PathBuf::from(".banter").join("logs").join("banter.log"),
    ];
    let mut warnings = Vec::new();

    for candidate in candidates {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

/// RAII wrapper restoring raw mode, bracketed paste, and the alternate
/// screen on drop.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut out = stdout();
        if let Err(err) = execute!(out, EnableBracketedPaste, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            let _ = execute!(out, LeaveAlternateScreen, DisableBracketedPaste);
            return Err(err.into());
        }
        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen, DisableBracketedPaste);
                return Err(err.into());
            }
        };
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        );
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let mut app = App::new();
    let mut session = TerminalSession::new()?;
    let result = run(&mut session.terminal, &mut app).await;
    drop(session);
    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut view = View::default();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();

    loop {
        frames.tick().await;

        let actions = handle_events(app, &mut view)?;
        for action in actions {
            match action {
                UiAction::Quit => return Ok(()),
                UiAction::NewChat => {
                    app.new_chat("New chat");
                }
                UiAction::DeleteChat(id) => app.delete_chat(id),
                UiAction::SelectChat(id) => app.select_chat(id),
                UiAction::RenameChat(id, title) => app.rename_chat(id, title),
                UiAction::UpdateSettings(update) => app.update_settings(update),
                UiAction::DismissError => app.clear_error(),
                UiAction::Submit { content, files } => {
                    app.submit(&content, &files).await;
                }
            }
        }

        let settings = app.store().settings();
        let animate = settings.typing_animation;
        let step = Duration::from_millis(settings.typing_speed_ms);
        for id in app.poll() {
            if !animate {
                continue;
            }
            let content = app
                .store()
                .chats()
                .iter()
                .flat_map(|chat| chat.messages().iter())
                .find(|message| message.id() == id)
                .map(|message| message.content().to_string());
            if let Some(content) = content {
                view.reveals.start(id, &content);
            }
        }

        let now = Instant::now();
        view.reveals.advance(now - last_frame, step);
        last_frame = now;

        terminal.draw(|frame| draw(frame, app, &view))?;
    }
}
