//! Input handling for the Banter TUI.
//!
//! Key events mutate the [`View`] directly (compose buffer, overlay state)
//! and surface store-level effects as [`UiAction`]s for the caller to apply
//! to the engine, keeping this module free of async.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use banter_engine::App;
use banter_types::{ChatId, SettingsUpdate, Theme};

use crate::view::{Overlay, SettingsField, View};

/// Store-level effects produced by input, applied by the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Submit { content: String, files: Vec<PathBuf> },
    NewChat,
    DeleteChat(ChatId),
    SelectChat(ChatId),
    RenameChat(ChatId, String),
    UpdateSettings(SettingsUpdate),
    DismissError,
    Quit,
}

/// Slash commands typed into the compose line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Attach(PathBuf),
    Rename(String),
}

fn parse_command(input: &str) -> Option<Command> {
    let rest = input.strip_prefix('/')?;
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "attach" if !arg.is_empty() => Some(Command::Attach(PathBuf::from(arg))),
        "rename" if !arg.is_empty() => Some(Command::Rename(arg.to_string())),
        _ => None,
    }
}

/// Drain all pending terminal events without blocking.
pub fn handle_events(app: &App, view: &mut View) -> Result<Vec<UiAction>> {
    let mut actions = Vec::new();
    while event::poll(Duration::ZERO)? {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                handle_key(app, view, key, &mut actions);
            }
            Event::Paste(text) => {
                view.insert_text(&text);
            }
            _ => {}
        }
    }
    Ok(actions)
}

fn handle_key(app: &App, view: &mut View, key: KeyEvent, actions: &mut Vec<UiAction>) {
    if matches!(view.overlay, Overlay::Settings) {
        handle_settings_key(app, view, key, actions);
        return;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('c' | 'q') if ctrl => actions.push(UiAction::Quit),
        KeyCode::Char('n') if ctrl => actions.push(UiAction::NewChat),
        KeyCode::Char('w') if ctrl => {
            if let Some(id) = app.store().active_chat_id() {
                actions.push(UiAction::DeleteChat(id));
            }
        }
        KeyCode::Char('s') if ctrl => view.open_settings(app.store().settings()),
        KeyCode::Up if alt => {
            if let Some(id) = neighbor_chat(app, -1) {
                actions.push(UiAction::SelectChat(id));
            }
        }
        KeyCode::Down if alt => {
            if let Some(id) = neighbor_chat(app, 1) {
                actions.push(UiAction::SelectChat(id));
            }
        }
        KeyCode::Up => view.scroll_up(1),
        KeyCode::Down => view.scroll_down(1),
        KeyCode::PageUp => view.scroll_up(10),
        KeyCode::PageDown => view.scroll_down(10),
        KeyCode::Esc => {
            view.reveals.finish_all();
            if app.last_error().is_some() {
                actions.push(UiAction::DismissError);
            }
        }
        KeyCode::Enter => submit(app, view, actions),
        KeyCode::Backspace => view.backspace(),
        KeyCode::Left => view.cursor_left(),
        KeyCode::Right => view.cursor_right(),
        KeyCode::Home => view.cursor_home(),
        KeyCode::End => view.cursor_end(),
        KeyCode::Char(c) if !ctrl && !alt => view.insert_char(c),
        _ => {}
    }
}

fn submit(app: &App, view: &mut View, actions: &mut Vec<UiAction>) {
    let input = view.input.trim().to_string();
    if input.is_empty() {
        return;
    }
    match parse_command(&input) {
        Some(Command::Attach(path)) => {
            view.staged.push(path);
            view.clear_input();
        }
        Some(Command::Rename(title)) => {
            if let Some(id) = app.store().active_chat_id() {
                actions.push(UiAction::RenameChat(id, title));
            }
            view.clear_input();
        }
        None => {
            // Sends are serialized; keep the draft until the reply lands.
            if app.in_flight() {
                return;
            }
            actions.push(UiAction::Submit {
                content: input,
                files: std::mem::take(&mut view.staged),
            });
            view.clear_input();
        }
    }
}

fn neighbor_chat(app: &App, offset: isize) -> Option<ChatId> {
    let chats = app.store().chats();
    if chats.is_empty() {
        return None;
    }
    let current = app
        .store()
        .active_chat_id()
        .and_then(|id| chats.iter().position(|c| c.id() == id));
    let next = match current {
        Some(index) => {
            let len = chats.len() as isize;
            usize::try_from((index as isize + offset).rem_euclid(len)).ok()?
        }
        None => 0,
    };
    chats.get(next).map(banter_types::Chat::id)
}

fn handle_settings_key(app: &App, view: &mut View, key: KeyEvent, actions: &mut Vec<UiAction>) {
    match key.code {
        KeyCode::Esc => {
            if let Some(update) = view.close_settings() {
                actions.push(UiAction::UpdateSettings(update));
            }
        }
        KeyCode::Up => view.settings.select_previous(),
        KeyCode::Down => view.settings.select_next(),
        KeyCode::Left | KeyCode::Right | KeyCode::Enter => {
            adjust_settings_field(app, view, key.code);
        }
        KeyCode::Char(c) => {
            if view.settings.selected == SettingsField::ServerUrl {
                view.settings.url_draft.push(c);
            }
        }
        KeyCode::Backspace => {
            if view.settings.selected == SettingsField::ServerUrl {
                view.settings.url_draft.pop();
            }
        }
        _ => {}
    }
}

fn adjust_settings_field(app: &App, view: &mut View, code: KeyCode) {
    let settings = app.store().settings();
    match view.settings.selected {
        SettingsField::Theme => {
            let theme = match settings.theme {
                Theme::System => Theme::Dark,
                Theme::Dark => Theme::Light,
                Theme::Light => Theme::System,
            };
            view.settings.pending.theme = Some(theme);
        }
        SettingsField::TypingAnimation => {
            let current = view
                .settings
                .pending
                .typing_animation
                .unwrap_or(settings.typing_animation);
            view.settings.pending.typing_animation = Some(!current);
        }
        SettingsField::TypingSpeed => {
            let current = view
                .settings
                .pending
                .typing_speed_ms
                .unwrap_or(settings.typing_speed_ms);
            let next = match code {
                KeyCode::Left => current.saturating_sub(5).max(5),
                _ => (current + 5).min(200),
            };
            view.settings.pending.typing_speed_ms = Some(next);
        }
        SettingsField::ServerUrl => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_command_takes_the_rest_as_a_path() {
        assert_eq!(
            parse_command("/attach notes/todo.txt"),
            Some(Command::Attach(PathBuf::from("notes/todo.txt")))
        );
    }

    #[test]
    fn rename_command_keeps_spaces_in_the_title() {
        assert_eq!(
            parse_command("/rename Plans for May"),
            Some(Command::Rename("Plans for May".to_string()))
        );
    }

    #[test]
    fn bare_or_unknown_commands_do_not_parse() {
        assert_eq!(parse_command("/attach"), None);
        assert_eq!(parse_command("/frobnicate x"), None);
        assert_eq!(parse_command("hello"), None);
    }

    #[tokio::test]
    async fn escape_dismisses_a_status_bar_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::with_state_path(dir.path().join("state.json"));
        app.new_chat("A");
        // No server URL configured, so the send fails and leaves an error.
        assert!(!app.submit("hello", &[]).await);
        assert!(app.last_error().is_some());

        let mut view = View::default();
        let mut actions = Vec::new();
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        handle_key(&app, &mut view, esc, &mut actions);
        assert_eq!(actions, vec![UiAction::DismissError]);

        app.clear_error();
        actions.clear();
        handle_key(&app, &mut view, esc, &mut actions);
        assert!(actions.is_empty());
    }
}
