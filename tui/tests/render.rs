//! Full-frame rendering checks against a ratatui [`TestBackend`].
//!
//! These draw into an in-memory buffer and assert on the visible text, so
//! they cover the layout glue (sidebar, transcript, compose, status bar)
//! without a real terminal.

use std::time::SystemTime;

use ratatui::Terminal;
use ratatui::backend::TestBackend;

use banter_engine::{App, Store, save};
use banter_tui::{View, draw};
use banter_types::{AttachmentRef, Chat, Message, SettingsUpdate};

fn render(app: &App, view: &View) -> String {
    let backend = TestBackend::new(80, 24);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| draw(frame, app, view)).unwrap();
    terminal.backend().to_string()
}

/// Persist a hand-built store, then load it through the normal app path.
fn app_with_store(store: &Store) -> App {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    save(store, &path).unwrap();
    App::with_state_path(path)
}

#[test]
fn empty_state_shows_the_new_chat_hint() {
    let app = app_with_store(&Store::default());
    let screen = render(&app, &View::default());

    assert!(screen.contains("Chats"), "missing sidebar title:\n{screen}");
    assert!(screen.contains("Ctrl+N starts a new chat"), "{screen}");
    assert!(screen.contains("Message"), "missing compose title:\n{screen}");
    assert!(screen.contains("unknown"), "missing status glyph:\n{screen}");
}

#[test]
fn transcript_shows_messages_attachments_and_model() {
    let mut chat = Chat::new("Ideas", SystemTime::UNIX_EPOCH);
    chat.push_message(Message::user_with_attachments(
        "hello",
        vec![AttachmentRef::new("notes.txt", "text/plain", 42)],
        SystemTime::UNIX_EPOCH,
    ));
    chat.push_message(Message::assistant(
        "hi there",
        Some("m1".to_string()),
        SystemTime::UNIX_EPOCH,
    ));

    let mut store = Store::default();
    store.add_chat(chat);
    store.update_settings(SettingsUpdate::active_model("m1"));

    let app = app_with_store(&store);
    let screen = render(&app, &View::default());

    assert!(screen.contains("> Ideas"), "chat not selected:\n{screen}");
    assert!(screen.contains("You"), "{screen}");
    assert!(screen.contains("hello"), "{screen}");
    assert!(screen.contains("hi there"), "{screen}");
    assert!(screen.contains("m1"), "missing model name:\n{screen}");
    assert!(screen.contains("+ notes.txt (42 B)"), "{screen}");
}

#[test]
fn staged_files_appear_in_the_compose_title() {
    let app = app_with_store(&Store::default());
    let mut view = View::default();
    view.staged.push("docs/plan.md".into());
    let screen = render(&app, &view);

    assert!(screen.contains("attached: plan.md"), "{screen}");
}
