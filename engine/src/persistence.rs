//! Snapshot persistence for the state store.
//!
//! The entire state (chats, active pointer, settings) is serialized as one
//! versioned JSON document and written atomically (temp file + rename)
//! after every mutation. It is read back exactly once, at startup; a
//! missing or unreadable snapshot yields the default state. There is no
//! migration machinery beyond the version tag.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use banter_types::{Chat, ChatId, Settings};
use serde::{Deserialize, Serialize};

use crate::store::Store;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    chats: Vec<Chat>,
    active_chat: Option<ChatId>,
    settings: Settings,
}

/// Where Banter keeps its state and logs.
///
/// `BANTER_DATA_DIR` overrides the platform data directory; the fallback
/// of last resort is the current directory.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("BANTER_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map_or_else(|| PathBuf::from("."), |d| d.join("banter"))
}

#[must_use]
pub fn state_path(data_dir: &Path) -> PathBuf {
    data_dir.join("state.json")
}

/// Serialize the store and write it atomically.
pub fn save(store: &Store, path: &Path) -> anyhow::Result<()> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        chats: store.chats().to_vec(),
        active_chat: store.active_chat_id(),
        settings: store.settings().clone(),
    };
    let bytes = serde_json::to_vec_pretty(&snapshot)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    atomic_write(path, &bytes)?;
    Ok(())
}

/// Load the snapshot, or fall back to the default state.
///
/// Any failure (absent file, bad JSON, unknown version) is logged and
/// swallowed: a broken snapshot must not keep the app from starting.
#[must_use]
pub fn load(path: &Path) -> Store {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Store::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), "failed to read state snapshot: {e}");
            return Store::default();
        }
    };

    match serde_json::from_slice::<Snapshot>(&bytes) {
        Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION => {
            Store::new(snapshot.chats, snapshot.active_chat, snapshot.settings)
        }
        Ok(snapshot) => {
            tracing::warn!(
                version = snapshot.version,
                "unknown snapshot version; starting fresh"
            );
            Store::default()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "failed to parse state snapshot: {e}");
            Store::default()
        }
    }
}

/// Temp file + rename so a crash mid-write never truncates the snapshot.
fn atomic_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use banter_types::{Message, SettingsUpdate};
    use std::time::SystemTime;

    #[test]
    fn snapshot_round_trips_chats_active_and_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = Store::default();
        let chat = Chat::new("Ideas", SystemTime::UNIX_EPOCH);
        let chat_id = chat.id();
        store.add_chat(chat);
        store.add_message(chat_id, Message::user("hello", SystemTime::UNIX_EPOCH));
        store.update_settings(SettingsUpdate::server_url("http://localhost:1234"));

        save(&store, &path).unwrap();
        let restored = load(&path);

        assert_eq!(restored.chats().len(), 1);
        assert_eq!(restored.active_chat_id(), Some(chat_id));
        assert_eq!(restored.chats()[0].title(), "Ideas");
        assert_eq!(restored.chats()[0].messages()[0].content(), "hello");
        assert_eq!(
            restored.settings().server_url(),
            Some("http://localhost:1234")
        );
    }

    #[test]
    fn missing_snapshot_yields_default_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = load(&dir.path().join("nope.json"));
        assert!(store.chats().is_empty());
        assert_eq!(store.active_chat_id(), None);
    }

    #[test]
    fn corrupt_snapshot_yields_default_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, b"{ definitely not json").unwrap();
        let store = load(&path);
        assert!(store.chats().is_empty());
    }

    #[test]
    fn future_version_is_not_half_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            br#"{"version":99,"chats":[],"active_chat":null,"settings":{}}"#,
        )
        .unwrap();
        let store = load(&path);
        assert!(store.chats().is_empty());
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/state.json");
        save(&Store::default(), &path).unwrap();
        assert!(path.exists());
    }
}
