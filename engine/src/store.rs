//! The application state store.
//!
//! Holds chats, the active-chat pointer, and settings. Every operation is
//! synchronous and total: unknown ids are ignored, nothing returns an
//! error. Each mutation emits a [`StoreEvent`] on a broadcast channel so
//! views can re-render reactively; a lagging subscriber only misses redraw
//! hints, never data.
//!
//! Persistence is explicit: the store itself never touches disk. The owner
//! calls [`crate::persistence::save`] after mutating.

use banter_types::{Chat, ChatId, Message, Settings, SettingsUpdate};
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Change notification emitted after each mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    ChatsChanged,
    ActiveChatChanged,
    MessageAppended { chat_id: ChatId },
    SettingsChanged,
}

#[derive(Debug)]
pub struct Store {
    chats: Vec<Chat>,
    active_chat: Option<ChatId>,
    settings: Settings,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(Vec::new(), None, Settings::default())
    }
}

impl Store {
    #[must_use]
    pub fn new(chats: Vec<Chat>, active_chat: Option<ChatId>, settings: Settings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        // Rehydrated state may predate a chat deletion; never point at a
        // chat that does not exist.
        let active_chat = active_chat.filter(|id| chats.iter().any(|c| c.id() == *id));
        Self {
            chats,
            active_chat,
            settings,
            events,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    #[must_use]
    pub fn chat(&self, id: ChatId) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id() == id)
    }

    #[must_use]
    pub fn active_chat_id(&self) -> Option<ChatId> {
        self.active_chat
    }

    #[must_use]
    pub fn active_chat(&self) -> Option<&Chat> {
        self.active_chat.and_then(|id| self.chat(id))
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Point the UI at a chat, or at nothing. An id that does not reference
    /// an existing chat is treated as `None`.
    pub fn set_active_chat(&mut self, id: Option<ChatId>) {
        self.active_chat = id.filter(|id| self.chat(*id).is_some());
        self.notify(StoreEvent::ActiveChatChanged);
    }

    /// Add a chat and make it the active one.
    pub fn add_chat(&mut self, chat: Chat) {
        let id = chat.id();
        self.chats.push(chat);
        self.active_chat = Some(id);
        self.notify(StoreEvent::ChatsChanged);
        self.notify(StoreEvent::ActiveChatChanged);
    }

    /// Delete a chat. Clears the active pointer when it referenced the
    /// deleted chat; unknown ids are a no-op.
    pub fn delete_chat(&mut self, id: ChatId) {
        let before = self.chats.len();
        self.chats.retain(|c| c.id() != id);
        if self.chats.len() == before {
            return;
        }
        if self.active_chat == Some(id) {
            self.active_chat = None;
            self.notify(StoreEvent::ActiveChatChanged);
        }
        self.notify(StoreEvent::ChatsChanged);
    }

    pub fn rename_chat(&mut self, id: ChatId, title: impl Into<String>) {
        if let Some(chat) = self.chats.iter_mut().find(|c| c.id() == id) {
            chat.set_title(title);
            self.notify(StoreEvent::ChatsChanged);
        }
    }

    /// Append a message to a chat. Unknown chat ids are a no-op.
    pub fn add_message(&mut self, chat_id: ChatId, message: Message) {
        if let Some(chat) = self.chats.iter_mut().find(|c| c.id() == chat_id) {
            chat.push_message(message);
            self.notify(StoreEvent::MessageAppended { chat_id });
        }
    }

    pub fn update_settings(&mut self, update: SettingsUpdate) {
        self.settings.apply(update);
        self.notify(StoreEvent::SettingsChanged);
    }

    fn notify(&self, event: StoreEvent) {
        // No receivers is fine; headless use (tests) never subscribes.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn chat(title: &str) -> Chat {
        Chat::new(title, SystemTime::UNIX_EPOCH)
    }

    fn active_is_valid(store: &Store) -> bool {
        match store.active_chat_id() {
            None => true,
            Some(id) => store.chat(id).is_some(),
        }
    }

    #[test]
    fn add_chat_activates_it() {
        let mut store = Store::default();
        let c = chat("A");
        let id = c.id();
        store.add_chat(c);
        assert_eq!(store.active_chat_id(), Some(id));
    }

    #[test]
    fn deleting_active_chat_clears_pointer() {
        let mut store = Store::default();
        let a = chat("A");
        let a_id = a.id();
        store.add_chat(a);
        store.delete_chat(a_id);
        assert_eq!(store.active_chat_id(), None);
        assert!(store.chats().is_empty());
    }

    #[test]
    fn deleting_non_active_chat_keeps_pointer() {
        let mut store = Store::default();
        let a = chat("A");
        let a_id = a.id();
        let b = chat("B");
        let b_id = b.id();
        store.add_chat(a);
        store.add_chat(b);
        store.delete_chat(a_id);
        assert_eq!(store.active_chat_id(), Some(b_id));
    }

    #[test]
    fn active_pointer_stays_valid_across_arbitrary_sequences() {
        let mut store = Store::default();
        let mut ids = Vec::new();
        for i in 0..8 {
            let c = chat(&format!("chat {i}"));
            ids.push(c.id());
            store.add_chat(c);
            assert!(active_is_valid(&store));
        }
        // Delete in an order that crosses the active pointer several times.
        for id in [ids[7], ids[0], ids[3], ids[7], ids[5]] {
            store.delete_chat(id);
            assert!(active_is_valid(&store));
        }
        store.set_active_chat(Some(ids[1]));
        assert!(active_is_valid(&store));
        store.set_active_chat(Some(ids[0])); // already deleted
        assert_eq!(store.active_chat_id(), None);
    }

    #[test]
    fn add_message_appends_exactly_one_and_keeps_priors() {
        let mut store = Store::default();
        let c = chat("A");
        let id = c.id();
        store.add_chat(c);
        store.add_message(id, Message::user("one", SystemTime::UNIX_EPOCH));
        let before: Vec<_> = store
            .chat(id)
            .unwrap()
            .messages()
            .iter()
            .map(|m| (m.id(), m.content().to_string()))
            .collect();

        store.add_message(id, Message::user("two", SystemTime::UNIX_EPOCH));

        let after = store.chat(id).unwrap().messages();
        assert_eq!(after.len(), before.len() + 1);
        for (prior, kept) in before.iter().zip(after) {
            assert_eq!(prior.0, kept.id());
            assert_eq!(prior.1, kept.content());
        }
        assert_eq!(after.last().unwrap().content(), "two");
    }

    #[test]
    fn add_message_to_unknown_chat_is_a_no_op() {
        let mut store = Store::default();
        let orphan = chat("gone");
        let orphan_id = orphan.id();
        store.add_message(orphan_id, Message::user("lost", SystemTime::UNIX_EPOCH));
        assert!(store.chats().is_empty());
    }

    #[test]
    fn mutations_emit_events() {
        let mut store = Store::default();
        let mut rx = store.subscribe();
        let c = chat("A");
        let id = c.id();
        store.add_chat(c);
        store.add_message(id, Message::user("hi", SystemTime::UNIX_EPOCH));

        assert_eq!(rx.try_recv(), Ok(StoreEvent::ChatsChanged));
        assert_eq!(rx.try_recv(), Ok(StoreEvent::ActiveChatChanged));
        assert_eq!(rx.try_recv(), Ok(StoreEvent::MessageAppended { chat_id: id }));
    }

    #[test]
    fn rehydration_drops_dangling_active_pointer() {
        let orphan = chat("gone");
        let orphan_id = orphan.id();
        drop(orphan);
        let store = Store::new(vec![chat("kept")], Some(orphan_id), Settings::default());
        assert_eq!(store.active_chat_id(), None);
    }
}
