use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::ids::ChatId;
use crate::message::Message;

/// A single conversation: a title plus an append-only message sequence.
///
/// Insertion order is conversation order. Existing messages are never
/// replaced or reordered; the only mutations are appending a message and
/// renaming the chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    id: ChatId,
    title: String,
    messages: Vec<Message>,
    created_at: SystemTime,
}

impl Chat {
    #[must_use]
    pub fn new(title: impl Into<String>, created_at: SystemTime) -> Self {
        Self {
            id: ChatId::generate(),
            title: title.into(),
            messages: Vec::new(),
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> ChatId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    #[must_use]
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_appends_in_order() {
        let mut chat = Chat::new("Test", SystemTime::UNIX_EPOCH);
        chat.push_message(Message::user("one", SystemTime::UNIX_EPOCH));
        chat.push_message(Message::user("two", SystemTime::UNIX_EPOCH));
        let contents: Vec<_> = chat.messages().iter().map(Message::content).collect();
        assert_eq!(contents, ["one", "two"]);
    }
}
