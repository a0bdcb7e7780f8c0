//! Conversation message domain model.
//!
//! Contains the `Message` sum type and its role-specific structs.
//! Constructors take `SystemTime` explicitly; callers own the clock.
//! Messages are immutable once created - the store only ever appends.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::ids::MessageId;

/// Wire-level role of a message, as sent to the chat-completions endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Reference to an attached file as the user supplied it.
///
/// This is what gets recorded on the user message: the raw handle, not the
/// extracted text. Extraction output is transient and only ever rendered
/// into the outgoing model context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    name: String,
    declared_type: String,
    size: u64,
}

impl AttachmentRef {
    #[must_use]
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            size,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMessage {
    id: MessageId,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    attachments: Vec<AttachmentRef>,
    timestamp: SystemTime,
}

impl UserMessage {
    #[must_use]
    pub fn new(content: impl Into<String>, timestamp: SystemTime) -> Self {
        Self {
            id: MessageId::generate(),
            content: content.into(),
            attachments: Vec::new(),
            timestamp,
        }
    }

    #[must_use]
    pub fn with_attachments(
        content: impl Into<String>,
        attachments: Vec<AttachmentRef>,
        timestamp: SystemTime,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            content: content.into(),
            attachments,
            timestamp,
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn attachments(&self) -> &[AttachmentRef] {
        &self.attachments
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantMessage {
    id: MessageId,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    model: Option<String>,
    timestamp: SystemTime,
}

impl AssistantMessage {
    #[must_use]
    pub fn new(content: impl Into<String>, model: Option<String>, timestamp: SystemTime) -> Self {
        Self {
            id: MessageId::generate(),
            content: content.into(),
            model,
            timestamp,
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}

/// A complete message.
///
/// This is a real sum type (not a `Role` tag + "sometimes-meaningful"
/// fields). There is no animation flag here: whether a message has finished
/// its typing reveal is view state, keyed by [`MessageId`] in the TUI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    User(UserMessage),
    Assistant(AssistantMessage),
}

impl Message {
    #[must_use]
    pub fn user(content: impl Into<String>, timestamp: SystemTime) -> Self {
        Self::User(UserMessage::new(content, timestamp))
    }

    #[must_use]
    pub fn user_with_attachments(
        content: impl Into<String>,
        attachments: Vec<AttachmentRef>,
        timestamp: SystemTime,
    ) -> Self {
        Self::User(UserMessage::with_attachments(content, attachments, timestamp))
    }

    #[must_use]
    pub fn assistant(
        content: impl Into<String>,
        model: Option<String>,
        timestamp: SystemTime,
    ) -> Self {
        Self::Assistant(AssistantMessage::new(content, model, timestamp))
    }

    #[must_use]
    pub fn id(&self) -> MessageId {
        match self {
            Message::User(m) => m.id,
            Message::Assistant(m) => m.id,
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Message::User(_) => Role::User,
            Message::Assistant(_) => Role::Assistant,
        }
    }

    #[must_use]
    pub fn role_str(&self) -> &'static str {
        match self.role() {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Message::User(m) => m.content(),
            Message::Assistant(m) => m.content(),
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> SystemTime {
        match self {
            Message::User(m) => m.timestamp,
            Message::Assistant(m) => m.timestamp,
        }
    }
}
