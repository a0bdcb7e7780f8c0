//! Core domain types for Banter.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies. Everything here can be used from any layer of the
//! application.

mod chat;
mod file;
mod ids;
mod message;
mod settings;

pub use chat::Chat;
pub use file::{FileCategory, ParsedFile, format_file_size};
pub use ids::{ChatId, MessageId};
pub use message::{AssistantMessage, AttachmentRef, Message, Role, UserMessage};
pub use settings::{Settings, SettingsUpdate, Theme};
