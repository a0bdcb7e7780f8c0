//! The message exchange flow.
//!
//! One send is: validate configuration, ingest attachments, snapshot the
//! conversation context, record the user message, issue a single
//! chat-completion request, record the reply. The flow is split into a
//! synchronous prepare step (store mutations), the network call, and a
//! synchronous complete step, so the owner can run the network call on a
//! task while the store stays on the UI thread. [`send_message`] composes
//! the three for callers (and tests) that can simply await.
//!
//! Sends are not queued or deduplicated here; the single-in-flight
//! invariant belongs to the caller, which disables input while a send is
//! running.

use std::time::SystemTime;

use banter_ingest::{FileSource, parse_files};
use banter_providers::{ChatTurn, CompletionRequest, Endpoint, ProviderError, chat_completion};
use banter_types::{AttachmentRef, Chat, ChatId, Message, ParsedFile, Role};

use crate::store::Store;

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Configure the server URL in settings first")]
    NoServerUrl,
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
    #[error("Select or create a chat first")]
    NoActiveChat,
    #[error("Server unreachable - fix the URL in settings")]
    Offline,
    #[error("Request failed: {0}")]
    Request(ProviderError),
}

/// Everything the network step needs, produced after the user message has
/// been recorded.
#[derive(Debug)]
pub struct PreparedSend {
    pub chat_id: ChatId,
    pub endpoint: Endpoint,
    pub request: CompletionRequest,
}

/// Check everything a send needs before any work happens: a configured
/// URL that parses, and an active chat. Runs before ingestion so a doomed
/// send never touches the filesystem.
pub fn validate_send(store: &Store) -> Result<(Endpoint, ChatId), SendError> {
    let url = store.settings().server_url().ok_or(SendError::NoServerUrl)?;
    let endpoint = Endpoint::parse(url).map_err(|e| SendError::InvalidUrl(e.to_string()))?;
    let chat_id = store.active_chat_id().ok_or(SendError::NoActiveChat)?;
    Ok((endpoint, chat_id))
}

/// Validate, build the context, and record the user message.
///
/// On error nothing has been mutated. On success the user message (raw
/// content plus raw attachment refs, not parsed text) has been appended to
/// the active chat and the returned request carries the full context: every
/// message that preceded this send, then one final user turn combining the
/// typed content with a rendered block per attachment.
pub fn prepare_send(
    store: &mut Store,
    content: &str,
    parsed: &[ParsedFile],
    now: SystemTime,
) -> Result<PreparedSend, SendError> {
    let (endpoint, chat_id) = validate_send(store)?;
    let model = store.settings().active_model.clone();

    let mut turns: Vec<ChatTurn> = store
        .chat(chat_id)
        .map(Chat::messages)
        .unwrap_or_default()
        .iter()
        .map(|m| ChatTurn::new(m.role(), m.content()))
        .collect();
    turns.push(ChatTurn::new(Role::User, final_turn_text(content, parsed)));

    let attachments: Vec<AttachmentRef> = parsed
        .iter()
        .map(|p| AttachmentRef::new(&p.name, p.category.label(), p.size))
        .collect();
    store.add_message(
        chat_id,
        Message::user_with_attachments(content, attachments, now),
    );

    Ok(PreparedSend {
        chat_id,
        endpoint,
        request: CompletionRequest::new(turns, model),
    })
}

/// The network step: one POST, no retry.
pub async fn perform_send(prepared: &PreparedSend) -> Result<String, SendError> {
    chat_completion(&prepared.endpoint, &prepared.request)
        .await
        .map_err(SendError::Request)
}

/// Record a successful reply as an assistant message.
pub fn complete_send(store: &mut Store, chat_id: ChatId, content: String, now: SystemTime) {
    let model = store.settings().active_model.clone();
    let model = if model.is_empty() { None } else { Some(model) };
    store.add_message(chat_id, Message::assistant(content, model, now));
}

/// The whole flow in one await: ingest, prepare, send, record.
///
/// A request failure leaves the already-recorded user message in place and
/// appends nothing; recovery is the user's resend.
pub async fn send_message(
    store: &mut Store,
    content: &str,
    files: &[FileSource],
) -> Result<(), SendError> {
    validate_send(store)?;
    let parsed = parse_files(files).await;
    let prepared = prepare_send(store, content, &parsed, SystemTime::now())?;
    let reply = perform_send(&prepared).await?;
    complete_send(store, prepared.chat_id, reply, SystemTime::now());
    Ok(())
}

fn final_turn_text(content: &str, parsed: &[ParsedFile]) -> String {
    if parsed.is_empty() {
        return content.to_string();
    }
    let mut text = content.to_string();
    for file in parsed {
        text.push_str("\n\n");
        text.push_str(&file.context_block());
    }
    text
}
