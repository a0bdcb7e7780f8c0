//! End-to-end exchange flow against a mock server.

use std::time::SystemTime;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use banter_engine::{SendError, Store, send_message};
use banter_types::{Chat, Message, Role, SettingsUpdate};

fn store_with_chat(server_url: Option<&str>) -> (Store, banter_types::ChatId) {
    let mut store = Store::default();
    if let Some(url) = server_url {
        store.update_settings(SettingsUpdate::server_url(url));
        store.update_settings(SettingsUpdate::active_model("test-model"));
    }
    let chat = Chat::new("Chat", SystemTime::UNIX_EPOCH);
    let id = chat.id();
    store.add_chat(chat);
    (store, id)
}

#[tokio::test]
async fn unconfigured_url_fails_without_mutating() {
    let (mut store, chat_id) = store_with_chat(None);
    let err = send_message(&mut store, "hello", &[]).await.unwrap_err();
    assert!(matches!(err, SendError::NoServerUrl));
    assert!(store.chat(chat_id).unwrap().messages().is_empty());
}

#[tokio::test]
async fn successful_send_records_both_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "hi there"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (mut store, chat_id) = store_with_chat(Some(&server.uri()));
    send_message(&mut store, "hello", &[]).await.unwrap();

    let messages = store.chat(chat_id).unwrap().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role(), Role::User);
    assert_eq!(messages[0].content(), "hello");
    assert_eq!(messages[1].role(), Role::Assistant);
    assert_eq!(messages[1].content(), "hi there");
    match &messages[1] {
        Message::Assistant(a) => assert_eq!(a.model(), Some("test-model")),
        Message::User(_) => panic!("expected assistant message"),
    }
}

#[tokio::test]
async fn server_error_keeps_user_message_only() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let (mut store, chat_id) = store_with_chat(Some(&server.uri()));
    let err = send_message(&mut store, "hello", &[]).await.unwrap_err();
    assert!(matches!(err, SendError::Request(_)));

    let messages = store.chat(chat_id).unwrap().messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role(), Role::User);
}

#[tokio::test]
async fn context_carries_history_and_file_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "messages": [
                {"role": "user", "content": "first"},
                {"role": "assistant", "content": "reply"},
                {"role": "user",
                 "content": "summarize\n\n[File: notes.txt (text)]\nContent:\nremember the milk"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "summary"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (mut store, chat_id) = store_with_chat(Some(&server.uri()));
    store.add_message(chat_id, Message::user("first", SystemTime::UNIX_EPOCH));
    store.add_message(
        chat_id,
        Message::assistant("reply", None, SystemTime::UNIX_EPOCH),
    );

    let files = [banter_ingest::FileSource::new(
        "notes.txt",
        Some("text/plain".into()),
        b"remember the milk".to_vec(),
    )];
    send_message(&mut store, "summarize", &files).await.unwrap();

    // The mock's expect(1) verifies the body; the store gained both turns.
    assert_eq!(store.chat(chat_id).unwrap().messages().len(), 4);
}
