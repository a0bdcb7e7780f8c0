//! Application engine: the state store, persistence, connectivity probing,
//! and the message exchange flow, tied together by [`App`].
//!
//! [`App`] is the single owner of mutable state. UI layers call its methods
//! from one thread; network work runs on spawned tasks that report back
//! through an internal channel, drained by [`App::poll`]. Nothing in here
//! draws or reads the terminal.

pub mod connectivity;
pub mod exchange;
pub mod persistence;
pub mod store;

use std::path::PathBuf;
use std::time::SystemTime;

use tokio::sync::mpsc;
use tracing::warn;

use banter_ingest::parse_paths;
use banter_providers::{Endpoint, ModelInfo, ProviderError, list_models};
use banter_types::{Chat, ChatId, MessageId, SettingsUpdate};

pub use connectivity::{Connectivity, ConnectivityStatus, ProbeGeneration};
pub use exchange::{
    PreparedSend, SendError, complete_send, prepare_send, send_message, validate_send,
};
pub use persistence::{data_dir, load, save, state_path};
pub use store::{Store, StoreEvent};

/// Completion notices from spawned network tasks, consumed by [`App::poll`].
#[derive(Debug)]
enum EngineEvent {
    SendFinished {
        chat_id: ChatId,
        result: Result<String, SendError>,
    },
    ProbeFinished {
        generation: ProbeGeneration,
        result: Result<Vec<ModelInfo>, ProviderError>,
    },
}

/// Owns the store and drives every operation the UI exposes.
pub struct App {
    store: Store,
    connectivity: Connectivity,
    state_path: PathBuf,
    in_flight: bool,
    last_error: Option<String>,
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    events_rx: mpsc::UnboundedReceiver<EngineEvent>,
}

impl App {
    /// Load persisted state from the default location and, if a server URL
    /// is already configured, start a connectivity probe.
    #[must_use]
    pub fn new() -> Self {
        let state_path = persistence::state_path(&persistence::data_dir());
        Self::with_state_path(state_path)
    }

    #[must_use]
    pub fn with_state_path(state_path: PathBuf) -> Self {
        let store = persistence::load(&state_path);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut app = Self {
            store,
            connectivity: Connectivity::default(),
            state_path,
            in_flight: false,
            last_error: None,
            events_tx,
            events_rx,
        };
        if app.store.settings().server_url().is_some() {
            app.probe_server();
        }
        app
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn connectivity(&self) -> &ConnectivityStatus {
        self.connectivity.status()
    }

    /// True while a send is running; the UI disables input then.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn new_chat(&mut self, title: impl Into<String>) -> ChatId {
        let chat = Chat::new(title, SystemTime::now());
        let id = chat.id();
        self.store.add_chat(chat);
        self.persist();
        id
    }

    pub fn delete_chat(&mut self, id: ChatId) {
        self.store.delete_chat(id);
        self.persist();
    }

    pub fn select_chat(&mut self, id: ChatId) {
        self.store.set_active_chat(Some(id));
        self.persist();
    }

    pub fn rename_chat(&mut self, id: ChatId, title: impl Into<String>) {
        self.store.rename_chat(id, title);
        self.persist();
    }

    /// Apply a settings change. A server URL change restarts connectivity
    /// probing against the new address.
    pub fn update_settings(&mut self, update: SettingsUpdate) {
        let url_changed = update.changes_server_url(self.store.settings());
        self.store.update_settings(update);
        self.persist();
        if url_changed {
            self.connectivity.reset();
            if self.store.settings().server_url().is_some() {
                self.probe_server();
            }
        }
    }

    /// Issue `GET /v1/models` on a task, tagged with a fresh generation so a
    /// late result from an older probe cannot clobber a newer one.
    pub fn probe_server(&mut self) {
        let Some(url) = self.store.settings().server_url() else {
            return;
        };
        let generation = self.connectivity.begin_probe();
        let endpoint = match Endpoint::parse(url) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                self.connectivity.apply(generation, Err(e.to_string()));
                return;
            }
        };
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = list_models(&endpoint).await;
            let _ = tx.send(EngineEvent::ProbeFinished { generation, result });
        });
    }

    /// Start a send: ingest the staged files, record the user message, and
    /// issue the completion request on a task. Returns whether the send
    /// started; failures before the network step land in `last_error`.
    pub async fn submit(&mut self, content: &str, files: &[PathBuf]) -> bool {
        if self.in_flight {
            return false;
        }
        if self.connectivity.blocks_sending() {
            self.last_error = Some(SendError::Offline.to_string());
            return false;
        }
        // Validate before ingestion; a doomed send must not read files.
        if let Err(e) = exchange::validate_send(&self.store) {
            self.last_error = Some(e.to_string());
            return false;
        }
        let parsed = parse_paths(files).await;
        let prepared =
            match exchange::prepare_send(&mut self.store, content, &parsed, SystemTime::now()) {
                Ok(prepared) => prepared,
                Err(e) => {
                    self.last_error = Some(e.to_string());
                    return false;
                }
            };
        self.persist();
        self.in_flight = true;
        self.last_error = None;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let chat_id = prepared.chat_id;
            let result = exchange::perform_send(&prepared).await;
            let _ = tx.send(EngineEvent::SendFinished { chat_id, result });
        });
        true
    }

    /// Drain finished network tasks into the store. Returns the ids of
    /// messages appended this poll, for the UI to animate.
    pub fn poll(&mut self) -> Vec<MessageId> {
        let mut appended = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                EngineEvent::SendFinished { chat_id, result } => {
                    self.in_flight = false;
                    match result {
                        Ok(reply) => {
                            exchange::complete_send(
                                &mut self.store,
                                chat_id,
                                reply,
                                SystemTime::now(),
                            );
                            if let Some(message) =
                                self.store.chat(chat_id).and_then(|c| c.messages().last())
                            {
                                appended.push(message.id());
                            }
                            self.persist();
                        }
                        Err(e) => {
                            self.last_error = Some(e.to_string());
                        }
                    }
                }
                EngineEvent::ProbeFinished { generation, result } => {
                    let models = match result {
                        Ok(models) => models,
                        Err(e) => {
                            self.connectivity.apply(generation, Err(e.to_string()));
                            continue;
                        }
                    };
                    if self.connectivity.apply(generation, Ok(()))
                        && let Some(first) = models.first()
                    {
                        self.store
                            .update_settings(SettingsUpdate::active_model(&first.id));
                        self.persist();
                    }
                }
            }
        }
        appended
    }

    /// Write the snapshot; persistence failures are reported, never fatal.
    fn persist(&self) {
        if let Err(e) = persistence::save(&self.store, &self.state_path) {
            warn!(path = %self.state_path.display(), error = %e, "failed to persist state");
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
