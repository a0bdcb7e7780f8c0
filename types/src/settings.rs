//! User settings: a persisted singleton mutated via partial updates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub typing_animation: bool,
    /// Milliseconds per reveal step of the typing animation.
    pub typing_speed_ms: u64,
    /// Base URL of the local model server. Empty means not configured.
    pub server_url: String,
    pub active_model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            typing_animation: true,
            typing_speed_ms: 30,
            server_url: String::new(),
            active_model: String::new(),
        }
    }
}

impl Settings {
    /// The configured server URL, or `None` when it has never been set.
    #[must_use]
    pub fn server_url(&self) -> Option<&str> {
        let trimmed = self.server_url.trim();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    }

    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(theme) = update.theme {
            self.theme = theme;
        }
        if let Some(typing_animation) = update.typing_animation {
            self.typing_animation = typing_animation;
        }
        if let Some(typing_speed_ms) = update.typing_speed_ms {
            self.typing_speed_ms = typing_speed_ms;
        }
        if let Some(server_url) = update.server_url {
            self.server_url = server_url;
        }
        if let Some(active_model) = update.active_model {
            self.active_model = active_model;
        }
    }
}

/// Partial settings update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub theme: Option<Theme>,
    pub typing_animation: Option<bool>,
    pub typing_speed_ms: Option<u64>,
    pub server_url: Option<String>,
    pub active_model: Option<String>,
}

impl SettingsUpdate {
    #[must_use]
    pub fn server_url(url: impl Into<String>) -> Self {
        Self {
            server_url: Some(url.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn active_model(model: impl Into<String>) -> Self {
        Self {
            active_model: Some(model.into()),
            ..Self::default()
        }
    }

    /// True when applying this update would change the server URL.
    #[must_use]
    pub fn changes_server_url(&self, current: &Settings) -> bool {
        self.server_url
            .as_deref()
            .is_some_and(|url| url.trim() != current.server_url.trim())
    }
}
