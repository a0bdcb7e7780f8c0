//! Transient view state: the compose line, staged attachments, transcript
//! scroll, reveal animations, and the settings overlay. None of this is
//! persisted; the store holds everything durable.

use std::path::PathBuf;

use banter_types::{Settings, SettingsUpdate};

use crate::animation::TypingReveals;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    #[default]
    None,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Theme,
    TypingAnimation,
    TypingSpeed,
    ServerUrl,
}

impl SettingsField {
    pub const ALL: [Self; 4] = [
        Self::Theme,
        Self::TypingAnimation,
        Self::TypingSpeed,
        Self::ServerUrl,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Theme => "Theme",
            Self::TypingAnimation => "Typing animation",
            Self::TypingSpeed => "Typing speed (ms)",
            Self::ServerUrl => "Server URL",
        }
    }
}

/// Edit state of the settings overlay. Changes accumulate in `pending` and
/// are committed as one update when the overlay closes.
#[derive(Debug, Default)]
pub struct SettingsForm {
    pub selected: SettingsField,
    pub pending: SettingsUpdate,
    pub url_draft: String,
    original_url: String,
}

impl Default for SettingsField {
    fn default() -> Self {
        Self::Theme
    }
}

impl SettingsForm {
    pub fn select_previous(&mut self) {
        let index = Self::index_of(self.selected);
        self.selected = SettingsField::ALL[index.checked_sub(1).unwrap_or(3)];
    }

    pub fn select_next(&mut self) {
        let index = Self::index_of(self.selected);
        self.selected = SettingsField::ALL[(index + 1) % SettingsField::ALL.len()];
    }

    fn index_of(field: SettingsField) -> usize {
        SettingsField::ALL
            .iter()
            .position(|f| *f == field)
            .unwrap_or(0)
    }
}

#[derive(Debug, Default)]
pub struct View {
    pub overlay: Overlay,
    pub input: String,
    /// Cursor as a char offset into `input`.
    pub cursor: usize,
    pub staged: Vec<PathBuf>,
    pub settings: SettingsForm,
    pub reveals: TypingReveals,
    /// Lines scrolled up from the transcript bottom; 0 follows new output.
    pub scroll: u16,
}

impl View {
    pub fn insert_char(&mut self, c: char) {
        let byte = self.cursor_byte();
        self.input.insert(byte, c);
        self.cursor += 1;
    }

    pub fn insert_text(&mut self, text: &str) {
        let byte = self.cursor_byte();
        self.input.insert_str(byte, text);
        self.cursor += text.chars().count();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte = self.cursor_byte();
        self.input.remove(byte);
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn open_settings(&mut self, settings: &Settings) {
        self.overlay = Overlay::Settings;
        self.settings = SettingsForm {
            url_draft: settings.server_url.clone(),
            original_url: settings.server_url.clone(),
            ..SettingsForm::default()
        };
    }

    /// Close the overlay, returning the accumulated update if anything
    /// actually changed.
    pub fn close_settings(&mut self) -> Option<SettingsUpdate> {
        self.overlay = Overlay::None;
        let form = std::mem::take(&mut self.settings);
        let mut update = form.pending.clone();
        if form.url_draft != form.original_url {
            update.server_url = Some(form.url_draft);
        }
        let changed = update.theme.is_some()
            || update.typing_animation.is_some()
            || update.typing_speed_ms.is_some()
            || update.server_url.is_some()
            || update.active_model.is_some();
        changed.then_some(update)
    }

    fn cursor_byte(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor)
            .map_or(self.input.len(), |(byte, _)| byte)
    }
}
