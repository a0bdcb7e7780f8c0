//! Typing-reveal animation for assistant replies.
//!
//! A reveal is pure view state: the store always holds the full message and
//! the animation only controls how much of it is drawn this frame. Reveal
//! progress advances one grapheme per `typing_speed_ms` tick, so pacing is
//! uniform regardless of frame rate.

use std::collections::HashMap;
use std::time::Duration;

use unicode_segmentation::UnicodeSegmentation;

use banter_types::MessageId;

#[derive(Debug)]
struct Reveal {
    shown: usize,
    total: usize,
    carry: Duration,
}

/// Tracks which messages are mid-reveal. Messages it has never seen draw in
/// full, so pre-existing history is unaffected.
#[derive(Debug, Default)]
pub struct TypingReveals {
    active: HashMap<MessageId, Reveal>,
}

impl TypingReveals {
    /// Start revealing a freshly appended message.
    pub fn start(&mut self, id: MessageId, content: &str) {
        let total = content.graphemes(true).count();
        if total == 0 {
            return;
        }
        self.active.insert(
            id,
            Reveal {
                shown: 0,
                total,
                carry: Duration::ZERO,
            },
        );
    }

    /// Advance all reveals by the elapsed frame time.
    pub fn advance(&mut self, delta: Duration, step: Duration) {
        if step.is_zero() {
            self.active.clear();
            return;
        }
        self.active.retain(|_, reveal| {
            reveal.carry += delta;
            while reveal.carry >= step && reveal.shown < reveal.total {
                reveal.carry -= step;
                reveal.shown += 1;
            }
            reveal.shown < reveal.total
        });
    }

    /// Skip straight to the full text, e.g. on user input.
    pub fn finish_all(&mut self) {
        self.active.clear();
    }

    #[must_use]
    pub fn any_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// The visible portion of `content` for this frame.
    #[must_use]
    pub fn visible<'a>(&self, id: MessageId, content: &'a str) -> &'a str {
        match self.active.get(&id) {
            None => content,
            Some(reveal) => {
                match content.grapheme_indices(true).nth(reveal.shown) {
                    Some((byte, _)) => &content[..byte],
                    None => content,
                }
            }
        }
    }
}
