//! Color palette for the Banter TUI.
//!
//! The dark theme is Kanagawa Wave, the light theme Kanagawa Lotus.
//! `Theme::System` sticks to the terminal's own colors (ANSI named colors
//! on a `Reset` background) so it follows whatever the user configured.

use ratatui::style::{Color, Modifier, Style};

use banter_types::Theme;

mod wave {
    use super::Color;

    pub const BG_DARK: Color = Color::Rgb(22, 22, 29); // sumiInk0
    pub const BG_PANEL: Color = Color::Rgb(31, 31, 40); // sumiInk3
    pub const BG_HIGHLIGHT: Color = Color::Rgb(42, 42, 55); // sumiInk4
    pub const BG_BORDER: Color = Color::Rgb(84, 84, 109); // sumiInk6
    pub const TEXT_PRIMARY: Color = Color::Rgb(220, 215, 186); // fujiWhite
    pub const TEXT_SECONDARY: Color = Color::Rgb(200, 192, 147); // oldWhite
    pub const TEXT_MUTED: Color = Color::Rgb(114, 113, 105); // fujiGray
    pub const ACCENT: Color = Color::Rgb(127, 180, 202); // springBlue
    pub const USER: Color = Color::Rgb(126, 156, 216); // crystalBlue
    pub const ASSISTANT: Color = Color::Rgb(149, 127, 184); // oniViolet
    pub const SUCCESS: Color = Color::Rgb(152, 187, 108); // springGreen
    pub const WARNING: Color = Color::Rgb(230, 195, 132); // carpYellow
    pub const ERROR: Color = Color::Rgb(255, 93, 98); // peachRed
}

mod lotus {
    use super::Color;

    pub const BG_DARK: Color = Color::Rgb(242, 236, 188); // lotusWhite3
    pub const BG_PANEL: Color = Color::Rgb(229, 221, 179); // lotusWhite1
    pub const BG_HIGHLIGHT: Color = Color::Rgb(219, 209, 171);
    pub const BG_BORDER: Color = Color::Rgb(140, 131, 105);
    pub const TEXT_PRIMARY: Color = Color::Rgb(84, 84, 100); // lotusInk1
    pub const TEXT_SECONDARY: Color = Color::Rgb(110, 109, 125);
    pub const TEXT_MUTED: Color = Color::Rgb(140, 139, 155);
    pub const ACCENT: Color = Color::Rgb(77, 105, 157); // lotusBlue4
    pub const USER: Color = Color::Rgb(77, 105, 157);
    pub const ASSISTANT: Color = Color::Rgb(109, 75, 134); // lotusViolet
    pub const SUCCESS: Color = Color::Rgb(111, 137, 76); // lotusGreen
    pub const WARNING: Color = Color::Rgb(203, 150, 61); // lotusYellow
    pub const ERROR: Color = Color::Rgb(199, 62, 58); // lotusRed
}

/// Resolved theme palette used by the UI.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_dark: Color,
    pub bg_panel: Color,
    pub bg_highlight: Color,
    pub bg_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub accent: Color,
    pub user: Color,
    pub assistant: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Palette {
    #[must_use]
    pub fn dark() -> Self {
        Self {
            bg_dark: wave::BG_DARK,
            bg_panel: wave::BG_PANEL,
            bg_highlight: wave::BG_HIGHLIGHT,
            bg_border: wave::BG_BORDER,
            text_primary: wave::TEXT_PRIMARY,
            text_secondary: wave::TEXT_SECONDARY,
            text_muted: wave::TEXT_MUTED,
            accent: wave::ACCENT,
            user: wave::USER,
            assistant: wave::ASSISTANT,
            success: wave::SUCCESS,
            warning: wave::WARNING,
            error: wave::ERROR,
        }
    }

    #[must_use]
    pub fn light() -> Self {
        Self {
            bg_dark: lotus::BG_DARK,
            bg_panel: lotus::BG_PANEL,
            bg_highlight: lotus::BG_HIGHLIGHT,
            bg_border: lotus::BG_BORDER,
            text_primary: lotus::TEXT_PRIMARY,
            text_secondary: lotus::TEXT_SECONDARY,
            text_muted: lotus::TEXT_MUTED,
            accent: lotus::ACCENT,
            user: lotus::USER,
            assistant: lotus::ASSISTANT,
            success: lotus::SUCCESS,
            warning: lotus::WARNING,
            error: lotus::ERROR,
        }
    }

    /// Terminal-default palette: named ANSI colors over the terminal's own
    /// background.
    #[must_use]
    pub fn terminal() -> Self {
        Self {
            bg_dark: Color::Reset,
            bg_panel: Color::Reset,
            bg_highlight: Color::DarkGray,
            bg_border: Color::DarkGray,
            text_primary: Color::Reset,
            text_secondary: Color::Gray,
            text_muted: Color::DarkGray,
            accent: Color::Cyan,
            user: Color::Blue,
            assistant: Color::Magenta,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }

    #[must_use]
    pub fn border(&self) -> Style {
        Style::default().fg(self.bg_border)
    }

    #[must_use]
    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.accent)
    }

    #[must_use]
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.text_primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn muted(&self) -> Style {
        Style::default().fg(self.text_muted)
    }
}

/// Resolve the configured theme to a palette.
#[must_use]
pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette::light(),
        Theme::Dark => Palette::dark(),
        Theme::System => Palette::terminal(),
    }
}
