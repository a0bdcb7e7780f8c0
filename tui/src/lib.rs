//! TUI rendering for Banter using ratatui.

mod animation;
mod input;
mod theme;
mod view;

pub use animation::TypingReveals;
pub use input::{UiAction, handle_events};
pub use theme::{Palette, palette};
pub use view::{Overlay, SettingsField, View};

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph},
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use banter_engine::{App, ConnectivityStatus};
use banter_types::{Message, format_file_size};

const SIDEBAR_WIDTH: u16 = 26;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &App, view: &View) {
    let palette = palette(app.store().settings().theme);

    let bg = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg, frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(frame.area());

    draw_sidebar(frame, app, columns[0], &palette);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // transcript
            Constraint::Length(3), // compose line
            Constraint::Length(1), // status bar
        ])
        .split(columns[1]);

    draw_transcript(frame, app, view, rows[0], &palette);
    draw_compose(frame, app, view, rows[1], &palette);
    draw_status_bar(frame, app, view, rows[2], &palette);

    if view.overlay == Overlay::Settings {
        draw_settings(frame, app, view, &palette);
    }
}

fn draw_sidebar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let active = app.store().active_chat_id();
    let items: Vec<ListItem> = app
        .store()
        .chats()
        .iter()
        .map(|chat| {
            let selected = active == Some(chat.id());
            let style = if selected {
                Style::default()
                    .fg(palette.text_primary)
                    .bg(palette.bg_highlight)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.text_secondary)
            };
            let marker = if selected { "> " } else { "  " };
            ListItem::new(Line::from(Span::styled(
                format!("{marker}{}", truncate_to_width(chat.title(), area.width.saturating_sub(4) as usize)),
                style,
            )))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(Span::styled(" Chats ", palette.title()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(palette.border())
            .style(Style::default().bg(palette.bg_panel)),
    );
    frame.render_widget(list, area);
}

fn draw_transcript(frame: &mut Frame, app: &App, view: &View, area: Rect, palette: &Palette) {
    let block = Block::default()
        .title(chat_title(app, palette))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border())
        .style(Style::default().bg(palette.bg_dark));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(chat) = app.store().active_chat() else {
        let hint = Paragraph::new(Line::from(Span::styled(
            "Ctrl+N starts a new chat",
            palette.muted(),
        )));
        frame.render_widget(hint, inner);
        return;
    };

    let width = inner.width as usize;
    let mut lines: Vec<Line> = Vec::new();
    for message in chat.messages() {
        push_message_lines(&mut lines, message, view, width, palette);
    }
    if app.in_flight() {
        lines.push(Line::from(Span::styled("...", palette.muted())));
    }

    // Anchor to the bottom, then apply the user's scrollback offset.
    let visible = inner.height as usize;
    let bottom = lines.len().saturating_sub(visible);
    let offset = bottom.saturating_sub(view.scroll as usize);
    let paragraph = Paragraph::new(lines).scroll((offset as u16, 0));
    frame.render_widget(paragraph, inner);
}

fn chat_title<'a>(app: &App, palette: &Palette) -> Line<'a> {
    let title = app
        .store()
        .active_chat()
        .map_or_else(|| "Banter".to_string(), |c| c.title().to_string());
    Line::from(Span::styled(format!(" {title} "), palette.title()))
}

fn push_message_lines(
    lines: &mut Vec<Line>,
    message: &Message,
    view: &View,
    width: usize,
    palette: &Palette,
) {
    let (name, color) = match message {
        Message::User(_) => ("You".to_string(), palette.user),
        Message::Assistant(a) => (
            a.model().unwrap_or("Assistant").to_string(),
            palette.assistant,
        ),
    };
    let stamp = timestamp_label(message);
    lines.push(Line::from(vec![
        Span::styled(name, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {stamp}"), palette.muted()),
    ]));

    let content = view.reveals.visible(message.id(), message.content());
    for row in wrap_text(content, width) {
        lines.push(Line::from(Span::styled(
            row,
            Style::default().fg(palette.text_primary),
        )));
    }

    if let Message::User(user) = message {
        for attachment in user.attachments() {
            lines.push(Line::from(Span::styled(
                format!(
                    "+ {} ({})",
                    attachment.name(),
                    format_file_size(attachment.size())
                ),
                Style::default().fg(palette.accent),
            )));
        }
    }
    lines.push(Line::default());
}

fn timestamp_label(message: &Message) -> String {
    let time: chrono::DateTime<chrono::Local> = message.timestamp().into();
    time.format("%H:%M").to_string()
}

fn draw_compose(frame: &mut Frame, app: &App, view: &View, area: Rect, palette: &Palette) {
    let title = if view.staged.is_empty() {
        " Message ".to_string()
    } else {
        let names: Vec<_> = view
            .staged
            .iter()
            .map(|p| {
                p.file_name()
                    .map_or_else(|| p.display().to_string(), |n| n.to_string_lossy().into_owned())
            })
            .collect();
        format!(" Message · attached: {} ", names.join(", "))
    };
    let border = if app.in_flight() {
        palette.border()
    } else {
        palette.border_focused()
    };
    let block = Block::default()
        .title(Span::styled(title, palette.title()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .style(Style::default().bg(palette.bg_panel));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(Line::from(Span::styled(
        view.input.clone(),
        Style::default().fg(palette.text_primary),
    )));
    frame.render_widget(paragraph, inner);

    if !app.in_flight() {
        let prefix: String = view.input.chars().take(view.cursor).collect();
        let x = inner.x + prefix.width() as u16;
        if x < inner.x + inner.width {
            frame.set_cursor_position((x, inner.y));
        }
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, view: &View, area: Rect, palette: &Palette) {
    let mut spans = Vec::new();

    let (glyph, style) = match app.connectivity() {
        ConnectivityStatus::Ok => ("● online", Style::default().fg(palette.success)),
        ConnectivityStatus::Error(_) => ("● offline", Style::default().fg(palette.error)),
        ConnectivityStatus::Unknown => ("○ unknown", palette.muted()),
    };
    spans.push(Span::styled(glyph, style));

    let model = &app.store().settings().active_model;
    if !model.is_empty() {
        spans.push(Span::styled(format!("  {model}"), palette.muted()));
    }

    if app.in_flight() {
        spans.push(Span::styled(
            "  sending...",
            Style::default().fg(palette.warning),
        ));
    }

    if let Some(error) = app.last_error() {
        spans.push(Span::styled(
            format!("  {error}"),
            Style::default().fg(palette.error),
        ));
    } else if view.overlay == Overlay::None {
        spans.push(Span::styled(
            "  Ctrl+N new · Ctrl+W delete · Alt+↑↓ switch · Ctrl+S settings · /attach <path>",
            palette.muted(),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_settings(frame: &mut Frame, app: &App, view: &View, palette: &Palette) {
    let area = centered_rect(frame.area(), 50, 10);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(Span::styled(" Settings (Esc saves) ", palette.title()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border_focused())
        .style(Style::default().bg(palette.bg_panel));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let settings = app.store().settings();
    let form = &view.settings;
    let mut lines = Vec::new();
    for field in SettingsField::ALL {
        let value = match field {
            SettingsField::Theme => {
                format!("{:?}", form.pending.theme.unwrap_or(settings.theme))
            }
            SettingsField::TypingAnimation => {
                let on = form
                    .pending
                    .typing_animation
                    .unwrap_or(settings.typing_animation);
                if on { "on".to_string() } else { "off".to_string() }
            }
            SettingsField::TypingSpeed => form
                .pending
                .typing_speed_ms
                .unwrap_or(settings.typing_speed_ms)
                .to_string(),
            SettingsField::ServerUrl => form.url_draft.clone(),
        };
        let style = if field == form.selected {
            Style::default()
                .fg(palette.text_primary)
                .bg(palette.bg_highlight)
        } else {
            Style::default().fg(palette.text_secondary)
        };
        lines.push(Line::from(Span::styled(
            format!(" {:<20} {value}", field.label()),
            style,
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let w = grapheme.width();
        if used + w + 1 > max {
            break;
        }
        used += w;
        out.push_str(grapheme);
    }
    out.push('…');
    out
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for raw_line in text.split('\n') {
        if raw_line.is_empty() {
            rows.push(String::new());
            continue;
        }
        let mut row = String::new();
        let mut used = 0;
        for word in raw_line.split_whitespace() {
            let w = word.width();
            if used > 0 && used + 1 + w > width {
                rows.push(std::mem::take(&mut row));
                used = 0;
            }
            if used > 0 {
                row.push(' ');
                used += 1;
            }
            // A word wider than the line hard-wraps by grapheme.
            if w > width {
                for grapheme in word.graphemes(true) {
                    let gw = grapheme.width();
                    if used + gw > width {
                        rows.push(std::mem::take(&mut row));
                        used = 0;
                    }
                    row.push_str(grapheme);
                    used += gw;
                }
            } else {
                row.push_str(word);
                used += w;
            }
        }
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width_and_blank_lines() {
        let rows = wrap_text("one two three\n\nfour", 9);
        assert_eq!(rows, vec!["one two", "three", "", "four"]);
    }

    #[test]
    fn wrap_hard_breaks_oversized_words() {
        let rows = wrap_text("abcdefghij", 4);
        assert_eq!(rows, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn truncation_appends_an_ellipsis() {
        assert_eq!(truncate_to_width("long chat title", 8), "long ch…");
        assert_eq!(truncate_to_width("short", 8), "short");
    }
}
