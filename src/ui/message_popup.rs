use std::time::{Duration, Instant};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use crate::actions::{MessageKind, StatusMessage};
use crate::ui::format::wrap_text;

const WIDTH: u16 = 60;

/// Centered notice for the outcome of a publish, share or sync.
pub struct MessagePopup<'a> {
    message: &'a StatusMessage,
    remaining: Duration,
}

impl<'a> MessagePopup<'a> {
    pub fn new(message: &'a StatusMessage, ttl: Duration, now: Instant) -> Self {
        let shown_for = now.saturating_duration_since(message.shown_at);
        Self {
            message,
            remaining: ttl.saturating_sub(shown_for),
        }
    }

    fn accent(&self) -> (&'static str, Color) {
        match self.message.kind {
            MessageKind::Error => (" Action failed ", Color::Red),
            MessageKind::Success => (" Done ", Color::Green),
        }
    }

    fn hint(&self) -> String {
        // Rounded up.
        let secs = self.remaining.as_millis().div_ceil(1000);
        format!(" Esc dismiss \u{00B7} closes in {secs}s ")
    }
}

impl Widget for MessagePopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = WIDTH.min(area.width.saturating_sub(4));
        if width < 3 || area.height < 3 {
            return;
        }
        let body = wrap_text(&self.message.text, width.saturating_sub(2) as usize);
        let height = (body.len().max(1) as u16 + 2).min(area.height.saturating_sub(2).max(3));
        let panel = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );
        Clear.render(panel, buf);

        let (title, color) = self.accent();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .title_bottom(Line::from(Span::styled(
                self.hint(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )))
            .border_style(Style::default().fg(color));
        let inner = block.inner(panel);
        block.render(panel, buf);

        let lines: Vec<Line<'_>> = body.into_iter().map(Line::from).collect();
        Paragraph::new(lines).render(inner, buf);
    }
}
