use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

use crate::actions::MessageKind;
use crate::app::{App, AppMode};
use crate::view::{Tab, ViewController};

/// Bottom status bar showing mode, current tab, activity, and messages.
pub struct StatusBar<'a> {
    pub app: &'a App,
}

impl<'a> StatusBar<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }
}

/// Whether anything the active tab shows is still loading.
fn tab_loading(view: &ViewController) -> bool {
    let tab_busy = match view.active_tab() {
        Tab::Leaderboard => view.leaderboard.is_loading() || view.team.is_loading(),
        Tab::Posts => view.posts.is_loading() || view.drilldown.is_loading(),
        Tab::Publish => view.sync_status.is_loading(),
        Tab::Advocacy => view.suggestions.is_loading() || view.advocacy_stats.is_loading(),
    };
    tab_busy || view.stats.is_loading()
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        // Background
        let bg_style = Style::default().bg(Color::DarkGray).fg(Color::White);
        for x in area.x..area.x + area.width {
            buf[(x, area.y)].set_style(bg_style);
        }

        let mut spans = Vec::new();

        let (mode_str, mode_bg) = match self.app.mode {
            AppMode::Normal => (" NORMAL ", Color::Blue),
            AppMode::Compose => (" COMPOSE ", Color::Magenta),
        };
        spans.push(Span::styled(
            mode_str,
            Style::default()
                .bg(mode_bg)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" "));

        let dashboard = &self.app.dashboard;
        spans.push(Span::styled(
            dashboard.view.active_tab().title().to_string(),
            bg_style,
        ));

        let busy = tab_loading(&dashboard.view)
            || dashboard.actions.is_publishing()
            || dashboard.actions.is_syncing()
            || dashboard.actions.sharing().is_some();
        if busy {
            spans.push(Span::styled(
                " [loading...]",
                Style::default().bg(Color::DarkGray).fg(Color::Yellow),
            ));
        }

        // Right side: the latest success message, else the key hint.
        let (msg, msg_fg) = match dashboard.actions.message() {
            Some(m) if m.kind == MessageKind::Success => (m.text.as_str(), Color::Green),
            _ => ("? help  q quit ", Color::Gray),
        };
        let left_width: usize = spans.iter().map(|s| s.width()).sum();
        let room = (area.width as usize).saturating_sub(left_width + 1);
        if room > 0 {
            let shown = crate::ui::format::truncate(msg, room);
            let padding = room.saturating_sub(shown.width());
            spans.push(Span::styled(" ".repeat(padding + 1), bg_style));
            spans.push(Span::styled(
                shown,
                Style::default().bg(Color::DarkGray).fg(msg_fg),
            ));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
