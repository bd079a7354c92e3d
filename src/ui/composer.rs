use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Widget};

use crate::api::types::{SyncLog, SyncState};
use crate::app::{App, AppMode};
use crate::ui::format::{format_count, format_timestamp};
use crate::ui::input::TextArea;
use crate::ui::{render_placeholder, shown_or_zero};

/// Publish tab: the post composer and the sync panel.
pub struct ComposerView<'a> {
    app: &'a App,
}

impl<'a> ComposerView<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }
}

fn log_line(log: &SyncLog, prefix: &'static str) -> Line<'static> {
    let state_style = match log.state() {
        SyncState::Success => Style::default().fg(Color::Green),
        SyncState::Failure => Style::default().fg(Color::Red),
        SyncState::Running => Style::default().fg(Color::Yellow),
        SyncState::Other => Style::default().fg(Color::DarkGray),
    };
    Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::DarkGray)),
        Span::styled(format!("#{:<5}", log.id), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{:<8}", log.status), state_style),
        Span::raw(format!(" {}", format_timestamp(log.started_at))),
        Span::styled(
            format!(
                "  {} posts, {} engagements",
                format_count(log.posts_processed),
                format_count(log.engagements_found)
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

impl Widget for ComposerView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let actions = &self.app.dashboard.actions;
        let composing = self.app.mode == AppMode::Compose;
        let [compose_area, sync_area] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

        // -- Composer --
        let title = if actions.is_publishing() {
            " New post \u{00B7} publishing... ".to_string()
        } else {
            format!(" New post \u{00B7} {} chars ", actions.compose.trim().chars().count())
        };
        let border = if composing { Color::Cyan } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .title_bottom(Line::from(Span::styled(
                if composing {
                    " Enter publish \u{00B7} Alt+Enter newline \u{00B7} Esc stop editing "
                } else {
                    " i write "
                },
                Style::default().fg(Color::DarkGray),
            )))
            .border_style(Style::default().fg(border));
        let inner = block.inner(compose_area);
        block.render(compose_area, buf);
        TextArea::new(&actions.compose)
            .focused(composing)
            .placeholder("Press i to write a post for the company page.")
            .render(inner, buf);

        // -- Sync --
        let view = &self.app.dashboard.view;
        let mut title = vec![Span::styled(
            " Sync ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];
        if view.sync_status.data().is_some_and(|s| s.mock_mode) {
            title.push(Span::styled(
                "[mock mode] ",
                Style::default().fg(Color::Black).bg(Color::Yellow),
            ));
        }
        title.push(Span::styled(
            if actions.is_syncing() {
                "\u{00B7} syncing... "
            } else {
                "\u{00B7} S sync now "
            },
            Style::default().fg(Color::DarkGray),
        ));
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Line::from(title))
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(sync_area);
        block.render(sync_area, buf);

        let Some(status) = shown_or_zero(view.sync_status.state()) else {
            render_placeholder("Loading...", inner, buf);
            return;
        };

        let Some(last) = status.last_sync() else {
            render_placeholder("No sync has run yet.", inner, buf);
            return;
        };

        let mut lines = vec![log_line(last, " Last  ")];
        let earlier: Vec<Line<'_>> = status.earlier().map(|log| log_line(log, "       ")).collect();
        if !earlier.is_empty() {
            lines.push(Line::from(Span::styled(
                " Earlier",
                Style::default().fg(Color::DarkGray),
            )));
            lines.extend(earlier);
        }
        crate::ui::render_lines(lines, 0, inner, buf);
    }
}
