use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Widget};

use crate::api::types::EngagementRow;
use crate::app::App;
use crate::ui::format::{format_count, rank_badge, truncate};
use crate::ui::{empty_state, render_lines, render_placeholder, scroll_offset};

/// Ranked leaderboard for the selected period, with the team list beside it.
pub struct LeaderboardView<'a> {
    app: &'a App,
}

impl<'a> LeaderboardView<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }
}

fn panel(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .border_style(Style::default().fg(Color::DarkGray))
}

/// One ranked row. Rank is the row's position in the backend's order.
fn ranked_line(rank: usize, row: &EngagementRow, selected: bool, name_width: usize) -> Line<'static> {
    let (badge, badge_style) = rank_badge(rank);
    let name_style = if selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(Color::White)
    };
    let name = if row.name.is_empty() { &row.sub } else { &row.name };

    Line::from(vec![
        Span::styled(format!(" {badge:>4} "), badge_style),
        Span::styled(
            format!("{:<name_width$}", truncate(name, name_width)),
            name_style,
        ),
        Span::styled(
            format!(" \u{2665} {:>5}", format_count(row.reaction_count)),
            Style::default().fg(Color::Red),
        ),
        Span::styled(
            format!("  \u{1F4AC} {:>5}", format_count(row.comment_count)),
            Style::default().fg(Color::Blue),
        ),
        Span::styled(
            format!("  = {}", format_count(row.total())),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])
}

impl Widget for LeaderboardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = &self.app.dashboard.view;
        let [board_area, team_area] =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(area);

        // -- Leaderboard --
        let block = panel(format!(
            " Leaderboard \u{00B7} {}  [p] ",
            view.period().label()
        ));
        let inner = block.inner(board_area);
        block.render(board_area, buf);

        match empty_state(view.leaderboard.state(), "No engagement yet for this period.") {
            Some(text) => render_placeholder(text, inner, buf),
            None => {
                let rows = view.leaderboard.data().map(Vec::as_slice).unwrap_or_default();
                let selected = self.app.selected_index();
                let name_width = (inner.width as usize).saturating_sub(32).clamp(8, 32);
                let lines: Vec<Line<'_>> = rows
                    .iter()
                    .enumerate()
                    .map(|(idx, row)| ranked_line(idx + 1, row, idx == selected, name_width))
                    .collect();
                render_lines(lines, scroll_offset(selected, inner.height as usize), inner, buf);
            }
        }

        // -- Team --
        let block = panel(" Team ".to_string());
        let inner = block.inner(team_area);
        block.render(team_area, buf);

        match empty_state(view.team.state(), "No team members yet.") {
            Some(text) => render_placeholder(text, inner, buf),
            None => {
                let dim = Style::default().fg(Color::DarkGray);
                let width = inner.width as usize;
                let lines: Vec<Line<'_>> = view
                    .team
                    .data()
                    .map(Vec::as_slice)
                    .unwrap_or_default()
                    .iter()
                    .map(|member| {
                        let name = if member.name.is_empty() {
                            &member.sub
                        } else {
                            &member.name
                        };
                        let mut spans = vec![Span::raw(" "), Span::raw(truncate(name, width / 2))];
                        if member.email_verified {
                            spans.push(Span::styled(" \u{2713}", Style::default().fg(Color::Blue)));
                        }
                        spans.push(Span::styled(
                            format!(
                                "  {} / {}",
                                format_count(member.reaction_count),
                                format_count(member.comment_count)
                            ),
                            dim,
                        ));
                        Line::from(spans)
                    })
                    .collect();
                render_lines(lines, 0, inner, buf);
            }
        }
    }
}
