use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Widget};

use crate::api::types::{AdvocacyStats, AdvocacySuggestion};
use crate::app::App;
use crate::ui::format::{
    SUGGESTION_PREVIEW_COLUMNS, format_count, format_time_ago, rank_badge, truncate, wrap_text,
};
use crate::ui::{empty_state, render_lines, render_placeholder, shown_or_zero};

/// Share suggestions on the left, advocacy counters on the right.
pub struct AdvocacyView<'a> {
    app: &'a App,
}

impl<'a> AdvocacyView<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }
}

fn panel(title: &'static str) -> Block<'static> {
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

fn suggestion_lines(
    suggestion: &AdvocacySuggestion,
    selected: bool,
    sharing: bool,
    width: usize,
) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    let head_style = if selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let action = if suggestion.already_shared {
        Span::styled("  \u{2713} shared", Style::default().fg(Color::Green))
    } else if sharing {
        Span::styled("  sharing...", Style::default().fg(Color::Yellow))
    } else if selected {
        Span::styled("  Enter: share", Style::default().fg(Color::Cyan))
    } else {
        Span::raw("")
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(if selected { "\u{25B8} " } else { "  " }, head_style),
        Span::styled(
            suggestion
                .published_at
                .map(format_time_ago)
                .unwrap_or_else(|| "undated".to_string()),
            head_style,
        ),
        Span::styled(
            format!("  {} shares", format_count(suggestion.total_shares)),
            dim,
        ),
        action,
    ])];
    let preview = truncate(&suggestion.text, SUGGESTION_PREVIEW_COLUMNS);
    for text in wrap_text(&preview, width.saturating_sub(2)) {
        lines.push(Line::from(format!("  {text}")));
    }
    lines.push(Line::from(""));
    lines
}

fn stats_lines(stats: &AdvocacyStats) -> Vec<Line<'static>> {
    let bold = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);
    let counter = |n: u64, label: &'static str| {
        Line::from(vec![
            Span::styled(format!(" {:>6}", format_count(n)), bold),
            Span::styled(format!(" {label}"), dim),
        ])
    };

    let mut lines = vec![
        counter(stats.total_shares, "total shares"),
        counter(stats.active_advocates, "active advocates"),
        counter(stats.posts_available, "posts available"),
        Line::from(""),
        Line::from(Span::styled(
            " Top advocates",
            Style::default().fg(Color::Cyan),
        )),
    ];
    if stats.top_advocates.is_empty() {
        lines.push(Line::from(Span::styled(" Nobody has shared yet.", dim)));
    }
    for (idx, advocate) in stats.top_advocates.iter().enumerate() {
        let (badge, style) = rank_badge(idx + 1);
        let name = if advocate.name.is_empty() {
            advocate.sub.clone()
        } else {
            advocate.name.clone()
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {badge:>4} "), style),
            Span::raw(name),
            Span::styled(format!("  {} shares", format_count(advocate.share_count)), dim),
        ]));
    }
    lines
}

impl Widget for AdvocacyView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = &self.app.dashboard.view;
        let [list_area, stats_area] =
            Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)]).areas(area);

        // -- Suggestions --
        let block = panel(" Share suggestions ");
        let inner = block.inner(list_area);
        block.render(list_area, buf);

        match empty_state(view.suggestions.state(), "Nothing to share right now.") {
            Some(text) => render_placeholder(text, inner, buf),
            None => {
                let selected = self.app.selected_index();
                let sharing = self.app.dashboard.actions.sharing();
                let width = inner.width as usize;
                let mut lines = Vec::new();
                let mut selected_start = 0;
                let mut selected_end = 0;
                for (idx, suggestion) in view
                    .suggestions
                    .data()
                    .map(Vec::as_slice)
                    .unwrap_or_default()
                    .iter()
                    .enumerate()
                {
                    if idx == selected {
                        selected_start = lines.len();
                    }
                    lines.extend(suggestion_lines(
                        suggestion,
                        idx == selected,
                        sharing == Some(suggestion.post_id.as_str()),
                        width,
                    ));
                    if idx == selected {
                        selected_end = lines.len();
                    }
                }
                let height = inner.height as usize;
                let skip = if selected_end > height {
                    (selected_end - height).min(selected_start)
                } else {
                    0
                };
                render_lines(lines, skip, inner, buf);
            }
        }

        // -- Stats --
        let block = panel(" Advocacy ");
        let inner = block.inner(stats_area);
        block.render(stats_area, buf);

        match shown_or_zero(view.advocacy_stats.state()) {
            Some(stats) => render_lines(stats_lines(&stats), 0, inner, buf),
            None => render_placeholder("Loading...", inner, buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn shared_suggestion_shows_no_share_prompt() {
        let suggestion: AdvocacySuggestion = serde_json::from_value(serde_json::json!({
            "postId": "p",
            "text": "news",
            "alreadyShared": true,
        }))
        .unwrap();
        let header = plain(&suggestion_lines(&suggestion, true, false, 80)[0]);
        assert!(header.contains("shared"));
        assert!(!header.contains("Enter: share"));
    }

    #[test]
    fn top_advocates_keep_backend_order_with_medals() {
        let stats: AdvocacyStats = serde_json::from_value(serde_json::json!({
            "totalShares": 9,
            "topAdvocates": [
                {"sub": "a", "name": "Ann", "shareCount": 5},
                {"sub": "b", "name": "Bo", "shareCount": 5},
                {"sub": "c", "shareCount": 1},
                {"sub": "d", "name": "Di", "shareCount": 0}
            ]
        }))
        .unwrap();
        let lines: Vec<String> = stats_lines(&stats).iter().map(plain).collect();
        let ranked = &lines[5..];
        assert!(ranked[0].contains("\u{1F947}") && ranked[0].contains("Ann"));
        assert!(ranked[1].contains("\u{1F948}") && ranked[1].contains("Bo"));
        assert!(ranked[2].contains("\u{1F949}") && ranked[2].contains(" c "));
        assert!(ranked[3].contains("#4") && ranked[3].contains("Di"));
    }
}
