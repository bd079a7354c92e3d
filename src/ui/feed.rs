use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Widget};

use crate::api::types::{EngagementDetail, EngagementType, Post};
use crate::app::App;
use crate::drilldown::DrillDown;
use crate::ui::format::{
    FEED_PREVIEW_COLUMNS, format_count, format_time_ago, truncate, wrap_text,
};
use crate::ui::{empty_state, render_lines, render_placeholder};

/// Company post feed. The expanded post shows who engaged with it.
pub struct FeedView<'a> {
    app: &'a App,
}

impl<'a> FeedView<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }
}

fn post_lines(post: &Post, selected: bool, expanded: bool, width: usize) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    let marker = if expanded { "\u{25BE}" } else { "\u{25B8}" };
    let head_style = if selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let mut header = vec![Span::styled(format!("{marker} "), head_style)];
    header.push(Span::styled(
        post.published_at
            .map(format_time_ago)
            .unwrap_or_else(|| "undated".to_string()),
        head_style,
    ));
    if post.is_published_here() {
        header.push(Span::styled(" [published here]", Style::default().fg(Color::Green)));
    }

    let mut lines = vec![Line::from(header)];
    let preview = truncate(&post.text, FEED_PREVIEW_COLUMNS);
    for text in wrap_text(&preview, width.saturating_sub(2)) {
        lines.push(Line::from(Span::raw(format!("  {text}"))));
    }
    lines.push(Line::from(vec![
        Span::styled(
            format!("  \u{2665} {}", format_count(post.reaction_count)),
            Style::default().fg(Color::Red),
        ),
        Span::styled(
            format!("  \u{1F4AC} {}", format_count(post.comment_count)),
            Style::default().fg(Color::Blue),
        ),
        Span::styled(if selected { "   Enter: engagements" } else { "" }, dim),
    ]));
    lines
}

fn detail_lines(drilldown: &DrillDown) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    let Some(detail) = drilldown.detail() else {
        return vec![Line::from(Span::styled("    Loading engagements...", dim))];
    };

    let mut lines = engagement_lines(detail);
    if drilldown.show_fields() {
        lines.push(Line::from(Span::styled(
            "    Data we can read about members:",
            Style::default().fg(Color::Cyan),
        )));
        if detail.accessible_fields.is_empty() {
            lines.push(Line::from(Span::styled("      (none listed)", dim)));
        }
        for field in &detail.accessible_fields {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("      {}", field.field),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {}", field.description), dim),
            ]));
        }
    } else if !detail.accessible_fields.is_empty() {
        lines.push(Line::from(Span::styled(
            "    d: show data fields",
            dim,
        )));
    }
    lines
}

fn engagement_lines(detail: &EngagementDetail) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    if detail.engagements.is_empty() {
        return vec![Line::from(Span::styled("    No engagements recorded.", dim))];
    }

    let mut lines = vec![Line::from(Span::styled(
        format!("    {} engagements", detail.total_count),
        Style::default().fg(Color::Cyan),
    ))];
    for engagement in &detail.engagements {
        let badge_style = match engagement.engagement_type {
            EngagementType::Reaction => Style::default().fg(Color::Red),
            EngagementType::Comment => Style::default().fg(Color::Blue),
            EngagementType::Other => dim,
        };
        let who = if engagement.name.is_empty() {
            engagement.sub.clone()
        } else {
            engagement.name.clone()
        };
        let mut spans = vec![
            Span::styled(format!("    {:<10}", engagement.label()), badge_style),
            Span::raw(who),
        ];
        if !engagement.email.is_empty() {
            spans.push(Span::styled(format!("  {}", engagement.email), dim));
        }
        if let Some(at) = engagement.engaged_at {
            spans.push(Span::styled(format!("  {}", format_time_ago(at)), dim));
        }
        lines.push(Line::from(spans));
    }
    lines
}

impl Widget for FeedView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = &self.app.dashboard.view;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Posts ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        block.render(area, buf);

        if let Some(text) = empty_state(view.posts.state(), "No posts yet.") {
            render_placeholder(text, inner, buf);
            return;
        }

        let posts = view.posts.data().map(Vec::as_slice).unwrap_or_default();
        let selected = self.app.selected_index();
        let width = inner.width as usize;

        let mut lines = Vec::new();
        let mut selected_start = 0;
        let mut selected_end = 0;
        for (idx, post) in posts.iter().enumerate() {
            if idx == selected {
                selected_start = lines.len();
            }
            let expanded = view.drilldown.is_expanded(&post.post_id);
            lines.extend(post_lines(post, idx == selected, expanded, width));
            if expanded {
                lines.extend(detail_lines(&view.drilldown));
            }
            if idx == selected {
                selected_end = lines.len();
            }
            lines.push(Line::from(Span::styled(
                "\u{2500}".repeat(width),
                Style::default().fg(Color::DarkGray),
            )));
        }

        let height = inner.height as usize;
        // Keep the selected post (and its detail) on screen, top first.
        let skip = if selected_end > height {
            (selected_end - height).min(selected_start)
        } else {
            0
        };
        render_lines(lines, skip, inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(text: &str, source: &str) -> Post {
        serde_json::from_value(serde_json::json!({
            "postId": "p",
            "text": text,
            "source": source,
            "reactionCount": 3,
        }))
        .unwrap()
    }

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn long_post_text_is_truncated() {
        let text = "word ".repeat(60);
        let lines = post_lines(&post(&text, "synced"), false, false, 400);
        let body = plain(&lines[1]);
        assert!(body.ends_with("..."));
        assert!(body.trim().chars().count() <= FEED_PREVIEW_COLUMNS);
    }

    #[test]
    fn published_here_is_marked() {
        let lines = post_lines(&post("hi", "published"), false, false, 80);
        assert!(plain(&lines[0]).contains("[published here]"));
        let lines = post_lines(&post("hi", "sync"), false, false, 80);
        assert!(!plain(&lines[0]).contains("[published here]"));
    }

    #[test]
    fn empty_detail_says_so() {
        let lines = engagement_lines(&EngagementDetail::default());
        assert_eq!(plain(&lines[0]).trim(), "No engagements recorded.");
    }
}
