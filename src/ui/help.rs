use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

/// Keybindings grouped by section.
const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("1-4/Tab", "Switch tab"),
            ("j/k", "Move selection"),
            ("r", "Refresh this tab"),
        ],
    ),
    (
        "Leaderboard & posts",
        &[
            ("p", "Next leaderboard period"),
            ("Enter", "Expand / collapse post"),
            ("d", "Toggle data fields panel"),
        ],
    ),
    (
        "Publish & advocacy",
        &[
            ("i", "Write a post"),
            ("Enter", "Publish while writing"),
            ("S", "Run a sync"),
            ("Enter", "Share suggestion"),
        ],
    ),
    (
        "Session",
        &[
            ("l / L", "Sign in / sign out"),
            ("Esc", "Dismiss message"),
            ("q/Ctrl-C", "Quit"),
        ],
    ),
];

/// Help overlay showing keybindings.
#[derive(Default)]
pub struct HelpView;

impl HelpView {
    pub fn new() -> Self {
        Self
    }

    fn lines() -> Vec<Line<'static>> {
        let key_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let section_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        let mut lines = Vec::new();
        for (i, (title, bindings)) in SECTIONS.iter().enumerate() {
            if i > 0 {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(*title, section_style)));
            lines.extend(bindings.iter().map(|(key, desc)| {
                Line::from(vec![
                    Span::styled(format!("  {key:<12}"), key_style),
                    Span::raw(*desc),
                ])
            }));
        }
        lines
    }
}

impl Widget for HelpView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = Self::lines();
        let width = 50u16.min(area.width.saturating_sub(4));
        let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
        let panel = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );

        Clear.render(panel, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Keys \u{00B7} ? to close ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(panel);
        block.render(panel, buf);

        Paragraph::new(lines).render(inner, buf);
    }
}
