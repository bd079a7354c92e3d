use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Tabs, Widget};

use crate::app::App;
use crate::ui::format::format_count;
use crate::ui::shown_or_zero;
use crate::view::Tab;

/// Tab bar plus the signed-in identity and engagement stats.
pub struct Header<'a> {
    app: &'a App,
}

impl<'a> Header<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }

    fn identity_line(&self) -> Line<'a> {
        let dim = Style::default().fg(Color::DarkGray);
        let Some(identity) = self.app.dashboard.auth_state().identity() else {
            return Line::from(Span::styled(" not signed in", dim));
        };

        let mut spans = vec![
            Span::raw(" "),
            Span::styled(
                identity.display_name(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        if identity.email_verified {
            spans.push(Span::styled(" \u{2713}", Style::default().fg(Color::Blue)));
        }
        if !identity.email.is_empty() {
            spans.push(Span::styled(format!("  {}", identity.email), dim));
        }

        if let Some(stats) = shown_or_zero(self.app.dashboard.view.stats.state()) {
            spans.push(Span::styled("  \u{2502} ", dim));
            spans.push(Span::styled(
                format!("\u{2665} {}", format_count(stats.reactions)),
                Style::default().fg(Color::Red),
            ));
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("\u{1F4AC} {}", format_count(stats.comments)),
                Style::default().fg(Color::Blue),
            ));
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("{} posts", format_count(stats.posts)),
                dim,
            ));
            if let Some(rank) = stats.rank {
                spans.push(Span::styled(
                    format!("  rank #{rank}"),
                    Style::default().fg(Color::Yellow),
                ));
            }
        } else if self.app.dashboard.view.stats.is_loading() {
            spans.push(Span::styled("  \u{2502} loading stats...", dim));
        }
        Line::from(spans)
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        block.render(area, buf);

        let titles: Vec<Line<'_>> = Tab::ALL
            .iter()
            .enumerate()
            .map(|(i, tab)| Line::from(format!(" {} {} ", i + 1, tab.title())))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.app.dashboard.view.active_tab().index())
            .style(Style::default().fg(Color::DarkGray))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            )
            .divider("");

        let tabs_area = Rect::new(inner.x, inner.y, inner.width, 1);
        tabs.render(tabs_area, buf);

        if inner.height > 1 {
            let line = self.identity_line();
            buf.set_line(inner.x, inner.y + 1, &line, inner.width);
        }
    }
}
