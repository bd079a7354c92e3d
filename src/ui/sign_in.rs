use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};

use crate::app::App;
use crate::auth::AuthState;

/// Shown instead of the tabs until an identity has resolved.
pub struct SignInView<'a> {
    state: &'a AuthState,
    app: &'a App,
}

impl<'a> SignInView<'a> {
    pub fn new(state: &'a AuthState, app: &'a App) -> Self {
        Self { state, app }
    }
}

impl Widget for SignInView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        block.render(area, buf);

        let dim = Style::default().fg(Color::DarkGray);
        let key = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Engagement Dashboard",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        match self.state {
            AuthState::Unresolved => {
                lines.push(Line::from(Span::styled("Checking your session...", dim)));
            }
            _ if self.app.signing_in() => {
                lines.push(Line::from("Finish signing in in your browser."));
                lines.push(Line::from(Span::styled(
                    format!(
                        "Waiting for the redirect on http://127.0.0.1:{}/",
                        self.app.config.callback_port
                    ),
                    dim,
                )));
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled("l", key),
                    Span::styled(" to open the sign-in page again", dim),
                ]));
            }
            _ => {
                lines.push(Line::from("You are not signed in."));
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled("l", key),
                    Span::raw(" sign in with your browser   "),
                    Span::styled("q", key),
                    Span::raw(" quit"),
                ]));
            }
        }

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
