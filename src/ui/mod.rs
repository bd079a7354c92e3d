pub mod advocacy;
pub mod composer;
pub mod feed;
pub mod format;
pub mod header;
pub mod help;
pub mod input;
pub mod leaderboard;
pub mod message_popup;
pub mod sign_in;
pub mod status_bar;

use std::borrow::Cow;
use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

use crate::actions::MessageKind;
use crate::app::App;
use crate::auth::AuthState;
use crate::slot::LoadState;
use crate::view::Tab;

use advocacy::AdvocacyView;
use composer::ComposerView;
use feed::FeedView;
use header::Header;
use help::HelpView;
use leaderboard::LeaderboardView;
use message_popup::MessagePopup;
use sign_in::SignInView;
use status_bar::StatusBar;

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let [header_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(area);

    frame.render_widget(Header::new(app), header_area);
    frame.render_widget(StatusBar::new(app), status_area);

    match app.dashboard.auth_state() {
        AuthState::Authenticated(_) => match app.dashboard.view.active_tab() {
            Tab::Leaderboard => frame.render_widget(LeaderboardView::new(app), main_area),
            Tab::Posts => frame.render_widget(FeedView::new(app), main_area),
            Tab::Publish => frame.render_widget(ComposerView::new(app), main_area),
            Tab::Advocacy => frame.render_widget(AdvocacyView::new(app), main_area),
        },
        state => frame.render_widget(SignInView::new(state, app), main_area),
    }

    if app.show_help {
        frame.render_widget(HelpView::new(), main_area);
    }

    // Successes go to the status bar; failures pop up until dismissed or expired.
    if let Some(msg) = app.dashboard.actions.message()
        && msg.kind == MessageKind::Error
    {
        let popup = MessagePopup::new(msg, app.config.message_ttl(), Instant::now());
        frame.render_widget(popup, area);
    }
}

/// Placeholder text for a dataset that has nothing to show yet.
///
/// A failed load reads the same as an empty one. `None` means there is data
/// and the caller should render it.
pub(crate) fn empty_state<T>(state: &LoadState<Vec<T>>, empty: &'static str) -> Option<&'static str> {
    match state {
        LoadState::NotLoaded | LoadState::Loading => Some("Loading..."),
        LoadState::Failed => Some(empty),
        LoadState::Loaded(rows) if rows.is_empty() => Some(empty),
        LoadState::Loaded(_) => None,
    }
}

/// The value to display, with a failed load shown as the zero value.
///
/// `None` while nothing has arrived yet.
pub(crate) fn shown_or_zero<T: Clone + Default>(state: &LoadState<T>) -> Option<Cow<'_, T>> {
    match state {
        LoadState::NotLoaded | LoadState::Loading => None,
        LoadState::Failed => Some(Cow::Owned(T::default())),
        LoadState::Loaded(value) => Some(Cow::Borrowed(value)),
    }
}

pub(crate) fn render_placeholder(text: &str, area: Rect, buf: &mut ratatui::buffer::Buffer) {
    if area.width < 2 || area.height == 0 {
        return;
    }
    buf.set_stringn(
        area.x + 1,
        area.y,
        text,
        (area.width - 1) as usize,
        Style::default().fg(Color::DarkGray),
    );
}

/// First visible row so that `selected` stays within `height` rows.
pub(crate) fn scroll_offset(selected: usize, height: usize) -> usize {
    if height == 0 {
        return selected;
    }
    selected.saturating_sub(height - 1)
}

/// Render pre-built lines, skipping the first `skip`.
pub(crate) fn render_lines(
    lines: Vec<ratatui::text::Line<'_>>,
    skip: usize,
    area: Rect,
    buf: &mut ratatui::buffer::Buffer,
) {
    ratatui::widgets::Paragraph::new(lines)
        .scroll((skip.min(u16::MAX as usize) as u16, 0))
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_keeps_selection_visible() {
        assert_eq!(scroll_offset(0, 10), 0);
        assert_eq!(scroll_offset(9, 10), 0);
        assert_eq!(scroll_offset(10, 10), 1);
        assert_eq!(scroll_offset(3, 0), 3);
    }

    #[test]
    fn empty_states() {
        let loading: LoadState<Vec<u8>> = LoadState::Loading;
        assert_eq!(empty_state(&loading, "No posts yet"), Some("Loading..."));
        let empty: LoadState<Vec<u8>> = LoadState::Loaded(vec![]);
        assert_eq!(empty_state(&empty, "No posts yet"), Some("No posts yet"));
        assert!(empty_state(&LoadState::Loaded(vec![1u8]), "").is_none());
    }

    #[test]
    fn failed_load_reads_as_empty_list() {
        let failed: LoadState<Vec<u8>> = LoadState::Failed;
        let empty: LoadState<Vec<u8>> = LoadState::Loaded(vec![]);
        assert_eq!(
            empty_state(&failed, "No posts yet"),
            empty_state(&empty, "No posts yet")
        );
    }

    #[test]
    fn failed_counters_fall_back_to_zero() {
        use crate::api::types::EngagementStats;

        let failed: LoadState<EngagementStats> = LoadState::Failed;
        assert_eq!(
            shown_or_zero(&failed).as_deref(),
            Some(&EngagementStats::default())
        );
        let loading: LoadState<EngagementStats> = LoadState::Loading;
        assert!(shown_or_zero(&loading).is_none());

        let loaded = LoadState::Loaded(EngagementStats {
            posts: 3,
            ..Default::default()
        });
        assert_eq!(shown_or_zero(&loaded).map(|s| s.posts), Some(3));
    }
}
