//! Text helpers shared by the views.

use chrono::{DateTime, Utc};
use ratatui::style::{Color, Style};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Post text width in the feed.
pub const FEED_PREVIEW_COLUMNS: usize = 140;
/// Post text width in share suggestions.
pub const SUGGESTION_PREVIEW_COLUMNS: usize = 200;

/// Cut `text` to at most `max` display columns, ending with `...` when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let budget = max.saturating_sub(3);
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str("...");
    out
}

/// Greedy word wrap by display width.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![];
    }
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.width() + 1 + word.width() <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(current);
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

pub fn format_time_ago(dt: DateTime<Utc>) -> String {
    let diff = Utc::now().signed_duration_since(dt);

    if diff.num_seconds() < 60 {
        format!("{}s", diff.num_seconds().max(0))
    } else if diff.num_minutes() < 60 {
        format!("{}m", diff.num_minutes())
    } else if diff.num_hours() < 24 {
        format!("{}h", diff.num_hours())
    } else if diff.num_days() < 30 {
        format!("{}d", diff.num_days())
    } else {
        dt.format("%b %d, %Y").to_string()
    }
}

pub fn format_timestamp(dt: Option<DateTime<Utc>>) -> String {
    dt.map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Rank badge: a medal for the podium, `#n` otherwise.
pub fn rank_badge(rank: usize) -> (String, Style) {
    match rank {
        1 => ("\u{1F947}".to_string(), Style::default().fg(Color::Yellow)),
        2 => ("\u{1F948}".to_string(), Style::default().fg(Color::Gray)),
        3 => ("\u{1F949}".to_string(), Style::default().fg(Color::LightRed)),
        n => (format!("#{n}"), Style::default().fg(Color::DarkGray)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_leaves_short_text() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn truncate_cuts_by_display_width() {
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        // Each CJK character is two columns wide.
        assert_eq!(truncate("日本語テキスト", 9), "日本語...");
    }

    #[test]
    fn wrap_respects_width() {
        assert_eq!(
            wrap_text("one two three four", 9),
            vec!["one two", "three", "four"]
        );
        assert_eq!(wrap_text("", 5), vec![String::new()]);
        assert!(wrap_text("anything", 0).is_empty());
    }

    #[test]
    fn podium_gets_medals() {
        assert_eq!(rank_badge(1).0, "\u{1F947}");
        assert_eq!(rank_badge(3).0, "\u{1F949}");
        assert_eq!(rank_badge(4).0, "#4");
    }

    #[test]
    fn counts_abbreviate() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_500), "1.5K");
        assert_eq!(format_count(2_000_000), "2.0M");
    }
}
