use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthChar;

/// Multi-line text area renderer with a cursor block at the end.
///
/// Lines are hard-wrapped at the area width. When the text is taller than
/// the area, the last lines are shown.
pub struct TextArea<'a> {
    pub text: &'a str,
    pub focused: bool,
    pub placeholder: &'a str,
}

impl<'a> TextArea<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            focused: false,
            placeholder: "",
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }
}

/// Split `text` into rows no wider than `width` columns.
fn hard_wrap(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    for line in text.split('\n') {
        let mut row = String::new();
        let mut used = 0;
        for c in line.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > width && !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                used = 0;
            }
            row.push(c);
            used += w;
        }
        rows.push(row);
    }
    rows
}

impl Widget for TextArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        if self.text.is_empty() && !self.focused {
            buf.set_stringn(
                area.x,
                area.y,
                self.placeholder,
                area.width as usize,
                Style::default().fg(Color::DarkGray),
            );
            return;
        }

        let cursor = if self.focused { "\u{2588}" } else { "" };
        let display = format!("{}{cursor}", self.text);
        let rows = hard_wrap(&display, area.width as usize);
        let skip = rows.len().saturating_sub(area.height as usize);

        for (i, row) in rows.iter().skip(skip).enumerate() {
            buf.set_stringn(
                area.x,
                area.y + i as u16,
                row,
                area.width as usize,
                Style::default().fg(Color::White),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::hard_wrap;

    #[test]
    fn wraps_at_width_and_newlines() {
        assert_eq!(hard_wrap("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(hard_wrap("ab\ncd", 10), vec!["ab", "cd"]);
        assert_eq!(hard_wrap("", 4), vec![""]);
    }
}
