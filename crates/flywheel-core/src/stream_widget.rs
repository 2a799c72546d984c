#![forbid(unsafe_code)]

//! A scrolling text region tuned for rendering a rapid token stream:
//! plain ASCII that fits on the current line takes a fast append path
//! with no wrapping/scanning work; anything else (newlines, tabs,
//! wide/non-ASCII glyphs, or text that overflows the line) falls back to
//! a slower path that wraps and normalizes it into the line history.

use std::collections::VecDeque;

use crate::color::Color;
use crate::engine::Engine;
use crate::geometry::Rect;

const TAB_STOP: usize = 8;

/// A bounded ring of completed lines plus the line currently being
/// written into.
pub struct StreamWidget {
    rect: Rect,
    lines: VecDeque<String>,
    current_line: String,
    max_lines: usize,
    fg: Color,
    bg: Color,
    scroll_offset: usize,
}

impl StreamWidget {
    #[must_use]
    pub fn new(rect: Rect, max_lines: usize) -> Self {
        Self {
            rect,
            lines: VecDeque::new(),
            current_line: String::new(),
            max_lines: max_lines.max(1),
            fg: Color::DEFAULT_FG,
            bg: Color::DEFAULT_BG,
            scroll_offset: 0,
        }
    }

    /// The line currently being written (not yet terminated by a
    /// newline or ring eviction).
    #[must_use]
    pub fn current_line(&self) -> &str {
        &self.current_line
    }

    pub fn set_fg(&mut self, fg: Color) {
        self.fg = fg;
    }

    pub fn set_bg(&mut self, bg: Color) {
        self.bg = bg;
    }

    /// Whether `text` qualifies for the fast append path: plain ASCII,
    /// no control characters, and it fits in the remaining width of the
    /// line currently being written.
    fn is_fast_path(&self, text: &str) -> bool {
        if !text.is_ascii() {
            return false;
        }
        if text.bytes().any(|b| b < 0x20) {
            return false;
        }
        let remaining = (self.rect.width as usize).saturating_sub(self.current_line.chars().count());
        text.chars().count() <= remaining
    }

    /// Append `text` to the stream. Returns `true` if the fast path was
    /// used, `false` if it fell back to the slow path.
    pub fn append(&mut self, text: &str) -> bool {
        if self.is_fast_path(text) {
            self.current_line.push_str(text);
            true
        } else {
            self.append_slow(text);
            false
        }
    }

    /// Append raw bytes that may not be valid UTF-8 (the shape the FFI
    /// layer receives from a C caller): invalid sequences are replaced
    /// with U+FFFD before the text reaches the line buffer.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> bool {
        match std::str::from_utf8(bytes) {
            Ok(s) => self.append(s),
            Err(_) => {
                self.append_slow(&String::from_utf8_lossy(bytes));
                false
            }
        }
    }

    fn current_cols(&self) -> usize {
        self.current_line.chars().map(|c| crate::cell::char_width(c) as usize).sum()
    }

    fn append_slow(&mut self, text: &str) {
        let width = self.rect.width.max(1) as usize;
        for ch in text.chars() {
            match ch {
                '\n' => self.newline(),
                '\r' => {}
                '\t' => {
                    let col = self.current_cols();
                    let next_stop = ((col / TAB_STOP) + 1) * TAB_STOP;
                    for _ in col..next_stop.min(width) {
                        self.push_char(' ', width);
                    }
                }
                _ if ch.is_control() => {}
                _ => self.push_char(ch, width),
            }
        }
    }

    /// Push one glyph, wrapping to a new line first if it doesn't fit.
    /// A 2-wide glyph that would straddle the line boundary starts the
    /// next line instead of being split.
    fn push_char(&mut self, ch: char, width: usize) {
        let w = crate::cell::char_width(ch).max(1) as usize;
        if self.current_cols() + w > width {
            self.newline();
        }
        self.current_line.push(ch);
    }

    fn newline(&mut self) {
        let finished = std::mem::take(&mut self.current_line);
        self.lines.push_back(finished);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }

    /// Scroll the view up (toward older lines) by `n` rows, clamped so
    /// the oldest retained line never scrolls past the top.
    pub fn scroll_up(&mut self, n: usize) {
        let max_offset = self.lines.len().saturating_sub(self.rect.height as usize);
        self.scroll_offset = (self.scroll_offset + n).min(max_offset);
    }

    /// Scroll the view back down toward the live edge, clamped at 0.
    pub fn scroll_down(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.current_line.clear();
        self.scroll_offset = 0;
    }

    /// All lines to be displayed, oldest first, including the in-progress
    /// current line as the last entry (only when not scrolled away from
    /// the live edge).
    fn visible_lines(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self.lines.iter().map(String::as_str).collect();
        // An empty write-head right after a newline isn't a line the host
        // wrote; don't let it displace the last completed line from view.
        if self.scroll_offset == 0 && !self.current_line.is_empty() {
            all.push(self.current_line.as_str());
        }
        let height = self.rect.height as usize;
        let skip_from_end = self.scroll_offset;
        let total = all.len();
        let end = total.saturating_sub(skip_from_end);
        let start = end.saturating_sub(height);
        all[start..end].to_vec()
    }

    /// Whether lines exist below the current scroll position (i.e. the
    /// view is scrolled away from the live edge and there's more to see
    /// by scrolling down).
    #[must_use]
    pub fn has_more_below(&self) -> bool {
        self.scroll_offset > 0
    }

    /// Draw the visible window into `engine`'s back buffer, clearing the
    /// rect first. Draws a one-cell inverse-video marker in the
    /// bottom-right corner when lines are hidden below the current scroll.
    pub fn render(&self, engine: &mut Engine) {
        engine.fill_rect(
            self.rect.x,
            self.rect.y,
            self.rect.width,
            self.rect.height,
            crate::cell::Cell::styled(' ', self.fg, self.bg),
        );
        for (row, line) in self.visible_lines().into_iter().enumerate() {
            let y = self.rect.y + row as u16;
            if y >= self.rect.bottom() {
                break;
            }
            engine.draw_text(self.rect.x, y, line, self.fg, self.bg);
        }
        if self.has_more_below() && self.rect.width > 0 {
            engine.set_cell(
                self.rect.right().saturating_sub(1),
                self.rect.bottom().saturating_sub(1),
                crate::cell::Cell::styled('v', self.bg, self.fg),
            );
        }
    }
}
