#![forbid(unsafe_code)]

//! The terminal grid's fundamental unit: one character cell.

use unicode_width::UnicodeWidthChar;

use crate::color::Color;

/// A single grid element: a character plus its foreground and background.
///
/// A cell whose `ch` has display width 2 occupies the next cell too; that
/// next cell holds [`Cell::CONTINUATION`] so the differ and the buffer can
/// treat the pair atomically (see [`Cell::is_continuation`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    /// Marker character for the trailing half of a 2-column-wide glyph.
    ///
    /// Chosen from the Private Use Area so it never collides with text a
    /// host actually draws.
    pub const CONTINUATION: char = '\u{E000}';

    /// The empty cell: a space on the default colors.
    pub const EMPTY: Cell = Cell {
        ch: ' ',
        fg: Color::DEFAULT_FG,
        bg: Color::DEFAULT_BG,
    };

    /// Build a cell from a character on the default colors.
    #[must_use]
    pub const fn from_char(ch: char) -> Self {
        Self {
            ch,
            fg: Color::DEFAULT_FG,
            bg: Color::DEFAULT_BG,
        }
    }

    /// Build a cell with explicit colors.
    #[must_use]
    pub const fn styled(ch: char, fg: Color, bg: Color) -> Self {
        Self { ch, fg, bg }
    }

    /// The continuation sentinel cell for the given background.
    #[must_use]
    pub const fn continuation(bg: Color) -> Self {
        Self {
            ch: Self::CONTINUATION,
            fg: Color::DEFAULT_FG,
            bg,
        }
    }

    /// Whether this cell is a wide-glyph continuation placeholder.
    #[inline]
    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        matches!(self.ch, Self::CONTINUATION)
    }

    /// Display width of this cell: 0 for a continuation placeholder, else
    /// the column width of `ch` (1 or 2).
    #[inline]
    #[must_use]
    pub fn width(&self) -> u8 {
        if self.is_continuation() {
            return 0;
        }
        char_width(self.ch)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Column width of a single character, clamped to the 0/1/2 range this
/// core accounts for. Grapheme clustering beyond this is out of scope.
#[inline]
#[must_use]
pub fn char_width(ch: char) -> u8 {
    match UnicodeWidthChar::width(ch) {
        Some(w) => w.min(2) as u8,
        None => 0,
    }
}

/// Whether `ch` is a control character that the buffer treats as a
/// stopping point rather than drawable content (see `CellBuffer::draw_text`).
#[inline]
#[must_use]
pub fn is_draw_stop(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\t' | '\u{1B}')
}
