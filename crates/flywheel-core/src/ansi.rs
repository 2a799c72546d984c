#![forbid(unsafe_code)]

//! ANSI/VT escape sequence byte generation.
//!
//! Pure functions: no state tracking, just bytes. The differ owns pen and
//! cursor state and calls into these helpers only when something changed.

use std::io::{self, Write};

/// `CSI 0 m` — reset all SGR attributes.
pub const SGR_RESET: &[u8] = b"\x1b[0m";

/// `ESC [ ? 25 l` — hide cursor.
pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";

/// `ESC [ ? 25 h` — show cursor.
pub const CURSOR_SHOW: &[u8] = b"\x1b[?25h";

/// `ESC [ 2 J` — erase the entire display.
pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";

/// `ESC [ 1 ; 1 H` — move cursor to the top-left corner.
pub const HOME: &[u8] = b"\x1b[1;1H";

/// Write SGR reset.
pub fn sgr_reset<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(SGR_RESET)
}

/// Write SGR true-color foreground: `CSI 38;2;r;g;b m`.
pub fn sgr_fg_rgb<W: Write>(w: &mut W, r: u8, g: u8, b: u8) -> io::Result<()> {
    write!(w, "\x1b[38;2;{r};{g};{b}m")
}

/// Write SGR true-color background: `CSI 48;2;r;g;b m`.
pub fn sgr_bg_rgb<W: Write>(w: &mut W, r: u8, g: u8, b: u8) -> io::Result<()> {
    write!(w, "\x1b[48;2;{r};{g};{b}m")
}

/// CUP (Cursor Position): `CSI row ; col H`, 0-indexed input converted to
/// the terminal's 1-indexed coordinates.
pub fn cup<W: Write>(w: &mut W, row: u16, col: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", row + 1, col + 1)
}

/// Hide the cursor.
pub fn hide_cursor<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(CURSOR_HIDE)
}

/// Show the cursor.
pub fn show_cursor<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(CURSOR_SHOW)
}

/// Clear the entire display.
pub fn clear_screen<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(CLEAR_SCREEN)
}

/// Move the cursor to the top-left corner.
pub fn home<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(HOME)
}

/// `CSI 7 m` / `CSI 27 m` — inverse video on/off, used by the stream
/// widget's "more below" marker.
pub fn sgr_inverse_on<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[7m")
}

pub fn sgr_inverse_off<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[27m")
}
