#![forbid(unsafe_code)]

//! Input events surfaced to the host, and the modifier/key-code constants
//! shared verbatim with the C ABI in `flywheel-ffi`.

use bitflags::bitflags;

bitflags! {
    /// Keyboard modifier state. Numeric values are part of the C ABI and
    /// must not change.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const SUPER = 0b1000;
    }
}

/// A non-character key. Numeric discriminants are part of the C ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyCode {
    Enter = 1,
    Escape = 2,
    Backspace = 3,
    Tab = 4,
    Left = 5,
    Right = 6,
    Up = 7,
    Down = 8,
    Home = 9,
    End = 10,
    PageUp = 11,
    PageDown = 12,
    Delete = 13,
}

/// One keypress: either a printable character or a named key, plus the
/// modifiers held while it was pressed.
///
/// Exactly one of `char_code`/`key_code` is meaningful at a time; the FFI
/// layer mirrors this as a zero sentinel on the field that doesn't apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Named(KeyCode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

/// An event the host drains via `Engine::poll_event`. `None` is itself a
/// variant (matching `FLYWHEEL_EVENT_NONE = 0` in the C ABI) rather than
/// an `Option`, since "nothing is pending right now" is the common case
/// a host polls for every loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    None,
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    Error,
    Shutdown,
}
