#![forbid(unsafe_code)]

//! Hand-rolled byte-level input parser.
//!
//! Deliberately independent of any terminal event library: it consumes raw
//! bytes read from stdin and turns them into [`Event`]s. It never blocks —
//! [`InputReader::feed`] processes whatever bytes are available right now
//! and returns immediately, and a solitary ESC with nothing following it
//! is only resolved into a plain `Escape` key once the host reports that
//! the drain window has elapsed via [`InputReader::tick`].

use std::time::Duration;

use crate::event::{Event, Key, KeyCode, KeyEvent, Modifiers};

/// A CSI sequence longer than this without a final byte is considered
/// malformed and discarded rather than buffered indefinitely.
const MAX_CSI_LEN: usize = 64;

/// How long a solitary ESC is held before being resolved as a plain
/// Escape keypress, to give a following CSI/SS3 byte a chance to arrive.
pub const ESC_TIMEOUT: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    Csi,
    Utf8 { collected: u8, expected: u8 },
}

/// Byte-level input parser, fed raw stdin bytes and producing [`Event`]s.
pub struct InputReader {
    state: State,
    csi_buf: Vec<u8>,
    utf8_buf: [u8; 4],
    pending_esc: Option<Duration>,
}

impl Default for InputReader {
    fn default() -> Self {
        Self::new()
    }
}

impl InputReader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            csi_buf: Vec::with_capacity(16),
            utf8_buf: [0; 4],
            pending_esc: None,
        }
    }

    /// Feed newly-read bytes, returning every event they complete. Bytes
    /// that start an incomplete sequence are buffered internally and
    /// contribute no event until finished by a later call.
    pub fn feed(&mut self, input: &[u8]) -> Vec<Event> {
        let mut events = Vec::new();
        for &byte in input {
            if byte != 0x1B {
                // Any non-ESC byte resolves a pending lone ESC immediately:
                // it turns out not to have been lone after all.
                self.pending_esc = None;
            }
            self.step(byte, &mut events);
        }
        events
    }

    /// Advance the elapsed-time clock. When a solitary ESC has been
    /// waiting longer than [`ESC_TIMEOUT`], resolves it to a plain
    /// `Escape` key event.
    pub fn tick(&mut self, elapsed: Duration) -> Option<Event> {
        let waited = self.pending_esc?;
        let total = waited + elapsed;
        if total >= ESC_TIMEOUT {
            self.pending_esc = None;
            self.state = State::Ground;
            Some(Event::Key(KeyEvent {
                key: Key::Named(KeyCode::Escape),
                modifiers: Modifiers::empty(),
            }))
        } else {
            self.pending_esc = Some(total);
            None
        }
    }

    fn step(&mut self, byte: u8, events: &mut Vec<Event>) {
        match self.state {
            State::Ground => self.step_ground(byte, events),
            State::Escape => self.step_escape(byte, events),
            State::Csi => self.step_csi(byte, events),
            State::Utf8 { collected, expected } => {
                self.step_utf8(byte, collected, expected, events);
            }
        }
    }

    fn step_ground(&mut self, byte: u8, events: &mut Vec<Event>) {
        match byte {
            0x1B => {
                self.state = State::Escape;
                self.pending_esc = Some(Duration::ZERO);
            }
            b'\r' | b'\n' => push_named(events, KeyCode::Enter, Modifiers::empty()),
            0x7F | 0x08 => push_named(events, KeyCode::Backspace, Modifiers::empty()),
            b'\t' => push_named(events, KeyCode::Tab, Modifiers::empty()),
            0x01..=0x1A => {
                // Ctrl+letter (Ctrl-A..Ctrl-Z), excluding the ones already
                // claimed above.
                let ch = (byte - 1 + b'a') as char;
                events.push(Event::Key(KeyEvent {
                    key: Key::Char(ch),
                    modifiers: Modifiers::CTRL,
                }));
            }
            0x00..=0x7F => {
                events.push(Event::Key(KeyEvent {
                    key: Key::Char(byte as char),
                    modifiers: Modifiers::empty(),
                }));
            }
            _ => self.start_utf8(byte, events),
        }
    }

    fn start_utf8(&mut self, byte: u8, events: &mut Vec<Event>) {
        let expected = match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => {
                // Stray continuation byte with no lead byte: not a
                // recognized sequence.
                events.push(Event::Error);
                return;
            }
        };
        self.utf8_buf[0] = byte;
        self.state = State::Utf8 { collected: 1, expected };
    }

    fn step_utf8(&mut self, byte: u8, collected: u8, expected: u8, events: &mut Vec<Event>) {
        if byte & 0xC0 != 0x80 {
            // Malformed continuation: abandon the sequence and
            // reprocess this byte fresh.
            self.state = State::Ground;
            self.step(byte, events);
            return;
        }
        self.utf8_buf[collected as usize] = byte;
        let collected = collected + 1;
        if collected < expected {
            self.state = State::Utf8 { collected, expected };
            return;
        }
        self.state = State::Ground;
        if let Ok(s) = std::str::from_utf8(&self.utf8_buf[..expected as usize]) {
            if let Some(ch) = s.chars().next() {
                events.push(Event::Key(KeyEvent {
                    key: Key::Char(ch),
                    modifiers: Modifiers::empty(),
                }));
            }
        }
    }

    fn step_escape(&mut self, byte: u8, events: &mut Vec<Event>) {
        match byte {
            b'[' => {
                self.csi_buf.clear();
                self.state = State::Csi;
            }
            0x1B => {
                // ESC ESC: resolve the first as a plain Escape, stay in
                // Escape state for the second.
                push_named(events, KeyCode::Escape, Modifiers::empty());
                self.pending_esc = Some(Duration::ZERO);
            }
            _ => {
                // Not a recognized escape introducer: the ESC stands
                // alone, and this byte is reprocessed from Ground.
                push_named(events, KeyCode::Escape, Modifiers::empty());
                self.state = State::Ground;
                self.step(byte, events);
            }
        }
    }

    fn step_csi(&mut self, byte: u8, events: &mut Vec<Event>) {
        if byte.is_ascii_alphabetic() || byte == b'~' {
            self.finish_csi(byte, events);
            self.state = State::Ground;
            return;
        }
        if self.csi_buf.len() >= MAX_CSI_LEN {
            // Malformed/oversized sequence: give up on it.
            self.csi_buf.clear();
            self.state = State::Ground;
            events.push(Event::Error);
            return;
        }
        self.csi_buf.push(byte);
    }

    fn finish_csi(&mut self, finalizer: u8, events: &mut Vec<Event>) {
        let params = parse_params(&self.csi_buf);
        let modifiers = params
            .get(1)
            .copied()
            .map_or(Modifiers::empty(), modifiers_from_xterm);

        let code = match finalizer {
            b'A' => Some(KeyCode::Up),
            b'B' => Some(KeyCode::Down),
            b'C' => Some(KeyCode::Right),
            b'D' => Some(KeyCode::Left),
            b'H' => Some(KeyCode::Home),
            b'F' => Some(KeyCode::End),
            b'~' => match params.first().copied() {
                Some(1) | Some(7) => Some(KeyCode::Home),
                Some(3) => Some(KeyCode::Delete),
                Some(4) | Some(8) => Some(KeyCode::End),
                Some(5) => Some(KeyCode::PageUp),
                Some(6) => Some(KeyCode::PageDown),
                _ => None,
            },
            _ => None,
        };

        match code {
            Some(code) => push_named(events, code, modifiers),
            None => events.push(Event::Error),
        }
    }
}

fn push_named(events: &mut Vec<Event>, code: KeyCode, modifiers: Modifiers) {
    events.push(Event::Key(KeyEvent { key: Key::Named(code), modifiers }));
}

fn parse_params(buf: &[u8]) -> Vec<u32> {
    buf.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .fold(0u32, |acc, &b| acc.saturating_mul(10).saturating_add((b - b'0') as u32))
        })
        .collect()
}

fn modifiers_from_xterm(code: u32) -> Modifiers {
    let bits = code.saturating_sub(1);
    let mut m = Modifiers::empty();
    if bits & 1 != 0 {
        m |= Modifiers::SHIFT;
    }
    if bits & 2 != 0 {
        m |= Modifiers::ALT;
    }
    if bits & 4 != 0 {
        m |= Modifiers::CTRL;
    }
    if bits & 8 != 0 {
        m |= Modifiers::SUPER;
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ascii_char() {
        let mut r = InputReader::new();
        let events = r.feed(b"a");
        assert_eq!(
            events,
            vec![Event::Key(KeyEvent { key: Key::Char('a'), modifiers: Modifiers::empty() })]
        );
    }

    #[test]
    fn ctrl_letter() {
        let mut r = InputReader::new();
        let events = r.feed(&[0x03]); // Ctrl-C
        assert_eq!(
            events,
            vec![Event::Key(KeyEvent { key: Key::Char('c'), modifiers: Modifiers::CTRL })]
        );
    }

    #[test]
    fn arrow_keys() {
        let mut r = InputReader::new();
        let events = r.feed(b"\x1b[A\x1b[B\x1b[C\x1b[D");
        let codes: Vec<_> = events
            .into_iter()
            .map(|e| match e {
                Event::Key(KeyEvent { key: Key::Named(k), .. }) => k,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(codes, vec![KeyCode::Up, KeyCode::Down, KeyCode::Right, KeyCode::Left]);
    }

    #[test]
    fn delete_with_tilde_form() {
        let mut r = InputReader::new();
        let events = r.feed(b"\x1b[3~");
        assert_eq!(
            events,
            vec![Event::Key(KeyEvent { key: Key::Named(KeyCode::Delete), modifiers: Modifiers::empty() })]
        );
    }

    #[test]
    fn modified_arrow_key() {
        let mut r = InputReader::new();
        // Ctrl+Right: CSI 1;5C
        let events = r.feed(b"\x1b[1;5C");
        assert_eq!(
            events,
            vec![Event::Key(KeyEvent { key: Key::Named(KeyCode::Right), modifiers: Modifiers::CTRL })]
        );
    }

    #[test]
    fn utf8_multibyte_char() {
        let mut r = InputReader::new();
        let mut bytes = Vec::new();
        bytes.extend_from_slice("中".as_bytes());
        let events = r.feed(&bytes);
        assert_eq!(
            events,
            vec![Event::Key(KeyEvent { key: Key::Char('中'), modifiers: Modifiers::empty() })]
        );
    }

    #[test]
    fn split_utf8_across_feed_calls() {
        let mut r = InputReader::new();
        let bytes = "中".as_bytes().to_vec();
        let first = r.feed(&bytes[..1]);
        assert!(first.is_empty());
        let second = r.feed(&bytes[1..]);
        assert_eq!(
            second,
            vec![Event::Key(KeyEvent { key: Key::Char('中'), modifiers: Modifiers::empty() })]
        );
    }

    #[test]
    fn lone_esc_resolves_only_after_timeout() {
        let mut r = InputReader::new();
        let events = r.feed(b"\x1b");
        assert!(events.is_empty());
        assert!(r.tick(Duration::from_millis(5)).is_none());
        let resolved = r.tick(Duration::from_millis(30));
        assert_eq!(
            resolved,
            Some(Event::Key(KeyEvent { key: Key::Named(KeyCode::Escape), modifiers: Modifiers::empty() }))
        );
    }

    #[test]
    fn esc_followed_by_csi_is_not_a_lone_escape() {
        let mut r = InputReader::new();
        let events = r.feed(b"\x1b[A");
        assert_eq!(
            events,
            vec![Event::Key(KeyEvent { key: Key::Named(KeyCode::Up), modifiers: Modifiers::empty() })]
        );
        assert!(r.tick(Duration::from_millis(100)).is_none());
    }

    #[test]
    fn malformed_csi_is_dropped_without_blocking_later_input() {
        let mut r = InputReader::new();
        let garbage: Vec<u8> = (0..(MAX_CSI_LEN + 5)).map(|_| b'0').collect();
        let mut input = b"\x1b[".to_vec();
        input.extend_from_slice(&garbage);
        input.extend_from_slice(b"a");
        let events = r.feed(&input);
        // The oversized CSI sequence is abandoned once it exceeds the
        // limit; the parser falls back to Ground and keeps decoding the
        // rest of the stream instead of hanging or eating later input.
        assert_eq!(events.last(), Some(&Event::Key(KeyEvent {
            key: Key::Char('a'),
            modifiers: Modifiers::empty(),
        })));
        assert!(events.contains(&Event::Error));
    }

    #[test]
    fn unrecognized_csi_finalizer_yields_error() {
        let mut r = InputReader::new();
        let events = r.feed(b"\x1b[99~");
        assert_eq!(events, vec![Event::Error]);
    }

    #[test]
    fn stray_continuation_byte_yields_error() {
        let mut r = InputReader::new();
        let events = r.feed(&[0x80]);
        assert_eq!(events, vec![Event::Error]);
    }
}
