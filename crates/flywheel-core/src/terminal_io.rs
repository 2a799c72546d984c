#![forbid(unsafe_code)]

//! Raw-mode terminal lifecycle: entering/leaving the alternate screen and
//! raw mode, writing bytes, and surfacing resizes reported asynchronously
//! by a signal handler.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;

use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};

#[cfg(unix)]
use signal_hook::consts::signal::{SIGWINCH};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Shared between the main thread and the SIGWINCH handler thread. Reads
/// use "read twice, accept on equal" so a torn `(width, height)` pair
/// written concurrently is never observed.
struct ResizeFlag {
    pending: AtomicBool,
    width: AtomicU16,
    height: AtomicU16,
}

impl ResizeFlag {
    fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            width: AtomicU16::new(0),
            height: AtomicU16::new(0),
        }
    }

    fn publish(&self, width: u16, height: u16) {
        self.width.store(width, Ordering::Relaxed);
        self.height.store(height, Ordering::Relaxed);
        self.pending.store(true, Ordering::Release);
    }

    /// Take the pending resize, if any. Loops until it reads the same
    /// `(width, height)` pair twice in a row, to avoid acting on a value
    /// torn by a concurrent `publish`.
    fn take(&self) -> Option<(u16, u16)> {
        if !self.pending.swap(false, Ordering::Acquire) {
            return None;
        }
        loop {
            let w1 = self.width.load(Ordering::Relaxed);
            let h1 = self.height.load(Ordering::Relaxed);
            let w2 = self.width.load(Ordering::Relaxed);
            let h2 = self.height.load(Ordering::Relaxed);
            if w1 == w2 && h1 == h2 {
                return Some((w1, h1));
            }
        }
    }
}

/// Owns the raw-mode/alternate-screen lifecycle and the write side of the
/// terminal. Teardown runs in reverse of setup, on `Drop`, so a panic
/// unwinding through the engine still restores the terminal.
pub struct TerminalIO {
    out: io::Stdout,
    resize_flag: Arc<ResizeFlag>,
    #[cfg(unix)]
    _signal_thread: Option<std::thread::JoinHandle<()>>,
    torn_down: bool,
}

impl TerminalIO {
    /// Enter raw mode, the alternate screen, and hide the cursor.
    /// Installs a background thread (Unix only) that watches for
    /// `SIGWINCH` and publishes the new size to the resize flag.
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide)?;

        let resize_flag = Arc::new(ResizeFlag::new());

        #[cfg(unix)]
        let signal_thread = {
            let flag = Arc::clone(&resize_flag);
            let mut signals = Signals::new([SIGWINCH])?;
            Some(std::thread::spawn(move || {
                for _ in signals.forever() {
                    if let Ok((w, h)) = terminal::size() {
                        flag.publish(w, h);
                    }
                }
            }))
        };

        Ok(Self {
            out,
            resize_flag,
            #[cfg(unix)]
            _signal_thread: signal_thread,
            torn_down: false,
        })
    }

    /// Current terminal size, queried directly rather than cached.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Take the most recently published resize, if the signal thread has
    /// reported one since the last call.
    pub fn poll_resize(&self) -> Option<(u16, u16)> {
        self.resize_flag.take()
    }

    /// Write raw bytes (an already-composed ANSI stream) and flush.
    pub fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)?;
        self.out.flush()
    }

    /// Restore the terminal to its pre-engine state. Idempotent: safe to
    /// call explicitly and again from `Drop`.
    pub fn teardown(&mut self) -> io::Result<()> {
        if self.torn_down {
            return Ok(());
        }
        self.torn_down = true;
        execute!(self.out, cursor::Show, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }
}

impl Drop for TerminalIO {
    fn drop(&mut self) {
        let _ = self.teardown();
    }
}

/// Install a panic hook that tears down raw mode / the alternate screen
/// before the default hook prints its message, so a panic mid-frame
/// never leaves the user's shell in raw mode.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = terminal::disable_raw_mode();
        let mut out = io::stdout();
        let _ = execute!(out, cursor::Show, LeaveAlternateScreen);
        previous(info);
    }));
}
