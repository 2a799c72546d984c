//! Error types for the render core.
//!
//! Mirrors the plain-enum-plus-manual-impls style used for storage and
//! telemetry errors elsewhere in this codebase's ancestry: no `thiserror`,
//! just `Display`/`std::error::Error` by hand and a `From<io::Error>`.

use std::fmt;

/// Errors produced by the engine and terminal I/O layer.
#[derive(Debug)]
pub enum FlywheelError {
    /// A terminal I/O operation (write, raw-mode toggle, size query) failed.
    Io(std::io::Error),
    /// The requested operation is not supported on this platform or terminal.
    Unsupported(String),
    /// The engine has already stopped; the operation is a no-op by contract.
    NotRunning,
}

impl fmt::Display for FlywheelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlywheelError::Io(e) => write!(f, "terminal I/O error: {e}"),
            FlywheelError::Unsupported(msg) => write!(f, "unsupported: {msg}"),
            FlywheelError::NotRunning => write!(f, "engine is not running"),
        }
    }
}

impl std::error::Error for FlywheelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlywheelError::Io(e) => Some(e),
            FlywheelError::Unsupported(_) | FlywheelError::NotRunning => None,
        }
    }
}

impl From<std::io::Error> for FlywheelError {
    fn from(e: std::io::Error) -> Self {
        FlywheelError::Io(e)
    }
}

/// Result type for fallible engine operations.
pub type FlywheelResult<T> = Result<T, FlywheelError>;
