#![forbid(unsafe_code)]

//! Host-constructed engine configuration.
//!
//! There is no file format: the reference this crate follows configures
//! its runtime through builder structs the host fills in directly, and
//! the spec this engine implements names no config file either.

/// Tunables for [`crate::engine::Engine`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Target frames per second; `end_frame` drops a flush rather than
    /// sleeping when called faster than this allows.
    pub target_fps: u32,
    /// Whether the terminal cursor should be visible between frames.
    pub cursor_visible: bool,
    /// Cells separating two changed runs that still get coalesced into
    /// one emitted run, passed through to [`crate::diff::diff_and_flush`].
    pub coalesce_gap: usize,
    /// Number of logical lines [`crate::stream_widget::StreamWidget`]
    /// retains before evicting the oldest.
    pub stream_history_lines: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            cursor_visible: false,
            coalesce_gap: crate::diff::COALESCE_GAP,
            stream_history_lines: 2000,
        }
    }
}
