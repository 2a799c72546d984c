#![forbid(unsafe_code)]

//! Public Rust facade over [`flywheel_core`]: a flicker-free
//! double-buffered terminal compositor for rendering fast-moving text,
//! like an LLM token stream, without tearing or redundant writes.
//!
//! ```no_run
//! use flywheel::prelude::*;
//!
//! let mut engine = Engine::new(EngineConfig::default())?;
//! let mut stream = StreamWidget::new(Rect::new(0, 0, engine.width(), engine.height()), 2000);
//!
//! while engine.is_running() {
//!     match engine.poll_event() {
//!         Event::Shutdown => engine.stop(),
//!         Event::Key(k) if k.key == Key::Char('q') => engine.stop(),
//!         _ => {}
//!     }
//!     engine.begin_frame();
//!     stream.append("token ");
//!     stream.render(&mut engine);
//!     engine.end_frame()?;
//! }
//! # Ok::<(), FlywheelError>(())
//! ```

pub use flywheel_core::{
    buffer::CellBuffer,
    cell::Cell,
    color::Color,
    config::EngineConfig,
    engine::{Engine, EngineState},
    error::{FlywheelError, FlywheelResult},
    event::{Event, Key, KeyCode, KeyEvent, Modifiers},
    geometry::Rect,
    stream_widget::StreamWidget,
};

/// Glob-importable re-export of the commonly used types.
pub mod prelude {
    pub use crate::{
        Cell, CellBuffer, Color, Engine, EngineConfig, EngineState, Event, FlywheelError,
        FlywheelResult, Key, KeyCode, KeyEvent, Modifiers, Rect, StreamWidget,
    };
}
