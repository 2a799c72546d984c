#![forbid(unsafe_code)]

//! Double-buffered terminal cell grid with diff-based flushing, a
//! frame-paced render loop, and a streaming text widget for rendering
//! rapid token streams without flicker.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod event;
pub mod geometry;
pub mod input;
pub mod stream_widget;
pub mod terminal_io;

pub use buffer::CellBuffer;
pub use cell::Cell;
pub use color::Color;
pub use config::EngineConfig;
pub use engine::{Engine, EngineState};
pub use error::{FlywheelError, FlywheelResult};
pub use event::{Event, Key, KeyCode, KeyEvent, Modifiers};
pub use geometry::Rect;
pub use input::InputReader;
pub use stream_widget::StreamWidget;
pub use terminal_io::TerminalIO;
