#![allow(clippy::missing_safety_doc)]

//! C ABI surface over `flywheel-core`. Thin by design: every function
//! re-enters the core through a single call and caches nothing of its
//! own. Every function accepts a null handle and returns the documented
//! sentinel rather than dereferencing it, and every function catches
//! panics at the boundary so a bug in the core never unwinds into C.

use std::ffi::{c_char, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};

use flywheel_core::event::{Event, Key, KeyCode};
use flywheel_core::{Cell, Color, Engine, EngineConfig, Rect, StreamWidget};

pub type FlywheelEngine = Engine;
pub type FlywheelStream = StreamWidget;

// --- Result codes, matching include/flywheel.h exactly. ---
pub const FLYWHEEL_OK: i32 = 0;
pub const FLYWHEEL_NULL_POINTER: i32 = 1;
pub const FLYWHEEL_INVALID_UTF8: i32 = 2;
pub const FLYWHEEL_IO_ERROR: i32 = 3;
pub const FLYWHEEL_OUT_OF_BOUNDS: i32 = 4;
pub const FLYWHEEL_NOT_RUNNING: i32 = 5;

// --- Event codes. ---
pub const FLYWHEEL_EVENT_NONE: i32 = 0;
pub const FLYWHEEL_EVENT_KEY: i32 = 1;
pub const FLYWHEEL_EVENT_RESIZE: i32 = 2;
pub const FLYWHEEL_EVENT_ERROR: i32 = 3;
pub const FLYWHEEL_EVENT_SHUTDOWN: i32 = 4;

// --- Key codes. ---
pub const FLYWHEEL_KEY_ENTER: i32 = 1;
pub const FLYWHEEL_KEY_ESCAPE: i32 = 2;
pub const FLYWHEEL_KEY_BACKSPACE: i32 = 3;
pub const FLYWHEEL_KEY_TAB: i32 = 4;
pub const FLYWHEEL_KEY_LEFT: i32 = 5;
pub const FLYWHEEL_KEY_RIGHT: i32 = 6;
pub const FLYWHEEL_KEY_UP: i32 = 7;
pub const FLYWHEEL_KEY_DOWN: i32 = 8;
pub const FLYWHEEL_KEY_HOME: i32 = 9;
pub const FLYWHEEL_KEY_END: i32 = 10;
pub const FLYWHEEL_KEY_PAGE_UP: i32 = 11;
pub const FLYWHEEL_KEY_PAGE_DOWN: i32 = 12;
pub const FLYWHEEL_KEY_DELETE: i32 = 13;

// --- Modifier flags. ---
pub const FLYWHEEL_MOD_SHIFT: u32 = 1;
pub const FLYWHEEL_MOD_CTRL: u32 = 2;
pub const FLYWHEEL_MOD_ALT: u32 = 4;
pub const FLYWHEEL_MOD_SUPER: u32 = 8;

/// Flat event record: only the fields relevant to `event_type` are
/// meaningful, mirroring the header's tagged-union-as-flat-struct ABI.
#[repr(C)]
pub struct FlywheelEvent {
    pub event_type: i32,
    pub char_code: u32,
    pub key_code: i32,
    pub modifiers: u32,
    pub width: u16,
    pub height: u16,
}

impl Default for FlywheelEvent {
    fn default() -> Self {
        Self { event_type: FLYWHEEL_EVENT_NONE, char_code: 0, key_code: 0, modifiers: 0, width: 0, height: 0 }
    }
}

fn key_code_to_ffi(code: KeyCode) -> i32 {
    match code {
        KeyCode::Enter => FLYWHEEL_KEY_ENTER,
        KeyCode::Escape => FLYWHEEL_KEY_ESCAPE,
        KeyCode::Backspace => FLYWHEEL_KEY_BACKSPACE,
        KeyCode::Tab => FLYWHEEL_KEY_TAB,
        KeyCode::Left => FLYWHEEL_KEY_LEFT,
        KeyCode::Right => FLYWHEEL_KEY_RIGHT,
        KeyCode::Up => FLYWHEEL_KEY_UP,
        KeyCode::Down => FLYWHEEL_KEY_DOWN,
        KeyCode::Home => FLYWHEEL_KEY_HOME,
        KeyCode::End => FLYWHEEL_KEY_END,
        KeyCode::PageUp => FLYWHEEL_KEY_PAGE_UP,
        KeyCode::PageDown => FLYWHEEL_KEY_PAGE_DOWN,
        KeyCode::Delete => FLYWHEEL_KEY_DELETE,
    }
}

fn event_to_ffi(event: Event) -> FlywheelEvent {
    match event {
        Event::None => FlywheelEvent::default(),
        Event::Key(k) => {
            let (char_code, key_code) = match k.key {
                Key::Char(ch) => (ch as u32, 0),
                Key::Named(code) => (0, key_code_to_ffi(code)),
            };
            FlywheelEvent {
                event_type: FLYWHEEL_EVENT_KEY,
                char_code,
                key_code,
                modifiers: k.modifiers.bits() as u32,
                width: 0,
                height: 0,
            }
        }
        Event::Resize { width, height } => {
            FlywheelEvent { event_type: FLYWHEEL_EVENT_RESIZE, width, height, ..FlywheelEvent::default() }
        }
        Event::Error => FlywheelEvent { event_type: FLYWHEEL_EVENT_ERROR, ..FlywheelEvent::default() },
        Event::Shutdown => FlywheelEvent { event_type: FLYWHEEL_EVENT_SHUTDOWN, ..FlywheelEvent::default() },
    }
}

/// Run `f`, converting a panic into `on_panic` instead of unwinding into
/// the C caller.
fn guard<R>(on_panic: R, f: impl FnOnce() -> R) -> R {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or(on_panic)
}

/// Read a possibly-null, possibly-invalid-UTF-8 C string. Returns `None`
/// for a null pointer or invalid UTF-8; the caller maps that to
/// `FLYWHEEL_NULL_POINTER`/`FLYWHEEL_INVALID_UTF8` as appropriate.
unsafe fn read_cstr<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

// --- Engine ---

#[unsafe(no_mangle)]
pub extern "C" fn flywheel_engine_new() -> *mut FlywheelEngine {
    guard(std::ptr::null_mut(), || match Engine::new(EngineConfig::default()) {
        Ok(engine) => Box::into_raw(Box::new(engine)),
        Err(_) => std::ptr::null_mut(),
    })
}

/// # Safety
/// `handle` must be a pointer previously returned by `flywheel_engine_new`
/// and not already destroyed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_engine_destroy(handle: *mut FlywheelEngine) {
    if handle.is_null() {
        return;
    }
    let _ = guard((), || {
        drop(Box::from_raw(handle));
    });
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_engine_width(handle: *const FlywheelEngine) -> u16 {
    guard(0, || handle.as_ref().map_or(0, Engine::width))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_engine_height(handle: *const FlywheelEngine) -> u16 {
    guard(0, || handle.as_ref().map_or(0, Engine::height))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_engine_is_running(handle: *const FlywheelEngine) -> i32 {
    guard(0, || handle.as_ref().is_some_and(Engine::is_running) as i32)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_engine_stop(handle: *mut FlywheelEngine) {
    let _ = guard((), || {
        if let Some(engine) = handle.as_mut() {
            engine.stop();
        }
    });
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_engine_poll_event(
    handle: *mut FlywheelEngine,
    out: *mut FlywheelEvent,
) -> i32 {
    guard(FLYWHEEL_EVENT_NONE, || {
        let Some(engine) = handle.as_mut() else { return FLYWHEEL_EVENT_NONE };
        let event = engine.poll_event();
        let ffi_event = event_to_ffi(event);
        let event_type = ffi_event.event_type;
        if !out.is_null() {
            *out = ffi_event;
        }
        event_type
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_engine_handle_resize(
    handle: *mut FlywheelEngine,
    width: u16,
    height: u16,
) {
    let _ = guard((), || {
        if let Some(engine) = handle.as_mut() {
            engine.handle_resize(width, height);
        }
    });
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_engine_request_redraw(handle: *mut FlywheelEngine) {
    let _ = guard((), || {
        if let Some(engine) = handle.as_mut() {
            engine.request_redraw();
        }
    });
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_engine_request_update(handle: *mut FlywheelEngine) {
    let _ = guard((), || {
        if let Some(engine) = handle.as_mut() {
            engine.request_update();
        }
    });
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_engine_begin_frame(handle: *mut FlywheelEngine) {
    let _ = guard((), || {
        if let Some(engine) = handle.as_mut() {
            engine.begin_frame();
        }
    });
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_engine_end_frame(handle: *mut FlywheelEngine) {
    let _ = guard((), || {
        if let Some(engine) = handle.as_mut() {
            let _ = engine.end_frame();
        }
    });
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_engine_set_cell(
    handle: *mut FlywheelEngine,
    x: u16,
    y: u16,
    c: u8,
    fg: u32,
    bg: u32,
) {
    let _ = guard((), || {
        let Some(engine) = handle.as_mut() else { return };
        if !c.is_ascii() {
            return;
        }
        engine.set_cell(x, y, Cell::styled(c as char, Color::from_packed(fg), Color::from_packed(bg)));
    });
}

/// # Safety
/// `text` must be a valid pointer to a NUL-terminated C string, or null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_engine_draw_text(
    handle: *mut FlywheelEngine,
    x: u16,
    y: u16,
    text: *const c_char,
    fg: u32,
    bg: u32,
) -> i32 {
    guard(-1, || {
        let Some(engine) = handle.as_mut() else { return -1 };
        let Some(s) = read_cstr(text) else { return -1 };
        engine.draw_text(x, y, s, Color::from_packed(fg), Color::from_packed(bg)) as i32
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_engine_clear(handle: *mut FlywheelEngine) {
    let _ = guard((), || {
        if let Some(engine) = handle.as_mut() {
            engine.clear();
        }
    });
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_engine_fill_rect(
    handle: *mut FlywheelEngine,
    x: u16,
    y: u16,
    w: u16,
    h: u16,
    c: u8,
    fg: u32,
    bg: u32,
) {
    let _ = guard((), || {
        let Some(engine) = handle.as_mut() else { return };
        if !c.is_ascii() {
            return;
        }
        engine.fill_rect(x, y, w, h, Cell::styled(c as char, Color::from_packed(fg), Color::from_packed(bg)));
    });
}

// --- Stream widget ---

#[unsafe(no_mangle)]
pub extern "C" fn flywheel_stream_new(x: u16, y: u16, w: u16, h: u16) -> *mut FlywheelStream {
    guard(std::ptr::null_mut(), || {
        Box::into_raw(Box::new(StreamWidget::new(Rect::new(x, y, w, h), EngineConfig::default().stream_history_lines)))
    })
}

/// # Safety
/// `handle` must be a pointer previously returned by `flywheel_stream_new`
/// and not already destroyed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_stream_destroy(handle: *mut FlywheelStream) {
    if handle.is_null() {
        return;
    }
    let _ = guard((), || {
        drop(Box::from_raw(handle));
    });
}

/// # Safety
/// `text` must be a valid pointer to a NUL-terminated C string, or null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_stream_append(handle: *mut FlywheelStream, text: *const c_char) -> i32 {
    guard(-1, || {
        let Some(stream) = handle.as_mut() else { return -1 };
        if text.is_null() {
            return -1;
        }
        let bytes = CStr::from_ptr(text).to_bytes();
        stream.append_bytes(bytes) as i32
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_stream_render(handle: *mut FlywheelStream, engine: *mut FlywheelEngine) {
    let _ = guard((), || {
        let (Some(stream), Some(engine)) = (handle.as_ref(), engine.as_mut()) else {
            return;
        };
        stream.render(engine);
    });
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_stream_clear(handle: *mut FlywheelStream) {
    let _ = guard((), || {
        if let Some(stream) = handle.as_mut() {
            stream.clear();
        }
    });
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_stream_set_fg(handle: *mut FlywheelStream, color: u32) {
    let _ = guard((), || {
        if let Some(stream) = handle.as_mut() {
            stream.set_fg(Color::from_packed(color));
        }
    });
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_stream_set_bg(handle: *mut FlywheelStream, color: u32) {
    let _ = guard((), || {
        if let Some(stream) = handle.as_mut() {
            stream.set_bg(Color::from_packed(color));
        }
    });
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_stream_scroll_up(handle: *mut FlywheelStream, n: u32) {
    let _ = guard((), || {
        if let Some(stream) = handle.as_mut() {
            stream.scroll_up(n as usize);
        }
    });
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn flywheel_stream_scroll_down(handle: *mut FlywheelStream, n: u32) {
    let _ = guard((), || {
        if let Some(stream) = handle.as_mut() {
            stream.scroll_down(n as usize);
        }
    });
}

// --- Utility ---

#[unsafe(no_mangle)]
pub extern "C" fn flywheel_rgb(r: u8, g: u8, b: u8) -> u32 {
    Color::rgb(r, g, b).packed()
}

#[unsafe(no_mangle)]
pub extern "C" fn flywheel_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr().cast()
}
