//! Renders a synthetic token stream into a `StreamWidget` at a fixed
//! rate, to exercise the fast append path the way a real LLM-backed TUI
//! would. Press `q` or Ctrl-C to quit.

use std::time::{Duration, Instant};

use flywheel::prelude::*;

const TOKENS: &[&str] = &[
    "the ", "quick ", "brown ", "fox ", "jumps ", "over ", "the ", "lazy ", "dog.\n",
];

fn main() -> FlywheelResult<()> {
    let mut engine = Engine::new(EngineConfig::default())?;
    let (width, height) = (engine.width(), engine.height());
    let mut stream = StreamWidget::new(Rect::new(0, 0, width, height), 5000);

    let mut next_token = Instant::now();
    let mut token_index = 0usize;

    while engine.is_running() {
        match engine.poll_event() {
            Event::Shutdown => engine.stop(),
            Event::Key(k) if k.key == Key::Char('q') || k.key == Key::Char('c') && k.modifiers.contains(Modifiers::CTRL) => {
                engine.stop();
            }
            Event::Resize { width, height } => {
                stream = StreamWidget::new(Rect::new(0, 0, width, height), 5000);
            }
            _ => {}
        }

        if Instant::now() >= next_token {
            stream.append(TOKENS[token_index % TOKENS.len()]);
            token_index += 1;
            next_token = Instant::now() + Duration::from_millis(8);
        }

        engine.begin_frame();
        stream.render(&mut engine);
        engine.end_frame()?;
    }

    Ok(())
}
