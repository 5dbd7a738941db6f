//! Terminal rendering and event loop for ncview.
//!
//! Handles setup/teardown of raw mode, alternate screen, redraws,
//! and events (keypress, resize) to app logic.

use crate::app::{AppState, KeypressResult, StatusMessage, UiUpdate};
use crate::ui;

use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};

use std::io;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(16);
const INFO_TTL: Duration = Duration::from_secs(3);
const ERROR_TTL: Duration = Duration::from_secs(6);

/// Latest status message and when it stops being shown.
#[derive(Debug, Default)]
pub struct StatusLine {
    current: Option<(StatusMessage, Instant)>,
}

impl StatusLine {
    pub fn set(&mut self, msg: StatusMessage, now: Instant) {
        let ttl = if msg.is_error() { ERROR_TTL } else { INFO_TTL };
        self.current = Some((msg, now + ttl));
    }

    /// Drops an expired message. Returns true if one was dropped.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.current.as_ref().is_some_and(|(_, until)| *until <= now) {
            self.current = None;
            return true;
        }
        false
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.current.as_ref().map(|(msg, _)| msg)
    }
}

/// Initializes the terminal in raw mode and alternate screen and runs the main event loop.
///
/// Blocks until quit. Returns an std::io::Error if terminal setup or teardown fails.
pub fn run_terminal(app: &mut AppState) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = event_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)?;
    result
}

/// Main event loop of ncview: ticks the coordinator, applies its updates, draws,
/// and dispatches key events. Returns on quit.
fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut AppState) -> io::Result<()>
where
    io::Error: From<<B as Backend>::Error>,
{
    let mut status = StatusLine::default();
    let mut dirty = true;

    loop {
        let now = Instant::now();
        dirty |= app.tick(now);
        for update in app.drain_updates() {
            if let UiUpdate::Status(msg) = update {
                status.set(msg, now);
            }
            dirty = true;
        }
        dirty |= status.expire(now);

        if dirty {
            terminal.draw(|f| ui::render(f, app, &status))?;
            dirty = false;
        }

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match app.handle_keypress(key) {
                        KeypressResult::Quit => break,
                        KeypressResult::OpenedEditor => terminal.clear()?,
                        _ => {}
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }
    }
    Ok(())
}
