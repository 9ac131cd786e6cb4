//! Full-screen terminal view.
//!
//! One screen per phase (countdown grid + progress bar, closing lid,
//! celebration) and a test-date popup. The loop feeds real elapsed time into
//! the controller, so every transition is driven by its scheduler.
//!
//! Keys: Enter confirm, Esc start over, m celebrate more, t test date, q quit.

mod input;
mod render;

use std::io;
use std::panic;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CEvent, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::debug;

use countdown_core::{Clock, Config, CountdownController, Event, SystemClock};

pub use input::{handle_key, KeyOutcome};
pub use render::draw;

const POLL: Duration = Duration::from_millis(100);

/// Screen state around the controller.
pub struct App<C: Clock = SystemClock> {
    pub ctl: CountdownController<C>,
    pub title: String,
    pub subtitle: String,
    pub headline: String,
    pub show_progress: bool,
    /// Text typed into the test-date popup.
    pub date_input: String,
    /// One-line message in the footer (e.g. a rejected date).
    pub notice: Option<String>,
}

impl<C: Clock> App<C> {
    pub fn new(ctl: CountdownController<C>, config: &Config) -> Self {
        Self {
            ctl,
            title: config.target.title.clone(),
            subtitle: config.target.subtitle.clone(),
            headline: config.celebration.headline.clone(),
            show_progress: config.display.show_progress,
            date_input: String::new(),
            notice: None,
        }
    }

    pub fn log_events(&self, events: &[Event]) {
        for event in events.iter().filter(|e| !e.is_tick()) {
            debug!(?event, "controller event");
        }
    }
}

/// Puts the terminal back however the view exits, early errors included.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    disable_raw_mode().ok();
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show).ok();
}

/// Release builds abort on panic, so restore from the hook rather than on unwind.
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        previous(info);
    }));
}

pub fn run_watch(
    ctl: CountdownController,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(ctl, config);

    install_panic_hook();
    let guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let result = run_event_loop(&mut terminal, &mut app);

    app.ctl.shutdown();
    drop(guard);
    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let events = app.ctl.start();
    app.log_events(&events);

    loop {
        // Advance by whatever real time passed since the controller last saw it.
        let real_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let events = app.ctl.advance(real_ms.saturating_sub(app.ctl.now_ms()));
        app.log_events(&events);

        terminal.draw(|frame| draw(frame, app))?;

        if event::poll(POLL)? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(app, key) == KeyOutcome::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}
