pub mod app;
pub mod components;
pub mod events;
pub mod ui;

use crate::error::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;

pub use app::App;
pub use events::EventHandler;

pub type Tui = Terminal<CrosstermBackend<io::Stdout>>;

pub fn init() -> Result<Tui> {
    execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    enable_raw_mode()?;

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    Ok(terminal)
}

pub fn restore() -> Result<()> {
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    disable_raw_mode()?;
    Ok(())
}

/// Drive the app until it quits. Must be called inside the tokio runtime
/// since actions are spawned onto it. The terminal is restored even when the
/// loop fails.
pub fn run(mut app: App) -> Result<()> {
    let mut terminal = init()?;
    let outcome = event_loop(&mut terminal, &mut app);
    restore()?;
    outcome
}

fn event_loop(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let event_handler = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|f| ui::draw(f, app))?;
        let event = event_handler.next_event()?;
        app.handle_event(event)?;
    }
    Ok(())
}
