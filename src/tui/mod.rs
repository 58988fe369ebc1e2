// TUI module for the interactive log browser
mod app;
mod events;
mod layout;
mod rendering;

use std::io;

use anyhow::Result;
pub use app::App;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::source::LogSource;
use crate::viewer::LogViewer;

/// Run the interactive TUI over an opened session
pub fn run_interactive<S: LogSource>(viewer: LogViewer<S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(viewer);

    // Run event loop
    let res = app.run(&mut terminal);

    // Release the session's handles before leaving the alternate screen
    drop(app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}
