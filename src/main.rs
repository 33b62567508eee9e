use std::io;
use std::time::Duration;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use tabletop_oracle::config::AppConfig;
use tabletop_oracle::core::logging;
use tabletop_oracle::tui::app::AppState;
use tabletop_oracle::tui::services::Services;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load();

    let _log_guard = logging::init_tui(&logging::log_dir(&config.data_dir()));
    log::info!("{} v{} starting", tabletop_oracle::NAME, tabletop_oracle::VERSION);

    let tick_rate = Duration::from_millis(config.tui.tick_rate_ms);
    let mouse_enabled = config.tui.mouse_enabled;

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let services = Services::init(config, event_tx);
    let mut app = AppState::new(event_rx, services);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mouse_enabled {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal, tick_rate).await;

    // Restore terminal
    disable_raw_mode()?;
    if mouse_enabled {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    log::info!("Shutting down");

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
