//! Palaver TUI - Terminal chat interface for the task relay
//!
//! A ratatui chat screen with a message transcript, an input line, and a
//! streaming assistant bubble.

use anyhow::Result;
use clap::Parser;
use palaver_common::RelayConfig;
use std::path::PathBuf;

mod app;
mod conversation;
mod events;
mod markdown;

use app::App;

/// Command-line arguments for the Palaver TUI
#[derive(Parser)]
#[command(
    name = "palaver-tui",
    about = "Palaver TUI - terminal chat over a task-queue generation API"
)]
pub struct Args {
    /// Path to a TOML relay configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Override the task insertion endpoint
    #[clap(long)]
    insert_url: Option<String>,

    /// Override the output polling endpoint
    #[clap(long)]
    output_url: Option<String>,

    /// Write debug logs to palaver-tui.log
    #[clap(short, long)]
    debug: bool,
}

/// Initialize the terminal for TUI mode
pub fn init_terminal()
-> Result<ratatui::Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let terminal = ratatui::Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal<B: ratatui::backend::Backend + std::io::Write>(
    terminal: &mut ratatui::Terminal<B>,
) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // A terminal subscriber would draw over the alternate screen, so
    // debug logs go to a file instead.
    if args.debug {
        let file = std::fs::File::create("palaver-tui.log")?;
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(std::sync::Arc::new(file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    let mut config = match &args.config {
        Some(path) => RelayConfig::load(path)?,
        None => RelayConfig::default(),
    };
    if let Some(url) = args.insert_url {
        config.insert_url = url;
    }
    if let Some(url) = args.output_url {
        config.output_url = url;
    }

    let mut terminal = init_terminal()?;
    let app_result = App::new(config)?.run(&mut terminal).await;
    restore_terminal(&mut terminal)?;
    app_result
}
