mod app;
mod bookmarks;
mod engine;
mod feed;
mod i18n;
mod select;
mod types;
mod ui;
mod utils;
mod web;

use crate::app::App;
use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

rust_i18n::i18n!("locales", fallback = "en");

const DEFAULT_URL: &str = "https://www.tiktok.com/explore";

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Feed page to open.
    #[arg(default_value = DEFAULT_URL)]
    start_url: String,
    /// Where the bookmark list is kept.
    #[arg(long, default_value = "bookmarks.json")]
    bookmarks: PathBuf,
    /// Override the detected locale (en, ko).
    #[arg(long)]
    locale: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    i18n::init_locale(cli.locale.as_deref());
    let _ = std::fs::write("tokmark.log", "");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cli.start_url, cli.bookmarks);
    app.open_start_page();

    loop {
        app.handle_events();

        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let h = terminal.size()?.height;
                    if app.on_key(key.code, key.modifiers, h) {
                        break;
                    }
                }
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}
