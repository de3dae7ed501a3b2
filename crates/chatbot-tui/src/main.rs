use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Result;
use clap::Parser;
use chatbot_core::{Config, HttpBackend};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser, Debug)]
#[command(name = "chatbot")]
#[command(version, about = "Terminal chat client for the chatbot backend")]
struct Cli {
    /// Chat endpoint to POST queries to (overrides the config file)
    #[arg(long, value_name = "URL")]
    backend_url: Option<String>,

    /// Persist --backend-url to the config file
    #[arg(long, requires = "backend_url")]
    save: bool,

    /// Where to write logs (default: <data dir>/chatbot/chatbot.log)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging is best effort; the UI still runs without it
    if let Some(path) = cli.log_file.clone().or_else(logging::default_log_path) {
        if let Err(e) = logging::init(&path, cli.verbose) {
            eprintln!("Logging disabled: {:#}", e);
        }
    }

    // Load config
    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load config, using defaults");
        Config::new()
    });

    if let Some(url) = cli.backend_url {
        config.backend_url = Some(url);
        if cli.save {
            config.save()?;
            tracing::info!(url = config.backend_url(), "saved backend url");
        }
    }

    let backend = HttpBackend::new(config.backend_url());
    tracing::info!(endpoint = backend.endpoint(), "starting chatbot");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new();
    let mut app = App::new(Arc::new(backend), config.backend_url(), events.sender());

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    tracing::info!(exchanges = app.session.transcript().len(), "exiting");
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}
