use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

mod app;
mod client;
mod config;
mod handler;
mod markdown;
mod tui;
mod ui;

use app::App;
use config::Config;

#[derive(Parser)]
#[command(name = "charla")]
#[command(about = "Terminal client for a conversational RAG server", version)]
struct Cli {
    /// Chat server base URL (overrides the config file)
    #[arg(short, long, env = "CHARLA_SERVER")]
    server: Option<String>,

    /// Disable the "Thinking" indicator
    #[arg(long)]
    no_spinner: bool,

    /// Notify the server with POST /exit when the conversation is reset
    #[arg(long)]
    notify_exit: bool,

    /// Write debug logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|_| Config::default());
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if cli.no_spinner {
        config.show_spinner = false;
    }
    if cli.notify_exit {
        config.notify_exit = true;
    }
    if let Some(path) = cli.log_file {
        config.log_file = Some(path);
    }

    // The terminal belongs to the TUI, so logs go to a file or nowhere
    if let Some(path) = config.log_file.clone() {
        init_logging(&path)?;
    }
    log::debug!("starting session against {}", config.server_url);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new(Duration::from_millis(250));
    let mut app = App::new(config);

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

async fn run(terminal: &mut tui::Tui, events: &mut tui::EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event);
        } else {
            break;
        }

        app.poll_pending().await;
    }
    Ok(())
}
