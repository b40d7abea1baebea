use std::io::{self, Stderr};
use std::time::Duration;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind, MouseEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use futures_util::StreamExt;
use tokio::sync::mpsc;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
}

/// Merges terminal events and a periodic tick into one stream. The tick
/// drives the loading animation and pending-request polling.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut reader = event::EventStream::new();
            let mut ticker = tokio::time::interval(tick_rate);
            loop {
                let app_event = tokio::select! {
                    _ = ticker.tick() => Some(AppEvent::Tick),
                    maybe = reader.next() => match maybe {
                        Some(Ok(Event::Key(key))) => {
                            // Key press only, not release
                            if key.kind == KeyEventKind::Press {
                                Some(AppEvent::Key(key))
                            } else {
                                None
                            }
                        }
                        Some(Ok(Event::Mouse(mouse))) => Some(AppEvent::Mouse(mouse)),
                        Some(Ok(Event::Resize(w, h))) => Some(AppEvent::Resize(w, h)),
                        Some(Ok(_)) => None,
                        Some(Err(_)) | None => break,
                    },
                };

                if let Some(event) = app_event {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            }
        });

        Self { rx }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen)?;
    execute!(io::stderr(), crossterm::event::EnableMouseCapture)?;

    let backend = CrosstermBackend::new(io::stderr());
    let terminal = Terminal::new(backend)?;

    Ok(terminal)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), crossterm::event::DisableMouseCapture)?;
    execute!(io::stderr(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Install panic hook to restore terminal on panic
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}
