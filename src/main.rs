mod app;
mod config;
mod document;
mod overlay;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{CrosstermBackend, TestBackend},
    layout::Rect,
    Terminal,
};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Dialog, Message};
use config::AppConfig;
use theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "scrim")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "Modal overlays for the terminal: focus trap, scroll lock, escape and backdrop dismissal")]
struct Args {
    /// Config file (defaults to ~/.config/scrim/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Open a dialog on start
    #[arg(short, long, value_enum)]
    open: Option<Dialog>,

    /// Print the document state as JSON and exit
    #[arg(short, long)]
    state: bool,

    /// Render one frame as plain text and exit
    #[arg(short, long)]
    dump: bool,

    /// Headless viewport width
    #[arg(long, default_value_t = 80)]
    width: u16,

    /// Headless viewport height
    #[arg(long, default_value_t = 24)]
    height: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never land in --state/--dump output
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;
    ui::init_theme(Theme::load(config.theme.as_deref()));
    tracing::info!(breakpoint = config.narrow_breakpoint, "starting scrim");

    // Handle headless commands
    if args.state || args.dump {
        return run_headless(&args, config);
    }

    // Run TUI
    run_tui(config, args.open).await
}

/// The app, with `open` already applied.
fn build_app(
    config: AppConfig,
    viewport: Rect,
    open: Option<Dialog>,
) -> (App, UnboundedReceiver<Message>) {
    let (mut app, mut rx) = App::new(config, viewport);
    if let Some(dialog) = open {
        app.update(Message::Open(dialog));
        app.drain(&mut rx);
    }
    (app, rx)
}

fn run_headless(args: &Args, config: AppConfig) -> Result<()> {
    let viewport = Rect::new(0, 0, args.width, args.height);
    let (app, _rx) = build_app(config, viewport, args.open);

    if args.state {
        println!("{}", serde_json::to_string_pretty(&app.snapshot())?);
        return Ok(());
    }

    let mut terminal = Terminal::new(TestBackend::new(args.width, args.height))?;
    terminal.draw(|f| ui::draw(f, &app))?;
    for line in ui::buffer_lines(terminal.backend().buffer()) {
        println!("{}", line);
    }
    Ok(())
}

async fn run_tui(config: AppConfig, open: Option<Dialog>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, config, open).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: AppConfig,
    open: Option<Dialog>,
) -> Result<()> {
    let size = terminal.size()?;
    let tick_rate = Duration::from_millis(config.tick_rate_ms.max(1));
    let viewport = Rect::new(0, 0, size.width, size.height);
    let (mut app, mut messages) = build_app(config, viewport, open);

    // crossterm reads block, so they get their own thread
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let reader = tokio::task::spawn_blocking(move || -> Result<()> {
        while !event_tx.is_closed() {
            if event::poll(Duration::from_millis(100))? {
                if event_tx.send(event::read()?).is_err() {
                    break;
                }
            }
        }
        Ok(())
    });

    let mut ticker = tokio::time::interval(tick_rate);
    let result = loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        tokio::select! {
            event = events.recv() => {
                if let Some(done) = on_terminal_event(&mut app, event) {
                    break done;
                }
            }
            Some(message) = messages.recv() => app.update(message),
            _ = ticker.tick() => app.tick(),
        }
    };

    // The reader's own error says more than the closed channel
    drop(events);
    reader.await??;
    result
}

/// Feed one read from the event channel to the app. `Some` ends the loop.
fn on_terminal_event(app: &mut App, event: Option<Event>) -> Option<Result<()>> {
    match event {
        Some(event) => app.handle_event(event).then_some(Ok(())),
        None => Some(Err(anyhow::anyhow!("terminal event reader stopped"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn viewport() -> Rect {
        Rect::new(0, 0, 80, 24)
    }

    #[test]
    fn test_open_flag_applies_to_new_app() {
        let (app, _rx) = build_app(AppConfig::default(), viewport(), Some(Dialog::Sheet));
        assert!(app.is_open(Dialog::Sheet));
        assert_eq!(app.document().layer_count(), 1);

        let (app, _rx) = build_app(AppConfig::default(), viewport(), None);
        assert_eq!(app.document().layer_count(), 0);
    }

    #[test]
    fn test_closed_event_channel_ends_loop_with_error() {
        let (mut app, _rx) = build_app(AppConfig::default(), viewport(), None);
        let outcome = on_terminal_event(&mut app, None);
        assert!(matches!(outcome, Some(Err(_))));
    }

    #[test]
    fn test_events_keep_loop_running_until_quit() {
        let (mut app, _rx) = build_app(AppConfig::default(), viewport(), None);
        let tab = Event::Key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        assert!(on_terminal_event(&mut app, Some(tab)).is_none());

        let quit = Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(matches!(on_terminal_event(&mut app, Some(quit)), Some(Ok(()))));
    }
}
