mod app;
mod cli;
mod config;
mod error;
mod fetch;
mod focus;
mod gateway;
mod input;
mod k8s;
mod model;
mod navigation;
mod panel;
mod ui;

use anyhow::{Context, Result};
use app::{App, AppCommand};
use clap::Parser;
use cli::CliArgs;
use config::Settings;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use fetch::FetchTasks;
use futures::StreamExt;
use k8s::KubeSession;
use navigation::{FetchOutcome, Level, NavigationController, Selection};
use panel::ListPanel;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_filter, args.log_file.as_deref())?;

    let mut settings = Settings::load(args.config.as_deref())?;
    settings.apply_focus_override(args.focus_override());
    let kubeconfig = args.kubeconfig_path()?;
    let session = KubeSession::connect(&kubeconfig, args.context.clone())
        .await
        .with_context(|| format!("failed to connect using {}", kubeconfig.display()))?;
    info!(
        "connected to {} via context {} (settings: {})",
        session.cluster(),
        session.context(),
        settings.source.as_deref().unwrap_or("defaults")
    );

    let (selection_tx, selection_rx) = mpsc::unbounded_channel::<Selection>();
    let levels = vec![
        Level::new(
            ListPanel::new(settings.panel_title(0)),
            Arc::new(session.namespaces(settings.page_size)),
        ),
        Level::new(
            ListPanel::new(settings.panel_title(1)),
            Arc::new(session.pods(settings.page_size)),
        ),
    ];
    let navigation = NavigationController::new(levels, selection_tx)?;
    let mut app = App::new(
        session.context().to_string(),
        session.cluster().to_string(),
        navigation,
        settings.focus_follows_selection,
    );

    run(&mut app, selection_rx, settings.fetch_timeout).await
}

fn init_tracing(level_filter: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .compact();

    // The terminal is owned by the UI, so logs either go to a file or nowhere.
    let _ = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(io::sink).try_init(),
    };

    Ok(())
}

async fn run(
    app: &mut App,
    selections: mpsc::UnboundedReceiver<Selection>,
    fetch_timeout: Duration,
) -> Result<()> {
    let mut terminal = init_terminal()?;
    let run_result = run_loop(&mut terminal, app, selections, fetch_timeout).await;
    let restore_result = restore_terminal(&mut terminal);

    match (run_result, restore_result) {
        (Err(run_error), Err(restore_error)) => Err(anyhow::anyhow!(
            "{run_error:#}\nterminal restore error: {restore_error:#}"
        )),
        (Err(error), _) => Err(error),
        (_, Err(error)) => Err(error),
        (Ok(()), Ok(())) => Ok(()),
    }
}

fn init_terminal() -> Result<TuiTerminal> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().context("failed to clear terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut TuiTerminal) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

async fn run_loop(
    terminal: &mut TuiTerminal,
    app: &mut App,
    mut selections: mpsc::UnboundedReceiver<Selection>,
    fetch_timeout: Duration,
) -> Result<()> {
    let mut reader = EventStream::new();
    let (outcome_tx, mut outcomes) = mpsc::unbounded_channel::<FetchOutcome>();
    let mut fetches = FetchTasks::new(outcome_tx, fetch_timeout);

    fetches.spawn(app.refresh_root());

    loop {
        for request in app.drain_selections(&mut selections) {
            fetches.spawn(request);
        }
        terminal
            .draw(|frame| ui::render(frame, app))
            .context("failed to render terminal frame")?;

        if !app.running() {
            break;
        }

        tokio::select! {
            maybe_event = reader.next() => {
                let action = match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        input::map_key(key)
                    }
                    Some(Ok(Event::Mouse(mouse))) => input::map_mouse(mouse),
                    Some(Ok(_)) => None,
                    Some(Err(error)) => {
                        app.set_status(format!("terminal event error: {error}"));
                        None
                    }
                    None => {
                        app.set_status("terminal event stream closed");
                        break;
                    }
                };
                if let Some(action) = action {
                    debug!("action={action:?}");
                    if let AppCommand::Fetch(request) = app.apply_action(action) {
                        fetches.spawn(request);
                    }
                }
            }
            Some(selection) = selections.recv() => {
                if let Some(request) = app.handle_selection(selection) {
                    fetches.spawn(request);
                }
            }
            Some(outcome) = outcomes.recv() => {
                fetches.finished(outcome.panel, outcome.ticket);
                app.complete_fetch(outcome);
            }
        }
    }

    fetches.abort_all();
    Ok(())
}
