mod app;
mod cli;
mod config;
mod gateway;
mod input;
mod model;
mod parser;
mod session;
mod ui;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::CliArgs;
use config::RuntimeConfig;
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use gateway::KindGateway;
use model::StatusMessage;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use session::Session;
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use tokio::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;
const INSTALL_URL: &str = "https://kind.sigs.k8s.io/docs/user/quick-start/#installation";

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_filter, args.log_file.as_deref())?;

    let config = RuntimeConfig::load(&args)?;
    match config.source.as_deref() {
        Some(source) => info!("loaded config from {source}"),
        None => info!("no config file found, using defaults"),
    }

    let gateway = KindGateway::new(config.kind_bin.clone(), config.kubectl_bin.clone());
    ensure_kind_available(gateway.kind_bin())?;

    let mut session = Session::new(
        Arc::new(gateway),
        Duration::from_secs(config.status_clear_secs),
    );
    if config.refresh_on_start {
        session.refresh_clusters();
    } else {
        session.notify(StatusMessage::info("Press r to list clusters"));
    }

    run(&mut session).await
}

fn init_tracing(level_filter: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact();

    // The terminal belongs to the UI, so logs go to a file or nowhere.
    let _ = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(io::sink).try_init(),
    };

    Ok(())
}

fn ensure_kind_available(kind_bin: &str) -> Result<()> {
    let probe = Command::new(kind_bin)
        .arg("version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match probe {
        Ok(status) => {
            debug!("{kind_bin} version exited with {status}");
            Ok(())
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            bail!("'{kind_bin}' was not found in PATH. Install kind first: {INSTALL_URL}")
        }
        Err(error) => Err(error).with_context(|| format!("failed to run '{kind_bin} version'")),
    }
}

async fn run(session: &mut Session) -> Result<()> {
    let mut terminal = init_terminal()?;
    let run_result = run_loop(&mut terminal, session).await;
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
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().context("failed to clear terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut TuiTerminal) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

async fn run_loop(terminal: &mut TuiTerminal, session: &mut Session) -> Result<()> {
    let mut reader = EventStream::new();

    loop {
        terminal
            .draw(|frame| ui::render(frame, session.app()))
            .context("failed to render terminal frame")?;

        if !session.app().running() {
            break;
        }

        tokio::select! {
            maybe_event = reader.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let Some(action) = input::map_key(session.app().view(), key) {
                            debug!("action={action:?}");
                            session.handle_action(action);
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        warn!("terminal event error: {error}");
                        session.notify(StatusMessage::error(format!("terminal event error: {error}")));
                    }
                    None => {
                        warn!("terminal event stream closed");
                        break;
                    }
                }
            }
            Some(event) = session.next_event() => {
                session.handle_event(event);
            }
        }
    }

    Ok(())
}
