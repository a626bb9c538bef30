use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use livescore_client::config::Config;
use livescore_client::fixtures::{FixtureId, HttpFixtureGateway};
use livescore_client::view::{render, ViewCoordinator};

const HELP: &str = "\
Commands:
  live        load matches in progress
  today       load today's matches
  stream      start live auto-updates
  stop        stop live auto-updates
  open <id>   show statistics for a match
  close       close the statistics panel
  help        show this help
  quit        exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Live,
    Today,
    Stream,
    Stop,
    Open(FixtureId),
    Close,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Option<Command>, String> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Ok(None);
        };
        let command = match word.to_lowercase().as_str() {
            "live" => Command::Live,
            "today" => Command::Today,
            "stream" | "start" => Command::Stream,
            "stop" => Command::Stop,
            "open" | "select" => {
                let id = words
                    .next()
                    .ok_or_else(|| "usage: open <id>".to_string())?;
                let id = id
                    .trim_start_matches('#')
                    .parse()
                    .map_err(|_| format!("'{}' is not a fixture id", id))?;
                Command::Open(id)
            }
            "close" | "back" => Command::Close,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("unknown command '{}' (try 'help')", other)),
        };
        Ok(Some(command))
    }
}

/// Run a command. Loads and stats requests run in their own tasks so a
/// slow response never blocks the next command.
fn dispatch(coordinator: &Arc<ViewCoordinator>, command: Command) {
    match command {
        Command::Live => {
            let coordinator = Arc::clone(coordinator);
            tokio::spawn(async move { coordinator.load_live().await });
        }
        Command::Today => {
            let coordinator = Arc::clone(coordinator);
            tokio::spawn(async move { coordinator.load_today().await });
        }
        Command::Stream => {
            if !coordinator.start_stream() {
                warn!(
                    "Auto-update not started ({:?} mode)",
                    coordinator.snapshot().mode()
                );
            }
        }
        Command::Stop => coordinator.stop_stream(),
        Command::Open(id) => {
            let coordinator = Arc::clone(coordinator);
            tokio::spawn(async move {
                if !coordinator.select_fixture_id(id).await {
                    warn!("No fixture #{} in the current list", id);
                }
            });
        }
        Command::Close => coordinator.deselect_fixture(),
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the rendered view.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;
    info!(
        "Fixtures service: {} (push transport: {})",
        config.api_url, config.push_transport
    );

    let gateway = HttpFixtureGateway::new(
        &config.api_url,
        config.request_timeout(),
        config.push_transport,
    )
    .context("Failed to build fixtures gateway")?;
    let coordinator = Arc::new(ViewCoordinator::new(Arc::new(gateway)));

    let mut updates = coordinator.subscribe();
    let render_task = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            let mut stdout = std::io::stdout().lock();
            let _ = write!(stdout, "\x1B[2J\x1B[H{}", render(&state));
            let _ = stdout.flush();
        }
    });

    if config.no_auto_load {
        coordinator.activate_without_load();
        println!("{}", HELP);
    } else {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.activate().await });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => match Command::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => dispatch(&coordinator, command),
                    Ok(None) => {}
                    Err(msg) => eprintln!("{}", msg),
                },
                Ok(None) => {
                    info!("Input closed");
                    break;
                }
                Err(e) => {
                    error!("Failed to read input: {}", e);
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    coordinator.shutdown();
    render_task.abort();
    Ok(())
}
