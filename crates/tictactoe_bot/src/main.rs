//! Tic-tac-toe bot console.
//!
//! Reads commands from stdin, prints presentation requests to stdout and logs
//! to stderr.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use tictactoe_bot::cli::Cli;
use tictactoe_bot::console::{ConsoleCommand, parse_command, render_json, render_text};
use tictactoe_bot::{BotConfig, Dispatch, GameRegistry};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => BotConfig::from_file(path)?,
        None => BotConfig::default(),
    };
    info!(json = cli.json, "Starting tictactoe_bot console");

    let (dispatch_tx, mut dispatch_rx) = mpsc::unbounded_channel();
    let registry = GameRegistry::new(config, dispatch_tx);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(dispatch) = dispatch_rx.recv() => print_dispatch(&dispatch, cli.json)?,

            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read line from stdin")? else {
                    info!("Input closed");
                    break;
                };
                if !execute(&registry, &line, cli.json) {
                    break;
                }
            }
        }
    }

    registry.shutdown().await;
    while let Ok(dispatch) = dispatch_rx.try_recv() {
        print_dispatch(&dispatch, cli.json)?;
    }
    info!("Console stopped");
    Ok(())
}

/// Runs one console line. Returns false when the console should exit.
fn execute(registry: &GameRegistry, line: &str, json: bool) -> bool {
    let command = match parse_command(line) {
        Ok(Some(command)) => command,
        Ok(None) => return true,
        Err(e) => {
            notice(json, &e.to_string());
            return true;
        }
    };

    let result = match command {
        ConsoleCommand::Duel {
            challenger,
            challenged,
        } => registry
            .start_duel(challenger, challenged)
            .map(|id| notice(json, &format!("Started game {id}"))),
        ConsoleCommand::Bot {
            player,
            first_mover,
        } => registry
            .start_bot(player, first_mover)
            .map(|id| notice(json, &format!("Started game {id}"))),
        ConsoleCommand::Input { game_id, event } => registry.submit(game_id, event),
        ConsoleCommand::Abort(game_id) => registry
            .abort(game_id)
            .map(|()| notice(json, &format!("Aborted game {game_id}"))),
        ConsoleCommand::Games => {
            let games: Vec<_> = registry.active_games().iter().map(ToString::to_string).collect();
            notice(json, &format!("Games: {}", games.join(" ")));
            Ok(())
        }
        ConsoleCommand::Quit => return false,
    };

    if let Err(e) = result {
        warn!(error = %e, "Command failed");
        notice(json, &e.to_string());
    }
    registry.reap();
    true
}

fn print_dispatch(dispatch: &Dispatch, json: bool) -> Result<()> {
    if json {
        println!("{}", render_json(dispatch).context("Failed to encode dispatch")?);
    } else {
        println!("{}\n", render_text(dispatch));
    }
    Ok(())
}

fn notice(json: bool, message: &str) {
    if json {
        println!("{}", serde_json::json!({ "kind": "notice", "message": message }));
    } else {
        println!("{message}");
    }
}
