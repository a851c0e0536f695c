//! Command-line interface for tictactoe_bot.

use clap::Parser;
use std::path::PathBuf;

/// Tic-tac-toe bot - duels and games against a minimax opponent, driven from the console
#[derive(Parser, Debug)]
#[command(name = "tictactoe_bot")]
#[command(about = "Host tic-tac-toe duels and computer games from the console", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file. Built-in defaults apply when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print presentation requests as JSON lines instead of text boards
    #[arg(long)]
    pub json: bool,
}
