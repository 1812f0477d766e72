//! Command-line interface for satama.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use satama_core::{Difficulty, RoundMix};

/// Satama - guess harbors on the map and answer harbor trivia
#[derive(Parser, Debug)]
#[command(name = "satama")]
#[command(about = "Harbor-guessing and trivia game", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to $SATAMA_CONFIG, then ./satama.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a session in the terminal
    Play {
        /// Number of rounds, at most 100
        #[arg(short, long)]
        rounds: Option<u32>,

        /// Difficulty: easy, medium or hard
        #[arg(short, long)]
        difficulty: Option<Difficulty>,

        /// Round mix: location, trivia, alternating or a pattern such as "location,location,trivia"
        #[arg(short, long)]
        mix: Option<RoundMix>,

        /// Seed for a repeatable round order
        #[arg(long)]
        seed: Option<u64>,

        /// Player name; results are saved only for named players
        #[arg(short, long)]
        player: Option<String>,

        /// Catalog file
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Results file
        #[arg(long)]
        results: Option<PathBuf>,
    },

    /// Validate a catalog file and show its contents per difficulty
    Catalog {
        /// Catalog file
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// List saved sessions
    History {
        /// Only sessions of this player
        #[arg(short, long)]
        player: Option<String>,

        /// Results file
        #[arg(long)]
        results: Option<PathBuf>,
    },
}
