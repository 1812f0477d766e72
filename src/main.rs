//! Satama - terminal front end
//!
//! Plays sessions on stdin/stdout, validates catalogs and lists saved results.

#![warn(missing_docs)]

mod cli;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use satama::{
    FileCatalog, GameConfig, GameService, JsonResultStore, ResultStore, StaticIdentity,
    SystemClock, play,
};
use satama_core::{Difficulty, RoundMix, UserId};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = GameConfig::discover(cli.config.as_deref())?;

    match cli.command {
        Command::Play {
            rounds,
            difficulty,
            mix,
            seed,
            player,
            catalog,
            results,
        } => {
            let overrides = PlayOverrides {
                rounds,
                difficulty,
                mix,
                seed,
                player,
                catalog,
                results,
            };
            run_play(overrides.apply(config))
        }
        Command::Catalog { path } => {
            run_catalog(path.as_deref().unwrap_or(config.catalog_path().as_path()))
        }
        Command::History { player, results } => {
            let results = results.unwrap_or_else(|| config.results_path().clone());
            run_history(&results, player.map(UserId::from))
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug)]
struct PlayOverrides {
    rounds: Option<u32>,
    difficulty: Option<Difficulty>,
    mix: Option<RoundMix>,
    seed: Option<u64>,
    player: Option<String>,
    catalog: Option<PathBuf>,
    results: Option<PathBuf>,
}

impl PlayOverrides {
    fn apply(self, config: GameConfig) -> GameConfig {
        let mut session = config.session().clone();
        if let Some(rounds) = self.rounds {
            session = session.with_round_count(rounds);
        }
        if let Some(difficulty) = self.difficulty {
            session = session.with_difficulty(difficulty);
        }
        if let Some(mix) = self.mix {
            session = session.with_mix(mix);
        }
        if let Some(seed) = self.seed {
            session = session.with_seed(seed);
        }

        let player = self.player.map(UserId::from).or_else(|| config.player().clone());
        let mut config = config.with_session(session).with_player(player);
        if let Some(catalog) = self.catalog {
            config = config.with_catalog_path(catalog);
        }
        if let Some(results) = self.results {
            config = config.with_results_path(results);
        }
        config
    }
}

/// Play one session in the terminal
#[instrument(skip(config))]
fn run_play(config: GameConfig) -> Result<()> {
    let catalog = FileCatalog::load(config.catalog_path())
        .with_context(|| format!("loading catalog {}", config.catalog_path().display()))?;
    let identity = StaticIdentity::from(config.player().clone());
    let store = JsonResultStore::new(config.results_path());

    info!(player = ?config.player(), "Starting terminal game");
    let mut service = GameService::new(
        catalog,
        identity,
        store,
        SystemClock,
        config.rules().clone(),
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    play(&mut service, config.session(), stdin.lock(), stdout.lock())?;
    Ok(())
}

/// Validate a catalog and print its counts
#[instrument(skip(path), fields(path = %path.display()))]
fn run_catalog(path: &Path) -> Result<()> {
    let catalog = FileCatalog::load(path)?;
    println!("{}", path.display());
    println!("{:<8} {:>8} {:>10}", "level", "harbors", "questions");
    for (difficulty, harbors, questions) in catalog.content().counts() {
        println!("{:<8} {:>8} {:>10}", difficulty, harbors, questions);
    }
    Ok(())
}

/// List saved sessions
#[instrument(skip(results), fields(results = %results.display()))]
fn run_history(results: &Path, player: Option<UserId>) -> Result<()> {
    let store = JsonResultStore::new(results);
    let sessions = match &player {
        Some(player) => store.load_for(player)?,
        None => store.load_all()?,
    };
    if sessions.is_empty() {
        println!("No saved sessions");
        return Ok(());
    }

    for session in &sessions {
        println!(
            "{}  {:<12} {:<6} {:>6} points  {} rounds  best streak {}",
            session.started_at().format("%Y-%m-%d %H:%M"),
            session.player().as_ref().map(UserId::as_str).unwrap_or("guest"),
            session.difficulty(),
            session.total_score(),
            session.rounds_played(),
            session.best_streak(),
        );
    }
    Ok(())
}
