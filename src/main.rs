//! Strictly Manhunt - CLI
//!
//! Runs headless games between AI players.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use std::time::{Duration, Instant};
use strictly_manhunt::{
    Board, Control, EngineState, GameConfig, GameEngine, GameSetup, GameView, HeadlessView,
    SaveState, WinState,
};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            board,
            config,
            detectives,
            seed,
            max_steps,
            snapshot,
        } => run_play(&board, config.as_deref(), detectives, seed, max_steps, snapshot),
        Command::Resume {
            board,
            save,
            config,
            max_steps,
            snapshot,
        } => run_resume(&board, &save, config.as_deref(), max_steps, snapshot),
    }
}

/// Play a fresh all-AI game
#[instrument]
fn run_play(
    board: &Path,
    config: Option<&Path>,
    detectives: usize,
    seed: u64,
    max_steps: usize,
    snapshot: bool,
) -> Result<()> {
    let board = load_board(board)?;
    let config = load_config(config)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let setup = GameSetup::new(detectives, Control::Ai, Control::Ai);

    let engine = GameEngine::new_game(board, config, HeadlessView, setup, &mut rng)
        .context("Failed to set up game")?;
    run_to_end(engine, max_steps, snapshot)
}

/// Continue a saved game with AI players
#[instrument]
fn run_resume(
    board: &Path,
    save: &Path,
    config: Option<&Path>,
    max_steps: usize,
    snapshot: bool,
) -> Result<()> {
    let board = load_board(board)?;
    let config = load_config(config)?;
    let json = std::fs::read_to_string(save)
        .with_context(|| format!("Failed to read save state {}", save.display()))?;
    let save = SaveState::from_json(&json)?;

    let engine = GameEngine::restore(board, config, HeadlessView, &save)
        .context("Failed to restore game")?;
    run_to_end(engine, max_steps, snapshot)
}

fn load_board(path: &Path) -> Result<Board> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read board {}", path.display()))?;
    Ok(Board::from_json(&json)?)
}

/// Loads the config, with AI thinking time removed for headless play
fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let config = match path {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::default(),
    };
    Ok(config.with_thinking_delay(Duration::ZERO))
}

fn run_to_end<V: GameView>(
    mut engine: GameEngine<V>,
    max_steps: usize,
    snapshot: bool,
) -> Result<()> {
    engine.start()?;

    let mut steps = 0;
    while engine.state() != EngineState::Stopped {
        if steps >= max_steps {
            warn!(steps, "Step limit reached");
            break;
        }
        if engine.state() == EngineState::HumanPlaying {
            bail!("A human player is to move; only AI games run headless");
        }
        engine.step(Instant::now())?;
        steps += 1;
    }

    let outcome = engine.is_game_won();
    info!(%outcome, round = engine.round(), steps, "Finished");
    println!("{}", describe(outcome, engine.round()));

    if snapshot {
        println!("{}", engine.snapshot().to_json()?);
    }
    Ok(())
}

fn describe(outcome: WinState, round: u32) -> String {
    match outcome {
        WinState::NoWin => format!("No winner after round {}", round),
        state if state.detectives_win() => format!("Detectives win in round {}: {}", round, state),
        state => format!("MisterX wins in round {}: {}", round, state),
    }
}
