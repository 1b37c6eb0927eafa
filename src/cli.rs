//! Command-line interface for strictly_manhunt.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Manhunt - hidden-movement pursuit game engine
#[derive(Parser, Debug)]
#[command(name = "strictly_manhunt")]
#[command(about = "Hidden-movement pursuit game with AI players", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a game between AI players until it ends
    Play {
        /// Path to the network description (JSON)
        #[arg(short, long)]
        board: PathBuf,

        /// Path to a game config (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of detectives
        #[arg(short, long, default_value = "3")]
        detectives: usize,

        /// Seed for drawing start positions
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Give up after this many engine steps
        #[arg(long, default_value = "10000")]
        max_steps: usize,

        /// Print the final position as a save state
        #[arg(long)]
        snapshot: bool,
    },

    /// Continue a saved game with AI players until it ends
    Resume {
        /// Path to the network description (JSON)
        #[arg(short, long)]
        board: PathBuf,

        /// Path to the save state (JSON)
        #[arg(short, long)]
        save: PathBuf,

        /// Path to a game config (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Give up after this many engine steps
        #[arg(long, default_value = "10000")]
        max_steps: usize,

        /// Print the final position as a save state
        #[arg(long)]
        snapshot: bool,
    },
}
