//! Game configuration.

use crate::games::manhunt::{StationId, TicketWallet};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Ticket counts handed out at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct TicketAllowance {
    /// Cab tickets.
    #[serde(default)]
    cab: u32,
    /// Bus tickets.
    #[serde(default)]
    bus: u32,
    /// Tube tickets.
    #[serde(default)]
    tube: u32,
    /// Black tickets.
    #[serde(default)]
    black: u32,
}

impl TicketAllowance {
    /// Creates an allowance.
    pub fn new(cab: u32, bus: u32, tube: u32, black: u32) -> Self {
        Self {
            cab,
            bus,
            tube,
            black,
        }
    }

    /// A fresh wallet filled with this allowance.
    pub fn wallet(&self) -> TicketWallet {
        TicketWallet::new(self.cab, self.bus, self.tube, self.black)
    }
}

/// Rules and tuning of a manhunt game.
///
/// Every field has a default, so a TOML file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of rounds after which MisterX escapes.
    #[serde(default = "default_max_rounds")]
    max_rounds: u32,

    /// Move counts at which MisterX's station is revealed (ascending).
    #[serde(default = "default_reveal_rounds")]
    reveal_rounds: Vec<u32>,

    /// Allowed numbers of detectives.
    #[serde(default = "default_detective_counts")]
    detective_counts: Vec<usize>,

    /// Tickets each detective starts with. Black tickets are ignored.
    #[serde(default = "default_detective_tickets")]
    detective_tickets: TicketAllowance,

    /// Tickets MisterX starts with.
    #[serde(default = "default_mister_x_tickets")]
    mister_x_tickets: TicketAllowance,

    /// Stations start positions are drawn from.
    #[serde(default = "default_start_positions")]
    start_positions: Vec<StationId>,

    /// Maximum distance between a pointer and the station it selects.
    #[serde(default = "default_click_distance")]
    click_distance: f64,

    /// Minimum time an AI player waits before moving.
    #[serde(default = "default_thinking_delay_ms")]
    thinking_delay_ms: u64,
}

fn default_max_rounds() -> u32 {
    24
}

fn default_reveal_rounds() -> Vec<u32> {
    vec![3, 8, 13, 18, 24]
}

fn default_detective_counts() -> Vec<usize> {
    vec![3, 5]
}

fn default_detective_tickets() -> TicketAllowance {
    TicketAllowance::new(10, 8, 4, 0)
}

fn default_mister_x_tickets() -> TicketAllowance {
    TicketAllowance::new(10, 8, 4, 2)
}

fn default_start_positions() -> Vec<StationId> {
    vec![
        13, 26, 29, 34, 50, 53, 91, 94, 103, 112, 117, 132, 138, 141, 155, 174, 197, 198,
    ]
}

fn default_click_distance() -> f64 {
    0.025
}

fn default_thinking_delay_ms() -> u64 {
    2000
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            reveal_rounds: default_reveal_rounds(),
            detective_counts: default_detective_counts(),
            detective_tickets: default_detective_tickets(),
            mister_x_tickets: default_mister_x_tickets(),
            start_positions: default_start_positions(),
            click_distance: default_click_distance(),
            thinking_delay_ms: default_thinking_delay_ms(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(max_rounds = config.max_rounds, "Config loaded successfully");
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Fails if the text cannot be parsed or the values are inconsistent.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values are consistent with each other.
    ///
    /// # Errors
    ///
    /// Fails on non-ascending reveal rounds, an empty party size list or a
    /// zero round limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rounds == 0 {
            return Err(ConfigError::new("max_rounds must be positive".to_string()));
        }
        if self.reveal_rounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::new(format!(
                "reveal_rounds must be strictly ascending: {:?}",
                self.reveal_rounds
            )));
        }
        if self.detective_counts.is_empty() {
            return Err(ConfigError::new(
                "detective_counts must name at least one party size".to_string(),
            ));
        }
        Ok(())
    }

    /// Thinking delay as a duration.
    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }

    /// Returns a copy with a different thinking delay.
    pub fn with_thinking_delay(mut self, delay: Duration) -> Self {
        self.thinking_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Returns a copy with a different round limit and reveal schedule.
    pub fn with_rounds(mut self, max_rounds: u32, reveal_rounds: Vec<u32>) -> Self {
        self.max_rounds = max_rounds;
        self.reveal_rounds = reveal_rounds;
        self
    }

    /// Returns a copy with different allowed party sizes.
    pub fn with_detective_counts(mut self, counts: Vec<usize>) -> Self {
        self.detective_counts = counts;
        self
    }

    /// Returns a copy with a different start position pool.
    pub fn with_start_positions(mut self, positions: Vec<StationId>) -> Self {
        self.start_positions = positions;
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
