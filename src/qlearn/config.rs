//! Configuration and statistics for training runs.

use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a Q-learning run.
///
/// # Example
/// ```
/// use yahtzee_q::qlearn::QConfig;
///
/// let config = QConfig::default().with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QConfig {
    /// Number of self-play episodes (games) to train for.
    pub epochs: u64,

    /// Discount applied to the bootstrapped next-state value, in (0, 1).
    pub discount_rate: f64,

    /// Visit count below which a (state, action) pair counts as
    /// unexplored during action selection.
    pub exploration_threshold: u32,

    /// Placeholder value substituted for unexplored pairs.
    ///
    /// Must dominate any real Q-value magnitude so the softmax policy
    /// visits fresh pairs first.
    pub exploration_bonus: f64,

    /// Players per training game. Self-play shares one table across
    /// seats; 1 is the usual solitaire setup.
    pub players: usize,

    /// Random seed for reproducibility.
    ///
    /// If set, die rolls and action sampling are deterministic. If
    /// `None`, a random seed is used.
    pub seed: Option<u64>,
}

impl Default for QConfig {
    fn default() -> Self {
        Self {
            epochs: 10_000,
            discount_rate: 0.9,
            exploration_threshold: 5,
            exploration_bonus: 1_000.0,
            players: 1,
            seed: None,
        }
    }
}

impl QConfig {
    /// Create a new QConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the episode count.
    pub fn with_epochs(mut self, epochs: u64) -> Self {
        self.epochs = epochs;
        self
    }

    /// Builder method: set the discount rate.
    pub fn with_discount_rate(mut self, discount_rate: f64) -> Self {
        self.discount_rate = discount_rate;
        self
    }

    /// Builder method: set the player count.
    pub fn with_players(mut self, players: usize) -> Self {
        self.players = players;
        self
    }

    /// Builder method: set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.epochs == 0 {
            return Err(ConfigError::InvalidEpochs(self.epochs));
        }
        if !(self.discount_rate > 0.0 && self.discount_rate < 1.0) {
            return Err(ConfigError::InvalidDiscount(self.discount_rate));
        }
        if self.players == 0 {
            return Err(ConfigError::InvalidPlayerCount(self.players));
        }
        if self.exploration_bonus <= 0.0 {
            return Err(ConfigError::InvalidExplorationBonus(self.exploration_bonus));
        }
        Ok(())
    }
}

/// Errors that can occur when validating or loading a configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    IoError(String),
    /// The configuration file is not valid JSON.
    ParseError(String),
    /// Episode count must be positive.
    InvalidEpochs(u64),
    /// Discount rate is out of range (0, 1).
    InvalidDiscount(f64),
    /// At least one player is required.
    InvalidPlayerCount(usize),
    /// The exploration placeholder must be positive.
    InvalidExplorationBonus(f64),
    /// Loaded tables do not match the encoder's dimensions.
    TableShapeMismatch {
        /// (states, actions) the encoder expects.
        expected: (usize, usize),
        /// (states, actions) the tables carry.
        actual: (usize, usize),
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::InvalidEpochs(n) => {
                write!(f, "Epoch count {} must be positive", n)
            }
            ConfigError::InvalidDiscount(val) => {
                write!(f, "Discount rate {} is out of range (0, 1)", val)
            }
            ConfigError::InvalidPlayerCount(n) => {
                write!(f, "Player count {} must be at least 1", n)
            }
            ConfigError::InvalidExplorationBonus(val) => {
                write!(f, "Exploration bonus {} must be positive", val)
            }
            ConfigError::TableShapeMismatch { expected, actual } => {
                write!(
                    f,
                    "Table shape mismatch: expected {}x{}, got {}x{}",
                    expected.0, expected.1, actual.0, actual.1
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Statistics tracked during training.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainStats {
    /// Total number of episodes completed.
    pub episodes: u64,

    /// Total time spent training (in seconds).
    pub elapsed_seconds: f64,

    /// Episodes per second.
    pub episodes_per_second: f64,

    /// Mean final score across all recorded episodes.
    pub mean_score: f64,

    /// Final score of each episode, in order.
    pub scores: Vec<u32>,
}

impl TrainStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished episode.
    pub fn record_episode(&mut self, score: u32) {
        self.episodes += 1;
        self.scores.push(score);
    }

    /// Recompute the derived rate and mean fields.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.episodes_per_second = self.episodes as f64 / self.elapsed_seconds;
        }
        if !self.scores.is_empty() {
            self.mean_score =
                self.scores.iter().map(|&s| f64::from(s)).sum::<f64>() / self.scores.len() as f64;
        }
    }

    /// Mean score over the most recent `window` episodes.
    pub fn recent_mean(&self, window: usize) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        let tail = &self.scores[self.scores.len().saturating_sub(window)..];
        tail.iter().map(|&s| f64::from(s)).sum::<f64>() / tail.len() as f64
    }

    /// Save the stats as pretty-printed JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())
    }
}
