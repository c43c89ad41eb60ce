//! Tabular Q-learning.
//!
//! The trainer drives the game state machine through synthetic episodes,
//! consulting the scoring engine for rewards and the state encoder for
//! dense table indices.
//!
//! # Overview
//!
//! Learning is classic tabular Q-learning with a sample-average step size:
//!
//! ```text
//! n     = visits(s, a) + 1
//! alpha = 1 / n
//! Q[s,a] = (1 - alpha) * Q[s,a] + alpha * (reward + discount * max Q[s'])
//! ```
//!
//! Two details carry most of the learning signal:
//!
//! - **Exploration by visit count**: actions seen fewer than a threshold
//!   number of times are treated as promising a huge placeholder value, so
//!   the softmax policy drifts toward unexplored pairs first.
//! - **Dense shaping**: rerolls are rewarded by the mean of the scores the
//!   new dice would fetch across all 13 categories, so signal flows at
//!   every decision instead of only at category writes.
//!
//! # Usage
//!
//! 1. Build a [`QConfig`] (or load one from JSON)
//! 2. Create a [`QLearner`] and call `train()`
//! 3. Save the checkpoint and hand it to a
//!    [`TrainedAgent`](crate::agent::TrainedAgent)

pub mod config;
pub mod encoder;
pub mod storage;
pub mod trainer;

// Re-export main types for convenient access
pub use config::{ConfigError, QConfig, TrainStats};
pub use encoder::{StateEncoder, DICE_MULTISETS, NUM_STATES};
pub use storage::{CheckpointError, CheckpointMeta, QTables};
pub use trainer::QLearner;
