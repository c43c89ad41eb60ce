//! # Yahtzee Q
//!
//! A tabular Q-learning solver for Yahtzee: a deterministic dice-scoring
//! game-state machine paired with a self-play trainer that learns reroll
//! and category-selection policies.
//!
//! ## Features
//!
//! - **Pure Scoring Engine**: Deterministic category scores for any roll
//! - **Dense State Encoding**: Collision-free ids over dice × rerolls × scorecard
//! - **Tabular Trainer**: Sample-average Bellman updates with shaped rewards
//! - **Greedy Agent**: Plays from a learned table behind a small trait
//! - **Checkpointing**: Save and reload the learned tables exactly
//!
//! ## Quick Start
//!
//! ```ignore
//! use yahtzee_q::qlearn::{QConfig, QLearner};
//!
//! // 1. Configure a training run
//! let config = QConfig::default().with_seed(42);
//!
//! // 2. Train by self-play
//! let mut learner = QLearner::new(config)?;
//! let stats = learner.train();
//! println!("mean score {:.1} over {} episodes", stats.mean_score, stats.episodes);
//!
//! // 3. Persist the tables for the greedy agent
//! learner.save_checkpoint("q_state.bin")?;
//! ```
//!
//! ## Modules
//!
//! - [`game`]: Scoring, reroll catalog, actions, and the game state machine
//! - [`qlearn`]: State encoder, Q/visit tables, configuration, and the trainer
//! - [`agent`]: The `Agent` trait plus random and trained implementations
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       QLearner (trainer)                    │
//! │  - softmax action selection   - shaped rewards              │
//! │  - 1/n Bellman updates        - dense Q / visit tables      │
//! └─────────────────────────────────────────────────────────────┘
//!               │ drives                       │ produces
//!               ▼                              ▼
//!       ┌───────────────┐              ┌───────────────┐
//!       │   GameState   │◄─────────────│  TrainedAgent │
//!       │ (transitions) │    drives    │  RandomAgent  │
//!       └───────────────┘              └───────────────┘
//! ```

#![warn(missing_docs)]

/// Game rules module.
///
/// Scoring engine, reroll catalog, tagged actions, and the state machine.
pub mod game;

/// Q-learning module.
///
/// State encoder, dense tables with checkpointing, config, and the trainer.
pub mod qlearn;

/// Agents module.
///
/// Capability trait for turn-taking policies and its implementations.
pub mod agent;

// Re-export commonly used types at crate root for convenience
pub use agent::{Agent, RandomAgent, TrainedAgent};
pub use game::{Action, Category, GameError, GameState, RerollChoice};
pub use qlearn::{QConfig, QLearner, QTables, StateEncoder, TrainStats};
