//! The tabular Q-learning trainer.
//!
//! `QLearner` owns the Q/visit tables, the state encoder, and the episode
//! loop. One episode is one complete game of self-play: a forced first
//! roll, then alternate action selection, transition, and update until
//! every category is written.
//!
//! Rewards differ by action kind. A category claim pays the points it
//! credits and immediately chains into the next turn's mandatory roll, so
//! its value bootstraps against the next real decision point. A reroll
//! pays a shaped reward: the mean score the fresh dice would fetch across
//! all 13 categories (bonus-adjusted), which keeps signal flowing at every
//! step instead of only at claims.

use std::path::Path;
use std::time::Instant;

use arrayvec::ArrayVec;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::action::{legal_actions, Action, MAX_LEGAL_ACTIONS, NUM_ACTIONS};
use crate::game::reroll::RerollChoice;
use crate::game::scoring::{score_roll, Category, CATEGORY_COUNT};
use crate::game::state::{GameState, MULTI_YAHTZEE_BONUS, UPPER_BONUS, UPPER_BONUS_THRESHOLD};
use crate::qlearn::config::{ConfigError, QConfig, TrainStats};
use crate::qlearn::encoder::{StateEncoder, NUM_STATES};
use crate::qlearn::storage::{CheckpointError, CheckpointMeta, QTables};

/// Fixed divisor applied before exponentiating softmax inputs.
///
/// Keeps `exp` well away from overflow for any value the tables or the
/// exploration placeholder can produce.
const SOFTMAX_SCALE: f64 = 1_000.0;

/// The Q-learning trainer.
///
/// Owns both tables plus the encoder; nothing is module-level state.
///
/// # Example
/// ```ignore
/// use yahtzee_q::qlearn::{QConfig, QLearner};
///
/// let mut learner = QLearner::new(QConfig::default().with_seed(42))?;
/// let stats = learner.train();
/// println!("mean score: {:.1}", stats.mean_score);
/// learner.save_checkpoint("q_state.bin")?;
/// ```
pub struct QLearner {
    config: QConfig,
    encoder: StateEncoder,
    tables: QTables,
    rng: StdRng,
    stats: TrainStats,
}

impl QLearner {
    /// Create a trainer with fresh zero-initialized tables.
    ///
    /// Fails on an invalid configuration; training itself has no fatal
    /// error path.
    pub fn new(config: QConfig) -> Result<QLearner, ConfigError> {
        Self::with_tables(config, QTables::new(NUM_STATES, NUM_ACTIONS))
    }

    /// Create a trainer around existing tables (resume from a checkpoint).
    pub fn with_tables(config: QConfig, tables: QTables) -> Result<QLearner, ConfigError> {
        config.validate()?;
        if tables.num_states() != NUM_STATES || tables.num_actions() != NUM_ACTIONS {
            return Err(ConfigError::TableShapeMismatch {
                expected: (NUM_STATES, NUM_ACTIONS),
                actual: (tables.num_states(), tables.num_actions()),
            });
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(QLearner {
            config,
            encoder: StateEncoder::new(),
            tables,
            rng,
            stats: TrainStats::new(),
        })
    }

    /// Train for the configured number of episodes.
    pub fn train(&mut self) -> &TrainStats {
        self.train_with_callback(0, |_| {})
    }

    /// Train with a callback for progress tracking.
    ///
    /// The callback fires every `callback_interval` episodes (0 disables
    /// it) with up-to-date rate and score statistics.
    pub fn train_with_callback<F>(&mut self, callback_interval: u64, mut callback: F) -> &TrainStats
    where
        F: FnMut(&TrainStats),
    {
        let start_time = Instant::now();

        for episode in 0..self.config.epochs {
            let score = self.train_episode();
            self.stats.record_episode(score);

            if callback_interval > 0 && (episode + 1) % callback_interval == 0 {
                self.stats.elapsed_seconds = start_time.elapsed().as_secs_f64();
                self.stats.update_rate();
                callback(&self.stats);
            }
        }

        self.stats.elapsed_seconds = start_time.elapsed().as_secs_f64();
        self.stats.update_rate();
        &self.stats
    }

    /// Run one training episode and return player 0's final score.
    fn train_episode(&mut self) -> u32 {
        let mut state = GameState::new(self.config.players, &mut self.rng);
        // Mandatory first roll before the first decision point
        state = state
            .apply_reroll(RerollChoice::full(), &mut self.rng)
            .expect("fresh turn has rerolls");
        let mut state_id = self.encoder.state_to_id(&state);

        while !state.is_final() {
            let action = self.select_action(&state, state_id);
            let (next_state, next_state_id, reward) = self.perform_action(&state, action);

            // Terminal transitions keep their last learned value
            if !next_state.is_final() {
                sample_average_update(
                    &mut self.tables,
                    state_id,
                    action.id(),
                    reward,
                    self.config.discount_rate,
                    next_state_id,
                );
            }

            state = next_state;
            state_id = next_state_id;
        }

        state.total_score(0)
    }

    /// Pick a training action: softmax over Q-values with unexplored
    /// pairs boosted to the exploration placeholder.
    fn select_action(&mut self, state: &GameState, state_id: usize) -> Action {
        let actions = legal_actions(state);
        debug_assert!(!actions.is_empty(), "no legal action in non-terminal state");

        // Unexplored pairs pretend to offer an outsized reward, pulling
        // the sampled policy toward them until the threshold is met
        let mut weights: ArrayVec<f64, MAX_LEGAL_ACTIONS> = actions
            .iter()
            .map(|action| {
                if self.tables.visits(state_id, action.id()) < self.config.exploration_threshold {
                    self.config.exploration_bonus
                } else {
                    f64::from(self.tables.q(state_id, action.id()))
                }
            })
            .collect();

        let mut total = 0.0;
        for weight in &mut weights {
            *weight = (*weight / SOFTMAX_SCALE).exp();
            total += *weight;
        }

        // Cumulative-sum sampling from the categorical distribution
        let r: f64 = self.rng.gen::<f64>() * total;
        let mut cumsum = 0.0;
        for (action, weight) in actions.iter().zip(weights.iter()) {
            cumsum += weight;
            if r < cumsum {
                return *action;
            }
        }

        // Fallback to last action (handles floating point imprecision)
        actions[actions.len() - 1]
    }

    /// Highest-valued legal action under the learned table, no sampling.
    fn greedy_action(&self, state: &GameState, state_id: usize) -> Option<Action> {
        let actions = legal_actions(state);
        self.tables
            .argmax_among(state_id, actions.iter().map(|a| a.id()))
            .and_then(Action::from_id)
    }

    /// Apply an action; return the next state, its id, and the reward.
    ///
    /// A category claim chains into the next turn's mandatory roll before
    /// the next id is computed, so bootstrapping sees the next decision
    /// point rather than a stale pre-roll state.
    fn perform_action(&mut self, state: &GameState, action: Action) -> (GameState, usize, f64) {
        match action {
            Action::SelectCategory(category) => {
                let (claimed, credited) = state
                    .apply_category_scored(category)
                    .expect("action was drawn from the legal set");
                let next = claimed
                    .apply_reroll(RerollChoice::full(), &mut self.rng)
                    .expect("new turn has rerolls");
                let next_id = self.encoder.state_to_id(&next);
                (next, next_id, f64::from(credited))
            }
            Action::Reroll(choice) => {
                let next = state
                    .apply_reroll(choice, &mut self.rng)
                    .expect("action was drawn from the legal set");
                let reward = shaped_reroll_reward(&next);
                let next_id = self.encoder.state_to_id(&next);
                (next, next_id, reward)
            }
        }
    }

    /// Play one full game greedily and return player 0's score.
    pub fn play_greedy_episode(&mut self) -> u32 {
        let mut state = GameState::new(self.config.players, &mut self.rng);
        state = state
            .apply_reroll(RerollChoice::full(), &mut self.rng)
            .expect("fresh turn has rerolls");

        while !state.is_final() {
            let state_id = self.encoder.state_to_id(&state);
            let action = self
                .greedy_action(&state, state_id)
                .expect("no legal action in non-terminal state");
            let (next_state, _, _) = self.perform_action(&state, action);
            state = next_state;
        }

        state.total_score(0)
    }

    /// Play `episodes` greedy games and return their final scores.
    pub fn evaluate(&mut self, episodes: u64) -> Vec<u32> {
        (0..episodes).map(|_| self.play_greedy_episode()).collect()
    }

    /// Save the tables plus run hyperparameters to a checkpoint file.
    pub fn save_checkpoint<P: AsRef<Path>>(&self, path: P) -> Result<(), CheckpointError> {
        let meta = CheckpointMeta {
            epochs: self.stats.episodes,
            discount_rate: self.config.discount_rate as f32,
            exploration_threshold: self.config.exploration_threshold,
        };
        self.tables.save(path, &meta)
    }

    /// Get the learned tables.
    pub fn tables(&self) -> &QTables {
        &self.tables
    }

    /// Consume the trainer, yielding the learned tables.
    pub fn into_tables(self) -> QTables {
        self.tables
    }

    /// Get the configuration.
    pub fn config(&self) -> &QConfig {
        &self.config
    }

    /// Get current statistics.
    pub fn stats(&self) -> &TrainStats {
        &self.stats
    }
}

/// Shaped reward for a reroll, computed on the post-reroll state.
///
/// The mean over all 13 categories of "what would this category pay right
/// now", whether or not each is still selectable, plus the two
/// bonus terms the scorecard already guarantees: the upper bonus once the
/// filled upper section has reached its threshold, and the multi-Yahtzee
/// bonus when five equal dice land on a card whose Yahtzee scored.
fn shaped_reroll_reward(state: &GameState) -> f64 {
    let dice = state.dice();
    let scores = score_roll(dice);
    let card = state.scorecard(state.current_player());

    let mut total: f64 = scores.iter().map(|&s| f64::from(s)).sum();

    if card.upper_sum() >= UPPER_BONUS_THRESHOLD {
        total += f64::from(UPPER_BONUS);
    }

    let five_equal = dice.iter().all(|&d| d == dice[0]);
    if five_equal && card.get(Category::Yahtzee).is_some_and(|s| s > 0) {
        total += f64::from(MULTI_YAHTZEE_BONUS);
    }

    total / CATEGORY_COUNT as f64
}

/// Apply one sample-average Bellman update and return the new Q-value.
///
/// `alpha = 1/n` with `n` the post-increment visit count, so each pair's
/// step size shrinks as it is revisited and the update interpolates
/// between the old value and `reward + discount * max Q[next]`.
fn sample_average_update(
    tables: &mut QTables,
    state: usize,
    action: usize,
    reward: f64,
    discount: f64,
    next_state: usize,
) -> f32 {
    let n = tables.bump_visit(state, action);
    let alpha = 1.0 / f64::from(n);
    let old = f64::from(tables.q(state, action));
    let target = reward + discount * f64::from(tables.row_max(next_state));

    let updated = ((1.0 - alpha) * old + alpha * target) as f32;
    tables.set_q(state, action, updated);
    updated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_interpolates_between_old_and_target() {
        let mut tables = QTables::new(4, 3);
        tables.set_q(0, 1, 10.0);
        tables.set_q(2, 0, 4.0); // next-state row max
        // seed some visits so alpha is 1/3 on the next update
        tables.bump_visit(0, 1);
        tables.bump_visit(0, 1);

        let reward = 7.0;
        let discount = 0.9;
        let target = reward + discount * 4.0;
        let updated = sample_average_update(&mut tables, 0, 1, reward, discount, 2);

        let (low, high) = (10.0_f32.min(target as f32), 10.0_f32.max(target as f32));
        assert!(updated >= low && updated <= high, "not an interpolation");
        // alpha = 1/3 exactly
        let expected = (2.0 / 3.0) * 10.0 + (1.0 / 3.0) * target;
        assert!((f64::from(updated) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_learning_rate_strictly_decreases() {
        let mut tables = QTables::new(2, 2);
        let mut last_alpha = f64::INFINITY;
        for _ in 0..10 {
            let n = tables.bump_visit(0, 0);
            let alpha = 1.0 / f64::from(n);
            assert!(alpha < last_alpha);
            last_alpha = alpha;
        }
    }

    #[test]
    fn test_first_update_jumps_to_target() {
        // With n = 1, alpha = 1 and the old value vanishes entirely
        let mut tables = QTables::new(2, 2);
        tables.set_q(1, 0, 2.0); // next-state value
        let updated = sample_average_update(&mut tables, 0, 0, 5.0, 0.5, 1);
        assert!((updated - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_shaped_reward_is_mean_over_categories() {
        // On a fresh card no bonus term can fire, so the shaped reward is
        // exactly the mean of the 13 predicted scores for whatever rolled
        let mut rng = StdRng::seed_from_u64(5);
        let state = GameState::new(1, &mut rng)
            .apply_reroll(RerollChoice::full(), &mut rng)
            .unwrap();

        let expected: f64 = score_roll(state.dice())
            .iter()
            .map(|&s| f64::from(s))
            .sum::<f64>()
            / CATEGORY_COUNT as f64;
        assert!((shaped_reroll_reward(&state) - expected).abs() < 1e-9);
        assert!(shaped_reroll_reward(&state) > 0.0); // Chance always pays
    }

    #[test]
    fn test_training_smoke() {
        let config = QConfig::default().with_epochs(3).with_seed(42);
        let mut learner = QLearner::new(config).unwrap();

        let stats = learner.train();
        assert_eq!(stats.episodes, 3);
        assert_eq!(stats.scores.len(), 3);
        // 13 categories with multi-Yahtzee bonuses tops out well below this
        assert!(stats.scores.iter().all(|&s| s < 2_000));

        // Greedy play over the same tables also runs to completion
        let scores = learner.evaluate(2);
        assert_eq!(scores.len(), 2);
    }
}
