//! Uniformly random baseline agent.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::agent::Agent;
use crate::game::reroll::{RerollChoice, REROLL_CHOICE_COUNT};
use crate::game::state::{GameError, GameState};

/// Plays uniformly at random; the comparison floor for learned policies.
///
/// Rerolls a random subset with probability 1/2 while the budget lasts
/// and claims a uniformly random legal category otherwise.
#[derive(Debug)]
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    /// Agent with an entropy-seeded generator.
    pub fn new() -> RandomAgent {
        RandomAgent {
            rng: StdRng::from_entropy(),
        }
    }

    /// Agent with a fixed seed for reproducible games.
    pub fn with_seed(seed: u64) -> RandomAgent {
        RandomAgent {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn wants_reroll(&mut self, state: &GameState) -> bool {
        state.forced_roll_pending() || (state.rerolls() > 0 && self.rng.gen::<f64>() < 0.5)
    }

    fn reroll(&mut self, state: &GameState) -> Result<GameState, GameError> {
        let choice = if state.forced_roll_pending() {
            RerollChoice::full()
        } else {
            let index = self.rng.gen_range(0..REROLL_CHOICE_COUNT);
            RerollChoice::new(index).expect("catalog index in range")
        };
        state.apply_reroll(choice, &mut self.rng)
    }

    fn pick_category(&mut self, state: &GameState) -> Result<GameState, GameError> {
        let legal = state.legal_categories();
        debug_assert!(!legal.is_empty(), "pick_category on a terminal state");
        let category = legal[self.rng.gen_range(0..legal.len())];
        state.apply_category(category)
    }
}
