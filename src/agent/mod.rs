//! Turn-taking agents.
//!
//! Every policy that can play a game — random baseline, greedy over a
//! learned table, or anything an external driver supplies — implements
//! the small [`Agent`] capability trait. Drivers (a rendering layer, the
//! evaluation binary, tests) own the `GameState` and ask the agent three
//! questions per turn; the agent owns no game logic.

pub mod random;
pub mod trained;

pub use random::RandomAgent;
pub use trained::TrainedAgent;

use crate::game::state::{GameError, GameState};

use rand::rngs::StdRng;
use rand::SeedableRng;

/// A turn-taking policy.
///
/// One logical decision per turn: keep rerolling or claim a category.
/// `wants_reroll` is always true while the turn's mandatory first roll is
/// pending. Implementations may cache work between the query and the
/// transition that consumes it, so callers must consume each decision
/// (via `reroll` or `pick_category`) before querying for the next one.
pub trait Agent {
    /// Whether the agent wants to redraw dice rather than claim now.
    fn wants_reroll(&mut self, state: &GameState) -> bool;

    /// Apply the agent's chosen reroll (the full roll when the turn's
    /// mandatory first roll is pending).
    fn reroll(&mut self, state: &GameState) -> Result<GameState, GameError>;

    /// Apply the agent's chosen category claim.
    fn pick_category(&mut self, state: &GameState) -> Result<GameState, GameError>;
}

/// Drive one complete game with a single agent filling every seat.
///
/// The seed fixes the initial roll; the agent's own randomness governs
/// everything after.
pub fn run_game(agent: &mut dyn Agent, players: usize, seed: u64) -> Result<GameState, GameError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = GameState::new(players, &mut rng);

    while !state.is_final() {
        while agent.wants_reroll(&state) {
            state = agent.reroll(&state)?;
        }
        state = agent.pick_category(&state)?;
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::scoring::CATEGORY_COUNT;

    #[test]
    fn test_random_agent_completes_a_game() {
        let mut agent = RandomAgent::with_seed(99);
        let final_state = run_game(&mut agent, 2, 7).unwrap();

        assert!(final_state.is_final());
        for player in 0..2 {
            assert!(final_state.scorecard(player).is_complete());
            assert_eq!(
                final_state.scorecard(player).completion_mask(),
                (1 << CATEGORY_COUNT) - 1
            );
        }
    }

    #[test]
    fn test_random_agent_is_seed_reproducible() {
        let a = run_game(&mut RandomAgent::with_seed(4), 1, 11).unwrap();
        let b = run_game(&mut RandomAgent::with_seed(4), 1, 11).unwrap();
        assert_eq!(a.total_score(0), b.total_score(0));
        assert_eq!(a.scorecard(0), b.scorecard(0));
    }
}
