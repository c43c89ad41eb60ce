//! Greedy agent over a learned Q-table.

use std::path::Path;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::agent::Agent;
use crate::game::action::{legal_actions, Action};
use crate::game::reroll::RerollChoice;
use crate::game::scoring::Category;
use crate::game::state::{GameError, GameState};
use crate::qlearn::encoder::StateEncoder;
use crate::qlearn::storage::{CheckpointError, CheckpointMeta, QTables};

/// Plays greedily from a learned Q-table.
///
/// The tables are shared read-only (`Arc`), so any number of agents can
/// evaluate the same checkpoint concurrently.
///
/// # Decision-boundary contract
///
/// The best action for a decision is computed lazily on first query and
/// cached until `reroll` or `pick_category` consumes it. Callers must
/// consume each decision before querying for the next one; interleaving
/// queries for two decisions would replay a stale action against the
/// wrong state.
pub struct TrainedAgent {
    tables: Arc<QTables>,
    encoder: StateEncoder,
    rng: StdRng,
    // cache for the current decision, cleared when consumed
    next_action: Option<Action>,
}

impl TrainedAgent {
    /// Agent over shared tables, entropy-seeded dice.
    pub fn new(tables: Arc<QTables>) -> TrainedAgent {
        Self::with_rng(tables, StdRng::from_entropy())
    }

    /// Agent over shared tables with a fixed seed for reproducible games.
    pub fn with_seed(tables: Arc<QTables>, seed: u64) -> TrainedAgent {
        Self::with_rng(tables, StdRng::seed_from_u64(seed))
    }

    fn with_rng(tables: Arc<QTables>, rng: StdRng) -> TrainedAgent {
        TrainedAgent {
            tables,
            encoder: StateEncoder::new(),
            rng,
            next_action: None,
        }
    }

    /// Load tables from a checkpoint file and wrap them in an agent.
    pub fn from_checkpoint<P: AsRef<Path>>(
        path: P,
    ) -> Result<(TrainedAgent, CheckpointMeta), CheckpointError> {
        let (tables, meta) = QTables::load(path)?;
        Ok((Self::new(Arc::new(tables)), meta))
    }

    /// The learned tables this agent plays from.
    pub fn tables(&self) -> &Arc<QTables> {
        &self.tables
    }

    // Compute (or replay) the best action for the current decision.
    fn best_action(&mut self, state: &GameState) -> Action {
        if let Some(action) = self.next_action {
            return action;
        }

        let state_id = self.encoder.state_to_id(state);
        let actions = legal_actions(state);
        let action = self
            .tables
            .argmax_among(state_id, actions.iter().map(|a| a.id()))
            .and_then(Action::from_id)
            .expect("no legal action in non-terminal state");

        self.next_action = Some(action);
        action
    }

    // Best claimable category by learned value, ignoring reroll actions.
    fn best_category(&self, state: &GameState) -> Category {
        let state_id = self.encoder.state_to_id(state);
        let legal = state.legal_categories();
        self.tables
            .argmax_among(
                state_id,
                legal
                    .iter()
                    .map(|c| Action::SelectCategory(*c).id()),
            )
            .and_then(Category::from_index)
            .expect("a non-terminal state always has a claimable category")
    }
}

impl Agent for TrainedAgent {
    fn wants_reroll(&mut self, state: &GameState) -> bool {
        // The mandatory first roll needs no table lookup
        state.forced_roll_pending()
            || matches!(self.best_action(state), Action::Reroll(_))
    }

    fn reroll(&mut self, state: &GameState) -> Result<GameState, GameError> {
        let choice = if state.forced_roll_pending() {
            RerollChoice::full()
        } else {
            match self.best_action(state) {
                Action::Reroll(choice) => choice,
                // Contract misuse: the cached decision was a claim. The
                // reroll still has to name some subset; keep it total by
                // redrawing everything.
                Action::SelectCategory(_) => RerollChoice::full(),
            }
        };
        self.next_action = None;

        state.apply_reroll(choice, &mut self.rng)
    }

    fn pick_category(&mut self, state: &GameState) -> Result<GameState, GameError> {
        let action = self.best_action(state);
        self.next_action = None;

        let category = match action {
            Action::SelectCategory(category) => category,
            // Contract misuse: the advised reroll was skipped; claim the
            // best category available instead.
            Action::Reroll(_) => self.best_category(state),
        };

        state.apply_category(category)
    }
}
