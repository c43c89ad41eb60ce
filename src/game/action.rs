//! Tagged actions and legality filtering.
//!
//! Every decision in a turn is either a category claim or a reroll. The
//! two kinds share one dense id space so that a single Q-table row covers
//! a state's full action set: categories occupy ids 0..13, reroll choices
//! ids 13..44. Id 44 is reserved for a terminal marker and never selected
//! or updated.

use std::fmt;

use arrayvec::ArrayVec;

use crate::game::reroll::{RerollChoice, REROLL_CHOICE_COUNT};
use crate::game::scoring::{Category, CATEGORY_COUNT};
use crate::game::state::GameState;

/// Width of a Q-table row: 13 categories + 31 rerolls + 1 reserved slot.
pub const NUM_ACTIONS: usize = CATEGORY_COUNT + REROLL_CHOICE_COUNT + 1;

/// Upper bound on simultaneously legal actions (13 categories + 31 rerolls).
pub const MAX_LEGAL_ACTIONS: usize = CATEGORY_COUNT + REROLL_CHOICE_COUNT;

/// Fixed-capacity list of legal actions; never heap-allocates.
pub type LegalActions = ArrayVec<Action, MAX_LEGAL_ACTIONS>;

/// A single decision: claim a category or redraw some dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Claim the given category for the current dice.
    SelectCategory(Category),
    /// Redraw the die positions named by the choice.
    Reroll(RerollChoice),
}

impl Action {
    /// Dense id of this action, 0..44.
    pub fn id(self) -> usize {
        match self {
            Action::SelectCategory(category) => category.index(),
            Action::Reroll(choice) => CATEGORY_COUNT + choice.index(),
        }
    }

    /// Action for a dense id.
    ///
    /// Returns `None` for out-of-range ids, including the reserved
    /// terminal slot.
    pub fn from_id(id: usize) -> Option<Action> {
        if id < CATEGORY_COUNT {
            Category::from_index(id).map(Action::SelectCategory)
        } else {
            RerollChoice::new(id - CATEGORY_COUNT).map(Action::Reroll)
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SelectCategory(category) => write!(f, "select {}", category),
            Action::Reroll(choice) => write!(f, "{}", choice),
        }
    }
}

/// All actions legal for the acting player in `state`.
///
/// Every claimable category, plus all 31 reroll choices while the turn's
/// reroll budget lasts. Terminal states have no legal actions.
pub fn legal_actions(state: &GameState) -> LegalActions {
    let mut actions = LegalActions::new();
    if state.is_final() {
        return actions;
    }

    for category in state.legal_categories() {
        actions.push(Action::SelectCategory(category));
    }

    if state.rerolls() > 0 {
        for index in 0..REROLL_CHOICE_COUNT {
            actions.push(Action::Reroll(RerollChoice::new(index).unwrap()));
        }
    }

    actions
}
