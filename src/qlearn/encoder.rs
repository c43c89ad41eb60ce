//! State encoder.
//!
//! Canonicalizes a `GameState` into a dense table index. Three components
//! compose by mixed radix:
//!
//! 1. The dice as a sorted multiset — exactly 252 non-decreasing 5-tuples
//!    over 1..=6, each assigned a dense id at startup.
//! 2. The rerolls remaining at the decision point (0..=2; encoding always
//!    happens after the turn's mandatory first roll).
//! 3. The acting player's 13-bit scorecard-completion mask, which keeps
//!    states with identical dice but different prospects apart.
//!
//! The encoder only ever inspects the acting player's scorecard: it is the
//! acting player's decision being valued.

use rustc_hash::FxHashMap;

use crate::game::scoring::CATEGORY_COUNT;
use crate::game::state::{GameState, DICE_COUNT};

/// Number of distinct dice multisets (non-decreasing 5-tuples over 1..=6).
pub const DICE_MULTISETS: usize = 252;

/// Number of reroll values folded into an id (0, 1 or 2 rerolls left).
pub const ENCODED_REROLLS: usize = 3;

/// Number of scorecard-completion masks (2^13).
pub const COMPLETION_MASKS: usize = 1 << CATEGORY_COUNT;

/// Total number of encodable states: 252 × 3 × 8192.
pub const NUM_STATES: usize = DICE_MULTISETS * ENCODED_REROLLS * COMPLETION_MASKS;

/// Maps game states to dense ids in `[0, NUM_STATES)`.
#[derive(Debug, Clone)]
pub struct StateEncoder {
    // sorted 5-tuple -> dense multiset id
    dice_multiset_id: FxHashMap<[u8; DICE_COUNT], u16>,
}

impl Default for StateEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StateEncoder {
    /// Build the encoder, enumerating all 252 dice multisets once.
    pub fn new() -> StateEncoder {
        let mut dice_multiset_id =
            FxHashMap::with_capacity_and_hasher(DICE_MULTISETS, Default::default());
        let mut id = 0u16;
        for d1 in 1..=6u8 {
            for d2 in d1..=6 {
                for d3 in d2..=6 {
                    for d4 in d3..=6 {
                        for d5 in d4..=6 {
                            dice_multiset_id.insert([d1, d2, d3, d4, d5], id);
                            id += 1;
                        }
                    }
                }
            }
        }
        debug_assert_eq!(id as usize, DICE_MULTISETS);
        StateEncoder { dice_multiset_id }
    }

    /// Dense id of a dice multiset, 0..252. Input order is irrelevant.
    pub fn multiset_id(&self, dice: &[u8; DICE_COUNT]) -> usize {
        let mut sorted = *dice;
        sorted.sort_unstable();
        usize::from(self.dice_multiset_id[&sorted])
    }

    /// Dense id of a game state, `[0, NUM_STATES)`.
    ///
    /// Meant for decision points, where `rerolls` is 0..=2; a pre-roll
    /// query clamps into the same range rather than aliasing a different
    /// dice multiset.
    pub fn state_to_id(&self, state: &GameState) -> usize {
        let dice_id = self.multiset_id(state.dice());
        let rerolls = usize::from(state.rerolls()).min(ENCODED_REROLLS - 1);
        let mask = usize::from(
            state
                .scorecard(state.current_player())
                .completion_mask(),
        );

        let dice_reroll_id = rerolls + ENCODED_REROLLS * dice_id;
        dice_reroll_id + (ENCODED_REROLLS * DICE_MULTISETS) * mask
    }
}
