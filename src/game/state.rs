//! Game state machine.
//!
//! `GameState` holds the dice, the reroll budget, the acting player, and
//! one scorecard per player. Transitions return fresh states; an input
//! state is never mutated, so callers may keep pre-transition states
//! around (the trainer reads them when bootstrapping).

use std::fmt;

use arrayvec::ArrayVec;
use rand::Rng;

use crate::game::reroll::RerollChoice;
use crate::game::scoring::{score_roll, Category, CATEGORY_COUNT, UPPER_CATEGORY_COUNT};

/// Number of dice in play.
pub const DICE_COUNT: usize = 5;

/// Reroll budget at the start of a turn.
///
/// The first reroll of a turn is mandatory, so a fresh turn starts at 3
/// and every decision point sees 0..=2 rerolls remaining.
pub const REROLLS_PER_TURN: u8 = 3;

/// Upper-section sum required for the 35-point bonus.
pub const UPPER_BONUS_THRESHOLD: u16 = 63;

/// Bonus awarded once the upper section reaches the threshold.
pub const UPPER_BONUS: u32 = 35;

/// Bonus for a Yahtzee rolled after the Yahtzee category already scored.
pub const MULTI_YAHTZEE_BONUS: u16 = 100;

/// Errors from illegal game transitions.
///
/// A failed transition leaves the input state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Reroll attempted with no rerolls left this turn.
    InvalidReroll {
        /// Rerolls remaining when the attempt was made.
        rerolls: u8,
    },
    /// Category selection that violates the write rules.
    InvalidCategory {
        /// The rejected category.
        category: Category,
        /// The player the write was attempted for.
        player: usize,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidReroll { rerolls } => {
                write!(f, "Invalid reroll: {} rerolls remaining", rerolls)
            }
            GameError::InvalidCategory { category, player } => {
                write!(f, "Invalid category {} for player {}", category, player)
            }
        }
    }
}

impl std::error::Error for GameError {}

/// One player's 13 category slots.
///
/// Each slot is written at most once per game; the upper bonus is derived
/// at total-score time and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scorecard {
    scores: [Option<u16>; CATEGORY_COUNT],
}

impl Scorecard {
    /// A fresh scorecard with every category unset.
    pub fn new() -> Scorecard {
        Scorecard::default()
    }

    /// Stored score for a category, `None` if unset.
    pub fn get(&self, category: Category) -> Option<u16> {
        self.scores[category.index()]
    }

    /// Whether a category has been written.
    pub fn is_set(&self, category: Category) -> bool {
        self.scores[category.index()].is_some()
    }

    /// Whether all 13 categories have been written.
    pub fn is_complete(&self) -> bool {
        self.scores.iter().all(Option::is_some)
    }

    /// 13-bit mask with bit `c` set iff category `c` is filled.
    pub fn completion_mask(&self) -> u16 {
        self.scores
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }

    /// Sum of the filled upper-section categories.
    pub fn upper_sum(&self) -> u16 {
        self.scores[..UPPER_CATEGORY_COUNT]
            .iter()
            .flatten()
            .sum()
    }

    /// Total score: all stored values plus the upper bonus if earned.
    pub fn total_score(&self) -> u32 {
        let sum: u32 = self.scores.iter().flatten().map(|&s| u32::from(s)).sum();
        let bonus = if self.upper_sum() >= UPPER_BONUS_THRESHOLD {
            UPPER_BONUS
        } else {
            0
        };
        sum + bonus
    }

    fn set(&mut self, category: Category, score: u16) {
        debug_assert!(
            self.scores[category.index()].is_none(),
            "category {} written twice",
            category
        );
        self.scores[category.index()] = Some(score);
    }
}

/// Complete state of a game in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    dice: [u8; DICE_COUNT],
    rerolls: u8,
    current_player: usize,
    scorecards: Vec<Scorecard>,
    // Latched on the category write that completes the last scorecard;
    // terminal can never revert, so is_final() never rescans.
    finished: bool,
}

impl GameState {
    /// Start a fresh game: all categories unset, full reroll budget,
    /// dice randomly rolled.
    ///
    /// # Panics
    /// Panics if `player_count` is zero.
    pub fn new<R: Rng + ?Sized>(player_count: usize, rng: &mut R) -> GameState {
        assert!(player_count > 0, "at least one player required");
        let mut dice = [0u8; DICE_COUNT];
        for die in &mut dice {
            *die = rng.gen_range(1..=6);
        }
        GameState {
            dice,
            rerolls: REROLLS_PER_TURN,
            current_player: 0,
            scorecards: vec![Scorecard::new(); player_count],
            finished: false,
        }
    }

    /// Current dice, in display order.
    pub fn dice(&self) -> &[u8; DICE_COUNT] {
        &self.dice
    }

    /// Rerolls remaining this turn.
    pub fn rerolls(&self) -> u8 {
        self.rerolls
    }

    /// Whether the turn's mandatory first roll is still pending.
    pub fn forced_roll_pending(&self) -> bool {
        self.rerolls == REROLLS_PER_TURN
    }

    /// Index of the acting player.
    pub fn current_player(&self) -> usize {
        self.current_player
    }

    /// Number of players.
    pub fn player_count(&self) -> usize {
        self.scorecards.len()
    }

    /// A player's scorecard.
    pub fn scorecard(&self, player: usize) -> &Scorecard {
        &self.scorecards[player]
    }

    /// True once every player's scorecard has all 13 categories set.
    pub fn is_final(&self) -> bool {
        self.finished
    }

    /// A player's total score including the upper bonus.
    pub fn total_score(&self, player: usize) -> u32 {
        self.scorecards[player].total_score()
    }

    /// Redraw the chosen die positions.
    ///
    /// Legal while `rerolls() > 0`; the catalog guarantees the choice
    /// names at least one in-range position. Consumes one reroll, leaves
    /// the acting player and all scorecards unchanged.
    pub fn apply_reroll<R: Rng + ?Sized>(
        &self,
        choice: RerollChoice,
        rng: &mut R,
    ) -> Result<GameState, GameError> {
        if self.rerolls == 0 {
            return Err(GameError::InvalidReroll { rerolls: 0 });
        }

        let mut new_state = self.clone();
        for &position in choice.positions() {
            new_state.dice[position] = rng.gen_range(1..=6);
        }
        new_state.rerolls -= 1;
        Ok(new_state)
    }

    /// Whether the acting player may claim `category` for the current dice.
    ///
    /// A category is selectable when it is unset and its predicted score
    /// is non-zero, or when every still-unset category predicts zero (a
    /// forced zero write).
    pub fn can_select(&self, category: Category, player: usize) -> bool {
        if player != self.current_player {
            return false;
        }
        let card = &self.scorecards[player];
        if card.is_set(category) {
            return false;
        }

        let predicted = score_roll(&self.dice);
        let zero_forced = self.zero_forced(card, &predicted);
        (predicted[category.index()] == 0) == zero_forced
    }

    /// All categories the acting player may claim right now.
    pub fn legal_categories(&self) -> ArrayVec<Category, CATEGORY_COUNT> {
        let card = &self.scorecards[self.current_player];
        let predicted = score_roll(&self.dice);
        let zero_forced = self.zero_forced(card, &predicted);

        Category::ALL
            .iter()
            .copied()
            .filter(|c| {
                !card.is_set(*c) && (predicted[c.index()] == 0) == zero_forced
            })
            .collect()
    }

    // True when every still-unset category predicts zero, i.e. the player
    // has no scoring option and must burn a category.
    fn zero_forced(&self, card: &Scorecard, predicted: &[u16; CATEGORY_COUNT]) -> bool {
        Category::ALL
            .iter()
            .filter(|c| !card.is_set(**c))
            .all(|c| predicted[c.index()] == 0)
    }

    /// Claim a category for the acting player.
    ///
    /// See [`GameState::apply_category_scored`] for the credited points.
    pub fn apply_category(&self, category: Category) -> Result<GameState, GameError> {
        self.apply_category_scored(category).map(|(state, _)| state)
    }

    /// Claim a category on behalf of `player`.
    ///
    /// Rejected with `InvalidCategory` when `player` is not the acting
    /// player.
    pub fn apply_category_as(
        &self,
        category: Category,
        player: usize,
    ) -> Result<GameState, GameError> {
        if player != self.current_player {
            return Err(GameError::InvalidCategory { category, player });
        }
        self.apply_category(category)
    }

    /// Claim a category and report the points credited by the write.
    ///
    /// The credited points are the predicted score written into the slot
    /// plus the multi-Yahtzee bonus when five equal dice land after the
    /// Yahtzee category already scored positive (the bonus is added to
    /// the stored Yahtzee value, not the claimed slot). Afterwards the
    /// turn passes: next player, reroll budget back to 3, dice untouched
    /// until the next turn's mandatory roll.
    pub fn apply_category_scored(
        &self,
        category: Category,
    ) -> Result<(GameState, u32), GameError> {
        let player = self.current_player;
        if !self.can_select(category, player) {
            return Err(GameError::InvalidCategory { category, player });
        }

        let mut new_state = self.clone();
        let card = &mut new_state.scorecards[player];

        let mut credited = 0u32;

        // Multi-Yahtzee: five equal dice with a positive Yahtzee already
        // on the card earn +100 onto the stored Yahtzee value.
        let five_equal = self.dice.iter().all(|&d| d == self.dice[0]);
        if five_equal {
            if let Some(stored) = card.scores[Category::Yahtzee.index()] {
                if stored > 0 {
                    card.scores[Category::Yahtzee.index()] =
                        Some(stored + MULTI_YAHTZEE_BONUS);
                    credited += u32::from(MULTI_YAHTZEE_BONUS);
                }
            }
        }

        let predicted = score_roll(&new_state.dice);
        card.set(category, predicted[category.index()]);
        credited += u32::from(predicted[category.index()]);

        if new_state.scorecards[player].is_complete()
            && new_state.scorecards.iter().all(Scorecard::is_complete)
        {
            new_state.finished = true;
        }

        new_state.current_player = (player + 1) % new_state.scorecards.len();
        new_state.rerolls = REROLLS_PER_TURN;

        Ok((new_state, credited))
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dice {:?} | rerolls {} | player {}/{}",
            self.dice,
            self.rerolls,
            self.current_player,
            self.scorecards.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn state_with_dice(dice: [u8; 5]) -> GameState {
        let mut state = GameState::new(1, &mut rng());
        state.dice = dice;
        state.rerolls = 2; // past the forced roll
        state
    }

    fn card_with(values: [Option<u16>; CATEGORY_COUNT]) -> Scorecard {
        Scorecard { scores: values }
    }

    #[test]
    fn test_fresh_state() {
        let state = GameState::new(2, &mut rng());
        assert_eq!(state.player_count(), 2);
        assert_eq!(state.rerolls(), REROLLS_PER_TURN);
        assert!(state.forced_roll_pending());
        assert!(!state.is_final());
        assert!(state.dice().iter().all(|&d| (1..=6).contains(&d)));
    }

    #[test]
    fn test_reroll_budget_exhausts() {
        let mut r = rng();
        let state = GameState::new(1, &mut r);
        let choice = RerollChoice::new(12).unwrap();

        // Three rerolls succeed on a fresh turn regardless of the subset
        let s1 = state.apply_reroll(choice, &mut r).unwrap();
        let s2 = s1.apply_reroll(RerollChoice::full(), &mut r).unwrap();
        let s3 = s2.apply_reroll(choice, &mut r).unwrap();
        assert_eq!(s3.rerolls(), 0);

        // The fourth always fails, and the input state is untouched
        let before = s3.clone();
        assert_eq!(
            s3.apply_reroll(choice, &mut r),
            Err(GameError::InvalidReroll { rerolls: 0 })
        );
        assert_eq!(s3, before);
    }

    #[test]
    fn test_reroll_is_copy_on_write() {
        let mut r = rng();
        let state = state_with_dice([1, 2, 3, 4, 5]);
        let rerolled = state
            .apply_reroll(RerollChoice::full(), &mut r)
            .unwrap();
        // The pre-transition state still holds its old dice and budget
        assert_eq!(state.dice(), &[1, 2, 3, 4, 5]);
        assert_eq!(state.rerolls(), 2);
        assert_eq!(rerolled.rerolls(), 1);
    }

    #[test]
    fn test_reroll_touches_only_chosen_positions() {
        let mut r = rng();
        let state = state_with_dice([1, 2, 3, 4, 5]);
        let rerolled = state
            .apply_reroll(RerollChoice::new(0).unwrap(), &mut r)
            .unwrap();
        assert_eq!(&rerolled.dice()[1..], &[2, 3, 4, 5]);
    }

    #[test]
    fn test_category_write_advances_turn() {
        let mut state = GameState::new(2, &mut rng());
        state.dice = [2, 2, 3, 3, 3];
        state.rerolls = 1;

        let (next, credited) = state.apply_category_scored(Category::FullHouse).unwrap();
        assert_eq!(credited, 25);
        assert_eq!(next.scorecard(0).get(Category::FullHouse), Some(25));
        assert_eq!(next.current_player(), 1);
        assert_eq!(next.rerolls(), REROLLS_PER_TURN);
        // Dice are untouched until the next turn's mandatory roll
        assert_eq!(next.dice(), state.dice());
    }

    #[test]
    fn test_double_write_rejected() {
        let state = state_with_dice([2, 2, 3, 3, 3]);
        let next = state.apply_category(Category::FullHouse).unwrap();
        assert_eq!(
            next.apply_category(Category::FullHouse),
            Err(GameError::InvalidCategory {
                category: Category::FullHouse,
                player: 0,
            })
        );
    }

    #[test]
    fn test_zero_write_rejected_while_scoring_option_exists() {
        let state = state_with_dice([2, 2, 3, 3, 3]);
        // FourOfAKind predicts 0 here, but FullHouse scores, so the zero
        // write is not allowed
        assert!(!state.can_select(Category::FourOfAKind, 0));
        assert!(state
            .apply_category(Category::FourOfAKind)
            .is_err());
        assert!(state.can_select(Category::FullHouse, 0));
    }

    #[test]
    fn test_forced_zero_write_when_nothing_scores() {
        // Everything except Yahtzee is filled; [1,2,2,4,6] predicts 0 for it
        let mut values = [Some(1u16); CATEGORY_COUNT];
        values[Category::Yahtzee.index()] = None;
        let mut state = state_with_dice([1, 2, 2, 4, 6]);
        state.scorecards[0] = card_with(values);

        assert!(state.can_select(Category::Yahtzee, 0));
        let legal = state.legal_categories();
        assert_eq!(legal.as_slice(), &[Category::Yahtzee]);

        let (next, credited) = state.apply_category_scored(Category::Yahtzee).unwrap();
        assert_eq!(credited, 0);
        assert_eq!(next.scorecard(0).get(Category::Yahtzee), Some(0));
    }

    #[test]
    fn test_wrong_player_rejected() {
        let mut state = GameState::new(2, &mut rng());
        state.dice = [2, 2, 3, 3, 3];
        state.rerolls = 1;
        assert_eq!(
            state.apply_category_as(Category::FullHouse, 1),
            Err(GameError::InvalidCategory {
                category: Category::FullHouse,
                player: 1,
            })
        );
    }

    #[test]
    fn test_multi_yahtzee_bonus() {
        let mut values = [None; CATEGORY_COUNT];
        values[Category::Yahtzee.index()] = Some(50);
        let mut state = state_with_dice([4, 4, 4, 4, 4]);
        state.scorecards[0] = card_with(values);

        let (next, credited) = state.apply_category_scored(Category::Fours).unwrap();
        // 20 for the fours plus 100 onto the stored Yahtzee
        assert_eq!(credited, 120);
        assert_eq!(next.scorecard(0).get(Category::Fours), Some(20));
        assert_eq!(next.scorecard(0).get(Category::Yahtzee), Some(150));
    }

    #[test]
    fn test_no_bonus_on_zero_yahtzee() {
        let mut values = [None; CATEGORY_COUNT];
        values[Category::Yahtzee.index()] = Some(0);
        let mut state = state_with_dice([4, 4, 4, 4, 4]);
        state.scorecards[0] = card_with(values);

        let (next, credited) = state.apply_category_scored(Category::Fours).unwrap();
        assert_eq!(credited, 20);
        assert_eq!(next.scorecard(0).get(Category::Yahtzee), Some(0));
    }

    #[test]
    fn test_upper_bonus_boundary() {
        // Upper section summing exactly 63 earns the 35-point bonus
        let mut values = [Some(0u16); CATEGORY_COUNT];
        values[..6].copy_from_slice(&[
            Some(3),
            Some(12),
            Some(12),
            Some(12),
            Some(12),
            Some(12),
        ]);
        let card = card_with(values);
        assert_eq!(card.upper_sum(), 63);
        assert_eq!(card.total_score(), 63 + 35);

        // One point short earns nothing extra
        let mut values = [Some(0u16); CATEGORY_COUNT];
        values[..6].copy_from_slice(&[
            Some(2),
            Some(12),
            Some(12),
            Some(12),
            Some(12),
            Some(12),
        ]);
        let card = card_with(values);
        assert_eq!(card.upper_sum(), 62);
        assert_eq!(card.total_score(), 62);
    }

    #[test]
    fn test_completion_mask() {
        let mut values = [None; CATEGORY_COUNT];
        values[Category::Ones.index()] = Some(3);
        values[Category::Yahtzee.index()] = Some(50);
        let card = card_with(values);
        assert_eq!(card.completion_mask(), (1 << 0) | (1 << 12));
        assert!(!card.is_complete());
        assert_eq!(Scorecard::new().completion_mask(), 0);
    }

    #[test]
    fn test_terminal_latches() {
        // 12 categories filled; the last write flips the game final
        let mut values = [Some(1u16); CATEGORY_COUNT];
        values[Category::Chance.index()] = None;
        let mut state = state_with_dice([1, 2, 2, 4, 6]);
        state.scorecards[0] = card_with(values);
        assert!(!state.is_final());

        let next = state.apply_category(Category::Chance).unwrap();
        assert!(next.is_final());
        assert!(next.scorecard(0).is_complete());
        // Queries on a terminal state keep it terminal
        assert!(next.clone().is_final());
    }
}
