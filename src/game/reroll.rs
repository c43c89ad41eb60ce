//! Reroll catalog.
//!
//! A fixed table of the 31 non-empty subsets of the 5 die positions,
//! ordered by subset size then lexicographically. The table bounds the
//! reroll branching factor to 31 regardless of which dice a policy wants
//! to keep, and its indices are stable: they double as Q-table columns.

use std::fmt;

/// Number of distinct reroll choices (non-empty subsets of 5 positions).
pub const REROLL_CHOICE_COUNT: usize = 31;

/// Index of the choice that redraws all five dice.
///
/// Used for the mandatory first roll of every turn.
pub const FULL_REROLL: usize = 30;

/// Die positions redrawn by each choice, ordered by subset size then
/// lexicographically.
pub const REROLL_CHOICES: [&[usize]; REROLL_CHOICE_COUNT] = [
    &[0],
    &[1],
    &[2],
    &[3],
    &[4],
    &[0, 1],
    &[0, 2],
    &[0, 3],
    &[0, 4],
    &[1, 2],
    &[1, 3],
    &[1, 4],
    &[2, 3],
    &[2, 4],
    &[3, 4],
    &[0, 1, 2],
    &[0, 1, 3],
    &[0, 1, 4],
    &[0, 2, 3],
    &[0, 2, 4],
    &[0, 3, 4],
    &[1, 2, 3],
    &[1, 2, 4],
    &[1, 3, 4],
    &[2, 3, 4],
    &[0, 1, 2, 3],
    &[0, 1, 2, 4],
    &[0, 1, 3, 4],
    &[0, 2, 3, 4],
    &[1, 2, 3, 4],
    &[0, 1, 2, 3, 4],
];

/// A choice of die positions to redraw, identified by its catalog index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RerollChoice(usize);

impl RerollChoice {
    /// Choice for a catalog index.
    ///
    /// Returns `None` if `index` is not in 0..31.
    pub fn new(index: usize) -> Option<RerollChoice> {
        (index < REROLL_CHOICE_COUNT).then_some(RerollChoice(index))
    }

    /// The choice that redraws all five dice.
    pub fn full() -> RerollChoice {
        RerollChoice(FULL_REROLL)
    }

    /// Catalog index of this choice, 0..31.
    pub fn index(self) -> usize {
        self.0
    }

    /// Die positions this choice redraws.
    pub fn positions(self) -> &'static [usize] {
        REROLL_CHOICES[self.0]
    }
}

impl fmt::Display for RerollChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reroll{:?}", self.positions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_is_every_nonempty_subset() {
        let mut seen = HashSet::new();
        for positions in REROLL_CHOICES {
            assert!(!positions.is_empty());
            let mask: u32 = positions.iter().map(|&p| 1 << p).sum();
            assert!(positions.iter().all(|&p| p < 5));
            assert!(seen.insert(mask), "duplicate subset {:?}", positions);
        }
        assert_eq!(seen.len(), 31);
    }

    #[test]
    fn test_catalog_ordered_by_size_then_lex() {
        for window in REROLL_CHOICES.windows(2) {
            let (a, b) = (window[0], window[1]);
            assert!(
                a.len() < b.len() || (a.len() == b.len() && a < b),
                "{:?} before {:?}",
                a,
                b
            );
        }
    }

    #[test]
    fn test_full_reroll_index() {
        assert_eq!(RerollChoice::full().index(), FULL_REROLL);
        assert_eq!(RerollChoice::full().positions(), &[0, 1, 2, 3, 4]);
        assert_eq!(RerollChoice::new(31), None);
        assert_eq!(RerollChoice::new(0).unwrap().positions(), &[0]);
    }
}
