//! Statements held in the knowledge base.
//!
//! A statement asserts that exactly `count` of its `cells` are mines. Its
//! shape only changes through [`Statement::narrow_as_mine`] and
//! [`Statement::narrow_as_safe`], so it stays true as long as the facts
//! fed to those two operations are true.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::{Error, Result};

/// "Exactly `count` of these cells are mines."
///
/// Cells are kept sorted, so equality and hashing operate on the normalized
/// `(sorted cells, count)` form and are independent of insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    cells: BTreeSet<Cell>,
    count: usize,
}

impl Statement {
    /// Creates a new `Statement`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Contradiction` if `count` exceeds the number of cells,
    /// which includes an empty cell set with a nonzero count.
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> Result<Self> {
        let statement = Self {
            cells: cells.into_iter().collect(),
            count,
        };
        if statement.is_contradiction() {
            return Err(Error::Contradiction(format!(
                "statement {} claims more mines than cells",
                statement
            )));
        }
        Ok(statement)
    }

    /// The cells this statement is about.
    pub fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    /// The number of mines among `cells`.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of cells still in the statement.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if no cells remain.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns `true` if `cell` is one of the statement's cells.
    pub fn contains(&self, cell: &Cell) -> bool {
        self.cells.contains(cell)
    }

    /// Returns `true` for the trivial `{} = 0` statement.
    pub fn is_resolved(&self) -> bool {
        self.cells.is_empty() && self.count == 0
    }

    /// Returns `true` if no assignment of mines can satisfy this statement.
    pub fn is_contradiction(&self) -> bool {
        self.count > self.cells.len()
    }

    /// Every cell is a mine when the cell count equals a nonzero mine count.
    pub fn known_mines(&self) -> BTreeSet<Cell> {
        if self.count > 0 && self.cells.len() == self.count {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Every cell is safe when the mine count is zero.
    pub fn known_safe(&self) -> BTreeSet<Cell> {
        if self.count == 0 && !self.cells.is_empty() {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Removes a cell known to be a mine, decrementing the count.
    ///
    /// Returns whether the statement changed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Contradiction` if the cell is present but the count is
    /// already zero. The statement is left untouched in that case.
    pub fn narrow_as_mine(&mut self, cell: Cell) -> Result<bool> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        if self.count == 0 {
            return Err(Error::Contradiction(format!(
                "{} is a mine but statement {} allows none",
                cell, self
            )));
        }
        self.cells.remove(&cell);
        self.count -= 1;
        Ok(true)
    }

    /// Removes a cell known to be safe. The count is unchanged.
    ///
    /// Returns whether the statement changed.
    pub fn narrow_as_safe(&mut self, cell: Cell) -> bool {
        self.cells.remove(&cell)
    }

    /// Applies the subset-difference rule with `self` as the superset.
    ///
    /// If `subset.cells` is a strict subset of `self.cells`, returns the
    /// statement `self.cells - subset.cells = self.count - subset.count`.
    /// Returns `None` when the rule does not apply, including when both
    /// statements have the same cells.
    ///
    /// # Errors
    ///
    /// Returns `Error::Contradiction` if the two statements cannot both hold.
    pub fn difference(&self, subset: &Statement) -> Result<Option<Statement>> {
        if subset.cells.len() >= self.cells.len() || !subset.cells.is_subset(&self.cells) {
            return Ok(None);
        }
        let count = self.count.checked_sub(subset.count).ok_or_else(|| {
            Error::Contradiction(format!(
                "statement {} holds fewer mines than its subset {}",
                self, subset
            ))
        })?;
        let cells = self.cells.difference(&subset.cells).copied();
        Statement::new(cells, count).map(Some)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", cell)?;
        }
        write!(f, "}} = {}", self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(coords: &[(usize, usize)]) -> Vec<Cell> {
        coords.iter().copied().map(Cell::from).collect()
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = Statement::new(cells(&[(0, 0), (0, 1)]), 1).unwrap();
        let b = Statement::new(cells(&[(0, 1), (0, 0)]), 1).unwrap();
        let c = Statement::new(cells(&[(0, 1), (0, 0)]), 2).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_new_rejects_overfull_count() {
        assert!(matches!(
            Statement::new(cells(&[(0, 0)]), 2),
            Err(Error::Contradiction(_))
        ));
        assert!(Statement::new(Vec::new(), 1).is_err());
        assert!(Statement::new(Vec::new(), 0).unwrap().is_resolved());
    }

    #[test]
    fn test_known_mines_when_count_matches_cells() {
        let s = Statement::new(cells(&[(0, 0), (0, 1)]), 2).unwrap();
        assert_eq!(s.known_mines().len(), 2);
        assert!(s.known_safe().is_empty());

        let s = Statement::new(cells(&[(0, 0), (0, 1)]), 1).unwrap();
        assert!(s.known_mines().is_empty());
        assert!(s.known_safe().is_empty());
    }

    #[test]
    fn test_known_safe_when_count_is_zero() {
        let s = Statement::new(cells(&[(0, 0), (0, 1), (1, 1)]), 0).unwrap();
        assert_eq!(s.known_safe().len(), 3);
        assert!(s.known_mines().is_empty());
    }

    #[test]
    fn test_resolved_statement_knows_nothing() {
        let s = Statement::new(Vec::new(), 0).unwrap();
        assert!(s.known_mines().is_empty());
        assert!(s.known_safe().is_empty());
    }

    #[test]
    fn test_narrow_as_mine() {
        let mut s = Statement::new(cells(&[(0, 0), (0, 1), (0, 2)]), 2).unwrap();
        assert!(s.narrow_as_mine(Cell::new(0, 1)).unwrap());
        assert_eq!(s, Statement::new(cells(&[(0, 0), (0, 2)]), 1).unwrap());

        // Absent cells are a no-op.
        assert!(!s.narrow_as_mine(Cell::new(5, 5)).unwrap());
        assert_eq!(s.count(), 1);
    }

    #[test]
    fn test_narrow_as_mine_never_goes_negative() {
        let mut s = Statement::new(cells(&[(0, 0), (0, 1)]), 0).unwrap();
        assert!(matches!(
            s.narrow_as_mine(Cell::new(0, 0)),
            Err(Error::Contradiction(_))
        ));
        assert_eq!(s.len(), 2);
        assert_eq!(s.count(), 0);
    }

    #[test]
    fn test_narrow_as_safe_keeps_count() {
        let mut s = Statement::new(cells(&[(0, 0), (0, 1), (0, 2)]), 1).unwrap();
        assert!(s.narrow_as_safe(Cell::new(0, 0)));
        assert_eq!(s, Statement::new(cells(&[(0, 1), (0, 2)]), 1).unwrap());
        assert!(!s.narrow_as_safe(Cell::new(0, 0)));
    }

    #[test]
    fn test_narrow_as_safe_can_expose_contradiction() {
        let mut s = Statement::new(cells(&[(0, 0)]), 1).unwrap();
        s.narrow_as_safe(Cell::new(0, 0));
        assert!(s.is_empty());
        assert!(s.is_contradiction());
        assert!(!s.is_resolved());
    }

    #[test]
    fn test_difference_of_strict_subset() {
        let a = Statement::new(cells(&[(0, 0), (0, 1), (0, 2)]), 2).unwrap();
        let b = Statement::new(cells(&[(0, 0), (0, 1)]), 1).unwrap();
        let d = a.difference(&b).unwrap().unwrap();
        assert_eq!(d, Statement::new(cells(&[(0, 2)]), 1).unwrap());
        assert_eq!(d.known_mines().len(), 1);

        // The rule only applies with the superset on the left.
        assert!(b.difference(&a).unwrap().is_none());
    }

    #[test]
    fn test_difference_never_derives_from_itself() {
        let a = Statement::new(cells(&[(0, 0), (0, 1)]), 1).unwrap();
        assert!(a.difference(&a).unwrap().is_none());

        let same_cells = Statement::new(cells(&[(0, 0), (0, 1)]), 2).unwrap();
        assert!(a.difference(&same_cells).unwrap().is_none());
    }

    #[test]
    fn test_difference_ignores_overlapping_sets() {
        let a = Statement::new(cells(&[(0, 0), (0, 1)]), 1).unwrap();
        let b = Statement::new(cells(&[(0, 1), (0, 2)]), 1).unwrap();
        assert!(a.difference(&b).unwrap().is_none());
    }

    #[test]
    fn test_difference_detects_negative_count() {
        let a = Statement::new(cells(&[(0, 0), (0, 1), (0, 2)]), 0).unwrap();
        let b = Statement::new(cells(&[(0, 0), (0, 1)]), 1).unwrap();
        assert!(matches!(a.difference(&b), Err(Error::Contradiction(_))));
    }

    #[test]
    fn test_difference_detects_overfull_remainder() {
        let a = Statement::new(cells(&[(0, 0), (0, 1), (0, 2)]), 3).unwrap();
        let b = Statement::new(cells(&[(0, 0), (0, 1)]), 0).unwrap();
        assert!(matches!(a.difference(&b), Err(Error::Contradiction(_))));
    }

    #[test]
    fn test_display() {
        let s = Statement::new(cells(&[(1, 0), (0, 1)]), 1).unwrap();
        assert_eq!(s.to_string(), "{(0, 1), (1, 0)} = 1");
        assert_eq!(Statement::new(Vec::new(), 0).unwrap().to_string(), "{} = 0");
    }
}
