//! The board side of the game: ground truth about where the mines are.
//!
//! The engine never sees an `Oracle` directly. The `play` driver asks it
//! whether a probed cell is a mine and how many mines surround it, then
//! feeds the answer to `InferenceEngine::observe`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, Grid};
use crate::error::{Error, Result};

/// Ground truth for one board.
pub trait Oracle {
    /// The board extent.
    fn grid(&self) -> Grid;

    /// Returns `true` if `cell` holds a mine.
    fn is_mine(&self, cell: Cell) -> bool;

    /// The number of mines among the 8-connected neighbors of `cell`,
    /// not counting `cell` itself.
    fn nearby_mines(&self, cell: Cell) -> usize;
}

/// A board with a fixed, caller-supplied set of mine positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineField {
    grid: Grid,
    mines: HashSet<Cell>,
}

impl MineField {
    /// Creates a `MineField` with mines at the given positions.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfBounds` if any mine lies outside `grid`.
    pub fn new(grid: Grid, mines: impl IntoIterator<Item = Cell>) -> Result<Self> {
        let mines: HashSet<Cell> = mines.into_iter().collect();
        for mine in &mines {
            grid.check(*mine)?;
        }
        Ok(Self { grid, mines })
    }

    /// Parses a board drawn as rows of text, `*` for a mine and `.` for an empty cell.
    ///
    /// ```
    /// use sweep_logic::{Cell, MineField, Oracle};
    ///
    /// let field = MineField::from_layout(&["..*", "...", "*.."]).unwrap();
    /// assert_eq!(field.mine_count(), 2);
    /// assert_eq!(field.nearby_mines(Cell::new(1, 1)), 2);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` for an empty layout, ragged rows, or
    /// characters other than `*` and `.`.
    pub fn from_layout<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|row| row.as_ref().chars().count()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(Error::InvalidConfig("layout has no cells".to_string()));
        }

        let mut mines = HashSet::new();
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            if line.chars().count() != width {
                return Err(Error::InvalidConfig(format!(
                    "layout row {} has {} cells, expected {}",
                    row,
                    line.chars().count(),
                    width
                )));
            }
            for (col, c) in line.chars().enumerate() {
                match c {
                    '*' => {
                        mines.insert(Cell::new(row, col));
                    }
                    '.' => {}
                    other => {
                        return Err(Error::InvalidConfig(format!(
                            "unexpected {:?} at {}",
                            other,
                            Cell::new(row, col)
                        )))
                    }
                }
            }
        }

        Ok(Self {
            grid: Grid::new(height, width),
            mines,
        })
    }

    /// The mine positions.
    pub fn mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    /// Number of mines on the field.
    pub fn mine_count(&self) -> usize {
        self.mines.len()
    }

    /// Returns `true` if `flagged` is exactly the set of mines.
    pub fn is_cleared(&self, flagged: &HashSet<Cell>) -> bool {
        *flagged == self.mines
    }
}

impl Oracle for MineField {
    fn grid(&self) -> Grid {
        self.grid
    }

    fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    fn nearby_mines(&self, cell: Cell) -> usize {
        self.grid
            .neighbors(cell)
            .filter(|neighbor| self.mines.contains(neighbor))
            .count()
    }
}
