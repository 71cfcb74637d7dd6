//! Grid coordinates and board geometry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A `(row, column)` coordinate on the board.
///
/// Cells order row-major, so a sorted collection of cells reads top-left to bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    /// Creates a new `Cell` at the given row and column.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The fixed `height x width` extent of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    pub height: usize,
    pub width: usize,
}

impl Grid {
    /// Creates a new `Grid` with the given dimensions.
    pub const fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Returns `true` if `cell` lies within `[0, height) x [0, width)`.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    /// Rejects cells outside the grid instead of clipping them.
    pub fn check(&self, cell: Cell) -> Result<()> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                cell,
                height: self.height,
                width: self.width,
            })
        }
    }

    /// Total number of cells on the board.
    pub fn len(&self) -> usize {
        self.height * self.width
    }

    /// Returns `true` if the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(self) -> impl Iterator<Item = Cell> {
        (0..self.height).flat_map(move |row| (0..self.width).map(move |col| Cell::new(row, col)))
    }

    /// Iterates over the 8-connected neighborhood of `cell`, clipped to the grid,
    /// excluding `cell` itself.
    pub fn neighbors(self, cell: Cell) -> impl Iterator<Item = Cell> {
        let rows = cell.row.saturating_sub(1)..=(cell.row + 1).min(self.height.saturating_sub(1));
        rows.flat_map(move |row| {
            let cols = cell.col.saturating_sub(1)..=(cell.col + 1).min(self.width.saturating_sub(1));
            cols.map(move |col| Cell::new(row, col))
        })
        .filter(move |neighbor| *neighbor != cell && self.contains(*neighbor))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_ordering_is_row_major() {
        let mut cells = vec![Cell::new(1, 0), Cell::new(0, 2), Cell::new(0, 1)];
        cells.sort();
        assert_eq!(cells, vec![Cell::new(0, 1), Cell::new(0, 2), Cell::new(1, 0)]);
    }

    #[test]
    fn test_center_has_eight_neighbors() {
        let grid = Grid::new(3, 3);
        let neighbors: Vec<_> = grid.neighbors(Cell::new(1, 1)).collect();
        assert_eq!(neighbors.len(), 8);
        assert!(!neighbors.contains(&Cell::new(1, 1)));
    }

    #[test]
    fn test_corner_neighbors_are_clipped() {
        let grid = Grid::new(3, 3);
        let neighbors: Vec<_> = grid.neighbors(Cell::new(0, 0)).collect();
        assert_eq!(
            neighbors,
            vec![Cell::new(0, 1), Cell::new(1, 0), Cell::new(1, 1)]
        );

        let neighbors: Vec<_> = grid.neighbors(Cell::new(2, 2)).collect();
        assert_eq!(
            neighbors,
            vec![Cell::new(1, 1), Cell::new(1, 2), Cell::new(2, 1)]
        );
    }

    #[test]
    fn test_single_row_grid() {
        let grid = Grid::new(1, 3);
        let neighbors: Vec<_> = grid.neighbors(Cell::new(0, 1)).collect();
        assert_eq!(neighbors, vec![Cell::new(0, 0), Cell::new(0, 2)]);
        assert_eq!(grid.neighbors(Cell::new(0, 0)).count(), 1);
    }

    #[test]
    fn test_single_cell_grid_has_no_neighbors() {
        let grid = Grid::new(1, 1);
        assert_eq!(grid.neighbors(Cell::new(0, 0)).count(), 0);
    }

    #[test]
    fn test_check_rejects_out_of_bounds() {
        let grid = Grid::new(2, 4);
        assert!(grid.check(Cell::new(1, 3)).is_ok());
        assert!(matches!(
            grid.check(Cell::new(2, 0)),
            Err(Error::OutOfBounds { height: 2, width: 4, .. })
        ));
        assert!(grid.check(Cell::new(0, 4)).is_err());
    }

    #[test]
    fn test_cells_iterates_whole_grid() {
        let grid = Grid::new(2, 3);
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells.len(), grid.len());
        assert_eq!(cells.first(), Some(&Cell::new(0, 0)));
        assert_eq!(cells.last(), Some(&Cell::new(1, 2)));
    }
}
