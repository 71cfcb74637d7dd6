//! Driving a whole game: pick a move, ask the oracle, feed the engine.

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::engine::InferenceEngine;
use crate::error::{Error, Result};
use crate::oracle::Oracle;

/// A move proposed by `next_move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// The cell is provably safe.
    Deduced(Cell),
    /// Deduction had nothing to offer; the cell was picked at random among
    /// unprobed cells not known to be mines.
    Guess(Cell),
}

impl Move {
    /// The cell to probe.
    pub fn cell(&self) -> Cell {
        match self {
            Move::Deduced(cell) | Move::Guess(cell) => *cell,
        }
    }

    /// Returns `true` if the move was not deduced.
    pub fn is_guess(&self) -> bool {
        matches!(self, Move::Guess(_))
    }
}

/// How a game driven by `play` ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    /// Every cell is probed or a known mine.
    Cleared { moves: usize, guesses: usize },
    /// A guess landed on a mine.
    Detonated {
        cell: Cell,
        moves: usize,
        guesses: usize,
    },
}

impl GameOutcome {
    /// Returns `true` if the board was cleared.
    pub fn is_cleared(&self) -> bool {
        matches!(self, GameOutcome::Cleared { .. })
    }
}

/// Proposes the next move: a deduced safe cell if there is one, otherwise a guess.
///
/// Returns `None` once every cell is probed or known to be a mine.
pub fn next_move<R: Rng + ?Sized>(engine: &InferenceEngine, rng: &mut R) -> Option<Move> {
    engine
        .safe_move()
        .map(Move::Deduced)
        .or_else(|| engine.fallback_move(rng).map(Move::Guess))
}

/// Plays a game to the end against `oracle`.
///
/// # Errors
///
/// Returns `Error::InvalidConfig` if the oracle's grid differs from the
/// engine's, and propagates any engine error raised by `observe`.
pub fn play<O, R>(engine: &mut InferenceEngine, oracle: &O, rng: &mut R) -> Result<GameOutcome>
where
    O: Oracle + ?Sized,
    R: Rng + ?Sized,
{
    if oracle.grid() != engine.grid() {
        return Err(Error::InvalidConfig(format!(
            "oracle grid {} does not match engine grid {}",
            oracle.grid(),
            engine.grid()
        )));
    }

    let mut moves = 0;
    let mut guesses = 0;

    while let Some(next) = next_move(engine, rng) {
        let cell = next.cell();
        moves += 1;
        if next.is_guess() {
            guesses += 1;
            debug!("No deduced move available, guessing {}", cell);
        }

        if oracle.is_mine(cell) {
            info!("Hit a mine at {} after {} moves", cell, moves);
            return Ok(GameOutcome::Detonated {
                cell,
                moves,
                guesses,
            });
        }

        engine.observe(cell, oracle.nearby_mines(cell))?;
    }

    info!(
        "Board cleared in {} moves ({} guesses, {} mines found)",
        moves,
        guesses,
        engine.known_mines().len()
    );
    Ok(GameOutcome::Cleared { moves, guesses })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Grid;
    use crate::oracle::MineField;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_next_move_prefers_deduced() {
        let mut engine = InferenceEngine::with_dimensions(3, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        assert!(next_move(&engine, &mut rng).unwrap().is_guess());

        engine.observe(Cell::new(1, 1), 0).unwrap();
        assert_eq!(
            next_move(&engine, &mut rng),
            Some(Move::Deduced(Cell::new(0, 0)))
        );
    }

    #[test]
    fn test_empty_board_is_cleared_with_one_guess() {
        let field = MineField::new(Grid::new(3, 3), Vec::new()).unwrap();
        let mut engine = InferenceEngine::with_dimensions(3, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let outcome = play(&mut engine, &field, &mut rng).unwrap();

        assert_eq!(
            outcome,
            GameOutcome::Cleared {
                moves: 9,
                guesses: 1
            }
        );
        assert_eq!(engine.moves_made().len(), 9);
    }

    #[test]
    fn test_single_mine_cell_detonates() {
        let field = MineField::from_layout(&["*"]).unwrap();
        let mut engine = InferenceEngine::with_dimensions(1, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let outcome = play(&mut engine, &field, &mut rng).unwrap();

        assert_eq!(
            outcome,
            GameOutcome::Detonated {
                cell: Cell::new(0, 0),
                moves: 1,
                guesses: 1
            }
        );
        assert!(!outcome.is_cleared());
    }

    #[test]
    fn test_grid_mismatch_is_rejected() {
        let field = MineField::new(Grid::new(2, 2), Vec::new()).unwrap();
        let mut engine = InferenceEngine::with_dimensions(3, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(matches!(
            play(&mut engine, &field, &mut rng),
            Err(Error::InvalidConfig(_))
        ));
    }
}
