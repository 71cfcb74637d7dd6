//! Sweep Logic - Knowledge-Base Inference for Mine-Deduction Puzzles
//!
//! This crate deduces which unrevealed cells of a grid are provably safe or
//! provably mines, given observations of the form "probed cell C has N mines
//! among its neighbors". When deduction runs dry it proposes a guess.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Inference Engine                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                 Knowledge Base                        │   │
//! │  │  Moves Made │ Known Mines │ Known Safe │ Statements   │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │              Fixpoint Propagation                     │   │
//! │  │  Exact Count │ Zero Count │ Subset Difference         │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                 Move Selection                        │   │
//! │  │  Deduced Safe Move │ Fallback Guess                   │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use sweep_logic::{Cell, InferenceEngine};
//!
//! let mut engine = InferenceEngine::with_dimensions(3, 3).unwrap();
//!
//! // No mines around the center: every other cell is safe.
//! engine.observe(Cell::new(1, 1), 0).unwrap();
//! assert!(engine.is_known_safe(Cell::new(0, 0)));
//! assert_eq!(engine.safe_move(), Some(Cell::new(0, 0)));
//! ```

pub mod cell;
pub mod config;
pub mod engine;
pub mod error;
pub mod oracle;
pub mod play;
pub mod statement;

// Re-exports
pub use cell::{Cell, Grid};
pub use config::{EngineConfig, DEFAULT_MAX_PASSES};
pub use engine::{EngineStats, InferenceEngine, PropagationReport};
pub use error::{Error, Result};
pub use oracle::{MineField, Oracle};
pub use play::{next_move, play, GameOutcome, Move};
pub use statement::Statement;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
