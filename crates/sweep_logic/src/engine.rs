//! Inference engine with fixpoint propagation
//!
//! The engine owns the knowledge base for one game and can:
//! - Ingest observations: "this probed cell has N mines around it"
//! - Propagate to a fixpoint: mark cells provably safe or provably mines,
//!   and derive new statements from pairs of statements where one's cells
//!   strictly contain the other's
//! - Answer move queries over the settled knowledge

use std::collections::{BTreeSet, HashSet};

use indexmap::IndexSet;
use log::{debug, trace, warn};
use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, Grid};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::statement::Statement;

/// The knowledge base and inference rules for a single game.
///
/// Every engine owns its state outright, so independent games run on
/// independent instances. All mutation goes through `&mut self` and
/// `observe` returns only after propagation has settled.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    /// Board dimensions and propagation limits, fixed at construction.
    config: EngineConfig,
    /// Cells already probed. Only grows.
    moves_made: HashSet<Cell>,
    /// Cells proven to be mines. Only grows.
    known_mines: HashSet<Cell>,
    /// Cells proven safe. Only grows, and may overlap `moves_made`.
    known_safe: HashSet<Cell>,
    /// Statements known to be true, deduplicated by value, in insertion order.
    statements: IndexSet<Statement>,
    /// Cumulative counters across all operations.
    stats: EngineStats,
    /// Set once a fatal error has been surfaced.
    halted: Option<String>,
}

impl InferenceEngine {
    /// Creates an engine with an empty knowledge base.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the configuration fails validation.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            moves_made: HashSet::new(),
            known_mines: HashSet::new(),
            known_safe: HashSet::new(),
            statements: IndexSet::new(),
            stats: EngineStats::default(),
            halted: None,
        })
    }

    /// Creates an engine for a `height x width` board with default limits.
    pub fn with_dimensions(height: usize, width: usize) -> Result<Self> {
        Self::new(EngineConfig::new(height, width))
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The board the engine reasons about.
    pub fn grid(&self) -> Grid {
        self.config.grid()
    }

    /// Retrieves the cumulative `EngineStats` for this engine.
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Returns the reason the engine stopped accepting facts, if it did.
    pub fn halt_reason(&self) -> Option<&str> {
        self.halted.as_deref()
    }

    /// Returns `true` once a fatal error has been surfaced.
    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    /// Ingests the count reported for a freshly probed cell and propagates to a fixpoint.
    ///
    /// The cell is recorded as a move and marked safe. Its in-bounds neighbors
    /// are then split three ways: known mines lower the effective count, probed
    /// or known-safe cells are dropped, and the rest become the cells of a new
    /// statement.
    ///
    /// # Arguments
    ///
    /// * `cell` - The probed cell.
    /// * `count` - The number of mines among its 8-connected neighbors.
    ///
    /// # Returns
    ///
    /// A `PropagationReport` describing what the run deduced.
    ///
    /// # Errors
    ///
    /// - `Error::OutOfBounds` or `Error::AlreadyObserved` for caller contract
    ///   violations. The knowledge base is left untouched.
    /// - `Error::Contradiction` if the count is inconsistent with what is
    ///   already known, `Error::MaxPassesExceeded` if propagation does not
    ///   settle. Both halt the engine.
    /// - `Error::Halted` if an earlier call already halted it.
    pub fn observe(&mut self, cell: Cell, count: usize) -> Result<PropagationReport> {
        self.ensure_running()?;
        self.grid().check(cell)?;
        if self.moves_made.contains(&cell) {
            return Err(Error::AlreadyObserved(cell));
        }
        let result = self.ingest(cell, count);
        self.guard(result)
    }

    /// Runs propagation to a fixpoint without adding new facts.
    ///
    /// Calling this on a settled knowledge base is a no-op that reports a
    /// single quiet pass.
    pub fn propagate(&mut self) -> Result<PropagationReport> {
        self.ensure_running()?;
        let result = self.run_to_fixpoint();
        self.guard(result)
    }

    /// Records that `cell` is a mine and narrows every statement accordingly.
    ///
    /// Returns `Ok(false)` if the cell was already a known mine. Does not
    /// propagate; call `propagate` to draw further conclusions.
    ///
    /// # Errors
    ///
    /// Returns `Error::Contradiction` if the cell is known safe or a statement
    /// rules out any further mine among its cells.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<bool> {
        self.ensure_running()?;
        self.grid().check(cell)?;
        let result = self.record_mine(cell);
        self.guard(result)
    }

    /// Records that `cell` is safe and narrows every statement accordingly.
    ///
    /// Returns `Ok(false)` if the cell was already known safe. Does not propagate.
    ///
    /// # Errors
    ///
    /// Returns `Error::Contradiction` if the cell is a known mine or a
    /// statement needs every one of its cells, this one included, to be a mine.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<bool> {
        self.ensure_running()?;
        self.grid().check(cell)?;
        let result = self.record_safe(cell);
        self.guard(result)
    }

    /// Returns a known-safe cell that has not been probed yet.
    ///
    /// The smallest such cell in row-major order is chosen, so repeated calls
    /// agree. `None` means deduction has nothing to offer right now.
    pub fn safe_move(&self) -> Option<Cell> {
        self.known_safe.difference(&self.moves_made).min().copied()
    }

    /// All known-safe cells that have not been probed yet, sorted.
    pub fn safe_moves(&self) -> Vec<Cell> {
        let mut moves: Vec<_> = self.known_safe.difference(&self.moves_made).copied().collect();
        moves.sort_unstable();
        moves
    }

    /// Cells that are neither probed nor known mines, in row-major order.
    pub fn fallback_candidates(&self) -> impl Iterator<Item = Cell> + '_ {
        self.grid()
            .cells()
            .filter(move |cell| !self.moves_made.contains(cell) && !self.known_mines.contains(cell))
    }

    /// Picks uniformly among `fallback_candidates`, or `None` if none remain.
    pub fn fallback_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        self.fallback_candidates().choose(rng)
    }

    /// Returns `true` if `cell` has been proven to be a mine.
    pub fn is_known_mine(&self, cell: Cell) -> bool {
        self.known_mines.contains(&cell)
    }

    /// Returns `true` if `cell` has been proven safe.
    pub fn is_known_safe(&self, cell: Cell) -> bool {
        self.known_safe.contains(&cell)
    }

    /// Returns `true` if `cell` has already been probed.
    pub fn is_move_made(&self, cell: Cell) -> bool {
        self.moves_made.contains(&cell)
    }

    /// Every cell proven to be a mine.
    pub fn known_mines(&self) -> &HashSet<Cell> {
        &self.known_mines
    }

    /// Every cell proven safe, probed cells included.
    pub fn known_safe(&self) -> &HashSet<Cell> {
        &self.known_safe
    }

    /// Every probed cell.
    pub fn moves_made(&self) -> &HashSet<Cell> {
        &self.moves_made
    }

    /// Iterates over the statements currently held, in insertion order.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    /// Number of statements currently held.
    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    fn ensure_running(&self) -> Result<()> {
        match &self.halted {
            Some(reason) => Err(Error::Halted(reason.clone())),
            None => Ok(()),
        }
    }

    /// Halts the engine if `result` carries a fatal error.
    fn guard<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_fatal() {
                warn!("Inference engine halted: {}", e);
                self.halted = Some(e.to_string());
            }
        }
        result
    }

    fn ingest(&mut self, cell: Cell, count: usize) -> Result<PropagationReport> {
        debug!("Observed {} with {} neighboring mines", cell, count);
        self.stats.observations += 1;
        self.moves_made.insert(cell);
        self.record_safe(cell)?;

        let mut unresolved = BTreeSet::new();
        let mut accounted = 0;
        for neighbor in self.grid().neighbors(cell) {
            if self.known_mines.contains(&neighbor) {
                accounted += 1;
            } else if !self.moves_made.contains(&neighbor) && !self.known_safe.contains(&neighbor) {
                unresolved.insert(neighbor);
            }
        }

        let effective = count.checked_sub(accounted).ok_or_else(|| {
            Error::Contradiction(format!(
                "{} reports {} neighboring mines but {} are already known",
                cell, count, accounted
            ))
        })?;

        // Rejects an empty neighborhood with a nonzero remaining count.
        let statement = Statement::new(unresolved, effective)?;
        if !statement.is_empty() {
            debug!("Adding statement {}", statement);
            if self.insert_statement(statement) {
                self.stats.statements_added += 1;
            }
        }

        self.run_to_fixpoint()
    }

    /// Adds a statement unless an equal one is already held.
    fn insert_statement(&mut self, statement: Statement) -> bool {
        self.statements.insert(statement)
    }

    fn record_mine(&mut self, cell: Cell) -> Result<bool> {
        if self.known_safe.contains(&cell) {
            return Err(Error::Contradiction(format!(
                "{} is known safe and cannot be a mine",
                cell
            )));
        }
        if self.known_mines.contains(&cell) {
            return Ok(false);
        }
        if let Some(blocking) = self
            .statements
            .iter()
            .find(|s| s.contains(&cell) && s.count() == 0)
        {
            return Err(Error::Contradiction(format!(
                "{} is a mine but statement {} allows none",
                cell, blocking
            )));
        }

        self.known_mines.insert(cell);
        self.stats.mines_marked += 1;
        trace!("Marked {} as a mine", cell);
        self.narrow_statements(cell, |s| s.narrow_as_mine(cell))?;
        Ok(true)
    }

    fn record_safe(&mut self, cell: Cell) -> Result<bool> {
        if self.known_mines.contains(&cell) {
            return Err(Error::Contradiction(format!(
                "{} is a known mine and cannot be safe",
                cell
            )));
        }
        if self.known_safe.contains(&cell) {
            return Ok(false);
        }
        if let Some(blocking) = self
            .statements
            .iter()
            .find(|s| s.contains(&cell) && s.count() == s.len())
        {
            return Err(Error::Contradiction(format!(
                "{} is safe but statement {} needs it to be a mine",
                cell, blocking
            )));
        }

        self.known_safe.insert(cell);
        self.stats.safes_marked += 1;
        trace!("Marked {} as safe", cell);
        self.narrow_statements(cell, |s| Ok(s.narrow_as_safe(cell)))?;
        Ok(true)
    }

    /// Applies `narrow` to every statement mentioning `cell`.
    ///
    /// The collection is rebuilt so that statements which become equal after
    /// narrowing collapse into one. It is only replaced once every statement
    /// has narrowed, so an error leaves it as it was.
    fn narrow_statements<F>(&mut self, cell: Cell, mut narrow: F) -> Result<()>
    where
        F: FnMut(&mut Statement) -> Result<bool>,
    {
        if !self.statements.iter().any(|s| s.contains(&cell)) {
            return Ok(());
        }

        let held = self.statements.len();
        let mut narrowed = IndexSet::with_capacity(held);
        for statement in &self.statements {
            let mut statement = statement.clone();
            narrow(&mut statement)?;
            narrowed.insert(statement);
        }

        let absorbed = held - narrowed.len();
        if absorbed > 0 {
            trace!("Narrowing on {} absorbed {} duplicate statements", cell, absorbed);
            self.stats.statements_absorbed += absorbed;
        }
        self.statements = narrowed;
        Ok(())
    }

    /// Repeats full passes until one changes nothing.
    ///
    /// Each pass marks the mines and safe cells single statements imply,
    /// drops resolved statements, and derives new statements from strict
    /// subset pairs. Derivation compares every ordered pair of distinct
    /// statements, so a pass costs O(|statements|^2); that is the complexity
    /// ceiling per pass, and `max_passes` bounds the number of passes.
    fn run_to_fixpoint(&mut self) -> Result<PropagationReport> {
        let mut report = PropagationReport::default();

        loop {
            if report.passes >= self.config.max_passes {
                return Err(Error::MaxPassesExceeded {
                    passes: self.config.max_passes,
                });
            }
            report.passes += 1;
            self.stats.passes += 1;
            let mut changed = false;

            let mines: Vec<Cell> = self
                .statements
                .iter()
                .flat_map(Statement::known_mines)
                .filter(|cell| !self.known_mines.contains(cell))
                .collect();
            for cell in mines {
                if self.record_mine(cell)? {
                    debug!("Deduced mine at {}", cell);
                    report.mines.push(cell);
                    changed = true;
                }
            }

            let safes: Vec<Cell> = self
                .statements
                .iter()
                .flat_map(Statement::known_safe)
                .filter(|cell| !self.known_safe.contains(cell))
                .collect();
            for cell in safes {
                if self.record_safe(cell)? {
                    debug!("Deduced safe cell at {}", cell);
                    report.safes.push(cell);
                    changed = true;
                }
            }

            if let Some(broken) = self.statements.iter().find(|s| s.is_contradiction()) {
                return Err(Error::Contradiction(format!(
                    "statement {} cannot hold",
                    broken
                )));
            }

            let held = self.statements.len();
            self.statements.retain(|s| !s.is_resolved());
            let removed = held - self.statements.len();
            report.removed += removed;
            self.stats.statements_removed += removed;

            for statement in self.derive_statements()? {
                debug!("Derived statement {}", statement);
                if self.insert_statement(statement) {
                    report.derived += 1;
                    self.stats.statements_derived += 1;
                    changed = true;
                }
            }

            trace!(
                "Pass {}: {} statements held, changed: {}, removed: {}",
                report.passes,
                self.statements.len(),
                changed,
                removed
            );

            if !changed && removed == 0 {
                break;
            }
        }

        debug!(
            "Fixpoint reached after {} passes ({} mines, {} safe, {} derived)",
            report.passes,
            report.mines.len(),
            report.safes.len(),
            report.derived
        );
        Ok(report)
    }

    /// Applies the subset-difference rule to every ordered pair of distinct statements.
    ///
    /// Only statements not already held are returned, each at most once.
    ///
    /// # Errors
    ///
    /// Returns `Error::Contradiction` if a pair cannot both hold, including two
    /// statements over the same cells with different counts.
    fn derive_statements(&self) -> Result<Vec<Statement>> {
        let mut derived = IndexSet::new();

        for (i, superset) in self.statements.iter().enumerate() {
            for (j, subset) in self.statements.iter().enumerate() {
                if i == j {
                    continue;
                }
                // Held statements are distinct, so equal cells mean different counts.
                if superset.cells() == subset.cells() {
                    return Err(Error::Contradiction(format!(
                        "statements {} and {} disagree on the same cells",
                        superset, subset
                    )));
                }
                if let Some(statement) = superset.difference(subset)? {
                    if !self.statements.contains(&statement) {
                        derived.insert(statement);
                    }
                }
            }
        }

        Ok(derived.into_iter().collect())
    }
}

/// Collects cumulative statistics about the operations performed by an `InferenceEngine`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// The number of observations ingested.
    pub observations: usize,
    /// The number of fixpoint passes run across all propagations.
    pub passes: usize,
    /// Statements added directly from observations.
    pub statements_added: usize,
    /// Statements produced by the subset-difference rule.
    pub statements_derived: usize,
    /// Resolved `{} = 0` statements dropped.
    pub statements_removed: usize,
    /// Statements merged into an equal one after narrowing.
    pub statements_absorbed: usize,
    /// Cells recorded as mines.
    pub mines_marked: usize,
    /// Cells recorded as safe, probed cells included.
    pub safes_marked: usize,
}

/// The outcome of one propagation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationReport {
    /// Number of full passes, including the final quiet one.
    pub passes: usize,
    /// Cells newly deduced to be mines, in deduction order.
    pub mines: Vec<Cell>,
    /// Cells newly deduced to be safe, in deduction order.
    pub safes: Vec<Cell>,
    /// Statements added by the subset-difference rule.
    pub derived: usize,
    /// Resolved statements dropped.
    pub removed: usize,
}

impl PropagationReport {
    /// Returns `true` if the run changed nothing.
    pub fn is_quiescent(&self) -> bool {
        self.mines.is_empty() && self.safes.is_empty() && self.derived == 0 && self.removed == 0
    }
}
