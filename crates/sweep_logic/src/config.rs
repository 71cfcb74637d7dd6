//! Configuration for the inference engine.

use serde::{Deserialize, Serialize};

use crate::cell::Grid;
use crate::error::{Error, Result};

/// Upper bound on fixpoint passes for a single propagation run.
pub const DEFAULT_MAX_PASSES: usize = 10_000;

fn default_max_passes() -> usize {
    DEFAULT_MAX_PASSES
}

/// Settings supplied when an `InferenceEngine` is constructed.
///
/// The grid dimensions are fixed for the lifetime of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of rows on the board.
    pub height: usize,
    /// Number of columns on the board.
    pub width: usize,
    /// The maximum number of passes one propagation run may take before
    /// `Error::MaxPassesExceeded` is raised.
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
}

impl EngineConfig {
    /// Creates a configuration for a `height x width` board with default limits.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    /// 9x9, the classic beginner board.
    pub fn beginner() -> Self {
        Self::new(9, 9)
    }

    /// 16x16, the classic intermediate board.
    pub fn intermediate() -> Self {
        Self::new(16, 16)
    }

    /// 16x30, the classic expert board.
    pub fn expert() -> Self {
        Self::new(16, 30)
    }

    /// Sets the pass limit for a single propagation run.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// The board extent described by this configuration.
    pub fn grid(&self) -> Grid {
        Grid::new(self.height, self.width)
    }

    /// Checks that the configuration describes a usable board.
    pub fn validate(&self) -> Result<()> {
        if self.height == 0 || self.width == 0 {
            return Err(Error::InvalidConfig(format!(
                "grid must be non-empty, got {}x{}",
                self.height, self.width
            )));
        }
        if self.max_passes == 0 {
            return Err(Error::InvalidConfig(
                "max_passes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses a JSON configuration and validates it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(8, 8)
    }
}
