//! Error types

use hecs::Entity;
use thiserror::Error;

use crate::ai::CellCoord;

/// Outcome of a grid search that did not reach its goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathError {
    /// The goal cell is not reachable from the start cell
    #[error("no path from cell {start:?} to cell {goal:?}")]
    NoPath { start: CellCoord, goal: CellCoord },
    /// The goal entity has no position to plan toward
    #[error("goal entity {goal:?} has no position")]
    UnknownGoal { goal: Entity },
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// RON parse failure
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    /// RON serialization failure
    #[error("RON serialization error: {0}")]
    RonSerialize(#[from] ron::Error),
    /// JSON failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
