//! Fatal conditions raised while playing a turn.

use serde::Serialize;
use thiserror::Error;

use crate::types::{Cell, CellState};

/// A reveal uncovered a mine.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[error("killed at {cell:?} with state {state:?} and {flagged_neighbors} neighbouring flags")]
pub struct MineTriggered {
    pub cell: Cell,
    /// State of the cell before the reveal.
    pub state: CellState,
    pub flagged_neighbors: usize,
}

/// Errors that end a turn without a move being made.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TurnError {
    /// The game is lost.
    #[error(transparent)]
    MineTriggered(#[from] MineTriggered),

    /// The bounded fallback solve still produced a probability above one.
    #[error("probability solve is infeasible: {probabilities:?}")]
    Infeasible { probabilities: Vec<f64> },
}

impl TurnError {
    pub fn is_loss(&self) -> bool {
        matches!(self, TurnError::MineTriggered(_))
    }
}
