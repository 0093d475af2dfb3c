//! Move selection from a probability field.
//!
//! Certain mines (probability 1) are flagged. If some cell is certainly safe
//! (probability 0), every such cell is revealed at once. Otherwise one cell at
//! the lowest probability is revealed, preferring the one whose whole
//! neighbourhood is most likely to be clear.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::error::TurnError;
use crate::grid::Grid;
use crate::types::{Cell, ProbabilityField};

/// A reveal made without certainty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Guess {
    pub cell: Cell,
    /// Mine probability of the guessed cell.
    pub probability: f64,
    /// Estimated chance that the cell and all its neighbors are mine-free.
    pub clear_chance: f64,
}

/// Everything the selector did in one turn.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Move {
    pub flagged: Vec<Cell>,
    /// All cells revealed, including those opened by flood fill.
    pub revealed: Vec<Cell>,
    pub guess: Option<Guess>,
}

impl Move {
    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty() && self.revealed.is_empty()
    }
}

/// Flag certain mines, then reveal either every certainly-safe cell or one guess.
///
/// Acted-upon cells leave `undetermined` and become excluded in `field`;
/// revealed cells join `frontier`.
///
/// # Errors
///
/// Propagates [`TurnError::MineTriggered`] when a reveal hits a mine.
pub fn select_move(
    grid: &mut impl Grid,
    undetermined: &mut BTreeSet<Cell>,
    frontier: &mut Vec<Cell>,
    field: &mut ProbabilityField,
) -> Result<Move, TurnError> {
    let mut mv = Move::default();

    let Some(min_value) = field.min_over(undetermined.iter()) else {
        return Ok(mv);
    };

    let certain_mines: Vec<Cell> = undetermined
        .iter()
        .copied()
        .filter(|&cell| field.get(cell) == 1.0)
        .collect();
    if !certain_mines.is_empty() {
        grid.flag(&certain_mines);
        for &cell in &certain_mines {
            undetermined.remove(&cell);
            field.exclude(cell);
        }
        debug!(cells = ?certain_mines, "flagged certain mines");
    }
    mv.flagged = certain_mines;

    let candidates: Vec<Cell> = undetermined
        .iter()
        .copied()
        .filter(|&cell| field.get(cell) == min_value)
        .collect();
    if candidates.is_empty() {
        return Ok(mv);
    }

    let to_reveal = if min_value == 0.0 {
        debug!(count = candidates.len(), "revealing safe cells");
        candidates
    } else {
        let guess = best_guess(&*grid, undetermined, field, &candidates, min_value);
        debug!(
            cell = ?guess.cell,
            probability = guess.probability,
            clear_chance = guess.clear_chance,
            "guessing"
        );
        let cell = guess.cell;
        mv.guess = Some(guess);
        vec![cell]
    };

    let revealed = grid.reveal(&to_reveal)?;
    for &cell in &revealed {
        undetermined.remove(&cell);
        frontier.push(cell);
        field.exclude(cell);
    }
    mv.revealed = revealed;

    Ok(mv)
}

/// Pick the candidate maximising `Π (1 − P)` over itself and its neighbors.
///
/// The product treats cells as independent, which they are not; it is only a
/// ranking heuristic. Revealed neighbors count as clear and a flagged neighbor
/// zeroes the estimate. Ties go to the first candidate.
fn best_guess(
    grid: &impl Grid,
    undetermined: &BTreeSet<Cell>,
    field: &ProbabilityField,
    candidates: &[Cell],
    probability: f64,
) -> Guess {
    let flagged = grid.flagged_neighbor_counts(candidates);

    let mut best = Guess {
        cell: candidates[0],
        probability,
        clear_chance: f64::NEG_INFINITY,
    };
    for (&cell, &flags) in candidates.iter().zip(&flagged) {
        let clear_chance = if flags > 0 {
            0.0
        } else {
            std::iter::once(&cell)
                .chain(grid.neighbors(cell))
                .filter(|&&n| undetermined.contains(&n))
                .map(|&n| 1.0 - field.get(n))
                .product()
        };
        if clear_chance > best.clear_chance {
            best.cell = cell;
            best.clear_chance = clear_chance;
        }
    }
    best
}
