//! Expected-value equations over class probabilities.
//!
//! One row per frontier cell plus a final row for the global mine budget.
//! Column `j` carries `|class_j|` wherever class `j` is adjacent to the row's
//! clue, so `A·p` is the expected number of mines each clue sees.

use tracing::trace;

use crate::grid::Grid;
use crate::partition::Partition;

/// A dense `(F + 1) × C` system `A·p = b`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearSystem {
    pub matrix: Vec<Vec<f64>>,
    pub rhs: Vec<f64>,
}

impl LinearSystem {
    pub fn new(matrix: Vec<Vec<f64>>, rhs: Vec<f64>) -> Self {
        Self { matrix, rhs }
    }

    /// Assemble the clue equations and the mine-budget equation.
    pub fn build(partition: &Partition, grid: &impl Grid) -> Self {
        let frontier = &partition.frontier;
        let classes = &partition.classes;

        let mut matrix: Vec<Vec<f64>> = Vec::with_capacity(frontier.len() + 1);
        for &cell in frontier {
            matrix.push(
                classes
                    .iter()
                    .map(|class| {
                        if class.is_influenced_by(cell) {
                            class.len() as f64
                        } else {
                            0.0
                        }
                    })
                    .collect(),
            );
        }
        matrix.push(classes.iter().map(|class| class.len() as f64).collect());

        let clues = grid.clue_values(frontier);
        debug_assert_eq!(clues.len(), frontier.len(), "frontier holds a cell without a clue");
        let flagged = grid.flagged_neighbor_counts(frontier);
        let mut rhs: Vec<f64> = clues
            .iter()
            .zip(&flagged)
            .map(|(&clue, &flags)| (clue - flags) as f64)
            .collect();
        rhs.push(grid.remaining_mine_count() as f64);

        trace!(rows = matrix.len(), cols = classes.len(), ?rhs, "built linear system");

        Self { matrix, rhs }
    }

    pub fn rows(&self) -> usize {
        self.matrix.len()
    }

    pub fn cols(&self) -> usize {
        self.matrix.first().map_or(0, Vec::len)
    }

    /// `A·p`.
    pub fn apply(&self, p: &[f64]) -> Vec<f64> {
        self.matrix
            .iter()
            .map(|row| row.iter().zip(p).map(|(a, x)| a * x).sum())
            .collect()
    }

    /// Euclidean norm of `A·p − b`.
    pub fn residual(&self, p: &[f64]) -> f64 {
        self.apply(p)
            .iter()
            .zip(&self.rhs)
            .map(|(ax, b)| (ax - b) * (ax - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Expected number of mines over all undetermined cells, `Σ |class_j|·p_j`.
    pub fn expected_mines(&self, p: &[f64]) -> f64 {
        self.matrix
            .last()
            .map_or(0.0, |budget| budget.iter().zip(p).map(|(a, x)| a * x).sum())
    }
}
