//! The board as seen by the inference engine.
//!
//! The engine never touches mine positions or counters directly; everything
//! goes through this trait. [`crate::board::Board`] is the bundled implementation.

use crate::error::MineTriggered;
use crate::types::Cell;

pub trait Grid {
    /// `(rows, cols)`.
    fn dimensions(&self) -> (usize, usize);

    /// All in-bounds 8-directionally adjacent cells.
    fn neighbors(&self, cell: Cell) -> &[Cell];

    /// Flood-fill reveal starting from `cells`.
    ///
    /// Zero-clue cells pull in their neighbors recursively. Returns every cell
    /// newly revealed by this call, which may be more than `cells`.
    ///
    /// # Errors
    ///
    /// Fails with [`MineTriggered`] as soon as a revealed cell holds a mine.
    fn reveal(&mut self, cells: &[Cell]) -> Result<Vec<Cell>, MineTriggered>;

    /// Mark hidden cells as flagged. Other cells are left alone.
    fn flag(&mut self, cells: &[Cell]);

    /// Clear flags. Cells that are not flagged are left alone.
    fn unflag(&mut self, cells: &[Cell]);

    /// Clue numbers of the given cells, skipping any that are not revealed.
    fn clue_values(&self, cells: &[Cell]) -> Vec<i32>;

    /// Per given cell, how many of its neighbors are flagged.
    fn flagged_neighbor_counts(&self, cells: &[Cell]) -> Vec<i32>;

    /// Total mines minus the current flag count.
    fn remaining_mine_count(&self) -> i32;
}
