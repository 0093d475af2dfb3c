//! Core data types shared by the board and the inference engine.
//!
//! All grid types use flat `Vec` storage with row-major layout:
//! `cells[row * cols + col]` holds the cell at `(row, col)`.

use serde::Serialize;

/// A `(row, col)` coordinate.
pub type Cell = (usize, usize);

/// Boards are limited to this many rows and columns so that [`cell_key`] stays unique.
pub const MAX_DIMENSION: usize = 1 << 16;

/// Bit-pack `(row, col)` into a single u32 key: `(row << 16) | col`.
///
/// Both coordinates must be below [`MAX_DIMENSION`].
#[inline(always)]
pub fn cell_key(row: usize, col: usize) -> u32 {
    debug_assert!(row < MAX_DIMENSION && col < MAX_DIMENSION, "cell ({}, {}) out of key range", row, col);
    ((row as u32) << 16) | (col as u32)
}

/// What the player can see of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CellState {
    Hidden,
    Revealed,
    Flagged,
}

/// Mine positions for each cell.
#[derive(Clone)]
pub struct Mines {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<u8>,
}

impl Mines {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
        }
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.cols + col] != 0
    }

    #[inline(always)]
    pub fn set(&mut self, row: usize, col: usize, val: bool) {
        self.cells[row * self.cols + col] = val as u8;
    }

    /// Count total mines on the board.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0).count()
    }
}

/// Pre-computed neighbor cache for all cells.
///
/// Stores the 8-directional neighbors (clipped to grid bounds) for every cell.
/// Indexed by `row * cols + col`, each entry is a slice of `(row, col)` pairs.
#[derive(Clone)]
pub struct NeighborCache {
    pub rows: usize,
    pub cols: usize,
    /// Flat storage of all neighbor pairs.
    data: Vec<Cell>,
    /// offsets[i] = start index in `data` for cell i.
    /// offsets[i+1] - offsets[i] = number of neighbors for cell i.
    offsets: Vec<usize>,
}

impl NeighborCache {
    /// Build the neighbor cache for a grid of the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        let total = rows * cols;
        let mut data = Vec::with_capacity(total * 8);
        let mut offsets = Vec::with_capacity(total + 1);

        for row in 0..rows {
            for col in 0..cols {
                offsets.push(data.len());
                for dr in -1i32..=1 {
                    for dc in -1i32..=1 {
                        if dr == 0 && dc == 0 {
                            continue;
                        }
                        let nr = row as i32 + dr;
                        let nc = col as i32 + dc;
                        if nr >= 0 && nr < rows as i32 && nc >= 0 && nc < cols as i32 {
                            data.push((nr as usize, nc as usize));
                        }
                    }
                }
            }
        }
        offsets.push(data.len()); // sentinel

        Self {
            rows,
            cols,
            data,
            offsets,
        }
    }

    /// Get the pre-computed neighbors for `(row, col)`.
    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> &[Cell] {
        let idx = row * self.cols + col;
        &self.data[self.offsets[idx]..self.offsets[idx + 1]]
    }
}

/// Marks a cell that has been revealed or flagged. Strictly greater than any probability.
pub const EXCLUDED: f64 = f64::INFINITY;

/// Per-cell mine probability.
///
/// Cells still in play hold a value in `[0, 1]`; acted-upon cells hold [`EXCLUDED`].
#[derive(Clone, Debug, PartialEq)]
pub struct ProbabilityField {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<f64>,
}

impl ProbabilityField {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0.0; rows * cols],
        }
    }

    #[inline(always)]
    pub fn get(&self, (row, col): Cell) -> f64 {
        self.cells[row * self.cols + col]
    }

    #[inline(always)]
    pub fn set(&mut self, (row, col): Cell, val: f64) {
        self.cells[row * self.cols + col] = val;
    }

    #[inline(always)]
    pub fn exclude(&mut self, cell: Cell) {
        self.set(cell, EXCLUDED);
    }

    #[inline(always)]
    pub fn is_excluded(&self, cell: Cell) -> bool {
        self.get(cell) > 1.0
    }

    /// Smallest non-excluded probability among `cells`, if any.
    pub fn min_over<'a>(&self, cells: impl IntoIterator<Item = &'a Cell>) -> Option<f64> {
        cells
            .into_iter()
            .map(|&cell| self.get(cell))
            .filter(|&p| p <= 1.0)
            .min_by(f64::total_cmp)
    }
}
