//! Board generation and the bundled [`Grid`] implementation.
//!
//! [`Board`] owns the ground truth (mine layout and clue numbers) together
//! with everything the player has done to it: revealed cells, flags and the
//! flag counter.

use crate::error::MineTriggered;
use crate::grid::Grid;
use crate::rng::BoardRng;
use crate::types::{Cell, CellState, Mines, NeighborCache, MAX_DIMENSION};

/// Place mines randomly with a safe zone exclusion.
///
/// Draws `mine_count` distinct cells among those farther than `safe_radius`
/// (Chebyshev distance) from `safe`. If fewer cells are eligible, every one
/// of them gets a mine.
pub fn place_mines_random(
    rows: usize,
    cols: usize,
    mine_count: usize,
    safe: Cell,
    safe_radius: usize,
    rng: &mut BoardRng,
) -> Mines {
    let eligible: Vec<Cell> = (0..rows)
        .flat_map(|row| (0..cols).map(move |col| (row, col)))
        .filter(|&(row, col)| row.abs_diff(safe.0) > safe_radius || col.abs_diff(safe.1) > safe_radius)
        .collect();

    let mut mines = Mines::new(rows, cols);
    for idx in rng.sample_indices(eligible.len(), mine_count) {
        let (row, col) = eligible[idx];
        mines.set(row, col, true);
    }
    mines
}

/// Calculate the neighbor mine counts for all cells, row-major.
///
/// Mine cells keep 0; their number is never shown.
pub fn calculate_numbers(mines: &Mines, neighbor_cache: &NeighborCache) -> Vec<i8> {
    let mut numbers = vec![0i8; mines.rows * mines.cols];

    for row in 0..mines.rows {
        for col in 0..mines.cols {
            if mines.get(row, col) {
                continue;
            }
            numbers[row * mines.cols + col] = neighbor_cache
                .get(row, col)
                .iter()
                .filter(|&&(nr, nc)| mines.get(nr, nc))
                .count() as i8;
        }
    }

    numbers
}

/// A Minesweeper board with its play state.
#[derive(Clone)]
pub struct Board {
    rows: usize,
    cols: usize,
    mines: Mines,
    numbers: Vec<i8>,
    states: Vec<CellState>,
    flags: usize,
    nc: NeighborCache,
}

impl Board {
    /// Build a board from an explicit mine layout. Out-of-bounds cells are ignored.
    pub fn with_mines(rows: usize, cols: usize, mine_cells: &[Cell]) -> Self {
        let mut mines = Mines::new(rows, cols);
        for &(row, col) in mine_cells {
            if row < rows && col < cols {
                mines.set(row, col, true);
            }
        }
        Self::from_mines(mines)
    }

    /// Lay out `mine_count` mines at random, keeping the area around `safe` clear.
    pub fn random(
        rows: usize,
        cols: usize,
        mine_count: usize,
        safe: Cell,
        safe_radius: usize,
        rng: &mut BoardRng,
    ) -> Self {
        Self::from_mines(place_mines_random(rows, cols, mine_count, safe, safe_radius, rng))
    }

    /// Rows and columns must stay below [`MAX_DIMENSION`].
    pub fn from_mines(mines: Mines) -> Self {
        debug_assert!(mines.rows <= MAX_DIMENSION && mines.cols <= MAX_DIMENSION);
        let nc = NeighborCache::new(mines.rows, mines.cols);
        let numbers = calculate_numbers(&mines, &nc);
        Self {
            rows: mines.rows,
            cols: mines.cols,
            states: vec![CellState::Hidden; mines.rows * mines.cols],
            numbers,
            mines,
            flags: 0,
            nc,
        }
    }

    #[inline(always)]
    fn index(&self, (row, col): Cell) -> usize {
        row * self.cols + col
    }

    #[inline(always)]
    fn contains(&self, (row, col): Cell) -> bool {
        row < self.rows && col < self.cols
    }

    pub fn state(&self, cell: Cell) -> CellState {
        self.states[self.index(cell)]
    }

    pub fn is_mine(&self, (row, col): Cell) -> bool {
        self.mines.get(row, col)
    }

    pub fn mine_count(&self) -> usize {
        self.mines.count()
    }

    pub fn flag_count(&self) -> usize {
        self.flags
    }

    /// True once every cell without a mine has been revealed.
    pub fn is_cleared(&self) -> bool {
        self.states
            .iter()
            .zip(&self.mines.cells)
            .all(|(&state, &mine)| mine != 0 || state == CellState::Revealed)
    }
}

impl Grid for Board {
    fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn neighbors(&self, (row, col): Cell) -> &[Cell] {
        self.nc.get(row, col)
    }

    fn reveal(&mut self, cells: &[Cell]) -> Result<Vec<Cell>, MineTriggered> {
        let mut stack: Vec<Cell> = cells.iter().rev().copied().collect();
        let mut revealed = Vec::new();

        while let Some(cell) = stack.pop() {
            if !self.contains(cell) {
                continue;
            }
            let idx = self.index(cell);
            let state = self.states[idx];
            if state != CellState::Hidden {
                continue;
            }

            self.states[idx] = CellState::Revealed;
            if self.is_mine(cell) {
                let flagged_neighbors = self.flagged_neighbor_counts(&[cell])[0] as usize;
                return Err(MineTriggered {
                    cell,
                    state,
                    flagged_neighbors,
                });
            }
            revealed.push(cell);

            if self.numbers[idx] == 0 {
                stack.extend(self.nc.get(cell.0, cell.1).iter().copied());
            }
        }

        Ok(revealed)
    }

    fn flag(&mut self, cells: &[Cell]) {
        for &cell in cells {
            if !self.contains(cell) {
                continue;
            }
            let idx = self.index(cell);
            if self.states[idx] == CellState::Hidden {
                self.states[idx] = CellState::Flagged;
                self.flags += 1;
            }
        }
    }

    fn unflag(&mut self, cells: &[Cell]) {
        for &cell in cells {
            if !self.contains(cell) {
                continue;
            }
            let idx = self.index(cell);
            if self.states[idx] == CellState::Flagged {
                self.states[idx] = CellState::Hidden;
                self.flags -= 1;
            }
        }
    }

    fn clue_values(&self, cells: &[Cell]) -> Vec<i32> {
        cells
            .iter()
            .filter(|&&cell| self.contains(cell))
            .map(|&cell| self.index(cell))
            .filter(|&idx| self.states[idx] == CellState::Revealed)
            .map(|idx| self.numbers[idx] as i32)
            .collect()
    }

    fn flagged_neighbor_counts(&self, cells: &[Cell]) -> Vec<i32> {
        cells
            .iter()
            .map(|&(row, col)| {
                self.nc
                    .get(row, col)
                    .iter()
                    .filter(|&&n| self.state(n) == CellState::Flagged)
                    .count() as i32
            })
            .collect()
    }

    fn remaining_mine_count(&self) -> i32 {
        self.mine_count() as i32 - self.flags as i32
    }
}
