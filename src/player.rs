//! The automatic player.
//!
//! Each [`Player::turn`] runs one full pass: partition the undetermined cells,
//! build the expected-value system, solve it, and act on the resulting
//! probability field. All state lives in [`Player`] and can be cloned to
//! replay a turn.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::board::Board;
use crate::config::SolverConfig;
use crate::error::{MineTriggered, TurnError};
use crate::grid::Grid;
use crate::partition::partition;
use crate::rng::BoardRng;
use crate::selector::{select_move, Move};
use crate::solver::{scatter, ProbabilitySolver, Solution};
use crate::system::LinearSystem;
use crate::types::{Cell, ProbabilityField};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Status {
    InProgress,
    Won,
    Lost,
}

/// Outcome of a single turn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TurnReport {
    pub status: Status,
    pub mv: Move,
    /// Number of equivalence classes solved for.
    pub classes: usize,
    pub used_fallback: bool,
}

/// Outcome of [`Player::play`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameReport {
    pub status: Status,
    pub turns: usize,
    /// The reveal that lost the game, if it was lost.
    pub trigger: Option<MineTriggered>,
}

#[derive(Clone, Debug)]
pub struct Player {
    undetermined: BTreeSet<Cell>,
    frontier: Vec<Cell>,
    field: ProbabilityField,
    solver: ProbabilitySolver,
}

impl Player {
    pub fn new(grid: &impl Grid) -> Self {
        Self::with_config(grid, SolverConfig::default())
    }

    /// Start with every cell undetermined and an empty frontier.
    pub fn with_config(grid: &impl Grid, config: SolverConfig) -> Self {
        let (rows, cols) = grid.dimensions();
        Self {
            undetermined: (0..rows).flat_map(|r| (0..cols).map(move |c| (r, c))).collect(),
            frontier: Vec::new(),
            field: ProbabilityField::new(rows, cols),
            solver: ProbabilitySolver::new(config),
        }
    }

    pub fn undetermined(&self) -> &BTreeSet<Cell> {
        &self.undetermined
    }

    pub fn frontier(&self) -> &[Cell] {
        &self.frontier
    }

    pub fn field(&self) -> &ProbabilityField {
        &self.field
    }

    /// `Won` once nothing is undetermined and every flag sits on a mine.
    pub fn status(&self, grid: &impl Grid) -> Status {
        if self.undetermined.is_empty() && grid.remaining_mine_count() == 0 {
            Status::Won
        } else {
            Status::InProgress
        }
    }

    /// Reveal chosen cells without consulting the solver, e.g. for an opening move.
    ///
    /// # Errors
    ///
    /// [`TurnError::MineTriggered`] if one of them is a mine.
    pub fn reveal_at(&mut self, grid: &mut impl Grid, cells: &[Cell]) -> Result<Vec<Cell>, TurnError> {
        let cells: Vec<Cell> = cells
            .iter()
            .copied()
            .filter(|cell| self.undetermined.contains(cell))
            .collect();
        let revealed = grid.reveal(&cells)?;
        for &cell in &revealed {
            self.undetermined.remove(&cell);
            self.frontier.push(cell);
            self.field.exclude(cell);
        }
        debug!(requested = ?cells, count = revealed.len(), "revealed chosen cells");
        Ok(revealed)
    }

    /// Recompute the probability field without acting on it.
    ///
    /// Prunes the frontier and overwrites the probability of every undetermined cell.
    ///
    /// # Errors
    ///
    /// [`TurnError::Infeasible`] if no valid probabilities could be solved for.
    pub fn evaluate(&mut self, grid: &impl Grid) -> Result<Solution, TurnError> {
        let partition = partition(&self.undetermined, &self.frontier, grid);
        let system = LinearSystem::build(&partition, grid);
        self.frontier = partition.frontier;

        let solution = self.solver.solve(&system)?;
        scatter(&partition.classes, &solution.probabilities, &mut self.field);
        Ok(solution)
    }

    /// Play one turn.
    ///
    /// # Errors
    ///
    /// [`TurnError::MineTriggered`] if the chosen reveal hits a mine, and
    /// [`TurnError::Infeasible`] if no valid probabilities could be solved for.
    /// Neither is retried.
    pub fn turn(&mut self, grid: &mut impl Grid) -> Result<TurnReport, TurnError> {
        if self.undetermined.is_empty() {
            return Ok(TurnReport {
                status: self.status(&*grid),
                mv: Move::default(),
                classes: 0,
                used_fallback: false,
            });
        }

        let solution = self.evaluate(&*grid)?;
        let classes = solution.probabilities.len();

        let mv = select_move(grid, &mut self.undetermined, &mut self.frontier, &mut self.field)?;
        debug!(
            classes,
            flagged = mv.flagged.len(),
            revealed = mv.revealed.len(),
            guessed = mv.guess.is_some(),
            remaining = self.undetermined.len(),
            "turn complete"
        );

        Ok(TurnReport {
            status: self.status(&*grid),
            mv,
            classes,
            used_fallback: solution.used_fallback,
        })
    }

    /// Keep taking turns until the game is decided or `max_turns` have been played.
    ///
    /// A mine hit ends the game as [`Status::Lost`].
    ///
    /// # Errors
    ///
    /// [`TurnError::Infeasible`] is passed through.
    pub fn play(&mut self, grid: &mut impl Grid, max_turns: usize) -> Result<GameReport, TurnError> {
        let mut turns = 0;
        while turns < max_turns && !self.undetermined.is_empty() {
            turns += 1;
            match self.turn(grid) {
                Ok(_) => {}
                Err(TurnError::MineTriggered(trigger)) => {
                    debug!(%trigger, turns, "game lost");
                    return Ok(GameReport {
                        status: Status::Lost,
                        turns,
                        trigger: Some(trigger),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(GameReport {
            status: self.status(&*grid),
            turns,
            trigger: None,
        })
    }
}

/// Open `start`, then play until the game is decided or `max_turns` have been played.
///
/// An opening click on a mine is a loss after zero turns.
///
/// # Errors
///
/// [`TurnError::Infeasible`] is passed through.
pub fn play_from(
    grid: &mut impl Grid,
    start: Cell,
    max_turns: usize,
    config: SolverConfig,
) -> Result<GameReport, TurnError> {
    let mut player = Player::with_config(&*grid, config);
    match player.reveal_at(grid, &[start]) {
        Ok(_) => player.play(grid, max_turns),
        Err(TurnError::MineTriggered(trigger)) => Ok(GameReport {
            status: Status::Lost,
            turns: 0,
            trigger: Some(trigger),
        }),
        Err(err) => Err(err),
    }
}

/// Lay out a random board with the 3x3 block around `start` kept clear and play it.
pub fn play_random(
    rows: usize,
    cols: usize,
    mine_count: usize,
    start: Cell,
    max_turns: usize,
    config: SolverConfig,
    rng: &mut BoardRng,
) -> Result<GameReport, TurnError> {
    let mut board = Board::random(rows, cols, mine_count, start, 1, rng);
    debug!(rows, cols, mines = board.mine_count(), ?start, "new random board");
    play_from(&mut board, start, max_turns, config)
}
