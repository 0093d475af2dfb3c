use std::collections::BTreeSet;

use minesweeper_lsq::partition::partition;
use minesweeper_lsq::rng::BoardRng;
use minesweeper_lsq::solver::{LeastSquares, NonNegative, ProbabilitySolver, UnitBox};
use minesweeper_lsq::system::LinearSystem;
use minesweeper_lsq::types::{Cell, CellState, EXCLUDED};
use minesweeper_lsq::{Board, Grid, Player, SolverConfig, Status, TurnError};

fn hidden_cells(board: &Board) -> BTreeSet<Cell> {
    let (rows, cols) = board.dimensions();
    (0..rows)
        .flat_map(|r| (0..cols).map(move |c| (r, c)))
        .filter(|&cell| board.state(cell) == CellState::Hidden)
        .collect()
}

#[test]
fn two_cells_one_mine() {
    let mut board = Board::with_mines(1, 2, &[(0, 1)]);
    let mut player = Player::new(&board);
    player.reveal_at(&mut board, &[(0, 0)]).unwrap();

    let solution = player.evaluate(&board).unwrap();
    assert_eq!(solution.probabilities, vec![1.0]);

    let report = player.turn(&mut board).unwrap();
    assert_eq!(report.mv.flagged, vec![(0, 1)]);
    assert_eq!(report.status, Status::Won);
    assert_eq!(board.remaining_mine_count(), 0);
}

#[test]
fn mine_free_board_clears_on_first_turn() {
    let mut board = Board::with_mines(3, 4, &[]);
    let mut player = Player::new(&board);

    let report = player.play(&mut board, 5).unwrap();
    assert_eq!(report.status, Status::Won);
    assert_eq!(report.turns, 1);
    assert!(board.is_cleared());
    assert!(player.field().cells.iter().all(|&p| p == EXCLUDED));
}

#[test]
fn zero_clue_makes_neighbors_safe() {
    // The opening click on (2, 0) shows a zero and floods; every cell it
    // touched must come back with probability zero or excluded.
    let mut board = Board::with_mines(5, 5, &[(0, 4), (4, 4)]);
    let mut player = Player::new(&board);
    player.reveal_at(&mut board, &[(2, 0)]).unwrap();
    player.evaluate(&board).unwrap();

    for &cell in board.neighbors((2, 0)) {
        let p = player.field().get(cell);
        assert!(p == 0.0 || p == EXCLUDED, "{:?} has probability {}", cell, p);
    }
    assert_eq!(player.field().get((0, 4)), 1.0);
    assert_eq!(player.field().get((4, 4)), 1.0);
}

/// Always answers with the same value in every component.
struct Constant(f64);

impl LeastSquares for Constant {
    fn solve(&self, system: &LinearSystem, _max_iterations: usize) -> Vec<f64> {
        vec![self.0; system.cols()]
    }
}

#[test]
fn infeasible_fallback_is_reported() {
    let mut board = Board::with_mines(1, 2, &[(0, 1)]);
    board.reveal(&[(0, 0)]).unwrap();
    let undetermined: BTreeSet<Cell> = [(0, 1)].into_iter().collect();

    let p = partition(&undetermined, &[(0, 0)], &board);
    let system = LinearSystem::build(&p, &board);
    let solver = ProbabilitySolver::with_strategies(Constant(1.5), Constant(1.02), SolverConfig::default());

    let err = solver.solve(&system).unwrap_err();
    assert!(!err.is_loss());
    assert_eq!(err, TurnError::Infeasible { probabilities: vec![1.02] });

    // The real non-negative backend has no trouble with the same system.
    let solver = ProbabilitySolver::with_strategies(NonNegative, Constant(1.02), SolverConfig::default());
    assert_eq!(solver.solve(&system).unwrap().probabilities, vec![1.0]);
}

/// Delegates to another backend and counts how often it is asked.
struct Counted<S> {
    inner: S,
    calls: std::cell::Cell<usize>,
}

impl<S> Counted<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            calls: std::cell::Cell::new(0),
        }
    }
}

impl<S: LeastSquares> LeastSquares for Counted<S> {
    fn solve(&self, system: &LinearSystem, max_iterations: usize) -> Vec<f64> {
        self.calls.set(self.calls.get() + 1);
        self.inner.solve(system, max_iterations)
    }
}

#[test]
fn seeded_games_keep_invariants() {
    for seed in 0..60 {
        let mut rng = BoardRng::from_seed(seed);
        let mut board = Board::random(9, 9, 14, (4, 4), 1, &mut rng);
        let mut player = Player::new(&board);
        player.reveal_at(&mut board, &[(4, 4)]).unwrap();

        for _ in 0..81 {
            if player.undetermined().is_empty() {
                break;
            }

            let undetermined = player.undetermined().clone();
            let p = partition(&undetermined, player.frontier(), &board);

            // Every undetermined cell sits in exactly one class.
            let mut members: Vec<Cell> = p.classes.iter().flat_map(|c| c.cells.iter().copied()).collect();
            members.sort();
            assert_eq!(members, undetermined.iter().copied().collect::<Vec<_>>());

            // The undetermined set is exactly the hidden cells.
            assert_eq!(undetermined, hidden_cells(&board));

            // Real boards are always consistent, so the solve must succeed, stay
            // inside [0, 1] and call the fallback at most once.
            let system = LinearSystem::build(&p, &board);
            let primary = Counted::new(NonNegative);
            let fallback = Counted::new(UnitBox);
            let solver = ProbabilitySolver::with_strategies(&primary, &fallback, SolverConfig::default());
            let counted = solver
                .solve(&system)
                .unwrap_or_else(|err| panic!("seed {}: solve failed: {}", seed, err));
            assert_eq!(primary.calls.get(), 1);
            assert_eq!(fallback.calls.get(), usize::from(counted.used_fallback));

            let solution = player
                .evaluate(&board)
                .unwrap_or_else(|err| panic!("seed {}: evaluate failed: {}", seed, err));
            assert_eq!(solution, counted);
            assert!(
                solution.probabilities.iter().all(|&p| (0.0..=1.0).contains(&p)),
                "seed {}: {:?}",
                seed,
                solution.probabilities
            );

            // With every flag on a mine the true layout solves the system exactly,
            // so the expected mine count must match the budget.
            if (0..9)
                .flat_map(|r| (0..9).map(move |c| (r, c)))
                .filter(|&cell| board.state(cell) == CellState::Flagged)
                .all(|cell| board.is_mine(cell))
            {
                let expected: f64 = undetermined.iter().map(|&cell| player.field().get(cell)).sum();
                assert!(
                    (expected - board.remaining_mine_count() as f64).abs() < 1e-6,
                    "seed {}: expected {} mines, {} remain",
                    seed,
                    expected,
                    board.remaining_mine_count()
                );
            }

            match player.turn(&mut board) {
                Ok(report) => {
                    for &cell in player.frontier() {
                        assert_eq!(board.state(cell), CellState::Revealed);
                    }
                    for &cell in report.mv.flagged.iter().chain(&report.mv.revealed) {
                        assert!(!player.undetermined().contains(&cell));
                    }
                }
                Err(err) => {
                    assert!(err.is_loss(), "seed {}: {}", seed, err);
                    break;
                }
            }
        }
    }
}
