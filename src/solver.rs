//! Probability solver: turns a [`LinearSystem`] into one mine probability per class.
//!
//! The primary strategy is a non-negative least-squares fit. Whenever it
//! produces a component above one, the system is re-solved with every
//! component boxed into `[0, 1]`. If even that leaves a component above one
//! the turn fails with [`TurnError::Infeasible`].

use tracing::{error, trace, warn};

use crate::config::SolverConfig;
use crate::error::TurnError;
use crate::lstsq::bounded_least_squares;
use crate::partition::CellClass;
use crate::system::LinearSystem;
use crate::types::ProbabilityField;

/// A least-squares backend.
pub trait LeastSquares {
    fn solve(&self, system: &LinearSystem, max_iterations: usize) -> Vec<f64>;
}

impl<T: LeastSquares> LeastSquares for &T {
    fn solve(&self, system: &LinearSystem, max_iterations: usize) -> Vec<f64> {
        (*self).solve(system, max_iterations)
    }
}

/// `min ‖A·p − b‖` subject to `p ≥ 0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NonNegative;

impl LeastSquares for NonNegative {
    fn solve(&self, system: &LinearSystem, max_iterations: usize) -> Vec<f64> {
        bounded_least_squares(&system.matrix, &system.rhs, None, max_iterations)
    }
}

/// `min ‖A·p − b‖` subject to `0 ≤ p ≤ 1`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnitBox;

impl LeastSquares for UnitBox {
    fn solve(&self, system: &LinearSystem, max_iterations: usize) -> Vec<f64> {
        bounded_least_squares(&system.matrix, &system.rhs, Some(1.0), max_iterations)
    }
}

/// Solved class probabilities, in class order.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub probabilities: Vec<f64>,
    /// Whether the bounded fallback had to run.
    pub used_fallback: bool,
    /// `‖A·p − b‖` at the returned point.
    pub residual: f64,
}

#[derive(Clone, Debug)]
pub struct ProbabilitySolver<P = NonNegative, F = UnitBox> {
    primary: P,
    fallback: F,
    config: SolverConfig,
}

impl ProbabilitySolver {
    pub fn new(config: SolverConfig) -> Self {
        Self::with_strategies(NonNegative, UnitBox, config)
    }
}

impl Default for ProbabilitySolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl<P: LeastSquares, F: LeastSquares> ProbabilitySolver<P, F> {
    pub fn with_strategies(primary: P, fallback: F, config: SolverConfig) -> Self {
        Self {
            primary,
            fallback,
            config,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve for per-class probabilities.
    ///
    /// # Errors
    ///
    /// [`TurnError::Infeasible`] when the bounded fallback still yields a value above one.
    pub fn solve(&self, system: &LinearSystem) -> Result<Solution, TurnError> {
        let config = &self.config;

        let mut probabilities = self.primary.solve(system, config.max_iterations);
        snap(&mut probabilities, config.snap_atol, config.snap_rtol);

        let used_fallback = probabilities.iter().any(|&p| p > 1.0);
        if used_fallback {
            warn!(?probabilities, "non-negative solve exceeds 1, re-solving within [0, 1]");

            probabilities = self.fallback.solve(system, config.max_iterations);
            snap(&mut probabilities, config.fallback_snap_atol, config.snap_rtol);

            if probabilities.iter().any(|&p| p > 1.0) {
                error!(
                    matrix = ?system.matrix,
                    rhs = ?system.rhs,
                    ?probabilities,
                    "bounded solve still exceeds 1"
                );
                return Err(TurnError::Infeasible { probabilities });
            }
        }

        let residual = system.residual(&probabilities);
        trace!(?probabilities, residual, used_fallback, "solved class probabilities");

        Ok(Solution {
            probabilities,
            used_fallback,
            residual,
        })
    }
}

/// Snap values close to 0 or 1 onto exactly 0 or 1.
pub fn snap(probabilities: &mut [f64], atol: f64, rtol: f64) {
    for p in probabilities.iter_mut() {
        if p.abs() <= atol {
            *p = 0.0;
        } else if (*p - 1.0).abs() <= atol + rtol {
            *p = 1.0;
        }
    }
}

/// Write each class probability onto every member cell.
pub fn scatter(classes: &[CellClass], probabilities: &[f64], field: &mut ProbabilityField) {
    for (class, &p) in classes.iter().zip(probabilities) {
        for &cell in &class.cells {
            field.set(cell, p);
        }
    }
}
