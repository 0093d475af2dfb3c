//! Solver tuning parameters.

use serde::Deserialize;

/// Tolerances for snapping solved probabilities onto 0 and 1.
///
/// A value `p` snaps to target `t` when `|p − t| ≤ atol + rtol·|t|`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Absolute snapping tolerance after the non-negative solve.
    pub snap_atol: f64,

    /// Absolute snapping tolerance after the bounded fallback solve.
    pub fallback_snap_atol: f64,

    /// Relative snapping tolerance, applied in both cases.
    pub snap_rtol: f64,

    /// Outer iteration cap for each least-squares solve.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            snap_atol: 1e-8,
            fallback_snap_atol: 5e-3,
            snap_rtol: 1e-5,
            max_iterations: 500,
        }
    }
}

impl SolverConfig {
    /// A tight iteration cap for small unit-test boards.
    pub fn for_testing() -> Self {
        Self {
            max_iterations: 100,
            ..Self::default()
        }
    }
}
