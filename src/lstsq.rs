//! Bounded linear least squares.
//!
//! Minimises `‖A·x − b‖` subject to `0 ≤ x ≤ upper` with an active-set
//! method (Lawson–Hanson, extended to an optional upper bound). Each
//! free-set subproblem is solved through its normal equations with
//! Gaussian elimination; columns that are linearly dependent on the
//! others get pinned to zero.

/// Gradient components below this are treated as converged.
const EPS: f64 = 1e-10;
/// Pivot threshold, relative to the largest entry of the normal matrix.
const EPS_TINY: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bound {
    Free,
    Lower,
    Upper,
}

/// Solve `min ‖A·x − b‖` with `x ≥ 0` and, if given, `x ≤ upper`.
///
/// `matrix` is row-major with every row the same length. Stops after
/// `max_iterations` outer iterations and returns the best point so far.
pub fn bounded_least_squares(
    matrix: &[Vec<f64>],
    rhs: &[f64],
    upper: Option<f64>,
    max_iterations: usize,
) -> Vec<f64> {
    let n = matrix.first().map_or(0, Vec::len);
    let mut x = vec![0.0; n];
    if n == 0 {
        return x;
    }

    let upper_bound = upper.unwrap_or(f64::INFINITY);
    let mut bounds = vec![Bound::Lower; n];
    // Variables that could not leave their bound without moving `x`.
    let mut blocked = vec![false; n];

    for _ in 0..max_iterations {
        let gradient = negative_gradient(matrix, rhs, &x);

        let mut entering = None;
        let mut best_gain = EPS;
        for j in 0..n {
            if blocked[j] {
                continue;
            }
            let gain = match bounds[j] {
                Bound::Free => continue,
                Bound::Lower => gradient[j],
                Bound::Upper => -gradient[j],
            };
            if gain > best_gain {
                best_gain = gain;
                entering = Some(j);
            }
        }
        let Some(j) = entering else {
            break;
        };

        let before = x.clone();
        let previous_bound = bounds[j];
        bounds[j] = Bound::Free;

        loop {
            let free: Vec<usize> = (0..n).filter(|&i| bounds[i] == Bound::Free).collect();
            if free.is_empty() {
                break;
            }
            let z = solve_free(matrix, rhs, &x, &bounds);

            // Longest step along x -> z that stays inside the box, and the
            // variables that limit it.
            let mut alpha: f64 = 1.0;
            let mut limiting: Vec<usize> = Vec::new();
            for &i in &free {
                let step = if z[i] < 0.0 {
                    x[i] / (x[i] - z[i])
                } else if z[i] > upper_bound {
                    (upper_bound - x[i]) / (z[i] - x[i])
                } else {
                    continue;
                };
                if step < alpha - EPS_TINY {
                    alpha = step;
                    limiting.clear();
                    limiting.push(i);
                } else if step <= alpha + EPS_TINY {
                    limiting.push(i);
                }
            }

            if limiting.is_empty() {
                for &i in &free {
                    if z[i] <= 0.0 {
                        x[i] = 0.0;
                        bounds[i] = Bound::Lower;
                    } else if z[i] >= upper_bound {
                        x[i] = upper_bound;
                        bounds[i] = Bound::Upper;
                    } else {
                        x[i] = z[i];
                    }
                }
                break;
            }

            for &i in &free {
                x[i] += alpha * (z[i] - x[i]);
            }
            for &i in &limiting {
                if z[i] < 0.0 {
                    x[i] = 0.0;
                    bounds[i] = Bound::Lower;
                } else {
                    x[i] = upper_bound;
                    bounds[i] = Bound::Upper;
                }
            }
        }

        if x == before {
            if bounds[j] == Bound::Free {
                bounds[j] = previous_bound;
            }
            blocked[j] = true;
        } else {
            blocked.iter_mut().for_each(|b| *b = false);
        }
    }

    x
}

/// `Aᵀ(b − A·x)`.
fn negative_gradient(matrix: &[Vec<f64>], rhs: &[f64], x: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut gradient = vec![0.0; n];
    for (row, &b) in matrix.iter().zip(rhs) {
        let residual = b - row.iter().zip(x).map(|(a, v)| a * v).sum::<f64>();
        for j in 0..n {
            gradient[j] += row[j] * residual;
        }
    }
    gradient
}

/// Unconstrained least squares over the free variables, bound variables held fixed.
///
/// Returns a full-length vector; entries of bound variables are copied from `x`.
fn solve_free(matrix: &[Vec<f64>], rhs: &[f64], x: &[f64], bounds: &[Bound]) -> Vec<f64> {
    let free: Vec<usize> = (0..x.len()).filter(|&i| bounds[i] == Bound::Free).collect();
    let k = free.len();

    // Right-hand side with the bound variables' contribution moved over.
    let reduced: Vec<f64> = matrix
        .iter()
        .zip(rhs)
        .map(|(row, &b)| {
            b - (0..x.len())
                .filter(|&i| bounds[i] != Bound::Free)
                .map(|i| row[i] * x[i])
                .sum::<f64>()
        })
        .collect();

    // Augmented normal equations [AᵀA | Aᵀr] restricted to the free columns.
    let mut normal = vec![vec![0.0; k + 1]; k];
    for (row, &r) in matrix.iter().zip(&reduced) {
        for (a, &fa) in free.iter().enumerate() {
            let ra = row[fa];
            if ra == 0.0 {
                continue;
            }
            for (b, &fb) in free.iter().enumerate() {
                normal[a][b] += ra * row[fb];
            }
            normal[a][k] += ra * r;
        }
    }

    let pivots = compute_rref(&mut normal, k, k);

    let mut z = x.to_vec();
    for &i in &free {
        z[i] = 0.0;
    }
    for (r, lead) in pivots.into_iter().enumerate() {
        z[free[lead]] = normal[r][k];
    }
    z
}

/// Compute Reduced Row Echelon Form (RREF) in-place with partial pivoting.
///
/// `matrix` is `m × (n + 1)`, the last column being the right-hand side.
/// Returns the pivot column of each leading row; columns without a pivot
/// are linearly dependent on earlier ones.
fn compute_rref(matrix: &mut [Vec<f64>], m: usize, n: usize) -> Vec<usize> {
    let scale = matrix
        .iter()
        .flat_map(|row| row[..n].iter())
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    let threshold = EPS_TINY * scale.max(1.0);

    let mut pivots = Vec::new();
    let mut r = 0usize;

    for lead in 0..n {
        if r == m {
            break;
        }

        let Some(i) = (r..m).max_by(|&a, &b| matrix[a][lead].abs().total_cmp(&matrix[b][lead].abs()))
        else {
            break;
        };
        if matrix[i][lead].abs() < threshold {
            continue;
        }
        matrix.swap(i, r);

        // Normalize pivot row
        let inv = 1.0 / matrix[r][lead];
        for j in 0..=n {
            matrix[r][j] *= inv;
        }

        // Eliminate all other rows
        for k in 0..m {
            if k != r {
                let factor = matrix[k][lead];
                if factor != 0.0 {
                    for j in 0..=n {
                        matrix[k][j] -= factor * matrix[r][j];
                    }
                }
            }
        }

        pivots.push(lead);
        r += 1;
    }

    pivots
}
