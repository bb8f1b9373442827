//! Dominance enforcement strategies.
//!
//! When a system fails the dominance test, one of these strategies may be
//! able to rearrange it into a form Gauss-Seidel is guaranteed to converge on:
//!
//! - **Permute**: exhaustive search over row orders. Equations are unchanged,
//!   only their order. Cost is `n!` dominance checks, so it is capped at
//!   [`MAX_PERMUTATION_ORDER`] unknowns.
//! - **GreedySwap**: single pass over the rows, swapping in a lower row that
//!   dominates the current column. Cheap, but may miss orders the
//!   exhaustive search would find.
//! - **DiagonalBoost**: GreedySwap, then any row still not dominant has its
//!   diagonal overwritten with `sum(|off-diagonal|) + 1`, or a wider margin
//!   when the epsilon or the size of the sum requires one. Rows are tested
//!   against the configured epsilon, so the result is always dominant. This
//!   changes the equations being solved and is never selected implicitly.
//!
//! Every strategy works on copies; the caller's matrix and vector are never
//! modified. A strategy either returns a strictly dominant system or
//! [`SolverError::EnforcementFailed`], never a partially fixed one.

use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::dominance::{
    DEFAULT_DOMINANCE_EPSILON, is_strictly_dominant, off_diagonal_sum, row_dominates_at,
};
use crate::error::{Result, SolverError};

/// Largest system the permutation search will accept (8! = 40320 orders).
pub const MAX_PERMUTATION_ORDER: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DominanceStrategy {
    Permute,
    GreedySwap,
    DiagonalBoost,
}

impl DominanceStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            DominanceStrategy::Permute => "PERMUTE",
            DominanceStrategy::GreedySwap => "GREEDY SWAP",
            DominanceStrategy::DiagonalBoost => "DIAGONAL BOOST",
        }
    }

    /// Whether the strategy may change coefficient values.
    pub fn alters_coefficients(self) -> bool {
        matches!(self, DominanceStrategy::DiagonalBoost)
    }
}

impl fmt::Display for DominanceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DominanceStrategy {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        match gs_inp::normalize_keyword(s).as_str() {
            "PERMUTE" | "PERMUTATION" => Ok(DominanceStrategy::Permute),
            "GREEDYSWAP" | "GREEDY" | "SWAP" => Ok(DominanceStrategy::GreedySwap),
            "DIAGONALBOOST" | "BOOST" => Ok(DominanceStrategy::DiagonalBoost),
            other => Err(SolverError::Config(format!(
                "unknown dominance strategy '{other}'"
            ))),
        }
    }
}

/// A system rearranged (and possibly adjusted) to be strictly dominant.
#[derive(Debug, Clone, PartialEq)]
pub struct EnforcedSystem {
    pub matrix: DMatrix<f64>,
    pub rhs: DVector<f64>,
    /// `row_order[i]` is the index of the input row now at position `i`.
    pub row_order: Vec<usize>,
    /// Positions whose diagonal was overwritten (DiagonalBoost only).
    pub boosted_rows: Vec<usize>,
    pub strategy: DominanceStrategy,
}

impl EnforcedSystem {
    pub fn into_parts(self) -> (DMatrix<f64>, DVector<f64>) {
        (self.matrix, self.rhs)
    }

    pub fn is_reordered(&self) -> bool {
        self.row_order.iter().enumerate().any(|(i, &r)| i != r)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DominanceEnforcer {
    epsilon: f64,
}

impl Default for DominanceEnforcer {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_DOMINANCE_EPSILON,
        }
    }
}

impl DominanceEnforcer {
    /// `epsilon` is the slack used for the final dominance test.
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn enforce(
        &self,
        a: &DMatrix<f64>,
        b: &DVector<f64>,
        strategy: DominanceStrategy,
    ) -> Result<EnforcedSystem> {
        check_dimensions(a, b)?;
        match strategy {
            DominanceStrategy::Permute => self.permute(a, b),
            DominanceStrategy::GreedySwap => self.greedy(a, b, false),
            DominanceStrategy::DiagonalBoost => self.greedy(a, b, true),
        }
    }

    fn permute(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> Result<EnforcedSystem> {
        let n = a.nrows();
        if n > MAX_PERMUTATION_ORDER {
            return Err(SolverError::PermutationLimit {
                size: n,
                max: MAX_PERMUTATION_ORDER,
            });
        }

        let mut order: Vec<usize> = (0..n).collect();
        loop {
            let candidate = permute_rows(a, &order);
            if is_strictly_dominant(&candidate, self.epsilon) {
                log::debug!("row order {order:?} is strictly dominant");
                return Ok(EnforcedSystem {
                    matrix: candidate,
                    rhs: DVector::from_fn(n, |i, _| b[order[i]]),
                    row_order: order,
                    boosted_rows: Vec::new(),
                    strategy: DominanceStrategy::Permute,
                });
            }
            if !next_permutation(&mut order) {
                break;
            }
        }

        Err(SolverError::EnforcementFailed {
            strategy: DominanceStrategy::Permute,
        })
    }

    fn greedy(&self, a: &DMatrix<f64>, b: &DVector<f64>, boost: bool) -> Result<EnforcedSystem> {
        let n = a.nrows();
        let strategy = if boost {
            DominanceStrategy::DiagonalBoost
        } else {
            DominanceStrategy::GreedySwap
        };

        let mut matrix = a.clone();
        let mut rhs = b.clone();
        let mut row_order: Vec<usize> = (0..n).collect();
        let mut boosted_rows = Vec::new();

        // Boost mode tests rows with the final slack; plain swapping uses none.
        let local_epsilon = if boost { self.epsilon } else { 0.0 };

        for i in 0..n {
            if row_dominates_at(&matrix, i, i, local_epsilon) {
                continue;
            }
            if let Some(k) = (i + 1..n).find(|&k| row_dominates_at(&matrix, k, i, local_epsilon)) {
                matrix.swap_rows(i, k);
                rhs.swap_rows(i, k);
                row_order.swap(i, k);
                log::debug!("swapped rows {i} and {k}");
            }
            if boost && !row_dominates_at(&matrix, i, i, local_epsilon) {
                let boosted = boosted_diagonal(off_diagonal_sum(&matrix, i, i), self.epsilon);
                log::warn!(
                    "boosting diagonal of row {i} from {} to {boosted}",
                    matrix[(i, i)]
                );
                matrix[(i, i)] = boosted;
                boosted_rows.push(i);
            }
        }

        if !is_strictly_dominant(&matrix, self.epsilon) {
            return Err(SolverError::EnforcementFailed { strategy });
        }

        Ok(EnforcedSystem {
            matrix,
            rhs,
            row_order,
            boosted_rows,
            strategy,
        })
    }
}

/// Diagonal value for a boosted row: `off + 1`, widened when `epsilon` or
/// the rounding of `off` would swallow a unit margin.
fn boosted_diagonal(off: f64, epsilon: f64) -> f64 {
    let margin = 1.0_f64
        .max(2.0 * epsilon)
        .max(4.0 * f64::EPSILON * off);
    off + margin
}

/// Enforces dominance with the default epsilon.
pub fn enforce_dominance(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    strategy: DominanceStrategy,
) -> Result<EnforcedSystem> {
    DominanceEnforcer::default().enforce(a, b, strategy)
}

/// New matrix whose row `i` is row `order[i]` of `a`.
pub fn permute_rows(a: &DMatrix<f64>, order: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(order.len(), a.ncols(), |i, j| a[(order[i], j)])
}

/// Advances `order` to the next permutation in lexicographic order.
/// Returns `false` (leaving `order` untouched) when it is already the last one.
pub fn next_permutation(order: &mut [usize]) -> bool {
    let n = order.len();
    if n < 2 {
        return false;
    }
    let Some(pivot) = (0..n - 1).rev().find(|&i| order[i] < order[i + 1]) else {
        return false;
    };
    let successor = (pivot + 1..n)
        .rev()
        .find(|&j| order[j] > order[pivot])
        .unwrap_or(pivot + 1);
    order.swap(pivot, successor);
    order[pivot + 1..].reverse();
    true
}

fn check_dimensions(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<()> {
    if a.nrows() == 0 || !a.is_square() {
        return Err(SolverError::InvalidDimension(format!(
            "matrix must be square and non-empty, got {}x{}",
            a.nrows(),
            a.ncols()
        )));
    }
    if b.len() != a.nrows() {
        return Err(SolverError::InvalidDimension(format!(
            "right-hand side has {} entries for a {}x{} matrix",
            b.len(),
            a.nrows(),
            a.ncols()
        )));
    }
    Ok(())
}
