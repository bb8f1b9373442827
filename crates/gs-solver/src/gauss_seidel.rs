//! Gauss-Seidel iteration for `A x = b`.
//!
//! Each sweep updates the unknowns in order and uses the values already
//! updated in the same sweep:
//!
//! ```text
//! x_new[i] = (b[i] - sum_{j<i} a_ij x_new[j] - sum_{j>i} a_ij x[j]) / a_ii
//! ```
//!
//! # Stopping rule
//!
//! The run stops as soon as `max_i |x_new[i] - x[i]| < tolerance`
//! ([`ConvergenceStatus::Converged`]), when the iteration cap is reached
//! ([`ConvergenceStatus::NotConverged`]), or when an unknown stops being
//! finite ([`ConvergenceStatus::Diverged`]).
//!
//! The per-record `relative_error` is the percentage change of the first
//! unknown only. It is kept for display and plays no part in stopping.
//!
//! # Example
//!
//! ```
//! use gs_solver::{gauss_seidel, ConvergenceStatus};
//! use nalgebra::{DMatrix, DVector};
//!
//! let a = DMatrix::from_row_slice(3, 3, &[10.0, 1.0, 1.0, 1.0, 10.0, 1.0, 1.0, 1.0, 10.0]);
//! let b = DVector::from_vec(vec![12.0, 12.0, 12.0]);
//! let x0 = DVector::zeros(3);
//!
//! let outcome = gauss_seidel(&a, &b, &x0, 1e-6, 100).unwrap();
//! assert_eq!(outcome.status, ConvergenceStatus::Converged);
//! ```

use nalgebra::{DMatrix, DVector};

use crate::error::{Result, SolverError};
use crate::trace::{ConvergenceStatus, IterationRecord, SolveOutcome};

pub const DEFAULT_TOLERANCE: f64 = 1e-4;
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Runs Gauss-Seidel from `x0` and returns the full trace.
///
/// # Errors
/// - [`SolverError::InvalidDimension`] if `a` is not square or `b`/`x0` do not match it
/// - [`SolverError::InvalidParameter`] for a non-positive tolerance or a zero iteration cap
/// - [`SolverError::ZeroDiagonal`] if any `a_ii` is exactly zero
///
/// All checks happen before the first sweep.
pub fn gauss_seidel(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    x0: &DVector<f64>,
    tolerance: f64,
    max_iterations: usize,
) -> Result<SolveOutcome> {
    let n = a.nrows();
    if n == 0 || !a.is_square() {
        return Err(SolverError::InvalidDimension(format!(
            "matrix must be square and non-empty, got {}x{}",
            a.nrows(),
            a.ncols()
        )));
    }
    if b.len() != n || x0.len() != n {
        return Err(SolverError::InvalidDimension(format!(
            "expected vectors of length {n}, got b = {} and x0 = {}",
            b.len(),
            x0.len()
        )));
    }
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(SolverError::InvalidParameter(format!(
            "tolerance must be positive, got {tolerance}"
        )));
    }
    if max_iterations == 0 {
        return Err(SolverError::InvalidParameter(
            "iteration cap must be at least 1".to_string(),
        ));
    }
    if let Some(row) = (0..n).find(|&i| a[(i, i)] == 0.0) {
        return Err(SolverError::ZeroDiagonal { row });
    }

    let mut x = x0.clone_owned();
    let mut trace = Vec::new();
    let mut status = ConvergenceStatus::NotConverged;

    for iteration in 0..max_iterations {
        let x_new = sweep(a, b, &x);

        if x_new.iter().any(|v| !v.is_finite()) {
            log::warn!("iterate became non-finite at sweep {iteration}");
            status = ConvergenceStatus::Diverged;
            break;
        }

        let max_delta = (&x_new - &x).amax();
        trace.push(IterationRecord {
            iteration,
            solution: x_new.iter().copied().collect(),
            relative_error: relative_error_percent(x_new[0], x[0]),
            max_delta,
        });

        if max_delta < tolerance {
            status = ConvergenceStatus::Converged;
            break;
        }
        x = x_new;
    }

    match status {
        ConvergenceStatus::Converged => {
            log::debug!("converged after {} sweeps", trace.len());
        }
        ConvergenceStatus::NotConverged => {
            log::debug!("iteration cap of {max_iterations} reached without convergence");
        }
        ConvergenceStatus::Diverged => {}
    }

    Ok(SolveOutcome {
        trace,
        status,
        tolerance,
    })
}

/// One in-place sweep over a copy of `x`.
fn sweep(a: &DMatrix<f64>, b: &DVector<f64>, x: &DVector<f64>) -> DVector<f64> {
    let n = a.nrows();
    let mut x_new = x.clone_owned();
    for i in 0..n {
        // x_new already holds this sweep's values for j < i and the previous
        // sweep's values for j > i.
        let sigma: f64 = (0..n)
            .filter(|&j| j != i)
            .map(|j| a[(i, j)] * x_new[j])
            .sum();
        x_new[i] = (b[i] - sigma) / a[(i, i)];
    }
    x_new
}

/// `|(new - old) / new| * 100`, or zero when `new` is zero.
pub fn relative_error_percent(new: f64, old: f64) -> f64 {
    if new != 0.0 {
        (((new - old) / new) * 100.0).abs()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system_3x3(rows: [[f64; 3]; 3], rhs: [f64; 3]) -> (DMatrix<f64>, DVector<f64>) {
        (
            DMatrix::from_fn(3, 3, |i, j| rows[i][j]),
            DVector::from_vec(rhs.to_vec()),
        )
    }

    #[test]
    fn converges_on_dominant_system() {
        let (a, b) = system_3x3(
            [[10.0, 1.0, 1.0], [1.0, 10.0, 1.0], [1.0, 1.0, 10.0]],
            [12.0, 12.0, 12.0],
        );
        let outcome = gauss_seidel(&a, &b, &DVector::zeros(3), 1e-6, 100).unwrap();

        assert_eq!(outcome.status, ConvergenceStatus::Converged);
        assert!(outcome.iterations() < 20);
        for v in outcome.solution().unwrap() {
            assert!((v - 1.0).abs() < 1e-5, "expected 1.0, got {v}");
        }
        assert!(outcome.final_delta().unwrap() < 1e-6);
    }

    #[test]
    fn first_sweep_uses_fresh_values() {
        let (a, b) = system_3x3(
            [[4.0, 1.0, 0.0], [1.0, 4.0, 1.0], [0.0, 1.0, 4.0]],
            [5.0, 6.0, 5.0],
        );
        let outcome = gauss_seidel(&a, &b, &DVector::zeros(3), 1e-12, 1).unwrap();
        let first = &outcome.trace[0];
        // x1 = 5/4, x2 = (6 - 1.25)/4, x3 = (5 - x2)/4
        assert!((first.solution[0] - 1.25).abs() < 1e-12);
        assert!((first.solution[1] - 1.1875).abs() < 1e-12);
        assert!((first.solution[2] - 0.953125).abs() < 1e-12);
        assert!((first.relative_error - 100.0).abs() < 1e-12);
        assert_eq!(first.iteration, 0);
    }

    #[test]
    fn zero_rhs_reports_zero_error() {
        let (a, b) = system_3x3(
            [[5.0, 1.0, 1.0], [1.0, 5.0, 1.0], [1.0, 1.0, 5.0]],
            [0.0, 0.0, 0.0],
        );
        let x0 = DVector::from_element(3, 1.0);
        let outcome = gauss_seidel(&a, &b, &x0, 1e-8, 200).unwrap();

        assert!(outcome.converged());
        for v in outcome.solution().unwrap() {
            assert!(v.abs() < 1e-7);
        }
        assert!(outcome.trace.iter().all(|r| r.relative_error.is_finite()));
        assert_eq!(relative_error_percent(0.0, 3.0), 0.0);
    }

    #[test]
    fn exhausting_the_cap_is_not_convergence() {
        let (a, b) = system_3x3(
            [[10.0, 1.0, 1.0], [1.0, 10.0, 1.0], [1.0, 1.0, 10.0]],
            [12.0, 12.0, 12.0],
        );
        let outcome = gauss_seidel(&a, &b, &DVector::zeros(3), 1e-14, 3).unwrap();
        assert_eq!(outcome.status, ConvergenceStatus::NotConverged);
        assert_eq!(outcome.trace.len(), 3);
        assert!(matches!(
            outcome.into_converged(),
            Err(SolverError::NotConverged { iterations: 3, .. })
        ));
    }

    #[test]
    fn zero_diagonal_is_an_error() {
        let (a, b) = system_3x3(
            [[1.0, 1.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0]],
            [1.0, 1.0, 1.0],
        );
        let err = gauss_seidel(&a, &b, &DVector::zeros(3), 1e-4, 10).unwrap_err();
        assert_eq!(err, SolverError::ZeroDiagonal { row: 1 });
    }

    #[test]
    fn divergence_stops_before_non_finite_values() {
        let (a, b) = system_3x3(
            [[1.0, 1e200, 0.0], [1e200, 1.0, 0.0], [0.0, 0.0, 1.0]],
            [1.0, 1.0, 1.0],
        );
        let outcome = gauss_seidel(&a, &b, &DVector::zeros(3), 1e-6, 50).unwrap();
        assert_eq!(outcome.status, ConvergenceStatus::Diverged);
        assert!(
            outcome
                .trace
                .iter()
                .all(|r| r.solution.iter().all(|v| v.is_finite()))
        );
    }

    #[test]
    fn rejects_bad_parameters() {
        let (a, b) = system_3x3(
            [[10.0, 1.0, 1.0], [1.0, 10.0, 1.0], [1.0, 1.0, 10.0]],
            [12.0, 12.0, 12.0],
        );
        let x0 = DVector::zeros(3);
        assert!(matches!(
            gauss_seidel(&a, &b, &x0, 0.0, 10),
            Err(SolverError::InvalidParameter(_))
        ));
        assert!(matches!(
            gauss_seidel(&a, &b, &x0, 1e-4, 0),
            Err(SolverError::InvalidParameter(_))
        ));
        assert!(matches!(
            gauss_seidel(&a, &b, &DVector::zeros(2), 1e-4, 10),
            Err(SolverError::InvalidDimension(_))
        ));
    }
}
