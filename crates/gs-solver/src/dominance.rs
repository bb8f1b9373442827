//! Strict diagonal dominance test.
//!
//! Row `i` is strictly dominant when `|a_ii| > sum_{j != i} |a_ij| + epsilon`.
//! The matrix is strictly dominant when every row is. The test is row-local:
//! a row's verdict depends only on its own entries and which column is its
//! diagonal, so when rows are reordered each verdict moves with its row. The
//! matrix-level answer can change, since a moved row meets a new diagonal.

use nalgebra::DMatrix;

/// Slack used when no epsilon is given, so values sitting exactly on the
/// boundary after rounding are not reported as dominant.
pub const DEFAULT_DOMINANCE_EPSILON: f64 = 1e-10;

/// Sum of `|a[row][j]|` over every column except `col`.
pub fn off_diagonal_sum(a: &DMatrix<f64>, row: usize, col: usize) -> f64 {
    a.row(row)
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != col)
        .map(|(_, v)| v.abs())
        .sum()
}

/// Whether `row` would be strictly dominant if column `col` were its diagonal.
pub fn row_dominates_at(a: &DMatrix<f64>, row: usize, col: usize, epsilon: f64) -> bool {
    a[(row, col)].abs() > off_diagonal_sum(a, row, col) + epsilon
}

/// Returns `true` when every row of `a` is strictly dominant.
///
/// A zero diagonal simply fails its row. Empty and non-square matrices are
/// never dominant.
pub fn is_strictly_dominant(a: &DMatrix<f64>, epsilon: f64) -> bool {
    if a.nrows() == 0 || !a.is_square() {
        return false;
    }
    (0..a.nrows()).all(|i| row_dominates_at(a, i, i, epsilon))
}

pub fn is_strictly_dominant_default(a: &DMatrix<f64>) -> bool {
    is_strictly_dominant(a, DEFAULT_DOMINANCE_EPSILON)
}

/// Indices of the rows that fail the dominance test.
pub fn failing_rows(a: &DMatrix<f64>, epsilon: f64) -> Vec<usize> {
    if !a.is_square() {
        return (0..a.nrows()).collect();
    }
    (0..a.nrows())
        .filter(|&i| !row_dominates_at(a, i, i, epsilon))
        .collect()
}
