//! Behavioural properties of the checker, enforcer and solver.

use gs_solver::dominance::row_dominates_at;
use gs_solver::enforce::next_permutation;
use gs_solver::{
    ConvergenceStatus, DEFAULT_DOMINANCE_EPSILON, DominanceStrategy, SolverError,
    enforce_dominance, gauss_seidel, is_strictly_dominant, permute_rows,
};
use nalgebra::{DMatrix, DVector};

fn from_rows(rows: &[&[f64]]) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), rows[0].len(), |i, j| rows[i][j])
}

fn all_orders(n: usize) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..n).collect();
    let mut out = vec![order.clone()];
    while next_permutation(&mut order) {
        out.push(order.clone());
    }
    out
}

#[test]
fn dominant_system_converges_to_known_solution() {
    let a = from_rows(&[&[10.0, 1.0, 1.0], &[1.0, 10.0, 1.0], &[1.0, 1.0, 10.0]]);
    let b = DVector::from_vec(vec![12.0, 12.0, 12.0]);
    let outcome = gauss_seidel(&a, &b, &DVector::zeros(3), 1e-6, 100).expect("valid input");

    assert_eq!(outcome.status, ConvergenceStatus::Converged);
    let x = outcome.solution().expect("non-empty trace");
    for v in x {
        assert!((v - 1.0).abs() < 1e-5, "expected 1.0, got {v}");
    }

    // Contraction: the tail of the delta sequence shrinks.
    let deltas: Vec<f64> = outcome.trace.iter().map(|r| r.max_delta).collect();
    let tail = &deltas[deltas.len().saturating_sub(4)..];
    assert!(tail.windows(2).all(|w| w[1] <= w[0]), "{deltas:?}");
}

#[test]
fn row_verdicts_travel_with_their_rows() {
    // Each row is judged against its own coefficient for its unknown. Moving a
    // row moves that verdict with it, so the set of passing equations is
    // unchanged by any reordering.
    let matrices = [
        from_rows(&[&[10.0, 1.0, 1.0], &[1.0, 10.0, 1.0], &[1.0, 1.0, 10.0]]),
        from_rows(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], &[7.0, 8.0, 9.0]]),
        from_rows(&[&[5.0, -1.0, 2.0], &[0.5, 3.0, 1.0], &[-1.0, 1.0, 4.0]]),
    ];
    for a in &matrices {
        let passing = |m: &DMatrix<f64>, order: &[usize]| -> Vec<usize> {
            let mut rows: Vec<usize> = (0..3)
                .filter(|&i| row_dominates_at(m, i, order[i], DEFAULT_DOMINANCE_EPSILON))
                .map(|i| order[i])
                .collect();
            rows.sort_unstable();
            rows
        };
        let identity = [0, 1, 2];
        for order in all_orders(3) {
            assert_eq!(passing(&permute_rows(a, &order), &order), passing(a, &identity));
        }
    }
}

#[test]
fn reversing_a_dominant_matrix_moves_its_diagonal() {
    let a = from_rows(&[&[10.0, 1.0, 1.0], &[1.0, 10.0, 1.0], &[1.0, 1.0, 10.0]]);
    assert!(is_strictly_dominant(&a, DEFAULT_DOMINANCE_EPSILON));
    assert!(!is_strictly_dominant(&permute_rows(&a, &[2, 1, 0]), DEFAULT_DOMINANCE_EPSILON));
}

#[test]
fn permutation_output_is_a_reordering_of_input_rows() {
    let a = from_rows(&[&[2.0, 9.0, 1.0], &[1.0, 1.0, 7.0], &[8.0, 1.0, 2.0]]);
    let b = DVector::from_vec(vec![12.0, 9.0, 11.0]);
    let enforced = enforce_dominance(&a, &b, DominanceStrategy::Permute).expect("dominant order exists");

    for (i, &source) in enforced.row_order.iter().enumerate() {
        assert_eq!(enforced.matrix.row(i), a.row(source));
        assert_eq!(enforced.rhs[i], b[source]);
    }
    let mut sorted = enforced.row_order.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![0, 1, 2]);
}

#[test]
fn singular_pattern_has_no_dominant_permutation() {
    let a = from_rows(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], &[7.0, 8.0, 9.0]]);
    let b = DVector::from_vec(vec![1.0, 1.0, 1.0]);

    // Exhaustive confirmation, independent of the enforcer.
    assert!(
        all_orders(3)
            .iter()
            .all(|order| !is_strictly_dominant(&permute_rows(&a, order), 0.0))
    );
    assert_eq!(
        enforce_dominance(&a, &b, DominanceStrategy::Permute),
        Err(SolverError::EnforcementFailed {
            strategy: DominanceStrategy::Permute
        })
    );
}

#[test]
fn zero_rhs_converges_to_zero_with_zero_safe_error() {
    let a = from_rows(&[&[5.0, 1.0, 1.0], &[1.0, 5.0, 1.0], &[1.0, 1.0, 5.0]]);
    let b = DVector::zeros(3);
    let x0 = DVector::from_element(3, 1.0);
    let outcome = gauss_seidel(&a, &b, &x0, 1e-9, 500).expect("valid input");

    assert!(outcome.converged());
    assert!(outcome.solution().unwrap().iter().all(|v| v.abs() < 1e-8));
    assert!(outcome.trace.iter().all(|r| r.relative_error.is_finite()));
}

#[test]
fn repeated_solves_are_identical() {
    let a = from_rows(&[&[4.0, -1.0, 0.5], &[-1.0, 5.0, 2.0], &[0.5, 2.0, 6.0]]);
    let b = DVector::from_vec(vec![3.0, -2.0, 7.0]);
    let x0 = DVector::from_vec(vec![0.1, 0.2, 0.3]);

    let first = gauss_seidel(&a, &b, &x0, 1e-10, 200).expect("valid input");
    let second = gauss_seidel(&a, &b, &x0, 1e-10, 200).expect("valid input");
    assert_eq!(first, second);
}

#[test]
fn strategies_never_touch_caller_data() {
    let a = from_rows(&[&[1.0, 5.0, 1.0], &[6.0, 1.0, 1.0], &[1.0, 1.0, 4.0]]);
    let b = DVector::from_vec(vec![7.0, 8.0, 6.0]);
    let (a_before, b_before) = (a.clone(), b.clone());

    for strategy in [
        DominanceStrategy::Permute,
        DominanceStrategy::GreedySwap,
        DominanceStrategy::DiagonalBoost,
    ] {
        let _ = enforce_dominance(&a, &b, strategy);
        assert_eq!(a, a_before);
        assert_eq!(b, b_before);
    }
}
