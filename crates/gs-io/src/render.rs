//! Plain-text renderings of systems, traces and answers.

use gs_solver::{ConvergenceStatus, SolveOutcome, Trace};
use nalgebra::{DMatrix, DVector};

/// Column names for `n` unknowns: `X, Y, Z` up to three, `x1..xn` beyond.
pub fn unknown_names(n: usize) -> Vec<String> {
    if n <= 3 {
        ["X", "Y", "Z"][..n].iter().map(|s| s.to_string()).collect()
    } else {
        (1..=n).map(|i| format!("x{i}")).collect()
    }
}

/// One line per equation, `[a, b, c] = [d]`, four decimals.
pub fn format_system(matrix: &DMatrix<f64>, rhs: &DVector<f64>) -> String {
    matrix
        .row_iter()
        .zip(rhs.iter())
        .map(|(row, d)| format!("[{}] = [{d:.4}]\n", join_fixed(row.iter())))
        .collect()
}

/// Iteration table: index, each unknown to four decimals, error percentage.
pub fn format_trace_table(trace: &Trace, names: &[String]) -> String {
    const WIDTH: usize = 12;

    let header: String = names.iter().map(|name| format!(" | {name:>WIDTH$}")).collect();
    let rule_len = 5 + (names.len() + 1) * (WIDTH + 3);

    let mut out = format!("{:>5}{header} | {:>WIDTH$}\n", "Iter", "Error (%)");
    out.push_str(&"-".repeat(rule_len));
    out.push('\n');
    for record in trace {
        let cells: String = record
            .solution
            .iter()
            .map(|v| format!(" | {v:>WIDTH$.4}"))
            .collect();
        out.push_str(&format!(
            "{:>5}{cells} | {:>WIDTH$.4}\n",
            record.iteration, record.relative_error
        ));
    }
    out
}

/// Final answer block: `X = 1.0000` per unknown, then the sweep count.
pub fn format_solution(outcome: &SolveOutcome) -> String {
    let Some(compact) = outcome.compact() else {
        return format!("No iterations recorded ({})\n", outcome.status.as_str());
    };

    let names = unknown_names(compact.solution.len());
    let mut out: String = names
        .iter()
        .zip(&compact.solution)
        .map(|(name, v)| format!("{name} = {v:.4}\n"))
        .collect();
    out.push_str(&format!("Iterations: {}\n", compact.iterations));
    match outcome.status {
        ConvergenceStatus::Converged => {}
        ConvergenceStatus::NotConverged => out.push_str(&format!(
            "Warning: tolerance {:e} not reached (last change {:.3e})\n",
            outcome.tolerance,
            outcome.final_delta().unwrap_or(f64::NAN)
        )),
        ConvergenceStatus::Diverged => out.push_str(
            "Warning: iteration diverged; values above are the last finite iterate\n",
        ),
    }
    out
}

fn join_fixed<'a>(values: impl Iterator<Item = &'a f64>) -> String {
    values.map(|v| format!("{v:.4}")).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_solver::IterationRecord;

    fn outcome(status: ConvergenceStatus) -> SolveOutcome {
        SolveOutcome {
            trace: vec![
                IterationRecord {
                    iteration: 0,
                    solution: vec![1.2, 0.96, 0.984],
                    relative_error: 100.0,
                    max_delta: 1.2,
                },
                IterationRecord {
                    iteration: 1,
                    solution: vec![1.00560, 0.99104, 1.000336],
                    relative_error: 19.3317,
                    max_delta: 0.1944,
                },
            ],
            status,
            tolerance: 1e-4,
        }
    }

    #[test]
    fn names_small_and_large_systems() {
        assert_eq!(unknown_names(2), vec!["X", "Y"]);
        assert_eq!(unknown_names(4), vec!["x1", "x2", "x3", "x4"]);
    }

    #[test]
    fn renders_system_rows_with_rhs() {
        let a = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_vec(vec![1.0, 2.5]);
        assert_eq!(
            format_system(&a, &b),
            "[4.0000, 1.0000] = [1.0000]\n[1.0000, 3.0000] = [2.5000]\n"
        );
    }

    #[test]
    fn renders_trace_rows_to_four_decimals() {
        let table = format_trace_table(&outcome(ConvergenceStatus::Converged).trace, &unknown_names(3));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Iter"));
        assert!(lines[0].contains("Error (%)"));
        assert!(lines[2].contains("1.2000"));
        assert!(lines[2].contains("100.0000"));
        assert!(lines[3].contains("1.0056"));
        assert!(lines[3].contains("19.3317"));
    }

    #[test]
    fn renders_compact_solution() {
        let text = format_solution(&outcome(ConvergenceStatus::Converged));
        assert!(text.starts_with("X = 1.0056\nY = 0.9910\nZ = 1.0003\n"));
        assert!(text.contains("Iterations: 2"));
        assert!(!text.contains("Warning"));
    }

    #[test]
    fn flags_unconverged_answers() {
        let text = format_solution(&outcome(ConvergenceStatus::NotConverged));
        assert!(text.contains("Warning: tolerance"));
        assert!(text.contains("last change 1.944e-1"));
    }

    #[test]
    fn flags_diverged_answers_and_empty_traces() {
        let text = format_solution(&outcome(ConvergenceStatus::Diverged));
        assert!(text.ends_with("Warning: iteration diverged; values above are the last finite iterate\n"));

        let empty = SolveOutcome {
            trace: Vec::new(),
            status: ConvergenceStatus::Diverged,
            tolerance: 1e-4,
        };
        assert!(format_solution(&empty).starts_with("No iterations recorded"));
    }

    #[test]
    fn trace_table_rule_spans_every_column() {
        let table = format_trace_table(&Vec::new(), &unknown_names(2));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), lines[1].len());
    }
}
