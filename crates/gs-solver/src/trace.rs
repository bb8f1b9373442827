//! Per-iteration trace and solve outcome.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Snapshot taken after one Gauss-Seidel sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Zero-based sweep index.
    pub iteration: usize,
    pub solution: Vec<f64>,
    /// Approximate relative error of the first unknown, in percent.
    /// Zero when the first unknown is exactly zero.
    pub relative_error: f64,
    /// Largest absolute change of any unknown during the sweep. This is what
    /// the stopping rule compares against the tolerance.
    pub max_delta: f64,
}

pub type Trace = Vec<IterationRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceStatus {
    /// The last sweep changed every unknown by less than the tolerance.
    Converged,
    /// The iteration cap was reached first.
    NotConverged,
    /// An unknown became infinite or NaN; the offending sweep is not recorded.
    Diverged,
}

impl ConvergenceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConvergenceStatus::Converged => "CONVERGED",
            ConvergenceStatus::NotConverged => "NOT CONVERGED",
            ConvergenceStatus::Diverged => "DIVERGED",
        }
    }
}

/// Final answer without the trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactSolution {
    pub solution: Vec<f64>,
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOutcome {
    pub trace: Trace,
    pub status: ConvergenceStatus,
    pub tolerance: f64,
}

impl SolveOutcome {
    pub fn converged(&self) -> bool {
        self.status == ConvergenceStatus::Converged
    }

    /// Number of recorded sweeps.
    pub fn iterations(&self) -> usize {
        self.trace.len()
    }

    pub fn last_record(&self) -> Option<&IterationRecord> {
        self.trace.last()
    }

    /// Latest iterate, or `None` when no sweep was recorded.
    pub fn solution(&self) -> Option<&[f64]> {
        self.last_record().map(|r| r.solution.as_slice())
    }

    pub fn final_delta(&self) -> Option<f64> {
        self.last_record().map(|r| r.max_delta)
    }

    /// Solution and sweep count, whatever the status.
    pub fn compact(&self) -> Option<CompactSolution> {
        self.last_record().map(|r| CompactSolution {
            solution: r.solution.clone(),
            iterations: self.iterations(),
        })
    }

    /// Compact solution if and only if the run converged.
    pub fn into_converged(self) -> Result<CompactSolution> {
        match self.status {
            ConvergenceStatus::Converged => self.compact().ok_or(SolverError::NotConverged {
                iterations: 0,
                final_delta: f64::INFINITY,
            }),
            ConvergenceStatus::NotConverged => Err(SolverError::NotConverged {
                iterations: self.iterations(),
                final_delta: self.final_delta().unwrap_or(f64::INFINITY),
            }),
            ConvergenceStatus::Diverged => Err(SolverError::Diverged {
                iteration: self.iterations(),
            }),
        }
    }
}
