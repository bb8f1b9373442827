use std::fs;
use std::path::Path;

use gs_solver::{ConvergenceStatus, DominanceState, IterationRecord, SolveReport};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// JSON-serializable record of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub schema_version: u32,
    pub input: String,
    pub generated_at: String,
    pub dominance: DominanceState,
    pub row_order: Vec<usize>,
    pub boosted_rows: Vec<usize>,
    /// Rows of the matrix that was iterated on.
    pub matrix: Vec<Vec<f64>>,
    pub rhs: Vec<f64>,
    pub status: ConvergenceStatus,
    pub tolerance: f64,
    pub iterations: usize,
    pub solution: Vec<f64>,
    pub final_delta: Option<f64>,
    pub trace: Vec<IterationRecord>,
}

impl RunReport {
    pub fn from_solve(
        input: impl Into<String>,
        generated_at: impl Into<String>,
        report: &SolveReport,
    ) -> Self {
        let outcome = &report.outcome;
        let matrix = (0..report.matrix.nrows())
            .map(|i| report.matrix.row(i).iter().copied().collect())
            .collect();
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            input: input.into(),
            generated_at: generated_at.into(),
            dominance: report.dominance,
            row_order: report.row_order.clone(),
            boosted_rows: report.boosted_rows.clone(),
            matrix,
            rhs: report.rhs.iter().copied().collect(),
            status: outcome.status,
            tolerance: outcome.tolerance,
            iterations: outcome.iterations(),
            solution: outcome.solution().map(<[f64]>::to_vec).unwrap_or_default(),
            final_delta: outcome.final_delta(),
            trace: outcome.trace.clone(),
        }
    }
}

pub fn write_report(path: impl AsRef<Path>, report: &RunReport) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let bytes = serde_json::to_vec_pretty(report)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn load_report(path: impl AsRef<Path>) -> Result<RunReport> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
