//! Check, enforce, solve.
//!
//! The pipeline runs the three stages on a validated [`SystemDefinition`]:
//!
//! 1. dominance check on the input matrix,
//! 2. if it fails, each configured strategy in order until one succeeds,
//! 3. Gauss-Seidel on whichever system came out of stage 2.
//!
//! If no strategy works the pipeline either stops with the last
//! [`SolverError::EnforcementFailed`] (`require_dominance`; with no strategies
//! configured the error is [`SolverError::NotDominant`]) or solves the
//! input system as given and records [`DominanceState::NotDominant`], in which case
//! convergence is possible but not guaranteed.

use gs_model::SystemDefinition;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::dominance::{failing_rows, is_strictly_dominant};
use crate::enforce::{DominanceEnforcer, DominanceStrategy, EnforcedSystem};
use crate::error::{Result, SolverError};
use crate::gauss_seidel::gauss_seidel;
use crate::trace::SolveOutcome;

/// How the solved system relates to the input system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DominanceState {
    /// Input was strictly dominant as given.
    AlreadyDominant,
    /// A strategy produced a strictly dominant system.
    Enforced(DominanceStrategy),
    /// Solved as given without a convergence guarantee.
    NotDominant,
}

impl DominanceState {
    pub fn is_dominant(self) -> bool {
        !matches!(self, DominanceState::NotDominant)
    }

    pub fn describe(self) -> String {
        match self {
            DominanceState::AlreadyDominant => "strictly dominant as given".to_string(),
            DominanceState::Enforced(strategy) => format!("made dominant by {strategy}"),
            DominanceState::NotDominant => "not diagonally dominant".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub dominance: DominanceState,
    /// The matrix actually iterated on.
    pub matrix: DMatrix<f64>,
    /// The right-hand side matching `matrix`.
    pub rhs: DVector<f64>,
    /// `row_order[i]` is the input row used as equation `i`.
    pub row_order: Vec<usize>,
    pub boosted_rows: Vec<usize>,
    pub outcome: SolveOutcome,
}

/// Main pipeline orchestrator
#[derive(Debug, Clone, Default)]
pub struct SolvePipeline {
    config: SolverConfig,
}

impl SolvePipeline {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn run(&self, system: &SystemDefinition) -> Result<SolveReport> {
        self.config.validate()?;

        let n = system.size();
        let a = DMatrix::from_row_iterator(n, n, system.coefficients());
        let b = DVector::from_column_slice(system.rhs());
        let x0 = DVector::from_column_slice(system.initial_guess());

        let (dominance, enforced) = self.establish_dominance(&a, &b)?;
        let (matrix, rhs, row_order, boosted_rows) = match enforced {
            Some(EnforcedSystem {
                matrix,
                rhs,
                row_order,
                boosted_rows,
                ..
            }) => (matrix, rhs, row_order, boosted_rows),
            None => (a, b, (0..n).collect(), Vec::new()),
        };

        let outcome = gauss_seidel(
            &matrix,
            &rhs,
            &x0,
            self.config.tolerance,
            self.config.max_iterations,
        )?;
        log::info!(
            "{} after {} iterations ({})",
            outcome.status.as_str(),
            outcome.iterations(),
            dominance.describe()
        );

        Ok(SolveReport {
            dominance,
            matrix,
            rhs,
            row_order,
            boosted_rows,
            outcome,
        })
    }

    fn establish_dominance(
        &self,
        a: &DMatrix<f64>,
        b: &DVector<f64>,
    ) -> Result<(DominanceState, Option<EnforcedSystem>)> {
        let epsilon = self.config.dominance_epsilon;
        if is_strictly_dominant(a, epsilon) {
            log::debug!("input matrix is strictly diagonally dominant");
            return Ok((DominanceState::AlreadyDominant, None));
        }
        log::debug!("rows failing dominance: {:?}", failing_rows(a, epsilon));

        let enforcer = DominanceEnforcer::new(epsilon);
        let mut last_error = None;
        for &strategy in &self.config.strategies {
            match enforcer.enforce(a, b, strategy) {
                Ok(enforced) => {
                    if strategy.alters_coefficients() && !enforced.boosted_rows.is_empty() {
                        log::warn!(
                            "{strategy} changed the diagonal of rows {:?}; the solved system differs from the input",
                            enforced.boosted_rows
                        );
                    }
                    log::info!("row order after {strategy}: {:?}", enforced.row_order);
                    return Ok((DominanceState::Enforced(strategy), Some(enforced)));
                }
                Err(
                    err @ (SolverError::EnforcementFailed { .. }
                    | SolverError::PermutationLimit { .. }),
                ) => {
                    log::debug!("{err}");
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        if self.config.require_dominance {
            return Err(last_error.unwrap_or_else(|| {
                SolverError::NotDominant(
                    "dominance is required but no enforcement strategy is configured".to_string(),
                )
            }));
        }
        log::warn!("solving a system that is not diagonally dominant; convergence is not guaranteed");
        Ok((DominanceState::NotDominant, None))
    }
}
