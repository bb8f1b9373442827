//! Error types for gs-solver

use gs_model::InputError;
use thiserror::Error;

use crate::enforce::DominanceStrategy;

pub type Result<T> = std::result::Result<T, SolverError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("zero diagonal entry in row {row}")]
    ZeroDiagonal { row: usize },

    #[error("{strategy} could not make the matrix strictly diagonally dominant")]
    EnforcementFailed { strategy: DominanceStrategy },

    #[error("matrix is not strictly diagonally dominant: {0}")]
    NotDominant(String),

    #[error("permutation search is limited to {max}x{max} systems, got {size}x{size}")]
    PermutationLimit { size: usize, max: usize },

    #[error("did not converge in {iterations} iterations (last max delta = {final_delta:.3e})")]
    NotConverged { iterations: usize, final_delta: f64 },

    #[error("iteration diverged at step {iteration}")]
    Diverged { iteration: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Input(#[from] InputError),
}
