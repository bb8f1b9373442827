//! Gauss-Seidel solver for small dense linear systems.
//!
//! The crate is organised in the order data flows through it:
//!
//! - [`dominance`]: strict diagonal dominance test
//! - [`enforce`]: row permutation, greedy swap and diagonal boost strategies
//! - [`gauss_seidel`]: the iteration itself, producing a per-sweep [`Trace`]
//! - [`pipeline`]: the three stages driven by a [`SolverConfig`]
//!
//! All functions take their inputs by reference and work on copies, so the
//! caller's matrices are never modified and concurrent calls never interact.

pub mod config;
pub mod dominance;
pub mod enforce;
pub mod error;
pub mod gauss_seidel;
pub mod pipeline;
pub mod trace;

pub use config::SolverConfig;
pub use dominance::{
    DEFAULT_DOMINANCE_EPSILON, failing_rows, is_strictly_dominant, is_strictly_dominant_default,
    off_diagonal_sum,
};
pub use enforce::{
    DominanceEnforcer, DominanceStrategy, EnforcedSystem, MAX_PERMUTATION_ORDER, enforce_dominance,
    permute_rows,
};
pub use error::{Result, SolverError};
pub use gauss_seidel::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, gauss_seidel};
pub use pipeline::{DominanceState, SolvePipeline, SolveReport};
pub use trace::{CompactSolution, ConvergenceStatus, IterationRecord, SolveOutcome, Trace};
