//! Solver controls and their deck representation.
//!
//! ```text
//! *SOLVER, TOLERANCE=1e-6, MAX ITERATIONS=500, EPSILON=1e-12
//! *DOMINANCE, REQUIRE
//! PERMUTE
//! GREEDY SWAP
//! ```
//!
//! Missing cards or parameters keep their defaults. Each card may appear at
//! most once. A `*DOMINANCE` card with no data lines disables enforcement; the
//! system is only checked.

use gs_inp::{Card, Deck};

use crate::dominance::DEFAULT_DOMINANCE_EPSILON;
use crate::enforce::DominanceStrategy;
use crate::error::{Result, SolverError};
use crate::gauss_seidel::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};

pub const SOLVER_CARD: &str = "SOLVER";
pub const DOMINANCE_CARD: &str = "DOMINANCE";

/// Solver configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Convergence tolerance on the largest per-sweep change
    pub tolerance: f64,
    /// Maximum number of sweeps
    pub max_iterations: usize,
    /// Slack for the dominance test
    pub dominance_epsilon: f64,
    /// Strategies tried in order when the input is not dominant
    pub strategies: Vec<DominanceStrategy>,
    /// Fail instead of solving a system that could not be made dominant
    pub require_dominance: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            dominance_epsilon: DEFAULT_DOMINANCE_EPSILON,
            strategies: vec![DominanceStrategy::Permute, DominanceStrategy::GreedySwap],
            require_dominance: false,
        }
    }
}

impl SolverConfig {
    pub fn from_deck(deck: &Deck) -> Result<Self> {
        let mut config = Self::default();

        if let Some(card) = single_card(deck, SOLVER_CARD)? {
            if let Some(raw) = card.parameter("TOLERANCE") {
                config.tolerance = gs_model::validate_tolerance(parse_param("TOLERANCE", raw)?)?;
            }
            if let Some(raw) = card.parameter("MAX ITERATIONS") {
                config.max_iterations = parse_param("MAX ITERATIONS", raw)?;
            }
            if let Some(raw) = card.parameter("EPSILON") {
                config.dominance_epsilon = parse_param("EPSILON", raw)?;
            }
        }

        if let Some(card) = single_card(deck, DOMINANCE_CARD)? {
            config.require_dominance = card.has_flag("REQUIRE");
            config.strategies = card
                .data_lines
                .iter()
                .map(|line| line.trim_end_matches(',').parse::<DominanceStrategy>())
                .collect::<Result<Vec<_>>>()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SolverError::Config(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(SolverError::Config(
                "max iterations must be at least 1".to_string(),
            ));
        }
        if !(self.dominance_epsilon.is_finite() && self.dominance_epsilon >= 0.0) {
            return Err(SolverError::Config(format!(
                "dominance epsilon must be non-negative, got {}",
                self.dominance_epsilon
            )));
        }
        Ok(())
    }
}

fn single_card<'a>(deck: &'a Deck, keyword: &str) -> Result<Option<&'a Card>> {
    let mut cards = deck.cards_named(keyword);
    let first = cards.next();
    if let Some(extra) = cards.next() {
        return Err(SolverError::Config(format!(
            "*{keyword} given more than once (again at line {})",
            extra.line_start
        )));
    }
    Ok(first)
}

fn parse_param<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| SolverError::Config(format!("{key}={raw} is not a valid value")))
}
