//! Validated linear system definition extracted from a parsed deck.
//!
//! This is the input surface of the workspace: it turns raw card data into
//! numbers and rejects anything the solver must not see (non-numeric fields,
//! ragged or non-square matrices, zero diagonal entries, an all-zero matrix).

use gs_inp::{Card, Deck};
use thiserror::Error;

pub const MATRIX_CARD: &str = "MATRIX";
pub const RHS_CARD: &str = "RHS";
pub const INITIAL_GUESS_CARD: &str = "INITIAL GUESS";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("missing *{0} card")]
    MissingCard(&'static str),

    #[error("*{card} given more than once (again at line {line})")]
    DuplicateCard { card: &'static str, line: usize },

    #[error("line {line}: '{field}' is not a valid number")]
    NotNumeric { line: usize, field: String },

    #[error("the coefficient matrix is empty")]
    Empty,

    #[error("the coefficient matrix is not square: row {row} has {found} entries, expected {expected}")]
    NotSquare {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("{what} has {found} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        found: usize,
        expected: usize,
    },

    #[error("diagonal entry A[{position}][{position}] must not be zero")]
    ZeroDiagonal { position: usize },

    #[error("the coefficient matrix must not be all zeros")]
    AllZero,

    #[error("tolerance must be a positive number, got {0}")]
    NonPositiveTolerance(f64),
}

/// A square system `A x = b` with a starting guess, ready for the solver.
///
/// Only [`SystemDefinition::new`] and [`SystemDefinition::from_deck`] build
/// one, so every instance holds an `n x n` matrix and length-`n` vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemDefinition {
    matrix: Vec<Vec<f64>>,
    rhs: Vec<f64>,
    initial_guess: Vec<f64>,
}

impl SystemDefinition {
    /// Validates the pieces of a system. An absent guess means all zeros.
    pub fn new(
        matrix: Vec<Vec<f64>>,
        rhs: Vec<f64>,
        initial_guess: Option<Vec<f64>>,
    ) -> Result<Self, InputError> {
        let n = matrix.len();
        if n == 0 {
            return Err(InputError::Empty);
        }
        for (row, values) in matrix.iter().enumerate() {
            if values.len() != n {
                return Err(InputError::NotSquare {
                    row: row + 1,
                    found: values.len(),
                    expected: n,
                });
            }
        }
        if rhs.len() != n {
            return Err(InputError::LengthMismatch {
                what: "right-hand side",
                found: rhs.len(),
                expected: n,
            });
        }
        let initial_guess = initial_guess.unwrap_or_else(|| vec![0.0; n]);
        if initial_guess.len() != n {
            return Err(InputError::LengthMismatch {
                what: "initial guess",
                found: initial_guess.len(),
                expected: n,
            });
        }

        if matrix.iter().flatten().all(|&v| v == 0.0) {
            return Err(InputError::AllZero);
        }
        if let Some(i) = (0..n).find(|&i| matrix[i][i] == 0.0) {
            return Err(InputError::ZeroDiagonal { position: i + 1 });
        }

        Ok(Self {
            matrix,
            rhs,
            initial_guess,
        })
    }

    pub fn from_deck(deck: &Deck) -> Result<Self, InputError> {
        let matrix_card = single_card(deck, MATRIX_CARD)?.ok_or(InputError::MissingCard(MATRIX_CARD))?;
        let rhs_card = single_card(deck, RHS_CARD)?.ok_or(InputError::MissingCard(RHS_CARD))?;
        let guess_card = single_card(deck, INITIAL_GUESS_CARD)?;

        let mut matrix = Vec::with_capacity(matrix_card.data_lines.len());
        for (offset, line) in matrix_card.data_lines.iter().enumerate() {
            let row = gs_inp::split_fields(line)
                .map(|field| parse_number(field, matrix_card.line_start + offset + 1))
                .collect::<Result<Vec<f64>, InputError>>()?;
            matrix.push(row);
        }

        let rhs = card_values(rhs_card)?;
        let initial_guess = guess_card.map(card_values).transpose()?;

        Self::new(matrix, rhs, initial_guess)
    }

    /// Number of unknowns.
    pub fn size(&self) -> usize {
        self.matrix.len()
    }

    /// Coefficient rows, each of length [`size`](Self::size).
    pub fn matrix(&self) -> &[Vec<f64>] {
        &self.matrix
    }

    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    pub fn initial_guess(&self) -> &[f64] {
        &self.initial_guess
    }

    /// Coefficients in row-major order.
    pub fn coefficients(&self) -> impl Iterator<Item = f64> + '_ {
        self.matrix.iter().flatten().copied()
    }
}

pub fn validate_tolerance(tolerance: f64) -> Result<f64, InputError> {
    if tolerance.is_finite() && tolerance > 0.0 {
        Ok(tolerance)
    } else {
        Err(InputError::NonPositiveTolerance(tolerance))
    }
}

fn single_card<'a>(deck: &'a Deck, keyword: &'static str) -> Result<Option<&'a Card>, InputError> {
    let mut cards = deck.cards_named(keyword);
    let first = cards.next();
    if let Some(extra) = cards.next() {
        return Err(InputError::DuplicateCard {
            card: keyword,
            line: extra.line_start,
        });
    }
    Ok(first)
}

/// Flattens all data lines of a card into one list of numbers.
fn card_values(card: &Card) -> Result<Vec<f64>, InputError> {
    card.data_fields()
        .map(|(offset, field)| parse_number(field, card.line_start + offset + 1))
        .collect()
}

fn parse_number(field: &str, line: usize) -> Result<f64, InputError> {
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(InputError::NotNumeric {
            line,
            field: field.to_string(),
        }),
    }
}
