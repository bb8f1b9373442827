//! Keyword deck parser for linear system input files.
//!
//! A deck is a sequence of cards. Each card starts with a `*KEYWORD` header,
//! optionally followed by comma-separated parameters, and owns the data lines
//! that follow it until the next header:
//!
//! ```text
//! ** diagonally dominant 3x3 system
//! *MATRIX
//! 10, 1, 1
//! 1, 10, 1
//! 1, 1, 10
//! *RHS
//! 12, 12, 12
//! *SOLVER, TOLERANCE=1e-6, MAX ITERATIONS=200
//! ```

use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub keyword: String,
    pub parameters: Vec<Parameter>,
    pub data_lines: Vec<String>,
    pub line_start: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

impl Deck {
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ParseError {
            line: 0,
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::parse_str(&raw)
    }

    pub fn parse_str(raw: &str) -> Result<Self, ParseError> {
        let lines: Vec<&str> = raw.lines().collect();
        let mut cards = Vec::new();
        let mut i = 0usize;

        while i < lines.len() {
            let trimmed = lines[i].trim();

            if trimmed.is_empty() || is_comment(trimmed) {
                i += 1;
                continue;
            }

            if !trimmed.starts_with('*') {
                return Err(ParseError {
                    line: i + 1,
                    message: "expected card starting with '*'".to_string(),
                });
            }

            let line_start = i + 1;
            let mut header = trimmed.trim_start_matches('*').trim().to_string();
            i += 1;

            // Header continuation lines start with a comma.
            while i < lines.len() {
                let next = lines[i].trim();
                if next.starts_with(',') {
                    header.push_str(next);
                    i += 1;
                    continue;
                }
                break;
            }

            let (keyword, parameters) = parse_header(&header, line_start)?;

            let mut data_lines = Vec::new();
            while i < lines.len() {
                let candidate = lines[i].trim();
                if candidate.is_empty() || is_comment(candidate) {
                    i += 1;
                    continue;
                }
                if candidate.starts_with('*') {
                    break;
                }
                data_lines.push(candidate.to_string());
                i += 1;
            }

            cards.push(Card {
                keyword,
                parameters,
                data_lines,
                line_start,
            });
        }

        Ok(Deck { cards })
    }

    /// All cards whose keyword matches `keyword`, ignoring case, spaces and underscores.
    pub fn cards_named<'a>(&'a self, keyword: &str) -> impl Iterator<Item = &'a Card> + 'a {
        let wanted = normalize_keyword(keyword);
        self.cards
            .iter()
            .filter(move |card| normalize_keyword(&card.keyword) == wanted)
    }
}

impl Card {
    /// Value of a `KEY=VALUE` parameter. Keys compare like keywords.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        let wanted = normalize_keyword(key);
        self.parameters
            .iter()
            .find(|p| normalize_keyword(&p.key) == wanted)
            .and_then(|p| p.value.as_deref())
    }

    /// True when a bare `KEY` flag (no value) is present.
    pub fn has_flag(&self, key: &str) -> bool {
        let wanted = normalize_keyword(key);
        self.parameters
            .iter()
            .any(|p| p.value.is_none() && normalize_keyword(&p.key) == wanted)
    }

    /// Splits every data line on commas and whitespace.
    pub fn data_fields(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.data_lines.iter().enumerate().flat_map(|(offset, line)| {
            split_fields(line).map(move |field| (offset, field))
        })
    }
}

/// Splits a data line into fields. Commas and whitespace both separate.
pub fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|field| !field.is_empty())
}

/// Upper-cases and drops spaces and underscores so `INITIAL GUESS`,
/// `Initial_Guess` and `INITIALGUESS` all name the same card.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect::<String>()
        .to_ascii_uppercase()
}

fn is_comment(line: &str) -> bool {
    line.starts_with("**")
}

fn parse_header(header: &str, line: usize) -> Result<(String, Vec<Parameter>), ParseError> {
    let mut parts = header.split(',');
    let keyword_raw = parts.next().unwrap_or_default().trim();
    if keyword_raw.is_empty() {
        return Err(ParseError {
            line,
            message: "empty card keyword".to_string(),
        });
    }
    let keyword = keyword_raw.to_ascii_uppercase();
    let mut parameters = Vec::new();

    for part in parts {
        let item = part.trim();
        if item.is_empty() {
            continue;
        }
        if let Some((k, v)) = item.split_once('=') {
            let key = k.trim();
            if key.is_empty() {
                return Err(ParseError {
                    line,
                    message: format!("parameter without a name: '{item}'"),
                });
            }
            parameters.push(Parameter {
                key: key.to_ascii_uppercase(),
                value: Some(v.trim().to_string()),
            });
        } else {
            parameters.push(Parameter {
                key: item.to_ascii_uppercase(),
                value: None,
            });
        }
    }

    Ok((keyword, parameters))
}
