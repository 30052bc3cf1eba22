//! Error types for the layout engine.
//!
//! Parsing and layout report only the error classes described in the
//! design: a malformed numeric literal is the one genuinely fatal parse
//! error, while unknown-node references and solver divergence are both
//! handled by logging and continuing (see [`crate::parser`] and
//! [`crate::solver`]).

use thiserror::Error;

/// Errors produced while tokenizing the `Ndim` / node / edge / Jacobian /
/// config-line input format described in the crate's input format.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing or invalid dimensionality on the first line: {0:?}")]
    InvalidDimension(String),

    #[error("unsupported dimensionality {0} (must be 2 or 3)")]
    UnsupportedDimension(i64),

    #[error("malformed numeric literal {literal:?} on line {line}: {source}")]
    InvalidNumber {
        literal: String,
        line: usize,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("malformed integer literal {literal:?} on line {line}: {source}")]
    InvalidInteger {
        literal: String,
        line: usize,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("empty input")]
    EmptyInput,
}

/// Errors surfaced by the public entry points. No panic or exception is
/// allowed to cross the C-ABI / WASM boundary, so every failure mode the
/// core can hit is a variant here.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("failed to parse input: {0}")]
    Parse(#[from] ParseError),

    #[error("input string was not valid UTF-8")]
    InvalidUtf8,
}
