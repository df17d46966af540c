//! Lexical analysis for Tome scripts.
//!
//! Converts source text into tokens. It handles:
//!
//! - Indentation tracking with an indentation stack, emitting INDENT/DEDENT
//! - String literals with `#{ ... }` interpolation sub-scans
//! - Keywords, identifiers, numbers, operators and comments
//! - 1-based line/column positions for every token

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
