//! Error types for the lexer and parser.
//!
//! Lexical and syntax errors share one [`errors::Error`] type carrying an
//! [`errors::ErrorImpl`] and the source position. Semantic problems found by
//! the analyzer are reported as diagnostics instead (see `crate::analyzer`).

pub mod errors;

#[cfg(test)]
mod tests;
