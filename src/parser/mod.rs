//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into a [`Program`](crate::ast::ast::Program). It uses a Pratt parser for
//! expressions with proper operator precedence and handles:
//!
//! - Node blocks and their statements (assignment, say, choice, goto)
//! - Expression parsing (logical, comparison, arithmetic, unary, calls)
//! - Error recovery, so one pass reports several syntax errors
//! - Streaming node-by-node parsing through [`parser::Parser::nodes`]
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
