//! Semantic analysis of parsed dialogue scripts.
//!
//! The analyzer consumes dialogue nodes one at a time and reports:
//!
//! - Per node: empty and duplicate nodes, dead ends, unknown functions and
//!   wrong arities, always-false choice conditions, repeated choice texts
//! - Whole program: missing node references, a missing `start` node,
//!   unreachable nodes, goto cycles, undefined and unused variables and
//!   operand type mismatches
//!
//! Findings are [`diagnostics::Diagnostic`] values grouped by severity; only
//! errors make a script invalid.

pub mod analyzer;
pub mod builtins;
pub mod diagnostics;
pub mod folding;
pub mod inference;
