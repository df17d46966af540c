#![allow(clippy::module_inception)]

use serde::Serialize;

use crate::{
    analyzer::{analyzer::Analyzer, diagnostics::AnalysisResult},
    ast::ast::Program,
    errors::errors::Error,
    lexer::lexer::lex,
    parser::parser::Parser,
};

pub mod analyzer;
pub mod ast;
pub mod errors;
pub mod graph;
pub mod lexer;
pub mod macros;
pub mod parser;

extern crate regex;

/// A 1-based line/column location in the source text. Columns count characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }

    /// The first character of a file.
    pub fn start() -> Self {
        Position { line: 1, column: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    pub fn point(position: Position) -> Self {
        Span {
            start: position,
            end: position,
        }
    }
}

/// Splits source into `(byte offset, line text)` pairs, honouring `\n`, `\r` and `\r\n`.
fn lines_with_offsets(source: &str) -> Vec<(usize, &str)> {
    let bytes = source.as_bytes();
    let mut lines = vec![];
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push((start, &source[start..i]));
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push((start, &source[start..i]));
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }

    lines.push((start, &source[start..]));
    lines
}

/// Returns the line number, the line text and the character offset within that
/// line for `position`, or `None` when the line does not exist.
pub fn get_line_at_position(source: &str, position: Position) -> Option<(usize, String, usize)> {
    let line_index = (position.line as usize).checked_sub(1)?;
    let (_, text) = *lines_with_offsets(source).get(line_index)?;
    let line_pos = (position.column as usize).saturating_sub(1);

    Some((position.line as usize, text.to_string(), line_pos))
}

/// Converts a line/column position to a byte offset into `source`. Columns past
/// the end of the line clamp to the line end.
pub fn byte_offset(source: &str, position: Position) -> Option<usize> {
    let line_index = (position.line as usize).checked_sub(1)?;
    let (start, text) = *lines_with_offsets(source).get(line_index)?;
    let skip = (position.column as usize).saturating_sub(1);
    let within = text
        .char_indices()
        .nth(skip)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len());

    Some(start + within)
}

/// Result of running the whole pipeline over one source text.
#[derive(Debug)]
pub enum CheckOutcome {
    LexicalErrors(Vec<Error>),
    SyntaxErrors(Vec<Error>),
    Analyzed {
        program: Program,
        result: AnalysisResult,
    },
}

impl CheckOutcome {
    pub fn is_valid(&self) -> bool {
        match self {
            CheckOutcome::Analyzed { result, .. } => result.valid,
            _ => false,
        }
    }
}

/// Lexes, parses and analyzes `source`. Each stage only runs if the previous
/// one succeeded; nodes are streamed from the parser into the analyzer.
pub fn check_source(source: &str) -> CheckOutcome {
    let lexed = lex(source);
    if !lexed.valid {
        return CheckOutcome::LexicalErrors(lexed.errors);
    }

    let mut parser = Parser::new(lexed.tokens);
    let mut analyzer = Analyzer::new();
    let mut nodes = vec![];

    for node in parser.nodes() {
        analyzer.analyze_node(&node);
        nodes.push(node);
    }

    if !parser.errors().is_empty() {
        return CheckOutcome::SyntaxErrors(parser.into_errors());
    }

    CheckOutcome::Analyzed {
        program: Program { nodes },
        result: analyzer.finalize_analysis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_line_at_position() {
        let source = "Hello, world!\nsecond\r\nthird\rTesting { }\n";

        let (line_number, line, line_pos) =
            get_line_at_position(source, Position::new(1, 11)).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "Hello, world!");
        assert_eq!(line_pos, 10);

        let (line_number, line, line_pos) =
            get_line_at_position(source, Position::new(4, 9)).unwrap();
        assert_eq!(line_number, 4);
        assert_eq!(line, "Testing { }");
        assert_eq!(line_pos, 8);

        assert!(get_line_at_position(source, Position::new(9, 1)).is_none());
    }

    #[test]
    fn test_byte_offset() {
        let source = "ab\r\ncdé\nf";
        assert_eq!(byte_offset(source, Position::new(1, 1)), Some(0));
        assert_eq!(byte_offset(source, Position::new(2, 1)), Some(4));
        assert_eq!(byte_offset(source, Position::new(2, 4)), Some(8));
        assert_eq!(byte_offset(source, Position::new(3, 1)), Some(9));
        assert_eq!(byte_offset(source, Position::new(2, 40)), Some(8));
    }

    #[test]
    fn test_check_source_stops_after_lexical_errors() {
        let outcome = check_source("node start\n  say \"unterminated\nend\n");
        assert!(matches!(outcome, CheckOutcome::LexicalErrors(_)));
        assert!(!outcome.is_valid());
    }

    #[test]
    fn test_check_source_analyzes_clean_parse() {
        let outcome = check_source("node start\n  say \"Hi\"\n  goto :start\nend\n");
        match outcome {
            CheckOutcome::Analyzed { program, result } => {
                assert_eq!(program.nodes.len(), 1);
                assert!(result.valid);
            }
            other => panic!("expected analysis, got {:?}", other),
        }
    }
}
