//! Parser implementation for building the Abstract Syntax Tree.
//!
//! The parser pulls tokens from any iterator and keeps exactly two of them
//! in hand (`current` and `next`). Expressions are parsed with a Pratt parser
//! driven by NUD/LED lookup tables; statements are dispatched through a
//! statement lookup keyed by their leading token.
//!
//! Syntax errors do not stop the parse. They are recorded on the parser and
//! the token stream is resynchronised, so one pass reports every independent
//! error. The same error list serves the batch [`parse`] entry point and the
//! streaming [`Parser::nodes`] iterator.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::{
    ast::ast::{DialogueNode, Program},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span, MK_TOKEN,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    stmt::parse_node,
};

/// The main parser structure that maintains parsing state.
pub struct Parser {
    /// Remaining tokens, pulled on demand
    tokens: Box<dyn Iterator<Item = Token>>,
    /// The token being parsed
    current: Token,
    /// One token of lookahead
    next: Token,
    /// Syntax errors recorded so far
    errors: Vec<Error>,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
}

impl Parser {
    /// Creates a parser over `tokens` with all lookup tables registered.
    ///
    /// A stream that ends without an EOF token behaves as if one followed
    /// its last token.
    pub fn new<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = Token>,
        I::IntoIter: 'static,
    {
        let mut tokens: Box<dyn Iterator<Item = Token>> = Box::new(tokens.into_iter());
        let current = tokens
            .next()
            .unwrap_or_else(|| eof_token(Position::start()));
        let next = tokens.next().unwrap_or_else(|| eof_token(current.span.end));

        let mut parser = Parser {
            tokens,
            current,
            next,
            errors: vec![],
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
        };
        create_token_lookups(&mut parser);
        parser
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.current
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current.kind
    }

    /// Returns the token after the current one.
    pub fn peek_token(&self) -> &Token {
        &self.next
    }

    /// Advances to the next token and returns the previous one. The parser
    /// never moves past EOF.
    pub fn advance(&mut self) -> Token {
        if self.current.kind == TokenKind::EOF {
            return self.current.clone();
        }

        let following = match self.tokens.next() {
            Some(token) => token,
            None => eof_token(self.next.span.end),
        };
        let next = std::mem::replace(&mut self.next, following);
        std::mem::replace(&mut self.current, next)
    }

    /// Builds the generic "expected X, got Y" error at the current token.
    pub fn unexpected(&self, expected: &str) -> Error {
        Error::new(
            ErrorImpl::UnexpectedToken {
                expected: expected.to_string(),
                found: self.current.to_string(),
            },
            self.current.span.start,
        )
    }

    /// Same as [`Parser::unexpected`] with a hint attached.
    pub fn unexpected_with_hint(&self, expected: &str, hint: impl Into<String>) -> Error {
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                expected: expected.to_string(),
                found: self.current.to_string(),
                message: hint.into(),
            },
            self.current.span.start,
        )
    }

    /// Expects a token of the specified kind, with optional custom error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        if self.current.kind != expected_kind {
            return Err(error.unwrap_or_else(|| self.unexpected(expected_kind.describe())));
        }

        Ok(self.advance())
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    pub fn record_error(&mut self, error: Error) {
        debug!(
            line = error.get_position().line,
            column = error.get_position().column,
            "syntax error: {}",
            error.message()
        );
        self.errors.push(error);
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }

    /// Lazily parses the remaining nodes, one per `next()` call.
    ///
    /// The iterator is single-pass: once exhausted the parser sits at EOF and
    /// a new call yields nothing. Syntax errors met along the way are added
    /// to [`Parser::errors`].
    pub fn nodes(&mut self) -> Nodes<'_> {
        Nodes { parser: self }
    }

    /// Skips an indented block the current INDENT opens, nested blocks
    /// included.
    pub fn skip_block(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current.kind {
                TokenKind::Indent => depth += 1,
                TokenKind::Dedent => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                TokenKind::EOF => return,
                _ => {}
            }
            self.advance();
        }
    }

    /// Skips the rest of a broken statement, through its NEWLINE. Stops early
    /// at the DEDENT closing the block or at EOF.
    pub fn synchronize_statement(&mut self) {
        trace!(
            line = self.current.span.start.line,
            "resynchronising at end of statement"
        );
        loop {
            match self.current.kind {
                TokenKind::Newline => {
                    self.advance();
                    return;
                }
                TokenKind::Dedent | TokenKind::EOF => return,
                TokenKind::Indent => self.skip_block(),
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skips to the next `node` keyword or EOF.
    pub fn synchronize_node(&mut self) {
        trace!(
            line = self.current.span.start.line,
            "resynchronising at next node"
        );
        while !matches!(self.current.kind, TokenKind::Node | TokenKind::EOF) {
            self.advance();
        }
    }

    /// Returns a reference to the statement lookup table.
    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    /// Returns a reference to the NUD (null denotation) lookup table.
    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    /// Returns a reference to the LED (left denotation) lookup table.
    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Returns a reference to the binding power lookup table.
    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    /// Registers a left denotation (infix) handler and its binding power.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }
}

fn eof_token(position: Position) -> Token {
    MK_TOKEN!(TokenKind::EOF, String::from("EOF"), Span::point(position))
}

/// One-shot iterator over the dialogue nodes of a [`Parser`].
pub struct Nodes<'a> {
    parser: &'a mut Parser,
}

impl Iterator for Nodes<'_> {
    type Item = DialogueNode;

    fn next(&mut self) -> Option<DialogueNode> {
        loop {
            while self.parser.current_token_kind() == TokenKind::Newline {
                self.parser.advance();
            }

            if self.parser.current_token_kind() == TokenKind::EOF {
                return None;
            }

            match parse_node(self.parser) {
                Ok(node) => {
                    trace!(node = %node.id, statements = node.statements.len(), "parsed node");
                    return Some(node);
                }
                Err(error) => {
                    self.parser.record_error(error);
                    self.parser.synchronize_node();
                }
            }
        }
    }
}

/// Outcome of a whole-file parse. `value` is present exactly when `valid`.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub valid: bool,
    pub errors: Vec<Error>,
    pub value: Option<Program>,
}

/// Parses a stream of tokens into a [`Program`], collecting every syntax
/// error.
pub fn parse<I>(tokens: I) -> ParseResult
where
    I: IntoIterator<Item = Token>,
    I::IntoIter: 'static,
{
    let mut parser = Parser::new(tokens);
    let nodes: Vec<DialogueNode> = parser.nodes().collect();
    let errors = parser.into_errors();

    debug!(nodes = nodes.len(), errors = errors.len(), "parsed program");

    if errors.is_empty() {
        ParseResult {
            valid: true,
            errors,
            value: Some(Program { nodes }),
        }
    } else {
        ParseResult {
            valid: false,
            errors,
            value: None,
        }
    }
}
