use std::collections::VecDeque;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex);

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

lazy_static! {
    // Tried in order; two-character operators come before their one-character prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new("^[a-zA-Z_][a-zA-Z0-9_]*").unwrap(), handler: symbol_handler },
        RegexPattern { regex: Regex::new("^[0-9]+(\\.[0-9]+)?").unwrap(), handler: number_handler },
        RegexPattern { regex: Regex::new("^[ \\t]+").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new("^#[^\\r\\n]*").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new("^==").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Equals, "==") },
        RegexPattern { regex: Regex::new("^!=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=") },
        RegexPattern { regex: Regex::new("^>=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=") },
        RegexPattern { regex: Regex::new("^<=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=") },
        RegexPattern { regex: Regex::new("^&&").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::And, "&&") },
        RegexPattern { regex: Regex::new("^\\|\\|").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Or, "||") },
        RegexPattern { regex: Regex::new("^\\+=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+=") },
        RegexPattern { regex: Regex::new("^-=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::MinusEquals, "-=") },
        RegexPattern { regex: Regex::new("^\\*=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::StarEquals, "*=") },
        RegexPattern { regex: Regex::new("^/=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::SlashEquals, "/=") },
        RegexPattern { regex: Regex::new("^=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=") },
        RegexPattern { regex: Regex::new("^\\+").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+") },
        RegexPattern { regex: Regex::new("^-").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Dash, "-") },
        RegexPattern { regex: Regex::new("^\\*").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Star, "*") },
        RegexPattern { regex: Regex::new("^/").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Slash, "/") },
        RegexPattern { regex: Regex::new("^>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Greater, ">") },
        RegexPattern { regex: Regex::new("^<").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Less, "<") },
        RegexPattern { regex: Regex::new("^!").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Not, "!") },
        RegexPattern { regex: Regex::new("^@").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::At, "@") },
        RegexPattern { regex: Regex::new("^:").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Colon, ":") },
        RegexPattern { regex: Regex::new("^,").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Comma, ",") },
        RegexPattern { regex: Regex::new("^\\(").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(") },
        RegexPattern { regex: Regex::new("^\\)").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")") },
    ];
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    /// Inside a string literal. `emitted` records whether any token was produced for it yet.
    String { start: Position, emitted: bool },
    /// Inside `#{ ... }` within a string.
    Interpolation { start: Position },
}

/// Single forward scan over the source.
///
/// Iterating a `Lexer` yields tokens until the first lexical error, which is
/// yielded once before the iterator ends. [`lex`] instead keeps scanning and
/// collects every error.
pub struct Lexer {
    source: String,
    pos: usize,
    line: u32,
    column: u32,
    indent_stack: Vec<usize>,
    indent_char: Option<char>,
    at_line_start: bool,
    line_has_content: bool,
    modes: Vec<Mode>,
    pending: VecDeque<Token>,
    finished: bool,
    failed: bool,
}

impl Lexer {
    pub fn new(source: &str) -> Lexer {
        Lexer {
            source: source.to_string(),
            pos: 0,
            line: 1,
            column: 1,
            indent_stack: vec![0],
            indent_char: None,
            at_line_start: true,
            line_has_content: false,
            modes: vec![],
            pending: VecDeque::new(),
            finished: false,
            failed: false,
        }
    }

    pub fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Advances `n` bytes along the current line.
    pub fn advance_n(&mut self, n: usize) {
        let advanced = self.source[self.pos..self.pos + n].chars().count() as u32;
        self.column += advanced;
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        if !token.is_one_of_many(&[
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Dedent,
            TokenKind::EOF,
        ]) {
            self.line_has_content = true;
        }
        self.pending.push_back(token);
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remainder().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.remainder().chars().nth(1)
    }

    /// Consumes one character, treating `\r\n` as a single line break.
    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();

        if c == '\r' && self.peek_char() == Some('\n') {
            self.pos += 1;
        }

        if c == '\n' || c == '\r' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(c)
    }

    fn current_indent(&self) -> usize {
        *self.indent_stack.last().unwrap_or(&0)
    }

    fn in_interpolation(&self) -> bool {
        matches!(self.modes.last(), Some(Mode::Interpolation { .. }))
    }

    /// Marks the innermost string as having produced a token, returning the previous flag.
    fn mark_string_emitted(&mut self) -> bool {
        match self.modes.last_mut() {
            Some(Mode::String { emitted, .. }) => std::mem::replace(emitted, true),
            _ => false,
        }
    }

    fn string_start(&self) -> Position {
        self.modes
            .iter()
            .rev()
            .find_map(|mode| match mode {
                Mode::String { start, .. } => Some(*start),
                _ => None,
            })
            .unwrap_or_else(|| self.current_position())
    }

    /// Runs one scanning step. A step may push zero or more tokens.
    fn scan_step(&mut self) -> Result<(), Error> {
        if self.at_line_start && self.modes.is_empty() {
            return self.scan_indentation();
        }

        match self.modes.last() {
            Some(Mode::String { .. }) => self.scan_string(),
            _ => self.scan_default(),
        }
    }

    fn scan_indentation(&mut self) -> Result<(), Error> {
        self.at_line_start = false;

        let start = self.current_position();
        let run = self
            .remainder()
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect::<String>();
        self.advance_n(run.len());

        // Blank and comment-only lines never affect indentation.
        match self.peek_char() {
            None | Some('#') => return Ok(()),
            Some('\n') | Some('\r') => {
                self.bump();
                self.at_line_start = true;
                return Ok(());
            }
            _ => {}
        }

        let width = run.len();
        let tabs = run.chars().filter(|c| *c == '\t').count();
        if tabs > 0 && tabs < width {
            return Err(Error::new(ErrorImpl::MixedIndentation, start));
        }

        if width > 0 {
            let found = if tabs > 0 { '\t' } else { ' ' };
            match self.indent_char {
                None => self.indent_char = Some(found),
                Some(expected) if expected != found => {
                    return Err(Error::new(
                        ErrorImpl::InconsistentIndentation {
                            expected: indent_name(expected),
                            found: indent_name(found),
                        },
                        start,
                    ));
                }
                _ => {}
            }
        }

        let end = self.current_position();
        if width > self.current_indent() {
            self.indent_stack.push(width);
            self.push(MK_TOKEN!(TokenKind::Indent, width.to_string(), Span::new(start, end)));
        } else if width < self.current_indent() {
            while self.current_indent() > width {
                self.indent_stack.pop();
                self.push(MK_TOKEN!(TokenKind::Dedent, String::new(), Span::point(end)));
            }

            if self.current_indent() != width {
                // Realign so the rest of the file is measured against this line.
                self.indent_stack.push(width);
                return Err(Error::new(ErrorImpl::InvalidDedent { level: width }, start));
            }
        }

        Ok(())
    }

    fn scan_default(&mut self) -> Result<(), Error> {
        let Some(c) = self.peek_char() else {
            return self.finish();
        };

        match c {
            '\n' | '\r' => {
                let start = self.current_position();
                self.bump();

                if self.in_interpolation() {
                    return Ok(());
                }

                if self.line_has_content {
                    self.push(MK_TOKEN!(TokenKind::Newline, String::from("\n"), Span::point(start)));
                    self.line_has_content = false;
                }
                self.at_line_start = true;
                Ok(())
            }
            '"' => {
                let start = self.current_position();
                self.bump();
                self.modes.push(Mode::String {
                    start,
                    emitted: false,
                });
                Ok(())
            }
            '}' if self.in_interpolation() => {
                let start = self.current_position();
                self.bump();
                self.modes.pop();
                let end = self.current_position();
                self.push(MK_TOKEN!(TokenKind::InterpolationEnd, String::from("}"), Span::new(start, end)));
                Ok(())
            }
            _ => {
                for pattern in PATTERNS.iter() {
                    if pattern.regex.is_match(self.remainder()) {
                        (pattern.handler)(self, &pattern.regex);
                        return Ok(());
                    }
                }

                let start = self.current_position();
                self.bump();
                Err(Error::new(ErrorImpl::UnexpectedCharacter { character: c }, start))
            }
        }
    }

    fn scan_string(&mut self) -> Result<(), Error> {
        // The first run of a string starts at its opening quote.
        let start = match self.modes.last() {
            Some(Mode::String {
                start,
                emitted: false,
            }) => *start,
            _ => self.current_position(),
        };
        let mut text = String::new();

        loop {
            match self.peek_char() {
                None => {
                    let quote = self.string_start();
                    self.modes.clear();
                    return Err(Error::new(ErrorImpl::UnterminatedString, quote));
                }
                Some('"') => {
                    let emitted = self.mark_string_emitted();
                    self.bump();
                    if !text.is_empty() || !emitted {
                        let end = self.current_position();
                        self.push(MK_TOKEN!(TokenKind::String, text, Span::new(start, end)));
                    }
                    self.modes.pop();
                    return Ok(());
                }
                Some('\\') => {
                    self.bump();
                    let decoded = match self.peek_char() {
                        Some('n') => Some('\n'),
                        Some('t') => Some('\t'),
                        Some('r') => Some('\r'),
                        Some('"') => Some('"'),
                        Some('\\') => Some('\\'),
                        _ => None,
                    };

                    match decoded {
                        Some(ch) => {
                            text.push(ch);
                            self.bump();
                        }
                        // Unknown escapes keep their backslash.
                        None => text.push('\\'),
                    }
                }
                Some('#') if self.peek_second() == Some('{') => {
                    if !text.is_empty() {
                        let end = self.current_position();
                        self.push(MK_TOKEN!(TokenKind::String, text, Span::new(start, end)));
                    }

                    let open = self.current_position();
                    self.advance_n(2);
                    self.mark_string_emitted();
                    let end = self.current_position();
                    self.push(MK_TOKEN!(TokenKind::InterpolationStart, String::from("#{"), Span::new(open, end)));
                    self.modes.push(Mode::Interpolation { start: open });
                    return Ok(());
                }
                Some(_) => {
                    if let Some(ch) = self.bump() {
                        text.push(if ch == '\r' { '\n' } else { ch });
                    }
                }
            }
        }
    }

    /// Closes open lines and indentation levels and emits EOF.
    fn finish(&mut self) -> Result<(), Error> {
        let open_interpolation = self.modes.iter().find_map(|mode| match mode {
            Mode::Interpolation { start } => Some(*start),
            _ => None,
        });
        if let Some(start) = open_interpolation {
            self.modes.clear();
            return Err(Error::new(ErrorImpl::UnterminatedInterpolation, start));
        }

        let end = self.current_position();
        if self.line_has_content {
            self.push(MK_TOKEN!(TokenKind::Newline, String::from("\n"), Span::point(end)));
            self.line_has_content = false;
        }

        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.push(MK_TOKEN!(TokenKind::Dedent, String::new(), Span::point(end)));
        }

        self.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), Span::point(end)));
        self.finished = true;
        Ok(())
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }

            if self.finished || self.failed {
                return None;
            }

            if let Err(error) = self.scan_step() {
                self.failed = true;
                return Some(Err(error));
            }
        }
    }
}

fn indent_name(c: char) -> &'static str {
    if c == '\t' {
        "tabs"
    } else {
        "spaces"
    }
}

fn matched_text(lexer: &Lexer, regex: &Regex) -> String {
    regex
        .find(lexer.remainder())
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = matched_text(lexer, regex);
    let start = lexer.current_position();
    lexer.advance_n(matched.len());
    let end = lexer.current_position();

    lexer.push(MK_TOKEN!(TokenKind::Number, matched, Span::new(start, end)));
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = matched_text(lexer, regex);
    lexer.advance_n(matched.len());
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) {
    let value = matched_text(lexer, regex);
    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    let start = lexer.current_position();
    lexer.advance_n(value.len());
    let end = lexer.current_position();

    lexer.push(MK_TOKEN!(kind, value, Span::new(start, end)));
}

/// Outcome of a whole-file lex. `tokens` is empty whenever `errors` is not.
#[derive(Debug, Clone)]
pub struct LexResult {
    pub valid: bool,
    pub errors: Vec<Error>,
    pub tokens: Vec<Token>,
}

/// Tokenizes the whole source, collecting every lexical error instead of
/// stopping at the first one.
pub fn lex(source: &str) -> LexResult {
    let mut lexer = Lexer::new(source);
    let mut tokens = vec![];
    let mut errors = vec![];

    loop {
        tokens.extend(lexer.pending.drain(..));

        if lexer.finished {
            break;
        }

        if let Err(error) = lexer.scan_step() {
            trace!(line = error.get_position().line, column = error.get_position().column, "lexical error: {}", error.message());
            errors.push(error);
        }
    }

    debug!(tokens = tokens.len(), errors = errors.len(), "lexed source");

    if errors.is_empty() {
        LexResult {
            valid: true,
            errors,
            tokens,
        }
    } else {
        LexResult {
            valid: false,
            errors,
            tokens: vec![],
        }
    }
}

/// Tokenizes the source, stopping at the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Error> {
    Lexer::new(source).collect()
}
