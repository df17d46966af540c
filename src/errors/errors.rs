use std::fmt::Display;

use thiserror::Error;

use crate::{get_line_at_position, Position};

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_error_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    /// The error text without position information.
    pub fn message(&self) -> String {
        self.internal_error.to_string()
    }

    /// Whether this error was raised by the lexer rather than the parser.
    pub fn is_lexical(&self) -> bool {
        matches!(
            self.internal_error,
            ErrorImpl::UnexpectedCharacter { .. }
                | ErrorImpl::MixedIndentation
                | ErrorImpl::InconsistentIndentation { .. }
                | ErrorImpl::InvalidDedent { .. }
                | ErrorImpl::UnterminatedString
                | ErrorImpl::UnterminatedInterpolation
        )
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnexpectedCharacter { .. } => "UnexpectedCharacter",
            ErrorImpl::MixedIndentation => "MixedIndentation",
            ErrorImpl::InconsistentIndentation { .. } => "InconsistentIndentation",
            ErrorImpl::InvalidDedent { .. } => "InvalidDedent",
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::UnterminatedInterpolation => "UnterminatedInterpolation",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnexpectedIndentation => "UnexpectedIndentation",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnexpectedCharacter { .. } => ErrorTip::None,
            ErrorImpl::MixedIndentation => ErrorTip::Suggestion(String::from(
                "indent each line with either spaces or tabs, not both",
            )),
            ErrorImpl::InconsistentIndentation { expected, .. } => ErrorTip::Suggestion(format!(
                "this file is indented with {}",
                expected
            )),
            ErrorImpl::InvalidDedent { .. } => ErrorTip::Suggestion(String::from(
                "unindent to a level used by an enclosing block",
            )),
            ErrorImpl::UnterminatedString => {
                ErrorTip::Suggestion(String::from("add a closing `\"`"))
            }
            ErrorImpl::UnterminatedInterpolation => {
                ErrorTip::Suggestion(String::from("close the interpolation with `}`"))
            }
            ErrorImpl::UnexpectedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedTokenDetailed { message, .. } => {
                ErrorTip::Suggestion(message.clone())
            }
            ErrorImpl::NumberParseError { token } => {
                ErrorTip::Suggestion(format!("`{}` is not a valid number", token))
            }
            ErrorImpl::UnexpectedIndentation => ErrorTip::Suggestion(String::from(
                "statements in a node share one indentation level",
            )),
        }
    }

    /// Renders the offending source line with a caret under the error column.
    ///
    /// ```text
    ///   |
    /// 2 | goto next
    ///   | -----^
    /// ```
    pub fn excerpt(&self, source: &str) -> String {
        let Some((line, line_text, line_pos)) = get_line_at_position(source, self.position)
        else {
            return String::new();
        };

        let line_string = line.to_string();
        let padding = line_string.len() + 2;

        let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
        let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

        format!(
            "{:>padding$}\n{} | {}\n{:>padding$} {:->arrows$}",
            "|",
            line_string,
            line_text_removed.trim_end(),
            "|",
            "^"
        )
    }

    /// Full report: heading, file pointer and excerpt.
    pub fn display(&self, source: &str, file: &str) -> String {
        let heading = match self.get_tip() {
            ErrorTip::None => format!("Error: {}", self.internal_error),
            tip => format!("Error: {} ({})", self.internal_error, tip),
        };

        format!("{}\n-> {}:{}:{}\n{}", heading, file, self.position.line, self.position.column, self.excerpt(source))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.internal_error, self.position.line, self.position.column
        )
    }
}

impl std::error::Error for Error {}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' || c == '\t' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Lexical
    #[error("unexpected character {character:?}")]
    UnexpectedCharacter { character: char },
    #[error("mixed spaces and tabs in indentation")]
    MixedIndentation,
    #[error("inconsistent indentation: expected {expected}, found {found}")]
    InconsistentIndentation {
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid dedentation level {level}")]
    InvalidDedent { level: usize },
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated interpolation")]
    UnterminatedInterpolation,

    // Syntax
    #[error("expected {expected}, got {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("expected {expected}, got {found}")]
    UnexpectedTokenDetailed {
        expected: String,
        found: String,
        message: String,
    },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("unexpected indentation")]
    UnexpectedIndentation,
}
