use std::fmt::{self, Display};

use serde::Serialize;

use crate::{Position, Span};

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Suggestion,
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Suggestion => write!(f, "suggestion"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    EmptyNode,
    DuplicateNode,
    DeadEnd,
    UnknownFunction,
    InvalidFunctionArgs,
    SuspiciousCondition,
    IdenticalChoices,
    MissingNode,
    UnreachableNode,
    CircularReference,
    MissingEntryPoint,
    UndefinedVariable,
    TypeMismatch,
    UnusedVariable,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::EmptyNode => "empty_node",
            DiagnosticKind::DuplicateNode => "duplicate_node",
            DiagnosticKind::DeadEnd => "dead_end",
            DiagnosticKind::UnknownFunction => "unknown_function",
            DiagnosticKind::InvalidFunctionArgs => "invalid_function_args",
            DiagnosticKind::SuspiciousCondition => "suspicious_condition",
            DiagnosticKind::IdenticalChoices => "identical_choices",
            DiagnosticKind::MissingNode => "missing_node",
            DiagnosticKind::UnreachableNode => "unreachable_node",
            DiagnosticKind::CircularReference => "circular_reference",
            DiagnosticKind::MissingEntryPoint => "missing_entry_point",
            DiagnosticKind::UndefinedVariable => "undefined_variable",
            DiagnosticKind::TypeMismatch => "type_mismatch",
            DiagnosticKind::UnusedVariable => "unused_variable",
        }
    }

    /// Every kind always reports at the same severity.
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::EmptyNode
            | DiagnosticKind::DuplicateNode
            | DiagnosticKind::UnknownFunction
            | DiagnosticKind::InvalidFunctionArgs
            | DiagnosticKind::MissingNode
            | DiagnosticKind::MissingEntryPoint => Severity::Error,
            DiagnosticKind::DeadEnd
            | DiagnosticKind::SuspiciousCondition
            | DiagnosticKind::IdenticalChoices
            | DiagnosticKind::UnreachableNode
            | DiagnosticKind::CircularReference
            | DiagnosticKind::UndefinedVariable
            | DiagnosticKind::TypeMismatch => Severity::Warning,
            DiagnosticKind::UnusedVariable => Severity::Suggestion,
        }
    }
}

impl Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A semantic finding. Serializes with the kind under `type` and the
/// optional end column under `endColumn`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    #[serde(rename = "type")]
    pub kind: DiagnosticKind,
    pub message: String,
    pub line: u32,
    pub column: u32,
    #[serde(rename = "endColumn", skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, position: Position) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
            line: position.line,
            column: position.column,
            end_column: None,
            node: None,
            severity: kind.severity(),
        }
    }

    /// Points at `span`; the end column is kept when the span stays on one line.
    pub fn at_span(kind: DiagnosticKind, message: impl Into<String>, span: &Span) -> Self {
        let mut diagnostic = Diagnostic::new(kind, message, span.start);
        if span.end.line == span.start.line && span.end.column > span.start.column {
            diagnostic.end_column = Some(span.end.column);
        }
        diagnostic
    }

    pub fn in_node(mut self, node: &str) -> Self {
        self.node = Some(node.to_string());
        self
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {} at line {}, column {}",
            self.severity, self.kind, self.message, self.line, self.column
        )
    }
}

/// Outcome of analysing a program. `valid` is true iff `errors` is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub suggestions: Vec<Diagnostic>,
}

impl AnalysisResult {
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let mut errors = vec![];
        let mut warnings = vec![];
        let mut suggestions = vec![];

        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => errors.push(diagnostic),
                Severity::Warning => warnings.push(diagnostic),
                Severity::Suggestion => suggestions.push(diagnostic),
            }
        }

        AnalysisResult {
            valid: errors.is_empty(),
            errors,
            warnings,
            suggestions,
        }
    }

    /// Errors, then warnings, then suggestions.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.suggestions.iter())
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> Vec<&Diagnostic> {
        self.diagnostics()
            .filter(|diagnostic| diagnostic.kind == kind)
            .collect()
    }
}
