//! Terminal and JSON rendering of check results.
//!
//! Lexical, syntax and analysis findings are all converted to
//! [`ScriptDiagnostic`], a miette diagnostic pointing into the checked file.

use std::fmt::Display;

use clap::ValueEnum;
use miette::{LabeledSpan, NamedSource, SourceSpan};
use serde_json::{json, Value};
use tome::{
    analyzer::diagnostics::{Diagnostic, Severity},
    byte_offset,
    errors::errors::{Error, ErrorTip},
    CheckOutcome, Position,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Annotated source excerpts
    Text,
    /// One JSON object per file
    Json,
}

/// Lowest severity of analysis diagnostic to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MinSeverity {
    Error,
    Warning,
    Suggestion,
}

impl MinSeverity {
    pub fn admits(&self, severity: Severity) -> bool {
        let threshold = match self {
            MinSeverity::Error => Severity::Error,
            MinSeverity::Warning => Severity::Warning,
            MinSeverity::Suggestion => Severity::Suggestion,
        };
        severity >= threshold
    }
}

/// A lexical, syntax or analysis finding with its source context.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ScriptDiagnostic {
    pub severity: miette::Severity,
    pub code: String,
    pub message: String,
    pub help: Option<String>,
    pub src: NamedSource<String>,
    pub span: SourceSpan,
    pub label: String,
}

impl ScriptDiagnostic {
    /// From a lexer or parser error. The span covers the character at the
    /// error position, or nothing at the end of the file.
    pub fn from_error(error: &Error, source_path: &str, source: &str) -> Self {
        let offset = byte_offset(source, *error.get_position()).unwrap_or(source.len());
        let length = source[offset..].chars().next().map_or(0, char::len_utf8);
        let help = match error.get_tip() {
            ErrorTip::None => None,
            ErrorTip::Suggestion(tip) => Some(tip),
        };
        let label = if error.is_lexical() {
            "lexical error"
        } else {
            "syntax error"
        };

        ScriptDiagnostic {
            severity: miette::Severity::Error,
            code: error.get_error_name().to_string(),
            message: error.message(),
            help,
            src: NamedSource::new(source_path, source.to_string()),
            span: (offset, length).into(),
            label: label.to_string(),
        }
    }

    pub fn from_analysis(diagnostic: &Diagnostic, source_path: &str, source: &str) -> Self {
        let offset =
            byte_offset(source, diagnostic.position()).unwrap_or(source.len());
        let end = diagnostic
            .end_column
            .and_then(|column| byte_offset(source, Position::new(diagnostic.line, column)))
            .unwrap_or(offset);

        let (severity, label) = match diagnostic.severity {
            Severity::Error => (miette::Severity::Error, "error here"),
            Severity::Warning => (miette::Severity::Warning, "warning here"),
            Severity::Suggestion => (miette::Severity::Advice, "consider changing this"),
        };

        ScriptDiagnostic {
            severity,
            code: diagnostic.kind.as_str().to_string(),
            message: diagnostic.message.clone(),
            help: diagnostic.node.as_ref().map(|node| format!("in node '{}'", node)),
            src: NamedSource::new(source_path, source.to_string()),
            span: (offset, end.saturating_sub(offset)).into(),
            label: label.to_string(),
        }
    }
}

impl miette::Diagnostic for ScriptDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(format!("tome::{}", self.code)))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(self.severity)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(self.label.clone()),
            self.span,
        ))))
    }
}

/// Every diagnostic of `outcome` that passes `min_severity`, in report order.
/// Lexical and syntax errors always pass.
pub fn script_diagnostics(
    outcome: &CheckOutcome,
    min_severity: MinSeverity,
    source_path: &str,
    source: &str,
) -> Vec<ScriptDiagnostic> {
    match outcome {
        CheckOutcome::LexicalErrors(errors) | CheckOutcome::SyntaxErrors(errors) => errors
            .iter()
            .map(|error| ScriptDiagnostic::from_error(error, source_path, source))
            .collect(),
        CheckOutcome::Analyzed { result, .. } => result
            .diagnostics()
            .filter(|diagnostic| min_severity.admits(diagnostic.severity))
            .map(|diagnostic| ScriptDiagnostic::from_analysis(diagnostic, source_path, source))
            .collect(),
    }
}

/// One-line summary printed after a file's diagnostics.
pub fn summary(source_path: &str, outcome: &CheckOutcome) -> String {
    match outcome {
        CheckOutcome::LexicalErrors(errors) => {
            format!("{}: {} lexical error(s)", source_path, errors.len())
        }
        CheckOutcome::SyntaxErrors(errors) => {
            format!("{}: {} syntax error(s)", source_path, errors.len())
        }
        CheckOutcome::Analyzed { result, .. } => format!(
            "{}: {}, {} error(s), {} warning(s), {} suggestion(s)",
            source_path,
            if result.valid { "valid" } else { "invalid" },
            result.errors.len(),
            result.warnings.len(),
            result.suggestions.len()
        ),
    }
}

fn error_json(error: &Error) -> Value {
    let position = error.get_position();
    json!({
        "type": error.get_error_name(),
        "message": error.message(),
        "line": position.line,
        "column": position.column,
        "tip": match error.get_tip() {
            ErrorTip::None => Value::Null,
            ErrorTip::Suggestion(tip) => Value::String(tip),
        },
    })
}

fn filtered(diagnostics: &[Diagnostic], min_severity: MinSeverity) -> Vec<&Diagnostic> {
    diagnostics
        .iter()
        .filter(|diagnostic| min_severity.admits(diagnostic.severity))
        .collect()
}

/// The JSON object describing one checked file.
pub fn json_report(source_path: &str, outcome: &CheckOutcome, min_severity: MinSeverity) -> Value {
    match outcome {
        CheckOutcome::LexicalErrors(errors) | CheckOutcome::SyntaxErrors(errors) => {
            let kind = if matches!(outcome, CheckOutcome::LexicalErrors(_)) {
                "lexical_errors"
            } else {
                "syntax_errors"
            };
            json!({
                "type": kind,
                "file": source_path,
                "valid": false,
                "errors": errors.iter().map(error_json).collect::<Vec<_>>(),
                "warnings": [],
                "suggestions": [],
            })
        }
        CheckOutcome::Analyzed { result, .. } => json!({
            "type": "analysis_issues",
            "file": source_path,
            "valid": result.valid,
            "errors": filtered(&result.errors, min_severity),
            "warnings": filtered(&result.warnings, min_severity),
            "suggestions": filtered(&result.suggestions, min_severity),
        }),
    }
}

/// The JSON object for a file that could not be read.
pub fn read_error_report(source_path: &str, report: &miette::Report) -> Value {
    json!({
        "type": "read_error",
        "file": source_path,
        "valid": false,
        "errors": [{ "message": report.to_string() }],
        "warnings": [],
        "suggestions": [],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic as _;
    use tome::check_source;

    #[test]
    fn test_min_severity_admits() {
        assert!(MinSeverity::Suggestion.admits(Severity::Suggestion));
        assert!(MinSeverity::Warning.admits(Severity::Error));
        assert!(!MinSeverity::Warning.admits(Severity::Suggestion));
        assert!(!MinSeverity::Error.admits(Severity::Warning));
    }

    #[test]
    fn test_from_analysis_points_at_span() {
        let source = "node start\n  @g = 100\nend\n";
        let outcome = check_source(source);
        let diagnostics = script_diagnostics(&outcome, MinSeverity::Suggestion, "g.tome", source);
        let unused = diagnostics
            .iter()
            .find(|diagnostic| diagnostic.code == "unused_variable")
            .unwrap();

        assert_eq!(unused.severity, miette::Severity::Advice);
        assert_eq!(unused.span.offset(), 13);
        assert_eq!(unused.span.len(), 8);
        assert_eq!(&source[13..21], "@g = 100");
        assert_eq!(unused.help.as_deref(), Some("in node 'start'"));
    }

    #[test]
    fn test_min_severity_filters_analysis() {
        let source = "node start\n  @g = 100\nend\n";
        let outcome = check_source(source);

        let diagnostics = script_diagnostics(&outcome, MinSeverity::Warning, "g.tome", source);
        assert!(diagnostics
            .iter()
            .all(|diagnostic| diagnostic.severity == miette::Severity::Warning));
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn test_from_error_at_end_of_file() {
        let source = "node start\n  say \"open";
        let outcome = check_source(source);
        let diagnostics = script_diagnostics(&outcome, MinSeverity::Error, "open.tome", source);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].label, "lexical error");
        assert_eq!(diagnostics[0].code, "UnterminatedString");
        assert!(diagnostics[0].help.is_some());
        assert!(diagnostics[0].span.offset() <= source.len());
    }

    #[test]
    fn test_diagnostic_code_is_namespaced() {
        let source = "node start\nend\n";
        let outcome = check_source(source);
        let diagnostics = script_diagnostics(&outcome, MinSeverity::Error, "e.tome", source);

        assert_eq!(
            diagnostics[0].code().map(|code| code.to_string()),
            Some(String::from("tome::empty_node"))
        );
    }

    #[test]
    fn test_json_report_for_syntax_errors() {
        let source = "node start\n  goto next\nend\n";
        let report = json_report("s.tome", &check_source(source), MinSeverity::Suggestion);

        assert_eq!(report["type"], "syntax_errors");
        assert_eq!(report["file"], "s.tome");
        assert_eq!(report["valid"], false);
        assert_eq!(report["errors"][0]["line"], 2);
        assert_eq!(report["warnings"], json!([]));
    }

    #[test]
    fn test_read_error_report() {
        let report = miette::miette!("failed to read gone.tome");
        let json = read_error_report("gone.tome", &report);

        assert_eq!(json["type"], "read_error");
        assert_eq!(json["valid"], false);
        assert!(json["errors"][0]["message"]
            .as_str()
            .unwrap()
            .contains("gone.tome"));
    }

    #[test]
    fn test_json_report_for_analysis() {
        let source = "node start\n  @g = 100\nend\n";
        let report = json_report("g.tome", &check_source(source), MinSeverity::Warning);

        assert_eq!(report["type"], "analysis_issues");
        assert_eq!(report["valid"], true);
        assert_eq!(report["warnings"][0]["type"], "dead_end");
        assert_eq!(report["suggestions"], json!([]));
    }
}
