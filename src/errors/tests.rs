//! Unit tests for error handling.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::Position;

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnexpectedCharacter { character: '$' },
        Position::new(3, 7),
    );

    assert_eq!(error.get_error_name(), "UnexpectedCharacter");
    assert!(error.is_lexical());
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            expected: "':'".to_string(),
            found: "identifier `next`".to_string(),
        },
        Position::new(2, 8),
    );

    assert_eq!(error.get_position().line, 2);
    assert_eq!(error.get_position().column, 8);
    assert!(!error.is_lexical());
}

#[test]
fn test_unexpected_token_message() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            expected: "node name".to_string(),
            found: "end of line".to_string(),
        },
        Position::new(1, 5),
    );

    assert_eq!(error.message(), "expected node name, got end of line");
    assert_eq!(
        error.to_string(),
        "expected node name, got end of line at line 1, column 5"
    );
}

#[test]
fn test_invalid_dedent_message() {
    let error = Error::new(ErrorImpl::InvalidDedent { level: 3 }, Position::new(4, 1));

    assert_eq!(error.get_error_name(), "InvalidDedent");
    assert_eq!(error.message(), "invalid dedentation level 3");
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::UnexpectedCharacter { character: '$' },
        Position::start(),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            expected: "':'".to_string(),
            found: "identifier `next`".to_string(),
            message: "node references start with ':'".to_string(),
        },
        Position::start(),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(tip) => assert_eq!(tip, "node references start with ':'"),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_excerpt_points_at_column() {
    let source = "node start\n  goto next\nend\n";
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            expected: "':'".to_string(),
            found: "identifier `next`".to_string(),
        },
        Position::new(2, 8),
    );

    assert_eq!(error.excerpt(source), "  |\n2 | goto next\n  | -----^");
}

#[test]
fn test_excerpt_out_of_range_is_empty() {
    let error = Error::new(ErrorImpl::UnterminatedString, Position::new(40, 1));
    assert_eq!(error.excerpt("node start\n"), "");
}

#[test]
fn test_display_includes_file_and_tip() {
    let source = "node start\n\tsay \"x\"\n";
    let error = Error::new(
        ErrorImpl::InconsistentIndentation {
            expected: "spaces",
            found: "tabs",
        },
        Position::new(2, 1),
    );

    let rendered = error.display(source, "story.tome");
    assert!(rendered.starts_with(
        "Error: inconsistent indentation: expected spaces, found tabs (this file is indented with spaces)"
    ));
    assert!(rendered.contains("-> story.tome:2:1"));
    assert!(rendered.ends_with("2 | say \"x\"\n  | ^"));
}
