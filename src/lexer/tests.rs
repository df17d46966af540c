//! Unit tests for the lexer module.
//!
//! - Keywords, identifiers, numbers and operators
//! - String literals, escapes and interpolation
//! - Indentation tracking and line handling
//! - Error cases, batch and streaming

use super::{
    lexer::{lex, tokenize, Lexer},
    tokens::TokenKind,
};
use crate::{errors::errors::ErrorImpl, Position};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).unwrap().iter().map(|token| token.kind).collect()
}

#[test]
fn test_tokenize_keywords() {
    let tokens = tokenize("node say choice goto if end true false").unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Node);
    assert_eq!(tokens[1].kind, TokenKind::Say);
    assert_eq!(tokens[2].kind, TokenKind::Choice);
    assert_eq!(tokens[3].kind, TokenKind::Goto);
    assert_eq!(tokens[4].kind, TokenKind::If);
    assert_eq!(tokens[5].kind, TokenKind::End);
    assert_eq!(tokens[6].kind, TokenKind::True);
    assert_eq!(tokens[7].kind, TokenKind::False);
    assert_eq!(tokens[8].kind, TokenKind::Newline);
    assert_eq!(tokens[9].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_identifiers() {
    let tokens = tokenize("foo baz_123 _underscore CamelCase nodes").unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[1].value, "baz_123");
    assert_eq!(tokens[2].value, "_underscore");
    assert_eq!(tokens[3].value, "CamelCase");
    assert_eq!(tokens[4].kind, TokenKind::Identifier);
    assert_eq!(tokens[4].value, "nodes");
}

#[test]
fn test_tokenize_numbers() {
    let tokens = tokenize("42 3.14 0 100.5").unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].value, "0");
    assert_eq!(tokens[3].value, "100.5");
    assert_eq!(tokens[4].kind, TokenKind::Newline);
}

#[test]
fn test_tokenize_strings() {
    let tokens = tokenize(r#""hello" "multiple words""#).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello");
    assert_eq!(tokens[1].kind, TokenKind::String);
    assert_eq!(tokens[1].value, "multiple words");
    assert_eq!(tokens[2].kind, TokenKind::Newline);
    assert_eq!(tokens[3].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_empty_string() {
    let tokens = tokenize(r#""""#).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "");
    assert_eq!(tokens[1].kind, TokenKind::Newline);
}

#[test]
fn test_tokenize_string_escapes() {
    let tokens = tokenize(r#""a\nb" "t\tx" "q\"x" "b\\" "r\r" "u\q""#).unwrap();

    assert_eq!(tokens[0].value, "a\nb");
    assert_eq!(tokens[1].value, "t\tx");
    assert_eq!(tokens[2].value, "q\"x");
    assert_eq!(tokens[3].value, "b\\");
    assert_eq!(tokens[4].value, "r\r");
    assert_eq!(tokens[5].value, "u\\q");
}

#[test]
fn test_tokenize_interpolation() {
    let tokens = tokenize(r#"say "Hi #{@name}!""#).unwrap();
    let kinds: Vec<TokenKind> = tokens.iter().map(|token| token.kind).collect();

    assert_eq!(
        kinds,
        vec![
            TokenKind::Say,
            TokenKind::String,
            TokenKind::InterpolationStart,
            TokenKind::At,
            TokenKind::Identifier,
            TokenKind::InterpolationEnd,
            TokenKind::String,
            TokenKind::Newline,
            TokenKind::EOF,
        ]
    );
    assert_eq!(tokens[1].value, "Hi ");
    assert_eq!(tokens[4].value, "name");
    assert_eq!(tokens[6].value, "!");
}

#[test]
fn test_tokenize_interpolation_with_call() {
    assert_eq!(
        kinds(r##""#{random(1, 2)}""##),
        vec![
            TokenKind::InterpolationStart,
            TokenKind::Identifier,
            TokenKind::OpenParen,
            TokenKind::Number,
            TokenKind::Comma,
            TokenKind::Number,
            TokenKind::CloseParen,
            TokenKind::InterpolationEnd,
            TokenKind::Newline,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_hash_without_brace_stays_in_string() {
    let tokens = tokenize(r##""#1 fan""##).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "#1 fan");
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("== != >= <= && || += -= *= /= = + - * / > < ! @ : , ( )"),
        vec![
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::GreaterEquals,
            TokenKind::LessEquals,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::PlusEquals,
            TokenKind::MinusEquals,
            TokenKind::StarEquals,
            TokenKind::SlashEquals,
            TokenKind::Assignment,
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Greater,
            TokenKind::Less,
            TokenKind::Not,
            TokenKind::At,
            TokenKind::Colon,
            TokenKind::Comma,
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::Newline,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_operators_without_spaces() {
    assert_eq!(
        kinds("@gold>=10"),
        vec![
            TokenKind::At,
            TokenKind::Identifier,
            TokenKind::GreaterEquals,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_comments_are_discarded() {
    assert_eq!(
        kinds("say \"x\" # trailing\n# whole line\n"),
        vec![TokenKind::Say, TokenKind::String, TokenKind::Newline, TokenKind::EOF]
    );
}

#[test]
fn test_indentation_block() {
    assert_eq!(
        kinds("node a\n  say \"x\"\n  goto :b\nend\n"),
        vec![
            TokenKind::Node,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Say,
            TokenKind::String,
            TokenKind::Newline,
            TokenKind::Goto,
            TokenKind::Colon,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::End,
            TokenKind::Newline,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_indent_token_carries_level() {
    let tokens = tokenize("a\n    b\n").unwrap();
    assert_eq!(tokens[2].kind, TokenKind::Indent);
    assert_eq!(tokens[2].value, "4");
}

#[test]
fn test_multiple_dedents() {
    assert_eq!(
        kinds("a\n  b\n    c\nd\n"),
        vec![
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Dedent,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_eof_closes_open_blocks() {
    assert_eq!(
        kinds("a\n  b"),
        vec![
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_blank_and_comment_lines_ignored() {
    assert_eq!(
        kinds("a\n\n   \n      # note\n  b\n"),
        vec![
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_line_endings_and_positions() {
    let tokens = tokenize("a\r\n  b\rc").unwrap();

    assert_eq!(tokens[0].span.start, Position::new(1, 1));
    assert_eq!(tokens[2].kind, TokenKind::Indent);
    assert_eq!(tokens[3].value, "b");
    assert_eq!(tokens[3].span.start, Position::new(2, 3));
    assert_eq!(tokens[5].kind, TokenKind::Dedent);
    assert_eq!(tokens[6].value, "c");
    assert_eq!(tokens[6].span.start, Position::new(3, 1));
}

#[test]
fn test_string_token_starts_at_quote() {
    let tokens = tokenize("node start\n  say \"Hi\"\n").unwrap();

    assert_eq!(tokens[4].kind, TokenKind::Say);
    assert_eq!(tokens[4].span.start, Position::new(2, 3));
    assert_eq!(tokens[5].kind, TokenKind::String);
    assert_eq!(tokens[5].span.start, Position::new(2, 7));
    assert_eq!(tokens[5].span.end, Position::new(2, 11));
}

#[test]
fn test_unexpected_character() {
    let error = tokenize("node $a").unwrap_err();

    assert_eq!(
        error.get_error_impl(),
        &ErrorImpl::UnexpectedCharacter { character: '$' }
    );
    assert_eq!(*error.get_position(), Position::new(1, 6));
}

#[test]
fn test_unterminated_string() {
    let error = tokenize("say \"abc").unwrap_err();

    assert_eq!(error.get_error_impl(), &ErrorImpl::UnterminatedString);
    assert_eq!(*error.get_position(), Position::new(1, 5));
}

#[test]
fn test_unterminated_interpolation() {
    let error = tokenize("say \"#{@x").unwrap_err();

    assert_eq!(error.get_error_impl(), &ErrorImpl::UnterminatedInterpolation);
    assert_eq!(*error.get_position(), Position::new(1, 6));
}

#[test]
fn test_mixed_indentation() {
    let error = tokenize("a\n \tb\n").unwrap_err();

    assert_eq!(error.get_error_impl(), &ErrorImpl::MixedIndentation);
    assert_eq!(*error.get_position(), Position::new(2, 1));
}

#[test]
fn test_inconsistent_indentation() {
    let error = tokenize("a\n  b\nc\n\td\n").unwrap_err();

    assert_eq!(
        error.get_error_impl(),
        &ErrorImpl::InconsistentIndentation {
            expected: "spaces",
            found: "tabs"
        }
    );
    assert_eq!(*error.get_position(), Position::new(4, 1));
}

#[test]
fn test_invalid_dedent() {
    let error = tokenize("a\n    b\n  c\n").unwrap_err();

    assert_eq!(error.get_error_impl(), &ErrorImpl::InvalidDedent { level: 2 });
    assert_eq!(*error.get_position(), Position::new(3, 1));
}

#[test]
fn test_lex_collects_all_errors() {
    let result = lex("a $ b %\nc\n");

    assert!(!result.valid);
    assert_eq!(result.errors.len(), 2);
    assert!(result.tokens.is_empty());
    assert_eq!(*result.errors[1].get_position(), Position::new(1, 7));
}

#[test]
fn test_lex_valid_source() {
    let result = lex("node start\n  say \"Hello!\"\nend\n");

    assert!(result.valid);
    assert!(result.errors.is_empty());
    assert_eq!(result.tokens.last().map(|token| token.kind), Some(TokenKind::EOF));
}

#[test]
fn test_streaming_lexer_stops_at_first_error() {
    let items: Vec<_> = Lexer::new("a $ b $").collect();

    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(items[1].is_err());
}

#[test]
fn test_lexer_current_position_through_handlers() {
    let mut lexer = Lexer::new("node start\n");
    assert_eq!(lexer.current_position(), Position::new(1, 1));

    let first = lexer.next().unwrap().unwrap();
    assert_eq!(first.kind, TokenKind::Node);
    assert_eq!(first.span.end, Position::new(1, 5));

    lexer.advance_n(1);
    assert_eq!(lexer.current_position(), Position::new(1, 6));
}
