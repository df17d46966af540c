use crate::{
    ast::{
        ast::DialogueNode,
        statements::{
            AssignOperator, AssignmentStmt, ChoiceStmt, GotoStmt, Interpolation, SayStmt,
            Statement,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    parser::{expr::parse_expr, lookups::BindingPower},
    Span,
};

use super::parser::Parser;

const COMMA_HINT: &str = "separate choice parameters with ','";

/// `node id NEWLINE (INDENT statement* DEDENT)? end`
pub fn parse_node(parser: &mut Parser) -> Result<DialogueNode, Error> {
    let error = parser.unexpected_with_hint("'node'", "scripts are made of `node <name> ... end` blocks");
    let start = parser.expect_error(TokenKind::Node, Some(error))?.span.start;
    let id = expect_identifier(parser, "node name")?.value;
    parser.expect(TokenKind::Newline)?;

    let mut statements = vec![];
    if parser.current_token_kind() == TokenKind::Indent {
        parser.advance();
        parse_block(parser, &mut statements);
        parser.expect(TokenKind::Dedent)?;
    }

    let error = parser.unexpected_with_hint(
        "'end'",
        format!("close node '{}' with 'end' at the indentation of its 'node' line", id),
    );
    let end = parser.expect_error(TokenKind::End, Some(error))?.span.end;

    Ok(DialogueNode {
        id,
        statements,
        span: Span::new(start, end),
    })
}

/// Parses statements up to the DEDENT closing the block, recording and
/// recovering from every broken statement.
fn parse_block(parser: &mut Parser, statements: &mut Vec<Statement>) {
    loop {
        match parser.current_token_kind() {
            TokenKind::Dedent | TokenKind::EOF => return,
            TokenKind::Newline => {
                parser.advance();
            }
            TokenKind::Indent => {
                let position = parser.current_token().span.start;
                parser.record_error(Error::new(ErrorImpl::UnexpectedIndentation, position));
                parser.skip_block();
            }
            _ => match parse_stmt(parser) {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    parser.record_error(error);
                    parser.synchronize_statement();
                }
            },
        }
    }
}

pub fn parse_stmt(parser: &mut Parser) -> Result<Statement, Error> {
    let kind = parser.current_token_kind();
    if let Some(handler) = parser.get_stmt_lookup().get(&kind).copied() {
        return handler(parser);
    }

    let token = parser.current_token();
    Err(match kind {
        TokenKind::End => parser.unexpected_with_hint(
            "statement",
            "'end' must line up with the 'node' it closes",
        ),
        TokenKind::Identifier => parser.unexpected_with_hint(
            "statement",
            format!("assignments start with '@', e.g. @{} = 1", token.value),
        ),
        _ => parser.unexpected("statement"),
    })
}

/// `@name op expression NEWLINE`
pub fn parse_assignment_stmt(parser: &mut Parser) -> Result<Statement, Error> {
    let start = parser.advance().span.start;
    let variable = expect_identifier(parser, "variable name")?.value;

    let Some(operator) = AssignOperator::from_token_kind(parser.current_token_kind()) else {
        return Err(parser.unexpected("assignment operator"));
    };
    parser.advance();

    let value = parse_expr(parser, BindingPower::Default)?;
    let end = value.span().end;
    parser.expect(TokenKind::Newline)?;

    Ok(Statement::Assignment(AssignmentStmt {
        variable,
        operator,
        value,
        span: Span::new(start, end),
    }))
}

/// `say (STRING | interpolation)* NEWLINE`
///
/// Literal runs are concatenated; each interpolation is written into the
/// text as a `#{...}` placeholder whose byte range the [`Interpolation`]
/// records.
pub fn parse_say_stmt(parser: &mut Parser) -> Result<Statement, Error> {
    let say = parser.advance();
    let mut end = say.span.end;
    let mut text = String::new();
    let mut interpolations = vec![];

    loop {
        match parser.current_token_kind() {
            TokenKind::String => {
                let token = parser.advance();
                text.push_str(&token.value);
                end = token.span.end;
            }
            TokenKind::InterpolationStart => {
                parser.advance();
                let expression = parse_expr(parser, BindingPower::Default)?;
                end = parser.expect(TokenKind::InterpolationEnd)?.span.end;

                let start = text.len();
                text.push_str(&format!("#{{{}}}", expression));
                interpolations.push(Interpolation {
                    expression,
                    start,
                    end: text.len(),
                });
            }
            _ => break,
        }
    }

    parser.expect(TokenKind::Newline)?;

    Ok(Statement::Say(SayStmt {
        text,
        interpolations,
        span: Span::new(say.span.start, end),
    }))
}

/// `choice STRING, :target (, if: expression)? NEWLINE`
pub fn parse_choice_stmt(parser: &mut Parser) -> Result<Statement, Error> {
    let start = parser.advance().span.start;

    let text_token = parser.expect(TokenKind::String)?;
    if parser.current_token_kind() == TokenKind::InterpolationStart {
        return Err(parser.unexpected_with_hint(
            "','",
            "choice text cannot contain interpolations",
        ));
    }

    expect_comma(parser)?;
    let (target, target_span) = parse_node_reference(parser)?;
    let mut end = target_span.end;

    let condition = if parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        let error = parser.unexpected_with_hint("'if'", "conditions are written as `if: <expression>`");
        parser.expect_error(TokenKind::If, Some(error))?;
        let error = parser.unexpected_with_hint("':'", "conditions are written as `if: <expression>`");
        parser.expect_error(TokenKind::Colon, Some(error))?;

        let condition = parse_expr(parser, BindingPower::Default)?;
        end = condition.span().end;
        Some(condition)
    } else {
        None
    };

    if parser.current_token_kind() != TokenKind::Newline {
        return Err(parser.unexpected_with_hint("end of line", COMMA_HINT));
    }
    parser.advance();

    Ok(Statement::Choice(ChoiceStmt {
        text: text_token.value,
        target,
        condition,
        span: Span::new(start, end),
        text_span: text_token.span,
        target_span,
    }))
}

/// `goto :target NEWLINE`
pub fn parse_goto_stmt(parser: &mut Parser) -> Result<Statement, Error> {
    let start = parser.advance().span.start;
    let (target, target_span) = parse_node_reference(parser)?;
    parser.expect(TokenKind::Newline)?;

    Ok(Statement::Goto(GotoStmt {
        target,
        span: Span::new(start, target_span.end),
        target_span,
    }))
}

/// `:name`, returning the name and a span starting at the colon.
fn parse_node_reference(parser: &mut Parser) -> Result<(String, Span), Error> {
    if parser.current_token_kind() == TokenKind::Identifier {
        let name = parser.current_token().value.clone();
        return Err(parser.unexpected_with_hint(
            "':'",
            format!("node references start with ':', e.g. :{}", name),
        ));
    }

    let colon = parser.expect(TokenKind::Colon)?;
    let name = expect_identifier(parser, "node name")?;

    Ok((name.value, Span::new(colon.span.start, name.span.end)))
}

fn expect_comma(parser: &mut Parser) -> Result<Token, Error> {
    let error = parser.unexpected_with_hint("','", COMMA_HINT);
    parser.expect_error(TokenKind::Comma, Some(error))
}

/// Expects an identifier, pointing out reserved words used as names.
pub fn expect_identifier(parser: &mut Parser, what: &str) -> Result<Token, Error> {
    let token = parser.current_token();
    if token.kind.is_keyword() {
        let hint = format!(
            "'{}' is a reserved keyword and cannot be used as a {}",
            token.value, what
        );
        return Err(parser.unexpected_with_hint(what, hint));
    }

    let error = parser.unexpected(what);
    parser.expect_error(TokenKind::Identifier, Some(error))
}
