use crate::{
    ast::expressions::{
        BinaryExpr, BinaryOperator, CallExpr, Expression, LiteralExpr, LiteralValue, UnaryExpr,
        UnaryOperator, VariableExpr,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{lookups::BindingPower, parser::Parser, stmt::expect_identifier};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expression, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected("expression"));
    };

    let mut left = nud(parser)?;

    // While the next operator binds tighter than `bp`, keep extending the lhs
    loop {
        let token_kind = parser.current_token_kind();
        let operator_bp = parser
            .get_bp_lookup()
            .get(&token_kind)
            .copied()
            .unwrap_or(BindingPower::Default);
        if operator_bp <= bp {
            break;
        }

        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(parser.unexpected("operator"));
        };
        left = led(parser, left, operator_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expression, Error> {
    let token = parser.current_token();
    let value = match token.kind {
        TokenKind::Number => match token.value.parse::<f64>() {
            Ok(number) => LiteralValue::Number(number),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError {
                        token: token.value.clone(),
                    },
                    token.span.start,
                ))
            }
        },
        TokenKind::String => LiteralValue::String(token.value.clone()),
        TokenKind::True => LiteralValue::Boolean(true),
        TokenKind::False => LiteralValue::Boolean(false),
        _ => return Err(parser.unexpected("literal")),
    };

    let span = parser.advance().span;
    Ok(Expression::Literal(LiteralExpr { value, span }))
}

/// `@name`
pub fn parse_variable_expr(parser: &mut Parser) -> Result<Expression, Error> {
    let start = parser.advance().span.start;
    let name = expect_identifier(parser, "variable name")?;

    Ok(Expression::Variable(VariableExpr {
        name: name.value,
        span: Span::new(start, name.span.end),
    }))
}

/// `name(args...)`. A bare identifier is only valid as a callee.
pub fn parse_call_expr(parser: &mut Parser) -> Result<Expression, Error> {
    let name = parser.current_token().clone();
    if parser.peek_token().kind != TokenKind::OpenParen {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                expected: String::from("expression"),
                found: name.to_string(),
                message: format!("variables are written with '@', e.g. @{}", name.value),
            },
            name.span.start,
        ));
    }
    parser.advance();
    parser.advance();

    let mut args = vec![];
    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            args.push(parse_expr(parser, BindingPower::Default)?);
            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
        }
    }

    let close = parser.expect(TokenKind::CloseParen)?;

    Ok(Expression::FunctionCall(CallExpr {
        name: name.value,
        args,
        span: Span::new(name.span.start, close.span.end),
    }))
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: Expression,
    bp: BindingPower,
) -> Result<Expression, Error> {
    let Some(operator) = BinaryOperator::from_token_kind(parser.current_token_kind()) else {
        return Err(parser.unexpected("operator"));
    };
    parser.advance();

    let right = parse_expr(parser, bp)?;

    Ok(Expression::BinaryOp(BinaryExpr {
        span: Span::new(left.span().start, right.span().end),
        operator,
        left: Box::new(left),
        right: Box::new(right),
    }))
}

/// `!operand` or `-operand`
pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expression, Error> {
    let Some(operator) = UnaryOperator::from_token_kind(parser.current_token_kind()) else {
        return Err(parser.unexpected("'!' or '-'"));
    };
    let start = parser.advance().span.start;
    let operand = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expression::UnaryOp(UnaryExpr {
        span: Span::new(start, operand.span().end),
        operator,
        operand: Box::new(operand),
    }))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expression, Error> {
    parser.advance();
    let expression = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expression)
}
