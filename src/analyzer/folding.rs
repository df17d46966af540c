//! Constant folding for choice conditions.
//!
//! Comparisons use loose equality: operands of different types are compared
//! as numbers, so `"1" == 1` and `true == 1` both fold to `true`. `&&` and
//! `||` return one of their operands, as in the scripting runtime.

use std::cmp::Ordering;

use crate::ast::expressions::{BinaryOperator, Expression, LiteralValue, UnaryOperator};

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Number(f64),
    String(String),
    Boolean(bool),
}

impl Constant {
    pub fn is_truthy(&self) -> bool {
        match self {
            Constant::Number(value) => *value != 0.0 && !value.is_nan(),
            Constant::String(value) => !value.is_empty(),
            Constant::Boolean(value) => *value,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Constant::Number(value) => *value,
            Constant::Boolean(value) => {
                if *value {
                    1.0
                } else {
                    0.0
                }
            }
            Constant::String(value) => string_to_number(value),
        }
    }
}

/// Numeric value of a string operand: blank is 0, unparseable is NaN.
fn string_to_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16)
            .map(|value| value as f64)
            .unwrap_or(f64::NAN);
    }

    // Rust also accepts spellings such as "inf" and "nan" that are not numbers here.
    if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

pub fn loose_equals(left: &Constant, right: &Constant) -> bool {
    match (left, right) {
        (Constant::String(a), Constant::String(b)) => a == b,
        (Constant::Boolean(a), Constant::Boolean(b)) => a == b,
        _ => left.to_number() == right.to_number(),
    }
}

/// Strings compare lexically with each other, everything else numerically.
/// `None` when either side is NaN.
fn compare(left: &Constant, right: &Constant) -> Option<Ordering> {
    match (left, right) {
        (Constant::String(a), Constant::String(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}

/// Evaluates `expression` when it is built only from literals and supported
/// operators. Variables, calls, arithmetic and negation yield `None`.
pub fn fold(expression: &Expression) -> Option<Constant> {
    match expression {
        Expression::Literal(literal) => Some(match &literal.value {
            LiteralValue::Number(value) => Constant::Number(*value),
            LiteralValue::String(value) => Constant::String(value.clone()),
            LiteralValue::Boolean(value) => Constant::Boolean(*value),
        }),
        Expression::UnaryOp(unary) => match unary.operator {
            UnaryOperator::Not => fold(&unary.operand).map(|value| Constant::Boolean(!value.is_truthy())),
            UnaryOperator::Negate => None,
        },
        Expression::BinaryOp(binary) => {
            let left = fold(&binary.left)?;
            let right = fold(&binary.right)?;

            match binary.operator {
                BinaryOperator::And => Some(if left.is_truthy() { right } else { left }),
                BinaryOperator::Or => Some(if left.is_truthy() { left } else { right }),
                BinaryOperator::Equals => Some(Constant::Boolean(loose_equals(&left, &right))),
                BinaryOperator::NotEquals => Some(Constant::Boolean(!loose_equals(&left, &right))),
                BinaryOperator::Less => Some(Constant::Boolean(compare(&left, &right) == Some(Ordering::Less))),
                BinaryOperator::LessEquals => Some(Constant::Boolean(matches!(
                    compare(&left, &right),
                    Some(Ordering::Less | Ordering::Equal)
                ))),
                BinaryOperator::Greater => Some(Constant::Boolean(compare(&left, &right) == Some(Ordering::Greater))),
                BinaryOperator::GreaterEquals => Some(Constant::Boolean(matches!(
                    compare(&left, &right),
                    Some(Ordering::Greater | Ordering::Equal)
                ))),
                BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide => None,
            }
        }
        Expression::Variable(_) | Expression::FunctionCall(_) => None,
    }
}

/// A condition that folds to exactly `false`.
pub fn is_always_false(condition: &Expression) -> bool {
    fold(condition) == Some(Constant::Boolean(false))
}
