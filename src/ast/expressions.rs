use std::fmt::{self, Display};

use crate::{lexer::tokens::TokenKind, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Boolean(bool),
}

impl Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Number(value) => write!(f, "{}", value),
            LiteralValue::String(value) => write!(f, "\"{}\"", escape_string(value)),
            LiteralValue::Boolean(value) => write!(f, "{}", value),
        }
    }
}

/// Escapes text so it can be placed back between double quotes.
pub fn escape_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Or,
    And,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    pub fn from_token_kind(kind: TokenKind) -> Option<BinaryOperator> {
        Some(match kind {
            TokenKind::Or => BinaryOperator::Or,
            TokenKind::And => BinaryOperator::And,
            TokenKind::Equals => BinaryOperator::Equals,
            TokenKind::NotEquals => BinaryOperator::NotEquals,
            TokenKind::Less => BinaryOperator::Less,
            TokenKind::LessEquals => BinaryOperator::LessEquals,
            TokenKind::Greater => BinaryOperator::Greater,
            TokenKind::GreaterEquals => BinaryOperator::GreaterEquals,
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Dash => BinaryOperator::Subtract,
            TokenKind::Star => BinaryOperator::Multiply,
            TokenKind::Slash => BinaryOperator::Divide,
            _ => return None,
        })
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Or => "||",
            BinaryOperator::And => "&&",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEquals => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEquals => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
        )
    }

    /// `<`, `<=`, `>` and `>=`.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Less
                | BinaryOperator::LessEquals
                | BinaryOperator::Greater
                | BinaryOperator::GreaterEquals
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Negate,
}

impl UnaryOperator {
    pub fn from_token_kind(kind: TokenKind) -> Option<UnaryOperator> {
        match kind {
            TokenKind::Not => Some(UnaryOperator::Not),
            TokenKind::Dash => Some(UnaryOperator::Negate),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Negate => "-",
        }
    }
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// LITERALS

/// Number, string or boolean literal.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: LiteralValue,
    pub span: Span,
}

/// `@name`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableExpr {
    pub name: String,
    pub span: Span,
}

// COMPOUND

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
    pub span: Span,
}

/// Call of a built-in function, e.g. `random(1, 6)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(LiteralExpr),
    Variable(VariableExpr),
    BinaryOp(BinaryExpr),
    UnaryOp(UnaryExpr),
    FunctionCall(CallExpr),
}

impl Expression {
    pub fn span(&self) -> &Span {
        match self {
            Expression::Literal(literal) => &literal.span,
            Expression::Variable(variable) => &variable.span,
            Expression::BinaryOp(binary) => &binary.span,
            Expression::UnaryOp(unary) => &unary.span,
            Expression::FunctionCall(call) => &call.span,
        }
    }

    /// Visits this expression and every sub-expression, parents first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expression)) {
        visit(self);
        match self {
            Expression::Literal(_) | Expression::Variable(_) => {}
            Expression::BinaryOp(binary) => {
                binary.left.walk(visit);
                binary.right.walk(visit);
            }
            Expression::UnaryOp(unary) => unary.operand.walk(visit),
            Expression::FunctionCall(call) => {
                for arg in &call.args {
                    arg.walk(visit);
                }
            }
        }
    }

    /// Every variable read anywhere in the expression.
    pub fn variables(&self) -> Vec<&VariableExpr> {
        let mut variables = vec![];
        self.walk(&mut |expression| {
            if let Expression::Variable(variable) = expression {
                variables.push(variable);
            }
        });
        variables
    }

    /// Every function call anywhere in the expression, including calls nested
    /// in other calls' arguments.
    pub fn calls(&self) -> Vec<&CallExpr> {
        let mut calls = vec![];
        self.walk(&mut |expression| {
            if let Expression::FunctionCall(call) = expression {
                calls.push(call);
            }
        });
        calls
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(literal) => write!(f, "{}", literal.value),
            Expression::Variable(variable) => write!(f, "@{}", variable.name),
            Expression::BinaryOp(binary) => {
                write!(f, "({} {} {})", binary.left, binary.operator, binary.right)
            }
            Expression::UnaryOp(unary) => write!(f, "{}{}", unary.operator, unary.operand),
            Expression::FunctionCall(call) => {
                write!(f, "{}(", call.name)?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
