use std::fmt::{self, Display};

use crate::{lexer::tokens::TokenKind, Span};

use super::expressions::{escape_string, BinaryOperator, Expression};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOperator {
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
}

impl AssignOperator {
    pub fn from_token_kind(kind: TokenKind) -> Option<AssignOperator> {
        match kind {
            TokenKind::Assignment => Some(AssignOperator::Assign),
            TokenKind::PlusEquals => Some(AssignOperator::AddAssign),
            TokenKind::MinusEquals => Some(AssignOperator::SubtractAssign),
            TokenKind::StarEquals => Some(AssignOperator::MultiplyAssign),
            TokenKind::SlashEquals => Some(AssignOperator::DivideAssign),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            AssignOperator::Assign => "=",
            AssignOperator::AddAssign => "+=",
            AssignOperator::SubtractAssign => "-=",
            AssignOperator::MultiplyAssign => "*=",
            AssignOperator::DivideAssign => "/=",
        }
    }

    /// The arithmetic a compound assignment performs, `None` for plain `=`.
    pub fn binary(&self) -> Option<BinaryOperator> {
        match self {
            AssignOperator::Assign => None,
            AssignOperator::AddAssign => Some(BinaryOperator::Add),
            AssignOperator::SubtractAssign => Some(BinaryOperator::Subtract),
            AssignOperator::MultiplyAssign => Some(BinaryOperator::Multiply),
            AssignOperator::DivideAssign => Some(BinaryOperator::Divide),
        }
    }
}

impl Display for AssignOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// `@variable op value`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStmt {
    pub variable: String,
    pub operator: AssignOperator,
    pub value: Expression,
    pub span: Span,
}

/// An expression embedded in a Say text. `start..end` is the byte range of
/// its `#{...}` placeholder inside [`SayStmt::text`].
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolation {
    pub expression: Expression,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SayStmt {
    pub text: String,
    pub interpolations: Vec<Interpolation>,
    pub span: Span,
}

/// `choice "text", :target` with an optional `, if: condition` guard.
///
/// `text_span` covers the text literal and `target_span` starts at the colon
/// of the node reference, so diagnostics can point at either.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceStmt {
    pub text: String,
    pub target: String,
    pub condition: Option<Expression>,
    pub span: Span,
    pub text_span: Span,
    pub target_span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GotoStmt {
    pub target: String,
    pub span: Span,
    pub target_span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assignment(AssignmentStmt),
    Say(SayStmt),
    Choice(ChoiceStmt),
    Goto(GotoStmt),
}

impl Statement {
    pub fn span(&self) -> &Span {
        match self {
            Statement::Assignment(assignment) => &assignment.span,
            Statement::Say(say) => &say.span,
            Statement::Choice(choice) => &choice.span,
            Statement::Goto(goto) => &goto.span,
        }
    }

    /// The node this statement navigates to, with the span of the reference.
    pub fn target(&self) -> Option<(&str, &Span)> {
        match self {
            Statement::Choice(choice) => Some((&choice.target, &choice.target_span)),
            Statement::Goto(goto) => Some((&goto.target, &goto.target_span)),
            _ => None,
        }
    }

    /// The top-level expressions held by this statement.
    pub fn expressions(&self) -> Vec<&Expression> {
        match self {
            Statement::Assignment(assignment) => vec![&assignment.value],
            Statement::Say(say) => say
                .interpolations
                .iter()
                .map(|interpolation| &interpolation.expression)
                .collect(),
            Statement::Choice(choice) => choice.condition.iter().collect(),
            Statement::Goto(_) => vec![],
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Assignment(assignment) => write!(
                f,
                "@{} {} {}",
                assignment.variable, assignment.operator, assignment.value
            ),
            Statement::Say(say) => {
                // Literal runs are escaped; placeholders are already source text.
                write!(f, "say \"")?;
                let mut cursor = 0;
                for interpolation in &say.interpolations {
                    write!(f, "{}", escape_string(&say.text[cursor..interpolation.start]))?;
                    write!(f, "{}", &say.text[interpolation.start..interpolation.end])?;
                    cursor = interpolation.end;
                }
                write!(f, "{}\"", escape_string(&say.text[cursor..]))
            }
            Statement::Choice(choice) => {
                write!(f, "choice \"{}\", :{}", escape_string(&choice.text), choice.target)?;
                if let Some(condition) = &choice.condition {
                    write!(f, ", if: {}", condition)?;
                }
                Ok(())
            }
            Statement::Goto(goto) => write!(f, "goto :{}", goto.target),
        }
    }
}
