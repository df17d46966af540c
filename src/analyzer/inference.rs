use std::{
    collections::HashMap,
    fmt::{self, Display},
};

use crate::ast::expressions::{BinaryExpr, Expression, LiteralValue, UnaryOperator};

use super::{
    builtins::BUILTIN_FUNCTIONS,
    diagnostics::{Diagnostic, DiagnosticKind},
};

/// Static type of an expression. `Any` is unknown and matches everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InferredType {
    Number,
    String,
    Boolean,
    Any,
}

impl Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferredType::Number => write!(f, "number"),
            InferredType::String => write!(f, "string"),
            InferredType::Boolean => write!(f, "boolean"),
            InferredType::Any => write!(f, "any"),
        }
    }
}

/// Variable name to the type it was last assigned.
#[derive(Debug, Default, Clone)]
pub struct TypeEnvironment {
    variables: HashMap<String, InferredType>,
}

impl TypeEnvironment {
    pub fn new() -> Self {
        TypeEnvironment::default()
    }

    /// Builds the environment from assignments in program order, each
    /// variable keeping the type of its last assignment.
    pub fn from_assignments<'a>(assignments: impl IntoIterator<Item = (&'a str, &'a Expression)>) -> Self {
        let mut environment = TypeEnvironment::new();
        let mut ignored = vec![];
        for (variable, value) in assignments {
            let inferred = environment.infer(value, &mut ignored);
            environment.variables.insert(variable.to_string(), inferred);
        }
        environment
    }

    pub fn get(&self, variable: &str) -> InferredType {
        self.variables
            .get(variable)
            .copied()
            .unwrap_or(InferredType::Any)
    }

    /// Infers the type of `expression`, pushing a `type_mismatch` for every
    /// binary operation whose operands have the wrong type.
    pub fn infer(&self, expression: &Expression, mismatches: &mut Vec<Diagnostic>) -> InferredType {
        match expression {
            Expression::Literal(literal) => match literal.value {
                LiteralValue::Number(_) => InferredType::Number,
                LiteralValue::String(_) => InferredType::String,
                LiteralValue::Boolean(_) => InferredType::Boolean,
            },
            Expression::Variable(variable) => self.get(&variable.name),
            Expression::FunctionCall(call) => {
                for arg in &call.args {
                    self.infer(arg, mismatches);
                }
                BUILTIN_FUNCTIONS
                    .get(call.name.as_str())
                    .map(|builtin| builtin.returns)
                    .unwrap_or(InferredType::Any)
            }
            Expression::UnaryOp(unary) => {
                self.infer(&unary.operand, mismatches);
                match unary.operator {
                    UnaryOperator::Not => InferredType::Boolean,
                    UnaryOperator::Negate => InferredType::Number,
                }
            }
            Expression::BinaryOp(binary) => self.infer_binary(binary, mismatches),
        }
    }

    fn infer_binary(&self, binary: &BinaryExpr, mismatches: &mut Vec<Diagnostic>) -> InferredType {
        let left = self.infer(&binary.left, mismatches);
        let right = self.infer(&binary.right, mismatches);
        let operator = binary.operator;

        let (required, result) = if operator.is_arithmetic() {
            (Some(InferredType::Number), InferredType::Number)
        } else if operator.is_ordering() {
            (Some(InferredType::Number), InferredType::Boolean)
        } else if operator.is_logical() {
            (Some(InferredType::Boolean), InferredType::Boolean)
        } else {
            (None, InferredType::Boolean)
        };

        let Some(required) = required else {
            return result;
        };
        if left == InferredType::Any || right == InferredType::Any {
            return result;
        }

        if left != required || right != required {
            mismatches.push(Diagnostic::at_span(
                DiagnosticKind::TypeMismatch,
                format!(
                    "Type mismatch: operator '{}' expects {} operands, got {} and {}",
                    operator, required, left, right
                ),
                &binary.span,
            ));
            return InferredType::Any;
        }

        result
    }
}
