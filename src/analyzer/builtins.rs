use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::ast::expressions::CallExpr;

use super::{
    diagnostics::{Diagnostic, DiagnosticKind},
    inference::InferredType,
};

#[derive(Debug, Clone, Copy)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub arity: usize,
    pub returns: InferredType,
}

lazy_static! {
    pub static ref BUILTIN_FUNCTIONS: HashMap<&'static str, BuiltinFunction> = {
        let mut map = HashMap::new();
        // random(min, max)
        map.insert("random", BuiltinFunction { name: "random", arity: 2, returns: InferredType::Number });
        map
    };
}

/// Checks a call against the built-in table. Nested calls in the arguments
/// are not visited here.
pub fn check_call(call: &CallExpr) -> Option<Diagnostic> {
    let Some(builtin) = BUILTIN_FUNCTIONS.get(call.name.as_str()) else {
        return Some(Diagnostic::at_span(
            DiagnosticKind::UnknownFunction,
            format!("Unknown function '{}'", call.name),
            &call.span,
        ));
    };

    if call.args.len() != builtin.arity {
        return Some(Diagnostic::at_span(
            DiagnosticKind::InvalidFunctionArgs,
            format!(
                "Function '{}' expects {} arguments, got {}",
                builtin.name,
                builtin.arity,
                call.args.len()
            ),
            &call.span,
        ));
    }

    None
}
