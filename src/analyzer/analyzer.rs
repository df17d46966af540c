use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::{
    ast::{
        ast::{DialogueNode, Program},
        expressions::{BinaryExpr, Expression, VariableExpr},
        statements::{AssignmentStmt, ChoiceStmt, Statement},
    },
    graph::graph::{adjacency, find_cycles, reachable_from},
    Position, Span,
};

use super::{
    builtins::check_call,
    diagnostics::{AnalysisResult, Diagnostic, DiagnosticKind},
    folding::is_always_false,
    inference::TypeEnvironment,
};

const ENTRY_POINT: &str = "start";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Choice,
    Goto,
}

/// A choice or goto edge from one node to another.
#[derive(Debug, Clone)]
pub struct Reference {
    pub source: String,
    pub target: String,
    pub kind: ReferenceKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
struct AssignmentRecord {
    variable: String,
    /// The assigned value. Compound assignments are stored as the binary
    /// operation they perform, e.g. `@a += 1` as `(@a + 1)`.
    value: Expression,
}

#[derive(Debug, Clone)]
struct VariableUse {
    name: String,
    span: Span,
    node: String,
}

#[derive(Debug, Clone)]
struct VariableDefinition {
    span: Span,
    node: String,
}

/// Static checks over a stream of dialogue nodes.
///
/// Call [`Analyzer::analyze_node`] once per node, then
/// [`Analyzer::finalize_analysis`] for the whole-program checks. Finalizing
/// never changes the analyzer, so it can be repeated and gives the same
/// result each time.
#[derive(Debug, Default)]
pub struct Analyzer {
    /// First definition of each node id
    definitions: HashMap<String, Span>,
    /// Node ids in definition order
    node_order: Vec<String>,
    references: Vec<Reference>,
    assignments: Vec<AssignmentRecord>,
    defined_variables: HashMap<String, VariableDefinition>,
    variable_order: Vec<String>,
    variable_uses: Vec<VariableUse>,
    /// Expressions to type-check, with the node they appear in
    expressions: Vec<(Expression, String)>,
    node_diagnostics: Vec<Diagnostic>,
}

impl Analyzer {
    pub fn new() -> Self {
        Analyzer::default()
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// Runs the per-node checks and records what the whole-program checks need.
    pub fn analyze_node(&mut self, node: &DialogueNode) {
        let id = node.id.as_str();

        match self.definitions.get(id) {
            Some(original) => {
                let message = format!(
                    "Duplicate node '{}' (first defined at line {})",
                    id, original.start.line
                );
                self.report(Diagnostic::new(DiagnosticKind::DuplicateNode, message, node.span.start).in_node(id));
            }
            None => {
                self.definitions.insert(id.to_string(), node.span);
                self.node_order.push(id.to_string());
            }
        }

        if node.statements.is_empty() {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::EmptyNode,
                    format!("Node '{}' is empty", id),
                    node.span.start,
                )
                .in_node(id),
            );
        } else if !node.has_exit() {
            self.report(
                Diagnostic::new(
                    DiagnosticKind::DeadEnd,
                    format!("Node '{}' has no choices or gotos, so the dialogue ends here", id),
                    node.span.start,
                )
                .in_node(id),
            );
        }

        let mut choice_texts = HashSet::new();
        for statement in &node.statements {
            self.collect_expressions(statement, id);

            match statement {
                Statement::Assignment(assignment) => self.record_assignment(assignment, id),
                Statement::Choice(choice) => {
                    if !choice_texts.insert(choice.text.as_str()) {
                        self.report(
                            Diagnostic::at_span(
                                DiagnosticKind::IdenticalChoices,
                                format!("Duplicate choice text \"{}\" in node '{}'", choice.text, id),
                                &choice.text_span,
                            )
                            .in_node(id),
                        );
                    }
                    self.check_condition(choice, id);
                    self.record_reference(id, &choice.target, ReferenceKind::Choice, choice.target_span);
                }
                Statement::Goto(goto) => {
                    self.record_reference(id, &goto.target, ReferenceKind::Goto, goto.target_span);
                }
                Statement::Say(_) => {}
            }
        }

        trace!(node = id, statements = node.statements.len(), "analyzed node");
    }

    /// Runs the whole-program checks over everything seen so far.
    pub fn finalize_analysis(&self) -> AnalysisResult {
        let mut diagnostics = self.node_diagnostics.clone();
        diagnostics.extend(self.check_node_references());
        diagnostics.extend(self.check_entry_point());
        diagnostics.extend(self.check_reachability());
        diagnostics.extend(self.check_circular_references());
        diagnostics.extend(self.check_undefined_variables());
        diagnostics.extend(self.check_types());
        diagnostics.extend(self.check_unused_variables());

        let result = AnalysisResult::from_diagnostics(diagnostics);
        debug!(
            nodes = self.node_order.len(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            suggestions = result.suggestions.len(),
            "analysis finished"
        );
        result
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.node_diagnostics.push(diagnostic);
    }

    fn collect_expressions(&mut self, statement: &Statement, node: &str) {
        for expression in statement.expressions() {
            for call in expression.calls() {
                if let Some(diagnostic) = check_call(call) {
                    self.report(diagnostic.in_node(node));
                }
            }

            for variable in expression.variables() {
                self.variable_uses.push(VariableUse {
                    name: variable.name.clone(),
                    span: variable.span,
                    node: node.to_string(),
                });
            }

            // Assignment values are checked through their assignment record.
            if !matches!(statement, Statement::Assignment(_)) {
                self.expressions.push((expression.clone(), node.to_string()));
            }
        }
    }

    fn record_assignment(&mut self, assignment: &AssignmentStmt, node: &str) {
        if !self.defined_variables.contains_key(&assignment.variable) {
            self.defined_variables.insert(
                assignment.variable.clone(),
                VariableDefinition {
                    span: assignment.span,
                    node: node.to_string(),
                },
            );
            self.variable_order.push(assignment.variable.clone());
        }

        let value = match assignment.operator.binary() {
            None => assignment.value.clone(),
            Some(operator) => Expression::BinaryOp(BinaryExpr {
                operator,
                left: Box::new(Expression::Variable(VariableExpr {
                    name: assignment.variable.clone(),
                    span: assignment.span,
                })),
                right: Box::new(assignment.value.clone()),
                span: assignment.span,
            }),
        };

        self.expressions.push((value.clone(), node.to_string()));
        self.assignments.push(AssignmentRecord {
            variable: assignment.variable.clone(),
            value,
        });
    }

    fn check_condition(&mut self, choice: &ChoiceStmt, node: &str) {
        let Some(condition) = &choice.condition else {
            return;
        };

        if is_always_false(condition) {
            self.report(
                Diagnostic::at_span(
                    DiagnosticKind::SuspiciousCondition,
                    format!(
                        "Condition {} is always false, so choice \"{}\" can never be shown",
                        condition, choice.text
                    ),
                    &choice.span,
                )
                .in_node(node),
            );
        }
    }

    fn record_reference(&mut self, source: &str, target: &str, kind: ReferenceKind, span: Span) {
        self.references.push(Reference {
            source: source.to_string(),
            target: target.to_string(),
            kind,
            span,
        });
    }

    fn definition_position(&self, id: &str) -> Position {
        self.definitions
            .get(id)
            .map(|span| span.start)
            .unwrap_or_else(Position::start)
    }

    /// One error per reference to a node that is never defined.
    pub fn check_node_references(&self) -> Vec<Diagnostic> {
        self.references
            .iter()
            .filter(|reference| !self.definitions.contains_key(&reference.target))
            .map(|reference| {
                Diagnostic::at_span(
                    DiagnosticKind::MissingNode,
                    format!(
                        "Node '{}' references missing node '{}'",
                        reference.source, reference.target
                    ),
                    &reference.span,
                )
                .in_node(&reference.source)
            })
            .collect()
    }

    fn check_entry_point(&self) -> Vec<Diagnostic> {
        if self.definitions.is_empty() || self.definitions.contains_key(ENTRY_POINT) {
            return vec![];
        }

        vec![Diagnostic::new(
            DiagnosticKind::MissingEntryPoint,
            format!("No '{}' node found; dialogue needs an entry point", ENTRY_POINT),
            Position::start(),
        )]
    }

    /// Breadth-first search from `start` over choice and goto edges. Skipped
    /// when there is no `start` node.
    fn check_reachability(&self) -> Vec<Diagnostic> {
        if !self.definitions.contains_key(ENTRY_POINT) {
            return vec![];
        }

        let edges = adjacency(
            self.references
                .iter()
                .map(|reference| (reference.source.as_str(), reference.target.as_str())),
        );
        let reached = reachable_from(&edges, ENTRY_POINT);

        self.node_order
            .iter()
            .filter(|id| !reached.contains(id.as_str()))
            .map(|id| {
                Diagnostic::new(
                    DiagnosticKind::UnreachableNode,
                    format!("Node '{}' is unreachable from '{}'", id, ENTRY_POINT),
                    self.definition_position(id),
                )
                .in_node(id)
            })
            .collect()
    }

    /// Cycles made only of goto edges. Each node on a cycle is reported once.
    fn check_circular_references(&self) -> Vec<Diagnostic> {
        let edges = adjacency(
            self.references
                .iter()
                .filter(|reference| reference.kind == ReferenceKind::Goto)
                .map(|reference| (reference.source.as_str(), reference.target.as_str())),
        );
        let roots: Vec<&str> = self.node_order.iter().map(String::as_str).collect();

        let mut reported = HashSet::new();
        let mut diagnostics = vec![];
        for cycle in find_cycles(&roots, &edges) {
            let path = cycle.join(" -> ");
            for &id in &cycle[..cycle.len() - 1] {
                if reported.insert(id) {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticKind::CircularReference,
                            format!("Circular goto reference detected: {}", path),
                            self.definition_position(id),
                        )
                        .in_node(id),
                    );
                }
            }
        }
        diagnostics
    }

    fn check_undefined_variables(&self) -> Vec<Diagnostic> {
        self.variable_uses
            .iter()
            .filter(|variable| !self.defined_variables.contains_key(&variable.name))
            .map(|variable| {
                Diagnostic::at_span(
                    DiagnosticKind::UndefinedVariable,
                    format!("Variable '@{}' is used but never assigned", variable.name),
                    &variable.span,
                )
                .in_node(&variable.node)
            })
            .collect()
    }

    fn check_types(&self) -> Vec<Diagnostic> {
        let environment = TypeEnvironment::from_assignments(
            self.assignments
                .iter()
                .map(|assignment| (assignment.variable.as_str(), &assignment.value)),
        );

        let mut diagnostics = vec![];
        for (expression, node) in &self.expressions {
            let mut mismatches = vec![];
            environment.infer(expression, &mut mismatches);
            diagnostics.extend(mismatches.into_iter().map(|diagnostic| diagnostic.in_node(node)));
        }
        diagnostics
    }

    fn check_unused_variables(&self) -> Vec<Diagnostic> {
        let used: HashSet<&str> = self
            .variable_uses
            .iter()
            .map(|variable| variable.name.as_str())
            .collect();

        self.variable_order
            .iter()
            .filter(|name| !used.contains(name.as_str()))
            .filter_map(|name| {
                let definition = self.defined_variables.get(name)?;
                Some(
                    Diagnostic::at_span(
                        DiagnosticKind::UnusedVariable,
                        format!("Variable '@{}' is assigned but never used", name),
                        &definition.span,
                    )
                    .in_node(&definition.node),
                )
            })
            .collect()
    }
}

/// Analyzes a whole program in one call.
pub fn analyze(program: &Program) -> AnalysisResult {
    let mut analyzer = Analyzer::new();
    for node in &program.nodes {
        analyzer.analyze_node(node);
    }
    analyzer.finalize_analysis()
}
