use std::fmt::{self, Display};

use crate::Span;

use super::statements::Statement;

/// A whole script: every dialogue node in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub nodes: Vec<DialogueNode>,
}

impl Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}

/// `node id ... end`. `span` runs from the `node` keyword to `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueNode {
    pub id: String,
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl DialogueNode {
    /// Whether the node navigates anywhere with a choice or goto.
    pub fn has_exit(&self) -> bool {
        self.statements
            .iter()
            .any(|statement| statement.target().is_some())
    }
}

impl Display for DialogueNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "node {}", self.id)?;
        for statement in &self.statements {
            writeln!(f, "  {}", statement)?;
        }
        writeln!(f, "end")
    }
}
