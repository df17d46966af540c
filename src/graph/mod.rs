//! The node-to-node graph implied by choice and goto statements.
//!
//! Provides the traversal helpers the analyzer runs reachability and cycle
//! checks with, and a serializable [`graph::DialogueGraph`] export for
//! visualisation tools.

pub mod graph;
