/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Program and dialogue node definitions
/// - expressions: Expression variants and operators
/// - statements: Statement variants and assignment operators
///
/// Every AST type implements `Display`, rendering canonical source that the
/// parser accepts again.
pub mod ast;
pub mod expressions;
pub mod statements;
