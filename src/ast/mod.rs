/// AST (Abstract Syntax Tree) module
/// Contains the data the type checker works on
///
/// Submodules:
/// - types: the type lattice and its queries
/// - symbols: declared names and their scopes
/// - expressions: expression nodes and their side-effect analyses
/// - statements: statement trees, the visitor protocol and collectors
pub mod expressions;
pub mod statements;
pub mod symbols;
pub mod types;
