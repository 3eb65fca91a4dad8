//! ECMAScript syntax: the generic ESTree-shaped tree and its parser.
//!
//! The tree here describes everything the grammar accepts. The compiler's
//! own tagged AST (see [`crate::ast`]) is produced from it by the
//! translator in [`crate::parser`].

mod parser;
mod tree;

pub use parser::Parser;
pub use tree::*;

/// A syntax error with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({line}:{column})")]
pub struct SyntaxError {
    /// What went wrong
    pub message: String,
    /// Line of the offending token
    pub line: usize,
    /// Column of the offending token
    pub column: usize,
}

/// Parses a module into the generic syntax tree.
pub fn parse(source: &str) -> Result<Program, SyntaxError> {
    Parser::new(source).parse_program()
}
