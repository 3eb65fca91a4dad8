//! Code generation backends.
//!
//! Both targets read a resolved [`SourceFile`](crate::project::SourceFile)
//! and return text; neither mutates the tree.

pub mod script;
pub mod stack;

pub use script::ScriptGenerator;
pub use stack::StackGenerator;

/// Returns true if `name` can be written as a plain identifier.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("value"));
        assert!(is_identifier("$el"));
        assert!(is_identifier("_a1"));
        assert!(!is_identifier("1a"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }
}
