//! Value types assigned by the resolver.

use std::fmt;

/// The static type of an expression or declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    /// Not yet known; adopts the first concrete type it meets
    #[default]
    Dynamic,
    /// Numeric value
    Number,
    /// String value
    String,
    /// Callable value
    Function,
    /// Unknown after a failed lookup; suppresses further checks
    None,
}

impl ValueType {
    /// Returns the type name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Dynamic => "Dynamic",
            ValueType::Number => "Number",
            ValueType::String => "String",
            ValueType::Function => "Function",
            ValueType::None => "None",
        }
    }

    /// Returns true for Number, String and Function.
    pub fn is_concrete(&self) -> bool {
        matches!(
            self,
            ValueType::Number | ValueType::String | ValueType::Function
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_dynamic() {
        assert_eq!(ValueType::default(), ValueType::Dynamic);
    }

    #[test]
    fn test_concrete() {
        assert!(ValueType::Number.is_concrete());
        assert!(ValueType::Function.is_concrete());
        assert!(!ValueType::Dynamic.is_concrete());
        assert!(!ValueType::None.is_concrete());
        assert_eq!(ValueType::String.to_string(), "String");
    }
}
