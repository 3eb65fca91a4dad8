//! Type rules shared by the resolver's expression handlers.

use crate::ast::{BinaryOp, ValueType};

/// Outcome of combining two operand types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Inferred {
    /// Type of the combined expression
    pub value_type: ValueType,
    /// Set when two concrete types disagree
    pub mismatch: bool,
}

impl Inferred {
    fn ok(value_type: ValueType) -> Self {
        Self {
            value_type,
            mismatch: false,
        }
    }
}

/// Type of `left op right`.
///
/// A String on either side yields String whatever the operator. Comparisons
/// yield the shared operand type, or Dynamic. A Dynamic side adopts the other
/// side. Two other concrete types that disagree are a mismatch, and the left
/// type is kept.
pub(super) fn binary(op: BinaryOp, left: ValueType, right: ValueType) -> Inferred {
    if left == ValueType::None || right == ValueType::None {
        return Inferred::ok(ValueType::None);
    }
    if op.is_comparison() {
        return Inferred::ok(if left == right { left } else { ValueType::Dynamic });
    }
    if left == ValueType::String || right == ValueType::String {
        return Inferred::ok(ValueType::String);
    }
    combine(left, right)
}

/// Agreement of a declared type with a value of type `value`.
pub(super) fn combine(declared: ValueType, value: ValueType) -> Inferred {
    match (declared, value) {
        (ValueType::None, _) | (_, ValueType::None) => Inferred::ok(ValueType::None),
        (ValueType::Dynamic, other) => Inferred::ok(other),
        (other, ValueType::Dynamic) => Inferred::ok(other),
        (a, b) if a == b => Inferred::ok(a),
        (a, _) => Inferred {
            value_type: a,
            mismatch: true,
        },
    }
}

/// Type of a value that is one of two branches.
pub(super) fn branches(left: ValueType, right: ValueType) -> ValueType {
    if left == right {
        left
    } else {
        ValueType::Dynamic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_wins_concatenation() {
        let inferred = binary(BinaryOp::Add, ValueType::Number, ValueType::String);
        assert_eq!(inferred, Inferred::ok(ValueType::String));
    }

    #[test]
    fn test_string_wins_any_operator() {
        for op in [BinaryOp::Multiply, BinaryOp::Subtract, BinaryOp::Modulo] {
            assert_eq!(
                binary(op, ValueType::Number, ValueType::String),
                Inferred::ok(ValueType::String)
            );
            assert_eq!(
                binary(op, ValueType::String, ValueType::Function),
                Inferred::ok(ValueType::String)
            );
        }
    }

    #[test]
    fn test_dynamic_adopts_other_side() {
        assert_eq!(
            binary(BinaryOp::Multiply, ValueType::Dynamic, ValueType::Number).value_type,
            ValueType::Number
        );
        assert_eq!(
            binary(BinaryOp::Subtract, ValueType::Number, ValueType::Dynamic).value_type,
            ValueType::Number
        );
    }

    #[test]
    fn test_mismatch_keeps_left() {
        let inferred = binary(BinaryOp::Subtract, ValueType::Number, ValueType::Function);
        assert!(inferred.mismatch);
        assert_eq!(inferred.value_type, ValueType::Number);
    }

    #[test]
    fn test_none_suppresses_checks() {
        let inferred = combine(ValueType::Number, ValueType::None);
        assert!(!inferred.mismatch);
        assert_eq!(inferred.value_type, ValueType::None);
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(
            binary(BinaryOp::LessThan, ValueType::Number, ValueType::Number).value_type,
            ValueType::Number
        );
        let mixed = binary(BinaryOp::StrictEqual, ValueType::Number, ValueType::String);
        assert!(!mixed.mismatch);
        assert_eq!(mixed.value_type, ValueType::Dynamic);
    }

    #[test]
    fn test_branches() {
        assert_eq!(branches(ValueType::String, ValueType::String), ValueType::String);
        assert_eq!(branches(ValueType::String, ValueType::Number), ValueType::Dynamic);
    }
}
