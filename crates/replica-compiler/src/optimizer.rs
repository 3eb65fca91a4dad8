//! Constant folding.
//!
//! A post-order walk replaces every Binary node whose operands are both
//! Number or String literals by the literal it evaluates to. Chains fold
//! left to right because the left operand of a chain is itself a Binary
//! node that was folded first; a String anywhere in a `+` chain turns the
//! rest of the chain into concatenation.

use crate::ast::{self, Ast, BinaryOp, NodeId, NodeKind, ValueType};

/// Folds constant subtrees below `block`; returns how many nodes were folded.
pub fn optimize(ast: &mut Ast, block: NodeId) -> usize {
    let mut optimizer = Optimizer { ast, folded: 0 };
    optimizer.visit(block);
    optimizer.folded
}

struct Optimizer<'a> {
    ast: &'a mut Ast,
    folded: usize,
}

impl Optimizer<'_> {
    fn visit(&mut self, node: NodeId) {
        for child in self.ast.children(node) {
            self.visit(child);
        }
        let NodeKind::Binary { op, left, right } = *self.ast.kind(node) else {
            return;
        };
        if let Some((kind, value_type)) = fold(op, self.ast.kind(left), self.ast.kind(right)) {
            let node = self.ast.node_mut(node);
            node.kind = kind;
            node.value_type = value_type;
            self.folded += 1;
        }
    }
}

/// The literal `left op right` evaluates to, if both sides are literals.
fn fold(op: BinaryOp, left: &NodeKind, right: &NodeKind) -> Option<(NodeKind, ValueType)> {
    match (left, right) {
        (NodeKind::Number { value: a, .. }, NodeKind::Number { value: b, .. }) => {
            let value = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => a / b,
                BinaryOp::Modulo => a % b,
                _ => return None,
            };
            if !value.is_finite() {
                return None;
            }
            let kind = NodeKind::Number {
                value,
                raw: ast::number_literal(value),
            };
            Some((kind, ValueType::Number))
        }
        _ if op != BinaryOp::Add => None,
        (NodeKind::String { value: a, .. }, NodeKind::String { value: b, .. }) => {
            Some(concatenated(format!("{}{}", a, b)))
        }
        (NodeKind::String { value: a, .. }, NodeKind::Number { value: b, .. }) => {
            Some(concatenated(format!("{}{}", a, ast::format_number(*b))))
        }
        (NodeKind::Number { value: a, .. }, NodeKind::String { value: b, .. }) => {
            Some(concatenated(format!("{}{}", ast::format_number(*a), b)))
        }
        _ => None,
    }
}

fn concatenated(value: String) -> (NodeKind, ValueType) {
    let raw = ast::quote_string(&value);
    (NodeKind::String { value, raw }, ValueType::String)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script;

    /// Optimizes `source` and returns the first statement of the file.
    fn optimize_src(source: &str) -> (Ast, NodeId, usize) {
        let mut translation = parse_script(source).unwrap();
        let folded = optimize(&mut translation.ast, translation.block);
        let scope = translation.ast.block_scope(translation.block).unwrap();
        let first = translation.ast.scope(scope).body[0];
        (translation.ast, first, folded)
    }

    #[test]
    fn test_string_chain_folds_to_one_literal() {
        let (ast, node, folded) = optimize_src("\"a\" + \"b\" + \"c\";");
        assert_eq!(folded, 2);
        let NodeKind::String { value, raw } = ast.kind(node) else {
            panic!("expected string literal, got {:?}", ast.kind(node));
        };
        assert_eq!(value, "abc");
        assert_eq!(raw, "\"abc\"");
        assert_eq!(ast.value_type(node), ValueType::String);
    }

    #[test]
    fn test_partial_chain_keeps_identifier() {
        let (ast, node, _) = optimize_src("1 + 2 + x;");
        let NodeKind::Binary { left, right, .. } = ast.kind(node) else {
            panic!("expected binary");
        };
        assert!(matches!(ast.kind(*left), NodeKind::Number { value, .. } if *value == 3.0));
        assert_eq!(ast.identifier_name(*right), Some("x"));
    }

    #[test]
    fn test_number_then_string_concatenates() {
        let (ast, node, _) = optimize_src("1 + 2 + \"a\";");
        assert!(matches!(ast.kind(node), NodeKind::String { value, .. } if value == "3a"));
        let (ast, node, _) = optimize_src("\"a\" + 1 + 2;");
        assert!(matches!(ast.kind(node), NodeKind::String { value, .. } if value == "a12"));
    }

    #[test]
    fn test_arithmetic() {
        let (ast, node, _) = optimize_src("let a = 7 * 6 - 2 / 4;");
        let NodeKind::VariableDeclaration { declarations, .. } = ast.kind(node) else {
            panic!("expected declaration");
        };
        let NodeKind::Variable { init: Some(init), .. } = ast.kind(declarations[0]) else {
            panic!("expected initializer");
        };
        assert!(matches!(ast.kind(*init), NodeKind::Number { value, raw } if *value == 41.5 && raw == "41.5"));
    }

    /// Folds the initializer of `let a = <expr>;` and returns its literal.
    fn folded_init(source: &str) -> (f64, String) {
        let (ast, node, _) = optimize_src(source);
        let NodeKind::VariableDeclaration { declarations, .. } = ast.kind(node) else {
            panic!("expected declaration");
        };
        let NodeKind::Variable { init: Some(init), .. } = ast.kind(declarations[0]) else {
            panic!("expected initializer");
        };
        match ast.kind(*init) {
            NodeKind::Number { value, raw } => (*value, raw.clone()),
            other => panic!("expected number literal, got {:?}", other),
        }
    }

    #[test]
    fn test_large_integers_keep_their_value() {
        let (value, raw) = folded_init("let a = 10000000000000000000 + 0;");
        assert_eq!(value, 1e19);
        assert_eq!(raw, "10000000000000000000");

        let (value, raw) = folded_init("let a = 1e21 * 10;");
        assert_eq!(value, 1e22);
        assert_eq!(raw, "1e+22");
    }

    #[test]
    fn test_negative_zero_keeps_sign() {
        let (value, raw) = folded_init("let a = 0 * (0 - 1);");
        assert!(value == 0.0 && value.is_sign_negative());
        assert_eq!(raw, "-0");
    }

    #[test]
    fn test_non_foldable_left_alone() {
        let (_, _, folded) = optimize_src("1 / 0; \"a\" - \"b\"; x * 2; 1 < 2;");
        assert_eq!(folded, 0);
    }
}
