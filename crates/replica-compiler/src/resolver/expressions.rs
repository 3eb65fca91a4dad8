//! Expression typing, references and calls.

use super::{inference, Resolver};
use crate::ast::{AssignOp, NodeId, NodeKind, UnaryOp, ValueType};
use crate::diagnostics::DiagnosticKind;

impl Resolver<'_> {
    /// Resolves an expression and records its type on the node.
    pub(super) fn expression(&mut self, node: NodeId) -> ValueType {
        let value_type = match self.ast.kind(node).clone() {
            NodeKind::Number { .. } => ValueType::Number,
            NodeKind::String { .. } => ValueType::String,
            NodeKind::Bool(_) | NodeKind::Null | NodeKind::This | NodeKind::Super => {
                ValueType::Dynamic
            }
            NodeKind::Identifier { name, .. } => self.identifier(node, &name),
            NodeKind::Name {
                object,
                property,
                computed,
            } => {
                self.expression(object);
                if computed {
                    self.expression(property);
                }
                ValueType::Dynamic
            }
            NodeKind::Binary { op, left, right } => {
                let left = self.expression(left);
                let right = self.expression(right);
                let inferred = inference::binary(op, left, right);
                if inferred.mismatch {
                    self.report(
                        DiagnosticKind::Type,
                        format!("invalid conversion from '{}' to '{}'", right, left),
                    );
                }
                inferred.value_type
            }
            NodeKind::Logical { left, right, .. } => {
                let left = self.expression(left);
                let right = self.expression(right);
                inference::branches(left, right)
            }
            NodeKind::Assign { op, target, value } => self.assignment(op, target, value),
            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.expression(test);
                let consequent = self.expression(consequent);
                let alternate = self.expression(alternate);
                inference::branches(consequent, alternate)
            }
            NodeKind::Unary { op, argument } => {
                let argument = self.expression(argument);
                match op {
                    UnaryOp::Typeof => ValueType::String,
                    UnaryOp::Minus | UnaryOp::Plus | UnaryOp::BitwiseNot => numeric(argument),
                    UnaryOp::LogicalNot | UnaryOp::Void | UnaryOp::Delete => ValueType::Dynamic,
                }
            }
            NodeKind::Update { argument, .. } => {
                let argument = self.expression(argument);
                numeric(argument)
            }
            NodeKind::Sequence(items) => {
                let mut last = ValueType::Dynamic;
                for item in items {
                    last = self.expression(item);
                }
                last
            }
            NodeKind::Call { callee, arguments } => self.call(callee, &arguments),
            NodeKind::New { callee, arguments } => {
                self.expression(callee);
                for argument in arguments {
                    self.expression(argument);
                }
                ValueType::Dynamic
            }
            NodeKind::Array(elements) => {
                for element in elements.into_iter().flatten() {
                    self.expression(element);
                }
                ValueType::Dynamic
            }
            NodeKind::Object(properties) => {
                for property in properties {
                    if property.computed {
                        self.expression(property.key);
                    }
                    self.expression(property.value);
                }
                ValueType::Dynamic
            }
            NodeKind::Template { expressions, .. } => {
                for expression in expressions {
                    self.expression(expression);
                }
                ValueType::String
            }
            NodeKind::Function(_) | NodeKind::ArrowFunction(_) => self.function_expression(node),
            NodeKind::Class(_) => {
                self.class(node, false);
                ValueType::Function
            }
            _ => ValueType::Dynamic,
        };
        self.ast.set_value_type(node, value_type);
        value_type
    }

    /// Binds a reference to the nearest declaration.
    fn identifier(&mut self, node: NodeId, name: &str) -> ValueType {
        match self.ast.lookup(self.scope, name) {
            Some(decl) => {
                if let NodeKind::Identifier { reference, .. } = &mut self.ast.node_mut(node).kind {
                    *reference = Some(decl);
                }
                self.ast.value_type(decl)
            }
            None if self.globals.contains(name) => ValueType::Dynamic,
            None => {
                self.report(
                    DiagnosticKind::Identifier,
                    format!("‘{}’ was not declared in this scope", name),
                );
                ValueType::None
            }
        }
    }

    fn assignment(&mut self, op: AssignOp, target: NodeId, value: NodeId) -> ValueType {
        let value_type = self.expression(value);
        if !matches!(self.ast.kind(target), NodeKind::Identifier { .. }) {
            self.expression(target);
            return value_type;
        }

        let declared = self.expression(target);
        let Some(decl) = self.reference_of(target) else {
            return value_type;
        };
        let stored = match op.binary_operator() {
            Some(binary) => {
                let inferred = inference::binary(binary, declared, value_type);
                if inferred.mismatch {
                    self.report(
                        DiagnosticKind::Type,
                        format!("invalid conversion from '{}' to '{}'", value_type, declared),
                    );
                    return declared;
                }
                if inferred.value_type == ValueType::String && declared.is_concrete() {
                    // the result is a string; a typed binding keeps its type
                    self.ast.set_value_type(target, ValueType::String);
                    return ValueType::String;
                }
                inferred.value_type
            }
            None if op == AssignOp::Assign => value_type,
            // &&=, ||= and ??= keep whichever side wins at run time
            None => return ValueType::Dynamic,
        };
        let result = self.flow_into(decl, stored);
        self.ast.set_value_type(target, result);
        result
    }

    /// Function and arrow expressions are resolved where they appear.
    pub(super) fn function_expression(&mut self, function: NodeId) -> ValueType {
        self.ast.set_value_type(function, ValueType::Function);
        let Some(data) = self.ast.function(function) else {
            return ValueType::Function;
        };
        let (id, scope, resolved) = (data.id, data.scope, data.resolved);
        if resolved {
            return ValueType::Function;
        }
        // a named function expression sees its own name
        if let Some(name) = id.and_then(|id| self.ast.identifier_name(id)).map(str::to_string) {
            if !self.ast.scope(scope).declares(&name) {
                self.ast.scope_mut(scope).funcs.insert(name, function);
            }
        }
        self.resolve_function(function, &[]);
        ValueType::Function
    }

    fn call(&mut self, callee: NodeId, arguments: &[NodeId]) -> ValueType {
        let argument_types: Vec<ValueType> =
            arguments.iter().map(|&a| self.expression(a)).collect();

        let function = match self.ast.kind(callee) {
            NodeKind::Identifier { .. } => {
                let callee_type = self.expression(callee);
                match self.reference_of(callee) {
                    Some(decl) if self.ast.function(decl).is_some() => Some(decl),
                    _ if callee_type == ValueType::None => return ValueType::None,
                    _ if callee_type.is_concrete() && callee_type != ValueType::Function => {
                        let name = self.ast.identifier_name(callee).unwrap_or_default().to_string();
                        self.report(DiagnosticKind::Call, format!("'{}' is not a function", name));
                        return ValueType::None;
                    }
                    _ => None,
                }
            }
            NodeKind::Function(_) | NodeKind::ArrowFunction(_) => {
                self.ast.set_value_type(callee, ValueType::Function);
                Some(callee)
            }
            _ => {
                self.expression(callee);
                None
            }
        };

        match function {
            Some(function) => self.call_function(function, &argument_types),
            None => ValueType::Dynamic,
        }
    }

    fn call_function(&mut self, function: NodeId, arguments: &[ValueType]) -> ValueType {
        let Some(data) = self.ast.function(function) else {
            return ValueType::Dynamic;
        };
        if arguments.len() > data.params.len() {
            let name = data
                .id
                .and_then(|id| self.ast.identifier_name(id))
                .unwrap_or("<anonymous>")
                .to_string();
            self.report(
                DiagnosticKind::Call,
                format!("too many arguments to function '{}'", name),
            );
        }
        if let Some(data) = self.ast.function_mut(function) {
            data.num_called += 1;
        }

        self.resolve_function(function, arguments);

        match self.ast.function(function) {
            Some(data) if data.return_value => data.return_type,
            _ => ValueType::Dynamic,
        }
    }
}

/// Arithmetic unary operators keep Number and lose everything else.
fn numeric(operand: ValueType) -> ValueType {
    match operand {
        ValueType::Number => ValueType::Number,
        ValueType::None => ValueType::None,
        _ => ValueType::Dynamic,
    }
}
