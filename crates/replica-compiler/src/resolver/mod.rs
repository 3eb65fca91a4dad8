//! Scope-aware name binding and type inference.
//!
//! [`resolve`] walks a file's root Block once. Declarations are bound into
//! the current scope after their initializer is resolved, so a name used
//! before its declaration is looked up in the enclosing scopes. Function
//! declarations are hoisted, and so are `var f = function () {}` and
//! `var f = () => {}`, which become plain function declarations.
//!
//! A function body is resolved once: at its first call, with the argument
//! types already flowing into the parameters, or at the end of its scope
//! if nothing called it. Every problem found is reported to the sink and
//! the walk continues.

mod expressions;
mod inference;

use rustc_hash::FxHashSet;

use crate::ast::{Ast, NodeId, NodeKind, ScopeId, ValueType};
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};

/// Binds identifiers and infers types for one file.
pub fn resolve(
    ast: &mut Ast,
    block: NodeId,
    file: &str,
    globals: &FxHashSet<String>,
    sink: &mut dyn DiagnosticSink,
) {
    let Some(scope) = ast.block_scope(block) else {
        return;
    };
    tracing::debug!(file, "resolving");
    let mut resolver = Resolver {
        ast,
        file,
        globals,
        sink,
        scope,
        function: None,
    };
    resolver.block(scope);
}

/// Walk state: the current scope and function travel with the walk.
struct Resolver<'a> {
    ast: &'a mut Ast,
    file: &'a str,
    globals: &'a FxHashSet<String>,
    sink: &'a mut dyn DiagnosticSink,
    scope: ScopeId,
    function: Option<NodeId>,
}

impl Resolver<'_> {
    fn report(&mut self, kind: DiagnosticKind, message: String) {
        self.sink.report(Diagnostic::new(kind, self.file, message));
    }

    // ==================== Scopes ====================

    fn block(&mut self, scope: ScopeId) {
        self.scoped(scope, |_| {}, |_| {});
    }

    /// Resolves a scope's statements between a prologue and an epilogue.
    fn scoped(
        &mut self,
        scope: ScopeId,
        prologue: impl FnOnce(&mut Self),
        epilogue: impl FnOnce(&mut Self),
    ) {
        let saved = std::mem::replace(&mut self.scope, scope);
        self.hoist(scope);
        prologue(self);
        let body = self.ast.scope(scope).body.clone();
        for node in body {
            self.statement(node);
        }
        epilogue(self);
        self.resolve_uncalled(scope);
        self.scope = saved;
    }

    /// Registers function declarations, converting function-valued variables.
    fn hoist(&mut self, scope: ScopeId) {
        let body = std::mem::take(&mut self.ast.scope_mut(scope).body);
        let mut hoisted = Vec::with_capacity(body.len());
        for node in body {
            match self.ast.kind(node) {
                NodeKind::Function(_) => {
                    self.declare_function(node);
                    hoisted.push(node);
                }
                NodeKind::VariableDeclaration { .. } => {
                    hoisted.extend(self.hoist_variables(node));
                }
                NodeKind::Export {
                    declaration: Some(declaration),
                    ..
                }
                | NodeKind::ExportDefault { declaration } => {
                    let declaration = *declaration;
                    if matches!(self.ast.kind(declaration), NodeKind::Function(f) if f.id.is_some())
                    {
                        self.declare_function(declaration);
                    }
                    hoisted.push(node);
                }
                _ => hoisted.push(node),
            }
        }
        self.ast.scope_mut(scope).body = hoisted;
    }

    /// Splits function-valued declarators out of a declaration.
    ///
    /// Returns what replaces the declaration in its scope body: the new
    /// function declarations, followed by the declaration itself unless it
    /// was left empty.
    fn hoist_variables(&mut self, declaration: NodeId) -> Vec<NodeId> {
        let NodeKind::VariableDeclaration { declarations, .. } = self.ast.kind(declaration) else {
            return vec![declaration];
        };
        let mut kept = Vec::new();
        let mut functions = Vec::new();
        for variable in declarations.clone() {
            match self.function_initializer(variable) {
                Some((name, function)) => {
                    let node = self.ast.node_mut(function);
                    node.kind = match std::mem::replace(&mut node.kind, NodeKind::Empty) {
                        NodeKind::Function(mut f) | NodeKind::ArrowFunction(mut f) => {
                            f.id = Some(name);
                            NodeKind::Function(f)
                        }
                        other => other,
                    };
                    self.declare_function(function);
                    functions.push(function);
                }
                None => kept.push(variable),
            }
        }
        if functions.is_empty() {
            return vec![declaration];
        }

        let empty = kept.is_empty();
        if let NodeKind::VariableDeclaration { declarations, .. } =
            &mut self.ast.node_mut(declaration).kind
        {
            *declarations = kept;
        }
        if !empty {
            functions.push(declaration);
        }
        functions
    }

    /// `name = function () {}` or `name = () => {}` with an anonymous function.
    fn function_initializer(&self, variable: NodeId) -> Option<(NodeId, NodeId)> {
        let NodeKind::Variable {
            id,
            init: Some(init),
        } = self.ast.kind(variable)
        else {
            return None;
        };
        if self.ast.identifier_name(*id).is_none() {
            return None;
        }
        match self.ast.kind(*init) {
            NodeKind::Function(f) if f.id.is_none() => Some((*id, *init)),
            NodeKind::ArrowFunction(_) => Some((*id, *init)),
            _ => None,
        }
    }

    fn declare_function(&mut self, function: NodeId) {
        self.ast.set_value_type(function, ValueType::Function);
        let Some(id) = self.ast.function(function).and_then(|f| f.id) else {
            return;
        };
        self.ast.set_value_type(id, ValueType::Function);
        let Some(name) = self.ast.identifier_name(id).map(str::to_string) else {
            return;
        };
        if self.ast.scope(self.scope).declares(&name) {
            self.report(
                DiagnosticKind::Redeclaration,
                format!("redeclaration of '{}'", name),
            );
            return;
        }
        self.ast.scope_mut(self.scope).funcs.insert(name, function);
    }

    /// Binds an Identifier node as a variable of the current scope.
    fn declare_var(&mut self, id: NodeId, value_type: ValueType) {
        let Some(name) = self.ast.identifier_name(id).map(str::to_string) else {
            return;
        };
        self.ast.set_value_type(id, value_type);
        if self.ast.scope(self.scope).declares(&name) {
            self.report(
                DiagnosticKind::Redeclaration,
                format!("redeclaration of '{}'", name),
            );
            return;
        }
        self.ast.scope_mut(self.scope).vars.insert(name, id);
    }

    /// Binds every name of a declarator id or parameter pattern.
    fn bind_pattern(&mut self, pattern: NodeId, value_type: ValueType) {
        match self.ast.kind(pattern) {
            NodeKind::Identifier { .. } => self.declare_var(pattern, value_type),
            NodeKind::ObjectPattern(properties) => {
                let values: Vec<_> = properties.iter().map(|p| p.value).collect();
                for value in values {
                    self.bind_pattern(value, ValueType::Dynamic);
                }
            }
            NodeKind::AssignmentPattern { left, right } => {
                let (left, right) = (*left, *right);
                let default_type = self.expression(right);
                let merged = inference::combine(value_type, default_type).value_type;
                self.bind_pattern(left, merged);
            }
            _ => {}
        }
    }

    /// Functions of a scope nobody called are resolved with dynamic parameters.
    fn resolve_uncalled(&mut self, scope: ScopeId) {
        let mut pending: Vec<NodeId> = self
            .ast
            .scope(scope)
            .funcs
            .values()
            .copied()
            .filter(|&f| self.ast.function(f).is_some_and(|f| !f.resolved))
            .collect();
        pending.sort();
        for function in pending {
            self.resolve_function(function, &[]);
        }
    }

    // ==================== Functions ====================

    /// Resolves a function body once; later calls only check arguments.
    fn resolve_function(&mut self, function: NodeId, arguments: &[ValueType]) {
        let Some(data) = self.ast.function(function) else {
            return;
        };
        let (params, resolved) = (data.params.clone(), data.resolved);
        let (scope, body, expression) = (data.scope, data.body, data.expression);
        if resolved {
            for (param, &argument) in params.iter().zip(arguments) {
                self.flow_into_param(*param, argument);
            }
            return;
        }
        if let Some(data) = self.ast.function_mut(function) {
            data.resolved = true;
        }
        tracing::trace!(function = function.index(), "resolving function body");

        let saved_scope = std::mem::replace(&mut self.scope, scope);
        let saved_function = self.function.replace(function);

        for param in &params {
            self.bind_pattern(*param, ValueType::Dynamic);
        }
        for (param, &argument) in params.iter().zip(arguments) {
            self.flow_into_param(*param, argument);
        }

        if expression {
            let value_type = self.expression(body);
            self.unify_return(Some(body), value_type);
        } else if let Some(body_scope) = self.ast.block_scope(body) {
            self.block(body_scope);
        }

        self.function = saved_function;
        self.scope = saved_scope;
    }

    /// Parameter identifier of a plain or defaulted parameter.
    fn param_binding(&self, param: NodeId) -> Option<NodeId> {
        match self.ast.kind(param) {
            NodeKind::Identifier { .. } => Some(param),
            NodeKind::AssignmentPattern { left, .. } => self.param_binding(*left),
            _ => None,
        }
    }

    fn flow_into_param(&mut self, param: NodeId, argument: ValueType) {
        if let Some(binding) = self.param_binding(param) {
            self.flow_into(binding, argument);
        }
    }

    /// A value of type `value_type` is stored into the declaration `decl`.
    ///
    /// Dynamic declarations adopt the type; a concrete disagreement is a
    /// TypeError and the declaration keeps its type.
    fn flow_into(&mut self, decl: NodeId, value_type: ValueType) -> ValueType {
        let declared = self.ast.value_type(decl);
        let inferred = inference::combine(declared, value_type);
        if inferred.mismatch {
            self.report(
                DiagnosticKind::Type,
                format!("invalid conversion from '{}' to '{}'", value_type, declared),
            );
            return declared;
        }
        if declared == ValueType::Dynamic && value_type.is_concrete() {
            self.ast.set_value_type(decl, value_type);
        }
        self.ast.value_type(decl)
    }

    /// Unifies a returned value with the enclosing function's return type.
    fn unify_return(&mut self, argument: Option<NodeId>, value_type: ValueType) {
        let Some(function) = self.function else {
            return;
        };
        let Some(data) = self.ast.function(function) else {
            return;
        };
        let declared = data.return_type;
        if let Some(data) = self.ast.function_mut(function) {
            data.return_value = true;
        }

        if declared == ValueType::Dynamic {
            if value_type.is_concrete() {
                if let Some(data) = self.ast.function_mut(function) {
                    data.return_type = value_type;
                }
            }
            return;
        }
        if value_type == ValueType::Dynamic {
            // the return type is fixed: a dynamic returned variable adopts it
            if let Some(decl) = argument.and_then(|a| self.reference_of(a)) {
                self.flow_into(decl, declared);
            }
            return;
        }
        if inference::combine(declared, value_type).mismatch {
            self.report(
                DiagnosticKind::Type,
                format!("invalid conversion from '{}' to '{}'", value_type, declared),
            );
        }
    }

    /// The declaration a resolved Identifier refers to.
    fn reference_of(&self, node: NodeId) -> Option<NodeId> {
        match self.ast.kind(node) {
            NodeKind::Identifier { reference, .. } => *reference,
            _ => None,
        }
    }

    // ==================== Statements ====================

    fn statement(&mut self, node: NodeId) {
        match self.ast.kind(node).clone() {
            NodeKind::VariableDeclaration { declarations, .. } => {
                for variable in declarations {
                    self.variable(variable);
                }
            }
            NodeKind::Function(_) => {
                // hoisted: resolved at its first call or at the end of the scope
                if self.ast.function(node).is_some_and(|f| f.id.is_none()) {
                    self.function_expression(node);
                }
            }
            NodeKind::Class(_) => self.class(node, true),
            NodeKind::Block { scope } => self.block(scope),
            NodeKind::Empty | NodeKind::Break { .. } | NodeKind::Continue { .. } => {}
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                self.expression(test);
                self.statement(consequent);
                if let Some(alternate) = alternate {
                    self.statement(alternate);
                }
            }
            NodeKind::Switch {
                discriminant,
                cases,
            } => {
                self.expression(discriminant);
                for case in cases {
                    if let NodeKind::SwitchCase { test, scope } = self.ast.kind(case).clone() {
                        if let Some(test) = test {
                            self.expression(test);
                        }
                        self.block(scope);
                    }
                }
            }
            NodeKind::For {
                init,
                test,
                update,
                body,
            } => {
                let Some(scope) = self.ast.block_scope(body) else {
                    return;
                };
                self.scoped(
                    scope,
                    |this| {
                        if let Some(init) = init {
                            this.statement(init);
                        }
                        if let Some(test) = test {
                            this.expression(test);
                        }
                    },
                    |this| {
                        if let Some(update) = update {
                            this.expression(update);
                        }
                    },
                );
            }
            NodeKind::ForIn { left, right, body } => {
                self.expression(right);
                let Some(scope) = self.ast.block_scope(body) else {
                    return;
                };
                self.scoped(scope, |this| this.statement(left), |_| {});
            }
            NodeKind::While { test, body } => {
                self.expression(test);
                self.statement(body);
            }
            NodeKind::DoWhile { body, test } => {
                self.statement(body);
                self.expression(test);
            }
            NodeKind::Label { body, .. } => self.statement(body),
            NodeKind::Return { argument } => {
                let value_type = match argument {
                    Some(argument) => self.expression(argument),
                    None => return,
                };
                self.unify_return(argument, value_type);
            }
            NodeKind::Throw { argument } => {
                self.expression(argument);
            }
            NodeKind::Try {
                block,
                handler,
                finalizer,
            } => {
                self.statement(block);
                if let Some(handler) = handler {
                    self.catch(handler);
                }
                if let Some(finalizer) = finalizer {
                    self.statement(finalizer);
                }
            }
            NodeKind::Catch { .. } => self.catch(node),
            NodeKind::Import { specifiers, .. } => {
                for specifier in specifiers {
                    if let NodeKind::Specifier { local, .. } = self.ast.kind(specifier) {
                        let local = *local;
                        self.declare_var(local, ValueType::Dynamic);
                    }
                }
            }
            NodeKind::Export {
                declaration,
                specifiers,
                source,
                ..
            } => {
                if let Some(declaration) = declaration {
                    self.statement(declaration);
                }
                if source.is_none() {
                    for specifier in specifiers {
                        if let NodeKind::Specifier { local, .. } = self.ast.kind(specifier) {
                            let local = *local;
                            self.expression(local);
                        }
                    }
                }
            }
            NodeKind::ExportDefault { declaration } => match self.ast.kind(declaration) {
                NodeKind::Function(_) | NodeKind::Class(_) => self.statement(declaration),
                _ => {
                    self.expression(declaration);
                }
            },
            NodeKind::ExportAll { .. }
            | NodeKind::Specifier { .. }
            | NodeKind::SwitchCase { .. }
            | NodeKind::MethodDef { .. }
            | NodeKind::Variable { .. } => {}
            _ => {
                self.expression(node);
            }
        }
    }

    fn variable(&mut self, variable: NodeId) {
        let NodeKind::Variable { id, init } = *self.ast.kind(variable) else {
            return;
        };
        let value_type = match init {
            Some(init) => self.expression(init),
            None => ValueType::Dynamic,
        };
        self.bind_pattern(id, value_type);
        self.ast.set_value_type(variable, self.ast.value_type(id));
    }

    fn catch(&mut self, handler: NodeId) {
        let NodeKind::Catch { param, body } = *self.ast.kind(handler) else {
            return;
        };
        let Some(scope) = self.ast.block_scope(body) else {
            return;
        };
        self.scoped(
            scope,
            |this| {
                if let Some(param) = param {
                    this.bind_pattern(param, ValueType::Dynamic);
                }
            },
            |_| {},
        );
    }

    /// Classes: the name is bound first so methods can refer to it.
    fn class(&mut self, class: NodeId, declaration: bool) {
        let NodeKind::Class(data) = self.ast.kind(class).clone() else {
            return;
        };
        self.ast.set_value_type(class, ValueType::Function);
        if let Some(super_class) = data.super_class {
            self.expression(super_class);
        }
        if let (true, Some(id)) = (declaration, data.id) {
            self.ast.set_value_type(id, ValueType::Function);
            if let Some(name) = self.ast.identifier_name(id).map(str::to_string) {
                if self.ast.scope(self.scope).declares(&name) {
                    self.report(
                        DiagnosticKind::Redeclaration,
                        format!("redeclaration of '{}'", name),
                    );
                } else {
                    self.ast.scope_mut(self.scope).vars.insert(name, class);
                }
            }
        }
        for member in data.members {
            if let NodeKind::MethodDef {
                key,
                value,
                computed,
                ..
            } = *self.ast.kind(member)
            {
                if computed {
                    self.expression(key);
                }
                self.function_expression(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::parser::{parse_script, Translation};

    struct Resolved {
        translation: Translation,
        diagnostics: Diagnostics,
    }

    impl Resolved {
        fn ast(&self) -> &Ast {
            &self.translation.ast
        }

        fn root(&self) -> ScopeId {
            self.ast().block_scope(self.translation.block).unwrap()
        }

        fn var_type(&self, name: &str) -> ValueType {
            let decl = self.ast().lookup(self.root(), name).unwrap();
            self.ast().value_type(decl)
        }

        /// Identifier nodes named `name`, in allocation order.
        fn identifiers(&self, name: &str) -> Vec<NodeId> {
            (0..self.ast().len() as u32)
                .map(NodeId)
                .filter(|&id| self.ast().identifier_name(id) == Some(name))
                .collect()
        }

        fn reference(&self, id: NodeId) -> Option<NodeId> {
            match self.ast().kind(id) {
                NodeKind::Identifier { reference, .. } => *reference,
                _ => None,
            }
        }

        fn count(&self, kind: DiagnosticKind) -> usize {
            self.diagnostics.count(kind)
        }
    }

    fn resolve_src(source: &str) -> Resolved {
        let mut translation = parse_script(source).unwrap();
        let mut diagnostics = Diagnostics::new();
        let globals: FxHashSet<String> = ["console".to_string()].into_iter().collect();
        resolve(
            &mut translation.ast,
            translation.block,
            "test.js",
            &globals,
            &mut diagnostics,
        );
        Resolved {
            translation,
            diagnostics,
        }
    }

    #[test]
    fn test_literal_types() {
        let r = resolve_src("let a = 1; let b = 'x'; let c = true; let d = `t${a}`;");
        assert_eq!(r.var_type("a"), ValueType::Number);
        assert_eq!(r.var_type("b"), ValueType::String);
        assert_eq!(r.var_type("c"), ValueType::Dynamic);
        assert_eq!(r.var_type("d"), ValueType::String);
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn test_string_concatenation_wins() {
        let r = resolve_src("let x = 1; let y = x + \"a\";");
        assert_eq!(r.var_type("y"), ValueType::String);
        assert_eq!(r.count(DiagnosticKind::Type), 0);
    }

    #[test]
    fn test_assignment_mismatch_keeps_declared_type() {
        let r = resolve_src("let a = 1; a = \"s\";");
        assert_eq!(r.count(DiagnosticKind::Type), 1);
        assert_eq!(r.var_type("a"), ValueType::Number);
        assert_eq!(
            r.diagnostics.entries()[0].message,
            "invalid conversion from 'String' to 'Number'"
        );
    }

    #[test]
    fn test_string_operand_wins_for_every_operator() {
        let r = resolve_src("let n = 2; let s = 'a'; let r = n * s;");
        assert_eq!(r.var_type("r"), ValueType::String);
        assert_eq!(r.count(DiagnosticKind::Type), 0);
    }

    #[test]
    fn test_compound_assignment_with_string() {
        let r = resolve_src("let a = 1; a -= \"x\";");
        let assignment = r.ast().scope(r.root()).body[1];
        assert_eq!(r.ast().value_type(assignment), ValueType::String);
        assert_eq!(r.var_type("a"), ValueType::Number);
        assert_eq!(r.count(DiagnosticKind::Type), 0);
    }

    #[test]
    fn test_dynamic_variable_adopts_first_assignment() {
        let r = resolve_src("let a; a = 'x'; a = 'y';");
        assert_eq!(r.var_type("a"), ValueType::String);
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn test_inner_declaration_shadows() {
        let r = resolve_src("let a = 1; a; { a; let a = 's'; a; } a;");
        let ids = r.identifiers("a");
        // declaration, use, inner use before decl, inner decl, inner use, outer use
        let outer = ids[0];
        let inner = ids[3];
        assert_eq!(r.reference(ids[1]), Some(outer));
        assert_eq!(r.reference(ids[2]), Some(outer));
        assert_eq!(r.reference(ids[4]), Some(inner));
        assert_eq!(r.reference(ids[5]), Some(outer));
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn test_undeclared_identifier() {
        let r = resolve_src("let a = b + 1; console.log(a);");
        assert_eq!(r.count(DiagnosticKind::Identifier), 1);
        assert_eq!(
            r.diagnostics.entries()[0].message,
            "‘b’ was not declared in this scope"
        );
        assert_eq!(r.var_type("a"), ValueType::None);
        assert_eq!(r.count(DiagnosticKind::Type), 0);
    }

    #[test]
    fn test_redeclaration() {
        let r = resolve_src("let a = 1; let a = 2;");
        assert_eq!(r.count(DiagnosticKind::Redeclaration), 1);
    }

    #[test]
    fn test_function_variable_is_hoisted() {
        let r = resolve_src("let n = twice(2); var twice = (x) => x * 2;");
        let body = &r.ast().scope(r.root()).body;
        assert!(matches!(r.ast().kind(body[1]), NodeKind::Function(_)));
        assert_eq!(body.len(), 2);
        assert_eq!(r.var_type("n"), ValueType::Number);
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn test_call_infers_params_and_return() {
        let r = resolve_src("function add(a, b) { return a + b; } let s = add(1, 2);");
        let add = r.ast().lookup(r.root(), "add").unwrap();
        let function = r.ast().function(add).unwrap();
        assert!(function.resolved);
        assert_eq!(function.num_called, 1);
        assert_eq!(function.return_type, ValueType::Number);
        assert!(function.return_value);
        for param in &function.params {
            assert_eq!(r.ast().value_type(*param), ValueType::Number);
        }
        assert_eq!(r.var_type("s"), ValueType::Number);
    }

    #[test]
    fn test_argument_mismatch_after_first_call() {
        let r = resolve_src("function f(a) { return a; } f(1); f('x');");
        assert_eq!(r.count(DiagnosticKind::Type), 1);
    }

    #[test]
    fn test_return_mismatch_keeps_first_type() {
        let r = resolve_src("function f(x) { if (x) return 1; return \"s\"; } f(1);");
        let f = r.ast().lookup(r.root(), "f").unwrap();
        assert_eq!(r.ast().function(f).unwrap().return_type, ValueType::Number);
        assert_eq!(r.count(DiagnosticKind::Type), 1);
        assert_eq!(
            r.diagnostics.entries()[0].message,
            "invalid conversion from 'String' to 'Number'"
        );
    }

    #[test]
    fn test_fixed_return_type_flows_into_returned_variable() {
        let r = resolve_src("let d; function g(a) { if (a) return 1; return a; } let n = g(d);");
        let g = r.ast().lookup(r.root(), "g").unwrap();
        let function = r.ast().function(g).unwrap();
        assert_eq!(function.return_type, ValueType::Number);
        assert_eq!(r.ast().value_type(function.params[0]), ValueType::Number);
        assert_eq!(r.var_type("n"), ValueType::Number);
        assert!(r.diagnostics.is_empty(), "{:?}", r.diagnostics.entries());
    }

    #[test]
    fn test_call_errors_are_recovered() {
        let r = resolve_src("function f(a) {} f(1, 2); let n = 1; n(); let after = 'ok';");
        assert_eq!(r.count(DiagnosticKind::Call), 2);
        assert_eq!(r.var_type("after"), ValueType::String);
    }

    #[test]
    fn test_uncalled_function_is_resolved() {
        let r = resolve_src("function f() { return missing; }");
        let f = r.ast().lookup(r.root(), "f").unwrap();
        assert!(r.ast().function(f).unwrap().resolved);
        assert_eq!(r.count(DiagnosticKind::Identifier), 1);
    }

    #[test]
    fn test_for_and_catch_bindings() {
        let r = resolve_src(
            "for (let i = 0; i < 3; i++) { i; } try { x(); } catch (e) { e; } function x() {}",
        );
        assert!(r.diagnostics.is_empty(), "{:?}", r.diagnostics.entries());
    }

    #[test]
    fn test_imports_bind_dynamic_names() {
        let r = resolve_src("import a, { b as c } from './m'; let d = a + c;");
        assert_eq!(r.var_type("a"), ValueType::Dynamic);
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn test_class_methods_are_resolved() {
        let r = resolve_src(
            "class A { constructor(x) { this.x = x; } value() { return this.x; } } let a = new A(1);",
        );
        assert!(r.diagnostics.is_empty());
        assert_eq!(r.var_type("A"), ValueType::Function);
    }
}
