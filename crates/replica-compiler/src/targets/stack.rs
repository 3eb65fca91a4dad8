//! Stack-machine target.
//!
//! Emits a folded s-expression module in the WebAssembly text style.
//! Top-level variables become module globals, top-level functions become
//! `func` forms named by their link name, and every other top-level
//! statement runs from a generated start function. Only Number has a
//! machine type (`i32`); anything else is reported and lowered as `i32`.

use rustc_hash::FxHashSet;

use crate::ast::{
    AssignOp, Ast, BinaryOp, Function, NodeId, NodeKind, ScopeId, UnaryOp, UpdateOp, ValueType,
    VariableKind,
};
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::project::SourceFile;

const START: &str = "$__start";

/// Link name of a function: `_Z<len><name>`.
pub fn link_name(name: &str) -> String {
    format!("_Z{}{}", name.len(), name)
}

/// Opcode for a binary operator, without the type prefix.
fn binary_opcode(op: BinaryOp) -> Option<&'static str> {
    let opcode = match op {
        BinaryOp::Add => "add",
        BinaryOp::Subtract => "sub",
        BinaryOp::Multiply => "mul",
        BinaryOp::Divide => "div_s",
        BinaryOp::Modulo => "rem_s",
        BinaryOp::LessThan => "lt_s",
        BinaryOp::LessThanEqual => "le_s",
        BinaryOp::GreaterThan => "gt_s",
        BinaryOp::GreaterThanEqual => "ge_s",
        BinaryOp::Equal | BinaryOp::StrictEqual => "eq",
        BinaryOp::NotEqual | BinaryOp::StrictNotEqual => "ne",
        BinaryOp::BitwiseAnd => "and",
        BinaryOp::BitwiseOr => "or",
        BinaryOp::BitwiseXor => "xor",
        BinaryOp::LeftShift => "shl",
        BinaryOp::RightShift => "shr_s",
        BinaryOp::UnsignedRightShift => "shr_u",
        BinaryOp::Exponent | BinaryOp::In | BinaryOp::InstanceOf => return None,
    };
    Some(opcode)
}

fn update_opcode(op: UpdateOp) -> &'static str {
    match op {
        UpdateOp::Increment => "add",
        UpdateOp::Decrement => "sub",
    }
}

/// Labels of the innermost enclosing loop.
struct LoopLabels {
    exit: String,
    next: Option<String>,
}

/// Where a top-level binding lives.
enum Export {
    Func(String),
    Global(String),
}

/// Renders one source file as a stack-machine module.
pub struct StackGenerator<'a> {
    ast: &'a Ast,
    file: String,
    sink: &'a mut dyn DiagnosticSink,
    global: ScopeId,
    scope: ScopeId,
    labels: u32,
    loops: Vec<LoopLabels>,
    depth: usize,
    out: Vec<String>,
}

impl<'a> StackGenerator<'a> {
    /// Renders `file`, reporting what the target cannot express to `sink`.
    ///
    /// Returns an empty string when the file has no block.
    pub fn generate(file: &'a SourceFile, sink: &'a mut dyn DiagnosticSink) -> String {
        let Some(scope) = file.block.and_then(|block| file.ast.block_scope(block)) else {
            return String::new();
        };
        let mut generator = StackGenerator {
            ast: &file.ast,
            file: file.relative_path(),
            sink,
            global: scope,
            scope,
            labels: 0,
            loops: Vec::new(),
            depth: 0,
            out: Vec::new(),
        };
        generator.module();
        generator.out.join("\n")
    }

    // ==================== Output ====================

    fn line(&mut self, text: impl AsRef<str>) {
        let indent = "\t".repeat(self.depth);
        self.out.push(format!("{}{}", indent, text.as_ref()));
    }

    /// A form with no operands on its own line.
    fn atom(&mut self, text: impl AsRef<str>) {
        self.line(format!("({})", text.as_ref()));
    }

    fn open(&mut self, head: impl AsRef<str>) {
        self.line(format!("({}", head.as_ref()));
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth -= 1;
        // a paren appended to a line comment would be commented out
        let after_comment = self
            .out
            .last()
            .is_some_and(|last| last.trim_start().starts_with(";;"));
        if after_comment {
            self.line(")");
        } else if let Some(last) = self.out.last_mut() {
            last.push(')');
        }
    }

    fn label(&mut self) -> String {
        let label = format!("$label${}", self.labels);
        self.labels += 1;
        label
    }

    fn report(&mut self, message: String) {
        self.sink
            .report(Diagnostic::new(DiagnosticKind::Target, self.file.clone(), message));
    }

    fn unsupported(&mut self, what: &str) {
        self.line(format!(";; unsupported {}", what));
        self.report(format!("{} is not supported by the stack-machine target", what));
    }

    /// Machine type of a value type.
    fn machine_type(&mut self, value_type: ValueType) -> &'static str {
        if value_type != ValueType::Number {
            self.report(format!("{} values have no stack-machine type", value_type));
        }
        "i32"
    }

    // ==================== Module ====================

    fn module(&mut self) {
        let ast = self.ast;
        let mut globals = Vec::new();
        let mut functions = Vec::new();
        let mut start = Vec::new();
        let mut exports = Vec::new();

        for &node in &ast.scope(self.global).body {
            match ast.kind(node) {
                NodeKind::VariableDeclaration { .. } => {
                    globals.push(node);
                    start.push(node);
                }
                NodeKind::Function(function) if function.id.is_some() => functions.push(node),
                NodeKind::Export {
                    declaration,
                    specifiers,
                    source: None,
                    ..
                } => {
                    if let Some(declaration) = *declaration {
                        match ast.kind(declaration) {
                            NodeKind::VariableDeclaration { .. } => {
                                globals.push(declaration);
                                start.push(declaration);
                                for id in ast.bound_identifiers(declaration) {
                                    if let Some(name) = ast.identifier_name(id) {
                                        exports.push((name.to_string(), name.to_string()));
                                    }
                                }
                            }
                            NodeKind::Function(Function { id: Some(id), .. }) => {
                                functions.push(declaration);
                                if let Some(name) = ast.identifier_name(*id) {
                                    exports.push((name.to_string(), name.to_string()));
                                }
                            }
                            _ => start.push(declaration),
                        }
                    }
                    for &specifier in specifiers {
                        if let NodeKind::Specifier { local, remote, .. } = ast.kind(specifier) {
                            if let Some(local) = ast.identifier_name(*local) {
                                exports.push((local.to_string(), remote.clone()));
                            }
                        }
                    }
                }
                NodeKind::ExportDefault { declaration } => match ast.kind(*declaration) {
                    NodeKind::Identifier { name, .. } => {
                        exports.push((name.clone(), name.clone()));
                    }
                    NodeKind::Function(Function { id: Some(id), .. }) => {
                        functions.push(*declaration);
                        if let Some(name) = ast.identifier_name(*id) {
                            exports.push((name.to_string(), name.to_string()));
                        }
                    }
                    other => self.report(format!(
                        "default export of {} is not supported by the stack-machine target",
                        other.name()
                    )),
                },
                _ => start.push(node),
            }
        }

        self.open("module");
        for declaration in globals {
            self.globals(declaration);
        }
        for function in functions {
            self.function(function);
        }
        if self.start(&start) {
            self.atom(format!("start {}", START));
        }
        for (local, exported) in exports {
            self.export(&local, &exported);
        }
        self.close();
    }

    fn globals(&mut self, declaration: NodeId) {
        let ast = self.ast;
        let NodeKind::VariableDeclaration { kind, declarations } = ast.kind(declaration) else {
            return;
        };
        for &variable in declarations {
            let NodeKind::Variable { id, init } = ast.kind(variable) else {
                continue;
            };
            let Some(name) = ast.identifier_name(*id) else {
                self.unsupported(ast.kind(*id).name());
                continue;
            };
            let machine_type = self.machine_type(ast.value_type(*id));
            let constant = init.and_then(|init| self.constant(init));
            let global_type = if *kind == VariableKind::Const && (constant.is_some() || init.is_none()) {
                machine_type.to_string()
            } else {
                format!("(mut {})", machine_type)
            };
            self.atom(format!(
                "global ${} {} ({}.const {})",
                name,
                global_type,
                machine_type,
                constant.unwrap_or(0)
            ));
        }
    }

    /// Value of an integer literal that fits a machine word.
    fn constant(&self, node: NodeId) -> Option<i32> {
        match self.ast.kind(node) {
            NodeKind::Number { value, .. }
                if value.fract() == 0.0
                    && *value >= i32::MIN as f64
                    && *value <= i32::MAX as f64 =>
            {
                Some(*value as i32)
            }
            _ => None,
        }
    }

    /// Emits the start function; returns false when there is nothing to run.
    fn start(&mut self, nodes: &[NodeId]) -> bool {
        let ast = self.ast;
        let pending: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|&node| match ast.kind(node) {
                NodeKind::VariableDeclaration { declarations, .. } => {
                    declarations.iter().any(|&variable| self.runtime_init(variable).is_some())
                }
                NodeKind::Empty => false,
                _ => true,
            })
            .collect();
        if pending.is_empty() {
            return false;
        }

        self.open(format!("func {}", START));
        let mut locals = Vec::new();
        for &node in &pending {
            if !matches!(ast.kind(node), NodeKind::VariableDeclaration { .. }) {
                self.collect_locals(node, &mut locals);
            }
        }
        self.locals(locals, &FxHashSet::default());
        for node in pending {
            self.statement(node);
        }
        self.close();
        true
    }

    /// Initializer that has to run at start, for a top-level declarator.
    fn runtime_init(&self, variable: NodeId) -> Option<NodeId> {
        match self.ast.kind(variable) {
            NodeKind::Variable { init: Some(init), .. } if self.constant(*init).is_none() => {
                Some(*init)
            }
            _ => None,
        }
    }

    fn export(&mut self, local: &str, exported: &str) {
        let ast = self.ast;
        let target = match ast.lookup(self.global, local) {
            Some(decl) if ast.function(decl).is_some() => Export::Func(link_name(local)),
            Some(_) => Export::Global(local.to_string()),
            None => {
                self.report(format!("exported name '{}' is not declared", local));
                return;
            }
        };
        match target {
            Export::Func(name) => {
                self.atom(format!("export \"{}\" (func ${})", link_name(exported), name))
            }
            Export::Global(name) => {
                self.atom(format!("export \"{}\" (global ${})", link_name(exported), name))
            }
        }
    }

    // ==================== Functions ====================

    fn function(&mut self, node: NodeId) {
        let ast = self.ast;
        let Some(function) = ast.function(node) else {
            return;
        };
        let name = function
            .id
            .and_then(|id| ast.identifier_name(id))
            .unwrap_or_default();

        let mut head = format!("func ${}", link_name(name));
        let mut params = FxHashSet::default();
        for &param in &function.params {
            match ast.identifier_name(param) {
                Some(param_name) => {
                    let machine_type = self.machine_type(ast.value_type(param));
                    head.push_str(&format!(" (param ${} {})", param_name, machine_type));
                    params.insert(param_name.to_string());
                }
                None => self.report(format!(
                    "{} parameters are not supported by the stack-machine target",
                    ast.kind(param).name()
                )),
            }
        }
        if function.return_value {
            let machine_type = self.machine_type(function.return_type);
            head.push_str(&format!(" (result {})", machine_type));
        }

        self.open(head);
        let saved = std::mem::replace(&mut self.scope, function.scope);
        let saved_loops = std::mem::take(&mut self.loops);

        if function.expression {
            self.open("return");
            self.expression(function.body);
            self.close();
        } else if let Some(scope) = ast.block_scope(function.body) {
            let mut locals = Vec::new();
            for &statement in &ast.scope(scope).body {
                self.collect_locals(statement, &mut locals);
            }
            self.locals(locals, &params);
            self.scope = scope;
            self.statements(scope);
        }

        self.loops = saved_loops;
        self.scope = saved;
        self.close();
    }

    /// Declarations below `node`, without descending into nested functions.
    fn collect_locals(&self, node: NodeId, out: &mut Vec<NodeId>) {
        let ast = self.ast;
        match ast.kind(node) {
            NodeKind::Function(_) | NodeKind::ArrowFunction(_) | NodeKind::Class(_) => {}
            NodeKind::VariableDeclaration { .. } => {
                out.extend(ast.bound_identifiers(node));
                for child in ast.children(node) {
                    self.collect_locals(child, out);
                }
            }
            _ => {
                for child in ast.children(node) {
                    self.collect_locals(child, out);
                }
            }
        }
    }

    fn locals(&mut self, ids: Vec<NodeId>, params: &FxHashSet<String>) {
        let ast = self.ast;
        let mut seen = FxHashSet::default();
        for id in ids {
            let Some(name) = ast.identifier_name(id) else {
                continue;
            };
            if params.contains(name) || !seen.insert(name) {
                continue;
            }
            let machine_type = self.machine_type(ast.value_type(id));
            self.atom(format!("local ${} {}", name, machine_type));
        }
    }

    /// Whether `name` resolves below the module scope.
    fn is_local(&self, name: &str) -> bool {
        let mut current = Some(self.scope);
        while let Some(id) = current {
            if id == self.global {
                return false;
            }
            let scope = self.ast.scope(id);
            if scope.declares(name) {
                return true;
            }
            current = scope.parent;
        }
        false
    }

    fn get(&mut self, name: &str) {
        if self.is_local(name) {
            self.atom(format!("get_local ${}", name));
        } else {
            self.atom(format!("get_global ${}", name));
        }
    }

    // ==================== Statements ====================

    fn statements(&mut self, scope: ScopeId) {
        let ast = self.ast;
        for &node in &ast.scope(scope).body {
            self.statement(node);
        }
    }

    /// A branch or loop body.
    fn body(&mut self, node: NodeId) {
        match self.ast.kind(node) {
            NodeKind::Block { scope } => {
                let saved = std::mem::replace(&mut self.scope, *scope);
                self.statements(*scope);
                self.scope = saved;
            }
            _ => self.statement(node),
        }
    }

    fn statement(&mut self, node: NodeId) {
        let ast = self.ast;
        match ast.kind(node) {
            NodeKind::Empty => {}
            NodeKind::VariableDeclaration { declarations, .. } => {
                for &variable in declarations {
                    self.variable(variable);
                }
            }
            NodeKind::Block { .. } => self.body(node),
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                self.open("if");
                self.expression(*test);
                self.open("then");
                self.body(*consequent);
                self.close();
                if let Some(alternate) = alternate {
                    self.open("else");
                    self.body(*alternate);
                    self.close();
                }
                self.close();
            }
            NodeKind::For {
                init,
                test,
                update,
                body,
            } => {
                let Some(scope) = ast.block_scope(*body) else {
                    return;
                };
                let saved = std::mem::replace(&mut self.scope, scope);
                if let Some(init) = init {
                    self.statement(*init);
                }
                self.lower_loop(*test, *body, *update);
                self.scope = saved;
            }
            NodeKind::While { test, body } => self.lower_loop(Some(*test), *body, None),
            NodeKind::DoWhile { body, test } => {
                let exit = self.label();
                let repeat = self.label();
                let next = self.needs_continue(*body).then(|| self.label());
                self.open(format!("block {}", exit));
                self.open(format!("loop {}", repeat));
                self.loop_body(*body, exit, next);
                self.open(format!("br_if {}", repeat));
                self.expression(*test);
                self.close();
                self.close();
                self.close();
            }
            NodeKind::Break { label: None } => match self.loops.last() {
                Some(labels) => {
                    let exit = labels.exit.clone();
                    self.atom(format!("br {}", exit));
                }
                None => self.unsupported("break outside a loop"),
            },
            NodeKind::Continue { label: None } => {
                match self.loops.last().and_then(|labels| labels.next.clone()) {
                    Some(next) => self.atom(format!("br {}", next)),
                    None => self.unsupported("continue outside a loop"),
                }
            }
            NodeKind::Return { argument } => match argument {
                Some(argument) => {
                    self.open("return");
                    self.expression(*argument);
                    self.close();
                }
                None => self.atom("return"),
            },
            NodeKind::Function(_) => self.unsupported("nested function"),
            NodeKind::Assign { op, target, value } => self.assign(*op, *target, *value, false),
            NodeKind::Update { op, argument, .. } => self.update(*op, *argument, false),
            _ if is_expression(ast.kind(node)) => {
                if self.produces_value(node) {
                    self.open("drop");
                    self.expression(node);
                    self.close();
                } else {
                    self.expression(node);
                }
            }
            other => self.unsupported(other.name()),
        }
    }

    fn variable(&mut self, variable: NodeId) {
        let ast = self.ast;
        let NodeKind::Variable { id, init } = ast.kind(variable) else {
            return;
        };
        let Some(init) = *init else {
            return;
        };
        let Some(name) = ast.identifier_name(*id) else {
            self.unsupported(ast.kind(*id).name());
            return;
        };
        // constant globals are initialized in their declaration
        if self.scope == self.global && self.constant(init).is_some() {
            return;
        }
        self.set(name, |this| this.expression(init), false);
    }

    /// `(block $exit (loop $repeat (br_if $exit (i32.eqz test)) body update (br $repeat)))`
    fn lower_loop(&mut self, test: Option<NodeId>, body: NodeId, update: Option<NodeId>) {
        let exit = self.label();
        let repeat = self.label();
        let next = self.needs_continue(body).then(|| self.label());
        self.open(format!("block {}", exit));
        self.open(format!("loop {}", repeat));
        if let Some(test) = test {
            self.open(format!("br_if {}", exit));
            self.open("i32.eqz");
            self.expression(test);
            self.close();
            self.close();
        }
        self.loop_body(body, exit, next);
        if let Some(update) = update {
            self.statement(update);
        }
        self.atom(format!("br {}", repeat));
        self.close();
        self.close();
    }

    /// The body, wrapped in a block that `continue` breaks out of when needed.
    fn loop_body(&mut self, body: NodeId, exit: String, next: Option<String>) {
        self.loops.push(LoopLabels {
            exit,
            next: next.clone(),
        });
        match next {
            Some(next) => {
                self.open(format!("block {}", next));
                self.body(body);
                self.close();
            }
            None => self.body(body),
        }
        self.loops.pop();
    }

    /// Whether a `continue` targets the loop owning `body`.
    fn needs_continue(&self, node: NodeId) -> bool {
        let ast = self.ast;
        ast.children(node).into_iter().any(|child| match ast.kind(child) {
            NodeKind::Continue { .. } => true,
            NodeKind::For { .. }
            | NodeKind::ForIn { .. }
            | NodeKind::While { .. }
            | NodeKind::DoWhile { .. }
            | NodeKind::Function(_)
            | NodeKind::ArrowFunction(_)
            | NodeKind::Class(_) => false,
            _ => self.needs_continue(child),
        })
    }

    // ==================== Expressions ====================

    /// Whether evaluating `node` leaves a value on the stack.
    fn produces_value(&self, node: NodeId) -> bool {
        let ast = self.ast;
        match ast.kind(node) {
            NodeKind::Call { callee, .. } => match ast.kind(*callee) {
                NodeKind::Identifier {
                    reference: Some(decl),
                    ..
                } => ast
                    .function(*decl)
                    .is_some_and(|function| function.return_value),
                _ => false,
            },
            NodeKind::Sequence(items) => items.last().is_some_and(|&last| self.produces_value(last)),
            kind => is_supported_value(kind),
        }
    }

    fn set(&mut self, name: &str, value: impl FnOnce(&mut Self), keep: bool) {
        let local = self.is_local(name);
        let instruction = match (local, keep) {
            (true, true) => "tee_local",
            (true, false) => "set_local",
            (false, _) => "set_global",
        };
        self.open(format!("{} ${}", instruction, name));
        value(self);
        self.close();
        if keep && !local {
            self.atom(format!("get_global ${}", name));
        }
    }

    fn assign(&mut self, op: AssignOp, target: NodeId, value: NodeId, keep: bool) {
        let ast = self.ast;
        let Some(name) = ast.identifier_name(target) else {
            self.unsupported(&format!("assignment to {}", ast.kind(target).name()));
            return;
        };
        let binary = op.binary_operator();
        if binary.is_none() && op != AssignOp::Assign {
            self.unsupported(&format!("'{}' assignment", op.as_str()));
            return;
        }
        self.set(
            name,
            |this| match binary {
                Some(binary) => this.binary(binary, target, value),
                None => this.expression(value),
            },
            keep,
        );
    }

    fn update(&mut self, op: UpdateOp, argument: NodeId, keep: bool) {
        let ast = self.ast;
        let Some(name) = ast.identifier_name(argument) else {
            self.unsupported(&format!("update of {}", ast.kind(argument).name()));
            return;
        };
        let machine_type = self.machine_type(ast.value_type(argument));
        self.set(
            name,
            |this| {
                this.open(format!("{}.{}", machine_type, update_opcode(op)));
                this.get(name);
                this.atom(format!("{}.const 1", machine_type));
                this.close();
            },
            keep,
        );
    }

    fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) {
        let Some(opcode) = binary_opcode(op) else {
            self.unsupported(&format!("'{}' operator", op.as_str()));
            return;
        };
        let machine_type = self.machine_type(self.ast.value_type(left));
        self.open(format!("{}.{}", machine_type, opcode));
        self.expression(left);
        self.expression(right);
        self.close();
    }

    fn expression(&mut self, node: NodeId) {
        let ast = self.ast;
        match ast.kind(node) {
            NodeKind::Number { value, raw } => match self.constant(node) {
                Some(value) => self.atom(format!("i32.const {}", value)),
                None => {
                    self.report(format!("number {} does not fit i32", raw));
                    self.atom(format!("i32.const {}", value.trunc() as i32));
                }
            },
            NodeKind::Bool(value) => self.atom(format!("i32.const {}", i32::from(*value))),
            NodeKind::Identifier { name, reference } => {
                if reference.is_some_and(|decl| ast.function(decl).is_some()) {
                    self.unsupported("function reference");
                } else {
                    self.get(name);
                }
            }
            NodeKind::Binary { op, left, right } => self.binary(*op, *left, *right),
            NodeKind::Assign { op, target, value } => self.assign(*op, *target, *value, true),
            NodeKind::Update {
                op,
                prefix,
                argument,
            } => {
                if *prefix {
                    self.update(*op, *argument, true);
                } else if let Some(name) = ast.identifier_name(*argument) {
                    self.get(name);
                    self.update(*op, *argument, false);
                } else {
                    self.unsupported(&format!("update of {}", ast.kind(*argument).name()));
                }
            }
            NodeKind::Unary { op, argument } => match op {
                UnaryOp::Plus => self.expression(*argument),
                UnaryOp::Minus => {
                    self.open("i32.sub");
                    self.atom("i32.const 0");
                    self.expression(*argument);
                    self.close();
                }
                UnaryOp::LogicalNot => {
                    self.open("i32.eqz");
                    self.expression(*argument);
                    self.close();
                }
                UnaryOp::BitwiseNot => {
                    self.open("i32.xor");
                    self.expression(*argument);
                    self.atom("i32.const -1");
                    self.close();
                }
                other => self.unsupported(&format!("'{}' operator", other.as_str())),
            },
            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                let machine_type = self.machine_type(ast.value_type(node));
                self.open(format!("if (result {})", machine_type));
                self.expression(*test);
                self.open("then");
                self.expression(*consequent);
                self.close();
                self.open("else");
                self.expression(*alternate);
                self.close();
                self.close();
            }
            NodeKind::Sequence(items) => {
                for (index, &item) in items.iter().enumerate() {
                    if index + 1 < items.len() {
                        self.statement(item);
                    } else {
                        self.expression(item);
                    }
                }
            }
            NodeKind::Call { callee, arguments } => {
                let target = match ast.kind(*callee) {
                    NodeKind::Identifier {
                        name,
                        reference: Some(decl),
                    } if ast.function(*decl).is_some() => Some(name),
                    _ => None,
                };
                let Some(name) = target else {
                    self.unsupported(&format!("call of {}", ast.kind(*callee).name()));
                    return;
                };
                self.open(format!("call ${}", link_name(name)));
                for &argument in arguments {
                    self.expression(argument);
                }
                self.close();
            }
            other => self.unsupported(other.name()),
        }
    }
}

/// Node kinds that appear as expression statements.
fn is_expression(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Number { .. }
            | NodeKind::String { .. }
            | NodeKind::Bool(_)
            | NodeKind::Null
            | NodeKind::Identifier { .. }
            | NodeKind::Name { .. }
            | NodeKind::This
            | NodeKind::Binary { .. }
            | NodeKind::Logical { .. }
            | NodeKind::Conditional { .. }
            | NodeKind::Unary { .. }
            | NodeKind::Sequence(_)
            | NodeKind::Call { .. }
            | NodeKind::New { .. }
            | NodeKind::Array(_)
            | NodeKind::Object(_)
            | NodeKind::Template { .. }
            | NodeKind::ArrowFunction(_)
    )
}

/// Kinds the expression lowering turns into a value.
fn is_supported_value(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Number { .. }
            | NodeKind::Bool(_)
            | NodeKind::Identifier { .. }
            | NodeKind::Binary { .. }
            | NodeKind::Conditional { .. }
            | NodeKind::Unary { .. }
            | NodeKind::Assign { .. }
            | NodeKind::Update { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::diagnostics::Diagnostics;
    use crate::module_system::MemorySource;
    use crate::project::Project;

    fn compile_src(source: &str) -> (String, Diagnostics) {
        let mut project = Project::with_source(
            &Config::with_root("/p"),
            MemorySource::new().with_file("/p/main.js", source),
        );
        let id = project.parse("main.js");
        project.prepare(id, false);
        let mut diagnostics = Diagnostics::new();
        let output = StackGenerator::generate(project.file(id).unwrap(), &mut diagnostics);
        (output, diagnostics)
    }

    #[test]
    fn test_link_name() {
        assert_eq!(link_name("add"), "_Z3add");
        assert_eq!(link_name("makeSubtype"), "_Z11makeSubtype");
    }

    #[test]
    fn test_numeric_function() {
        let (output, diagnostics) = compile_src("function add(a, b) { return a + b; }\nadd(1, 2);");
        assert_eq!(
            output,
            "(module\n\
             \t(func $_Z3add (param $a i32) (param $b i32) (result i32)\n\
             \t\t(return\n\
             \t\t\t(i32.add\n\
             \t\t\t\t(get_local $a)\n\
             \t\t\t\t(get_local $b))))\n\
             \t(func $__start\n\
             \t\t(drop\n\
             \t\t\t(call $_Z3add\n\
             \t\t\t\t(i32.const 1)\n\
             \t\t\t\t(i32.const 2))))\n\
             \t(start $__start))"
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_globals() {
        let (output, _) = compile_src("var x = 5;\nconst y = 2;\nvar z = x * y;");
        assert!(output.contains("\t(global $x (mut i32) (i32.const 5))\n"));
        assert!(output.contains("\t(global $y i32 (i32.const 2))\n"));
        assert!(output.contains("\t(global $z (mut i32) (i32.const 0))\n"));
        assert!(output.contains(
            "\t\t(set_global $z\n\t\t\t(i32.mul\n\t\t\t\t(get_global $x)\n\t\t\t\t(get_global $y))"
        ));
    }

    #[test]
    fn test_locals_and_for_loop() {
        let (output, _) = compile_src(
            "function sum(n) {\n  var total = 0;\n  for (var i = 0; i < n; i++) { total += i; }\n  return total;\n}\nsum(3);",
        );
        assert!(output.contains("(func $_Z3sum (param $n i32) (result i32)\n"));
        assert!(output.contains("\t\t(local $total i32)\n\t\t(local $i i32)\n"));
        assert!(output.contains("(set_local $total\n"));
        assert!(output.contains("(block $label$0\n"));
        assert!(output.contains("(loop $label$1\n"));
        assert!(output.contains("(br_if $label$0\n"));
        assert!(output.contains("(i32.eqz\n"));
        assert!(output.contains("(i32.lt_s\n"));
        assert!(output.contains("(br $label$1))"));
        assert!(output.contains("(set_local $i\n"));
    }

    #[test]
    fn test_continue_breaks_out_of_body_block() {
        let (output, _) = compile_src(
            "function f(n) {\n  var i = 0;\n  while (i < n) {\n    i++;\n    if (i == 2) { continue; }\n  }\n  return i;\n}\nf(4);",
        );
        assert!(output.contains("(block $label$2\n"));
        assert!(output.contains("(br $label$2)"));
        assert!(output.contains("(i32.eq\n"));
    }

    #[test]
    fn test_exports() {
        let (output, _) =
            compile_src("export default function inc(x) { return x + 1; }\ninc(1);");
        assert!(output.contains("(export \"_Z3inc\" (func $_Z3inc))"));

        let (output, _) = compile_src("var count = 0;\nexport default count;");
        assert!(output.contains("(export \"_Z5count\" (global $count))"));
    }

    #[test]
    fn test_unsupported_constructs_are_reported() {
        let (output, diagnostics) = compile_src("var s = \"a\";");
        assert!(output.contains(";; unsupported String"));
        assert!(diagnostics.count(DiagnosticKind::Target) >= 1);
    }

    /// Open and close parens of `output`, skipping line comments.
    fn paren_balance(output: &str) -> (usize, usize) {
        output
            .lines()
            .map(|line| line.split(";;").next().unwrap_or_default())
            .fold((0, 0), |(open, close), code| {
                (
                    open + code.matches('(').count(),
                    close + code.matches(')').count(),
                )
            })
    }

    #[test]
    fn test_unsupported_comment_keeps_parens_balanced() {
        let (output, diagnostics) =
            compile_src("function f(a) { return a + 1; }\nvar s = 'x';\nf(1);");
        assert!(output.contains(";; unsupported String"));
        assert!(output
            .lines()
            .filter(|line| line.contains(";;"))
            .all(|line| !line.ends_with(')')));
        assert!(output.ends_with(')'));
        let (open, close) = paren_balance(&output);
        assert_eq!(open, close, "{}", output);
        assert!(diagnostics.count(DiagnosticKind::Target) >= 1);
    }

    #[test]
    fn test_missing_block_renders_nothing() {
        let (output, _) = compile_src("let = ;");
        assert!(output.is_empty());
    }
}
