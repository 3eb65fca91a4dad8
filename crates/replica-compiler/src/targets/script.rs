//! Script target.
//!
//! Renders a resolved file back into script text. With module wrapping on,
//! each file becomes an immediately invoked function whose imports and
//! exports go through a shared `modules` table keyed by file id. Classes are
//! lowered to constructor functions chained with `_inherits`, and object
//! patterns to temporaries. Without module wrapping the file keeps its
//! module and class syntax.
//!
//! Indentation follows an explicit nesting depth: the top level of an
//! unwrapped file has no braces, every nested block is braced.

use rustc_hash::FxHashMap;

use super::is_identifier;
use crate::ast::{
    self, Ast, Class, Function, MethodKind, NodeId, NodeKind, ObjectProperty, PatternProperty,
    PropertyKind, ScopeId, SpecifierKind, UnaryOp, VariableKind,
};
use crate::config::CompileOptions;
use crate::project::{FileId, SourceFile};

/// The makeSubtype helper installed by [`prelude`].
const INHERITS: &str = r#"scope._inherits = function(a, b) {
		var protoA = a.prototype;
		var proto = Object.create(b.prototype);
		for(var key in protoA) {
			var param = Object.getOwnPropertyDescriptor(protoA, key);
			if(param.get || param.set) {
				Object.defineProperty(proto, key, param);
			}
			else {
				proto[key] = protoA[key];
			}
		}
		a.prototype = proto;
		a.prototype.constructor = a;
		a.__parent = b;
		if(b.__inherit === undefined) {
			b.__inherit = {};
		}
		b.__inherit[a.name] = a;
		var parent = b.__parent;
		while(parent) {
			parent.__inherit[a.name] = a;
			parent = parent.__parent;
		}
	};"#;

/// Runtime shared by every wrapped file: the module table, the table of
/// module paths and the `_inherits` helper.
pub fn prelude<'a>(paths: impl IntoIterator<Item = (FileId, &'a str)>) -> String {
    let entries: Vec<String> = paths
        .into_iter()
        .map(|(id, path)| format!("\"{}\": {}", id, ast::quote_string(&module_path(path))))
        .collect();
    let paths = if entries.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", entries.join(", "))
    };
    format!(
        "\"use strict\";\n\n(function(scope) {{\n\tscope.modules = {{}};\n\tscope.modulesPath = {};\n\t{}\n}})(typeof window !== \"undefined\" ? window : global);\n\n",
        paths, INHERITS
    )
}

/// `./`-prefixed lowercase path used as a module path entry.
fn module_path(relative: &str) -> String {
    let path = relative.to_lowercase();
    if path.starts_with('.') {
        path
    } else {
        format!("./{}", path)
    }
}

/// Class being lowered; decides what `super` renders as.
struct ClassContext {
    super_class: Option<String>,
    is_static: bool,
}

/// Renders one source file as script text.
pub struct ScriptGenerator<'a> {
    file: &'a SourceFile,
    ast: &'a Ast,
    module: bool,
    annotate: bool,
    depth: usize,
    class: Option<ClassContext>,
    temporaries: u32,
    /// Export specifiers of `export { .. } from`, with the file they read
    reexports: FxHashMap<NodeId, Option<FileId>>,
    /// Files of `export * from`
    export_all: Vec<FileId>,
}

impl<'a> ScriptGenerator<'a> {
    /// Creates a generator for a resolved file.
    pub fn new(file: &'a SourceFile, options: &CompileOptions) -> Self {
        Self {
            file,
            ast: &file.ast,
            module: options.module,
            annotate: options.annotate_types,
            depth: 0,
            class: None,
            temporaries: 0,
            reexports: FxHashMap::default(),
            export_all: Vec::new(),
        }
    }

    /// Renders the file; empty when the file has no block.
    pub fn generate(mut self) -> String {
        let Some(scope) = self.file.block.and_then(|block| self.ast.block_scope(block)) else {
            return String::new();
        };
        self.collect_reexports(scope);

        if !self.module {
            return self.statements(scope).join("\n");
        }
        let body = self.braced(|this| {
            let mut lines = this.statements(scope);
            lines.extend(this.exports());
            lines
        });
        format!(
            "(function() {})();\n\n//# sourceURL=./{}",
            body,
            self.file.relative_path()
        )
    }

    fn collect_reexports(&mut self, scope: ScopeId) {
        let ast = self.ast;
        for &node in &ast.scope(scope).body {
            match ast.kind(node) {
                NodeKind::Export {
                    specifiers,
                    source: Some(_),
                    file,
                    ..
                } => {
                    for &specifier in specifiers {
                        self.reexports.insert(specifier, *file);
                    }
                }
                NodeKind::ExportAll { file: Some(file), .. } => self.export_all.push(*file),
                _ => {}
            }
        }
    }

    // ==================== Layout ====================

    fn indent(&self) -> String {
        "\t".repeat(self.depth)
    }

    /// Renders the lines produced by `fill` one level deeper, in braces.
    fn braced(&mut self, fill: impl FnOnce(&mut Self) -> Vec<String>) -> String {
        self.depth += 1;
        let lines = fill(self);
        let inner = self.indent();
        self.depth -= 1;

        if lines.is_empty() {
            return "{}".to_string();
        }
        let mut text = String::from("{\n");
        for line in lines {
            text.push_str(&inner);
            text.push_str(&line);
            text.push('\n');
        }
        text.push_str(&self.indent());
        text.push('}');
        text
    }

    fn temporary(&mut self) -> String {
        let name = format!("__ref{}", self.temporaries);
        self.temporaries += 1;
        name
    }

    fn annotation(&self, node: NodeId) -> String {
        if self.annotate {
            format!("/*:{}*/", self.ast.value_type(node))
        } else {
            String::new()
        }
    }

    // ==================== Statements ====================

    fn statements(&mut self, scope: ScopeId) -> Vec<String> {
        let ast = self.ast;
        ast.scope(scope)
            .body
            .iter()
            .filter_map(|&node| self.statement(node))
            .collect()
    }

    fn block(&mut self, scope: ScopeId) -> String {
        self.braced(|this| this.statements(scope))
    }

    /// A loop or branch body.
    fn body(&mut self, node: NodeId) -> String {
        match self.ast.kind(node) {
            NodeKind::Block { scope } => self.block(*scope),
            _ => self.statement(node).unwrap_or_else(|| ";".to_string()),
        }
    }

    /// Renders a statement; `None` when it produces no text.
    fn statement(&mut self, node: NodeId) -> Option<String> {
        let ast = self.ast;
        let text = match ast.kind(node) {
            NodeKind::Empty
            | NodeKind::Catch { .. }
            | NodeKind::SwitchCase { .. }
            | NodeKind::Specifier { .. }
            | NodeKind::MethodDef { .. }
            | NodeKind::Variable { .. } => return None,
            NodeKind::VariableDeclaration { kind, declarations } => {
                let text = self.variable_declaration(*kind, declarations);
                if text.is_empty() {
                    return None;
                }
                format!("{};", text)
            }
            NodeKind::Function(function) if function.id.is_some() => self.function(function),
            NodeKind::Class(class) if class.id.is_some() => self.class_declaration(class),
            NodeKind::Block { scope } => self.block(*scope),
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                let mut text = format!("if({}) {}", self.expression(*test), self.body(*consequent));
                if let Some(alternate) = alternate {
                    let alternate = match ast.kind(*alternate) {
                        NodeKind::If { .. } => self.statement(*alternate).unwrap_or_default(),
                        _ => self.body(*alternate),
                    };
                    text.push_str(&format!("\n{}else {}", self.indent(), alternate));
                }
                text
            }
            NodeKind::Switch {
                discriminant,
                cases,
            } => self.switch(*discriminant, cases),
            NodeKind::For {
                init,
                test,
                update,
                body,
            } => {
                let init = match init {
                    Some(init) => self.for_head(*init),
                    None => String::new(),
                };
                let test = test.map(|t| format!(" {}", self.expression(t)));
                let update = update.map(|u| format!(" {}", self.expression(u)));
                format!(
                    "for({};{};{}) {}",
                    init,
                    test.unwrap_or_default(),
                    update.unwrap_or_default(),
                    self.body(*body)
                )
            }
            NodeKind::ForIn { left, right, body } => {
                let left = self.for_head(*left);
                format!(
                    "for({} in {}) {}",
                    left,
                    self.expression(*right),
                    self.body(*body)
                )
            }
            NodeKind::While { test, body } => {
                format!("while({}) {}", self.expression(*test), self.body(*body))
            }
            NodeKind::DoWhile { body, test } => {
                let body = self.body(*body);
                format!("do {} while({});", body, self.expression(*test))
            }
            NodeKind::Break { label } => jump("break", label.as_deref()),
            NodeKind::Continue { label } => jump("continue", label.as_deref()),
            NodeKind::Label { label, body } => {
                let body = self.statement(*body).unwrap_or_else(|| ";".to_string());
                format!("{}: {}", label, body)
            }
            NodeKind::Return { argument } => match argument {
                Some(argument) => format!("return {};", self.expression(*argument)),
                None => "return;".to_string(),
            },
            NodeKind::Throw { argument } => format!("throw {};", self.expression(*argument)),
            NodeKind::Try {
                block,
                handler,
                finalizer,
            } => self.try_statement(*block, *handler, *finalizer),
            NodeKind::Import {
                source,
                specifiers,
                file,
            } => return self.import(source, specifiers, *file),
            NodeKind::Export {
                declaration,
                specifiers,
                source,
                ..
            } => return self.export(*declaration, specifiers, source.as_deref()),
            NodeKind::ExportDefault { declaration } => self.export_default(*declaration),
            NodeKind::ExportAll { source, .. } => {
                if self.module {
                    return None;
                }
                format!("export * from {};", ast::quote_string(source))
            }
            NodeKind::Function(_) | NodeKind::Class(_) | NodeKind::Object(_) => {
                format!("({});", self.expression(node))
            }
            _ => format!("{};", self.expression(node)),
        };
        Some(text)
    }

    /// Declaration or target in a `for` head, without a semicolon.
    fn for_head(&mut self, node: NodeId) -> String {
        match self.ast.kind(node) {
            NodeKind::VariableDeclaration { kind, declarations } => {
                self.variable_declaration(*kind, declarations)
            }
            _ => self.expression(node),
        }
    }

    fn switch(&mut self, discriminant: NodeId, cases: &[NodeId]) -> String {
        let ast = self.ast;
        let mut text = format!("switch({}) {{\n", self.expression(discriminant));
        self.depth += 1;
        for &case in cases {
            let NodeKind::SwitchCase { test, scope } = ast.kind(case) else {
                continue;
            };
            let head = match test {
                Some(test) => format!("case {}:", self.expression(*test)),
                None => "default:".to_string(),
            };
            text.push_str(&format!("{}{}\n", self.indent(), head));
            self.depth += 1;
            let indent = self.indent();
            for line in self.statements(*scope) {
                text.push_str(&format!("{}{}\n", indent, line));
            }
            self.depth -= 1;
        }
        self.depth -= 1;
        text.push_str(&self.indent());
        text.push('}');
        text
    }

    fn try_statement(
        &mut self,
        block: NodeId,
        handler: Option<NodeId>,
        finalizer: Option<NodeId>,
    ) -> String {
        let ast = self.ast;
        let mut text = format!("try {}", self.body(block));
        if let Some(NodeKind::Catch { param, body }) = handler.map(|h| ast.kind(h)) {
            let (param, prologue) = match param {
                Some(param) => {
                    let (names, prologue) = self.params(std::slice::from_ref(param));
                    (Some(names), prologue)
                }
                None if self.module => (Some("__error".to_string()), Vec::new()),
                None => (None, Vec::new()),
            };
            let body = match ast.block_scope(*body) {
                Some(scope) => self.braced(|this| {
                    let mut lines = prologue;
                    lines.extend(this.statements(scope));
                    lines
                }),
                None => "{}".to_string(),
            };
            let head = match param {
                Some(param) => format!("catch({}) ", param),
                None => "catch ".to_string(),
            };
            text.push_str(&format!("\n{}{}{}", self.indent(), head, body));
        }
        if let Some(finalizer) = finalizer {
            let body = self.body(finalizer);
            text.push_str(&format!("\n{}finally {}", self.indent(), body));
        }
        text
    }

    // ==================== Declarations and patterns ====================

    /// `kind a = 1, b`; empty when no declarator is left.
    fn variable_declaration(&mut self, kind: VariableKind, declarations: &[NodeId]) -> String {
        let ast = self.ast;
        let mut parts = Vec::with_capacity(declarations.len());
        for &declaration in declarations {
            let NodeKind::Variable { id, init } = ast.kind(declaration) else {
                continue;
            };
            let init = match init {
                Some(init) => Some(self.value(*init)),
                None => None,
            };
            match ast.kind(*id) {
                NodeKind::Identifier { name, .. } => {
                    let binding = format!("{}{}", name, self.annotation(*id));
                    parts.push(match init {
                        Some(init) => format!("{} = {}", binding, init),
                        None => binding,
                    });
                }
                _ if self.module => {
                    let source = init.unwrap_or_else(|| "undefined".to_string());
                    self.lower_pattern(*id, source, &mut parts);
                }
                _ => {
                    let pattern = self.pattern(*id);
                    parts.push(match init {
                        Some(init) => format!("{} = {}", pattern, init),
                        None => pattern,
                    });
                }
            }
        }
        if parts.is_empty() {
            return String::new();
        }
        format!("{} {}", kind.as_str(), parts.join(", "))
    }

    /// Lowers `pattern = source` into plain declarators appended to `out`.
    fn lower_pattern(&mut self, pattern: NodeId, source: String, out: &mut Vec<String>) {
        let ast = self.ast;
        match ast.kind(pattern) {
            NodeKind::Identifier { name, .. } => {
                out.push(format!("{}{} = {}", name, self.annotation(pattern), source));
            }
            NodeKind::AssignmentPattern { left, right } => {
                let fallback = self.value(*right);
                let value = format!("{} === undefined ? {} : {}", source, fallback, source);
                self.lower_pattern(*left, value, out);
            }
            NodeKind::ObjectPattern(properties) => {
                let temporary = self.temporary();
                out.push(format!("{} = {}", temporary, source));
                self.destructure(&temporary, properties, out);
            }
            _ => {}
        }
    }

    /// One declarator per property read from `object`.
    fn destructure(&mut self, object: &str, properties: &[PatternProperty], out: &mut Vec<String>) {
        for property in properties {
            self.lower_pattern(property.value, member(object, &property.key), out);
        }
    }

    /// A pattern written in module syntax.
    fn pattern(&mut self, node: NodeId) -> String {
        let ast = self.ast;
        match ast.kind(node) {
            NodeKind::Identifier { name, .. } => format!("{}{}", name, self.annotation(node)),
            NodeKind::ObjectPattern(properties) => {
                if properties.is_empty() {
                    return "{}".to_string();
                }
                let mut parts = Vec::with_capacity(properties.len());
                for property in properties {
                    let shorthand = match ast.kind(property.value) {
                        NodeKind::Identifier { name, .. } => name == &property.key,
                        NodeKind::AssignmentPattern { left, .. } => {
                            ast.identifier_name(*left) == Some(property.key.as_str())
                        }
                        _ => false,
                    };
                    let value = self.pattern(property.value);
                    parts.push(if shorthand {
                        value
                    } else {
                        format!("{}: {}", property_name(&property.key), value)
                    });
                }
                format!("{{ {} }}", parts.join(", "))
            }
            NodeKind::AssignmentPattern { left, right } => {
                let left = self.pattern(*left);
                format!("{} = {}", left, self.value(*right))
            }
            _ => self.expression(node),
        }
    }

    /// Parameter list plus the statements that unpack lowered parameters.
    fn params(&mut self, params: &[NodeId]) -> (String, Vec<String>) {
        let ast = self.ast;
        let mut names = Vec::with_capacity(params.len());
        let mut prologue = Vec::new();
        for &param in params {
            match ast.kind(param) {
                NodeKind::Identifier { name, .. } => {
                    names.push(format!("{}{}", name, self.annotation(param)));
                }
                NodeKind::AssignmentPattern { left, right } if self.module => {
                    let name = match ast.identifier_name(*left) {
                        Some(name) => {
                            names.push(format!("{}{}", name, self.annotation(*left)));
                            name.to_string()
                        }
                        None => {
                            let temporary = self.temporary();
                            names.push(temporary.clone());
                            temporary
                        }
                    };
                    let fallback = self.value(*right);
                    prologue.push(format!(
                        "{} = {} === undefined ? {} : {};",
                        name, name, fallback, name
                    ));
                    if let NodeKind::ObjectPattern(properties) = ast.kind(*left) {
                        self.unpack(&name, properties, &mut prologue);
                    }
                }
                NodeKind::ObjectPattern(properties) if self.module => {
                    let temporary = self.temporary();
                    names.push(temporary.clone());
                    self.unpack(&temporary, properties, &mut prologue);
                }
                _ => names.push(self.pattern(param)),
            }
        }
        (names.join(", "), prologue)
    }

    fn unpack(&mut self, object: &str, properties: &[PatternProperty], prologue: &mut Vec<String>) {
        let mut parts = Vec::new();
        self.destructure(object, properties, &mut parts);
        if !parts.is_empty() {
            prologue.push(format!("var {};", parts.join(", ")));
        }
    }

    // ==================== Functions and classes ====================

    /// `function name(params) {body}`
    fn function(&mut self, function: &Function) -> String {
        let name = function
            .id
            .and_then(|id| self.ast.identifier_name(id))
            .map(|name| format!(" {}", name))
            .unwrap_or_default();
        format!("function{}{}", name, self.function_tail(function))
    }

    /// `(params) {body}` of a function, method or accessor.
    fn function_tail(&mut self, function: &Function) -> String {
        let (params, prologue) = self.params(&function.params);
        format!("({}) {}", params, self.function_body(function, prologue))
    }

    fn function_body(&mut self, function: &Function, prologue: Vec<String>) -> String {
        let ast = self.ast;
        self.braced(|this| {
            let mut lines = prologue;
            if function.expression {
                lines.push(format!("return {};", this.expression(function.body)));
            } else if let Some(scope) = ast.block_scope(function.body) {
                lines.extend(this.statements(scope));
            }
            lines
        })
    }

    fn arrow(&mut self, function: &Function) -> String {
        let (params, prologue) = self.params(&function.params);
        if function.expression && prologue.is_empty() {
            let body = self.expression(function.body);
            let body = match self.ast.kind(function.body) {
                NodeKind::Object(_) | NodeKind::Sequence(_) => format!("({})", body),
                _ => body,
            };
            return format!("({}) => {}", params, body);
        }
        format!("({}) => {}", params, self.function_body(function, prologue))
    }

    fn class_declaration(&mut self, class: &Class) -> String {
        if !self.module {
            return self.es_class(class);
        }
        let name = self.class_name(class);
        self.lower_class(&name, class)
    }

    fn class_name(&self, class: &Class) -> String {
        class
            .id
            .and_then(|id| self.ast.identifier_name(id))
            .unwrap_or("__class")
            .to_string()
    }

    /// Constructor function, prototype object, statics and `_inherits`.
    fn lower_class(&mut self, name: &str, class: &Class) -> String {
        let ast = self.ast;
        let super_class = class.super_class.map(|node| self.expression(node));
        let saved = self.class.replace(ClassContext {
            super_class: super_class.clone(),
            is_static: false,
        });
        let indent = self.indent();

        let mut constructor = None;
        let mut prototype = Vec::new();
        let mut statics = Vec::new();
        for &member in &class.members {
            let NodeKind::MethodDef {
                key,
                value,
                kind,
                is_static,
                computed,
            } = ast.kind(member)
            else {
                continue;
            };
            let Some(function) = ast.function(*value) else {
                continue;
            };
            if let Some(context) = self.class.as_mut() {
                context.is_static = *is_static;
            }

            if *kind == MethodKind::Constructor {
                constructor = Some(format!("function {}{}", name, self.function_tail(function)));
            } else if *is_static {
                statics.push(self.static_member(name, *key, *computed, *kind, function));
            } else {
                self.depth += 1;
                let key = self.property_key(*key, *computed);
                let tail = self.function_tail(function);
                self.depth -= 1;
                prototype.push(match kind {
                    MethodKind::Get => format!("get {}{}", key, tail),
                    MethodKind::Set => format!("set {}{}", key, tail),
                    _ => format!("{}: function{}", key, tail),
                });
            }
        }
        self.class = saved;

        let constructor = constructor.unwrap_or_else(|| match &super_class {
            Some(parent) => format!(
                "function {}() {{\n{}\t{}.apply(this, arguments);\n{}}}",
                name, indent, parent, indent
            ),
            None => format!("function {}() {{}}", name),
        });
        let mut lines = vec![constructor];
        if !prototype.is_empty() {
            let members: Vec<String> = prototype
                .iter()
                .map(|member| format!("{}\t{}", indent, member))
                .collect();
            lines.push(format!(
                "{}.prototype = {{\n{}\n{}}};",
                name,
                members.join(",\n"),
                indent
            ));
        }
        lines.extend(statics);
        if let Some(parent) = super_class {
            lines.push(format!("_inherits({}, {});", name, parent));
        }
        lines.join(&format!("\n{}", indent))
    }

    fn static_member(
        &mut self,
        class: &str,
        key: NodeId,
        computed: bool,
        kind: MethodKind,
        function: &Function,
    ) -> String {
        let ast = self.ast;
        match kind {
            MethodKind::Get | MethodKind::Set => {
                let name = if computed {
                    self.expression(key)
                } else {
                    match ast.kind(key) {
                        NodeKind::Identifier { name, .. } => ast::quote_string(name),
                        _ => self.expression(key),
                    }
                };
                let accessor = if kind == MethodKind::Get { "get" } else { "set" };
                format!(
                    "Object.defineProperty({}, {}, {{ {}: function{}, configurable: true }});",
                    class,
                    name,
                    accessor,
                    self.function_tail(function)
                )
            }
            _ => {
                let target = match ast.kind(key) {
                    NodeKind::Identifier { name, .. } if !computed => member(class, name),
                    _ => format!("{}[{}]", class, self.expression(key)),
                };
                format!("{} = function{};", target, self.function_tail(function))
            }
        }
    }

    /// Class syntax kept as written.
    fn es_class(&mut self, class: &Class) -> String {
        let ast = self.ast;
        let name = class
            .id
            .and_then(|id| ast.identifier_name(id))
            .map(|name| format!(" {}", name))
            .unwrap_or_default();
        let heritage = class
            .super_class
            .map(|node| format!(" extends {}", self.expression(node)))
            .unwrap_or_default();
        let saved = self.class.take();
        let body = self.braced(|this| {
            let mut lines = Vec::with_capacity(class.members.len());
            for &member in &class.members {
                let NodeKind::MethodDef {
                    key,
                    value,
                    kind,
                    is_static,
                    computed,
                } = ast.kind(member)
                else {
                    continue;
                };
                let Some(function) = ast.function(*value) else {
                    continue;
                };
                let mut head = String::new();
                if *is_static {
                    head.push_str("static ");
                }
                match kind {
                    MethodKind::Get => head.push_str("get "),
                    MethodKind::Set => head.push_str("set "),
                    _ => {}
                }
                head.push_str(&this.property_key(*key, *computed));
                lines.push(format!("{}{}", head, this.function_tail(function)));
            }
            lines
        });
        self.class = saved;
        format!("class{}{} {}", name, heritage, body)
    }

    // ==================== Modules ====================

    fn import(
        &mut self,
        source: &str,
        specifiers: &[NodeId],
        file: Option<FileId>,
    ) -> Option<String> {
        let ast = self.ast;
        let mut bindings = Vec::with_capacity(specifiers.len());
        for &specifier in specifiers {
            if let NodeKind::Specifier {
                local,
                remote,
                kind,
            } = ast.kind(specifier)
            {
                let local = ast.identifier_name(*local).unwrap_or_default();
                bindings.push((local, remote.as_str(), *kind));
            }
        }

        if !self.module {
            return Some(es_import(source, &bindings));
        }

        // an import that failed to resolve was reported already
        let file = file?;
        let table = format!("modules[{}]", file);
        let read = |object: &str, remote: &str, kind: SpecifierKind| match kind {
            SpecifierKind::Named if remote != "default" => member(object, remote),
            _ => object.to_string(),
        };
        match bindings.as_slice() {
            [] => None,
            [(local, remote, kind)] => Some(format!("var {} = {};", local, read(&table, remote, *kind))),
            _ => {
                let alias = format!("__module{}", file);
                let mut lines = vec![format!("var {} = {};", alias, table)];
                for (local, remote, kind) in &bindings {
                    lines.push(format!("var {} = {};", local, read(&alias, remote, *kind)));
                }
                Some(lines.join(&format!("\n{}", self.indent())))
            }
        }
    }

    fn export(
        &mut self,
        declaration: Option<NodeId>,
        specifiers: &[NodeId],
        source: Option<&str>,
    ) -> Option<String> {
        if self.module {
            // bindings are published by the exports epilogue
            return declaration.and_then(|node| self.statement(node));
        }
        if let Some(declaration) = declaration {
            return self
                .statement(declaration)
                .map(|text| format!("export {}", text));
        }

        let ast = self.ast;
        let names: Vec<String> = specifiers
            .iter()
            .filter_map(|&specifier| match ast.kind(specifier) {
                NodeKind::Specifier { local, remote, .. } => {
                    let local = ast.identifier_name(*local).unwrap_or_default();
                    Some(if local == remote {
                        local.to_string()
                    } else {
                        format!("{} as {}", local, remote)
                    })
                }
                _ => None,
            })
            .collect();
        let from = source
            .map(|source| format!(" from {}", ast::quote_string(source)))
            .unwrap_or_default();
        Some(format!("export {{ {} }}{};", names.join(", "), from))
    }

    fn export_default(&mut self, declaration: NodeId) -> String {
        let ast = self.ast;
        let named = match ast.kind(declaration) {
            NodeKind::Function(function) => function.id,
            NodeKind::Class(class) => class.id,
            _ => None,
        }
        .and_then(|id| ast.identifier_name(id));

        if !self.module {
            return match named {
                Some(_) => format!(
                    "export default {}",
                    self.statement(declaration).unwrap_or_default()
                ),
                None => format!("export default {};", self.expression(declaration)),
            };
        }

        let table = format!("modules[{}]", self.file.id);
        match named {
            Some(name) => format!(
                "{}\n{}{} = {};",
                self.statement(declaration).unwrap_or_default(),
                self.indent(),
                table,
                name
            ),
            None => format!("{} = {};", table, self.value(declaration)),
        }
    }

    /// Publishes named exports into the module table.
    fn exports(&mut self) -> Vec<String> {
        let ast = self.ast;
        let table = format!("modules[{}]", self.file.id);

        let mut entries: Vec<(String, String)> = Vec::new();
        for &node in &self.file.exports {
            match ast.kind(node) {
                NodeKind::Function(Function { id: Some(id), .. })
                | NodeKind::Class(Class { id: Some(id), .. }) => {
                    if let Some(name) = ast.identifier_name(*id) {
                        entries.push((name.to_string(), name.to_string()));
                    }
                }
                NodeKind::VariableDeclaration { .. } => {
                    for id in ast.bound_identifiers(node) {
                        if let Some(name) = ast.identifier_name(id) {
                            entries.push((name.to_string(), name.to_string()));
                        }
                    }
                }
                NodeKind::Specifier { local, remote, .. } => {
                    let local = ast.identifier_name(*local).unwrap_or_default();
                    let value = match self.reexports.get(&node) {
                        Some(Some(file)) if local == "default" => format!("modules[{}]", file),
                        Some(Some(file)) => member(&format!("modules[{}]", file), local),
                        Some(None) => continue,
                        None => local.to_string(),
                    };
                    entries.push((remote.clone(), value));
                }
                _ => {}
            }
        }

        let mut lines = Vec::new();
        let mut has_default = self.file.export_default;
        if let Some(index) = entries.iter().position(|(name, _)| name == "default") {
            let (_, value) = entries.remove(index);
            lines.push(format!("{} = {};", table, value));
            has_default = true;
        }

        if has_default {
            for (name, value) in &entries {
                lines.push(format!("{} = {};", member(&table, name), value));
            }
        } else if !entries.is_empty() || !self.export_all.is_empty() {
            let fields: Vec<String> = entries
                .iter()
                .map(|(name, value)| {
                    if name == value {
                        name.clone()
                    } else {
                        format!("{}: {}", property_name(name), value)
                    }
                })
                .collect();
            lines.push(if fields.is_empty() {
                format!("{} = {{}};", table)
            } else {
                format!("{} = {{ {} }};", table, fields.join(", "))
            });
        }
        for file in &self.export_all {
            lines.push(format!("Object.assign({}, modules[{}]);", table, file));
        }
        lines
    }

    // ==================== Expressions ====================

    fn expression(&mut self, node: NodeId) -> String {
        let ast = self.ast;
        match ast.kind(node) {
            NodeKind::Number { raw, .. } | NodeKind::String { raw, .. } => raw.clone(),
            NodeKind::Bool(value) => value.to_string(),
            NodeKind::Null => "null".to_string(),
            NodeKind::Identifier { name, .. } => name.clone(),
            NodeKind::This => "this".to_string(),
            NodeKind::Super => self.super_object(),
            NodeKind::Name {
                object,
                property,
                computed,
            } => {
                let object = match ast.kind(*object) {
                    NodeKind::Super => self.super_object(),
                    _ => self.member_object(*object),
                };
                if *computed {
                    format!("{}[{}]", object, self.expression(*property))
                } else {
                    format!("{}.{}", object, ast.identifier_name(*property).unwrap_or_default())
                }
            }
            NodeKind::Binary { op, left, right } => {
                let left = self.operand(*left);
                format!("{} {} {}", left, op.as_str(), self.operand(*right))
            }
            NodeKind::Logical { op, left, right } => {
                let left = self.operand(*left);
                format!("{} {} {}", left, op.as_str(), self.operand(*right))
            }
            NodeKind::Assign { op, target, value } => {
                let target_text = match ast.kind(*target) {
                    NodeKind::Identifier { name, .. } => {
                        format!("{}{}", name, self.annotation(*target))
                    }
                    _ => self.expression(*target),
                };
                format!("{} {} {}", target_text, op.as_str(), self.value(*value))
            }
            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                let test = match ast.kind(*test) {
                    NodeKind::Conditional { .. }
                    | NodeKind::Assign { .. }
                    | NodeKind::Sequence(_) => format!("({})", self.expression(*test)),
                    _ => self.expression(*test),
                };
                let consequent = self.value(*consequent);
                format!("{} ? {} : {}", test, consequent, self.value(*alternate))
            }
            NodeKind::Unary { op, argument } => {
                let argument_text = self.operand(*argument);
                if op.is_keyword() {
                    return format!("{} {}", op.as_str(), argument_text);
                }
                let doubled = matches!(op, UnaryOp::Minus | UnaryOp::Plus)
                    && argument_text.starts_with(op.as_str());
                if doubled {
                    format!("{}({})", op.as_str(), argument_text)
                } else {
                    format!("{}{}", op.as_str(), argument_text)
                }
            }
            NodeKind::Update {
                op,
                prefix,
                argument,
            } => {
                let argument = self.member_object(*argument);
                if *prefix {
                    format!("{}{}", op.as_str(), argument)
                } else {
                    format!("{}{}", argument, op.as_str())
                }
            }
            NodeKind::Sequence(items) => {
                let items: Vec<String> = items.iter().map(|&item| self.value(item)).collect();
                items.join(", ")
            }
            NodeKind::Call { callee, arguments } => self.call(*callee, arguments),
            NodeKind::New { callee, arguments } => {
                let callee = match ast.kind(*callee) {
                    NodeKind::Identifier { .. } | NodeKind::Name { .. } | NodeKind::This => {
                        self.expression(*callee)
                    }
                    _ => format!("({})", self.expression(*callee)),
                };
                format!("new {}({})", callee, self.arguments(arguments))
            }
            NodeKind::Array(elements) => {
                if elements.is_empty() {
                    return "[]".to_string();
                }
                let elements: Vec<String> = elements
                    .iter()
                    .map(|element| match element {
                        Some(element) => self.value(*element),
                        None => String::new(),
                    })
                    .collect();
                format!("[ {} ]", elements.join(", "))
            }
            NodeKind::Object(properties) => self.object(properties),
            NodeKind::Template {
                quasis,
                expressions,
            } => {
                let mut text = ast::quote_string(quasis.first().map(String::as_str).unwrap_or(""));
                for (index, &expression) in expressions.iter().enumerate() {
                    text.push_str(" + ");
                    text.push_str(&self.operand(expression));
                    match quasis.get(index + 1) {
                        Some(quasi) if !quasi.is_empty() => {
                            text.push_str(" + ");
                            text.push_str(&ast::quote_string(quasi));
                        }
                        _ => {}
                    }
                }
                text
            }
            NodeKind::Function(function) => self.function(function),
            NodeKind::ArrowFunction(function) => self.arrow(function),
            NodeKind::Class(class) if self.module => {
                let name = self.class_name(class);
                let body = self.braced(|this| {
                    vec![this.lower_class(&name, class), format!("return {};", name)]
                });
                format!("(function() {})()", body)
            }
            NodeKind::Class(class) => self.es_class(class),
            other => format!("/* {} */", other.name()),
        }
    }

    fn call(&mut self, callee: NodeId, arguments: &[NodeId]) -> String {
        let ast = self.ast;
        let arguments = self.arguments(arguments);
        let lowered_super = self.module
            && self
                .class
                .as_ref()
                .is_some_and(|context| context.super_class.is_some());
        let super_call = match ast.kind(callee) {
            NodeKind::Super => true,
            NodeKind::Name { object, .. } => matches!(ast.kind(*object), NodeKind::Super),
            _ => false,
        };

        if lowered_super && super_call {
            let target = match (ast.kind(callee), &self.class) {
                (NodeKind::Super, Some(ClassContext {
                    super_class: Some(parent),
                    ..
                })) => parent.clone(),
                _ => self.expression(callee),
            };
            return if arguments.is_empty() {
                format!("{}.call(this)", target)
            } else {
                format!("{}.call(this, {})", target, arguments)
            };
        }

        let callee = match ast.kind(callee) {
            NodeKind::Identifier { .. }
            | NodeKind::Name { .. }
            | NodeKind::Call { .. }
            | NodeKind::This
            | NodeKind::Super => self.expression(callee),
            _ => format!("({})", self.expression(callee)),
        };
        format!("{}({})", callee, arguments)
    }

    fn arguments(&mut self, arguments: &[NodeId]) -> String {
        let arguments: Vec<String> = arguments.iter().map(|&a| self.value(a)).collect();
        arguments.join(", ")
    }

    /// What `super` stands for inside a lowered class.
    fn super_object(&self) -> String {
        match &self.class {
            Some(ClassContext {
                super_class: Some(parent),
                is_static,
            }) if self.module => {
                if *is_static {
                    parent.clone()
                } else {
                    format!("{}.prototype", parent)
                }
            }
            _ => "super".to_string(),
        }
    }

    fn object(&mut self, properties: &[ObjectProperty]) -> String {
        if properties.is_empty() {
            return "{}".to_string();
        }
        self.depth += 1;
        let indent = self.indent();
        let mut members = Vec::with_capacity(properties.len());
        for property in properties {
            let member = self.object_member(property);
            members.push(format!("{}{}", indent, member));
        }
        self.depth -= 1;
        format!("{{\n{}\n{}}}", members.join(",\n"), self.indent())
    }

    fn object_member(&mut self, property: &ObjectProperty) -> String {
        let ast = self.ast;
        let key = self.property_key(property.key, property.computed);
        let function = ast.function(property.value);
        match (property.kind, function) {
            (PropertyKind::Get, Some(function)) => format!("get {}{}", key, self.function_tail(function)),
            (PropertyKind::Set, Some(function)) => format!("set {}{}", key, self.function_tail(function)),
            (_, Some(function)) if property.method => {
                if self.module {
                    format!("{}: function{}", key, self.function_tail(function))
                } else {
                    format!("{}{}", key, self.function_tail(function))
                }
            }
            _ => format!("{}: {}", key, self.value(property.value)),
        }
    }

    fn property_key(&mut self, key: NodeId, computed: bool) -> String {
        if computed {
            return format!("[{}]", self.value(key));
        }
        self.expression(key)
    }

    /// An operand of an operator; compound expressions get parentheses.
    fn operand(&mut self, node: NodeId) -> String {
        let text = self.expression(node);
        match self.ast.kind(node) {
            NodeKind::Binary { .. }
            | NodeKind::Logical { .. }
            | NodeKind::Conditional { .. }
            | NodeKind::Assign { .. }
            | NodeKind::Sequence(_)
            | NodeKind::ArrowFunction(_) => format!("({})", text),
            _ => text,
        }
    }

    /// The object of a member access or the target of an update.
    fn member_object(&mut self, node: NodeId) -> String {
        let text = self.expression(node);
        match self.ast.kind(node) {
            NodeKind::Identifier { .. }
            | NodeKind::Name { .. }
            | NodeKind::Call { .. }
            | NodeKind::This
            | NodeKind::Super
            | NodeKind::Array(_)
            | NodeKind::String { .. }
            | NodeKind::New { .. } => text,
            _ => format!("({})", text),
        }
    }

    /// A value in a list or initializer; only the comma operator needs parentheses.
    fn value(&mut self, node: NodeId) -> String {
        let text = self.expression(node);
        match self.ast.kind(node) {
            NodeKind::Sequence(_) => format!("({})", text),
            _ => text,
        }
    }
}

fn jump(keyword: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{} {};", keyword, label),
        None => format!("{};", keyword),
    }
}

/// `object.key`, or `object["key"]` when the key is not an identifier.
fn member(object: &str, key: &str) -> String {
    if is_identifier(key) {
        format!("{}.{}", object, key)
    } else {
        format!("{}[{}]", object, ast::quote_string(key))
    }
}

/// A property name as written in an object literal.
fn property_name(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        ast::quote_string(name)
    }
}

/// An import declaration kept in module syntax.
fn es_import(source: &str, bindings: &[(&str, &str, SpecifierKind)]) -> String {
    let source = ast::quote_string(source);
    if bindings.is_empty() {
        return format!("import {};", source);
    }
    let mut clauses = Vec::new();
    let mut named = Vec::new();
    for &(local, remote, kind) in bindings {
        match kind {
            SpecifierKind::Default => clauses.push(local.to_string()),
            SpecifierKind::Namespace => clauses.push(format!("* as {}", local)),
            SpecifierKind::Named if local == remote => named.push(local.to_string()),
            SpecifierKind::Named => named.push(format!("{} as {}", remote, local)),
        }
    }
    if !named.is_empty() {
        clauses.push(format!("{{ {} }}", named.join(", ")));
    }
    format!("import {} from {};", clauses.join(", "), source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::module_system::MemorySource;
    use crate::project::Project;

    fn compile_files(files: &[(&str, &str)], options: CompileOptions) -> String {
        let mut source = MemorySource::new();
        for (path, text) in files {
            source = source.with_file(format!("/p/{}", path), *text);
        }
        let mut project = Project::with_source(&Config::with_root("/p"), source);
        let id = project.parse(files[0].0);
        project.prepare(id, options.optimize);
        ScriptGenerator::new(project.file(id).unwrap(), &options).generate()
    }

    fn compile_src(source: &str) -> String {
        compile_files(&[("main.js", source)], CompileOptions::default())
    }

    fn compile_es(source: &str) -> String {
        let options = CompileOptions {
            module: false,
            ..CompileOptions::default()
        };
        compile_files(&[("main.js", source)], options)
    }

    #[test]
    fn test_module_wrapper_and_default_export() {
        let output = compile_src("function add(a, b) { return a + b; }\nexport default add;");
        assert_eq!(
            output,
            "(function() {\n\tfunction add(a, b) {\n\t\treturn a + b;\n\t}\n\tmodules[0] = add;\n})();\n\n//# sourceURL=./main.js"
        );
    }

    #[test]
    fn test_named_exports_epilogue() {
        let output = compile_src(
            "export const a = 1;\nexport function f() {}\nconst b = 2;\nexport { b as c };",
        );
        assert!(output.contains("\tconst a = 1;\n"));
        assert!(output.contains("\tfunction f() {}\n"));
        assert!(output.contains("\tmodules[0] = { a, f, c: b };\n"));
    }

    #[test]
    fn test_named_exports_attach_to_default() {
        let output = compile_src("export const a = 1;\nexport default { x: 1 };");
        assert!(output.contains("modules[0] = {\n\t\tx: 1\n\t};"));
        assert!(output.contains("modules[0].a = a;"));
    }

    #[test]
    fn test_imports_bind_module_table_entries() {
        let output = compile_files(
            &[
                (
                    "main.js",
                    "import b from './b';\nimport { x, y as z } from './c';\nconsole.log(b, x, z);",
                ),
                ("b.js", "export default 1;"),
                ("c.js", "export const x = 1, y = 2;"),
            ],
            CompileOptions::default(),
        );
        assert!(output.contains("\tvar b = modules[1];\n"));
        assert!(output.contains(
            "\tvar __module2 = modules[2];\n\tvar x = __module2.x;\n\tvar z = __module2.y;\n"
        ));
        assert!(output.contains("\tconsole.log(b, x, z);\n"));
    }

    #[test]
    fn test_class_is_lowered_to_prototypes() {
        let output = compile_src(
            "class A {\n  constructor(x) { this.x = x; }\n  value() { return this.x; }\n}\n\
             class B extends A {\n  constructor(x) { super(x); }\n  value() { return super.value() + 1; }\n  static make() { return new B(1); }\n}",
        );
        assert!(output.contains("\tfunction A(x) {\n\t\tthis.x = x;\n\t}\n"));
        assert!(output.contains(
            "\tA.prototype = {\n\t\tvalue: function() {\n\t\t\treturn this.x;\n\t\t}\n\t};\n"
        ));
        assert!(output.contains("\t\tA.call(this, x);\n"));
        assert!(output.contains("return A.prototype.value.call(this) + 1;"));
        assert!(output.contains("\tB.make = function() {\n\t\treturn new B(1);\n\t};\n"));
        assert!(output.contains("\t_inherits(B, A);\n"));
    }

    #[test]
    fn test_missing_constructor_forwards_arguments() {
        let output = compile_src("class A {}\nclass B extends A {}");
        assert!(output.contains("\tfunction A() {}\n"));
        assert!(output.contains("\tfunction B() {\n\t\tA.apply(this, arguments);\n\t}\n"));
    }

    #[test]
    fn test_object_pattern_declaration_is_lowered() {
        let output = compile_src("var obj = {};\nconst { a, b: c, d = 1 } = obj;");
        assert!(output.contains(
            "const __ref0 = obj, a = __ref0.a, c = __ref0.b, d = __ref0.d === undefined ? 1 : __ref0.d;"
        ));
    }

    #[test]
    fn test_parameter_patterns_get_a_prologue() {
        let output = compile_src("function f({ x, y }, z = 2) { return z; }");
        assert!(output.contains(
            "function f(__ref0, z) {\n\t\tvar x = __ref0.x, y = __ref0.y;\n\t\tz = z === undefined ? 2 : z;\n\t\treturn z;\n\t}"
        ));
    }

    #[test]
    fn test_template_becomes_concatenation() {
        let output = compile_src("var n = 1;\nvar s = `a${n}b`;");
        assert!(output.contains("var s = \"a\" + n + \"b\";"));
    }

    #[test]
    fn test_hoisted_arrow_returns_its_expression() {
        let output = compile_src("var double = (x) => x * 2;\ndouble(2);");
        assert!(output.contains("\tfunction double(x) {\n\t\treturn x * 2;\n\t}\n"));
        assert!(output.contains("\tdouble(2);\n"));
    }

    #[test]
    fn test_es_output_keeps_module_syntax() {
        let output = compile_files(
            &[
                ("main.js", "import b from './b';\nexport default class C extends b {}"),
                ("b.js", "export default class B {}"),
            ],
            CompileOptions {
                module: false,
                ..CompileOptions::default()
            },
        );
        assert_eq!(
            output,
            "import b from \"./b\";\nexport default class C extends b {}"
        );
    }

    #[test]
    fn test_control_flow_layout() {
        let output =
            compile_es("for (var i = 0; i < 3; i++) { if (i) { continue; } else { break; } }");
        assert_eq!(
            output,
            "for(var i = 0; i < 3; i++) {\n\tif(i) {\n\t\tcontinue;\n\t}\n\telse {\n\t\tbreak;\n\t}\n}"
        );
    }

    #[test]
    fn test_operands_are_parenthesized() {
        let output = compile_es("var x = (1 + 2) * 3;\nvar y = -(-x);\nvar t = typeof x;");
        assert_eq!(
            output,
            "var x = (1 + 2) * 3;\nvar y = -(-x);\nvar t = typeof x;"
        );
    }

    #[test]
    fn test_type_annotations() {
        let options = CompileOptions {
            module: false,
            annotate_types: true,
            ..CompileOptions::default()
        };
        let output = compile_files(&[("main.js", "let n = 1;\nlet s = n + \"a\";")], options);
        assert_eq!(output, "let n/*:Number*/ = 1;\nlet s/*:String*/ = n + \"a\";");
    }

    #[test]
    fn test_prelude() {
        let prelude = prelude([(FileId(0), "src/Main.js")]);
        assert!(prelude.starts_with("\"use strict\";\n\n(function(scope) {\n"));
        assert!(prelude.contains("scope.modulesPath = { \"0\": \"./src/main.js\" };"));
        assert!(prelude.contains("scope._inherits = function(a, b) {"));
        assert!(prelude.ends_with("})(typeof window !== \"undefined\" ? window : global);\n\n"));
    }
}
