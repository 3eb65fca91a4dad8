//! Translation of the generic syntax tree into the tagged AST.
//!
//! [`translate`] walks a [`syntax::Program`](crate::syntax::Program) kind by
//! kind. Every construct either maps onto a [`NodeKind`] or is rejected with
//! [`CompileError::Unsupported`], which is fatal to the file being
//! translated. Import and export forms are collected on the way so the
//! project can load the referenced modules afterwards.
//!
//! Non-script inputs skip the generic parser entirely: see
//! [`synthesize_json`] and [`synthesize_text`].

use crate::ast::{
    self, Ast, Class, Function, NodeId, NodeKind, ObjectProperty, PatternProperty, ScopeId,
    SpecifierKind,
};
use crate::error::{CompileError, Result};
use crate::lexer::Span;
use crate::syntax::{self, Expression, Literal, Pattern, Statement};

/// A module specifier the project must load for this file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    /// Import, Export or ExportAll node whose `file` is filled in once loaded
    pub node: NodeId,
    /// The specifier as written
    pub specifier: String,
    /// Whether the module is re-exported (`export ... from`)
    pub reexport: bool,
}

/// The tagged AST of one file plus its module bookkeeping.
#[derive(Debug, Clone)]
pub struct Translation {
    /// Arena holding every node and scope
    pub ast: Ast,
    /// Root Block node
    pub block: NodeId,
    /// Modules to load, in source order
    pub requests: Vec<ImportRequest>,
    /// Exported declarations and export specifiers, in source order
    pub exports: Vec<NodeId>,
    /// Whether the file has an `export default`
    pub export_default: bool,
}

/// Parses script source and translates it.
pub fn parse_script(source: &str) -> Result<Translation> {
    let program = syntax::parse(source)?;
    translate(&program)
}

/// Translates a generic program into the tagged AST.
pub fn translate(program: &syntax::Program) -> Result<Translation> {
    let mut translator = Translator::new();
    let scope = translator.ast.new_scope(None);
    translator.fill_scope(scope, &program.body)?;
    let block = translator.ast.alloc(NodeKind::Block { scope }, Span::default());
    Ok(translator.finish(block))
}

/// Builds `export default JSON.parse("<text>")` for a JSON file.
///
/// The text must be valid JSON. Line breaks and tabs are stripped from it
/// before it is quoted.
pub fn synthesize_json(text: &str) -> Result<Translation> {
    serde_json::from_str::<serde_json::Value>(text)?;
    let compact: String = text
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .collect();

    let mut translator = Translator::new();
    let scope = translator.ast.new_scope(None);
    let json = translator.identifier("JSON", Span::default());
    let parse = translator.identifier("parse", Span::default());
    let callee = translator.ast.alloc(
        NodeKind::Name {
            object: json,
            property: parse,
            computed: false,
        },
        Span::default(),
    );
    let argument = translator.string(compact);
    let call = translator.ast.alloc(
        NodeKind::Call {
            callee,
            arguments: vec![argument],
        },
        Span::default(),
    );
    Ok(translator.export_default_of(scope, call))
}

/// Builds `export default "<text>"` for any other non-script file.
pub fn synthesize_text(text: &str) -> Translation {
    let mut translator = Translator::new();
    let scope = translator.ast.new_scope(None);
    let value = translator.string(text.to_string());
    translator.export_default_of(scope, value)
}

struct Translator {
    ast: Ast,
    scope: Option<ScopeId>,
    requests: Vec<ImportRequest>,
    exports: Vec<NodeId>,
    export_default: bool,
}

impl Translator {
    fn new() -> Self {
        Self {
            ast: Ast::new(),
            scope: None,
            requests: Vec::new(),
            exports: Vec::new(),
            export_default: false,
        }
    }

    fn finish(self, block: NodeId) -> Translation {
        Translation {
            ast: self.ast,
            block,
            requests: self.requests,
            exports: self.exports,
            export_default: self.export_default,
        }
    }

    fn export_default_of(mut self, scope: ScopeId, declaration: NodeId) -> Translation {
        let export = self
            .ast
            .alloc(NodeKind::ExportDefault { declaration }, Span::default());
        self.ast.scope_mut(scope).body.push(export);
        self.export_default = true;
        let block = self.ast.alloc(NodeKind::Block { scope }, Span::default());
        self.finish(block)
    }

    // ==================== Helpers ====================

    fn identifier(&mut self, name: &str, span: Span) -> NodeId {
        self.ast.alloc(
            NodeKind::Identifier {
                name: name.to_string(),
                reference: None,
            },
            span,
        )
    }

    fn string(&mut self, value: String) -> NodeId {
        let raw = ast::quote_string(&value);
        self.ast
            .alloc(NodeKind::String { value, raw }, Span::default())
    }

    fn current_scope(&self) -> Option<ScopeId> {
        self.scope
    }

    /// Runs `f` with `scope` as the current scope.
    fn with_scope<T>(&mut self, scope: ScopeId, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let saved = self.scope.replace(scope);
        let result = f(self);
        self.scope = saved;
        result
    }

    /// Translates statements into an existing scope.
    fn fill_scope(&mut self, scope: ScopeId, statements: &[Statement]) -> Result<()> {
        self.with_scope(scope, |this| {
            for statement in statements {
                let node = this.statement(statement)?;
                this.ast.scope_mut(scope).body.push(node);
            }
            Ok(())
        })
    }

    /// A new Block with its own scope under the current one.
    fn block(&mut self, statements: &[Statement]) -> Result<NodeId> {
        let scope = self.ast.new_scope(self.current_scope());
        self.fill_scope(scope, statements)?;
        Ok(self.ast.alloc(NodeKind::Block { scope }, Span::default()))
    }

    /// A statement body, wrapped into a Block when it is not one already.
    fn body(&mut self, statement: &Statement) -> Result<NodeId> {
        match statement {
            Statement::Block(statements) => self.block(statements),
            other => self.block(std::slice::from_ref(other)),
        }
    }

    fn body_statements(statement: &Statement) -> &[Statement] {
        match statement {
            Statement::Block(statements) => statements,
            other => std::slice::from_ref(other),
        }
    }

    // ==================== Statements ====================

    fn statement(&mut self, statement: &Statement) -> Result<NodeId> {
        match statement {
            Statement::VariableDeclaration(declaration) => self.variable_declaration(declaration),
            Statement::FunctionDeclaration(function) => self.function(function),
            Statement::ClassDeclaration(class) => self.class(class),
            Statement::Expression(expression) => self.expression(expression),
            Statement::Block(statements) => self.block(statements),
            Statement::Empty => Ok(self.ast.alloc(NodeKind::Empty, Span::default())),
            Statement::If(stmt) => {
                let test = self.expression(&stmt.test)?;
                let consequent = self.body(&stmt.consequent)?;
                let alternate = match stmt.alternate.as_deref() {
                    Some(nested @ Statement::If(_)) => Some(self.statement(nested)?),
                    Some(other) => Some(self.body(other)?),
                    None => None,
                };
                Ok(self.ast.alloc(
                    NodeKind::If {
                        test,
                        consequent,
                        alternate,
                    },
                    Span::default(),
                ))
            }
            Statement::Switch(stmt) => {
                let discriminant = self.expression(&stmt.discriminant)?;
                let mut cases = Vec::with_capacity(stmt.cases.len());
                for case in &stmt.cases {
                    let test = case.test.as_ref().map(|t| self.expression(t)).transpose()?;
                    let scope = self.ast.new_scope(self.current_scope());
                    self.fill_scope(scope, &case.consequent)?;
                    cases.push(
                        self.ast
                            .alloc(NodeKind::SwitchCase { test, scope }, Span::default()),
                    );
                }
                Ok(self.ast.alloc(
                    NodeKind::Switch {
                        discriminant,
                        cases,
                    },
                    Span::default(),
                ))
            }
            Statement::While(stmt) => {
                let test = self.expression(&stmt.test)?;
                let body = self.body(&stmt.body)?;
                Ok(self
                    .ast
                    .alloc(NodeKind::While { test, body }, Span::default()))
            }
            Statement::DoWhile(stmt) => {
                let body = self.body(&stmt.body)?;
                let test = self.expression(&stmt.test)?;
                Ok(self
                    .ast
                    .alloc(NodeKind::DoWhile { body, test }, Span::default()))
            }
            Statement::For(stmt) => self.for_statement(stmt),
            Statement::ForIn(stmt) => self.for_in_statement(stmt),
            Statement::Return(argument) => {
                let argument = argument.as_ref().map(|a| self.expression(a)).transpose()?;
                Ok(self
                    .ast
                    .alloc(NodeKind::Return { argument }, Span::default()))
            }
            Statement::Break(label) => Ok(self.ast.alloc(
                NodeKind::Break {
                    label: label.as_ref().map(|l| l.name.clone()),
                },
                Span::default(),
            )),
            Statement::Continue(label) => Ok(self.ast.alloc(
                NodeKind::Continue {
                    label: label.as_ref().map(|l| l.name.clone()),
                },
                Span::default(),
            )),
            Statement::Throw(argument) => {
                let argument = self.expression(argument)?;
                Ok(self
                    .ast
                    .alloc(NodeKind::Throw { argument }, Span::default()))
            }
            Statement::Try(stmt) => {
                let block = self.block(&stmt.block)?;
                let handler = match &stmt.handler {
                    Some(clause) => {
                        let scope = self.ast.new_scope(self.current_scope());
                        let param = self.with_scope(scope, |this| {
                            clause.param.as_ref().map(|p| this.binding(p)).transpose()
                        })?;
                        self.fill_scope(scope, &clause.body)?;
                        let body = self.ast.alloc(NodeKind::Block { scope }, Span::default());
                        Some(
                            self.ast
                                .alloc(NodeKind::Catch { param, body }, Span::default()),
                        )
                    }
                    None => None,
                };
                let finalizer = stmt.finalizer.as_ref().map(|f| self.block(f)).transpose()?;
                Ok(self.ast.alloc(
                    NodeKind::Try {
                        block,
                        handler,
                        finalizer,
                    },
                    Span::default(),
                ))
            }
            Statement::Labeled(stmt) => {
                let body = self.body(&stmt.body)?;
                Ok(self.ast.alloc(
                    NodeKind::Label {
                        label: stmt.label.name.clone(),
                        body,
                    },
                    stmt.label.span,
                ))
            }
            Statement::Import(import) => self.import(import),
            Statement::ExportNamed(export) => self.export_named(export),
            Statement::ExportDefault(export) => {
                let declaration = match export {
                    syntax::ExportDefaultDeclaration::Function(function) => {
                        self.function(function)?
                    }
                    syntax::ExportDefaultDeclaration::Class(class) => self.class(class)?,
                    syntax::ExportDefaultDeclaration::Expression(expression) => {
                        self.expression(expression)?
                    }
                };
                self.export_default = true;
                Ok(self
                    .ast
                    .alloc(NodeKind::ExportDefault { declaration }, Span::default()))
            }
            Statement::ExportAll(export) => {
                if export.exported.is_some() {
                    return Err(CompileError::unsupported("ExportAllDeclaration as namespace"));
                }
                let node = self.ast.alloc(
                    NodeKind::ExportAll {
                        source: export.source.clone(),
                        file: None,
                    },
                    Span::default(),
                );
                self.requests.push(ImportRequest {
                    node,
                    specifier: export.source.clone(),
                    reexport: true,
                });
                Ok(node)
            }
            Statement::ForOf(_) | Statement::With(_) | Statement::Debugger => {
                Err(CompileError::unsupported(statement.kind_name()))
            }
        }
    }

    fn variable_declaration(&mut self, declaration: &syntax::VariableDeclaration) -> Result<NodeId> {
        let mut declarations = Vec::with_capacity(declaration.declarations.len());
        for declarator in &declaration.declarations {
            let id = self.binding(&declarator.id)?;
            let init = declarator
                .init
                .as_ref()
                .map(|e| self.expression(e))
                .transpose()?;
            declarations.push(self.ast.alloc(NodeKind::Variable { id, init }, Span::default()));
        }
        Ok(self.ast.alloc(
            NodeKind::VariableDeclaration {
                kind: declaration.kind,
                declarations,
            },
            Span::default(),
        ))
    }

    fn for_statement(&mut self, stmt: &syntax::ForStatement) -> Result<NodeId> {
        let scope = self.ast.new_scope(self.current_scope());
        let (init, test, update) = self.with_scope(scope, |this| {
            let init = match &stmt.init {
                Some(syntax::ForInit::Declaration(declaration)) => {
                    Some(this.variable_declaration(declaration)?)
                }
                Some(syntax::ForInit::Expression(expression)) => Some(this.expression(expression)?),
                None => None,
            };
            let test = stmt.test.as_ref().map(|t| this.expression(t)).transpose()?;
            let update = stmt.update.as_ref().map(|u| this.expression(u)).transpose()?;
            Ok((init, test, update))
        })?;

        self.fill_scope(scope, Self::body_statements(&stmt.body))?;
        let body = self.ast.alloc(NodeKind::Block { scope }, Span::default());
        Ok(self.ast.alloc(
            NodeKind::For {
                init,
                test,
                update,
                body,
            },
            Span::default(),
        ))
    }

    fn for_in_statement(&mut self, stmt: &syntax::ForInStatement) -> Result<NodeId> {
        let right = self.expression(&stmt.right)?;
        let scope = self.ast.new_scope(self.current_scope());
        let left = self.with_scope(scope, |this| match &stmt.left {
            syntax::ForInLeft::Declaration(declaration) => this.variable_declaration(declaration),
            syntax::ForInLeft::Pattern(pattern) => this.assignment_target(pattern),
        })?;

        self.fill_scope(scope, Self::body_statements(&stmt.body))?;
        let body = self.ast.alloc(NodeKind::Block { scope }, Span::default());
        Ok(self
            .ast
            .alloc(NodeKind::ForIn { left, right, body }, Span::default()))
    }

    fn import(&mut self, import: &syntax::ImportDeclaration) -> Result<NodeId> {
        let mut specifiers = Vec::with_capacity(import.specifiers.len());
        for specifier in &import.specifiers {
            let (local, remote, kind) = match specifier {
                syntax::ImportSpecifier::Default(local) => {
                    (local, "default".to_string(), SpecifierKind::Default)
                }
                syntax::ImportSpecifier::Namespace(local) => {
                    (local, "*".to_string(), SpecifierKind::Namespace)
                }
                syntax::ImportSpecifier::Named { imported, local } => {
                    (local, imported.clone(), SpecifierKind::Named)
                }
            };
            let local = self.identifier(&local.name, local.span);
            specifiers.push(self.ast.alloc(
                NodeKind::Specifier {
                    local,
                    remote,
                    kind,
                },
                Span::default(),
            ));
        }
        let node = self.ast.alloc(
            NodeKind::Import {
                source: import.source.clone(),
                specifiers,
                file: None,
            },
            Span::default(),
        );
        self.requests.push(ImportRequest {
            node,
            specifier: import.source.clone(),
            reexport: false,
        });
        Ok(node)
    }

    fn export_named(&mut self, export: &syntax::ExportNamedDeclaration) -> Result<NodeId> {
        let declaration = match export.declaration.as_deref() {
            Some(statement) => {
                let node = self.statement(statement)?;
                self.exports.push(node);
                Some(node)
            }
            None => None,
        };

        let mut specifiers = Vec::with_capacity(export.specifiers.len());
        for specifier in &export.specifiers {
            let local = self.identifier(&specifier.local.name, specifier.local.span);
            let node = self.ast.alloc(
                NodeKind::Specifier {
                    local,
                    remote: specifier.exported.clone(),
                    kind: SpecifierKind::Named,
                },
                Span::default(),
            );
            self.exports.push(node);
            specifiers.push(node);
        }

        let node = self.ast.alloc(
            NodeKind::Export {
                declaration,
                specifiers,
                source: export.source.clone(),
                file: None,
            },
            Span::default(),
        );
        if let Some(source) = &export.source {
            self.requests.push(ImportRequest {
                node,
                specifier: source.clone(),
                reexport: true,
            });
        }
        Ok(node)
    }

    // ==================== Functions and classes ====================

    fn function(&mut self, function: &syntax::Function) -> Result<NodeId> {
        if function.is_async {
            return Err(CompileError::unsupported("AsyncFunction"));
        }
        if function.is_generator {
            return Err(CompileError::unsupported("GeneratorFunction"));
        }
        let id = function
            .id
            .as_ref()
            .map(|id| self.identifier(&id.name, id.span));

        let scope = self.ast.new_scope(self.current_scope());
        let params = self.with_scope(scope, |this| this.params(&function.params))?;

        let body_scope = self.ast.new_scope(Some(scope));
        self.fill_scope(body_scope, &function.body)?;
        let body = self
            .ast
            .alloc(NodeKind::Block { scope: body_scope }, Span::default());

        let data = Self::function_data(id, params, body, false, scope);
        Ok(self.ast.alloc(NodeKind::Function(data), Span::default()))
    }

    fn arrow(&mut self, arrow: &syntax::ArrowFunction) -> Result<NodeId> {
        if arrow.is_async {
            return Err(CompileError::unsupported("AsyncArrowFunction"));
        }
        let scope = self.ast.new_scope(self.current_scope());
        let params = self.with_scope(scope, |this| this.params(&arrow.params))?;

        let (body, expression) = match &arrow.body {
            syntax::ArrowBody::Expression(expression) => {
                (self.with_scope(scope, |this| this.expression(expression))?, true)
            }
            syntax::ArrowBody::Block(statements) => {
                let body_scope = self.ast.new_scope(Some(scope));
                self.fill_scope(body_scope, statements)?;
                let body = self
                    .ast
                    .alloc(NodeKind::Block { scope: body_scope }, Span::default());
                (body, false)
            }
        };

        let data = Self::function_data(None, params, body, expression, scope);
        Ok(self.ast.alloc(NodeKind::ArrowFunction(data), Span::default()))
    }

    fn function_data(
        id: Option<NodeId>,
        params: Vec<NodeId>,
        body: NodeId,
        expression: bool,
        scope: ScopeId,
    ) -> Function {
        Function {
            id,
            params,
            body,
            expression,
            scope,
            resolved: false,
            num_called: 0,
            return_type: ast::ValueType::Dynamic,
            return_value: false,
        }
    }

    fn params(&mut self, params: &[Pattern]) -> Result<Vec<NodeId>> {
        params.iter().map(|p| self.binding(p)).collect()
    }

    fn class(&mut self, class: &syntax::Class) -> Result<NodeId> {
        let id = class.id.as_ref().map(|id| self.identifier(&id.name, id.span));
        let super_class = class
            .super_class
            .as_deref()
            .map(|e| self.expression(e))
            .transpose()?;

        let mut members = Vec::with_capacity(class.body.len());
        for member in &class.body {
            match member {
                syntax::ClassMember::Method(method) => {
                    let (key, computed) = self.property_key(&method.key)?;
                    let value = self.function(&method.value)?;
                    members.push(self.ast.alloc(
                        NodeKind::MethodDef {
                            key,
                            value,
                            kind: method.kind,
                            is_static: method.is_static,
                            computed,
                        },
                        Span::default(),
                    ));
                }
                syntax::ClassMember::Property(_) => {
                    return Err(CompileError::unsupported("PropertyDefinition"));
                }
            }
        }

        Ok(self.ast.alloc(
            NodeKind::Class(Class {
                id,
                super_class,
                members,
            }),
            Span::default(),
        ))
    }

    fn property_key(&mut self, key: &syntax::PropertyKey) -> Result<(NodeId, bool)> {
        match key {
            syntax::PropertyKey::Identifier(id) => Ok((self.identifier(&id.name, id.span), false)),
            syntax::PropertyKey::Literal(literal) => Ok((self.literal(literal)?, false)),
            syntax::PropertyKey::Computed(expression) => Ok((self.expression(expression)?, true)),
            syntax::PropertyKey::Private(_) => Err(CompileError::unsupported("PrivateName")),
        }
    }

    // ==================== Patterns ====================

    /// A binding pattern in a declaration, parameter list or catch clause.
    fn binding(&mut self, pattern: &Pattern) -> Result<NodeId> {
        match pattern {
            Pattern::Identifier(id) => Ok(self.identifier(&id.name, id.span)),
            Pattern::Object(object) => {
                if object.rest.is_some() {
                    return Err(CompileError::unsupported("RestElement"));
                }
                let mut properties = Vec::with_capacity(object.properties.len());
                for property in &object.properties {
                    let key = match &property.key {
                        syntax::PropertyKey::Identifier(id) => id.name.clone(),
                        syntax::PropertyKey::Literal(Literal::String { value, .. }) => {
                            value.clone()
                        }
                        syntax::PropertyKey::Literal(Literal::Number { value, .. }) => {
                            ast::format_number(*value)
                        }
                        _ => return Err(CompileError::unsupported("ComputedPatternKey")),
                    };
                    let value = self.binding(&property.value)?;
                    properties.push(PatternProperty { key, value });
                }
                Ok(self
                    .ast
                    .alloc(NodeKind::ObjectPattern(properties), Span::default()))
            }
            Pattern::Assignment(assignment) => {
                let left = self.binding(&assignment.left)?;
                let right = self.expression(&assignment.right)?;
                Ok(self
                    .ast
                    .alloc(NodeKind::AssignmentPattern { left, right }, Span::default()))
            }
            Pattern::Array(_) | Pattern::Rest(_) | Pattern::Expression(_) => {
                Err(CompileError::unsupported(pattern.kind_name()))
            }
        }
    }

    /// The left side of an assignment or for-in head.
    fn assignment_target(&mut self, pattern: &Pattern) -> Result<NodeId> {
        match pattern {
            Pattern::Identifier(id) => Ok(self.identifier(&id.name, id.span)),
            Pattern::Expression(expression) => self.expression(expression),
            other => Err(CompileError::unsupported(format!(
                "{} as assignment target",
                other.kind_name()
            ))),
        }
    }

    // ==================== Expressions ====================

    fn literal(&mut self, literal: &Literal) -> Result<NodeId> {
        let kind = match literal {
            Literal::Number { value, raw } => NodeKind::Number {
                value: *value,
                raw: raw.clone(),
            },
            Literal::String { value, raw } => NodeKind::String {
                value: value.clone(),
                raw: raw.clone(),
            },
            Literal::Boolean(value) => NodeKind::Bool(*value),
            Literal::Null => NodeKind::Null,
            Literal::BigInt(_) => return Err(CompileError::unsupported("BigIntLiteral")),
            Literal::RegExp { .. } => return Err(CompileError::unsupported("RegExpLiteral")),
        };
        Ok(self.ast.alloc(kind, Span::default()))
    }

    fn expressions(&mut self, expressions: &[Expression]) -> Result<Vec<NodeId>> {
        expressions.iter().map(|e| self.expression(e)).collect()
    }

    fn expression(&mut self, expression: &Expression) -> Result<NodeId> {
        let kind = match expression {
            Expression::Literal(literal) => return self.literal(literal),
            Expression::Identifier(id) => return Ok(self.identifier(&id.name, id.span)),
            Expression::This => NodeKind::This,
            Expression::Super => NodeKind::Super,
            Expression::Array(elements) => {
                let mut out = Vec::with_capacity(elements.len());
                for element in elements {
                    out.push(element.as_ref().map(|e| self.expression(e)).transpose()?);
                }
                NodeKind::Array(out)
            }
            Expression::Object(members) => {
                let mut properties = Vec::with_capacity(members.len());
                for member in members {
                    let property = match member {
                        syntax::ObjectMember::Property(property) => property,
                        syntax::ObjectMember::Spread(_) => {
                            return Err(CompileError::unsupported("SpreadElement"));
                        }
                    };
                    let (key, computed) = self.property_key(&property.key)?;
                    let value = self.expression(&property.value)?;
                    properties.push(ObjectProperty {
                        key,
                        value,
                        kind: property.kind,
                        computed,
                        method: property.method,
                    });
                }
                NodeKind::Object(properties)
            }
            Expression::Function(function) => return self.function(function),
            Expression::Arrow(arrow) => return self.arrow(arrow),
            Expression::Class(class) => return self.class(class),
            Expression::Template(template) => NodeKind::Template {
                quasis: template.quasis.clone(),
                expressions: self.expressions(&template.expressions)?,
            },
            Expression::Member(member) => {
                if member.optional {
                    return Err(CompileError::unsupported("OptionalChaining"));
                }
                let object = self.expression(&member.object)?;
                let (property, computed) = match &member.property {
                    syntax::MemberProperty::Identifier(id) => {
                        (self.identifier(&id.name, id.span), false)
                    }
                    syntax::MemberProperty::Computed(expression) => {
                        (self.expression(expression)?, true)
                    }
                    syntax::MemberProperty::Private(_) => {
                        return Err(CompileError::unsupported("PrivateName"));
                    }
                };
                NodeKind::Name {
                    object,
                    property,
                    computed,
                }
            }
            Expression::Call(call) => {
                if call.optional {
                    return Err(CompileError::unsupported("OptionalChaining"));
                }
                NodeKind::Call {
                    callee: self.expression(&call.callee)?,
                    arguments: self.expressions(&call.arguments)?,
                }
            }
            Expression::New(call) => NodeKind::New {
                callee: self.expression(&call.callee)?,
                arguments: self.expressions(&call.arguments)?,
            },
            Expression::Update(update) => NodeKind::Update {
                op: update.operator,
                prefix: update.prefix,
                argument: self.expression(&update.argument)?,
            },
            Expression::Unary(unary) => NodeKind::Unary {
                op: unary.operator,
                argument: self.expression(&unary.argument)?,
            },
            Expression::Binary(binary) => NodeKind::Binary {
                op: binary.operator,
                left: self.expression(&binary.left)?,
                right: self.expression(&binary.right)?,
            },
            Expression::Logical(logical) => NodeKind::Logical {
                op: logical.operator,
                left: self.expression(&logical.left)?,
                right: self.expression(&logical.right)?,
            },
            Expression::Conditional(conditional) => NodeKind::Conditional {
                test: self.expression(&conditional.test)?,
                consequent: self.expression(&conditional.consequent)?,
                alternate: self.expression(&conditional.alternate)?,
            },
            Expression::Assignment(assignment) => NodeKind::Assign {
                op: assignment.operator,
                target: self.assignment_target(&assignment.left)?,
                value: self.expression(&assignment.right)?,
            },
            Expression::Sequence(items) => NodeKind::Sequence(self.expressions(items)?),
            Expression::TaggedTemplate(_)
            | Expression::Spread(_)
            | Expression::Yield(_)
            | Expression::Await(_) => {
                return Err(CompileError::unsupported(expression.kind_name()));
            }
        };
        Ok(self.ast.alloc(kind, Span::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ValueType;

    fn parse_ok(source: &str) -> Translation {
        parse_script(source).unwrap_or_else(|e| panic!("failed to translate {source:?}: {e}"))
    }

    fn root_body(translation: &Translation) -> Vec<NodeId> {
        let scope = translation.ast.block_scope(translation.block).unwrap();
        translation.ast.scope(scope).body.clone()
    }

    #[test]
    fn test_expressions_sit_directly_in_scope_body() {
        let t = parse_ok("a + 1; f();");
        let body = root_body(&t);
        assert_eq!(body.len(), 2);
        assert!(matches!(t.ast.kind(body[0]), NodeKind::Binary { .. }));
        assert!(matches!(t.ast.kind(body[1]), NodeKind::Call { .. }));
    }

    #[test]
    fn test_if_body_is_wrapped_in_block() {
        let t = parse_ok("if (a) b = 1; else if (c) d(); else { e(); }");
        let body = root_body(&t);
        let NodeKind::If {
            consequent,
            alternate,
            ..
        } = t.ast.kind(body[0])
        else {
            panic!("expected if");
        };
        assert!(t.ast.block_scope(*consequent).is_some());
        let nested = alternate.unwrap();
        let NodeKind::If { alternate, .. } = t.ast.kind(nested) else {
            panic!("expected else-if");
        };
        assert!(t.ast.block_scope(alternate.unwrap()).is_some());
    }

    #[test]
    fn test_for_head_shares_body_scope() {
        let t = parse_ok("for (let i = 0; i < 3; i++) x();");
        let body = root_body(&t);
        let NodeKind::For { body: block, .. } = t.ast.kind(body[0]) else {
            panic!("expected for");
        };
        let scope = t.ast.block_scope(*block).unwrap();
        let root = t.ast.block_scope(t.block).unwrap();
        assert_eq!(t.ast.scope(scope).parent, Some(root));
        assert_eq!(t.ast.scope(scope).body.len(), 1);
    }

    #[test]
    fn test_function_scopes_chain() {
        let t = parse_ok("function f(a) { return a; }");
        let body = root_body(&t);
        let function = t.ast.function(body[0]).unwrap();
        let body_scope = t.ast.block_scope(function.body).unwrap();
        assert_eq!(t.ast.scope(body_scope).parent, Some(function.scope));
        assert_eq!(function.params.len(), 1);
        assert_eq!(function.return_type, ValueType::Dynamic);
    }

    #[test]
    fn test_imports_are_requested() {
        let t = parse_ok("import a from './a'; import { b as c } from 'lib'; export * from './d';");
        let specifiers: Vec<_> = t.requests.iter().map(|r| r.specifier.as_str()).collect();
        assert_eq!(specifiers, vec!["./a", "lib", "./d"]);
        assert!(!t.requests[0].reexport);
        assert!(t.requests[2].reexport);
    }

    #[test]
    fn test_exports_are_recorded() {
        let t = parse_ok("export function f() {} export const a = 1; export { a as b }; export default f;");
        assert_eq!(t.exports.len(), 3);
        assert!(matches!(t.ast.kind(t.exports[0]), NodeKind::Function(_)));
        assert!(matches!(
            t.ast.kind(t.exports[1]),
            NodeKind::VariableDeclaration { .. }
        ));
        assert!(matches!(t.ast.kind(t.exports[2]), NodeKind::Specifier { .. }));
        assert!(t.export_default);
    }

    #[test]
    fn test_unsupported_constructs() {
        for source in [
            "for (const x of xs) {}",
            "with (o) {}",
            "debugger;",
            "f(...args);",
            "async function f() {}",
            "let [a, b] = c;",
            "x = /re/g;",
            "a?.b;",
        ] {
            let err = parse_script(source).unwrap_err();
            assert!(
                matches!(err, CompileError::Unsupported(_)),
                "{source:?} gave {err}"
            );
        }
    }

    #[test]
    fn test_syntax_error_is_reported() {
        assert!(matches!(
            parse_script("let = ;"),
            Err(CompileError::Syntax(_))
        ));
    }

    #[test]
    fn test_json_synthesis() {
        let t = synthesize_json("{\n\t\"a\": 1\n}").unwrap();
        let body = root_body(&t);
        assert!(t.export_default);
        let NodeKind::ExportDefault { declaration } = t.ast.kind(body[0]) else {
            panic!("expected export default");
        };
        let NodeKind::Call { arguments, .. } = t.ast.kind(*declaration) else {
            panic!("expected JSON.parse call");
        };
        let NodeKind::String { value, raw } = t.ast.kind(arguments[0]) else {
            panic!("expected string argument");
        };
        assert_eq!(value, "{\"a\": 1}");
        assert_eq!(raw, "\"{\\\"a\\\": 1}\"");
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(matches!(
            synthesize_json("{ \"a\": }"),
            Err(CompileError::Json(_))
        ));
    }

    #[test]
    fn test_text_synthesis() {
        let t = synthesize_text("hello\nworld");
        let body = root_body(&t);
        let NodeKind::ExportDefault { declaration } = t.ast.kind(body[0]) else {
            panic!("expected export default");
        };
        let NodeKind::String { raw, .. } = t.ast.kind(*declaration) else {
            panic!("expected string");
        };
        assert_eq!(raw, "\"hello\\nworld\"");
    }
}
