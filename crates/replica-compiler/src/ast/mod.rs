//! The compiler's tagged abstract syntax tree.
//!
//! Nodes and scopes of one source file live in a single [`Ast`] arena and
//! refer to each other through [`NodeId`] and [`ScopeId`] indices. A
//! resolved [`NodeKind::Identifier`] keeps a non-owning link to its
//! declaration the same way.
//!
//! Every block-level construct owns exactly one [`Scope`]: the program,
//! function bodies, the bodies of `if`/`for`/`while`/`do`/`catch`, and each
//! switch case. A function additionally owns a parameter scope that is the
//! parent of its body scope.

mod scope;
mod types;

pub use scope::{Scope, ScopeId};
pub use types::ValueType;

pub use crate::syntax::{
    AssignmentOperator as AssignOp, BinaryOperator as BinaryOp, LogicalOperator as LogicalOp,
    MethodKind, PropertyKind, UnaryOperator as UnaryOp, UpdateOperator as UpdateOp,
    VariableKind,
};

use crate::lexer::Span;
use crate::project::FileId;
use std::ops::Index;

/// Index of a node inside its file's [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node: its kind plus the type the resolver assigned.
#[derive(Debug, Clone)]
pub struct Node {
    /// What the node is
    pub kind: NodeKind,
    /// Resolved value type (Dynamic until resolved)
    pub value_type: ValueType,
    /// Source location (empty for synthesized nodes)
    pub span: Span,
}

/// A function, arrow function or method body.
#[derive(Debug, Clone)]
pub struct Function {
    /// Name (an Identifier node)
    pub id: Option<NodeId>,
    /// Identifier, ObjectPattern or AssignmentPattern nodes
    pub params: Vec<NodeId>,
    /// A Block node, or the returned expression when `expression` is set
    pub body: NodeId,
    /// Arrow function with an expression body
    pub expression: bool,
    /// Scope holding the parameters; parent of the body scope
    pub scope: ScopeId,
    /// Set once the resolver has walked the body
    pub resolved: bool,
    /// Number of resolved call sites
    pub num_called: u32,
    /// Inferred return type
    pub return_type: ValueType,
    /// Whether any return statement carries a value
    pub return_value: bool,
}

/// A class declaration or expression.
#[derive(Debug, Clone)]
pub struct Class {
    /// Name (an Identifier node)
    pub id: Option<NodeId>,
    /// `extends` expression
    pub super_class: Option<NodeId>,
    /// MethodDef nodes
    pub members: Vec<NodeId>,
}

/// A property of an object literal.
#[derive(Debug, Clone)]
pub struct ObjectProperty {
    /// Identifier (plain name), String/Number literal, or computed expression
    pub key: NodeId,
    /// The value (a Function node for methods and accessors)
    pub value: NodeId,
    /// Init, get or set
    pub kind: PropertyKind,
    /// `[key]: value`
    pub computed: bool,
    /// `key() {}`
    pub method: bool,
}

/// One binding of an object pattern.
#[derive(Debug, Clone)]
pub struct PatternProperty {
    /// Name of the property read from the source object
    pub key: String,
    /// Identifier, ObjectPattern or AssignmentPattern receiving the value
    pub value: NodeId,
}

/// Import specifier flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// `import local from`
    Default,
    /// `{ remote as local }`
    Named,
    /// `* as local`
    Namespace,
}

/// One tagged variant per construct.
#[derive(Debug, Clone)]
pub enum NodeKind {
    // Literals
    /// Numeric literal
    Number {
        /// Parsed value
        value: f64,
        /// Source spelling
        raw: String,
    },
    /// String literal
    String {
        /// Unescaped value
        value: String,
        /// Source spelling, quotes included
        raw: String,
    },
    /// `true` / `false`
    Bool(bool),
    /// `null`
    Null,

    // References
    /// A name
    Identifier {
        /// The name as written
        name: String,
        /// Declaring node, once resolved
        reference: Option<NodeId>,
    },
    /// Member access `object.property` / `object[property]`
    Name {
        /// Accessed object
        object: NodeId,
        /// Identifier, or any expression when computed
        property: NodeId,
        /// Bracket access
        computed: bool,
    },
    /// `this`
    This,
    /// `super`
    Super,

    // Expressions
    /// Arithmetic, comparison and bitwise operators
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        left: NodeId,
        /// Right operand
        right: NodeId,
    },
    /// `&&`, `||`, `??`
    Logical {
        /// Operator
        op: LogicalOp,
        /// Left operand
        left: NodeId,
        /// Right operand
        right: NodeId,
    },
    /// `target op= value`
    Assign {
        /// `=` or a compound operator
        op: AssignOp,
        /// Identifier or Name
        target: NodeId,
        /// Assigned expression
        value: NodeId,
    },
    /// `test ? consequent : alternate`
    Conditional {
        /// Condition
        test: NodeId,
        /// Value when the condition holds
        consequent: NodeId,
        /// Value otherwise
        alternate: NodeId,
    },
    /// Prefix unary operator
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        argument: NodeId,
    },
    /// `++` / `--`
    Update {
        /// Increment or decrement
        op: UpdateOp,
        /// Operator written before the operand
        prefix: bool,
        /// Identifier or Name
        argument: NodeId,
    },
    /// Comma operator
    Sequence(Vec<NodeId>),
    /// Function call
    Call {
        /// Called expression
        callee: NodeId,
        /// Arguments in order
        arguments: Vec<NodeId>,
    },
    /// `new callee(arguments)`
    New {
        /// Constructor expression
        callee: NodeId,
        /// Arguments in order
        arguments: Vec<NodeId>,
    },
    /// Array literal; `None` is a hole
    Array(Vec<Option<NodeId>>),
    /// Object literal
    Object(Vec<ObjectProperty>),
    /// Template literal
    Template {
        /// Cooked text parts; one more than `expressions`
        quasis: Vec<String>,
        /// Interpolated expressions
        expressions: Vec<NodeId>,
    },

    // Functions and classes
    /// Function declaration or expression
    Function(Function),
    /// Arrow function expression
    ArrowFunction(Function),
    /// Class declaration or expression
    Class(Class),
    /// Class member
    MethodDef {
        /// Identifier, or any expression when computed
        key: NodeId,
        /// The Function implementing the member
        value: NodeId,
        /// Constructor, method or accessor
        kind: MethodKind,
        /// Declared `static`
        is_static: bool,
        /// Bracketed key
        computed: bool,
    },

    // Declarations and patterns
    /// `var`/`let`/`const`
    VariableDeclaration {
        /// Declaring keyword
        kind: VariableKind,
        /// Variable children
        declarations: Vec<NodeId>,
    },
    /// One declarator
    Variable {
        /// Identifier or ObjectPattern
        id: NodeId,
        /// Initializer
        init: Option<NodeId>,
    },
    /// `{ a, b: c, d = 1 }`
    ObjectPattern(Vec<PatternProperty>),
    /// `target = default`
    AssignmentPattern {
        /// Bound target
        left: NodeId,
        /// Default value
        right: NodeId,
    },

    // Statements
    /// Braced block
    Block {
        /// Scope holding the statements
        scope: ScopeId,
    },
    /// `;`
    Empty,
    /// `if`
    If {
        /// Condition
        test: NodeId,
        /// Block
        consequent: NodeId,
        /// Block or If
        alternate: Option<NodeId>,
    },
    /// `switch`
    Switch {
        /// Switched value
        discriminant: NodeId,
        /// SwitchCase children
        cases: Vec<NodeId>,
    },
    /// `case test:` or `default:`
    SwitchCase {
        /// Case value; `None` for `default`
        test: Option<NodeId>,
        /// Scope holding the case's statements
        scope: ScopeId,
    },
    /// `for(init; test; update)`; the head lives in the body scope
    For {
        /// Declaration or expression run once
        init: Option<NodeId>,
        /// Loop condition
        test: Option<NodeId>,
        /// Expression run after each iteration
        update: Option<NodeId>,
        /// Block
        body: NodeId,
    },
    /// `for(left in right)`
    ForIn {
        /// Declaration or assignable expression
        left: NodeId,
        /// Iterated object
        right: NodeId,
        /// Block
        body: NodeId,
    },
    /// `while(test)`
    While {
        /// Loop condition
        test: NodeId,
        /// Block
        body: NodeId,
    },
    /// `do body while(test)`
    DoWhile {
        /// Block
        body: NodeId,
        /// Loop condition
        test: NodeId,
    },
    /// `break [label]`
    Break {
        /// Target label
        label: Option<String>,
    },
    /// `continue [label]`
    Continue {
        /// Target label
        label: Option<String>,
    },
    /// `label: body`
    Label {
        /// Label name
        label: String,
        /// Labelled statement
        body: NodeId,
    },
    /// `return [argument]`
    Return {
        /// Returned value
        argument: Option<NodeId>,
    },
    /// `throw argument`
    Throw {
        /// Thrown value
        argument: NodeId,
    },
    /// `try`
    Try {
        /// Guarded Block
        block: NodeId,
        /// Catch node
        handler: Option<NodeId>,
        /// `finally` Block
        finalizer: Option<NodeId>,
    },
    /// `catch(param) body`
    Catch {
        /// Caught binding, bound in the body scope
        param: Option<NodeId>,
        /// Block
        body: NodeId,
    },

    // Modules
    /// `import ... from source`
    Import {
        /// Module specifier as written
        source: String,
        /// Specifier children
        specifiers: Vec<NodeId>,
        /// Loaded module
        file: Option<FileId>,
    },
    /// Import or export binding
    Specifier {
        /// Identifier in this file
        local: NodeId,
        /// Name in the other module
        remote: String,
        /// Default, namespace or named
        kind: SpecifierKind,
    },
    /// `export declaration`, `export { a as b }` or `export { a } from source`
    Export {
        /// Exported declaration
        declaration: Option<NodeId>,
        /// Specifier children
        specifiers: Vec<NodeId>,
        /// Re-exported module specifier
        source: Option<String>,
        /// Re-exported module, once loaded
        file: Option<FileId>,
    },
    /// `export default declaration`
    ExportDefault {
        /// Exported declaration or expression
        declaration: NodeId,
    },
    /// `export * from source`
    ExportAll {
        /// Module specifier as written
        source: String,
        /// Loaded module
        file: Option<FileId>,
    },
}

impl NodeKind {
    /// Returns the construct's name, as used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Number { .. } => "Number",
            NodeKind::String { .. } => "String",
            NodeKind::Bool(_) => "Bool",
            NodeKind::Null => "Null",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::Name { .. } => "Name",
            NodeKind::This => "ThisExpression",
            NodeKind::Super => "Super",
            NodeKind::Binary { .. } => "BinaryExpression",
            NodeKind::Logical { .. } => "LogicalExpression",
            NodeKind::Assign { .. } => "AssignmentExpression",
            NodeKind::Conditional { .. } => "Conditional",
            NodeKind::Unary { .. } => "UnaryExpression",
            NodeKind::Update { .. } => "UpdateExpression",
            NodeKind::Sequence(_) => "Sequence",
            NodeKind::Call { .. } => "CallExpression",
            NodeKind::New { .. } => "New",
            NodeKind::Array(_) => "Array",
            NodeKind::Object(_) => "Object",
            NodeKind::Template { .. } => "TemplateLiteral",
            NodeKind::Function(_) => "FunctionDeclaration",
            NodeKind::ArrowFunction(_) => "ArrowFunctionExpression",
            NodeKind::Class(_) => "ClassDeclaration",
            NodeKind::MethodDef { .. } => "MethodDef",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::Variable { .. } => "Variable",
            NodeKind::ObjectPattern(_) => "ObjectPattern",
            NodeKind::AssignmentPattern { .. } => "AssignmentPattern",
            NodeKind::Block { .. } => "BlockStatement",
            NodeKind::Empty => "EmptyStatement",
            NodeKind::If { .. } => "IfStatement",
            NodeKind::Switch { .. } => "Switch",
            NodeKind::SwitchCase { .. } => "SwitchCase",
            NodeKind::For { .. } => "ForStatement",
            NodeKind::ForIn { .. } => "ForInStatement",
            NodeKind::While { .. } => "While",
            NodeKind::DoWhile { .. } => "DoWhile",
            NodeKind::Break { .. } => "Break",
            NodeKind::Continue { .. } => "Continue",
            NodeKind::Label { .. } => "Label",
            NodeKind::Return { .. } => "ReturnStatement",
            NodeKind::Throw { .. } => "Throw",
            NodeKind::Try { .. } => "Try",
            NodeKind::Catch { .. } => "Catch",
            NodeKind::Import { .. } => "Import",
            NodeKind::Specifier { .. } => "Specifier",
            NodeKind::Export { .. } => "Export",
            NodeKind::ExportDefault { .. } => "ExportDefaultDeclaration",
            NodeKind::ExportAll { .. } => "ExportAllDeclaration",
        }
    }

    /// Returns true for Number and String literals.
    pub fn is_literal(&self) -> bool {
        matches!(self, NodeKind::Number { .. } | NodeKind::String { .. })
    }
}

/// Arena owning every node and scope of one source file.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    scopes: Vec<Scope>,
}

impl Ast {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with a Dynamic type.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.alloc_typed(kind, ValueType::Dynamic, span)
    }

    /// Adds a node with a preset type.
    pub fn alloc_typed(&mut self, kind: NodeKind, value_type: ValueType, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            value_type,
            span,
        });
        id
    }

    /// Adds an empty scope.
    pub fn new_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(parent));
        id
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no node was allocated.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Returns a node mutably.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Returns a node's kind.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    /// Returns a node's resolved type.
    pub fn value_type(&self, id: NodeId) -> ValueType {
        self.nodes[id.index()].value_type
    }

    /// Sets a node's resolved type.
    pub fn set_value_type(&mut self, id: NodeId, value_type: ValueType) {
        self.nodes[id.index()].value_type = value_type;
    }

    /// Returns a scope.
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// Returns a scope mutably.
    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    /// Iterates over every scope.
    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes
            .iter()
            .enumerate()
            .map(|(index, scope)| (ScopeId(index as u32), scope))
    }

    /// The name of an Identifier node.
    pub fn identifier_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The scope owned by a Block node.
    pub fn block_scope(&self, id: NodeId) -> Option<ScopeId> {
        match self.kind(id) {
            NodeKind::Block { scope } => Some(*scope),
            _ => None,
        }
    }

    /// The function data of a Function or ArrowFunction node.
    pub fn function(&self, id: NodeId) -> Option<&Function> {
        match self.kind(id) {
            NodeKind::Function(function) | NodeKind::ArrowFunction(function) => Some(function),
            _ => None,
        }
    }

    /// The function data of a Function or ArrowFunction node, mutably.
    pub fn function_mut(&mut self, id: NodeId) -> Option<&mut Function> {
        match &mut self.node_mut(id).kind {
            NodeKind::Function(function) | NodeKind::ArrowFunction(function) => Some(function),
            _ => None,
        }
    }

    /// Looks a name up from `scope` through its parents.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<NodeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(node) = scope.get(name) {
                return Some(node);
            }
            current = scope.parent;
        }
        None
    }

    /// Identifier nodes bound by a declarator id or parameter pattern.
    pub fn bound_identifiers(&self, pattern: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_bound(pattern, &mut out);
        out
    }

    fn collect_bound(&self, pattern: NodeId, out: &mut Vec<NodeId>) {
        match self.kind(pattern) {
            NodeKind::Identifier { .. } => out.push(pattern),
            NodeKind::ObjectPattern(properties) => {
                for property in properties {
                    self.collect_bound(property.value, out);
                }
            }
            NodeKind::AssignmentPattern { left, .. } => self.collect_bound(*left, out),
            NodeKind::Variable { id, .. } => self.collect_bound(*id, out),
            NodeKind::VariableDeclaration { declarations, .. } => {
                for declaration in declarations {
                    self.collect_bound(*declaration, out);
                }
            }
            _ => {}
        }
    }

    /// Direct children of a node, in evaluation order.
    ///
    /// Scope bodies count as children of the construct owning the scope.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self.kind(id) {
            NodeKind::Number { .. }
            | NodeKind::String { .. }
            | NodeKind::Bool(_)
            | NodeKind::Null
            | NodeKind::Identifier { .. }
            | NodeKind::This
            | NodeKind::Super
            | NodeKind::Empty
            | NodeKind::Break { .. }
            | NodeKind::Continue { .. }
            | NodeKind::ExportAll { .. } => {}
            NodeKind::Name {
                object, property, ..
            } => out.extend([*object, *property]),
            NodeKind::Binary { left, right, .. } | NodeKind::Logical { left, right, .. } => {
                out.extend([*left, *right])
            }
            NodeKind::Assign { target, value, .. } => out.extend([*target, *value]),
            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => out.extend([*test, *consequent, *alternate]),
            NodeKind::Unary { argument, .. } | NodeKind::Update { argument, .. } => {
                out.push(*argument)
            }
            NodeKind::Sequence(items) => out.extend(items.iter().copied()),
            NodeKind::Call { callee, arguments } | NodeKind::New { callee, arguments } => {
                out.push(*callee);
                out.extend(arguments.iter().copied());
            }
            NodeKind::Array(elements) => out.extend(elements.iter().flatten().copied()),
            NodeKind::Object(properties) => {
                for property in properties {
                    out.extend([property.key, property.value]);
                }
            }
            NodeKind::Template { expressions, .. } => out.extend(expressions.iter().copied()),
            NodeKind::Function(function) | NodeKind::ArrowFunction(function) => {
                out.extend(function.id);
                out.extend(function.params.iter().copied());
                out.push(function.body);
            }
            NodeKind::Class(class) => {
                out.extend(class.id);
                out.extend(class.super_class);
                out.extend(class.members.iter().copied());
            }
            NodeKind::MethodDef { key, value, .. } => out.extend([*key, *value]),
            NodeKind::VariableDeclaration { declarations, .. } => {
                out.extend(declarations.iter().copied())
            }
            NodeKind::Variable { id, init } => {
                out.push(*id);
                out.extend(*init);
            }
            NodeKind::ObjectPattern(properties) => {
                out.extend(properties.iter().map(|p| p.value))
            }
            NodeKind::AssignmentPattern { left, right } => out.extend([*left, *right]),
            NodeKind::Block { scope } => out.extend(self.scope(*scope).body.iter().copied()),
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                out.extend([*test, *consequent]);
                out.extend(*alternate);
            }
            NodeKind::Switch {
                discriminant,
                cases,
            } => {
                out.push(*discriminant);
                out.extend(cases.iter().copied());
            }
            NodeKind::SwitchCase { test, scope } => {
                out.extend(*test);
                out.extend(self.scope(*scope).body.iter().copied());
            }
            NodeKind::For {
                init,
                test,
                update,
                body,
            } => {
                out.extend([*init, *test, *update].into_iter().flatten());
                out.push(*body);
            }
            NodeKind::ForIn { left, right, body } => out.extend([*left, *right, *body]),
            NodeKind::While { test, body } => out.extend([*test, *body]),
            NodeKind::DoWhile { body, test } => out.extend([*body, *test]),
            NodeKind::Label { body, .. } => out.push(*body),
            NodeKind::Return { argument } => out.extend(*argument),
            NodeKind::Throw { argument } => out.push(*argument),
            NodeKind::Try {
                block,
                handler,
                finalizer,
            } => {
                out.push(*block);
                out.extend(*handler);
                out.extend(*finalizer);
            }
            NodeKind::Catch { param, body } => {
                out.extend(*param);
                out.push(*body);
            }
            NodeKind::Import { specifiers, .. } => out.extend(specifiers.iter().copied()),
            NodeKind::Specifier { local, .. } => out.push(*local),
            NodeKind::Export {
                declaration,
                specifiers,
                ..
            } => {
                out.extend(*declaration);
                out.extend(specifiers.iter().copied());
            }
            NodeKind::ExportDefault { declaration } => out.push(*declaration),
        }
        out
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.node(id)
    }
}

/// Formats a number the way script source spells it.
///
/// Follows `Number.prototype.toString`: shortest round-trip digits, plain
/// decimal notation for exponents in `-7..21`, and `-0` prints as `0`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    // `{:e}` yields the shortest round-trip digits as `d.ddde<exp>`.
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        format!("{}.{}", &digits[..n as usize], &digits[n as usize..])
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, (n - 1).abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, (n - 1).abs())
        }
    };
    if value < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// Source text of a numeric literal holding `value`.
///
/// Same as [`format_number`] except that negative zero keeps its sign.
pub fn number_literal(value: f64) -> String {
    if value == 0.0 && value.is_sign_negative() {
        return "-0".to_string();
    }
    format_number(value)
}

/// Wraps text in double quotes, escaping what a string literal cannot hold.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(ast: &mut Ast, name: &str) -> NodeId {
        ast.alloc(
            NodeKind::Identifier {
                name: name.to_string(),
                reference: None,
            },
            Span::default(),
        )
    }

    #[test]
    fn test_lookup_walks_parents() {
        let mut ast = Ast::new();
        let outer = ast.new_scope(None);
        let inner = ast.new_scope(Some(outer));
        let x = ident(&mut ast, "x");
        let y = ident(&mut ast, "y");
        ast.scope_mut(outer).vars.insert("x".to_string(), x);
        ast.scope_mut(inner).funcs.insert("y".to_string(), y);

        assert_eq!(ast.lookup(inner, "x"), Some(x));
        assert_eq!(ast.lookup(inner, "y"), Some(y));
        assert_eq!(ast.lookup(outer, "y"), None);
    }

    #[test]
    fn test_children_of_binary() {
        let mut ast = Ast::new();
        let left = ident(&mut ast, "a");
        let right = ident(&mut ast, "b");
        let sum = ast.alloc(
            NodeKind::Binary {
                op: BinaryOp::Add,
                left,
                right,
            },
            Span::default(),
        );
        assert_eq!(ast.children(sum), vec![left, right]);
        assert_eq!(ast.kind(sum).name(), "BinaryExpression");
    }

    #[test]
    fn test_bound_identifiers_of_pattern() {
        let mut ast = Ast::new();
        let a = ident(&mut ast, "a");
        let c = ident(&mut ast, "c");
        let one = ast.alloc(
            NodeKind::Number {
                value: 1.0,
                raw: "1".to_string(),
            },
            Span::default(),
        );
        let with_default = ast.alloc(NodeKind::AssignmentPattern { left: c, right: one }, Span::default());
        let pattern = ast.alloc(
            NodeKind::ObjectPattern(vec![
                PatternProperty {
                    key: "a".to_string(),
                    value: a,
                },
                PatternProperty {
                    key: "b".to_string(),
                    value: with_default,
                },
            ]),
            Span::default(),
        );
        assert_eq!(ast.bound_identifiers(pattern), vec![a, c]);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e19), "10000000000000000000");
        assert_eq!(format_number(2f64.powi(63)), "9223372036854775808");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(-123.25), "-123.25");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(number_literal(-0.0), "-0");
        assert_eq!(number_literal(4.0), "4");
    }

    #[test]
    fn test_quote_string() {
        assert_eq!(quote_string("abc"), "\"abc\"");
        assert_eq!(quote_string("a\"b\n"), "\"a\\\"b\\n\"");
        assert_eq!(quote_string("c:\\"), "\"c:\\\\\"");
    }
}
