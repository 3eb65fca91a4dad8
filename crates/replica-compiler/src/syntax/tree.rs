//! Generic syntax tree definitions for JavaScript.
//!
//! These structures follow ESTree where possible. They describe what the
//! grammar accepts, which is more than the compiler's own tagged AST can
//! model; the translator in [`crate::parser`] rejects the difference.

use crate::lexer::Span;

/// A complete module.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The statements in the module
    pub body: Vec<Statement>,
}

/// An identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    /// The name of the identifier
    pub name: String,
    /// Where the identifier appears
    pub span: Span,
}

/// A JavaScript statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Variable declaration (var, let, const)
    VariableDeclaration(VariableDeclaration),
    /// Function declaration
    FunctionDeclaration(Function),
    /// Class declaration
    ClassDeclaration(Class),
    /// Expression statement
    Expression(Expression),
    /// Block statement { ... }
    Block(Vec<Statement>),
    /// If statement
    If(IfStatement),
    /// Switch statement
    Switch(SwitchStatement),
    /// While statement
    While(WhileStatement),
    /// Do-while statement
    DoWhile(WhileStatement),
    /// For statement
    For(ForStatement),
    /// For-in statement
    ForIn(ForInStatement),
    /// For-of statement
    ForOf(ForInStatement),
    /// Return statement
    Return(Option<Expression>),
    /// Break statement with optional label
    Break(Option<Identifier>),
    /// Continue statement with optional label
    Continue(Option<Identifier>),
    /// Throw statement
    Throw(Expression),
    /// Try statement
    Try(TryStatement),
    /// With statement
    With(WithStatement),
    /// Labeled statement
    Labeled(LabeledStatement),
    /// Debugger statement
    Debugger,
    /// Empty statement (;)
    Empty,
    /// import declaration
    Import(ImportDeclaration),
    /// export of a declaration or a specifier list
    ExportNamed(ExportNamedDeclaration),
    /// export default
    ExportDefault(ExportDefaultDeclaration),
    /// export * from
    ExportAll(ExportAllDeclaration),
}

impl Statement {
    /// Returns the ESTree node type name.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::VariableDeclaration(_) => "VariableDeclaration",
            Statement::FunctionDeclaration(_) => "FunctionDeclaration",
            Statement::ClassDeclaration(_) => "ClassDeclaration",
            Statement::Expression(_) => "ExpressionStatement",
            Statement::Block(_) => "BlockStatement",
            Statement::If(_) => "IfStatement",
            Statement::Switch(_) => "SwitchStatement",
            Statement::While(_) => "WhileStatement",
            Statement::DoWhile(_) => "DoWhileStatement",
            Statement::For(_) => "ForStatement",
            Statement::ForIn(_) => "ForInStatement",
            Statement::ForOf(_) => "ForOfStatement",
            Statement::Return(_) => "ReturnStatement",
            Statement::Break(_) => "BreakStatement",
            Statement::Continue(_) => "ContinueStatement",
            Statement::Throw(_) => "ThrowStatement",
            Statement::Try(_) => "TryStatement",
            Statement::With(_) => "WithStatement",
            Statement::Labeled(_) => "LabeledStatement",
            Statement::Debugger => "DebuggerStatement",
            Statement::Empty => "EmptyStatement",
            Statement::Import(_) => "ImportDeclaration",
            Statement::ExportNamed(_) => "ExportNamedDeclaration",
            Statement::ExportDefault(_) => "ExportDefaultDeclaration",
            Statement::ExportAll(_) => "ExportAllDeclaration",
        }
    }
}

/// Variable declaration kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// var declaration
    Var,
    /// let declaration
    Let,
    /// const declaration
    Const,
}

/// A variable declaration statement.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    /// The kind of declaration
    pub kind: VariableKind,
    /// The declarators
    pub declarations: Vec<VariableDeclarator>,
}

/// A single variable declarator.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    /// The binding being declared
    pub id: Pattern,
    /// Optional initializer expression
    pub init: Option<Expression>,
}

/// A function declaration, expression or method body.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// The function name
    pub id: Option<Identifier>,
    /// The parameters
    pub params: Vec<Pattern>,
    /// The function body
    pub body: Vec<Statement>,
    /// Whether this is an async function
    pub is_async: bool,
    /// Whether this is a generator function
    pub is_generator: bool,
}

/// An arrow function expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowFunction {
    /// The parameters
    pub params: Vec<Pattern>,
    /// The body
    pub body: ArrowBody,
    /// Whether this is an async arrow
    pub is_async: bool,
}

/// Arrow function body.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    /// `=> { ... }`
    Block(Vec<Statement>),
    /// `=> expr`
    Expression(Box<Expression>),
}

/// A class declaration or expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    /// The class name
    pub id: Option<Identifier>,
    /// The `extends` clause
    pub super_class: Option<Box<Expression>>,
    /// The class members
    pub body: Vec<ClassMember>,
}

/// A member of a class body.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    /// Constructor, method or accessor
    Method(MethodDefinition),
    /// Class field
    Property(PropertyDefinition),
}

/// Method kind inside a class body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// `constructor(...)`
    Constructor,
    /// Plain method
    Method,
    /// `get name()`
    Get,
    /// `set name(v)`
    Set,
}

/// A class method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefinition {
    /// The method name
    pub key: PropertyKey,
    /// The method function
    pub value: Function,
    /// The method kind
    pub kind: MethodKind,
    /// Whether the method is static
    pub is_static: bool,
}

/// A class field.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    /// The field name
    pub key: PropertyKey,
    /// The initializer
    pub value: Option<Expression>,
    /// Whether the field is static
    pub is_static: bool,
}

/// An if statement.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    /// The condition
    pub test: Expression,
    /// The then branch
    pub consequent: Box<Statement>,
    /// The optional else branch
    pub alternate: Option<Box<Statement>>,
}

/// A while or do-while statement.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    /// The condition
    pub test: Expression,
    /// The loop body
    pub body: Box<Statement>,
}

/// A for statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    /// The initializer
    pub init: Option<ForInit>,
    /// The condition
    pub test: Option<Expression>,
    /// The update expression
    pub update: Option<Expression>,
    /// The loop body
    pub body: Box<Statement>,
}

/// For loop initializer.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    /// Variable declaration
    Declaration(VariableDeclaration),
    /// Expression
    Expression(Expression),
}

/// A for-in or for-of statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ForInStatement {
    /// The left-hand side
    pub left: ForInLeft,
    /// The object or iterable
    pub right: Expression,
    /// The loop body
    pub body: Box<Statement>,
}

/// Left-hand side of for-in/for-of.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInLeft {
    /// Variable declaration
    Declaration(VariableDeclaration),
    /// Assignment target
    Pattern(Pattern),
}

/// A switch statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    /// The discriminant expression
    pub discriminant: Expression,
    /// The case clauses
    pub cases: Vec<SwitchCase>,
}

/// A switch case clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// The test expression (None for default)
    pub test: Option<Expression>,
    /// The consequent statements
    pub consequent: Vec<Statement>,
}

/// A try statement.
#[derive(Debug, Clone, PartialEq)]
pub struct TryStatement {
    /// The try block
    pub block: Vec<Statement>,
    /// The catch clause
    pub handler: Option<CatchClause>,
    /// The finally block
    pub finalizer: Option<Vec<Statement>>,
}

/// A catch clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    /// The error parameter
    pub param: Option<Pattern>,
    /// The catch body
    pub body: Vec<Statement>,
}

/// A with statement.
#[derive(Debug, Clone, PartialEq)]
pub struct WithStatement {
    /// The object expression
    pub object: Expression,
    /// The body statement
    pub body: Box<Statement>,
}

/// A labeled statement.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStatement {
    /// The label identifier
    pub label: Identifier,
    /// The labeled body
    pub body: Box<Statement>,
}

/// An import declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDeclaration {
    /// Imported bindings; empty for side-effect imports
    pub specifiers: Vec<ImportSpecifier>,
    /// The module specifier
    pub source: String,
}

/// A single imported binding.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    /// `import local from "m"`
    Default(Identifier),
    /// `import * as local from "m"`
    Namespace(Identifier),
    /// `import { imported as local } from "m"`
    Named {
        /// Name exported by the module
        imported: String,
        /// Local binding
        local: Identifier,
    },
}

/// `export <declaration>` or `export { a, b as c } [from "m"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportNamedDeclaration {
    /// Exported declaration
    pub declaration: Option<Box<Statement>>,
    /// Export specifiers
    pub specifiers: Vec<ExportSpecifier>,
    /// Re-export source
    pub source: Option<String>,
}

/// `local as exported` inside an export list.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    /// Local binding (or the re-exported name)
    pub local: Identifier,
    /// Name visible to importers
    pub exported: String,
}

/// `export default ...`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDefaultDeclaration {
    /// `export default function ...`
    Function(Function),
    /// `export default class ...`
    Class(Class),
    /// `export default expr`
    Expression(Expression),
}

/// `export * [as name] from "m"`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportAllDeclaration {
    /// Namespace name for `export * as name`
    pub exported: Option<String>,
    /// The module specifier
    pub source: String,
}

/// A binding or assignment target.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Plain identifier
    Identifier(Identifier),
    /// `{ a, b: c }`
    Object(ObjectPattern),
    /// `[a, b]`
    Array(Vec<Option<Pattern>>),
    /// `target = default`
    Assignment(AssignmentPattern),
    /// `...rest`
    Rest(Box<Pattern>),
    /// Member expression target (assignments only)
    Expression(Box<Expression>),
}

impl Pattern {
    /// Returns the ESTree node type name.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Pattern::Identifier(_) => "Identifier",
            Pattern::Object(_) => "ObjectPattern",
            Pattern::Array(_) => "ArrayPattern",
            Pattern::Assignment(_) => "AssignmentPattern",
            Pattern::Rest(_) => "RestElement",
            Pattern::Expression(expr) => expr.kind_name(),
        }
    }
}

/// An object destructuring pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPattern {
    /// Destructured properties
    pub properties: Vec<PatternProperty>,
    /// `...rest` element
    pub rest: Option<Box<Pattern>>,
}

/// One property of an object pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternProperty {
    /// The property read from the source object
    pub key: PropertyKey,
    /// Where the value is bound
    pub value: Pattern,
    /// Whether written as `{ a }`
    pub shorthand: bool,
}

/// A pattern with a default value.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentPattern {
    /// The target
    pub left: Box<Pattern>,
    /// The default value
    pub right: Box<Expression>,
}

/// A JavaScript expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal value
    Literal(Literal),
    /// Identifier reference
    Identifier(Identifier),
    /// this keyword
    This,
    /// super keyword
    Super,
    /// Array literal (None represents a hole)
    Array(Vec<Option<Expression>>),
    /// Object literal
    Object(Vec<ObjectMember>),
    /// Function expression
    Function(Function),
    /// Arrow function expression
    Arrow(ArrowFunction),
    /// Class expression
    Class(Class),
    /// Template literal
    Template(TemplateLiteral),
    /// Tagged template
    TaggedTemplate(TaggedTemplate),
    /// Member access expression
    Member(MemberExpression),
    /// Call expression
    Call(CallExpression),
    /// new expression
    New(CallExpression),
    /// Update expression (++/--)
    Update(UpdateExpression),
    /// Unary expression
    Unary(UnaryExpression),
    /// Binary expression
    Binary(BinaryExpression),
    /// Logical expression (&&, ||, ??)
    Logical(LogicalExpression),
    /// Conditional (ternary) expression
    Conditional(ConditionalExpression),
    /// Assignment expression
    Assignment(AssignmentExpression),
    /// Sequence expression (comma operator)
    Sequence(Vec<Expression>),
    /// Spread element
    Spread(Box<Expression>),
    /// yield expression
    Yield(Option<Box<Expression>>),
    /// await expression
    Await(Box<Expression>),
}

impl Expression {
    /// Returns the ESTree node type name.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::Literal(Literal::RegExp { .. }) => "RegExpLiteral",
            Expression::Literal(Literal::BigInt(_)) => "BigIntLiteral",
            Expression::Literal(_) => "Literal",
            Expression::Identifier(_) => "Identifier",
            Expression::This => "ThisExpression",
            Expression::Super => "Super",
            Expression::Array(_) => "ArrayExpression",
            Expression::Object(_) => "ObjectExpression",
            Expression::Function(_) => "FunctionExpression",
            Expression::Arrow(_) => "ArrowFunctionExpression",
            Expression::Class(_) => "ClassExpression",
            Expression::Template(_) => "TemplateLiteral",
            Expression::TaggedTemplate(_) => "TaggedTemplateExpression",
            Expression::Member(_) => "MemberExpression",
            Expression::Call(_) => "CallExpression",
            Expression::New(_) => "NewExpression",
            Expression::Update(_) => "UpdateExpression",
            Expression::Unary(_) => "UnaryExpression",
            Expression::Binary(_) => "BinaryExpression",
            Expression::Logical(_) => "LogicalExpression",
            Expression::Conditional(_) => "ConditionalExpression",
            Expression::Assignment(_) => "AssignmentExpression",
            Expression::Sequence(_) => "SequenceExpression",
            Expression::Spread(_) => "SpreadElement",
            Expression::Yield(_) => "YieldExpression",
            Expression::Await(_) => "AwaitExpression",
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Numeric literal with its source text
    Number {
        /// Parsed value
        value: f64,
        /// Source text
        raw: String,
    },
    /// String literal with its source text (quotes included)
    String {
        /// Cooked value
        value: String,
        /// Source text
        raw: String,
    },
    /// Boolean literal
    Boolean(bool),
    /// null literal
    Null,
    /// BigInt literal
    BigInt(String),
    /// Regular expression literal
    RegExp {
        /// Pattern
        pattern: String,
        /// Flags
        flags: String,
    },
}

/// A member of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectMember {
    /// `key: value`, shorthand, method or accessor
    Property(Property),
    /// `...expr`
    Spread(Expression),
}

/// An object property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// The property key
    pub key: PropertyKey,
    /// The property value
    pub value: Expression,
    /// Init, get or set
    pub kind: PropertyKind,
    /// Whether this is shorthand syntax
    pub shorthand: bool,
    /// Whether this is method syntax
    pub method: bool,
}

/// Object property kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Plain value
    Init,
    /// Getter
    Get,
    /// Setter
    Set,
}

/// A property key.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    /// Identifier key (keywords included)
    Identifier(Identifier),
    /// Literal key (numeric or string)
    Literal(Literal),
    /// Computed key
    Computed(Box<Expression>),
    /// `#name`
    Private(String),
}

/// A template literal.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLiteral {
    /// Cooked string parts, one more than `expressions`
    pub quasis: Vec<String>,
    /// Substituted expressions
    pub expressions: Vec<Expression>,
}

/// A tagged template.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedTemplate {
    /// The tag function
    pub tag: Box<Expression>,
    /// The template
    pub quasi: TemplateLiteral,
}

/// A member access expression.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    /// The object
    pub object: Box<Expression>,
    /// The property
    pub property: MemberProperty,
    /// Whether accessed with `?.`
    pub optional: bool,
}

/// A member property.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberProperty {
    /// `object.name`
    Identifier(Identifier),
    /// `object[expr]`
    Computed(Box<Expression>),
    /// `object.#name`
    Private(String),
}

/// A call or new expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    /// The callee
    pub callee: Box<Expression>,
    /// The arguments
    pub arguments: Vec<Expression>,
    /// Whether called with `?.()`
    pub optional: bool,
}

/// An update expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    /// The operator
    pub operator: UpdateOperator,
    /// The operand
    pub argument: Box<Expression>,
    /// Whether the operator is prefix
    pub prefix: bool,
}

/// Update operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperator {
    /// ++
    Increment,
    /// --
    Decrement,
}

/// A unary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    /// The operator
    pub operator: UnaryOperator,
    /// The operand
    pub argument: Box<Expression>,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// -
    Minus,
    /// +
    Plus,
    /// !
    LogicalNot,
    /// ~
    BitwiseNot,
    /// typeof
    Typeof,
    /// void
    Void,
    /// delete
    Delete,
}

/// A binary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    /// The operator
    pub operator: BinaryOperator,
    /// The left operand
    pub left: Box<Expression>,
    /// The right operand
    pub right: Box<Expression>,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,
    /// `**`
    Exponent,
    // Comparison
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `===`
    StrictEqual,
    /// `!==`
    StrictNotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanEqual,
    // Bitwise
    /// `&`
    BitwiseAnd,
    /// `|`
    BitwiseOr,
    /// `^`
    BitwiseXor,
    /// `<<`
    LeftShift,
    /// `>>`
    RightShift,
    /// `>>>`
    UnsignedRightShift,
    // Other
    /// `in`
    In,
    /// `instanceof`
    InstanceOf,
}

/// A logical expression.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpression {
    /// The operator
    pub operator: LogicalOperator,
    /// The left operand
    pub left: Box<Expression>,
    /// The right operand
    pub right: Box<Expression>,
}

/// Logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    /// &&
    And,
    /// ||
    Or,
    /// ??
    Nullish,
}

/// A conditional expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpression {
    /// The condition
    pub test: Box<Expression>,
    /// Value when true
    pub consequent: Box<Expression>,
    /// Value when false
    pub alternate: Box<Expression>,
}

/// An assignment expression.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpression {
    /// The operator
    pub operator: AssignmentOperator,
    /// The target
    pub left: Box<Pattern>,
    /// The value
    pub right: Box<Expression>,
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    /// =
    Assign,
    /// +=
    Add,
    /// -=
    Subtract,
    /// *=
    Multiply,
    /// /=
    Divide,
    /// %=
    Modulo,
    /// **=
    Exponent,
    /// <<=
    LeftShift,
    /// >>=
    RightShift,
    /// >>>=
    UnsignedRightShift,
    /// &=
    BitwiseAnd,
    /// |=
    BitwiseOr,
    /// ^=
    BitwiseXor,
    /// &&=
    LogicalAnd,
    /// ||=
    LogicalOr,
    /// ??=
    Nullish,
}

impl UpdateOperator {
    /// Returns the operator as written in source.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOperator::Increment => "++",
            UpdateOperator::Decrement => "--",
        }
    }
}

impl UnaryOperator {
    /// Returns the operator as written in source.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::LogicalNot => "!",
            UnaryOperator::BitwiseNot => "~",
            UnaryOperator::Typeof => "typeof",
            UnaryOperator::Void => "void",
            UnaryOperator::Delete => "delete",
        }
    }

    /// Returns true for the keyword operators, which need a space before the operand.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            UnaryOperator::Typeof | UnaryOperator::Void | UnaryOperator::Delete
        )
    }
}

impl BinaryOperator {
    /// Returns the operator as written in source.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Exponent => "**",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::StrictEqual => "===",
            BinaryOperator::StrictNotEqual => "!==",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanEqual => ">=",
            BinaryOperator::BitwiseAnd => "&",
            BinaryOperator::BitwiseOr => "|",
            BinaryOperator::BitwiseXor => "^",
            BinaryOperator::LeftShift => "<<",
            BinaryOperator::RightShift => ">>",
            BinaryOperator::UnsignedRightShift => ">>>",
            BinaryOperator::In => "in",
            BinaryOperator::InstanceOf => "instanceof",
        }
    }

    /// Returns true for operators that compare their operands.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::StrictEqual
                | BinaryOperator::StrictNotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::LessThanEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterThanEqual
                | BinaryOperator::In
                | BinaryOperator::InstanceOf
        )
    }
}

impl LogicalOperator {
    /// Returns the operator as written in source.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
            LogicalOperator::Nullish => "??",
        }
    }
}

impl AssignmentOperator {
    /// Returns the operator as written in source.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentOperator::Assign => "=",
            AssignmentOperator::Add => "+=",
            AssignmentOperator::Subtract => "-=",
            AssignmentOperator::Multiply => "*=",
            AssignmentOperator::Divide => "/=",
            AssignmentOperator::Modulo => "%=",
            AssignmentOperator::Exponent => "**=",
            AssignmentOperator::LeftShift => "<<=",
            AssignmentOperator::RightShift => ">>=",
            AssignmentOperator::UnsignedRightShift => ">>>=",
            AssignmentOperator::BitwiseAnd => "&=",
            AssignmentOperator::BitwiseOr => "|=",
            AssignmentOperator::BitwiseXor => "^=",
            AssignmentOperator::LogicalAnd => "&&=",
            AssignmentOperator::LogicalOr => "||=",
            AssignmentOperator::Nullish => "??=",
        }
    }

    /// The arithmetic or bitwise operator a compound assignment applies.
    pub fn binary_operator(&self) -> Option<BinaryOperator> {
        let op = match self {
            AssignmentOperator::Add => BinaryOperator::Add,
            AssignmentOperator::Subtract => BinaryOperator::Subtract,
            AssignmentOperator::Multiply => BinaryOperator::Multiply,
            AssignmentOperator::Divide => BinaryOperator::Divide,
            AssignmentOperator::Modulo => BinaryOperator::Modulo,
            AssignmentOperator::Exponent => BinaryOperator::Exponent,
            AssignmentOperator::LeftShift => BinaryOperator::LeftShift,
            AssignmentOperator::RightShift => BinaryOperator::RightShift,
            AssignmentOperator::UnsignedRightShift => BinaryOperator::UnsignedRightShift,
            AssignmentOperator::BitwiseAnd => BinaryOperator::BitwiseAnd,
            AssignmentOperator::BitwiseOr => BinaryOperator::BitwiseOr,
            AssignmentOperator::BitwiseXor => BinaryOperator::BitwiseXor,
            _ => return None,
        };
        Some(op)
    }
}

impl VariableKind {
    /// Returns the declaration keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
        }
    }
}
