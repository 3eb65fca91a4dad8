//! The recursive descent parser producing the generic syntax tree.

use super::SyntaxError;
use super::tree::*;
use crate::lexer::{Scanner, Span, Token, TokenKind};

type PResult<T> = Result<T, SyntaxError>;

/// A recursive descent parser for JavaScript modules.
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    source: &'a str,
    current: Token,
    previous: Token,
    /// Set while parsing a `for` head, where `in` ends the initializer.
    no_in: bool,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given source code.
    pub fn new(source: &'a str) -> Self {
        let mut scanner = Scanner::new(source);
        let current = scanner.next_token();
        Self {
            scanner,
            source,
            current,
            previous: Token::new(TokenKind::Eof, Span::new(0, 0)),
            no_in: false,
        }
    }

    /// Parses the source code into a Program.
    pub fn parse_program(&mut self) -> PResult<Program> {
        let mut body = Vec::new();

        while !self.is_at_end() {
            body.push(self.parse_statement()?);
        }

        Ok(Program { body })
    }

    /// Parses a single statement.
    pub fn parse_statement(&mut self) -> PResult<Statement> {
        match &self.current.kind {
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let declaration = self.parse_variable_declaration()?;
                self.consume_semicolon()?;
                Ok(Statement::VariableDeclaration(declaration))
            }
            TokenKind::Function => Ok(Statement::FunctionDeclaration(
                self.parse_function(false, true)?,
            )),
            TokenKind::Async if self.async_function_ahead() => {
                self.advance();
                Ok(Statement::FunctionDeclaration(self.parse_function(true, true)?))
            }
            TokenKind::Class => Ok(Statement::ClassDeclaration(self.parse_class(true)?)),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Break => {
                self.advance();
                let label = self.parse_jump_label()?;
                Ok(Statement::Break(label))
            }
            TokenKind::Continue => {
                self.advance();
                let label = self.parse_jump_label()?;
                Ok(Statement::Continue(label))
            }
            TokenKind::Throw => self.parse_throw_statement(),
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::With => self.parse_with_statement(),
            TokenKind::Debugger => {
                self.advance();
                self.consume_semicolon()?;
                Ok(Statement::Debugger)
            }
            TokenKind::LeftBrace => Ok(Statement::Block(self.parse_block()?)),
            TokenKind::Semicolon => {
                self.advance();
                Ok(Statement::Empty)
            }
            TokenKind::Import if !matches!(self.peek_kind(), TokenKind::LeftParen | TokenKind::Dot) => {
                self.parse_import_declaration()
            }
            TokenKind::Export => self.parse_export_declaration(),
            TokenKind::Identifier(_) if self.peek_kind() == TokenKind::Colon => {
                let label = self.expect_identifier()?;
                self.advance(); // consume ':'
                let body = self.parse_statement()?;
                Ok(Statement::Labeled(LabeledStatement {
                    label,
                    body: Box::new(body),
                }))
            }
            _ => {
                let expression = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Statement::Expression(expression))
            }
        }
    }

    fn parse_jump_label(&mut self) -> PResult<Option<Identifier>> {
        // No line terminator allowed between the keyword and the label
        let label = match &self.current.kind {
            TokenKind::Identifier(_) if !self.current.newline_before => {
                Some(self.expect_identifier()?)
            }
            _ => None,
        };
        self.consume_semicolon()?;
        Ok(label)
    }

    fn parse_block(&mut self) -> PResult<Vec<Statement>> {
        self.expect(&TokenKind::LeftBrace)?;
        let mut body = Vec::new();

        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            body.push(self.parse_statement()?);
        }

        self.expect(&TokenKind::RightBrace)?;
        Ok(body)
    }

    fn parse_variable_declaration(&mut self) -> PResult<VariableDeclaration> {
        let kind = match &self.current.kind {
            TokenKind::Var => VariableKind::Var,
            TokenKind::Let => VariableKind::Let,
            TokenKind::Const => VariableKind::Const,
            _ => return self.error("Expected variable keyword"),
        };
        self.advance();

        let mut declarations = Vec::new();

        loop {
            let id = self.parse_binding_target()?;
            let init = if self.eat(&TokenKind::Equal) {
                Some(self.parse_assignment()?)
            } else {
                None
            };

            declarations.push(VariableDeclarator { id, init });

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        Ok(VariableDeclaration { kind, declarations })
    }

    fn parse_binding_target(&mut self) -> PResult<Pattern> {
        match &self.current.kind {
            TokenKind::LeftBrace => self.parse_object_binding(),
            TokenKind::LeftBracket => self.parse_array_binding(),
            _ => Ok(Pattern::Identifier(self.expect_identifier()?)),
        }
    }

    fn parse_binding_element(&mut self) -> PResult<Pattern> {
        let target = self.parse_binding_target()?;
        if self.eat(&TokenKind::Equal) {
            let right = self.parse_assignment()?;
            return Ok(Pattern::Assignment(AssignmentPattern {
                left: Box::new(target),
                right: Box::new(right),
            }));
        }
        Ok(target)
    }

    fn parse_object_binding(&mut self) -> PResult<Pattern> {
        self.advance(); // consume '{'
        let mut properties = Vec::new();
        let mut rest = None;

        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            if self.eat(&TokenKind::Ellipsis) {
                rest = Some(Box::new(self.parse_binding_target()?));
            } else {
                let key = self.parse_property_key()?;
                if self.eat(&TokenKind::Colon) {
                    let value = self.parse_binding_element()?;
                    properties.push(PatternProperty {
                        key,
                        value,
                        shorthand: false,
                    });
                } else {
                    let PropertyKey::Identifier(id) = &key else {
                        return self.error("Expected ':' in object pattern");
                    };
                    let mut value = Pattern::Identifier(id.clone());
                    if self.eat(&TokenKind::Equal) {
                        value = Pattern::Assignment(AssignmentPattern {
                            left: Box::new(value),
                            right: Box::new(self.parse_assignment()?),
                        });
                    }
                    properties.push(PatternProperty {
                        key,
                        value,
                        shorthand: true,
                    });
                }
            }

            if !self.check(&TokenKind::RightBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }

        self.expect(&TokenKind::RightBrace)?;
        Ok(Pattern::Object(ObjectPattern { properties, rest }))
    }

    fn parse_array_binding(&mut self) -> PResult<Pattern> {
        self.advance(); // consume '['
        let mut elements = Vec::new();

        while !self.check(&TokenKind::RightBracket) && !self.is_at_end() {
            if self.check(&TokenKind::Comma) {
                elements.push(None); // Hole in pattern
            } else if self.eat(&TokenKind::Ellipsis) {
                elements.push(Some(Pattern::Rest(Box::new(self.parse_binding_target()?))));
            } else {
                elements.push(Some(self.parse_binding_element()?));
            }

            if !self.check(&TokenKind::RightBracket) {
                self.expect(&TokenKind::Comma)?;
            }
        }

        self.expect(&TokenKind::RightBracket)?;
        Ok(Pattern::Array(elements))
    }

    /// Parses `function [*] name? (params) { body }` starting at `function`.
    fn parse_function(&mut self, is_async: bool, require_name: bool) -> PResult<Function> {
        self.expect(&TokenKind::Function)?;
        let is_generator = self.eat(&TokenKind::Star);

        let id = if matches!(self.current.kind, TokenKind::Identifier(_)) {
            Some(self.expect_identifier()?)
        } else if require_name {
            return self.error(format!(
                "Expected function name, found {:?}",
                self.current.kind
            ));
        } else {
            None
        };

        let params = self.parse_formal_parameters()?;
        let body = self.parse_block()?;

        Ok(Function {
            id,
            params,
            body,
            is_async,
            is_generator,
        })
    }

    fn parse_method_function(&mut self, is_async: bool, is_generator: bool) -> PResult<Function> {
        let params = self.parse_formal_parameters()?;
        let body = self.parse_block()?;
        Ok(Function {
            id: None,
            params,
            body,
            is_async,
            is_generator,
        })
    }

    fn parse_formal_parameters(&mut self) -> PResult<Vec<Pattern>> {
        self.expect(&TokenKind::LeftParen)?;
        let mut params = Vec::new();

        while !self.check(&TokenKind::RightParen) && !self.is_at_end() {
            if self.eat(&TokenKind::Ellipsis) {
                params.push(Pattern::Rest(Box::new(self.parse_binding_target()?)));
            } else {
                params.push(self.parse_binding_element()?);
            }
            if !self.check(&TokenKind::RightParen) {
                self.expect(&TokenKind::Comma)?;
            }
        }

        self.expect(&TokenKind::RightParen)?;
        Ok(params)
    }

    fn parse_class(&mut self, require_name: bool) -> PResult<Class> {
        self.expect(&TokenKind::Class)?;

        let id = if matches!(self.current.kind, TokenKind::Identifier(_)) {
            Some(self.expect_identifier()?)
        } else if require_name {
            return self.error("Expected class name");
        } else {
            None
        };

        let super_class = if self.eat(&TokenKind::Extends) {
            Some(Box::new(self.parse_call()?))
        } else {
            None
        };

        self.expect(&TokenKind::LeftBrace)?;
        let mut body = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            if self.eat(&TokenKind::Semicolon) {
                continue;
            }
            body.push(self.parse_class_member()?);
        }
        self.expect(&TokenKind::RightBrace)?;

        Ok(Class {
            id,
            super_class,
            body,
        })
    }

    fn parse_class_member(&mut self) -> PResult<ClassMember> {
        let mut is_static = false;
        if self.check(&TokenKind::Static) && !self.modifier_is_name() {
            self.advance();
            is_static = true;
        }

        let mut is_async = false;
        if self.check(&TokenKind::Async) && !self.modifier_is_name() && !self.peek_token().newline_before
        {
            self.advance();
            is_async = true;
        }
        let is_generator = self.eat(&TokenKind::Star);

        let mut kind = MethodKind::Method;
        if (self.check_identifier("get") || self.check_identifier("set")) && !self.modifier_is_name() {
            kind = if self.check_identifier("get") {
                MethodKind::Get
            } else {
                MethodKind::Set
            };
            self.advance();
        }

        let key = self.parse_property_key()?;

        if self.check(&TokenKind::LeftParen) {
            if kind == MethodKind::Method && !is_static && property_key_is(&key, "constructor") {
                kind = MethodKind::Constructor;
            }
            let value = self.parse_method_function(is_async, is_generator)?;
            return Ok(ClassMember::Method(MethodDefinition {
                key,
                value,
                kind,
                is_static,
            }));
        }

        let value = if self.eat(&TokenKind::Equal) {
            Some(self.parse_assignment()?)
        } else {
            None
        };
        self.consume_semicolon()?;
        Ok(ClassMember::Property(PropertyDefinition {
            key,
            value,
            is_static,
        }))
    }

    /// True when a `static`/`async`/`get`/`set` word is itself the member name.
    fn modifier_is_name(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::LeftParen
                | TokenKind::Equal
                | TokenKind::Semicolon
                | TokenKind::RightBrace
                | TokenKind::Colon
                | TokenKind::Comma
        )
    }

    fn parse_property_key(&mut self) -> PResult<PropertyKey> {
        let key = match &self.current.kind {
            TokenKind::Identifier(_) => PropertyKey::Identifier(self.expect_identifier()?),
            TokenKind::String(value) => {
                let literal = Literal::String {
                    value: value.clone(),
                    raw: self.slice(self.current.span).to_string(),
                };
                self.advance();
                PropertyKey::Literal(literal)
            }
            TokenKind::Number(value) => {
                let literal = Literal::Number {
                    value: *value,
                    raw: self.slice(self.current.span).to_string(),
                };
                self.advance();
                PropertyKey::Literal(literal)
            }
            TokenKind::PrivateIdentifier(name) => {
                let name = name.clone();
                self.advance();
                PropertyKey::Private(name)
            }
            TokenKind::LeftBracket => {
                self.advance();
                let expr = self.with_in_allowed(Self::parse_assignment)?;
                self.expect(&TokenKind::RightBracket)?;
                PropertyKey::Computed(Box::new(expr))
            }
            other => match other.keyword_name() {
                Some(name) => {
                    let id = Identifier {
                        name: name.to_string(),
                        span: self.current.span,
                    };
                    self.advance();
                    PropertyKey::Identifier(id)
                }
                None => return self.unexpected(),
            },
        };
        Ok(key)
    }

    fn parse_if_statement(&mut self) -> PResult<Statement> {
        self.advance(); // consume 'if'
        self.expect(&TokenKind::LeftParen)?;
        let test = self.parse_expression()?;
        self.expect(&TokenKind::RightParen)?;

        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Statement::If(IfStatement {
            test,
            consequent,
            alternate,
        }))
    }

    fn parse_switch_statement(&mut self) -> PResult<Statement> {
        self.advance(); // consume 'switch'
        self.expect(&TokenKind::LeftParen)?;
        let discriminant = self.parse_expression()?;
        self.expect(&TokenKind::RightParen)?;
        self.expect(&TokenKind::LeftBrace)?;

        let mut cases = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            let test = if self.eat(&TokenKind::Case) {
                Some(self.parse_expression()?)
            } else {
                self.expect(&TokenKind::Default)?;
                None
            };
            self.expect(&TokenKind::Colon)?;

            let mut consequent = Vec::new();
            while !matches!(
                self.current.kind,
                TokenKind::Case | TokenKind::Default | TokenKind::RightBrace | TokenKind::Eof
            ) {
                consequent.push(self.parse_statement()?);
            }

            cases.push(SwitchCase { test, consequent });
        }

        self.expect(&TokenKind::RightBrace)?;
        Ok(Statement::Switch(SwitchStatement {
            discriminant,
            cases,
        }))
    }

    fn parse_while_statement(&mut self) -> PResult<Statement> {
        self.advance(); // consume 'while'
        self.expect(&TokenKind::LeftParen)?;
        let test = self.parse_expression()?;
        self.expect(&TokenKind::RightParen)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::While(WhileStatement { test, body }))
    }

    fn parse_do_while_statement(&mut self) -> PResult<Statement> {
        self.advance(); // consume 'do'
        let body = Box::new(self.parse_statement()?);
        self.expect(&TokenKind::While)?;
        self.expect(&TokenKind::LeftParen)?;
        let test = self.parse_expression()?;
        self.expect(&TokenKind::RightParen)?;
        self.eat(&TokenKind::Semicolon);
        Ok(Statement::DoWhile(WhileStatement { test, body }))
    }

    fn parse_for_statement(&mut self) -> PResult<Statement> {
        self.advance(); // consume 'for'
        self.expect(&TokenKind::LeftParen)?;

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if matches!(
            self.current.kind,
            TokenKind::Var | TokenKind::Let | TokenKind::Const
        ) {
            let declaration = self.without_in(Self::parse_variable_declaration)?;
            if self.eat(&TokenKind::In) {
                return self.finish_for_in(ForInLeft::Declaration(declaration), false);
            }
            if self.check_identifier("of") {
                self.advance();
                return self.finish_for_in(ForInLeft::Declaration(declaration), true);
            }
            Some(ForInit::Declaration(declaration))
        } else {
            let expr = self.without_in(Self::parse_expression)?;
            if self.eat(&TokenKind::In) {
                let left = self.to_pattern(expr)?;
                return self.finish_for_in(ForInLeft::Pattern(left), false);
            }
            if self.check_identifier("of") {
                self.advance();
                let left = self.to_pattern(expr)?;
                return self.finish_for_in(ForInLeft::Pattern(left), true);
            }
            Some(ForInit::Expression(expr))
        };

        self.expect(&TokenKind::Semicolon)?;
        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::Semicolon)?;
        let update = if self.check(&TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::RightParen)?;

        let body = Box::new(self.parse_statement()?);
        Ok(Statement::For(ForStatement {
            init,
            test,
            update,
            body,
        }))
    }

    fn finish_for_in(&mut self, left: ForInLeft, of: bool) -> PResult<Statement> {
        let right = if of {
            self.parse_assignment()?
        } else {
            self.parse_expression()?
        };
        self.expect(&TokenKind::RightParen)?;
        let body = Box::new(self.parse_statement()?);
        let statement = ForInStatement { left, right, body };
        Ok(if of {
            Statement::ForOf(statement)
        } else {
            Statement::ForIn(statement)
        })
    }

    fn parse_return_statement(&mut self) -> PResult<Statement> {
        self.advance(); // consume 'return'

        let argument = if self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RightBrace)
            || self.is_at_end()
            || self.current.newline_before
        {
            None
        } else {
            Some(self.parse_expression()?)
        };

        self.consume_semicolon()?;
        Ok(Statement::Return(argument))
    }

    fn parse_throw_statement(&mut self) -> PResult<Statement> {
        self.advance(); // consume 'throw'
        if self.current.newline_before {
            return self.error("Illegal newline after throw");
        }
        let argument = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Statement::Throw(argument))
    }

    fn parse_try_statement(&mut self) -> PResult<Statement> {
        self.advance(); // consume 'try'
        let block = self.parse_block()?;

        let handler = if self.eat(&TokenKind::Catch) {
            let param = if self.eat(&TokenKind::LeftParen) {
                let param = self.parse_binding_target()?;
                self.expect(&TokenKind::RightParen)?;
                Some(param)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause { param, body })
        } else {
            None
        };

        let finalizer = if self.eat(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return self.error("Missing catch or finally after try");
        }

        Ok(Statement::Try(TryStatement {
            block,
            handler,
            finalizer,
        }))
    }

    fn parse_with_statement(&mut self) -> PResult<Statement> {
        self.advance(); // consume 'with'
        self.expect(&TokenKind::LeftParen)?;
        let object = self.parse_expression()?;
        self.expect(&TokenKind::RightParen)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::With(WithStatement { object, body }))
    }

    fn parse_import_declaration(&mut self) -> PResult<Statement> {
        self.advance(); // consume 'import'

        // Side-effect import: import "module"
        if let TokenKind::String(source) = &self.current.kind {
            let source = source.clone();
            self.advance();
            self.consume_semicolon()?;
            return Ok(Statement::Import(ImportDeclaration {
                specifiers: Vec::new(),
                source,
            }));
        }

        let mut specifiers = Vec::new();

        if matches!(self.current.kind, TokenKind::Identifier(_)) {
            specifiers.push(ImportSpecifier::Default(self.expect_identifier()?));
            if !self.eat(&TokenKind::Comma) {
                return self.finish_import(specifiers);
            }
        }

        if self.eat(&TokenKind::Star) {
            self.expect_contextual("as")?;
            specifiers.push(ImportSpecifier::Namespace(self.expect_identifier()?));
        } else if self.eat(&TokenKind::LeftBrace) {
            while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
                let imported = self.parse_module_export_name()?;
                let local = if self.check_identifier("as") {
                    self.advance();
                    self.expect_identifier()?
                } else {
                    imported.clone()
                };
                specifiers.push(ImportSpecifier::Named {
                    imported: imported.name,
                    local,
                });
                if !self.check(&TokenKind::RightBrace) {
                    self.expect(&TokenKind::Comma)?;
                }
            }
            self.expect(&TokenKind::RightBrace)?;
        } else {
            return self.unexpected();
        }

        self.finish_import(specifiers)
    }

    fn finish_import(&mut self, specifiers: Vec<ImportSpecifier>) -> PResult<Statement> {
        self.expect_contextual("from")?;
        let source = self.expect_string()?;
        self.consume_semicolon()?;
        Ok(Statement::Import(ImportDeclaration { specifiers, source }))
    }

    fn parse_export_declaration(&mut self) -> PResult<Statement> {
        self.advance(); // consume 'export'

        match &self.current.kind {
            TokenKind::Default => {
                self.advance();
                let declaration = match &self.current.kind {
                    TokenKind::Function => {
                        ExportDefaultDeclaration::Function(self.parse_function(false, false)?)
                    }
                    TokenKind::Async if self.async_function_ahead() => {
                        self.advance();
                        ExportDefaultDeclaration::Function(self.parse_function(true, false)?)
                    }
                    TokenKind::Class => ExportDefaultDeclaration::Class(self.parse_class(false)?),
                    _ => {
                        let expr = self.parse_assignment()?;
                        self.consume_semicolon()?;
                        ExportDefaultDeclaration::Expression(expr)
                    }
                };
                Ok(Statement::ExportDefault(declaration))
            }
            TokenKind::Star => {
                self.advance();
                let exported = if self.check_identifier("as") {
                    self.advance();
                    Some(self.parse_module_export_name()?.name)
                } else {
                    None
                };
                self.expect_contextual("from")?;
                let source = self.expect_string()?;
                self.consume_semicolon()?;
                Ok(Statement::ExportAll(ExportAllDeclaration { exported, source }))
            }
            TokenKind::LeftBrace => {
                self.advance();
                let mut specifiers = Vec::new();
                while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
                    let local = self.parse_module_export_name()?;
                    let exported = if self.check_identifier("as") {
                        self.advance();
                        self.parse_module_export_name()?.name
                    } else {
                        local.name.clone()
                    };
                    specifiers.push(ExportSpecifier { local, exported });
                    if !self.check(&TokenKind::RightBrace) {
                        self.expect(&TokenKind::Comma)?;
                    }
                }
                self.expect(&TokenKind::RightBrace)?;
                let source = if self.check_identifier("from") {
                    self.advance();
                    Some(self.expect_string()?)
                } else {
                    None
                };
                self.consume_semicolon()?;
                Ok(Statement::ExportNamed(ExportNamedDeclaration {
                    declaration: None,
                    specifiers,
                    source,
                }))
            }
            TokenKind::Var
            | TokenKind::Let
            | TokenKind::Const
            | TokenKind::Function
            | TokenKind::Class
            | TokenKind::Async => {
                let declaration = self.parse_statement()?;
                Ok(Statement::ExportNamed(ExportNamedDeclaration {
                    declaration: Some(Box::new(declaration)),
                    specifiers: Vec::new(),
                    source: None,
                }))
            }
            _ => self.unexpected(),
        }
    }

    /// Identifier, keyword or string naming an import/export binding.
    fn parse_module_export_name(&mut self) -> PResult<Identifier> {
        let span = self.current.span;
        let name = match &self.current.kind {
            TokenKind::Identifier(name) | TokenKind::String(name) => name.clone(),
            other => match other.keyword_name() {
                Some(name) => name.to_string(),
                None => return self.unexpected(),
            },
        };
        self.advance();
        Ok(Identifier { name, span })
    }

    /// Parses an expression.
    pub fn parse_expression(&mut self) -> PResult<Expression> {
        let expr = self.parse_assignment()?;

        if self.check(&TokenKind::Comma) {
            let mut expressions = vec![expr];
            while self.eat(&TokenKind::Comma) {
                expressions.push(self.parse_assignment()?);
            }
            return Ok(Expression::Sequence(expressions));
        }

        Ok(expr)
    }

    fn parse_assignment(&mut self) -> PResult<Expression> {
        if self.check(&TokenKind::Yield) {
            return self.parse_yield();
        }
        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow);
        }

        let left = self.parse_conditional()?;

        let operator = match &self.current.kind {
            TokenKind::Equal => AssignmentOperator::Assign,
            TokenKind::PlusEqual => AssignmentOperator::Add,
            TokenKind::MinusEqual => AssignmentOperator::Subtract,
            TokenKind::StarEqual => AssignmentOperator::Multiply,
            TokenKind::SlashEqual => AssignmentOperator::Divide,
            TokenKind::PercentEqual => AssignmentOperator::Modulo,
            TokenKind::StarStarEqual => AssignmentOperator::Exponent,
            TokenKind::LeftShiftEqual => AssignmentOperator::LeftShift,
            TokenKind::RightShiftEqual => AssignmentOperator::RightShift,
            TokenKind::UnsignedRightShiftEqual => AssignmentOperator::UnsignedRightShift,
            TokenKind::AmpersandEqual => AssignmentOperator::BitwiseAnd,
            TokenKind::PipeEqual => AssignmentOperator::BitwiseOr,
            TokenKind::CaretEqual => AssignmentOperator::BitwiseXor,
            TokenKind::AmpersandAmpersandEqual => AssignmentOperator::LogicalAnd,
            TokenKind::PipePipeEqual => AssignmentOperator::LogicalOr,
            TokenKind::QuestionQuestionEqual => AssignmentOperator::Nullish,
            _ => return Ok(left),
        };
        self.advance();

        let target = self.to_pattern(left)?;
        let right = self.parse_assignment()?;

        Ok(Expression::Assignment(AssignmentExpression {
            operator,
            left: Box::new(target),
            right: Box::new(right),
        }))
    }

    fn parse_yield(&mut self) -> PResult<Expression> {
        self.advance(); // consume 'yield'
        self.eat(&TokenKind::Star);
        let ends = self.current.newline_before
            || self.is_at_end()
            || matches!(
                self.current.kind,
                TokenKind::RightParen
                    | TokenKind::RightBracket
                    | TokenKind::RightBrace
                    | TokenKind::Comma
                    | TokenKind::Semicolon
                    | TokenKind::Colon
            );
        if ends {
            return Ok(Expression::Yield(None));
        }
        Ok(Expression::Yield(Some(Box::new(self.parse_assignment()?))))
    }

    /// Recognizes arrow function heads with bounded lookahead.
    fn try_parse_arrow(&mut self) -> PResult<Option<Expression>> {
        match &self.current.kind {
            TokenKind::Identifier(_) => {
                let next = self.peek_token();
                if next.kind != TokenKind::Arrow || next.newline_before {
                    return Ok(None);
                }
                let param = self.expect_identifier()?;
                self.parse_arrow_body(vec![Pattern::Identifier(param)], false)
                    .map(Some)
            }
            TokenKind::LeftParen => {
                if !paren_is_arrow_head(self.scanner.clone()) {
                    return Ok(None);
                }
                let params = self.parse_formal_parameters()?;
                self.parse_arrow_body(params, false).map(Some)
            }
            TokenKind::Async => {
                let mut scanner = self.scanner.clone();
                let next = scanner.next_token();
                if next.newline_before {
                    return Ok(None);
                }
                match next.kind {
                    TokenKind::Identifier(_) if scanner.next_token().kind == TokenKind::Arrow => {
                        self.advance(); // consume 'async'
                        let param = self.expect_identifier()?;
                        self.parse_arrow_body(vec![Pattern::Identifier(param)], true)
                            .map(Some)
                    }
                    TokenKind::LeftParen if paren_is_arrow_head(scanner) => {
                        self.advance(); // consume 'async'
                        let params = self.parse_formal_parameters()?;
                        self.parse_arrow_body(params, true).map(Some)
                    }
                    _ => Ok(None),
                }
            }
            _ => Ok(None),
        }
    }

    fn parse_arrow_body(&mut self, params: Vec<Pattern>, is_async: bool) -> PResult<Expression> {
        self.expect(&TokenKind::Arrow)?;

        let body = if self.check(&TokenKind::LeftBrace) {
            ArrowBody::Block(self.with_in_allowed(Self::parse_block)?)
        } else {
            ArrowBody::Expression(Box::new(self.parse_assignment()?))
        };

        Ok(Expression::Arrow(ArrowFunction {
            params,
            body,
            is_async,
        }))
    }

    /// Parse conditional (ternary) expression: test ? consequent : alternate
    fn parse_conditional(&mut self) -> PResult<Expression> {
        let test = self.parse_logical_or()?;

        if self.eat(&TokenKind::Question) {
            let consequent = self.with_in_allowed(Self::parse_assignment)?;
            self.expect(&TokenKind::Colon)?;
            let alternate = self.parse_assignment()?;

            return Ok(Expression::Conditional(ConditionalExpression {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            }));
        }

        Ok(test)
    }

    fn parse_logical_or(&mut self) -> PResult<Expression> {
        let mut left = self.parse_logical_and()?;

        loop {
            let operator = match &self.current.kind {
                TokenKind::PipePipe => LogicalOperator::Or,
                TokenKind::QuestionQuestion => LogicalOperator::Nullish,
                _ => break,
            };
            self.advance();
            let right = self.parse_logical_and()?;
            left = Expression::Logical(LogicalExpression {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_logical_and(&mut self) -> PResult<Expression> {
        let mut left = self.parse_bitwise_or()?;

        while self.eat(&TokenKind::AmpersandAmpersand) {
            let right = self.parse_bitwise_or()?;
            left = Expression::Logical(LogicalExpression {
                operator: LogicalOperator::And,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_bitwise_or(&mut self) -> PResult<Expression> {
        let mut left = self.parse_bitwise_xor()?;

        while self.eat(&TokenKind::Pipe) {
            let right = self.parse_bitwise_xor()?;
            left = binary(BinaryOperator::BitwiseOr, left, right);
        }

        Ok(left)
    }

    fn parse_bitwise_xor(&mut self) -> PResult<Expression> {
        let mut left = self.parse_bitwise_and()?;

        while self.eat(&TokenKind::Caret) {
            let right = self.parse_bitwise_and()?;
            left = binary(BinaryOperator::BitwiseXor, left, right);
        }

        Ok(left)
    }

    fn parse_bitwise_and(&mut self) -> PResult<Expression> {
        let mut left = self.parse_equality()?;

        while self.eat(&TokenKind::Ampersand) {
            let right = self.parse_equality()?;
            left = binary(BinaryOperator::BitwiseAnd, left, right);
        }

        Ok(left)
    }

    fn parse_equality(&mut self) -> PResult<Expression> {
        let mut left = self.parse_relational()?;

        loop {
            let operator = match &self.current.kind {
                TokenKind::EqualEqual => BinaryOperator::Equal,
                TokenKind::NotEqual => BinaryOperator::NotEqual,
                TokenKind::StrictEqual => BinaryOperator::StrictEqual,
                TokenKind::StrictNotEqual => BinaryOperator::StrictNotEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            left = binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_relational(&mut self) -> PResult<Expression> {
        let mut left = self.parse_shift()?;

        loop {
            let operator = match &self.current.kind {
                TokenKind::LessThan => BinaryOperator::LessThan,
                TokenKind::LessThanEqual => BinaryOperator::LessThanEqual,
                TokenKind::GreaterThan => BinaryOperator::GreaterThan,
                TokenKind::GreaterThanEqual => BinaryOperator::GreaterThanEqual,
                TokenKind::Instanceof => BinaryOperator::InstanceOf,
                TokenKind::In if !self.no_in => BinaryOperator::In,
                _ => break,
            };
            self.advance();
            let right = self.parse_shift()?;
            left = binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_shift(&mut self) -> PResult<Expression> {
        let mut left = self.parse_additive()?;

        loop {
            let operator = match &self.current.kind {
                TokenKind::LeftShift => BinaryOperator::LeftShift,
                TokenKind::RightShift => BinaryOperator::RightShift,
                TokenKind::UnsignedRightShift => BinaryOperator::UnsignedRightShift,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> PResult<Expression> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let operator = match &self.current.kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expression> {
        let mut left = self.parse_exponent()?;

        loop {
            let operator = match &self.current.kind {
                TokenKind::Star => BinaryOperator::Multiply,
                TokenKind::Slash => BinaryOperator::Divide,
                TokenKind::Percent => BinaryOperator::Modulo,
                _ => break,
            };
            self.advance();
            let right = self.parse_exponent()?;
            left = binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_exponent(&mut self) -> PResult<Expression> {
        let left = self.parse_unary()?;

        // Right-associative
        if self.eat(&TokenKind::StarStar) {
            let right = self.parse_exponent()?;
            return Ok(binary(BinaryOperator::Exponent, left, right));
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Expression> {
        let update = match &self.current.kind {
            TokenKind::PlusPlus => Some(UpdateOperator::Increment),
            TokenKind::MinusMinus => Some(UpdateOperator::Decrement),
            _ => None,
        };
        if let Some(operator) = update {
            self.advance();
            let argument = self.parse_unary()?;
            return Ok(Expression::Update(UpdateExpression {
                operator,
                argument: Box::new(argument),
                prefix: true,
            }));
        }

        if self.eat(&TokenKind::Await) {
            let argument = self.parse_unary()?;
            return Ok(Expression::Await(Box::new(argument)));
        }

        let operator = match &self.current.kind {
            TokenKind::Bang => Some(UnaryOperator::LogicalNot),
            TokenKind::Minus => Some(UnaryOperator::Minus),
            TokenKind::Plus => Some(UnaryOperator::Plus),
            TokenKind::Typeof => Some(UnaryOperator::Typeof),
            TokenKind::Void => Some(UnaryOperator::Void),
            TokenKind::Delete => Some(UnaryOperator::Delete),
            TokenKind::Tilde => Some(UnaryOperator::BitwiseNot),
            _ => None,
        };

        if let Some(op) = operator {
            self.advance();
            let argument = self.parse_unary()?;
            return Ok(Expression::Unary(UnaryExpression {
                operator: op,
                argument: Box::new(argument),
            }));
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> PResult<Expression> {
        let expr = self.parse_call()?;

        // Postfix operators must stay on the operand's line
        if self.current.newline_before {
            return Ok(expr);
        }
        let operator = match &self.current.kind {
            TokenKind::PlusPlus => UpdateOperator::Increment,
            TokenKind::MinusMinus => UpdateOperator::Decrement,
            _ => return Ok(expr),
        };
        self.advance();
        Ok(Expression::Update(UpdateExpression {
            operator,
            argument: Box::new(expr),
            prefix: false,
        }))
    }

    fn parse_call(&mut self) -> PResult<Expression> {
        let mut expr = if self.check(&TokenKind::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary()?
        };

        loop {
            match &self.current.kind {
                TokenKind::Dot => {
                    self.advance();
                    let property = self.parse_member_name()?;
                    expr = member(expr, property, false);
                }
                TokenKind::QuestionDot => {
                    self.advance();
                    if self.check(&TokenKind::LeftParen) {
                        let arguments = self.parse_arguments()?;
                        expr = Expression::Call(CallExpression {
                            callee: Box::new(expr),
                            arguments,
                            optional: true,
                        });
                    } else if self.eat(&TokenKind::LeftBracket) {
                        let property = self.with_in_allowed(Self::parse_expression)?;
                        self.expect(&TokenKind::RightBracket)?;
                        expr = member(expr, MemberProperty::Computed(Box::new(property)), true);
                    } else {
                        let property = self.parse_member_name()?;
                        expr = member(expr, property, true);
                    }
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let property = self.with_in_allowed(Self::parse_expression)?;
                    self.expect(&TokenKind::RightBracket)?;
                    expr = member(expr, MemberProperty::Computed(Box::new(property)), false);
                }
                TokenKind::LeftParen => {
                    let arguments = self.parse_arguments()?;
                    expr = Expression::Call(CallExpression {
                        callee: Box::new(expr),
                        arguments,
                        optional: false,
                    });
                }
                TokenKind::Template { .. } => {
                    let quasi = self.parse_template()?;
                    expr = Expression::TaggedTemplate(TaggedTemplate {
                        tag: Box::new(expr),
                        quasi,
                    });
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_new_expression(&mut self) -> PResult<Expression> {
        self.advance(); // consume 'new'

        if self.check(&TokenKind::Dot) {
            return self.error("new.target is not supported");
        }

        let mut callee = if self.check(&TokenKind::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary()?
        };

        // Member accesses bind tighter than `new`, calls do not
        loop {
            if self.eat(&TokenKind::Dot) {
                let property = self.parse_member_name()?;
                callee = member(callee, property, false);
            } else if self.eat(&TokenKind::LeftBracket) {
                let property = self.with_in_allowed(Self::parse_expression)?;
                self.expect(&TokenKind::RightBracket)?;
                callee = member(callee, MemberProperty::Computed(Box::new(property)), false);
            } else {
                break;
            }
        }

        // Arguments are optional with 'new'
        let arguments = if self.check(&TokenKind::LeftParen) {
            self.parse_arguments()?
        } else {
            vec![]
        };

        Ok(Expression::New(CallExpression {
            callee: Box::new(callee),
            arguments,
            optional: false,
        }))
    }

    fn parse_member_name(&mut self) -> PResult<MemberProperty> {
        let span = self.current.span;
        let property = match &self.current.kind {
            TokenKind::Identifier(name) => MemberProperty::Identifier(Identifier {
                name: name.clone(),
                span,
            }),
            TokenKind::PrivateIdentifier(name) => MemberProperty::Private(name.clone()),
            other => match other.keyword_name() {
                Some(name) => MemberProperty::Identifier(Identifier {
                    name: name.to_string(),
                    span,
                }),
                None => {
                    return self.error(format!(
                        "Expected property name, found {:?}",
                        self.current.kind
                    ));
                }
            },
        };
        self.advance();
        Ok(property)
    }

    fn parse_arguments(&mut self) -> PResult<Vec<Expression>> {
        self.expect(&TokenKind::LeftParen)?;
        let saved = std::mem::replace(&mut self.no_in, false);
        let mut args = Vec::new();

        while !self.check(&TokenKind::RightParen) && !self.is_at_end() {
            let arg = if self.eat(&TokenKind::Ellipsis) {
                self.parse_assignment().map(|e| Expression::Spread(Box::new(e)))
            } else {
                self.parse_assignment()
            };
            let arg = match arg {
                Ok(arg) => arg,
                Err(err) => {
                    self.no_in = saved;
                    return Err(err);
                }
            };
            args.push(arg);
            if !self.check(&TokenKind::RightParen) {
                if let Err(err) = self.expect(&TokenKind::Comma) {
                    self.no_in = saved;
                    return Err(err);
                }
            }
        }

        self.no_in = saved;
        self.expect(&TokenKind::RightParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<Expression> {
        match &self.current.kind {
            TokenKind::Number(n) => {
                let literal = Literal::Number {
                    value: *n,
                    raw: self.slice(self.current.span).to_string(),
                };
                self.advance();
                Ok(Expression::Literal(literal))
            }
            TokenKind::String(s) => {
                let literal = Literal::String {
                    value: s.clone(),
                    raw: self.slice(self.current.span).to_string(),
                };
                self.advance();
                Ok(Expression::Literal(literal))
            }
            TokenKind::BigInt(digits) => {
                let literal = Literal::BigInt(digits.clone());
                self.advance();
                Ok(Expression::Literal(literal))
            }
            TokenKind::Template { .. } => Ok(Expression::Template(self.parse_template()?)),
            TokenKind::True => {
                self.advance();
                Ok(Expression::Literal(Literal::Boolean(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expression::Literal(Literal::Boolean(false)))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expression::Literal(Literal::Null))
            }
            TokenKind::Identifier(_) => Ok(Expression::Identifier(self.expect_identifier()?)),
            TokenKind::This => {
                self.advance();
                Ok(Expression::This)
            }
            TokenKind::Super => {
                self.advance();
                Ok(Expression::Super)
            }
            TokenKind::Function => Ok(Expression::Function(self.parse_function(false, false)?)),
            TokenKind::Async if self.async_function_ahead() => {
                self.advance();
                Ok(Expression::Function(self.parse_function(true, false)?))
            }
            TokenKind::Async => {
                // `async` used as a plain name
                let span = self.current.span;
                self.advance();
                Ok(Expression::Identifier(Identifier {
                    name: "async".to_string(),
                    span,
                }))
            }
            TokenKind::Class => Ok(Expression::Class(self.parse_class(false)?)),
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.with_in_allowed(Self::parse_expression)?;
                self.expect(&TokenKind::RightParen)?;
                Ok(expr)
            }
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftBrace => self.parse_object_literal(),
            TokenKind::Slash | TokenKind::SlashEqual => {
                self.current = self.scanner.rescan_regexp(self.current.span.start);
                let TokenKind::RegExp { pattern, flags } = &self.current.kind else {
                    return self.error("Unterminated regular expression");
                };
                let literal = Literal::RegExp {
                    pattern: pattern.clone(),
                    flags: flags.clone(),
                };
                self.advance();
                Ok(Expression::Literal(literal))
            }
            _ => self.unexpected(),
        }
    }

    fn parse_template(&mut self) -> PResult<TemplateLiteral> {
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();

        loop {
            let TokenKind::Template { cooked, tail } = &self.current.kind else {
                return self.unexpected();
            };
            quasis.push(cooked.clone());
            let tail = *tail;
            self.advance();
            if tail {
                break;
            }

            expressions.push(self.with_in_allowed(Self::parse_expression)?);
            if !self.check(&TokenKind::RightBrace) {
                return self.error("Expected '}' after template substitution");
            }
            self.current = self.scanner.continue_template(self.current.span.start);
        }

        Ok(TemplateLiteral {
            quasis,
            expressions,
        })
    }

    fn parse_array_literal(&mut self) -> PResult<Expression> {
        self.advance(); // consume '['
        let mut elements = Vec::new();

        while !self.check(&TokenKind::RightBracket) && !self.is_at_end() {
            if self.check(&TokenKind::Comma) {
                elements.push(None); // Hole in array
            } else if self.eat(&TokenKind::Ellipsis) {
                let spread = self.with_in_allowed(Self::parse_assignment)?;
                elements.push(Some(Expression::Spread(Box::new(spread))));
            } else {
                elements.push(Some(self.with_in_allowed(Self::parse_assignment)?));
            }

            if !self.check(&TokenKind::RightBracket) {
                self.expect(&TokenKind::Comma)?;
            }
        }

        self.expect(&TokenKind::RightBracket)?;

        Ok(Expression::Array(elements))
    }

    fn parse_object_literal(&mut self) -> PResult<Expression> {
        self.advance(); // consume '{'
        let mut members = Vec::new();

        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            if self.eat(&TokenKind::Ellipsis) {
                members.push(ObjectMember::Spread(
                    self.with_in_allowed(Self::parse_assignment)?,
                ));
            } else {
                members.push(ObjectMember::Property(self.parse_object_property()?));
            }

            if !self.check(&TokenKind::RightBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }

        self.expect(&TokenKind::RightBrace)?;

        Ok(Expression::Object(members))
    }

    fn parse_object_property(&mut self) -> PResult<Property> {
        let mut is_async = false;
        if self.check(&TokenKind::Async) && !self.modifier_is_name() {
            self.advance();
            is_async = true;
        }
        let is_generator = self.eat(&TokenKind::Star);

        let mut kind = PropertyKind::Init;
        if (self.check_identifier("get") || self.check_identifier("set")) && !self.modifier_is_name() {
            kind = if self.check_identifier("get") {
                PropertyKind::Get
            } else {
                PropertyKind::Set
            };
            self.advance();
        }

        let key = self.parse_property_key()?;

        if self.check(&TokenKind::LeftParen) {
            let value = self.parse_method_function(is_async, is_generator)?;
            return Ok(Property {
                key,
                value: Expression::Function(value),
                kind,
                shorthand: false,
                method: kind == PropertyKind::Init,
            });
        }

        if self.eat(&TokenKind::Colon) {
            let value = self.with_in_allowed(Self::parse_assignment)?;
            return Ok(Property {
                key,
                value,
                kind: PropertyKind::Init,
                shorthand: false,
                method: false,
            });
        }

        // Shorthand, possibly with a default (only valid as a pattern)
        let PropertyKey::Identifier(id) = &key else {
            return self.error("Expected ':' after property key");
        };
        let mut value = Expression::Identifier(id.clone());
        if self.eat(&TokenKind::Equal) {
            let default = self.parse_assignment()?;
            value = Expression::Assignment(AssignmentExpression {
                operator: AssignmentOperator::Assign,
                left: Box::new(Pattern::Identifier(id.clone())),
                right: Box::new(default),
            });
        }

        Ok(Property {
            key,
            value,
            kind: PropertyKind::Init,
            shorthand: true,
            method: false,
        })
    }

    /// Reinterprets an expression as an assignment target.
    fn to_pattern(&self, expr: Expression) -> PResult<Pattern> {
        match expr {
            Expression::Identifier(id) => Ok(Pattern::Identifier(id)),
            Expression::Member(_) => Ok(Pattern::Expression(Box::new(expr))),
            Expression::Object(members) => {
                let mut properties = Vec::new();
                let mut rest = None;
                for member in members {
                    match member {
                        ObjectMember::Property(property) => {
                            if property.kind != PropertyKind::Init || property.method {
                                return self.error("Invalid destructuring target");
                            }
                            properties.push(PatternProperty {
                                key: property.key,
                                value: self.to_pattern(property.value)?,
                                shorthand: property.shorthand,
                            });
                        }
                        ObjectMember::Spread(inner) => {
                            rest = Some(Box::new(self.to_pattern(inner)?));
                        }
                    }
                }
                Ok(Pattern::Object(ObjectPattern { properties, rest }))
            }
            Expression::Array(elements) => {
                let mut patterns = Vec::new();
                for element in elements {
                    patterns.push(match element {
                        None => None,
                        Some(Expression::Spread(inner)) => {
                            Some(Pattern::Rest(Box::new(self.to_pattern(*inner)?)))
                        }
                        Some(element) => Some(self.to_pattern(element)?),
                    });
                }
                Ok(Pattern::Array(patterns))
            }
            Expression::Assignment(assignment)
                if assignment.operator == AssignmentOperator::Assign =>
            {
                Ok(Pattern::Assignment(AssignmentPattern {
                    left: assignment.left,
                    right: assignment.right,
                }))
            }
            _ => self.error("Invalid assignment target"),
        }
    }

    // Helper methods

    fn without_in<T>(&mut self, parse: fn(&mut Self) -> PResult<T>) -> PResult<T> {
        let saved = std::mem::replace(&mut self.no_in, true);
        let result = parse(self);
        self.no_in = saved;
        result
    }

    fn with_in_allowed<T>(&mut self, parse: fn(&mut Self) -> PResult<T>) -> PResult<T> {
        let saved = std::mem::replace(&mut self.no_in, false);
        let result = parse(self);
        self.no_in = saved;
        result
    }

    fn async_function_ahead(&self) -> bool {
        let next = self.peek_token();
        next.kind == TokenKind::Function && !next.newline_before
    }

    fn slice(&self, span: Span) -> &'a str {
        &self.source[span.start..span.end]
    }

    fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.scanner.next_token());
    }

    fn peek_token(&self) -> Token {
        self.scanner.clone().next_token()
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek_token().kind
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn check_identifier(&self, name: &str) -> bool {
        matches!(&self.current.kind, TokenKind::Identifier(n) if n == name)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> PResult<()> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            self.error(format!(
                "Expected {:?}, found {:?}",
                kind, self.current.kind
            ))
        }
    }

    fn expect_contextual(&mut self, name: &str) -> PResult<()> {
        if self.check_identifier(name) {
            self.advance();
            Ok(())
        } else {
            self.error(format!("Expected '{}', found {:?}", name, self.current.kind))
        }
    }

    fn expect_identifier(&mut self) -> PResult<Identifier> {
        if let TokenKind::Identifier(name) = &self.current.kind {
            let id = Identifier {
                name: name.clone(),
                span: self.current.span,
            };
            self.advance();
            Ok(id)
        } else {
            self.error(format!(
                "Expected identifier, found {:?}",
                self.current.kind
            ))
        }
    }

    fn expect_string(&mut self) -> PResult<String> {
        if let TokenKind::String(value) = &self.current.kind {
            let value = value.clone();
            self.advance();
            Ok(value)
        } else {
            self.error(format!(
                "Expected module specifier, found {:?}",
                self.current.kind
            ))
        }
    }

    /// Applies automatic semicolon insertion.
    fn consume_semicolon(&mut self) -> PResult<()> {
        if self.eat(&TokenKind::Semicolon) {
            return Ok(());
        }
        if self.check(&TokenKind::RightBrace) || self.is_at_end() || self.current.newline_before {
            return Ok(());
        }
        self.error(format!("Expected ';', found {:?}", self.current.kind))
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof)
    }

    fn error<T>(&self, message: impl Into<String>) -> PResult<T> {
        let (line, column) = self.current.span.line_col(self.source);
        Err(SyntaxError {
            message: message.into(),
            line,
            column,
        })
    }

    fn unexpected<T>(&self) -> PResult<T> {
        self.error(format!("Unexpected token: {:?}", self.current.kind))
    }
}

fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Expression {
    Expression::Binary(BinaryExpression {
        operator,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn member(object: Expression, property: MemberProperty, optional: bool) -> Expression {
    Expression::Member(MemberExpression {
        object: Box::new(object),
        property,
        optional,
    })
}

fn property_key_is(key: &PropertyKey, name: &str) -> bool {
    match key {
        PropertyKey::Identifier(id) => id.name == name,
        PropertyKey::Literal(Literal::String { value, .. }) => value == name,
        _ => false,
    }
}

/// Scans past a parenthesized group (the scanner sits right after `(`) and
/// reports whether `=>` follows it on the same line.
fn paren_is_arrow_head(mut scanner: Scanner<'_>) -> bool {
    let mut depth = 1usize;
    loop {
        let token = scanner.next_token();
        match token.kind {
            TokenKind::LeftParen
            | TokenKind::LeftBracket
            | TokenKind::LeftBrace
            | TokenKind::Template { tail: false, .. } => depth += 1,
            TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => {
                depth -= 1;
                if depth == 0 {
                    if token.kind != TokenKind::RightParen {
                        return false;
                    }
                    let next = scanner.next_token();
                    return next.kind == TokenKind::Arrow && !next.newline_before;
                }
            }
            TokenKind::Eof | TokenKind::Invalid => return false,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> Program {
        let mut parser = Parser::new(src);
        parser.parse_program().unwrap()
    }

    fn parse_stmt(src: &str) -> Statement {
        parse_ok(src).body.into_iter().next().unwrap()
    }

    fn parse_expr(src: &str) -> Expression {
        match parse_stmt(src) {
            Statement::Expression(expr) => expr,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    fn parse_err(src: &str) -> SyntaxError {
        let mut parser = Parser::new(src);
        parser.parse_program().unwrap_err()
    }

    #[test]
    fn test_parse_variable_declaration() {
        let program = parse_ok("let x = 42, y;");
        let Statement::VariableDeclaration(decl) = &program.body[0] else {
            panic!("expected declaration");
        };
        assert_eq!(decl.kind, VariableKind::Let);
        assert_eq!(decl.declarations.len(), 2);
        assert!(decl.declarations[1].init.is_none());
    }

    #[test]
    fn test_automatic_semicolon_insertion() {
        let program = parse_ok("let a = 1\nlet b = 2\na + b");
        assert_eq!(program.body.len(), 3);
    }

    #[test]
    fn test_return_newline_restriction() {
        let program = parse_ok("function f() { return\n1 }");
        let Statement::FunctionDeclaration(func) = &program.body[0] else {
            panic!("expected function");
        };
        assert_eq!(func.body[0], Statement::Return(None));
        assert_eq!(func.body.len(), 2);
    }

    #[test]
    fn test_missing_semicolon_on_same_line() {
        let err = parse_err("let a = 1 let b = 2");
        assert!(err.message.contains("Expected ';'"));
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_parse_function_declaration() {
        let Statement::FunctionDeclaration(func) = parse_stmt("function add(a, b = 2) { return a + b; }")
        else {
            panic!("expected function");
        };
        assert_eq!(func.id.unwrap().name, "add");
        assert_eq!(func.params.len(), 2);
        assert!(matches!(func.params[1], Pattern::Assignment(_)));
    }

    #[test]
    fn test_operator_precedence() {
        let Expression::Binary(add) = parse_expr("1 + 2 * 3;") else {
            panic!("expected binary");
        };
        assert_eq!(add.operator, BinaryOperator::Add);
        assert!(matches!(*add.right, Expression::Binary(ref mul) if mul.operator == BinaryOperator::Multiply));
    }

    #[test]
    fn test_left_associative_chain() {
        let Expression::Binary(outer) = parse_expr("1 + 2 + x;") else {
            panic!("expected binary");
        };
        assert!(matches!(*outer.left, Expression::Binary(_)));
        assert!(matches!(*outer.right, Expression::Identifier(ref id) if id.name == "x"));
    }

    #[test]
    fn test_arrow_functions() {
        assert!(matches!(parse_expr("x => x * 2;"), Expression::Arrow(_)));
        let Expression::Arrow(arrow) = parse_expr("(a, { b }) => { return a; };") else {
            panic!("expected arrow");
        };
        assert_eq!(arrow.params.len(), 2);
        assert!(matches!(arrow.body, ArrowBody::Block(_)));
        assert!(matches!(parse_expr("(a, b);"), Expression::Sequence(_)));
        assert!(matches!(parse_expr("(a);"), Expression::Identifier(_)));
    }

    #[test]
    fn test_template_literal() {
        let Expression::Template(template) = parse_expr("`a${x + 1}b${y}`;") else {
            panic!("expected template");
        };
        assert_eq!(template.quasis, vec!["a", "b", ""]);
        assert_eq!(template.expressions.len(), 2);
    }

    #[test]
    fn test_regexp_literal() {
        let Expression::Call(call) = parse_expr("/ab+c/i.test(s);") else {
            panic!("expected call");
        };
        let Expression::Member(member) = *call.callee else {
            panic!("expected member");
        };
        assert!(matches!(
            *member.object,
            Expression::Literal(Literal::RegExp { ref pattern, .. }) if pattern == "ab+c"
        ));
    }

    #[test]
    fn test_class_declaration() {
        let Statement::ClassDeclaration(class) = parse_stmt(
            "class B extends A { constructor(x) { super(x); } get v() { return 1; } static make() {} }",
        ) else {
            panic!("expected class");
        };
        assert_eq!(class.id.unwrap().name, "B");
        assert!(class.super_class.is_some());
        let kinds: Vec<_> = class
            .body
            .iter()
            .map(|m| match m {
                ClassMember::Method(m) => (m.kind, m.is_static),
                ClassMember::Property(_) => panic!("unexpected field"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                (MethodKind::Constructor, false),
                (MethodKind::Get, false),
                (MethodKind::Method, true)
            ]
        );
    }

    #[test]
    fn test_import_forms() {
        let program = parse_ok(
            "import a from './a'\nimport { b, c as d } from './b'\nimport * as ns from 'pkg'\nimport './side'",
        );
        let Statement::Import(first) = &program.body[0] else {
            panic!("expected import");
        };
        assert_eq!(first.source, "./a");
        assert!(matches!(first.specifiers[0], ImportSpecifier::Default(_)));
        let Statement::Import(second) = &program.body[1] else {
            panic!("expected import");
        };
        assert!(matches!(
            &second.specifiers[1],
            ImportSpecifier::Named { imported, local } if imported == "c" && local.name == "d"
        ));
        let Statement::Import(fourth) = &program.body[3] else {
            panic!("expected import");
        };
        assert!(fourth.specifiers.is_empty());
    }

    #[test]
    fn test_export_forms() {
        let program = parse_ok(
            "export const x = 1;\nexport { x as y } from './m';\nexport * from './all';\nexport default function () {}",
        );
        assert!(matches!(&program.body[0], Statement::ExportNamed(e) if e.declaration.is_some()));
        assert!(matches!(
            &program.body[1],
            Statement::ExportNamed(e) if e.source.as_deref() == Some("./m") && e.specifiers[0].exported == "y"
        ));
        assert!(matches!(&program.body[2], Statement::ExportAll(e) if e.source == "./all"));
        assert!(matches!(
            &program.body[3],
            Statement::ExportDefault(ExportDefaultDeclaration::Function(f)) if f.id.is_none()
        ));
    }

    #[test]
    fn test_object_destructuring() {
        let Statement::VariableDeclaration(decl) = parse_stmt("const { a, b: c, d = 1 } = obj;") else {
            panic!("expected declaration");
        };
        let Pattern::Object(pattern) = &decl.declarations[0].id else {
            panic!("expected object pattern");
        };
        assert_eq!(pattern.properties.len(), 3);
        assert!(pattern.properties[0].shorthand);
        assert!(matches!(pattern.properties[2].value, Pattern::Assignment(_)));
    }

    #[test]
    fn test_assignment_destructuring() {
        let Expression::Assignment(assign) = parse_expr("({ a, b } = obj);") else {
            panic!("expected assignment");
        };
        assert!(matches!(*assign.left, Pattern::Object(_)));
    }

    #[test]
    fn test_for_variants() {
        assert!(matches!(parse_stmt("for (let i = 0; i < 3; i++) {}"), Statement::For(_)));
        assert!(matches!(parse_stmt("for (const k in obj) {}"), Statement::ForIn(_)));
        assert!(matches!(parse_stmt("for (const v of list) {}"), Statement::ForOf(_)));
        assert!(matches!(parse_stmt("for (;;) break;"), Statement::For(_)));
    }

    #[test]
    fn test_labeled_break() {
        let Statement::Labeled(labeled) = parse_stmt("outer: while (true) { break outer; }") else {
            panic!("expected label");
        };
        assert_eq!(labeled.label.name, "outer");
    }

    #[test]
    fn test_keyword_property_names() {
        assert!(matches!(parse_expr("promise.catch(f).default;"), Expression::Member(_)));
        assert!(matches!(parse_expr("({ default: 1, new: 2 });"), Expression::Object(_)));
    }

    #[test]
    fn test_new_expression() {
        let Expression::New(new) = parse_expr("new a.B(1, 2);") else {
            panic!("expected new");
        };
        assert!(matches!(*new.callee, Expression::Member(_)));
        assert_eq!(new.arguments.len(), 2);
    }

    #[test]
    fn test_try_requires_handler() {
        let err = parse_err("try {}");
        assert!(err.message.contains("catch or finally"));
    }

    #[test]
    fn test_error_position() {
        let err = parse_err("let a = 1;\nlet = 2;");
        assert_eq!(err.line, 2);
    }
}
