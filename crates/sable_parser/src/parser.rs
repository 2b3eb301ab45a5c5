//! The Sable parser implementation.
//!
//! A recursive descent parser that consumes tokens from the scanner and builds
//! an arena-allocated syntax tree. Syntax errors are reported as diagnostics;
//! the parser always produces a tree.

use bumpalo::Bump;
use sable_core::text::TextSpan;
use sable_diagnostics::{messages, DiagnosticBag, DiagnosticMessage};
use sable_scanner::Scanner;
use sable_syntax::node::*;
use sable_syntax::SyntaxKind;

use crate::precedence::{get_binary_operator_precedence, OperatorPrecedence};

/// Maximum recursion depth to prevent stack overflow on deeply nested input.
const MAX_RECURSION_DEPTH: u32 = 200;

/// Move a Vec into the arena as a slice.
fn alloc_vec_in<T>(arena: &Bump, vec: Vec<T>) -> &[T] {
    if vec.is_empty() {
        return &[];
    }
    arena.alloc_slice_fill_iter(vec)
}

/// The parser produces a `CompilationUnit` from Sable source text.
pub struct Parser<'a> {
    arena: &'a Bump,
    scanner: Scanner,
    file_name: String,
    source_text: String,
    diagnostics: DiagnosticBag,
    /// Tracks recursion depth to prevent stack overflow on deeply nested input.
    recursion_depth: u32,
    /// End of the most recently consumed token.
    last_token_end: u32,
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a Bump, file_name: &str, source_text: &str) -> Self {
        Self {
            arena,
            scanner: Scanner::new(source_text),
            file_name: file_name.to_string(),
            source_text: source_text.to_string(),
            diagnostics: DiagnosticBag::new(),
            recursion_depth: 0,
            last_token_end: 0,
        }
    }

    pub fn parse_compilation_unit(&mut self) -> CompilationUnit<'a> {
        self.next_token();
        let mut statements = Vec::new();
        while self.current_token() != SyntaxKind::EndOfFileToken {
            let saved_pos = self.scanner.token_start();
            statements.push(self.parse_statement());
            if self.scanner.token_start() == saved_pos {
                // A stray `}` at file level can't start a statement; skip it.
                self.next_token();
                self.skip_to_next_statement();
            }
        }
        let end = self.source_text.len() as u32;
        CompilationUnit {
            data: NodeData::new(SyntaxKind::CompilationUnit, 0, end),
            statements: alloc_vec_in(self.arena, statements),
            file_name: self.file_name.clone(),
            text: self.source_text.clone(),
        }
    }

    /// Lexical and syntactic diagnostics, lexical first.
    pub fn take_diagnostics(&mut self) -> DiagnosticBag {
        let mut diagnostics = self.scanner.take_diagnostics();
        diagnostics.extend(std::mem::take(&mut self.diagnostics));
        diagnostics
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn current_token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    #[inline]
    fn next_token(&mut self) -> SyntaxKind {
        self.last_token_end = self.scanner.token_end() as u32;
        self.scanner.scan()
    }

    #[inline]
    fn token_pos(&self) -> u32 {
        self.scanner.token_start() as u32
    }

    #[inline]
    fn token_end(&self) -> u32 {
        self.scanner.token_end() as u32
    }

    /// The kind of the token after the current one.
    fn peek_token(&mut self) -> SyntaxKind {
        self.scanner.look_ahead(|s| s.scan())
    }

    fn node(&self, kind: SyntaxKind, pos: u32) -> NodeData {
        NodeData::new(kind, pos, self.last_token_end.max(pos))
    }

    fn error(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        let span = self.scanner.token_span();
        self.diagnostics.report(span, message, args);
    }

    fn report_unexpected(&mut self, expected: SyntaxKind) {
        let actual = self.current_token().display_name();
        self.error(&messages::UNEXPECTED_TOKEN_0_EXPECTED_1, &[actual, expected.display_name()]);
    }

    /// Consume the expected token, or report it missing and leave the stream untouched.
    fn expect_token(&mut self, kind: SyntaxKind) -> TextSpan {
        if self.current_token() == kind {
            let span = self.scanner.token_span();
            self.next_token();
            span
        } else {
            self.report_unexpected(kind);
            TextSpan::empty(self.token_pos())
        }
    }

    fn optional_token(&mut self, kind: SyntaxKind) -> bool {
        if self.current_token() == kind {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn parse_identifier(&mut self) -> Identifier<'a> {
        let pos = self.token_pos();
        if self.current_token() == SyntaxKind::Identifier {
            let text = self.arena.alloc_str(self.scanner.token_value());
            let end = self.token_end();
            self.next_token();
            Identifier {
                data: NodeData::new(SyntaxKind::Identifier, pos, end),
                text,
            }
        } else {
            self.report_unexpected(SyntaxKind::Identifier);
            Identifier {
                data: NodeData::new(SyntaxKind::Identifier, pos, pos),
                text: "",
            }
        }
    }

    fn parse_qualified_name(&mut self) -> QualifiedName<'a> {
        let pos = self.token_pos();
        let mut segments = vec![self.parse_identifier()];
        while self.current_token() == SyntaxKind::DotToken {
            self.next_token();
            segments.push(self.parse_identifier());
        }
        QualifiedName {
            data: self.node(SyntaxKind::QualifiedName, pos),
            segments: alloc_vec_in(self.arena, segments),
        }
    }

    /// Parse a type keyword followed by `[]` pairs.
    fn parse_type(&mut self) -> TypeReference {
        let pos = self.token_pos();
        let keyword = self.current_token();
        if keyword.is_type_keyword() {
            self.next_token();
        } else {
            self.error(&messages::TYPE_EXPECTED, &[]);
        }
        let mut rank = 0;
        while self.current_token() == SyntaxKind::OpenBracketToken
            && self.peek_token() == SyntaxKind::CloseBracketToken
        {
            self.next_token();
            self.next_token();
            rank += 1;
        }
        TypeReference {
            data: self.node(SyntaxKind::TypeReference, pos),
            keyword: if keyword.is_type_keyword() { keyword } else { SyntaxKind::ObjectKeyword },
            rank,
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_statement_list(&mut self) -> &'a [Statement<'a>] {
        let mut statements = Vec::new();
        while self.current_token() != SyntaxKind::EndOfFileToken
            && self.current_token() != SyntaxKind::CloseBraceToken
        {
            let saved_pos = self.scanner.token_start();
            statements.push(self.parse_statement());

            // Error recovery: if the parser hasn't advanced past the same position,
            // skip forward to the next statement-starting token to avoid infinite loops.
            if self.scanner.token_start() == saved_pos {
                self.next_token();
                self.skip_to_next_statement();
            }
        }
        alloc_vec_in(self.arena, statements)
    }

    /// Error recovery: skip tokens until we find one that can start a new statement.
    fn skip_to_next_statement(&mut self) {
        while self.current_token() != SyntaxKind::EndOfFileToken {
            match self.current_token() {
                SyntaxKind::VarKeyword
                | SyntaxKind::SetKeyword
                | SyntaxKind::IfKeyword
                | SyntaxKind::WhileKeyword
                | SyntaxKind::ForKeyword
                | SyntaxKind::ReturnKeyword
                | SyntaxKind::BreakKeyword
                | SyntaxKind::ContinueKeyword
                | SyntaxKind::GotoKeyword
                | SyntaxKind::NamespaceKeyword
                | SyntaxKind::WithKeyword
                | SyntaxKind::OpenBraceToken
                | SyntaxKind::CloseBraceToken => return,
                SyntaxKind::SemicolonToken => {
                    self.next_token();
                    return;
                }
                _ => {
                    self.next_token();
                }
            }
        }
    }

    fn parse_statement(&mut self) -> Statement<'a> {
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            self.error(&messages::EXPRESSION_EXPECTED, &[]);
            let pos = self.token_pos();
            self.skip_to_next_statement();
            return Statement::Empty(self.node(SyntaxKind::EmptyStatement, pos));
        }
        self.recursion_depth += 1;
        let statement = self.parse_statement_worker();
        self.recursion_depth -= 1;
        statement
    }

    fn parse_statement_worker(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        match self.current_token() {
            SyntaxKind::SemicolonToken => {
                self.next_token();
                Statement::Empty(self.node(SyntaxKind::EmptyStatement, pos))
            }
            SyntaxKind::OpenBraceToken => Statement::Block(self.parse_block()),
            SyntaxKind::VarKeyword => {
                self.next_token();
                let name = self.parse_identifier();
                if self.current_token() == SyntaxKind::OpenParenToken {
                    self.parse_method_declaration(pos, None, name)
                } else {
                    self.parse_variable_declaration(pos, DeclarationKeyword::Var, name)
                }
            }
            SyntaxKind::SetKeyword => {
                self.next_token();
                let name = self.parse_identifier();
                self.parse_variable_declaration(pos, DeclarationKeyword::Set, name)
            }
            kind if kind.is_type_keyword() => {
                let ty = self.parse_type();
                let name = self.parse_identifier();
                if self.current_token() == SyntaxKind::OpenParenToken {
                    self.parse_method_declaration(pos, Some(ty), name)
                } else {
                    self.parse_variable_declaration(pos, DeclarationKeyword::Typed(ty), name)
                }
            }
            SyntaxKind::NamespaceKeyword => self.parse_namespace_declaration(),
            SyntaxKind::WithKeyword => self.parse_with_declaration(),
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::BreakKeyword => {
                self.next_token();
                self.expect_token(SyntaxKind::SemicolonToken);
                Statement::Break(self.node(SyntaxKind::BreakStatement, pos))
            }
            SyntaxKind::ContinueKeyword => {
                self.next_token();
                self.expect_token(SyntaxKind::SemicolonToken);
                Statement::Continue(self.node(SyntaxKind::ContinueStatement, pos))
            }
            SyntaxKind::ReturnKeyword => {
                self.next_token();
                let expression = if self.current_token() == SyntaxKind::SemicolonToken {
                    None
                } else {
                    Some(self.parse_expression_and_alloc())
                };
                self.expect_token(SyntaxKind::SemicolonToken);
                Statement::Return(ReturnStatement {
                    data: self.node(SyntaxKind::ReturnStatement, pos),
                    expression,
                })
            }
            SyntaxKind::GotoKeyword => {
                self.next_token();
                let label = self.parse_identifier();
                self.expect_token(SyntaxKind::SemicolonToken);
                Statement::Goto(GotoStatement {
                    data: self.node(SyntaxKind::GotoStatement, pos),
                    label,
                })
            }
            SyntaxKind::Identifier if self.peek_token() == SyntaxKind::ColonToken => {
                let label = self.parse_identifier();
                self.next_token();
                Statement::Label(LabelStatement {
                    data: self.node(SyntaxKind::LabelStatement, pos),
                    label,
                })
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_block(&mut self) -> Block<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken);
        let statements = self.parse_statement_list();
        self.expect_token(SyntaxKind::CloseBraceToken);
        Block {
            data: self.node(SyntaxKind::Block, pos),
            statements,
        }
    }

    fn parse_variable_declaration(
        &mut self,
        pos: u32,
        keyword: DeclarationKeyword,
        name: Identifier<'a>,
    ) -> Statement<'a> {
        self.expect_token(SyntaxKind::EqualsToken);
        let initializer = self.parse_expression_and_alloc();
        self.expect_token(SyntaxKind::SemicolonToken);
        Statement::VariableDeclaration(VariableDeclaration {
            data: self.node(SyntaxKind::VariableDeclaration, pos),
            keyword,
            name,
            initializer,
        })
    }

    fn parse_method_declaration(
        &mut self,
        pos: u32,
        return_type: Option<TypeReference>,
        name: Identifier<'a>,
    ) -> Statement<'a> {
        self.expect_token(SyntaxKind::OpenParenToken);
        let mut parameters = Vec::new();
        if self.current_token() != SyntaxKind::CloseParenToken {
            loop {
                let param_pos = self.token_pos();
                let ty = self.parse_type();
                let param_name = self.parse_identifier();
                parameters.push(Parameter {
                    data: self.node(SyntaxKind::Parameter, param_pos),
                    ty,
                    name: param_name,
                });
                if !self.optional_token(SyntaxKind::CommaToken) {
                    break;
                }
            }
        }
        self.expect_token(SyntaxKind::CloseParenToken);
        let body = self.parse_block();
        Statement::MethodDeclaration(MethodDeclaration {
            data: self.node(SyntaxKind::MethodDeclaration, pos),
            return_type,
            name,
            parameters: alloc_vec_in(self.arena, parameters),
            body: self.arena.alloc(body),
        })
    }

    /// `;` (simple form) or a braced statement list.
    fn parse_declaration_body(&mut self) -> Option<&'a [Statement<'a>]> {
        if self.optional_token(SyntaxKind::SemicolonToken) {
            return None;
        }
        self.expect_token(SyntaxKind::OpenBraceToken);
        let statements = self.parse_statement_list();
        self.expect_token(SyntaxKind::CloseBraceToken);
        Some(statements)
    }

    fn parse_namespace_declaration(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::NamespaceKeyword);
        let name = self.parse_qualified_name();
        let body = self.parse_declaration_body();
        Statement::NamespaceDeclaration(NamespaceDeclaration {
            data: self.node(SyntaxKind::NamespaceDeclaration, pos),
            name,
            body,
        })
    }

    fn parse_with_declaration(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::WithKeyword);
        let alias = if self.current_token() == SyntaxKind::Identifier
            && self.peek_token() == SyntaxKind::EqualsToken
        {
            let alias = self.parse_identifier();
            self.next_token();
            Some(alias)
        } else {
            None
        };
        let name = self.parse_qualified_name();
        let body = self.parse_declaration_body();
        Statement::WithDeclaration(WithDeclaration {
            data: self.node(SyntaxKind::WithDeclaration, pos),
            alias,
            name,
            body,
        })
    }

    fn parse_parenthesized_condition(&mut self) -> &'a Expression<'a> {
        self.expect_token(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression_and_alloc();
        self.expect_token(SyntaxKind::CloseParenToken);
        condition
    }

    fn parse_statement_and_alloc(&mut self) -> &'a Statement<'a> {
        let statement = self.parse_statement();
        self.arena.alloc(statement)
    }

    fn parse_if_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::IfKeyword);
        let condition = self.parse_parenthesized_condition();
        let then_statement = self.parse_statement_and_alloc();
        let else_statement = if self.optional_token(SyntaxKind::ElseKeyword) {
            Some(self.parse_statement_and_alloc())
        } else {
            None
        };
        Statement::If(IfStatement {
            data: self.node(SyntaxKind::IfStatement, pos),
            condition,
            then_statement,
            else_statement,
        })
    }

    fn parse_while_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::WhileKeyword);
        let condition = self.parse_parenthesized_condition();
        let body = self.parse_statement_and_alloc();
        Statement::While(WhileStatement {
            data: self.node(SyntaxKind::WhileStatement, pos),
            condition,
            body,
        })
    }

    fn parse_for_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::ForKeyword);
        self.expect_token(SyntaxKind::OpenParenToken);

        let initializer = match self.current_token() {
            SyntaxKind::SemicolonToken => {
                self.next_token();
                None
            }
            kind if kind == SyntaxKind::VarKeyword
                || kind == SyntaxKind::SetKeyword
                || kind.is_type_keyword() =>
            {
                Some(self.parse_statement_and_alloc())
            }
            _ => {
                let statement = self.parse_expression_statement();
                Some(&*self.arena.alloc(statement))
            }
        };

        let condition = if self.current_token() == SyntaxKind::SemicolonToken {
            None
        } else {
            Some(self.parse_expression_and_alloc())
        };
        self.expect_token(SyntaxKind::SemicolonToken);

        let incrementor = if self.current_token() == SyntaxKind::CloseParenToken {
            None
        } else {
            Some(self.parse_expression_and_alloc())
        };
        self.expect_token(SyntaxKind::CloseParenToken);

        let body = self.parse_statement_and_alloc();
        Statement::For(ForStatement {
            data: self.node(SyntaxKind::ForStatement, pos),
            initializer,
            condition,
            incrementor,
            body,
        })
    }

    fn parse_expression_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        let expression = self.parse_expression_and_alloc();
        self.expect_token(SyntaxKind::SemicolonToken);
        Statement::Expression(ExpressionStatement {
            data: self.node(SyntaxKind::ExpressionStatement, pos),
            expression,
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expression_and_alloc(&mut self) -> &'a Expression<'a> {
        let expression = self.parse_expression();
        self.arena.alloc(expression)
    }

    fn parse_expression(&mut self) -> Expression<'a> {
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            self.error(&messages::EXPRESSION_EXPECTED, &[]);
            return self.missing_expression();
        }
        self.recursion_depth += 1;
        let expression = self.parse_assignment_expression();
        self.recursion_depth -= 1;
        expression
    }

    fn missing_expression(&self) -> Expression<'a> {
        let pos = self.token_pos();
        Expression::Name(Identifier {
            data: NodeData::new(SyntaxKind::Identifier, pos, pos),
            text: "",
        })
    }

    fn parse_assignment_expression(&mut self) -> Expression<'a> {
        if self.current_token() == SyntaxKind::Identifier && self.peek_token().is_assignment_operator() {
            let pos = self.token_pos();
            let name = self.parse_identifier();
            let operator = self.current_token();
            let operator_span = self.scanner.token_span();
            self.next_token();
            let value = self.parse_expression_and_alloc();
            return Expression::Assignment(AssignmentExpression {
                data: self.node(SyntaxKind::AssignmentExpression, pos),
                name,
                operator,
                operator_span,
                value,
            });
        }
        self.parse_pipe_expression()
    }

    fn parse_pipe_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        let mut left = self.parse_binary_expression(OperatorPrecedence::Lowest);
        while self.current_token() == SyntaxKind::BarGreaterThanToken {
            self.next_token();
            let right = self.parse_unary_expression();
            match right {
                Expression::Call(call) => {
                    left = Expression::Pipe(PipeExpression {
                        data: self.node(SyntaxKind::PipeExpression, pos),
                        left: self.arena.alloc(left),
                        call: self.arena.alloc(call),
                    });
                }
                other => {
                    self.diagnostics.report(other.span(), &messages::A_PIPE_MUST_BE_FOLLOWED_BY_A_CALL, &[]);
                    left = other;
                }
            }
        }
        left
    }

    fn parse_binary_expression(&mut self, precedence: OperatorPrecedence) -> Expression<'a> {
        let pos = self.token_pos();
        let mut left = self.parse_unary_expression();
        loop {
            let operator = self.current_token();
            let new_precedence = get_binary_operator_precedence(operator);
            if new_precedence == OperatorPrecedence::Invalid || new_precedence <= precedence {
                break;
            }
            let operator_span = self.scanner.token_span();
            self.next_token();
            let right = self.parse_binary_expression(new_precedence);
            left = Expression::Binary(BinaryExpression {
                data: self.node(SyntaxKind::BinaryExpression, pos),
                left: self.arena.alloc(left),
                operator,
                operator_span,
                right: self.arena.alloc(right),
            });
        }
        left
    }

    fn parse_unary_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        match self.current_token() {
            SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::TildeToken
            | SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken => {
                let operator = self.current_token();
                let operator_span = self.scanner.token_span();
                self.next_token();
                let operand = self.parse_unary_expression();
                Expression::PrefixUnary(UnaryExpression {
                    data: self.node(SyntaxKind::PrefixUnaryExpression, pos),
                    operator,
                    operator_span,
                    operand: self.arena.alloc(operand),
                })
            }
            SyntaxKind::OpenParenToken if self.peek_token().is_type_keyword() => {
                self.next_token();
                let ty = self.parse_type();
                self.expect_token(SyntaxKind::CloseParenToken);
                let expression = self.parse_unary_expression();
                Expression::Cast(CastExpression {
                    data: self.node(SyntaxKind::CastExpression, pos),
                    ty,
                    expression: self.arena.alloc(expression),
                })
            }
            _ => self.parse_postfix_expression(),
        }
    }

    fn parse_postfix_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        let mut expression = self.parse_primary_expression();
        while matches!(self.current_token(), SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken) {
            let operator = self.current_token();
            let operator_span = self.scanner.token_span();
            self.next_token();
            expression = Expression::PostfixUnary(UnaryExpression {
                data: self.node(SyntaxKind::PostfixUnaryExpression, pos),
                operator,
                operator_span,
                operand: self.arena.alloc(expression),
            });
        }
        expression
    }

    fn parse_primary_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        let value = match self.current_token() {
            SyntaxKind::TrueKeyword => LiteralValue::Bool(true),
            SyntaxKind::FalseKeyword => LiteralValue::Bool(false),
            SyntaxKind::IntLiteral => LiteralValue::Int(self.scanner.token_value().parse().unwrap_or(0)),
            SyntaxKind::FloatLiteral => LiteralValue::Float(self.scanner.token_value().parse().unwrap_or(0.0)),
            SyntaxKind::StringLiteral => LiteralValue::String(self.arena.alloc_str(self.scanner.token_value())),
            SyntaxKind::CharLiteral => LiteralValue::Char(self.scanner.token_value().chars().next().unwrap_or('\0')),
            SyntaxKind::UnderscoreToken => {
                self.next_token();
                return Expression::Placeholder(self.node(SyntaxKind::PlaceholderExpression, pos));
            }
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let expression = self.parse_expression_and_alloc();
                self.expect_token(SyntaxKind::CloseParenToken);
                return Expression::Parenthesized(ParenthesizedExpression {
                    data: self.node(SyntaxKind::ParenthesizedExpression, pos),
                    expression,
                });
            }
            SyntaxKind::NewKeyword => return self.parse_array_creation(),
            SyntaxKind::Identifier => return self.parse_name_or_call(),
            _ => {
                self.error(&messages::EXPRESSION_EXPECTED, &[]);
                return self.missing_expression();
            }
        };
        self.next_token();
        Expression::Literal(LiteralExpression {
            data: self.node(SyntaxKind::LiteralExpression, pos),
            value,
        })
    }

    fn parse_name_or_call(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        let callee = self.parse_qualified_name();
        if self.current_token() != SyntaxKind::OpenParenToken {
            if callee.segments.len() > 1 {
                self.report_unexpected(SyntaxKind::OpenParenToken);
            }
            return Expression::Name(*callee.last());
        }
        self.next_token();
        let mut arguments = Vec::new();
        if self.current_token() != SyntaxKind::CloseParenToken {
            loop {
                arguments.push(self.parse_expression());
                if !self.optional_token(SyntaxKind::CommaToken) {
                    break;
                }
            }
        }
        self.expect_token(SyntaxKind::CloseParenToken);
        Expression::Call(CallExpression {
            data: self.node(SyntaxKind::CallExpression, pos),
            callee,
            arguments: alloc_vec_in(self.arena, arguments),
        })
    }

    /// `new T[]...[size] { ... }`: every bracket group but the last adds array rank.
    fn parse_array_creation(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::NewKeyword);

        let type_pos = self.token_pos();
        let keyword = self.current_token();
        let has_type = keyword.is_type_keyword();
        if has_type {
            self.next_token();
        }

        let mut groups = Vec::new();
        loop {
            self.expect_token(SyntaxKind::OpenBracketToken);
            let size = if self.current_token() == SyntaxKind::CloseBracketToken {
                None
            } else {
                Some(self.parse_expression_and_alloc())
            };
            self.expect_token(SyntaxKind::CloseBracketToken);
            groups.push(size);
            if self.current_token() != SyntaxKind::OpenBracketToken {
                break;
            }
        }
        let size = groups.pop().flatten();
        let rank = groups.len() as u32;
        let item_type = has_type.then(|| TypeReference {
            data: NodeData::new(SyntaxKind::TypeReference, type_pos, self.last_token_end),
            keyword,
            rank,
        });

        self.expect_token(SyntaxKind::OpenBraceToken);
        let initializer = if self.current_token() == SyntaxKind::Identifier
            && self.peek_token() == SyntaxKind::EqualsGreaterThanToken
        {
            let parameter = self.parse_identifier();
            self.next_token();
            let body = self.parse_expression_and_alloc();
            ArrayInitializer::Generator { parameter, body }
        } else {
            let mut items = Vec::new();
            if self.current_token() != SyntaxKind::CloseBraceToken {
                loop {
                    items.push(self.parse_expression());
                    if !self.optional_token(SyntaxKind::CommaToken) {
                        break;
                    }
                }
            }
            ArrayInitializer::Items(alloc_vec_in(self.arena, items))
        };
        self.expect_token(SyntaxKind::CloseBraceToken);

        Expression::ArrayCreation(ArrayCreationExpression {
            data: self.node(SyntaxKind::ArrayCreationExpression, pos),
            item_type,
            size,
            initializer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_errors(source: &str) -> Vec<String> {
        let arena = Bump::new();
        let mut parser = Parser::new(&arena, "test.sb", source);
        parser.parse_compilation_unit();
        parser
            .take_diagnostics()
            .into_iter()
            .map(|d| d.message_text)
            .collect()
    }

    #[test]
    fn test_missing_semicolon() {
        assert_eq!(
            parse_errors("var x = 1"),
            vec!["Unexpected token <end of file>, expected <;>."]
        );
    }

    #[test]
    fn test_pipe_requires_call() {
        assert_eq!(
            parse_errors("var x = 1 |> 2;"),
            vec!["The right-hand side of '|>' must be a method call."]
        );
    }

    #[test]
    fn test_binary_precedence() {
        let arena = Bump::new();
        let mut parser = Parser::new(&arena, "test.sb", "1 + 2 * 3;");
        let unit = parser.parse_compilation_unit();
        let Statement::Expression(statement) = &unit.statements[0] else {
            panic!("expected expression statement");
        };
        let Expression::Binary(binary) = statement.expression else {
            panic!("expected binary expression");
        };
        assert_eq!(binary.operator, SyntaxKind::PlusToken);
        assert!(matches!(binary.right, Expression::Binary(b) if b.operator == SyntaxKind::AsteriskToken));
    }

    #[test]
    fn test_spans_exclude_trailing_trivia() {
        let arena = Bump::new();
        let mut parser = Parser::new(&arena, "test.sb", "var a = 0;   ");
        let unit = parser.parse_compilation_unit();
        assert_eq!(unit.statements[0].span(), TextSpan::new(0, 10));
    }
}
