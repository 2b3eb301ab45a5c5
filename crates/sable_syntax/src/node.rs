//! Syntax tree node definitions.
//!
//! Nodes are allocated in a `bumpalo` arena owned by the caller and reference
//! their children through arena references. The tree is immutable once parsed.

use crate::syntax_kind::SyntaxKind;
use sable_core::text::TextSpan;

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// Common data shared by all syntax nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeData {
    /// The kind of this node.
    pub kind: SyntaxKind,
    /// Source span of the whole node.
    pub span: TextSpan,
}

impl NodeData {
    pub fn new(kind: SyntaxKind, pos: u32, end: u32) -> Self {
        Self {
            kind,
            span: TextSpan::from_bounds(pos, end),
        }
    }
}

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

/// An optional arena-allocated node.
pub type OptionalNode<'a, T> = Option<&'a T>;

// ============================================================================
// Compilation Unit
// ============================================================================

#[derive(Debug)]
pub struct CompilationUnit<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
    pub file_name: String,
    pub text: String,
}

// ============================================================================
// Names and types
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Identifier<'a> {
    pub data: NodeData,
    pub text: &'a str,
}

impl<'a> Identifier<'a> {
    #[inline]
    pub fn span(&self) -> TextSpan {
        self.data.span
    }
}

/// A dotted name such as `A.B.C`.
#[derive(Debug)]
pub struct QualifiedName<'a> {
    pub data: NodeData,
    pub segments: NodeList<'a, Identifier<'a>>,
}

impl<'a> QualifiedName<'a> {
    /// The last segment, i.e. the simple name.
    pub fn last(&self) -> &Identifier<'a> {
        &self.segments[self.segments.len() - 1]
    }

    /// All segments but the last.
    pub fn qualifier(&self) -> &[Identifier<'a>] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The canonical dotted text.
    pub fn text(&self) -> String {
        join_segments(self.segments)
    }
}

/// Join identifier segments with `.`.
pub fn join_segments(segments: &[Identifier<'_>]) -> String {
    let mut result = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            result.push('.');
        }
        result.push_str(segment.text);
    }
    result
}

/// A type reference: a type keyword followed by zero or more `[]`.
#[derive(Debug, Clone, Copy)]
pub struct TypeReference {
    pub data: NodeData,
    /// One of the type keywords (`ObjectKeyword` .. `VoidKeyword`).
    pub keyword: SyntaxKind,
    /// Number of `[]` suffixes.
    pub rank: u32,
}

#[derive(Debug)]
pub struct Parameter<'a> {
    pub data: NodeData,
    pub ty: TypeReference,
    pub name: Identifier<'a>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug)]
pub enum Statement<'a> {
    Block(Block<'a>),
    VariableDeclaration(VariableDeclaration<'a>),
    MethodDeclaration(MethodDeclaration<'a>),
    NamespaceDeclaration(NamespaceDeclaration<'a>),
    WithDeclaration(WithDeclaration<'a>),
    If(IfStatement<'a>),
    While(WhileStatement<'a>),
    For(ForStatement<'a>),
    Break(NodeData),
    Continue(NodeData),
    Return(ReturnStatement<'a>),
    Goto(GotoStatement<'a>),
    Label(LabelStatement<'a>),
    Expression(ExpressionStatement<'a>),
    Empty(NodeData),
}

impl<'a> Statement<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Statement::Block(n) => &n.data,
            Statement::VariableDeclaration(n) => &n.data,
            Statement::MethodDeclaration(n) => &n.data,
            Statement::NamespaceDeclaration(n) => &n.data,
            Statement::WithDeclaration(n) => &n.data,
            Statement::If(n) => &n.data,
            Statement::While(n) => &n.data,
            Statement::For(n) => &n.data,
            Statement::Break(data) | Statement::Continue(data) | Statement::Empty(data) => data,
            Statement::Return(n) => &n.data,
            Statement::Goto(n) => &n.data,
            Statement::Label(n) => &n.data,
            Statement::Expression(n) => &n.data,
        }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    #[inline]
    pub fn span(&self) -> TextSpan {
        self.data().span
    }
}

#[derive(Debug)]
pub struct Block<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
}

/// How a variable declaration introduces its variable.
#[derive(Debug, Clone, Copy)]
pub enum DeclarationKeyword {
    /// `var x = ...`: mutable, type inferred.
    Var,
    /// `set x = ...`: read-only, type inferred.
    Set,
    /// `int x = ...`: mutable, explicit type.
    Typed(TypeReference),
}

#[derive(Debug)]
pub struct VariableDeclaration<'a> {
    pub data: NodeData,
    pub keyword: DeclarationKeyword,
    pub name: Identifier<'a>,
    pub initializer: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct MethodDeclaration<'a> {
    pub data: NodeData,
    /// `None` when declared with `var`, i.e. an implicit return type.
    pub return_type: Option<TypeReference>,
    pub name: Identifier<'a>,
    pub parameters: NodeList<'a, Parameter<'a>>,
    pub body: &'a Block<'a>,
}

#[derive(Debug)]
pub struct NamespaceDeclaration<'a> {
    pub data: NodeData,
    pub name: QualifiedName<'a>,
    /// `None` for the simple `namespace A.B;` form.
    pub body: Option<NodeList<'a, Statement<'a>>>,
}

#[derive(Debug)]
pub struct WithDeclaration<'a> {
    pub data: NodeData,
    pub alias: Option<Identifier<'a>>,
    pub name: QualifiedName<'a>,
    /// `None` for the `with A.B;` form that applies to the rest of the enclosing list.
    pub body: Option<NodeList<'a, Statement<'a>>>,
}

#[derive(Debug)]
pub struct IfStatement<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub then_statement: &'a Statement<'a>,
    pub else_statement: OptionalNode<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct WhileStatement<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct ForStatement<'a> {
    pub data: NodeData,
    pub initializer: OptionalNode<'a, Statement<'a>>,
    pub condition: OptionalNode<'a, Expression<'a>>,
    pub incrementor: OptionalNode<'a, Expression<'a>>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct ReturnStatement<'a> {
    pub data: NodeData,
    pub expression: OptionalNode<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct GotoStatement<'a> {
    pub data: NodeData,
    pub label: Identifier<'a>,
}

#[derive(Debug)]
pub struct LabelStatement<'a> {
    pub data: NodeData,
    pub label: Identifier<'a>,
}

#[derive(Debug)]
pub struct ExpressionStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug)]
pub enum Expression<'a> {
    Literal(LiteralExpression<'a>),
    Name(Identifier<'a>),
    Placeholder(NodeData),
    Parenthesized(ParenthesizedExpression<'a>),
    Assignment(AssignmentExpression<'a>),
    PrefixUnary(UnaryExpression<'a>),
    PostfixUnary(UnaryExpression<'a>),
    Binary(BinaryExpression<'a>),
    Cast(CastExpression<'a>),
    Call(CallExpression<'a>),
    Pipe(PipeExpression<'a>),
    ArrayCreation(ArrayCreationExpression<'a>),
}

impl<'a> Expression<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Expression::Literal(n) => &n.data,
            Expression::Name(n) => &n.data,
            Expression::Placeholder(data) => data,
            Expression::Parenthesized(n) => &n.data,
            Expression::Assignment(n) => &n.data,
            Expression::PrefixUnary(n) | Expression::PostfixUnary(n) => &n.data,
            Expression::Binary(n) => &n.data,
            Expression::Cast(n) => &n.data,
            Expression::Call(n) => &n.data,
            Expression::Pipe(n) => &n.data,
            Expression::ArrayCreation(n) => &n.data,
        }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    #[inline]
    pub fn span(&self) -> TextSpan {
        self.data().span
    }

    /// Strip any number of enclosing parentheses.
    pub fn skip_parentheses(&self) -> &Expression<'a> {
        let mut expr = self;
        while let Expression::Parenthesized(p) = expr {
            expr = p.expression;
        }
        expr
    }
}

/// The value of a literal token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue<'a> {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(&'a str),
    Char(char),
}

#[derive(Debug)]
pub struct LiteralExpression<'a> {
    pub data: NodeData,
    pub value: LiteralValue<'a>,
}

#[derive(Debug)]
pub struct ParenthesizedExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct AssignmentExpression<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    /// `EqualsToken` or a compound assignment token.
    pub operator: SyntaxKind,
    pub operator_span: TextSpan,
    pub value: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct UnaryExpression<'a> {
    pub data: NodeData,
    pub operator: SyntaxKind,
    pub operator_span: TextSpan,
    pub operand: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct BinaryExpression<'a> {
    pub data: NodeData,
    pub left: &'a Expression<'a>,
    pub operator: SyntaxKind,
    pub operator_span: TextSpan,
    pub right: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct CastExpression<'a> {
    pub data: NodeData,
    pub ty: TypeReference,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct CallExpression<'a> {
    pub data: NodeData,
    pub callee: QualifiedName<'a>,
    pub arguments: NodeList<'a, Expression<'a>>,
}

/// `left |> Call(...)`
#[derive(Debug)]
pub struct PipeExpression<'a> {
    pub data: NodeData,
    pub left: &'a Expression<'a>,
    pub call: &'a CallExpression<'a>,
}

#[derive(Debug)]
pub enum ArrayInitializer<'a> {
    /// `{ a, b, c }`
    Items(NodeList<'a, Expression<'a>>),
    /// `{ i => expr }`
    Generator {
        parameter: Identifier<'a>,
        body: &'a Expression<'a>,
    },
}

#[derive(Debug)]
pub struct ArrayCreationExpression<'a> {
    pub data: NodeData,
    /// Item type when written (`new int[3] {...}`); `None` for `new[] {...}`.
    pub item_type: Option<TypeReference>,
    pub size: OptionalNode<'a, Expression<'a>>,
    pub initializer: ArrayInitializer<'a>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(text: &str, pos: u32) -> Identifier<'_> {
        Identifier {
            data: NodeData::new(SyntaxKind::Identifier, pos, pos + text.len() as u32),
            text,
        }
    }

    #[test]
    fn test_qualified_name_parts() {
        let segments = [ident("A", 0), ident("B", 2), ident("Run", 4)];
        let name = QualifiedName {
            data: NodeData::new(SyntaxKind::QualifiedName, 0, 7),
            segments: &segments,
        };
        assert_eq!(name.text(), "A.B.Run");
        assert_eq!(name.last().text, "Run");
        assert_eq!(join_segments(name.qualifier()), "A.B");
    }

    #[test]
    fn test_skip_parentheses() {
        let inner = Expression::Literal(LiteralExpression {
            data: NodeData::new(SyntaxKind::LiteralExpression, 2, 3),
            value: LiteralValue::Int(1),
        });
        let middle = Expression::Parenthesized(ParenthesizedExpression {
            data: NodeData::new(SyntaxKind::ParenthesizedExpression, 1, 4),
            expression: &inner,
        });
        let outer = Expression::Parenthesized(ParenthesizedExpression {
            data: NodeData::new(SyntaxKind::ParenthesizedExpression, 0, 5),
            expression: &middle,
        });
        assert_eq!(outer.skip_parentheses().kind(), SyntaxKind::LiteralExpression);
        assert_eq!(outer.span(), TextSpan::new(0, 5));
    }
}
