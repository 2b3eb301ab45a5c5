//! SyntaxKind enum - all token and node kinds in the Sable syntax tree.

/// The kind of a syntax token or node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // ========================================================================
    // Tokens
    // ========================================================================
    Unknown,
    EndOfFileToken,

    // Literals
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    CharLiteral,

    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    DotToken,
    SemicolonToken,
    CommaToken,
    ColonToken,
    LessThanToken,
    GreaterThanToken,
    LessThanEqualsToken,
    GreaterThanEqualsToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    EqualsGreaterThanToken,
    PlusToken,
    MinusToken,
    AsteriskToken,
    SlashToken,
    PercentToken,
    PlusPlusToken,
    MinusMinusToken,
    LessThanLessThanToken,
    GreaterThanGreaterThanToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    ExclamationToken,
    TildeToken,
    AmpersandAmpersandToken,
    BarBarToken,
    BarGreaterThanToken,

    // Assignments
    EqualsToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    SlashEqualsToken,
    PercentEqualsToken,
    AmpersandEqualsToken,
    BarEqualsToken,
    CaretEqualsToken,

    // Identifiers
    Identifier,
    UnderscoreToken,

    // Keywords
    VarKeyword,
    SetKeyword,
    IfKeyword,
    ElseKeyword,
    WhileKeyword,
    ForKeyword,
    BreakKeyword,
    ContinueKeyword,
    ReturnKeyword,
    GotoKeyword,
    NamespaceKeyword,
    WithKeyword,
    NewKeyword,
    TrueKeyword,
    FalseKeyword,

    // Type keywords
    ObjectKeyword,
    BoolKeyword,
    IntKeyword,
    FloatKeyword,
    StringKeyword,
    CharKeyword,
    VoidKeyword,

    // ========================================================================
    // Nodes
    // ========================================================================
    CompilationUnit,
    QualifiedName,
    TypeReference,
    Parameter,

    // Statements
    Block,
    VariableDeclaration,
    MethodDeclaration,
    NamespaceDeclaration,
    WithDeclaration,
    IfStatement,
    WhileStatement,
    ForStatement,
    BreakStatement,
    ContinueStatement,
    ReturnStatement,
    GotoStatement,
    LabelStatement,
    ExpressionStatement,
    EmptyStatement,

    // Expressions
    LiteralExpression,
    NameExpression,
    PlaceholderExpression,
    ParenthesizedExpression,
    AssignmentExpression,
    PrefixUnaryExpression,
    PostfixUnaryExpression,
    BinaryExpression,
    CastExpression,
    CallExpression,
    PipeExpression,
    ArrayCreationExpression,
}

impl SyntaxKind {
    pub const LAST_KEYWORD: SyntaxKind = SyntaxKind::VoidKeyword;
    pub const FIRST_TYPE_KEYWORD: SyntaxKind = SyntaxKind::ObjectKeyword;

    /// Look up a keyword from its text.
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        let kind = match text {
            "var" => SyntaxKind::VarKeyword,
            "set" => SyntaxKind::SetKeyword,
            "if" => SyntaxKind::IfKeyword,
            "else" => SyntaxKind::ElseKeyword,
            "while" => SyntaxKind::WhileKeyword,
            "for" => SyntaxKind::ForKeyword,
            "break" => SyntaxKind::BreakKeyword,
            "continue" => SyntaxKind::ContinueKeyword,
            "return" => SyntaxKind::ReturnKeyword,
            "goto" => SyntaxKind::GotoKeyword,
            "namespace" => SyntaxKind::NamespaceKeyword,
            "with" => SyntaxKind::WithKeyword,
            "new" => SyntaxKind::NewKeyword,
            "true" => SyntaxKind::TrueKeyword,
            "false" => SyntaxKind::FalseKeyword,
            "object" => SyntaxKind::ObjectKeyword,
            "bool" => SyntaxKind::BoolKeyword,
            "int" => SyntaxKind::IntKeyword,
            "float" => SyntaxKind::FloatKeyword,
            "string" => SyntaxKind::StringKeyword,
            "char" => SyntaxKind::CharKeyword,
            "void" => SyntaxKind::VoidKeyword,
            _ => return None,
        };
        Some(kind)
    }

    #[inline]
    pub fn is_type_keyword(self) -> bool {
        self >= Self::FIRST_TYPE_KEYWORD && self <= Self::LAST_KEYWORD
    }

    /// Whether this token is `=` or a compound assignment operator.
    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::EqualsToken
                | SyntaxKind::PlusEqualsToken
                | SyntaxKind::MinusEqualsToken
                | SyntaxKind::AsteriskEqualsToken
                | SyntaxKind::SlashEqualsToken
                | SyntaxKind::PercentEqualsToken
                | SyntaxKind::AmpersandEqualsToken
                | SyntaxKind::BarEqualsToken
                | SyntaxKind::CaretEqualsToken
        )
    }

    /// Map a compound assignment operator to its underlying binary operator.
    pub fn compound_assignment_operator(self) -> Option<SyntaxKind> {
        let kind = match self {
            SyntaxKind::PlusEqualsToken => SyntaxKind::PlusToken,
            SyntaxKind::MinusEqualsToken => SyntaxKind::MinusToken,
            SyntaxKind::AsteriskEqualsToken => SyntaxKind::AsteriskToken,
            SyntaxKind::SlashEqualsToken => SyntaxKind::SlashToken,
            SyntaxKind::PercentEqualsToken => SyntaxKind::PercentToken,
            SyntaxKind::AmpersandEqualsToken => SyntaxKind::AmpersandToken,
            SyntaxKind::BarEqualsToken => SyntaxKind::BarToken,
            SyntaxKind::CaretEqualsToken => SyntaxKind::CaretToken,
            _ => return None,
        };
        Some(kind)
    }

    /// Get the text of a keyword.
    pub fn keyword_text(self) -> Option<&'static str> {
        let text = match self {
            SyntaxKind::VarKeyword => "var",
            SyntaxKind::SetKeyword => "set",
            SyntaxKind::IfKeyword => "if",
            SyntaxKind::ElseKeyword => "else",
            SyntaxKind::WhileKeyword => "while",
            SyntaxKind::ForKeyword => "for",
            SyntaxKind::BreakKeyword => "break",
            SyntaxKind::ContinueKeyword => "continue",
            SyntaxKind::ReturnKeyword => "return",
            SyntaxKind::GotoKeyword => "goto",
            SyntaxKind::NamespaceKeyword => "namespace",
            SyntaxKind::WithKeyword => "with",
            SyntaxKind::NewKeyword => "new",
            SyntaxKind::TrueKeyword => "true",
            SyntaxKind::FalseKeyword => "false",
            SyntaxKind::ObjectKeyword => "object",
            SyntaxKind::BoolKeyword => "bool",
            SyntaxKind::IntKeyword => "int",
            SyntaxKind::FloatKeyword => "float",
            SyntaxKind::StringKeyword => "string",
            SyntaxKind::CharKeyword => "char",
            SyntaxKind::VoidKeyword => "void",
            _ => return None,
        };
        Some(text)
    }

    /// Get the text of a punctuation or operator token.
    pub fn punctuation_text(self) -> Option<&'static str> {
        let text = match self {
            SyntaxKind::OpenBraceToken => "{",
            SyntaxKind::CloseBraceToken => "}",
            SyntaxKind::OpenParenToken => "(",
            SyntaxKind::CloseParenToken => ")",
            SyntaxKind::OpenBracketToken => "[",
            SyntaxKind::CloseBracketToken => "]",
            SyntaxKind::DotToken => ".",
            SyntaxKind::SemicolonToken => ";",
            SyntaxKind::CommaToken => ",",
            SyntaxKind::ColonToken => ":",
            SyntaxKind::LessThanToken => "<",
            SyntaxKind::GreaterThanToken => ">",
            SyntaxKind::LessThanEqualsToken => "<=",
            SyntaxKind::GreaterThanEqualsToken => ">=",
            SyntaxKind::EqualsEqualsToken => "==",
            SyntaxKind::ExclamationEqualsToken => "!=",
            SyntaxKind::EqualsGreaterThanToken => "=>",
            SyntaxKind::PlusToken => "+",
            SyntaxKind::MinusToken => "-",
            SyntaxKind::AsteriskToken => "*",
            SyntaxKind::SlashToken => "/",
            SyntaxKind::PercentToken => "%",
            SyntaxKind::PlusPlusToken => "++",
            SyntaxKind::MinusMinusToken => "--",
            SyntaxKind::LessThanLessThanToken => "<<",
            SyntaxKind::GreaterThanGreaterThanToken => ">>",
            SyntaxKind::AmpersandToken => "&",
            SyntaxKind::BarToken => "|",
            SyntaxKind::CaretToken => "^",
            SyntaxKind::ExclamationToken => "!",
            SyntaxKind::TildeToken => "~",
            SyntaxKind::AmpersandAmpersandToken => "&&",
            SyntaxKind::BarBarToken => "||",
            SyntaxKind::BarGreaterThanToken => "|>",
            SyntaxKind::EqualsToken => "=",
            SyntaxKind::PlusEqualsToken => "+=",
            SyntaxKind::MinusEqualsToken => "-=",
            SyntaxKind::AsteriskEqualsToken => "*=",
            SyntaxKind::SlashEqualsToken => "/=",
            SyntaxKind::PercentEqualsToken => "%=",
            SyntaxKind::AmpersandEqualsToken => "&=",
            SyntaxKind::BarEqualsToken => "|=",
            SyntaxKind::CaretEqualsToken => "^=",
            SyntaxKind::UnderscoreToken => "_",
            _ => return None,
        };
        Some(text)
    }

    /// A short human-readable name used in "unexpected token" diagnostics.
    pub fn display_name(self) -> &'static str {
        if let Some(text) = self.punctuation_text().or_else(|| self.keyword_text()) {
            return text;
        }
        match self {
            SyntaxKind::EndOfFileToken => "end of file",
            SyntaxKind::Identifier => "identifier",
            SyntaxKind::IntLiteral => "int literal",
            SyntaxKind::FloatLiteral => "float literal",
            SyntaxKind::StringLiteral => "string literal",
            SyntaxKind::CharLiteral => "char literal",
            _ => "token",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(SyntaxKind::from_keyword("var"), Some(SyntaxKind::VarKeyword));
        assert_eq!(SyntaxKind::from_keyword("string"), Some(SyntaxKind::StringKeyword));
        assert_eq!(SyntaxKind::from_keyword("let"), None);
        assert!(SyntaxKind::IntKeyword.is_type_keyword());
        assert!(!SyntaxKind::WhileKeyword.is_type_keyword());
    }

    #[test]
    fn test_keyword_text_inverts_lookup() {
        for text in ["var", "set", "goto", "namespace", "with", "object", "void"] {
            let kind = SyntaxKind::from_keyword(text).unwrap();
            assert_eq!(kind.keyword_text(), Some(text));
        }
    }

    #[test]
    fn test_compound_assignment_operator() {
        assert_eq!(
            SyntaxKind::PlusEqualsToken.compound_assignment_operator(),
            Some(SyntaxKind::PlusToken)
        );
        assert_eq!(SyntaxKind::EqualsToken.compound_assignment_operator(), None);
        assert!(SyntaxKind::CaretEqualsToken.is_assignment_operator());
        assert!(!SyntaxKind::EqualsEqualsToken.is_assignment_operator());
    }
}
