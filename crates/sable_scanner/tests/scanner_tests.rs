//! Scanner integration tests.
//!
//! Verifies that the scanner tokenizes Sable constructs and reports lexical errors.

use sable_scanner::Scanner;
use sable_syntax::SyntaxKind;

/// Helper: scan all tokens from source and return as (kind, value) pairs.
fn scan_all(source: &str) -> Vec<(SyntaxKind, String)> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    loop {
        let kind = scanner.scan();
        if kind == SyntaxKind::EndOfFileToken {
            break;
        }
        tokens.push((kind, scanner.token_value().to_string()));
    }
    tokens
}

/// Helper: scan all token kinds.
fn scan_kinds(source: &str) -> Vec<SyntaxKind> {
    scan_all(source).into_iter().map(|(k, _)| k).collect()
}

/// Helper: scan everything and return the diagnostic messages.
fn scan_errors(source: &str) -> Vec<String> {
    let mut scanner = Scanner::new(source);
    while scanner.scan() != SyntaxKind::EndOfFileToken {}
    scanner
        .take_diagnostics()
        .into_iter()
        .map(|d| d.message_text)
        .collect()
}

#[test]
fn test_empty_source() {
    assert!(scan_all("").is_empty());
    assert!(scan_all("   \n\t  ").is_empty());
}

#[test]
fn test_numeric_literals() {
    let tokens = scan_all("42 3.14 7.");
    assert_eq!(tokens[0], (SyntaxKind::IntLiteral, "42".to_string()));
    assert_eq!(tokens[1], (SyntaxKind::FloatLiteral, "3.14".to_string()));
    assert_eq!(tokens[2], (SyntaxKind::IntLiteral, "7".to_string()));
    assert_eq!(tokens[3].0, SyntaxKind::DotToken);
}

#[test]
fn test_int_overflow_is_reported() {
    let errors = scan_errors("99999999999999999999");
    assert_eq!(errors, vec!["The number 99999999999999999999 isn't a valid int."]);
}

#[test]
fn test_char_literals() {
    let tokens = scan_all(r"'a' '\n'");
    assert_eq!(tokens[0], (SyntaxKind::CharLiteral, "a".to_string()));
    assert_eq!(tokens[1], (SyntaxKind::CharLiteral, "\n".to_string()));
    assert_eq!(scan_errors("'ab'"), vec!["Invalid character literal."]);
    assert_eq!(scan_errors("''"), vec!["Invalid character literal."]);
}

#[test]
fn test_comments_are_skipped() {
    let kinds = scan_kinds("var // line comment\n x /* block\n comment */ = 1;");
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::VarKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::EqualsToken,
            SyntaxKind::IntLiteral,
            SyntaxKind::SemicolonToken,
        ]
    );
}

#[test]
fn test_lexical_errors() {
    assert_eq!(scan_errors("\"abc"), vec!["Unterminated string literal."]);
    assert_eq!(scan_errors("/* never closed"), vec!["Unterminated comment."]);
    assert_eq!(scan_errors("var $ = 1;"), vec!["Bad character input: '$'."]);
    assert_eq!(scan_errors(r#""\q""#), vec!["Unrecognized escape sequence '\\q'."]);
}

#[test]
fn test_declaration_keywords() {
    let kinds = scan_kinds("namespace A.B; with M = A.B; set k = new int[2] { 1, 2 };");
    assert_eq!(kinds[0], SyntaxKind::NamespaceKeyword);
    assert_eq!(kinds[5], SyntaxKind::WithKeyword);
    assert_eq!(kinds[12], SyntaxKind::SetKeyword);
    assert!(kinds.contains(&SyntaxKind::NewKeyword));
    assert!(kinds.contains(&SyntaxKind::IntKeyword));
}

#[test]
fn test_pipe_and_generator_tokens() {
    let kinds = scan_kinds("x |> Print(_); new[3] { i => i }");
    assert_eq!(kinds[1], SyntaxKind::BarGreaterThanToken);
    assert_eq!(kinds[4], SyntaxKind::UnderscoreToken);
    assert!(kinds.contains(&SyntaxKind::EqualsGreaterThanToken));
}

#[test]
fn test_unicode_identifier_offsets_are_bytes() {
    let mut scanner = Scanner::new("var été = 1;");
    scanner.scan();
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.token_value(), "été");
    assert_eq!(scanner.token_start(), 4);
    assert_eq!(scanner.token_end(), 4 + "été".len());
}
