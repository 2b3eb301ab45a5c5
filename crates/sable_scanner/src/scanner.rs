//! The Sable scanner.

use memchr::memmem;
use sable_core::text::TextSpan;
use sable_diagnostics::{messages, DiagnosticBag, DiagnosticMessage};
use sable_syntax::SyntaxKind;

/// Saved scanner state for lookahead.
pub struct ScannerState {
    pub pos: usize,
    pub token_start: usize,
    pub token: SyntaxKind,
    pub token_value: String,
    pub diagnostic_count: usize,
}

/// The scanner converts Sable source text into tokens.
pub struct Scanner {
    text: String,
    /// Current byte position in the text.
    pos: usize,
    /// Start of the current token (after leading trivia).
    token_start: usize,
    token: SyntaxKind,
    /// Identifier text, unescaped string/char contents, or number digits.
    token_value: String,
    diagnostics: DiagnosticBag,
}

impl Scanner {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            pos: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            token_value: String::new(),
            diagnostics: DiagnosticBag::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    #[inline]
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// End of the current token (exclusive).
    #[inline]
    pub fn token_end(&self) -> usize {
        self.pos
    }

    pub fn token_span(&self) -> TextSpan {
        TextSpan::from_bounds(self.token_start as u32, self.pos as u32)
    }

    /// Look ahead: save state, call f, restore state and return the result.
    pub fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let state = self.save_state();
        let result = f(self);
        self.restore_state(state);
        result
    }

    pub fn save_state(&self) -> ScannerState {
        ScannerState {
            pos: self.pos,
            token_start: self.token_start,
            token: self.token,
            token_value: self.token_value.clone(),
            diagnostic_count: self.diagnostics.len(),
        }
    }

    /// Restore a saved state, discarding diagnostics reported since it was saved.
    pub fn restore_state(&mut self, state: ScannerState) {
        self.pos = state.pos;
        self.token_start = state.token_start;
        self.token = state.token;
        self.token_value = state.token_value;
        self.diagnostics.truncate(state.diagnostic_count);
    }

    pub fn diagnostics(&self) -> &DiagnosticBag {
        &self.diagnostics
    }

    /// Take the accumulated diagnostics, leaving an empty bag.
    pub fn take_diagnostics(&mut self) -> DiagnosticBag {
        std::mem::take(&mut self.diagnostics)
    }

    // ========================================================================
    // Character access
    // ========================================================================

    #[inline]
    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.text.as_bytes().get(self.pos + offset).copied()
    }

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn error(&mut self, start: usize, message: &DiagnosticMessage, args: &[&str]) {
        let span = TextSpan::from_bounds(start as u32, self.pos as u32);
        self.diagnostics.report(span, message, args);
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.current_char() {
            match ch {
                '/' if self.byte_at(1) == Some(b'/') => {
                    let rest = &self.text.as_bytes()[self.pos..];
                    self.pos += memchr::memchr(b'\n', rest).unwrap_or(rest.len());
                }
                '/' if self.byte_at(1) == Some(b'*') => {
                    let start = self.pos;
                    let rest = &self.text.as_bytes()[self.pos + 2..];
                    match memmem::find(rest, b"*/") {
                        Some(offset) => self.pos += 2 + offset + 2,
                        None => {
                            self.pos = self.text.len();
                            self.error(start, &messages::UNTERMINATED_COMMENT, &[]);
                        }
                    }
                }
                c if c.is_whitespace() => self.pos += c.len_utf8(),
                _ => return,
            }
        }
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.token_value.clear();
        self.skip_trivia();
        self.token_start = self.pos;

        let Some(ch) = self.current_char() else {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        };

        self.token = match ch {
            '(' => self.single(SyntaxKind::OpenParenToken),
            ')' => self.single(SyntaxKind::CloseParenToken),
            '{' => self.single(SyntaxKind::OpenBraceToken),
            '}' => self.single(SyntaxKind::CloseBraceToken),
            '[' => self.single(SyntaxKind::OpenBracketToken),
            ']' => self.single(SyntaxKind::CloseBracketToken),
            '.' => self.single(SyntaxKind::DotToken),
            ';' => self.single(SyntaxKind::SemicolonToken),
            ',' => self.single(SyntaxKind::CommaToken),
            ':' => self.single(SyntaxKind::ColonToken),
            '~' => self.single(SyntaxKind::TildeToken),
            '+' => self.scan_operator(&[
                (b"++", SyntaxKind::PlusPlusToken),
                (b"+=", SyntaxKind::PlusEqualsToken),
                (b"+", SyntaxKind::PlusToken),
            ]),
            '-' => self.scan_operator(&[
                (b"--", SyntaxKind::MinusMinusToken),
                (b"-=", SyntaxKind::MinusEqualsToken),
                (b"-", SyntaxKind::MinusToken),
            ]),
            '*' => self.scan_operator(&[
                (b"*=", SyntaxKind::AsteriskEqualsToken),
                (b"*", SyntaxKind::AsteriskToken),
            ]),
            '/' => self.scan_operator(&[
                (b"/=", SyntaxKind::SlashEqualsToken),
                (b"/", SyntaxKind::SlashToken),
            ]),
            '%' => self.scan_operator(&[
                (b"%=", SyntaxKind::PercentEqualsToken),
                (b"%", SyntaxKind::PercentToken),
            ]),
            '&' => self.scan_operator(&[
                (b"&&", SyntaxKind::AmpersandAmpersandToken),
                (b"&=", SyntaxKind::AmpersandEqualsToken),
                (b"&", SyntaxKind::AmpersandToken),
            ]),
            '|' => self.scan_operator(&[
                (b"||", SyntaxKind::BarBarToken),
                (b"|=", SyntaxKind::BarEqualsToken),
                (b"|>", SyntaxKind::BarGreaterThanToken),
                (b"|", SyntaxKind::BarToken),
            ]),
            '^' => self.scan_operator(&[
                (b"^=", SyntaxKind::CaretEqualsToken),
                (b"^", SyntaxKind::CaretToken),
            ]),
            '=' => self.scan_operator(&[
                (b"==", SyntaxKind::EqualsEqualsToken),
                (b"=>", SyntaxKind::EqualsGreaterThanToken),
                (b"=", SyntaxKind::EqualsToken),
            ]),
            '!' => self.scan_operator(&[
                (b"!=", SyntaxKind::ExclamationEqualsToken),
                (b"!", SyntaxKind::ExclamationToken),
            ]),
            '<' => self.scan_operator(&[
                (b"<<", SyntaxKind::LessThanLessThanToken),
                (b"<=", SyntaxKind::LessThanEqualsToken),
                (b"<", SyntaxKind::LessThanToken),
            ]),
            '>' => self.scan_operator(&[
                (b">>", SyntaxKind::GreaterThanGreaterThanToken),
                (b">=", SyntaxKind::GreaterThanEqualsToken),
                (b">", SyntaxKind::GreaterThanToken),
            ]),
            '"' => self.scan_string_literal(),
            '\'' => self.scan_char_literal(),
            '0'..='9' => self.scan_number(),
            c if is_identifier_start(c) => self.scan_identifier(),
            c => {
                let start = self.pos;
                self.pos += c.len_utf8();
                let text = c.to_string();
                self.error(start, &messages::BAD_CHARACTER_INPUT_0, &[&text]);
                SyntaxKind::Unknown
            }
        };

        self.token
    }

    #[inline]
    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        kind
    }

    /// Match the longest operator spelling; candidates are ordered longest first.
    fn scan_operator(&mut self, candidates: &[(&[u8], SyntaxKind)]) -> SyntaxKind {
        let rest = &self.text.as_bytes()[self.pos..];
        for (spelling, kind) in candidates {
            if rest.starts_with(spelling) {
                self.pos += spelling.len();
                return *kind;
            }
        }
        unreachable!("operator table must end with the single-character spelling")
    }

    /// Scan one escape sequence after the backslash. Returns `None` if unrecognized.
    fn scan_escape(&mut self) -> Option<char> {
        let start = self.pos - 1;
        let ch = self.current_char()?;
        self.pos += ch.len_utf8();
        let value = match ch {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            other => {
                let text = other.to_string();
                self.error(start, &messages::UNRECOGNIZED_ESCAPE_SEQUENCE_0, &[&text]);
                return None;
            }
        };
        Some(value)
    }

    fn scan_string_literal(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        let mut result = String::new();
        loop {
            match self.current_char() {
                None | Some('\n') | Some('\r') => {
                    self.error(start, &messages::UNTERMINATED_STRING_LITERAL, &[]);
                    break;
                }
                Some('"') => {
                    self.pos += 1;
                    break;
                }
                Some('\\') => {
                    self.pos += 1;
                    if let Some(ch) = self.scan_escape() {
                        result.push(ch);
                    }
                }
                Some(ch) => {
                    result.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
        self.token_value = result;
        SyntaxKind::StringLiteral
    }

    fn scan_char_literal(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        let mut result = String::new();
        let mut terminated = false;
        loop {
            match self.current_char() {
                None | Some('\n') | Some('\r') => break,
                Some('\'') => {
                    self.pos += 1;
                    terminated = true;
                    break;
                }
                Some('\\') => {
                    self.pos += 1;
                    if let Some(ch) = self.scan_escape() {
                        result.push(ch);
                    }
                }
                Some(ch) => {
                    result.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
        if !terminated || result.chars().count() != 1 {
            self.error(start, &messages::INVALID_CHARACTER_LITERAL, &[]);
            if result.is_empty() {
                result.push('\0');
            }
        }
        self.token_value = result;
        SyntaxKind::CharLiteral
    }

    fn scan_digits(&mut self) {
        while matches!(self.byte_at(0), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.scan_digits();

        let is_float = self.byte_at(0) == Some(b'.') && matches!(self.byte_at(1), Some(b'0'..=b'9'));
        if is_float {
            self.pos += 1;
            self.scan_digits();
        }

        self.token_value = self.text[start..self.pos].to_string();
        if is_float {
            if self.token_value.parse::<f64>().is_err() {
                let text = self.token_value.clone();
                self.error(start, &messages::THE_NUMBER_0_IS_NOT_A_VALID_1, &[&text, "float"]);
            }
            SyntaxKind::FloatLiteral
        } else {
            if self.token_value.parse::<i64>().is_err() {
                let text = self.token_value.clone();
                self.error(start, &messages::THE_NUMBER_0_IS_NOT_A_VALID_1, &[&text, "int"]);
            }
            SyntaxKind::IntLiteral
        }
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        let start = self.pos;
        while let Some(ch) = self.current_char() {
            if self.pos != start && !is_identifier_part(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        let text = &self.text[start..self.pos];
        self.token_value = text.to_string();

        if text == "_" {
            return SyntaxKind::UnderscoreToken;
        }
        SyntaxKind::from_keyword(text).unwrap_or(SyntaxKind::Identifier)
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic() || (ch as u32 > 0x7F && unicode_xid::UnicodeXID::is_xid_start(ch))
}

fn is_identifier_part(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric() || (ch as u32 > 0x7F && unicode_xid::UnicodeXID::is_xid_continue(ch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_simple_tokens() {
        let mut scanner = Scanner::new("( ) { } [ ] ; , : .");
        assert_eq!(scanner.scan(), SyntaxKind::OpenParenToken);
        assert_eq!(scanner.scan(), SyntaxKind::CloseParenToken);
        assert_eq!(scanner.scan(), SyntaxKind::OpenBraceToken);
        assert_eq!(scanner.scan(), SyntaxKind::CloseBraceToken);
        assert_eq!(scanner.scan(), SyntaxKind::OpenBracketToken);
        assert_eq!(scanner.scan(), SyntaxKind::CloseBracketToken);
        assert_eq!(scanner.scan(), SyntaxKind::SemicolonToken);
        assert_eq!(scanner.scan(), SyntaxKind::CommaToken);
        assert_eq!(scanner.scan(), SyntaxKind::ColonToken);
        assert_eq!(scanner.scan(), SyntaxKind::DotToken);
        assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
    }

    #[test]
    fn test_scan_operators() {
        let mut scanner = Scanner::new("+ ++ += - -- -= |> || |= => == <<");
        assert_eq!(scanner.scan(), SyntaxKind::PlusToken);
        assert_eq!(scanner.scan(), SyntaxKind::PlusPlusToken);
        assert_eq!(scanner.scan(), SyntaxKind::PlusEqualsToken);
        assert_eq!(scanner.scan(), SyntaxKind::MinusToken);
        assert_eq!(scanner.scan(), SyntaxKind::MinusMinusToken);
        assert_eq!(scanner.scan(), SyntaxKind::MinusEqualsToken);
        assert_eq!(scanner.scan(), SyntaxKind::BarGreaterThanToken);
        assert_eq!(scanner.scan(), SyntaxKind::BarBarToken);
        assert_eq!(scanner.scan(), SyntaxKind::BarEqualsToken);
        assert_eq!(scanner.scan(), SyntaxKind::EqualsGreaterThanToken);
        assert_eq!(scanner.scan(), SyntaxKind::EqualsEqualsToken);
        assert_eq!(scanner.scan(), SyntaxKind::LessThanLessThanToken);
        assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
    }

    #[test]
    fn test_scan_identifier_and_keyword() {
        let mut scanner = Scanner::new("var x = 42;");
        assert_eq!(scanner.scan(), SyntaxKind::VarKeyword);
        assert_eq!(scanner.scan(), SyntaxKind::Identifier);
        assert_eq!(scanner.token_value(), "x");
        assert_eq!(scanner.token_span(), TextSpan::new(4, 1));
        assert_eq!(scanner.scan(), SyntaxKind::EqualsToken);
        assert_eq!(scanner.scan(), SyntaxKind::IntLiteral);
        assert_eq!(scanner.token_value(), "42");
        assert_eq!(scanner.scan(), SyntaxKind::SemicolonToken);
        assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
    }

    #[test]
    fn test_underscore_is_placeholder_only_when_alone() {
        let mut scanner = Scanner::new("_ _x");
        assert_eq!(scanner.scan(), SyntaxKind::UnderscoreToken);
        assert_eq!(scanner.scan(), SyntaxKind::Identifier);
        assert_eq!(scanner.token_value(), "_x");
    }

    #[test]
    fn test_scan_string_escapes() {
        let mut scanner = Scanner::new(r#""a\tb\"c""#);
        assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
        assert_eq!(scanner.token_value(), "a\tb\"c");
        assert!(scanner.diagnostics().is_empty());
    }

    #[test]
    fn test_look_ahead_restores_state() {
        let mut scanner = Scanner::new("x : y");
        scanner.scan();
        let next = scanner.look_ahead(|s| s.scan());
        assert_eq!(next, SyntaxKind::ColonToken);
        assert_eq!(scanner.token(), SyntaxKind::Identifier);
        assert_eq!(scanner.token_value(), "x");
    }
}
