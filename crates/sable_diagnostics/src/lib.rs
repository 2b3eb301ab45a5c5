//! sable_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Every rule violation found by the scanner, parser, binder or evaluator is
//! recorded as a `Diagnostic` in a shared `DiagnosticBag`. Messages come from
//! the `messages` catalogue so that codes and wording stay consistent.

use sable_core::text::TextSpan;
use std::fmt;

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic code (e.g. 1001, 3002).
    pub code: u32,
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The source text span where this diagnostic occurred, if any.
    pub span: Option<TextSpan>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// Create a diagnostic without location info.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            span: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// Create a diagnostic attached to a span of source text.
    pub fn with_span(span: TextSpan, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            span: Some(span),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(span) = self.span {
            write!(f, "({}): ", span.start)?;
        }
        write!(f, "{} SB{}: {}", self.category, self.code, self.message_text)
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// The shared bag diagnostics are accumulated into during one compilation.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record a diagnostic at `span`.
    pub fn report(&mut self, span: TextSpan, message: &DiagnosticMessage, args: &[&str]) {
        self.add(Diagnostic::with_span(span, message, args));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Drop every diagnostic reported after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.diagnostics.truncate(len);
    }

    pub fn extend(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Lexical errors (1000-1099)
    // ========================================================================
    pub const BAD_CHARACTER_INPUT_0: DiagnosticMessage = diag!(1001, Error, "Bad character input: '{0}'.");
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = diag!(1002, Error, "Unterminated string literal.");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!(1003, Error, "Unterminated comment.");
    pub const THE_NUMBER_0_IS_NOT_A_VALID_1: DiagnosticMessage = diag!(1004, Error, "The number {0} isn't a valid {1}.");
    pub const INVALID_CHARACTER_LITERAL: DiagnosticMessage = diag!(1005, Error, "Invalid character literal.");
    pub const UNRECOGNIZED_ESCAPE_SEQUENCE_0: DiagnosticMessage = diag!(1006, Error, "Unrecognized escape sequence '\\{0}'.");

    // ========================================================================
    // Syntax errors (2000-2099)
    // ========================================================================
    pub const UNEXPECTED_TOKEN_0_EXPECTED_1: DiagnosticMessage = diag!(2001, Error, "Unexpected token <{0}>, expected <{1}>.");
    pub const EXPRESSION_EXPECTED: DiagnosticMessage = diag!(2002, Error, "Expression expected.");
    pub const TYPE_EXPECTED: DiagnosticMessage = diag!(2003, Error, "Type expected.");
    pub const A_PIPE_MUST_BE_FOLLOWED_BY_A_CALL: DiagnosticMessage = diag!(2004, Error, "The right-hand side of '|>' must be a method call.");

    // ========================================================================
    // Declaration and resolution errors (3000-3099)
    // ========================================================================
    pub const VARIABLE_0_IS_ALREADY_DECLARED: DiagnosticMessage = diag!(3001, Error, "Variable '{0}' is already declared.");
    pub const LABEL_0_IS_ALREADY_DECLARED: DiagnosticMessage = diag!(3002, Error, "Label '{0}' is already declared.");
    pub const METHOD_0_IS_ALREADY_DECLARED: DiagnosticMessage = diag!(3003, Error, "Method '{0}' is already declared.");
    pub const PARAMETER_0_IS_ALREADY_DECLARED: DiagnosticMessage = diag!(3004, Error, "Parameter '{0}' is already declared.");
    pub const UNDEFINED_VARIABLE_0: DiagnosticMessage = diag!(3010, Error, "Undefined variable '{0}'.");
    pub const UNDEFINED_METHOD_0: DiagnosticMessage = diag!(3011, Error, "Undefined method '{0}'.");
    pub const UNDEFINED_LABEL_0: DiagnosticMessage = diag!(3012, Error, "Undefined label '{0}'.");
    pub const UNDEFINED_NAMESPACE_0: DiagnosticMessage = diag!(3013, Error, "Undefined namespace '{0}'.");
    pub const THE_CALL_TO_0_IS_AMBIGUOUS_BETWEEN_1: DiagnosticMessage = diag!(3014, Error, "The call to '{0}' is ambiguous between: {1}.");

    // ========================================================================
    // Type errors (4000-4099)
    // ========================================================================
    pub const UNARY_OPERATOR_0_IS_NOT_DEFINED_FOR_TYPE_1: DiagnosticMessage = diag!(4001, Error, "Unary operator '{0}' is not defined for type '{1}'.");
    pub const BINARY_OPERATOR_0_IS_NOT_DEFINED_FOR_TYPES_1_AND_2: DiagnosticMessage = diag!(4002, Error, "Binary operator '{0}' is not defined for types '{1}' and '{2}'.");
    pub const CANNOT_CONVERT_TYPE_0_TO_1: DiagnosticMessage = diag!(4003, Error, "Cannot convert type '{0}' to '{1}'.");
    pub const CANNOT_IMPLICITLY_CONVERT_TYPE_0_TO_1: DiagnosticMessage = diag!(4004, Error, "Cannot implicitly convert type '{0}' to '{1}'. An explicit conversion exists (are you missing a cast?)");
    pub const METHOD_0_REQUIRES_1_ARGUMENTS_BUT_WAS_GIVEN_2: DiagnosticMessage = diag!(4005, Error, "Method '{0}' requires {1} arguments but was given {2}.");
    pub const CANNOT_ASSIGN_VOID_TO_AN_IMPLICITLY_TYPED_VARIABLE: DiagnosticMessage = diag!(4006, Error, "Cannot assign void to an implicitly-typed variable.");
    pub const VARIABLE_0_IS_READ_ONLY: DiagnosticMessage = diag!(4007, Error, "Variable '{0}' is read-only and cannot be modified.");
    pub const INCREMENT_OPERAND_MUST_BE_A_VARIABLE: DiagnosticMessage = diag!(4008, Error, "The operand of an increment or decrement operator must be a variable.");
    pub const ARRAY_SIZE_0_DOES_NOT_MATCH_1_ELEMENTS: DiagnosticMessage = diag!(4009, Error, "Array size {0} does not match the number of initializer elements {1}.");
    pub const ARRAY_GENERATOR_REQUIRES_A_SIZE: DiagnosticMessage = diag!(4010, Error, "An array generator requires an explicit size.");
    pub const PLACEHOLDER_OUTSIDE_PIPE: DiagnosticMessage = diag!(4011, Error, "The placeholder '_' can only be used as an argument of a piped call.");
    pub const EXPRESSION_MUST_HAVE_A_VALUE: DiagnosticMessage = diag!(4012, Error, "Expression must have a value.");

    // ========================================================================
    // Structural errors (5000-5099)
    // ========================================================================
    pub const ONLY_DECLARATIONS_ALLOWED_IN_NAMESPACE: DiagnosticMessage = diag!(5001, Error, "Only method, namespace and with declarations are allowed directly inside a namespace.");
    pub const NAMESPACE_INSIDE_METHOD: DiagnosticMessage = diag!(5002, Error, "A namespace cannot be declared inside a method.");
    pub const SIMPLE_NAMESPACE_MUST_BE_TOP_LEVEL: DiagnosticMessage = diag!(5003, Error, "A simple namespace declaration must be at the top level of the file.");
    pub const RETURN_TYPE_OF_0_CANNOT_BE_INFERRED: DiagnosticMessage = diag!(5004, Error, "The return type of '{0}' cannot be inferred.");
    pub const NOT_ALL_CODE_PATHS_RETURN_A_VALUE: DiagnosticMessage = diag!(5005, Error, "Not all code paths return a value.");
    pub const VOID_METHOD_0_CANNOT_RETURN_A_VALUE: DiagnosticMessage = diag!(5006, Error, "Since '{0}' returns void, a return keyword must not be followed by an expression.");
    pub const AN_EXPRESSION_OF_TYPE_0_IS_EXPECTED: DiagnosticMessage = diag!(5007, Error, "An expression of type '{0}' is expected.");
    pub const MAIN_AND_TOP_LEVEL_STATEMENTS: DiagnosticMessage = diag!(5008, Error, "A program cannot contain both top-level statements and a 'Main' method.");
    pub const MAIN_MUST_HAVE_CORRECT_SIGNATURE: DiagnosticMessage = diag!(5009, Error, "'Main' must be a void method without parameters.");

    // ========================================================================
    // Flow errors (6000-6099)
    // ========================================================================
    pub const BREAK_OUTSIDE_LOOP: DiagnosticMessage = diag!(6001, Error, "'break' can only be used inside a loop.");
    pub const CONTINUE_OUTSIDE_LOOP: DiagnosticMessage = diag!(6002, Error, "'continue' can only be used inside a loop.");

    // ========================================================================
    // Runtime errors (7000-7099)
    // ========================================================================
    pub const RUNTIME_ERROR_0: DiagnosticMessage = diag!(7001, Error, "{0}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let msg = format_message(
            messages::BINARY_OPERATOR_0_IS_NOT_DEFINED_FOR_TYPES_1_AND_2.message,
            &["+", "bool", "int"],
        );
        assert_eq!(msg, "Binary operator '+' is not defined for types 'bool' and 'int'.");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::with_span(TextSpan::new(10, 5), &messages::UNDEFINED_VARIABLE_0, &["foo"]);
        let display = diag.to_string();
        assert!(display.contains("(10)"));
        assert!(display.contains("SB3010"));
        assert!(display.contains("foo"));
    }

    #[test]
    fn test_diagnostic_without_location() {
        let diag = Diagnostic::new(&messages::RUNTIME_ERROR_0, &["Attempted to divide by zero."]);
        assert!(diag.span.is_none());
        assert_eq!(diag.message_text, "Attempted to divide by zero.");
        assert!(diag.is_error());
    }

    #[test]
    fn test_bag_counts_errors_only() {
        let mut bag = DiagnosticBag::new();
        assert!(bag.is_empty());
        let warning = DiagnosticMessage {
            code: 9999,
            category: DiagnosticCategory::Warning,
            message: "Just a note.",
        };
        bag.report(TextSpan::new(0, 1), &warning, &[]);
        assert!(!bag.has_errors());
        bag.report(TextSpan::new(2, 1), &messages::BREAK_OUTSIDE_LOOP, &[]);
        assert!(bag.has_errors());
        assert_eq!(bag.error_count(), 1);
        assert_eq!(bag.len(), 2);
    }
}
