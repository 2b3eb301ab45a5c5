//! sable_printer: Bound tree to text output.
//!
//! Renders bound and lowered method bodies as indented, source-like text.
//! Used by the "print program" operation of the compiler and by tests that
//! compare whole trees.

use sable_bound::constant::ConstantValue;
use sable_bound::symbols::VariableKind;
use sable_bound::tree::*;

/// Options for the printer.
pub struct PrinterOptions {
    /// Indentation string.
    pub indent_str: String,
    /// Newline string.
    pub new_line: String,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            indent_str: "    ".to_string(),
            new_line: "\n".to_string(),
        }
    }
}

/// The printer converts bound nodes to text.
pub struct Printer {
    output: String,
    indent_level: u32,
    options: PrinterOptions,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self::with_options(PrinterOptions::default())
    }

    pub fn with_options(options: PrinterOptions) -> Self {
        Self {
            output: String::with_capacity(4096),
            indent_level: 0,
            options,
        }
    }

    /// Print every method of a program, separated by blank lines.
    pub fn print_program(&mut self, program: &BoundProgram) -> String {
        self.output.clear();
        self.indent_level = 0;
        for (i, method) in program.methods.iter().enumerate() {
            if i > 0 {
                self.write_newline();
            }
            self.emit_method(method);
        }
        std::mem::take(&mut self.output)
    }

    /// Print a single method: its signature followed by its body.
    pub fn print_method(&mut self, method: &BoundMethod) -> String {
        self.output.clear();
        self.indent_level = 0;
        self.emit_method(method);
        std::mem::take(&mut self.output)
    }

    pub fn print_statement(&mut self, statement: &BoundStatement) -> String {
        self.output.clear();
        self.indent_level = 0;
        self.emit_statement(statement);
        std::mem::take(&mut self.output)
    }

    pub fn print_expression(&mut self, expression: &BoundExpression) -> String {
        self.output.clear();
        self.emit_expression(expression);
        std::mem::take(&mut self.output)
    }

    // ========================================================================
    // Methods and statements
    // ========================================================================

    fn emit_method(&mut self, method: &BoundMethod) {
        let symbol = &method.symbol;
        self.write(&symbol.return_type.to_string());
        self.write(" ");
        self.write(&symbol.full_name);
        self.write("(");
        for (i, parameter) in symbol.parameters.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&parameter.ty.to_string());
            self.write(" ");
            self.write(&parameter.name);
        }
        self.write(")");
        self.write_newline();
        match &method.body {
            BoundStatement::Block { .. } => self.emit_statement(&method.body),
            other => self.emit_nested(other),
        }
    }

    fn emit_statement(&mut self, statement: &BoundStatement) {
        match statement {
            BoundStatement::Block { statements } => {
                self.write_indent();
                self.write("{");
                self.write_newline();
                self.increase_indent();
                for s in statements {
                    self.emit_statement(s);
                }
                self.decrease_indent();
                self.write_indent();
                self.write("}");
                self.write_newline();
            }
            BoundStatement::VariableDeclaration { variable, initializer } => {
                self.write_indent();
                let keyword = match variable.kind {
                    VariableKind::Local { read_only: false } => "var",
                    VariableKind::Local { read_only: true } => "set",
                    VariableKind::Parameter => "param",
                    VariableKind::Constant(_) => "const",
                };
                self.write(keyword);
                self.write(" ");
                self.write(&variable.name);
                self.write(" = ");
                self.emit_expression(initializer);
                self.write(";");
                self.write_newline();
            }
            BoundStatement::If {
                condition,
                then_statement,
                else_statement,
            } => {
                self.write_indent();
                self.write("if (");
                self.emit_expression(condition);
                self.write(")");
                self.write_newline();
                self.emit_nested(then_statement);
                if let Some(else_statement) = else_statement {
                    self.write_indent();
                    self.write("else");
                    self.write_newline();
                    self.emit_nested(else_statement);
                }
            }
            BoundStatement::While { condition, body, .. } => {
                self.write_indent();
                self.write("while (");
                self.emit_expression(condition);
                self.write(")");
                self.write_newline();
                self.emit_nested(body);
            }
            BoundStatement::For {
                initializer,
                condition,
                incrementor,
                body,
                ..
            } => {
                self.write_indent();
                self.write("for (");
                if let Some(BoundStatement::VariableDeclaration { variable, initializer }) = initializer.as_deref() {
                    self.write("var ");
                    self.write(&variable.name);
                    self.write(" = ");
                    self.emit_expression(initializer);
                } else if let Some(BoundStatement::Expression { expression }) = initializer.as_deref() {
                    self.emit_expression(expression);
                }
                self.write(";");
                if let Some(condition) = condition {
                    self.write(" ");
                    self.emit_expression(condition);
                }
                self.write(";");
                if let Some(incrementor) = incrementor {
                    self.write(" ");
                    self.emit_expression(incrementor);
                }
                self.write(")");
                self.write_newline();
                self.emit_nested(body);
            }
            BoundStatement::Label { label } => {
                // Labels hang one level out from the code they mark.
                let saved = self.indent_level;
                self.indent_level = saved.saturating_sub(1);
                self.write_indent();
                self.indent_level = saved;
                self.write(&label.name);
                self.write(":");
                self.write_newline();
            }
            BoundStatement::Goto { label } => {
                self.write_indent();
                self.write("goto ");
                self.write(&label.name);
                self.write(";");
                self.write_newline();
            }
            BoundStatement::ConditionalGoto {
                label,
                condition,
                jump_if_true,
            } => {
                self.write_indent();
                self.write("goto ");
                self.write(&label.name);
                self.write(if *jump_if_true { " if " } else { " unless " });
                self.emit_expression(condition);
                self.write(";");
                self.write_newline();
            }
            BoundStatement::Return { expression } => {
                self.write_indent();
                self.write("return");
                if let Some(expression) = expression {
                    self.write(" ");
                    self.emit_expression(expression);
                }
                self.write(";");
                self.write_newline();
            }
            BoundStatement::Expression { expression } => {
                self.write_indent();
                self.emit_expression(expression);
                self.write(";");
                self.write_newline();
            }
            BoundStatement::MethodDeclaration { method } => {
                self.write_indent();
                self.write("declare ");
                self.write(&method.signature());
                self.write(";");
                self.write_newline();
            }
            BoundStatement::NoOp => {
                self.write_indent();
                self.write("nop;");
                self.write_newline();
            }
        }
    }

    /// Blocks keep the current indent; single statements are pushed one level in.
    fn emit_nested(&mut self, statement: &BoundStatement) {
        if matches!(statement, BoundStatement::Block { .. }) {
            self.emit_statement(statement);
        } else {
            self.increase_indent();
            self.emit_statement(statement);
            self.decrease_indent();
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn emit_expression(&mut self, expression: &BoundExpression) {
        match expression {
            BoundExpression::Error { .. } => self.write("?"),
            BoundExpression::Literal { value, .. } => self.emit_literal(value),
            BoundExpression::Variable { variable, .. } => self.write(&variable.name),
            BoundExpression::Assignment { variable, value, .. } => {
                self.write(&variable.name);
                self.write(" = ");
                self.emit_expression(value);
            }
            BoundExpression::Unary { op, operand, .. } => {
                if op.kind.is_postfix() {
                    self.emit_operand(operand);
                    self.write(op.text());
                } else {
                    self.write(op.text());
                    self.emit_operand(operand);
                }
            }
            BoundExpression::Binary { left, op, right, .. } => {
                self.emit_operand(left);
                self.write(" ");
                self.write(op.text());
                self.write(" ");
                self.emit_operand(right);
            }
            BoundExpression::Call { method, arguments, .. } => {
                self.write(&method.full_name);
                self.write("(");
                self.emit_list(arguments);
                self.write(")");
            }
            BoundExpression::ExplicitCast { ty, expression, .. } => {
                self.write("(");
                self.write(&ty.to_string());
                self.write(")");
                self.emit_operand(expression);
            }
            BoundExpression::ArrayInitialization {
                ty,
                size,
                initializer,
                ..
            } => {
                self.write("new ");
                if let Some(item_type) = ty.item_type() {
                    self.write(&item_type.to_string());
                }
                self.write("[");
                if let Some(size) = size {
                    self.emit_expression(size);
                }
                self.write("] { ");
                match initializer {
                    BoundArrayInitializer::Items(items) => self.emit_list(items),
                    BoundArrayInitializer::Generator { index, body } => {
                        self.write(&index.name);
                        self.write(" => ");
                        self.emit_expression(body);
                    }
                }
                self.write(" }");
            }
        }
    }

    /// Operands that are themselves operator expressions get parentheses.
    fn emit_operand(&mut self, operand: &BoundExpression) {
        let needs_parens = matches!(
            operand,
            BoundExpression::Binary { .. } | BoundExpression::Assignment { .. } | BoundExpression::ExplicitCast { .. }
        );
        if needs_parens {
            self.write("(");
            self.emit_expression(operand);
            self.write(")");
        } else {
            self.emit_expression(operand);
        }
    }

    fn emit_list(&mut self, expressions: &[BoundExpression]) {
        for (i, e) in expressions.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_expression(e);
        }
    }

    fn emit_literal(&mut self, value: &ConstantValue) {
        match value {
            ConstantValue::String(s) => {
                self.write("\"");
                self.write_escaped(s, '"');
                self.write("\"");
            }
            ConstantValue::Char(c) => {
                self.write("'");
                self.write_escaped(c.encode_utf8(&mut [0; 4]), '\'');
                self.write("'");
            }
            ConstantValue::Float(f) if f.is_finite() && f.fract() == 0.0 => {
                self.write(&format!("{:.1}", f));
            }
            other => self.write(&other.to_string()),
        }
    }

    fn write_escaped(&mut self, text: &str, quote: char) {
        for ch in text.chars() {
            match ch {
                '\n' => self.output.push_str("\\n"),
                '\t' => self.output.push_str("\\t"),
                '\r' => self.output.push_str("\\r"),
                '\0' => self.output.push_str("\\0"),
                '\\' => self.output.push_str("\\\\"),
                c if c == quote => {
                    self.output.push('\\');
                    self.output.push(c);
                }
                c => self.output.push(c),
            }
        }
    }

    // ========================================================================
    // Output helpers
    // ========================================================================

    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn write_newline(&mut self) {
        self.output.push_str(&self.options.new_line);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(&self.options.indent_str);
        }
    }

    fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    fn decrease_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }
}

/// Print a whole program with default options.
pub fn print_program(program: &BoundProgram) -> String {
    Printer::new().print_program(program)
}

/// Print one method with default options.
pub fn print_method(method: &BoundMethod) -> String {
    Printer::new().print_method(method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sable_bound::operators::bind_binary_operator;
    use sable_bound::symbols::{LabelSymbol, MethodFlags, MethodSymbol, VariableSymbol};
    use sable_bound::types::TypeSymbol;
    use sable_core::text::TextSpan;
    use sable_syntax::SyntaxKind;

    fn span() -> TextSpan {
        TextSpan::new(0, 0)
    }

    fn int(value: i64) -> BoundExpression {
        BoundExpression::literal(span(), ConstantValue::Int(value))
    }

    #[test]
    fn test_print_structured_method() {
        let a = VariableSymbol::parameter("a", TypeSymbol::Int);
        let less = bind_binary_operator(SyntaxKind::LessThanToken, &TypeSymbol::Int, &TypeSymbol::Int).unwrap();
        let symbol = MethodSymbol::new(
            None,
            "Sign",
            vec![a.clone()],
            TypeSymbol::Int,
            MethodFlags::NONE,
            None,
        );
        let condition = BoundExpression::Binary {
            span: span(),
            left: Box::new(BoundExpression::Variable {
                span: span(),
                variable: a,
            }),
            op: less,
            right: Box::new(int(0)),
        };
        let method = BoundMethod {
            symbol,
            body: BoundStatement::Block {
                statements: vec![
                    BoundStatement::If {
                        condition,
                        then_statement: Box::new(BoundStatement::Return {
                            expression: Some(int(-1)),
                        }),
                        else_statement: None,
                    },
                    BoundStatement::Return {
                        expression: Some(int(1)),
                    },
                ],
            },
        };

        let expected = "\
int Sign(int a)
{
    if (a < 0)
        return -1;
    return 1;
}
";
        assert_eq!(print_method(&method), expected);
    }

    #[test]
    fn test_print_lowered_labels_and_jumps() {
        let end = LabelSymbol::new("Label1");
        let flag = VariableSymbol::local("flag", false, TypeSymbol::Bool);
        let body = BoundStatement::Block {
            statements: vec![
                BoundStatement::VariableDeclaration {
                    variable: flag.clone(),
                    initializer: BoundExpression::literal(span(), ConstantValue::Bool(true)),
                },
                BoundStatement::ConditionalGoto {
                    label: end.clone(),
                    condition: BoundExpression::Variable {
                        span: span(),
                        variable: flag,
                    },
                    jump_if_true: false,
                },
                BoundStatement::Expression {
                    expression: BoundExpression::literal(span(), ConstantValue::from("a\"b")),
                },
                BoundStatement::Label { label: end },
                BoundStatement::Return { expression: None },
            ],
        };

        let expected = "\
{
    var flag = true;
    goto Label1 unless flag;
    \"a\\\"b\";
Label1:
    return;
}
";
        assert_eq!(Printer::new().print_statement(&body), expected);
    }

    #[test]
    fn test_print_float_and_char_literals() {
        let mut printer = Printer::new();
        let float = BoundExpression::literal(span(), ConstantValue::Float(2.0));
        assert_eq!(printer.print_expression(&float), "2.0");
        let ch = BoundExpression::literal(span(), ConstantValue::Char('\n'));
        assert_eq!(printer.print_expression(&ch), "'\\n'");
    }
}
