//! Expression binding: names, operators, conversions, arrays and calls.

use crate::binder::Binder;
use crate::context::BindContext;
use crate::methods::root_methods;
use sable_bound::constant::ConstantValue;
use sable_bound::conversion::Conversion;
use sable_bound::folding::{fold_binary, fold_cast, fold_unary};
use sable_bound::operators::{bind_binary_operator, bind_postfix_operator, bind_prefix_operator};
use sable_bound::symbols::{MethodFlags, MethodSymbol, VariableSymbol, LOCAL_METHOD_SEPARATOR, SCRIPT_METHOD_NAME};
use sable_bound::tree::{BoundArrayInitializer, BoundExpression, MethodRef};
use sable_bound::types::TypeSymbol;
use sable_core::text::TextSpan;
use sable_diagnostics::messages;
use sable_syntax::node::*;
use sable_syntax::SyntaxKind;
use std::sync::Arc;

/// Outcome of looking up a callee.
#[derive(Debug)]
enum MethodLookup {
    Found(Vec<MethodRef>),
    /// Several namespaces define the name; full names in discovery order.
    Ambiguous(Vec<String>),
    /// The callee is a `var` method whose return type is not known yet.
    Blocked,
    /// The callee is the method whose return type is being inferred.
    Inferring,
    Undefined,
}

/// The compile-time value of an expression, folding operators and casts.
pub(crate) fn constant_of(expression: &BoundExpression) -> Option<ConstantValue> {
    match expression {
        BoundExpression::Literal { value, .. } => Some(value.clone()),
        BoundExpression::Variable { variable, .. } => variable.constant_value().cloned(),
        BoundExpression::Unary { op, operand, .. } => fold_unary(op, &constant_of(operand)?),
        BoundExpression::Binary { left, op, right, .. } => fold_binary(op, &constant_of(left)?, &constant_of(right)?),
        BoundExpression::ExplicitCast { ty, expression, .. } => fold_cast(&constant_of(expression)?, ty),
        _ => None,
    }
}

fn literal_value(value: &LiteralValue<'_>) -> ConstantValue {
    match *value {
        LiteralValue::Bool(value) => ConstantValue::Bool(value),
        LiteralValue::Int(value) => ConstantValue::Int(value),
        LiteralValue::Float(value) => ConstantValue::Float(value),
        LiteralValue::String(value) => ConstantValue::String(Arc::from(value)),
        LiteralValue::Char(value) => ConstantValue::Char(value),
    }
}

fn operator_text(kind: SyntaxKind) -> &'static str {
    kind.punctuation_text().unwrap_or_else(|| kind.display_name())
}

fn quote_all<I: IntoIterator<Item = String>>(names: I) -> String {
    names
        .into_iter()
        .map(|name| format!("'{}'", name))
        .collect::<Vec<_>>()
        .join(", ")
}

impl<'a> Binder<'a> {
    /// Bind an expression that may be `void`.
    pub(crate) fn bind_expression(&mut self, expression: &'a Expression<'a>, context: &BindContext) -> BoundExpression {
        let span = expression.span();
        match expression {
            Expression::Literal(literal) => BoundExpression::literal(span, literal_value(&literal.value)),
            Expression::Name(name) => self.bind_name(name),
            Expression::Placeholder(_) => {
                self.report(span, &messages::PLACEHOLDER_OUTSIDE_PIPE, &[]);
                BoundExpression::error(span)
            }
            Expression::Parenthesized(inner) => self.bind_expression(inner.expression, context),
            Expression::Assignment(assignment) => self.bind_assignment(assignment, context),
            Expression::PrefixUnary(unary) => self.bind_unary(unary, false, context),
            Expression::PostfixUnary(unary) => self.bind_unary(unary, true, context),
            Expression::Binary(binary) => self.bind_binary(binary, context),
            Expression::Cast(cast) => {
                let operand = self.bind_value(cast.expression, context);
                let ty = TypeSymbol::from_keyword(cast.ty.keyword, cast.ty.rank);
                self.bind_explicit_conversion(span, operand, ty)
            }
            Expression::Call(call) => self.bind_call(call, None, context),
            Expression::Pipe(pipe) => self.bind_call(pipe.call, Some(pipe.left), context),
            Expression::ArrayCreation(array) => self.bind_array_creation(array, context),
        }
    }

    /// Bind an expression that must produce a value.
    pub(crate) fn bind_value(&mut self, expression: &'a Expression<'a>, context: &BindContext) -> BoundExpression {
        let bound = self.bind_expression(expression, context);
        if bound.ty().is_void() {
            self.report(expression.span(), &messages::EXPRESSION_MUST_HAVE_A_VALUE, &[]);
            return BoundExpression::error(expression.span());
        }
        bound
    }

    pub(crate) fn bind_condition(&mut self, expression: &'a Expression<'a>, context: &BindContext) -> BoundExpression {
        let bound = self.bind_value(expression, context);
        self.bind_conversion(bound, &TypeSymbol::Bool)
    }

    /// Apply an implicit conversion, reporting when only an explicit one exists.
    pub(crate) fn bind_conversion(&mut self, expression: BoundExpression, ty: &TypeSymbol) -> BoundExpression {
        let span = expression.span();
        let from = expression.ty();
        match Conversion::classify(&from, ty) {
            Conversion::Identity => expression,
            Conversion::Implicit => BoundExpression::ExplicitCast {
                span,
                ty: ty.clone(),
                expression: Box::new(expression),
            },
            Conversion::Explicit => {
                let (from, to) = (from.to_string(), ty.to_string());
                self.report(span, &messages::CANNOT_IMPLICITLY_CONVERT_TYPE_0_TO_1, &[&from, &to]);
                BoundExpression::error(span)
            }
            Conversion::None => {
                let (from, to) = (from.to_string(), ty.to_string());
                self.report(span, &messages::CANNOT_CONVERT_TYPE_0_TO_1, &[&from, &to]);
                BoundExpression::error(span)
            }
        }
    }

    fn bind_explicit_conversion(&mut self, span: TextSpan, expression: BoundExpression, ty: TypeSymbol) -> BoundExpression {
        let from = expression.ty();
        match Conversion::classify(&from, &ty) {
            Conversion::Identity => expression,
            Conversion::Implicit | Conversion::Explicit => BoundExpression::ExplicitCast {
                span,
                ty,
                expression: Box::new(expression),
            },
            Conversion::None => {
                let (from, to) = (from.to_string(), ty.to_string());
                self.report(span, &messages::CANNOT_CONVERT_TYPE_0_TO_1, &[&from, &to]);
                BoundExpression::error(span)
            }
        }
    }

    fn bind_name(&mut self, name: &Identifier<'_>) -> BoundExpression {
        let span = name.span();
        // The parser already reported a missing identifier.
        if name.text.is_empty() {
            return BoundExpression::error(span);
        }
        match self.lookup_variable(name.text) {
            Some(variable) => match variable.constant_value() {
                Some(value) => BoundExpression::literal(span, value.clone()),
                None => BoundExpression::Variable { span, variable },
            },
            None => {
                self.report(span, &messages::UNDEFINED_VARIABLE_0, &[name.text]);
                BoundExpression::error(span)
            }
        }
    }

    fn bind_assignment(&mut self, assignment: &'a AssignmentExpression<'a>, context: &BindContext) -> BoundExpression {
        let span = assignment.data.span;
        let value = self.bind_value(assignment.value, context);
        let name = assignment.name;
        if name.text.is_empty() {
            return BoundExpression::error(span);
        }
        let Some(variable) = self.lookup_variable(name.text) else {
            self.report(name.span(), &messages::UNDEFINED_VARIABLE_0, &[name.text]);
            return BoundExpression::error(span);
        };
        if variable.is_read_only() {
            self.report(span, &messages::VARIABLE_0_IS_READ_ONLY, &[name.text]);
            return BoundExpression::error(span);
        }

        let value = match assignment.operator.compound_assignment_operator() {
            None => value,
            Some(_) if value.ty().is_error() || variable.ty.is_error() => return BoundExpression::error(span),
            Some(operator) => match bind_binary_operator(operator, &variable.ty, &value.ty()) {
                Some(op) => BoundExpression::Binary {
                    span,
                    left: Box::new(BoundExpression::Variable {
                        span: name.span(),
                        variable: variable.clone(),
                    }),
                    op,
                    right: Box::new(value),
                },
                None => {
                    let (left, right) = (variable.ty.to_string(), value.ty().to_string());
                    self.report(
                        assignment.operator_span,
                        &messages::BINARY_OPERATOR_0_IS_NOT_DEFINED_FOR_TYPES_1_AND_2,
                        &[operator_text(operator), &left, &right],
                    );
                    return BoundExpression::error(span);
                }
            },
        };

        let value = self.bind_conversion(value, &variable.ty);
        BoundExpression::Assignment {
            span,
            variable,
            value: Box::new(value),
        }
    }

    fn bind_unary(&mut self, unary: &'a UnaryExpression<'a>, postfix: bool, context: &BindContext) -> BoundExpression {
        let span = unary.data.span;
        if matches!(unary.operator, SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken) {
            return self.bind_increment(unary, postfix);
        }

        let operand = self.bind_value(unary.operand, context);
        if operand.ty().is_error() {
            return BoundExpression::error(span);
        }
        match bind_prefix_operator(unary.operator, &operand.ty()) {
            Some(op) => BoundExpression::Unary {
                span,
                op,
                operand: Box::new(operand),
            },
            None => {
                let ty = operand.ty().to_string();
                self.report(
                    unary.operator_span,
                    &messages::UNARY_OPERATOR_0_IS_NOT_DEFINED_FOR_TYPE_1,
                    &[operator_text(unary.operator), &ty],
                );
                BoundExpression::error(span)
            }
        }
    }

    fn bind_increment(&mut self, unary: &'a UnaryExpression<'a>, postfix: bool) -> BoundExpression {
        let span = unary.data.span;
        let Expression::Name(name) = unary.operand.skip_parentheses() else {
            self.report(unary.operand.span(), &messages::INCREMENT_OPERAND_MUST_BE_A_VARIABLE, &[]);
            return BoundExpression::error(span);
        };
        if name.text.is_empty() {
            return BoundExpression::error(span);
        }
        let Some(variable) = self.lookup_variable(name.text) else {
            self.report(name.span(), &messages::UNDEFINED_VARIABLE_0, &[name.text]);
            return BoundExpression::error(span);
        };
        if variable.is_read_only() {
            self.report(span, &messages::VARIABLE_0_IS_READ_ONLY, &[name.text]);
            return BoundExpression::error(span);
        }
        if variable.ty.is_error() {
            return BoundExpression::error(span);
        }

        let op = if postfix {
            bind_postfix_operator(unary.operator, &variable.ty)
        } else {
            bind_prefix_operator(unary.operator, &variable.ty)
        };
        match op {
            Some(op) => BoundExpression::Unary {
                span,
                op,
                operand: Box::new(BoundExpression::Variable {
                    span: name.span(),
                    variable,
                }),
            },
            None => {
                let ty = variable.ty.to_string();
                self.report(
                    unary.operator_span,
                    &messages::UNARY_OPERATOR_0_IS_NOT_DEFINED_FOR_TYPE_1,
                    &[operator_text(unary.operator), &ty],
                );
                BoundExpression::error(span)
            }
        }
    }

    fn bind_binary(&mut self, binary: &'a BinaryExpression<'a>, context: &BindContext) -> BoundExpression {
        let span = binary.data.span;
        let left = self.bind_value(binary.left, context);
        let right = self.bind_value(binary.right, context);
        if left.ty().is_error() || right.ty().is_error() {
            return BoundExpression::error(span);
        }
        match bind_binary_operator(binary.operator, &left.ty(), &right.ty()) {
            Some(op) => BoundExpression::Binary {
                span,
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            None => {
                let (l, r) = (left.ty().to_string(), right.ty().to_string());
                self.report(
                    binary.operator_span,
                    &messages::BINARY_OPERATOR_0_IS_NOT_DEFINED_FOR_TYPES_1_AND_2,
                    &[operator_text(binary.operator), &l, &r],
                );
                BoundExpression::error(span)
            }
        }
    }

    // ========================================================================
    // Arrays
    // ========================================================================

    fn bind_array_creation(&mut self, array: &'a ArrayCreationExpression<'a>, context: &BindContext) -> BoundExpression {
        let span = array.data.span;
        let explicit_item = array.item_type.map(|ty| TypeSymbol::from_keyword(ty.keyword, ty.rank));
        let size = array.size.map(|size| {
            let bound = self.bind_value(size, context);
            self.bind_conversion(bound, &TypeSymbol::Int)
        });

        match array.initializer {
            ArrayInitializer::Generator { parameter, body } => {
                if size.is_none() {
                    self.report(span, &messages::ARRAY_GENERATOR_REQUIRES_A_SIZE, &[]);
                    return BoundExpression::error(span);
                }
                self.push_scope();
                let index = VariableSymbol::local(parameter.text, true, TypeSymbol::Int);
                self.current_scope().declare_variable(index.clone());
                let body = self.bind_value(body, context);
                self.pop_scope();

                let (item_type, body) = match explicit_item {
                    Some(ty) => {
                        let body = self.bind_conversion(body, &ty);
                        (ty, body)
                    }
                    None => (body.ty(), body),
                };
                BoundExpression::ArrayInitialization {
                    span,
                    ty: TypeSymbol::array_of(item_type),
                    size: size.map(Box::new),
                    initializer: BoundArrayInitializer::Generator {
                        index,
                        body: Box::new(body),
                    },
                }
            }
            ArrayInitializer::Items(items) => {
                let bound: Vec<BoundExpression> = items.iter().map(|item| self.bind_value(item, context)).collect();
                let item_type = explicit_item.unwrap_or_else(|| {
                    bound
                        .iter()
                        .map(BoundExpression::ty)
                        .reduce(|common, ty| common.common_type(&ty))
                        .unwrap_or(TypeSymbol::Object)
                });

                if let Some(ConstantValue::Int(count)) = size.as_ref().and_then(constant_of) {
                    if !bound.is_empty() && count != bound.len() as i64 {
                        let (count, len) = (count.to_string(), bound.len().to_string());
                        self.report(span, &messages::ARRAY_SIZE_0_DOES_NOT_MATCH_1_ELEMENTS, &[&count, &len]);
                        return BoundExpression::error(span);
                    }
                }

                let items = bound
                    .into_iter()
                    .map(|item| self.bind_conversion(item, &item_type))
                    .collect();
                BoundExpression::ArrayInitialization {
                    span,
                    ty: TypeSymbol::array_of(item_type),
                    size: size.map(Box::new),
                    initializer: BoundArrayInitializer::Items(items),
                }
            }
        }
    }

    // ========================================================================
    // Calls
    // ========================================================================

    fn bind_call(
        &mut self,
        call: &'a CallExpression<'a>,
        piped: Option<&'a Expression<'a>>,
        context: &BindContext,
    ) -> BoundExpression {
        let span = call.data.span;
        let callee = call.callee.text();

        let mut piped = piped;
        let mut arguments = Vec::with_capacity(call.arguments.len() + 1);
        for argument in call.arguments {
            let bound = match (argument, piped.take()) {
                (Expression::Placeholder(_), Some(left)) => self.bind_value(left, context),
                (_, left) => {
                    piped = left;
                    self.bind_value(argument, context)
                }
            };
            arguments.push(bound);
        }
        if let Some(left) = piped {
            arguments.push(self.bind_value(left, context));
        }

        let candidates = match self.resolve_method(&call.callee, context) {
            MethodLookup::Found(candidates) => candidates,
            MethodLookup::Ambiguous(names) => {
                let names = quote_all(names);
                self.report(call.callee.data.span, &messages::THE_CALL_TO_0_IS_AMBIGUOUS_BETWEEN_1, &[&callee, &names]);
                return BoundExpression::error(span);
            }
            MethodLookup::Blocked => {
                self.blocked = true;
                return BoundExpression::error(span);
            }
            MethodLookup::Inferring => return BoundExpression::error(span),
            MethodLookup::Undefined => {
                self.report(call.callee.data.span, &messages::UNDEFINED_METHOD_0, &[&callee]);
                if !context.is_analysis() {
                    let placeholder = MethodSymbol::new(
                        None,
                        &callee,
                        Vec::new(),
                        TypeSymbol::Error,
                        MethodFlags::PLACEHOLDER,
                        Some(call.callee.data.span),
                    );
                    self.methods.declare(placeholder);
                }
                return BoundExpression::error(span);
            }
        };

        if candidates.iter().any(|m| m.is_placeholder()) {
            return BoundExpression::error(span);
        }
        let Some(method) = self.select_overload(&callee, span, &candidates, &arguments) else {
            return BoundExpression::error(span);
        };

        let arguments: Vec<BoundExpression> = arguments
            .into_iter()
            .zip(&method.parameters)
            .map(|(argument, parameter)| self.bind_conversion(argument, &parameter.ty))
            .collect();
        if arguments.iter().any(|a| a.ty().is_error()) {
            return BoundExpression::error(span);
        }
        BoundExpression::Call {
            span,
            method,
            arguments,
        }
    }

    fn select_overload(
        &mut self,
        callee: &str,
        span: TextSpan,
        candidates: &[MethodRef],
        arguments: &[BoundExpression],
    ) -> Option<MethodRef> {
        let by_arity: Vec<&MethodRef> = candidates
            .iter()
            .filter(|m| m.parameters.len() == arguments.len())
            .collect();

        match by_arity.as_slice() {
            [] => {
                let expected = candidates.first().map_or(0, |m| m.parameters.len()).to_string();
                let given = arguments.len().to_string();
                self.report(span, &messages::METHOD_0_REQUIRES_1_ARGUMENTS_BUT_WAS_GIVEN_2, &[callee, &expected, &given]);
                None
            }
            [single] => Some(Arc::clone(single)),
            _ => {
                let applies = |method: &MethodRef, test: fn(Conversion) -> bool| {
                    arguments
                        .iter()
                        .zip(&method.parameters)
                        .all(|(argument, parameter)| test(Conversion::classify(&argument.ty(), &parameter.ty)))
                };
                if let Some(exact) = by_arity.iter().find(|m| applies(m, Conversion::is_identity)) {
                    return Some(Arc::clone(exact));
                }
                let implicit: Vec<&&MethodRef> = by_arity.iter().filter(|m| applies(m, Conversion::is_implicit)).collect();
                match implicit.as_slice() {
                    [single] => Some(Arc::clone(single)),
                    [] => Some(Arc::clone(by_arity[0])),
                    several => {
                        let names = quote_all(several.iter().map(|m| m.signature()));
                        self.report(span, &messages::THE_CALL_TO_0_IS_AMBIGUOUS_BETWEEN_1, &[callee, &names]);
                        None
                    }
                }
            }
        }
    }

    fn probe_method(&self, full_name: &str) -> Option<MethodLookup> {
        if self.inferring.as_deref() == Some(full_name) {
            return Some(MethodLookup::Inferring);
        }
        if self.pending.contains(full_name) {
            return Some(MethodLookup::Blocked);
        }
        self.methods
            .lookup(full_name)
            .map(|methods| MethodLookup::Found(methods.to_vec()))
    }

    fn resolve_method(&self, callee: &QualifiedName<'_>, context: &BindContext) -> MethodLookup {
        if callee.segments.len() > 1 {
            return self.resolve_qualified(callee, context);
        }
        let name = callee.last().text;

        // Enclosing local methods, innermost first.
        if let Some(path) = context.method_path.as_deref().filter(|p| *p != SCRIPT_METHOD_NAME) {
            let mut prefix = path;
            loop {
                let local = format!("{}{}{}", prefix, LOCAL_METHOD_SEPARATOR, name);
                if let Some(found) = self.probe_method(&context.qualify(&local)) {
                    return found;
                }
                match prefix.rfind(LOCAL_METHOD_SEPARATOR) {
                    Some(end) => prefix = &prefix[..end],
                    None => break,
                }
            }
        }

        let mut full_names: Vec<String> = Vec::new();
        let namespaces = context.namespace.iter().chain(&context.includes);
        for namespace in namespaces {
            let full_name = namespace.qualify(name);
            if !full_names.contains(&full_name) {
                full_names.push(full_name);
            }
        }
        let hits: Vec<(String, MethodLookup)> = full_names
            .into_iter()
            .filter_map(|full_name| self.probe_method(&full_name).map(|found| (full_name, found)))
            .collect();
        if hits.iter().any(|(_, found)| matches!(found, MethodLookup::Blocked)) {
            return MethodLookup::Blocked;
        }
        match hits.len() {
            0 => {}
            1 => return hits.into_iter().next().map_or(MethodLookup::Undefined, |(_, found)| found),
            _ => return MethodLookup::Ambiguous(hits.into_iter().map(|(full_name, _)| full_name).collect()),
        }

        if let Some(found) = self.probe_method(name) {
            return found;
        }
        root_methods()
            .lookup(name)
            .map_or(MethodLookup::Undefined, |methods| MethodLookup::Found(methods.to_vec()))
    }

    fn resolve_qualified(&self, callee: &QualifiedName<'_>, context: &BindContext) -> MethodLookup {
        let qualifier = callee.qualifier();
        let name = callee.last().text;

        if let Some(namespace) = context.alias(qualifier[0].text) {
            let rest: Vec<&str> = qualifier[1..].iter().map(|s| s.text).collect();
            let full_name = namespace.join(&rest).qualify(name);
            return self.probe_method(&full_name).unwrap_or(MethodLookup::Undefined);
        }

        let dotted = callee.text();
        if let Some(found) = self.probe_method(&dotted) {
            return found;
        }
        context
            .namespace
            .as_ref()
            .and_then(|namespace| self.probe_method(&namespace.qualify(&dotted)))
            .unwrap_or(MethodLookup::Undefined)
    }
}
