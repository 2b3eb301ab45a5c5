//! The label-indexed interpreter.
//!
//! Each lowered method body is a flat statement list. Before a body first
//! runs, its labels are indexed by position so that a jump is a single map
//! lookup. Every call pushes a frame of variable values keyed by symbol id.

use crate::error::RuntimeError;
use crate::value::Value;
use rustc_hash::FxHashMap;
use sable_bound::folding::{convert, evaluate_binary, evaluate_unary};
use sable_bound::intrinsics::{self, Intrinsic};
use sable_bound::operators::BoundBinaryOperatorKind;
use sable_bound::symbols::SymbolId;
use sable_bound::tree::*;
use sable_bound::types::TypeSymbol;
use std::io::{BufRead, Write};
use std::rc::Rc;
use std::sync::Arc;

type Result<T> = std::result::Result<T, RuntimeError>;

/// A lowered body with its label positions.
struct MethodBody<'p> {
    statements: &'p [BoundStatement],
    labels: FxHashMap<SymbolId, usize>,
}

impl<'p> MethodBody<'p> {
    fn new(method: &'p BoundMethod) -> Self {
        let statements = method.statements();
        let labels = statements
            .iter()
            .enumerate()
            .filter_map(|(index, statement)| match statement {
                BoundStatement::Label { label } => Some((label.id, index)),
                _ => None,
            })
            .collect();
        Self { statements, labels }
    }

    fn target(&self, label: &LabelRef) -> usize {
        match self.labels.get(&label.id) {
            Some(index) => *index,
            None => unreachable!("jump to label '{}' outside its method", label.name),
        }
    }
}

/// Variable values of one method invocation.
#[derive(Default)]
pub(crate) struct Frame {
    values: FxHashMap<SymbolId, Value>,
    /// Variables in the order they were first declared.
    pub(crate) declared: Vec<VariableRef>,
}

impl Frame {
    fn declare(&mut self, variable: &VariableRef, value: Value) {
        if self.values.insert(variable.id, value).is_none() {
            self.declared.push(variable.clone());
        }
    }

    pub(crate) fn get(&self, variable: &VariableRef) -> Option<&Value> {
        self.values.get(&variable.id)
    }

    fn remove(&mut self, variable: &VariableRef) {
        if self.values.remove(&variable.id).is_some() {
            self.declared.retain(|v| v.id != variable.id);
        }
    }
}

pub struct Evaluator<'p, 'io> {
    program: &'p BoundProgram,
    bodies: FxHashMap<SymbolId, Rc<MethodBody<'p>>>,
    frames: Vec<Frame>,
    input: &'io mut dyn BufRead,
    output: &'io mut dyn Write,
    /// Value of the last expression statement or initializer run by the entry method.
    last_value: Value,
}

impl<'p, 'io> Evaluator<'p, 'io> {
    pub fn new(program: &'p BoundProgram, input: &'io mut dyn BufRead, output: &'io mut dyn Write) -> Self {
        Self {
            program,
            bodies: FxHashMap::default(),
            frames: Vec::new(),
            input,
            output,
            last_value: Value::Void,
        }
    }

    /// Run the entry point. Returns the result value and the entry method's
    /// final frame.
    pub(crate) fn run(&mut self, entry_point: &MethodRef) -> Result<(Value, Frame)> {
        self.frames.push(Frame::default());
        let returned = self.run_body(entry_point)?;
        self.output.flush()?;
        let frame = self.frames.pop().unwrap_or_default();
        let value = match returned {
            Some(value) => value,
            None if entry_point.is_script() => std::mem::replace(&mut self.last_value, Value::Void),
            None => Value::Void,
        };
        Ok((value, frame))
    }

    fn body(&mut self, method: &MethodRef) -> Rc<MethodBody<'p>> {
        let program = self.program;
        self.bodies
            .entry(method.id)
            .or_insert_with(|| match program.find_method(method) {
                Some(bound) => Rc::new(MethodBody::new(bound)),
                None => unreachable!("method '{}' has no body", method.full_name),
            })
            .clone()
    }

    fn frame(&mut self) -> &mut Frame {
        self.frames.last_mut().unwrap_or_else(|| unreachable!("no active frame"))
    }

    fn is_entry_frame(&self) -> bool {
        self.frames.len() == 1
    }

    /// Run a body in the current frame. `None` means it ran off the end.
    fn run_body(&mut self, method: &MethodRef) -> Result<Option<Value>> {
        let body = self.body(method);
        let mut index = 0;
        while let Some(statement) = body.statements.get(index) {
            index += 1;
            match statement {
                BoundStatement::VariableDeclaration { variable, initializer } => {
                    let value = self.evaluate_expression(initializer)?;
                    if self.is_entry_frame() {
                        self.last_value = value.clone();
                    }
                    self.frame().declare(variable, value);
                }
                BoundStatement::Expression { expression } => {
                    let value = self.evaluate_expression(expression)?;
                    if self.is_entry_frame() && !expression.ty().is_void() {
                        self.last_value = value;
                    }
                }
                BoundStatement::Goto { label } => index = body.target(label),
                BoundStatement::ConditionalGoto {
                    label,
                    condition,
                    jump_if_true,
                } => {
                    let condition = self.evaluate_expression(condition)?;
                    if condition.as_bool() == Some(*jump_if_true) {
                        index = body.target(label);
                    }
                }
                BoundStatement::Return { expression } => {
                    let value = match expression {
                        Some(expression) => self.evaluate_expression(expression)?,
                        None => Value::Void,
                    };
                    return Ok(Some(value));
                }
                BoundStatement::Label { .. } | BoundStatement::MethodDeclaration { .. } | BoundStatement::NoOp => {}
                BoundStatement::Block { .. }
                | BoundStatement::If { .. }
                | BoundStatement::While { .. }
                | BoundStatement::For { .. } => unreachable!("structured statement in a lowered body"),
            }
        }
        Ok(None)
    }

    fn evaluate_expression(&mut self, expression: &BoundExpression) -> Result<Value> {
        match expression {
            BoundExpression::Literal { value, .. } => Ok(Value::from(value)),
            BoundExpression::Variable { variable, .. } => Ok(self.read(variable)),
            BoundExpression::Assignment { variable, value, .. } => {
                let value = self.evaluate_expression(value)?;
                self.frame().declare(variable, value.clone());
                Ok(value)
            }
            BoundExpression::Unary { op, operand, .. } => {
                if op.kind.is_increment_or_decrement() {
                    let BoundExpression::Variable { variable, .. } = operand.as_ref() else {
                        unreachable!("increment of a non-variable");
                    };
                    let old = self.read(variable);
                    let new = Value::from(evaluate_unary(op.kind, &primitive(&old)?)?);
                    self.frame().declare(variable, new.clone());
                    return Ok(if op.kind.is_postfix() { old } else { new });
                }
                let operand = self.evaluate_expression(operand)?;
                Ok(Value::from(evaluate_unary(op.kind, &primitive(&operand)?)?))
            }
            BoundExpression::Binary { left, op, right, .. } => {
                let left = self.evaluate_expression(left)?;
                match (op.kind, left.as_bool()) {
                    (BoundBinaryOperatorKind::LogicalAnd, Some(false)) => return Ok(Value::Bool(false)),
                    (BoundBinaryOperatorKind::LogicalOr, Some(true)) => return Ok(Value::Bool(true)),
                    _ => {}
                }
                let right = self.evaluate_expression(right)?;
                match op.kind {
                    BoundBinaryOperatorKind::Equals => Ok(Value::Bool(left == right)),
                    BoundBinaryOperatorKind::NotEquals => Ok(Value::Bool(left != right)),
                    kind => Ok(Value::from(evaluate_binary(kind, &primitive(&left)?, &primitive(&right)?)?)),
                }
            }
            BoundExpression::Call { method, arguments, .. } => {
                let arguments = arguments
                    .iter()
                    .map(|argument| self.evaluate_expression(argument))
                    .collect::<Result<Vec<_>>>()?;
                self.call(method, arguments)
            }
            BoundExpression::ExplicitCast { ty, expression, .. } => {
                let value = self.evaluate_expression(expression)?;
                convert_value(value, ty)
            }
            BoundExpression::ArrayInitialization {
                ty,
                size,
                initializer,
                ..
            } => self.evaluate_array(ty, size.as_deref(), initializer),
            BoundExpression::Error { .. } => unreachable!("error expression reached the evaluator"),
        }
    }

    fn read(&self, variable: &VariableRef) -> Value {
        if let Some(value) = variable.constant_value() {
            return Value::from(value);
        }
        self.frames
            .last()
            .and_then(|frame| frame.get(variable))
            .cloned()
            // A jump may skip a declaration; the slot then holds its default.
            .unwrap_or_else(|| Value::default_for(&variable.ty))
    }

    fn evaluate_array(
        &mut self,
        ty: &TypeSymbol,
        size: Option<&BoundExpression>,
        initializer: &BoundArrayInitializer,
    ) -> Result<Value> {
        let size = match size {
            Some(size) => {
                let size = self.evaluate_expression(size)?.as_int().unwrap_or_default();
                if size < 0 {
                    return Err(RuntimeError::IndexOutOfRange(size));
                }
                Some(size)
            }
            None => None,
        };

        let items: Vec<Value> = match initializer {
            BoundArrayInitializer::Items(items) if items.is_empty() => {
                let item_type = ty.item_type().cloned().unwrap_or(TypeSymbol::Object);
                (0..size.unwrap_or_default())
                    .map(|_| Value::default_for(&item_type))
                    .collect()
            }
            BoundArrayInitializer::Items(items) => items
                .iter()
                .map(|item| self.evaluate_expression(item))
                .collect::<Result<_>>()?,
            BoundArrayInitializer::Generator { index, body } => {
                let mut items = Vec::new();
                for i in 0..size.unwrap_or_default() {
                    self.frame().declare(index, Value::Int(i));
                    items.push(self.evaluate_expression(body)?);
                }
                // The index is scoped to the generator body.
                self.frame().remove(index);
                items
            }
        };
        Ok(Value::Array(Arc::from(items)))
    }

    fn call(&mut self, method: &MethodRef, arguments: Vec<Value>) -> Result<Value> {
        if let Some(intrinsic) = intrinsics::lookup(method.id) {
            return self.call_intrinsic(intrinsic, arguments);
        }
        tracing::trace!(method = %method.full_name, depth = self.frames.len(), "call");

        let mut frame = Frame::default();
        for (parameter, argument) in method.parameters.iter().zip(arguments) {
            frame.declare(parameter, argument);
        }
        self.frames.push(frame);
        let result = self.run_body(method);
        self.frames.pop();
        Ok(result?.unwrap_or(Value::Void))
    }

    fn call_intrinsic(&mut self, intrinsic: Intrinsic, arguments: Vec<Value>) -> Result<Value> {
        let mut arguments = arguments.into_iter();
        let mut next = || arguments.next().unwrap_or(Value::Void);
        let value = match intrinsic {
            Intrinsic::Print => {
                writeln!(self.output, "{}", next())?;
                Value::Void
            }
            Intrinsic::Write => {
                write!(self.output, "{}", next())?;
                self.output.flush()?;
                Value::Void
            }
            Intrinsic::Input => {
                self.output.flush()?;
                let mut line = String::new();
                self.input.read_line(&mut line)?;
                let line = line.trim_end_matches(['\n', '\r']);
                Value::from(line)
            }
            Intrinsic::Length => Value::Int(text_of(next())?.chars().count() as i64),
            Intrinsic::CharAt => {
                let text = text_of(next())?;
                let index = next().as_int().unwrap_or_default();
                usize::try_from(index)
                    .ok()
                    .and_then(|i| text.chars().nth(i))
                    .map(Value::Char)
                    .ok_or(RuntimeError::IndexOutOfRange(index))?
            }
            Intrinsic::Count => Value::Int(array_of(next())?.len() as i64),
            Intrinsic::ElementAt => {
                let items = array_of(next())?;
                let index = next().as_int().unwrap_or_default();
                usize::try_from(index)
                    .ok()
                    .and_then(|i| items.get(i))
                    .cloned()
                    .ok_or(RuntimeError::IndexOutOfRange(index))?
            }
            Intrinsic::ReadFile => {
                let path = text_of(next())?;
                match std::fs::read_to_string(&*path) {
                    Ok(text) => Value::from(text.as_str()),
                    Err(source) => {
                        return Err(RuntimeError::ReadFile {
                            path: path.to_string(),
                            source,
                        })
                    }
                }
            }
        };
        Ok(value)
    }
}

/// The primitive payload of an operand; the binder only lets primitives reach operators.
fn primitive(value: &Value) -> Result<sable_bound::constant::ConstantValue> {
    value.to_constant().ok_or(RuntimeError::InvalidOperands("primitive"))
}

fn text_of(value: Value) -> Result<Arc<str>> {
    match value {
        Value::String(text) => Ok(text),
        other => Err(RuntimeError::InvalidConversion {
            value: other.to_string(),
            ty: TypeSymbol::String,
        }),
    }
}

fn array_of(value: Value) -> Result<Arc<[Value]>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(RuntimeError::InvalidConversion {
            value: other.to_string(),
            ty: TypeSymbol::array_of(TypeSymbol::Object),
        }),
    }
}

/// Apply a cast at run time. Values boxed as `object` are checked against the target.
fn convert_value(value: Value, ty: &TypeSymbol) -> Result<Value> {
    match (&value, ty) {
        (_, TypeSymbol::Object) => Ok(value),
        (Value::Array(_), TypeSymbol::Array(_)) => Ok(value),
        (Value::Array(_), TypeSymbol::String) => Ok(Value::from(value.to_string().as_str())),
        _ => match value.to_constant() {
            Some(constant) => Ok(Value::from(convert(&constant, ty)?)),
            None => Err(RuntimeError::InvalidConversion {
                value: value.to_string(),
                ty: ty.clone(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_value() {
        assert_eq!(convert_value(Value::Int(3), &TypeSymbol::Float).unwrap(), Value::Float(3.0));
        assert_eq!(convert_value(Value::from("42"), &TypeSymbol::Int).unwrap(), Value::Int(42));
        assert!(matches!(
            convert_value(Value::from("x"), &TypeSymbol::Int),
            Err(RuntimeError::InvalidConversion { .. })
        ));
        assert!(matches!(
            convert_value(Value::Void, &TypeSymbol::Int),
            Err(RuntimeError::InvalidConversion { .. })
        ));
    }
}
