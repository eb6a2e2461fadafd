use std::cmp::Ordering;

use tracing::{trace, warn};

use crate::{
    ast::{BinaryOp, ConcatPart, Expr, ExprKind, UnaryOp},
    diagnostics::{Diagnostic, DiagnosticKind, SourceSpan},
    parser::{parse_expression, PlusSplit},
    store::VariableStore,
    value::Value,
};

/// Evaluates expression text against `store`, falling back to `Int(0)`
/// when the text does not parse or cannot be evaluated.
pub fn evaluate(source: &str, store: &VariableStore) -> Value {
    evaluate_with(source, store, PlusSplit::default())
}

pub fn evaluate_with(source: &str, store: &VariableStore, split: PlusSplit) -> Value {
    match try_evaluate_with(source, store, split) {
        Ok(value) => value,
        Err(diagnostic) => {
            warn!(expression = source.trim(), "{}", diagnostic.summary());
            Value::Int(0)
        }
    }
}

pub fn try_evaluate(source: &str, store: &VariableStore) -> EvalResult<Value> {
    try_evaluate_with(source, store, PlusSplit::default())
}

pub fn try_evaluate_with(
    source: &str,
    store: &VariableStore,
    split: PlusSplit,
) -> EvalResult<Value> {
    let expr = parse_expression(source, split).map_err(|cause| expression_error(source, cause))?;
    let value = Evaluator::new(store)
        .eval(&expr)
        .map_err(|cause| expression_error(source, cause))?;
    trace!(expression = source.trim(), %value, "evaluated");
    Ok(value)
}

fn expression_error(source: &str, cause: Diagnostic) -> Diagnostic {
    let diagnostic = Diagnostic::new(
        cause.kind.clone(),
        format!("Error evaluating expression: {}", source.trim()),
    )
    .with_note(cause.message);
    match cause.span {
        Some(span) => diagnostic.with_span(span),
        None => diagnostic,
    }
}

/// Walks an [`Expr`] tree. Names resolve only through the store, so the
/// evaluator cannot observe or change anything else.
pub struct Evaluator<'a> {
    store: &'a VariableStore,
}

impl<'a> Evaluator<'a> {
    pub fn new(store: &'a VariableStore) -> Self {
        Self { store }
    }

    pub fn eval(&self, expr: &Expr) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::Literal(value) => Ok(value.clone()),
            ExprKind::Variable(name) => Ok(self.store.lookup(name)),
            ExprKind::Unary { op, expr: operand } => {
                let value = self.eval(operand)?;
                self.unary(*op, value, expr.span)
            }
            ExprKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                if !self.eval(left)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval(right)?.is_truthy()))
            }
            ExprKind::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                if self.eval(left)?.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval(right)?.is_truthy()))
            }
            ExprKind::Binary { op, left, right } => {
                let left_value = self.eval(left)?;
                let right_value = self.eval(right)?;
                self.binary(*op, left_value, right_value, expr.span)
            }
            ExprKind::Concat(parts) => Ok(Value::String(self.concat(parts))),
        }
    }

    fn concat(&self, parts: &[ConcatPart]) -> String {
        let mut result = String::new();
        for part in parts {
            match part {
                ConcatPart::Literal(text) => result.push_str(text),
                ConcatPart::SubExpr { source, expr } => {
                    if let Some(value) = self.store.get(source) {
                        result.push_str(&value.to_string());
                        continue;
                    }
                    match expr.as_ref().map(|expr| self.eval(expr)) {
                        Some(Ok(value)) => result.push_str(&value.to_string()),
                        _ => result.push_str(source),
                    }
                }
            }
        }
        result
    }

    fn binary(
        &self,
        op: BinaryOp,
        left: Value,
        right: Value,
        span: SourceSpan,
    ) -> EvalResult<Value> {
        use BinaryOp::*;
        match op {
            Add | Sub | Mul | Div | FloorDiv | Mod | Pow => {
                let left_num = number(&left, op, span)?;
                let right_num = number(&right, op, span)?;
                match (left_num, right_num) {
                    (Number::Int(a), Number::Int(b)) => int_arithmetic(op, a, b, span),
                    (a, b) => float_arithmetic(op, a.as_f64(), b.as_f64(), span),
                }
            }
            Equal => Ok(Value::Bool(equal(&left, &right))),
            NotEqual => Ok(Value::Bool(!equal(&left, &right))),
            Less | LessEqual | Greater | GreaterEqual => {
                let ordering = compare(&left, &right, op, span)?;
                let result = match (op, ordering) {
                    (_, None) => false,
                    (Less, Some(ord)) => ord == Ordering::Less,
                    (LessEqual, Some(ord)) => ord != Ordering::Greater,
                    (Greater, Some(ord)) => ord == Ordering::Greater,
                    (_, Some(ord)) => ord != Ordering::Less,
                };
                Ok(Value::Bool(result))
            }
            And | Or => unreachable!("logical operators short-circuit in eval"),
        }
    }

    fn unary(&self, op: UnaryOp, value: Value, span: SourceSpan) -> EvalResult<Value> {
        match op {
            UnaryOp::Negate => match value {
                Value::Int(n) => n
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| runtime_error("integer overflow", span)),
                Value::Bool(b) => Ok(Value::Int(-i64::from(b))),
                Value::Float(n) => Ok(Value::Float(-n)),
                Value::String(_) => Err(runtime_error(
                    "unary `-` expects numeric value, found String",
                    span,
                )),
            },
            UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
        }
    }
}

pub type EvalResult<T> = std::result::Result<T, Diagnostic>;

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }
}

fn number(value: &Value, op: BinaryOp, span: SourceSpan) -> EvalResult<Number> {
    match value {
        Value::Int(n) => Ok(Number::Int(*n)),
        Value::Bool(b) => Ok(Number::Int(i64::from(*b))),
        Value::Float(f) => Ok(Number::Float(*f)),
        Value::String(_) => Err(runtime_error(
            format!("unsupported operand for `{}`: String", op.symbol()),
            span,
        )),
    }
}

fn int_arithmetic(op: BinaryOp, a: i64, b: i64, span: SourceSpan) -> EvalResult<Value> {
    let overflow = || runtime_error("integer overflow", span);
    match op {
        BinaryOp::Add => a.checked_add(b).map(Value::Int).ok_or_else(overflow),
        BinaryOp::Sub => a.checked_sub(b).map(Value::Int).ok_or_else(overflow),
        BinaryOp::Mul => a.checked_mul(b).map(Value::Int).ok_or_else(overflow),
        BinaryOp::Div => {
            if b == 0 {
                return Err(division_by_zero(span));
            }
            Ok(Value::Float(a as f64 / b as f64))
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(division_by_zero(span));
            }
            let quotient = a.checked_div(b).ok_or_else(overflow)?;
            if a % b != 0 && (a < 0) != (b < 0) {
                Ok(Value::Int(quotient - 1))
            } else {
                Ok(Value::Int(quotient))
            }
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(division_by_zero(span));
            }
            let remainder = a.checked_rem(b).ok_or_else(overflow)?;
            if remainder != 0 && (remainder < 0) != (b < 0) {
                Ok(Value::Int(remainder + b))
            } else {
                Ok(Value::Int(remainder))
            }
        }
        BinaryOp::Pow => {
            if b >= 0 {
                let Ok(exponent) = u32::try_from(b) else {
                    return match a {
                        0 | 1 => Ok(Value::Int(a)),
                        -1 if b % 2 == 0 => Ok(Value::Int(1)),
                        -1 => Ok(Value::Int(-1)),
                        _ => Err(overflow()),
                    };
                };
                a.checked_pow(exponent).map(Value::Int).ok_or_else(overflow)
            } else if a == 0 {
                Err(runtime_error(
                    "zero cannot be raised to a negative power",
                    span,
                ))
            } else {
                Ok(Value::Float((a as f64).powf(b as f64)))
            }
        }
        _ => unreachable!("non-arithmetic operator `{}`", op.symbol()),
    }
}

fn float_arithmetic(op: BinaryOp, a: f64, b: f64, span: SourceSpan) -> EvalResult<Value> {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod if b == 0.0 => {
            return Err(division_by_zero(span));
        }
        BinaryOp::Div => a / b,
        BinaryOp::FloorDiv => (a / b).floor(),
        BinaryOp::Mod => {
            let remainder = a % b;
            if remainder != 0.0 && (remainder < 0.0) != (b < 0.0) {
                remainder + b
            } else {
                remainder
            }
        }
        BinaryOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(runtime_error(
                    "zero cannot be raised to a negative power",
                    span,
                ));
            }
            let result = a.powf(b);
            if result.is_nan() && !a.is_nan() && !b.is_nan() {
                return Err(runtime_error("math domain error", span));
            }
            if result.is_infinite() && a.is_finite() && b.is_finite() {
                return Err(runtime_error("numerical result out of range", span));
            }
            result
        }
        _ => unreachable!("non-arithmetic operator `{}`", op.symbol()),
    };
    Ok(Value::Float(result))
}

fn equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(a), Value::String(b)) => a == b,
        (Value::String(_), _) | (_, Value::String(_)) => false,
        _ => matches!(numeric_order(left, right), Some(Ordering::Equal)),
    }
}

fn compare(
    left: &Value,
    right: &Value,
    op: BinaryOp,
    span: SourceSpan,
) -> EvalResult<Option<Ordering>> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        (Value::String(_), _) | (_, Value::String(_)) => Err(runtime_error(
            format!(
                "`{}` not supported between {} and {}",
                op.symbol(),
                left.type_name(),
                right.type_name()
            ),
            span,
        )),
        _ => Ok(numeric_order(left, right)),
    }
}

/// Ordering of two non-string values; `None` when a NaN is involved.
fn numeric_order(left: &Value, right: &Value) -> Option<Ordering> {
    let as_number = |value: &Value| match value {
        Value::Int(n) => Some(Number::Int(*n)),
        Value::Bool(b) => Some(Number::Int(i64::from(*b))),
        Value::Float(f) => Some(Number::Float(*f)),
        Value::String(_) => None,
    };
    match (as_number(left)?, as_number(right)?) {
        (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
        (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
    }
}

fn division_by_zero(span: SourceSpan) -> Diagnostic {
    runtime_error("division by zero", span)
}

fn runtime_error(message: impl Into<String>, span: SourceSpan) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::Runtime, message).with_span(span)
}
