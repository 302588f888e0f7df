//! Type coercions and operators of the embedded language.
//!
//! Null reads as `false` in boolean context, `0` in numeric context and `""`
//! in string context. Strings parse to numbers and booleans on demand.

use std::cmp::Ordering;

use verdict_lang::BinaryOp;

use crate::error::EvaluationError;
use crate::value::Value;

/// A numeric operand after coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub(crate) fn as_i64(self) -> i64 {
        match self {
            Number::Int(i) => i,
            Number::Float(f) => f as i64,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Number::Int(i) => Value::Int(i),
            Number::Float(f) => Value::Float(f),
        }
    }
}

pub(crate) fn to_boolean(value: &Value) -> Result<bool, EvaluationError> {
    match value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::String(s) => Ok(s.eq_ignore_ascii_case("true")),
        other => Err(EvaluationError::coercion(other, "boolean")),
    }
}

pub(crate) fn to_number(value: &Value) -> Result<Number, EvaluationError> {
    match value {
        Value::Null => Ok(Number::Int(0)),
        Value::Int(i) => Ok(Number::Int(*i)),
        Value::Float(f) => Ok(Number::Float(*f)),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(Number::Int(0));
            }
            let parsed = if is_float_text(s) {
                s.parse::<f64>().ok().map(Number::Float)
            } else {
                s.parse::<i64>().ok().map(Number::Int)
            };
            parsed.ok_or_else(|| EvaluationError::coercion(value, "number"))
        }
        other => Err(EvaluationError::coercion(other, "number")),
    }
}

pub(crate) fn to_string(value: &Value) -> Result<String, EvaluationError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(format_float(*f)),
        other => Err(EvaluationError::coercion(other, "string")),
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

fn is_float_text(s: &str) -> bool {
    s.contains(['.', 'e', 'E'])
}

/// Whether arithmetic on this operand must be done in floating point.
fn is_float_like(value: &Value) -> bool {
    match value {
        Value::Float(_) => true,
        Value::String(s) => is_float_text(s),
        _ => false,
    }
}

pub(crate) fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Bytes(b) => b.is_empty(),
        Value::List(items) => items.is_empty(),
        Value::Map(map) => map.is_empty(),
        _ => false,
    }
}

pub(crate) fn negate(value: &Value) -> Result<Value, EvaluationError> {
    match value {
        Value::Null | Value::String(_) => match to_number(value)? {
            Number::Int(i) => Ok(negate_int(i)),
            Number::Float(f) => Ok(Value::Float(-f)),
        },
        Value::Int(i) => Ok(negate_int(*i)),
        Value::Float(f) => Ok(Value::Float(-f)),
        other => Err(EvaluationError::coercion(other, "number")),
    }
}

fn negate_int(i: i64) -> Value {
    i.checked_neg()
        .map(Value::Int)
        .unwrap_or(Value::Float(-(i as f64)))
}

/// `+ - * / %`. Integer overflow promotes to floating point.
pub(crate) fn arithmetic(op: BinaryOp, a: &Value, b: &Value) -> Result<Value, EvaluationError> {
    if a.is_null() && b.is_null() {
        return Ok(Value::Int(0));
    }

    let x = to_number(a)?;
    let y = to_number(b)?;
    let float = is_float_like(a) || is_float_like(b);

    match op {
        BinaryOp::Div => {
            let divisor = y.as_f64();
            if divisor == 0.0 {
                return Err(EvaluationError::DivisionByZero);
            }
            Ok(Value::Float(x.as_f64() / divisor))
        }
        BinaryOp::Mod if float => {
            let divisor = y.as_f64();
            if divisor == 0.0 {
                return Err(EvaluationError::DivisionByZero);
            }
            Ok(Value::Float(x.as_f64() % divisor))
        }
        BinaryOp::Mod => {
            let divisor = y.as_i64();
            if divisor == 0 {
                return Err(EvaluationError::DivisionByZero);
            }
            Ok(Value::Int(x.as_i64().wrapping_rem(divisor)))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul if float => {
            let (x, y) = (x.as_f64(), y.as_f64());
            let r = match op {
                BinaryOp::Add => x + y,
                BinaryOp::Sub => x - y,
                _ => x * y,
            };
            Ok(Value::Float(r))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
            let (xi, yi) = (x.as_i64(), y.as_i64());
            let checked = match op {
                BinaryOp::Add => xi.checked_add(yi),
                BinaryOp::Sub => xi.checked_sub(yi),
                _ => xi.checked_mul(yi),
            };
            let result = match checked {
                Some(r) => Number::Int(r),
                None => {
                    let (xf, yf) = (x.as_f64(), y.as_f64());
                    Number::Float(match op {
                        BinaryOp::Add => xf + yf,
                        BinaryOp::Sub => xf - yf,
                        _ => xf * yf,
                    })
                }
            };
            Ok(result.into_value())
        }
        other => Err(EvaluationError::invalid_argument(
            other.symbol(),
            "not an arithmetic operator",
        )),
    }
}

/// `==` with EL coercion order: number, then boolean, then string.
pub(crate) fn equals(a: &Value, b: &Value) -> Result<bool, EvaluationError> {
    match (a, b) {
        (Value::Null, Value::Null) => return Ok(true),
        (Value::Null, _) | (_, Value::Null) => return Ok(false),
        _ => {}
    }

    let numeric = |v: &Value| matches!(v, Value::Int(_) | Value::Float(_));
    if numeric(a) || numeric(b) {
        let (x, y) = (to_number(a)?, to_number(b)?);
        return Ok(match (x, y) {
            (Number::Int(x), Number::Int(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        });
    }
    if matches!(a, Value::Bool(_)) || matches!(b, Value::Bool(_)) {
        return Ok(to_boolean(a)? == to_boolean(b)?);
    }
    if matches!(a, Value::String(_)) || matches!(b, Value::String(_)) {
        return Ok(to_string(a)? == to_string(b)?);
    }
    Ok(a == b)
}

/// Ordering for `< > <= >=`. `None` when either side is null.
pub(crate) fn compare(a: &Value, b: &Value) -> Result<Option<Ordering>, EvaluationError> {
    match (a, b) {
        (Value::Null, Value::Null) => return Ok(Some(Ordering::Equal)),
        (Value::Null, _) | (_, Value::Null) => return Ok(None),
        _ => {}
    }

    let numeric = |v: &Value| matches!(v, Value::Int(_) | Value::Float(_));
    if numeric(a) || numeric(b) {
        let (x, y) = (to_number(a)?, to_number(b)?);
        return Ok(match (x, y) {
            (Number::Int(x), Number::Int(y)) => Some(x.cmp(&y)),
            _ => x.as_f64().partial_cmp(&y.as_f64()),
        });
    }
    match (a, b) {
        (Value::String(_), _) | (_, Value::String(_)) => {
            Ok(Some(to_string(a)?.cmp(&to_string(b)?)))
        }
        (Value::Bool(x), Value::Bool(y)) => Ok(Some(x.cmp(y))),
        _ => Err(EvaluationError::Coercion {
            from: a.type_name(),
            to: b.type_name(),
        }),
    }
}

/// Apply a relational operator to an ordering.
pub(crate) fn relational(op: BinaryOp, ordering: Option<Ordering>) -> bool {
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Ge => ordering != Ordering::Less,
        _ => false,
    }
}
