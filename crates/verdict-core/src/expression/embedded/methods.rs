//! Built-in methods on strings, collections and scalars.
//!
//! String positions count Unicode scalar values.

use super::coerce::{equals, to_number, to_string};
use crate::error::EvaluationError;
use crate::value::Value;

/// Invoke a built-in method, or `Ok(None)` if `base` has no such method.
pub(crate) fn invoke(
    base: &Value,
    method: &str,
    args: &[Value],
) -> Result<Option<Value>, EvaluationError> {
    match base {
        Value::String(s) => string_method(s, method, args),
        Value::List(items) => list_method(items, method, args),
        Value::Map(map) => map_method(map, method, args),
        Value::Bytes(bytes) => match method {
            "length" | "size" => {
                expect_args(method, args, 0)?;
                Ok(Some(Value::Int(bytes.len() as i64)))
            }
            _ => Ok(None),
        },
        Value::Bool(_) | Value::Int(_) | Value::Float(_) => match method {
            "toString" => {
                expect_args(method, args, 0)?;
                Ok(Some(Value::String(to_string(base)?)))
            }
            "equals" => {
                expect_args(method, args, 1)?;
                Ok(Some(Value::Bool(equals(base, &args[0])?)))
            }
            _ => Ok(None),
        },
        Value::Null | Value::Bean(_) => Ok(None),
    }
}

fn string_method(s: &str, method: &str, args: &[Value]) -> Result<Option<Value>, EvaluationError> {
    let value = match method {
        "length" => {
            expect_args(method, args, 0)?;
            Value::Int(s.chars().count() as i64)
        }
        "isEmpty" => {
            expect_args(method, args, 0)?;
            Value::Bool(s.is_empty())
        }
        "isBlank" => {
            expect_args(method, args, 0)?;
            Value::Bool(s.trim().is_empty())
        }
        "trim" => {
            expect_args(method, args, 0)?;
            Value::String(s.trim().to_string())
        }
        "toUpperCase" => {
            expect_args(method, args, 0)?;
            Value::String(s.to_uppercase())
        }
        "toLowerCase" => {
            expect_args(method, args, 0)?;
            Value::String(s.to_lowercase())
        }
        "toString" => {
            expect_args(method, args, 0)?;
            Value::String(s.to_string())
        }
        "startsWith" => Value::Bool(s.starts_with(string_arg(method, args, 0, 1)?.as_str())),
        "endsWith" => Value::Bool(s.ends_with(string_arg(method, args, 0, 1)?.as_str())),
        "contains" => Value::Bool(s.contains(string_arg(method, args, 0, 1)?.as_str())),
        "concat" => Value::String(format!("{}{}", s, string_arg(method, args, 0, 1)?)),
        "equals" => {
            expect_args(method, args, 1)?;
            Value::Bool(matches!(&args[0], Value::String(other) if other == s))
        }
        "equalsIgnoreCase" => {
            let other = string_arg(method, args, 0, 1)?;
            Value::Bool(s.to_lowercase() == other.to_lowercase())
        }
        "indexOf" => Value::Int(char_index_of(s, &string_arg(method, args, 0, 1)?)),
        "charAt" => {
            expect_args(method, args, 1)?;
            let index = to_number(&args[0])?.as_i64();
            let c = usize::try_from(index)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .ok_or_else(|| {
                    EvaluationError::invalid_argument(method, format!("index {} out of range", index))
                })?;
            Value::String(c.to_string())
        }
        "substring" => {
            if args.is_empty() || args.len() > 2 {
                return Err(arity_error(method, "1 or 2", args.len()));
            }
            let len = s.chars().count() as i64;
            let begin = to_number(&args[0])?.as_i64();
            let end = match args.get(1) {
                Some(end) => to_number(end)?.as_i64(),
                None => len,
            };
            if begin < 0 || end > len || begin > end {
                return Err(EvaluationError::invalid_argument(
                    method,
                    format!("range {}..{} out of bounds for length {}", begin, end, len),
                ));
            }
            Value::String(
                s.chars()
                    .skip(begin as usize)
                    .take((end - begin) as usize)
                    .collect(),
            )
        }
        "replace" => {
            if args.len() != 2 {
                return Err(arity_error(method, "2", args.len()));
            }
            Value::String(s.replace(&to_string(&args[0])?, &to_string(&args[1])?))
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn list_method(items: &[Value], method: &str, args: &[Value]) -> Result<Option<Value>, EvaluationError> {
    let value = match method {
        "size" => {
            expect_args(method, args, 0)?;
            Value::Int(items.len() as i64)
        }
        "isEmpty" => {
            expect_args(method, args, 0)?;
            Value::Bool(items.is_empty())
        }
        "contains" => {
            expect_args(method, args, 1)?;
            Value::Bool(items.contains(&args[0]))
        }
        "indexOf" => {
            expect_args(method, args, 1)?;
            Value::Int(
                items
                    .iter()
                    .position(|v| *v == args[0])
                    .map_or(-1, |i| i as i64),
            )
        }
        "get" => {
            expect_args(method, args, 1)?;
            let index = to_number(&args[0])?.as_i64();
            usize::try_from(index)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .ok_or_else(|| {
                    EvaluationError::invalid_argument(
                        method,
                        format!("index {} out of bounds for size {}", index, items.len()),
                    )
                })?
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn map_method(
    map: &std::collections::BTreeMap<String, Value>,
    method: &str,
    args: &[Value],
) -> Result<Option<Value>, EvaluationError> {
    let value = match method {
        "size" => {
            expect_args(method, args, 0)?;
            Value::Int(map.len() as i64)
        }
        "isEmpty" => {
            expect_args(method, args, 0)?;
            Value::Bool(map.is_empty())
        }
        "containsKey" => Value::Bool(map.contains_key(&string_arg(method, args, 0, 1)?)),
        "containsValue" => {
            expect_args(method, args, 1)?;
            Value::Bool(map.values().any(|v| *v == args[0]))
        }
        "get" => map
            .get(&string_arg(method, args, 0, 1)?)
            .cloned()
            .unwrap_or(Value::Null),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn expect_args(method: &str, args: &[Value], count: usize) -> Result<(), EvaluationError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(arity_error(method, &count.to_string(), args.len()))
    }
}

fn arity_error(method: &str, expected: &str, got: usize) -> EvaluationError {
    EvaluationError::invalid_argument(
        method,
        format!("expected {} argument(s), got {}", expected, got),
    )
}

fn string_arg(
    method: &str,
    args: &[Value],
    index: usize,
    count: usize,
) -> Result<String, EvaluationError> {
    expect_args(method, args, count)?;
    to_string(&args[index])
}

/// Character index of the first occurrence of `needle`, or -1.
pub(crate) fn char_index_of(haystack: &str, needle: &str) -> i64 {
    haystack
        .find(needle)
        .map_or(-1, |byte| haystack[..byte].chars().count() as i64)
}
