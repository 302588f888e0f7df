//! Function table for `prefix:name(...)` calls.
//!
//! The built-in `fn:` functions follow the standard tag library string
//! functions. Null arguments read as empty strings.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use verdict_lang::{Arity, FunctionRef, FunctionSignatures};

use super::coerce::{to_number, to_string};
use super::methods::char_index_of;
use crate::error::EvaluationError;
use crate::value::Value;

/// Prefix of the built-in string functions.
pub const BUILTIN_PREFIX: &str = "fn";

/// Native implementation of a function.
pub type NativeFunction = Arc<dyn Fn(&[Value]) -> Result<Value, EvaluationError> + Send + Sync>;

/// A registered function.
#[derive(Clone)]
pub struct FunctionEntry {
    arity: Arity,
    call: NativeFunction,
}

impl FunctionEntry {
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Call with already-evaluated arguments.
    pub fn call(&self, args: &[Value]) -> Result<Value, EvaluationError> {
        (self.call)(args)
    }
}

/// Functions keyed by `prefix:name`.
#[derive(Clone, Default)]
pub struct FunctionTable {
    entries: HashMap<String, FunctionEntry>,
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("FunctionTable").field("functions", &keys).finish()
    }
}

impl FunctionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in functions, built once.
    pub fn builtins() -> &'static FunctionTable {
        static BUILTINS: OnceLock<FunctionTable> = OnceLock::new();
        BUILTINS.get_or_init(builtin_table)
    }

    /// Register a function; an empty prefix registers an unprefixed name.
    pub fn register<F>(&mut self, prefix: &str, name: &str, arity: Arity, function: F)
    where
        F: Fn(&[Value]) -> Result<Value, EvaluationError> + Send + Sync + 'static,
    {
        let key = FunctionRef {
            prefix: prefix.to_string(),
            name: name.to_string(),
        }
        .key();
        self.entries.insert(
            key,
            FunctionEntry {
                arity,
                call: Arc::new(function),
            },
        );
    }

    /// Look up a function.
    pub fn resolve(&self, function: &FunctionRef) -> Option<&FunctionEntry> {
        self.entries.get(&function.key())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FunctionSignatures for FunctionTable {
    fn arity(&self, function: &FunctionRef) -> Option<Arity> {
        self.resolve(function).map(FunctionEntry::arity)
    }
}

fn builtin_table() -> FunctionTable {
    let mut table = FunctionTable::new();
    let p = BUILTIN_PREFIX;

    table.register(p, "length", Arity::Exact(1), |args| {
        let n = match &args[0] {
            Value::Null => 0,
            Value::String(s) => s.chars().count(),
            Value::List(items) => items.len(),
            Value::Map(map) => map.len(),
            Value::Bytes(bytes) => bytes.len(),
            other => return Err(EvaluationError::coercion(other, "collection or string")),
        };
        Ok(Value::Int(n as i64))
    });
    table.register(p, "contains", Arity::Exact(2), |args| {
        let (s, sub) = (to_string(&args[0])?, to_string(&args[1])?);
        Ok(Value::Bool(s.contains(&sub)))
    });
    table.register(p, "containsIgnoreCase", Arity::Exact(2), |args| {
        let (s, sub) = (to_string(&args[0])?, to_string(&args[1])?);
        Ok(Value::Bool(s.to_uppercase().contains(&sub.to_uppercase())))
    });
    table.register(p, "startsWith", Arity::Exact(2), |args| {
        let (s, prefix) = (to_string(&args[0])?, to_string(&args[1])?);
        Ok(Value::Bool(s.starts_with(&prefix)))
    });
    table.register(p, "endsWith", Arity::Exact(2), |args| {
        let (s, suffix) = (to_string(&args[0])?, to_string(&args[1])?);
        Ok(Value::Bool(s.ends_with(&suffix)))
    });
    table.register(p, "indexOf", Arity::Exact(2), |args| {
        let (s, sub) = (to_string(&args[0])?, to_string(&args[1])?);
        Ok(Value::Int(char_index_of(&s, &sub)))
    });
    table.register(p, "toUpperCase", Arity::Exact(1), |args| {
        Ok(Value::String(to_string(&args[0])?.to_uppercase()))
    });
    table.register(p, "toLowerCase", Arity::Exact(1), |args| {
        Ok(Value::String(to_string(&args[0])?.to_lowercase()))
    });
    table.register(p, "trim", Arity::Exact(1), |args| {
        Ok(Value::String(to_string(&args[0])?.trim().to_string()))
    });
    table.register(p, "substring", Arity::Exact(3), |args| {
        let s = to_string(&args[0])?;
        let len = s.chars().count() as i64;
        let begin = to_number(&args[1])?.as_i64().max(0);
        let mut end = to_number(&args[2])?.as_i64();
        if end < 0 || end > len {
            end = len;
        }
        if begin >= end {
            return Ok(Value::String(String::new()));
        }
        Ok(Value::String(
            s.chars()
                .skip(begin as usize)
                .take((end - begin) as usize)
                .collect(),
        ))
    });
    table.register(p, "replace", Arity::Exact(3), |args| {
        let s = to_string(&args[0])?;
        let before = to_string(&args[1])?;
        if before.is_empty() {
            return Ok(Value::String(s));
        }
        Ok(Value::String(s.replace(&before, &to_string(&args[2])?)))
    });
    table.register(p, "join", Arity::Exact(2), |args| {
        let separator = to_string(&args[1])?;
        match &args[0] {
            Value::Null => Ok(Value::String(String::new())),
            Value::List(items) => {
                let parts = items.iter().map(to_string).collect::<Result<Vec<_>, _>>()?;
                Ok(Value::String(parts.join(&separator)))
            }
            other => Err(EvaluationError::coercion(other, "list")),
        }
    });
    table.register(p, "split", Arity::Exact(2), |args| {
        let s = to_string(&args[0])?;
        let delimiters = to_string(&args[1])?;
        if s.is_empty() {
            return Ok(Value::List(vec![Value::String(String::new())]));
        }
        if delimiters.is_empty() {
            return Ok(Value::List(vec![Value::String(s)]));
        }
        let tokens = s
            .split(|c| delimiters.contains(c))
            .filter(|t| !t.is_empty())
            .map(|t| Value::String(t.to_string()))
            .collect();
        Ok(Value::List(tokens))
    });
    table.register(p, "escapeXml", Arity::Exact(1), |args| {
        let s = to_string(&args[0])?;
        let mut escaped = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&#034;"),
                '\'' => escaped.push_str("&#039;"),
                c => escaped.push(c),
            }
        }
        Ok(Value::String(escaped))
    });

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Value {
        let function = FunctionRef {
            prefix: BUILTIN_PREFIX.to_string(),
            name: name.to_string(),
        };
        FunctionTable::builtins()
            .resolve(&function)
            .unwrap()
            .call(args)
            .unwrap()
    }

    #[test]
    fn test_builtins_built_once() {
        assert!(std::ptr::eq(FunctionTable::builtins(), FunctionTable::builtins()));
        assert_eq!(FunctionTable::builtins().len(), 14);
    }

    #[test]
    fn test_signatures() {
        let function = FunctionRef {
            prefix: "fn".into(),
            name: "substring".into(),
        };
        assert_eq!(FunctionTable::builtins().arity(&function), Some(Arity::Exact(3)));
        let unknown = FunctionRef {
            prefix: "fn".into(),
            name: "reverse".into(),
        };
        assert_eq!(FunctionTable::builtins().arity(&unknown), None);
    }

    #[test]
    fn test_string_functions() {
        assert_eq!(call("length", &[Value::Null]), Value::Int(0));
        assert_eq!(call("length", &["abc".into()]), Value::Int(3));
        assert_eq!(
            call("containsIgnoreCase", &["Hello".into(), "ELL".into()]),
            Value::Bool(true)
        );
        assert_eq!(call("indexOf", &["abc".into(), "z".into()]), Value::Int(-1));
        assert_eq!(call("toUpperCase", &[Value::Null]), Value::from(""));
    }

    #[test]
    fn test_substring_is_lenient() {
        assert_eq!(call("substring", &["abcdef".into(), 2.into(), 4.into()]), Value::from("cd"));
        assert_eq!(call("substring", &["abc".into(), (-3).into(), 99.into()]), Value::from("abc"));
        assert_eq!(call("substring", &["abc".into(), 2.into(), 1.into()]), Value::from(""));
    }

    #[test]
    fn test_join_split_escape() {
        let list = Value::List(vec!["a".into(), 1.into()]);
        assert_eq!(call("join", &[list, ", ".into()]), Value::from("a, 1"));
        assert_eq!(
            call("split", &["a,b;;c".into(), ",;".into()]),
            Value::List(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(call("escapeXml", &["<a & b>".into()]), Value::from("&lt;a &amp; b&gt;"));
    }

    #[test]
    fn test_register_custom() {
        let mut table = FunctionTable::builtins().clone();
        table.register("", "double", Arity::Exact(1), |args| {
            Ok(Value::Int(to_number(&args[0])?.as_i64() * 2))
        });
        let function = FunctionRef {
            prefix: String::new(),
            name: "double".into(),
        };
        assert_eq!(
            table.resolve(&function).unwrap().call(&[21.into()]).unwrap(),
            Value::Int(42)
        );
        assert_eq!(table.len(), 15);
    }
}
