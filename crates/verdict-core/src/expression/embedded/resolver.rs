//! Property resolution.
//!
//! A [`ResolverChain`] asks each [`PropertyResolver`] in turn to resolve a
//! property or invoke a method. A resolver answers `Ok(None)` for bases it
//! does not handle; the first `Some` wins.

use std::fmt;
use std::sync::{Arc, OnceLock};

use super::coerce::to_number;
use super::methods;
use crate::binding::BindingEnvironment;
use crate::error::EvaluationError;
use crate::value::Value;

/// Per-evaluation state visible to resolvers.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    /// Bindings of the current evaluation.
    pub bindings: &'a BindingEnvironment,
}

/// One link of the resolver chain.
pub trait PropertyResolver: Send + Sync + fmt::Debug {
    /// Resolve `property` on `base`, or a bare identifier when `base` is
    /// `None`.
    fn get(
        &self,
        cx: &ResolutionContext<'_>,
        base: Option<&Value>,
        property: &Value,
    ) -> Result<Option<Value>, EvaluationError>;

    /// Invoke `method` on `base`.
    fn invoke(
        &self,
        base: &Value,
        method: &str,
        args: &[Value],
    ) -> Result<Option<Value>, EvaluationError> {
        let _ = (base, method, args);
        Ok(None)
    }
}

/// Byte arrays by integer index.
#[derive(Debug, Default)]
pub struct ArrayResolver;

impl PropertyResolver for ArrayResolver {
    fn get(
        &self,
        _cx: &ResolutionContext<'_>,
        base: Option<&Value>,
        property: &Value,
    ) -> Result<Option<Value>, EvaluationError> {
        let Some(Value::Bytes(bytes)) = base else {
            return Ok(None);
        };
        let value = element(bytes, property)?.map_or(Value::Null, |b| Value::Int(*b as i64));
        Ok(Some(value))
    }
}

/// Bean properties and methods.
#[derive(Debug, Default)]
pub struct BeanResolver;

impl PropertyResolver for BeanResolver {
    fn get(
        &self,
        _cx: &ResolutionContext<'_>,
        base: Option<&Value>,
        property: &Value,
    ) -> Result<Option<Value>, EvaluationError> {
        let Some(Value::Bean(bean)) = base else {
            return Ok(None);
        };
        let Value::String(name) = property else {
            return Ok(None);
        };
        match bean.property(name) {
            Some(value) => Ok(Some(value)),
            None => Err(EvaluationError::PropertyNotFound {
                property: name.clone(),
                base: bean.type_name().to_string(),
            }),
        }
    }

    fn invoke(
        &self,
        base: &Value,
        method: &str,
        args: &[Value],
    ) -> Result<Option<Value>, EvaluationError> {
        match base {
            Value::Bean(bean) => bean.invoke(method, args).transpose(),
            _ => Ok(None),
        }
    }
}

/// Bare identifiers from the evaluation's bindings.
#[derive(Debug, Default)]
pub struct BindingResolver;

impl PropertyResolver for BindingResolver {
    fn get(
        &self,
        cx: &ResolutionContext<'_>,
        base: Option<&Value>,
        property: &Value,
    ) -> Result<Option<Value>, EvaluationError> {
        match (base, property) {
            (None, Value::String(name)) => Ok(cx.bindings.get(name).cloned()),
            _ => Ok(None),
        }
    }
}

/// Lists by integer index.
#[derive(Debug, Default)]
pub struct ListResolver;

impl PropertyResolver for ListResolver {
    fn get(
        &self,
        _cx: &ResolutionContext<'_>,
        base: Option<&Value>,
        property: &Value,
    ) -> Result<Option<Value>, EvaluationError> {
        let Some(Value::List(items)) = base else {
            return Ok(None);
        };
        Ok(Some(element(items, property)?.cloned().unwrap_or(Value::Null)))
    }
}

/// Maps by key. Missing keys read as null.
#[derive(Debug, Default)]
pub struct MapResolver;

impl PropertyResolver for MapResolver {
    fn get(
        &self,
        _cx: &ResolutionContext<'_>,
        base: Option<&Value>,
        property: &Value,
    ) -> Result<Option<Value>, EvaluationError> {
        let Some(Value::Map(map)) = base else {
            return Ok(None);
        };
        let key = super::coerce::to_string(property)?;
        Ok(Some(map.get(&key).cloned().unwrap_or(Value::Null)))
    }
}

/// Built-in methods on strings, lists, maps and scalars.
#[derive(Debug, Default)]
pub struct FallbackResolver;

impl PropertyResolver for FallbackResolver {
    fn get(
        &self,
        _cx: &ResolutionContext<'_>,
        _base: Option<&Value>,
        _property: &Value,
    ) -> Result<Option<Value>, EvaluationError> {
        Ok(None)
    }

    fn invoke(
        &self,
        base: &Value,
        method: &str,
        args: &[Value],
    ) -> Result<Option<Value>, EvaluationError> {
        methods::invoke(base, method, args)
    }
}

fn element<'a, T>(items: &'a [T], index: &Value) -> Result<Option<&'a T>, EvaluationError> {
    let index = to_number(index)?.as_i64();
    Ok(usize::try_from(index).ok().and_then(|i| items.get(i)))
}

/// Ordered resolvers; immutable once built.
#[derive(Debug, Clone)]
pub struct ResolverChain {
    resolvers: Vec<Arc<dyn PropertyResolver>>,
}

impl ResolverChain {
    /// The standard chain: array, bean, binding, list, map, fallback.
    pub fn standard() -> Arc<ResolverChain> {
        static STANDARD: OnceLock<Arc<ResolverChain>> = OnceLock::new();
        Arc::clone(STANDARD.get_or_init(|| Arc::new(Self::with_custom(Vec::new()))))
    }

    /// The standard chain with `custom` resolvers inserted before the
    /// fallback.
    pub fn with_custom(custom: Vec<Arc<dyn PropertyResolver>>) -> ResolverChain {
        let mut resolvers: Vec<Arc<dyn PropertyResolver>> = vec![
            Arc::new(ArrayResolver),
            Arc::new(BeanResolver),
            Arc::new(BindingResolver),
            Arc::new(ListResolver),
            Arc::new(MapResolver),
        ];
        resolvers.extend(custom);
        resolvers.push(Arc::new(FallbackResolver));
        ResolverChain { resolvers }
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolve `property`, failing with `PropertyNotFound` when no resolver
    /// answers.
    pub fn get(
        &self,
        cx: &ResolutionContext<'_>,
        base: Option<&Value>,
        property: &Value,
    ) -> Result<Value, EvaluationError> {
        for resolver in &self.resolvers {
            if let Some(value) = resolver.get(cx, base, property)? {
                return Ok(value);
            }
        }
        Err(EvaluationError::PropertyNotFound {
            property: describe(property),
            base: base.map_or_else(|| "bindings".to_string(), Value::type_name),
        })
    }

    /// Invoke `method`, failing with `MethodNotFound` when no resolver
    /// answers.
    pub fn invoke(
        &self,
        base: &Value,
        method: &str,
        args: &[Value],
    ) -> Result<Value, EvaluationError> {
        for resolver in &self.resolvers {
            if let Some(value) = resolver.invoke(base, method, args)? {
                return Ok(value);
            }
        }
        Err(EvaluationError::MethodNotFound {
            method: method.to_string(),
            base: base.type_name(),
        })
    }
}

fn describe(property: &Value) -> String {
    match property {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::value::Record;

    fn get(base: Option<&Value>, property: impl Into<Value>) -> Result<Value, EvaluationError> {
        let bindings = BindingEnvironment::new().with("x", 7);
        let cx = ResolutionContext {
            bindings: &bindings,
        };
        ResolverChain::standard().get(&cx, base, &property.into())
    }

    #[test]
    fn test_standard_chain_is_shared() {
        let a = ResolverChain::standard();
        let b = ResolverChain::standard();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 6);
    }

    #[test]
    fn test_binding_only_without_base() {
        assert_eq!(get(None, "x").unwrap(), Value::Int(7));
        assert!(matches!(
            get(None, "y"),
            Err(EvaluationError::PropertyNotFound { .. })
        ));
        let map = Value::Map(BTreeMap::new());
        assert_eq!(get(Some(&map), "x").unwrap(), Value::Null);
    }

    #[test]
    fn test_bytes_and_lists() {
        let bytes = Value::Bytes(vec![10, 20]);
        assert_eq!(get(Some(&bytes), 1).unwrap(), Value::Int(20));
        assert_eq!(get(Some(&bytes), 5).unwrap(), Value::Null);

        let list = Value::List(vec![Value::from("a")]);
        assert_eq!(get(Some(&list), "0").unwrap(), Value::from("a"));
        assert_eq!(get(Some(&list), -1).unwrap(), Value::Null);
        assert!(get(Some(&list), "first").is_err());
    }

    #[test]
    fn test_bean_property() {
        let bean = Record::new("User").with("name", "ada").into_value();
        assert_eq!(get(Some(&bean), "name").unwrap(), Value::from("ada"));
        assert_eq!(
            get(Some(&bean), "age").unwrap_err(),
            EvaluationError::PropertyNotFound {
                property: "age".into(),
                base: "User".into(),
            }
        );
    }

    #[test]
    fn test_unresolved_on_scalar() {
        let err = get(Some(&Value::Int(1)), "foo").unwrap_err();
        assert_eq!(
            err,
            EvaluationError::PropertyNotFound {
                property: "foo".into(),
                base: "integer".into(),
            }
        );
    }

    #[test]
    fn test_method_not_found() {
        let err = ResolverChain::standard()
            .invoke(&Value::Int(1), "frobnicate", &[])
            .unwrap_err();
        assert!(matches!(err, EvaluationError::MethodNotFound { .. }));
    }
}
