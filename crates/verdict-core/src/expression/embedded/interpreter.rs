//! Tree-walking evaluator over the parsed expression.

use verdict_lang::{BinaryOp, Expr, FunctionRef, Literal, UnaryOp};

use super::coerce;
use super::resolver::ResolutionContext;
use super::EmbeddedContext;
use crate::binding::BindingEnvironment;
use crate::error::EvaluationError;
use crate::value::Value;

/// Evaluates one expression against one binding environment.
pub(crate) struct Interpreter<'a> {
    context: &'a EmbeddedContext,
    cx: ResolutionContext<'a>,
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(context: &'a EmbeddedContext, bindings: &'a BindingEnvironment) -> Self {
        Self {
            context,
            cx: ResolutionContext { bindings },
        }
    }

    pub(crate) fn eval(&self, expr: &Expr) -> Result<Value, EvaluationError> {
        match expr {
            Expr::Literal(lit) => Ok(match &lit.value {
                Literal::Null => Value::Null,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Int(i) => Value::Int(*i),
                Literal::Float(f) => Value::Float(*f),
                Literal::String(s) => Value::String(s.clone()),
            }),

            Expr::Identifier(name) => {
                if let Some(value) = self.context.variables.resolve(&name.value) {
                    return Ok(value.clone());
                }
                self.context
                    .resolvers
                    .get(&self.cx, None, &Value::String(name.value.clone()))
            }

            Expr::Member {
                target, property, ..
            } => {
                let base = self.eval(target)?;
                if base.is_null() {
                    return Ok(Value::Null);
                }
                self.context.resolvers.get(
                    &self.cx,
                    Some(&base),
                    &Value::String(property.value.clone()),
                )
            }

            Expr::Index { target, index, .. } => {
                let base = self.eval(target)?;
                if base.is_null() {
                    return Ok(Value::Null);
                }
                let index = self.eval(index)?;
                if index.is_null() {
                    return Ok(Value::Null);
                }
                self.context.resolvers.get(&self.cx, Some(&base), &index)
            }

            Expr::MethodCall {
                target,
                method,
                args,
                ..
            } => {
                let base = self.eval(target)?;
                if base.is_null() {
                    return Err(EvaluationError::MethodNotFound {
                        method: method.value.clone(),
                        base: base.type_name(),
                    });
                }
                let args = self.eval_args(args)?;
                self.context.resolvers.invoke(&base, &method.value, &args)
            }

            Expr::FunctionCall {
                prefix, name, args, ..
            } => {
                let function = FunctionRef {
                    prefix: prefix.as_ref().map(|p| p.value.clone()).unwrap_or_default(),
                    name: name.value.clone(),
                };
                let entry = self
                    .context
                    .functions
                    .resolve(&function)
                    .ok_or_else(|| EvaluationError::FunctionNotFound(function.to_string()))?;
                let args = self.eval_args(args)?;
                entry.call(&args)
            }

            Expr::Unary { op, operand, .. } => {
                let value = self.eval(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!coerce::to_boolean(&value)?)),
                    UnaryOp::Neg => coerce::negate(&value),
                    UnaryOp::Empty => Ok(Value::Bool(coerce::is_empty(&value))),
                }
            }

            Expr::Binary {
                op, left, right, ..
            } => self.eval_binary(*op, left, right),

            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if coerce::to_boolean(&self.eval(condition)?)? {
                    self.eval(then_branch)
                } else {
                    self.eval(else_branch)
                }
            }

            Expr::Assign { target, .. } => Err(EvaluationError::ReadOnlyAssignment {
                property: assignment_target(target),
            }),
        }
    }

    fn eval_binary(&self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Value, EvaluationError> {
        match op {
            BinaryOp::And => {
                if !coerce::to_boolean(&self.eval(left)?)? {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(coerce::to_boolean(&self.eval(right)?)?))
            }
            BinaryOp::Or => {
                if coerce::to_boolean(&self.eval(left)?)? {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(coerce::to_boolean(&self.eval(right)?)?))
            }
            _ => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                match op {
                    BinaryOp::Eq => Ok(Value::Bool(coerce::equals(&l, &r)?)),
                    BinaryOp::Ne => Ok(Value::Bool(!coerce::equals(&l, &r)?)),
                    BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                        let ordering = coerce::compare(&l, &r)?;
                        Ok(Value::Bool(coerce::relational(op, ordering)))
                    }
                    _ => coerce::arithmetic(op, &l, &r),
                }
            }
        }
    }

    fn eval_args(&self, args: &[Expr]) -> Result<Vec<Value>, EvaluationError> {
        args.iter().map(|a| self.eval(a)).collect()
    }
}

fn assignment_target(target: &Expr) -> String {
    match target {
        Expr::Identifier(name) => name.value.clone(),
        Expr::Member { property, .. } => property.value.clone(),
        Expr::Index { .. } => "indexed element".to_string(),
        _ => "expression".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::value::Record;

    fn eval_with(source: &str, bindings: &BindingEnvironment) -> Result<Value, EvaluationError> {
        let context = EmbeddedContext::default();
        let compiled =
            verdict_lang::parse_and_compile(source, context.functions.as_ref()).unwrap();
        Interpreter::new(&context, bindings).eval(&compiled.root)
    }

    fn eval(source: &str) -> Value {
        eval_with(source, &BindingEnvironment::new()).unwrap()
    }

    #[test]
    fn test_literals_and_arithmetic() {
        assert_eq!(eval("1 + 2 * 3"), Value::Int(7));
        assert_eq!(eval("7 div 2"), Value::Float(3.5));
        assert_eq!(eval("7 mod 4"), Value::Int(3));
        assert_eq!(eval("-'3'"), Value::Int(-3));
        assert_eq!(eval("'a' == \"a\""), Value::Bool(true));
    }

    #[test]
    fn test_logic_and_conditional() {
        assert_eq!(eval("true && !false"), Value::Bool(true));
        assert_eq!(eval("1 lt 2 ? 'yes' : 'no'"), Value::from("yes"));
        assert_eq!(eval("empty ''"), Value::Bool(true));
        assert_eq!(eval("null < 1"), Value::Bool(false));
    }

    #[test]
    fn test_short_circuit_skips_errors() {
        // Right operand would fail if evaluated.
        assert_eq!(eval("false && missing.length() > 0"), Value::Bool(false));
        assert_eq!(eval("true or missing"), Value::Bool(true));
    }

    #[test]
    fn test_bindings_and_members() {
        let user = Record::new("User")
            .with("name", "ada")
            .with("tags", Value::List(vec!["x".into()]))
            .into_value();
        let mut limits = BTreeMap::new();
        limits.insert("max".to_string(), Value::Int(3));
        let env = BindingEnvironment::new()
            .with("user", user)
            .with("limits", Value::Map(limits));

        assert_eq!(
            eval_with("user.name.length() <= limits.max", &env).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(eval_with("user.tags[0]", &env).unwrap(), Value::from("x"));
        assert_eq!(eval_with("limits['min']", &env).unwrap(), Value::Null);
    }

    #[test]
    fn test_null_base_propagates() {
        let env = BindingEnvironment::new().with("value", Value::Null);
        assert_eq!(eval_with("value.name", &env).unwrap(), Value::Null);
        assert_eq!(eval_with("value[0]", &env).unwrap(), Value::Null);
        assert!(matches!(
            eval_with("value.length()", &env),
            Err(EvaluationError::MethodNotFound { .. })
        ));
    }

    #[test]
    fn test_unbound_identifier() {
        assert_eq!(
            eval_with("nobody", &BindingEnvironment::new()).unwrap_err(),
            EvaluationError::PropertyNotFound {
                property: "nobody".into(),
                base: "bindings".into(),
            }
        );
    }

    #[test]
    fn test_functions() {
        let env = BindingEnvironment::new().with("code", "EU-123");
        assert_eq!(
            eval_with("fn:startsWith(code, 'EU') && fn:length(code) == 6", &env).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_assignment_is_rejected() {
        let env = BindingEnvironment::new().with("a", 1);
        assert_eq!(
            eval_with("a = 2", &env).unwrap_err(),
            EvaluationError::ReadOnlyAssignment {
                property: "a".into()
            }
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            eval_with("1 / 0", &BindingEnvironment::new()).unwrap_err(),
            EvaluationError::DivisionByZero
        );
    }
}
