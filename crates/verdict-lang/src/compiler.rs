//! Static checks over a parsed expression.
//!
//! Compilation resolves every function reference against the caller's
//! function signatures and records the identifiers the expression reads, so
//! that an expression naming an unknown function is rejected once, up front,
//! instead of on every evaluation.

use crate::ast::{Expr, FunctionRef};
use crate::error::CompileError;
use crate::span::Span;

/// How many arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many arguments.
    Exact(usize),
    /// At least this many arguments.
    AtLeast(usize),
}

impl Arity {
    /// Whether `count` arguments satisfy this arity.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }

    fn minimum(self) -> usize {
        match self {
            Arity::Exact(n) | Arity::AtLeast(n) => n,
        }
    }
}

/// Source of function signatures consulted during compilation.
pub trait FunctionSignatures {
    /// Arity of `function`, or `None` if it is unknown.
    fn arity(&self, function: &FunctionRef) -> Option<Arity>;
}

/// Signatures for a language with no functions at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFunctions;

impl FunctionSignatures for NoFunctions {
    fn arity(&self, _function: &FunctionRef) -> Option<Arity> {
        None
    }
}

/// A parsed and checked expression, ready for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    /// The expression tree.
    pub root: Expr,
    /// Bare identifiers the expression reads, in first-use order.
    pub identifiers: Vec<String>,
    /// Functions the expression calls, in first-use order.
    pub functions: Vec<FunctionRef>,
}

impl CompiledExpression {
    /// Whether the expression reads the bare identifier `name`.
    pub fn references(&self, name: &str) -> bool {
        self.identifiers.iter().any(|i| i == name)
    }
}

/// Check `root` against `signatures` and collect its references.
pub fn compile(
    root: Expr,
    signatures: &dyn FunctionSignatures,
) -> Result<CompiledExpression, CompileError> {
    let mut identifiers: Vec<String> = Vec::new();
    let mut calls: Vec<(FunctionRef, usize, Span)> = Vec::new();

    root.walk(&mut |node| match node {
        Expr::Identifier(name) => {
            if !identifiers.contains(&name.value) {
                identifiers.push(name.value.clone());
            }
        }
        Expr::FunctionCall {
            prefix,
            name,
            args,
            span,
        } => {
            let function = FunctionRef {
                prefix: prefix.as_ref().map(|p| p.value.clone()).unwrap_or_default(),
                name: name.value.clone(),
            };
            calls.push((function, args.len(), *span));
        }
        _ => {}
    });

    let mut functions: Vec<FunctionRef> = Vec::new();
    for (function, argc, span) in calls {
        let arity = signatures
            .arity(&function)
            .ok_or_else(|| CompileError::unknown_function(&function.to_string(), span))?;
        if !arity.accepts(argc) {
            return Err(CompileError::function_arity(
                &function.to_string(),
                arity.minimum(),
                argc,
                span,
            ));
        }
        if !functions.contains(&function) {
            functions.push(function);
        }
    }

    Ok(CompiledExpression {
        root,
        identifiers,
        functions,
    })
}
