//! Verdict Expression Language
//!
//! This crate provides the lexer, parser and static checker for the
//! expression language understood by verdict's embedded interpreter. The
//! language is a practical subset of the unified expression language used by
//! bean-validation style constraints.
//!
//! # Syntax
//!
//! ```text
//! value != null && value.length() > 3
//! ${order.total >= 0 and not empty order.lines}
//! fn:startsWith(code, 'EU') ? vat > 0 : true
//! start.before(end)
//! items[0].quantity mod 2 == 0
//! ```
//!
//! Expressions may be wrapped in `${...}` or `#{...}`; the wrapper is
//! optional. Operators have both symbolic and word forms (`&&`/`and`,
//! `==`/`eq`, `<`/`lt`, `%`/`mod`, ...).
//!
//! # Usage
//!
//! ```rust
//! use verdict_lang::{parse, compile, NoFunctions};
//!
//! let expr = parse("value != null && value.length() > 3").unwrap();
//! let compiled = compile(expr, &NoFunctions).unwrap();
//! assert!(compiled.references("value"));
//! ```

pub mod ast;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

// Re-export main types
pub use ast::{BinaryOp, Expr, FunctionRef, Literal, UnaryOp};
pub use compiler::{Arity, CompiledExpression, FunctionSignatures, NoFunctions};
pub use error::{CompileError, CompileErrorKind, LangError, ParseError};
pub use span::{Span, Spanned};

/// Parse a source string into an expression tree.
///
/// # Example
///
/// ```rust
/// use verdict_lang::parse;
///
/// let expr = parse("a && b").unwrap();
/// ```
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    parser::parse(source)
}

/// Check a parsed expression against the available function signatures.
///
/// # Example
///
/// ```rust
/// use verdict_lang::{compile, parse, NoFunctions};
///
/// let compiled = compile(parse("a || b").unwrap(), &NoFunctions).unwrap();
/// assert_eq!(compiled.identifiers.len(), 2);
/// ```
pub fn compile(
    expr: Expr,
    signatures: &dyn FunctionSignatures,
) -> Result<CompiledExpression, CompileError> {
    compiler::compile(expr, signatures)
}

/// Parse and check a source string in one step.
///
/// # Example
///
/// ```rust
/// use verdict_lang::{parse_and_compile, NoFunctions};
///
/// let compiled = parse_and_compile("${value > 0}", &NoFunctions).unwrap();
/// ```
pub fn parse_and_compile(
    source: &str,
    signatures: &dyn FunctionSignatures,
) -> Result<CompiledExpression, LangError> {
    let expr = parse(source)?;
    let compiled = compile(expr, signatures)?;
    Ok(compiled)
}

/// Tokenize a source string (for debugging/testing).
///
/// # Example
///
/// ```rust
/// use verdict_lang::tokenize;
///
/// let tokens = tokenize("value.length()");
/// assert_eq!(tokens.len(), 5);
/// ```
pub fn tokenize(source: &str) -> Vec<lexer::SpannedToken> {
    lexer::tokenize(source)
}
