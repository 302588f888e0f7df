//! Diagnostics produced while reading an expression.
//!
//! Both error kinds carry the span of the offending text so callers can
//! render a caret diagnostic with [`LangError::format_with_source`].

use std::fmt::Write as _;

use thiserror::Error;

use crate::span::{offset_to_line_col, Span};

/// The text is not a well-formed expression.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    /// Suggested fix shown under the caret line.
    pub hint: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            hint: None,
        }
    }

    pub fn with_hint(self, hint: impl Into<String>) -> Self {
        Self {
            hint: Some(hint.into()),
            ..self
        }
    }

    pub fn format_with_source(&self, source: &str) -> String {
        let mut out = format!("error: {}\n", self.message);
        render_location(&mut out, source, self.span);
        if let Some(hint) = &self.hint {
            let _ = writeln!(out, "   = hint: {}", hint);
        }
        out
    }
}

/// What went wrong when checking function references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorKind {
    /// No function is registered under the qualified name.
    UnknownFunction,
    /// The function exists but not with this many arguments.
    FunctionArity,
}

/// The expression parsed but refers to functions that cannot be called.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
    pub span: Span,
    pub kind: CompileErrorKind,
}

impl CompileError {
    pub fn new(message: impl Into<String>, span: Span, kind: CompileErrorKind) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
        }
    }

    pub fn unknown_function(function: &str, span: Span) -> Self {
        Self::new(
            format!("unknown function '{}'", function),
            span,
            CompileErrorKind::UnknownFunction,
        )
    }

    pub fn function_arity(function: &str, expected: usize, got: usize, span: Span) -> Self {
        Self::new(
            format!(
                "function '{}' takes {} argument(s), got {}",
                function, expected, got
            ),
            span,
            CompileErrorKind::FunctionArity,
        )
    }

    pub fn format_with_source(&self, source: &str) -> String {
        let mut out = format!("error[{:?}]: {}\n", self.kind, self.message);
        render_location(&mut out, source, self.span);
        out
    }
}

/// Append a `--> line:col` marker and a caret line under the span.
fn render_location(out: &mut String, source: &str, span: Span) {
    let (line, col) = offset_to_line_col(source, span.start);
    let _ = writeln!(out, "  --> line {}:{}", line, col);

    let Some(source_line) = source.lines().nth(line - 1) else {
        return;
    };
    let remaining = source_line.chars().count().saturating_sub(col) + 1;
    let tildes = span.len().min(remaining).saturating_sub(1);
    let _ = writeln!(
        out,
        "   |\n{:3}| {}\n   |{}^{}",
        line,
        source_line,
        " ".repeat(col),
        "~".repeat(tildes)
    );
}

/// Any failure from [`crate::parse_and_compile`].
#[derive(Debug, Clone, Error)]
pub enum LangError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
}

impl LangError {
    /// Multi-line diagnostic pointing into `source`.
    pub fn format_with_source(&self, source: &str) -> String {
        match self {
            Self::Parse(err) => err.format_with_source(source),
            Self::Compile(err) => err.format_with_source(source),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Parse(err) => err.span,
            Self::Compile(err) => err.span,
        }
    }
}
