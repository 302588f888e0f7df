//! Abstract Syntax Tree types for the expression language.

use crate::span::{Span, Spanned};

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `null`.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Float(f64),
    /// Single- or double-quoted string.
    String(String),
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `!` / `not`
    Not,
    /// `-`
    Neg,
    /// `empty`
    Empty,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    /// The canonical symbol for this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value.
    Literal(Spanned<Literal>),
    /// A bare identifier, resolved against variables and bindings.
    Identifier(Spanned<String>),
    /// Property access: `target.property`.
    Member {
        target: Box<Expr>,
        property: Spanned<String>,
        span: Span,
    },
    /// Bracket access: `target[index]`.
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    /// Method invocation: `target.method(args)`.
    MethodCall {
        target: Box<Expr>,
        method: Spanned<String>,
        args: Vec<Expr>,
        span: Span,
    },
    /// Function invocation: `prefix:name(args)` or `name(args)`.
    FunctionCall {
        prefix: Option<Spanned<String>>,
        name: Spanned<String>,
        args: Vec<Expr>,
        span: Span,
    },
    /// Unary operation.
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    /// Binary operation.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    /// `condition ? then_branch : else_branch`.
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
        span: Span,
    },
    /// `target = value`. Parsed so it can be rejected at evaluation.
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(l) => l.span,
            Expr::Identifier(i) => i.span,
            Expr::Member { span, .. }
            | Expr::Index { span, .. }
            | Expr::MethodCall { span, .. }
            | Expr::FunctionCall { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Conditional { span, .. }
            | Expr::Assign { span, .. } => *span,
        }
    }

    /// Visit this expression and all of its children, parents first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match self {
            Expr::Literal(_) | Expr::Identifier(_) => {}
            Expr::Member { target, .. } => target.walk(visit),
            Expr::Index { target, index, .. } => {
                target.walk(visit);
                index.walk(visit);
            }
            Expr::MethodCall { target, args, .. } => {
                target.walk(visit);
                for arg in args {
                    arg.walk(visit);
                }
            }
            Expr::FunctionCall { args, .. } => {
                for arg in args {
                    arg.walk(visit);
                }
            }
            Expr::Unary { operand, .. } => operand.walk(visit),
            Expr::Binary { left, right, .. } => {
                left.walk(visit);
                right.walk(visit);
            }
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                condition.walk(visit);
                then_branch.walk(visit);
                else_branch.walk(visit);
            }
            Expr::Assign { target, value, .. } => {
                target.walk(visit);
                value.walk(visit);
            }
        }
    }
}

/// A reference to a function made by an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionRef {
    /// Namespace prefix; empty when the call had none.
    pub prefix: String,
    /// Local function name.
    pub name: String,
}

impl FunctionRef {
    /// Lookup key in `prefix:name` form.
    pub fn key(&self) -> String {
        format!("{}:{}", self.prefix, self.name)
    }
}

impl std::fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.prefix, self.name)
        }
    }
}
