//! Tokens of the expression language, produced by a `logos` lexer with
//! unbounded lookahead for the parser.

use std::collections::VecDeque;

use crate::span::Span;
use logos::Logos;

/// One lexical unit. Word operators (`eq`, `and`, `div`, ...) lex to the
/// same token as their symbolic spelling.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // Expression delimiters
    #[token("${")]
    DollarBrace,
    #[token("#{")]
    HashBrace,

    // Equality operators
    #[token("==")]
    #[token("eq")]
    Eq,
    #[token("!=")]
    #[token("ne")]
    Ne,

    // Relational operators
    #[token("<=")]
    #[token("le")]
    Le,
    #[token(">=")]
    #[token("ge")]
    Ge,
    #[token("<")]
    #[token("lt")]
    Lt,
    #[token(">")]
    #[token("gt")]
    Gt,

    // Logical operators
    #[token("&&")]
    #[token("and")]
    And,
    #[token("||")]
    #[token("or")]
    Or,
    #[token("!")]
    #[token("not")]
    Not,
    #[token("empty")]
    Empty,

    // Arithmetic operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    #[token("div")]
    Slash,
    #[token("%")]
    #[token("mod")]
    Percent,

    // Assignment (parsed, never executed)
    #[token("=")]
    Assign,

    // Literals
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // Identifier
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),

    // Quoted text, either quote style
    #[regex(r#""([^"\\]|\\.)*""#, quoted)]
    #[regex(r#"'([^'\\]|\\.)*'"#, quoted)]
    Str(String),

    // Integer literal; sign is a unary operator
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    // Float literal
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    // Punctuation
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("}")]
    RBrace,
}

impl Token {
    /// Short human-readable description used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Str(s) => format!("string \"{}\"", s),
            Token::Int(i) => format!("integer {}", i),
            Token::Float(f) => format!("number {}", f),
            other => format!("{:?}", other),
        }
    }
}

/// Strip the quotes from a string literal and resolve its escapes.
///
/// Unknown escapes are kept verbatim, backslash included.
fn quoted(lex: &mut logos::Lexer<'_, Token>) -> String {
    let slice = lex.slice();
    let body = &slice[1..slice.len() - 1];
    let mut text = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        let resolved = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            // `\${` and `\#{` keep a nested delimiter literal
            Some(c @ ('\\' | '"' | '\'' | '$' | '#')) => c,
            Some(other) => {
                text.push('\\');
                other
            }
            None => '\\',
        };
        text.push(resolved);
    }

    text
}

/// A token and the bytes it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lexer that produces spanned tokens with arbitrary lookahead.
///
/// The first unrecognized character ends the token stream; its span is kept
/// in [`Lexer::error`] so the parser can report it.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
    lookahead: VecDeque<SpannedToken>,
    error: Option<Span>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
            lookahead: VecDeque::new(),
            error: None,
        }
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Option<&SpannedToken> {
        self.peek_nth(0)
    }

    /// Peek `n` tokens ahead (0 is the next token).
    pub fn peek_nth(&mut self, n: usize) -> Option<&SpannedToken> {
        while self.lookahead.len() <= n {
            let tok = self.next_inner()?;
            self.lookahead.push_back(tok);
        }
        self.lookahead.get(n)
    }

    /// Consume the next token, draining lookahead first.
    pub fn next_token(&mut self) -> Option<SpannedToken> {
        self.lookahead.pop_front().or_else(|| self.next_inner())
    }

    fn next_inner(&mut self) -> Option<SpannedToken> {
        if self.error.is_some() {
            return None;
        }
        match self.inner.next()? {
            Ok(token) => Some(SpannedToken {
                token,
                span: self.inner.span().into(),
            }),
            Err(()) => {
                self.error = Some(self.inner.span().into());
                None
            }
        }
    }

    /// Span of the first unrecognized input, if the lexer stopped early.
    pub fn error(&self) -> Option<Span> {
        self.error
    }

    pub fn source(&self) -> &'source str {
        self.inner.source()
    }
}

impl Iterator for Lexer<'_> {
    type Item = SpannedToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// All tokens up to the end of input or the first unrecognized character.
pub fn tokenize(source: &str) -> Vec<SpannedToken> {
    Lexer::new(source).collect()
}
