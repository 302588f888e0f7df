//! Recursive descent parser for the expression language.
//!
//! Precedence, lowest first: assignment, conditional, `||`, `&&`,
//! equality, relational, additive, multiplicative, unary, postfix.

use crate::ast::{BinaryOp, Expr, Literal, UnaryOp};
use crate::error::ParseError;
use crate::lexer::{Lexer, SpannedToken, Token};
use crate::span::{Span, Spanned};

/// Parser for the embedded expression language.
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    source: &'source str,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            source,
        }
    }

    /// Parse a complete expression, optionally wrapped in `${...}` or `#{...}`.
    pub fn parse_root(&mut self) -> Result<Expr, ParseError> {
        let delimited = matches!(
            self.lexer.peek().map(|t| &t.token),
            Some(Token::DollarBrace) | Some(Token::HashBrace)
        );
        if delimited {
            self.next_token()?;
        }

        let expr = self.parse_expression()?;

        if delimited {
            self.expect_token(Token::RBrace)?;
        }
        self.expect_end()?;
        Ok(expr)
    }

    /// Parse an expression at the lowest precedence level.
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_conditional()?;

        if self.peek_is(&Token::Assign) {
            self.next_token()?; // consume =
            let value = self.parse_assignment()?;
            let span = target.span().merge(value.span());
            return Ok(Expr::Assign {
                target: Box::new(target),
                value: Box::new(value),
                span,
            });
        }

        Ok(target)
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_or()?;

        if !self.peek_is(&Token::Question) {
            return Ok(condition);
        }
        self.next_token()?; // consume ?

        let then_branch = self.parse_conditional()?;
        self.expect_token(Token::Colon)?;
        let else_branch = self.parse_conditional()?;
        let span = condition.span().merge(else_branch.span());

        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
            span,
        })
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_and, |t| match t {
            Token::Or => Some(BinaryOp::Or),
            _ => None,
        })
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_equality, |t| match t {
            Token::And => Some(BinaryOp::And),
            _ => None,
        })
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_relational, |t| match t {
            Token::Eq => Some(BinaryOp::Eq),
            Token::Ne => Some(BinaryOp::Ne),
            _ => None,
        })
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_additive, |t| match t {
            Token::Lt => Some(BinaryOp::Lt),
            Token::Le => Some(BinaryOp::Le),
            Token::Gt => Some(BinaryOp::Gt),
            Token::Ge => Some(BinaryOp::Ge),
            _ => None,
        })
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_multiplicative, |t| match t {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(Self::parse_unary, |t| match t {
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            Token::Percent => Some(BinaryOp::Mod),
            _ => None,
        })
    }

    /// Parse a left-associative chain of operators at one precedence level.
    fn parse_binary_level(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, ParseError>,
        operator: fn(&Token) -> Option<BinaryOp>,
    ) -> Result<Expr, ParseError> {
        let mut left = operand(self)?;

        while let Some(op) = self.lexer.peek().and_then(|t| operator(&t.token)) {
            self.next_token()?; // consume operator
            let right = operand(self)?;
            let span = left.span().merge(right.span());
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.lexer.peek().map(|t| &t.token) {
            Some(Token::Not) => UnaryOp::Not,
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Empty) => UnaryOp::Empty,
            _ => return self.parse_postfix(),
        };
        let op_tok = self.next_token()?;
        let operand = self.parse_unary()?;
        let span = op_tok.span.merge(operand.span());

        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            span,
        })
    }

    /// Parse member access, indexing and method calls after a primary.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.lexer.peek().map(|t| &t.token) {
                Some(Token::Dot) => {
                    self.next_token()?; // consume .
                    let name = self.expect_ident().map_err(|e| {
                        e.with_hint("property names after '.' must be identifiers")
                    })?;

                    if self.peek_is(&Token::LParen) {
                        let (args, close) = self.parse_arguments()?;
                        let span = expr.span().merge(close);
                        expr = Expr::MethodCall {
                            target: Box::new(expr),
                            method: name,
                            args,
                            span,
                        };
                    } else {
                        let span = expr.span().merge(name.span);
                        expr = Expr::Member {
                            target: Box::new(expr),
                            property: name,
                            span,
                        };
                    }
                }
                Some(Token::LBracket) => {
                    self.next_token()?; // consume [
                    let index = self.parse_expression()?;
                    let close = self.expect_token(Token::RBracket)?;
                    let span = expr.span().merge(close.span);
                    expr = Expr::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                        span,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.next_token()?;
        let literal = match tok.token {
            Token::Null => Literal::Null,
            Token::True => Literal::Bool(true),
            Token::False => Literal::Bool(false),
            Token::Int(i) => Literal::Int(i),
            Token::Float(f) => Literal::Float(f),
            Token::Str(s) => Literal::String(s),
            Token::LParen => {
                let inner = self.parse_expression()?;
                self.expect_token(Token::RParen)?;
                return Ok(inner);
            }
            Token::Ident(name) => return self.parse_identifier(Spanned::new(name, tok.span)),
            Token::Assign => {
                return Err(ParseError::new("unexpected '='", tok.span)
                    .with_hint("use '==' for equality comparison"))
            }
            other => {
                return Err(ParseError::new(
                    format!("expected expression, found {}", other.describe()),
                    tok.span,
                ))
            }
        };

        Ok(Expr::Literal(Spanned::new(literal, tok.span)))
    }

    /// Parse an identifier, a `name(args)` call or a `prefix:name(args)` call.
    fn parse_identifier(&mut self, ident: Spanned<String>) -> Result<Expr, ParseError> {
        if self.is_prefixed_call() {
            self.next_token()?; // consume :
            let name = self.expect_ident()?;
            let (args, close) = self.parse_arguments()?;
            return Ok(Expr::FunctionCall {
                span: ident.span.merge(close),
                prefix: Some(ident),
                name,
                args,
            });
        }

        if self.peek_is(&Token::LParen) {
            let (args, close) = self.parse_arguments()?;
            return Ok(Expr::FunctionCall {
                span: ident.span.merge(close),
                prefix: None,
                name: ident,
                args,
            });
        }

        Ok(Expr::Identifier(ident))
    }

    /// Whether the upcoming tokens are `: ident (`.
    fn is_prefixed_call(&mut self) -> bool {
        matches!(self.lexer.peek_nth(0).map(|t| &t.token), Some(Token::Colon))
            && matches!(self.lexer.peek_nth(1).map(|t| &t.token), Some(Token::Ident(_)))
            && matches!(self.lexer.peek_nth(2).map(|t| &t.token), Some(Token::LParen))
    }

    /// Parse a parenthesized, comma-separated argument list.
    ///
    /// Returns the arguments and the span of the closing paren.
    fn parse_arguments(&mut self) -> Result<(Vec<Expr>, Span), ParseError> {
        self.expect_token(Token::LParen)?;
        let mut args = Vec::new();

        if self.peek_is(&Token::RParen) {
            let close = self.next_token()?;
            return Ok((args, close.span));
        }

        args.push(self.parse_expression()?);
        while self.peek_is(&Token::Comma) {
            self.next_token()?; // consume ,
            args.push(self.parse_expression()?);
        }

        let close = self.expect_token(Token::RParen)?;
        Ok((args, close.span))
    }

    fn peek_is(&mut self, expected: &Token) -> bool {
        self.lexer.peek().map(|t| &t.token) == Some(expected)
    }

    /// Expect and consume an identifier.
    fn expect_ident(&mut self) -> Result<Spanned<String>, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Ident(name) => Ok(Spanned::new(name, tok.span)),
            other => Err(ParseError::new(
                format!("expected identifier, found {}", other.describe()),
                tok.span,
            )),
        }
    }

    /// Expect and consume a specific token.
    fn expect_token(&mut self, expected: Token) -> Result<SpannedToken, ParseError> {
        let tok = self.next_token()?;
        if std::mem::discriminant(&tok.token) == std::mem::discriminant(&expected) {
            Ok(tok)
        } else {
            Err(ParseError::new(
                format!("expected {:?}, found {}", expected, tok.token.describe()),
                tok.span,
            ))
        }
    }

    /// Fail if anything but end of input remains.
    fn expect_end(&mut self) -> Result<(), ParseError> {
        if let Some(tok) = self.lexer.next_token() {
            return Err(ParseError::new(
                format!("unexpected {} after expression", tok.token.describe()),
                tok.span,
            ));
        }
        match self.lexer.error() {
            Some(span) => Err(self.unrecognized(span)),
            None => Ok(()),
        }
    }

    /// Get the next token or error if the input ended.
    fn next_token(&mut self) -> Result<SpannedToken, ParseError> {
        if let Some(tok) = self.lexer.next_token() {
            return Ok(tok);
        }
        match self.lexer.error() {
            Some(span) => Err(self.unrecognized(span)),
            None => Err(ParseError::new(
                "unexpected end of expression",
                Span::point(self.source.len()),
            )),
        }
    }

    fn unrecognized(&self, span: Span) -> ParseError {
        let text = span.slice(self.source).unwrap_or("");
        ParseError::new(format!("unrecognized input '{}'", text), span)
    }
}

/// Parse a source string into an expression tree.
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(source);
    parser.parse_root()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ident(name: &str, start: usize) -> Expr {
        Expr::Identifier(Spanned::new(
            name.to_string(),
            Span::new(start, start + name.len()),
        ))
    }

    #[test]
    fn test_parse_identifier() {
        assert_eq!(parse("value").unwrap(), ident("value", 0));
    }

    #[test]
    fn test_parse_delimited_expression() {
        let bare = parse("value").unwrap();
        let dollar = parse("${value}").unwrap();
        let hash = parse("#{value}").unwrap();
        assert!(matches!(bare, Expr::Identifier(_)));
        assert!(matches!(dollar, Expr::Identifier(_)));
        assert!(matches!(hash, Expr::Identifier(_)));
    }

    #[test]
    fn test_parse_precedence() {
        // && binds tighter than ||
        let expr = parse("a || b && c").unwrap();
        if let Expr::Binary { op, right, .. } = expr {
            assert_eq!(op, BinaryOp::Or);
            assert!(matches!(*right, Expr::Binary { op: BinaryOp::And, .. }));
        } else {
            panic!("expected Binary");
        }

        // * binds tighter than +
        let expr = parse("1 + 2 * 3").unwrap();
        if let Expr::Binary { op, right, .. } = expr {
            assert_eq!(op, BinaryOp::Add);
            assert!(matches!(*right, Expr::Binary { op: BinaryOp::Mul, .. }));
        } else {
            panic!("expected Binary");
        }
    }

    #[test]
    fn test_parse_left_associative() {
        let expr = parse("10 - 4 - 3").unwrap();
        if let Expr::Binary { left, .. } = expr {
            assert!(matches!(*left, Expr::Binary { op: BinaryOp::Sub, .. }));
        } else {
            panic!("expected Binary");
        }
    }

    #[test]
    fn test_parse_method_call_chain() {
        let expr = parse("value != null && value.length() > 3").unwrap();
        if let Expr::Binary { op, right, .. } = expr {
            assert_eq!(op, BinaryOp::And);
            if let Expr::Binary { left, .. } = *right {
                if let Expr::MethodCall { method, args, .. } = *left {
                    assert_eq!(method.value, "length");
                    assert!(args.is_empty());
                } else {
                    panic!("expected MethodCall");
                }
            }
        } else {
            panic!("expected Binary");
        }
    }

    #[test]
    fn test_parse_member_and_index() {
        let expr = parse("order.lines[0].quantity").unwrap();
        if let Expr::Member { target, property, .. } = expr {
            assert_eq!(property.value, "quantity");
            assert!(matches!(*target, Expr::Index { .. }));
        } else {
            panic!("expected Member");
        }
    }

    #[test]
    fn test_parse_prefixed_function() {
        let expr = parse("fn:length(name) > 2").unwrap();
        if let Expr::Binary { left, .. } = expr {
            if let Expr::FunctionCall { prefix, name, args, .. } = *left {
                assert_eq!(prefix.map(|p| p.value), Some("fn".to_string()));
                assert_eq!(name.value, "length");
                assert_eq!(args.len(), 1);
            } else {
                panic!("expected FunctionCall");
            }
        }
    }

    #[test]
    fn test_parse_conditional_is_not_a_function() {
        let expr = parse("flag ? a : b").unwrap();
        assert!(matches!(expr, Expr::Conditional { .. }));
    }

    #[test]
    fn test_parse_unary_chain() {
        let expr = parse("!empty name").unwrap();
        if let Expr::Unary { op, operand, .. } = expr {
            assert_eq!(op, UnaryOp::Not);
            assert!(matches!(*operand, Expr::Unary { op: UnaryOp::Empty, .. }));
        } else {
            panic!("expected Unary");
        }
    }

    #[test]
    fn test_parse_assignment() {
        let expr = parse("value.name = 'x'").unwrap();
        assert!(matches!(expr, Expr::Assign { .. }));
    }

    #[test]
    fn test_parse_spans() {
        let expr = parse("a.b").unwrap();
        assert_eq!(expr.span(), Span::new(0, 3));
    }

    #[test]
    fn test_error_trailing_tokens() {
        let err = parse("a b").unwrap_err();
        assert!(err.message.contains("after expression"));
        assert_eq!(err.span, Span::new(2, 3));
    }

    #[test]
    fn test_error_unclosed_paren() {
        let err = parse("(a && b").unwrap_err();
        assert!(err.message.contains("end of expression"));
    }

    #[test]
    fn test_error_unclosed_delimiter() {
        assert!(parse("${value").is_err());
    }

    #[test]
    fn test_error_unrecognized_character() {
        let err = parse("value @ 3").unwrap_err();
        assert!(err.message.contains("'@'"));
        assert_eq!(err.span, Span::new(6, 7));
    }

    #[test]
    fn test_error_formatting() {
        let source = "value == ";
        let err = parse(source).unwrap_err();
        let formatted = err.format_with_source(source);
        assert!(formatted.contains("line 1"));
    }
}
