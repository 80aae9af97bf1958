use std::sync::Arc;

use super::Parser;
use super::tokens::{Operator, PREFIX_PRECEDENCE, Token, TokenKind};
use crate::core::error::{EngineError, Result, Span};
use crate::core::expr::{Expr, FunctionDef, MonadKind};
use crate::core::functions::builtin;
use crate::core::symbol::Symbol;

/// A resolved function name
enum Callee {
    Monad(MonadKind),
    Named(Arc<FunctionDef>),
}

impl Callee {
    fn arity(&self) -> usize {
        match self {
            Self::Monad(_) => 1,
            Self::Named(def) => def.arity(),
        }
    }
}

/// Parse tokens into an expression using Pratt parsing
pub(crate) fn parse_expression(tokens: &[Token], config: &Parser) -> Result<Expr> {
    let mut parser = Pratt {
        tokens,
        pos: 0,
        config,
    };
    let expr = parser.parse_expr(0)?;
    match parser.current() {
        None => Ok(expr),
        Some(token) => Err(EngineError::syntax_at(
            format!("unexpected {}", token.describe()),
            token.span,
        )),
    }
}

struct Pratt<'a> {
    tokens: &'a [Token],
    pos: usize,
    config: &'a Parser,
}

impl<'a> Pratt<'a> {
    fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Span just past the last token, for "missing operand" errors
    fn end_span(&self) -> Span {
        self.tokens
            .last()
            .map_or_else(Span::default, |t| Span::at(t.span.end))
    }

    fn expect_right_paren(&mut self) -> Result<()> {
        match self.current() {
            Some(Token {
                kind: TokenKind::RightParen,
                ..
            }) => {
                self.advance();
                Ok(())
            }
            Some(token) => Err(EngineError::syntax_at(
                format!("expected ')', found {}", token.describe()),
                token.span,
            )),
            None => Err(EngineError::syntax_at("expected ')'", self.end_span())),
        }
    }

    fn parse_expr(&mut self, min_precedence: u8) -> Result<Expr> {
        let mut left = self.parse_prefix()?;

        while let Some(token) = self.current() {
            let op = match token.kind {
                TokenKind::Operator(op) => op,
                _ => break,
            };
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();

            // Right associative for power, left for others
            let next_precedence = if op == Operator::Pow {
                precedence
            } else {
                precedence + 1
            };
            let right = self.parse_expr(next_precedence)?;

            left = match op {
                Operator::Add => left + right,
                Operator::Sub => left - right,
                Operator::Mul => left * right,
                Operator::Div => left / right,
                Operator::Pow => Expr::pow(left, right),
            };
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        let token = self
            .current()
            .ok_or_else(|| EngineError::syntax_at("missing operand", self.end_span()))?;

        match &token.kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::constant(n.clone()))
            }

            TokenKind::Identifier(name) => {
                self.advance();
                match self.resolve(name) {
                    Some(callee) => self.parse_call(name, &callee, token.span),
                    None => self.variable(name, token.span),
                }
            }

            // Unary minus binds looser than ^ and tighter than *
            TokenKind::Operator(Operator::Sub) => {
                self.advance();
                let operand = self.parse_expr(PREFIX_PRECEDENCE)?;
                Ok(-operand)
            }

            TokenKind::Operator(Operator::Add) => {
                self.advance();
                self.parse_expr(PREFIX_PRECEDENCE)
            }

            TokenKind::LeftParen => {
                self.advance();
                if let Some(Token {
                    kind: TokenKind::RightParen,
                    span,
                }) = self.current()
                {
                    return Err(EngineError::syntax_at("empty parentheses", *span));
                }
                let expr = self.parse_expr(0)?;
                self.expect_right_paren()?;
                Ok(expr)
            }

            _ => Err(EngineError::syntax_at(
                format!("unexpected {}", token.describe()),
                token.span,
            )),
        }
    }

    /// Monads are reserved; user definitions shadow built-ins.
    fn resolve(&self, name: &str) -> Option<Callee> {
        if let Some(kind) = MonadKind::from_name(name) {
            return Some(Callee::Monad(kind));
        }
        self.config
            .functions
            .get(name)
            .cloned()
            .or_else(|| builtin(name))
            .map(Callee::Named)
    }

    fn variable(&self, name: &str, span: Span) -> Result<Expr> {
        if let Some(allowed) = &self.config.allowed
            && !allowed.contains(&Symbol::new(name))
        {
            return Err(EngineError::UnknownIdentifier {
                name: name.to_string(),
                span: Some(span),
            });
        }
        Ok(Expr::variable(name))
    }

    /// `f(a, b, ..)` or, for one-argument functions, brace-less `f a`
    fn parse_call(&mut self, name: &str, callee: &Callee, span: Span) -> Result<Expr> {
        let args = match self.current() {
            Some(Token {
                kind: TokenKind::LeftParen,
                ..
            }) => {
                self.advance();
                let args = self.parse_arguments()?;
                self.expect_right_paren()?;
                args
            }
            Some(_) if callee.arity() == 1 => vec![self.parse_expr(PREFIX_PRECEDENCE)?],
            _ => {
                return Err(EngineError::syntax_at(
                    format!("function '{name}' needs a parenthesized argument list"),
                    span,
                ));
            }
        };

        if args.len() != callee.arity() {
            return Err(EngineError::syntax_at(
                format!(
                    "function '{name}' takes {} argument(s), got {}",
                    callee.arity(),
                    args.len()
                ),
                span,
            ));
        }

        match callee {
            Callee::Monad(kind) => {
                let arg = args.into_iter().next().ok_or_else(|| {
                    EngineError::syntax_at(format!("function '{name}' needs an argument"), span)
                })?;
                Ok(Expr::monad(*kind, arg))
            }
            Callee::Named(def) => Expr::call(def, args),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();

        if let Some(Token {
            kind: TokenKind::RightParen,
            ..
        }) = self.current()
        {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expr(0)?);

            match self.current() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => self.advance(),
                Some(Token {
                    kind: TokenKind::RightParen,
                    ..
                }) => break,
                Some(token) => {
                    return Err(EngineError::syntax_at(
                        format!("expected ',' or ')', found {}", token.describe()),
                        token.span,
                    ));
                }
                None => return Err(EngineError::syntax_at("expected ')'", self.end_span())),
            }
        }

        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::expr::ExprKind;
    use crate::functions;
    use crate::parser::lexer::lex;

    fn parse(text: &str) -> Result<Expr> {
        parse_expression(&lex(text)?, &Parser::new())
    }

    fn v(name: &str) -> Expr {
        Expr::variable(name)
    }

    #[test]
    fn test_precedence() {
        // x + 2 * 3 should be x + 6
        assert_eq!(parse("x + 2 * 3").unwrap(), v("x") + Expr::from_i64(6));
        match parse("(x + 1) * y").unwrap().kind() {
            ExprKind::Product(factors) => assert_eq!(factors.len(), 2),
            _ => panic!("Expected Product at top level"),
        }
    }

    #[test]
    fn test_unary_minus_below_power() {
        assert_eq!(
            parse("-x^2").unwrap(),
            -Expr::pow(v("x"), Expr::from_i64(2))
        );
        assert_eq!(parse("--x").unwrap(), v("x"));
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(
            parse("x^y^z").unwrap(),
            Expr::pow(v("x"), Expr::pow(v("y"), v("z")))
        );
    }

    #[test]
    fn test_fraction_literal() {
        assert_eq!(parse("3/4").unwrap(), Expr::from_fraction(3, 4).unwrap());
        assert_eq!(parse("0.5").unwrap(), Expr::from_fraction(1, 2).unwrap());
    }

    #[test]
    fn test_braceless_chain() {
        assert_eq!(parse("sign sign 5").unwrap(), Expr::from_i64(1));
        assert_eq!(
            parse("ln ln 15").unwrap(),
            Expr::ln_of(Expr::ln_of(Expr::from_i64(15)))
        );
        assert_eq!(parse("sin x^2").unwrap(), Expr::sin_of(Expr::pow(v("x"), Expr::from_i64(2))));
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(parse("min(x, y)").unwrap(), functions::min(v("x"), v("y")));
        assert_eq!(parse("LOG(y, x)").unwrap(), functions::log(v("y"), v("x")));
        assert_eq!(parse("Sqrt(X)").unwrap(), functions::sqrt(v("x")));
    }

    #[test]
    fn test_arity_is_a_syntax_error() {
        assert!(matches!(parse("min(x)"), Err(EngineError::Syntax { .. })));
        assert!(matches!(parse("sin(x, y)"), Err(EngineError::Syntax { .. })));
        assert!(matches!(parse("min x"), Err(EngineError::Syntax { .. })));
        assert!(matches!(parse("ln"), Err(EngineError::Syntax { .. })));
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(parse("x +"), Err(EngineError::Syntax { .. })));
        assert!(matches!(parse("()"), Err(EngineError::Syntax { .. })));
        assert!(matches!(parse("x y"), Err(EngineError::Syntax { .. })));
        assert!(matches!(parse("* x"), Err(EngineError::Syntax { .. })));
    }
}
