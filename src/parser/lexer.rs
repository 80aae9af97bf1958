//! Tokenizer and parenthesis balance check.

use super::tokens::{Operator, Token, TokenKind};
use crate::core::error::{EngineError, Result, Span};
use crate::core::number::Number;
use crate::core::symbol::normalize_name;

/// Split `input` into spanned tokens. Identifiers are lower-cased.
pub(crate) fn lex(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::with_capacity(input.len() / 2 + 1);
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let mut end = start;
            while let Some(&(i, d)) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let text = &input[start..end];
            let span = Span::new(start, end);
            let number = Number::parse_decimal(text)
                .ok_or_else(|| EngineError::syntax_at(format!("invalid number '{text}'"), span))?;
            tokens.push(Token {
                kind: TokenKind::Number(number),
                span,
            });
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let mut end = start;
            while let Some(&(i, d)) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token {
                kind: TokenKind::Identifier(normalize_name(&input[start..end])),
                span: Span::new(start, end),
            });
            continue;
        }

        let kind = match c {
            '+' => TokenKind::Operator(Operator::Add),
            '-' => TokenKind::Operator(Operator::Sub),
            '*' => TokenKind::Operator(Operator::Mul),
            '/' => TokenKind::Operator(Operator::Div),
            '^' => TokenKind::Operator(Operator::Pow),
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ',' => TokenKind::Comma,
            other => {
                return Err(EngineError::syntax_at(
                    format!("unexpected character '{other}'"),
                    Span::new(start, start + other.len_utf8()),
                ));
            }
        };
        chars.next();
        tokens.push(Token {
            kind,
            span: Span::new(start, start + 1),
        });
    }

    Ok(tokens)
}

/// Reject a `)` without an opening partner, or a `(` never closed.
pub(crate) fn check_balance(tokens: &[Token]) -> Result<()> {
    let mut open: Vec<Span> = Vec::new();
    for token in tokens {
        match token.kind {
            TokenKind::LeftParen => open.push(token.span),
            TokenKind::RightParen => {
                if open.pop().is_none() {
                    return Err(EngineError::syntax_at("unbalanced parentheses", token.span));
                }
            }
            _ => {}
        }
    }
    match open.pop() {
        Some(span) => Err(EngineError::syntax_at("unbalanced parentheses", span)),
        None => Ok(()),
    }
}
