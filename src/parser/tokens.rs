use crate::core::error::Span;
use crate::core::number::Number;

/// Binary and unary operators of the grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operator {
    /// Binding strength of the infix form
    pub(crate) const fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 10,
            Self::Mul | Self::Div => 20,
            Self::Pow => 30,
        }
    }

    pub(crate) const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Pow => '^',
        }
    }
}

/// Precedence of unary minus and of brace-less function application:
/// tighter than `*`, looser than `^`, so `-x^2` is `-(x^2)` and
/// `sin x^2` is `sin(x^2)`.
pub(crate) const PREFIX_PRECEDENCE: u8 = 25;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(Number),
    /// Lower-cased identifier
    Identifier(String),
    Operator(Operator),
    LeftParen,
    RightParen,
    Comma,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Span,
}

impl Token {
    /// Short description for error messages
    pub(crate) fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Number(n) => format!("number '{n}'"),
            TokenKind::Identifier(name) => format!("identifier '{name}'"),
            TokenKind::Operator(op) => format!("operator '{}'", op.symbol()),
            TokenKind::LeftParen => "'('".to_string(),
            TokenKind::RightParen => "')'".to_string(),
            TokenKind::Comma => "','".to_string(),
        }
    }
}
