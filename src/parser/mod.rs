//! Parser module - converts text to canonical expressions
//!
//! Grammar: decimal literals (fractions are written as divisions, `3/4`),
//! identifiers, infix `+ - * / ^` (`^` right-associative), unary minus,
//! parentheses, and function application either as `f(a, b)` or, for
//! one-argument functions, brace-less and chainable (`sign sign 5`).
//! Function and variable names are case-insensitive.
mod lexer;
mod pratt;
mod tokens;

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::error::{EngineError, Result};
use crate::core::expr::{Expr, FunctionDef};
use crate::core::symbol::{Symbol, normalize_name};

/// Parser configuration.
///
/// # Example
/// ```
/// use symb_equiv::{EngineError, Expr, FunctionDef, Parser};
///
/// let square = FunctionDef::new("sq", &["t"], Expr::pow(Expr::variable("t"), Expr::from_i64(2)));
/// let parser = Parser::new().allow_variables(["x"]).function(square);
///
/// let expr = parser.parse("sq(x) + 1").expect("valid input");
/// assert_eq!(expr.to_string(), "1 + sq(x)");
///
/// assert!(matches!(
///     parser.parse("sq(y)"),
///     Err(EngineError::UnknownIdentifier { .. })
/// ));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parser {
    /// `None` accepts every variable name
    pub(crate) allowed: Option<FxHashSet<Symbol>>,
    pub(crate) functions: FxHashMap<String, Arc<FunctionDef>>,
}

impl Parser {
    /// Accept any variable, know only the built-in functions
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict variables to `names`; any other identifier that is not a
    /// function is an [`EngineError::UnknownIdentifier`].
    #[must_use]
    pub fn allow_variables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed
            .get_or_insert_with(FxHashSet::default)
            .extend(names.into_iter().map(|n| Symbol::new(n.as_ref())));
        self
    }

    /// Make a user-defined function callable by name
    #[must_use]
    pub fn function(mut self, def: Arc<FunctionDef>) -> Self {
        self.functions.insert(normalize_name(def.name()), def);
        self
    }

    /// Parse `input` into a canonical expression.
    ///
    /// # Errors
    /// - [`EngineError::Syntax`] for empty input, unbalanced parentheses,
    ///   missing operands, stray tokens and wrong function arities.
    /// - [`EngineError::UnknownIdentifier`] for a variable outside the
    ///   allowed set.
    pub fn parse(&self, input: &str) -> Result<Expr> {
        // Pipeline: validate -> lex -> balance -> parse
        if input.trim().is_empty() {
            return Err(EngineError::syntax("empty expression"));
        }
        let tokens = lexer::lex(input)?;
        lexer::check_balance(&tokens)?;
        pratt::parse_expression(&tokens, self)
    }
}

/// Parse with the default configuration: any variable, built-in functions.
///
/// # Errors
/// See [`Parser::parse`].
pub fn parse(input: &str) -> Result<Expr> {
    Parser::new().parse(input)
}
