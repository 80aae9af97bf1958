//! Pattern matching and rule-based rewriting.
//!
//! A [`Pattern`] is an expression tree in which some variables are *free*:
//! each free variable matches any subtree. Matching produces a
//! [`PatternMatchingResultSet`], the disjunction of all consistent bindings.
//! A [`Rule`] pairs a pattern with a replacement template and rewrites every
//! place in a tree where the pattern matches.
//!
//! # Example
//! ```
//! use symb_equiv::{Expr, Pattern, Rule};
//!
//! let a = Expr::variable("a");
//! let b = Expr::variable("b");
//! // ln(a*b) -> ln(a) + ln(b)
//! let rule = Rule::new(
//!     Pattern::new(Expr::ln_of(a.clone() * b.clone())),
//!     Expr::ln_of(a) + Expr::ln_of(b),
//! )
//! .expect("replacement only uses pattern variables");
//!
//! let x = Expr::variable("x");
//! let y = Expr::variable("y");
//! let rewrites = rule.apply(&Expr::ln_of(x.clone() * y.clone()));
//! assert!(rewrites.contains(&(Expr::ln_of(x) + Expr::ln_of(y))));
//! ```

mod matcher;
pub mod partition;
mod replace;
mod result;

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::expr::Expr;
use crate::core::symbol::Symbol;

pub use matcher::match_pattern;
pub(crate) use matcher::Matcher;
pub use replace::Rule;
pub use result::{PatternMatchingResult, PatternMatchingResultSet};

/// A template tree plus the set of its variables that act as wildcards.
#[derive(Debug, Clone)]
pub struct Pattern {
    expr: Arc<Expr>,
    free: BTreeSet<Symbol>,
}

impl Pattern {
    /// Every variable of `expr` is free.
    #[must_use]
    pub fn new(expr: Expr) -> Self {
        let free = expr.variables();
        Self {
            expr: Arc::new(expr),
            free,
        }
    }

    /// Only the named variables are free; every other variable must match
    /// itself literally.
    #[must_use]
    pub fn with_free_variables(expr: Expr, free: &[&str]) -> Self {
        Self {
            expr: Arc::new(expr),
            free: free.iter().map(|name| Symbol::new(name)).collect(),
        }
    }

    #[must_use]
    pub const fn expr(&self) -> &Arc<Expr> {
        &self.expr
    }

    #[must_use]
    pub const fn free_variables(&self) -> &BTreeSet<Symbol> {
        &self.free
    }

    /// Variables of the pattern that must match literally
    #[must_use]
    pub fn literal_variables(&self) -> BTreeSet<Symbol> {
        self.expr
            .variables()
            .into_iter()
            .filter(|s| !self.free.contains(s))
            .collect()
    }

    /// True when the whole pattern is a single free variable, which matches
    /// every node of every tree.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.expr
            .as_variable()
            .is_some_and(|symbol| self.free.contains(symbol))
    }

    /// Shorthand for [`match_pattern`]`(target, self)`
    #[must_use]
    pub fn matches(&self, target: &Expr) -> PatternMatchingResultSet {
        match_pattern(target, self)
    }
}
