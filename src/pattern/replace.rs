//! Rule-based rewriting (`Replace`).
//!
//! A rule rewrites a tree in one step at any position where its pattern
//! matches: at the root, inside any argument or operand, and at any
//! sub-multiset of a Sum/Product argument list.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::trace;

use super::{Matcher, Pattern};
use crate::core::error::{EngineError, Result};
use crate::core::expr::{Expr, ExprKind, substitute_with};

/// Sub-multisets of a commutative argument list are only tried up to this
/// many arguments (2^n subsets).
pub const MAX_SUBSET_ARGS: usize = 10;

/// A `(pattern, replacement)` rewrite rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Pattern,
    replacement: Arc<Expr>,
}

impl Rule {
    /// Create a rule.
    ///
    /// # Errors
    /// Returns [`EngineError::ReplacementNotCovered`] when the replacement
    /// uses a variable that is neither free in the pattern nor a literal
    /// variable of the pattern.
    pub fn new(pattern: Pattern, replacement: Expr) -> Result<Self> {
        let literals = pattern.literal_variables();
        let missing: Vec<String> = replacement
            .variables()
            .into_iter()
            .filter(|s| !pattern.free_variables().contains(s) && !literals.contains(s))
            .map(|s| s.name().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::ReplacementNotCovered { missing });
        }
        Ok(Self {
            pattern,
            replacement: Arc::new(replacement),
        })
    }

    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    #[must_use]
    pub const fn replacement(&self) -> &Arc<Expr> {
        &self.replacement
    }

    /// Every tree obtained from `expr` by rewriting one match site.
    ///
    /// Results are distinct at the `Exactly` level; `expr` itself is never
    /// included.
    #[must_use]
    pub fn apply(&self, expr: &Expr) -> Vec<Expr> {
        self.apply_shared(&Arc::new(expr.clone()))
            .into_iter()
            .map(|r| Arc::try_unwrap(r).unwrap_or_else(|arc| (*arc).clone()))
            .collect()
    }

    /// [`Rule::apply`] over shared nodes; unchanged subtrees stay shared
    /// with `expr`.
    pub(crate) fn apply_shared(&self, expr: &Arc<Expr>) -> Vec<Arc<Expr>> {
        let mut seen: FxHashSet<Arc<Expr>> = FxHashSet::default();
        seen.insert(Arc::clone(expr));
        self.rewrites(expr)
            .into_iter()
            .filter(|r| seen.insert(Arc::clone(r)))
            .collect()
    }

    fn rewrites(&self, expr: &Arc<Expr>) -> Vec<Arc<Expr>> {
        let mut out = self.rewrite_here(expr);
        self.rewrite_subsets(expr, &mut out);

        let children = expr.children();
        for (i, child) in children.iter().enumerate() {
            for rewritten in self.rewrites(child) {
                let mut next = children.clone();
                next[i] = rewritten;
                out.push(Arc::new(expr.with_children(next)));
            }
        }
        out
    }

    /// Rewrites with `expr` itself as the match site
    fn rewrite_here(&self, expr: &Arc<Expr>) -> Vec<Arc<Expr>> {
        let results = Matcher::new(self.pattern.free_variables()).matches(expr, self.pattern.expr());
        results
            .iter()
            .map(|bindings| {
                trace!(site = %expr, bindings = %bindings, "pattern matched");
                let map = bindings.as_map();
                substitute_with(&self.replacement, &|s| map.get(s).cloned())
            })
            .collect()
    }

    /// Rewrites of a proper sub-multiset of a Sum/Product argument list,
    /// when the pattern's root is the same operator.
    fn rewrite_subsets(&self, expr: &Arc<Expr>, out: &mut Vec<Arc<Expr>>) {
        let (args, rebuild): (&[Arc<Expr>], fn(Vec<Arc<Expr>>) -> Expr) =
            match (expr.kind(), self.pattern.expr().kind()) {
                (ExprKind::Sum(args), ExprKind::Sum(_)) => (args, Expr::sum_arcs),
                (ExprKind::Product(args), ExprKind::Product(_)) => (args, Expr::product_arcs),
                _ => return,
            };
        let n = args.len();
        if n < 3 || n > MAX_SUBSET_ARGS {
            return;
        }
        // Every subset with at least two members that leaves something out
        for mask in 1u32..(1 << n) - 1 {
            if mask.count_ones() < 2 {
                continue;
            }
            let (inside, outside): (Vec<_>, Vec<_>) =
                (0..n).partition(|&i| mask & (1 << i) != 0);
            let group = Arc::new(rebuild(inside.iter().map(|&i| Arc::clone(&args[i])).collect()));
            for rewritten in self.rewrite_here(&group) {
                let mut rest: Vec<Arc<Expr>> = outside.iter().map(|&i| Arc::clone(&args[i])).collect();
                rest.push(rewritten);
                out.push(Arc::new(rebuild(rest)));
            }
        }
    }

    /// The same rule read right to left.
    ///
    /// # Errors
    /// Returns [`EngineError::ReplacementNotCovered`] when the pattern uses
    /// variables that the replacement does not bind.
    pub fn reversed(&self) -> Result<Self> {
        // Only variables that occur in the new pattern can still be free
        let occurring = self.replacement.variables();
        let free: Vec<String> = self
            .pattern
            .free_variables()
            .iter()
            .filter(|s| occurring.contains(s))
            .map(|s| s.name().to_string())
            .collect();
        let free_refs: Vec<&str> = free.iter().map(String::as_str).collect();
        Self::new(
            Pattern::with_free_variables(self.replacement.as_ref().clone(), &free_refs),
            self.pattern.expr().as_ref().clone(),
        )
    }
}
