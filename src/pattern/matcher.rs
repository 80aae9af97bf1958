//! Structural pattern matching with associative-commutative support.

use std::collections::BTreeSet;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::partition::ordered_partitions;
use super::result::{PatternMatchingResult, PatternMatchingResultSet};
use super::Pattern;
use crate::core::expr::{Expr, ExprKind, FunctionCall, MonadKind};
use crate::core::number::Number;
use crate::core::symbol::Symbol;
use crate::core::visitor::{DualVisitor, accept_dual};

/// Match `target` against `pattern`.
///
/// Returns every consistent assignment of the pattern's free variables that
/// makes the pattern equal to the target. No match is the empty set, never
/// an error.
///
/// # Example
/// ```
/// use symb_equiv::{Expr, Pattern, match_pattern};
///
/// let target = Expr::variable("x") + Expr::variable("y");
/// let pattern = Pattern::new(Expr::variable("a"));
/// let results = match_pattern(&target, &pattern);
/// assert_eq!(results.len(), 1);
/// assert_eq!(**results.results()[0].get("a").unwrap(), target);
/// ```
#[must_use]
pub fn match_pattern(target: &Expr, pattern: &Pattern) -> PatternMatchingResultSet {
    let target = Arc::new(target.clone());
    Matcher::new(pattern.free_variables()).matches(&target, pattern.expr())
}

pub(crate) struct Matcher<'a> {
    free: &'a BTreeSet<Symbol>,
}

/// Builds the canonical node for a group of target arguments
type Rebuild = fn(Vec<Arc<Expr>>) -> Expr;

impl<'a> Matcher<'a> {
    pub(crate) const fn new(free: &'a BTreeSet<Symbol>) -> Self {
        Self { free }
    }

    pub(crate) fn matches(&mut self, target: &Arc<Expr>, pattern: &Expr) -> PatternMatchingResultSet {
        if let ExprKind::Variable(symbol) = pattern.kind()
            && self.free.contains(symbol)
        {
            return PatternMatchingResultSet::single(PatternMatchingResult::single(
                symbol.clone(),
                Arc::clone(target),
            ));
        }
        accept_dual(target, pattern, self)
    }

    /// Match `n` target arguments against `k` pattern arguments of a
    /// commutative operator: every ordered partition of the targets into `k`
    /// groups, each group rebuilt with `rebuild` and matched against its
    /// pattern argument.
    fn commutative(
        &mut self,
        targets: &[Arc<Expr>],
        patterns: &[Arc<Expr>],
        rebuild: Rebuild,
    ) -> PatternMatchingResultSet {
        let (n, k) = (targets.len(), patterns.len());
        if n < k {
            return PatternMatchingResultSet::none();
        }

        // The same (group, position) pair recurs across many partitions
        let mut memo: FxHashMap<(Vec<usize>, usize), PatternMatchingResultSet> =
            FxHashMap::default();
        let mut result = PatternMatchingResultSet::none();

        for assignment in ordered_partitions(n, k) {
            let mut acc = PatternMatchingResultSet::all();
            for (position, group) in assignment.into_iter().enumerate() {
                let key = (group, position);
                let sub = if let Some(cached) = memo.get(&key) {
                    cached.clone()
                } else {
                    let group_expr = match key.0.as_slice() {
                        [single] => Arc::clone(&targets[*single]),
                        indices => Arc::new(rebuild(
                            indices.iter().map(|&i| Arc::clone(&targets[i])).collect(),
                        )),
                    };
                    let sub = self.matches(&group_expr, &patterns[position]);
                    memo.insert(key, sub.clone());
                    sub
                };
                acc = acc.intersect(&sub);
                if acc.is_none() {
                    break;
                }
            }
            result = result.union(acc);
        }
        result
    }
}

impl DualVisitor<PatternMatchingResultSet> for Matcher<'_> {
    fn visit_constants(&mut self, a: &Number, b: &Number) -> PatternMatchingResultSet {
        if a == b {
            PatternMatchingResultSet::all()
        } else {
            PatternMatchingResultSet::none()
        }
    }

    // Only non-free pattern variables get here
    fn visit_variables(&mut self, a: &Symbol, b: &Symbol) -> PatternMatchingResultSet {
        if a == b {
            PatternMatchingResultSet::all()
        } else {
            PatternMatchingResultSet::none()
        }
    }

    fn visit_sums(&mut self, a: &[Arc<Expr>], b: &[Arc<Expr>]) -> PatternMatchingResultSet {
        self.commutative(a, b, Expr::sum_arcs)
    }

    fn visit_products(&mut self, a: &[Arc<Expr>], b: &[Arc<Expr>]) -> PatternMatchingResultSet {
        self.commutative(a, b, Expr::product_arcs)
    }

    fn visit_exponents(
        &mut self,
        a: (&Arc<Expr>, &Arc<Expr>),
        b: (&Arc<Expr>, &Arc<Expr>),
    ) -> PatternMatchingResultSet {
        let base = self.matches(a.0, b.0);
        if base.is_none() {
            return base;
        }
        base.intersect(&self.matches(a.1, b.1))
    }

    fn visit_monads(
        &mut self,
        _kind: MonadKind,
        a: &Arc<Expr>,
        b: &Arc<Expr>,
    ) -> PatternMatchingResultSet {
        self.matches(a, b)
    }

    fn visit_functions(&mut self, a: &FunctionCall, b: &FunctionCall) -> PatternMatchingResultSet {
        if !a.def().same_identity(b.def()) {
            return PatternMatchingResultSet::none();
        }
        let mut acc = PatternMatchingResultSet::all();
        for (target, pattern) in a.args().iter().zip(b.args()) {
            acc = acc.intersect(&self.matches(target, pattern));
            if acc.is_none() {
                break;
            }
        }
        acc
    }

    fn visit_mismatch(&mut self, _a: &Expr, _b: &Expr) -> PatternMatchingResultSet {
        PatternMatchingResultSet::none()
    }
}
