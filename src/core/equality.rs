//! Four-level equality.
//!
//! Each level is strictly stronger (and more expensive) than the previous one
//! and is built only from it:
//! - `Exactly`: structural equality. Hash mismatch rejects immediately;
//!   commutative argument lists are matched by hash-bucketed search-and-remove.
//! - `Atomic`: `Exactly` after expanding every named function to its body.
//! - `Deep`: bounded equivalence-class search (depth [`DEFAULT_SEARCH_DEPTH`]).
//! - `Deepest`: unbounded equivalence-class search. May not terminate.
//!
//! A `false` from `Deep`/`Deepest` means "not proven", never "different".

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::expr::{Expr, FunctionCall, MonadKind};
use crate::core::number::Number;
use crate::core::symbol::Symbol;
use crate::core::visitor::{DualVisitor, accept_dual};
use crate::equivalence::{DEFAULT_SEARCH_DEPTH, EquivalenceSearch};

/// How hard to try when deciding whether two expressions are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum EqualityLevel {
    /// Same canonical tree
    #[default]
    Exactly,
    /// Same tree once named functions are expanded
    Atomic,
    /// Reachable from each other within the default rewrite depth
    Deep,
    /// Reachable from each other by any number of rewrites
    Deepest,
}

/// Structural equality; the implementation behind `PartialEq for Expr`.
pub(crate) fn exactly_equal(a: &Expr, b: &Expr) -> bool {
    if std::ptr::eq(a, b) {
        return true;
    }
    if a.hash != b.hash {
        return false;
    }
    accept_dual(a, b, &mut ExactComparer)
}

struct ExactComparer;

impl DualVisitor<bool> for ExactComparer {
    fn visit_constants(&mut self, a: &Number, b: &Number) -> bool {
        a == b
    }

    fn visit_variables(&mut self, a: &Symbol, b: &Symbol) -> bool {
        a == b
    }

    fn visit_sums(&mut self, a: &[Arc<Expr>], b: &[Arc<Expr>]) -> bool {
        commutative_equal(a, b)
    }

    fn visit_products(&mut self, a: &[Arc<Expr>], b: &[Arc<Expr>]) -> bool {
        commutative_equal(a, b)
    }

    fn visit_exponents(&mut self, a: (&Arc<Expr>, &Arc<Expr>), b: (&Arc<Expr>, &Arc<Expr>)) -> bool {
        exactly_equal(a.0, b.0) && exactly_equal(a.1, b.1)
    }

    fn visit_monads(&mut self, _kind: MonadKind, a: &Arc<Expr>, b: &Arc<Expr>) -> bool {
        exactly_equal(a, b)
    }

    fn visit_functions(&mut self, a: &FunctionCall, b: &FunctionCall) -> bool {
        a.def().same_identity(b.def())
            && a.args().len() == b.args().len()
            && a.args().iter().zip(b.args()).all(|(x, y)| exactly_equal(x, y))
    }

    fn visit_mismatch(&mut self, _a: &Expr, _b: &Expr) -> bool {
        false
    }
}

/// Every left argument must claim a distinct, structurally equal right
/// argument. Right arguments are bucketed by hash so each lookup only scans
/// candidates that can possibly match.
fn commutative_equal(a: &[Arc<Expr>], b: &[Arc<Expr>]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut buckets: FxHashMap<u64, Vec<&Arc<Expr>>> = FxHashMap::default();
    for y in b {
        buckets.entry(y.hash).or_default().push(y);
    }
    for x in a {
        let Some(bucket) = buckets.get_mut(&x.hash) else {
            return false;
        };
        let Some(pos) = bucket.iter().position(|y| exactly_equal(x, y)) else {
            return false;
        };
        bucket.swap_remove(pos);
    }
    true
}

impl Expr {
    /// Compare with `other` at the given strength.
    ///
    /// # Example
    /// ```
    /// use symb_equiv::{EqualityLevel, Expr, functions};
    ///
    /// let x = Expr::variable("x");
    /// let root = functions::sqrt(x.clone());
    /// let power = Expr::pow(x, Expr::from_fraction(1, 2).unwrap());
    /// assert!(!root.equals(&power, EqualityLevel::Exactly));
    /// assert!(root.equals(&power, EqualityLevel::Atomic));
    /// ```
    #[must_use]
    pub fn equals(&self, other: &Self, level: EqualityLevel) -> bool {
        match level {
            EqualityLevel::Exactly => self == other,
            EqualityLevel::Atomic => {
                self == other || self.atomic_expression() == other.atomic_expression()
            }
            EqualityLevel::Deep => EquivalenceSearch::new()
                .depth(Some(DEFAULT_SEARCH_DEPTH))
                .proves(self, other),
            EqualityLevel::Deepest => EquivalenceSearch::new().depth(None).proves(self, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::expr::FunctionDef;

    #[test]
    fn test_exactly_is_order_independent() {
        let x = Expr::variable("x");
        let y = Expr::variable("y");
        let a = Expr::sum(vec![Expr::sin_of(x.clone()), y.clone(), x.clone()]);
        let b = Expr::sum(vec![x, Expr::sin_of(Expr::variable("X")), y]);
        assert!(a.equals(&b, EqualityLevel::Exactly));
    }

    #[test]
    fn test_commutative_multiset_semantics() {
        let x = Arc::new(Expr::variable("x"));
        let y = Arc::new(Expr::variable("y"));
        // Raw argument lists: [x, x, y] vs [x, y, y]
        assert!(!commutative_equal(
            &[Arc::clone(&x), Arc::clone(&x), Arc::clone(&y)],
            &[Arc::clone(&x), Arc::clone(&y), Arc::clone(&y)]
        ));
        assert!(commutative_equal(
            &[Arc::clone(&x), Arc::clone(&y)],
            &[Arc::clone(&y), Arc::clone(&x)]
        ));
    }

    #[test]
    fn test_atomic_level() {
        let def = FunctionDef::new(
            "halve",
            &["t"],
            Expr::product(vec![Expr::from_fraction(1, 2).unwrap(), Expr::variable("t")]),
        );
        let x = Expr::variable("x");
        let call = Expr::call(&def, vec![x.clone()]).unwrap();
        let body = Expr::divide(x, Expr::from_i64(2));
        assert!(!call.equals(&body, EqualityLevel::Exactly));
        assert!(call.equals(&body, EqualityLevel::Atomic));
    }

    #[test]
    fn test_functions_need_same_identity() {
        let a = FunctionDef::new("f_ident", &["t"], Expr::variable("t"));
        let b = FunctionDef::new("f_ident", &["t"], Expr::sin_of(Expr::variable("t")));
        let x = Expr::variable("x");
        let fa = Expr::call(&a, vec![x.clone()]).unwrap();
        let fb = Expr::call(&b, vec![x]).unwrap();
        assert_ne!(fa, fb);
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(EqualityLevel::Exactly < EqualityLevel::Atomic);
        assert!(EqualityLevel::Atomic < EqualityLevel::Deep);
        assert!(EqualityLevel::Deep < EqualityLevel::Deepest);
    }
}
