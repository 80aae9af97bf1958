//! Variable substitution.
//!
//! Rebuilds a tree bottom-up through the smart constructors, so the result is
//! canonical again (substituting `x := 2` into `x + 3` yields `5`). Subtrees
//! without any replaced variable are shared, not copied.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::{Expr, ExprKind};
use crate::core::symbol::Symbol;

/// Replace every variable for which `lookup` returns a value.
pub(crate) fn substitute_with<F>(expr: &Arc<Expr>, lookup: &F) -> Arc<Expr>
where
    F: Fn(&Symbol) -> Option<Arc<Expr>>,
{
    match &expr.kind {
        ExprKind::Constant(_) => Arc::clone(expr),
        ExprKind::Variable(s) => lookup(s).unwrap_or_else(|| Arc::clone(expr)),
        _ => {
            let children = expr.children();
            let mut changed = false;
            let new_children: Vec<Arc<Expr>> = children
                .iter()
                .map(|c| {
                    let n = substitute_with(c, lookup);
                    changed |= !Arc::ptr_eq(&n, c);
                    n
                })
                .collect();
            if changed {
                Arc::new(expr.with_children(new_children))
            } else {
                Arc::clone(expr)
            }
        }
    }
}

impl Expr {
    /// Substitute a variable with another expression
    ///
    /// # Example
    /// ```
    /// use symb_equiv::Expr;
    ///
    /// let x = Expr::variable("x");
    /// let e = x.clone() * x + Expr::from_i64(1);
    /// assert_eq!(e.substitute("x", &Expr::from_i64(3)), Expr::from_i64(10));
    /// ```
    #[must_use]
    pub fn substitute(&self, var: &str, replacement: &Self) -> Self {
        let target = Symbol::new(var);
        let replacement = Arc::new(replacement.clone());
        let lookup = |s: &Symbol| (*s == target).then(|| Arc::clone(&replacement));
        let result = substitute_with(&Arc::new(self.clone()), &lookup);
        Arc::try_unwrap(result).unwrap_or_else(|arc| (*arc).clone())
    }

    /// Substitute several variables at once.
    ///
    /// All replacements happen simultaneously: a replacement value is never
    /// itself substituted into.
    #[must_use]
    pub fn substitute_all(&self, bindings: &FxHashMap<Symbol, Arc<Self>>) -> Self {
        if bindings.is_empty() {
            return self.clone();
        }
        let lookup = |s: &Symbol| bindings.get(s).cloned();
        let result = substitute_with(&Arc::new(self.clone()), &lookup);
        Arc::try_unwrap(result).unwrap_or_else(|arc| (*arc).clone())
    }
}
