//! Atomic expansion: replacing named functions by their bodies.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::substitute::substitute_with;
use super::{Expr, ExprKind};
use crate::core::symbol::Symbol;

impl Expr {
    /// True when the tree contains no `Function` node.
    #[must_use]
    pub fn is_atomic(&self) -> bool {
        if let Some(cached) = self.atomic.get() {
            return cached.is_none();
        }
        match &self.kind {
            ExprKind::Constant(_) | ExprKind::Variable(_) => true,
            ExprKind::Function(_) => false,
            ExprKind::Sum(args) | ExprKind::Product(args) => args.iter().all(|a| a.is_atomic()),
            ExprKind::Exponent(base, power) => base.is_atomic() && power.is_atomic(),
            ExprKind::Monad(_, arg) => arg.is_atomic(),
        }
    }

    /// The tree with every `Function` node replaced by its body, arguments
    /// substituted for parameters, recursively.
    ///
    /// Memoized per node. An already atomic expression returns itself.
    #[must_use]
    pub fn atomic_expression(&self) -> &Self {
        self.atomic
            .get_or_init(|| {
                if self.is_atomic() {
                    None
                } else {
                    Some(Arc::new(expand(self)))
                }
            })
            .as_deref()
            .unwrap_or(self)
    }

    /// Shared-pointer form of [`Expr::atomic_expression`].
    #[must_use]
    pub fn atomic_arc(self: &Arc<Self>) -> Arc<Self> {
        if self.is_atomic() {
            return Arc::clone(self);
        }
        // Populate the cache, then hand out the cached node
        let _ = self.atomic_expression();
        match self.atomic.get() {
            Some(Some(expanded)) => Arc::clone(expanded),
            _ => Arc::clone(self),
        }
    }
}

fn expand(expr: &Expr) -> Expr {
    match &expr.kind {
        ExprKind::Function(call) => {
            let bindings: FxHashMap<Symbol, Arc<Expr>> = call
                .named_args()
                .map(|(param, arg)| (param.clone(), arg.atomic_arc()))
                .collect();
            let lookup = |s: &Symbol| bindings.get(s).cloned();
            // The body may itself call other functions
            let body = substitute_with(call.def.body(), &lookup);
            body.atomic_arc().as_ref().clone()
        }
        _ => {
            let children = expr.children().iter().map(Expr::atomic_arc).collect();
            expr.with_children(children)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::expr::FunctionDef;

    #[test]
    fn test_atomic_returns_same_reference() {
        let x = Expr::variable("x");
        let e = Expr::sum(vec![Expr::sin_of(x.clone()), x]);
        assert!(e.is_atomic());
        assert!(std::ptr::eq(e.atomic_expression(), &e));
    }

    #[test]
    fn test_function_expands_to_body() {
        let def = FunctionDef::new(
            "double",
            &["t"],
            Expr::product(vec![Expr::from_i64(2), Expr::variable("t")]),
        );
        let x = Expr::variable("x");
        let call = Expr::call(&def, vec![x.clone()]).unwrap();
        assert!(!call.is_atomic());
        assert_eq!(
            *call.atomic_expression(),
            Expr::product(vec![Expr::from_i64(2), x])
        );
    }

    #[test]
    fn test_nested_functions_expand_fully() {
        let inc = FunctionDef::new(
            "inc",
            &["t"],
            Expr::sum(vec![Expr::variable("t"), Expr::from_i64(1)]),
        );
        let inner = Expr::call(&inc, vec![Expr::variable("x")]).unwrap();
        let outer = Expr::call(&inc, vec![inner]).unwrap();
        let expanded = outer.atomic_expression();
        assert!(expanded.is_atomic());
        assert_eq!(
            *expanded,
            Expr::sum(vec![Expr::variable("x"), Expr::from_i64(2)])
        );
    }

    #[test]
    fn test_body_calling_function() {
        let sq = FunctionDef::new(
            "sq",
            &["t"],
            Expr::pow(Expr::variable("t"), Expr::from_i64(2)),
        );
        let body = Expr::call(&sq, vec![Expr::variable("u")]).unwrap();
        let quad = FunctionDef::new("quad", &["u"], Expr::pow(body, Expr::from_i64(2)));
        let e = Expr::call(&quad, vec![Expr::variable("x")]).unwrap();
        assert_eq!(
            *e.atomic_expression(),
            Expr::pow(Expr::variable("x"), Expr::from_i64(4))
        );
    }
}
