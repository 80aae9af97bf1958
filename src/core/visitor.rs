//! Expression visitor pattern for AST traversal
//!
//! Two protocols, both dispatching on the closed [`ExprKind`] set with an
//! exhaustive `match`:
//! - [`Visitor`]: one method per node kind, for a single expression
//!   (evaluation, printing, counting).
//! - [`DualVisitor`]: one method per *pair* of equal node kinds plus a
//!   mismatch case, for walking two expressions in lockstep (equality,
//!   pattern matching).
//!
//! Children are handed out as `&[Arc<Expr>]`; a visitor can read but never
//! mutate an argument list.

use std::collections::BTreeSet;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::core::expr::{Expr, ExprKind, FunctionCall, FunctionDef, MonadKind};
use crate::core::number::Number;
use crate::core::symbol::Symbol;

/// Trait for visiting a single expression.
///
/// Implementors recurse into children themselves by calling
/// [`Expr::accept`] on them, which lets every method return a value.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use symb_equiv::{Expr, FunctionCall, MonadKind, Number, Symbol, Visitor};
///
/// struct Depth;
///
/// impl Visitor<usize> for Depth {
///     fn visit_constant(&mut self, _n: &Number) -> usize { 1 }
///     fn visit_variable(&mut self, _s: &Symbol) -> usize { 1 }
///     fn visit_sum(&mut self, terms: &[Arc<Expr>]) -> usize {
///         1 + terms.iter().map(|t| t.accept(self)).max().unwrap_or(0)
///     }
///     fn visit_product(&mut self, factors: &[Arc<Expr>]) -> usize {
///         1 + factors.iter().map(|f| f.accept(self)).max().unwrap_or(0)
///     }
///     fn visit_exponent(&mut self, base: &Arc<Expr>, power: &Arc<Expr>) -> usize {
///         1 + base.accept(self).max(power.accept(self))
///     }
///     fn visit_monad(&mut self, _kind: MonadKind, arg: &Arc<Expr>) -> usize {
///         1 + arg.accept(self)
///     }
///     fn visit_function(&mut self, call: &FunctionCall) -> usize {
///         1 + call.args().iter().map(|a| a.accept(self)).max().unwrap_or(0)
///     }
/// }
///
/// let e = Expr::sin_of(Expr::variable("x"));
/// assert_eq!(e.accept(&mut Depth), 2);
/// ```
pub trait Visitor<T> {
    fn visit_constant(&mut self, n: &Number) -> T;

    fn visit_variable(&mut self, symbol: &Symbol) -> T;

    fn visit_sum(&mut self, terms: &[Arc<Expr>]) -> T;

    fn visit_product(&mut self, factors: &[Arc<Expr>]) -> T;

    fn visit_exponent(&mut self, base: &Arc<Expr>, power: &Arc<Expr>) -> T;

    /// Fallback for every monad; the per-monad methods below route here
    /// unless overridden.
    fn visit_monad(&mut self, kind: MonadKind, arg: &Arc<Expr>) -> T;

    fn visit_ln(&mut self, arg: &Arc<Expr>) -> T {
        self.visit_monad(MonadKind::Ln, arg)
    }

    fn visit_sin(&mut self, arg: &Arc<Expr>) -> T {
        self.visit_monad(MonadKind::Sin, arg)
    }

    fn visit_sign(&mut self, arg: &Arc<Expr>) -> T {
        self.visit_monad(MonadKind::Sign, arg)
    }

    fn visit_arcsin(&mut self, arg: &Arc<Expr>) -> T {
        self.visit_monad(MonadKind::Arcsin, arg)
    }

    fn visit_arctan(&mut self, arg: &Arc<Expr>) -> T {
        self.visit_monad(MonadKind::Arctan, arg)
    }

    fn visit_function(&mut self, call: &FunctionCall) -> T;
}

/// Trait for visiting two expressions in lockstep.
///
/// [`accept_dual`] calls the method matching both node kinds, or
/// [`DualVisitor::visit_mismatch`] when the kinds (or monad kinds) differ.
pub trait DualVisitor<T> {
    fn visit_constants(&mut self, a: &Number, b: &Number) -> T;

    fn visit_variables(&mut self, a: &Symbol, b: &Symbol) -> T;

    fn visit_sums(&mut self, a: &[Arc<Expr>], b: &[Arc<Expr>]) -> T;

    fn visit_products(&mut self, a: &[Arc<Expr>], b: &[Arc<Expr>]) -> T;

    fn visit_exponents(
        &mut self,
        a: (&Arc<Expr>, &Arc<Expr>),
        b: (&Arc<Expr>, &Arc<Expr>),
    ) -> T;

    /// Both sides are the same monad `kind`
    fn visit_monads(&mut self, kind: MonadKind, a: &Arc<Expr>, b: &Arc<Expr>) -> T;

    fn visit_functions(&mut self, a: &FunctionCall, b: &FunctionCall) -> T;

    /// The two nodes have different kinds
    fn visit_mismatch(&mut self, a: &Expr, b: &Expr) -> T;
}

impl Expr {
    /// Dispatch this node to `visitor`.
    pub fn accept<T, V: Visitor<T> + ?Sized>(&self, visitor: &mut V) -> T {
        match &self.kind {
            ExprKind::Constant(n) => visitor.visit_constant(n),
            ExprKind::Variable(s) => visitor.visit_variable(s),
            ExprKind::Sum(terms) => visitor.visit_sum(terms),
            ExprKind::Product(factors) => visitor.visit_product(factors),
            ExprKind::Exponent(base, power) => visitor.visit_exponent(base, power),
            ExprKind::Monad(MonadKind::Ln, arg) => visitor.visit_ln(arg),
            ExprKind::Monad(MonadKind::Sin, arg) => visitor.visit_sin(arg),
            ExprKind::Monad(MonadKind::Sign, arg) => visitor.visit_sign(arg),
            ExprKind::Monad(MonadKind::Arcsin, arg) => visitor.visit_arcsin(arg),
            ExprKind::Monad(MonadKind::Arctan, arg) => visitor.visit_arctan(arg),
            ExprKind::Function(call) => visitor.visit_function(call),
        }
    }
}

/// Dispatch a pair of nodes to `visitor`.
pub fn accept_dual<T, V: DualVisitor<T> + ?Sized>(a: &Expr, b: &Expr, visitor: &mut V) -> T {
    match (&a.kind, &b.kind) {
        (ExprKind::Constant(x), ExprKind::Constant(y)) => visitor.visit_constants(x, y),
        (ExprKind::Variable(x), ExprKind::Variable(y)) => visitor.visit_variables(x, y),
        (ExprKind::Sum(x), ExprKind::Sum(y)) => visitor.visit_sums(x, y),
        (ExprKind::Product(x), ExprKind::Product(y)) => visitor.visit_products(x, y),
        (ExprKind::Exponent(b1, p1), ExprKind::Exponent(b2, p2)) => {
            visitor.visit_exponents((b1, p1), (b2, p2))
        }
        (ExprKind::Monad(k1, x), ExprKind::Monad(k2, y)) if k1 == k2 => {
            visitor.visit_monads(*k1, x, y)
        }
        (ExprKind::Function(f), ExprKind::Function(g)) => visitor.visit_functions(f, g),
        _ => visitor.visit_mismatch(a, b),
    }
}

// =============================================================================
// Stock visitors
// =============================================================================

/// A simple visitor that counts nodes
#[derive(Default)]
pub struct NodeCounter;

impl Visitor<usize> for NodeCounter {
    fn visit_constant(&mut self, _n: &Number) -> usize {
        1
    }

    fn visit_variable(&mut self, _symbol: &Symbol) -> usize {
        1
    }

    fn visit_sum(&mut self, terms: &[Arc<Expr>]) -> usize {
        1 + terms.iter().map(|t| t.accept(self)).sum::<usize>()
    }

    fn visit_product(&mut self, factors: &[Arc<Expr>]) -> usize {
        1 + factors.iter().map(|f| f.accept(self)).sum::<usize>()
    }

    fn visit_exponent(&mut self, base: &Arc<Expr>, power: &Arc<Expr>) -> usize {
        1 + base.accept(self) + power.accept(self)
    }

    fn visit_monad(&mut self, _kind: MonadKind, arg: &Arc<Expr>) -> usize {
        1 + arg.accept(self)
    }

    // A call counts as one node over its arguments; the body is not counted.
    fn visit_function(&mut self, call: &FunctionCall) -> usize {
        1 + call.args().iter().map(|a| a.accept(self)).sum::<usize>()
    }
}

/// A visitor that collects all unique variables
#[derive(Default)]
pub struct VariableCollector {
    pub variables: BTreeSet<Symbol>,
}

impl Visitor<()> for VariableCollector {
    fn visit_constant(&mut self, _n: &Number) {}

    fn visit_variable(&mut self, symbol: &Symbol) {
        self.variables.insert(symbol.clone());
    }

    fn visit_sum(&mut self, terms: &[Arc<Expr>]) {
        terms.iter().for_each(|t| t.accept(self));
    }

    fn visit_product(&mut self, factors: &[Arc<Expr>]) {
        factors.iter().for_each(|f| f.accept(self));
    }

    fn visit_exponent(&mut self, base: &Arc<Expr>, power: &Arc<Expr>) {
        base.accept(self);
        power.accept(self);
    }

    fn visit_monad(&mut self, _kind: MonadKind, arg: &Arc<Expr>) {
        arg.accept(self);
    }

    fn visit_function(&mut self, call: &FunctionCall) {
        call.args().iter().for_each(|a| a.accept(self));
    }
}

/// A visitor that collects the distinct function definitions called in a
/// tree, including calls nested inside function bodies.
#[derive(Default)]
pub struct FunctionCollector {
    pub functions: Vec<Arc<FunctionDef>>,
    seen: FxHashSet<String>,
}

impl Visitor<()> for FunctionCollector {
    fn visit_constant(&mut self, _n: &Number) {}

    fn visit_variable(&mut self, _symbol: &Symbol) {}

    fn visit_sum(&mut self, terms: &[Arc<Expr>]) {
        terms.iter().for_each(|t| t.accept(self));
    }

    fn visit_product(&mut self, factors: &[Arc<Expr>]) {
        factors.iter().for_each(|f| f.accept(self));
    }

    fn visit_exponent(&mut self, base: &Arc<Expr>, power: &Arc<Expr>) {
        base.accept(self);
        power.accept(self);
    }

    fn visit_monad(&mut self, _kind: MonadKind, arg: &Arc<Expr>) {
        arg.accept(self);
    }

    fn visit_function(&mut self, call: &FunctionCall) {
        if self.seen.insert(call.def().name().to_string()) {
            self.functions.push(Arc::clone(call.def()));
            call.def().body().accept(self);
        }
        call.args().iter().for_each(|a| a.accept(self));
    }
}

// -----------------------------------------------------------------------------
// Analysis methods
// -----------------------------------------------------------------------------

impl Expr {
    /// Count the total number of nodes in the tree
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.accept(&mut NodeCounter)
    }

    /// Default cost metric for picking the simplest equivalent form
    #[must_use]
    pub fn complexity(&self) -> usize {
        self.node_count()
    }

    /// All variables, sorted by name
    #[must_use]
    pub fn variables(&self) -> BTreeSet<Symbol> {
        let mut collector = VariableCollector::default();
        self.accept(&mut collector);
        collector.variables
    }

    /// Check if the expression contains a specific variable
    #[must_use]
    pub fn contains_var(&self, name: &str) -> bool {
        self.variables().contains(&Symbol::new(name))
    }

    /// Distinct function definitions used, in first-seen order
    #[must_use]
    pub fn functions(&self) -> Vec<Arc<FunctionDef>> {
        let mut collector = FunctionCollector::default();
        self.accept(&mut collector);
        collector.functions
    }
}
