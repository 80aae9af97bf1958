//! Expression trees.
//!
//! This module defines:
//! - `Expr` - the immutable tree node
//! - `ExprKind` - the closed set of node variants
//! - `MonadKind` - the single-argument primitive functions
//! - `FunctionDef` / `FunctionCall` - named operations with an atomic body
//!
//! # Architecture
//!
//! ## N-ary Sum/Product
//! `a + b + c` is `Sum([a, b, c])`, never nested sums. Flattening, constant
//! folding and like-term grouping all happen in the smart constructors
//! (see `constructors.rs`), so every tree that exists is already canonical.
//!
//! ## Structural Hashing
//! Each `Expr` carries a pre-computed `hash`. The hash of a Sum/Product
//! aggregates child hashes with a wrapping add, so it does not depend on
//! argument order. Two expressions with different hashes are never equal.
//!
//! ## Atomic expansion
//! `atomic_expression()` replaces every `Function` node by its body. The
//! result is memoized per node in a `OnceLock`; an expression that is already
//! atomic returns itself.

mod atomic;
mod constructors;
mod hash;
mod operators;
mod ordering;
mod substitute;

use std::fmt;
use std::sync::{Arc, LazyLock, OnceLock};

use crate::core::number::Number;
use crate::core::symbol::Symbol;

pub use hash::compute_expr_hash;
pub use ordering::compare;
pub(crate) use substitute::substitute_with;

/// Cached Arc<Expr> for 0, used during Drop to swap out children without allocation
static DUMMY_ARC: LazyLock<Arc<Expr>> =
    LazyLock::new(|| Arc::new(Expr::new(ExprKind::Constant(Number::zero()))));

// =============================================================================
// EXPR - The main expression type
// =============================================================================

/// An immutable symbolic expression.
///
/// Build expressions only through the smart constructors ([`Expr::sum`],
/// [`Expr::product`], [`Expr::pow`], [`Expr::ln_of`], ...) or the operator
/// overloads, which route through them.
///
/// # Example
/// ```
/// use symb_equiv::Expr;
///
/// let x = Expr::variable("x");
/// let twice = x.clone() + x.clone();
/// assert_eq!(twice, Expr::from_i64(2) * x);
/// ```
#[derive(Clone)]
pub struct Expr {
    /// Structural hash, order independent for commutative nodes
    pub(crate) hash: u64,
    /// The kind of expression (structure)
    pub(crate) kind: ExprKind,
    /// Memoized atomic expansion; `None` once computed means "already atomic"
    atomic: OnceLock<Option<Arc<Expr>>>,
}

/// Single-argument primitive functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MonadKind {
    Ln,
    Sin,
    Sign,
    Arcsin,
    Arctan,
}

impl MonadKind {
    /// All monads, in canonical order
    pub const ALL: [Self; 5] = [Self::Ln, Self::Sin, Self::Sign, Self::Arcsin, Self::Arctan];

    /// Name used by the printer and parser
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ln => "ln",
            Self::Sin => "sin",
            Self::Sign => "sign",
            Self::Arcsin => "arcsin",
            Self::Arctan => "arctan",
        }
    }

    /// Look up a monad by (already lower-cased) name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// A named, reusable operation: parameters plus an atomic body template.
///
/// The body refers to the parameters as ordinary variables. Calling the
/// function binds each parameter to an argument expression.
pub struct FunctionDef {
    name: String,
    parameters: Vec<Symbol>,
    body: Arc<Expr>,
}

impl FunctionDef {
    /// Define `name(parameters...) = body`. The name is case-normalized.
    #[must_use]
    pub fn new(name: &str, parameters: &[&str], body: Expr) -> Arc<Self> {
        Arc::new(Self {
            name: crate::core::symbol::normalize_name(name),
            parameters: parameters.iter().map(|p| Symbol::new(p)).collect(),
            body: Arc::new(body),
        })
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[Symbol] {
        &self.parameters
    }

    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    #[inline]
    #[must_use]
    pub fn body(&self) -> &Arc<Expr> {
        &self.body
    }

    /// Two definitions denote the same function when name, parameter list
    /// and body agree.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
            || (self.name == other.name
                && self.parameters == other.parameters
                && self.body == other.body)
    }
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.parameters.iter().map(Symbol::name).collect();
        write!(f, "{}({}) = {}", self.name, params.join(", "), self.body)
    }
}

/// A `Function` node: a definition plus one argument per parameter.
#[derive(Clone)]
pub struct FunctionCall {
    pub(crate) def: Arc<FunctionDef>,
    pub(crate) args: Vec<Arc<Expr>>,
}

impl FunctionCall {
    #[inline]
    #[must_use]
    pub const fn def(&self) -> &Arc<FunctionDef> {
        &self.def
    }

    /// Arguments in parameter order
    #[inline]
    #[must_use]
    pub fn args(&self) -> &[Arc<Expr>] {
        &self.args
    }

    /// Each parameter paired with its argument
    pub fn named_args(&self) -> impl Iterator<Item = (&Symbol, &Arc<Expr>)> {
        self.def.parameters.iter().zip(self.args.iter())
    }
}

impl fmt::Debug for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionCall")
            .field("name", &self.def.name)
            .field("args", &self.args)
            .finish()
    }
}

// =============================================================================
// EXPRKIND
// =============================================================================

/// The kind (structure) of an expression node.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Exact rational constant
    Constant(Number),

    /// Variable, identified by its case-normalized name
    Variable(Symbol),

    /// N-ary sum, flat, constant folded, like terms combined, sorted
    Sum(Vec<Arc<Expr>>),

    /// N-ary product, flat, constant folded, like bases combined, sorted
    Product(Vec<Arc<Expr>>),

    /// `base ^ power`
    Exponent(Arc<Expr>, Arc<Expr>),

    /// Single-argument primitive function
    Monad(MonadKind, Arc<Expr>),

    /// Call of a named function
    Function(FunctionCall),
}

impl Expr {
    /// Wrap a kind without any canonicalization.
    ///
    /// Only the smart constructors call this, after they have normalized `kind`.
    pub(crate) fn new(kind: ExprKind) -> Self {
        let hash = compute_expr_hash(&kind);
        Self {
            hash,
            kind,
            atomic: OnceLock::new(),
        }
    }

    /// The node's structure
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Get the structural hash of the expression
    #[inline]
    #[must_use]
    pub const fn structural_hash(&self) -> u64 {
        self.hash
    }

    /// The constant value, if this is a constant
    #[inline]
    #[must_use]
    pub const fn as_constant(&self) -> Option<&Number> {
        match &self.kind {
            ExprKind::Constant(n) => Some(n),
            _ => None,
        }
    }

    /// The variable, if this is a variable
    #[inline]
    #[must_use]
    pub const fn as_variable(&self) -> Option<&Symbol> {
        match &self.kind {
            ExprKind::Variable(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        matches!(self.kind, ExprKind::Constant(_))
    }

    /// Direct children in a fixed order (Sum/Product arguments, base then
    /// power, monad argument, function arguments).
    #[must_use]
    pub fn children(&self) -> Vec<Arc<Self>> {
        match &self.kind {
            ExprKind::Constant(_) | ExprKind::Variable(_) => Vec::new(),
            ExprKind::Sum(args) | ExprKind::Product(args) => args.clone(),
            ExprKind::Exponent(base, power) => vec![Arc::clone(base), Arc::clone(power)],
            ExprKind::Monad(_, arg) => vec![Arc::clone(arg)],
            ExprKind::Function(call) => call.args.clone(),
        }
    }

    /// Rebuild a node of the same kind over new children, through the smart
    /// constructors. `children` must follow the order of [`Expr::children`].
    #[must_use]
    pub fn with_children(&self, children: Vec<Arc<Self>>) -> Self {
        match &self.kind {
            ExprKind::Constant(_) | ExprKind::Variable(_) => self.clone(),
            ExprKind::Sum(_) => Self::sum_arcs(children),
            ExprKind::Product(_) => Self::product_arcs(children),
            ExprKind::Exponent(..) => {
                let mut it = children.into_iter();
                match (it.next(), it.next()) {
                    (Some(base), Some(power)) => Self::pow_arcs(base, power),
                    _ => self.clone(),
                }
            }
            ExprKind::Monad(kind, _) => match children.into_iter().next() {
                Some(arg) => Self::monad_arc(*kind, arg),
                None => self.clone(),
            },
            ExprKind::Function(call) => {
                if children.len() == call.def.arity() {
                    Self::new(ExprKind::Function(FunctionCall {
                        def: Arc::clone(&call.def),
                        args: children,
                    }))
                } else {
                    self.clone()
                }
            }
        }
    }
}

// Structural equality at the `Exactly` level (hash fast-reject first)
impl PartialEq for Expr {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        crate::core::equality::exactly_equal(self, other)
    }
}

impl Eq for Expr {}

impl std::hash::Hash for Expr {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({self})")
    }
}

// =============================================================================
// DROP IMPLEMENTATION - Iterative drop to prevent stack overflow
// =============================================================================

impl Drop for Expr {
    fn drop(&mut self) {
        fn drain_children(kind: &mut ExprKind, queue: &mut Vec<Arc<Expr>>) {
            match kind {
                ExprKind::Sum(args) | ExprKind::Product(args) => {
                    queue.extend(std::mem::take(args));
                }
                ExprKind::Function(call) => {
                    queue.extend(std::mem::take(&mut call.args));
                }
                ExprKind::Exponent(base, power) => {
                    queue.push(std::mem::replace(base, Arc::clone(&DUMMY_ARC)));
                    queue.push(std::mem::replace(power, Arc::clone(&DUMMY_ARC)));
                }
                ExprKind::Monad(_, arg) => {
                    queue.push(std::mem::replace(arg, Arc::clone(&DUMMY_ARC)));
                }
                ExprKind::Constant(_) | ExprKind::Variable(_) => {}
            }
        }

        // Leaves own nothing; also keeps DUMMY_ARC's own drop from touching itself.
        if matches!(self.kind, ExprKind::Constant(_) | ExprKind::Variable(_)) {
            return;
        }

        let mut work_queue = Vec::new();
        drain_children(&mut self.kind, &mut work_queue);

        while let Some(child_arc) = work_queue.pop() {
            if let Ok(mut child_expr) = Arc::try_unwrap(child_arc) {
                drain_children(&mut child_expr.kind, &mut work_queue);
            }
        }
    }
}
