//! Canonicalizing smart constructors.
//!
//! These are the only way to build Sum, Product, Exponent, Monad and Function
//! nodes. Each constructor normalizes on every build:
//! 1. flatten nested same-kind operands
//! 2. fold constant operands with exact rational arithmetic
//! 3. group the rest by base and merge contributions
//!    (coefficients for Sum, exponents for Product)
//! 4. drop identity entries
//! 5. collapse to a constant, a single argument, or a sorted N-ary node

use std::sync::Arc;

use num_rational::BigRational;
use rustc_hash::FxHashMap;

use super::{Expr, ExprKind, FunctionCall, FunctionDef, MonadKind, compare};
use crate::core::error::{EngineError, Result};
use crate::core::number::Number;
use crate::core::symbol::Symbol;

/// Take ownership of a shared node, cloning only if it is still shared.
fn unshare(arc: Arc<Expr>) -> Expr {
    Arc::try_unwrap(arc).unwrap_or_else(|arc| (*arc).clone())
}

/// Split a Sum term into `coefficient * base`.
///
/// A Product holding a constant factor yields that constant and the product of
/// the remaining factors; any other term has coefficient 1.
fn split_coefficient(term: &Arc<Expr>) -> (Number, Arc<Expr>) {
    if let ExprKind::Product(factors) = &term.kind
        && let Some(pos) = factors.iter().position(|f| f.is_constant())
    {
        let coeff = factors[pos].as_constant().cloned().unwrap_or_else(Number::one);
        let mut rest: Vec<Arc<Expr>> = factors
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != pos)
            .map(|(_, f)| Arc::clone(f))
            .collect();
        let base = if rest.len() == 1 {
            rest.pop().unwrap_or_else(|| Arc::clone(term))
        } else {
            // Remaining factors are still distinct, sorted and non-constant.
            Arc::new(Expr::new(ExprKind::Product(rest)))
        };
        return (coeff, base);
    }
    (Number::one(), Arc::clone(term))
}

/// Split a Product factor into `base ^ exponent`.
///
/// Only an Exponent with a non-constant base contributes its exponent;
/// everything else (including `2^x`) is a bare term with exponent 1.
fn split_exponent(factor: &Arc<Expr>) -> (Arc<Expr>, Arc<Expr>) {
    if let ExprKind::Exponent(base, power) = &factor.kind
        && !base.is_constant()
    {
        return (Arc::clone(base), Arc::clone(power));
    }
    (Arc::clone(factor), Arc::new(Expr::one()))
}

/// Find the group whose base is `Exactly` equal to `base`, bucketed by hash.
fn find_group<T>(
    index: &mut FxHashMap<u64, Vec<usize>>,
    groups: &[(Arc<Expr>, T)],
    base: &Arc<Expr>,
) -> Option<usize> {
    index
        .get(&base.hash)
        .and_then(|bucket| bucket.iter().copied().find(|&i| groups[i].0 == *base))
}

fn finish_commutative(mut args: Vec<Arc<Expr>>, empty: Expr, build: fn(Vec<Arc<Expr>>) -> ExprKind) -> Expr {
    match args.len() {
        0 => empty,
        1 => args.pop().map_or(empty, unshare),
        _ => {
            args.sort_by(|a, b| compare(a, b));
            Expr::new(build(args))
        }
    }
}

impl Expr {
    // -------------------------------------------------------------------------
    // Leaves
    // -------------------------------------------------------------------------

    /// A constant node
    #[must_use]
    pub fn constant(n: Number) -> Self {
        Self::new(ExprKind::Constant(n))
    }

    /// The integer constant `n`
    #[must_use]
    pub fn from_i64(n: i64) -> Self {
        Self::constant(Number::from_i64(n))
    }

    /// An exact rational constant
    #[must_use]
    pub fn from_rational(r: BigRational) -> Self {
        Self::constant(Number::from_rational(r))
    }

    /// The constant `numer / denom`; `None` when `denom` is zero
    #[must_use]
    pub fn from_fraction(numer: i64, denom: i64) -> Option<Self> {
        Number::from_fraction(numer, denom).map(Self::constant)
    }

    /// The exact binary value of a finite float; `None` for NaN or infinities
    #[must_use]
    pub fn from_f64(f: f64) -> Option<Self> {
        Number::from_f64(f).map(Self::constant)
    }

    #[must_use]
    pub fn zero() -> Self {
        Self::constant(Number::zero())
    }

    #[must_use]
    pub fn one() -> Self {
        Self::constant(Number::one())
    }

    /// A variable; the name is case-normalized
    #[must_use]
    pub fn variable(name: &str) -> Self {
        Self::new(ExprKind::Variable(Symbol::new(name)))
    }

    /// A variable from an already interned symbol
    #[must_use]
    pub fn from_symbol(symbol: Symbol) -> Self {
        Self::new(ExprKind::Variable(symbol))
    }

    // -------------------------------------------------------------------------
    // N-ary Sum
    // -------------------------------------------------------------------------

    /// Canonical sum of `terms`.
    #[must_use]
    pub fn sum(terms: Vec<Self>) -> Self {
        Self::sum_arcs(terms.into_iter().map(Arc::new).collect())
    }

    /// Canonical sum of shared terms.
    #[must_use]
    pub fn sum_arcs(terms: Vec<Arc<Self>>) -> Self {
        let mut constant = Number::zero();
        let mut flat: Vec<Arc<Self>> = Vec::with_capacity(terms.len());

        for t in terms {
            if let ExprKind::Sum(inner) = &t.kind {
                for term in inner {
                    match &term.kind {
                        ExprKind::Constant(n) => constant = constant.add(n),
                        _ => flat.push(Arc::clone(term)),
                    }
                }
                continue;
            }
            if let ExprKind::Constant(n) = &t.kind {
                constant = constant.add(n);
                continue;
            }
            flat.push(t);
        }

        // Group by base, summing coefficients, in first-seen order
        let mut groups: Vec<(Arc<Self>, Number)> = Vec::with_capacity(flat.len());
        let mut index: FxHashMap<u64, Vec<usize>> = FxHashMap::default();
        for term in &flat {
            let (coeff, base) = split_coefficient(term);
            if let Some(i) = find_group(&mut index, &groups, &base) {
                groups[i].1 = groups[i].1.add(&coeff);
            } else {
                index.entry(base.hash).or_default().push(groups.len());
                groups.push((base, coeff));
            }
        }

        let mut result: Vec<Arc<Self>> = Vec::with_capacity(groups.len() + 1);
        let mut renest = false;
        for (base, coeff) in groups {
            if coeff.is_zero() {
                continue;
            }
            let term = if coeff.is_one() {
                base
            } else {
                Arc::new(Self::product_arcs(vec![Arc::new(Self::constant(coeff)), base]))
            };
            renest |= matches!(term.kind, ExprKind::Sum(_) | ExprKind::Constant(_));
            result.push(term);
        }

        if !constant.is_zero() {
            result.push(Arc::new(Self::constant(constant)));
        }

        // A coefficient that collapsed to 1 may expose a nested Sum
        if renest {
            return Self::sum_arcs(result);
        }
        finish_commutative(result, Self::zero(), ExprKind::Sum)
    }

    // -------------------------------------------------------------------------
    // N-ary Product
    // -------------------------------------------------------------------------

    /// Canonical product of `factors`.
    #[must_use]
    pub fn product(factors: Vec<Self>) -> Self {
        Self::product_arcs(factors.into_iter().map(Arc::new).collect())
    }

    /// Canonical product of shared factors.
    #[must_use]
    pub fn product_arcs(factors: Vec<Arc<Self>>) -> Self {
        let mut constant = Number::one();
        let mut flat: Vec<Arc<Self>> = Vec::with_capacity(factors.len());

        for f in factors {
            if let ExprKind::Product(inner) = &f.kind {
                for factor in inner {
                    match &factor.kind {
                        ExprKind::Constant(n) => constant = constant.mul(n),
                        _ => flat.push(Arc::clone(factor)),
                    }
                }
                continue;
            }
            if let ExprKind::Constant(n) = &f.kind {
                constant = constant.mul(n);
                continue;
            }
            flat.push(f);
        }

        if constant.is_zero() {
            return Self::zero();
        }

        // Group by base, collecting exponents; keep the original factor for singletons
        let mut groups: Vec<(Arc<Self>, Vec<Arc<Self>>)> = Vec::with_capacity(flat.len());
        let mut originals: Vec<Arc<Self>> = Vec::with_capacity(flat.len());
        let mut index: FxHashMap<u64, Vec<usize>> = FxHashMap::default();
        for factor in flat {
            let (base, exponent) = split_exponent(&factor);
            if let Some(i) = find_group(&mut index, &groups, &base) {
                groups[i].1.push(exponent);
            } else {
                index.entry(base.hash).or_default().push(groups.len());
                groups.push((base, vec![exponent]));
                originals.push(factor);
            }
        }

        let mut result: Vec<Arc<Self>> = Vec::with_capacity(groups.len() + 1);
        let mut renest = false;
        for ((base, mut exponents), original) in groups.into_iter().zip(originals) {
            let factor = if exponents.len() == 1 {
                original
            } else {
                let exponent = Self::sum_arcs(std::mem::take(&mut exponents));
                match exponent.as_constant() {
                    Some(e) if e.is_zero() => continue,
                    Some(e) if e.is_one() => base,
                    _ => Arc::new(Self::pow_arcs(base, Arc::new(exponent))),
                }
            };
            renest |= matches!(factor.kind, ExprKind::Product(_) | ExprKind::Constant(_));
            result.push(factor);
        }

        if !constant.is_one() {
            result.push(Arc::new(Self::constant(constant)));
        }

        // Merged powers may fold to constants or distribute into products
        if renest {
            return Self::product_arcs(result);
        }
        finish_commutative(result, Self::one(), ExprKind::Product)
    }

    // -------------------------------------------------------------------------
    // Derived arithmetic
    // -------------------------------------------------------------------------

    /// `a - b`, as `a + (-1)·b`
    #[must_use]
    pub fn subtract(a: Self, b: Self) -> Self {
        Self::sum(vec![a, Self::negate(b)])
    }

    /// `-a`, as `(-1)·a`
    #[must_use]
    pub fn negate(a: Self) -> Self {
        Self::product(vec![Self::from_i64(-1), a])
    }

    /// `a / b`, as `a·b^(-1)`
    #[must_use]
    pub fn divide(a: Self, b: Self) -> Self {
        Self::product(vec![a, Self::pow(b, Self::from_i64(-1))])
    }

    // -------------------------------------------------------------------------
    // Exponent
    // -------------------------------------------------------------------------

    /// Canonical `base ^ power`.
    #[must_use]
    pub fn pow(base: Self, power: Self) -> Self {
        Self::pow_arcs(Arc::new(base), Arc::new(power))
    }

    /// Canonical `base ^ power` over shared operands.
    ///
    /// - `b^0 = 1`, `b^1 = b`, `1^p = 1`
    /// - constant powers of constants fold when exactly representable
    /// - `(b^e)^n = b^(e·n)` and `(x·y)^n = x^n·y^n` for integer constants `n`
    #[must_use]
    pub fn pow_arcs(base: Arc<Self>, power: Arc<Self>) -> Self {
        if let Some(p) = power.as_constant() {
            if p.is_zero() {
                return Self::one();
            }
            if p.is_one() {
                return unshare(base);
            }
            if let Some(b) = base.as_constant() {
                if b.is_zero() && !p.is_negative() {
                    return Self::zero();
                }
                if let Some(folded) = b.checked_pow(p) {
                    return Self::constant(folded);
                }
            }
            if p.is_integer() {
                match &base.kind {
                    ExprKind::Exponent(inner_base, inner_power) => {
                        let merged = Self::product_arcs(vec![
                            Arc::clone(inner_power),
                            Arc::clone(&power),
                        ]);
                        return Self::pow_arcs(Arc::clone(inner_base), Arc::new(merged));
                    }
                    ExprKind::Product(factors) => {
                        let distributed = factors
                            .iter()
                            .map(|f| Arc::new(Self::pow_arcs(Arc::clone(f), Arc::clone(&power))))
                            .collect();
                        return Self::product_arcs(distributed);
                    }
                    _ => {}
                }
            }
        }
        if base.as_constant().is_some_and(Number::is_one) {
            return Self::one();
        }
        Self::new(ExprKind::Exponent(base, power))
    }

    // -------------------------------------------------------------------------
    // Monads
    // -------------------------------------------------------------------------

    /// Canonical single-argument primitive function application.
    #[must_use]
    pub fn monad(kind: MonadKind, arg: Self) -> Self {
        Self::monad_arc(kind, Arc::new(arg))
    }

    /// Canonical monad over a shared argument.
    ///
    /// Folds the exact cases: `ln(1) = 0`, `sin(0) = arcsin(0) = arctan(0) = 0`,
    /// `sign(c)` for constants and `sign(sign(x)) = sign(x)`.
    #[must_use]
    pub fn monad_arc(kind: MonadKind, arg: Arc<Self>) -> Self {
        match (kind, &arg.kind) {
            (MonadKind::Ln, ExprKind::Constant(n)) if n.is_one() => Self::zero(),
            (MonadKind::Sin | MonadKind::Arcsin | MonadKind::Arctan, ExprKind::Constant(n))
                if n.is_zero() =>
            {
                Self::zero()
            }
            (MonadKind::Sign, ExprKind::Constant(n)) => Self::constant(n.signum()),
            (MonadKind::Sign, ExprKind::Monad(MonadKind::Sign, _)) => unshare(arg),
            _ => Self::new(ExprKind::Monad(kind, arg)),
        }
    }

    #[must_use]
    pub fn ln_of(arg: Self) -> Self {
        Self::monad(MonadKind::Ln, arg)
    }

    #[must_use]
    pub fn sin_of(arg: Self) -> Self {
        Self::monad(MonadKind::Sin, arg)
    }

    #[must_use]
    pub fn sign_of(arg: Self) -> Self {
        Self::monad(MonadKind::Sign, arg)
    }

    #[must_use]
    pub fn arcsin_of(arg: Self) -> Self {
        Self::monad(MonadKind::Arcsin, arg)
    }

    #[must_use]
    pub fn arctan_of(arg: Self) -> Self {
        Self::monad(MonadKind::Arctan, arg)
    }

    // -------------------------------------------------------------------------
    // Named functions
    // -------------------------------------------------------------------------

    /// Apply a named function to its arguments (in parameter order).
    ///
    /// # Errors
    /// Returns [`EngineError::ArityMismatch`] when the argument count differs
    /// from the definition's parameter count.
    pub fn call(def: &Arc<FunctionDef>, args: Vec<Self>) -> Result<Self> {
        if args.len() != def.arity() {
            return Err(EngineError::ArityMismatch {
                name: def.name().to_string(),
                expected: def.arity(),
                got: args.len(),
            });
        }
        Ok(Self::new(ExprKind::Function(FunctionCall {
            def: Arc::clone(def),
            args: args.into_iter().map(Arc::new).collect(),
        })))
    }
}
