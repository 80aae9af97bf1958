//! Tree-walking numeric evaluation.
//!
//! Evaluates an expression directly from its tree, generic over any
//! [`MathScalar`] (`f32`, `f64`). This is the reference the compiled forms
//! are checked against.
//!
//! # Example
//!
//! ```
//! use symb_equiv::{Expr, VariableSet};
//!
//! let x = Expr::variable("x");
//! let e = Expr::pow(x.clone(), Expr::from_i64(2)) + Expr::sin_of(x);
//!
//! let vars = VariableSet::new().with("x", 0.5_f64);
//! let value = e.evaluate(&vars).expect("x is bound");
//! assert!((value - (0.25 + 0.5_f64.sin())).abs() < 1e-10);
//! ```

use std::sync::Arc;

use num_traits::Float;
use rustc_hash::FxHashMap;

use crate::core::error::{EngineError, Result};
use crate::core::expr::{Expr, FunctionCall, MonadKind};
use crate::core::functions::Builtin;
use crate::core::number::Number;
use crate::core::symbol::Symbol;
use crate::core::visitor::Visitor;
use crate::traits::MathScalar;

/// Name → value map supplied at evaluation time.
///
/// Names are case-normalized like every other variable.
#[derive(Debug, Clone)]
pub struct VariableSet<T> {
    values: FxHashMap<Symbol, T>,
}

impl<T> Default for VariableSet<T> {
    fn default() -> Self {
        Self {
            values: FxHashMap::default(),
        }
    }
}

impl<T: Copy> VariableSet<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, returning the previous value
    pub fn insert(&mut self, name: &str, value: T) -> Option<T> {
        self.values.insert(Symbol::new(name), value)
    }

    /// Bind a symbol directly
    pub fn insert_symbol(&mut self, symbol: Symbol, value: T) -> Option<T> {
        self.values.insert(symbol, value)
    }

    /// Builder-style [`VariableSet::insert`]
    #[must_use]
    pub fn with(mut self, name: &str, value: T) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<T> {
        self.get_symbol(&Symbol::new(name))
    }

    #[must_use]
    pub fn get_symbol(&self, symbol: &Symbol) -> Option<T> {
        self.values.get(symbol).copied()
    }

    /// Look up a variable, failing with [`EngineError::VariableNotPresent`]
    ///
    /// # Errors
    /// Returns `VariableNotPresent` when `symbol` is unbound.
    pub fn require(&self, symbol: &Symbol) -> Result<T> {
        self.get_symbol(symbol)
            .ok_or_else(|| EngineError::variable_not_present(symbol.name()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'a, T: Copy> FromIterator<(&'a str, T)> for VariableSet<T> {
    fn from_iter<I: IntoIterator<Item = (&'a str, T)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// Native value of a built-in function
pub(crate) fn evaluate_builtin<T: MathScalar>(builtin: Builtin, args: &[T]) -> T {
    let arg = |i: usize| args.get(i).copied().unwrap_or_else(T::nan);
    match builtin {
        Builtin::Cos => arg(0).cos(),
        Builtin::Tan => arg(0).tan(),
        Builtin::Sqrt => arg(0).sqrt(),
        Builtin::Abs => Float::abs(arg(0)),
        // Float::min/max skip NaN; the closed forms propagate it
        Builtin::Min => nan_aware(arg(0), arg(1), <T as Float>::min),
        Builtin::Max => nan_aware(arg(0), arg(1), <T as Float>::max),
        Builtin::Log => arg(0).ln() / arg(1).ln(),
        Builtin::Arccos => arg(0).acos(),
    }
}

pub(crate) fn nan_aware<T: MathScalar>(a: T, b: T, op: fn(T, T) -> T) -> T {
    if a.is_nan() || b.is_nan() {
        T::nan()
    } else {
        op(a, b)
    }
}

/// Native value of a monad
pub(crate) fn evaluate_monad<T: MathScalar>(kind: MonadKind, x: T) -> T {
    match kind {
        MonadKind::Ln => x.ln(),
        MonadKind::Sin => x.sin(),
        MonadKind::Sign => x.sign(),
        MonadKind::Arcsin => x.asin(),
        MonadKind::Arctan => x.atan(),
    }
}

struct TreeEvaluator<'a, T> {
    vars: &'a VariableSet<T>,
}

impl<T: MathScalar> Visitor<Result<T>> for TreeEvaluator<'_, T> {
    fn visit_constant(&mut self, n: &Number) -> Result<T> {
        Ok(T::from_constant(n.to_f64()))
    }

    fn visit_variable(&mut self, symbol: &Symbol) -> Result<T> {
        self.vars.require(symbol)
    }

    // Left-to-right from the first operand, the same order compiled code uses
    fn visit_sum(&mut self, terms: &[Arc<Expr>]) -> Result<T> {
        let Some((first, rest)) = terms.split_first() else {
            return Ok(T::zero());
        };
        let first = first.accept(self)?;
        rest.iter().try_fold(first, |acc, t| Ok(acc + t.accept(self)?))
    }

    fn visit_product(&mut self, factors: &[Arc<Expr>]) -> Result<T> {
        let Some((first, rest)) = factors.split_first() else {
            return Ok(T::one());
        };
        let first = first.accept(self)?;
        rest.iter().try_fold(first, |acc, f| Ok(acc * f.accept(self)?))
    }

    fn visit_exponent(&mut self, base: &Arc<Expr>, power: &Arc<Expr>) -> Result<T> {
        Ok(base.accept(self)?.powf(power.accept(self)?))
    }

    fn visit_monad(&mut self, kind: MonadKind, arg: &Arc<Expr>) -> Result<T> {
        Ok(evaluate_monad(kind, arg.accept(self)?))
    }

    fn visit_function(&mut self, call: &FunctionCall) -> Result<T> {
        let args = call
            .args()
            .iter()
            .map(|a| a.accept(self))
            .collect::<Result<Vec<T>>>()?;
        if let Some(builtin) = Builtin::of(call.def()) {
            return Ok(evaluate_builtin(builtin, &args));
        }
        // User function: evaluate the body with parameters bound on top of
        // the caller's variables
        let mut scope = self.vars.clone();
        for (param, value) in call.def().parameters().iter().zip(args) {
            scope.insert_symbol(param.clone(), value);
        }
        call.def().body().accept(&mut TreeEvaluator { vars: &scope })
    }
}

impl Expr {
    /// Evaluate numerically with the given variable values.
    ///
    /// # Errors
    /// Returns [`EngineError::VariableNotPresent`] if the tree uses a variable
    /// missing from `vars`. Arithmetic never fails: undefined results are NaN
    /// or infinite, following the scalar type.
    pub fn evaluate<T: MathScalar>(&self, vars: &VariableSet<T>) -> Result<T> {
        self.accept(&mut TreeEvaluator { vars })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::expr::FunctionDef;
    use crate::functions;

    #[test]
    fn test_basic_evaluation() {
        let x = Expr::variable("x");
        let y = Expr::variable("y");
        let e = x.clone() * y.clone() + Expr::from_i64(3) / x;
        let vars = VariableSet::new().with("x", 2.0).with("Y", 5.0);
        let value: f64 = e.evaluate(&vars).unwrap();
        assert!((value - 11.5).abs() < 1e-10);
    }

    #[test]
    fn test_missing_variable_is_distinct_error() {
        let e = Expr::variable("x") + Expr::variable("q");
        let vars = VariableSet::new().with("x", 1.0_f64);
        let err = e.evaluate(&vars).unwrap_err();
        assert!(matches!(err, EngineError::VariableNotPresent { ref name } if name == "q"));
    }

    #[test]
    fn test_f32_evaluation() {
        let e = Expr::sin_of(Expr::variable("x"));
        let vars = VariableSet::new().with("x", 1.0_f32);
        let value: f32 = e.evaluate(&vars).unwrap();
        assert!((value - 1.0_f32.sin()).abs() < 1e-6);
    }

    #[test]
    fn test_sign_of_zero() {
        let e = Expr::sign_of(Expr::variable("x"));
        let vars = VariableSet::new().with("x", 0.0_f64);
        assert_eq!(e.evaluate(&vars).unwrap(), 0.0);
    }

    #[test]
    fn test_user_function_body() {
        let def = FunctionDef::new(
            "hyp",
            &["a", "b"],
            functions::sqrt(
                Expr::pow(Expr::variable("a"), Expr::from_i64(2))
                    + Expr::pow(Expr::variable("b"), Expr::from_i64(2)),
            ),
        );
        let e = Expr::call(&def, vec![Expr::variable("x"), Expr::from_i64(4)]).unwrap();
        let vars = VariableSet::new().with("x", 3.0_f64);
        assert!((e.evaluate(&vars).unwrap() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_variable_set_from_iter() {
        let vars: VariableSet<f64> = [("A", 1.0), ("b", 2.0)].into_iter().collect();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars.get("a"), Some(1.0));
        assert_eq!(vars.get("B"), Some(2.0));
        assert_eq!(vars.get("c"), None);
    }
}
