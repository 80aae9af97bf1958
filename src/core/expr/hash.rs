//! Structural hashing.
//!
//! Sum and Product aggregate their children's hashes with a wrapping add so
//! the result is independent of argument order; every other node hashes its
//! children in position.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use super::ExprKind;

const SUM_TAG: u64 = 0x9e37_79b9_7f4a_7c15;
const PRODUCT_TAG: u64 = 0xc2b2_ae3d_27d4_eb4f;

/// Compute the structural hash of a node from its kind and its children's
/// (already computed) hashes.
#[must_use]
pub fn compute_expr_hash(kind: &ExprKind) -> u64 {
    let mut hasher = FxHasher::default();
    match kind {
        ExprKind::Constant(n) => {
            0u8.hash(&mut hasher);
            n.hash(&mut hasher);
        }
        ExprKind::Variable(s) => {
            1u8.hash(&mut hasher);
            s.hash(&mut hasher);
        }
        ExprKind::Sum(terms) => {
            2u8.hash(&mut hasher);
            let aggregate = terms
                .iter()
                .fold(SUM_TAG, |acc, t| acc.wrapping_add(t.hash));
            aggregate.hash(&mut hasher);
        }
        ExprKind::Product(factors) => {
            3u8.hash(&mut hasher);
            let aggregate = factors
                .iter()
                .fold(PRODUCT_TAG, |acc, f| acc.wrapping_add(f.hash));
            aggregate.hash(&mut hasher);
        }
        ExprKind::Exponent(base, power) => {
            4u8.hash(&mut hasher);
            base.hash.hash(&mut hasher);
            power.hash.hash(&mut hasher);
        }
        ExprKind::Monad(m, arg) => {
            5u8.hash(&mut hasher);
            m.hash(&mut hasher);
            arg.hash.hash(&mut hasher);
        }
        ExprKind::Function(call) => {
            6u8.hash(&mut hasher);
            call.def.name().hash(&mut hasher);
            for (param, arg) in call.named_args() {
                param.hash(&mut hasher);
                arg.hash.hash(&mut hasher);
            }
        }
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use crate::Expr;

    #[test]
    fn test_commutative_hash_ignores_order() {
        let x = Expr::variable("x");
        let y = Expr::variable("y");
        let a = Expr::sum(vec![x.clone(), y.clone()]);
        let b = Expr::sum(vec![y, x]);
        assert_eq!(a.structural_hash(), b.structural_hash());
    }

    #[test]
    fn test_sum_and_product_hash_differ() {
        let x = Expr::variable("x");
        let y = Expr::variable("y");
        let s = Expr::sum(vec![x.clone(), y.clone()]);
        let p = Expr::product(vec![x, y]);
        assert_ne!(s.structural_hash(), p.structural_hash());
    }

    #[test]
    fn test_exponent_hash_is_ordered() {
        let x = Expr::variable("x");
        let y = Expr::variable("y");
        let a = Expr::pow(x.clone(), y.clone());
        let b = Expr::pow(y, x);
        assert_ne!(a.structural_hash(), b.structural_hash());
    }
}
