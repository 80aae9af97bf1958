//! Canonical ordering for expressions.
//!
//! Provides the total order used to sort Sum/Product arguments and to keep
//! printed output stable.

use std::cmp::Ordering as CmpOrdering;

use super::{Expr, ExprKind};

/// Kind priority: Constant < Variable < Exponent < Product < Sum < Monad < Function
const fn kind_rank(kind: &ExprKind) -> u8 {
    match kind {
        ExprKind::Constant(_) => 0,
        ExprKind::Variable(_) => 1,
        ExprKind::Exponent(..) => 2,
        ExprKind::Product(_) => 3,
        ExprKind::Sum(_) => 4,
        ExprKind::Monad(..) => 5,
        ExprKind::Function(_) => 6,
    }
}

/// Compare expressions for canonical ordering.
///
/// Nodes of different kinds compare by kind rank. Within a kind:
/// - constants by value, descending
/// - variables by name
/// - Sum/Product by their (already sorted) arguments element-by-element,
///   then by argument count
/// - exponents by base, then power
/// - monads by kind, then argument
/// - functions by name, then arguments
pub fn compare(a: &Expr, b: &Expr) -> CmpOrdering {
    if std::ptr::eq(a, b) {
        return CmpOrdering::Equal;
    }

    let rank = kind_rank(&a.kind).cmp(&kind_rank(&b.kind));
    if rank != CmpOrdering::Equal {
        return rank;
    }

    match (&a.kind, &b.kind) {
        (ExprKind::Constant(x), ExprKind::Constant(y)) => y.cmp(x),
        (ExprKind::Variable(x), ExprKind::Variable(y)) => x.cmp(y),
        (ExprKind::Sum(xs), ExprKind::Sum(ys)) | (ExprKind::Product(xs), ExprKind::Product(ys)) => {
            compare_slices(xs, ys)
        }
        (ExprKind::Exponent(b1, p1), ExprKind::Exponent(b2, p2)) => {
            compare(b1, b2).then_with(|| compare(p1, p2))
        }
        (ExprKind::Monad(m1, x1), ExprKind::Monad(m2, x2)) => {
            m1.cmp(m2).then_with(|| compare(x1, x2))
        }
        (ExprKind::Function(f1), ExprKind::Function(f2)) => f1
            .def
            .name()
            .cmp(f2.def.name())
            .then_with(|| compare_slices(&f1.args, &f2.args)),
        // Ranks are equal, so the kinds are equal
        _ => CmpOrdering::Equal,
    }
}

fn compare_slices(xs: &[std::sync::Arc<Expr>], ys: &[std::sync::Arc<Expr>]) -> CmpOrdering {
    for (x, y) in xs.iter().zip(ys) {
        let c = compare(x, y);
        if c != CmpOrdering::Equal {
            return c;
        }
    }
    xs.len().cmp(&ys.len())
}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expr {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        compare(self, other)
    }
}
