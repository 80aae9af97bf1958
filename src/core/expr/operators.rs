//! Operator overloading for `Expr`.
//!
//! Every operator routes through a smart constructor, so `a + b` is exactly
//! `Expr::sum(vec![a, b])`. Numbers are never converted implicitly; build
//! constants with [`Expr::from_i64`] and friends.

use std::ops::{Add, Div, Mul, Neg, Sub};

use super::Expr;

macro_rules! impl_binary_ops {
    ($lhs:ty, $rhs:ty, $to_lhs:expr, $to_rhs:expr) => {
        impl Add<$rhs> for $lhs {
            type Output = Expr;
            fn add(self, rhs: $rhs) -> Expr {
                Expr::sum(vec![$to_lhs(self), $to_rhs(rhs)])
            }
        }
        impl Sub<$rhs> for $lhs {
            type Output = Expr;
            fn sub(self, rhs: $rhs) -> Expr {
                Expr::subtract($to_lhs(self), $to_rhs(rhs))
            }
        }
        impl Mul<$rhs> for $lhs {
            type Output = Expr;
            fn mul(self, rhs: $rhs) -> Expr {
                Expr::product(vec![$to_lhs(self), $to_rhs(rhs)])
            }
        }
        impl Div<$rhs> for $lhs {
            type Output = Expr;
            fn div(self, rhs: $rhs) -> Expr {
                Expr::divide($to_lhs(self), $to_rhs(rhs))
            }
        }
    };
}

impl_binary_ops!(Expr, Expr, |e: Expr| e, |r: Expr| r);
impl_binary_ops!(Expr, &Expr, |e: Expr| e, |r: &Expr| r.clone());
impl_binary_ops!(&Expr, Expr, |e: &Expr| e.clone(), |r: Expr| r);
impl_binary_ops!(&Expr, &Expr, |e: &Expr| e.clone(), |r: &Expr| r.clone());

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::negate(self)
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::negate(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_match_constructors() {
        let x = Expr::variable("x");
        let y = Expr::variable("y");
        assert_eq!(&x + &y, Expr::sum(vec![x.clone(), y.clone()]));
        assert_eq!(&x * &y, Expr::product(vec![x.clone(), y.clone()]));
        assert_eq!(&x - &x, Expr::from_i64(0));
        assert_eq!(&x / &x, Expr::from_i64(1));
        assert_eq!(-(-x.clone()), x);
    }

    #[test]
    fn test_division_is_negative_power() {
        let x = Expr::variable("x");
        let y = Expr::variable("y");
        let q = x.clone() / y.clone();
        assert_eq!(q, x * Expr::pow(y, Expr::from_i64(-1)));
    }
}
