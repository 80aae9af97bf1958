//! Display implementation for expressions.
//!
//! Output is plain infix text that the parser reads back into an equal tree:
//! - `1 + 2*x + x^2`
//! - `sin(x)^2`, `log(y, x)`
//! - `x/2`, `1/(x + y)`, `x^(1/2)`, `x - y`
//!
//! # Precedence ranks
//! Every node has a rank (lower binds tighter): leaves, monads, functions and
//! non-negative integers are 0, exponents 10, products, negative constants and
//! fractions 20, sums 30. A child is parenthesized when its rank is at least
//! the rank of the position it is printed in.

use std::fmt;
use std::sync::Arc;

use num_traits::One;

use crate::core::expr::{Expr, ExprKind};
use crate::core::number::Number;

// =============================================================================
// HELPER TYPES & FUNCTIONS
// =============================================================================

const RANK_ATOM: u8 = 0;
const RANK_EXPONENT: u8 = 10;
const RANK_PRODUCT: u8 = 20;
const RANK_SUM: u8 = 30;

fn constant_rank(n: &Number) -> u8 {
    if n.is_negative() || !n.is_integer() {
        RANK_PRODUCT
    } else {
        RANK_ATOM
    }
}

/// `Some(|c|)` when `expr` is `base^c` with a negative constant `c`.
///
/// Constant bases keep their signed exponent: `0^(-2)` would read back as
/// `1/0^2 = 1/0`.
fn negative_power(expr: &Expr) -> Option<(&Arc<Expr>, Number)> {
    if let ExprKind::Exponent(base, power) = expr.kind()
        && !base.is_constant()
        && let Some(c) = power.as_constant()
        && c.is_negative()
    {
        return Some((base, c.neg()));
    }
    None
}

fn rank(expr: &Expr) -> u8 {
    match expr.kind() {
        ExprKind::Constant(n) => constant_rank(n),
        ExprKind::Variable(_) | ExprKind::Monad(..) | ExprKind::Function(_) => RANK_ATOM,
        ExprKind::Exponent(..) if negative_power(expr).is_some() => RANK_PRODUCT,
        ExprKind::Exponent(..) => RANK_EXPONENT,
        ExprKind::Product(_) => RANK_PRODUCT,
        ExprKind::Sum(_) => RANK_SUM,
    }
}

/// Print `expr` in a position of rank `parent`
fn format_child(f: &mut fmt::Formatter<'_>, expr: &Expr, parent: u8) -> fmt::Result {
    if rank(expr) >= parent {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

/// True for a term that reads as subtraction when it follows another term
fn is_negative_term(term: &Expr) -> bool {
    match term.kind() {
        ExprKind::Constant(n) => n.is_negative(),
        ExprKind::Product(factors) => factors
            .first()
            .and_then(|f| f.as_constant())
            .is_some_and(Number::is_negative),
        _ => false,
    }
}

fn format_sum_expr(f: &mut fmt::Formatter<'_>, terms: &[Arc<Expr>]) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        if i == 0 {
            format_child(f, term, RANK_SUM)?;
        } else if is_negative_term(term) {
            f.write_str(" - ")?;
            let positive = Expr::negate(Expr::clone(term));
            format_child(f, &positive, RANK_SUM)?;
        } else {
            f.write_str(" + ")?;
            format_child(f, term, RANK_SUM)?;
        }
    }
    Ok(())
}

/// One side of a printed fraction
enum Part<'a> {
    Integer(String),
    Factor(&'a Expr),
    Power(&'a Arc<Expr>, Number),
}

impl Part<'_> {
    fn format(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Part::Integer(text) => f.write_str(text),
            Part::Factor(expr) => format_child(f, expr, RANK_PRODUCT),
            Part::Power(base, n) if n.is_one() => format_child(f, base, RANK_PRODUCT),
            Part::Power(base, n) => {
                format_child(f, base, RANK_EXPONENT)?;
                f.write_str("^")?;
                if constant_rank(n) >= RANK_EXPONENT {
                    write!(f, "({n})")
                } else {
                    write!(f, "{n}")
                }
            }
        }
    }
}

fn format_parts(f: &mut fmt::Formatter<'_>, parts: &[Part<'_>]) -> fmt::Result {
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str("*")?;
        }
        part.format(f)?;
    }
    Ok(())
}

/// Products print as `[-]numerator[/denominator]`: the coefficient `p/q`
/// splits across both sides and factors with a negative constant exponent
/// move below the line.
fn format_product_expr(f: &mut fmt::Formatter<'_>, factors: &[Arc<Expr>]) -> fmt::Result {
    let mut numerator: Vec<Part<'_>> = Vec::with_capacity(factors.len());
    let mut denominator: Vec<Part<'_>> = Vec::new();

    for factor in factors {
        if let Some(c) = factor.as_constant() {
            if c.is_negative() {
                f.write_str("-")?;
            }
            let ratio = c.abs();
            let ratio = ratio.as_rational();
            if !ratio.numer().is_one() {
                numerator.push(Part::Integer(ratio.numer().to_string()));
            }
            if !ratio.denom().is_one() {
                denominator.push(Part::Integer(ratio.denom().to_string()));
            }
        } else if let Some((base, n)) = negative_power(factor) {
            denominator.push(Part::Power(base, n));
        } else {
            numerator.push(Part::Factor(factor));
        }
    }

    if numerator.is_empty() {
        f.write_str("1")?;
    } else {
        format_parts(f, &numerator)?;
    }

    match denominator.as_slice() {
        [] => Ok(()),
        [single] => {
            f.write_str("/")?;
            single.format(f)
        }
        many => {
            f.write_str("/(")?;
            format_parts(f, many)?;
            f.write_str(")")
        }
    }
}

fn format_pow_expr(f: &mut fmt::Formatter<'_>, expr: &Expr, base: &Expr, power: &Expr) -> fmt::Result {
    if let Some((base, n)) = negative_power(expr) {
        f.write_str("1/")?;
        return Part::Power(base, n).format(f);
    }
    format_child(f, base, RANK_EXPONENT)?;
    f.write_str("^")?;
    format_child(f, power, RANK_EXPONENT)
}

// =============================================================================
// DISPLAY IMPLEMENTATION
// =============================================================================

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Constant(n) => write!(f, "{n}"),
            ExprKind::Variable(s) => f.write_str(s.name()),
            ExprKind::Sum(terms) => format_sum_expr(f, terms),
            ExprKind::Product(factors) => format_product_expr(f, factors),
            ExprKind::Exponent(base, power) => format_pow_expr(f, self, base, power),
            ExprKind::Monad(kind, arg) => write!(f, "{}({arg})", kind.name()),
            ExprKind::Function(call) => {
                write!(f, "{}(", call.def().name())?;
                for (i, arg) in call.args().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}
