use std::sync::Arc;

use crate::{Expr, ExprKind, MonadKind, Number, Visitor, functions};

fn v(name: &str) -> Expr {
    Expr::variable(name)
}

fn int(n: i64) -> Expr {
    Expr::from_i64(n)
}

#[test]
fn test_commutativity() {
    let a = Expr::sin_of(v("x")) * v("y");
    let b = Expr::pow(v("z"), int(2)) + int(7);
    assert_eq!(
        Expr::sum(vec![a.clone(), b.clone()]),
        Expr::sum(vec![b.clone(), a.clone()])
    );
    assert_eq!(
        Expr::product(vec![a.clone(), b.clone()]),
        Expr::product(vec![b, a])
    );
}

#[test]
fn test_constant_folding() {
    let folded = int(54321) + v("z") + int(54321);
    assert_eq!(folded, int(108_642) + v("z"));
    match folded.kind() {
        ExprKind::Sum(terms) => {
            assert_eq!(terms.len(), 2);
            assert_eq!(terms[0].as_constant(), Some(&Number::from_i64(108_642)));
        }
        _ => panic!("Expected Sum"),
    }
}

#[test]
fn test_coefficient_collection() {
    let z = v("z");
    let collected = int(54321) * z.clone() + int(54321) * z.clone() + z.clone();
    assert_eq!(collected, int(108_643) * z);
}

#[test]
fn test_zero_elimination() {
    let z = v("z");
    assert_eq!(
        Expr::sum(vec![int(0), int(1), int(-1), z.clone()]),
        z.clone()
    );
    assert_eq!(z.clone() - z, int(0));
}

#[test]
fn test_exponent_identities() {
    assert_eq!(Expr::pow(v("z"), int(1)), v("z"));
    assert_eq!(Expr::pow(v("y"), int(0)), int(1));
    assert_eq!(Expr::pow(int(5), int(2)), int(25));
    assert_eq!(Expr::pow(int(1), v("q")), int(1));
    assert_eq!(
        Expr::pow(int(4), Expr::from_fraction(1, 2).unwrap()),
        int(2)
    );
    assert_eq!(
        Expr::pow(int(8), Expr::from_fraction(-2, 3).unwrap()),
        Expr::from_fraction(1, 4).unwrap()
    );
}

#[test]
fn test_power_merging() {
    let x = v("x");
    // x * x^2 * x^(-3) collapses to 1
    let merged = Expr::product(vec![
        x.clone(),
        Expr::pow(x.clone(), int(2)),
        Expr::pow(x.clone(), int(-3)),
    ]);
    assert_eq!(merged, int(1));

    // (x*y)^2 distributes
    assert_eq!(
        Expr::pow(x.clone() * v("y"), int(2)),
        Expr::pow(x.clone(), int(2)) * Expr::pow(v("y"), int(2))
    );

    // (x^y)^3 folds the exponents
    assert_eq!(
        Expr::pow(Expr::pow(x.clone(), v("y")), int(3)),
        Expr::pow(x, int(3) * v("y"))
    );
}

#[test]
fn test_monad_folding() {
    assert_eq!(Expr::ln_of(int(1)), int(0));
    assert_eq!(Expr::sin_of(int(0)), int(0));
    assert_eq!(Expr::arcsin_of(int(0)), int(0));
    assert_eq!(Expr::arctan_of(int(0)), int(0));
    assert_eq!(Expr::sign_of(int(-7)), int(-1));
    assert_eq!(
        Expr::sign_of(Expr::sign_of(v("x"))),
        Expr::sign_of(v("x"))
    );
    // No exact value: stays symbolic
    assert!(matches!(
        Expr::ln_of(int(2)).kind(),
        ExprKind::Monad(MonadKind::Ln, _)
    ));
}

#[test]
fn test_case_insensitive_variables() {
    assert_eq!(v("X") + v("x"), int(2) * v("x"));
}

#[test]
fn test_order_independent_hash() {
    let a = Expr::sum(vec![v("a"), Expr::sin_of(v("b")), int(3)]);
    let b = Expr::sum(vec![int(3), Expr::sin_of(v("b")), v("a")]);
    assert_eq!(a.structural_hash(), b.structural_hash());
}

#[test]
fn test_builtins_are_functions() {
    let root = functions::sqrt(v("x"));
    match root.kind() {
        ExprKind::Function(call) => {
            assert_eq!(call.def().name(), "sqrt");
            assert_eq!(call.args().len(), 1);
        }
        _ => panic!("Expected Function node"),
    }
    assert!(!root.is_atomic());
    assert_eq!(
        *root.atomic_expression(),
        Expr::pow(v("x"), Expr::from_fraction(1, 2).unwrap())
    );
}

#[test]
fn test_atomic_is_identity_without_functions() {
    let e = Expr::sin_of(v("x")) + Expr::pow(v("y"), int(3));
    assert!(e.is_atomic());
    assert!(std::ptr::eq(e.atomic_expression(), &e));
}

#[test]
fn test_deep_tree_drop() {
    // Iterative drop: a long chain must not overflow the stack
    let mut e = v("x");
    for _ in 0..100_000 {
        e = Expr::sin_of(e);
    }
    drop(e);
}

/// Counts Sum and Product nodes
struct CommutativeCounter;

impl Visitor<usize> for CommutativeCounter {
    fn visit_constant(&mut self, _n: &Number) -> usize {
        0
    }
    fn visit_variable(&mut self, _symbol: &crate::Symbol) -> usize {
        0
    }
    fn visit_sum(&mut self, terms: &[Arc<Expr>]) -> usize {
        1 + terms.iter().map(|t| t.accept(self)).sum::<usize>()
    }
    fn visit_product(&mut self, factors: &[Arc<Expr>]) -> usize {
        1 + factors.iter().map(|f| f.accept(self)).sum::<usize>()
    }
    fn visit_exponent(&mut self, base: &Arc<Expr>, power: &Arc<Expr>) -> usize {
        base.accept(self) + power.accept(self)
    }
    fn visit_monad(&mut self, _kind: MonadKind, arg: &Arc<Expr>) -> usize {
        arg.accept(self)
    }
    fn visit_function(&mut self, call: &crate::FunctionCall) -> usize {
        call.args().iter().map(|a| a.accept(self)).sum()
    }
}

#[test]
fn test_custom_visitor() {
    let e = Expr::sin_of(v("x") * v("y")) + Expr::pow(v("a") + v("b"), v("c"));
    assert_eq!(e.accept(&mut CommutativeCounter), 3);
}
