use std::cmp::Ordering;

use crate::core::expr::compare;
use crate::{EqualityLevel, Expr, FunctionDef, functions, parse};

fn v(name: &str) -> Expr {
    Expr::variable(name)
}

#[test]
fn test_exactly_is_structural() {
    let a = parse("x*y + sin(z)").unwrap();
    let b = parse("sin(Z) + Y*X").unwrap();
    assert!(a.equals(&b, EqualityLevel::Exactly));
    assert!(!a.equals(&parse("x*y + sin(y)").unwrap(), EqualityLevel::Exactly));
}

#[test]
fn test_atomic_expands_functions() {
    // f(t) = t^2 + 1, called on x + y
    let f = FunctionDef::new("f", &["t"], Expr::pow(v("t"), Expr::from_i64(2)) + Expr::one());
    let call = Expr::call(&f, vec![v("x") + v("y")]).unwrap();
    let body = Expr::pow(v("x") + v("y"), Expr::from_i64(2)) + Expr::one();

    assert!(!call.equals(&body, EqualityLevel::Exactly));
    assert!(call.equals(&body, EqualityLevel::Atomic));
    assert!(body.equals(&call, EqualityLevel::Atomic));
}

#[test]
fn test_atomic_through_builtins() {
    let x = v("x");
    let abs = functions::abs(x.clone());
    assert!(abs.equals(&(x.clone() * Expr::sign_of(x.clone())), EqualityLevel::Atomic));
    let log = functions::log(v("y"), x.clone());
    let ratio = Expr::ln_of(v("y")) / Expr::ln_of(x);
    assert!(log.equals(&ratio, EqualityLevel::Atomic));
}

#[test]
fn test_nested_functions_expand_recursively() {
    let g = FunctionDef::new("g", &["u"], functions::sqrt(v("u")));
    let call = Expr::call(&g, vec![v("x")]).unwrap();
    let expanded = Expr::pow(v("x"), Expr::from_fraction(1, 2).unwrap());
    assert_eq!(*call.atomic_expression(), expanded);
}

#[test]
fn test_deep_proves_rewrites() {
    let factored = parse("a*(b + c)").unwrap();
    let expanded = parse("a*b + a*c").unwrap();
    assert!(!factored.equals(&expanded, EqualityLevel::Atomic));
    assert!(factored.equals(&expanded, EqualityLevel::Deep));
    assert!(expanded.equals(&factored, EqualityLevel::Deep));

    let log = parse("ln(x*y)").unwrap();
    let split = parse("ln x + ln y").unwrap();
    assert!(log.equals(&split, EqualityLevel::Deep));
}

#[test]
fn test_deepest_finds_shallow_proofs() {
    let a = parse("sign(x*y)").unwrap();
    let b = parse("sign(x)*sign(y)").unwrap();
    assert!(a.equals(&b, EqualityLevel::Deepest));
}

#[test]
fn test_deep_false_means_not_proven() {
    let a = parse("sin(x)").unwrap();
    let b = parse("sin(y)").unwrap();
    assert!(!a.equals(&b, EqualityLevel::Deep));
}

#[test]
fn test_levels_are_ordered() {
    assert!(EqualityLevel::Exactly < EqualityLevel::Atomic);
    assert!(EqualityLevel::Atomic < EqualityLevel::Deep);
    assert!(EqualityLevel::Deep < EqualityLevel::Deepest);
    assert_eq!(EqualityLevel::default(), EqualityLevel::Exactly);
}

#[test]
fn test_total_order() {
    let c = Expr::from_i64(3);
    let x = v("x");
    let p = Expr::pow(v("x"), Expr::from_i64(2));
    let prod = v("x") * v("y");
    let sum = v("x") + v("y");
    let monad = Expr::sin_of(v("x"));
    let func = functions::sqrt(v("x"));
    let ranked = [&c, &x, &p, &prod, &sum, &monad, &func];
    for pair in ranked.windows(2) {
        assert_eq!(compare(pair[0], pair[1]), Ordering::Less);
        assert_eq!(compare(pair[1], pair[0]), Ordering::Greater);
    }
    // Constants sort descending, variables by name
    assert_eq!(compare(&Expr::from_i64(5), &Expr::from_i64(2)), Ordering::Less);
    assert_eq!(compare(&v("a"), &v("b")), Ordering::Less);
    assert_eq!(compare(&sum, &(v("y") + v("x"))), Ordering::Equal);
}
