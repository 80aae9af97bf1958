use crate::{EngineError, Expr, FunctionDef, Pattern, Rule, functions, match_pattern, parse};

fn v(name: &str) -> Expr {
    Expr::variable(name)
}

#[test]
fn test_single_wildcard_binds_sum() {
    let target = v("x") + v("y");
    let results = match_pattern(&target, &Pattern::new(v("a")));
    assert_eq!(results.len(), 1);
    assert_eq!(results.results()[0].to_string(), "{a ↦ x + y}");
}

#[test]
fn test_no_match_is_empty_not_error() {
    let pattern = Pattern::new(Expr::ln_of(v("a")));
    let results = match_pattern(&Expr::sin_of(v("x")), &pattern);
    assert!(results.is_none());
    assert!(results.is_empty());
}

#[test]
fn test_product_partitions() {
    // a*b against x*y*z: every split of three factors into two groups
    let pattern = Pattern::new(v("a") * v("b"));
    let target = v("x") * v("y") * v("z");
    let results = pattern.matches(&target);
    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| r.apply(&(v("a") * v("b"))) == target));
}

#[test]
fn test_function_identity() {
    let f = FunctionDef::new("f", &["t"], v("t") + Expr::one());
    let g = FunctionDef::new("g", &["t"], v("t") + Expr::one());
    let pattern = Pattern::new(Expr::call(&f, vec![v("a")]).unwrap());

    let hit = pattern.matches(&Expr::call(&f, vec![v("x") * v("y")]).unwrap());
    assert_eq!(hit.len(), 1);
    assert_eq!(**hit.results()[0].get("a").unwrap(), v("x") * v("y"));

    let miss = pattern.matches(&Expr::call(&g, vec![v("x")]).unwrap());
    assert!(miss.is_none());
}

#[test]
fn test_builtin_function_pattern() {
    let pattern = Pattern::new(functions::min(v("a"), v("b")));
    let results = pattern.matches(&functions::min(v("x"), Expr::from_i64(2)));
    assert_eq!(results.len(), 1);
    assert_eq!(**results.results()[0].get("b").unwrap(), Expr::from_i64(2));
}

#[test]
fn test_replace_log_of_product() {
    let rule = Rule::new(
        Pattern::new(Expr::ln_of(v("a") * v("b"))),
        Expr::ln_of(v("a")) + Expr::ln_of(v("b")),
    )
    .unwrap();
    let target = parse("sin(ln(x*y))").unwrap();
    let rewritten = rule.apply(&target);
    assert!(rewritten.contains(&parse("sin(ln x + ln y)").unwrap()));
}

#[test]
fn test_replace_everywhere() {
    // sign(p*q) occurs twice; each site is rewritten separately
    let rule = Rule::new(
        Pattern::new(Expr::sign_of(v("a") * v("b"))),
        Expr::sign_of(v("a")) * Expr::sign_of(v("b")),
    )
    .unwrap();
    let target = parse("sign(p*q) + ln(sign(p*q) + 1)").unwrap();
    let rewritten = rule.apply(&target);
    assert!(rewritten.contains(&parse("sign(p)*sign(q) + ln(sign(p*q) + 1)").unwrap()));
    assert!(rewritten.contains(&parse("sign(p*q) + ln(sign(p)*sign(q) + 1)").unwrap()));
}

#[test]
fn test_replacement_must_be_covered() {
    let err = Rule::new(Pattern::new(Expr::sin_of(v("a"))), v("a") + v("b")).unwrap_err();
    match err {
        EngineError::ReplacementNotCovered { missing } => assert_eq!(missing, vec!["b".to_string()]),
        other => panic!("Expected ReplacementNotCovered, got {other:?}"),
    }
}

#[test]
fn test_literal_variables_in_rule() {
    // Only `a` is free: `x` in the pattern must be the variable x itself
    let rule = Rule::new(
        Pattern::with_free_variables(Expr::pow(v("x"), v("a")), &["a"]),
        v("a") * v("x"),
    )
    .unwrap();
    assert!(!rule.apply(&Expr::pow(v("x"), v("n"))).is_empty());
    assert!(rule.apply(&Expr::pow(v("y"), v("n"))).is_empty());
}
