use crate::{
    EquivalencePath, EquivalencePaths, EquivalenceSearch, Expr, FunctionDef, SearchStrategy,
    parse,
};

fn v(name: &str) -> Expr {
    Expr::variable(name)
}

#[test]
fn test_class_contains_start_and_rewrites() {
    let start = parse("ln(x*y)").unwrap();
    let class = EquivalenceSearch::new().depth(Some(1)).class(&start);
    assert!(class.contains(&start));
    assert!(class.contains(&parse("ln x + ln y").unwrap()));
}

#[test]
fn test_depth_bounds_the_search() {
    // Two rewrites needed: split off one sign, then the other
    let start = parse("sign(x*y*z)").unwrap();
    let target = parse("sign(x)*sign(y)*sign(z)").unwrap();
    let one = EquivalenceSearch::new().depth(Some(1));
    let two = EquivalenceSearch::new().depth(Some(2));
    assert!(!one.proves(&start, &target));
    assert!(two.proves(&start, &target));
}

#[test]
fn test_custom_paths() {
    let double_angle = EquivalencePath::new(
        Expr::sin_of(Expr::from_i64(2) * v("a")),
        Expr::from_i64(2) * Expr::sin_of(v("a")) * crate::functions::cos(v("a")),
    )
    .unwrap();
    let search = EquivalenceSearch::new().paths(EquivalencePaths::empty().with(double_angle));
    let lhs = parse("sin(2*t)").unwrap();
    let rhs = parse("2*sin(t)*cos(t)").unwrap();
    assert!(search.proves(&lhs, &rhs));
    assert!(search.proves(&rhs, &lhs));
    assert!(!EquivalenceSearch::new().paths(EquivalencePaths::empty()).proves(&lhs, &rhs));
}

#[test]
fn test_function_bodies_become_paths() {
    // h(t) = t*(t + 1); the call rewrites into its body, then distributes
    let h = FunctionDef::new("h", &["t"], v("t") * (v("t") + Expr::one()));
    let call = Expr::call(&h, vec![v("x")]).unwrap();
    let expanded = parse("x^2 + x").unwrap();

    let search = EquivalenceSearch::new().depth(Some(2));
    assert!(search.proves(&call, &expanded));
    assert!(
        !search
            .clone()
            .function_paths(false)
            .paths(EquivalencePaths::empty())
            .proves(&call, &expanded)
    );
}

#[test]
fn test_simplest_picks_smallest() {
    let start = parse("x*y + x*z").unwrap();
    let simplest = EquivalenceSearch::new().depth(Some(2)).simplest(&start);
    assert_eq!(simplest, parse("x*(y + z)").unwrap());
}

#[test]
fn test_strategies_agree_on_class() {
    let start = parse("sign(a*b) + ln(c*d)").unwrap();
    let bfs = EquivalenceSearch::new()
        .depth(Some(2))
        .strategy(SearchStrategy::BreadthFirst)
        .class(&start);
    let dfs = EquivalenceSearch::new()
        .depth(Some(2))
        .strategy(SearchStrategy::DepthFirst)
        .class(&start);
    assert_eq!(bfs.len(), dfs.len());
    assert!(bfs.iter().all(|e| dfs.contains(e)));
}
