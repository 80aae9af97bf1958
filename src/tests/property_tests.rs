//! Property-Based Testing
//!
//! Uses quickcheck with a bounded random expression generator to check:
//! - Commutativity of the canonical constructors
//! - Parser/printer round trip
//! - Agreement of tree, stack and heap evaluation, with and without
//!   simplification
//! - Soundness of the heap cell allocation

use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

use super::compiler_tests::assert_allocation_sound;
use crate::{
    Compile, DEFAULT_SIMPLIFICATION_DEPTH, Expr, MonadKind, Target, VariableSet, functions, parse,
};

// ============================================================
// PART 1: EXPRESSION GENERATOR
// ============================================================

#[derive(Debug, Clone)]
struct ArbExpr(Expr);

const VARIABLES: [&str; 3] = ["x", "y", "z"];
const MONADS: [MonadKind; 5] = [
    MonadKind::Ln,
    MonadKind::Sin,
    MonadKind::Sign,
    MonadKind::Arcsin,
    MonadKind::Arctan,
];

fn pick(g: &mut Gen, n: usize) -> usize {
    usize::arbitrary(g) % n
}

fn gen_leaf(g: &mut Gen) -> Expr {
    match pick(g, 4) {
        0 => Expr::from_i64(i64::from(u8::arbitrary(g) % 7) - 3),
        1 => {
            let numer = i64::from(u8::arbitrary(g) % 5) + 1;
            let denom = i64::from(u8::arbitrary(g) % 4) + 2;
            Expr::from_fraction(numer, denom).unwrap_or_else(Expr::one)
        }
        _ => Expr::variable(VARIABLES[pick(g, VARIABLES.len())]),
    }
}

fn gen_expr(g: &mut Gen, depth: usize) -> Expr {
    if depth == 0 {
        return gen_leaf(g);
    }
    match pick(g, 8) {
        0 | 1 => {
            let n = 2 + pick(g, 2);
            Expr::sum((0..n).map(|_| gen_expr(g, depth - 1)).collect())
        }
        2 | 3 => {
            let n = 2 + pick(g, 2);
            Expr::product((0..n).map(|_| gen_expr(g, depth - 1)).collect())
        }
        4 => {
            let exponents = [2, 3, -1];
            let power = match pick(g, 4) {
                3 => Expr::from_fraction(1, 2).unwrap_or_else(Expr::one),
                i => Expr::from_i64(exponents[i]),
            };
            Expr::pow(gen_expr(g, depth - 1), power)
        }
        5 => Expr::monad(MONADS[pick(g, MONADS.len())], gen_expr(g, depth - 1)),
        6 => match pick(g, 4) {
            0 => functions::cos(gen_expr(g, depth - 1)),
            1 => functions::sqrt(gen_expr(g, depth - 1)),
            2 => functions::abs(gen_expr(g, depth - 1)),
            _ => functions::min(gen_expr(g, depth - 1), gen_expr(g, depth - 1)),
        },
        _ => gen_leaf(g),
    }
}

/// Trees whose value is positive whenever every variable is, so that rewrites
/// such as `(a*b)^c = a^c*b^c` keep their value at every sampled point.
fn gen_positive(g: &mut Gen, depth: usize) -> Expr {
    let leaf = |g: &mut Gen| match pick(g, 3) {
        0 => Expr::from_i64(i64::from(u8::arbitrary(g) % 4) + 1),
        1 => Expr::from_fraction(i64::from(u8::arbitrary(g) % 3) + 1, 2).unwrap_or_else(Expr::one),
        _ => Expr::variable(VARIABLES[pick(g, VARIABLES.len())]),
    };
    if depth == 0 {
        return leaf(g);
    }
    match pick(g, 7) {
        0 | 1 => {
            let n = 2 + pick(g, 2);
            Expr::sum((0..n).map(|_| gen_positive(g, depth - 1)).collect())
        }
        2 | 3 => {
            let n = 2 + pick(g, 2);
            Expr::product((0..n).map(|_| gen_positive(g, depth - 1)).collect())
        }
        4 => {
            let power = match pick(g, 3) {
                0 => Expr::from_i64(2),
                1 => Expr::from_i64(-1),
                _ => Expr::from_fraction(1, 2).unwrap_or_else(Expr::one),
            };
            Expr::pow(gen_positive(g, depth - 1), power)
        }
        5 => match pick(g, 3) {
            0 => functions::sqrt(gen_positive(g, depth - 1)),
            1 => Expr::sign_of(gen_positive(g, depth - 1)),
            _ => Expr::arctan_of(gen_positive(g, depth - 1)),
        },
        _ => leaf(g),
    }
}

/// An expression from [`gen_positive`], kept shallow so the default-depth
/// simplification search stays quick
#[derive(Debug, Clone)]
struct PositiveExpr(Expr);

impl Arbitrary for PositiveExpr {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = g.size().min(2);
        Self(gen_positive(g, depth))
    }
}

impl Arbitrary for ArbExpr {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = g.size().min(3); // Keep trees small
        Self(gen_expr(g, depth))
    }
}

fn agrees(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a == b || (a - b).abs() < 1e-9 * (1.0 + a.abs())
}

// ============================================================
// PART 2: PROPERTIES
// ============================================================

#[test]
fn test_sum_and_product_commute() {
    fn prop(a: ArbExpr, b: ArbExpr) -> bool {
        let (a, b) = (a.0, b.0);
        Expr::sum(vec![a.clone(), b.clone()]) == Expr::sum(vec![b.clone(), a.clone()])
            && Expr::product(vec![a.clone(), b.clone()]) == Expr::product(vec![b, a])
    }
    QuickCheck::new()
        .tests(300)
        .quickcheck(prop as fn(ArbExpr, ArbExpr) -> bool);
}

#[test]
fn test_print_parse_round_trip() {
    fn prop(e: ArbExpr) -> TestResult {
        let printed = e.0.to_string();
        match parse(&printed) {
            Ok(reparsed) => TestResult::from_bool(reparsed == e.0),
            Err(err) => TestResult::error(format!("{printed}: {err}")),
        }
    }
    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(ArbExpr) -> TestResult);
}

#[test]
fn test_compiled_forms_agree_with_tree() {
    fn prop(e: ArbExpr, x: u8, y: u8, z: u8) -> TestResult {
        let expr = e.0;
        // Points in (0, 2.56] keep most of the generated domain real
        let point = [
            f64::from(x) / 100.0 + 0.01,
            f64::from(y) / 100.0 + 0.01,
            f64::from(z) / 100.0 + 0.01,
        ];
        let vars = VariableSet::new()
            .with("x", point[0])
            .with("y", point[1])
            .with("z", point[2]);
        let Ok(tree) = expr.evaluate(&vars) else {
            return TestResult::error("tree evaluation failed");
        };

        for target in [Target::Stack, Target::Heap] {
            let compiled = match Compile::new()
                .parameters(&VARIABLES)
                .simplification_depth(0)
                .target(target)
                .compile(&expr)
            {
                Ok(f) => f,
                Err(err) => return TestResult::error(err.to_string()),
            };
            if target == Target::Heap {
                assert_allocation_sound(&compiled);
            }
            match compiled.evaluate(&point) {
                Ok(value) if agrees(tree, value) => {}
                Ok(value) => {
                    return TestResult::error(format!(
                        "{expr} ({target:?}): tree {tree}, compiled {value}"
                    ));
                }
                Err(err) => return TestResult::error(err.to_string()),
            }
        }
        TestResult::passed()
    }
    QuickCheck::new()
        .tests(300)
        .quickcheck(prop as fn(ArbExpr, u8, u8, u8) -> TestResult);
}

#[test]
fn test_simplified_programs_agree_with_tree() {
    fn prop(e: PositiveExpr, x: u8, y: u8, z: u8) -> TestResult {
        let expr = e.0;
        let point = [
            f64::from(x) / 100.0 + 0.01,
            f64::from(y) / 100.0 + 0.01,
            f64::from(z) / 100.0 + 0.01,
        ];
        let vars = VariableSet::new()
            .with("x", point[0])
            .with("y", point[1])
            .with("z", point[2]);
        let Ok(tree) = expr.evaluate(&vars) else {
            return TestResult::error("tree evaluation failed");
        };

        for target in [Target::Stack, Target::Heap] {
            let compiled = match Compile::new()
                .parameters(&VARIABLES)
                .simplification_depth(DEFAULT_SIMPLIFICATION_DEPTH)
                .target(target)
                .compile(&expr)
            {
                Ok(f) => f,
                Err(err) => return TestResult::error(err.to_string()),
            };
            match compiled.evaluate(&point) {
                Ok(value) if agrees(tree, value) => {}
                Ok(value) => {
                    return TestResult::error(format!(
                        "{expr} simplified to {} ({target:?}): tree {tree}, compiled {value}",
                        compiled.expr()
                    ));
                }
                Err(err) => return TestResult::error(err.to_string()),
            }
        }
        TestResult::passed()
    }
    QuickCheck::new()
        .tests(30)
        .quickcheck(prop as fn(PositiveExpr, u8, u8, u8) -> TestResult);
}

#[test]
fn test_parser_never_panics() {
    fn prop(input: String) -> TestResult {
        // Either succeeds or returns Err, never panics
        let _ = parse(&input);
        TestResult::passed()
    }
    QuickCheck::new()
        .tests(1000)
        .quickcheck(prop as fn(String) -> TestResult);
}
