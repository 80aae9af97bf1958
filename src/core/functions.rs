//! Built-in named functions.
//!
//! Each built-in is a [`FunctionDef`] whose body uses only the primitive node
//! set (Sum, Product, Exponent and the monads), so the `Atomic` equality
//! level and the equivalence search see through every call. Evaluators and the
//! compiler recognize the built-ins by identity and use native numeric
//! operations for them instead of the body.

use std::sync::{Arc, LazyLock};

use crate::core::expr::{Expr, ExprKind, FunctionCall, FunctionDef};

/// The built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Cos,
    Tan,
    Sqrt,
    Abs,
    Min,
    Max,
    Log,
    Arccos,
}

impl Builtin {
    pub const ALL: [Self; 8] = [
        Self::Cos,
        Self::Tan,
        Self::Sqrt,
        Self::Abs,
        Self::Min,
        Self::Max,
        Self::Log,
        Self::Arccos,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Sqrt => "sqrt",
            Self::Abs => "abs",
            Self::Min => "min",
            Self::Max => "max",
            Self::Log => "log",
            Self::Arccos => "arccos",
        }
    }

    /// The shared definition
    #[must_use]
    pub fn def(self) -> &'static Arc<FunctionDef> {
        match self {
            Self::Cos => &COS,
            Self::Tan => &TAN,
            Self::Sqrt => &SQRT,
            Self::Abs => &ABS,
            Self::Min => &MIN,
            Self::Max => &MAX,
            Self::Log => &LOG,
            Self::Arccos => &ARCCOS,
        }
    }

    /// Which built-in `def` is, if any.
    ///
    /// A user definition that reuses a built-in name with a different body is
    /// not the built-in.
    #[must_use]
    pub fn of(def: &FunctionDef) -> Option<Self> {
        let candidate = Self::from_name(def.name())?;
        candidate.def().same_identity(def).then_some(candidate)
    }

    /// Look up a built-in by (lower-case) name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}

fn x() -> Expr {
    Expr::variable("x")
}

fn y() -> Expr {
    Expr::variable("y")
}

// 2^(-1) folds to the exact constant 1/2
fn half() -> Expr {
    Expr::pow(Expr::from_i64(2), Expr::from_i64(-1))
}

// cos(t) = 1 - 2·sin(t/2)^2
fn cos_body(t: Expr) -> Expr {
    let s = Expr::sin_of(Expr::product(vec![half(), t]));
    Expr::subtract(
        Expr::one(),
        Expr::product(vec![Expr::from_i64(2), Expr::pow(s, Expr::from_i64(2))]),
    )
}

// |t| = t·sign(t)
fn abs_body(t: Expr) -> Expr {
    Expr::product(vec![t.clone(), Expr::sign_of(t)])
}

static COS: LazyLock<Arc<FunctionDef>> = LazyLock::new(|| FunctionDef::new("cos", &["x"], cos_body(x())));

static TAN: LazyLock<Arc<FunctionDef>> = LazyLock::new(|| {
    FunctionDef::new("tan", &["x"], Expr::divide(Expr::sin_of(x()), cos_body(x())))
});

static SQRT: LazyLock<Arc<FunctionDef>> =
    LazyLock::new(|| FunctionDef::new("sqrt", &["x"], Expr::pow(x(), half())));

static ABS: LazyLock<Arc<FunctionDef>> = LazyLock::new(|| FunctionDef::new("abs", &["x"], abs_body(x())));

// min(x, y) = (x + y - |x - y|) / 2
static MIN: LazyLock<Arc<FunctionDef>> = LazyLock::new(|| {
    let spread = abs_body(Expr::subtract(x(), y()));
    let body = Expr::product(vec![half(), Expr::subtract(Expr::sum(vec![x(), y()]), spread)]);
    FunctionDef::new("min", &["x", "y"], body)
});

// max(x, y) = (x + y + |x - y|) / 2
static MAX: LazyLock<Arc<FunctionDef>> = LazyLock::new(|| {
    let spread = abs_body(Expr::subtract(x(), y()));
    let body = Expr::product(vec![half(), Expr::sum(vec![x(), y(), spread])]);
    FunctionDef::new("max", &["x", "y"], body)
});

// log(y, x) = ln(y) / ln(x): logarithm of y to base x
static LOG: LazyLock<Arc<FunctionDef>> = LazyLock::new(|| {
    FunctionDef::new("log", &["y", "x"], Expr::divide(Expr::ln_of(y()), Expr::ln_of(x())))
});

static ARCCOS: LazyLock<Arc<FunctionDef>> = LazyLock::new(|| {
    let body = Expr::subtract(Expr::arcsin_of(Expr::one()), Expr::arcsin_of(x()));
    FunctionDef::new("arccos", &["x"], body)
});

/// Look up a built-in definition by name.
#[must_use]
pub fn builtin(name: &str) -> Option<Arc<FunctionDef>> {
    Builtin::from_name(name).map(|b| Arc::clone(b.def()))
}

// Arity always matches here, so skip the checked `Expr::call`.
fn apply(builtin: Builtin, args: Vec<Expr>) -> Expr {
    Expr::new(ExprKind::Function(FunctionCall {
        def: Arc::clone(builtin.def()),
        args: args.into_iter().map(Arc::new).collect(),
    }))
}

#[must_use]
pub fn cos(x: Expr) -> Expr {
    apply(Builtin::Cos, vec![x])
}

#[must_use]
pub fn tan(x: Expr) -> Expr {
    apply(Builtin::Tan, vec![x])
}

#[must_use]
pub fn sqrt(x: Expr) -> Expr {
    apply(Builtin::Sqrt, vec![x])
}

#[must_use]
pub fn abs(x: Expr) -> Expr {
    apply(Builtin::Abs, vec![x])
}

#[must_use]
pub fn min(x: Expr, y: Expr) -> Expr {
    apply(Builtin::Min, vec![x, y])
}

#[must_use]
pub fn max(x: Expr, y: Expr) -> Expr {
    apply(Builtin::Max, vec![x, y])
}

/// Logarithm of `value` to `base`
#[must_use]
pub fn log(value: Expr, base: Expr) -> Expr {
    apply(Builtin::Log, vec![value, base])
}

#[must_use]
pub fn arccos(x: Expr) -> Expr {
    apply(Builtin::Arccos, vec![x])
}
