//! Two-way rewrite rules driving the equivalence search.

use std::sync::{Arc, LazyLock};

use crate::core::error::Result;
use crate::core::expr::{Expr, FunctionDef};
use crate::pattern::{Pattern, Rule};

/// An identity `left = right`, usable as a rewrite in either direction.
///
/// Every variable on either side is a pattern variable, so both sides must
/// mention the same variables.
#[derive(Debug, Clone)]
pub struct EquivalencePath {
    forward: Rule,
    backward: Rule,
}

impl EquivalencePath {
    /// # Errors
    /// [`EngineError::ReplacementNotCovered`](crate::EngineError) when one
    /// side uses a variable the other side does not.
    pub fn new(left: Expr, right: Expr) -> Result<Self> {
        let forward = Rule::new(Pattern::new(left.clone()), right.clone())?;
        let backward = Rule::new(Pattern::new(right), left)?;
        Ok(Self { forward, backward })
    }

    /// `f(p1, .., pn) = body` for a named function. Only the parameters are
    /// pattern variables; any other variable in the body matches literally.
    ///
    /// # Errors
    /// Fails when the body mentions variables other than the parameters, or
    /// ignores one of them: such an identity cannot be used both ways.
    pub fn from_function(def: &Arc<FunctionDef>) -> Result<Self> {
        let params: Vec<&str> = def.parameters().iter().map(|p| p.name()).collect();
        let call = Expr::call(def, params.iter().map(|p| Expr::variable(p)).collect())?;
        let body = def.body().as_ref().clone();
        let forward = Rule::new(Pattern::with_free_variables(call.clone(), &params), body.clone())?;
        let backward = Rule::new(Pattern::with_free_variables(body, &params), call)?;
        Ok(Self { forward, backward })
    }

    #[must_use]
    pub const fn forward(&self) -> &Rule {
        &self.forward
    }

    #[must_use]
    pub const fn backward(&self) -> &Rule {
        &self.backward
    }
}

/// An ordered library of [`EquivalencePath`]s.
#[derive(Debug, Clone, Default)]
pub struct EquivalencePaths {
    paths: Vec<EquivalencePath>,
}

static STANDARD: LazyLock<EquivalencePaths> = LazyLock::new(|| {
    let v = Expr::variable;
    let (a, b, c) = (v("a"), v("b"), v("c"));
    let two = Expr::from_i64(2);

    let identities = vec![
        // Distribution
        (
            a.clone() * (b.clone() + c.clone()),
            a.clone() * b.clone() + a.clone() * c,
        ),
        // Logarithm of a product
        (
            Expr::ln_of(a.clone() * b.clone()),
            Expr::ln_of(a.clone()) + Expr::ln_of(b.clone()),
        ),
        // Logarithm of a power
        (
            Expr::ln_of(Expr::pow(a.clone(), b.clone())),
            b.clone() * Expr::ln_of(a.clone()),
        ),
        // Power of a product
        (
            Expr::pow(a.clone() * b.clone(), v("c")),
            Expr::pow(a.clone(), v("c")) * Expr::pow(b.clone(), v("c")),
        ),
        (Expr::sin_of(Expr::arcsin_of(a.clone())), a.clone()),
        (
            Expr::sign_of(a.clone() * b.clone()),
            Expr::sign_of(a.clone()) * Expr::sign_of(b.clone()),
        ),
        // Binomial square
        (
            Expr::pow(a.clone() + b.clone(), two.clone()),
            Expr::sum(vec![
                Expr::pow(a.clone(), two.clone()),
                two.clone() * a.clone() * b.clone(),
                Expr::pow(b, two),
            ]),
        ),
    ];

    EquivalencePaths {
        paths: identities
            .into_iter()
            .filter_map(|(left, right)| EquivalencePath::new(left, right).ok())
            .collect(),
    }
});

impl EquivalencePaths {
    /// No paths at all
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in identity library: distribution, logarithm of a product
    /// and of a power, power of a product, `sin(arcsin a) = a`,
    /// `sign(a·b) = sign a · sign b` and the binomial square.
    #[must_use]
    pub fn standard() -> Self {
        STANDARD.clone()
    }

    /// Append a path
    #[must_use]
    pub fn with(mut self, path: EquivalencePath) -> Self {
        self.paths.push(path);
        self
    }

    pub fn push(&mut self, path: EquivalencePath) {
        self.paths.push(path);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EquivalencePath> {
        self.paths.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Both directions of every path, except directions whose pattern is a
    /// bare wildcard (it would rewrite every node of every tree).
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.paths
            .iter()
            .flat_map(|p| [&p.forward, &p.backward])
            .filter(|rule| !rule.pattern().is_wildcard())
    }
}

impl FromIterator<EquivalencePath> for EquivalencePaths {
    fn from_iter<I: IntoIterator<Item = EquivalencePath>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}
