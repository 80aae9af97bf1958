//! Binding sets produced by the matcher.
//!
//! A [`PatternMatchingResult`] is one consistent assignment of pattern
//! variables to subtrees. A [`PatternMatchingResultSet`] is a disjunction of
//! such assignments:
//! - `none()` (no assignment) means "no match"
//! - `all()` (one empty assignment) means "matches without binding anything"
//!
//! `intersect` is the conjunction of two constraints (pairwise merge, dropping
//! conflicting pairs); `union` is their disjunction.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::expr::Expr;
use crate::core::symbol::Symbol;

/// One assignment of pattern variables to subtrees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PatternMatchingResult {
    bindings: BTreeMap<Symbol, Arc<Expr>>,
}

impl PatternMatchingResult {
    /// The empty assignment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single binding `symbol ↦ value`
    #[must_use]
    pub fn single(symbol: Symbol, value: Arc<Expr>) -> Self {
        let mut bindings = BTreeMap::new();
        bindings.insert(symbol, value);
        Self { bindings }
    }

    /// The value bound to `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<Expr>> {
        self.bindings.get(&Symbol::new(name))
    }

    #[must_use]
    pub fn get_symbol(&self, symbol: &Symbol) -> Option<&Arc<Expr>> {
        self.bindings.get(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Arc<Expr>)> {
        self.bindings.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Combine two assignments. `None` if they bind the same variable to
    /// different subtrees.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Option<Self> {
        let mut merged = self.clone();
        for (symbol, value) in &other.bindings {
            match merged.bindings.get(symbol) {
                Some(existing) if existing != value => return None,
                Some(_) => {}
                None => {
                    merged.bindings.insert(symbol.clone(), Arc::clone(value));
                }
            }
        }
        Some(merged)
    }

    /// Substitute the bindings into `template`
    #[must_use]
    pub fn apply(&self, template: &Expr) -> Expr {
        template.substitute_all(&self.as_map())
    }

    pub(crate) fn as_map(&self) -> FxHashMap<Symbol, Arc<Expr>> {
        self.bindings
            .iter()
            .map(|(s, e)| (s.clone(), Arc::clone(e)))
            .collect()
    }
}

impl fmt::Display for PatternMatchingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (symbol, value)) in self.bindings.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{symbol} ↦ {value}")?;
        }
        f.write_str("}")
    }
}

/// A disjunction of assignments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternMatchingResultSet {
    results: Vec<PatternMatchingResult>,
}

impl PatternMatchingResultSet {
    /// No match
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Match that binds nothing; the identity of [`Self::intersect`]
    #[must_use]
    pub fn all() -> Self {
        Self {
            results: vec![PatternMatchingResult::new()],
        }
    }

    #[must_use]
    pub fn single(result: PatternMatchingResult) -> Self {
        Self {
            results: vec![result],
        }
    }

    /// True for the `None` sentinel
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.results.is_empty()
    }

    /// True when at least one assignment exists
    #[must_use]
    pub fn is_match(&self) -> bool {
        !self.results.is_empty()
    }

    /// True for the `All` sentinel
    #[must_use]
    pub fn is_all(&self) -> bool {
        self.results.len() == 1 && self.results[0].is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatternMatchingResult> {
        self.results.iter()
    }

    #[must_use]
    pub fn results(&self) -> &[PatternMatchingResult] {
        &self.results
    }

    /// Conjunction: every compatible pair of assignments, merged.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        if self.is_none() || other.is_none() {
            return Self::none();
        }
        if self.is_all() {
            return other.clone();
        }
        if other.is_all() {
            return self.clone();
        }
        let merged = self
            .results
            .iter()
            .flat_map(|a| other.results.iter().filter_map(move |b| a.merge(b)))
            .collect();
        Self::deduplicated(merged)
    }

    /// Disjunction: assignments from either side, without duplicates.
    #[must_use]
    pub fn union(mut self, other: Self) -> Self {
        if other.is_none() {
            return self;
        }
        if self.is_none() {
            return other;
        }
        self.results.extend(other.results);
        Self::deduplicated(self.results)
    }

    fn deduplicated(mut results: Vec<PatternMatchingResult>) -> Self {
        let mut seen = FxHashSet::default();
        results.retain(|r| seen.insert(r.clone()));
        Self { results }
    }
}

impl IntoIterator for PatternMatchingResultSet {
    type Item = PatternMatchingResult;
    type IntoIter = std::vec::IntoIter<PatternMatchingResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a PatternMatchingResultSet {
    type Item = &'a PatternMatchingResult;
    type IntoIter = std::slice::Iter<'a, PatternMatchingResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl FromIterator<PatternMatchingResult> for PatternMatchingResultSet {
    fn from_iter<I: IntoIterator<Item = PatternMatchingResult>>(iter: I) -> Self {
        Self::deduplicated(iter.into_iter().collect())
    }
}
