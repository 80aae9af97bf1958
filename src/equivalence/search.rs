//! Bounded exploration of equivalence classes.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use super::{DEFAULT_SEARCH_DEPTH, EquivalencePath, EquivalencePaths};
use crate::core::expr::{Expr, FunctionDef};
use crate::pattern::Rule;

/// Order in which the rewrite graph is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// Level by level; finds the shortest rewrite chain first
    #[default]
    BreadthFirst,
    /// Follow one rewrite chain to the depth bound before backtracking
    DepthFirst,
}

/// Search configuration.
///
/// # Example
/// ```
/// use symb_equiv::{EquivalenceSearch, Expr, SearchStrategy};
///
/// let (x, y, z) = (Expr::variable("x"), Expr::variable("y"), Expr::variable("z"));
/// let factored = x.clone() * (y.clone() + z.clone());
/// let expanded = x.clone() * y + x * z;
///
/// let search = EquivalenceSearch::new()
///     .depth(Some(2))
///     .strategy(SearchStrategy::DepthFirst);
/// assert!(search.proves(&factored, &expanded));
/// ```
#[derive(Debug, Clone)]
pub struct EquivalenceSearch {
    depth: Option<usize>,
    strategy: SearchStrategy,
    paths: EquivalencePaths,
    function_paths: bool,
}

impl Default for EquivalenceSearch {
    fn default() -> Self {
        Self {
            depth: Some(DEFAULT_SEARCH_DEPTH),
            strategy: SearchStrategy::default(),
            paths: EquivalencePaths::standard(),
            function_paths: true,
        }
    }
}

/// Every expression reached by a search, starting expression first.
#[derive(Debug, Clone)]
pub struct EquivalenceClass {
    members: Vec<Expr>,
}

impl EquivalenceClass {
    #[must_use]
    pub fn members(&self) -> &[Expr] {
        &self.members
    }

    #[must_use]
    pub fn contains(&self, expr: &Expr) -> bool {
        self.members.contains(expr)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.members.iter()
    }
}

impl IntoIterator for EquivalenceClass {
    type Item = Expr;
    type IntoIter = std::vec::IntoIter<Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl EquivalenceSearch {
    /// Breadth-first, depth [`DEFAULT_SEARCH_DEPTH`], standard paths plus
    /// paths derived from named functions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of rewrite steps; `None` searches without bound.
    #[must_use]
    pub const fn depth(mut self, depth: Option<usize>) -> Self {
        self.depth = depth;
        self
    }

    #[must_use]
    pub const fn strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Replace the rewrite library
    #[must_use]
    pub fn paths(mut self, paths: EquivalencePaths) -> Self {
        self.paths = paths;
        self
    }

    /// Whether named functions found in the inputs contribute
    /// `f(params) = body` paths
    #[must_use]
    pub const fn function_paths(mut self, enabled: bool) -> Self {
        self.function_paths = enabled;
        self
    }

    /// One-step rewrites of `expr`.
    #[must_use]
    pub fn neighbours(&self, expr: &Expr) -> Vec<Expr> {
        let rules = self.rules_for(&[expr]);
        let root = Arc::new(expr.clone());
        let mut seen = FxHashSet::default();
        seen.insert(Arc::clone(&root));
        expand(&root, &rules)
            .into_iter()
            .filter(|e| seen.insert(Arc::clone(e)))
            .map(|e| e.as_ref().clone())
            .collect()
    }

    /// True when `b` is reachable from `a` (up to `Exactly` or `Atomic`
    /// equality) within the depth bound.
    ///
    /// `false` means "not proven", not "different".
    #[must_use]
    pub fn proves(&self, a: &Expr, b: &Expr) -> bool {
        let target_atomic = b.atomic_expression();
        let rules = self.rules_for(&[a, b]);
        let found = self.explore(a, &rules, |candidate| {
            candidate.as_ref() == b || candidate.atomic_expression() == target_atomic
        });
        if found {
            debug!(from = %a, to = %b, "equivalence proven");
        }
        found
    }

    /// The whole equivalence class of `expr` within the depth bound.
    #[must_use]
    pub fn class(&self, expr: &Expr) -> EquivalenceClass {
        let rules = self.rules_for(&[expr]);
        let mut members = Vec::new();
        self.explore(expr, &rules, |candidate| {
            members.push(candidate.as_ref().clone());
            false
        });
        EquivalenceClass { members }
    }

    /// The member of `expr`'s class with the smallest
    /// [`complexity`](Expr::complexity). Ties keep the earlier discovery,
    /// so `expr` itself wins unless something is strictly smaller.
    #[must_use]
    pub fn simplest(&self, expr: &Expr) -> Expr {
        self.simplest_by(expr, Expr::complexity)
    }

    /// The member of `expr`'s class minimizing `metric`.
    #[must_use]
    pub fn simplest_by<M>(&self, expr: &Expr, metric: M) -> Expr
    where
        M: Fn(&Expr) -> usize,
    {
        let rules = self.rules_for(&[expr]);
        let mut best: Option<(usize, Arc<Expr>)> = None;
        self.explore(expr, &rules, |candidate| {
            let cost = metric(candidate);
            if best.as_ref().is_none_or(|(best_cost, _)| cost < *best_cost) {
                best = Some((cost, Arc::clone(candidate)));
            }
            false
        });
        best.map_or_else(|| expr.clone(), |(_, e)| e.as_ref().clone())
    }

    fn rules_for(&self, exprs: &[&Expr]) -> Vec<Rule> {
        let mut rules: Vec<Rule> = self.paths.rules().cloned().collect();
        if !self.function_paths {
            return rules;
        }
        let mut defs: Vec<Arc<FunctionDef>> = Vec::new();
        for expr in exprs {
            for def in expr.functions() {
                if !defs.iter().any(|d| d.same_identity(&def)) {
                    defs.push(def);
                }
            }
        }
        for def in &defs {
            match EquivalencePath::from_function(def) {
                Ok(path) => rules.extend(
                    [path.forward(), path.backward()]
                        .into_iter()
                        .filter(|rule| !rule.pattern().is_wildcard())
                        .cloned(),
                ),
                Err(err) => trace!(function = def.name(), %err, "no path for function"),
            }
        }
        rules
    }

    /// Walk the rewrite graph from `start`, calling `visit` once per distinct
    /// expression (start included). Stops early when `visit` returns true.
    fn explore<F>(&self, start: &Expr, rules: &[Rule], mut visit: F) -> bool
    where
        F: FnMut(&Arc<Expr>) -> bool,
    {
        let start = Arc::new(start.clone());
        if visit(&start) {
            return true;
        }
        match self.strategy {
            SearchStrategy::BreadthFirst => self.breadth_first(start, rules, &mut visit),
            SearchStrategy::DepthFirst => self.depth_first(start, rules, &mut visit),
        }
    }

    fn breadth_first<F>(&self, start: Arc<Expr>, rules: &[Rule], visit: &mut F) -> bool
    where
        F: FnMut(&Arc<Expr>) -> bool,
    {
        let mut visited: FxHashSet<Arc<Expr>> = FxHashSet::default();
        visited.insert(Arc::clone(&start));
        let mut frontier = vec![start];
        let mut level = 0usize;

        while !frontier.is_empty() && self.depth.is_none_or(|d| level < d) {
            let mut next = Vec::new();
            for expr in &frontier {
                for candidate in expand(expr, rules) {
                    if !visited.insert(Arc::clone(&candidate)) {
                        continue;
                    }
                    if visit(&candidate) {
                        debug!(depth = level + 1, visited = visited.len(), "search stopped early");
                        return true;
                    }
                    next.push(candidate);
                }
            }
            level += 1;
            debug!(
                depth = level,
                frontier = next.len(),
                visited = visited.len(),
                "search level expanded"
            );
            frontier = next;
        }
        false
    }

    fn depth_first<F>(&self, start: Arc<Expr>, rules: &[Rule], visit: &mut F) -> bool
    where
        F: FnMut(&Arc<Expr>) -> bool,
    {
        // Shallowest level each expression was reached at; a node reached
        // again at a shallower level is expanded again.
        let mut reached: FxHashMap<Arc<Expr>, usize> = FxHashMap::default();
        reached.insert(Arc::clone(&start), 0);
        let mut stack = vec![(start, 0usize)];

        while let Some((expr, level)) = stack.pop() {
            if self.depth.is_some_and(|d| level >= d) {
                continue;
            }
            let next_level = level + 1;
            for candidate in expand(&expr, rules) {
                let first_visit = match reached.get(&candidate) {
                    Some(&seen) if seen <= next_level => continue,
                    Some(_) => false,
                    None => true,
                };
                reached.insert(Arc::clone(&candidate), next_level);
                if first_visit && visit(&candidate) {
                    debug!(depth = next_level, visited = reached.len(), "search stopped early");
                    return true;
                }
                stack.push((candidate, next_level));
            }
        }
        debug!(visited = reached.len(), "search exhausted");
        false
    }
}

fn expand(expr: &Arc<Expr>, rules: &[Rule]) -> Vec<Arc<Expr>> {
    let mut out = Vec::new();
    for rule in rules {
        let rewrites = rule.apply_shared(expr);
        if !rewrites.is_empty() {
            trace!(rule = %rule.pattern().expr(), site = %expr, count = rewrites.len(), "rule applied");
        }
        out.extend(rewrites);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions;

    fn v(name: &str) -> Expr {
        Expr::variable(name)
    }

    #[test]
    fn test_distribution_both_ways() {
        let factored = v("x") * (v("y") + v("z"));
        let expanded = v("x") * v("y") + v("x") * v("z");
        let search = EquivalenceSearch::new().depth(Some(1));
        assert!(search.proves(&factored, &expanded));
        assert!(search.proves(&expanded, &factored));
    }

    #[test]
    fn test_function_rules_are_collected_once() {
        let search = EquivalenceSearch::new();
        let left = functions::sqrt(v("x")) + functions::sqrt(v("y"));
        let right = functions::sqrt(v("x") * v("y"));
        let standard = search.paths.rules().count();
        // sqrt appears three times across both sides but adds one pair of rules
        assert_eq!(search.rules_for(&[&left, &right]).len(), standard + 2);
        assert_eq!(search.clone().function_paths(false).rules_for(&[&left]).len(), standard);
    }

    #[test]
    fn test_depth_zero_is_exact_or_atomic() {
        let search = EquivalenceSearch::new().depth(Some(0));
        let e = Expr::ln_of(v("x") * v("y"));
        assert!(search.proves(&e, &e));
        assert!(!search.proves(&e, &(Expr::ln_of(v("x")) + Expr::ln_of(v("y")))));
        let root = functions::sqrt(v("x"));
        let atomic = Expr::pow(v("x"), Expr::pow(Expr::from_i64(2), Expr::from_i64(-1)));
        assert!(search.proves(&root, &atomic));
    }

    #[test]
    fn test_neighbours_exclude_start() {
        let e = Expr::ln_of(v("x") * v("y"));
        let n = EquivalenceSearch::new().neighbours(&e);
        assert!(!n.contains(&e));
        assert!(n.contains(&(Expr::ln_of(v("x")) + Expr::ln_of(v("y")))));
    }

    #[test]
    fn test_class_starts_with_input() {
        let e = Expr::sign_of(v("x") * v("y"));
        let class = EquivalenceSearch::new().depth(Some(1)).class(&e);
        assert_eq!(class.members()[0], e);
        assert!(class.contains(&(Expr::sign_of(v("x")) * Expr::sign_of(v("y")))));
    }

    #[test]
    fn test_empty_paths_class_is_singleton() {
        let e = v("x") * (v("y") + v("z"));
        let class = EquivalenceSearch::new()
            .paths(EquivalencePaths::empty())
            .class(&e);
        assert_eq!(class.len(), 1);
    }

    #[test]
    fn test_simplest_prefers_smaller() {
        // 2 nodes smaller after taking sin(arcsin(.)) apart
        let e = Expr::sin_of(Expr::arcsin_of(v("x") + v("y")));
        let simplest = EquivalenceSearch::new().depth(Some(1)).simplest(&e);
        assert_eq!(simplest, v("x") + v("y"));
    }

    #[test]
    fn test_strategies_agree_on_small_class() {
        let e = Expr::ln_of(v("x") * v("y"));
        let bfs = EquivalenceSearch::new().depth(Some(2)).class(&e);
        let dfs = EquivalenceSearch::new()
            .depth(Some(2))
            .strategy(SearchStrategy::DepthFirst)
            .class(&e);
        assert_eq!(bfs.len(), dfs.len());
        assert!(bfs.iter().all(|m| dfs.contains(m)));
    }
}
