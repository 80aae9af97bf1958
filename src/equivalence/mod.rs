//! Equivalence classes by bounded rewriting.
//!
//! Starting from an expression, every [`EquivalencePath`] is applied in both
//! directions at every position of the tree, producing the one-step
//! neighbours. Iterating gives the equivalence class, explored breadth- or
//! depth-first up to a depth bound. The depth bound is the only limit: an
//! unbounded search over an infinite class never returns.

mod paths;
mod search;

pub use paths::{EquivalencePath, EquivalencePaths};
pub use search::{EquivalenceClass, EquivalenceSearch, SearchStrategy};

/// Rewrite depth used by [`EqualityLevel::Deep`](crate::EqualityLevel::Deep)
pub const DEFAULT_SEARCH_DEPTH: usize = 3;
