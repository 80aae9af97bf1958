//! Symbolic Equivalence Engine
//!
//! A Rust library for canonical symbolic expressions over exact rationals,
//! with equality up to rewriting and compilation to flat numeric programs.
//!
//! # Features
//! - **Canonical smart constructors**: flattened, folded, sorted N-ary sums
//!   and products over exact rational constants
//! - **Four equality levels**: `Exactly`, `Atomic`, `Deep`, `Deepest`
//! - **AC pattern matching** with free variables and rule-based rewriting
//! - **Bounded equivalence search** over a library of identities
//! - **Compiler** to a stack program or a register-allocated heap program
//! - Case-insensitive parser whose output round-trips through `Display`
//!
//! # Usage Examples
//!
//! ## Proving equivalence
//! ```
//! use symb_equiv::{EqualityLevel, parse};
//!
//! let factored = parse("a*(b + c)").expect("valid input");
//! let expanded = parse("a*b + a*c").expect("valid input");
//! assert_ne!(factored, expanded);
//! assert!(factored.equals(&expanded, EqualityLevel::Deep));
//! ```
//!
//! ## Compiling
//! ```
//! use symb_equiv::{Compile, Target, VariableSet, parse};
//!
//! let expr = parse("x*y + sin(x)").expect("valid input");
//! let f = Compile::new().target(Target::Stack).compile(&expr).expect("compile");
//!
//! let vars = VariableSet::new().with("x", 1.5_f64).with("y", 2.0);
//! let value = f.evaluate_set(&vars).expect("all variables bound");
//! assert!((value - (3.0 + 1.5_f64.sin())).abs() < 1e-10);
//! ```

mod core;
mod display;
pub mod compiler;
pub mod equivalence;
pub mod evaluator;
pub mod pattern;
pub mod parser;
pub mod traits;

#[cfg(test)]
mod tests;

// Re-export key types for easier usage
pub use compiler::{
    Compile, CompiledFunction, DEFAULT_SIMPLIFICATION_DEPTH, Instruction, MAX_STACK_DEPTH,
    OpCode, Program, Target, compile,
};
pub use crate::core::functions;
pub use crate::core::visitor::{self, DualVisitor, Visitor, accept_dual};
pub use crate::core::{
    EngineError, EqualityLevel, Expr, ExprKind, FunctionCall, FunctionDef, MAX_EXACT_POWER,
    MAX_ROOT_DEGREE, MonadKind, Number, Result, Span, Symbol,
};
pub use equivalence::{
    DEFAULT_SEARCH_DEPTH, EquivalenceClass, EquivalencePath, EquivalencePaths, EquivalenceSearch,
    SearchStrategy,
};
pub use evaluator::VariableSet;
pub use parser::{Parser, parse};
pub use pattern::{
    Pattern, PatternMatchingResult, PatternMatchingResultSet, Rule, match_pattern,
};
pub use traits::MathScalar;
