//! Core types for symbolic expressions
//!
//! This module contains the fundamental types:
//! - `Expr` / `ExprKind` - canonical expression trees and their constructors
//! - `Number` - exact rational constants
//! - `Symbol` - case-normalized variable names
//! - `EngineError` - error types
//! - Visitor protocol and the four equality levels

pub mod equality;
pub mod error;
pub mod expr;
pub mod functions;
pub mod number;
pub mod symbol;
pub mod visitor; // Public visitor pattern

// Public re-exports (for external API)
pub use equality::EqualityLevel;
pub use error::{EngineError, Result, Span};
pub use expr::{Expr, ExprKind, FunctionCall, FunctionDef, MonadKind};
pub use number::{MAX_EXACT_POWER, MAX_ROOT_DEGREE, Number};
pub use symbol::Symbol;
