//! Error types for construction, parsing, evaluation and compilation.

use thiserror::Error;

/// Source location span for error reporting.
/// Represents a range of characters in the input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start position (0-indexed byte offset)
    pub start: usize,
    /// End position (exclusive, 0-indexed byte offset)
    pub end: usize,
}

impl Span {
    /// Create a new span
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a span for a single position
    #[must_use]
    pub const fn at(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }

    /// Check if this span has valid location info
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Format the span for display (1-indexed for users)
    #[must_use]
    pub fn display(&self) -> String {
        if !self.is_valid() {
            String::new()
        } else if self.end - self.start == 1 {
            format!(" at position {}", self.start + 1)
        } else {
            format!(" at positions {}-{}", self.start + 1, self.end)
        }
    }
}

fn span_suffix(span: Option<&Span>) -> String {
    span.map_or_else(String::new, Span::display)
}

/// Errors surfaced by the engine.
///
/// Each failure family is its own variant so callers can tell an absent
/// variable apart from a syntax problem or a broken rule definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A variable was evaluated against an input set that does not bind it.
    #[error("variable '{name}' is not present in the input set")]
    VariableNotPresent { name: String },

    /// Malformed input text.
    #[error("invalid syntax: {msg}{}", span_suffix(.span.as_ref()))]
    Syntax { msg: String, span: Option<Span> },

    /// A variable name outside the parser's allowed set.
    #[error("unknown identifier '{name}'{}", span_suffix(.span.as_ref()))]
    UnknownIdentifier { name: String, span: Option<Span> },

    /// A rewrite rule whose replacement uses variables the pattern never binds.
    #[error("replacement uses variables not bound by the pattern: {}", .missing.join(", "))]
    ReplacementNotCovered { missing: Vec<String> },

    /// A named function applied to the wrong number of arguments.
    #[error("function '{name}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Compiled evaluation got the wrong number of parameter values or columns.
    #[error("expected {expected} parameter value(s), got {got}")]
    ParameterCountMismatch { expected: usize, got: usize },

    /// Batch evaluation columns (and output) of different lengths.
    #[error("batch columns and output must all have the same length")]
    ColumnLengthMismatch,

    /// The stack form of an expression would be nested deeper than allowed.
    #[error("expression requires stack depth {depth}, limit is {limit}")]
    StackOverflow { depth: usize, limit: usize },

    /// Broken internal invariant (a bug, never a user error).
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Create a syntax error without location info
    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::Syntax {
            msg: msg.into(),
            span: None,
        }
    }

    /// Create a syntax error pointing at `span`
    pub fn syntax_at(msg: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            msg: msg.into(),
            span: Some(span),
        }
    }

    /// Create a variable-absence error
    pub fn variable_not_present(name: impl Into<String>) -> Self {
        Self::VariableNotPresent { name: name.into() }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Assert an internal invariant.
///
/// Debug builds stop at the `debug_assert!`; release builds return
/// [`EngineError::Internal`] from the enclosing function.
#[macro_export]
macro_rules! ensure_invariant {
    ($cond:expr, $msg:literal $(, $args:expr)* $(,)?) => {
        if cfg!(debug_assertions) {
            debug_assert!($cond, $msg $(, $args)*);
        }
        if !$cond {
            return Err($crate::EngineError::Internal(format!($msg $(, $args)*)));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display() {
        assert_eq!(Span::at(3).display(), " at position 4");
        assert_eq!(Span::new(2, 5).display(), " at positions 3-5");
        assert_eq!(Span::default().display(), "");
    }

    #[test]
    fn test_error_messages_are_distinct() {
        let syntax = EngineError::syntax_at("unbalanced parentheses", Span::at(0));
        let unknown = EngineError::UnknownIdentifier {
            name: "q".to_string(),
            span: None,
        };
        let absent = EngineError::variable_not_present("x");
        assert_eq!(
            syntax.to_string(),
            "invalid syntax: unbalanced parentheses at position 1"
        );
        assert_eq!(unknown.to_string(), "unknown identifier 'q'");
        assert_eq!(
            absent.to_string(),
            "variable 'x' is not present in the input set"
        );
        assert_ne!(syntax, absent);
    }

    #[test]
    fn test_replacement_message_lists_names() {
        let err = EngineError::ReplacementNotCovered {
            missing: vec!["b".to_string(), "c".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "replacement uses variables not bound by the pattern: b, c"
        );
    }
}
