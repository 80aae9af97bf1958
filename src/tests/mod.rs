//! Crate-level test suites
//!
//! Unit tests live next to the code they cover; these suites exercise the
//! public surface end to end.

mod canonical_tests;
mod equality_tests;
mod equivalence_tests;
mod pattern_tests;
mod property_tests;
