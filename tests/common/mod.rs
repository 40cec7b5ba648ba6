//! Shared test utilities for vizstream integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Nothing here depends on wall-clock time or randomness,
//! so harness output is deterministic.

pub mod assertions;
pub mod builders;
pub mod fake_backend;
pub mod fixtures;

pub use builders::*;
pub use fixtures::*;
