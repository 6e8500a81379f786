//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! product catalog test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built products with predictable attributes
//! - `builders`: Builder pattern for product test data
//! - `database`: PostgreSQL test containers with the catalog schema applied
//! - `assertions`: Assertion helpers for lookup results
//! - `generators`: Property-based test data generators
//! - `logging`: One-time tracing subscriber for tests

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;
pub mod logging;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
pub use logging::init_test_tracing;
