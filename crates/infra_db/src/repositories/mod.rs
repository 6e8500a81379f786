//! Repository implementations
//!
//! Concrete adapters for the `catalog_core` repository port. Each repository
//! owns a connection pool, executes statements rendered by `crate::statements`
//! and maps database rows back to domain types.

pub mod product;

pub use product::{PostgresProductRepository, ProductRow};
