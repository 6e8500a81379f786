//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL store for the product catalog using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. `PostgresProductRepository`
//! implements the `ProductRepository` port from `catalog_core`; every lookup
//! arrives as a `ProductQuery` and is rendered by `statements` into a
//! parameterized SQL statement. Table layout comes from the schema mapping, and
//! `schema::apply_schema` creates it on start-up.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, PostgresProductRepository, create_pool, schema};
//! use catalog_core::PRODUCT_MAPPING;
//!
//! let pool = create_pool(DatabaseConfig::from_env()?).await?;
//! schema::apply_schema(&pool, &PRODUCT_MAPPING).await?;
//! let repo = PostgresProductRepository::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod schema;
pub mod statements;
pub mod repositories;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, DatabaseConfig};
pub use error::DatabaseError;
pub use repositories::{PostgresProductRepository, ProductRow};
