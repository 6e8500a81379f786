//! Catalog Core - the product entity and its data-access contract
//!
//! This crate provides everything a product store needs that is independent of
//! the database engine:
//! - The `Product` entity, its insert payload and typed identifier
//! - An explicit schema mapping for the `products` table
//! - `ProductQuery`, one enumerated specification per repository lookup
//! - The `ProductRepository` port and an in-memory adapter implementing it

pub mod identifiers;
pub mod product;
pub mod mapping;
pub mod pattern;
pub mod query;
pub mod ports;
pub mod memory;
pub mod error;

pub use identifiers::ProductId;
pub use product::{NewProduct, Product};
pub use mapping::{ColumnMapping, EntityMapping, Generation, SqlType, PRODUCT_MAPPING};
pub use query::{
    Cardinality, Direction, Page, PageRequest, ProductField, ProductQuery, QueryOrigin, Sort,
};
pub use ports::{ProductRepository, ProductRepositoryExt};
pub use memory::InMemoryProductRepository;
pub use error::{StoreError, StoreResult};
