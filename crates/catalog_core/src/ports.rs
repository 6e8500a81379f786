//! Product repository port
//!
//! `ProductRepository` is the data-access contract of the catalog. Adapters
//! implement a small set of primitives (CRUD plus `find_one` / `find_many`
//! over a `ProductQuery`); `ProductRepositoryExt` layers every named lookup on
//! top of them, so all backends answer the same lookups the same way.
//!
//! # Usage
//!
//! ```rust,ignore
//! use catalog_core::{ProductRepository, ProductRepositoryExt};
//! use std::sync::Arc;
//!
//! let repo: Arc<dyn ProductRepository> = Arc::new(PostgresProductRepository::new(pool));
//! let cheap = repo.find_by_price_between(dec!(10), dec!(20)).await?;
//! ```

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::error::StoreResult;
use crate::identifiers::ProductId;
use crate::product::{NewProduct, Product};
use crate::query::{Page, PageRequest, ProductQuery, Sort};

/// Store primitives every product backend provides
///
/// Each call is one independent unit of work against the store.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Stores a new product, assigning its id and timestamps
    async fn insert(&self, product: NewProduct) -> StoreResult<Product>;

    /// Stores several new products; either all are stored or none
    async fn insert_all(&self, products: Vec<NewProduct>) -> StoreResult<Vec<Product>> {
        let mut stored = Vec::with_capacity(products.len());
        for product in products {
            stored.push(self.insert(product).await?);
        }
        Ok(stored)
    }

    /// Writes the mutable attributes of an existing product
    ///
    /// Returns the row as stored, with `last_updated` refreshed. Fails with
    /// `StoreError::NotFound` if the id no longer exists.
    async fn update(&self, product: &Product) -> StoreResult<Product>;

    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Product>>;

    async fn find_all(&self) -> StoreResult<Vec<Product>>;

    async fn find_all_sorted(&self, sort: Sort) -> StoreResult<Vec<Product>>;

    async fn find_page(&self, request: PageRequest) -> StoreResult<Page<Product>>;

    async fn count(&self) -> StoreResult<u64>;

    async fn exists_by_id(&self, id: ProductId) -> StoreResult<bool>;

    /// Removes a product; returns whether a row existed
    async fn delete_by_id(&self, id: ProductId) -> StoreResult<bool>;

    /// Removes every product; returns the number of rows removed
    async fn delete_all(&self) -> StoreResult<u64>;

    /// Runs a single-result lookup
    ///
    /// Fails with `StoreError::NonUniqueResult` if more than one row matches.
    async fn find_one(&self, query: &ProductQuery) -> StoreResult<Option<Product>>;

    /// Runs a list lookup, honouring its ordering and limit
    async fn find_many(&self, query: &ProductQuery) -> StoreResult<Vec<Product>>;
}

/// Named lookups over any `ProductRepository`
#[async_trait]
pub trait ProductRepositoryExt: ProductRepository {
    async fn delete(&self, product: &Product) -> StoreResult<bool> {
        self.delete_by_id(product.id).await
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Product>> {
        self.find_one(&ProductQuery::ByName {
            name: name.to_string(),
        })
        .await
    }

    async fn find_by_name_or_description(
        &self,
        name: &str,
        description: &str,
    ) -> StoreResult<Vec<Product>> {
        self.find_many(&ProductQuery::ByNameOrDescription {
            name: name.to_string(),
            description: description.to_string(),
        })
        .await
    }

    async fn find_by_name_and_description_and_price(
        &self,
        name: &str,
        description: &str,
        price: Decimal,
    ) -> StoreResult<Vec<Product>> {
        self.find_many(&ProductQuery::ByNameAndDescriptionAndPrice {
            name: name.to_string(),
            description: description.to_string(),
            price,
        })
        .await
    }

    async fn find_by_price_greater_than(&self, price: Decimal) -> StoreResult<Vec<Product>> {
        self.find_many(&ProductQuery::ByPriceGreaterThan { price }).await
    }

    async fn find_by_name_containing(&self, fragment: &str) -> StoreResult<Vec<Product>> {
        self.find_many(&ProductQuery::ByNameContaining {
            fragment: fragment.to_string(),
        })
        .await
    }

    async fn find_by_name_like(&self, pattern: &str) -> StoreResult<Vec<Product>> {
        self.find_many(&ProductQuery::ByNameLike {
            pattern: pattern.to_string(),
        })
        .await
    }

    async fn find_by_price_between(&self, low: Decimal, high: Decimal) -> StoreResult<Vec<Product>> {
        self.find_many(&ProductQuery::ByPriceBetween { low, high }).await
    }

    async fn find_by_date_created_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> StoreResult<Vec<Product>> {
        self.find_many(&ProductQuery::ByDateCreatedBetween { start, end })
            .await
    }

    async fn find_first3_by_order_by_name_asc(&self) -> StoreResult<Vec<Product>> {
        self.find_many(&ProductQuery::First3ByOrderByNameAsc).await
    }

    async fn find_by_name_or_description_jpql_named_param(
        &self,
        name: &str,
        description: &str,
    ) -> StoreResult<Vec<Product>> {
        self.find_many(&ProductQuery::ByNameOrDescriptionStructured {
            name: name.to_string(),
            description: description.to_string(),
        })
        .await
    }

    async fn find_by_name_or_description_sql_named_param(
        &self,
        name: &str,
        description: &str,
    ) -> StoreResult<Vec<Product>> {
        self.find_many(&ProductQuery::ByNameOrDescriptionNative {
            name: name.to_string(),
            description: description.to_string(),
        })
        .await
    }

    async fn find_by_description(&self, description: &str) -> StoreResult<Option<Product>> {
        self.find_one(&ProductQuery::ByDescriptionNative {
            description: description.to_string(),
        })
        .await
    }

    // Catalog extensions below; the product repository interface has no
    // exact-price or whole-table name ordering lookups.

    async fn find_by_price(&self, price: Decimal) -> StoreResult<Vec<Product>> {
        self.find_many(&ProductQuery::ByPrice { price }).await
    }

    async fn find_all_order_by_name_desc(&self) -> StoreResult<Vec<Product>> {
        self.find_many(&ProductQuery::AllOrderByNameDesc).await
    }

    async fn find_all_order_by_name_asc(&self) -> StoreResult<Vec<Product>> {
        self.find_many(&ProductQuery::AllOrderByNameAscNative).await
    }

    async fn search_products(&self, query: &str) -> StoreResult<Vec<Product>> {
        self.find_many(&ProductQuery::Search {
            query: query.to_string(),
        })
        .await
    }

    async fn search_products_sql(&self, query: &str) -> StoreResult<Vec<Product>> {
        self.find_many(&ProductQuery::SearchNative {
            query: query.to_string(),
        })
        .await
    }
}

impl<T: ProductRepository + ?Sized> ProductRepositoryExt for T {}
