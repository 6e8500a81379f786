//! PostgreSQL product repository
//!
//! `PostgresProductRepository` implements the `ProductRepository` port on top
//! of a `PgPool`. Statements come from `crate::statements`; rows are decoded
//! into `ProductRow` and converted to `Product`. Every call borrows a pooled
//! connection for its own duration, so the repository is freely shareable
//! across tasks.
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_core::{ProductRepository, ProductRepositoryExt};
//! use infra_db::PostgresProductRepository;
//! use std::sync::Arc;
//!
//! let repo: Arc<dyn ProductRepository> = Arc::new(PostgresProductRepository::new(pool));
//! let widget = repo.find_by_name("Widget").await?;
//! ```

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres};
use tracing::{debug, instrument, warn};

use catalog_core::product::store_timestamp;
use catalog_core::{
    NewProduct, Page, PageRequest, Product, ProductId, ProductQuery, ProductRepository, Sort,
    StoreError, StoreResult,
};

use crate::error::DatabaseError;
use crate::statements::{self, Param, Statement};

/// Binds every statement parameter, in order, onto a sqlx query builder
macro_rules! bind_params {
    ($query:expr, $params:expr) => {{
        let mut query = $query;
        for param in $params {
            query = match param {
                Param::BigInt(value) => query.bind(value),
                Param::Bool(value) => query.bind(value),
                Param::Text(value) => query.bind(value),
                Param::NullableText(value) => query.bind(value),
                Param::Decimal(value) => query.bind(value),
                Param::NullableDecimal(value) => query.bind(value),
                Param::Timestamp(value) => query.bind(value),
            };
        }
        query
    }};
}

/// Database row for `ecommercespringdatajpa.products`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub sku: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub active: bool,
    pub image_url: Option<String>,
    pub date_created: NaiveDateTime,
    pub last_updated: NaiveDateTime,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::new(row.id),
            sku: row.sku,
            name: row.name,
            description: row.description,
            price: row.price,
            active: row.active,
            image_url: row.image_url,
            date_created: row.date_created,
            last_updated: row.last_updated,
        }
    }
}

/// PostgreSQL-backed implementation of `ProductRepository`
#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    /// Creates a new repository with the given connection pool
    ///
    /// # Arguments
    ///
    /// * `pool` - The PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_rows(&self, statement: Statement) -> Result<Vec<Product>, DatabaseError> {
        debug!(sql = %statement.sql, params = statement.params.len(), "Executing statement");
        let Statement { sql, params } = statement;

        let rows = bind_params!(sqlx::query_as::<Postgres, ProductRow>(&sql), params)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn fetch_optional_row(
        &self,
        statement: Statement,
    ) -> Result<Option<Product>, DatabaseError> {
        debug!(sql = %statement.sql, "Executing statement");
        let Statement { sql, params } = statement;

        let row = bind_params!(sqlx::query_as::<Postgres, ProductRow>(&sql), params)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    async fn execute(&self, statement: Statement) -> Result<u64, DatabaseError> {
        debug!(sql = %statement.sql, "Executing statement");
        let Statement { sql, params } = statement;

        let result = bind_params!(sqlx::query::<Postgres>(&sql), params)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn log_write_failure(operation: &str, error: DatabaseError) -> StoreError {
    if error.is_constraint_violation() {
        warn!(operation, error = %error, "Write rejected by constraint");
    }
    error.into()
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    #[instrument(skip(self, product), fields(sku = %product.sku))]
    async fn insert(&self, product: NewProduct) -> StoreResult<Product> {
        let statement = statements::render_insert(&product, store_timestamp());
        let stored = self
            .fetch_optional_row(statement)
            .await
            .map_err(|e| log_write_failure("insert", e))?;

        let stored = stored.ok_or_else(|| StoreError::Query("INSERT returned no row".into()))?;
        debug!(id = %stored.id, "Product inserted");
        Ok(stored)
    }

    #[instrument(skip(self, products), fields(count = products.len()))]
    async fn insert_all(&self, products: Vec<NewProduct>) -> StoreResult<Vec<Product>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        let now = store_timestamp();
        let mut stored = Vec::with_capacity(products.len());
        for product in &products {
            let Statement { sql, params } = statements::render_insert(product, now);
            let row = bind_params!(sqlx::query_as::<Postgres, ProductRow>(&sql), params)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| log_write_failure("insert_all", e.into()))?;
            stored.push(Product::from(row));
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        debug!(count = stored.len(), "Products inserted");
        Ok(stored)
    }

    #[instrument(skip(self, product), fields(id = %product.id))]
    async fn update(&self, product: &Product) -> StoreResult<Product> {
        let statement = statements::render_update(product, store_timestamp());
        self.fetch_optional_row(statement)
            .await
            .map_err(|e| log_write_failure("update", e))?
            .ok_or_else(|| StoreError::not_found("Product", product.id))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self
            .fetch_optional_row(statements::render_find_by_id(id.value()))
            .await?)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> StoreResult<Vec<Product>> {
        Ok(self
            .fetch_rows(statements::render_find_all(&Sort::unsorted()))
            .await?)
    }

    #[instrument(skip(self))]
    async fn find_all_sorted(&self, sort: Sort) -> StoreResult<Vec<Product>> {
        Ok(self.fetch_rows(statements::render_find_all(&sort)).await?)
    }

    #[instrument(skip(self), fields(page = request.page, size = request.size))]
    async fn find_page(&self, request: PageRequest) -> StoreResult<Page<Product>> {
        let total = self.count().await?;
        let content = self
            .fetch_rows(statements::render_find_page(&request))
            .await?;
        Ok(Page::new(content, &request, total))
    }

    #[instrument(skip(self))]
    async fn count(&self) -> StoreResult<u64> {
        let Statement { sql, .. } = statements::render_count();
        let count = sqlx::query_scalar::<Postgres, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn exists_by_id(&self, id: ProductId) -> StoreResult<bool> {
        let Statement { sql, params } = statements::render_exists(id.value());
        let exists = bind_params!(sqlx::query_scalar::<Postgres, bool>(&sql), params)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: ProductId) -> StoreResult<bool> {
        let affected = self.execute(statements::render_delete(id.value())).await?;
        debug!(affected, "Product delete");
        Ok(affected > 0)
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> StoreResult<u64> {
        Ok(self.execute(statements::render_delete_all()).await?)
    }

    #[instrument(skip(self, query), fields(lookup = query.name(), origin = ?query.origin()))]
    async fn find_one(&self, query: &ProductQuery) -> StoreResult<Option<Product>> {
        let mut rows = self.fetch_rows(statements::render_query(query)).await?;
        if rows.len() > 1 {
            warn!(found = rows.len(), "Single-result lookup matched several rows");
            return Err(DatabaseError::NonUniqueResult(rows.len()).into());
        }
        Ok(rows.pop())
    }

    #[instrument(skip(self, query), fields(lookup = query.name(), origin = ?query.origin()))]
    async fn find_many(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
        let rows = self.fetch_rows(statements::render_query(query)).await?;
        debug!(found = rows.len(), "Lookup complete");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_converts_to_product() {
        let created = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_micro_opt(9, 30, 0, 125)
            .unwrap();
        let row = ProductRow {
            id: 7,
            sku: "SKU-7".to_string(),
            name: Some("Widget".to_string()),
            description: None,
            price: Some(dec!(12.50)),
            active: true,
            image_url: None,
            date_created: created,
            last_updated: created,
        };

        let product = Product::from(row);
        assert_eq!(product.id, ProductId::new(7));
        assert_eq!(product.name.as_deref(), Some("Widget"));
        assert_eq!(product.price, Some(dec!(12.50)));
        assert_eq!(product.date_created, created);
    }

    #[test]
    fn test_constraint_failure_keeps_its_kind() {
        let error = log_write_failure(
            "insert",
            DatabaseError::DuplicateEntry {
                constraint: "sku_unique".to_string(),
                message: "duplicate key".to_string(),
            },
        );
        assert!(error.is_unique_violation());
    }
}
