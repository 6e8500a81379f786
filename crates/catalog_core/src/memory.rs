//! In-memory product store
//!
//! `InMemoryProductRepository` keeps the table in a `BTreeMap` keyed by id and
//! follows the database adapter's write rules. Ids come from a monotonically
//! increasing sequence and `sku` is unique (reported as the `sku_unique`
//! constraint). Values are fitted to their `PRODUCT_MAPPING` column types, so
//! over-long text is rejected and prices are rounded to the column scale.
//! Timestamps are stamped by the store, and every lookup is evaluated through
//! its `ProductQuery`.
//!
//! Checks run in the order PostgreSQL reports them: a missing row first, then
//! column limits, then the unique constraint.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::identifiers::ProductId;
use crate::mapping::PRODUCT_MAPPING;
use crate::ports::ProductRepository;
use crate::product::{store_timestamp, NewProduct, Product};
use crate::query::{Page, PageRequest, ProductQuery, Sort};

#[derive(Debug)]
struct Table {
    rows: BTreeMap<ProductId, Product>,
    next_id: i64,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Table {
    fn sku_taken(&self, sku: &str, except: Option<ProductId>) -> bool {
        self.rows
            .values()
            .any(|row| row.sku == sku && Some(row.id) != except)
    }

    fn insert(&mut self, product: NewProduct) -> Product {
        let id = ProductId::new(self.next_id);
        self.next_id += 1;
        let row = Product::from_new(id, product, store_timestamp());
        self.rows.insert(id, row.clone());
        row
    }

    fn select(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
        let mut matched = Vec::new();
        for row in self.rows.values() {
            if query.matches(row)? {
                matched.push(row.clone());
            }
        }
        let sort = query.sort();
        matched.sort_by(|a, b| sort.compare(a, b));
        if let Some(limit) = query.limit() {
            matched.truncate(limit as usize);
        }
        Ok(matched)
    }

    fn sorted(&self, sort: &Sort) -> Vec<Product> {
        let mut rows: Vec<Product> = self.rows.values().cloned().collect();
        rows.sort_by(|a, b| sort.compare(a, b));
        rows
    }
}

/// Fits every attribute of `product` to its column
fn conform(product: NewProduct) -> StoreResult<NewProduct> {
    let fit_text = |field: &str, value: String| match PRODUCT_MAPPING.column(field) {
        Some(column) => column.fit_text(value),
        None => Ok(value),
    };
    let fit_optional = |field: &str, value: Option<String>| {
        value.map(|v| fit_text(field, v)).transpose()
    };
    let price = match PRODUCT_MAPPING.column("price") {
        Some(column) => product.price.map(|p| column.fit_decimal(p)),
        None => product.price,
    };

    Ok(NewProduct {
        sku: fit_text("sku", product.sku)?,
        name: fit_optional("name", product.name)?,
        description: fit_optional("description", product.description)?,
        price,
        active: product.active,
        image_url: fit_optional("imageUrl", product.image_url)?,
    })
}

fn duplicate_sku(sku: &str) -> StoreError {
    let constraint = PRODUCT_MAPPING
        .unique_constraint_on("sku")
        .map_or("sku", |u| u.name);
    StoreError::unique_violation(constraint, format!("Key (sku)=({}) already exists", sku))
}

/// Product store held in process memory
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    table: RwLock<Table>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given products
    pub async fn with_products(products: Vec<NewProduct>) -> StoreResult<Self> {
        let repo = Self::new();
        repo.insert_all(products).await?;
        Ok(repo)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, product: NewProduct) -> StoreResult<Product> {
        let product = conform(product)?;
        let mut table = self.table.write().await;
        if table.sku_taken(&product.sku, None) {
            return Err(duplicate_sku(&product.sku));
        }
        let row = table.insert(product);
        debug!(id = %row.id, sku = %row.sku, "Inserted product");
        Ok(row)
    }

    async fn insert_all(&self, products: Vec<NewProduct>) -> StoreResult<Vec<Product>> {
        let products = products
            .into_iter()
            .map(conform)
            .collect::<StoreResult<Vec<_>>>()?;
        let mut table = self.table.write().await;

        let mut batch = HashSet::with_capacity(products.len());
        for product in &products {
            if table.sku_taken(&product.sku, None) || !batch.insert(product.sku.as_str()) {
                return Err(duplicate_sku(&product.sku));
            }
        }

        let rows: Vec<Product> = products.into_iter().map(|p| table.insert(p)).collect();
        debug!(count = rows.len(), "Inserted product batch");
        Ok(rows)
    }

    async fn update(&self, product: &Product) -> StoreResult<Product> {
        let missing = || StoreError::not_found(PRODUCT_MAPPING.entity, product.id);
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&product.id) {
            return Err(missing());
        }

        let changes = conform(product.to_new())?;
        if table.sku_taken(&changes.sku, Some(product.id)) {
            return Err(duplicate_sku(&changes.sku));
        }

        let row = table.rows.get_mut(&product.id).ok_or_else(missing)?;
        row.apply_update(changes, store_timestamp());
        Ok(row.clone())
    }

    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<Product>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find_all_sorted(&self, sort: Sort) -> StoreResult<Vec<Product>> {
        Ok(self.table.read().await.sorted(&sort))
    }

    async fn find_page(&self, request: PageRequest) -> StoreResult<Page<Product>> {
        let table = self.table.read().await;
        let total = table.rows.len() as u64;
        let content = table
            .sorted(&request.sort)
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .collect();
        Ok(Page::new(content, &request, total))
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.table.read().await.rows.len() as u64)
    }

    async fn exists_by_id(&self, id: ProductId) -> StoreResult<bool> {
        Ok(self.table.read().await.rows.contains_key(&id))
    }

    async fn delete_by_id(&self, id: ProductId) -> StoreResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut table = self.table.write().await;
        let removed = table.rows.len() as u64;
        table.rows.clear();
        Ok(removed)
    }

    async fn find_one(&self, query: &ProductQuery) -> StoreResult<Option<Product>> {
        let mut matched = self.table.read().await.select(query)?;
        match matched.len() {
            0 | 1 => Ok(matched.pop()),
            found => Err(StoreError::NonUniqueResult { found }),
        }
    }

    async fn find_many(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
        let rows = self.table.read().await.select(query)?;
        debug!(lookup = query.name(), rows = rows.len(), "Evaluated lookup");
        Ok(rows)
    }
}
