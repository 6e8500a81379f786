//! The product entity
//!
//! `Product` is one row of the `products` table. `NewProduct` carries the
//! caller-supplied attributes of a row that does not exist yet; the store
//! assigns the identity and both timestamps on insert.

use chrono::{NaiveDateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::identifiers::ProductId;

/// A stored product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub active: bool,
    pub image_url: Option<String>,
    pub date_created: NaiveDateTime,
    pub last_updated: NaiveDateTime,
}

impl Product {
    /// Materializes a new row from its insert payload
    ///
    /// Both timestamps start at `now`.
    pub fn from_new(id: ProductId, new: NewProduct, now: NaiveDateTime) -> Self {
        Self {
            id,
            sku: new.sku,
            name: new.name,
            description: new.description,
            price: new.price,
            active: new.active,
            image_url: new.image_url,
            date_created: now,
            last_updated: now,
        }
    }

    /// Returns the caller-owned attributes of this product
    pub fn to_new(&self) -> NewProduct {
        NewProduct {
            sku: self.sku.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            active: self.active,
            image_url: self.image_url.clone(),
        }
    }

    /// Replaces the caller-owned attributes of this row with `changes`
    ///
    /// `id` and `date_created` are left alone; `last_updated` moves to `now`
    /// unless that would take it backwards.
    pub fn apply_update(&mut self, changes: NewProduct, now: NaiveDateTime) {
        self.sku = changes.sku;
        self.name = changes.name;
        self.description = changes.description;
        self.price = changes.price;
        self.active = changes.active;
        self.image_url = changes.image_url;
        self.last_updated = self.last_updated.max(now);
    }
}

/// Attributes of a product that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub sku: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub active: bool,
    pub image_url: Option<String>,
}

impl NewProduct {
    /// Creates an inactive product with only its SKU set
    pub fn new(sku: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// Current UTC wall-clock time at the precision of a `TIMESTAMP` column
pub fn store_timestamp() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}
