//! Test Data Builders
//!
//! Provides a builder for product test data with sensible defaults. Tests
//! specify only the relevant fields; the SKU defaults to a unique value so
//! built products never collide on the `sku_unique` constraint.

use std::sync::atomic::{AtomicU64, Ordering};

use catalog_core::NewProduct;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

static NEXT_SKU: AtomicU64 = AtomicU64::new(1);

/// Returns a SKU not handed out before in this process
pub fn unique_sku() -> String {
    format!("SKU-TEST-{:06}", NEXT_SKU.fetch_add(1, Ordering::Relaxed))
}

/// Builder for constructing test product data
pub struct TestProductBuilder {
    sku: String,
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    active: bool,
    image_url: Option<String>,
}

impl Default for TestProductBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProductBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            sku: unique_sku(),
            name: Some("Test Product".to_string()),
            description: Some("Product created by a test".to_string()),
            price: Some(dec!(9.99)),
            active: true,
            image_url: None,
        }
    }

    /// Sets the SKU
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = sku.into();
        self
    }

    /// Sets the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the price
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Sets the active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Sets the image URL
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Clears name, description and price
    pub fn without_details(mut self) -> Self {
        self.name = None;
        self.description = None;
        self.price = None;
        self
    }

    /// Builds the insert payload
    pub fn build(self) -> NewProduct {
        NewProduct {
            sku: self.sku,
            name: self.name,
            description: self.description,
            price: self.price,
            active: self.active,
            image_url: self.image_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_skus_differ() {
        let a = TestProductBuilder::new().build();
        let b = TestProductBuilder::new().build();
        assert_ne!(a.sku, b.sku);
    }

    #[test]
    fn test_without_details() {
        let product = TestProductBuilder::new()
            .with_name("ignored")
            .without_details()
            .build();
        assert!(product.name.is_none());
        assert!(product.description.is_none());
        assert!(product.price.is_none());
    }
}
