//! Custom Test Assertions
//!
//! Provides assertion helpers for lookup results that give more meaningful
//! failure messages than comparing whole `Product` values.

use catalog_core::{NewProduct, Product};

/// Names of the given products, in result order (`None` names render as "")
pub fn names(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|p| p.name.clone().unwrap_or_default())
        .collect()
}

/// Asserts that a stored product carries the attributes it was inserted with
///
/// # Panics
///
/// Panics naming the first attribute that differs
pub fn assert_stored_as(stored: &Product, inserted: &NewProduct) {
    assert_eq!(stored.sku, inserted.sku, "sku differs");
    assert_eq!(stored.name, inserted.name, "name differs for {}", stored.sku);
    assert_eq!(
        stored.description, inserted.description,
        "description differs for {}",
        stored.sku
    );
    assert_eq!(stored.price, inserted.price, "price differs for {}", stored.sku);
    assert_eq!(stored.active, inserted.active, "active differs for {}", stored.sku);
    assert_eq!(
        stored.image_url, inserted.image_url,
        "image_url differs for {}",
        stored.sku
    );
}

/// Asserts that a result lists exactly the given names, in order
pub fn assert_names(products: &[Product], expected: &[&str]) {
    let actual = names(products);
    assert_eq!(
        actual, expected,
        "Unexpected result order: actual={:?}, expected={:?}",
        actual, expected
    );
}

/// Asserts that a result is in strictly increasing id order
pub fn assert_id_order(products: &[Product]) {
    assert!(
        products.windows(2).all(|w| w[0].id < w[1].id),
        "Products not in id order: {:?}",
        products.iter().map(|p| p.id.value()).collect::<Vec<_>>()
    );
}

/// Asserts the timestamp invariant of a stored product
pub fn assert_timestamps_ordered(product: &Product) {
    assert!(
        product.date_created <= product.last_updated,
        "date_created {} is after last_updated {} for {}",
        product.date_created,
        product.last_updated,
        product.sku
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::product::store_timestamp;
    use catalog_core::ProductId;

    #[test]
    fn test_stored_as_accepts_round_trip() {
        let inserted = crate::fixtures::ProductFixtures::widget();
        let stored = Product::from_new(ProductId::new(1), inserted.clone(), store_timestamp());
        assert_stored_as(&stored, &inserted);
        assert_timestamps_ordered(&stored);
    }

    #[test]
    #[should_panic(expected = "Unexpected result order")]
    fn test_assert_names_reports_order() {
        let now = store_timestamp();
        let a = Product::from_new(ProductId::new(1), NewProduct::new("A").with_name("a"), now);
        let b = Product::from_new(ProductId::new(2), NewProduct::new("B").with_name("b"), now);
        assert_names(&[b, a], &["a", "b"]);
    }
}
