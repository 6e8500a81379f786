//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating product data that the store
//! accepts: SKUs are non-empty, prices fit `NUMERIC(38, 2)`.

use catalog_core::NewProduct;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating prices with two decimal places (0.00 to 99999.99)
pub fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for generating SKUs
pub fn sku_strategy() -> impl Strategy<Value = String> {
    "SKU-[A-Z0-9]{4,12}"
}

/// Strategy for generating product names (ASCII, may contain spaces)
pub fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,30}"
}

/// Strategy for generating complete insert payloads
pub fn new_product_strategy() -> impl Strategy<Value = NewProduct> {
    (
        sku_strategy(),
        proptest::option::of(name_strategy()),
        proptest::option::of("[a-z ]{0,60}"),
        proptest::option::of(price_strategy()),
        any::<bool>(),
    )
        .prop_map(|(sku, name, description, price, active)| NewProduct {
            sku,
            name,
            description,
            price,
            active,
            image_url: None,
        })
}

/// Strategy for generating batches of products with distinct SKUs
pub fn catalog_strategy(max_len: usize) -> impl Strategy<Value = Vec<NewProduct>> {
    proptest::collection::vec(new_product_strategy(), 0..=max_len).prop_map(|products| {
        products
            .into_iter()
            .enumerate()
            .map(|(i, mut product)| {
                product.sku = format!("{}-{}", product.sku, i);
                product
            })
            .collect()
    })
}
