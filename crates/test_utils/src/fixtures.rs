//! Pre-built Test Fixtures
//!
//! Provides ready-to-use products for repository tests. The set is chosen so
//! that every lookup has both matching and non-matching rows: names sort as
//! Bolt < Gear < Sprocket < Widget, two descriptions contain "widget", and
//! prices are distinct.

use chrono::{NaiveDate, NaiveDateTime};
use catalog_core::NewProduct;
use rust_decimal_macros::dec;

/// Fixture for product test data
pub struct ProductFixtures;

impl ProductFixtures {
    /// Active widget priced at 15.00
    pub fn widget() -> NewProduct {
        NewProduct::new("SKU-WIDGET")
            .with_name("Widget")
            .with_description("A standard widget")
            .with_price(dec!(15.00))
            .with_active(true)
            .with_image_url("https://img.example.com/widget.png")
    }

    /// Gear priced at 10.00 whose description mentions a widget
    pub fn gear() -> NewProduct {
        NewProduct::new("SKU-GEAR")
            .with_name("Gear")
            .with_description("A small widget")
            .with_price(dec!(10.00))
    }

    /// Sprocket priced at 20.00
    pub fn sprocket() -> NewProduct {
        NewProduct::new("SKU-SPROCKET")
            .with_name("Sprocket")
            .with_description("Toothed wheel")
            .with_price(dec!(20.00))
            .with_active(true)
    }

    /// Bolt priced at 25.50
    pub fn bolt() -> NewProduct {
        NewProduct::new("SKU-BOLT")
            .with_name("Bolt")
            .with_description("Hex bolt")
            .with_price(dec!(25.50))
    }

    /// Product with only the required SKU set
    pub fn bare() -> NewProduct {
        NewProduct::new("SKU-BARE")
    }

    /// The four named products, in insertion order
    pub fn catalog() -> Vec<NewProduct> {
        vec![Self::widget(), Self::gear(), Self::sprocket(), Self::bolt()]
    }
}

/// Fixture for timestamps used in range lookups
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Well before any product the tests create
    pub fn long_ago() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    /// Well after any product the tests create
    pub fn far_future() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2999, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap()
    }
}
