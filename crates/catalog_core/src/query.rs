//! Query specifications
//!
//! Every repository lookup is one `ProductQuery` variant carrying its
//! arguments. A variant knows its cardinality, ordering and row limit, and can
//! be evaluated against a `Product` in memory. Store adapters render the same
//! variant into a parameterized statement, so both backends share one
//! definition of what each lookup means.
//!
//! # Matching rules
//!
//! - Equality against an absent column never matches
//! - `Between` bounds are inclusive at both ends
//! - `Containing` escapes its argument before wrapping it in `%`
//! - `Like` uses its argument as a raw pattern
//! - `Search` matches its token case-insensitively without escaping
//! - Rows come back in ascending id order unless the lookup orders them

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pattern::{self, PatternError};
use crate::product::Product;

/// Where the query text of a lookup comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrigin {
    /// Filter implied by the lookup name, rendered from the mapping
    Derived,
    /// Query written against the entity model
    Structured,
    /// Query written in the store's own SQL dialect
    Native,
}

/// How many rows a lookup may return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// At most one row; more is an error
    Single,
    /// Any number of rows
    Many,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Sortable product attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductField {
    Id,
    Sku,
    Name,
    Description,
    Price,
    Active,
    ImageUrl,
    DateCreated,
    LastUpdated,
}

impl ProductField {
    /// Entity field name, as used by the schema mapping
    pub fn field_name(&self) -> &'static str {
        match self {
            ProductField::Id => "id",
            ProductField::Sku => "sku",
            ProductField::Name => "name",
            ProductField::Description => "description",
            ProductField::Price => "price",
            ProductField::Active => "active",
            ProductField::ImageUrl => "imageUrl",
            ProductField::DateCreated => "dateCreated",
            ProductField::LastUpdated => "lastUpdated",
        }
    }

    /// Whether the column holds text (and so needs a fixed collation to sort)
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            ProductField::Sku | ProductField::Name | ProductField::Description | ProductField::ImageUrl
        )
    }

    /// Compares two products on this field, absent values sorting last
    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            ProductField::Id => a.id.cmp(&b.id),
            ProductField::Sku => a.sku.cmp(&b.sku),
            ProductField::Name => nulls_last(a.name.as_ref(), b.name.as_ref()),
            ProductField::Description => {
                nulls_last(a.description.as_ref(), b.description.as_ref())
            }
            ProductField::Price => nulls_last(a.price.as_ref(), b.price.as_ref()),
            ProductField::Active => a.active.cmp(&b.active),
            ProductField::ImageUrl => nulls_last(a.image_url.as_ref(), b.image_url.as_ref()),
            ProductField::DateCreated => a.date_created.cmp(&b.date_created),
            ProductField::LastUpdated => a.last_updated.cmp(&b.last_updated),
        }
    }
}

// NULL compares greater than every value, as in PostgreSQL.
fn nulls_last<T: Ord>(a: Option<&T>, b: Option<&T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

/// Ordering of a result set
///
/// Ties left by the listed orders are always broken by ascending id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    orders: Vec<(ProductField, Direction)>,
}

impl Sort {
    /// Id order only
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(field: ProductField, direction: Direction) -> Self {
        Self {
            orders: vec![(field, direction)],
        }
    }

    pub fn asc(field: ProductField) -> Self {
        Self::by(field, Direction::Asc)
    }

    pub fn desc(field: ProductField) -> Self {
        Self::by(field, Direction::Desc)
    }

    /// Adds a secondary order
    pub fn and(mut self, field: ProductField, direction: Direction) -> Self {
        self.orders.push((field, direction));
        self
    }

    pub fn orders(&self) -> &[(ProductField, Direction)] {
        &self.orders
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        self.orders
            .iter()
            .map(|(field, direction)| match direction {
                Direction::Asc => field.compare(a, b),
                Direction::Desc => field.compare(a, b).reverse(),
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }
}

/// Zero-based page of a sorted result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    #[serde(default)]
    pub sort: Sort,
}

impl PageRequest {
    /// Largest page size accepted
    pub const MAX_SIZE: u32 = 1_000;

    pub fn of(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: Sort::unsorted(),
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    /// Page size clamped to `1..=MAX_SIZE`
    pub fn limit(&self) -> u32 {
        self.size.clamp(1, Self::MAX_SIZE)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.limit())
    }
}

/// One page of results plus the size of the whole result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = request.limit();
        Self {
            content,
            number: request.page,
            size,
            total_elements,
            total_pages: total_elements.div_ceil(u64::from(size)),
        }
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.number) + 1 < self.total_pages
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }
}

/// One named product lookup with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductQuery {
    /// `findByName`
    ByName { name: String },
    /// `findByNameOrDescription`
    ByNameOrDescription { name: String, description: String },
    /// `findByNameAndDescriptionAndPrice`
    ByNameAndDescriptionAndPrice {
        name: String,
        description: String,
        price: Decimal,
    },
    /// `findByPriceGreaterThan`
    ByPriceGreaterThan { price: Decimal },
    /// `findByNameContaining`
    ByNameContaining { fragment: String },
    /// `findByNameLike`
    ByNameLike { pattern: String },
    /// `findByPriceBetween`
    ByPriceBetween { low: Decimal, high: Decimal },
    /// `findByDateCreatedBetween`
    ByDateCreatedBetween {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// `findFirst3ByOrderByNameAsc`
    First3ByOrderByNameAsc,
    /// `findByNameOrDescriptionJPQLNamedParam`
    ByNameOrDescriptionStructured { name: String, description: String },
    /// `findByNameOrDescriptionSQLNamedParam`
    ByNameOrDescriptionNative { name: String, description: String },
    /// `findByDescription`
    ByDescriptionNative { description: String },
    // Catalog extensions, not part of the product repository interface.
    /// `findByPrice`, exact price match
    ByPrice { price: Decimal },
    /// `findAllOrderByNameDesc`
    AllOrderByNameDesc,
    /// `findAllOrderByNameASC`
    AllOrderByNameAscNative,
    /// `searchProducts`
    Search { query: String },
    /// `searchProductsSQL`
    SearchNative { query: String },
}

impl ProductQuery {
    /// Name of the lookup, for logs
    pub fn name(&self) -> &'static str {
        match self {
            ProductQuery::ByName { .. } => "findByName",
            ProductQuery::ByNameOrDescription { .. } => "findByNameOrDescription",
            ProductQuery::ByNameAndDescriptionAndPrice { .. } => "findByNameAndDescriptionAndPrice",
            ProductQuery::ByPriceGreaterThan { .. } => "findByPriceGreaterThan",
            ProductQuery::ByNameContaining { .. } => "findByNameContaining",
            ProductQuery::ByNameLike { .. } => "findByNameLike",
            ProductQuery::ByPriceBetween { .. } => "findByPriceBetween",
            ProductQuery::ByDateCreatedBetween { .. } => "findByDateCreatedBetween",
            ProductQuery::First3ByOrderByNameAsc => "findFirst3ByOrderByNameAsc",
            ProductQuery::ByNameOrDescriptionStructured { .. } => {
                "findByNameOrDescriptionJPQLNamedParam"
            }
            ProductQuery::ByNameOrDescriptionNative { .. } => "findByNameOrDescriptionSQLNamedParam",
            ProductQuery::ByDescriptionNative { .. } => "findByDescription",
            ProductQuery::ByPrice { .. } => "findByPrice",
            ProductQuery::AllOrderByNameDesc => "findAllOrderByNameDesc",
            ProductQuery::AllOrderByNameAscNative => "findAllOrderByNameASC",
            ProductQuery::Search { .. } => "searchProducts",
            ProductQuery::SearchNative { .. } => "searchProductsSQL",
        }
    }

    pub fn origin(&self) -> QueryOrigin {
        match self {
            ProductQuery::ByNameOrDescriptionStructured { .. }
            | ProductQuery::ByPrice { .. }
            | ProductQuery::AllOrderByNameDesc
            | ProductQuery::Search { .. } => QueryOrigin::Structured,
            ProductQuery::ByNameOrDescriptionNative { .. }
            | ProductQuery::ByDescriptionNative { .. }
            | ProductQuery::AllOrderByNameAscNative
            | ProductQuery::SearchNative { .. } => QueryOrigin::Native,
            _ => QueryOrigin::Derived,
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            ProductQuery::ByName { .. } | ProductQuery::ByDescriptionNative { .. } => {
                Cardinality::Single
            }
            _ => Cardinality::Many,
        }
    }

    /// Maximum number of rows, if the lookup is bounded
    pub fn limit(&self) -> Option<u32> {
        match self {
            ProductQuery::First3ByOrderByNameAsc => Some(3),
            _ => None,
        }
    }

    pub fn sort(&self) -> Sort {
        match self {
            ProductQuery::First3ByOrderByNameAsc | ProductQuery::AllOrderByNameAscNative => {
                Sort::asc(ProductField::Name)
            }
            ProductQuery::AllOrderByNameDesc => Sort::desc(ProductField::Name),
            _ => Sort::unsorted(),
        }
    }

    /// Evaluates the lookup's filter against one product
    ///
    /// Fails only when a pattern argument is malformed.
    pub fn matches(&self, product: &Product) -> Result<bool, PatternError> {
        let name = product.name.as_deref();
        let description = product.description.as_deref();

        let matched = match self {
            ProductQuery::ByName { name: wanted } => name == Some(wanted.as_str()),
            ProductQuery::ByNameOrDescription {
                name: wanted_name,
                description: wanted_description,
            }
            | ProductQuery::ByNameOrDescriptionStructured {
                name: wanted_name,
                description: wanted_description,
            }
            | ProductQuery::ByNameOrDescriptionNative {
                name: wanted_name,
                description: wanted_description,
            } => {
                name == Some(wanted_name.as_str())
                    || description == Some(wanted_description.as_str())
            }
            ProductQuery::ByNameAndDescriptionAndPrice {
                name: wanted_name,
                description: wanted_description,
                price,
            } => {
                name == Some(wanted_name.as_str())
                    && description == Some(wanted_description.as_str())
                    && product.price == Some(*price)
            }
            ProductQuery::ByPriceGreaterThan { price } => {
                product.price.is_some_and(|p| p > *price)
            }
            ProductQuery::ByNameContaining { fragment } => match name {
                Some(name) => pattern::like(&pattern::containing(fragment), name)?,
                None => false,
            },
            ProductQuery::ByNameLike { pattern: like } => match name {
                Some(name) => pattern::like(like, name)?,
                None => false,
            },
            ProductQuery::ByPriceBetween { low, high } => {
                product.price.is_some_and(|p| *low <= p && p <= *high)
            }
            ProductQuery::ByDateCreatedBetween { start, end } => {
                *start <= product.date_created && product.date_created <= *end
            }
            ProductQuery::ByDescriptionNative {
                description: wanted,
            } => description == Some(wanted.as_str()),
            ProductQuery::ByPrice { price } => product.price == Some(*price),
            ProductQuery::First3ByOrderByNameAsc
            | ProductQuery::AllOrderByNameDesc
            | ProductQuery::AllOrderByNameAscNative => true,
            ProductQuery::Search { query } | ProductQuery::SearchNative { query } => {
                let token = search_pattern(query);
                let in_name = match name {
                    Some(name) => pattern::ilike(&token, name)?,
                    None => false,
                };
                in_name
                    || match description {
                        Some(description) => pattern::ilike(&token, description)?,
                        None => false,
                    }
            }
        };

        Ok(matched)
    }
}

/// Pattern used by the search lookups; the token keeps its wildcards
pub fn search_pattern(query: &str) -> String {
    format!("%{}%", query)
}
