//! Statement rendering
//!
//! Turns repository operations into parameterized PostgreSQL statements.
//! Derived and structured lookups are assembled from the schema mapping; native
//! lookups are fixed SQL text written against the physical table. Rendering is
//! pure, so the produced SQL can be inspected without a database.
//!
//! Text columns are ordered with `COLLATE "C"` so that sort order is byte
//! order regardless of the database locale.

use catalog_core::pattern;
use catalog_core::query::search_pattern;
use catalog_core::{
    Direction, EntityMapping, NewProduct, PageRequest, Product, ProductQuery, Sort,
    PRODUCT_MAPPING,
};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

const FIND_BY_NAME_OR_DESCRIPTION_SQL: &str = "SELECT * FROM ecommercespringdatajpa.products p \
     WHERE p.name = $1 OR p.description = $2 ORDER BY p.id";

const FIND_BY_DESCRIPTION_SQL: &str =
    "SELECT * FROM ecommercespringdatajpa.products p WHERE p.description = $1 ORDER BY p.id";

const FIND_ALL_ORDER_BY_NAME_ASC_SQL: &str =
    "SELECT * FROM ecommercespringdatajpa.products p ORDER BY p.name COLLATE \"C\" ASC, p.id ASC";

const SEARCH_PRODUCTS_SQL: &str = "SELECT * FROM ecommercespringdatajpa.products p \
     WHERE p.name ILIKE CONCAT('%', $1, '%') OR p.description ILIKE CONCAT('%', $1, '%') \
     ORDER BY p.id";

/// A value bound to a statement placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    BigInt(i64),
    Bool(bool),
    Text(String),
    NullableText(Option<String>),
    Decimal(Decimal),
    NullableDecimal(Option<Decimal>),
    Timestamp(NaiveDateTime),
}

/// SQL text plus its positional parameters (`$1` is `params[0]`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Param>,
}

impl Statement {
    fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    fn push(&mut self, fragment: &str) -> &mut Self {
        self.sql.push_str(fragment);
        self
    }

    /// Appends a new placeholder bound to `param`
    fn push_bind(&mut self, param: Param) -> &mut Self {
        self.params.push(param);
        let placeholder = format!("${}", self.params.len());
        self.sql.push_str(&placeholder);
        self
    }

    fn with_params(mut self, params: Vec<Param>) -> Self {
        self.params = params;
        self
    }
}

fn select_from(mapping: &EntityMapping) -> Statement {
    Statement::new(format!(
        "SELECT {} FROM {}",
        mapping.column_list(),
        mapping.qualified_table()
    ))
}

fn order_by(statement: &mut Statement, mapping: &EntityMapping, sort: &Sort) {
    statement.push(" ORDER BY ");
    for (field, direction) in sort.orders() {
        statement.push(mapping.column_name(field.field_name()));
        if field.is_text() {
            statement.push(" COLLATE \"C\"");
        }
        statement.push(" ").push(direction.as_sql()).push(", ");
    }
    statement
        .push(mapping.id_column)
        .push(" ")
        .push(Direction::Asc.as_sql());
}

/// Renders a lookup into its statement
pub fn render_query(query: &ProductQuery) -> Statement {
    let mapping = &PRODUCT_MAPPING;
    let name = mapping.column_name("name");
    let description = mapping.column_name("description");
    let price = mapping.column_name("price");

    let mut statement = match query {
        ProductQuery::ByNameOrDescriptionNative {
            name: wanted_name,
            description: wanted_description,
        } => {
            return Statement::new(FIND_BY_NAME_OR_DESCRIPTION_SQL).with_params(vec![
                Param::Text(wanted_name.clone()),
                Param::Text(wanted_description.clone()),
            ])
        }
        ProductQuery::ByDescriptionNative { description } => {
            return Statement::new(FIND_BY_DESCRIPTION_SQL)
                .with_params(vec![Param::Text(description.clone())])
        }
        ProductQuery::AllOrderByNameAscNative => {
            return Statement::new(FIND_ALL_ORDER_BY_NAME_ASC_SQL)
        }
        ProductQuery::SearchNative { query } => {
            return Statement::new(SEARCH_PRODUCTS_SQL).with_params(vec![Param::Text(query.clone())])
        }
        _ => select_from(mapping),
    };

    match query {
        ProductQuery::ByName { name: wanted } => {
            statement
                .push(" WHERE ")
                .push(name)
                .push(" = ")
                .push_bind(Param::Text(wanted.clone()));
        }
        ProductQuery::ByNameOrDescription {
            name: wanted_name,
            description: wanted_description,
        }
        | ProductQuery::ByNameOrDescriptionStructured {
            name: wanted_name,
            description: wanted_description,
        } => {
            statement
                .push(" WHERE ")
                .push(name)
                .push(" = ")
                .push_bind(Param::Text(wanted_name.clone()))
                .push(" OR ")
                .push(description)
                .push(" = ")
                .push_bind(Param::Text(wanted_description.clone()));
        }
        ProductQuery::ByNameAndDescriptionAndPrice {
            name: wanted_name,
            description: wanted_description,
            price: wanted_price,
        } => {
            statement
                .push(" WHERE ")
                .push(name)
                .push(" = ")
                .push_bind(Param::Text(wanted_name.clone()))
                .push(" AND ")
                .push(description)
                .push(" = ")
                .push_bind(Param::Text(wanted_description.clone()))
                .push(" AND ")
                .push(price)
                .push(" = ")
                .push_bind(Param::Decimal(*wanted_price));
        }
        ProductQuery::ByPriceGreaterThan { price: bound } => {
            statement
                .push(" WHERE ")
                .push(price)
                .push(" > ")
                .push_bind(Param::Decimal(*bound));
        }
        ProductQuery::ByNameContaining { fragment } => {
            statement
                .push(" WHERE ")
                .push(name)
                .push(" LIKE ")
                .push_bind(Param::Text(pattern::containing(fragment)))
                .push(" ESCAPE '\\'");
        }
        ProductQuery::ByNameLike { pattern: like } => {
            statement
                .push(" WHERE ")
                .push(name)
                .push(" LIKE ")
                .push_bind(Param::Text(like.clone()));
        }
        ProductQuery::ByPriceBetween { low, high } => {
            statement
                .push(" WHERE ")
                .push(price)
                .push(" BETWEEN ")
                .push_bind(Param::Decimal(*low))
                .push(" AND ")
                .push_bind(Param::Decimal(*high));
        }
        ProductQuery::ByDateCreatedBetween { start, end } => {
            statement
                .push(" WHERE ")
                .push(mapping.column_name("dateCreated"))
                .push(" BETWEEN ")
                .push_bind(Param::Timestamp(*start))
                .push(" AND ")
                .push_bind(Param::Timestamp(*end));
        }
        ProductQuery::ByPrice { price: wanted } => {
            statement
                .push(" WHERE ")
                .push(price)
                .push(" = ")
                .push_bind(Param::Decimal(*wanted));
        }
        ProductQuery::Search { query } => {
            statement
                .push(" WHERE LOWER(")
                .push(name)
                .push(") LIKE LOWER(")
                .push_bind(Param::Text(search_pattern(query)))
                .push(") OR LOWER(")
                .push(description)
                .push(") LIKE LOWER($1)");
        }
        _ => {}
    }

    order_by(&mut statement, mapping, &query.sort());
    if let Some(limit) = query.limit() {
        statement.push(" LIMIT ").push_bind(Param::BigInt(i64::from(limit)));
    }
    statement
}

/// `SELECT` of one row by primary key
pub fn render_find_by_id(id: i64) -> Statement {
    let mapping = &PRODUCT_MAPPING;
    let mut statement = select_from(mapping);
    statement
        .push(" WHERE ")
        .push(mapping.id_column)
        .push(" = ")
        .push_bind(Param::BigInt(id));
    statement
}

/// `SELECT` of every row in the given order
pub fn render_find_all(sort: &Sort) -> Statement {
    let mapping = &PRODUCT_MAPPING;
    let mut statement = select_from(mapping);
    order_by(&mut statement, mapping, sort);
    statement
}

/// `SELECT` of one page of rows
pub fn render_find_page(request: &PageRequest) -> Statement {
    let mut statement = render_find_all(&request.sort);
    statement
        .push(" LIMIT ")
        .push_bind(Param::BigInt(i64::from(request.limit())))
        .push(" OFFSET ")
        .push_bind(Param::BigInt(i64::try_from(request.offset()).unwrap_or(i64::MAX)));
    statement
}

/// `INSERT` drawing the id from the identity sequence; both timestamps are `now`
pub fn render_insert(product: &NewProduct, now: NaiveDateTime) -> Statement {
    let mapping = &PRODUCT_MAPPING;
    let columns = [
        "sku",
        "name",
        "description",
        "price",
        "active",
        "imageUrl",
        "dateCreated",
        "lastUpdated",
    ]
    .map(|field| mapping.column_name(field));

    let id_value = match mapping.qualified_sequence() {
        Some(sequence) => format!("nextval('{}')", sequence),
        None => "DEFAULT".to_string(),
    };

    Statement::new(format!(
        "INSERT INTO {} ({}, {}) VALUES ({}, $1, $2, $3, $4, $5, $6, $7, $7) RETURNING {}",
        mapping.qualified_table(),
        mapping.id_column,
        columns.join(", "),
        id_value,
        mapping.column_list()
    ))
    .with_params(vec![
        Param::Text(product.sku.clone()),
        Param::NullableText(product.name.clone()),
        Param::NullableText(product.description.clone()),
        Param::NullableDecimal(product.price),
        Param::Bool(product.active),
        Param::NullableText(product.image_url.clone()),
        Param::Timestamp(now),
    ])
}

/// `UPDATE` of the mutable columns; `date_created` is never written and
/// `last_updated` never decreases
pub fn render_update(product: &Product, now: NaiveDateTime) -> Statement {
    let mapping = &PRODUCT_MAPPING;
    let last_updated = mapping.column_name("lastUpdated");

    Statement::new(format!(
        "UPDATE {table} SET {sku} = $2, {name} = $3, {description} = $4, {price} = $5, \
         {active} = $6, {image_url} = $7, {last_updated} = GREATEST({last_updated}, $8) \
         WHERE {id} = $1 RETURNING {columns}",
        table = mapping.qualified_table(),
        sku = mapping.column_name("sku"),
        name = mapping.column_name("name"),
        description = mapping.column_name("description"),
        price = mapping.column_name("price"),
        active = mapping.column_name("active"),
        image_url = mapping.column_name("imageUrl"),
        last_updated = last_updated,
        id = mapping.id_column,
        columns = mapping.column_list(),
    ))
    .with_params(vec![
        Param::BigInt(product.id.value()),
        Param::Text(product.sku.clone()),
        Param::NullableText(product.name.clone()),
        Param::NullableText(product.description.clone()),
        Param::NullableDecimal(product.price),
        Param::Bool(product.active),
        Param::NullableText(product.image_url.clone()),
        Param::Timestamp(now),
    ])
}

/// `SELECT COUNT(*)` over the table
pub fn render_count() -> Statement {
    Statement::new(format!("SELECT COUNT(*) FROM {}", PRODUCT_MAPPING.qualified_table()))
}

/// `SELECT EXISTS` for one primary key
pub fn render_exists(id: i64) -> Statement {
    let mapping = &PRODUCT_MAPPING;
    Statement::new(format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE {} = $1)",
        mapping.qualified_table(),
        mapping.id_column
    ))
    .with_params(vec![Param::BigInt(id)])
}

/// `DELETE` of one row by primary key
pub fn render_delete(id: i64) -> Statement {
    let mapping = &PRODUCT_MAPPING;
    Statement::new(format!(
        "DELETE FROM {} WHERE {} = $1",
        mapping.qualified_table(),
        mapping.id_column
    ))
    .with_params(vec![Param::BigInt(id)])
}

/// `DELETE` of every row
pub fn render_delete_all() -> Statement {
    Statement::new(format!("DELETE FROM {}", PRODUCT_MAPPING.qualified_table()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{ProductField, ProductId};
    use rust_decimal_macros::dec;

    const COLUMNS: &str =
        "id, sku, name, description, price, active, image_url, date_created, last_updated";

    #[test]
    fn test_derived_equality_lookup() {
        let statement = render_query(&ProductQuery::ByName {
            name: "Widget".to_string(),
        });
        assert_eq!(
            statement.sql,
            format!(
                "SELECT {} FROM ecommercespringdatajpa.products WHERE name = $1 ORDER BY id ASC",
                COLUMNS
            )
        );
        assert_eq!(statement.params, vec![Param::Text("Widget".to_string())]);
    }

    #[test]
    fn test_between_binds_both_bounds() {
        let statement = render_query(&ProductQuery::ByPriceBetween {
            low: dec!(10),
            high: dec!(20),
        });
        assert!(statement.sql.contains("WHERE price BETWEEN $1 AND $2"));
        assert_eq!(
            statement.params,
            vec![Param::Decimal(dec!(10)), Param::Decimal(dec!(20))]
        );
    }

    #[test]
    fn test_containing_escapes_argument() {
        let statement = render_query(&ProductQuery::ByNameContaining {
            fragment: "50%".to_string(),
        });
        assert!(statement.sql.contains("WHERE name LIKE $1 ESCAPE '\\'"));
        assert_eq!(statement.params, vec![Param::Text(r"%50\%%".to_string())]);
    }

    #[test]
    fn test_first3_orders_and_limits() {
        let statement = render_query(&ProductQuery::First3ByOrderByNameAsc);
        assert!(statement
            .sql
            .ends_with("ORDER BY name COLLATE \"C\" ASC, id ASC LIMIT $1"));
        assert_eq!(statement.params, vec![Param::BigInt(3)]);
    }

    #[test]
    fn test_structured_search_reuses_its_pattern() {
        let statement = render_query(&ProductQuery::Search {
            query: "wid".to_string(),
        });
        assert!(statement
            .sql
            .contains("WHERE LOWER(name) LIKE LOWER($1) OR LOWER(description) LIKE LOWER($1)"));
        assert_eq!(statement.params, vec![Param::Text("%wid%".to_string())]);
    }

    #[test]
    fn test_native_queries_use_fixed_text() {
        let statement = render_query(&ProductQuery::SearchNative {
            query: "wid".to_string(),
        });
        assert_eq!(statement.sql, SEARCH_PRODUCTS_SQL);
        assert_eq!(statement.params, vec![Param::Text("wid".to_string())]);

        let statement = render_query(&ProductQuery::ByNameOrDescriptionNative {
            name: "a".to_string(),
            description: "b".to_string(),
        });
        assert!(statement.sql.starts_with("SELECT * FROM ecommercespringdatajpa.products p"));
        assert_eq!(statement.params.len(), 2);
    }

    #[test]
    fn test_placeholders_match_param_count() {
        let queries = vec![
            ProductQuery::ByNameAndDescriptionAndPrice {
                name: "a".into(),
                description: "b".into(),
                price: dec!(1),
            },
            ProductQuery::ByPriceGreaterThan { price: dec!(1) },
            ProductQuery::ByNameLike {
                pattern: "a%".into(),
            },
            ProductQuery::ByPrice { price: dec!(1) },
            ProductQuery::AllOrderByNameDesc,
            ProductQuery::ByNameOrDescriptionStructured {
                name: "a".into(),
                description: "b".into(),
            },
        ];
        for query in queries {
            let statement = render_query(&query);
            let highest = (1..=statement.params.len() + 1)
                .take_while(|n| statement.sql.contains(&format!("${}", n)))
                .count();
            assert_eq!(highest, statement.params.len(), "{}", query.name());
        }
    }

    #[test]
    fn test_insert_draws_id_from_sequence() {
        let now = catalog_core::product::store_timestamp();
        let statement = render_insert(&NewProduct::new("SKU-1"), now);
        assert!(statement.sql.starts_with(
            "INSERT INTO ecommercespringdatajpa.products (id, sku, name, description, price, active, image_url, date_created, last_updated) \
             VALUES (nextval('ecommercespringdatajpa.product_sequence_name')"
        ));
        assert!(statement.sql.ends_with(&format!("RETURNING {}", COLUMNS)));
        assert_eq!(statement.params.len(), 7);
    }

    #[test]
    fn test_update_never_touches_creation_time() {
        let now = catalog_core::product::store_timestamp();
        let product = Product::from_new(ProductId::new(4), NewProduct::new("SKU-4"), now);
        let statement = render_update(&product, now);

        assert!(!statement.sql.contains("date_created ="));
        assert!(statement
            .sql
            .contains("last_updated = GREATEST(last_updated, $8)"));
        assert_eq!(statement.params[0], Param::BigInt(4));
    }

    #[test]
    fn test_page_binds_limit_and_offset() {
        let request = PageRequest::of(2, 10).with_sort(Sort::desc(ProductField::Price));
        let statement = render_find_page(&request);
        assert!(statement
            .sql
            .ends_with("ORDER BY price DESC, id ASC LIMIT $1 OFFSET $2"));
        assert_eq!(statement.params, vec![Param::BigInt(10), Param::BigInt(20)]);
    }

    #[test]
    fn test_descending_text_sort_is_collated() {
        let statement = render_find_all(&Sort::desc(ProductField::Sku));
        assert!(statement
            .sql
            .ends_with("ORDER BY sku COLLATE \"C\" DESC, id ASC"));
        assert!(statement.params.is_empty());
    }
}
