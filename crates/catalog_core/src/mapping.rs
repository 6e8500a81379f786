//! Explicit schema mapping
//!
//! An `EntityMapping` describes how an entity is laid out in the relational
//! store: schema and table names, every column with its SQL type and
//! nullability, how values are generated, and the named unique constraints.
//! The store layer derives its DDL and column lists from this description, so
//! the table definition lives in exactly one place.
//!
//! ```sql
//! CREATE TABLE ecommercespringdatajpa.products (
//!     id BIGINT NOT NULL DEFAULT nextval('ecommercespringdatajpa.product_sequence_name'),
//!     sku VARCHAR(255) NOT NULL,
//!     ...
//!     CONSTRAINT sku_unique UNIQUE (sku)
//! );
//! ```

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{StoreError, StoreResult};

/// Column types used by the mapped tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    BigInt,
    Boolean,
    Timestamp,
    /// `VARCHAR(n)`, limited to `n` characters
    Varchar(usize),
    /// `NUMERIC(precision, scale)`
    Numeric { precision: u32, scale: u32 },
}

impl SqlType {
    /// Character limit, for `VARCHAR` columns
    pub fn max_length(&self) -> Option<usize> {
        match self {
            SqlType::Varchar(max_length) => Some(*max_length),
            _ => None,
        }
    }

    /// Kept fractional digits, for `NUMERIC` columns
    pub fn scale(&self) -> Option<u32> {
        match self {
            SqlType::Numeric { scale, .. } => Some(*scale),
            _ => None,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::BigInt => write!(f, "BIGINT"),
            SqlType::Boolean => write!(f, "BOOLEAN"),
            SqlType::Timestamp => write!(f, "TIMESTAMP"),
            SqlType::Varchar(max_length) => write!(f, "VARCHAR({})", max_length),
            SqlType::Numeric { precision, scale } => write!(f, "NUMERIC({}, {})", precision, scale),
        }
    }
}

/// How a column receives its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// Supplied by the caller
    Assigned,
    /// Drawn from a named sequence
    Sequence {
        sequence: &'static str,
        increment: i64,
    },
    /// Stamped once when the row is inserted
    CreationTimestamp,
    /// Stamped on insert and on every update
    UpdateTimestamp,
}

/// Mapping of one entity field to one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub field: &'static str,
    pub column: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub default: Option<&'static str>,
    pub generation: Generation,
}

impl ColumnMapping {
    const fn assigned(field: &'static str, column: &'static str, sql_type: SqlType) -> Self {
        Self {
            field,
            column,
            sql_type,
            nullable: true,
            default: None,
            generation: Generation::Assigned,
        }
    }

    const fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    const fn generated(mut self, generation: Generation) -> Self {
        self.generation = generation;
        self
    }

    /// Fits a text value to the column the way PostgreSQL assigns it
    ///
    /// Characters past the limit are dropped if they are all spaces; any other
    /// overflow is rejected with `StoreError::ValueTooLong`.
    pub fn fit_text(&self, value: String) -> StoreResult<String> {
        let Some(max_length) = self.sql_type.max_length() else {
            return Ok(value);
        };
        match value.char_indices().nth(max_length) {
            None => Ok(value),
            Some((cut, _)) if value[cut..].chars().all(|c| c == ' ') => {
                Ok(value[..cut].to_string())
            }
            Some(_) => Err(StoreError::ValueTooLong(format!(
                "value too long for column {} ({} characters max)",
                self.column, max_length
            ))),
        }
    }

    /// Rounds a numeric value to the column scale, half away from zero
    pub fn fit_decimal(&self, value: Decimal) -> Decimal {
        let Some(scale) = self.sql_type.scale() else {
            return value;
        };
        let mut fitted =
            value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
        fitted.rescale(scale);
        fitted
    }
}

/// A named unique constraint over one or more columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueConstraint {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Table layout of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityMapping {
    pub entity: &'static str,
    pub schema: &'static str,
    pub table: &'static str,
    pub id_column: &'static str,
    pub columns: &'static [ColumnMapping],
    pub unique_constraints: &'static [UniqueConstraint],
}

impl EntityMapping {
    /// Schema-qualified table name
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    /// Comma-separated list of every mapped column, in declaration order
    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.column)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Looks up the column mapped to an entity field
    pub fn column(&self, field: &str) -> Option<&ColumnMapping> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Column name for an entity field, falling back to the field name itself
    pub fn column_name<'a>(&self, field: &'a str) -> &'a str {
        self.column(field).map_or(field, |c| c.column)
    }

    /// Schema-qualified name of the identity sequence, if the id is sequence generated
    pub fn qualified_sequence(&self) -> Option<String> {
        self.columns.iter().find_map(|c| match c.generation {
            Generation::Sequence { sequence, .. } => Some(format!("{}.{}", self.schema, sequence)),
            _ => None,
        })
    }

    /// Returns the unique constraint covering exactly the given column
    pub fn unique_constraint_on(&self, column: &str) -> Option<&UniqueConstraint> {
        self.unique_constraints
            .iter()
            .find(|u| u.columns == [column])
    }

    /// DDL statements creating the schema, identity sequence and table
    ///
    /// Every statement is idempotent.
    pub fn ddl(&self) -> Vec<String> {
        let mut statements = vec![format!("CREATE SCHEMA IF NOT EXISTS {}", self.schema)];

        for column in self.columns {
            if let Generation::Sequence { sequence, increment } = column.generation {
                statements.push(format!(
                    "CREATE SEQUENCE IF NOT EXISTS {}.{} START WITH 1 INCREMENT BY {}",
                    self.schema, sequence, increment
                ));
            }
        }

        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|c| self.column_ddl(c))
            .collect();
        lines.push(format!(
            "CONSTRAINT {}_pkey PRIMARY KEY ({})",
            self.table, self.id_column
        ));
        for unique in self.unique_constraints {
            lines.push(format!(
                "CONSTRAINT {} UNIQUE ({})",
                unique.name,
                unique.columns.join(", ")
            ));
        }

        statements.push(format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.qualified_table(),
            lines.join(",\n    ")
        ));
        statements
    }

    fn column_ddl(&self, column: &ColumnMapping) -> String {
        let mut ddl = format!("{} {}", column.column, column.sql_type);
        if !column.nullable {
            ddl.push_str(" NOT NULL");
        }
        let default = match column.generation {
            Generation::Sequence { sequence, .. } => {
                Some(format!("nextval('{}.{}')", self.schema, sequence))
            }
            _ => column.default.map(str::to_string),
        };
        if let Some(default) = default {
            ddl.push_str(" DEFAULT ");
            ddl.push_str(&default);
        }
        ddl
    }
}

/// Mapping of `Product` onto `ecommercespringdatajpa.products`
pub const PRODUCT_MAPPING: EntityMapping = EntityMapping {
    entity: "Product",
    schema: "ecommercespringdatajpa",
    table: "products",
    id_column: "id",
    columns: &[
        ColumnMapping::assigned("id", "id", SqlType::BigInt)
            .required()
            .generated(Generation::Sequence {
                sequence: "product_sequence_name",
                increment: 1,
            }),
        ColumnMapping::assigned("sku", "sku", SqlType::Varchar(255)).required(),
        ColumnMapping::assigned("name", "name", SqlType::Varchar(255)),
        ColumnMapping::assigned("description", "description", SqlType::Varchar(255)),
        ColumnMapping::assigned(
            "price",
            "price",
            SqlType::Numeric {
                precision: 38,
                scale: 2,
            },
        ),
        ColumnMapping::assigned("active", "active", SqlType::Boolean)
            .required()
            .with_default("FALSE"),
        ColumnMapping::assigned("imageUrl", "image_url", SqlType::Varchar(255)),
        ColumnMapping::assigned("dateCreated", "date_created", SqlType::Timestamp)
            .required()
            .generated(Generation::CreationTimestamp),
        ColumnMapping::assigned("lastUpdated", "last_updated", SqlType::Timestamp)
            .required()
            .generated(Generation::UpdateTimestamp),
    ],
    unique_constraints: &[UniqueConstraint {
        name: "sku_unique",
        columns: &["sku"],
    }],
};
