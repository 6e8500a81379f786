//! Schema bootstrap
//!
//! Creates the schema, identity sequence and table described by an
//! `EntityMapping`. All statements are idempotent, so this runs safely on
//! every start-up.

use catalog_core::EntityMapping;
use sqlx::PgPool;
use tracing::{debug, info, instrument};

use crate::error::DatabaseError;

/// Applies the DDL of `mapping` inside one transaction
///
/// # Errors
///
/// Returns `DatabaseError::SchemaFailed` if any statement is rejected
#[instrument(skip(pool, mapping), fields(table = %mapping.qualified_table()))]
pub async fn apply_schema(pool: &PgPool, mapping: &EntityMapping) -> Result<(), DatabaseError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

    for statement in mapping.ddl() {
        debug!(sql = %statement, "Applying DDL");
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::SchemaFailed(e.to_string()))?;
    }

    tx.commit()
        .await
        .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

    info!(entity = mapping.entity, "Schema ready");
    Ok(())
}

/// Round-trips a trivial statement to check the pool can reach the server
pub async fn ping(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
