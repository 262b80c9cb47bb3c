//! Assertion helpers for schema tests.
//!
//! Thin wrappers over [`Inspector`] that panic with a readable message, for
//! use inside integration tests walking the migration history.

use sqlx::PgPool;

use crate::inspect::Inspector;

/// Panic unless `table.column` exists.
pub async fn assert_column_exists(pool: &PgPool, table: &str, column: &str) {
    let inspector = Inspector::new(pool.clone());
    let columns = inspector
        .columns(table)
        .await
        .unwrap_or_else(|e| panic!("failed to reflect {}: {}", table, e));

    assert!(
        columns.iter().any(|c| c.name == column),
        "column {}.{} does not exist; have: {:?}",
        table,
        column,
        columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
    );
}

/// Panic if `table.column` exists.
pub async fn assert_column_not_exists(pool: &PgPool, table: &str, column: &str) {
    let inspector = Inspector::new(pool.clone());
    let columns = inspector
        .columns(table)
        .await
        .unwrap_or_else(|e| panic!("failed to reflect {}: {}", table, e));

    assert!(
        !columns.iter().any(|c| c.name == column),
        "column {}.{} exists but should not",
        table,
        column
    );
}

/// Panic unless the named index exists on `table`.
pub async fn assert_index_exists(pool: &PgPool, table: &str, index: &str) {
    let inspector = Inspector::new(pool.clone());
    let indexes = inspector
        .indexes(table)
        .await
        .unwrap_or_else(|e| panic!("failed to reflect indexes of {}: {}", table, e));

    assert!(
        indexes.iter().any(|i| i == index),
        "index {} does not exist on {}; have: {:?}",
        index,
        table,
        indexes
    );
}

/// Panic unless the named unique constraint exists on `table` over exactly
/// `columns`.
pub async fn assert_unique_constraint_exists(
    pool: &PgPool,
    table: &str,
    name: &str,
    columns: &[&str],
) {
    let inspector = Inspector::new(pool.clone());
    let uniques = inspector
        .unique_constraints(table)
        .await
        .unwrap_or_else(|e| panic!("failed to reflect constraints of {}: {}", table, e));

    let found = uniques
        .iter()
        .find(|u| u.name == name)
        .unwrap_or_else(|| panic!("unique constraint {} does not exist on {}", name, table));

    assert_eq!(
        found.columns, columns,
        "unique constraint {} covers wrong columns",
        name
    );
}

/// Panic unless a foreign key from `table.columns` to `referred_table` exists.
pub async fn assert_foreign_key_exists(
    pool: &PgPool,
    table: &str,
    columns: &[&str],
    referred_table: &str,
) {
    let inspector = Inspector::new(pool.clone());
    let fks = inspector
        .foreign_keys(table)
        .await
        .unwrap_or_else(|e| panic!("failed to reflect foreign keys of {}: {}", table, e));

    assert!(
        fks.iter()
            .any(|fk| fk.columns == columns && fk.referred_table == referred_table),
        "no foreign key from {}({}) to {}; have: {:?}",
        table,
        columns.join(", "),
        referred_table,
        fks
    );
}

/// Panic unless `table` exists.
pub async fn assert_table_exists(pool: &PgPool, table: &str) {
    let inspector = Inspector::new(pool.clone());
    let exists = inspector
        .table_exists(table)
        .await
        .unwrap_or_else(|e| panic!("failed to check table {}: {}", table, e));

    assert!(exists, "table {} does not exist", table);
}

/// Panic if `table` exists.
pub async fn assert_table_not_exists(pool: &PgPool, table: &str) {
    let inspector = Inspector::new(pool.clone());
    let exists = inspector
        .table_exists(table)
        .await
        .unwrap_or_else(|e| panic!("failed to check table {}: {}", table, e));

    assert!(!exists, "table {} exists but should not", table);
}
