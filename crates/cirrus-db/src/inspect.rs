//! Live-schema introspection.
//!
//! Reflects tables, columns, indexes and constraints from the public schema
//! so the version-walk assertions and the model/schema sync check can compare
//! the database against declared metadata.

use sqlx::PgPool;

use cirrus_core::error::{CirrusError, Result};

/// A reflected table.
#[derive(Debug, Clone)]
pub struct DbTable {
    pub name: String,
    pub columns: Vec<DbColumn>,
}

impl DbTable {
    pub fn find_column(&self, name: &str) -> Option<&DbColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A reflected column.
#[derive(Debug, Clone)]
pub struct DbColumn {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
}

/// A reflected unique constraint.
#[derive(Debug, Clone)]
pub struct DbUnique {
    pub name: String,
    pub columns: Vec<String>,
}

/// A reflected foreign key.
#[derive(Debug, Clone)]
pub struct DbForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub referred_table: String,
    pub referred_columns: Vec<String>,
}

/// Reflection over a live database, public-schema scoped.
pub struct Inspector {
    pool: PgPool,
}

impl Inspector {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Names of all base tables.
    pub async fn table_names(&self) -> Result<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT table_name
            FROM information_schema.tables
            WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CirrusError::Database(format!("Failed to list tables: {}", e)))?;

        Ok(names)
    }

    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = $1
            "#,
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CirrusError::Database(format!("Failed to check table: {}", e)))?;

        Ok(count > 0)
    }

    /// Columns of a table, in ordinal position order.
    pub async fn columns(&self, table: &str) -> Result<Vec<DbColumn>> {
        let rows: Vec<(String, String, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT column_name, data_type, is_nullable, column_default
            FROM information_schema.columns
            WHERE table_schema = 'public' AND table_name = $1
            ORDER BY ordinal_position
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            CirrusError::Database(format!("Failed to reflect columns of {}: {}", table, e))
        })?;

        Ok(rows
            .into_iter()
            .map(|(name, data_type, is_nullable, default)| DbColumn {
                name,
                data_type,
                nullable: is_nullable == "YES",
                default,
            })
            .collect())
    }

    /// Index names defined on a table (including constraint-backing indexes).
    pub async fn indexes(&self, table: &str) -> Result<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT indexname
            FROM pg_indexes
            WHERE schemaname = 'public' AND tablename = $1
            ORDER BY indexname
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            CirrusError::Database(format!("Failed to reflect indexes of {}: {}", table, e))
        })?;

        Ok(names)
    }

    /// Unique constraints on a table, with their column lists in key order.
    pub async fn unique_constraints(&self, table: &str) -> Result<Vec<DbUnique>> {
        let rows: Vec<(String, Vec<String>)> = sqlx::query_as(
            r#"
            SELECT con.conname::text,
                   array_agg(att.attname::text ORDER BY ord.n) AS columns
            FROM pg_constraint con
            JOIN pg_class rel ON rel.oid = con.conrelid
            JOIN pg_namespace nsp ON nsp.oid = rel.relnamespace
            CROSS JOIN LATERAL unnest(con.conkey) WITH ORDINALITY AS ord(attnum, n)
            JOIN pg_attribute att ON att.attrelid = rel.oid AND att.attnum = ord.attnum
            WHERE con.contype = 'u' AND nsp.nspname = 'public' AND rel.relname = $1
            GROUP BY con.conname
            ORDER BY con.conname
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            CirrusError::Database(format!(
                "Failed to reflect unique constraints of {}: {}",
                table, e
            ))
        })?;

        Ok(rows
            .into_iter()
            .map(|(name, columns)| DbUnique { name, columns })
            .collect())
    }

    /// Foreign keys on a table.
    pub async fn foreign_keys(&self, table: &str) -> Result<Vec<DbForeignKey>> {
        let rows: Vec<(String, Vec<String>, String, Vec<String>)> = sqlx::query_as(
            r#"
            SELECT con.conname::text,
                   array_agg(att.attname::text ORDER BY cols.n) AS columns,
                   fre.relname::text AS referred_table,
                   array_agg(fatt.attname::text ORDER BY cols.n) AS referred_columns
            FROM pg_constraint con
            JOIN pg_class rel ON rel.oid = con.conrelid
            JOIN pg_class fre ON fre.oid = con.confrelid
            JOIN pg_namespace nsp ON nsp.oid = rel.relnamespace
            CROSS JOIN LATERAL unnest(con.conkey, con.confkey)
                WITH ORDINALITY AS cols(attnum, fattnum, n)
            JOIN pg_attribute att ON att.attrelid = rel.oid AND att.attnum = cols.attnum
            JOIN pg_attribute fatt ON fatt.attrelid = fre.oid AND fatt.attnum = cols.fattnum
            WHERE con.contype = 'f' AND nsp.nspname = 'public' AND rel.relname = $1
            GROUP BY con.conname, fre.relname
            ORDER BY con.conname
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            CirrusError::Database(format!(
                "Failed to reflect foreign keys of {}: {}",
                table, e
            ))
        })?;

        Ok(rows
            .into_iter()
            .map(|(name, columns, referred_table, referred_columns)| DbForeignKey {
                name,
                columns,
                referred_table,
                referred_columns,
            })
            .collect())
    }

    /// Reflect every table with its columns, for the sync check.
    pub async fn snapshot(&self) -> Result<Vec<DbTable>> {
        let mut tables = Vec::new();

        for name in self.table_names().await? {
            let columns = self.columns(&name).await?;
            tables.push(DbTable { name, columns });
        }

        Ok(tables)
    }
}
