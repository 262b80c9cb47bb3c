//! Migration runner with advisory locking.
//!
//! Ensures only one process applies schema versions at a time using a
//! PostgreSQL advisory lock, and records each applied version in the
//! `cirrus_schema_versions` control table.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, warn};

use cirrus_core::error::{CirrusError, Result};

use super::catalog::{self, Migration};

/// Applies catalog versions against a database.
pub struct MigrationRunner {
    pool: PgPool,
}

/// A version recorded in the control table.
#[derive(Debug, Clone)]
pub struct AppliedMigration {
    pub version: u32,
    pub name: String,
    pub applied_at: DateTime<Utc>,
    pub checksum: Option<String>,
    pub execution_time_ms: Option<i32>,
}

/// Snapshot of applied vs pending versions.
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    pub applied: Vec<AppliedMigration>,
    pub pending: Vec<Migration>,
}

impl MigrationRunner {
    /// ID of the advisory lock guarding migration runs (arbitrary but
    /// consistent). Fixed value derived from "CIRRUS" ascii values.
    pub const LOCK_ID: i64 = 0x434952525553; // "CIRRUS" in hex

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply all pending versions from the catalog.
    pub async fn run(&self) -> Result<()> {
        self.run_to(catalog::HEAD_VERSION).await
    }

    /// Apply pending versions up to and including `target`.
    ///
    /// The version walk uses this to stop after each historical version and
    /// assert on the resulting schema.
    pub async fn run_to(&self, target: u32) -> Result<()> {
        let migrations = catalog::all();
        catalog::validate(&migrations)?;

        // Advisory locks are session-scoped: acquire and release must happen
        // on the same connection, so one is pinned for the whole run
        let mut lock_conn = self.pool.acquire().await.map_err(CirrusError::Sql)?;

        // Exclusive lock; blocks until acquired
        acquire_lock(&mut lock_conn).await?;

        let result = self.run_inner(&migrations, target).await;

        // Always release, even on error
        if let Err(e) = release_lock(&mut lock_conn).await {
            warn!("Failed to release migration lock: {}", e);
        }

        result
    }

    async fn run_inner(&self, migrations: &[Migration], target: u32) -> Result<()> {
        self.ensure_versions_table().await?;

        let applied = self.applied_versions().await?;
        debug!("Already applied versions: {:?}", applied);

        for migration in migrations {
            if migration.version > target {
                break;
            }
            if !applied.contains(&migration.version) {
                self.apply(migration).await?;
            }
        }

        Ok(())
    }

    /// Highest applied version, if any.
    pub async fn current_version(&self) -> Result<Option<u32>> {
        self.ensure_versions_table().await?;

        let version: Option<i32> =
            sqlx::query_scalar("SELECT MAX(version) FROM cirrus_schema_versions")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    CirrusError::Database(format!("Failed to read current version: {}", e))
                })?;

        Ok(version.map(|v| v as u32))
    }

    /// Applied and pending versions relative to the catalog.
    pub async fn status(&self) -> Result<MigrationStatus> {
        self.ensure_versions_table().await?;

        let rows: Vec<(i32, String, DateTime<Utc>, Option<String>, Option<i32>)> =
            sqlx::query_as(
                r#"
                SELECT version, name, applied_at, checksum, execution_time_ms
                FROM cirrus_schema_versions
                ORDER BY version ASC
                "#,
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CirrusError::Database(format!("Failed to fetch versions: {}", e)))?;

        let applied: Vec<AppliedMigration> = rows
            .into_iter()
            .map(
                |(version, name, applied_at, checksum, execution_time_ms)| AppliedMigration {
                    version: version as u32,
                    name,
                    applied_at,
                    checksum,
                    execution_time_ms,
                },
            )
            .collect();

        let applied_versions: HashSet<u32> = applied.iter().map(|m| m.version).collect();
        let pending = catalog::all()
            .into_iter()
            .filter(|m| !applied_versions.contains(&m.version))
            .collect();

        Ok(MigrationStatus { applied, pending })
    }

    async fn ensure_versions_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cirrus_schema_versions (
                version INTEGER PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                checksum VARCHAR(64),
                execution_time_ms INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| CirrusError::Database(format!("Failed to create versions table: {}", e)))?;
        Ok(())
    }

    async fn applied_versions(&self) -> Result<HashSet<u32>> {
        let rows: Vec<(i32,)> = sqlx::query_as("SELECT version FROM cirrus_schema_versions")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                CirrusError::Database(format!("Failed to get applied versions: {}", e))
            })?;

        Ok(rows.into_iter().map(|(v,)| v as u32).collect())
    }

    async fn apply(&self, migration: &Migration) -> Result<()> {
        info!("Applying version {}: {}", migration.version, migration.name);
        let start = std::time::Instant::now();

        // Split into individual statements, respecting dollar-quoted strings
        let statements = split_sql_statements(&migration.sql);

        for statement in statements {
            let statement = statement.trim();

            // Skip empty statements or comment-only blocks
            if statement.is_empty()
                || statement.lines().all(|l| {
                    let l = l.trim();
                    l.is_empty() || l.starts_with("--")
                })
            {
                continue;
            }

            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    CirrusError::Migration(format!(
                        "Failed to apply version {} ({}): {}",
                        migration.version, migration.name, e
                    ))
                })?;
        }

        let elapsed = start.elapsed();
        let checksum = calculate_checksum(&migration.sql);

        sqlx::query(
            r#"
            INSERT INTO cirrus_schema_versions (version, name, checksum, execution_time_ms)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(migration.version as i32)
        .bind(&migration.name)
        .bind(&checksum)
        .bind(elapsed.as_millis() as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            CirrusError::Database(format!(
                "Failed to record version {}: {}",
                migration.version, e
            ))
        })?;

        info!("Version applied: {}", migration.name);
        Ok(())
    }
}

async fn acquire_lock(conn: &mut PgConnection) -> Result<()> {
    debug!("Acquiring migration lock...");
    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(MigrationRunner::LOCK_ID)
        .execute(&mut *conn)
        .await
        .map_err(|e| CirrusError::Database(format!("Failed to acquire migration lock: {}", e)))?;
    debug!("Migration lock acquired");
    Ok(())
}

async fn release_lock(conn: &mut PgConnection) -> Result<()> {
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(MigrationRunner::LOCK_ID)
        .execute(&mut *conn)
        .await
        .map_err(|e| CirrusError::Database(format!("Failed to release migration lock: {}", e)))?;
    debug!("Migration lock released");
    Ok(())
}

/// Split SQL into individual statements, respecting dollar-quoted strings
/// and `--` line comments. This handles DO blocks that contain semicolons
/// inside $$ delimiters (the baseline's guarded CREATE TYPE statements rely
/// on it) and semicolons inside comment text.
pub(crate) fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_dollar_quote = false;
    let mut dollar_tag = String::new();
    let mut in_line_comment = false;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);

        // Comment runs to end of line; nothing inside it splits or quotes
        if in_line_comment {
            if c == '\n' {
                in_line_comment = false;
            }
            continue;
        }

        if c == '-' && !in_dollar_quote && chars.peek() == Some(&'-') {
            current.push(chars.next().unwrap());
            in_line_comment = true;
            continue;
        }

        // Check for a dollar-quote tag like $$ or $tag$
        if c == '$' {
            let mut potential_tag = String::from("$");

            while let Some(&next_c) = chars.peek() {
                if next_c == '$' {
                    potential_tag.push(chars.next().unwrap());
                    current.push('$');
                    break;
                } else if next_c.is_alphanumeric() || next_c == '_' {
                    potential_tag.push(chars.next().unwrap());
                    current.push(potential_tag.chars().last().unwrap());
                } else {
                    break;
                }
            }

            // A valid dollar-quote delimiter ends with $
            if potential_tag.len() >= 2 && potential_tag.ends_with('$') {
                if in_dollar_quote && potential_tag == dollar_tag {
                    in_dollar_quote = false;
                    dollar_tag.clear();
                } else if !in_dollar_quote {
                    in_dollar_quote = true;
                    dollar_tag = potential_tag;
                }
            }
        }

        // Split on semicolon only outside dollar-quoted strings
        if c == ';' && !in_dollar_quote {
            let stmt = current.trim().trim_end_matches(';').trim().to_string();
            if !stmt.is_empty() {
                statements.push(stmt);
            }
            current.clear();
        }
    }

    // The last statement might not end with ;
    let stmt = current.trim().trim_end_matches(';').trim().to_string();
    if !stmt.is_empty() {
        statements.push(stmt);
    }

    statements
}

/// Checksum of the migration content, recorded alongside the version.
fn calculate_checksum(content: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
