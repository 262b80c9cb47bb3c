//! Model/schema sync check.
//!
//! Compares the declared object-relational model against a reflected live
//! schema and reports every difference that the filter does not excuse. A
//! database at the head migration version must produce an empty diff.

use std::collections::HashSet;
use std::fmt;

use sqlx::PgPool;
use tracing::debug;

use cirrus_core::error::{CirrusError, Result};
use cirrus_core::schema::TableDef;

use crate::inspect::{DbTable, Inspector};
use crate::model;

/// One difference between the model and the live schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffEntry {
    /// Table declared in the model but absent from the database.
    MissingTable { table: String },
    /// Table present in the database but not declared in the model.
    ExtraTable { table: String },
    /// Column declared in the model but absent from the table.
    MissingColumn { table: String, column: String },
    /// Column present in the table but not declared in the model.
    ExtraColumn { table: String, column: String },
    /// Column types disagree.
    TypeMismatch {
        table: String,
        column: String,
        model: String,
        db: String,
    },
    /// Column nullability disagrees.
    NullabilityMismatch {
        table: String,
        column: String,
        model_nullable: bool,
    },
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffEntry::MissingTable { table } => {
                write!(f, "table {} declared in model but missing from schema", table)
            }
            DiffEntry::ExtraTable { table } => {
                write!(f, "table {} present in schema but not in model", table)
            }
            DiffEntry::MissingColumn { table, column } => {
                write!(f, "column {}.{} declared in model but missing from schema", table, column)
            }
            DiffEntry::ExtraColumn { table, column } => {
                write!(f, "column {}.{} present in schema but not in model", table, column)
            }
            DiffEntry::TypeMismatch { table, column, model, db } => {
                write!(
                    f,
                    "column {}.{} type mismatch: model declares {}, schema has {}",
                    table, column, model, db
                )
            }
            DiffEntry::NullabilityMismatch { table, column, model_nullable } => {
                write!(
                    f,
                    "column {}.{} nullability mismatch: model declares {}, schema disagrees",
                    table,
                    column,
                    if *model_nullable { "NULL" } else { "NOT NULL" }
                )
            }
        }
    }
}

/// The full set of differences between a model and a schema snapshot.
#[derive(Debug, Default)]
pub struct SchemaDiff {
    pub entries: Vec<DiffEntry>,
}

impl SchemaDiff {
    /// Compare declared tables against a reflected snapshot.
    ///
    /// Defaults, indexes and foreign keys are out of scope here; the
    /// version-walk assertions cover those per migration.
    pub fn compare(model_tables: &[TableDef], db_tables: &[DbTable]) -> Self {
        let mut entries = Vec::new();

        let db_names: HashSet<&str> = db_tables.iter().map(|t| t.name.as_str()).collect();
        let model_names: HashSet<&str> = model_tables.iter().map(|t| t.name.as_str()).collect();

        for table in model_tables {
            let Some(db_table) = db_tables.iter().find(|t| t.name == table.name) else {
                entries.push(DiffEntry::MissingTable {
                    table: table.name.clone(),
                });
                continue;
            };

            for column in &table.columns {
                let Some(db_column) = db_table.find_column(&column.name) else {
                    entries.push(DiffEntry::MissingColumn {
                        table: table.name.clone(),
                        column: column.name.clone(),
                    });
                    continue;
                };

                let expected = column.sql_type.introspected_type();
                if db_column.data_type != expected {
                    entries.push(DiffEntry::TypeMismatch {
                        table: table.name.clone(),
                        column: column.name.clone(),
                        model: expected.to_string(),
                        db: db_column.data_type.clone(),
                    });
                }

                if db_column.nullable != column.nullable {
                    entries.push(DiffEntry::NullabilityMismatch {
                        table: table.name.clone(),
                        column: column.name.clone(),
                        model_nullable: column.nullable,
                    });
                }
            }

            for db_column in &db_table.columns {
                if !table.has_column(&db_column.name) {
                    entries.push(DiffEntry::ExtraColumn {
                        table: table.name.clone(),
                        column: db_column.name.clone(),
                    });
                }
            }
        }

        for name in &db_names {
            if !model_names.contains(name) {
                entries.push(DiffEntry::ExtraTable {
                    table: name.to_string(),
                });
            }
        }

        SchemaDiff { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry the filter excuses.
    pub fn filtered(mut self, filter: &SyncFilter) -> Self {
        self.entries.retain(|e| !filter.excuses(e));
        self
    }

    /// One line per remaining difference.
    pub fn report(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("  {}", e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Excuses known, deliberate differences between the model and the schema.
pub struct SyncFilter {
    /// Tables that exist in the database but are not part of the model.
    ignored_tables: HashSet<String>,
    /// Columns that remain in the database after being retired from the
    /// model, pending a removal migration. (table, column) pairs.
    legacy_columns: HashSet<(String, String)>,
}

impl SyncFilter {
    pub fn new() -> Self {
        Self {
            ignored_tables: HashSet::new(),
            legacy_columns: HashSet::new(),
        }
    }

    pub fn ignore_table(mut self, table: &str) -> Self {
        self.ignored_tables.insert(table.to_string());
        self
    }

    pub fn legacy_column(mut self, table: &str, column: &str) -> Self {
        self.legacy_columns
            .insert((table.to_string(), column.to_string()));
        self
    }

    /// The filter for the control-plane database.
    ///
    /// build_requests grew a wide set of per-field columns in the baseline
    /// that were later superseded by the serialized instance payload; they
    /// stay in the schema until a removal migration lands. Same story for
    /// resource_providers.can_host.
    pub fn control_plane() -> Self {
        let mut filter = Self::new().ignore_table("cirrus_schema_versions");

        for column in [
            "request_spec_id",
            "user_id",
            "display_name",
            "instance_metadata",
            "progress",
            "vm_state",
            "task_state",
            "image_ref",
            "access_ip_v4",
            "access_ip_v6",
            "info_cache",
            "security_groups",
            "config_drive",
            "key_name",
            "locked_by",
        ] {
            filter = filter.legacy_column("build_requests", column);
        }

        filter.legacy_column("resource_providers", "can_host")
    }

    fn excuses(&self, entry: &DiffEntry) -> bool {
        match entry {
            DiffEntry::ExtraTable { table } => self.ignored_tables.contains(table),
            DiffEntry::ExtraColumn { table, column } => self
                .legacy_columns
                .contains(&(table.clone(), column.clone())),
            _ => false,
        }
    }
}

impl Default for SyncFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Assert the live schema matches the declared model.
///
/// Returns `CirrusError::SyncMismatch` with a per-difference report when they
/// disagree.
pub async fn check_model_sync(pool: &PgPool) -> Result<()> {
    let model_tables = model::control_plane_tables();
    let snapshot = Inspector::new(pool.clone()).snapshot().await?;

    debug!(
        model_tables = model_tables.len(),
        db_tables = snapshot.len(),
        "comparing model against live schema"
    );

    let diff = SchemaDiff::compare(&model_tables, &snapshot).filtered(&SyncFilter::control_plane());

    if diff.is_empty() {
        Ok(())
    } else {
        Err(CirrusError::SyncMismatch(diff.report()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::DbColumn;
    use cirrus_core::schema::{ColumnDef, SqlType};

    fn db_column(name: &str, data_type: &str, nullable: bool) -> DbColumn {
        DbColumn {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable,
            default: None,
        }
    }

    fn model_table() -> TableDef {
        TableDef::new("cell_mappings")
            .column(ColumnDef::new("id", SqlType::Integer).primary_key())
            .column(ColumnDef::new("uuid", SqlType::Varchar(36)).not_null())
            .column(ColumnDef::new("name", SqlType::Varchar(255)))
    }

    fn matching_db_table() -> DbTable {
        DbTable {
            name: "cell_mappings".to_string(),
            columns: vec![
                db_column("id", "integer", false),
                db_column("uuid", "character varying", false),
                db_column("name", "character varying", true),
            ],
        }
    }

    #[test]
    fn test_matching_schema_has_empty_diff() {
        let diff = SchemaDiff::compare(&[model_table()], &[matching_db_table()]);
        assert!(diff.is_empty(), "unexpected diff:\n{}", diff.report());
    }

    #[test]
    fn test_missing_table_reported() {
        let diff = SchemaDiff::compare(&[model_table()], &[]);
        assert_eq!(
            diff.entries,
            vec![DiffEntry::MissingTable {
                table: "cell_mappings".to_string()
            }]
        );
    }

    #[test]
    fn test_missing_column_reported() {
        let mut db = matching_db_table();
        db.columns.retain(|c| c.name != "name");

        let diff = SchemaDiff::compare(&[model_table()], &[db]);
        assert_eq!(
            diff.entries,
            vec![DiffEntry::MissingColumn {
                table: "cell_mappings".to_string(),
                column: "name".to_string()
            }]
        );
    }

    #[test]
    fn test_type_mismatch_reported() {
        let mut db = matching_db_table();
        db.columns[2] = db_column("name", "text", true);

        let diff = SchemaDiff::compare(&[model_table()], &[db]);
        assert_eq!(diff.entries.len(), 1);
        assert!(matches!(diff.entries[0], DiffEntry::TypeMismatch { .. }));
    }

    #[test]
    fn test_nullability_mismatch_reported() {
        let mut db = matching_db_table();
        db.columns[1] = db_column("uuid", "character varying", true);

        let diff = SchemaDiff::compare(&[model_table()], &[db]);
        assert_eq!(diff.entries.len(), 1);
        assert!(matches!(
            diff.entries[0],
            DiffEntry::NullabilityMismatch { .. }
        ));
    }

    #[test]
    fn test_filter_excuses_legacy_column() {
        let mut db = matching_db_table();
        db.name = "build_requests".to_string();

        let mut model = model_table();
        model.name = "build_requests".to_string();

        db.columns.push(db_column("vm_state", "character varying", true));

        let diff = SchemaDiff::compare(&[model], &[db]);
        assert_eq!(diff.entries.len(), 1);

        let diff = diff.filtered(&SyncFilter::control_plane());
        assert!(diff.is_empty());
    }

    #[test]
    fn test_filter_keeps_unexcused_extra_column() {
        let mut db = matching_db_table();
        db.columns.push(db_column("surprise", "text", true));

        let diff = SchemaDiff::compare(&[model_table()], &[db])
            .filtered(&SyncFilter::control_plane());
        assert_eq!(diff.entries.len(), 1);
        assert!(matches!(diff.entries[0], DiffEntry::ExtraColumn { .. }));
    }

    #[test]
    fn test_filter_ignores_versions_table() {
        let tracking = DbTable {
            name: "cirrus_schema_versions".to_string(),
            columns: vec![db_column("version", "integer", false)],
        };

        let diff = SchemaDiff::compare(&[model_table()], &[matching_db_table(), tracking])
            .filtered(&SyncFilter::control_plane());
        assert!(diff.is_empty(), "unexpected diff:\n{}", diff.report());
    }

    #[test]
    fn test_full_model_diffs_clean_against_itself() {
        // Render the model as it would reflect and compare it back.
        let tables = model::control_plane_tables();
        let snapshot: Vec<DbTable> = tables
            .iter()
            .map(|t| DbTable {
                name: t.name.clone(),
                columns: t
                    .columns
                    .iter()
                    .map(|c| DbColumn {
                        name: c.name.clone(),
                        data_type: c.sql_type.introspected_type().to_string(),
                        nullable: c.nullable,
                        default: None,
                    })
                    .collect(),
            })
            .collect();

        let diff = SchemaDiff::compare(&tables, &snapshot);
        assert!(diff.is_empty(), "unexpected diff:\n{}", diff.report());
    }
}
