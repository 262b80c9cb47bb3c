use serde::{Deserialize, Serialize};

use super::types::SqlType;

/// Definition of a table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,

    /// SQL type.
    pub sql_type: SqlType,

    /// Whether the column accepts NULL.
    pub nullable: bool,

    /// Whether the column is (part of) the primary key.
    pub primary_key: bool,

    /// Server-side default expression.
    pub default: Option<String>,
}

impl ColumnDef {
    /// Create a new nullable column.
    pub fn new(name: &str, sql_type: SqlType) -> Self {
        Self {
            name: name.to_string(),
            sql_type,
            nullable: true,
            primary_key: false,
            default: None,
        }
    }

    /// Mark the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark the column as (part of) the primary key. Implies NOT NULL.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Set a server-side default expression.
    pub fn default_expr(mut self, expr: &str) -> Self {
        self.default = Some(expr.to_string());
        self
    }

    /// Generate the column clause for CREATE TABLE.
    ///
    /// `sole_primary_key` controls whether PRIMARY KEY is emitted inline;
    /// composite keys are emitted as a table constraint instead. An integer
    /// sole primary key becomes SERIAL, matching the original schema where
    /// surrogate ids are auto-incrementing.
    pub fn to_sql(&self, sole_primary_key: bool) -> String {
        let mut parts = Vec::new();
        parts.push(self.name.clone());

        if sole_primary_key && self.sql_type == SqlType::Integer {
            parts.push("SERIAL".to_string());
        } else {
            parts.push(self.sql_type.to_sql());
        }

        if sole_primary_key {
            parts.push("PRIMARY KEY".to_string());
        } else if !self.nullable {
            parts.push("NOT NULL".to_string());
        }

        if let Some(ref default) = self.default {
            parts.push(format!("DEFAULT {}", default));
        }

        parts.join(" ")
    }
}

/// A named index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDef {
    pub name: String,
    pub columns: Vec<String>,
}

impl IndexDef {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Generate the CREATE INDEX statement for a table.
    pub fn to_sql(&self, table: &str) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({});",
            self.name,
            table,
            self.columns.join(", ")
        )
    }
}

/// A named unique constraint over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueDef {
    pub name: String,
    pub columns: Vec<String>,
}

impl UniqueDef {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Generate the table-level constraint clause.
    pub fn to_sql(&self) -> String {
        format!("CONSTRAINT {} UNIQUE ({})", self.name, self.columns.join(", "))
    }
}

/// A foreign key from one or more columns to a referenced table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyDef {
    pub columns: Vec<String>,
    pub referred_table: String,
    pub referred_columns: Vec<String>,
}

impl ForeignKeyDef {
    pub fn new(columns: &[&str], referred_table: &str, referred_columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            referred_table: referred_table.to_string(),
            referred_columns: referred_columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Generate the table-level constraint clause.
    pub fn to_sql(&self) -> String {
        format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            self.columns.join(", "),
            self.referred_table,
            self.referred_columns.join(", ")
        )
    }
}

/// Declarative definition of a table: columns, constraints and indexes.
///
/// Both the migration scripts and the current object-relational model are
/// expressed as `TableDef`s; the sync check compares the latter against the
/// reflected live schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub uniques: Vec<UniqueDef>,
    pub foreign_keys: Vec<ForeignKeyDef>,
    pub indexes: Vec<IndexDef>,
}

impl TableDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            uniques: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn unique(mut self, name: &str, columns: &[&str]) -> Self {
        self.uniques.push(UniqueDef::new(name, columns));
        self
    }

    pub fn foreign_key(
        mut self,
        columns: &[&str],
        referred_table: &str,
        referred_columns: &[&str],
    ) -> Self {
        self.foreign_keys
            .push(ForeignKeyDef::new(columns, referred_table, referred_columns));
        self
    }

    pub fn index(mut self, name: &str, columns: &[&str]) -> Self {
        self.indexes.push(IndexDef::new(name, columns));
        self
    }

    /// Find a column by name.
    pub fn find_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.find_column(name).is_some()
    }

    /// Names of the primary key columns, in declaration order.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Generate the CREATE TABLE statement, including table-level constraints.
    pub fn to_create_table_sql(&self) -> String {
        let pk_count = self.columns.iter().filter(|c| c.primary_key).count();

        let mut clauses: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("    {}", c.to_sql(c.primary_key && pk_count == 1)))
            .collect();

        if pk_count > 1 {
            clauses.push(format!(
                "    PRIMARY KEY ({})",
                self.primary_key_columns().join(", ")
            ));
        }

        for unique in &self.uniques {
            clauses.push(format!("    {}", unique.to_sql()));
        }

        for fk in &self.foreign_keys {
            clauses.push(format!("    {}", fk.to_sql()));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
            self.name,
            clauses.join(",\n")
        )
    }

    /// Generate the CREATE INDEX statements.
    pub fn index_sql(&self) -> Vec<String> {
        self.indexes.iter().map(|i| i.to_sql(&self.name)).collect()
    }

    /// All statements needed to create this table.
    pub fn to_sql(&self) -> Vec<String> {
        let mut statements = vec![self.to_create_table_sql()];
        statements.extend(self.index_sql());
        statements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> TableDef {
        TableDef::new("cell_mappings")
            .column(ColumnDef::new("created_at", SqlType::Timestamp))
            .column(ColumnDef::new("updated_at", SqlType::Timestamp))
            .column(ColumnDef::new("id", SqlType::Integer).primary_key())
            .column(ColumnDef::new("uuid", SqlType::Varchar(36)).not_null())
            .column(ColumnDef::new("name", SqlType::Varchar(255)))
            .unique("uniq_cell_mappings0uuid", &["uuid"])
            .index("uuid_idx", &["uuid"])
    }

    #[test]
    fn test_integer_sole_primary_key_is_serial() {
        let sql = sample_table().to_create_table_sql();
        assert!(sql.contains("id SERIAL PRIMARY KEY"));
    }

    #[test]
    fn test_create_table_clauses() {
        let sql = sample_table().to_create_table_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS cell_mappings"));
        assert!(sql.contains("uuid VARCHAR(36) NOT NULL"));
        assert!(sql.contains("CONSTRAINT uniq_cell_mappings0uuid UNIQUE (uuid)"));
        // Nullable columns carry no NOT NULL
        assert!(sql.contains("name VARCHAR(255)\n") || sql.contains("name VARCHAR(255),"));
    }

    #[test]
    fn test_index_sql() {
        let stmts = sample_table().index_sql();
        assert_eq!(stmts.len(), 1);
        assert_eq!(
            stmts[0],
            "CREATE INDEX IF NOT EXISTS uuid_idx ON cell_mappings (uuid);"
        );
    }

    #[test]
    fn test_composite_primary_key() {
        let table = TableDef::new("resource_provider_aggregates")
            .column(ColumnDef::new("resource_provider_id", SqlType::Integer).primary_key())
            .column(ColumnDef::new("aggregate_id", SqlType::Integer).primary_key());

        let sql = table.to_create_table_sql();
        assert!(sql.contains("resource_provider_id INTEGER NOT NULL"));
        assert!(!sql.contains("SERIAL"));
        assert!(sql.contains("PRIMARY KEY (resource_provider_id, aggregate_id)"));
    }

    #[test]
    fn test_foreign_key_clause() {
        let table = TableDef::new("host_mappings")
            .column(ColumnDef::new("id", SqlType::Integer).primary_key())
            .column(ColumnDef::new("cell_id", SqlType::Integer).not_null())
            .foreign_key(&["cell_id"], "cell_mappings", &["id"]);

        let sql = table.to_create_table_sql();
        assert!(sql.contains("FOREIGN KEY (cell_id) REFERENCES cell_mappings (id)"));
    }

    #[test]
    fn test_default_expr() {
        let col = ColumnDef::new("config_drive", SqlType::Boolean).default_expr("FALSE");
        assert_eq!(col.to_sql(false), "config_drive BOOLEAN DEFAULT FALSE");
    }
}
