use serde::{Deserialize, Serialize};

/// Column types used by the control-plane schema.
///
/// The set is deliberately small: it covers exactly what the API tables
/// declare, mapped to their PostgreSQL renderings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlType {
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    BigInt,
    /// Double-precision float
    Float,
    /// Variable-length string with max length
    Varchar(u32),
    /// Unlimited text
    Text,
    /// Large text payloads (serialized objects). Distinct from `Text` only on
    /// backends with sized text types; renders as TEXT on PostgreSQL.
    MediumText,
    /// Boolean
    Boolean,
    /// Timestamp without timezone
    Timestamp,
    /// IPv4/IPv6 address
    Inet,
    /// Named enum type
    Enum(String),
}

impl SqlType {
    /// Generate the SQL type declaration.
    pub fn to_sql(&self) -> String {
        match self {
            SqlType::Integer => "INTEGER".to_string(),
            SqlType::BigInt => "BIGINT".to_string(),
            SqlType::Float => "FLOAT".to_string(),
            SqlType::Varchar(len) => format!("VARCHAR({})", len),
            SqlType::Text | SqlType::MediumText => "TEXT".to_string(),
            SqlType::Boolean => "BOOLEAN".to_string(),
            SqlType::Timestamp => "TIMESTAMP".to_string(),
            SqlType::Inet => "INET".to_string(),
            SqlType::Enum(name) => name.clone(),
        }
    }

    /// The `data_type` value information_schema reports for this type.
    ///
    /// Used by the model/schema sync check to compare declared metadata
    /// against a reflected live schema.
    pub fn introspected_type(&self) -> &'static str {
        match self {
            SqlType::Integer => "integer",
            SqlType::BigInt => "bigint",
            SqlType::Float => "double precision",
            SqlType::Varchar(_) => "character varying",
            SqlType::Text | SqlType::MediumText => "text",
            SqlType::Boolean => "boolean",
            SqlType::Timestamp => "timestamp without time zone",
            SqlType::Inet => "inet",
            SqlType::Enum(_) => "USER-DEFINED",
        }
    }
}

/// A named PostgreSQL enum type.
///
/// Created ahead of the tables that reference it. Creation is guarded so a
/// re-run against an existing schema does not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumTypeDef {
    /// Type name in SQL.
    pub name: String,

    /// Allowed values, in declaration order.
    pub values: Vec<String>,
}

impl EnumTypeDef {
    pub fn new(name: &str, values: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Generate a guarded CREATE TYPE statement.
    pub fn to_sql(&self) -> String {
        let values: Vec<String> = self.values.iter().map(|v| format!("'{}'", v)).collect();

        format!(
            "DO $$ BEGIN\n    CREATE TYPE {} AS ENUM ({});\nEXCEPTION WHEN duplicate_object THEN NULL;\nEND $$;",
            self.name,
            values.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_type_to_sql() {
        assert_eq!(SqlType::Integer.to_sql(), "INTEGER");
        assert_eq!(SqlType::Varchar(36).to_sql(), "VARCHAR(36)");
        assert_eq!(SqlType::MediumText.to_sql(), "TEXT");
        assert_eq!(SqlType::Inet.to_sql(), "INET");
        assert_eq!(SqlType::Enum("keypair_types".into()).to_sql(), "keypair_types");
    }

    #[test]
    fn test_introspected_type() {
        assert_eq!(SqlType::Varchar(255).introspected_type(), "character varying");
        assert_eq!(SqlType::Float.introspected_type(), "double precision");
        assert_eq!(SqlType::Enum("x".into()).introspected_type(), "USER-DEFINED");
    }

    #[test]
    fn test_enum_type_sql() {
        let def = EnumTypeDef::new("keypair_types", &["ssh", "x509"]);
        let sql = def.to_sql();
        assert!(sql.contains("CREATE TYPE keypair_types AS ENUM ('ssh', 'x509')"));
        assert!(sql.contains("duplicate_object"));
    }
}
