//! Request specs, build requests and key pairs.

use cirrus_core::schema::{ColumnDef, SqlType, TableDef};
use cirrus_core::schema::SqlType::{Integer, MediumText, Text, Timestamp, Varchar};

pub(super) fn tables() -> Vec<TableDef> {
    vec![request_specs(), build_requests(), key_pairs()]
}

fn request_specs() -> TableDef {
    TableDef::new("request_specs")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("instance_uuid", Varchar(36)).not_null())
        .column(ColumnDef::new("spec", MediumText).not_null())
        .unique("uniq_request_specs0instance_uuid", &["instance_uuid"])
        .index("request_spec_instance_uuid_idx", &["instance_uuid"])
}

// The model keeps only the serialized-payload shape; the wide baseline
// columns live on in the database until their removal migration lands and
// are whitelisted by the sync check.
fn build_requests() -> TableDef {
    TableDef::new("build_requests")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("project_id", Varchar(255)).not_null())
        .column(ColumnDef::new("instance_uuid", Varchar(36)))
        .column(ColumnDef::new("instance", MediumText))
        .column(ColumnDef::new("block_device_mappings", MediumText))
        .column(ColumnDef::new("tags", Text))
        .unique("uniq_build_requests0instance_uuid", &["instance_uuid"])
        .index("build_requests_project_id_idx", &["project_id"])
        .index("build_requests_instance_uuid_idx", &["instance_uuid"])
}

fn key_pairs() -> TableDef {
    TableDef::new("key_pairs")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("name", Varchar(255)).not_null())
        .column(ColumnDef::new("user_id", Varchar(255)).not_null())
        .column(ColumnDef::new("fingerprint", Varchar(255)))
        .column(ColumnDef::new("public_key", Text))
        .column(
            ColumnDef::new("type", SqlType::Enum("keypair_types".to_string()))
                .not_null()
                .default_expr("'ssh'"),
        )
        .unique("uniq_key_pairs0user_id0name", &["user_id", "name"])
}
