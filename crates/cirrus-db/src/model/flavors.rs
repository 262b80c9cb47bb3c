//! Flavors and their extra specs / project access lists.

use cirrus_core::schema::{ColumnDef, TableDef};
use cirrus_core::schema::SqlType::{Boolean, Float, Integer, Text, Timestamp, Varchar};

pub(super) fn tables() -> Vec<TableDef> {
    vec![flavors(), flavor_extra_specs(), flavor_projects()]
}

fn flavors() -> TableDef {
    TableDef::new("flavors")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("name", Varchar(255)).not_null())
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("memory_mb", Integer).not_null())
        .column(ColumnDef::new("vcpus", Integer).not_null())
        .column(ColumnDef::new("swap", Integer).not_null())
        .column(ColumnDef::new("vcpu_weight", Integer))
        .column(ColumnDef::new("flavorid", Varchar(255)).not_null())
        .column(ColumnDef::new("rxtx_factor", Float))
        .column(ColumnDef::new("root_gb", Integer))
        .column(ColumnDef::new("ephemeral_gb", Integer))
        .column(ColumnDef::new("disabled", Boolean))
        .column(ColumnDef::new("is_public", Boolean))
        .column(ColumnDef::new("description", Text))
        .unique("uniq_flavors0flavorid", &["flavorid"])
        .unique("uniq_flavors0name", &["name"])
}

fn flavor_extra_specs() -> TableDef {
    TableDef::new("flavor_extra_specs")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("flavor_id", Integer).not_null())
        .column(ColumnDef::new("key", Varchar(255)).not_null())
        .column(ColumnDef::new("value", Varchar(255)))
        .unique("uniq_flavor_extra_specs0flavor_id0key", &["flavor_id", "key"])
        .index("flavor_extra_specs_flavor_id_key_idx", &["flavor_id", "key"])
        .foreign_key(&["flavor_id"], "flavors", &["id"])
}

fn flavor_projects() -> TableDef {
    TableDef::new("flavor_projects")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("flavor_id", Integer).not_null())
        .column(ColumnDef::new("project_id", Varchar(255)).not_null())
        .unique(
            "uniq_flavor_projects0flavor_id0project_id",
            &["flavor_id", "project_id"],
        )
        .foreign_key(&["flavor_id"], "flavors", &["id"])
}
