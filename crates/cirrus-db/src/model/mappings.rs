//! Cell/host/instance mappings, host aggregates and instance groups.

use cirrus_core::schema::{ColumnDef, TableDef};
use cirrus_core::schema::SqlType::{Boolean, Integer, Text, Timestamp, Varchar};

pub(super) fn tables() -> Vec<TableDef> {
    vec![
        cell_mappings(),
        host_mappings(),
        instance_mappings(),
        aggregates(),
        aggregate_hosts(),
        aggregate_metadata(),
        instance_groups(),
        instance_group_policy(),
        instance_group_member(),
    ]
}

fn cell_mappings() -> TableDef {
    TableDef::new("cell_mappings")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("uuid", Varchar(36)).not_null())
        .column(ColumnDef::new("name", Varchar(255)))
        .column(ColumnDef::new("transport_url", Text))
        .column(ColumnDef::new("database_connection", Text))
        .column(ColumnDef::new("disabled", Boolean))
        .unique("uniq_cell_mappings0uuid", &["uuid"])
        .index("uuid_idx", &["uuid"])
}

fn host_mappings() -> TableDef {
    TableDef::new("host_mappings")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("cell_id", Integer).not_null())
        .column(ColumnDef::new("host", Varchar(255)).not_null())
        .unique("uniq_host_mappings0host", &["host"])
        .index("host_idx", &["host"])
        .foreign_key(&["cell_id"], "cell_mappings", &["id"])
}

fn instance_mappings() -> TableDef {
    TableDef::new("instance_mappings")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("instance_uuid", Varchar(36)).not_null())
        .column(ColumnDef::new("cell_id", Integer))
        .column(ColumnDef::new("project_id", Varchar(255)).not_null())
        .column(ColumnDef::new("queued_for_delete", Boolean).not_null())
        .column(ColumnDef::new("user_id", Varchar(255)))
        .unique("uniq_instance_mappings0instance_uuid", &["instance_uuid"])
        .index("instance_uuid_idx", &["instance_uuid"])
        .index("project_id_idx", &["project_id"])
        .index("instance_mappings_user_id_project_id_idx", &["user_id", "project_id"])
        .foreign_key(&["cell_id"], "cell_mappings", &["id"])
}

fn aggregates() -> TableDef {
    TableDef::new("aggregates")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("uuid", Varchar(36)))
        .column(ColumnDef::new("name", Varchar(255)))
        .index("aggregate_uuid_idx", &["uuid"])
        .unique("uniq_aggregate0name", &["name"])
}

fn aggregate_hosts() -> TableDef {
    TableDef::new("aggregate_hosts")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("host", Varchar(255)))
        .column(ColumnDef::new("aggregate_id", Integer).not_null())
        .unique(
            "uniq_aggregate_hosts0host0aggregate_id",
            &["host", "aggregate_id"],
        )
        .foreign_key(&["aggregate_id"], "aggregates", &["id"])
}

fn aggregate_metadata() -> TableDef {
    TableDef::new("aggregate_metadata")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("aggregate_id", Integer).not_null())
        .column(ColumnDef::new("key", Varchar(255)).not_null())
        .column(ColumnDef::new("value", Varchar(255)).not_null())
        .unique(
            "uniq_aggregate_metadata0aggregate_id0key",
            &["aggregate_id", "key"],
        )
        .index("aggregate_metadata_key_idx", &["key"])
        .foreign_key(&["aggregate_id"], "aggregates", &["id"])
}

fn instance_groups() -> TableDef {
    TableDef::new("instance_groups")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("user_id", Varchar(255)))
        .column(ColumnDef::new("project_id", Varchar(255)))
        .column(ColumnDef::new("uuid", Varchar(36)).not_null())
        .column(ColumnDef::new("name", Varchar(255)))
        .unique("uniq_instance_groups0uuid", &["uuid"])
}

fn instance_group_policy() -> TableDef {
    TableDef::new("instance_group_policy")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("policy", Varchar(255)))
        .column(ColumnDef::new("group_id", Integer).not_null())
        .column(ColumnDef::new("rules", Text))
        .index("instance_group_policy_policy_idx", &["policy"])
        .foreign_key(&["group_id"], "instance_groups", &["id"])
}

fn instance_group_member() -> TableDef {
    TableDef::new("instance_group_member")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("instance_uuid", Varchar(255)))
        .column(ColumnDef::new("group_id", Integer).not_null())
        .index("instance_group_member_instance_idx", &["instance_uuid"])
        .foreign_key(&["group_id"], "instance_groups", &["id"])
}
