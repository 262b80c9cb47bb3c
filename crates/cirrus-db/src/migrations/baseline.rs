//! Baseline schema (version 20): the squashed table set the API database
//! starts from. Later versions build on these tables incrementally; this
//! module must therefore never change.

use cirrus_core::schema::{ColumnDef, EnumTypeDef, SqlType, TableDef};

use SqlType::{Boolean, Enum, Float, Inet, Integer, MediumText, Text, Timestamp, Varchar};

/// Enum types referenced by the baseline tables, created ahead of them.
pub fn enum_types() -> Vec<EnumTypeDef> {
    vec![
        EnumTypeDef::new("keypair_types", &["ssh", "x509"]),
        EnumTypeDef::new("build_requests0locked_by", &["owner", "admin"]),
    ]
}

/// The baseline tables, in creation order (referenced tables first).
pub fn tables() -> Vec<TableDef> {
    vec![
        cell_mappings(),
        host_mappings(),
        instance_mappings(),
        flavors(),
        flavor_extra_specs(),
        flavor_projects(),
        request_specs(),
        build_requests(),
        key_pairs(),
        resource_providers(),
        inventories(),
        allocations(),
        resource_provider_aggregates(),
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
        .unique("uniq_instance_mappings0instance_uuid", &["instance_uuid"])
        .index("instance_uuid_idx", &["instance_uuid"])
        .index("project_id_idx", &["project_id"])
        .foreign_key(&["cell_id"], "cell_mappings", &["id"])
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

fn request_specs() -> TableDef {
    TableDef::new("request_specs")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("instance_uuid", Varchar(36)).not_null())
        .column(ColumnDef::new("spec", Text).not_null())
        .unique("uniq_request_specs0instance_uuid", &["instance_uuid"])
        .index("request_spec_instance_uuid_idx", &["instance_uuid"])
}

// The wide baseline shape; most of these columns were superseded by the
// serialized instance payload and are retired from the model (see
// sync::SyncFilter) while remaining in the database.
fn build_requests() -> TableDef {
    TableDef::new("build_requests")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("request_spec_id", Integer))
        .column(ColumnDef::new("project_id", Varchar(255)).not_null())
        .column(ColumnDef::new("user_id", Varchar(255)))
        .column(ColumnDef::new("display_name", Varchar(255)))
        .column(ColumnDef::new("instance_metadata", Text))
        .column(ColumnDef::new("progress", Integer))
        .column(ColumnDef::new("vm_state", Varchar(255)))
        .column(ColumnDef::new("task_state", Varchar(255)))
        .column(ColumnDef::new("image_ref", Varchar(255)))
        .column(ColumnDef::new("access_ip_v4", Inet))
        .column(ColumnDef::new("access_ip_v6", Inet))
        .column(ColumnDef::new("info_cache", Text))
        .column(ColumnDef::new("security_groups", Text))
        .column(ColumnDef::new("config_drive", Boolean))
        .column(ColumnDef::new("key_name", Varchar(255)))
        .column(ColumnDef::new(
            "locked_by",
            Enum("build_requests0locked_by".to_string()),
        ))
        .column(ColumnDef::new("instance_uuid", Varchar(36)))
        .column(ColumnDef::new("instance", Text))
        .column(ColumnDef::new("block_device_mappings", MediumText))
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
            ColumnDef::new("type", Enum("keypair_types".to_string()))
                .not_null()
                .default_expr("'ssh'"),
        )
        .unique("uniq_key_pairs0user_id0name", &["user_id", "name"])
}

fn resource_providers() -> TableDef {
    TableDef::new("resource_providers")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("uuid", Varchar(36)).not_null())
        .column(ColumnDef::new("name", Varchar(200)))
        .column(ColumnDef::new("generation", Integer))
        .column(ColumnDef::new("can_host", Integer))
        .unique("uniq_resource_providers0uuid", &["uuid"])
        .unique("uniq_resource_providers0name", &["name"])
        .index("resource_providers_name_idx", &["name"])
        .index("resource_providers_uuid_idx", &["uuid"])
}

fn inventories() -> TableDef {
    TableDef::new("inventories")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("resource_provider_id", Integer).not_null())
        .column(ColumnDef::new("resource_class_id", Integer).not_null())
        .column(ColumnDef::new("total", Integer).not_null())
        .column(ColumnDef::new("reserved", Integer).not_null())
        .column(ColumnDef::new("min_unit", Integer).not_null())
        .column(ColumnDef::new("max_unit", Integer).not_null())
        .column(ColumnDef::new("step_size", Integer).not_null())
        .column(ColumnDef::new("allocation_ratio", Float).not_null())
        .index("inventories_resource_provider_id_idx", &["resource_provider_id"])
        .index(
            "inventories_resource_provider_resource_class_idx",
            &["resource_provider_id", "resource_class_id"],
        )
        .index("inventories_resource_class_id_idx", &["resource_class_id"])
        .unique(
            "uniq_inventories0resource_provider_resource_class",
            &["resource_provider_id", "resource_class_id"],
        )
}

fn allocations() -> TableDef {
    TableDef::new("allocations")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("resource_provider_id", Integer).not_null())
        .column(ColumnDef::new("consumer_id", Varchar(36)).not_null())
        .column(ColumnDef::new("resource_class_id", Integer).not_null())
        .column(ColumnDef::new("used", Integer).not_null())
        .index(
            "allocations_resource_provider_class_used_idx",
            &["resource_provider_id", "resource_class_id", "used"],
        )
        .index("allocations_resource_class_id_idx", &["resource_class_id"])
        .index("allocations_consumer_id_idx", &["consumer_id"])
}

fn resource_provider_aggregates() -> TableDef {
    TableDef::new("resource_provider_aggregates")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("resource_provider_id", Integer).primary_key())
        .column(ColumnDef::new("aggregate_id", Integer).primary_key())
        .index(
            "resource_provider_aggregates_aggregate_id_idx",
            &["aggregate_id"],
        )
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
