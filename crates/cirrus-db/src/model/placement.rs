//! Resource providers, inventories, allocations, traits and consumers.

use cirrus_core::schema::{ColumnDef, TableDef};
use cirrus_core::schema::SqlType::{Float, Integer, Timestamp, Varchar};

pub(super) fn tables() -> Vec<TableDef> {
    vec![
        resource_providers(),
        inventories(),
        allocations(),
        resource_provider_aggregates(),
        placement_aggregates(),
        resource_classes(),
        traits(),
        resource_provider_traits(),
        consumers(),
        projects(),
        users(),
    ]
}

fn resource_providers() -> TableDef {
    TableDef::new("resource_providers")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("uuid", Varchar(36)).not_null())
        .column(ColumnDef::new("name", Varchar(200)))
        .column(ColumnDef::new("generation", Integer))
        .column(ColumnDef::new("root_provider_id", Integer))
        .column(ColumnDef::new("parent_provider_id", Integer))
        .unique("uniq_resource_providers0uuid", &["uuid"])
        .unique("uniq_resource_providers0name", &["name"])
        .index("resource_providers_name_idx", &["name"])
        .index("resource_providers_uuid_idx", &["uuid"])
        .index("resource_providers_root_provider_id_idx", &["root_provider_id"])
        .index(
            "resource_providers_parent_provider_id_idx",
            &["parent_provider_id"],
        )
        .foreign_key(&["root_provider_id"], "resource_providers", &["id"])
        .foreign_key(&["parent_provider_id"], "resource_providers", &["id"])
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

fn placement_aggregates() -> TableDef {
    TableDef::new("placement_aggregates")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("uuid", Varchar(36)))
        .unique("uniq_placement_aggregates0uuid", &["uuid"])
}

fn resource_classes() -> TableDef {
    TableDef::new("resource_classes")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("name", Varchar(255)).not_null())
        .unique("uniq_resource_classes0name", &["name"])
}

fn traits() -> TableDef {
    TableDef::new("traits")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("name", Varchar(255)).not_null())
        .unique("uniq_traits0name", &["name"])
}

fn resource_provider_traits() -> TableDef {
    TableDef::new("resource_provider_traits")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("trait_id", Integer).primary_key())
        .column(ColumnDef::new("resource_provider_id", Integer).primary_key())
        .index(
            "resource_provider_traits_resource_provider_trait_idx",
            &["resource_provider_id", "trait_id"],
        )
        .foreign_key(&["trait_id"], "traits", &["id"])
        .foreign_key(&["resource_provider_id"], "resource_providers", &["id"])
}

fn consumers() -> TableDef {
    TableDef::new("consumers")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("uuid", Varchar(36)).not_null())
        .column(ColumnDef::new("project_id", Integer).not_null())
        .column(ColumnDef::new("user_id", Integer).not_null())
        .column(ColumnDef::new("generation", Integer).not_null())
        .unique("uniq_consumers0uuid", &["uuid"])
        .index("consumers_project_id_uuid_idx", &["project_id", "uuid"])
        .index(
            "consumers_project_id_user_id_uuid_idx",
            &["project_id", "user_id", "uuid"],
        )
}

fn projects() -> TableDef {
    TableDef::new("projects")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("external_id", Varchar(255)).not_null())
        .unique("uniq_projects0external_id", &["external_id"])
}

fn users() -> TableDef {
    TableDef::new("users")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("external_id", Varchar(255)).not_null())
        .unique("uniq_users0external_id", &["external_id"])
}
