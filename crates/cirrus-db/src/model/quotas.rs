//! Quota limits, usages and reservations.

use cirrus_core::schema::{ColumnDef, TableDef};
use cirrus_core::schema::SqlType::{Integer, Timestamp, Varchar};

pub(super) fn tables() -> Vec<TableDef> {
    vec![
        quota_classes(),
        quota_usages(),
        quotas(),
        project_user_quotas(),
        reservations(),
    ]
}

fn quota_classes() -> TableDef {
    TableDef::new("quota_classes")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("class_name", Varchar(255)))
        .column(ColumnDef::new("resource", Varchar(255)))
        .column(ColumnDef::new("hard_limit", Integer))
        .index("quota_classes_class_name_idx", &["class_name"])
}

fn quota_usages() -> TableDef {
    TableDef::new("quota_usages")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("project_id", Varchar(255)))
        .column(ColumnDef::new("resource", Varchar(255)).not_null())
        .column(ColumnDef::new("in_use", Integer).not_null())
        .column(ColumnDef::new("reserved", Integer).not_null())
        .column(ColumnDef::new("until_refresh", Integer))
        .column(ColumnDef::new("user_id", Varchar(255)))
        .index("quota_usages_project_id_idx", &["project_id"])
        .index("quota_usages_user_id_idx", &["user_id"])
}

fn quotas() -> TableDef {
    TableDef::new("quotas")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("project_id", Varchar(255)))
        .column(ColumnDef::new("resource", Varchar(255)).not_null())
        .column(ColumnDef::new("hard_limit", Integer))
        .unique("uniq_quotas0project_id0resource", &["project_id", "resource"])
}

fn project_user_quotas() -> TableDef {
    TableDef::new("project_user_quotas")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("user_id", Varchar(255)).not_null())
        .column(ColumnDef::new("project_id", Varchar(255)).not_null())
        .column(ColumnDef::new("resource", Varchar(255)).not_null())
        .column(ColumnDef::new("hard_limit", Integer))
        .unique(
            "uniq_project_user_quotas0user_id0project_id0resource",
            &["user_id", "project_id", "resource"],
        )
        .index("project_user_quotas_project_id_idx", &["project_id"])
        .index("project_user_quotas_user_id_idx", &["user_id"])
}

fn reservations() -> TableDef {
    TableDef::new("reservations")
        .column(ColumnDef::new("created_at", Timestamp))
        .column(ColumnDef::new("updated_at", Timestamp))
        .column(ColumnDef::new("id", Integer).primary_key())
        .column(ColumnDef::new("uuid", Varchar(36)).not_null())
        .column(ColumnDef::new("usage_id", Integer).not_null())
        .column(ColumnDef::new("project_id", Varchar(255)))
        .column(ColumnDef::new("resource", Varchar(255)))
        .column(ColumnDef::new("delta", Integer).not_null())
        .column(ColumnDef::new("expire", Timestamp))
        .column(ColumnDef::new("user_id", Varchar(255)))
        .index("reservations_project_id_idx", &["project_id"])
        .index("reservations_uuid_idx", &["uuid"])
        .index("reservations_expire_idx", &["expire"])
        .index("reservations_user_id_idx", &["user_id"])
        .foreign_key(&["usage_id"], "quota_usages", &["id"])
}
