//! Current object-relational model of the control-plane API database.
//!
//! This is the schema the application maps against TODAY: the baseline
//! tables plus every column added by later versions, minus columns that were
//! retired from the model but still exist in the database (those are
//! whitelisted by the sync check, see `sync::SyncFilter`).
//!
//! The declarations here are intentionally independent of
//! `migrations::baseline`: the sync check exists precisely to prove that the
//! migration history and this model arrive at the same schema.

mod flavors;
mod mappings;
mod placement;
mod quotas;
mod requests;

use cirrus_core::schema::TableDef;

/// All tables of the current model.
pub fn control_plane_tables() -> Vec<TableDef> {
    let mut tables = Vec::new();
    tables.extend(mappings::tables());
    tables.extend(flavors::tables());
    tables.extend(requests::tables());
    tables.extend(placement::tables());
    tables.extend(quotas::tables());
    tables
}
