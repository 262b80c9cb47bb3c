//! Ordered catalog of schema versions.
//!
//! Versions are contiguous integers starting just above `INITIAL_VERSION`.
//! Version 20 is the squashed baseline rendered from declarative metadata;
//! later versions are incremental SQL scripts embedded at compile time.
//! Reserved placeholder slots keep numbering aligned across release
//! branches and execute no SQL.

use cirrus_core::error::{CirrusError, Result};

use super::baseline;

/// Version the walk starts above; the baseline applies as version 20.
pub const INITIAL_VERSION: u32 = 19;

/// Newest known version.
pub const HEAD_VERSION: u32 = 82;

/// A single schema version.
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: u32,
    pub name: String,
    pub sql: String,
}

impl Migration {
    pub fn new(version: u32, name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
            sql: sql.into(),
        }
    }

    /// A reserved slot that executes no SQL.
    pub fn placeholder(version: u32) -> Self {
        Self::new(version, format!("{:03}_placeholder", version), "")
    }

    /// True when applying this version changes nothing.
    pub fn is_placeholder(&self) -> bool {
        self.sql.trim().is_empty()
    }
}

const V026_RESOURCE_CLASSES: &str = include_str!("../../migrations/026_resource_classes.sql");
const V027_QUOTAS: &str = include_str!("../../migrations/027_quotas.sql");
const V028_BLOCK_DEVICE_MAPPINGS: &str =
    include_str!("../../migrations/028_build_requests_block_device_mappings.sql");
const V029_PLACEMENT_AGGREGATES: &str =
    include_str!("../../migrations/029_placement_aggregates.sql");
const V041_TRAITS: &str = include_str!("../../migrations/041_traits.sql");
const V042_BUILD_REQUEST_TAGS: &str = include_str!("../../migrations/042_build_requests_tags.sql");
const V043_CONSUMERS: &str = include_str!("../../migrations/043_consumers.sql");
const V044_PROJECTS_USERS: &str = include_str!("../../migrations/044_projects_users.sql");
const V050_FLAVOR_DESCRIPTION: &str =
    include_str!("../../migrations/050_flavors_description.sql");
const V051_PROVIDER_HIERARCHY: &str =
    include_str!("../../migrations/051_resource_provider_hierarchy.sql");
const V052_REQUEST_SPEC: &str = include_str!("../../migrations/052_request_specs_spec.sql");
const V058_CELL_DISABLED: &str = include_str!("../../migrations/058_cell_mappings_disabled.sql");
const V059_CONSUMER_GENERATION: &str =
    include_str!("../../migrations/059_consumers_generation.sql");
const V060_GROUP_POLICY_RULES: &str =
    include_str!("../../migrations/060_instance_group_policy_rules.sql");
const V061_QUEUED_FOR_DELETE: &str =
    include_str!("../../migrations/061_instance_mappings_queued_for_delete.sql");
const V062_MAPPING_USER_ID: &str =
    include_str!("../../migrations/062_instance_mappings_user_id.sql");

/// Render the squashed baseline: enum types first, then tables in
/// dependency order with their indexes.
fn initial_sql() -> String {
    let mut statements: Vec<String> = baseline::enum_types().iter().map(|e| e.to_sql()).collect();

    for table in baseline::tables() {
        statements.extend(table.to_sql());
    }

    statements.join("\n\n")
}

/// All known migrations, ordered by version.
pub fn all() -> Vec<Migration> {
    let mut migrations = vec![Migration::new(20, "020_initial", initial_sql())];

    migrations.extend((21..=25).map(Migration::placeholder));
    migrations.push(Migration::new(26, "026_resource_classes", V026_RESOURCE_CLASSES));
    migrations.push(Migration::new(27, "027_quotas", V027_QUOTAS));
    migrations.push(Migration::new(
        28,
        "028_build_requests_block_device_mappings",
        V028_BLOCK_DEVICE_MAPPINGS,
    ));
    migrations.push(Migration::new(
        29,
        "029_placement_aggregates",
        V029_PLACEMENT_AGGREGATES,
    ));
    // Data enforcement only; no schema change.
    migrations.push(Migration::new(30, "030_enforce_mappings", ""));
    migrations.extend((31..=40).map(Migration::placeholder));
    migrations.push(Migration::new(41, "041_traits", V041_TRAITS));
    migrations.push(Migration::new(42, "042_build_requests_tags", V042_BUILD_REQUEST_TAGS));
    migrations.push(Migration::new(43, "043_consumers", V043_CONSUMERS));
    migrations.push(Migration::new(44, "044_projects_users", V044_PROJECTS_USERS));
    migrations.extend((45..=49).map(Migration::placeholder));
    migrations.push(Migration::new(
        50,
        "050_flavors_description",
        V050_FLAVOR_DESCRIPTION,
    ));
    migrations.push(Migration::new(
        51,
        "051_resource_provider_hierarchy",
        V051_PROVIDER_HIERARCHY,
    ));
    migrations.push(Migration::new(52, "052_request_specs_spec", V052_REQUEST_SPEC));
    migrations.extend((53..=57).map(Migration::placeholder));
    migrations.push(Migration::new(58, "058_cell_mappings_disabled", V058_CELL_DISABLED));
    migrations.push(Migration::new(
        59,
        "059_consumers_generation",
        V059_CONSUMER_GENERATION,
    ));
    migrations.push(Migration::new(
        60,
        "060_instance_group_policy_rules",
        V060_GROUP_POLICY_RULES,
    ));
    migrations.push(Migration::new(
        61,
        "061_instance_mappings_queued_for_delete",
        V061_QUEUED_FOR_DELETE,
    ));
    migrations.push(Migration::new(
        62,
        "062_instance_mappings_user_id",
        V062_MAPPING_USER_ID,
    ));
    migrations.extend((63..=82).map(Migration::placeholder));

    migrations
}

/// Check that a catalog is contiguous and starts where it should.
pub fn validate(migrations: &[Migration]) -> Result<()> {
    let mut expected = INITIAL_VERSION + 1;

    for migration in migrations {
        if migration.version != expected {
            return Err(CirrusError::Migration(format!(
                "catalog out of order: expected version {}, found {} ({})",
                expected, migration.version, migration.name
            )));
        }
        expected += 1;
    }

    Ok(())
}
