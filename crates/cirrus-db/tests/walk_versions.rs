//! Version-walk and model-sync integration tests.
//!
//! These tests need a PostgreSQL server and opt in through TEST_DATABASE_URL;
//! they skip silently when it is unset. Each test provisions its own
//! disposable database and drops it afterwards.
//!
//! The walk applies every schema version in order against a fresh database.
//! Versions that change data-bearing tables get a fixture seeded beforehand
//! and an assertion on the resulting schema (and the fixture's survival)
//! afterwards, so a version that clobbers existing rows fails here rather
//! than in production.

use sqlx::{PgPool, Row};

use cirrus_core::error::CirrusError;
use cirrus_core::testing::{IsolatedTestDb, TestDatabase};
use cirrus_db::testing::{
    assert_column_exists, assert_column_not_exists, assert_foreign_key_exists,
    assert_index_exists, assert_table_exists, assert_table_not_exists,
    assert_unique_constraint_exists,
};
use cirrus_db::{catalog, check_model_sync, MigrationRunner};

/// Versions with no per-version assertion: the baseline (covered by the final
/// sync check), the data-enforcement slot and the reserved placeholders.
const UNCHECKED_VERSIONS: &[u32] = &[20, 30];

async fn test_db() -> Option<TestDatabase> {
    match TestDatabase::from_env().await {
        Ok(db) => Some(db),
        Err(_) => {
            eprintln!("Skipping test: TEST_DATABASE_URL not set");
            None
        }
    }
}

async fn scalar_i64(pool: &PgPool, sql: &str) -> i64 {
    sqlx::query_scalar(sql).fetch_one(pool).await.unwrap()
}

/// Seed fixture rows before applying `version`.
async fn pre_upgrade(db: &IsolatedTestDb, version: u32) {
    match version {
        28 => {
            // A build request that must survive the column type change.
            db.execute(
                r#"INSERT INTO build_requests (id, project_id, instance)
                   VALUES (2021, 'fake_proj_id', '{"uuid": "foo", "name": "bar"}')"#,
            )
            .await
            .unwrap();
        }
        52 => {
            // A request spec whose serialized payload must survive.
            db.execute(
                r#"INSERT INTO request_specs (id, instance_uuid, spec)
                   VALUES (42, '00000000-0000-0000-0000-00000000002a',
                           '{"instance_group": {"members": ["a", "b"]}}')"#,
            )
            .await
            .unwrap();
        }
        59 => {
            // An existing consumer that must pick up generation 0.
            db.execute("INSERT INTO projects (id, external_id) VALUES (1, 'proj')")
                .await
                .unwrap();
            db.execute("INSERT INTO users (id, external_id) VALUES (1, 'user')")
                .await
                .unwrap();
            db.execute(
                r#"INSERT INTO consumers (uuid, project_id, user_id)
                   VALUES ('11111111-2222-3333-4444-555555555555', 1, 1)"#,
            )
            .await
            .unwrap();
        }
        _ => {}
    }
}

/// Assert on the schema after applying `version`.
async fn check(pool: &PgPool, version: u32) -> bool {
    match version {
        26 => {
            assert_table_exists(pool, "resource_classes").await;
            assert_unique_constraint_exists(
                pool,
                "resource_classes",
                "uniq_resource_classes0name",
                &["name"],
            )
            .await;
        }
        27 => {
            for table in [
                "quota_classes",
                "quota_usages",
                "quotas",
                "project_user_quotas",
                "reservations",
            ] {
                assert_table_exists(pool, table).await;
            }
            assert_foreign_key_exists(pool, "reservations", &["usage_id"], "quota_usages").await;
            assert_index_exists(pool, "quota_usages", "quota_usages_project_id_idx").await;
            assert_index_exists(pool, "reservations", "reservations_uuid_idx").await;
            assert_unique_constraint_exists(
                pool,
                "quotas",
                "uniq_quotas0project_id0resource",
                &["project_id", "resource"],
            )
            .await;
        }
        28 => {
            assert_column_exists(pool, "build_requests", "block_device_mappings").await;

            // The fixture row survives the type change with its serialized
            // payload intact
            let row = sqlx::query(
                "SELECT project_id, instance FROM build_requests WHERE id = 2021",
            )
            .fetch_one(pool)
            .await
            .expect("build_requests fixture lost");
            let project_id: String = row.get("project_id");
            let instance: String = row.get("instance");
            assert_eq!(project_id, "fake_proj_id");
            assert_eq!(instance, r#"{"uuid": "foo", "name": "bar"}"#);
        }
        29 => {
            assert_table_exists(pool, "placement_aggregates").await;
            assert_unique_constraint_exists(
                pool,
                "placement_aggregates",
                "uniq_placement_aggregates0uuid",
                &["uuid"],
            )
            .await;
        }
        41 => {
            assert_table_exists(pool, "traits").await;
            assert_table_exists(pool, "resource_provider_traits").await;
            assert_index_exists(
                pool,
                "resource_provider_traits",
                "resource_provider_traits_resource_provider_trait_idx",
            )
            .await;
            assert_foreign_key_exists(pool, "resource_provider_traits", &["trait_id"], "traits")
                .await;
            assert_foreign_key_exists(
                pool,
                "resource_provider_traits",
                &["resource_provider_id"],
                "resource_providers",
            )
            .await;
        }
        42 => {
            assert_column_exists(pool, "build_requests", "tags").await;
        }
        43 => {
            assert_table_exists(pool, "consumers").await;
            assert_unique_constraint_exists(pool, "consumers", "uniq_consumers0uuid", &["uuid"])
                .await;
            assert_index_exists(pool, "consumers", "consumers_project_id_uuid_idx").await;
            assert_index_exists(pool, "consumers", "consumers_project_id_user_id_uuid_idx").await;
        }
        44 => {
            assert_table_exists(pool, "projects").await;
            assert_table_exists(pool, "users").await;

            // project_id and user_id switch from external strings to
            // surrogate integer ids
            let inspector = cirrus_db::Inspector::new(pool.clone());
            let columns = inspector.columns("consumers").await.unwrap();
            for name in ["project_id", "user_id"] {
                let column = columns.iter().find(|c| c.name == name).unwrap();
                assert_eq!(column.data_type, "integer", "consumers.{}", name);
                assert!(!column.nullable, "consumers.{}", name);
            }

            // Covering indexes are recreated after the column swap
            assert_index_exists(pool, "consumers", "consumers_project_id_uuid_idx").await;
            assert_index_exists(pool, "consumers", "consumers_project_id_user_id_uuid_idx").await;
        }
        50 => {
            assert_column_exists(pool, "flavors", "description").await;
        }
        51 => {
            assert_column_exists(pool, "resource_providers", "root_provider_id").await;
            assert_column_exists(pool, "resource_providers", "parent_provider_id").await;
            assert_index_exists(
                pool,
                "resource_providers",
                "resource_providers_root_provider_id_idx",
            )
            .await;
            assert_index_exists(
                pool,
                "resource_providers",
                "resource_providers_parent_provider_id_idx",
            )
            .await;
            assert_foreign_key_exists(
                pool,
                "resource_providers",
                &["root_provider_id"],
                "resource_providers",
            )
            .await;
        }
        52 => {
            let spec: String = sqlx::query("SELECT spec FROM request_specs WHERE id = 42")
                .fetch_one(pool)
                .await
                .unwrap()
                .get("spec");
            assert!(spec.contains("instance_group"), "request_specs fixture lost");
        }
        58 => {
            assert_column_exists(pool, "cell_mappings", "disabled").await;
        }
        59 => {
            assert_column_exists(pool, "consumers", "generation").await;

            // The pre-existing consumer picked up the default
            let generation = scalar_i64(
                pool,
                "SELECT generation::bigint FROM consumers \
                 WHERE uuid = '11111111-2222-3333-4444-555555555555'",
            )
            .await;
            assert_eq!(generation, 0);
        }
        60 => {
            assert_column_exists(pool, "instance_group_policy", "rules").await;
        }
        61 => {
            assert_column_exists(pool, "instance_mappings", "queued_for_delete").await;

            let inspector = cirrus_db::Inspector::new(pool.clone());
            let columns = inspector.columns("instance_mappings").await.unwrap();
            let column = columns
                .iter()
                .find(|c| c.name == "queued_for_delete")
                .unwrap();
            assert!(!column.nullable);
        }
        62 => {
            assert_column_exists(pool, "instance_mappings", "user_id").await;
            assert_index_exists(
                pool,
                "instance_mappings",
                "instance_mappings_user_id_project_id_idx",
            )
            .await;
        }
        _ => return false,
    }
    true
}

/// Walk every schema version in order against a fresh database, asserting on
/// the schema after each one.
#[tokio::test]
async fn test_walk_versions() {
    let Some(base) = test_db().await else { return };
    let db = base.isolated("walk_versions").await.unwrap();
    let runner = MigrationRunner::new(db.pool().clone());

    assert_eq!(runner.current_version().await.unwrap(), None);

    for migration in catalog::all() {
        pre_upgrade(&db, migration.version).await;

        runner.run_to(migration.version).await.unwrap_or_else(|e| {
            panic!("version {} ({}) failed: {}", migration.version, migration.name, e)
        });

        let checked = check(db.pool(), migration.version).await;

        // Every version that does schema work must have an assertion above
        if !migration.is_placeholder() && !UNCHECKED_VERSIONS.contains(&migration.version) {
            assert!(
                checked,
                "version {} ({}) has no post-apply check",
                migration.version, migration.name
            );
        }
    }

    assert_eq!(
        runner.current_version().await.unwrap(),
        Some(catalog::HEAD_VERSION)
    );

    db.cleanup().await.unwrap();
}

/// Baseline schema assertions that do not fit a single later version.
#[tokio::test]
async fn test_baseline_schema() {
    let Some(base) = test_db().await else { return };
    let db = base.isolated("baseline_schema").await.unwrap();
    let runner = MigrationRunner::new(db.pool().clone());

    runner.run_to(20).await.unwrap();

    for table in [
        "cell_mappings",
        "host_mappings",
        "instance_mappings",
        "flavors",
        "flavor_extra_specs",
        "flavor_projects",
        "request_specs",
        "build_requests",
        "key_pairs",
        "resource_providers",
        "inventories",
        "allocations",
        "resource_provider_aggregates",
        "aggregates",
        "aggregate_hosts",
        "aggregate_metadata",
        "instance_groups",
        "instance_group_policy",
        "instance_group_member",
    ] {
        assert_table_exists(db.pool(), table).await;
    }

    // Nothing from later versions leaks into the baseline
    assert_table_not_exists(db.pool(), "resource_classes").await;
    assert_table_not_exists(db.pool(), "consumers").await;
    assert_column_not_exists(db.pool(), "flavors", "description").await;
    assert_column_not_exists(db.pool(), "cell_mappings", "disabled").await;

    assert_unique_constraint_exists(
        db.pool(),
        "cell_mappings",
        "uniq_cell_mappings0uuid",
        &["uuid"],
    )
    .await;
    assert_index_exists(db.pool(), "cell_mappings", "uuid_idx").await;
    assert_foreign_key_exists(db.pool(), "host_mappings", &["cell_id"], "cell_mappings").await;

    // key_pairs.type defaults to 'ssh' through the enum
    db.execute("INSERT INTO key_pairs (name, user_id) VALUES ('kp', 'user1')")
        .await
        .unwrap();
    let kind: String = sqlx::query("SELECT type::text AS t FROM key_pairs WHERE name = 'kp'")
        .fetch_one(db.pool())
        .await
        .unwrap()
        .get("t");
    assert_eq!(kind, "ssh");

    db.cleanup().await.unwrap();
}

/// Re-running the full catalog against an up-to-date database is a no-op.
#[tokio::test]
async fn test_rerun_is_idempotent() {
    let Some(base) = test_db().await else { return };
    let db = base.isolated("rerun").await.unwrap();
    let runner = MigrationRunner::new(db.pool().clone());

    runner.run().await.unwrap();
    let status = runner.status().await.unwrap();
    assert!(status.pending.is_empty());

    runner.run().await.unwrap();
    let again = runner.status().await.unwrap();
    assert_eq!(again.applied.len(), status.applied.len());

    db.cleanup().await.unwrap();
}

/// The advisory lock is released when the run finishes; a fresh session must
/// be able to take it immediately.
#[tokio::test]
async fn test_migration_lock_released_after_run() {
    let Some(base) = test_db().await else { return };
    let db = base.isolated("lock_released").await.unwrap();

    MigrationRunner::new(db.pool().clone()).run().await.unwrap();

    let other = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .connect(db.url())
        .await
        .unwrap();
    let acquired: bool = sqlx::query_scalar("SELECT pg_try_advisory_lock($1)")
        .bind(MigrationRunner::LOCK_ID)
        .fetch_one(&other)
        .await
        .unwrap();
    assert!(acquired, "migration lock still held after run");

    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(MigrationRunner::LOCK_ID)
        .execute(&other)
        .await
        .unwrap();
    other.close().await;

    db.cleanup().await.unwrap();
}

/// A database at the head version matches the declared model exactly, modulo
/// the whitelisted legacy columns.
#[tokio::test]
async fn test_model_schema_sync() {
    let Some(base) = test_db().await else { return };
    let db = base.isolated("model_sync").await.unwrap();

    MigrationRunner::new(db.pool().clone()).run().await.unwrap();

    check_model_sync(db.pool()).await.unwrap_or_else(|e| {
        panic!("model out of sync with migrated schema:\n{}", e);
    });

    db.cleanup().await.unwrap();
}

/// The sync check actually detects drift: dropping a model column from the
/// schema must fail it.
#[tokio::test]
async fn test_sync_detects_drift() {
    let Some(base) = test_db().await else { return };
    let db = base.isolated("sync_drift").await.unwrap();

    MigrationRunner::new(db.pool().clone()).run().await.unwrap();
    db.execute("ALTER TABLE flavors DROP COLUMN description")
        .await
        .unwrap();

    let err = check_model_sync(db.pool()).await.unwrap_err();
    match err {
        CirrusError::SyncMismatch(report) => {
            assert!(report.contains("flavors.description"), "report: {}", report);
        }
        other => panic!("expected SyncMismatch, got: {}", other),
    }

    db.cleanup().await.unwrap();
}
