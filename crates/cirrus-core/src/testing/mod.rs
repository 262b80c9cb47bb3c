//! Testing utilities.
//!
//! Migration tests run against a real PostgreSQL instance, never a mock.
//! Database configuration is explicit: tests read TEST_DATABASE_URL (not
//! DATABASE_URL) and are skipped when it is unset, so the suite is safe to
//! run on machines without a configured database.

pub mod db;

pub use db::{IsolatedTestDb, TestDatabase};
