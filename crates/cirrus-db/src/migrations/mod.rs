pub mod baseline;
pub mod catalog;
mod runner;

pub use catalog::{Migration, HEAD_VERSION, INITIAL_VERSION};
pub use runner::{AppliedMigration, MigrationRunner, MigrationStatus};
