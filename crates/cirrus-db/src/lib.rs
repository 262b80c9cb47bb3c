pub mod db;
pub mod inspect;
pub mod migrations;
pub mod model;
pub mod sync;
pub mod testing;

pub use db::Database;
pub use inspect::{DbColumn, DbForeignKey, DbTable, DbUnique, Inspector};
pub use migrations::{catalog, Migration, MigrationRunner, HEAD_VERSION, INITIAL_VERSION};
pub use sync::{check_model_sync, DiffEntry, SchemaDiff, SyncFilter};
