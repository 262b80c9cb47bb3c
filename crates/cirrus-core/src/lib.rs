pub mod config;
pub mod error;
pub mod schema;
pub mod testing;

pub use config::{CirrusConfig, DatabaseConfig};
pub use error::{CirrusError, Result};
pub use schema::{
    ColumnDef, EnumTypeDef, ForeignKeyDef, IndexDef, SqlType, TableDef, UniqueDef,
};
