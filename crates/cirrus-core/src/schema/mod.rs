mod table;
mod types;

pub use table::{ColumnDef, ForeignKeyDef, IndexDef, TableDef, UniqueDef};
pub use types::{EnumTypeDef, SqlType};
