mod codec;
mod column_map;
mod error;
mod merge;
mod row;
mod select;

pub use codec::{decode, encode, encode_owned};
pub use column_map::ColumnMap;
pub use error::EngineError;
pub use merge::{Delta, merge, merge_rows};
pub use row::{EntityTable, Row};
pub use select::select;
