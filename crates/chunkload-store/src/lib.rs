mod config;
mod coordinator;
mod error;
mod request;
pub mod selectors;
mod state;
mod store;
mod subscription;

pub use config::StoreConfig;
pub use error::StoreError;
pub use request::{LoadOutcome, LoadRequest};
pub use state::{PartitionStatus, StoreState};
pub use store::Store;
pub use subscription::Subscription;

pub use chunkload_engine::{ColumnMap, EntityTable, Row};
pub use chunkload_loader::{
    AutoType, CsvParser, HttpTransport, InferType, LoadError, Parse, StaticTransport, Transport,
    Verbatim,
};
pub use chunkload_query::{Filter, FilterParseError, Operator, Record, Select, Value, parse_filters};
