mod error;
mod infer;
mod locator;
mod parse;
mod transport;

pub use error::LoadError;
pub use infer::{AutoType, InferType, Verbatim};
pub use locator::partition_url;
pub use parse::{CsvParser, Parse};
pub use transport::{HttpTransport, StaticTransport, Transport};
