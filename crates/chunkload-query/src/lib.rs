mod filter;
mod operator;
mod parse_filter;
mod record;
mod select;
mod value;

pub use filter::Filter;
pub use operator::Operator;
pub use parse_filter::{FilterParseError, parse_filters};
pub use record::Record;
pub use select::Select;
pub use value::Value;
