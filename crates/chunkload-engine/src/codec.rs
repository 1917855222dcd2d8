use chunkload_query::{Record, Value};

use crate::column_map::ColumnMap;
use crate::row::Row;

/// Place each known field of `record` at its mapped position. Fields the
/// map does not know are dropped; unset positions stay `null`.
pub fn encode(record: &Record, columns: &ColumnMap) -> Row {
    let mut row = Row::nulls(columns.width());
    for (name, value) in record.iter() {
        if let Some(position) = columns.position(name) {
            row.set(position, value.clone());
        }
    }
    row
}

/// Same as [`encode`], moving values out of the record instead of cloning.
pub fn encode_owned(record: Record, columns: &ColumnMap) -> Row {
    let mut row = Row::nulls(columns.width());
    for (name, value) in record {
        if let Some(position) = columns.position(&name) {
            row.set(position, value);
        }
    }
    row
}

/// Read every column of `columns` back into a labeled record.
///
/// Total: each column produces a field, `null` when the row has nothing there.
pub fn decode(row: &Row, columns: &ColumnMap) -> Record {
    let mut record = Record::with_capacity(columns.len());
    for (name, position) in columns.iter() {
        let value = row.get(position).cloned().unwrap_or(Value::Null);
        record.push(name.to_string(), value);
    }
    record
}
