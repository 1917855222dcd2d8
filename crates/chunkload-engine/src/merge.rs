use std::collections::BTreeMap;

use chunkload_query::{Record, Value};

use crate::codec::encode_owned;
use crate::column_map::ColumnMap;
use crate::error::EngineError;
use crate::row::{EntityTable, Row};

// ── Row merge ─────────────────────────────────────────────────

/// Fold `incoming` into `existing`, slot by slot.
///
/// A truthy incoming value always wins. Otherwise a non-empty existing
/// value is kept, so a partial update can fill gaps but never blank out
/// something already known.
pub fn merge(existing: &Row, incoming: &Row) -> Result<Row, EngineError> {
    if existing.len() != incoming.len() {
        return Err(EngineError::LengthMismatch {
            existing: existing.len(),
            incoming: incoming.len(),
        });
    }
    Ok(existing
        .iter()
        .zip(incoming.iter())
        .map(|(old, new)| merge_slot(old, new))
        .collect())
}

fn merge_slot(existing: &Value, incoming: &Value) -> Value {
    if incoming.is_truthy() {
        incoming.clone()
    } else if !existing.is_empty() {
        existing.clone()
    } else if !incoming.is_empty() {
        // known `false` / `0` fills a gap
        incoming.clone()
    } else {
        Value::Null
    }
}

// ── Batch merge ───────────────────────────────────────────────

/// Key to row changes produced by one batch of incoming records.
///
/// Computed in full before anything touches the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    entries: BTreeMap<String, Row>,
    skipped: usize,
}

impl Delta {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records dropped because their key column was empty.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn get(&self, key: &str) -> Option<&Row> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Row)> {
        self.entries.iter().map(|(k, row)| (k.as_str(), row))
    }

    /// Write every entry into `table`.
    pub fn apply(self, table: &mut EntityTable) {
        for (key, row) in self.entries {
            table.insert(key, row);
        }
    }
}

/// Encode `records` and merge each into the row already known for its key.
///
/// The row compared against is the one produced earlier in this batch if
/// the key repeats, else the committed row in `table`, else none (the
/// encoded row is taken as-is). Any length mismatch aborts the whole batch.
pub fn merge_rows<I>(
    table: &EntityTable,
    records: I,
    key_column: &str,
    columns: &ColumnMap,
) -> Result<Delta, EngineError>
where
    I: IntoIterator<Item = Record>,
{
    let key_position = columns
        .position(key_column)
        .ok_or_else(|| EngineError::UnknownColumn(key_column.to_string()))?;

    let mut delta = Delta::default();
    for record in records {
        let row = encode_owned(record, columns);
        let Some(key) = row.get(key_position).and_then(Value::as_key) else {
            delta.skipped += 1;
            continue;
        };
        let key = key.into_owned();

        let merged = match delta.entries.get(&key).or_else(|| table.get(&key)) {
            Some(existing) => merge(existing, &row)?,
            None => row,
        };
        delta.entries.insert(key, merged);
    }
    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[Value]) -> Row {
        Row::from(values.to_vec())
    }

    fn rec(fields: &[(&str, Value)]) -> Record {
        fields.iter().cloned().collect()
    }

    #[test]
    fn truthy_incoming_overrides() {
        let merged = merge(
            &row(&["a".into(), "Old".into()]),
            &row(&["a".into(), "New".into()]),
        )
        .unwrap();
        assert_eq!(merged, row(&["a".into(), "New".into()]));
    }

    #[test]
    fn empty_incoming_never_blanks_known_value() {
        let existing = row(&["a".into(), "Alpha".into(), Value::Number(3.0)]);
        let incoming = row(&["a".into(), "".into(), Value::Null]);
        assert_eq!(merge(&existing, &incoming).unwrap(), existing);
    }

    #[test]
    fn falsy_known_values_survive_and_fill_gaps() {
        let existing = row(&[Value::Bool(false), Value::Null, Value::Number(0.0)]);
        let incoming = row(&[Value::Null, Value::Number(0.0), Value::Null]);
        assert_eq!(
            merge(&existing, &incoming).unwrap(),
            row(&[Value::Bool(false), Value::Number(0.0), Value::Number(0.0)])
        );
    }

    #[test]
    fn known_falsy_value_replaces_empty_string() {
        let existing = row(&["".into(), "".into()]);
        let incoming = row(&[Value::Number(0.0), Value::Bool(false)]);
        assert_eq!(merge(&existing, &incoming).unwrap(), incoming);
    }

    #[test]
    fn both_empty_yields_null() {
        let merged = merge(&row(&["".into()]), &row(&[Value::Null])).unwrap();
        assert_eq!(merged, row(&[Value::Null]));
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let err = merge(&row(&["a".into()]), &row(&["a".into(), "b".into()])).unwrap_err();
        assert_eq!(
            err,
            EngineError::LengthMismatch {
                existing: 1,
                incoming: 2
            }
        );
    }

    #[test]
    fn merge_rows_builds_delta_against_table() {
        let columns = ColumnMap::new(["id", "name", "lat"]).unwrap();
        let mut table = EntityTable::new();
        table.insert("a".into(), row(&["a".into(), "Alpha".into(), Value::Number(1.0)]));
        table.insert("z".into(), row(&["z".into(), "Zed".into(), Value::Null]));

        let delta = merge_rows(
            &table,
            vec![
                rec(&[("id", "a".into()), ("lat", Value::Number(2.0))]),
                rec(&[("id", "b".into()), ("name", "Beta".into())]),
            ],
            "id",
            &columns,
        )
        .unwrap();

        assert_eq!(delta.len(), 2);
        assert_eq!(
            delta.get("a"),
            Some(&row(&["a".into(), "Alpha".into(), Value::Number(2.0)]))
        );
        assert_eq!(
            delta.get("b"),
            Some(&row(&["b".into(), "Beta".into(), Value::Null]))
        );
        // untouched keys are not part of the delta
        assert!(delta.get("z").is_none());

        let mut next = table.clone();
        delta.apply(&mut next);
        assert_eq!(next.len(), 3);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn repeated_keys_within_a_batch_fold_together() {
        let columns = ColumnMap::new(["id", "name", "lat"]).unwrap();
        let delta = merge_rows(
            &EntityTable::new(),
            vec![
                rec(&[("id", "a".into()), ("name", "Alpha".into())]),
                rec(&[("id", "a".into()), ("lat", Value::Number(4.0))]),
            ],
            "id",
            &columns,
        )
        .unwrap();
        assert_eq!(
            delta.get("a"),
            Some(&row(&["a".into(), "Alpha".into(), Value::Number(4.0)]))
        );
    }

    #[test]
    fn numeric_keys_render_as_strings() {
        let columns = ColumnMap::new(["id", "name"]).unwrap();
        let delta = merge_rows(
            &EntityTable::new(),
            vec![rec(&[("id", Value::Number(6001.0)), ("name", "x".into())])],
            "id",
            &columns,
        )
        .unwrap();
        assert!(delta.get("6001").is_some());
    }

    #[test]
    fn records_without_key_are_skipped() {
        let columns = ColumnMap::new(["id", "name"]).unwrap();
        let delta = merge_rows(
            &EntityTable::new(),
            vec![
                rec(&[("name", "orphan".into())]),
                rec(&[("id", Value::Null), ("name", "null id".into())]),
                rec(&[("id", "a".into())]),
            ],
            "id",
            &columns,
        )
        .unwrap();
        assert_eq!(delta.len(), 1);
        assert_eq!(delta.skipped(), 2);
    }

    #[test]
    fn unknown_key_column_is_an_error() {
        let columns = ColumnMap::new(["id"]).unwrap();
        let err = merge_rows(&EntityTable::new(), Vec::new(), "uuid", &columns).unwrap_err();
        assert_eq!(err, EngineError::UnknownColumn("uuid".into()));
    }

    #[test]
    fn stale_table_rows_abort_the_batch() {
        let columns = ColumnMap::new(["id", "name"]).unwrap();
        let mut table = EntityTable::new();
        table.insert("a".into(), row(&["a".into()]));

        let err = merge_rows(
            &table,
            vec![
                rec(&[("id", "b".into())]),
                rec(&[("id", "a".into()), ("name", "Alpha".into())]),
            ],
            "id",
            &columns,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::LengthMismatch { .. }));
    }
}
