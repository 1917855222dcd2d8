use std::ops::Deref;

use chunkload_query::Value;

/// Positional encoding of one entity. Slot `i` holds the value of the
/// column at position `i` of the store's column map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(Vec<Value>);

/// Primary key to current row. Ordered, so iteration is stable for an
/// unchanged table; persistent, so snapshots clone cheaply.
pub type EntityTable = imbl::OrdMap<String, Row>;

impl Row {
    /// A row of `width` nulls.
    pub fn nulls(width: usize) -> Self {
        Row(vec![Value::Null; width])
    }

    pub fn get(&self, position: usize) -> Option<&Value> {
        self.0.get(position)
    }

    pub(crate) fn set(&mut self, position: usize, value: Value) {
        self.0[position] = value;
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }
}

impl Deref for Row {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.0
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row(values)
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Row(iter.into_iter().collect())
    }
}
