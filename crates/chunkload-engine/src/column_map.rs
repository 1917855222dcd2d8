use std::collections::HashMap;

use crate::error::EngineError;

/// Fixed mapping from column name to row position.
///
/// A full map covers positions `0..width` in declaration order. A projected
/// map (see [`ColumnMap::project`]) keeps the original positions for a
/// subset of names, so it decodes rows of the same width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    columns: Vec<(String, usize)>,
    index: HashMap<String, usize>,
    width: usize,
}

impl ColumnMap {
    /// Build the full map from an ordered column list.
    pub fn new<I, S>(columns: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = Vec::new();
        let mut index = HashMap::new();
        for (position, name) in columns.into_iter().enumerate() {
            let name = name.into();
            if index.insert(name.clone(), position).is_some() {
                return Err(EngineError::DuplicateColumn(name));
            }
            entries.push((name, position));
        }
        if entries.is_empty() {
            return Err(EngineError::EmptyColumns);
        }
        let width = entries.len();
        Ok(Self {
            columns: entries,
            index,
            width,
        })
    }

    /// Restrict the map to `names`, in the order given.
    ///
    /// Repeated names collapse to their first occurrence.
    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, EngineError> {
        let mut columns = Vec::with_capacity(names.len());
        let mut index = HashMap::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let position = self
                .position(name)
                .ok_or_else(|| EngineError::UnknownColumn(name.to_string()))?;
            if index.insert(name.to_string(), position).is_none() {
                columns.push((name.to_string(), position));
            }
        }
        Ok(Self {
            columns,
            index,
            width: self.width,
        })
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Length of every row encoded with the full map.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of columns in this map (less than `width` once projected).
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Name of the first declared column, the default primary key.
    pub fn first(&self) -> Option<&str> {
        self.columns.first().map(|(name, _)| name.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.columns.iter().map(|(name, pos)| (name.as_str(), *pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_follow_declaration_order() {
        let map = ColumnMap::new(["id", "name", "lat", "lon"]).unwrap();
        assert_eq!(map.position("id"), Some(0));
        assert_eq!(map.position("lon"), Some(3));
        assert_eq!(map.position("zip"), None);
        assert_eq!(map.width(), 4);
        assert_eq!(map.first(), Some("id"));
    }

    #[test]
    fn rejects_duplicates_and_empty() {
        assert_eq!(
            ColumnMap::new(["id", "id"]).unwrap_err(),
            EngineError::DuplicateColumn("id".into())
        );
        assert_eq!(
            ColumnMap::new(Vec::<String>::new()).unwrap_err(),
            EngineError::EmptyColumns
        );
    }

    #[test]
    fn projection_keeps_positions_and_input_order() {
        let map = ColumnMap::new(["id", "name", "lat"]).unwrap();
        let projected = map.project(&["lat", "id", "lat"]).unwrap();
        assert_eq!(projected.iter().collect::<Vec<_>>(), vec![("lat", 2), ("id", 0)]);
        assert_eq!(projected.width(), 3);
        assert_eq!(projected.len(), 2);
    }

    #[test]
    fn projection_rejects_unknown_columns() {
        let map = ColumnMap::new(["id"]).unwrap();
        assert_eq!(
            map.project(&["zip"]).unwrap_err(),
            EngineError::UnknownColumn("zip".into())
        );
    }
}
