use serde::{Deserialize, Serialize};

use crate::filter::Filter;

/// Options for a query over the merged entity table.
///
/// With neither `columns` nor `filters` every entity is returned with every column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Select {
    /// Project to these columns, in this order.
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    /// AND-combined predicates.
    #[serde(default)]
    pub filters: Option<Vec<Filter>>,
}

impl Select {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.get_or_insert_with(Vec::new).push(filter);
        self
    }

    pub fn filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = Some(filters);
        self
    }

    /// True when the query can skip projection and filtering entirely.
    pub fn is_unrestricted(&self) -> bool {
        self.columns.is_none() && self.filters.is_none()
    }
}
