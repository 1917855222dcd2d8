use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Everything needed to construct a [`Store`](crate::Store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL; partition `p` is fetched from `endpoint/p`.
    pub endpoint: String,
    /// Ordered column list. The first column is the default primary key.
    pub columns: Vec<String>,
    /// Upper bound on partitions fetching or parsing at once. `None` is unbounded.
    #[serde(default)]
    pub max_concurrent_loads: Option<usize>,
    /// Per-partition bound on fetch + parse.
    #[serde(default, rename = "load_timeout_ms", with = "millis")]
    pub load_timeout: Option<Duration>,
}

impl StoreConfig {
    pub fn new<I, S>(endpoint: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            endpoint: endpoint.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            max_concurrent_loads: None,
            load_timeout: None,
        }
    }

    pub fn with_max_concurrent_loads(mut self, limit: usize) -> Self {
        self.max_concurrent_loads = Some(limit);
        self
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}
