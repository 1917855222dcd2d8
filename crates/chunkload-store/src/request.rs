use std::fmt;
use std::sync::Arc;

use chunkload_loader::Parse;

/// One partition load: which partition, which column keys its rows, and
/// how to parse it. Key defaults to the first declared column, parser to
/// the type-inferring CSV parser.
#[derive(Clone)]
pub struct LoadRequest {
    pub partition: String,
    pub key: Option<String>,
    pub parser: Option<Arc<dyn Parse>>,
}

impl LoadRequest {
    pub fn new(partition: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            key: None,
            parser: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_parser(mut self, parser: impl Parse + 'static) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }
}

impl fmt::Debug for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadRequest")
            .field("partition", &self.partition)
            .field("key", &self.key)
            .field("custom_parser", &self.parser.is_some())
            .finish()
    }
}

impl From<&str> for LoadRequest {
    fn from(partition: &str) -> Self {
        Self::new(partition)
    }
}

impl From<String> for LoadRequest {
    fn from(partition: String) -> Self {
        Self::new(partition)
    }
}

/// What happened to one load request.
///
/// Informational only: failures are already recorded in the store's
/// `errored` set, and no load call ever returns an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The partition was already loading, loaded or errored (or, for a
    /// retry, was not errored). Nothing changed.
    Skipped,
    /// Committed. `rows` entities were added or updated; `skipped` records
    /// had no key.
    Loaded { rows: usize, skipped: usize },
    Failed { reason: String },
    Cancelled,
    TimedOut,
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}
