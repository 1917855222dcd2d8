#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Rows built from different column maps met in a merge.
    #[error("cannot merge rows of different length: existing {existing}, incoming {incoming}")]
    LengthMismatch { existing: usize, incoming: usize },

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("column list is empty")]
    EmptyColumns,
}
