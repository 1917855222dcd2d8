use chunkload_engine::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
