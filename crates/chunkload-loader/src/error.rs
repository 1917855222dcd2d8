/// Partition-scoped failure while fetching or parsing one resource.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("http {status} for {url}")]
    Http {
        url: String,
        status: http::StatusCode,
    },

    #[error("parse error: {0}")]
    Parse(String),
}

impl LoadError {
    pub fn transport(url: &str, message: impl ToString) -> Self {
        LoadError::Transport {
            url: url.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<csv::Error> for LoadError {
    fn from(e: csv::Error) -> Self {
        LoadError::Parse(e.to_string())
    }
}
