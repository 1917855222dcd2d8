use std::collections::HashMap;
use std::time::Duration;

use crate::error::LoadError;

/// Fetches the raw text of one partition resource.
///
/// Implementations block; the store runs them on the blocking pool.
pub trait Transport: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String, LoadError>;
}

// ── HttpTransport ─────────────────────────────────────────────

/// Plain HTTP GET. Any non-2xx status is a failure.
pub struct HttpTransport {
    agent: ureq::Agent,
    body_limit: u64,
}

impl HttpTransport {
    pub const DEFAULT_BODY_LIMIT: u64 = 64 * 1024 * 1024;

    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// Bound each request (connect through body read) by `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            body_limit: Self::DEFAULT_BODY_LIMIT,
        }
    }

    /// Largest response body accepted, in bytes.
    pub fn with_body_limit(mut self, limit: u64) -> Self {
        self.body_limit = limit;
        self
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &str) -> Result<String, LoadError> {
        tracing::debug!(url, "fetching partition");
        let mut response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| LoadError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Http {
                url: url.to_string(),
                status,
            });
        }

        response
            .body_mut()
            .with_config()
            .limit(self.body_limit)
            .read_to_string()
            .map_err(|e| LoadError::transport(url, e))
    }
}

// ── StaticTransport ───────────────────────────────────────────

/// Serves fixed bodies from memory. Unknown URLs answer 404.
#[derive(Debug, Clone, Default)]
pub struct StaticTransport {
    bodies: HashMap<String, String>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }
}

impl Transport for StaticTransport {
    fn fetch(&self, url: &str) -> Result<String, LoadError> {
        self.bodies.get(url).cloned().ok_or_else(|| LoadError::Http {
            url: url.to_string(),
            status: http::StatusCode::NOT_FOUND,
        })
    }
}
