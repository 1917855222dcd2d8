use std::sync::Arc;
use std::time::{Duration, Instant};

use chunkload_engine::{EngineError, merge_rows};
use chunkload_loader::{CsvParser, LoadError, Parse, partition_url};
use chunkload_query::Record;
use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::request::{LoadOutcome, LoadRequest};
use crate::store::Store;

/// Why a started load did not commit rows.
#[derive(Debug, thiserror::Error)]
enum LoadFailure {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Merge(#[from] EngineError),

    #[error("load task failed: {0}")]
    Task(String),

    #[error("cancelled")]
    Cancelled,

    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

impl LoadFailure {
    fn outcome(&self) -> LoadOutcome {
        match self {
            LoadFailure::Cancelled => LoadOutcome::Cancelled,
            LoadFailure::TimedOut(_) => LoadOutcome::TimedOut,
            other => LoadOutcome::Failed {
                reason: other.to_string(),
            },
        }
    }
}

impl Store {
    /// Load one partition and merge its rows into the table.
    ///
    /// A partition that is already loading or loaded is left alone and no
    /// fetch is issued. An errored partition is left alone too; reloading it
    /// takes an explicit [`retry_load`](Self::retry_load). Otherwise it
    /// enters `loading` before this call first suspends, and leaves it
    /// together with the commit of its rows (into `loaded`) or without
    /// touching the table (into `errored`). Failures are logged and
    /// recorded, never returned.
    ///
    /// Dropping the returned future before it completes abandons the load:
    /// the partition goes to `errored` and can be retried.
    pub async fn request_load(&self, request: impl Into<LoadRequest>) -> LoadOutcome {
        let request = request.into();
        match self.begin(&request.partition, false) {
            Some(pending) => self.run_load(request, pending).await,
            None => LoadOutcome::Skipped,
        }
    }

    /// Move an errored partition back to `loading` and load it again.
    /// Skipped for partitions that are not errored.
    pub async fn retry_load(&self, request: impl Into<LoadRequest>) -> LoadOutcome {
        let request = request.into();
        match self.begin(&request.partition, true) {
            Some(pending) => self.run_load(request, pending).await,
            None => LoadOutcome::Skipped,
        }
    }

    /// Like [`request_load`](Self::request_load), but runs on its own task.
    ///
    /// The partition is already in `loading` when this returns. Must be
    /// called from within a Tokio runtime.
    pub fn spawn_load(&self, request: impl Into<LoadRequest>) -> JoinHandle<LoadOutcome> {
        let request = request.into();
        match self.begin(&request.partition, false) {
            Some(pending) => {
                let store = self.clone();
                tokio::spawn(async move { store.run_load(request, pending).await })
            }
            None => tokio::spawn(async { LoadOutcome::Skipped }),
        }
    }

    /// Start a load for every partition and wait for all of them.
    ///
    /// Concurrency is bounded only by `max_concurrent_loads`. Outcomes are
    /// returned in request order.
    pub async fn load_all<I>(&self, requests: I) -> Vec<LoadOutcome>
    where
        I: IntoIterator,
        I::Item: Into<LoadRequest>,
    {
        let handles: Vec<_> = requests.into_iter().map(|r| self.spawn_load(r)).collect();
        join_all(handles)
            .await
            .into_iter()
            .map(|joined| {
                joined.unwrap_or_else(|e| LoadOutcome::Failed {
                    reason: format!("load task failed: {e}"),
                })
            })
            .collect()
    }

    /// Cancel an in-flight load. It ends up in `errored`, retryable, even
    /// when its rows were already parsed. False when the partition is not
    /// loading or its commit already happened.
    pub fn cancel_load(&self, partition: &str) -> bool {
        match self.in_flight().get(partition) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every in-flight load. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let in_flight = self.in_flight();
        for token in in_flight.values() {
            token.cancel();
        }
        in_flight.len()
    }

    // ── Pipeline ──────────────────────────────────────────────

    /// Transition into `loading` and hand out the load's pending handle.
    fn begin(&self, partition: &str, retry: bool) -> Option<PendingLoad> {
        let token = self.commit_if(|state| {
            let started = if retry {
                state.restart_load(partition)
            } else {
                state.begin_load(partition)
            };
            started.then(|| {
                let token = CancellationToken::new();
                self.in_flight()
                    .insert(partition.to_string(), token.clone());
                token
            })
        });
        match token {
            Some(token) => Some(PendingLoad {
                store: self.clone(),
                partition: partition.to_string(),
                token,
                settled: false,
            }),
            None => {
                tracing::debug!(
                    partition,
                    retry,
                    status = ?self.status(partition),
                    "load request skipped"
                );
                None
            }
        }
    }

    async fn run_load(&self, request: LoadRequest, mut pending: PendingLoad) -> LoadOutcome {
        let started = Instant::now();
        let LoadRequest {
            partition,
            key,
            parser,
        } = request;
        let url = partition_url(&self.inner.config.endpoint, &partition);
        let parser = parser.unwrap_or_else(|| Arc::new(CsvParser::default()) as Arc<dyn Parse>);

        let fetched = self.fetch_and_parse(&url, parser, &pending.token).await;
        // no suspension point from here on; the commit below settles the load
        pending.settled = true;
        let result = match fetched {
            Ok(records) => {
                self.commit_records(&partition, key.as_deref(), records, &pending.token)
            }
            Err(failure) => {
                self.commit_failure(&partition);
                Err(failure)
            }
        };

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        match result {
            Ok(outcome) => {
                tracing::debug!(
                    partition = %partition,
                    url = %url,
                    elapsed_ms,
                    ?outcome,
                    "partition loaded"
                );
                outcome
            }
            Err(failure @ (LoadFailure::Cancelled | LoadFailure::TimedOut(_))) => {
                tracing::warn!(
                    partition = %partition,
                    url = %url,
                    elapsed_ms,
                    error = %failure,
                    "partition load abandoned"
                );
                failure.outcome()
            }
            Err(failure) => {
                tracing::error!(
                    partition = %partition,
                    url = %url,
                    elapsed_ms,
                    error = %failure,
                    "partition load failed"
                );
                failure.outcome()
            }
        }
    }

    /// Fetch and parse off the async runtime, bounded by the concurrency
    /// limit, the load timeout and the cancellation token.
    async fn fetch_and_parse(
        &self,
        url: &str,
        parser: Arc<dyn Parse>,
        token: &CancellationToken,
    ) -> Result<Vec<Record>, LoadFailure> {
        let _permit = match &self.inner.limiter {
            Some(limiter) => tokio::select! {
                _ = token.cancelled() => return Err(LoadFailure::Cancelled),
                permit = Arc::clone(limiter).acquire_owned() => {
                    Some(permit.map_err(|e| LoadFailure::Task(e.to_string()))?)
                }
            },
            None => None,
        };

        let transport = Arc::clone(&self.inner.transport);
        let owned_url = url.to_string();
        let task = tokio::task::spawn_blocking(move || {
            let text = transport.fetch(&owned_url)?;
            parser.parse(&text)
        });
        let work = async {
            match task.await {
                Ok(parsed) => parsed.map_err(LoadFailure::from),
                Err(e) => Err(LoadFailure::Task(e.to_string())),
            }
        };
        let bounded = async {
            match self.inner.config.load_timeout {
                Some(limit) => tokio::time::timeout(limit, work)
                    .await
                    .unwrap_or_else(|_| Err(LoadFailure::TimedOut(limit))),
                None => work.await,
            }
        };

        tokio::select! {
            _ = token.cancelled() => Err(LoadFailure::Cancelled),
            result = bounded => result,
        }
    }

    /// Merge against the latest table and commit rows and status together.
    fn commit_records(
        &self,
        partition: &str,
        key: Option<&str>,
        records: Vec<Record>,
        token: &CancellationToken,
    ) -> Result<LoadOutcome, LoadFailure> {
        let columns = &self.inner.columns;
        let key = key.or_else(|| columns.first()).unwrap_or_default();

        self.commit(|state| {
            // a cancel_load that found the token cancelled it before this removal
            self.in_flight().remove(partition);
            if token.is_cancelled() {
                state.finish_errored(partition);
                return Err(LoadFailure::Cancelled);
            }
            match merge_rows(state.table(), records, key, columns) {
                Ok(delta) => {
                    let outcome = LoadOutcome::Loaded {
                        rows: delta.len(),
                        skipped: delta.skipped(),
                    };
                    state.finish_loaded(partition, delta);
                    Ok(outcome)
                }
                Err(e) => {
                    state.finish_errored(partition);
                    Err(LoadFailure::Merge(e))
                }
            }
        })
    }

    fn commit_failure(&self, partition: &str) {
        self.commit(|state| {
            self.in_flight().remove(partition);
            state.finish_errored(partition);
        });
    }
}

/// A started load that has not committed yet.
///
/// Dropped unsettled (the driving future was dropped, or its task aborted
/// before finishing) it commits the partition as errored, so it never stays
/// in `loading` with nobody working on it.
struct PendingLoad {
    store: Store,
    partition: String,
    token: CancellationToken,
    settled: bool,
}

impl Drop for PendingLoad {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.token.cancel();
        tracing::warn!(partition = %self.partition, "load dropped before commit");
        self.store.commit_failure(&self.partition);
    }
}
