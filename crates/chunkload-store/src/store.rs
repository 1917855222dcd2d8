use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use chunkload_engine::{ColumnMap, Row, select};
use chunkload_loader::{HttpTransport, Transport};
use chunkload_query::{Record, Select};
use imbl::OrdSet;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::state::{PartitionStatus, StoreState};
use crate::subscription::{Subscription, Watchers};

pub(crate) struct StoreInner {
    pub(crate) config: StoreConfig,
    pub(crate) columns: ColumnMap,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) limiter: Option<Arc<Semaphore>>,
    state: ArcSwap<StoreState>,
    /// Serializes commits; readers go through `state` and never take it.
    write_lock: Mutex<()>,
    watchers: Watchers,
    /// Cancellation handles for partitions currently in `loading`.
    pub(crate) in_flight: Mutex<HashMap<String, CancellationToken>>,
}

/// Handle to one partitioned, incrementally loaded entity store.
///
/// Cheap to clone; clones share state. Independent stores are fully
/// isolated from each other.
#[derive(Clone)]
pub struct Store {
    pub(crate) inner: Arc<StoreInner>,
}

impl Store {
    /// Build a store that fetches partitions over HTTP.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let transport = HttpTransport::with_timeout(config.load_timeout);
        Self::with_transport(config, transport)
    }

    pub fn with_transport(
        config: StoreConfig,
        transport: impl Transport + 'static,
    ) -> Result<Self, StoreError> {
        let columns = ColumnMap::new(config.columns.iter().cloned())?;
        let limiter = match config.max_concurrent_loads {
            Some(0) => {
                return Err(StoreError::InvalidConfig(
                    "max_concurrent_loads must be at least 1".into(),
                ));
            }
            Some(limit) => Some(Arc::new(Semaphore::new(limit))),
            None => None,
        };

        Ok(Self {
            inner: Arc::new(StoreInner {
                config,
                columns,
                transport: Arc::new(transport),
                limiter,
                state: ArcSwap::from_pointee(StoreState::default()),
                write_lock: Mutex::new(()),
                watchers: Watchers::default(),
                in_flight: Mutex::new(HashMap::new()),
            }),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.config.endpoint
    }

    pub fn columns(&self) -> &[String] {
        &self.inner.config.columns
    }

    pub fn column_map(&self) -> &ColumnMap {
        &self.inner.columns
    }

    // ── Reads ─────────────────────────────────────────────────

    /// The current committed state. Stays valid and unchanged while later
    /// commits happen.
    pub fn snapshot(&self) -> Arc<StoreState> {
        self.inner.state.load_full()
    }

    /// Filter and project the merged entities.
    pub fn select(&self, options: &Select) -> Result<Vec<Record>, StoreError> {
        let state = self.inner.state.load();
        Ok(select(state.table(), &self.inner.columns, options)?)
    }

    /// Positional row for one entity key.
    pub fn get_by_id(&self, key: &str) -> Option<Row> {
        self.inner.state.load().get(key).cloned()
    }

    pub fn status(&self, partition: &str) -> PartitionStatus {
        self.inner.state.load().status(partition)
    }

    pub fn loading(&self) -> OrdSet<String> {
        self.inner.state.load().loading().clone()
    }

    pub fn loaded(&self) -> OrdSet<String> {
        self.inner.state.load().loaded().clone()
    }

    pub fn errored(&self) -> OrdSet<String> {
        self.inner.state.load().errored().clone()
    }

    pub fn entity_count(&self) -> usize {
        self.inner.state.load().entity_count()
    }

    /// Watch one slice of state. The subscription wakes only when
    /// `selector`'s result differs from what it last published.
    ///
    /// ```no_run
    /// # use chunkload_store::{Store, selectors};
    /// # async fn demo(store: Store) {
    /// let mut loading = store.subscribe(selectors::loading);
    /// while loading.changed().await {
    ///     println!("{} partitions loading", loading.get().len());
    /// }
    /// # }
    /// ```
    pub fn subscribe<T, F>(&self, selector: F) -> Subscription<T>
    where
        T: PartialEq + Send + Sync + 'static,
        F: Fn(&StoreState) -> T + Send + Sync + 'static,
    {
        // registering under the write lock means no commit slips in between
        // seeding the value and being notified
        let _guard = self.write_guard();
        self.inner
            .watchers
            .register(&self.inner.state.load(), selector)
    }

    // ── Commits ───────────────────────────────────────────────

    /// Run `f` on a copy of the current state and publish the result.
    pub(crate) fn commit<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let _guard = self.write_guard();
        let mut next = StoreState::clone(&self.inner.state.load());
        let result = f(&mut next);
        self.publish(next);
        result
    }

    /// Like [`commit`](Self::commit), but `f` returning `None` means nothing
    /// changed: the copy is discarded and no subscriber hears about it.
    pub(crate) fn commit_if<R>(&self, f: impl FnOnce(&mut StoreState) -> Option<R>) -> Option<R> {
        let _guard = self.write_guard();
        let mut next = StoreState::clone(&self.inner.state.load());
        let result = f(&mut next)?;
        self.publish(next);
        Some(result)
    }

    // caller holds the write lock
    fn publish(&self, next: StoreState) {
        let next = Arc::new(next);
        self.inner.state.store(Arc::clone(&next));
        self.inner.watchers.notify(&next);
    }

    pub(crate) fn in_flight(&self) -> MutexGuard<'_, HashMap<String, CancellationToken>> {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.inner
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
