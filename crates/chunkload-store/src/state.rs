use chunkload_engine::{Delta, EntityTable, Row};
use imbl::OrdSet;

/// Lifecycle of one partition within a store.
///
/// `Unrequested → Loading → {Loaded, Errored}`; `Errored → Loading` only
/// through an explicit retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionStatus {
    Unrequested,
    Loading,
    Loaded,
    Errored,
}

/// Immutable snapshot of everything a store holds.
///
/// Built from persistent collections, so cloning shares structure and a
/// commit only copies the paths it touches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    table: EntityTable,
    loading: OrdSet<String>,
    loaded: OrdSet<String>,
    errored: OrdSet<String>,
}

impl StoreState {
    pub fn table(&self) -> &EntityTable {
        &self.table
    }

    pub fn get(&self, key: &str) -> Option<&Row> {
        self.table.get(key)
    }

    pub fn entity_count(&self) -> usize {
        self.table.len()
    }

    pub fn loading(&self) -> &OrdSet<String> {
        &self.loading
    }

    pub fn loaded(&self) -> &OrdSet<String> {
        &self.loaded
    }

    pub fn errored(&self) -> &OrdSet<String> {
        &self.errored
    }

    pub fn status(&self, partition: &str) -> PartitionStatus {
        if self.loading.contains(partition) {
            PartitionStatus::Loading
        } else if self.loaded.contains(partition) {
            PartitionStatus::Loaded
        } else if self.errored.contains(partition) {
            PartitionStatus::Errored
        } else {
            PartitionStatus::Unrequested
        }
    }

    // ── Transitions ───────────────────────────────────────────

    /// `Unrequested → Loading`. False for any other starting status.
    pub(crate) fn begin_load(&mut self, partition: &str) -> bool {
        if self.status(partition) != PartitionStatus::Unrequested {
            return false;
        }
        self.loading.insert(partition.to_string());
        true
    }

    /// `Errored → Loading`. False for any other starting status.
    pub(crate) fn restart_load(&mut self, partition: &str) -> bool {
        if self.errored.remove(partition).is_none() {
            return false;
        }
        self.loading.insert(partition.to_string());
        true
    }

    /// `Loading → Loaded`, applying the partition's delta in the same step.
    pub(crate) fn finish_loaded(&mut self, partition: &str, delta: Delta) {
        delta.apply(&mut self.table);
        self.loading.remove(partition);
        self.loaded.insert(partition.to_string());
    }

    /// `Loading → Errored`. The table is left as it was.
    pub(crate) fn finish_errored(&mut self, partition: &str) {
        self.loading.remove(partition);
        self.errored.insert(partition.to_string());
    }
}
