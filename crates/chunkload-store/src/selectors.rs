//! Ready-made selectors for [`Store::subscribe`](crate::Store::subscribe).

use chunkload_engine::EntityTable;
use imbl::OrdSet;

use crate::state::StoreState;

pub fn loading(state: &StoreState) -> OrdSet<String> {
    state.loading().clone()
}

pub fn loaded(state: &StoreState) -> OrdSet<String> {
    state.loaded().clone()
}

pub fn errored(state: &StoreState) -> OrdSet<String> {
    state.errored().clone()
}

pub fn entity_count(state: &StoreState) -> usize {
    state.entity_count()
}

pub fn table(state: &StoreState) -> EntityTable {
    state.table().clone()
}
