use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

use crate::state::StoreState;

/// A live view of one slice of store state.
///
/// Only wakes when the selected slice actually changes; commits that leave
/// it equal are invisible here.
pub struct Subscription<T> {
    receiver: watch::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    /// Latest published value.
    pub fn get(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Latest published value, marking it seen.
    pub fn get_and_mark_seen(&mut self) -> T {
        self.receiver.borrow_and_update().clone()
    }

    /// True when a value newer than the last one seen is waiting.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Wait for the next change. False once the store is gone.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}

trait Watcher: Send + Sync {
    /// Publish the selected slice of `state`. False once nobody listens.
    fn publish(&self, state: &StoreState) -> bool;
}

struct SelectorWatcher<T, F> {
    selector: F,
    sender: watch::Sender<T>,
}

impl<T, F> Watcher for SelectorWatcher<T, F>
where
    T: PartialEq + Send + Sync,
    F: Fn(&StoreState) -> T + Send + Sync,
{
    fn publish(&self, state: &StoreState) -> bool {
        if self.sender.is_closed() {
            return false;
        }
        let next = (self.selector)(state);
        self.sender.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        true
    }
}

#[derive(Default)]
pub(crate) struct Watchers {
    entries: Mutex<Vec<Box<dyn Watcher>>>,
}

impl Watchers {
    /// Register `selector`, seeding it with its value for `state`.
    pub(crate) fn register<T, F>(&self, state: &StoreState, selector: F) -> Subscription<T>
    where
        T: PartialEq + Send + Sync + 'static,
        F: Fn(&StoreState) -> T + Send + Sync + 'static,
    {
        let (sender, receiver) = watch::channel(selector(state));
        self.lock().push(Box::new(SelectorWatcher { selector, sender }));
        Subscription { receiver }
    }

    /// Re-run every selector against `state`, dropping closed subscriptions.
    pub(crate) fn notify(&self, state: &StoreState) {
        self.lock().retain(|watcher| watcher.publish(state));
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Box<dyn Watcher>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
