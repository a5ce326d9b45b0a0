//! In-process observer registry for live per-user task queries.
//!
//! # Responsibility
//! - Track active watch callbacks keyed by user and fan task snapshots
//!   out to every watcher of that user.
//! - Tie registration lifetime to [`WatchHandle`]; a dropped handle stops
//!   receiving snapshots.
//!
//! # Invariants
//! - Callbacks are invoked outside the registry lock, so a callback may
//!   re-enter the registry (e.g. unsubscribe itself).
//! - `unsubscribe` is idempotent and remains safe after the owning
//!   registry has been dropped.

use crate::model::task::Task;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type WatchId = u64;
type WatchCallback = Arc<dyn Fn(&[Task]) + Send + Sync>;

struct WatchEntry {
    id: WatchId,
    user_id: String,
    callback: WatchCallback,
}

#[derive(Default)]
struct WatchInner {
    next_id: WatchId,
    entries: Vec<WatchEntry>,
}

/// Registry of live task watchers.
#[derive(Clone, Default)]
pub struct TaskWatchers {
    inner: Arc<Mutex<WatchInner>>,
}

impl TaskWatchers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` as a watcher of `user_id`.
    ///
    /// The callback receives no snapshot here; delivery is driven by
    /// [`TaskWatchers::notify`] and [`TaskWatchers::deliver_to`].
    pub fn register(
        &self,
        user_id: &str,
        callback: impl Fn(&[Task]) + Send + Sync + 'static,
    ) -> WatchHandle {
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(WatchEntry {
            id,
            user_id: user_id.to_string(),
            callback: Arc::new(callback),
        });

        WatchHandle {
            registry: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Whether at least one watcher is registered for `user_id`.
    pub fn is_watched(&self, user_id: &str) -> bool {
        lock(&self.inner)
            .entries
            .iter()
            .any(|entry| entry.user_id == user_id)
    }

    /// Delivers `tasks` to every watcher of `user_id`.
    pub fn notify(&self, user_id: &str, tasks: &[Task]) {
        let callbacks: Vec<WatchCallback> = {
            let inner = lock(&self.inner);
            inner
                .entries
                .iter()
                .filter(|entry| entry.user_id == user_id)
                .map(|entry| Arc::clone(&entry.callback))
                .collect()
        };

        for callback in callbacks {
            callback(tasks);
        }
    }

    /// Delivers `tasks` to the single watcher behind `handle`, if it is
    /// still registered.
    ///
    /// A handle minted by a different registry is ignored, even when its
    /// numeric id collides with a watcher registered here.
    pub fn deliver_to(&self, handle: &WatchHandle, tasks: &[Task]) {
        // Watcher ids are only unique within one registry.
        if !std::ptr::eq(handle.registry.as_ptr(), Arc::as_ptr(&self.inner)) {
            return;
        }

        let callback = {
            let inner = lock(&self.inner);
            inner
                .entries
                .iter()
                .find(|entry| entry.id == handle.id)
                .map(|entry| Arc::clone(&entry.callback))
        };

        if let Some(callback) = callback {
            callback(tasks);
        }
    }
}

/// Owned registration for one watcher.
///
/// Dropping the handle unsubscribes the watcher.
pub struct WatchHandle {
    registry: Weak<Mutex<WatchInner>>,
    id: WatchId,
}

impl WatchHandle {
    /// Removes this watcher from the registry.
    ///
    /// Idempotent; also a no-op when the registry itself is already gone.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut inner = lock(&registry);
            inner.entries.retain(|entry| entry.id != self.id);
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

fn lock(inner: &Mutex<WatchInner>) -> MutexGuard<'_, WatchInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
