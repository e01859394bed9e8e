// ── Reactive entity collection ──
//
// Concurrent keyed storage with push-based change notification via
// `watch` channels.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::DeviceId;

/// A concurrent, reactive collection keyed by vendor id.
///
/// Uses `DashMap` for O(1) concurrent lookups and a `watch` channel for
/// push-based change notification. Every mutation bumps a version
/// counter and rebuilds the snapshot that subscribers receive.
pub(crate) struct EntityCollection<T: Clone + Send + Sync + 'static> {
    by_id: DashMap<DeviceId, Arc<T>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot sorted by id, rebuilt on mutation.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert or replace an entity. Returns `true` if the id was new.
    pub(crate) fn upsert(&self, id: DeviceId, entity: T) -> bool {
        let is_new = self.by_id.insert(id, Arc::new(entity)).is_none();
        self.changed();
        is_new
    }

    /// Modify an entity in place. Returns `false` if the id is absent.
    pub(crate) fn update(&self, id: DeviceId, f: impl FnOnce(&mut T)) -> bool {
        let updated = match self.by_id.get_mut(&id) {
            Some(mut entry) => {
                f(Arc::make_mut(entry.value_mut()));
                true
            }
            None => false,
        };
        if updated {
            self.changed();
        }
        updated
    }

    /// Remove an entity. Returns it if it existed.
    pub(crate) fn remove(&self, id: DeviceId) -> Option<Arc<T>> {
        let removed = self.by_id.remove(&id).map(|(_, v)| v);
        if removed.is_some() {
            self.changed();
        }
        removed
    }

    pub(crate) fn get(&self, id: DeviceId) -> Option<Arc<T>> {
        self.by_id.get(&id).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn contains(&self, id: DeviceId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    /// All ids currently stored.
    pub(crate) fn ids(&self) -> Vec<DeviceId> {
        self.by_id.iter().map(|r| *r.key()).collect()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn changed(&self) {
        self.rebuild_snapshot();
        self.version.send_modify(|v| *v += 1);
    }

    /// Collect all values into a snapshot vec and broadcast to subscribers.
    fn rebuild_snapshot(&self) {
        let mut entries: Vec<(DeviceId, Arc<T>)> = self
            .by_id
            .iter()
            .map(|r| (*r.key(), Arc::clone(r.value())))
            .collect();
        entries.sort_by_key(|(id, _)| *id);
        let values = entries.into_iter().map(|(_, v)| v).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}
