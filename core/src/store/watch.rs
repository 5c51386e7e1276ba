use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::store::path::CollectionPath;
use crate::store::traits::Document;

pub(crate) type Listener = Arc<dyn Fn(Vec<Document>) + Send + Sync>;

/// Guard for a live watch. The release hook runs exactly once, on drop.
pub struct Watch {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Watch {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

struct Watcher {
    id: u64,
    collection: CollectionPath,
    listener: Listener,
}

#[derive(Default)]
pub(crate) struct Registry {
    next_id: u64,
    watchers: Vec<Watcher>,
}

impl Registry {
    pub(crate) fn register(
        registry: &Arc<Mutex<Registry>>,
        collection: CollectionPath,
        listener: Listener,
    ) -> Watch {
        let id = {
            let mut guard = registry.lock();
            let id = guard.next_id;
            guard.next_id += 1;
            guard.watchers.push(Watcher {
                id,
                collection,
                listener,
            });
            id
        };

        let weak: Weak<Mutex<Registry>> = Arc::downgrade(registry);
        Watch::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.lock().watchers.retain(|w| w.id != id);
            }
        })
    }

    /// Watched collections affected by a write to `written`, with their listeners.
    pub(crate) fn affected_by(&self, written: &CollectionPath) -> Vec<(CollectionPath, Listener)> {
        self.watchers
            .iter()
            .filter(|w| written.is_within(&w.collection))
            .map(|w| (w.collection.clone(), Arc::clone(&w.listener)))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.watchers.len()
    }
}
