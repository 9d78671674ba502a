// Shared store registry
//
// Every consumer of the same layered source works on the same store, so a
// value set through one handle is visible through all of them.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::error::Result;
use crate::source::LayeredSource;
use crate::store::LayeredStore;

/// Handle to a store shared between every user of one source
pub type SharedStore = Arc<Mutex<LayeredStore>>;

static GLOBAL: Lazy<SharedStoreRegistry> = Lazy::new(SharedStoreRegistry::new);

/// Maps layered sources (by identity) to their single shared store
#[derive(Debug, Default)]
pub struct SharedStoreRegistry {
    stores: Mutex<HashMap<LayeredSource, SharedStore>>,
    #[cfg(test)]
    created: std::sync::atomic::AtomicUsize,
}

impl SharedStoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry
    pub fn global() -> &'static SharedStoreRegistry {
        &GLOBAL
    }

    /// The store for `source`, created on first request.
    ///
    /// Concurrent callers asking for equal sources get the same store.
    pub fn get_or_create(&self, source: &LayeredSource) -> SharedStore {
        let mut stores = self.stores.lock();
        stores
            .entry(source.clone())
            .or_insert_with(|| {
                log::debug!("creating preference store: source={source}");
                #[cfg(test)]
                self.created.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Arc::new(Mutex::new(LayeredStore::new(source.clone())))
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.stores.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.lock().is_empty()
    }

    /// Save every dirty store. Keeps going past failures and returns the first one.
    pub fn flush_all(&self) -> Result<()> {
        let stores: Vec<SharedStore> = self.stores.lock().values().cloned().collect();
        let mut first_err = None;
        for store in stores {
            let mut store = store.lock();
            if let Err(e) = store.save() {
                log::warn!("failed to flush preferences: {e}");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
