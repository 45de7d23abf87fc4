//! Binding registry with provide/inject semantics.
//!
//! Decouples providers (the router) from consumers (location-aware UI
//! controllers): either side may arrive first. An `inject` before the
//! matching `provide` is queued and resolved the moment the value is
//! provided; an `inject` after it resolves immediately.

use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::debug;

type Provided = Arc<dyn Any + Send + Sync>;
type Waiter = Box<dyn FnOnce(Provided) + Send>;

/// Key/value registry shared by one client application.
///
/// Constructed by the embedding application and passed down - not an
/// ambient singleton.
#[derive(Default)]
pub struct Registry {
    objects: DashMap<String, Provided>,
    pending: Mutex<FxHashMap<String, Vec<Waiter>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value under a key and resolve all queued injects for it.
    pub fn provide<T: Any + Send + Sync>(&self, key: &str, value: Arc<T>) {
        let provided: Provided = value;
        self.objects.insert(key.to_string(), provided.clone());

        let waiters = self.pending.lock().remove(key);
        if let Some(waiters) = waiters {
            for waiter in waiters {
                waiter(provided.clone());
            }
        }
    }

    /// Request the value under a key. The callback runs immediately when the
    /// value is already provided, otherwise as soon as it is.
    pub fn inject<T: Any + Send + Sync>(
        &self,
        key: &str,
        callback: impl FnOnce(Arc<T>) + Send + 'static,
    ) {
        // Hold the pending lock while checking `objects`: provide() inserts
        // before draining, so a concurrent provide either wins the lookup or
        // drains this waiter.
        let mut pending = self.pending.lock();

        if let Some(value) = self.objects.get(key) {
            let value = value.clone();
            drop(pending);
            resolve(key, value, callback);
            return;
        }

        let key_owned = key.to_string();
        pending
            .entry(key.to_string())
            .or_default()
            .push(Box::new(move |provided| {
                resolve(&key_owned, provided, callback);
            }));
    }
}

fn resolve<T: Any + Send + Sync>(key: &str, provided: Provided, callback: impl FnOnce(Arc<T>)) {
    match provided.downcast::<T>() {
        Ok(typed) => callback(typed),
        Err(_) => debug!("client"; "type mismatch for registry key `{key}`"),
    }
}
