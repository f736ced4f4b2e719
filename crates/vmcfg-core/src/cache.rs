//! Cache of derived target configurations

use crate::resolver::ConfigResolver;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Cache key: target name plus provider name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    target: String,
    provider: String,
}

impl CacheKey {
    pub fn new(target: &str, provider: &str) -> Self {
        Self {
            target: target.to_string(),
            provider: provider.to_string(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.target, self.provider)
    }
}

/// Derived configurations keyed by target and provider
///
/// Entries are never evicted. Derivation of a key is single-flight: callers
/// take the key's flight lock and re-check the cache before deriving.
#[derive(Default)]
pub(crate) struct TargetCache {
    entries: Mutex<HashMap<CacheKey, Arc<ConfigResolver>>>,
    flights: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl TargetCache {
    pub(crate) fn get(&self, key: &CacheKey) -> Option<Arc<ConfigResolver>> {
        self.entries.lock().get(key).cloned()
    }

    pub(crate) fn insert(&self, key: CacheKey, value: Arc<ConfigResolver>) {
        self.entries.lock().insert(key, value);
    }

    /// Lock serializing derivation of `key`
    pub(crate) fn flight(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        Arc::clone(self.flights.lock().entry(key.clone()).or_default())
    }

    /// Hand back a flight lock once derivation of `key` is done
    ///
    /// The entry is dropped when no other caller is waiting on it.
    pub(crate) fn release(&self, key: &CacheKey, flight: Arc<Mutex<()>>) {
        let mut flights = self.flights.lock();
        let idle = flights
            .get(key)
            .is_some_and(|held| Arc::ptr_eq(held, &flight) && Arc::strong_count(&flight) == 2);
        if idle {
            flights.remove(key);
        }
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.flights.lock().len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
