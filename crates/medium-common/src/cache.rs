//! Platform-specific cache implementations.
//!
//! Provides a unified API over mini-moka-wasm's sync (native) and unsync (WASM) caches.
//! Entries never expire; a capacity bound is the only eviction policy, so callers
//! that must not re-fetch should size the cache above the number of keys they use.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    pub type Cache<K, V> = mini_moka_wasm::sync::Cache<K, V>;

    pub fn new_cache<K, V>(max_capacity: u64) -> Cache<K, V>
    where
        K: std::hash::Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        mini_moka_wasm::sync::Cache::builder()
            .max_capacity(max_capacity)
            .build()
    }

    pub fn get<K, V>(cache: &Cache<K, V>, key: &K) -> Option<V>
    where
        K: std::hash::Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        cache.get(key)
    }

    pub fn insert<K, V>(cache: &Cache<K, V>, key: K, value: V)
    where
        K: std::hash::Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        cache.insert(key, value);
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::sync::{Arc, Mutex};

    pub type Cache<K, V> = Arc<Mutex<mini_moka_wasm::unsync::Cache<K, V>>>;

    pub fn new_cache<K, V>(max_capacity: u64) -> Cache<K, V>
    where
        K: std::hash::Hash + Eq + 'static,
        V: Clone + 'static,
    {
        Arc::new(Mutex::new(
            mini_moka_wasm::unsync::Cache::builder()
                .max_capacity(max_capacity)
                .build(),
        ))
    }

    pub fn get<K, V>(cache: &Cache<K, V>, key: &K) -> Option<V>
    where
        K: std::hash::Hash + Eq + 'static,
        V: Clone + 'static,
    {
        // A poisoned lock only means a previous insert panicked; the map is still usable.
        let mut guard = cache.lock().unwrap_or_else(|e| e.into_inner());
        guard.get(key).cloned()
    }

    pub fn insert<K, V>(cache: &Cache<K, V>, key: K, value: V)
    where
        K: std::hash::Hash + Eq + 'static,
        V: Clone + 'static,
    {
        let mut guard = cache.lock().unwrap_or_else(|e| e.into_inner());
        guard.insert(key, value);
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::*;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
