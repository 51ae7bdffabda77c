use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

// ---------------------------------------------------------------------------
// Memoization service
// ---------------------------------------------------------------------------

/// Identity of a memoized computation: which function, with which arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    function: &'static str,
    args: String,
}

impl CacheKey {
    pub fn new(function: &'static str, args: impl Into<String>) -> Self {
        CacheKey {
            function,
            args: args.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Process-lifetime memo table shared by the loader and the filter step.
///
/// Entries are never evicted: the dataset is immutable for the life of the
/// process, so a key always maps to the same value. Values are computed
/// outside the lock; two threads missing on the same key may both compute,
/// and the first insert wins.
#[derive(Default)]
pub struct MemoCache {
    entries: RwLock<HashMap<CacheKey, Arc<dyn Any + Send + Sync>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup<T: Any + Send + Sync>(&self, key: &CacheKey) -> Option<Arc<T>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .cloned()
            .and_then(|value| value.downcast::<T>().ok())
    }

    fn store<T: Any + Send + Sync>(&self, key: CacheKey, value: Arc<T>) -> Arc<T> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let stored = entries
            .entry(key)
            .or_insert_with(|| value.clone() as Arc<dyn Any + Send + Sync>)
            .clone();
        // A racing insert of the same type wins; a type clash keeps ours.
        stored.downcast::<T>().unwrap_or(value)
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with<T, F>(&self, key: CacheKey, compute: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        if let Some(hit) = self.lookup::<T>(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::trace!("cache hit: {}", key.function);
            return hit;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        log::debug!("cache miss: {}({})", key.function, key.args);
        self.store(key, Arc::new(compute()))
    }

    /// Fallible variant: errors are returned and never cached.
    pub fn get_or_try_insert_with<T, E, F>(&self, key: CacheKey, compute: F) -> Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(hit) = self.lookup::<T>(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        log::debug!("cache miss: {}({})", key.function, key.args);
        let value = compute()?;
        Ok(self.store(key, Arc::new(value)))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self
                .entries
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
        }
    }
}

impl std::fmt::Debug for MemoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoCache").field("stats", &self.stats()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_computes_once_per_key() {
        let cache = MemoCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            vec![1, 2, 3]
        };
        let a = cache.get_or_insert_with(CacheKey::new("f", "x=1"), compute);
        let b = cache.get_or_insert_with::<Vec<i32>, _>(CacheKey::new("f", "x=1"), || unreachable!());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.get(), 1);

        let c = cache.get_or_insert_with(CacheKey::new("f", "x=2"), || vec![4]);
        assert_eq!(*c, vec![4]);
        assert_eq!(
            cache.stats(),
            CacheStats { hits: 1, misses: 2, entries: 2 }
        );
    }

    #[test]
    fn test_function_identity_is_part_of_key() {
        let cache = MemoCache::new();
        let a = cache.get_or_insert_with(CacheKey::new("f", "1"), || 1u32);
        let b = cache.get_or_insert_with(CacheKey::new("g", "1"), || 2u32);
        assert_eq!((*a, *b), (1, 2));
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = MemoCache::new();
        let key = CacheKey::new("load", "missing.csv");
        let err: Result<Arc<u8>, &str> = cache.get_or_try_insert_with(key.clone(), || Err("boom"));
        assert!(err.is_err());
        let ok: Result<Arc<u8>, &str> = cache.get_or_try_insert_with(key, || Ok(7));
        assert_eq!(*ok.unwrap(), 7);
    }
}
