use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

/// FragmentCache
///
/// Maps a fragment locator to the HTML text fetched for it. Bounded: once
/// `capacity` locators are held, the least recently used one is evicted.
pub struct FragmentCache {
    inner: Mutex<LruCache<String, String>>,
}

impl FragmentCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, locator: &str) -> Option<String> {
        self.inner.lock().get(locator).cloned()
    }

    pub fn insert(&self, locator: &str, html: String) {
        self.inner.lock().put(locator.to_string(), html);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}
