//! Path-keyed caches of load handles.

use std::sync::Arc;

use otrkit_archive::FileMask;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::handle::LoadHandle;

/// A map from normalised path to the shared handle for that path.
///
/// The lock guards map mutation only; loading happens outside it.
pub(crate) struct Cache<T> {
    entries: Mutex<FxHashMap<String, Arc<LoadHandle<T>>>>,
}

impl<T> Cache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn get(&self, path: &str) -> Option<Arc<LoadHandle<T>>> {
        self.entries.lock().get(path).cloned()
    }

    /// The handle for `path`, inserting a queued one if absent. The flag is
    /// `true` when the handle was inserted by this call.
    pub fn get_or_insert(&self, path: &str) -> (Arc<LoadHandle<T>>, bool) {
        self.get_or_replace(path, |_| false)
    }

    /// Like [`get_or_insert`](Self::get_or_insert), but also replaces an
    /// existing handle for which `stale` returns `true`. Runs under the map
    /// lock.
    pub fn get_or_replace(
        &self,
        path: &str,
        stale: impl FnOnce(&LoadHandle<T>) -> bool,
    ) -> (Arc<LoadHandle<T>>, bool) {
        let mut entries = self.entries.lock();
        if let Some(handle) = entries.get(path) {
            if !stale(handle) {
                return (Arc::clone(handle), false);
            }
        }

        let handle = Arc::new(LoadHandle::new());
        entries.insert(path.to_string(), Arc::clone(&handle));
        (handle, true)
    }

    /// Remove the entry for `path` unless its load is still in flight.
    ///
    /// Returns whether an entry was removed.
    pub fn remove_if_done(&self, path: &str) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(path) {
            Some(handle) if handle.is_done() => {
                entries.remove(path);
                true
            }
            _ => false,
        }
    }

    /// Remove the entry for `path` only if it is still `handle`.
    pub fn remove_if_same(&self, path: &str, handle: &Arc<LoadHandle<T>>) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(path) {
            Some(current) if Arc::ptr_eq(current, handle) => {
                entries.remove(path);
                true
            }
            _ => false,
        }
    }

    /// Cached paths matching a mask, sorted.
    pub fn matching(&self, mask: &FileMask) -> Vec<String> {
        let entries = self.entries.lock();
        mask.select(entries.keys().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_insert_coalesces() {
        let cache = Cache::<u8>::new();
        let (first, inserted) = cache.get_or_insert("a");
        assert!(inserted);
        let (second, inserted) = cache.get_or_insert("a");
        assert!(!inserted);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_replace_stale() {
        let cache = Cache::<u8>::new();
        let (first, _) = cache.get_or_insert("a");
        first.complete(None);

        let (second, inserted) = cache.get_or_replace("a", |h| h.is_done());
        assert!(inserted);
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(!cache.remove_if_same("a", &first));
        assert!(cache.remove_if_same("a", &second));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_remove_if_done_keeps_in_flight() {
        let cache = Cache::<u8>::new();
        let (handle, _) = cache.get_or_insert("a");
        assert!(!cache.remove_if_done("a"));
        assert!(handle.claim());
        assert!(!cache.remove_if_done("a"));

        handle.complete(Some(Arc::new(1)));
        assert!(cache.remove_if_done("a"));
        assert!(!cache.remove_if_done("a"));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_matching() {
        let cache = Cache::<u8>::new();
        cache.get_or_insert("objects/b");
        cache.get_or_insert("objects/a");
        cache.get_or_insert("scenes/x");

        let mask = FileMask::new("objects/*").unwrap();
        assert_eq!(cache.matching(&mask), vec!["objects/a", "objects/b"]);
    }
}
