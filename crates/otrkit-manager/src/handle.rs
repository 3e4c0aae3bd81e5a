//! Per-request load handles.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Lifecycle of one load request.
pub enum LoadState<T> {
    /// Waiting in the loader queue.
    Queued,
    /// Claimed by the loader.
    Loading,
    Loaded(Arc<T>),
    /// The load finished without a value (lookup miss, read or decode error,
    /// or shutdown).
    Failed,
}

impl<T> LoadState<T> {
    /// Whether the request has finished.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Loaded(_) | Self::Failed)
    }
}

impl<T> Clone for LoadState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Queued => Self::Queued,
            Self::Loading => Self::Loading,
            Self::Loaded(value) => Self::Loaded(Arc::clone(value)),
            Self::Failed => Self::Failed,
        }
    }
}

impl<T> fmt::Debug for LoadState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Queued => "Queued",
            Self::Loading => "Loading",
            Self::Loaded(_) => "Loaded",
            Self::Failed => "Failed",
        })
    }
}

/// A shared slot that a load request resolves into.
///
/// Every handle carries its own lock and condition variable, so waiters on
/// one path are never woken by completions on another.
pub struct LoadHandle<T> {
    state: Mutex<LoadState<T>>,
    ready: Condvar,
}

impl<T> LoadHandle<T> {
    /// A handle waiting to be loaded.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LoadState::Queued),
            ready: Condvar::new(),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LoadState<T> {
        self.state.lock().clone()
    }

    /// Move `Queued -> Loading`. Only the caller that wins the claim does
    /// the work.
    pub fn claim(&self) -> bool {
        let mut state = self.state.lock();
        if matches!(*state, LoadState::Queued) {
            *state = LoadState::Loading;
            true
        } else {
            false
        }
    }

    /// Publish the outcome and wake every waiter.
    pub fn complete(&self, value: Option<Arc<T>>) {
        let mut state = self.state.lock();
        *state = match value {
            Some(value) => LoadState::Loaded(value),
            None => LoadState::Failed,
        };
        drop(state);
        self.ready.notify_all();
    }

    /// Block until the request finishes.
    pub fn wait(&self) -> Option<Arc<T>> {
        let mut state = self.state.lock();
        while !state.is_done() {
            self.ready.wait(&mut state);
        }
        match &*state {
            LoadState::Loaded(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// The value if the request has loaded, without blocking.
    pub fn poll(&self) -> Option<Arc<T>> {
        match &*self.state.lock() {
            LoadState::Loaded(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state.lock().is_done()
    }
}

impl<T> Default for LoadHandle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for LoadHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadHandle")
            .field("state", &*self.state.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_claim_once() {
        let handle = LoadHandle::<u32>::new();
        assert!(handle.claim());
        assert!(!handle.claim());
        assert!(matches!(handle.state(), LoadState::Loading));
    }

    #[test]
    fn test_wait_wakes_all() {
        let handle = Arc::new(LoadHandle::<u32>::new());
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let handle = Arc::clone(&handle);
                thread::spawn(move || handle.wait())
            })
            .collect();

        assert!(handle.claim());
        handle.complete(Some(Arc::new(7)));

        for waiter in waiters {
            assert_eq!(waiter.join().unwrap().as_deref(), Some(&7));
        }
        assert_eq!(handle.poll().as_deref(), Some(&7));
    }

    #[test]
    fn test_failed_resolves_to_none() {
        let handle = LoadHandle::<u32>::new();
        assert!(handle.poll().is_none());
        assert!(!handle.is_done());
        handle.complete(None);
        assert!(handle.is_done());
        assert!(handle.wait().is_none());
        // A finished handle cannot be claimed again.
        assert!(!handle.claim());
    }
}
