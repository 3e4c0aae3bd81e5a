//! The resource manager: caches, request coalescing and the loader thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use otrkit_archive::{ArchiveManager, File, FileMask};
use otrkit_common::{hash, ResourceInitData};
use otrkit_resource::{FactoryRegistry, Resource};
use parking_lot::Mutex;
use serde::Serialize;

use crate::cache::Cache;
use crate::handle::{LoadHandle, LoadState};
use crate::worker::{Counters, Message, Worker};
use crate::{Error, ManagerConfig, Result};

/// Shared handle to a file request.
pub type FileHandle = Arc<LoadHandle<File>>;

/// Shared handle to a resource request.
pub type ResourceHandle = Arc<LoadHandle<Resource>>;

/// Prefix under which alternate assets live.
const ALT_PREFIX: &str = "alt/";

/// Snapshot of the manager's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ManagerStats {
    /// Archive reads performed by the loader, hits and misses alike.
    pub archive_reads: u64,
    /// Decoder invocations.
    pub decodes: u64,
    /// Read and decode errors.
    pub failures: u64,
    /// Reads of paths no archive holds.
    pub misses: u64,
    pub cached_files: usize,
    pub cached_resources: usize,
}

/// Loads files and resources on a background thread and caches them by path.
///
/// Concurrent requests for one path share a single [`LoadHandle`], so each
/// path is read and decoded at most once until it is dirtied or unloaded.
/// Blocking calls wait on that handle; asynchronous calls return it.
pub struct ResourceManager {
    archives: Arc<ArchiveManager>,
    files: Arc<Cache<File>>,
    resources: Cache<Resource>,
    counters: Arc<Counters>,
    stop: Arc<AtomicBool>,
    sender: Mutex<Option<Sender<Message>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    alt_assets: AtomicBool,
}

impl ResourceManager {
    /// Mount the configured archives and start the loader.
    ///
    /// Fails if the main archive cannot be mounted.
    pub fn new(config: ManagerConfig) -> Result<Self> {
        let archives = ArchiveManager::mount(&config.archives, &config.valid_versions)?;
        Self::with_archives(archives, config)
    }

    /// Start a manager over already mounted archives.
    pub fn with_archives(archives: ArchiveManager, config: ManagerConfig) -> Result<Self> {
        Self::with_registry(archives, FactoryRegistry::with_defaults(), config)
    }

    /// Start a manager with a custom decoder table.
    pub fn with_registry(
        archives: ArchiveManager,
        registry: FactoryRegistry,
        config: ManagerConfig,
    ) -> Result<Self> {
        let archives = Arc::new(archives);
        let files = Arc::new(Cache::new());
        let counters = Arc::new(Counters::default());
        let stop = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = crossbeam_channel::unbounded();

        let worker = Worker {
            archives: Arc::clone(&archives),
            registry: Arc::new(registry),
            files: Arc::clone(&files),
            counters: Arc::clone(&counters),
            stop: Arc::clone(&stop),
        };
        let thread = std::thread::Builder::new()
            .name(config.worker_name.clone())
            .spawn(move || worker.run(receiver))
            .map_err(Error::Spawn)?;

        tracing::info!(
            archives = archives.archives().len(),
            files = archives.file_count(),
            worker = %config.worker_name,
            "resource manager started"
        );

        Ok(Self {
            archives,
            files,
            resources: Cache::new(),
            counters,
            stop,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(thread)),
            alt_assets: AtomicBool::new(config.alt_assets),
        })
    }

    /// The mounted archives.
    pub fn archives(&self) -> &ArchiveManager {
        &self.archives
    }

    /// Whether the loader is running.
    pub fn is_loaded(&self) -> bool {
        !self.stop.load(Ordering::Acquire)
            && self
                .worker
                .lock()
                .as_ref()
                .is_some_and(|thread| !thread.is_finished())
    }

    pub fn stats(&self) -> ManagerStats {
        ManagerStats {
            archive_reads: self.counters.archive_reads.load(Ordering::Relaxed),
            decodes: self.counters.decodes.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            cached_files: self.files.len(),
            cached_resources: self.resources.len(),
        }
    }

    pub fn alt_assets_enabled(&self) -> bool {
        self.alt_assets.load(Ordering::Relaxed)
    }

    /// Toggle alternate-asset lookup. Takes effect on the next request.
    pub fn set_alt_assets_enabled(&self, enabled: bool) {
        self.alt_assets.store(enabled, Ordering::Relaxed);
    }

    /// Resolve a content hash to a path.
    pub fn hash_to_path(&self, hash: u64) -> Option<String> {
        self.archives.hash_to_path(hash)
    }

    /// Paths in the mounted archives matching a mask. A bad mask is logged
    /// and matches nothing.
    pub fn list_files(&self, mask: &str) -> Vec<String> {
        self.archives.list_files(mask).unwrap_or_else(|e| {
            tracing::warn!(mask, "cannot list files: {e}");
            Vec::new()
        })
    }

    // Files

    /// Request a file. The returned handle may still be loading.
    pub fn load_file_async(&self, path: &str) -> FileHandle {
        self.request_file(hash::normalize_path(path).into_owned(), None)
    }

    /// Load a file, waiting for it when `blocking`. A non-blocking call
    /// returns the file only if it is already loaded.
    pub fn load_file(&self, path: &str, blocking: bool) -> Option<Arc<File>> {
        finish(&self.load_file_async(path), blocking)
    }

    /// Load a headerless file, attaching the envelope it lacks.
    ///
    /// The hint only applies when this call starts the read.
    pub fn load_file_with_hint(
        &self,
        path: &str,
        init: ResourceInitData,
        blocking: bool,
    ) -> Option<Arc<File>> {
        let handle = self.request_file(hash::normalize_path(path).into_owned(), Some(init));
        finish(&handle, blocking)
    }

    pub fn load_file_by_hash(&self, hash: u64, blocking: bool) -> Option<Arc<File>> {
        let path = self.hash_to_path(hash)?;
        self.load_file(&path, blocking)
    }

    fn request_file(&self, path: String, hint: Option<ResourceInitData>) -> FileHandle {
        let (handle, inserted) = self.files.get_or_insert(&path);
        if inserted {
            tracing::trace!(path = %path, "queueing file load");
            self.enqueue(Message::LoadFile {
                path,
                hint,
                handle: Arc::clone(&handle),
            });
        }
        handle
    }

    // Resources

    /// Request a resource. The returned handle may still be loading.
    ///
    /// A cached resource is reused unless it has been dirtied, in which case
    /// it is decoded again from the cached file.
    pub fn load_resource_async(&self, path: &str) -> ResourceHandle {
        self.request_resource(self.resolve(path), None)
    }

    /// Load a resource, waiting for it when `blocking`. A non-blocking call
    /// returns the resource only if it is already loaded.
    pub fn load_resource(&self, path: &str, blocking: bool) -> Option<Arc<Resource>> {
        finish(&self.load_resource_async(path), blocking)
    }

    /// Load a headerless resource such as a shader or JSON document.
    ///
    /// The hint is applied even when the file is already cached, and a
    /// cached failure for the path is retried with it. A loaded resource is
    /// reused as is.
    pub fn load_resource_with_hint(
        &self,
        path: &str,
        init: ResourceInitData,
        blocking: bool,
    ) -> Option<Arc<Resource>> {
        finish(&self.request_resource(self.resolve(path), Some(init)), blocking)
    }

    /// Request a resource by content hash. Unknown hashes give `None`.
    pub fn load_resource_by_hash_async(&self, hash: u64) -> Option<ResourceHandle> {
        let path = self.hash_to_path(hash)?;
        Some(self.load_resource_async(&path))
    }

    pub fn load_resource_by_hash(&self, hash: u64, blocking: bool) -> Option<Arc<Resource>> {
        finish(&*self.load_resource_by_hash_async(hash)?, blocking)
    }

    /// The cached resource for `path`, without starting a load.
    pub fn get_cached_resource(&self, path: &str) -> Option<Arc<Resource>> {
        self.resources
            .get(&self.resolve(path))?
            .poll()
            .filter(|resource| !resource.is_dirty())
    }

    /// Request every resource whose path matches `mask`.
    pub fn load_resources_async(&self, mask: &str) -> Vec<ResourceHandle> {
        self.list_files(mask)
            .iter()
            .map(|path| self.load_resource_async(path))
            .collect()
    }

    /// Load every resource whose path matches `mask`, waiting for all of
    /// them.
    pub fn load_resources(&self, mask: &str) -> Vec<Option<Arc<Resource>>> {
        self.load_resources_async(mask)
            .iter()
            .map(|handle| handle.wait())
            .collect()
    }

    fn request_resource(&self, path: String, hint: Option<ResourceInitData>) -> ResourceHandle {
        let retry_failed = hint.is_some();
        let (handle, inserted) = self.resources.get_or_replace(&path, |handle| {
            match handle.state() {
                LoadState::Loaded(resource) => resource.is_dirty(),
                LoadState::Failed => retry_failed,
                LoadState::Queued | LoadState::Loading => false,
            }
        });
        if inserted {
            tracing::trace!(path = %path, "queueing resource load");
            self.enqueue(Message::LoadResource {
                path,
                hint,
                handle: Arc::clone(&handle),
            });
        }
        handle
    }

    /// The path a request for `path` is served from.
    fn resolve(&self, path: &str) -> String {
        let path = hash::normalize_path(path).into_owned();
        if self.alt_assets_enabled() && !path.starts_with(ALT_PREFIX) {
            let alt = format!("{ALT_PREFIX}{path}");
            if self.archives.has_file(&alt) {
                return alt;
            }
        }
        path
    }

    /// Cache keys a path may be stored under.
    fn cache_keys(path: &str) -> [String; 2] {
        let path = hash::normalize_path(path).into_owned();
        [format!("{ALT_PREFIX}{path}"), path]
    }

    // Dirty

    /// Flag a cached resource for re-decoding on the next request. The file
    /// buffer stays cached. A failed resource is dropped so the next request
    /// retries it.
    pub fn dirty_resource(&self, path: &str) -> bool {
        let mut dirtied = false;
        for key in Self::cache_keys(path) {
            dirtied |= self.dirty_key(&key);
        }
        dirtied
    }

    pub fn dirty_resource_by_hash(&self, hash: u64) -> bool {
        self.hash_to_path(hash)
            .is_some_and(|path| self.dirty_resource(&path))
    }

    /// Dirty every cached resource matching `mask`. Returns how many were
    /// affected.
    pub fn dirty_directory(&self, mask: &str) -> usize {
        let Some(mask) = compile_mask(mask) else {
            return 0;
        };
        self.resources
            .matching(&mask)
            .iter()
            .filter(|path| self.dirty_key(path))
            .count()
    }

    fn dirty_key(&self, path: &str) -> bool {
        let Some(handle) = self.resources.get(path) else {
            return false;
        };
        match handle.state() {
            LoadState::Loaded(resource) => {
                resource.mark_dirty();
                tracing::debug!(path, "resource marked dirty");
                true
            }
            LoadState::Failed => self.resources.remove_if_same(path, &handle),
            LoadState::Queued | LoadState::Loading => false,
        }
    }

    // Unload

    /// Evict a resource and its file. The next request reads and decodes
    /// again. Entries whose load is still in flight are kept.
    pub fn unload_resource(&self, path: &str) -> bool {
        let mut unloaded = false;
        for key in Self::cache_keys(path) {
            unloaded |= self.unload_key(&key);
        }
        unloaded
    }

    pub fn unload_resource_by_hash(&self, hash: u64) -> bool {
        self.hash_to_path(hash)
            .is_some_and(|path| self.unload_resource(&path))
    }

    /// Evict every cached resource and file matching `mask`. Returns how
    /// many paths were evicted.
    pub fn unload_resources(&self, mask: &str) -> usize {
        let Some(mask) = compile_mask(mask) else {
            return 0;
        };
        let mut paths = self.resources.matching(&mask);
        paths.extend(self.files.matching(&mask));
        paths.sort_unstable();
        paths.dedup();

        paths.iter().filter(|path| self.unload_key(path)).count()
    }

    /// Evict the finished entries for one key. Loads still in flight stay
    /// cached so the path is never read twice at once.
    fn unload_key(&self, path: &str) -> bool {
        let resource = self.resources.remove_if_done(path);
        let file = self.files.remove_if_done(path);
        if resource || file {
            tracing::debug!(path, "unloaded");
        }
        resource || file
    }

    // Writing

    /// Write a file to the highest-priority writable archive and evict any
    /// cached copy.
    pub fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.archives.write_file(path, data)?;
        self.unload_resource(path);
        Ok(())
    }

    // Lifecycle

    fn enqueue(&self, message: Message) {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(sender) => {
                if let Err(e) = sender.send(message) {
                    e.into_inner().abandon();
                }
            }
            None => message.abandon(),
        }
    }

    /// Stop the loader.
    ///
    /// Work still queued is logged and resolved as failed. Calling this more
    /// than once is harmless.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::Release);

        if let Some(sender) = self.sender.lock().take() {
            // Dropping the sender after the wake-up lets the loader drain
            // and exit.
            let _ = sender.send(Message::Shutdown);
        }

        let Some(thread) = self.worker.lock().take() else {
            return;
        };
        if thread.join().is_err() {
            tracing::error!("loader thread panicked");
        }
        if let Err(e) = self.archives.close() {
            tracing::error!("failed to close archives: {e}");
        }
        tracing::info!("resource manager stopped");
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("archives", &self.archives.archives().len())
            .field("stats", &self.stats())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

fn finish<T>(handle: &LoadHandle<T>, blocking: bool) -> Option<Arc<T>> {
    if blocking {
        handle.wait()
    } else {
        handle.poll()
    }
}

fn compile_mask(mask: &str) -> Option<FileMask> {
    FileMask::new(mask)
        .map_err(|e| tracing::warn!(mask, "invalid mask: {e}"))
        .ok()
}
