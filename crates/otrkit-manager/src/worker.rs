//! The background loader thread.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::Receiver;
use otrkit_archive::{ArchiveManager, File};
use otrkit_common::ResourceInitData;
use otrkit_resource::{FactoryRegistry, Resource};

use crate::cache::Cache;
use crate::handle::LoadHandle;

/// Work sent to the loader.
pub(crate) enum Message {
    LoadFile {
        path: String,
        hint: Option<ResourceInitData>,
        handle: Arc<LoadHandle<File>>,
    },
    LoadResource {
        path: String,
        hint: Option<ResourceInitData>,
        handle: Arc<LoadHandle<Resource>>,
    },
    /// Wakes the loader so it notices the stop flag.
    Shutdown,
}

impl Message {
    /// Resolve the request as failed without running it.
    pub(crate) fn abandon(self) {
        match self {
            Self::LoadFile { path, handle, .. } => {
                tracing::warn!(path = %path, "loader stopped, dropping file load");
                handle.complete(None);
            }
            Self::LoadResource { path, handle, .. } => {
                tracing::warn!(path = %path, "loader stopped, dropping resource load");
                handle.complete(None);
            }
            Self::Shutdown => {}
        }
    }
}

/// Counters shared between the manager and the loader.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub archive_reads: AtomicU64,
    pub decodes: AtomicU64,
    pub failures: AtomicU64,
    pub misses: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// State owned by the loader thread.
pub(crate) struct Worker {
    pub archives: Arc<ArchiveManager>,
    pub registry: Arc<FactoryRegistry>,
    pub files: Arc<Cache<File>>,
    pub counters: Arc<Counters>,
    pub stop: Arc<AtomicBool>,
}

impl Worker {
    /// Drain the queue until every sender is gone.
    ///
    /// Once the stop flag is set, queued work is abandoned instead of run.
    pub fn run(self, receiver: Receiver<Message>) {
        tracing::debug!("loader started");

        while let Ok(message) = receiver.recv() {
            if self.stop.load(Ordering::Acquire) {
                message.abandon();
                continue;
            }

            match message {
                Message::LoadFile { path, hint, handle } => {
                    if handle.claim() {
                        handle.complete(self.read_file(&path, hint));
                    }
                }
                Message::LoadResource { path, hint, handle } => {
                    if handle.claim() {
                        handle.complete(self.load_resource(&path, hint));
                    }
                }
                Message::Shutdown => {}
            }
        }

        tracing::debug!("loader stopped");
    }

    fn read_file(&self, path: &str, hint: Option<ResourceInitData>) -> Option<Arc<File>> {
        Counters::bump(&self.counters.archive_reads);
        let read = self.guarded(path, "archive read", || self.archives.load_file(path, hint))?;
        match read {
            Ok(Some(file)) => Some(file),
            Ok(None) => {
                Counters::bump(&self.counters.misses);
                tracing::debug!(path, "file not found in any archive");
                None
            }
            Err(e) => {
                Counters::bump(&self.counters.failures);
                tracing::error!(path, "failed to read file: {e}");
                None
            }
        }
    }

    /// Decode a resource from the cached file, reading the file first when
    /// nothing else has.
    ///
    /// A hint that differs from the envelope of an already cached file
    /// replaces the cached file with a re-hinted copy of the same buffer.
    fn load_resource(&self, path: &str, hint: Option<ResourceInitData>) -> Option<Arc<Resource>> {
        let (file_handle, _) = self.files.get_or_insert(path);
        if file_handle.claim() {
            let file = self.read_file(path, hint.clone());
            file_handle.complete(file);
        }
        let mut file = file_handle.wait()?;

        if let Some(init) = hint {
            if file.init_data() != Some(&init) {
                file = self.rehint(path, &file, init);
            }
        }

        Counters::bump(&self.counters.decodes);
        let decoded = self.guarded(path, "decoder", || self.registry.decode(&file))?;
        match decoded {
            Ok(resource) => Some(Arc::new(resource)),
            Err(e) => {
                Counters::bump(&self.counters.failures);
                tracing::warn!(path, "failed to decode resource: {e}");
                None
            }
        }
    }

    fn rehint(&self, path: &str, file: &File, init: ResourceInitData) -> Arc<File> {
        tracing::debug!(path, "re-hinting cached file");
        let hinted = Arc::new(file.clone().with_init_data(Some(init)));
        let (handle, _) = self.files.get_or_replace(path, |_| true);
        handle.claim();
        handle.complete(Some(Arc::clone(&hinted)));
        hinted
    }

    /// Run one stage of a job, turning a panic into a failed load so the
    /// loader keeps serving the queue.
    fn guarded<T>(&self, path: &str, stage: &str, work: impl FnOnce() -> T) -> Option<T> {
        match panic::catch_unwind(AssertUnwindSafe(work)) {
            Ok(value) => Some(value),
            Err(payload) => {
                Counters::bump(&self.counters.failures);
                tracing::error!(path, "{stage} panicked: {}", panic_message(&*payload));
                None
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
