//! Raw, not-yet-decoded asset files.

use std::fmt;
use std::sync::{Arc, Weak};

use otrkit_common::ResourceInitData;

use crate::Archive;

/// One raw asset read from an archive.
///
/// The buffer is reference-counted so several readers can share it. The
/// archive back-reference is weak and only used for diagnostics.
#[derive(Clone)]
pub struct File {
    path: String,
    archive: Option<Weak<dyn Archive>>,
    buffer: Arc<[u8]>,
    init_data: Option<ResourceInitData>,
}

impl File {
    /// Create a file that belongs to an archive.
    pub fn new(path: impl Into<String>, archive: Weak<dyn Archive>, buffer: Arc<[u8]>) -> Self {
        Self {
            path: path.into(),
            archive: Some(archive),
            buffer,
            init_data: None,
        }
    }

    /// Create a file that is not backed by any archive.
    pub fn detached(path: impl Into<String>, buffer: impl Into<Arc<[u8]>>) -> Self {
        Self {
            path: path.into(),
            archive: None,
            buffer: buffer.into(),
            init_data: None,
        }
    }

    /// Attach a pre-declared envelope for a headerless asset.
    pub fn with_init_data(mut self, init_data: Option<ResourceInitData>) -> Self {
        self.init_data = init_data;
        self
    }

    /// Logical path of the file.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw bytes.
    #[inline]
    pub fn buffer(&self) -> &Arc<[u8]> {
        &self.buffer
    }

    /// The raw bytes as a slice.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Size of the file in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the file is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The pre-declared envelope, if the file was loaded with one.
    #[inline]
    pub fn init_data(&self) -> Option<&ResourceInitData> {
        self.init_data.as_ref()
    }

    /// The owning archive, if it is still mounted.
    pub fn archive(&self) -> Option<Arc<dyn Archive>> {
        self.archive.as_ref().and_then(Weak::upgrade)
    }

    /// Name of the owning archive, for diagnostics.
    pub fn archive_name(&self) -> String {
        self.archive()
            .map(|archive| archive.name().to_string())
            .unwrap_or_else(|| "<detached>".to_string())
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("path", &self.path)
            .field("archive", &self.archive_name())
            .field("len", &self.buffer.len())
            .field("headerless", &self.init_data.is_some())
            .finish()
    }
}
