//! In-memory archive for embedded assets.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::archive::{parse_game_version, Archive, VERSION_ENTRY};
use crate::{ArchiveIndex, Result};

/// An archive whose entries live in memory.
///
/// Useful for assets compiled into the binary and for tests. Always writable.
#[derive(Debug)]
pub struct MemoryArchive {
    name: String,
    index: RwLock<ArchiveIndex<Arc<[u8]>>>,
}

impl MemoryArchive {
    /// Create an empty in-memory archive.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: RwLock::new(ArchiveIndex::new()),
        }
    }

    /// Builder-style insert.
    pub fn with_file(self, path: &str, data: impl Into<Arc<[u8]>>) -> Self {
        self.insert(path, data);
        self
    }

    /// Insert or replace an entry.
    pub fn insert(&self, path: &str, data: impl Into<Arc<[u8]>>) {
        self.index.write().insert(path, data.into());
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    /// Whether the archive is empty.
    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }
}

impl Archive for MemoryArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> &Path {
        Path::new("<memory>")
    }

    fn contains(&self, path: &str) -> bool {
        self.index.read().contains(path)
    }

    fn hash_to_path(&self, hash: u64) -> Option<String> {
        self.index.read().path_for_hash(hash).map(str::to_owned)
    }

    fn entries(&self) -> Vec<String> {
        self.index.read().paths().map(str::to_owned).collect()
    }

    fn read_raw(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.index.read().get(path).map(|data| data.to_vec()))
    }

    fn game_version(&self) -> Option<u32> {
        let index = self.index.read();
        let data = index.get(VERSION_ENTRY)?;
        parse_game_version(data).ok()
    }

    fn is_writable(&self) -> bool {
        true
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.insert(path, data.to_vec());
        Ok(())
    }
}
