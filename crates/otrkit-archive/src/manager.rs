//! Mounting and precedence across multiple archives.

use std::collections::BTreeSet;
use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use otrkit_common::{hash, ResourceInitData};
use parking_lot::RwLock;

use crate::archive::{discover_archives, open_archive};
use crate::index::FxHashMap;
use crate::{Archive, ArchiveExt, Error, File, FileMask, Result};

/// Flat lookup table built from every mounted archive.
#[derive(Debug, Default)]
struct MergedIndex {
    // Normalised path -> position in `archives`.
    owners: FxHashMap<String, usize>,
    hashes: FxHashMap<u64, String>,
}

impl MergedIndex {
    fn merge(&mut self, slot: usize, archive: &dyn Archive) {
        for path in archive.entries() {
            self.hashes.insert(hash::content_hash(&path), path.clone());
            // Later archives win.
            self.owners.insert(path, slot);
        }
    }
}

/// A main archive plus ordered patch archives.
///
/// Archives later in the mount order shadow earlier ones. The merged index is
/// built in one pass at mount time, so lookups never walk the archive list.
#[derive(Debug, Default)]
pub struct ArchiveManager {
    archives: Vec<Arc<dyn Archive>>,
    index: RwLock<MergedIndex>,
    game_versions: BTreeSet<u32>,
}

impl ArchiveManager {
    /// Create a manager with nothing mounted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount archives in order: the first is the main archive, the rest are
    /// patches.
    ///
    /// Directories that are not archive roots themselves are searched for
    /// container files. A main archive that fails to open is fatal; a patch
    /// that fails to open is logged and skipped. When `valid_versions` is
    /// non-empty, archives reporting any other game version are skipped.
    pub fn mount<P: AsRef<Path>>(paths: &[P], valid_versions: &[u32]) -> Result<Self> {
        let candidates = expand_mount_paths(paths);
        let Some((main, patches)) = candidates.split_first() else {
            return Err(Error::NothingToMount);
        };

        let mut manager = Self::new();

        let archive = open_archive(main).map_err(|e| Error::Mount {
            path: main.clone(),
            source: Box::new(e),
        })?;
        manager.mount_checked(archive, valid_versions);

        for patch in patches {
            match open_archive(patch) {
                Ok(archive) => manager.mount_checked(archive, valid_versions),
                Err(e) => tracing::warn!(path = %patch.display(), "skipping patch archive: {e}"),
            }
        }

        tracing::info!(
            archives = manager.archives.len(),
            files = manager.index.read().owners.len(),
            "mounted archives"
        );
        Ok(manager)
    }

    fn mount_checked(&mut self, archive: Arc<dyn Archive>, valid_versions: &[u32]) {
        if let Some(version) = archive.game_version() {
            if !valid_versions.is_empty() && !valid_versions.contains(&version) {
                tracing::warn!(
                    archive = archive.name(),
                    version = format_args!("{version:#010x}"),
                    "skipping archive with unsupported game version"
                );
                return;
            }
        }
        self.mount_archive(archive);
    }

    /// Mount an already opened archive at the highest priority.
    pub fn mount_archive(&mut self, archive: Arc<dyn Archive>) {
        if let Some(version) = archive.game_version() {
            self.game_versions.insert(version);
        }

        let slot = self.archives.len();
        self.index.get_mut().merge(slot, archive.as_ref());
        tracing::debug!(archive = archive.name(), slot, "mounted archive");
        self.archives.push(archive);
    }

    /// Mounted archives in priority order (lowest first).
    pub fn archives(&self) -> &[Arc<dyn Archive>] {
        &self.archives
    }

    /// Game versions reported by the mounted archives.
    pub fn game_versions(&self) -> Vec<u32> {
        self.game_versions.iter().copied().collect()
    }

    /// Number of distinct files across all archives.
    pub fn file_count(&self) -> usize {
        self.index.read().owners.len()
    }

    /// Whether any mounted archive holds `path`.
    pub fn has_file(&self, path: &str) -> bool {
        self.index
            .read()
            .owners
            .contains_key(hash::normalize_path(path).as_ref())
    }

    /// Resolve a content hash to its path.
    pub fn hash_to_path(&self, hash: u64) -> Option<String> {
        self.index.read().hashes.get(&hash).cloned()
    }

    /// Resolve a content hash to an owned C string.
    pub fn hash_to_cstring(&self, hash: u64) -> Option<CString> {
        self.hash_to_path(hash)
            .and_then(|path| CString::new(path).ok())
    }

    fn owner_of(&self, path: &str) -> Option<Arc<dyn Archive>> {
        let slot = *self.index.read().owners.get(path)?;
        self.archives.get(slot).cloned()
    }

    /// Load a file from the archive that owns it.
    ///
    /// A lookup miss is `Ok(None)`. `hint` attaches a pre-declared envelope
    /// for headerless assets.
    pub fn load_file(&self, path: &str, hint: Option<ResourceInitData>) -> Result<Option<Arc<File>>> {
        let path = hash::normalize_path(path);
        let Some(archive) = self.owner_of(&path) else {
            tracing::trace!(path = %path, "file not found in any archive");
            return Ok(None);
        };

        let file = archive.load_file(&path)?;
        Ok(match (file, hint) {
            (Some(file), Some(hint)) => Some(Arc::new(
                Arc::unwrap_or_clone(file).with_init_data(Some(hint)),
            )),
            (file, _) => file,
        })
    }

    /// Load a file by the content hash of its path.
    pub fn load_file_by_hash(
        &self,
        hash: u64,
        hint: Option<ResourceInitData>,
    ) -> Result<Option<Arc<File>>> {
        match self.hash_to_path(hash) {
            Some(path) => self.load_file(&path, hint),
            None => Ok(None),
        }
    }

    /// List every file matching a search mask, sorted.
    pub fn list_files(&self, mask: &str) -> Result<Vec<String>> {
        let mask = FileMask::new(mask)?;
        let index = self.index.read();
        Ok(mask.select(index.owners.keys().map(String::as_str)))
    }

    /// Write a file to the highest-priority writable archive.
    pub fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let path = hash::normalize_path(path).into_owned();
        let (slot, archive) = self
            .archives
            .iter()
            .enumerate()
            .rev()
            .find(|(_, archive)| archive.is_writable())
            .ok_or(Error::NoWritableArchive)?;

        archive.write_file(&path, data)?;

        let mut index = self.index.write();
        index.hashes.insert(hash::content_hash(&path), path.clone());
        // A lower-priority write must not steal a path from a higher patch.
        let owner = index.owners.entry(path).or_insert(slot);
        if *owner < slot {
            *owner = slot;
        }
        Ok(())
    }

    /// Close every archive. Errors are logged and the first one returned.
    pub fn close(&self) -> Result<()> {
        let mut first = None;
        for archive in &self.archives {
            if let Err(e) = archive.close() {
                tracing::error!(archive = archive.name(), "failed to close archive: {e}");
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }
}

/// Expand directories that are not archive roots into the containers below
/// them.
fn expand_mount_paths<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    let mut expanded = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            let found = discover_archives(path);
            if !found.is_empty() {
                expanded.extend(found);
                continue;
            }
        }
        expanded.push(path.to_path_buf());
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryArchive, VERSION_ENTRY};

    fn memory(name: &str, files: &[(&str, &[u8])]) -> Arc<dyn Archive> {
        let archive = MemoryArchive::new(name);
        for (path, data) in files {
            archive.insert(path, data.to_vec());
        }
        Arc::new(archive)
    }

    #[test]
    fn test_patch_precedence() {
        let mut manager = ArchiveManager::new();
        manager.mount_archive(memory("main", &[("a", b"main-a"), ("b", b"main-b")]));
        manager.mount_archive(memory("patch", &[("a", b"patch-a")]));

        let a = manager.load_file("a", None).unwrap().unwrap();
        assert_eq!(a.data(), b"patch-a");
        assert_eq!(a.archive_name(), "patch");

        let b = manager.load_file("b", None).unwrap().unwrap();
        assert_eq!(b.data(), b"main-b");
        assert_eq!(manager.file_count(), 2);
    }

    #[test]
    fn test_hash_lookup() {
        let mut manager = ArchiveManager::new();
        manager.mount_archive(memory("main", &[("objects/gkeep/gDL", b"x")]));

        let hash = hash::content_hash("objects/gkeep/gDL");
        assert_eq!(manager.hash_to_path(hash).as_deref(), Some("objects/gkeep/gDL"));
        assert_eq!(
            manager.hash_to_cstring(hash).unwrap().as_bytes(),
            b"objects/gkeep/gDL"
        );
        assert!(manager.load_file_by_hash(hash, None).unwrap().is_some());
        assert!(manager.load_file_by_hash(hash ^ 1, None).unwrap().is_none());
    }

    #[test]
    fn test_hint_is_attached() {
        let mut manager = ArchiveManager::new();
        manager.mount_archive(memory("main", &[("shaders/a.glsl", b"void main(){}")]));

        let hint = ResourceInitData::headerless(
            "shaders/a.glsl",
            otrkit_common::ResourceType::Shader,
            0,
        );
        let file = manager
            .load_file("shaders/a.glsl", Some(hint.clone()))
            .unwrap()
            .unwrap();
        assert_eq!(file.init_data(), Some(&hint));
    }

    #[test]
    fn test_write_goes_to_top_writable() {
        let mut manager = ArchiveManager::new();
        manager.mount_archive(memory("main", &[("a", b"1")]));
        manager.mount_archive(memory("patch", &[]));

        manager.write_file("new/file", b"2").unwrap();
        assert!(manager.has_file("new/file"));
        assert_eq!(manager.archives()[1].read_raw("new/file").unwrap().unwrap(), b"2");
        assert!(!manager.archives()[0].contains("new/file"));
    }

    #[test]
    fn test_list_files_merged() {
        let mut manager = ArchiveManager::new();
        manager.mount_archive(memory("main", &[("t/a", b""), ("t/b", b"")]));
        manager.mount_archive(memory("patch", &[("t/b", b""), ("t/c", b""), ("u/d", b"")]));

        assert_eq!(manager.list_files("t/*").unwrap(), vec!["t/a", "t/b", "t/c"]);
    }

    #[test]
    fn test_mount_main_failure_is_fatal() {
        let err = ArchiveManager::mount(&["/does/not/exist.o2r"], &[]).unwrap_err();
        assert!(matches!(err, Error::Mount { .. }));
        assert!(matches!(
            ArchiveManager::mount::<&str>(&[], &[]),
            Err(Error::NothingToMount)
        ));
    }

    #[test]
    fn test_mount_skips_bad_patch_and_wrong_version() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main");
        std::fs::create_dir(&main).unwrap();
        std::fs::write(main.join("a"), b"main").unwrap();
        std::fs::write(main.join(VERSION_ENTRY), [0, 0, 0, 0, 1]).unwrap();

        let old = dir.path().join("old");
        std::fs::create_dir(&old).unwrap();
        std::fs::write(old.join("a"), b"old").unwrap();
        std::fs::write(old.join(VERSION_ENTRY), [0, 0, 0, 0, 2]).unwrap();

        let manager = ArchiveManager::mount(
            &[main.clone(), dir.path().join("missing.o2r"), old],
            &[1],
        )
        .unwrap();

        assert_eq!(manager.archives().len(), 1);
        assert_eq!(manager.game_versions(), vec![1]);
        assert_eq!(manager.load_file("a", None).unwrap().unwrap().data(), b"main");
    }
}
