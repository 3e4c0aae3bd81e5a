//! Loose directory tree archive.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use walkdir::WalkDir;

use crate::archive::{read_game_version, Archive, VERSION_ENTRY};
use crate::{ArchiveIndex, Error, Result};

/// An archive backed by a directory of loose files.
///
/// The tree is walked once at open; the logical path of each file is its path
/// relative to the root with `/` separators.
#[derive(Debug)]
pub struct FolderArchive {
    root: PathBuf,
    name: String,
    index: RwLock<ArchiveIndex<PathBuf>>,
    version: Option<u32>,
}

impl FolderArchive {
    /// Open a directory and index every file below it.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", root.display()),
            )));
        }

        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let mut index = ArchiveIndex::new();
        for entry in WalkDir::new(&root).follow_links(true) {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&root) else {
                continue;
            };
            let logical = relative.to_string_lossy().replace('\\', "/");
            index.insert(&logical, entry.into_path());
        }

        tracing::debug!(archive = %name, entries = index.len(), "indexed folder archive");

        let version = read_game_version(&name, || {
            Ok(match index.get(VERSION_ENTRY) {
                Some(path) => Some(fs::read(path)?),
                None => None,
            })
        });

        Ok(Self {
            root,
            name,
            index: RwLock::new(index),
            version,
        })
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Archive for FolderArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> &Path {
        &self.root
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
        let Some(disk_path) = self.index.read().get(path).cloned() else {
            return Ok(None);
        };
        Ok(Some(fs::read(disk_path)?))
    }

    fn game_version(&self) -> Option<u32> {
        self.version
    }

    fn is_writable(&self) -> bool {
        true
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let logical = otrkit_common::hash::normalize_path(path);
        let relative = otrkit_common::hash::enclosed_path(&logical)
            .ok_or_else(|| Error::InvalidPath(path.to_string()))?;
        let disk_path = self.root.join(relative);
        if let Some(parent) = disk_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&disk_path, data)?;

        self.index.write().insert(&logical, disk_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_read() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("objects/obj_a")).unwrap();
        fs::write(dir.path().join("objects/obj_a/gDL"), b"dl").unwrap();
        fs::write(dir.path().join(VERSION_ENTRY), [1, 7, 0, 0, 0]).unwrap();

        let archive = FolderArchive::open(dir.path()).unwrap();
        assert!(archive.contains("objects/obj_a/gDL"));
        assert_eq!(archive.read_raw("objects/obj_a/gDL").unwrap().unwrap(), b"dl");
        assert!(archive.read_raw("objects/obj_a/missing").unwrap().is_none());
        assert_eq!(archive.game_version(), Some(7));
    }

    #[test]
    fn test_write_reindexes() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FolderArchive::open(dir.path()).unwrap();

        archive.write_file("mods/new/tex", b"pixels").unwrap();
        assert!(archive.contains("mods/new/tex"));
        assert_eq!(
            fs::read(dir.path().join("mods/new/tex")).unwrap(),
            b"pixels"
        );
    }

    #[test]
    fn test_write_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir(&root).unwrap();
        let archive = FolderArchive::open(&root).unwrap();

        for path in ["../escaped.bin", "mods/../../escaped.bin", "..\\escaped.bin"] {
            assert!(matches!(
                archive.write_file(path, b"data"),
                Err(Error::InvalidPath(_))
            ));
        }
        assert!(!dir.path().join("escaped.bin").exists());
        assert!(archive.entries().is_empty());
    }

    #[test]
    fn test_open_missing_directory() {
        assert!(FolderArchive::open("/definitely/not/here").is_err());
    }
}
