//! The archive abstraction.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use otrkit_common::{hash, BinaryReader, Endianness};
use walkdir::WalkDir;

use crate::{Error, File, FileMask, FolderArchive, O2rArchive, Result};

/// Name of the entry that carries an archive's game version.
///
/// Its body is `[u8 endianness][u32 version]`.
pub const VERSION_ENTRY: &str = "version";

/// Container file extensions recognised when searching directories.
const ARCHIVE_EXTENSIONS: [&str; 3] = ["o2r", "otr", "zip"];

/// Signature of MPQ containers, which are not supported.
const MPQ_MAGIC: &[u8; 4] = b"MPQ\x1a";

/// A mounted container resolving logical paths to raw bytes.
///
/// Implementations index their entries eagerly when opened; lookups never
/// touch the container. Reads must be safe to call from worker threads.
pub trait Archive: Send + Sync + fmt::Debug {
    /// Archive name (file name of the container).
    fn name(&self) -> &str;

    /// Location of the container on disk.
    fn location(&self) -> &Path;

    /// Whether the archive holds `path`.
    fn contains(&self, path: &str) -> bool;

    /// Resolve a content hash through this archive's hash table.
    fn hash_to_path(&self, hash: u64) -> Option<String>;

    /// All logical paths in the archive.
    fn entries(&self) -> Vec<String>;

    /// Read the raw bytes of an entry, decompressing as required.
    ///
    /// A path that is not in the archive is `Ok(None)`.
    fn read_raw(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// The game data revision recorded in the archive, if any.
    fn game_version(&self) -> Option<u32>;

    /// Whether [`write_file`](Self::write_file) is supported.
    fn is_writable(&self) -> bool {
        false
    }

    /// Add or replace an entry and re-index it.
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let _ = (path, data);
        Err(Error::ReadOnly(self.name().to_string()))
    }

    /// Flush pending writes and release container handles.
    fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Enumerate entries matching a search mask, sorted.
    fn list_files(&self, mask: &str) -> Result<Vec<String>> {
        let mask = FileMask::new(mask)?;
        let entries = self.entries();
        Ok(mask.select(entries.iter().map(String::as_str)))
    }
}

/// Loading helpers for shared archives.
///
/// Files keep a weak reference to the archive they came from, so loading goes
/// through the `Arc`.
pub trait ArchiveExt {
    /// Load a file by logical path. A lookup miss is `Ok(None)`.
    fn load_file(&self, path: &str) -> Result<Option<Arc<File>>>;

    /// Load a file by content hash.
    fn load_file_by_hash(&self, hash: u64) -> Result<Option<Arc<File>>>;
}

impl ArchiveExt for Arc<dyn Archive> {
    fn load_file(&self, path: &str) -> Result<Option<Arc<File>>> {
        let path = hash::normalize_path(path);
        let Some(data) = self.read_raw(&path)? else {
            return Ok(None);
        };

        tracing::trace!(archive = self.name(), path = %path, len = data.len(), "read file");
        Ok(Some(Arc::new(File::new(
            path.into_owned(),
            Arc::downgrade(self),
            data.into(),
        ))))
    }

    fn load_file_by_hash(&self, hash: u64) -> Result<Option<Arc<File>>> {
        match self.hash_to_path(hash) {
            Some(path) => self.load_file(&path),
            None => Ok(None),
        }
    }
}

/// Open an archive, picking the backend from the path.
///
/// Directories open as [`FolderArchive`], `.o2r`/`.otr`/`.zip` files as
/// [`O2rArchive`]. MPQ-based `.otr` files are rejected.
pub fn open_archive(path: impl AsRef<Path>) -> Result<Arc<dyn Archive>> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(Arc::new(FolderArchive::open(path)?));
    }

    if has_archive_extension(path) && !is_mpq(path)? {
        return Ok(Arc::new(O2rArchive::open(path)?));
    }

    Err(Error::UnsupportedContainer(path.to_path_buf()))
}

/// Find container files below a directory, in sorted order.
pub fn discover_archives(dir: impl AsRef<Path>) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && has_archive_extension(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    found.sort();
    found
}

fn is_mpq(path: &Path) -> Result<bool> {
    let mut magic = [0u8; 4];
    let mut file = std::fs::File::open(path)?;
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(&magic == MPQ_MAGIC),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn has_archive_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ARCHIVE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Parse the body of a [`VERSION_ENTRY`].
pub(crate) fn parse_game_version(data: &[u8]) -> Result<u32> {
    let mut reader = BinaryReader::new(data);
    let order = Endianness::try_from(reader.read_u8()?)?;
    reader.set_endianness(order);
    Ok(reader.read_u32()?)
}

/// Read the game version through a backend's raw reader, logging bad entries.
pub(crate) fn read_game_version(
    name: &str,
    read: impl FnOnce() -> Result<Option<Vec<u8>>>,
) -> Option<u32> {
    let data = match read() {
        Ok(Some(data)) => data,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(archive = name, "failed to read version entry: {e}");
            return None;
        }
    };

    match parse_game_version(&data) {
        Ok(version) => Some(version),
        Err(e) => {
            tracing::warn!(archive = name, "malformed version entry: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryArchive;

    #[test]
    fn test_parse_game_version() {
        assert_eq!(parse_game_version(&[0, 0x12, 0x34, 0x56, 0x78]).unwrap(), 0x12345678);
        assert_eq!(parse_game_version(&[1, 0x78, 0x56, 0x34, 0x12]).unwrap(), 0x12345678);
        assert!(parse_game_version(&[1, 0]).is_err());
    }

    #[test]
    fn test_load_file_keeps_weak_archive() {
        let archive: Arc<dyn Archive> =
            Arc::new(MemoryArchive::new("mem").with_file("a/b", b"data".to_vec()));

        let file = archive.load_file("/a\\b").unwrap().unwrap();
        assert_eq!(file.path(), "a/b");
        assert_eq!(file.data(), b"data");
        assert_eq!(file.archive_name(), "mem");

        drop(archive);
        assert!(file.archive().is_none());
    }

    #[test]
    fn test_lookup_miss_is_none() {
        let archive: Arc<dyn Archive> = Arc::new(MemoryArchive::new("mem"));
        assert!(archive.load_file("missing").unwrap().is_none());
        assert!(archive.load_file_by_hash(42).unwrap().is_none());
    }

    #[test]
    fn test_unsupported_container() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oot.otr");
        std::fs::write(&path, b"MPQ\x1a").unwrap();
        assert!(matches!(
            open_archive(&path),
            Err(Error::UnsupportedContainer(_))
        ));
    }

    #[test]
    fn test_discover_archives_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.o2r"), b"").unwrap();
        std::fs::write(dir.path().join("sub").join("a.zip"), b"").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"").unwrap();

        let found = discover_archives(dir.path());
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("b.o2r"));
        assert!(found[1].ends_with("sub/a.zip"));
    }
}
