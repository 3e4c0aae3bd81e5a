//! `.o2r` / `.zip` container backend.

use std::fs;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::archive::{read_game_version, Archive, VERSION_ENTRY};
use crate::{ArchiveIndex, Error, Result};

type Container = ZipArchive<BufReader<fs::File>>;

/// A zip-based archive.
///
/// Entry names are indexed once at open. Writes rebuild the container into a
/// temporary file next to it, copying the other entries without
/// recompression, then swap it in and reopen.
#[derive(Debug)]
pub struct O2rArchive {
    path: PathBuf,
    name: String,
    // `None` once closed.
    container: Mutex<Option<Container>>,
    // Normalised logical path -> entry name inside the container.
    index: RwLock<ArchiveIndex<String>>,
    version: Option<u32>,
}

impl O2rArchive {
    /// Open an existing container.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let mut container = open_container(&path)?;
        let index = build_index(&mut container)?;
        tracing::debug!(archive = %name, entries = index.len(), "indexed o2r archive");

        let version = read_game_version(&name, || {
            read_entry(&mut container, index.get(VERSION_ENTRY).map(String::as_str))
        });

        Ok(Self {
            path,
            name,
            container: Mutex::new(Some(container)),
            index: RwLock::new(index),
            version,
        })
    }

    /// Create an empty container at `path` and open it.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let writer = ZipWriter::new(fs::File::create(path)?);
        writer.finish()?;
        Self::open(path)
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    /// Whether the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// Write a new container with `path` replaced and swap it in.
    ///
    /// The temporary file lives next to the container and is removed if
    /// anything fails before the swap.
    fn rebuild_with(&self, container: &mut Container, path: &str, data: &[u8]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut writer = ZipWriter::new(NamedTempFile::new_in(dir)?);

        for i in 0..container.len() {
            let entry = container.by_index_raw(i)?;
            if otrkit_common::hash::normalize_path(entry.name()) == path {
                continue;
            }
            writer.raw_copy_file(entry)?;
        }

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        writer.start_file(path, options)?;
        writer.write_all(data)?;

        let tmp = writer.finish()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

fn open_container(path: &Path) -> Result<Container> {
    let file = fs::File::open(path)?;
    Ok(ZipArchive::new(BufReader::new(file))?)
}

fn build_index(container: &mut Container) -> Result<ArchiveIndex<String>> {
    let mut index = ArchiveIndex::new();
    for i in 0..container.len() {
        let entry = container.by_index_raw(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        index.insert(&name, name.clone());
    }
    Ok(index)
}

fn read_entry(container: &mut Container, entry_name: Option<&str>) -> Result<Option<Vec<u8>>> {
    let Some(entry_name) = entry_name else {
        return Ok(None);
    };
    let mut entry = container.by_name(entry_name)?;
    let mut data = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut data)?;
    Ok(Some(data))
}

impl Archive for O2rArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> &Path {
        &self.path
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
        let Some(entry_name) = self.index.read().get(path).cloned() else {
            return Ok(None);
        };

        let mut guard = self.container.lock();
        let container = guard
            .as_mut()
            .ok_or_else(|| Error::Closed(self.name.clone()))?;
        read_entry(container, Some(&entry_name))
    }

    fn game_version(&self) -> Option<u32> {
        self.version
    }

    fn is_writable(&self) -> bool {
        self.container.lock().is_some()
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let logical = otrkit_common::hash::normalize_path(path).into_owned();

        let mut guard = self.container.lock();
        let container = guard
            .as_mut()
            .ok_or_else(|| Error::Closed(self.name.clone()))?;

        if let Err(e) = self.rebuild_with(container, &logical, data) {
            tracing::warn!(archive = %self.name, path = %logical, "write failed: {e}");
            return Err(e);
        }

        // The old reader keeps serving the previous contents until the new
        // container is open and indexed.
        let mut reopened = open_container(&self.path)?;
        let index = build_index(&mut reopened)?;
        *self.index.write() = index;
        *guard = Some(reopened);

        tracing::debug!(archive = %self.name, path = %logical, "wrote entry");
        Ok(())
    }

    fn close(&self) -> Result<()> {
        if self.container.lock().take().is_some() {
            tracing::debug!(archive = %self.name, "closed");
        }
        Ok(())
    }
}
