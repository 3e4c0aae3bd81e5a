//! Archive containers for otrkit.
//!
//! An archive is a named, path-indexed container that resolves a logical file
//! path (or the content hash of that path) to a raw byte buffer. Three
//! backends are provided:
//!
//! - [`O2rArchive`] - `.o2r` / `.zip` containers, readable and writable
//! - [`FolderArchive`] - a loose directory tree
//! - [`MemoryArchive`] - in-memory entries for embedded assets
//!
//! The [`ArchiveManager`] mounts a main archive plus any number of patch
//! archives. Later archives shadow earlier ones; precedence is resolved once
//! at mount time into a single flat index.
//!
//! # Example
//!
//! ```no_run
//! use otrkit_archive::ArchiveManager;
//!
//! let manager = ArchiveManager::mount(&["oot.o2r", "mods"], &[])?;
//!
//! if let Some(file) = manager.load_file("textures/title_static/gTitleLogoTex", None)? {
//!     println!("{} bytes", file.len());
//! }
//! # Ok::<(), otrkit_archive::Error>(())
//! ```

mod archive;
mod error;
mod file;
mod folder;
mod index;
mod manager;
mod memory;
mod o2r;

pub use archive::{discover_archives, open_archive, Archive, ArchiveExt, VERSION_ENTRY};
pub use error::{Error, Result};
pub use file::File;
pub use folder::FolderArchive;
pub use index::{ArchiveIndex, FileMask};
pub use manager::ArchiveManager;
pub use memory::MemoryArchive;
pub use o2r::O2rArchive;
