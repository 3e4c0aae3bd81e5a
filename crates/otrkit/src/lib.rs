//! otrkit - asset archives and resource loading for game ports.
//!
//! This crate provides a unified interface to the otrkit crates.
//!
//! # Crates
//!
//! - [`otrkit_common`] - Endian-aware binary I/O, path hashing, resource envelopes
//! - [`otrkit_archive`] - `.o2r`/`.otr` containers, folders and the patch-aware archive manager
//! - [`otrkit_resource`] - Envelope parsing, per-type decoders, display-list tooling
//! - [`otrkit_manager`] - Concurrent resource cache, background loader and bridge surface
//!
//! # Example
//!
//! ```no_run
//! use otrkit::prelude::*;
//!
//! let manager = ResourceManager::new(ManagerConfig::with_archives(["oot.o2r"]))?;
//!
//! if let Some(resource) = manager.load_resource("objects/gameplay_keep/gEffFire1DL", true) {
//!     if let Some(list) = resource.data().as_display_list() {
//!         print!("{}", disassemble(list, None));
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use otrkit_archive as archive;
pub use otrkit_common as common;
pub use otrkit_manager as manager;
pub use otrkit_resource as resource;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use otrkit_archive::{open_archive, Archive, ArchiveExt, ArchiveManager, File};
    pub use otrkit_common::{
        hash, BinaryReader, BinaryWriter, Endianness, ResourceFormat, ResourceInitData,
        ResourceType,
    };
    pub use otrkit_manager::{bridge, ManagerConfig, ResourceManager};
    pub use otrkit_resource::{disassemble, encode, FactoryRegistry, Resource, ResourceData};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
