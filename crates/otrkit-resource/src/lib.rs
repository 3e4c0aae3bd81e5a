//! Resource decoding for otrkit.
//!
//! Turns an archive [`File`](otrkit_archive::File) into a typed [`Resource`]:
//!
//! 1. [`Envelope::parse`] reads the binary header, detects an XML document, or
//!    takes the init data the caller declared for a headerless asset.
//! 2. [`FactoryRegistry`] picks the decoder for the resource type, payload
//!    format and schema version.
//! 3. The decoder builds one of the [`types`].
//!
//! Display lists get extra tooling: [`gbi`] holds the opcode tables and
//! instruction encoders, [`disassemble`] renders a list as text and
//! [`encode`] writes supported types back to the binary format.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use otrkit_archive::File;
//! use otrkit_resource::FactoryRegistry;
//!
//! let registry = FactoryRegistry::with_defaults();
//! let file = Arc::new(File::detached("objects/gameplay_keep/gEffFire1DL", std::fs::read("dl.bin")?));
//! let resource = registry.decode(&file)?;
//! println!("{} ({} bytes)", resource.resource_type(), resource.pointer_size());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod disasm;
mod encode;
mod envelope;
mod error;
mod registry;
mod resource;

pub mod gbi;
pub mod types;
pub mod xml;

pub use disasm::{disassemble, HashResolver};
pub use encode::encode;
pub use envelope::{Envelope, Payload};
pub use error::{DecodeError, Result};
pub use registry::{BinaryFactory, FactoryRegistry, XmlFactory};
pub use resource::{Resource, ResourceData};
