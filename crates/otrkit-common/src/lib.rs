//! Common utilities for otrkit.
//!
//! This crate provides foundational types and utilities used across all otrkit crates:
//!
//! - [`BinaryReader`] / [`BinaryWriter`] - Endian-aware binary reading and writing
//! - [`Endianness`] - Byte order marker carried by every resource envelope
//! - [`hash`] - Content hashing of logical asset paths
//! - [`ResourceInitData`] and [`ResourceType`] - The decoded resource envelope

mod endian;
mod error;
mod init_data;
mod reader;
mod writer;

pub mod hash;

pub use endian::Endianness;
pub use error::{Error, Result};
pub use init_data::{ResourceFormat, ResourceInitData, ResourceType, RESOURCE_HEADER_SIZE};
pub use reader::BinaryReader;
pub use writer::BinaryWriter;
