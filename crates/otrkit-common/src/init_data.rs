//! Resource envelope types.
//!
//! Every binary resource starts with a fixed 0x40-byte header:
//!
//! ```text
//! 0x00 u8    endianness (0 = big, 1 = little)
//! 0x01 u8x3  padding
//! 0x04 u32   resource type
//! 0x08 u32   schema version
//! 0x0C u64   content id
//! 0x14 u32   is-custom flag
//! 0x18       reserved (zero) up to 0x40
//! ```

use std::fmt;

use crate::{hash, BinaryReader, BinaryWriter, Endianness, Result};

/// Size of the binary resource header in bytes.
pub const RESOURCE_HEADER_SIZE: usize = 0x40;

const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*code)
}

/// The type tag of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceType {
    DisplayList,
    Texture,
    Vertex,
    Matrix,
    Array,
    Light,
    Scene,
    Skeleton,
    SkeletonLimb,
    Animation,
    PlayerAnimation,
    Cutscene,
    Path,
    Text,
    Blob,
    Json,
    Shader,
    Font,
    Material,
    CollisionHeader,
    /// A type tag with no known mapping.
    Unknown(u32),
}

impl ResourceType {
    /// All known resource types.
    pub const KNOWN: [ResourceType; 20] = [
        Self::DisplayList,
        Self::Texture,
        Self::Vertex,
        Self::Matrix,
        Self::Array,
        Self::Light,
        Self::Scene,
        Self::Skeleton,
        Self::SkeletonLimb,
        Self::Animation,
        Self::PlayerAnimation,
        Self::Cutscene,
        Self::Path,
        Self::Text,
        Self::Blob,
        Self::Json,
        Self::Shader,
        Self::Font,
        Self::Material,
        Self::CollisionHeader,
    ];

    /// The on-disk numeric tag.
    pub const fn code(self) -> u32 {
        match self {
            Self::DisplayList => fourcc(b"ODLT"),
            Self::Texture => fourcc(b"OTEX"),
            Self::Vertex => fourcc(b"OVTX"),
            Self::Matrix => fourcc(b"OMTX"),
            Self::Array => fourcc(b"OARR"),
            Self::Light => fourcc(b"OLIT"),
            Self::Scene => fourcc(b"OROM"),
            Self::Skeleton => fourcc(b"OSKL"),
            Self::SkeletonLimb => fourcc(b"OSLB"),
            Self::Animation => fourcc(b"OANM"),
            Self::PlayerAnimation => fourcc(b"OPAM"),
            Self::Cutscene => fourcc(b"OCUT"),
            Self::Path => fourcc(b"OPTH"),
            Self::Text => fourcc(b"OTXT"),
            Self::Blob => fourcc(b"OBLB"),
            Self::Json => fourcc(b"JSON"),
            Self::Shader => fourcc(b"SHAD"),
            Self::Font => fourcc(b"FONT"),
            Self::Material => fourcc(b"OMAT"),
            Self::CollisionHeader => fourcc(b"OCOL"),
            Self::Unknown(code) => code,
        }
    }

    /// Map a numeric tag to a type.
    pub fn from_code(code: u32) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|ty| ty.code() == code)
            .unwrap_or(Self::Unknown(code))
    }

    /// Map an XML root element name to a type.
    pub fn from_xml_name(name: &str) -> Option<Self> {
        Some(match name {
            "DisplayList" => Self::DisplayList,
            "Texture" => Self::Texture,
            "Vertex" => Self::Vertex,
            "Matrix" => Self::Matrix,
            "Array" => Self::Array,
            "Light" => Self::Light,
            "Scene" => Self::Scene,
            "Skeleton" => Self::Skeleton,
            "SkeletonLimb" => Self::SkeletonLimb,
            "Animation" => Self::Animation,
            "PlayerAnimation" => Self::PlayerAnimation,
            "Cutscene" => Self::Cutscene,
            "Path" => Self::Path,
            "Text" => Self::Text,
            "Blob" => Self::Blob,
            "Material" => Self::Material,
            "CollisionHeader" => Self::CollisionHeader,
            _ => return None,
        })
    }

    /// Human-readable type name.
    pub fn name(self) -> &'static str {
        match self {
            Self::DisplayList => "DisplayList",
            Self::Texture => "Texture",
            Self::Vertex => "Vertex",
            Self::Matrix => "Matrix",
            Self::Array => "Array",
            Self::Light => "Light",
            Self::Scene => "Scene",
            Self::Skeleton => "Skeleton",
            Self::SkeletonLimb => "SkeletonLimb",
            Self::Animation => "Animation",
            Self::PlayerAnimation => "PlayerAnimation",
            Self::Cutscene => "Cutscene",
            Self::Path => "Path",
            Self::Text => "Text",
            Self::Blob => "Blob",
            Self::Json => "Json",
            Self::Shader => "Shader",
            Self::Font => "Font",
            Self::Material => "Material",
            Self::CollisionHeader => "CollisionHeader",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "Unknown({code:#010x})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Serialization format of a resource payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceFormat {
    #[default]
    Binary,
    Xml,
}

/// The decoded envelope that precedes every resource payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceInitData {
    /// Logical path of the resource.
    pub path: String,
    /// Stable 64-bit content id (hash of the path).
    pub id: u64,
    /// Resource type tag.
    pub resource_type: ResourceType,
    /// Schema version of the payload.
    pub resource_version: u32,
    /// Payload serialization format.
    pub format: ResourceFormat,
    /// Byte order of multi-byte fields.
    pub byte_order: Endianness,
    /// Whether the resource comes from a custom (modded) source.
    pub is_custom: bool,
    /// Whether the payload is preceded by a binary header.
    pub has_header: bool,
}

impl ResourceInitData {
    /// Create init data for a headerless resource with a pre-declared type.
    ///
    /// This is how raw assets such as shaders, JSON documents or fonts are
    /// loaded: the caller supplies the envelope the file lacks.
    pub fn headerless(path: &str, resource_type: ResourceType, resource_version: u32) -> Self {
        let path = hash::normalize_path(path).into_owned();
        Self {
            id: hash::content_hash(&path),
            path,
            resource_type,
            resource_version,
            format: ResourceFormat::Binary,
            byte_order: Endianness::native(),
            is_custom: false,
            has_header: false,
        }
    }

    /// Read the binary header from the start of `reader`.
    ///
    /// On success the reader's byte order is set from the marker and the
    /// position is left at the end of the header.
    pub fn read_header(path: &str, reader: &mut BinaryReader<'_>) -> Result<Self> {
        let start = reader.position();
        let byte_order = Endianness::try_from(reader.read_u8()?)?;
        reader.set_endianness(byte_order);
        reader.advance(3);

        let resource_type = ResourceType::from_code(reader.read_u32()?);
        let resource_version = reader.read_u32()?;
        let id = reader.read_u64()?;
        let is_custom = reader.read_u32()? != 0;

        // The header is fixed-size; reject truncated files here.
        let consumed = reader.position() - start;
        reader.read_bytes(RESOURCE_HEADER_SIZE - consumed)?;

        Ok(Self {
            path: hash::normalize_path(path).into_owned(),
            id,
            resource_type,
            resource_version,
            format: ResourceFormat::Binary,
            byte_order,
            is_custom,
            has_header: true,
        })
    }

    /// Write the binary header. The writer's byte order must match `byte_order`.
    pub fn write_header(&self, writer: &mut BinaryWriter) {
        let start = writer.position();
        writer
            .write_u8(self.byte_order as u8)
            .write_zeros(3)
            .write_u32(self.resource_type.code())
            .write_u32(self.resource_version)
            .write_u64(self.id)
            .write_u32(u32::from(self.is_custom));
        let written = writer.position() - start;
        writer.write_zeros(RESOURCE_HEADER_SIZE - written);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes_roundtrip() {
        for ty in ResourceType::KNOWN {
            assert_eq!(ResourceType::from_code(ty.code()), ty);
        }
        assert_eq!(ResourceType::DisplayList.code(), 0x4F444C54);
        assert_eq!(
            ResourceType::from_code(0x1234),
            ResourceType::Unknown(0x1234)
        );
    }

    #[test]
    fn test_header_layout() {
        let init = ResourceInitData {
            path: "objects/obj".into(),
            id: 0x1122_3344_5566_7788,
            resource_type: ResourceType::Texture,
            resource_version: 1,
            format: ResourceFormat::Binary,
            byte_order: Endianness::Big,
            is_custom: true,
            has_header: true,
        };

        let mut writer = BinaryWriter::new(Endianness::Big);
        init.write_header(&mut writer);
        let bytes = writer.into_inner();
        assert_eq!(bytes.len(), RESOURCE_HEADER_SIZE);
        assert_eq!(&bytes[4..8], b"OTEX");

        let mut reader = BinaryReader::new(&bytes);
        let parsed = ResourceInitData::read_header("objects/obj", &mut reader).unwrap();
        assert_eq!(parsed, init);
        assert_eq!(reader.position(), RESOURCE_HEADER_SIZE);
        assert_eq!(reader.endianness(), Endianness::Big);
    }

    #[test]
    fn test_truncated_header() {
        let bytes = [1u8, 0, 0, 0, 0x54, 0x4C, 0x44, 0x4F];
        let mut reader = BinaryReader::new(&bytes);
        assert!(ResourceInitData::read_header("x", &mut reader).is_err());
    }
}
