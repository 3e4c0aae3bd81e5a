//! Typed arrays of vertices, scalars or vectors.

use otrkit_common::BinaryReader;
use zerocopy::IntoBytes;

use crate::types::Vtx;
use crate::{DecodeError, Result};

/// Element kind of an array resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayType {
    Vertex,
    Scalar,
    Vector,
}

/// Scalar element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    S8,
    U8,
    X8,
    S16,
    U16,
    S32,
    U32,
    S64,
    U64,
    F32,
    F64,
}

impl ScalarType {
    fn from_code(code: u32) -> Result<Self> {
        Ok(match code {
            0 => Self::S8,
            1 => Self::U8,
            2 => Self::X8,
            3 => Self::S16,
            4 => Self::U16,
            5 => Self::S32,
            6 => Self::U32,
            7 => Self::S64,
            8 => Self::U64,
            9 => Self::F32,
            10 => Self::F64,
            value => {
                return Err(DecodeError::InvalidValue {
                    field: "scalar type",
                    value,
                })
            }
        })
    }

    /// Size of one scalar in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::S8 | Self::U8 | Self::X8 => 1,
            Self::S16 | Self::U16 => 2,
            Self::S32 | Self::U32 | Self::F32 => 4,
            Self::S64 | Self::U64 | Self::F64 => 8,
        }
    }

    /// Read one scalar and append it in native byte order.
    fn read_into(self, reader: &mut BinaryReader<'_>, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Self::S8 | Self::U8 | Self::X8 => out.push(reader.read_u8()?),
            Self::S16 => out.extend_from_slice(&reader.read_i16()?.to_ne_bytes()),
            Self::U16 => out.extend_from_slice(&reader.read_u16()?.to_ne_bytes()),
            Self::S32 => out.extend_from_slice(&reader.read_i32()?.to_ne_bytes()),
            Self::U32 => out.extend_from_slice(&reader.read_u32()?.to_ne_bytes()),
            Self::S64 => out.extend_from_slice(&reader.read_i64()?.to_ne_bytes()),
            Self::U64 => out.extend_from_slice(&reader.read_u64()?.to_ne_bytes()),
            Self::F32 => out.extend_from_slice(&reader.read_f32()?.to_ne_bytes()),
            Self::F64 => out.extend_from_slice(&reader.read_f64()?.to_ne_bytes()),
        }
        Ok(())
    }
}

/// Array payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Vertices(Vec<Vtx>),
    /// Packed native-endian scalars; vectors have `dimension` components.
    Scalars {
        scalar_type: ScalarType,
        dimension: u32,
        bytes: Vec<u8>,
    },
}

/// An array resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    pub array_type: ArrayType,
    pub count: u32,
    pub data: ArrayData,
}

impl Array {
    /// Binary V0.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let array_type = match reader.read_u32()? {
            0 => ArrayType::Vertex,
            1 => ArrayType::Scalar,
            2 => ArrayType::Vector,
            value => {
                return Err(DecodeError::InvalidValue {
                    field: "array type",
                    value,
                })
            }
        };
        let count = reader.read_u32()?;

        if array_type == ArrayType::Vertex {
            let mut vertices = Vec::with_capacity((count as usize).min(reader.remaining() / 16));
            for _ in 0..count {
                vertices.push(Vtx::read(reader)?);
            }
            return Ok(Self {
                array_type,
                count,
                data: ArrayData::Vertices(vertices),
            });
        }

        let mut element_type: Option<ScalarType> = None;
        let mut dimension = 1;
        let mut bytes = Vec::new();
        for _ in 0..count {
            let scalar_type = ScalarType::from_code(reader.read_u32()?)?;
            if element_type.is_some_and(|known| known != scalar_type) {
                return Err(DecodeError::InvalidValue {
                    field: "mixed scalar type",
                    value: scalar_type as u32,
                });
            }
            element_type = Some(scalar_type);

            if array_type == ArrayType::Vector {
                dimension = reader.read_u32()?;
            }
            for _ in 0..dimension {
                scalar_type.read_into(reader, &mut bytes)?;
            }
        }

        Ok(Self {
            array_type,
            count,
            data: ArrayData::Scalars {
                scalar_type: element_type.unwrap_or(ScalarType::U8),
                dimension,
                bytes,
            },
        })
    }

    /// The array payload as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.data {
            ArrayData::Vertices(vertices) => vertices.as_bytes(),
            ArrayData::Scalars { bytes, .. } => bytes,
        }
    }
}
