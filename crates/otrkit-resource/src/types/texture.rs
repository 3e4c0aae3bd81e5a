//! Textures.

use otrkit_common::BinaryReader;

use crate::{DecodeError, Result};

/// Pixel encoding of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TextureType {
    Error = 0,
    Rgba32bpp = 1,
    Rgba16bpp = 2,
    Palette4bpp = 3,
    Palette8bpp = 4,
    Grayscale4bpp = 5,
    Grayscale8bpp = 6,
    GrayscaleAlpha4bpp = 7,
    GrayscaleAlpha8bpp = 8,
    GrayscaleAlpha16bpp = 9,
}

impl TextureType {
    /// Map the on-disk value to a texture type.
    pub fn from_code(value: u32) -> Result<Self> {
        Ok(match value {
            0 => Self::Error,
            1 => Self::Rgba32bpp,
            2 => Self::Rgba16bpp,
            3 => Self::Palette4bpp,
            4 => Self::Palette8bpp,
            5 => Self::Grayscale4bpp,
            6 => Self::Grayscale8bpp,
            7 => Self::GrayscaleAlpha4bpp,
            8 => Self::GrayscaleAlpha8bpp,
            9 => Self::GrayscaleAlpha16bpp,
            other => {
                return Err(DecodeError::InvalidValue {
                    field: "texture type",
                    value: other,
                })
            }
        })
    }

    /// Bits per texel.
    pub fn bits_per_texel(self) -> u32 {
        match self {
            Self::Error => 0,
            Self::Rgba32bpp => 32,
            Self::Rgba16bpp | Self::GrayscaleAlpha16bpp => 16,
            Self::Palette8bpp | Self::Grayscale8bpp | Self::GrayscaleAlpha8bpp => 8,
            Self::Palette4bpp | Self::Grayscale4bpp | Self::GrayscaleAlpha4bpp => 4,
        }
    }
}

/// Flag bit: the texture is a replacement at a different resolution.
pub const TEX_FLAG_LOAD_AS_RAW: u32 = 1 << 0;

/// A texture with its raw pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub texture_type: TextureType,
    pub width: u32,
    pub height: u32,
    pub flags: u32,
    pub h_byte_scale: f32,
    pub v_byte_scale: f32,
    pub data: Vec<u8>,
}

impl Texture {
    /// Binary V0: type, width, height, size, bytes.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let texture_type = TextureType::from_code(reader.read_u32()?)?;
        let width = reader.read_u32()?;
        let height = reader.read_u32()?;
        let data = read_pixels(reader)?;

        Ok(Self {
            texture_type,
            width,
            height,
            flags: 0,
            h_byte_scale: 1.0,
            v_byte_scale: 1.0,
            data,
        })
    }

    /// Binary V1: V0 plus flags and byte scales ahead of the pixel data.
    pub fn read_v1(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let texture_type = TextureType::from_code(reader.read_u32()?)?;
        let width = reader.read_u32()?;
        let height = reader.read_u32()?;
        let flags = reader.read_u32()?;
        let h_byte_scale = reader.read_f32()?;
        let v_byte_scale = reader.read_f32()?;
        let data = read_pixels(reader)?;

        Ok(Self {
            texture_type,
            width,
            height,
            flags,
            h_byte_scale,
            v_byte_scale,
            data,
        })
    }

    /// Size of the pixel data in bytes.
    pub fn image_size(&self) -> usize {
        self.data.len()
    }
}

fn read_pixels(reader: &mut BinaryReader<'_>) -> Result<Vec<u8>> {
    let size = reader.read_u32()? as usize;
    Ok(reader.read_bytes(size)?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use otrkit_common::{BinaryWriter, Endianness, Error};

    #[test]
    fn test_read_v0() {
        let mut writer = BinaryWriter::new(Endianness::Little);
        writer
            .write_u32(2)
            .write_u32(2)
            .write_u32(1)
            .write_u32(4)
            .write_bytes(&[1, 2, 3, 4]);
        let bytes = writer.into_inner();

        let texture = Texture::read_v0(&mut BinaryReader::new(&bytes)).unwrap();
        assert_eq!(texture.texture_type, TextureType::Rgba16bpp);
        assert_eq!((texture.width, texture.height), (2, 1));
        assert_eq!(texture.data, vec![1, 2, 3, 4]);
        assert_eq!(texture.texture_type.bits_per_texel(), 16);
    }

    #[test]
    fn test_read_v1_swapped_floats() {
        let order = Endianness::native().flipped();
        let mut writer = BinaryWriter::new(order);
        writer
            .write_u32(4)
            .write_u32(8)
            .write_u32(8)
            .write_u32(TEX_FLAG_LOAD_AS_RAW)
            .write_f32(2.0)
            .write_f32(0.5)
            .write_u32(0);
        let bytes = writer.into_inner();

        let texture =
            Texture::read_v1(&mut BinaryReader::with_endianness(&bytes, order)).unwrap();
        assert_eq!(texture.flags, TEX_FLAG_LOAD_AS_RAW);
        assert_eq!(texture.h_byte_scale, 2.0);
        assert_eq!(texture.v_byte_scale, 0.5);
        assert!(texture.data.is_empty());
    }

    #[test]
    fn test_nan_scale_after_swap() {
        let order = Endianness::native().flipped();
        let mut writer = BinaryWriter::new(order);
        writer.write_u32(1).write_u32(1).write_u32(1).write_u32(0);
        writer.write_bytes(&[0xFF; 4]);
        let bytes = writer.into_inner();

        let err = Texture::read_v1(&mut BinaryReader::with_endianness(&bytes, order)).unwrap_err();
        assert!(matches!(err, DecodeError::Common(Error::NanAfterSwap { .. })));
    }

    #[test]
    fn test_invalid_type() {
        let bytes = [42u8, 0, 0, 0];
        assert!(matches!(
            Texture::read_v0(&mut BinaryReader::new(&bytes)),
            Err(DecodeError::InvalidValue { value: 42, .. })
        ));
    }
}
