//! Materials: a shader plus named parameters.

use otrkit_common::BinaryReader;

use crate::{DecodeError, Result};

/// Value of one material parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialParam {
    Float(f32),
    Vec4([f32; 4]),
    Texture(String),
}

/// A material resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub shader: String,
    pub params: Vec<(String, MaterialParam)>,
}

impl Material {
    /// Binary V0.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let shader = reader.read_string()?.to_owned();
        let count = reader.read_u32()?;

        let mut params = Vec::with_capacity((count as usize).min(reader.remaining()));
        for _ in 0..count {
            let name = reader.read_string()?.to_owned();
            let value = match reader.read_u8()? {
                0 => MaterialParam::Float(reader.read_f32()?),
                1 => MaterialParam::Vec4([
                    reader.read_f32()?,
                    reader.read_f32()?,
                    reader.read_f32()?,
                    reader.read_f32()?,
                ]),
                2 => MaterialParam::Texture(reader.read_string()?.to_owned()),
                kind => {
                    return Err(DecodeError::InvalidValue {
                        field: "material parameter kind",
                        value: kind.into(),
                    })
                }
            };
            params.push((name, value));
        }

        Ok(Self { shader, params })
    }

    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&MaterialParam> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otrkit_common::{BinaryWriter, Endianness};

    #[test]
    fn test_read_v0() {
        let mut writer = BinaryWriter::new(Endianness::Little);
        writer.write_string("shaders/water").write_u32(3);
        writer.write_string("speed").write_u8(0).write_f32(0.5);
        writer
            .write_string("tint")
            .write_u8(1)
            .write_f32(1.0)
            .write_f32(0.0)
            .write_f32(0.0)
            .write_f32(1.0);
        writer.write_string("albedo").write_u8(2).write_string("textures/water");
        let bytes = writer.into_inner();

        let material = Material::read_v0(&mut BinaryReader::new(&bytes)).unwrap();
        assert_eq!(material.shader, "shaders/water");
        assert_eq!(material.param("speed"), Some(&MaterialParam::Float(0.5)));
        assert_eq!(
            material.param("albedo"),
            Some(&MaterialParam::Texture("textures/water".into()))
        );
        assert!(material.param("missing").is_none());
    }

    #[test]
    fn test_bad_kind() {
        let mut writer = BinaryWriter::new(Endianness::Little);
        writer.write_string("s").write_u32(1).write_string("p").write_u8(9);
        let bytes = writer.into_inner();
        assert!(Material::read_v0(&mut BinaryReader::new(&bytes)).is_err());
    }
}
