//! Skeletons and limbs.

use otrkit_common::BinaryReader;

use crate::{DecodeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkeletonType {
    Normal,
    Flex,
    Curve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimbType {
    Standard,
    Lod,
    Skin,
    Curve,
    Legacy,
}

impl LimbType {
    fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0 => Self::Standard,
            1 => Self::Lod,
            2 => Self::Skin,
            3 => Self::Curve,
            4 => Self::Legacy,
            value => {
                return Err(DecodeError::InvalidValue {
                    field: "limb type",
                    value: value.into(),
                })
            }
        })
    }
}

/// A skeleton: counts plus the paths of its limbs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skeleton {
    pub skeleton_type: SkeletonType,
    pub limb_type: LimbType,
    pub limb_count: u32,
    pub dlist_count: u32,
    pub limb_table_type: LimbType,
    pub limb_table: Vec<String>,
}

impl Skeleton {
    /// Binary V0.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let skeleton_type = match reader.read_u8()? {
            0 => SkeletonType::Normal,
            1 => SkeletonType::Flex,
            2 => SkeletonType::Curve,
            value => {
                return Err(DecodeError::InvalidValue {
                    field: "skeleton type",
                    value: value.into(),
                })
            }
        };
        let limb_type = LimbType::from_code(reader.read_u8()?)?;
        let limb_count = reader.read_u32()?;
        let dlist_count = reader.read_u32()?;
        let limb_table_type = LimbType::from_code(reader.read_u8()?)?;
        let limb_table = reader.read_counted(|r| r.read_string().map(str::to_owned))?;

        Ok(Self {
            skeleton_type,
            limb_type,
            limb_count,
            dlist_count,
            limb_table_type,
            limb_table,
        })
    }
}

/// One limb of a skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkeletonLimb {
    pub limb_type: LimbType,
    pub translation: [i16; 3],
    pub child: u8,
    pub sibling: u8,
    pub dlist: String,
    pub far_dlist: String,
}

impl SkeletonLimb {
    /// Binary V0.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            limb_type: LimbType::from_code(reader.read_u8()?)?,
            translation: reader.read_vec3s()?,
            child: reader.read_u8()?,
            sibling: reader.read_u8()?,
            dlist: reader.read_string()?.to_owned(),
            far_dlist: reader.read_string()?.to_owned(),
        })
    }

    /// Whether the limb has no child.
    pub fn is_leaf(&self) -> bool {
        self.child == 0xFF
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otrkit_common::{BinaryWriter, Endianness};

    #[test]
    fn test_skeleton_v0() {
        let mut writer = BinaryWriter::new(Endianness::Big);
        writer
            .write_u8(1)
            .write_u8(0)
            .write_u32(2)
            .write_u32(2)
            .write_u8(0)
            .write_u32(2)
            .write_string("objects/link/limb0")
            .write_string("objects/link/limb1");
        let bytes = writer.into_inner();

        let skeleton =
            Skeleton::read_v0(&mut BinaryReader::with_endianness(&bytes, Endianness::Big)).unwrap();
        assert_eq!(skeleton.skeleton_type, SkeletonType::Flex);
        assert_eq!(skeleton.limb_table.len(), 2);
        assert_eq!(skeleton.limb_table[1], "objects/link/limb1");
    }

    #[test]
    fn test_limb_v0() {
        let mut writer = BinaryWriter::new(Endianness::Little);
        writer
            .write_u8(0)
            .write_i16(10)
            .write_i16(-20)
            .write_i16(30)
            .write_u8(0xFF)
            .write_u8(1)
            .write_string("objects/link/gDL")
            .write_string("");
        let bytes = writer.into_inner();

        let limb = SkeletonLimb::read_v0(&mut BinaryReader::new(&bytes)).unwrap();
        assert_eq!(limb.translation, [10, -20, 30]);
        assert!(limb.is_leaf());
        assert_eq!(limb.dlist, "objects/link/gDL");
        assert!(limb.far_dlist.is_empty());
    }

    #[test]
    fn test_bad_limb_type() {
        let bytes = [9u8];
        assert!(SkeletonLimb::read_v0(&mut BinaryReader::new(&bytes)).is_err());
    }
}
