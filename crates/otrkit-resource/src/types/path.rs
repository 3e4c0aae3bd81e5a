//! Actor paths.

use otrkit_common::BinaryReader;

use crate::Result;

/// A set of point paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    pub paths: Vec<Vec<[i16; 3]>>,
}

impl Path {
    /// Binary V0: path count, then each path's point count and points.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            paths: reader.read_counted(|r| r.read_counted(|r| r.read_vec3s()))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otrkit_common::{BinaryWriter, Endianness};

    #[test]
    fn test_read_v0() {
        let mut writer = BinaryWriter::new(Endianness::Little);
        writer.write_u32(2);
        writer.write_u32(1).write_i16(1).write_i16(2).write_i16(3);
        writer.write_u32(0);
        let bytes = writer.into_inner();

        let path = Path::read_v0(&mut BinaryReader::new(&bytes)).unwrap();
        assert_eq!(path.paths, vec![vec![[1, 2, 3]], vec![]]);
    }
}
