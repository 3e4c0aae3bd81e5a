//! Collision meshes.

use otrkit_common::BinaryReader;

use crate::Result;

/// A collision triangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionPoly {
    pub surface_type: u16,
    pub vertices: [u16; 3],
    pub normal: [i16; 3],
    pub distance: i16,
}

/// Surface properties referenced by polygons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceType {
    pub data: [u32; 2],
}

/// An axis-aligned water volume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaterBox {
    pub x_min: i16,
    pub y_surface: i16,
    pub z_min: i16,
    pub x_length: i16,
    pub z_length: i16,
    pub properties: u32,
}

/// A scene's collision data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionHeader {
    pub min_bounds: [i16; 3],
    pub max_bounds: [i16; 3],
    pub vertices: Vec<[i16; 3]>,
    pub polygons: Vec<CollisionPoly>,
    pub surface_types: Vec<SurfaceType>,
    pub water_boxes: Vec<WaterBox>,
}

impl CollisionHeader {
    /// Binary V0.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let min_bounds = reader.read_vec3s()?;
        let max_bounds = reader.read_vec3s()?;
        let vertices = reader.read_counted(|r| r.read_vec3s())?;
        let polygons = reader.read_counted(|r| {
            Ok(CollisionPoly {
                surface_type: r.read_u16()?,
                vertices: [r.read_u16()?, r.read_u16()?, r.read_u16()?],
                normal: r.read_vec3s()?,
                distance: r.read_i16()?,
            })
        })?;
        let surface_types = reader.read_counted(|r| {
            Ok(SurfaceType {
                data: [r.read_u32()?, r.read_u32()?],
            })
        })?;
        let water_boxes = reader.read_counted(|r| {
            Ok(WaterBox {
                x_min: r.read_i16()?,
                y_surface: r.read_i16()?,
                z_min: r.read_i16()?,
                x_length: r.read_i16()?,
                z_length: r.read_i16()?,
                properties: r.read_u32()?,
            })
        })?;

        Ok(Self {
            min_bounds,
            max_bounds,
            vertices,
            polygons,
            surface_types,
            water_boxes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otrkit_common::{BinaryWriter, Endianness};

    #[test]
    fn test_read_v0() {
        let mut writer = BinaryWriter::new(Endianness::Big);
        for v in [-100i16, -10, -100, 100, 50, 100] {
            writer.write_i16(v);
        }
        writer.write_u32(3);
        for v in [0i16, 0, 0, 100, 0, 0, 0, 0, 100] {
            writer.write_i16(v);
        }
        writer.write_u32(1);
        for v in [0u16, 0, 1, 2] {
            writer.write_u16(v);
        }
        writer.write_i16(0).write_i16(0x7FFF).write_i16(0).write_i16(0);
        writer.write_u32(1).write_u32(0x0020_0000).write_u32(0x0000_07C0);
        writer.write_u32(0);
        let bytes = writer.into_inner();

        let collision =
            CollisionHeader::read_v0(&mut BinaryReader::with_endianness(&bytes, Endianness::Big))
                .unwrap();
        assert_eq!(collision.min_bounds, [-100, -10, -100]);
        assert_eq!(collision.vertices.len(), 3);
        assert_eq!(collision.polygons[0].vertices, [0, 1, 2]);
        assert_eq!(collision.polygons[0].normal, [0, 0x7FFF, 0]);
        assert_eq!(collision.surface_types[0].data, [0x0020_0000, 0x07C0]);
        assert!(collision.water_boxes.is_empty());
    }
}
