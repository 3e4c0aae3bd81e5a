//! Vertex buffers.

use otrkit_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::xml::XmlNode;
use crate::{DecodeError, Result};

/// One vertex in the layout the renderer consumes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
#[repr(C)]
pub struct Vtx {
    pub position: [i16; 3],
    pub flag: u16,
    pub tex_coord: [i16; 2],
    pub color: [u8; 4],
}

impl Vtx {
    /// Read one vertex record.
    pub fn read(reader: &mut BinaryReader<'_>) -> otrkit_common::Result<Self> {
        Ok(Self {
            position: reader.read_vec3s()?,
            flag: reader.read_u16()?,
            tex_coord: [reader.read_i16()?, reader.read_i16()?],
            color: reader.read_array()?,
        })
    }

    fn from_xml(node: &XmlNode) -> Result<Self> {
        if node.name != "Vtx" {
            return Err(DecodeError::UnknownElement(node.name.clone()));
        }
        Ok(Self {
            position: [node.int("X")?, node.int("Y")?, node.int("Z")?],
            flag: node.int_or("Flag", 0)?,
            tex_coord: [node.int("S")?, node.int("T")?],
            color: [node.int("R")?, node.int("G")?, node.int("B")?, node.int("A")?],
        })
    }
}

/// A vertex buffer resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vertex {
    pub vertices: Vec<Vtx>,
}

impl Vertex {
    /// Binary V0: count followed by vertex records.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            vertices: reader.read_counted(Vtx::read)?,
        })
    }

    /// XML V0: one `<Vtx/>` element per vertex.
    pub fn from_xml_v0(root: &XmlNode) -> Result<Self> {
        Ok(Self {
            vertices: root.children().map(Vtx::from_xml).collect::<Result<_>>()?,
        })
    }

    /// The vertices as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.vertices.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;
    use otrkit_common::{BinaryWriter, Endianness};

    #[test]
    fn test_vtx_layout() {
        assert_eq!(std::mem::size_of::<Vtx>(), 16);
    }

    #[test]
    fn test_read_v0_big_endian() {
        let mut writer = BinaryWriter::new(Endianness::Big);
        writer.write_u32(1);
        writer
            .write_i16(-1)
            .write_i16(2)
            .write_i16(3)
            .write_u16(0)
            .write_i16(64)
            .write_i16(-64)
            .write_bytes(&[255, 128, 0, 255]);
        let bytes = writer.into_inner();

        let vertex = Vertex::read_v0(&mut BinaryReader::with_endianness(&bytes, Endianness::Big)).unwrap();
        assert_eq!(
            vertex.vertices,
            vec![Vtx {
                position: [-1, 2, 3],
                flag: 0,
                tex_coord: [64, -64],
                color: [255, 128, 0, 255],
            }]
        );
        assert_eq!(vertex.as_bytes().len(), 16);
    }

    #[test]
    fn test_from_xml() {
        let doc = XmlDocument::parse_str(
            r#"<Vertex Version="0">
                <Vtx X="1" Y="2" Z="3" S="0" T="0" R="10" G="20" B="30" A="40"/>
                <Vtx X="-4" Y="5" Z="6" S="32" T="-32" R="0" G="0" B="0" A="255" Flag="1"/>
            </Vertex>"#,
        )
        .unwrap();

        let vertex = Vertex::from_xml_v0(doc.root()).unwrap();
        assert_eq!(vertex.vertices.len(), 2);
        assert_eq!(vertex.vertices[1].position, [-4, 5, 6]);
        assert_eq!(vertex.vertices[1].flag, 1);
        assert_eq!(vertex.vertices[0].color, [10, 20, 30, 40]);
    }

    #[test]
    fn test_from_xml_rejects_other_elements() {
        let doc = XmlDocument::parse_str(r#"<Vertex><Tri/></Vertex>"#).unwrap();
        assert!(Vertex::from_xml_v0(doc.root()).is_err());
    }
}
