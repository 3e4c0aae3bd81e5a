//! Writing resources back to the binary envelope format.

use otrkit_common::{BinaryWriter, ResourceInitData};

use crate::gbi;
use crate::resource::ResourceData;
use crate::types::{DisplayList, Texture, Vertex};
use crate::{DecodeError, Result};

/// Encode a resource payload, preceded by the binary header when
/// `init.has_header` is set.
///
/// Display lists, textures, vertices, blobs, matrices, cutscenes and player
/// animations can be encoded. Other types are [`DecodeError::Unencodable`].
pub fn encode(init: &ResourceInitData, data: &ResourceData) -> Result<Vec<u8>> {
    if init.resource_type != data.resource_type() {
        return Err(DecodeError::Unencodable(format!(
            "{} payload as {}",
            data.resource_type(),
            init.resource_type
        )));
    }

    let mut writer = BinaryWriter::new(init.byte_order);
    if init.has_header {
        init.write_header(&mut writer);
    }

    match data {
        ResourceData::DisplayList(list) => write_display_list(&mut writer, list)?,
        ResourceData::Texture(texture) => {
            write_texture(&mut writer, texture, init.resource_version)?
        }
        ResourceData::Vertex(vertex) => write_vertices(&mut writer, vertex),
        ResourceData::Matrix(matrix) => {
            for word in matrix.words {
                writer.write_i32(word);
            }
        }
        ResourceData::Cutscene(cutscene) => {
            writer.write_u32(cutscene.commands.len() as u32);
            for word in &cutscene.commands {
                writer.write_u32(*word);
            }
        }
        ResourceData::PlayerAnimation(animation) => {
            writer.write_u32(animation.limb_rotations.len() as u32);
            for rotation in &animation.limb_rotations {
                writer.write_i16(*rotation);
            }
        }
        ResourceData::Blob(blob) => {
            writer.write_u32(blob.data.len() as u32).write_bytes(&blob.data);
        }
        other => {
            return Err(DecodeError::Unencodable(
                other.resource_type().name().to_string(),
            ))
        }
    }

    Ok(writer.into_inner())
}

fn write_display_list(writer: &mut BinaryWriter, list: &DisplayList) -> Result<()> {
    if !list.strings.is_empty() {
        return Err(DecodeError::Unencodable(
            "display list with path references".to_string(),
        ));
    }

    // The reader stops at the first G_ENDDL, so it must come last and only once.
    let mut ends = list
        .commands()
        .filter(|(_, words)| words[0].opcode() == gbi::G_ENDDL)
        .map(|(index, words)| index + words.len());
    if ends.next() != Some(list.instructions.len()) || ends.next().is_some() {
        return Err(DecodeError::Unencodable(
            "display list not terminated by a single G_ENDDL".to_string(),
        ));
    }

    writer.align_to(8);
    for word in &list.instructions {
        writer.write_u32(word.w0).write_u32(word.w1);
    }
    Ok(())
}

fn write_texture(writer: &mut BinaryWriter, texture: &Texture, version: u32) -> Result<()> {
    writer
        .write_u32(texture.texture_type as u32)
        .write_u32(texture.width)
        .write_u32(texture.height);

    match version {
        0 => {}
        1 => {
            writer
                .write_u32(texture.flags)
                .write_f32(texture.h_byte_scale)
                .write_f32(texture.v_byte_scale);
        }
        other => {
            return Err(DecodeError::Unencodable(format!(
                "texture version {other}"
            )))
        }
    }

    writer
        .write_u32(texture.data.len() as u32)
        .write_bytes(&texture.data);
    Ok(())
}

fn write_vertices(writer: &mut BinaryWriter, vertex: &Vertex) {
    writer.write_u32(vertex.vertices.len() as u32);
    for vtx in &vertex.vertices {
        for value in vtx.position {
            writer.write_i16(value);
        }
        writer
            .write_u16(vtx.flag)
            .write_i16(vtx.tex_coord[0])
            .write_i16(vtx.tex_coord[1])
            .write_bytes(&vtx.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use otrkit_archive::File;
    use otrkit_common::{Endianness, ResourceFormat, ResourceType};

    use crate::gbi::Gfx;
    use crate::types::{Blob, Light, TextureType, Vtx};
    use crate::FactoryRegistry;

    fn init(resource_type: ResourceType, version: u32, order: Endianness) -> ResourceInitData {
        ResourceInitData {
            path: "test/encoded".into(),
            id: 0x0123_4567_89AB_CDEF,
            resource_type,
            resource_version: version,
            format: ResourceFormat::Binary,
            byte_order: order,
            is_custom: false,
            has_header: true,
        }
    }

    fn decode(bytes: Vec<u8>) -> ResourceData {
        let file = Arc::new(File::detached("test/encoded", bytes));
        FactoryRegistry::with_defaults()
            .decode(&file)
            .unwrap()
            .data()
            .clone()
    }

    #[test]
    fn test_display_list_identity_with_wide_opcodes() {
        let mut instructions = vec![gbi::dp_pipe_sync(), gbi::sp_texture(0xFFFF, 0xFFFF, 0, 0, 1)];
        instructions.extend(gbi::dp_set_texture_image_hash(
            gbi::G_IM_FMT_RGBA,
            gbi::G_IM_SIZ_16B,
            32,
            0xDF00_0000_DEAD_BEEF,
        ));
        instructions.extend(gbi::sp_vertex_hash(0x1111_2222_3333_4444, 4, 0, 0));
        instructions.push(gbi::sp_2_triangles([0, 1, 2, 0], [0, 2, 3, 0]));
        instructions.extend(gbi::sp_matrix_hash(
            0x5555,
            gbi::G_MTX_PUSH | gbi::G_MTX_LOAD | gbi::G_MTX_MODELVIEW,
        ));
        instructions.extend(gbi::sp_marker(0xFFFF_FFFF_FFFF_FFFF));
        instructions.extend(gbi::sp_branch_z_hash(0xABCD, 3, 0x100));
        instructions.extend(gbi::sp_display_list_hash(0x9999, true));
        instructions.push(gbi::sp_end_display_list());
        let list = DisplayList::new(instructions);

        for order in [Endianness::Big, Endianness::Little] {
            let data = ResourceData::DisplayList(list.clone());
            let bytes = encode(&init(ResourceType::DisplayList, 0, order), &data).unwrap();
            assert_eq!(decode(bytes), data);
        }
    }

    #[test]
    fn test_display_list_rejections() {
        let unterminated = ResourceData::DisplayList(DisplayList::new(vec![gbi::dp_pipe_sync()]));
        let init = init(ResourceType::DisplayList, 0, Endianness::Little);
        assert!(matches!(
            encode(&init, &unterminated),
            Err(DecodeError::Unencodable(_))
        ));

        let mut with_paths = DisplayList::new(vec![gbi::sp_end_display_list()]);
        with_paths.push_string("objects/x");
        assert!(encode(&init, &ResourceData::DisplayList(with_paths)).is_err());
    }

    #[test]
    fn test_texture_versions() {
        let texture = Texture {
            texture_type: TextureType::Rgba16bpp,
            width: 2,
            height: 1,
            flags: 1,
            h_byte_scale: 0.5,
            v_byte_scale: 2.0,
            data: vec![1, 2, 3, 4],
        };
        let data = ResourceData::Texture(texture.clone());

        let v1 = encode(&init(ResourceType::Texture, 1, Endianness::Big), &data).unwrap();
        assert_eq!(decode(v1), data);

        let v0 = encode(&init(ResourceType::Texture, 0, Endianness::Big), &data).unwrap();
        let decoded = decode(v0);
        let decoded = decoded.as_texture().unwrap();
        assert_eq!(decoded.data, texture.data);
        assert_eq!(decoded.flags, 0);
    }

    #[test]
    fn test_vertex_and_blob() {
        let vertex = ResourceData::Vertex(Vertex {
            vertices: vec![Vtx {
                position: [-1, 2, -3],
                flag: 0,
                tex_coord: [64, -64],
                color: [1, 2, 3, 4],
            }],
        });
        let bytes = encode(&init(ResourceType::Vertex, 0, Endianness::Big), &vertex).unwrap();
        assert_eq!(decode(bytes), vertex);

        let blob = ResourceData::Blob(Blob { data: vec![9; 5] });
        let bytes = encode(&init(ResourceType::Blob, 0, Endianness::Little), &blob).unwrap();
        assert_eq!(decode(bytes), blob);
    }

    #[test]
    fn test_headerless_and_unencodable() {
        let blob = ResourceData::Blob(Blob { data: vec![7] });
        let mut headerless = init(ResourceType::Blob, 0, Endianness::Little);
        headerless.has_header = false;
        assert_eq!(encode(&headerless, &blob).unwrap(), vec![1, 0, 0, 0, 7]);

        let light = ResourceData::Light(Light::default());
        assert!(matches!(
            encode(&init(ResourceType::Light, 0, Endianness::Little), &light),
            Err(DecodeError::Unencodable(_))
        ));

        assert!(encode(&init(ResourceType::Texture, 0, Endianness::Little), &blob).is_err());
    }

    #[test]
    fn test_swapped_word_keeps_value() {
        let list = DisplayList::new(vec![Gfx::new(0xE700_0000, 0x0102_0304), gbi::sp_end_display_list()]);
        let order = Endianness::native().flipped();
        let data = ResourceData::DisplayList(list);
        let bytes = encode(&init(ResourceType::DisplayList, 0, order), &data).unwrap();
        let decoded = decode(bytes);
        assert_eq!(decoded.as_display_list().unwrap().instructions[0].w1, 0x0102_0304);
    }
}
