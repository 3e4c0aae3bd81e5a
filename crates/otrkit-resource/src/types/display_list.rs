//! Display lists.

use otrkit_common::BinaryReader;
use zerocopy::IntoBytes;

use crate::gbi::{self, Gfx, TextureBlock, TileDescriptor};
use crate::xml::{parse_int, XmlNode};
use crate::{DecodeError, Result};

/// Size of one vertex record, used to turn a vertex offset into an address.
const VTX_SIZE: u32 = 16;

/// An ordered list of graphics instructions.
///
/// Instructions that refer to other assets by path store an index into
/// `strings` in `w1`; the list owns those strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayList {
    pub instructions: Vec<Gfx>,
    pub strings: Vec<String>,
}

impl DisplayList {
    /// Create a list from raw instructions.
    pub fn new(instructions: Vec<Gfx>) -> Self {
        Self {
            instructions,
            strings: Vec::new(),
        }
    }

    /// Store a path in the string table and return its index.
    pub fn push_string(&mut self, value: impl Into<String>) -> u32 {
        self.strings.push(value.into());
        (self.strings.len() - 1) as u32
    }

    /// Look up a string-table entry.
    pub fn string(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }

    /// The instructions as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.instructions.as_bytes()
    }

    /// Iterate over commands, keeping extended instructions together with
    /// the instruction that carries their payload.
    pub fn commands(&self) -> Commands<'_> {
        Commands {
            instructions: &self.instructions,
            index: 0,
        }
    }

    /// Binary V0: 8-byte alignment, then instructions up to and including
    /// `G_ENDDL`.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        reader.align_to(8)?;

        let mut instructions = Vec::new();
        loop {
            let word = read_word(reader)?;
            instructions.push(word);

            let opcode = word.opcode();
            if gbi::is_wide(opcode) {
                instructions.push(read_word(reader)?);
            }
            if opcode == gbi::G_ENDDL {
                break;
            }
        }

        Ok(Self::new(instructions))
    }

    /// XML V0: one element per instruction or instruction macro.
    pub fn from_xml_v0(root: &XmlNode) -> Result<Self> {
        let mut builder = XmlListBuilder::default();
        for child in root.children() {
            if builder.emit(child)? {
                break;
            }
        }
        Ok(builder.finish())
    }
}

fn read_word(reader: &mut BinaryReader<'_>) -> Result<Gfx> {
    Ok(Gfx::new(reader.read_u32()?, reader.read_u32()?))
}

/// Iterator over the commands of a [`DisplayList`].
#[derive(Debug, Clone)]
pub struct Commands<'a> {
    instructions: &'a [Gfx],
    index: usize,
}

impl<'a> Iterator for Commands<'a> {
    /// Index of the first instruction and the instructions of the command.
    type Item = (usize, &'a [Gfx]);

    fn next(&mut self) -> Option<Self::Item> {
        let first = *self.instructions.get(self.index)?;
        let opcode = first.opcode();
        let width = if gbi::is_wide(opcode) || opcode == gbi::G_VTX_OTR_FILEPATH {
            2
        } else {
            1
        };

        let start = self.index;
        let end = (start + width).min(self.instructions.len());
        self.index = end;
        Some((start, &self.instructions[start..end]))
    }
}

/// Reference to an asset in an XML path attribute.
enum AssetRef {
    Segment(u32),
    Path(u32),
}

#[derive(Default)]
struct XmlListBuilder {
    list: DisplayList,
}

impl XmlListBuilder {
    fn push(&mut self, word: Gfx) {
        self.list.instructions.push(word);
    }

    fn asset(&mut self, node: &XmlNode, attribute: &str) -> Result<AssetRef> {
        let value = node.required(attribute)?;
        if let Some(hex) = value.strip_prefix(">0x") {
            let address =
                u32::from_str_radix(hex, 16).map_err(|_| node.invalid(attribute, value))?;
            return Ok(AssetRef::Segment(address));
        }
        Ok(AssetRef::Path(self.list.push_string(value)))
    }

    /// Append a path-referencing instruction: the standard encoding for a
    /// segment address, or the same bits under `path_opcode` with a string
    /// index in `w1`.
    fn push_asset(&mut self, asset: AssetRef, path_opcode: u8, encode: impl Fn(u32) -> Gfx) {
        match asset {
            AssetRef::Segment(address) => self.push(encode(address)),
            AssetRef::Path(index) => self.push(with_opcode(encode(0), path_opcode, index)),
        }
    }

    /// Returns `true` once the list has ended.
    fn emit(&mut self, node: &XmlNode) -> Result<bool> {
        match node.name.as_str() {
            "PipeSync" => self.push(gbi::dp_pipe_sync()),
            "TileSync" => self.push(gbi::dp_tile_sync()),
            "LoadSync" => self.push(gbi::dp_load_sync()),
            "FullSync" => self.push(gbi::dp_full_sync()),
            "NoOp" => self.push(gbi::sp_no_op()),
            "Texture" => self.push(gbi::sp_texture(
                node.int("S")?,
                node.int("T")?,
                node.int_or("Level", 0)?,
                constant_or(node, "Tile", gbi::G_TX_RENDERTILE)?,
                constant_or(node, "On", 1)?,
            )),
            "SetPrimColor" => self.push(gbi::dp_set_prim_color(
                node.int_or("M", 0)?,
                node.int_or("L", 0)?,
                node.int("R")?,
                node.int("G")?,
                node.int("B")?,
                node.int("A")?,
            )),
            "SetEnvColor" => {
                let [r, g, b, a] = color(node)?;
                self.push(gbi::dp_set_env_color(r, g, b, a));
            }
            "SetFogColor" => {
                let [r, g, b, a] = color(node)?;
                self.push(gbi::dp_set_fog_color(r, g, b, a));
            }
            "SetBlendColor" => {
                let [r, g, b, a] = color(node)?;
                self.push(gbi::dp_set_blend_color(r, g, b, a));
            }
            "SetFillColor" => self.push(gbi::dp_set_fill_color(node.int("Color")?)),
            "SetPrimDepth" => self.push(gbi::dp_set_prim_depth(node.int("Z")?, node.int("DZ")?)),
            "SetCombineLERP" => self.push(gbi::dp_set_combine(combine_mode(node)?)),
            "SetGeometryMode" => self.push(gbi::sp_geometry_mode(0, geometry_flags(node)?)),
            "ClearGeometryMode" => self.push(gbi::sp_geometry_mode(geometry_flags(node)?, 0)),
            "SetCycleType" => self.push(gbi::dp_set_cycle_type(constant(node, "Mode")?)),
            "SetTextureFilter" => self.push(gbi::dp_set_texture_filter(constant(node, "Mode")?)),
            "SetTextureLUT" => self.push(gbi::dp_set_texture_lut(constant(node, "Mode")?)),
            "SetTexturePersp" => self.push(gbi::dp_set_texture_persp(constant(node, "Mode")?)),
            "SetTextureLOD" => self.push(gbi::dp_set_texture_lod(constant(node, "Mode")?)),
            "SetColorDither" => self.push(gbi::dp_set_color_dither(constant(node, "Mode")?)),
            "SetAlphaDither" => self.push(gbi::dp_set_alpha_dither(constant(node, "Mode")?)),
            "SetAlphaCompare" => self.push(gbi::dp_set_alpha_compare(constant(node, "Mode")?)),
            "SetDepthSource" => self.push(gbi::dp_set_depth_source(constant(node, "Mode")?)),
            "SetRenderMode" => self.push(gbi::dp_set_render_mode(
                constant(node, "Mode1")?,
                constant_or(node, "Mode2", 0)?,
            )),
            "SetTextureImage" => {
                let format = constant(node, "Format")?;
                let size = constant(node, "Size")?;
                let width = dimension(node, "Width")?;
                let asset = self.asset(node, "Path")?;
                self.push_asset(asset, gbi::G_SETTIMG_OTR_FILEPATH, |address| {
                    gbi::dp_set_texture_image(format, size, width, address)
                });
            }
            "SetTile" => self.push(gbi::dp_set_tile(TileDescriptor {
                format: constant(node, "Format")?,
                size: constant(node, "Size")?,
                line: node.int_or("Line", 0)?,
                tmem: node.int_or("TMem", 0)?,
                tile: constant(node, "Tile")?,
                palette: node.int_or("Palette", 0)?,
                cmt: constant_or(node, "Cmt", 0)?,
                maskt: constant_or(node, "MaskT", 0)?,
                shiftt: constant_or(node, "ShiftT", 0)?,
                cms: constant_or(node, "Cms", 0)?,
                masks: constant_or(node, "MaskS", 0)?,
                shifts: constant_or(node, "ShiftS", 0)?,
            })),
            "LoadBlock" => self.push(gbi::dp_load_block(
                constant(node, "Tile")?,
                node.int_or("Uls", 0)?,
                node.int_or("Ult", 0)?,
                node.int("Lrs")?,
                node.int("Dxt")?,
            )),
            "LoadTile" => {
                let [tile, uls, ult, lrs, lrt] = tile_rect(node)?;
                self.push(gbi::dp_load_tile(tile, uls, ult, lrs, lrt));
            }
            "SetTileSize" => {
                let [tile, uls, ult, lrs, lrt] = tile_rect(node)?;
                self.push(gbi::dp_set_tile_size(tile, uls, ult, lrs, lrt));
            }
            "LoadTLUT" => self.push(gbi::dp_load_tlut_cmd(
                constant(node, "Tile")?,
                node.int("Count")?,
            )),
            "LoadTextureBlock" => {
                let block = TextureBlock {
                    format: constant(node, "Format")?,
                    size: constant(node, "Size")?,
                    width: dimension(node, "Width")?,
                    height: dimension(node, "Height")?,
                    palette: node.int_or("Palette", 0)?,
                    cms: constant_or(node, "Cms", 0)?,
                    cmt: constant_or(node, "Cmt", 0)?,
                    masks: constant_or(node, "MaskS", 0)?,
                    maskt: constant_or(node, "MaskT", 0)?,
                    shifts: constant_or(node, "ShiftS", 0)?,
                    shiftt: constant_or(node, "ShiftT", 0)?,
                };
                let asset = self.asset(node, "Path")?;
                let mut words = gbi::dp_load_texture_block(0, block);
                match asset {
                    AssetRef::Segment(address) => words[0].w1 = address,
                    AssetRef::Path(index) => {
                        words[0] = with_opcode(words[0], gbi::G_SETTIMG_OTR_FILEPATH, index)
                    }
                }
                self.list.instructions.extend_from_slice(&words);
            }
            "LoadVertices" => {
                let count: u32 = node.int("Count")?;
                let v0: u32 = node.int_or("VertexBufferIndex", 0)?;
                let offset: u32 = node.int_or("VertexOffset", 0)?;
                match self.asset(node, "Path")? {
                    AssetRef::Segment(address) => self.push(gbi::sp_vertex(
                        address.wrapping_add(offset.wrapping_mul(VTX_SIZE)),
                        count,
                        v0,
                    )),
                    AssetRef::Path(index) => {
                        let word = gbi::sp_vertex(0, count, v0);
                        self.push(with_opcode(word, gbi::G_VTX_OTR_FILEPATH, index));
                        self.push(Gfx::new(offset, 0));
                    }
                }
            }
            "Triangle1" => self.push(gbi::sp_1_triangle(
                node.int("V00")?,
                node.int("V01")?,
                node.int("V02")?,
                node.int_or("Flag0", 0)?,
            )),
            "Triangles2" => self.push(gbi::sp_2_triangles(
                [
                    node.int("V00")?,
                    node.int("V01")?,
                    node.int("V02")?,
                    node.int_or("Flag0", 0)?,
                ],
                [
                    node.int("V10")?,
                    node.int("V11")?,
                    node.int("V12")?,
                    node.int_or("Flag1", 0)?,
                ],
            )),
            "Matrix" => {
                let params = constant_or(node, "Param", gbi::G_MTX_NOPUSH)?;
                let asset = self.asset(node, "Path")?;
                self.push_asset(asset, gbi::G_MTX_OTR2, |address| {
                    gbi::sp_matrix(address, params)
                });
            }
            "PopMatrix" => self.push(gbi::sp_pop_matrix(node.int_or("Count", 1)?)),
            "CallDisplayList" | "BranchList" => {
                let branch = node.name == "BranchList";
                let asset = self.asset(node, "Path")?;
                self.push_asset(asset, gbi::G_DL_OTR_FILEPATH, |address| {
                    gbi::sp_display_list(address, branch)
                });
                // A branch never returns.
                if branch {
                    return Ok(true);
                }
            }
            "EndDisplayList" => {
                self.push(gbi::sp_end_display_list());
                return Ok(true);
            }
            other => return Err(DecodeError::UnknownElement(other.to_string())),
        }
        Ok(false)
    }

    fn finish(mut self) -> DisplayList {
        let ended = self
            .list
            .instructions
            .last()
            .is_some_and(|word| word.opcode() == gbi::G_ENDDL);
        if !ended {
            self.push(gbi::sp_end_display_list());
        }
        self.list
    }
}

fn with_opcode(word: Gfx, opcode: u8, w1: u32) -> Gfx {
    Gfx::new((word.w0 & 0x00FF_FFFF) | (u32::from(opcode) << 24), w1)
}

/// Parse an attribute holding numbers or named constants joined by `|`.
fn constant(node: &XmlNode, name: &str) -> Result<u32> {
    let value = node.required(name)?;
    value.split('|').try_fold(0u32, |acc, part| {
        let part = part.trim();
        let parsed = parse_int(part)
            .and_then(|v| u32::try_from(v).ok())
            .or_else(|| gbi::named_constant(part))
            .ok_or_else(|| node.invalid(name, value))?;
        Ok(acc | parsed)
    })
}

fn constant_or(node: &XmlNode, name: &str, default: u32) -> Result<u32> {
    match node.attr(name) {
        Some(_) => constant(node, name),
        None => Ok(default),
    }
}

fn dimension(node: &XmlNode, name: &str) -> Result<u32> {
    let value: u16 = node.int(name)?;
    if value == 0 {
        return Err(node.invalid(name, "0"));
    }
    Ok(u32::from(value))
}

fn color(node: &XmlNode) -> Result<[u32; 4]> {
    Ok([node.int("R")?, node.int("G")?, node.int("B")?, node.int("A")?])
}

fn tile_rect(node: &XmlNode) -> Result<[u32; 5]> {
    Ok([
        constant(node, "Tile")?,
        node.int_or("Uls", 0)?,
        node.int_or("Ult", 0)?,
        node.int("Lrs")?,
        node.int("Lrt")?,
    ])
}

fn geometry_flags(node: &XmlNode) -> Result<u32> {
    let mut flags = 0;
    for (name, bit) in gbi::GEOMETRY_FLAGS {
        if node.flag(name)? {
            flags |= bit;
        }
    }
    Ok(flags)
}

fn combine_mode(node: &XmlNode) -> Result<gbi::CombineMode> {
    let input = |name: &str, lookup: fn(&str) -> Option<u32>| -> Result<u32> {
        let value = node.required(name)?;
        lookup(value)
            .or_else(|| parse_int(value).and_then(|v| u32::try_from(v).ok()))
            .ok_or_else(|| node.invalid(name, value))
    };
    let color = |prefix: &str| -> Result<[u32; 4]> {
        Ok([
            input(&format!("A{prefix}"), gbi::color_input)?,
            input(&format!("B{prefix}"), gbi::color_input)?,
            input(&format!("C{prefix}"), gbi::color_input)?,
            input(&format!("D{prefix}"), gbi::color_input)?,
        ])
    };
    let alpha = |prefix: &str| -> Result<[u32; 4]> {
        Ok([
            input(&format!("Aa{prefix}"), gbi::alpha_input)?,
            input(&format!("Ab{prefix}"), gbi::alpha_input)?,
            input(&format!("Ac{prefix}"), gbi::alpha_input)?,
            input(&format!("Ad{prefix}"), gbi::alpha_input)?,
        ])
    };

    Ok(gbi::CombineMode {
        color0: color("0")?,
        alpha0: alpha("0")?,
        color1: color("1")?,
        alpha1: alpha("1")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;
    use otrkit_common::{BinaryWriter, Endianness};

    fn from_xml(body: &str) -> Result<DisplayList> {
        let xml = format!("<DisplayList Version=\"0\">{body}</DisplayList>");
        let doc = XmlDocument::parse_str(&xml)?;
        DisplayList::from_xml_v0(doc.root())
    }

    #[test]
    fn test_read_v0_with_wide_opcodes() {
        let words = [
            gbi::dp_pipe_sync(),
            gbi::sp_display_list_hash(0xAABB_CCDD_0011_2233, false)[0],
            gbi::sp_display_list_hash(0xAABB_CCDD_0011_2233, false)[1],
            // Second word of a wide opcode may look like G_ENDDL.
            gbi::sp_marker(0xDF00_0000_0000_0000)[0],
            gbi::sp_marker(0xDF00_0000_0000_0000)[1],
            gbi::sp_end_display_list(),
        ];

        for order in [Endianness::Big, Endianness::Little] {
            let mut writer = BinaryWriter::new(order);
            for word in &words {
                writer.write_u32(word.w0).write_u32(word.w1);
            }
            // Trailing bytes after the end are ignored.
            writer.write_u32(0xFFFF_FFFF);

            let bytes = writer.into_inner();
            let mut reader = BinaryReader::with_endianness(&bytes, order);
            let list = DisplayList::read_v0(&mut reader).unwrap();
            assert_eq!(list.instructions, words);
        }
    }

    #[test]
    fn test_read_v0_requires_end() {
        let mut writer = BinaryWriter::new(Endianness::Little);
        writer.write_u32(0xE700_0000).write_u32(0);
        let bytes = writer.into_inner();
        let mut reader = BinaryReader::new(&bytes);
        assert!(DisplayList::read_v0(&mut reader).is_err());
    }

    #[test]
    fn test_xml_segment_and_path_refs() {
        let list = from_xml(
            r#"<PipeSync/>
               <SetTextureImage Path="&gt;0x06001000" Format="G_IM_FMT_RGBA" Size="G_IM_SIZ_16b" Width="32"/>
               <SetTextureImage Path="textures/gTex" Format="G_IM_FMT_CI" Size="G_IM_SIZ_8b" Width="16"/>
               <CallDisplayList Path="objects/gDL"/>
               <EndDisplayList/>"#,
        )
        .unwrap();

        assert_eq!(list.strings, vec!["textures/gTex", "objects/gDL"]);
        assert_eq!(list.instructions[0], gbi::dp_pipe_sync());
        assert_eq!(
            list.instructions[1],
            gbi::dp_set_texture_image(gbi::G_IM_FMT_RGBA, gbi::G_IM_SIZ_16B, 32, 0x0600_1000)
        );
        assert_eq!(list.instructions[2].opcode(), gbi::G_SETTIMG_OTR_FILEPATH);
        assert_eq!(list.string(list.instructions[2].w1), Some("textures/gTex"));
        assert_eq!(list.instructions[3].opcode(), gbi::G_DL_OTR_FILEPATH);
        assert_eq!(list.string(list.instructions[3].w1), Some("objects/gDL"));
        assert_eq!(list.instructions.len(), 5);
    }

    #[test]
    fn test_xml_implicit_end() {
        let list = from_xml(r#"<Triangle1 V00="0" V01="1" V02="2"/>"#).unwrap();
        assert_eq!(
            list.instructions,
            vec![gbi::sp_1_triangle(0, 1, 2, 0), gbi::sp_end_display_list()]
        );
    }

    #[test]
    fn test_xml_geometry_and_combine() {
        let list = from_xml(
            r#"<SetGeometryMode G_ZBUFFER="1" G_SHADE="1"/>
               <ClearGeometryMode G_CULL_BACK="true"/>
               <SetCombineLERP A0="TEXEL0" B0="0" C0="SHADE" D0="0" Aa0="0" Ab0="0" Ac0="0" Ad0="TEXEL0"
                               A1="COMBINED" B1="0" C1="PRIMITIVE" D1="0" Aa1="0" Ab1="0" Ac1="0" Ad1="COMBINED"/>"#,
        )
        .unwrap();

        assert_eq!(list.instructions[0], gbi::sp_geometry_mode(0, gbi::G_ZBUFFER | gbi::G_SHADE));
        assert_eq!(list.instructions[1], gbi::sp_geometry_mode(gbi::G_CULL_BACK, 0));
        assert_eq!(list.instructions[2].opcode(), gbi::G_SETCOMBINE);
    }

    #[test]
    fn test_xml_vertices_by_path() {
        let list = from_xml(
            r#"<LoadVertices Path="objects/gVtx" VertexBufferIndex="0" VertexOffset="8" Count="4"/>"#,
        )
        .unwrap();

        assert_eq!(list.instructions[0].opcode(), gbi::G_VTX_OTR_FILEPATH);
        assert_eq!(list.instructions[1], Gfx::new(8, 0));
        let commands: Vec<_> = list.commands().map(|(i, words)| (i, words.len())).collect();
        assert_eq!(commands, vec![(0, 2), (2, 1)]);
    }

    #[test]
    fn test_xml_load_texture_block() {
        let list = from_xml(
            r#"<LoadTextureBlock Path="&gt;0x06000000" Format="G_IM_FMT_RGBA" Size="G_IM_SIZ_16b" Width="32" Height="32"/>"#,
        )
        .unwrap();
        assert_eq!(list.instructions.len(), 8);
        assert_eq!(list.instructions[0].w1, 0x0600_0000);
    }

    #[test]
    fn test_xml_unknown_element() {
        assert!(matches!(
            from_xml("<Frobnicate/>"),
            Err(DecodeError::UnknownElement(name)) if name == "Frobnicate"
        ));
        assert!(from_xml(r#"<SetTextureImage Path="x" Format="0" Size="0" Width="0"/>"#).is_err());
    }
}
