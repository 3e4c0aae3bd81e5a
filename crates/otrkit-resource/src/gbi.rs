//! Graphics binary interface: opcodes, instruction encoders and name tables.
//!
//! Instructions follow the F3DEX2 microcode layout. Opcodes in the `0x20..0x40`
//! range are runtime extensions that reference assets by content hash or by a
//! display-list string index instead of by segment address.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// One 64-bit display-list instruction.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
#[repr(C)]
pub struct Gfx {
    pub w0: u32,
    pub w1: u32,
}

impl Gfx {
    /// Build an instruction from its two words.
    #[inline]
    pub const fn new(w0: u32, w1: u32) -> Self {
        Self { w0, w1 }
    }

    /// The opcode in the top byte of `w0`.
    #[inline]
    pub const fn opcode(self) -> u8 {
        (self.w0 >> 24) as u8
    }
}

pub const G_NOOP: u8 = 0x00;
pub const G_VTX: u8 = 0x01;
pub const G_MODIFYVTX: u8 = 0x02;
pub const G_CULLDL: u8 = 0x03;
pub const G_BRANCH_Z: u8 = 0x04;
pub const G_TRI1: u8 = 0x05;
pub const G_TRI2: u8 = 0x06;
pub const G_QUAD: u8 = 0x07;
pub const G_LINE3D: u8 = 0x08;

pub const G_SETTIMG_OTR_HASH: u8 = 0x20;
pub const G_SETFB: u8 = 0x21;
pub const G_RESETFB: u8 = 0x22;
pub const G_SETTIMG_FB: u8 = 0x23;
pub const G_VTX_OTR_FILEPATH: u8 = 0x24;
pub const G_SETTIMG_OTR_FILEPATH: u8 = 0x25;
pub const G_TRI1_OTR: u8 = 0x26;
pub const G_DL_OTR_FILEPATH: u8 = 0x27;
pub const G_PUSHCD: u8 = 0x28;
pub const G_MTX_OTR2: u8 = 0x29;
pub const G_DL_OTR_HASH: u8 = 0x31;
pub const G_VTX_OTR_HASH: u8 = 0x32;
pub const G_MARKER: u8 = 0x33;
pub const G_INVALTEXCACHE: u8 = 0x34;
pub const G_BRANCH_Z_OTR: u8 = 0x35;
pub const G_MTX_OTR: u8 = 0x36;
pub const G_TEXRECT_WIDE: u8 = 0x37;
pub const G_FILLWIDERECT: u8 = 0x38;
pub const G_SETGRAYSCALE: u8 = 0x39;
pub const G_EXTRAGEOMETRYMODE: u8 = 0x3A;
pub const G_COPYFB: u8 = 0x3B;
pub const G_IMAGERECT: u8 = 0x3C;
pub const G_DL_INDEX: u8 = 0x3D;
pub const G_READFB: u8 = 0x3E;
pub const G_SETINTENSITY: u8 = 0x40;

pub const G_SPECIAL_3: u8 = 0xD3;
pub const G_SPECIAL_2: u8 = 0xD4;
pub const G_SPECIAL_1: u8 = 0xD5;
pub const G_DMA_IO: u8 = 0xD6;
pub const G_TEXTURE: u8 = 0xD7;
pub const G_POPMTX: u8 = 0xD8;
pub const G_GEOMETRYMODE: u8 = 0xD9;
pub const G_MTX: u8 = 0xDA;
pub const G_MOVEWORD: u8 = 0xDB;
pub const G_MOVEMEM: u8 = 0xDC;
pub const G_LOAD_UCODE: u8 = 0xDD;
pub const G_DL: u8 = 0xDE;
pub const G_ENDDL: u8 = 0xDF;
pub const G_SPNOOP: u8 = 0xE0;
pub const G_RDPHALF_1: u8 = 0xE1;
pub const G_SETOTHERMODE_L: u8 = 0xE2;
pub const G_SETOTHERMODE_H: u8 = 0xE3;
pub const G_TEXRECT: u8 = 0xE4;
pub const G_TEXRECTFLIP: u8 = 0xE5;
pub const G_RDPLOADSYNC: u8 = 0xE6;
pub const G_RDPPIPESYNC: u8 = 0xE7;
pub const G_RDPTILESYNC: u8 = 0xE8;
pub const G_RDPFULLSYNC: u8 = 0xE9;
pub const G_SETKEYGB: u8 = 0xEA;
pub const G_SETKEYR: u8 = 0xEB;
pub const G_SETCONVERT: u8 = 0xEC;
pub const G_SETSCISSOR: u8 = 0xED;
pub const G_SETPRIMDEPTH: u8 = 0xEE;
pub const G_RDPSETOTHERMODE: u8 = 0xEF;
pub const G_LOADTLUT: u8 = 0xF0;
pub const G_RDPHALF_2: u8 = 0xF1;
pub const G_SETTILESIZE: u8 = 0xF2;
pub const G_LOADBLOCK: u8 = 0xF3;
pub const G_LOADTILE: u8 = 0xF4;
pub const G_SETTILE: u8 = 0xF5;
pub const G_FILLRECT: u8 = 0xF6;
pub const G_SETFILLCOLOR: u8 = 0xF7;
pub const G_SETFOGCOLOR: u8 = 0xF8;
pub const G_SETBLENDCOLOR: u8 = 0xF9;
pub const G_SETPRIMCOLOR: u8 = 0xFA;
pub const G_SETENVCOLOR: u8 = 0xFB;
pub const G_SETCOMBINE: u8 = 0xFC;
pub const G_SETTIMG: u8 = 0xFD;
pub const G_SETZIMG: u8 = 0xFE;
pub const G_SETCIMG: u8 = 0xFF;

// Geometry mode flags.
pub const G_ZBUFFER: u32 = 0x0000_0001;
pub const G_SHADE: u32 = 0x0000_0004;
pub const G_CULL_FRONT: u32 = 0x0000_0200;
pub const G_CULL_BACK: u32 = 0x0000_0400;
pub const G_CULL_BOTH: u32 = 0x0000_0600;
pub const G_FOG: u32 = 0x0001_0000;
pub const G_LIGHTING: u32 = 0x0002_0000;
pub const G_TEXTURE_GEN: u32 = 0x0004_0000;
pub const G_TEXTURE_GEN_LINEAR: u32 = 0x0008_0000;
pub const G_LOD: u32 = 0x0010_0000;
pub const G_SHADING_SMOOTH: u32 = 0x0020_0000;
pub const G_CLIPPING: u32 = 0x0080_0000;

// Matrix parameters.
pub const G_MTX_MODELVIEW: u32 = 0x00;
pub const G_MTX_PROJECTION: u32 = 0x04;
pub const G_MTX_MUL: u32 = 0x00;
pub const G_MTX_LOAD: u32 = 0x02;
pub const G_MTX_NOPUSH: u32 = 0x00;
pub const G_MTX_PUSH: u32 = 0x01;

pub const G_DL_PUSH: u32 = 0;
pub const G_DL_NOPUSH: u32 = 1;

// Image formats and texel sizes.
pub const G_IM_FMT_RGBA: u32 = 0;
pub const G_IM_FMT_YUV: u32 = 1;
pub const G_IM_FMT_CI: u32 = 2;
pub const G_IM_FMT_IA: u32 = 3;
pub const G_IM_FMT_I: u32 = 4;
pub const G_IM_SIZ_4B: u32 = 0;
pub const G_IM_SIZ_8B: u32 = 1;
pub const G_IM_SIZ_16B: u32 = 2;
pub const G_IM_SIZ_32B: u32 = 3;

pub const G_TX_RENDERTILE: u32 = 0;
pub const G_TX_LOADTILE: u32 = 7;
pub const G_TX_NOMIRROR: u32 = 0;
pub const G_TX_WRAP: u32 = 0;
pub const G_TX_MIRROR: u32 = 1;
pub const G_TX_CLAMP: u32 = 2;
pub const G_TX_NOMASK: u32 = 0;
pub const G_TX_NOLOD: u32 = 0;
pub const G_TX_DXT_FRAC: u32 = 11;
pub const G_TEXTURE_IMAGE_FRAC: u32 = 2;

// Other-mode shifts.
pub const G_MDSFT_ALPHACOMPARE: u32 = 0;
pub const G_MDSFT_ZSRCSEL: u32 = 2;
pub const G_MDSFT_RENDERMODE: u32 = 3;
pub const G_MDSFT_ALPHADITHER: u32 = 4;
pub const G_MDSFT_RGBDITHER: u32 = 6;
pub const G_MDSFT_COMBKEY: u32 = 8;
pub const G_MDSFT_TEXTCONV: u32 = 9;
pub const G_MDSFT_TEXTFILT: u32 = 12;
pub const G_MDSFT_TEXTLUT: u32 = 14;
pub const G_MDSFT_TEXTLOD: u32 = 16;
pub const G_MDSFT_TEXTDETAIL: u32 = 17;
pub const G_MDSFT_TEXTPERSP: u32 = 19;
pub const G_MDSFT_CYCLETYPE: u32 = 20;
pub const G_MDSFT_PIPELINE: u32 = 23;

pub const G_CYC_1CYCLE: u32 = 0 << G_MDSFT_CYCLETYPE;
pub const G_CYC_2CYCLE: u32 = 1 << G_MDSFT_CYCLETYPE;
pub const G_CYC_COPY: u32 = 2 << G_MDSFT_CYCLETYPE;
pub const G_CYC_FILL: u32 = 3 << G_MDSFT_CYCLETYPE;
pub const G_TF_POINT: u32 = 0 << G_MDSFT_TEXTFILT;
pub const G_TF_AVERAGE: u32 = 3 << G_MDSFT_TEXTFILT;
pub const G_TF_BILERP: u32 = 2 << G_MDSFT_TEXTFILT;
pub const G_TT_NONE: u32 = 0 << G_MDSFT_TEXTLUT;
pub const G_TT_RGBA16: u32 = 2 << G_MDSFT_TEXTLUT;
pub const G_TT_IA16: u32 = 3 << G_MDSFT_TEXTLUT;
pub const G_AC_NONE: u32 = 0;
pub const G_AC_THRESHOLD: u32 = 1;
pub const G_AC_DITHER: u32 = 3;

/// Opcodes followed by a second instruction carrying a 64-bit asset hash.
pub const fn is_wide(opcode: u8) -> bool {
    matches!(
        opcode,
        G_SETTIMG_OTR_HASH | G_DL_OTR_HASH | G_VTX_OTR_HASH | G_MARKER | G_BRANCH_Z_OTR | G_MTX_OTR
    )
}

/// Opcodes whose `w1` is an index into the display list's string table.
pub const fn uses_string_table(opcode: u8) -> bool {
    matches!(
        opcode,
        G_VTX_OTR_FILEPATH | G_SETTIMG_OTR_FILEPATH | G_DL_OTR_FILEPATH | G_MTX_OTR2
    )
}

/// Split a 64-bit hash across an instruction's two words.
#[inline]
pub const fn hash_word(hash: u64) -> Gfx {
    Gfx::new((hash >> 32) as u32, hash as u32)
}

/// Recover the hash stored by [`hash_word`].
#[inline]
pub const fn word_hash(word: Gfx) -> u64 {
    ((word.w0 as u64) << 32) | word.w1 as u64
}

#[inline]
const fn shl(value: u32, shift: u32, width: u32) -> u32 {
    (value & ((1u32 << width) - 1)) << shift
}

#[inline]
const fn op(opcode: u8) -> u32 {
    (opcode as u32) << 24
}

pub const fn dp_pipe_sync() -> Gfx {
    Gfx::new(op(G_RDPPIPESYNC), 0)
}

pub const fn dp_tile_sync() -> Gfx {
    Gfx::new(op(G_RDPTILESYNC), 0)
}

pub const fn dp_load_sync() -> Gfx {
    Gfx::new(op(G_RDPLOADSYNC), 0)
}

pub const fn dp_full_sync() -> Gfx {
    Gfx::new(op(G_RDPFULLSYNC), 0)
}

pub const fn sp_no_op() -> Gfx {
    Gfx::new(op(G_SPNOOP), 0)
}

pub const fn sp_end_display_list() -> Gfx {
    Gfx::new(op(G_ENDDL), 0)
}

/// Call (`branch == false`) or jump to a display list at a segment address.
pub const fn sp_display_list(address: u32, branch: bool) -> Gfx {
    let push = if branch { G_DL_NOPUSH } else { G_DL_PUSH };
    Gfx::new(op(G_DL) | shl(push, 16, 8), address)
}

/// Load `count` vertices into the vertex buffer starting at slot `v0`.
pub const fn sp_vertex(address: u32, count: u32, v0: u32) -> Gfx {
    Gfx::new(
        op(G_VTX) | shl(count, 12, 8) | shl(v0.wrapping_add(count), 1, 7),
        address,
    )
}

const fn tri_word(v0: u32, v1: u32, v2: u32, flag: u32) -> u32 {
    let (a, b, c) = match flag {
        1 => (v1, v2, v0),
        2 => (v2, v0, v1),
        _ => (v0, v1, v2),
    };
    shl(a.wrapping_mul(2), 16, 8) | shl(b.wrapping_mul(2), 8, 8) | shl(c.wrapping_mul(2), 0, 8)
}

pub const fn sp_1_triangle(v0: u32, v1: u32, v2: u32, flag: u32) -> Gfx {
    Gfx::new(op(G_TRI1) | tri_word(v0, v1, v2, flag), 0)
}

pub const fn sp_2_triangles(first: [u32; 4], second: [u32; 4]) -> Gfx {
    Gfx::new(
        op(G_TRI2) | tri_word(first[0], first[1], first[2], first[3]),
        tri_word(second[0], second[1], second[2], second[3]),
    )
}

pub const fn sp_texture(s: u32, t: u32, level: u32, tile: u32, on: u32) -> Gfx {
    Gfx::new(
        op(G_TEXTURE) | shl(level, 11, 3) | shl(tile, 8, 3) | shl(on, 1, 7),
        shl(s, 16, 16) | shl(t, 0, 16),
    )
}

/// Clear then set geometry mode bits.
pub const fn sp_geometry_mode(clear: u32, set: u32) -> Gfx {
    Gfx::new(op(G_GEOMETRYMODE) | shl(!clear, 0, 24), set)
}

pub const fn sp_matrix(address: u32, params: u32) -> Gfx {
    Gfx::new(
        op(G_MTX) | shl((64 - 1) / 8, 19, 5) | shl(params ^ G_MTX_PUSH, 0, 8),
        address,
    )
}

/// Pop `count` matrices from the modelview stack.
pub const fn sp_pop_matrix(count: u32) -> Gfx {
    Gfx::new(op(G_POPMTX) | shl((64 - 1) / 8, 19, 5) | 2, count.wrapping_mul(64))
}

pub const fn sp_set_other_mode(cmd: u8, shift: u32, len: u32, data: u32) -> Gfx {
    Gfx::new(op(cmd) | shl(32 - shift - len, 8, 8) | shl(len - 1, 0, 8), data)
}

pub const fn dp_set_render_mode(mode1: u32, mode2: u32) -> Gfx {
    sp_set_other_mode(G_SETOTHERMODE_L, G_MDSFT_RENDERMODE, 29, mode1 | mode2)
}

pub const fn dp_set_cycle_type(mode: u32) -> Gfx {
    sp_set_other_mode(G_SETOTHERMODE_H, G_MDSFT_CYCLETYPE, 2, mode)
}

pub const fn dp_set_texture_filter(mode: u32) -> Gfx {
    sp_set_other_mode(G_SETOTHERMODE_H, G_MDSFT_TEXTFILT, 2, mode)
}

pub const fn dp_set_texture_lut(mode: u32) -> Gfx {
    sp_set_other_mode(G_SETOTHERMODE_H, G_MDSFT_TEXTLUT, 2, mode)
}

pub const fn dp_set_texture_persp(mode: u32) -> Gfx {
    sp_set_other_mode(G_SETOTHERMODE_H, G_MDSFT_TEXTPERSP, 1, mode)
}

pub const fn dp_set_texture_lod(mode: u32) -> Gfx {
    sp_set_other_mode(G_SETOTHERMODE_H, G_MDSFT_TEXTLOD, 1, mode)
}

pub const fn dp_set_color_dither(mode: u32) -> Gfx {
    sp_set_other_mode(G_SETOTHERMODE_H, G_MDSFT_RGBDITHER, 2, mode)
}

pub const fn dp_set_alpha_dither(mode: u32) -> Gfx {
    sp_set_other_mode(G_SETOTHERMODE_H, G_MDSFT_ALPHADITHER, 2, mode)
}

pub const fn dp_set_alpha_compare(mode: u32) -> Gfx {
    sp_set_other_mode(G_SETOTHERMODE_L, G_MDSFT_ALPHACOMPARE, 2, mode)
}

pub const fn dp_set_depth_source(mode: u32) -> Gfx {
    sp_set_other_mode(G_SETOTHERMODE_L, G_MDSFT_ZSRCSEL, 1, mode)
}

const fn rgba(r: u32, g: u32, b: u32, a: u32) -> u32 {
    shl(r, 24, 8) | shl(g, 16, 8) | shl(b, 8, 8) | shl(a, 0, 8)
}

pub const fn dp_set_prim_color(m: u32, l: u32, r: u32, g: u32, b: u32, a: u32) -> Gfx {
    Gfx::new(op(G_SETPRIMCOLOR) | shl(m, 8, 8) | shl(l, 0, 8), rgba(r, g, b, a))
}

pub const fn dp_set_env_color(r: u32, g: u32, b: u32, a: u32) -> Gfx {
    Gfx::new(op(G_SETENVCOLOR), rgba(r, g, b, a))
}

pub const fn dp_set_fog_color(r: u32, g: u32, b: u32, a: u32) -> Gfx {
    Gfx::new(op(G_SETFOGCOLOR), rgba(r, g, b, a))
}

pub const fn dp_set_blend_color(r: u32, g: u32, b: u32, a: u32) -> Gfx {
    Gfx::new(op(G_SETBLENDCOLOR), rgba(r, g, b, a))
}

pub const fn dp_set_fill_color(color: u32) -> Gfx {
    Gfx::new(op(G_SETFILLCOLOR), color)
}

pub const fn dp_set_prim_depth(z: u32, dz: u32) -> Gfx {
    Gfx::new(op(G_SETPRIMDEPTH), shl(z, 16, 16) | shl(dz, 0, 16))
}

/// Colour-combiner inputs: `[a, b, c, d]` for colour then alpha, per cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombineMode {
    pub color0: [u32; 4],
    pub alpha0: [u32; 4],
    pub color1: [u32; 4],
    pub alpha1: [u32; 4],
}

pub const fn dp_set_combine(mode: CombineMode) -> Gfx {
    let [a0, b0, c0, d0] = mode.color0;
    let [aa0, ab0, ac0, ad0] = mode.alpha0;
    let [a1, b1, c1, d1] = mode.color1;
    let [aa1, ab1, ac1, ad1] = mode.alpha1;

    let w0 = shl(a0, 20, 4) | shl(c0, 15, 5) | shl(aa0, 12, 3) | shl(ac0, 9, 3)
        | shl(a1, 5, 4)
        | shl(c1, 0, 5);
    let w1 = shl(b0, 28, 4) | shl(d0, 15, 3) | shl(ab0, 12, 3) | shl(ad0, 9, 3)
        | shl(b1, 24, 4)
        | shl(aa1, 21, 3)
        | shl(ac1, 18, 3)
        | shl(d1, 6, 3)
        | shl(ab1, 3, 3)
        | shl(ad1, 0, 3);

    Gfx::new(op(G_SETCOMBINE) | shl(w0, 0, 24), w1)
}

pub const fn dp_set_texture_image(format: u32, size: u32, width: u32, address: u32) -> Gfx {
    Gfx::new(
        op(G_SETTIMG) | shl(format, 21, 3) | shl(size, 19, 2) | shl(width.wrapping_sub(1), 0, 12),
        address,
    )
}

/// Tile descriptor fields for `G_SETTILE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileDescriptor {
    pub format: u32,
    pub size: u32,
    pub line: u32,
    pub tmem: u32,
    pub tile: u32,
    pub palette: u32,
    pub cmt: u32,
    pub maskt: u32,
    pub shiftt: u32,
    pub cms: u32,
    pub masks: u32,
    pub shifts: u32,
}

pub const fn dp_set_tile(t: TileDescriptor) -> Gfx {
    Gfx::new(
        op(G_SETTILE) | shl(t.format, 21, 3) | shl(t.size, 19, 2) | shl(t.line, 9, 9) | shl(t.tmem, 0, 9),
        shl(t.tile, 24, 3)
            | shl(t.palette, 20, 4)
            | shl(t.cmt, 18, 2)
            | shl(t.maskt, 14, 4)
            | shl(t.shiftt, 10, 4)
            | shl(t.cms, 8, 2)
            | shl(t.masks, 4, 4)
            | shl(t.shifts, 0, 4),
    )
}

pub const fn dp_load_block(tile: u32, uls: u32, ult: u32, lrs: u32, dxt: u32) -> Gfx {
    let lrs = if lrs > 2047 { 2047 } else { lrs };
    Gfx::new(
        op(G_LOADBLOCK) | shl(uls, 12, 12) | shl(ult, 0, 12),
        shl(tile, 24, 3) | shl(lrs, 12, 12) | shl(dxt, 0, 12),
    )
}

const fn tile_rect(opcode: u8, tile: u32, uls: u32, ult: u32, lrs: u32, lrt: u32) -> Gfx {
    Gfx::new(
        op(opcode) | shl(uls, 12, 12) | shl(ult, 0, 12),
        shl(tile, 24, 3) | shl(lrs, 12, 12) | shl(lrt, 0, 12),
    )
}

pub const fn dp_load_tile(tile: u32, uls: u32, ult: u32, lrs: u32, lrt: u32) -> Gfx {
    tile_rect(G_LOADTILE, tile, uls, ult, lrs, lrt)
}

pub const fn dp_set_tile_size(tile: u32, uls: u32, ult: u32, lrs: u32, lrt: u32) -> Gfx {
    tile_rect(G_SETTILESIZE, tile, uls, ult, lrs, lrt)
}

pub const fn dp_load_tlut_cmd(tile: u32, count: u32) -> Gfx {
    Gfx::new(op(G_LOADTLUT), shl(tile, 24, 3) | shl(count, 14, 10))
}

const fn txl_to_words(texels: u32, bytes_per_texel: u32) -> u32 {
    let words = texels * bytes_per_texel / 8;
    if words > 1 {
        words
    } else {
        1
    }
}

const fn calc_dxt(width: u32, bytes_per_texel: u32) -> u32 {
    let words = txl_to_words(width, bytes_per_texel);
    ((1 << G_TX_DXT_FRAC) + words - 1) / words
}

const fn calc_dxt_4b(width: u32) -> u32 {
    let words = if width / 16 > 1 { width / 16 } else { 1 };
    ((1 << G_TX_DXT_FRAC) + words - 1) / words
}

/// Parameters of the load-texture-block macro.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextureBlock {
    pub format: u32,
    pub size: u32,
    pub width: u32,
    pub height: u32,
    pub palette: u32,
    pub cms: u32,
    pub cmt: u32,
    pub masks: u32,
    pub maskt: u32,
    pub shifts: u32,
    pub shiftt: u32,
}

/// Expand the load-texture-block macro into its seven instructions.
///
/// The first instruction is a `G_SETTIMG` with `address`; callers that refer
/// to the image by path patch it afterwards.
pub const fn dp_load_texture_block(address: u32, b: TextureBlock) -> [Gfx; 7] {
    let texels = b.width.wrapping_mul(b.height);
    let (load_size, line, lrs, dxt) = match b.size {
        G_IM_SIZ_4B => (
            G_IM_SIZ_16B,
            ((b.width >> 1) + 7) >> 3,
            ((texels + 3) >> 2).wrapping_sub(1),
            calc_dxt_4b(b.width),
        ),
        G_IM_SIZ_8B => (
            G_IM_SIZ_16B,
            (b.width + 7) >> 3,
            ((texels + 1) >> 1).wrapping_sub(1),
            calc_dxt(b.width, 1),
        ),
        G_IM_SIZ_16B => (G_IM_SIZ_16B, ((b.width * 2) + 7) >> 3, texels.wrapping_sub(1), calc_dxt(b.width, 2)),
        _ => (G_IM_SIZ_32B, ((b.width * 2) + 7) >> 3, texels.wrapping_sub(1), calc_dxt(b.width, 4)),
    };

    [
        dp_set_texture_image(b.format, load_size, 1, address),
        dp_set_tile(TileDescriptor {
            format: b.format,
            size: load_size,
            line: 0,
            tmem: 0,
            tile: G_TX_LOADTILE,
            palette: 0,
            cmt: b.cmt,
            maskt: b.maskt,
            shiftt: b.shiftt,
            cms: b.cms,
            masks: b.masks,
            shifts: b.shifts,
        }),
        dp_load_sync(),
        dp_load_block(G_TX_LOADTILE, 0, 0, lrs, dxt),
        dp_pipe_sync(),
        dp_set_tile(TileDescriptor {
            format: b.format,
            size: b.size,
            line,
            tmem: 0,
            tile: G_TX_RENDERTILE,
            palette: b.palette,
            cmt: b.cmt,
            maskt: b.maskt,
            shiftt: b.shiftt,
            cms: b.cms,
            masks: b.masks,
            shifts: b.shifts,
        }),
        dp_set_tile_size(
            G_TX_RENDERTILE,
            0,
            0,
            b.width.wrapping_sub(1) << G_TEXTURE_IMAGE_FRAC,
            b.height.wrapping_sub(1) << G_TEXTURE_IMAGE_FRAC,
        ),
    ]
}

/// Two-instruction call to a display list identified by content hash.
pub const fn sp_display_list_hash(hash: u64, branch: bool) -> [Gfx; 2] {
    let push = if branch { G_DL_NOPUSH } else { G_DL_PUSH };
    [Gfx::new(op(G_DL_OTR_HASH) | shl(push, 16, 8), 0), hash_word(hash)]
}

/// Two-instruction vertex load from an asset identified by content hash.
/// `offset` is the index of the first vertex inside the asset.
pub const fn sp_vertex_hash(hash: u64, count: u32, v0: u32, offset: u32) -> [Gfx; 2] {
    let first = sp_vertex(offset, count, v0);
    [Gfx::new((first.w0 & 0x00FF_FFFF) | op(G_VTX_OTR_HASH), offset), hash_word(hash)]
}

pub const fn dp_set_texture_image_hash(format: u32, size: u32, width: u32, hash: u64) -> [Gfx; 2] {
    let first = dp_set_texture_image(format, size, width, 0);
    [Gfx::new((first.w0 & 0x00FF_FFFF) | op(G_SETTIMG_OTR_HASH), 0), hash_word(hash)]
}

pub const fn sp_matrix_hash(hash: u64, params: u32) -> [Gfx; 2] {
    let first = sp_matrix(0, params);
    [Gfx::new((first.w0 & 0x00FF_FFFF) | op(G_MTX_OTR), 0), hash_word(hash)]
}

/// Debug marker carrying a hash of the list it belongs to.
pub const fn sp_marker(hash: u64) -> [Gfx; 2] {
    [Gfx::new(op(G_MARKER), 0), hash_word(hash)]
}

/// Conditional branch on depth to a list identified by content hash.
pub const fn sp_branch_z_hash(hash: u64, vertex: u32, z: u32) -> [Gfx; 2] {
    [
        Gfx::new(op(G_BRANCH_Z_OTR) | shl(vertex * 5, 12, 12) | shl(vertex * 2, 0, 12), z),
        hash_word(hash),
    ]
}

/// Human-readable opcode name, or `None` for unknown opcodes.
pub fn opcode_name(opcode: u8) -> Option<&'static str> {
    Some(match opcode {
        G_NOOP => "G_NOOP",
        G_VTX => "G_VTX",
        G_MODIFYVTX => "G_MODIFYVTX",
        G_CULLDL => "G_CULLDL",
        G_BRANCH_Z => "G_BRANCH_Z",
        G_TRI1 => "G_TRI1",
        G_TRI2 => "G_TRI2",
        G_QUAD => "G_QUAD",
        G_LINE3D => "G_LINE3D",
        G_SETTIMG_OTR_HASH => "G_SETTIMG_OTR_HASH",
        G_SETFB => "G_SETFB",
        G_RESETFB => "G_RESETFB",
        G_SETTIMG_FB => "G_SETTIMG_FB",
        G_VTX_OTR_FILEPATH => "G_VTX_OTR_FILEPATH",
        G_SETTIMG_OTR_FILEPATH => "G_SETTIMG_OTR_FILEPATH",
        G_TRI1_OTR => "G_TRI1_OTR",
        G_DL_OTR_FILEPATH => "G_DL_OTR_FILEPATH",
        G_PUSHCD => "G_PUSHCD",
        G_MTX_OTR2 => "G_MTX_OTR2",
        G_DL_OTR_HASH => "G_DL_OTR_HASH",
        G_VTX_OTR_HASH => "G_VTX_OTR_HASH",
        G_MARKER => "G_MARKER",
        G_INVALTEXCACHE => "G_INVALTEXCACHE",
        G_BRANCH_Z_OTR => "G_BRANCH_Z_OTR",
        G_MTX_OTR => "G_MTX_OTR",
        G_TEXRECT_WIDE => "G_TEXRECT_WIDE",
        G_FILLWIDERECT => "G_FILLWIDERECT",
        G_SETGRAYSCALE => "G_SETGRAYSCALE",
        G_EXTRAGEOMETRYMODE => "G_EXTRAGEOMETRYMODE",
        G_COPYFB => "G_COPYFB",
        G_IMAGERECT => "G_IMAGERECT",
        G_DL_INDEX => "G_DL_INDEX",
        G_READFB => "G_READFB",
        G_SETINTENSITY => "G_SETINTENSITY",
        G_SPECIAL_3 => "G_SPECIAL_3",
        G_SPECIAL_2 => "G_SPECIAL_2",
        G_SPECIAL_1 => "G_SPECIAL_1",
        G_DMA_IO => "G_DMA_IO",
        G_TEXTURE => "G_TEXTURE",
        G_POPMTX => "G_POPMTX",
        G_GEOMETRYMODE => "G_GEOMETRYMODE",
        G_MTX => "G_MTX",
        G_MOVEWORD => "G_MOVEWORD",
        G_MOVEMEM => "G_MOVEMEM",
        G_LOAD_UCODE => "G_LOAD_UCODE",
        G_DL => "G_DL",
        G_ENDDL => "G_ENDDL",
        G_SPNOOP => "G_SPNOOP",
        G_RDPHALF_1 => "G_RDPHALF_1",
        G_SETOTHERMODE_L => "G_SETOTHERMODE_L",
        G_SETOTHERMODE_H => "G_SETOTHERMODE_H",
        G_TEXRECT => "G_TEXRECT",
        G_TEXRECTFLIP => "G_TEXRECTFLIP",
        G_RDPLOADSYNC => "G_RDPLOADSYNC",
        G_RDPPIPESYNC => "G_RDPPIPESYNC",
        G_RDPTILESYNC => "G_RDPTILESYNC",
        G_RDPFULLSYNC => "G_RDPFULLSYNC",
        G_SETKEYGB => "G_SETKEYGB",
        G_SETKEYR => "G_SETKEYR",
        G_SETCONVERT => "G_SETCONVERT",
        G_SETSCISSOR => "G_SETSCISSOR",
        G_SETPRIMDEPTH => "G_SETPRIMDEPTH",
        G_RDPSETOTHERMODE => "G_RDPSETOTHERMODE",
        G_LOADTLUT => "G_LOADTLUT",
        G_RDPHALF_2 => "G_RDPHALF_2",
        G_SETTILESIZE => "G_SETTILESIZE",
        G_LOADBLOCK => "G_LOADBLOCK",
        G_LOADTILE => "G_LOADTILE",
        G_SETTILE => "G_SETTILE",
        G_FILLRECT => "G_FILLRECT",
        G_SETFILLCOLOR => "G_SETFILLCOLOR",
        G_SETFOGCOLOR => "G_SETFOGCOLOR",
        G_SETBLENDCOLOR => "G_SETBLENDCOLOR",
        G_SETPRIMCOLOR => "G_SETPRIMCOLOR",
        G_SETENVCOLOR => "G_SETENVCOLOR",
        G_SETCOMBINE => "G_SETCOMBINE",
        G_SETTIMG => "G_SETTIMG",
        G_SETZIMG => "G_SETZIMG",
        G_SETCIMG => "G_SETCIMG",
        _ => return None,
    })
}

/// Colour-combiner input by name.
pub fn color_input(name: &str) -> Option<u32> {
    Some(match name {
        "COMBINED" => 0,
        "TEXEL0" => 1,
        "TEXEL1" => 2,
        "PRIMITIVE" => 3,
        "SHADE" => 4,
        "ENVIRONMENT" => 5,
        "CENTER" | "SCALE" | "1" => 6,
        "COMBINED_ALPHA" | "NOISE" | "K4" => 7,
        "TEXEL0_ALPHA" => 8,
        "TEXEL1_ALPHA" => 9,
        "PRIMITIVE_ALPHA" => 10,
        "SHADE_ALPHA" => 11,
        "ENV_ALPHA" => 12,
        "LOD_FRACTION" => 13,
        "PRIM_LOD_FRAC" => 14,
        "K5" => 15,
        "0" => 31,
        _ => return None,
    })
}

/// Alpha-combiner input by name.
pub fn alpha_input(name: &str) -> Option<u32> {
    Some(match name {
        "COMBINED" | "LOD_FRACTION" => 0,
        "TEXEL0" => 1,
        "TEXEL1" => 2,
        "PRIMITIVE" => 3,
        "SHADE" => 4,
        "ENVIRONMENT" => 5,
        "PRIM_LOD_FRAC" | "1" => 6,
        "0" => 7,
        _ => return None,
    })
}

/// Symbolic constants accepted in XML attribute values.
pub fn named_constant(name: &str) -> Option<u32> {
    Some(match name {
        "G_IM_FMT_RGBA" => G_IM_FMT_RGBA,
        "G_IM_FMT_YUV" => G_IM_FMT_YUV,
        "G_IM_FMT_CI" => G_IM_FMT_CI,
        "G_IM_FMT_IA" => G_IM_FMT_IA,
        "G_IM_FMT_I" => G_IM_FMT_I,
        "G_IM_SIZ_4b" => G_IM_SIZ_4B,
        "G_IM_SIZ_8b" => G_IM_SIZ_8B,
        "G_IM_SIZ_16b" => G_IM_SIZ_16B,
        "G_IM_SIZ_32b" => G_IM_SIZ_32B,
        "G_TX_RENDERTILE" => G_TX_RENDERTILE,
        "G_TX_LOADTILE" => G_TX_LOADTILE,
        "G_TX_NOMIRROR" | "G_TX_WRAP" | "G_TX_NOMASK" | "G_TX_NOLOD" => 0,
        "G_TX_MIRROR" => G_TX_MIRROR,
        "G_TX_CLAMP" => G_TX_CLAMP,
        "G_MTX_MODELVIEW" | "G_MTX_MUL" | "G_MTX_NOPUSH" => 0,
        "G_MTX_PROJECTION" => G_MTX_PROJECTION,
        "G_MTX_LOAD" => G_MTX_LOAD,
        "G_MTX_PUSH" => G_MTX_PUSH,
        "G_CYC_1CYCLE" => G_CYC_1CYCLE,
        "G_CYC_2CYCLE" => G_CYC_2CYCLE,
        "G_CYC_COPY" => G_CYC_COPY,
        "G_CYC_FILL" => G_CYC_FILL,
        "G_TF_POINT" => G_TF_POINT,
        "G_TF_AVERAGE" => G_TF_AVERAGE,
        "G_TF_BILERP" => G_TF_BILERP,
        "G_TT_NONE" => G_TT_NONE,
        "G_TT_RGBA16" => G_TT_RGBA16,
        "G_TT_IA16" => G_TT_IA16,
        "G_AC_NONE" => G_AC_NONE,
        "G_AC_THRESHOLD" => G_AC_THRESHOLD,
        "G_AC_DITHER" => G_AC_DITHER,
        "G_ZBUFFER" => G_ZBUFFER,
        "G_SHADE" => G_SHADE,
        "G_CULL_FRONT" => G_CULL_FRONT,
        "G_CULL_BACK" => G_CULL_BACK,
        "G_CULL_BOTH" => G_CULL_BOTH,
        "G_FOG" => G_FOG,
        "G_LIGHTING" => G_LIGHTING,
        "G_TEXTURE_GEN" => G_TEXTURE_GEN,
        "G_TEXTURE_GEN_LINEAR" => G_TEXTURE_GEN_LINEAR,
        "G_LOD" => G_LOD,
        "G_SHADING_SMOOTH" => G_SHADING_SMOOTH,
        "G_CLIPPING" => G_CLIPPING,
        "G_ON" => 1,
        "G_OFF" => 0,
        _ => return None,
    })
}

/// Geometry mode attribute names and their flag bits.
pub const GEOMETRY_FLAGS: [(&str, u32); 11] = [
    ("G_ZBUFFER", G_ZBUFFER),
    ("G_SHADE", G_SHADE),
    ("G_CULL_FRONT", G_CULL_FRONT),
    ("G_CULL_BACK", G_CULL_BACK),
    ("G_FOG", G_FOG),
    ("G_LIGHTING", G_LIGHTING),
    ("G_TEXTURE_GEN", G_TEXTURE_GEN),
    ("G_TEXTURE_GEN_LINEAR", G_TEXTURE_GEN_LINEAR),
    ("G_LOD", G_LOD),
    ("G_SHADING_SMOOTH", G_SHADING_SMOOTH),
    ("G_CLIPPING", G_CLIPPING),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_encodings() {
        assert_eq!(dp_pipe_sync(), Gfx::new(0xE700_0000, 0));
        assert_eq!(sp_end_display_list().opcode(), G_ENDDL);
        assert_eq!(sp_display_list(0x0600_1000, true), Gfx::new(0xDE01_0000, 0x0600_1000));
        assert_eq!(sp_vertex(0x0600_0000, 4, 0), Gfx::new(0x0100_4008, 0x0600_0000));
        assert_eq!(sp_1_triangle(0, 1, 2, 0), Gfx::new(0x0500_0204, 0));
        assert_eq!(sp_1_triangle(0, 1, 2, 1), Gfx::new(0x0502_0400, 0));
        assert_eq!(sp_matrix(0x0D00_0000, G_MTX_PUSH | G_MTX_LOAD), Gfx::new(0xDA38_0002, 0x0D00_0000));
        assert_eq!(sp_pop_matrix(1), Gfx::new(0xD838_0002, 64));
        assert_eq!(sp_texture(0xFFFF, 0xFFFF, 0, G_TX_RENDERTILE, 1), Gfx::new(0xD700_0002, 0xFFFF_FFFF));
    }

    #[test]
    fn test_geometry_mode() {
        let set = sp_geometry_mode(0, G_ZBUFFER | G_SHADE);
        assert_eq!(set, Gfx::new(0xD9FF_FFFF, 0x0000_0005));
        let clear = sp_geometry_mode(G_CULL_BACK, 0);
        assert_eq!(clear, Gfx::new(0xD9FF_FBFF, 0));
    }

    #[test]
    fn test_other_mode() {
        assert_eq!(dp_set_cycle_type(G_CYC_2CYCLE), Gfx::new(0xE300_0A01, 0x0010_0000));
        assert_eq!(dp_set_texture_filter(G_TF_BILERP), Gfx::new(0xE300_1201, 0x2000));
        assert_eq!(dp_set_alpha_compare(G_AC_THRESHOLD), Gfx::new(0xE200_1E01, 1));
        assert_eq!(dp_set_render_mode(0x0044_2078, 0), Gfx::new(0xE200_001C, 0x0044_2078));
    }

    #[test]
    fn test_texture_block_expansion() {
        let block = dp_load_texture_block(
            0x0600_0000,
            TextureBlock {
                format: G_IM_FMT_RGBA,
                size: G_IM_SIZ_16B,
                width: 32,
                height: 32,
                ..Default::default()
            },
        );
        assert_eq!(block[0], Gfx::new(0xFD10_0000, 0x0600_0000));
        assert_eq!(block[2].opcode(), G_RDPLOADSYNC);
        // 32x32 16-bit: lrs = 1023, dxt = 256
        assert_eq!(block[3], Gfx::new(0xF300_0000, 0x073F_F100));
        assert_eq!(block[5].w0, 0xF510_1000);
        assert_eq!(block[6], Gfx::new(0xF200_0000, 0x0007_C07C));
    }

    #[test]
    fn test_wide_opcodes() {
        for opcode in [0x20, 0x31, 0x32, 0x33, 0x35, 0x36] {
            assert!(is_wide(opcode));
        }
        assert!(!is_wide(G_DL));
        assert!(!is_wide(G_VTX_OTR_FILEPATH));

        let [call, hash] = sp_display_list_hash(0x0123_4567_89AB_CDEF, false);
        assert_eq!(call.opcode(), G_DL_OTR_HASH);
        assert_eq!(word_hash(hash), 0x0123_4567_89AB_CDEF);
    }

    #[test]
    fn test_opcode_names() {
        assert_eq!(opcode_name(G_ENDDL), Some("G_ENDDL"));
        assert_eq!(opcode_name(0x99), None);
        assert_eq!(color_input("TEXEL0"), Some(1));
        assert_eq!(alpha_input("0"), Some(7));
    }
}
