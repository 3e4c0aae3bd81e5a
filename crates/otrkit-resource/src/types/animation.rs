//! Animations.

use otrkit_common::BinaryReader;
use zerocopy::IntoBytes;

use crate::{DecodeError, Result};

/// Rotation index triple into the value table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationIndex {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

/// One keyframe record of a curve animation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CurveKey {
    pub frame: u16,
    pub value: i16,
    pub tangent_in: i16,
    pub tangent_out: i16,
    pub scale: f32,
}

/// Animation payload by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Animation {
    Normal {
        frame_count: i16,
        rotation_values: Vec<u16>,
        rotation_indices: Vec<RotationIndex>,
        limit: u16,
    },
    Link {
        frame_count: i16,
        segment: String,
    },
    Curve {
        frame_count: i16,
        ref_indices: Vec<u8>,
        keys: Vec<CurveKey>,
        copy_values: Vec<i16>,
    },
}

impl Animation {
    /// Binary V0: a kind tag selects the body layout.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(match reader.read_u32()? {
            0 => Self::Normal {
                frame_count: reader.read_i16()?,
                rotation_values: reader.read_counted(|r| r.read_u16())?,
                rotation_indices: reader.read_counted(|r| {
                    Ok(RotationIndex {
                        x: r.read_u16()?,
                        y: r.read_u16()?,
                        z: r.read_u16()?,
                    })
                })?,
                limit: reader.read_u16()?,
            },
            1 => Self::Link {
                frame_count: reader.read_i16()?,
                segment: reader.read_string()?.to_owned(),
            },
            2 => Self::Curve {
                frame_count: reader.read_i16()?,
                ref_indices: reader.read_counted(|r| r.read_u8())?,
                keys: reader.read_counted(|r| {
                    Ok(CurveKey {
                        frame: r.read_u16()?,
                        value: r.read_i16()?,
                        tangent_in: r.read_i16()?,
                        tangent_out: r.read_i16()?,
                        scale: r.read_f32()?,
                    })
                })?,
                copy_values: reader.read_counted(|r| r.read_i16())?,
            },
            value => {
                return Err(DecodeError::InvalidValue {
                    field: "animation kind",
                    value,
                })
            }
        })
    }

    /// Number of frames.
    pub fn frame_count(&self) -> i16 {
        match self {
            Self::Normal { frame_count, .. }
            | Self::Link { frame_count, .. }
            | Self::Curve { frame_count, .. } => *frame_count,
        }
    }
}

/// Per-frame limb rotations for the player skeleton.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerAnimation {
    pub limb_rotations: Vec<i16>,
}

impl PlayerAnimation {
    /// Binary V0: count then rotations.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            limb_rotations: reader.read_counted(|r| r.read_i16())?,
        })
    }

    /// The rotations as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.limb_rotations.as_bytes()
    }
}
