//! Light sets.

use otrkit_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::Result;

/// A directional light.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
#[repr(C)]
pub struct DirectionalLight {
    pub color: [u8; 3],
    pad0: u8,
    pub direction: [i8; 3],
    pad1: u8,
}

impl DirectionalLight {
    pub fn new(color: [u8; 3], direction: [i8; 3]) -> Self {
        Self {
            color,
            pad0: 0,
            direction,
            pad1: 0,
        }
    }
}

/// Ambient colour plus directional lights.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Light {
    pub ambient: [u8; 3],
    pub lights: Vec<DirectionalLight>,
}

impl Light {
    /// Binary V0: ambient rgb, a byte count, then rgb + direction per light.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let ambient = reader.read_array()?;
        let count = reader.read_u8()?;
        let mut lights = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let color = reader.read_array()?;
            let direction = [reader.read_i8()?, reader.read_i8()?, reader.read_i8()?];
            lights.push(DirectionalLight::new(color, direction));
        }
        Ok(Self { ambient, lights })
    }

    /// The directional lights as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.lights.as_bytes()
    }
}
