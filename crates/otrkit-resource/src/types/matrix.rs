//! Fixed-point matrices.

use otrkit_common::BinaryReader;
use zerocopy::IntoBytes;

use crate::Result;

/// A 4x4 matrix in the 16.16 fixed-point layout: sixteen words holding the
/// integer halves followed by the fractional halves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Matrix {
    pub words: [i32; 16],
}

impl Matrix {
    /// Binary V0: sixteen signed words.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let mut words = [0i32; 16];
        for word in &mut words {
            *word = reader.read_i32()?;
        }
        Ok(Self { words })
    }

    /// The matrix as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.words.as_bytes()
    }

    /// Convert to floating point, row-major.
    pub fn to_f32(&self) -> [[f32; 4]; 4] {
        let mut out = [[0.0; 4]; 4];
        for (i, value) in out.iter_mut().flatten().enumerate() {
            // Each word packs two consecutive 16-bit halves.
            let half = |base: usize| -> u16 {
                let word = self.words[base + i / 2] as u32;
                if i % 2 == 0 {
                    (word >> 16) as u16
                } else {
                    word as u16
                }
            };
            let integer = half(0) as i16 as i32;
            let fraction = half(8) as i32;
            *value = ((integer << 16) | fraction) as f32 / 65536.0;
        }
        out
    }
}
