//! Endian-aware binary writer.
//!
//! [`BinaryWriter`] is the encoding counterpart of [`BinaryReader`](crate::BinaryReader)
//! and is used to produce resource envelopes and payloads.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::Endianness;

/// A growable binary writer with a configurable byte order.
#[derive(Debug, Clone, Default)]
pub struct BinaryWriter {
    data: Vec<u8>,
    endianness: Endianness,
}

macro_rules! write_ordered {
    ($name:ident, $ty:ty, $size:expr, $write:ident) => {
        #[doc = concat!("Write a `", stringify!($ty), "` in the writer's byte order.")]
        #[inline]
        pub fn $name(&mut self, value: $ty) -> &mut Self {
            let mut bytes = [0u8; $size];
            match self.endianness {
                Endianness::Big => BigEndian::$write(&mut bytes, value),
                Endianness::Little => LittleEndian::$write(&mut bytes, value),
            }
            self.data.extend_from_slice(&bytes);
            self
        }
    };
}

impl BinaryWriter {
    /// Create an empty writer using the given byte order.
    pub fn new(endianness: Endianness) -> Self {
        Self {
            data: Vec::new(),
            endianness,
        }
    }

    /// Get the byte order used for multi-byte writes.
    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Current length of the written data.
    #[inline]
    pub fn position(&self) -> usize {
        self.data.len()
    }

    /// Borrow the written bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the writer and return the written bytes.
    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Write raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Write a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.data.push(value);
        self
    }

    /// Write a signed byte.
    #[inline]
    pub fn write_i8(&mut self, value: i8) -> &mut Self {
        self.write_u8(value as u8)
    }

    /// Write `count` zero bytes.
    pub fn write_zeros(&mut self, count: usize) -> &mut Self {
        self.data.resize(self.data.len() + count, 0);
        self
    }

    /// Pad with zeros until the length is a multiple of `alignment`.
    pub fn align_to(&mut self, alignment: usize) -> &mut Self {
        let misalignment = self.data.len() % alignment;
        if misalignment != 0 {
            self.write_zeros(alignment - misalignment);
        }
        self
    }

    write_ordered!(write_u16, u16, 2, write_u16);
    write_ordered!(write_i16, i16, 2, write_i16);
    write_ordered!(write_u32, u32, 4, write_u32);
    write_ordered!(write_i32, i32, 4, write_i32);
    write_ordered!(write_u64, u64, 8, write_u64);
    write_ordered!(write_i64, i64, 8, write_i64);
    write_ordered!(write_f32, f32, 4, write_f32);
    write_ordered!(write_f64, f64, 8, write_f64);

    /// Write a u32-length-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) -> &mut Self {
        self.write_u32(value.len() as u32);
        self.write_bytes(value.as_bytes())
    }
}
