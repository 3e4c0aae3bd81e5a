//! Endian-aware binary reader over byte slices.
//!
//! This module provides [`BinaryReader`], a cursor-like type that reads
//! resource payloads without copying. Multi-byte reads honour the byte order
//! declared by the resource envelope.

use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian};

use crate::{Endianness, Error, Result};

/// A binary reader over a byte slice with a configurable byte order.
///
/// # Example
///
/// ```
/// use otrkit_common::{BinaryReader, Endianness};
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = BinaryReader::new(&data);
/// reader.set_endianness(Endianness::Big);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x01020304);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
    endianness: Endianness,
}

macro_rules! read_ordered {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $size:expr, $read:ident) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self) -> Result<$ty> {
            let bytes = self.read_bytes($size)?;
            Ok(match self.endianness {
                Endianness::Big => BigEndian::$read(bytes),
                Endianness::Little => LittleEndian::$read(bytes),
            })
        }
    };
}

impl<'a> BinaryReader<'a> {
    /// Create a new little-endian reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            endianness: Endianness::Little,
        }
    }

    /// Create a new reader with an explicit byte order.
    #[inline]
    pub const fn with_endianness(data: &'a [u8], endianness: Endianness) -> Self {
        Self {
            data,
            position: 0,
            endianness,
        }
    }

    /// Get the byte order used for multi-byte reads.
    #[inline]
    pub const fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Change the byte order used for subsequent multi-byte reads.
    #[inline]
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Seek to an absolute position.
    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Advance the position by a number of bytes.
    #[inline]
    pub fn advance(&mut self, count: usize) {
        self.position = self.position.saturating_add(count);
    }

    /// Skip bytes until the position is a multiple of `alignment`.
    pub fn align_to(&mut self, alignment: usize) -> Result<()> {
        let misalignment = self.position % alignment;
        if misalignment != 0 {
            self.read_bytes(alignment - misalignment)?;
        }
        Ok(())
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a fixed-size byte array.
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_u8().map(|b| b as i8)
    }

    /// Read a boolean (non-zero = true).
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        self.read_u8().map(|b| b != 0)
    }

    read_ordered!(
        /// Read a u16 in the reader's byte order.
        read_u16, u16, 2, read_u16
    );
    read_ordered!(
        /// Read an i16 in the reader's byte order.
        read_i16, i16, 2, read_i16
    );
    read_ordered!(
        /// Read a u32 in the reader's byte order.
        read_u32, u32, 4, read_u32
    );
    read_ordered!(
        /// Read an i32 in the reader's byte order.
        read_i32, i32, 4, read_i32
    );
    read_ordered!(
        /// Read a u64 in the reader's byte order.
        read_u64, u64, 8, read_u64
    );
    read_ordered!(
        /// Read an i64 in the reader's byte order.
        read_i64, i64, 8, read_i64
    );

    /// Read an f32 in the reader's byte order.
    ///
    /// When the byte order is not the host's, the bytes are reversed
    /// explicitly and a NaN result is rejected.
    pub fn read_f32(&mut self) -> Result<f32> {
        let offset = self.position;
        let raw = NativeEndian::read_u32(self.read_bytes(4)?);
        if !self.endianness.is_swapped() {
            return Ok(f32::from_bits(raw));
        }
        let value = f32::from_bits(raw.swap_bytes());
        if value.is_nan() {
            return Err(Error::NanAfterSwap { offset });
        }
        Ok(value)
    }

    /// Read an f64 in the reader's byte order.
    ///
    /// Same NaN rule as [`read_f32`](Self::read_f32).
    pub fn read_f64(&mut self) -> Result<f64> {
        let offset = self.position;
        let raw = NativeEndian::read_u64(self.read_bytes(8)?);
        if !self.endianness.is_swapped() {
            return Ok(f64::from_bits(raw));
        }
        let value = f64::from_bits(raw.swap_bytes());
        if value.is_nan() {
            return Err(Error::NanAfterSwap { offset });
        }
        Ok(value)
    }

    /// Read a u32-length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<&'a str> {
        let length = self.read_u32()? as usize;
        let bytes = self.read_bytes(length)?;
        std::str::from_utf8(bytes).map_err(Error::Utf8)
    }

    /// Read a null-terminated string.
    pub fn read_cstring(&mut self) -> Result<&'a str> {
        let remaining = self.remaining_bytes();
        let null_pos = remaining
            .iter()
            .position(|&b| b == 0)
            .ok_or(Error::MissingNullTerminator)?;

        self.position += null_pos + 1;
        std::str::from_utf8(&remaining[..null_pos]).map_err(Error::Utf8)
    }

    /// Read three consecutive i16 values.
    #[inline]
    pub fn read_vec3s(&mut self) -> Result<[i16; 3]> {
        Ok([self.read_i16()?, self.read_i16()?, self.read_i16()?])
    }

    /// Read a u32 count followed by that many elements.
    pub fn read_counted<T>(
        &mut self,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let count = self.read_u32()? as usize;
        // Never trust the count for the allocation size.
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(read(self)?);
        }
        Ok(items)
    }

    /// Peek at a u32 without advancing.
    #[inline]
    pub fn peek_u32(&self) -> Result<u32> {
        let bytes = self.peek_bytes(4)?;
        Ok(match self.endianness {
            Endianness::Big => BigEndian::read_u32(bytes),
            Endianness::Little => LittleEndian::read_u32(bytes),
        })
    }

    /// Expect a specific u32 or return an error.
    pub fn expect_u32(&mut self, expected: u32) -> Result<()> {
        let actual = self.read_u32()?;
        if actual != expected {
            return Err(Error::ExpectedValue {
                expected: format!("{expected:#010x}"),
                actual: format!("{actual:#010x}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_little_endian() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x04030201
            0xFF, 0xFF, 0xFF, 0xFF, // u32: 0xFFFFFFFF
        ];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.read_u32().unwrap(), 0xFFFFFFFF);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_swapped_u32_keeps_logical_value() {
        let order = Endianness::native().flipped();
        let mut bytes = [0u8; 4];
        match order {
            Endianness::Big => BigEndian::write_u32(&mut bytes, 0x01020304),
            Endianness::Little => LittleEndian::write_u32(&mut bytes, 0x01020304),
        }

        let mut reader = BinaryReader::with_endianness(&bytes, order);
        assert_eq!(reader.read_u32().unwrap(), 0x01020304);
    }

    #[test]
    fn test_swapped_nan_is_error() {
        let data = [0xFF; 4];
        let mut reader = BinaryReader::with_endianness(&data, Endianness::native().flipped());
        assert!(matches!(
            reader.read_f32(),
            Err(Error::NanAfterSwap { offset: 0 })
        ));

        let data = [0xFF; 8];
        let mut reader = BinaryReader::with_endianness(&data, Endianness::native().flipped());
        assert!(matches!(reader.read_f64(), Err(Error::NanAfterSwap { .. })));
    }

    #[test]
    fn test_swapped_float_value() {
        let order = Endianness::native().flipped();
        let mut bytes = [0u8; 4];
        match order {
            Endianness::Big => BigEndian::write_f32(&mut bytes, 1.5),
            Endianness::Little => LittleEndian::write_f32(&mut bytes, 1.5),
        }
        let mut reader = BinaryReader::with_endianness(&bytes, order);
        assert_eq!(reader.read_f32().unwrap(), 1.5);
    }

    #[test]
    fn test_align_to() {
        let data = [0u8; 16];
        let mut reader = BinaryReader::new(&data);
        reader.advance(3);
        reader.align_to(8).unwrap();
        assert_eq!(reader.position(), 8);
        reader.align_to(8).unwrap();
        assert_eq!(reader.position(), 8);
    }

    #[test]
    fn test_read_strings() {
        let data = b"\x05\0\0\0hellohi\0";
        let mut reader = BinaryReader::new(data);
        assert_eq!(reader.read_string().unwrap(), "hello");
        assert_eq!(reader.read_cstring().unwrap(), "hi");
    }

    #[test]
    fn test_read_counted_rejects_short_buffer() {
        let data = [0xFF, 0xFF, 0xFF, 0x7F, 0x01];
        let mut reader = BinaryReader::new(&data);
        assert!(matches!(
            reader.read_counted(|r| r.read_u8()),
            Err(Error::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_eof_error() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert!(reader.read_u32().is_err());
    }
}
