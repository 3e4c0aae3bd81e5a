//! Byte order marker.

use crate::Error;

/// Byte order of multi-byte fields in a resource payload.
///
/// The on-disk marker is a single byte at the start of every binary envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Endianness {
    /// Most significant byte first.
    Big = 0,
    /// Least significant byte first.
    Little = 1,
}

impl Endianness {
    /// The byte order of the host.
    #[inline]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }

    /// Whether data in this order must be swapped on the host.
    #[inline]
    pub const fn is_swapped(self) -> bool {
        !matches!(
            (self, Self::native()),
            (Self::Big, Self::Big) | (Self::Little, Self::Little)
        )
    }

    /// The opposite byte order.
    #[inline]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Big => Self::Little,
            Self::Little => Self::Big,
        }
    }
}

impl Default for Endianness {
    fn default() -> Self {
        Self::native()
    }
}

impl TryFrom<u8> for Endianness {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Big),
            1 => Ok(Self::Little),
            other => Err(Error::InvalidEndianness(other)),
        }
    }
}
