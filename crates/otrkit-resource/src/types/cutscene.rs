//! Cutscene scripts.

use otrkit_common::BinaryReader;
use zerocopy::IntoBytes;

use crate::Result;

/// A cutscene as the raw command words the interpreter walks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cutscene {
    pub commands: Vec<u32>,
}

impl Cutscene {
    /// Binary V0: word count then words.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            commands: reader.read_counted(|r| r.read_u32())?,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.commands.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otrkit_common::Endianness;

    #[test]
    fn test_read_v0() {
        let bytes = [0, 0, 0, 2, 0, 0, 0, 1, 0xFF, 0xFF, 0xFF, 0xFF];
        let cutscene =
            Cutscene::read_v0(&mut BinaryReader::with_endianness(&bytes, Endianness::Big)).unwrap();
        assert_eq!(cutscene.commands, vec![1, 0xFFFF_FFFF]);
    }
}
