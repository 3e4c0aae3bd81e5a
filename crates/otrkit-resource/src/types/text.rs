//! Message tables.

use otrkit_common::BinaryReader;

use crate::Result;

/// One message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
    pub id: u16,
    pub text_box_type: u8,
    pub text_box_y_pos: u8,
    pub message: String,
}

/// A message table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    pub messages: Vec<MessageEntry>,
}

impl Text {
    /// Binary V0.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let messages = reader.read_counted(|r| {
            Ok(MessageEntry {
                id: r.read_u16()?,
                text_box_type: r.read_u8()?,
                text_box_y_pos: r.read_u8()?,
                message: r.read_string()?.to_owned(),
            })
        })?;
        Ok(Self { messages })
    }

    /// Find a message by id.
    pub fn message(&self, id: u16) -> Option<&MessageEntry> {
        self.messages.iter().find(|entry| entry.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otrkit_common::{BinaryWriter, Endianness};

    #[test]
    fn test_read_v0() {
        let mut writer = BinaryWriter::new(Endianness::Big);
        writer
            .write_u32(1)
            .write_u16(0x1000)
            .write_u8(0)
            .write_u8(1)
            .write_string("Hey! Listen!");
        let bytes = writer.into_inner();

        let text = Text::read_v0(&mut BinaryReader::with_endianness(&bytes, Endianness::Big)).unwrap();
        assert_eq!(text.message(0x1000).unwrap().message, "Hey! Listen!");
        assert!(text.message(1).is_none());
    }
}
