//! Resource envelope detection and parsing.

use otrkit_archive::File;
use otrkit_common::{
    hash, BinaryReader, Endianness, ResourceFormat, ResourceInitData, RESOURCE_HEADER_SIZE,
};

use crate::xml::XmlDocument;
use crate::{DecodeError, Result};

/// Where the payload of a resource lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Binary payload starting at `offset` in the file buffer.
    Binary { offset: usize },
    /// Parsed XML document.
    Xml(XmlDocument),
}

/// A decoded envelope together with its payload.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub init: ResourceInitData,
    pub payload: Payload,
}

impl Envelope {
    /// Parse the envelope of a file.
    ///
    /// A file carrying pre-declared init data is headerless. Otherwise a
    /// leading `<` selects XML and anything else must start with the binary
    /// header.
    pub fn parse(file: &File) -> Result<Self> {
        if let Some(init) = file.init_data() {
            return Ok(Self {
                init: init.clone(),
                payload: Payload::Binary { offset: 0 },
            });
        }

        let data = file.data();
        if looks_like_xml(data) {
            return Self::parse_xml(file.path(), data);
        }

        let mut reader = BinaryReader::new(data);
        let init = ResourceInitData::read_header(file.path(), &mut reader)?;
        Ok(Self {
            init,
            payload: Payload::Binary {
                offset: RESOURCE_HEADER_SIZE,
            },
        })
    }

    fn parse_xml(path: &str, data: &[u8]) -> Result<Self> {
        let document = XmlDocument::parse(strip_bom(data))?;
        let root = document.root();

        let resource_type = otrkit_common::ResourceType::from_xml_name(&root.name)
            .ok_or_else(|| DecodeError::UnknownRoot(root.name.clone()))?;
        let resource_version = root.int_or("Version", 0u32)?;

        let path = hash::normalize_path(path).into_owned();
        let init = ResourceInitData {
            id: hash::content_hash(&path),
            path,
            resource_type,
            resource_version,
            format: ResourceFormat::Xml,
            byte_order: Endianness::native(),
            is_custom: root.flag("Custom")?,
            has_header: false,
        };

        Ok(Self {
            init,
            payload: Payload::Xml(document),
        })
    }

    /// A reader over the binary payload, in the envelope's byte order.
    pub fn binary_reader<'a>(&self, data: &'a [u8]) -> Result<BinaryReader<'a>> {
        match self.payload {
            Payload::Binary { offset } => {
                let mut reader = BinaryReader::with_endianness(data, self.init.byte_order);
                reader.seek(offset);
                Ok(reader)
            }
            Payload::Xml(_) => Err(DecodeError::WrongPayload {
                expected: ResourceFormat::Binary,
            }),
        }
    }
}

fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data)
}

fn looks_like_xml(data: &[u8]) -> bool {
    strip_bom(data)
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'<')
}

#[cfg(test)]
mod tests {
    use super::*;
    use otrkit_common::{BinaryWriter, ResourceType};

    #[test]
    fn test_binary_envelope() {
        let init = ResourceInitData {
            path: "objects/a".into(),
            id: 42,
            resource_type: ResourceType::Blob,
            resource_version: 0,
            format: ResourceFormat::Binary,
            byte_order: Endianness::Big,
            is_custom: false,
            has_header: true,
        };
        let mut writer = BinaryWriter::new(Endianness::Big);
        init.write_header(&mut writer);
        writer.write_u32(0x01020304);

        let file = File::detached("objects/a", writer.into_inner());
        let envelope = Envelope::parse(&file).unwrap();
        assert_eq!(envelope.init, init);
        assert_eq!(envelope.payload, Payload::Binary { offset: 0x40 });

        let mut reader = envelope.binary_reader(file.data()).unwrap();
        assert_eq!(reader.read_u32().unwrap(), 0x01020304);
    }

    #[test]
    fn test_xml_envelope() {
        let file = File::detached(
            "\\objects\\b",
            b"\xEF\xBB\xBF  <DisplayList Version=\"0\"><EndDisplayList/></DisplayList>".to_vec(),
        );
        let envelope = Envelope::parse(&file).unwrap();
        assert_eq!(envelope.init.resource_type, ResourceType::DisplayList);
        assert_eq!(envelope.init.format, ResourceFormat::Xml);
        assert_eq!(envelope.init.path, "objects/b");
        assert_eq!(envelope.init.id, hash::content_hash("objects/b"));
        assert!(matches!(envelope.payload, Payload::Xml(_)));
        assert!(envelope.binary_reader(file.data()).is_err());
    }

    #[test]
    fn test_unknown_xml_root() {
        let file = File::detached("x", b"<Banana/>".to_vec());
        assert!(matches!(
            Envelope::parse(&file),
            Err(DecodeError::UnknownRoot(name)) if name == "Banana"
        ));
    }

    #[test]
    fn test_headerless_hint() {
        let hint = ResourceInitData::headerless("shaders/a.frag", ResourceType::Shader, 0);
        let file = File::detached("shaders/a.frag", b"<not xml>".to_vec()).with_init_data(Some(hint.clone()));
        let envelope = Envelope::parse(&file).unwrap();
        assert_eq!(envelope.init, hint);
        assert_eq!(envelope.payload, Payload::Binary { offset: 0 });
    }

    #[test]
    fn test_truncated_binary() {
        let file = File::detached("x", vec![1, 0, 0, 0, b'O']);
        assert!(matches!(Envelope::parse(&file), Err(DecodeError::Common(_))));
    }
}
