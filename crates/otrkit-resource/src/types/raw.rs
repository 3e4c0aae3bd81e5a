//! Opaque and text payloads: blobs, JSON documents, shader sources and fonts.

use otrkit_common::BinaryReader;

use crate::Result;

/// Raw bytes with a length prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Binary V0: size then bytes.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let size = reader.read_u32()? as usize;
        Ok(Self {
            data: reader.read_bytes(size)?.to_vec(),
        })
    }
}

/// A parsed JSON document that keeps its source bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Json {
    pub value: serde_json::Value,
    pub source: Vec<u8>,
}

impl Json {
    /// V0: the rest of the payload is the document.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let source = reader.remaining_bytes();
        let value = serde_json::from_slice(source)?;
        Ok(Self {
            value,
            source: source.to_vec(),
        })
    }
}

/// Shader source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shader {
    pub source: String,
}

impl Shader {
    /// V0: the rest of the payload is UTF-8 source.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            source: std::str::from_utf8(reader.remaining_bytes())?.to_owned(),
        })
    }
}

/// Raw font file data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Font {
    pub data: Vec<u8>,
}

impl Font {
    /// V0: the rest of the payload is the font file.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            data: reader.remaining_bytes().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecodeError;

    #[test]
    fn test_blob() {
        let bytes = [3u8, 0, 0, 0, 7, 8, 9, 10];
        let blob = Blob::read_v0(&mut BinaryReader::new(&bytes)).unwrap();
        assert_eq!(blob.data, vec![7, 8, 9]);

        let short = [9u8, 0, 0, 0, 1];
        assert!(Blob::read_v0(&mut BinaryReader::new(&short)).is_err());
    }

    #[test]
    fn test_json() {
        let bytes = br#"{"speed": 2, "name": "epona"}"#;
        let json = Json::read_v0(&mut BinaryReader::new(bytes)).unwrap();
        assert_eq!(json.value["name"], "epona");
        assert_eq!(json.source, bytes.to_vec());

        let bad = b"{nope";
        assert!(matches!(
            Json::read_v0(&mut BinaryReader::new(bad)),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_shader_and_font() {
        let shader = Shader::read_v0(&mut BinaryReader::new(b"void main() {}")).unwrap();
        assert_eq!(shader.source, "void main() {}");
        assert!(Shader::read_v0(&mut BinaryReader::new(&[0xFF, 0xFE])).is_err());

        let font = Font::read_v0(&mut BinaryReader::new(&[0, 1, 0, 0])).unwrap();
        assert_eq!(font.data.len(), 4);
    }
}
