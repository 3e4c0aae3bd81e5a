//! Decoder dispatch by resource type, payload format and schema version.

use std::sync::Arc;

use otrkit_archive::File;
use otrkit_common::{BinaryReader, ResourceFormat, ResourceInitData, ResourceType};
use rustc_hash::FxHashMap;

use crate::envelope::{Envelope, Payload};
use crate::resource::{Resource, ResourceData};
use crate::types::{
    Animation, Array, Blob, CollisionHeader, Cutscene, DisplayList, Font, Json, Light, Material,
    Matrix, Path, PlayerAnimation, Scene, Shader, Skeleton, SkeletonLimb, Text, Texture, Vertex,
};
use crate::xml::XmlNode;
use crate::{DecodeError, Result};

/// Decoder for a binary payload. The reader is positioned at the payload.
pub type BinaryFactory = fn(&ResourceInitData, &mut BinaryReader<'_>) -> Result<ResourceData>;

/// Decoder for an XML payload, given the document root.
pub type XmlFactory = fn(&ResourceInitData, &XmlNode) -> Result<ResourceData>;

#[derive(Clone, Copy)]
enum Factory {
    Binary(BinaryFactory),
    Xml(XmlFactory),
}

type FactoryKey = (ResourceType, ResourceFormat, u32);

/// Table of decoders.
///
/// Built once before the manager starts and shared read-only afterwards.
#[derive(Clone, Default)]
pub struct FactoryRegistry {
    factories: FxHashMap<FactoryKey, Factory>,
}

macro_rules! binary {
    ($registry:ident, $variant:ident, $version:expr, $read:path) => {
        $registry.register_binary(ResourceType::$variant, $version, |_, reader| {
            Ok(ResourceData::$variant($read(reader)?))
        })
    };
}

impl FactoryRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in decoder.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        binary!(registry, DisplayList, 0, DisplayList::read_v0);
        binary!(registry, Texture, 0, Texture::read_v0);
        binary!(registry, Texture, 1, Texture::read_v1);
        binary!(registry, Vertex, 0, Vertex::read_v0);
        binary!(registry, Matrix, 0, Matrix::read_v0);
        binary!(registry, Array, 0, Array::read_v0);
        binary!(registry, Light, 0, Light::read_v0);
        binary!(registry, Scene, 0, Scene::read_v0);
        binary!(registry, Skeleton, 0, Skeleton::read_v0);
        binary!(registry, SkeletonLimb, 0, SkeletonLimb::read_v0);
        binary!(registry, Animation, 0, Animation::read_v0);
        binary!(registry, PlayerAnimation, 0, PlayerAnimation::read_v0);
        binary!(registry, Cutscene, 0, Cutscene::read_v0);
        binary!(registry, Path, 0, Path::read_v0);
        binary!(registry, Text, 0, Text::read_v0);
        binary!(registry, Blob, 0, Blob::read_v0);
        binary!(registry, Json, 0, Json::read_v0);
        binary!(registry, Shader, 0, Shader::read_v0);
        binary!(registry, Font, 0, Font::read_v0);
        binary!(registry, Material, 0, Material::read_v0);
        binary!(registry, CollisionHeader, 0, CollisionHeader::read_v0);

        registry.register_xml(ResourceType::DisplayList, 0, |_, root| {
            Ok(ResourceData::DisplayList(DisplayList::from_xml_v0(root)?))
        });
        registry.register_xml(ResourceType::Vertex, 0, |_, root| {
            Ok(ResourceData::Vertex(Vertex::from_xml_v0(root)?))
        });

        registry
    }

    /// Register (or replace) a binary decoder.
    pub fn register_binary(
        &mut self,
        resource_type: ResourceType,
        version: u32,
        factory: BinaryFactory,
    ) -> &mut Self {
        self.factories.insert(
            (resource_type, ResourceFormat::Binary, version),
            Factory::Binary(factory),
        );
        self
    }

    /// Register (or replace) an XML decoder.
    pub fn register_xml(
        &mut self,
        resource_type: ResourceType,
        version: u32,
        factory: XmlFactory,
    ) -> &mut Self {
        self.factories.insert(
            (resource_type, ResourceFormat::Xml, version),
            Factory::Xml(factory),
        );
        self
    }

    /// Whether a decoder exists for this exact combination.
    pub fn supports(&self, resource_type: ResourceType, format: ResourceFormat, version: u32) -> bool {
        self.factories
            .contains_key(&(resource_type, format, version))
    }

    /// Number of registered decoders.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Parse the envelope of `file` and run the matching decoder.
    pub fn decode(&self, file: &Arc<File>) -> Result<Resource> {
        let envelope = Envelope::parse(file)?;
        let init = &envelope.init;
        let key = (init.resource_type, init.format, init.resource_version);

        let factory = self
            .factories
            .get(&key)
            .copied()
            .ok_or_else(|| self.unsupported(init))?;

        let data = match (factory, &envelope.payload) {
            (Factory::Binary(decode), Payload::Binary { .. }) => {
                let mut reader = envelope.binary_reader(file.data())?;
                decode(init, &mut reader)?
            }
            (Factory::Xml(decode), Payload::Xml(document)) => decode(init, document.root())?,
            (_, _) => {
                return Err(DecodeError::WrongPayload {
                    expected: init.format,
                })
            }
        };

        tracing::trace!(
            path = %init.path,
            resource_type = %init.resource_type,
            version = init.resource_version,
            "decoded resource"
        );
        Ok(Resource::new(envelope.init, file, data))
    }

    fn unsupported(&self, init: &ResourceInitData) -> DecodeError {
        let known_type = self
            .factories
            .keys()
            .any(|(ty, format, _)| *ty == init.resource_type && *format == init.format);

        if known_type {
            DecodeError::UnsupportedVersion {
                resource_type: init.resource_type,
                format: init.format,
                version: init.resource_version,
            }
        } else {
            DecodeError::UnsupportedType {
                resource_type: init.resource_type,
                format: init.format,
            }
        }
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("factories", &self.factories.len())
            .finish()
    }
}
