//! Decoded resources.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use otrkit_archive::File;
use otrkit_common::{ResourceInitData, ResourceType};

use crate::types::{
    Animation, Array, Blob, CollisionHeader, Cutscene, DisplayList, Font, Json, Light, Material,
    Matrix, Path, PlayerAnimation, Scene, Shader, Skeleton, SkeletonLimb, Text, Texture, Vertex,
};

/// The decoded payload of a resource, one variant per type.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceData {
    DisplayList(DisplayList),
    Texture(Texture),
    Vertex(Vertex),
    Matrix(Matrix),
    Array(Array),
    Light(Light),
    Scene(Scene),
    Skeleton(Skeleton),
    SkeletonLimb(SkeletonLimb),
    Animation(Animation),
    PlayerAnimation(PlayerAnimation),
    Cutscene(Cutscene),
    Path(Path),
    Text(Text),
    Blob(Blob),
    Json(Json),
    Shader(Shader),
    Font(Font),
    Material(Material),
    CollisionHeader(CollisionHeader),
}

macro_rules! accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        #[doc = concat!("The payload if this is a `", stringify!($variant), "`.")]
        pub fn $name(&self) -> Option<&$ty> {
            match self {
                Self::$variant(value) => Some(value),
                _ => None,
            }
        }
    };
}

impl ResourceData {
    /// The type tag matching this payload.
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::DisplayList(_) => ResourceType::DisplayList,
            Self::Texture(_) => ResourceType::Texture,
            Self::Vertex(_) => ResourceType::Vertex,
            Self::Matrix(_) => ResourceType::Matrix,
            Self::Array(_) => ResourceType::Array,
            Self::Light(_) => ResourceType::Light,
            Self::Scene(_) => ResourceType::Scene,
            Self::Skeleton(_) => ResourceType::Skeleton,
            Self::SkeletonLimb(_) => ResourceType::SkeletonLimb,
            Self::Animation(_) => ResourceType::Animation,
            Self::PlayerAnimation(_) => ResourceType::PlayerAnimation,
            Self::Cutscene(_) => ResourceType::Cutscene,
            Self::Path(_) => ResourceType::Path,
            Self::Text(_) => ResourceType::Text,
            Self::Blob(_) => ResourceType::Blob,
            Self::Json(_) => ResourceType::Json,
            Self::Shader(_) => ResourceType::Shader,
            Self::Font(_) => ResourceType::Font,
            Self::Material(_) => ResourceType::Material,
            Self::CollisionHeader(_) => ResourceType::CollisionHeader,
        }
    }

    /// Byte view of the primary payload.
    ///
    /// Types without a flat in-memory form (scenes, skeletons, text and the
    /// like) return an empty slice.
    pub fn raw_data(&self) -> &[u8] {
        match self {
            Self::DisplayList(list) => list.as_bytes(),
            Self::Texture(texture) => &texture.data,
            Self::Vertex(vertex) => vertex.as_bytes(),
            Self::Matrix(matrix) => matrix.as_bytes(),
            Self::Array(array) => array.as_bytes(),
            Self::Light(light) => light.as_bytes(),
            Self::PlayerAnimation(animation) => animation.as_bytes(),
            Self::Cutscene(cutscene) => cutscene.as_bytes(),
            Self::Blob(blob) => &blob.data,
            Self::Json(json) => &json.source,
            Self::Shader(shader) => shader.source.as_bytes(),
            Self::Font(font) => &font.data,
            Self::Scene(_)
            | Self::Skeleton(_)
            | Self::SkeletonLimb(_)
            | Self::Animation(_)
            | Self::Path(_)
            | Self::Text(_)
            | Self::Material(_)
            | Self::CollisionHeader(_) => &[],
        }
    }

    accessor!(as_display_list, DisplayList, DisplayList);
    accessor!(as_texture, Texture, Texture);
    accessor!(as_vertex, Vertex, Vertex);
    accessor!(as_matrix, Matrix, Matrix);
    accessor!(as_array, Array, Array);
    accessor!(as_light, Light, Light);
    accessor!(as_scene, Scene, Scene);
    accessor!(as_skeleton, Skeleton, Skeleton);
    accessor!(as_skeleton_limb, SkeletonLimb, SkeletonLimb);
    accessor!(as_animation, Animation, Animation);
    accessor!(as_player_animation, PlayerAnimation, PlayerAnimation);
    accessor!(as_cutscene, Cutscene, Cutscene);
    accessor!(as_path, Path, Path);
    accessor!(as_text, Text, Text);
    accessor!(as_blob, Blob, Blob);
    accessor!(as_json, Json, Json);
    accessor!(as_shader, Shader, Shader);
    accessor!(as_font, Font, Font);
    accessor!(as_material, Material, Material);
    accessor!(as_collision_header, CollisionHeader, CollisionHeader);
}

/// A decoded resource.
///
/// Immutable once published. The only mutable state is the dirty flag, which
/// tells the manager to re-decode on the next request.
#[derive(Debug)]
pub struct Resource {
    init: ResourceInitData,
    file: Weak<File>,
    dirty: AtomicBool,
    data: ResourceData,
}

impl Resource {
    pub fn new(init: ResourceInitData, file: &Arc<File>, data: ResourceData) -> Self {
        Self {
            init,
            file: Arc::downgrade(file),
            dirty: AtomicBool::new(false),
            data,
        }
    }

    /// The envelope this resource was decoded from.
    pub fn init_data(&self) -> &ResourceInitData {
        &self.init
    }

    pub fn path(&self) -> &str {
        &self.init.path
    }

    pub fn resource_type(&self) -> ResourceType {
        self.init.resource_type
    }

    /// The source file, while the file cache still holds it.
    pub fn file(&self) -> Option<Arc<File>> {
        self.file.upgrade()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Flag the resource for re-decoding on the next request.
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    pub fn data(&self) -> &ResourceData {
        &self.data
    }

    /// Byte view of the primary payload.
    pub fn raw_data(&self) -> &[u8] {
        self.data.raw_data()
    }

    /// Size of [`raw_data`](Self::raw_data) in bytes.
    pub fn pointer_size(&self) -> usize {
        self.raw_data().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_flag_and_weak_file() {
        let file = Arc::new(File::detached("blobs/a", b"x".to_vec()));
        let init = ResourceInitData::headerless("blobs/a", ResourceType::Blob, 0);
        let resource = Resource::new(
            init,
            &file,
            ResourceData::Blob(Blob {
                data: vec![1, 2, 3],
            }),
        );

        assert!(!resource.is_dirty());
        resource.mark_dirty();
        assert!(resource.is_dirty());

        assert_eq!(resource.pointer_size(), 3);
        assert_eq!(resource.data().as_blob().map(|b| b.data.len()), Some(3));
        assert!(resource.data().as_texture().is_none());

        assert!(resource.file().is_some());
        drop(file);
        assert!(resource.file().is_none());
    }

    #[test]
    fn test_structured_types_have_no_raw_view() {
        let data = ResourceData::Text(Text::default());
        assert!(data.raw_data().is_empty());
        assert_eq!(data.resource_type(), ResourceType::Text);
    }
}
