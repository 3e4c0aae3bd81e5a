//! Decoded resource types.
//!
//! Each type provides one `read_v*` constructor per binary schema version and,
//! where an XML form exists, a `from_xml_v*` constructor.

mod animation;
mod array;
mod collision;
mod cutscene;
mod display_list;
mod light;
mod material;
mod matrix;
mod path;
mod raw;
mod scene;
mod skeleton;
mod text;
mod texture;
mod vertex;

pub use animation::{Animation, CurveKey, PlayerAnimation, RotationIndex};
pub use array::{Array, ArrayData, ArrayType, ScalarType};
pub use collision::{CollisionHeader, CollisionPoly, SurfaceType, WaterBox};
pub use cutscene::Cutscene;
pub use display_list::{Commands, DisplayList};
pub use light::{DirectionalLight, Light};
pub use material::{Material, MaterialParam};
pub use matrix::Matrix;
pub use path::Path;
pub use raw::{Blob, Font, Json, Shader};
pub use scene::{ActorEntry, Scene, SceneCommand, TransitionActorEntry};
pub use skeleton::{LimbType, Skeleton, SkeletonLimb, SkeletonType};
pub use text::{MessageEntry, Text};
pub use texture::{Texture, TextureType, TEX_FLAG_LOAD_AS_RAW};
pub use vertex::{Vertex, Vtx};
