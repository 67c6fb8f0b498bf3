//! Typed glTF 2.0 schema objects.

mod accessor;
mod animation;
mod asset;
mod buffer;
mod buffer_view;
mod camera;
mod image;
mod material;
mod mesh;
mod node;
pub mod sampler;
mod scene;
mod skin;
mod texture;

pub use accessor::{Accessor, AccessorType, ComponentType, Sparse, SparseIndices, SparseValues};
pub use animation::{Animation, AnimationSampler, Channel, ChannelTarget};
pub use asset::{check_version, Asset};
pub use buffer::Buffer;
pub use buffer_view::{BufferTarget, BufferView};
pub use camera::{Camera, Orthographic, Perspective};
pub use image::Image;
pub use material::{AlphaMode, Material, PbrMetallicRoughness, TextureInfo};
pub use mesh::{Mesh, Primitive, PrimitiveMode};
pub use node::Node;
pub use sampler::Sampler;
pub use scene::Scene;
pub use skin::Skin;
pub use texture::Texture;
