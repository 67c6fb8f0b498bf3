//! glTF Scene Loader
//!
//! Converts a [`gltf_core::GltfRoot`] into a renderable scene graph and keeps
//! the conversion up to date as the document changes. Only entities whose
//! sources (or anything they depend on) were modified since the previous
//! update are rebuilt.
//!
//! ```
//! use gltf_core::GltfRoot;
//! use gltf_loader::Loader;
//!
//! let mut root = GltfRoot::new();
//! root.read(&mut r#"{"asset":{"version":"2.0"},"scenes":[{"nodes":[0]}],"nodes":[{"name":"a"}]}"#.as_bytes())?;
//!
//! let mut loader = Loader::default();
//! assert!(loader.update_all(&root));
//! assert_eq!(loader.root_node().child(0).unwrap().name(), "a");
//!
//! // Nothing changed, nothing rebuilt.
//! assert!(!loader.update_all(&root));
//! # Ok::<(), gltf_core::GltfError>(())
//! ```

// =============================================================================
// Modules
// =============================================================================

pub mod callbacks;
pub mod coordsys;
pub mod dependencies;
pub mod error;
pub mod geom;
pub mod loader;
pub mod material;
pub mod scene;
pub mod state;
pub mod texture;

// =============================================================================
// Re-exports
// =============================================================================

pub use callbacks::{LoaderCallbacks, Next};
pub use coordsys::CoordinateSystem;
pub use error::{LoaderError, Result};
pub use geom::{Column, Contents, Geom, GeomPrimitive, IndexBuffer, NumericType, PrimitiveType, VertexData, VertexFormat};
pub use loader::{check_accessor, load_accessor, load_file, ConversionStats, Loader, LoaderOptions};
pub use material::Material;
pub use scene::{GeomEntry, SceneNode};
pub use state::{RenderState, StageMode, TextureBinding, TextureStage, TransparencyMode};
pub use texture::{FilterType, SamplerState, Texture, TexturePool, WrapMode};
