//! glTF Core Library
//!
//! In-memory model of a glTF 2.0 document with a streaming JSON parser, a
//! writer, GLB container support and URI resolution for external and
//! embedded resources.
//!
//! ```
//! use gltf_core::{GltfRoot, WriteOptions};
//!
//! let mut root = GltfRoot::new();
//! root.read(&mut r#"{"asset":{"version":"2.0"},"nodes":[{"name":"a"}]}"#.as_bytes())?;
//! assert_eq!(root.nodes.len(), 1);
//!
//! let mut out = Vec::new();
//! root.write_gltf(&mut out, WriteOptions::compact())?;
//! # Ok::<(), gltf_core::GltfError>(())
//! ```

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod glb;
pub mod object;
pub mod parser;
pub mod root;
pub mod schema;
pub mod table;
pub mod update_seq;
pub mod uri;
pub mod value;
pub mod writer;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{GltfError, Result};
pub use object::{describe, GltfObject, ObjectBase, RootObject};
pub use parser::Parser;
pub use root::GltfRoot;
pub use schema::*;
pub use table::{Handle, RootArray, WeakHandle};
pub use update_seq::UpdateSeq;
pub use uri::{SearchPath, UriReference};
pub use value::{Dictionary, Value, ValueType};
pub use writer::{WriteJson, WriteOptions, Writer};
