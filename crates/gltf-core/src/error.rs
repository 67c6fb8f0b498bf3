//! Error type shared by the document model, the codec and the URI layer.

use std::io;

use thiserror::Error;

/// Errors that can occur when reading, writing or resolving glTF data.
#[derive(Error, Debug)]
pub enum GltfError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON: unexpected character, premature end of input.
    #[error("At line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Well-formed JSON that violates a schema constraint.
    #[error("At line {line}: invalid {what}: {message}")]
    Schema {
        line: usize,
        what: &'static str,
        message: String,
    },

    #[error("Invalid GLB: {0}")]
    InvalidGlb(String),

    #[error("This does not appear to be a glTF file")]
    NotGltf,

    #[error("Invalid URI {uri}: {message}")]
    InvalidUri { uri: String, message: String },

    #[error("Could not locate {0}")]
    NotFound(String),

    /// An accessor, buffer view and buffer disagree about byte ranges.
    #[error("Accessor range error: {0}")]
    AccessorRange(String),

    /// A buffer view does not fit in its buffer.
    #[error("Byte range error: {0}")]
    ByteRange(String),

    #[error("Dangling reference to {0}")]
    DanglingReference(&'static str),

    /// One or more external resources failed to load.
    #[error("{failed} external resource(s) failed to load")]
    Externals { failed: usize },
}

pub type Result<T> = std::result::Result<T, GltfError>;
