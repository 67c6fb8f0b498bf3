//! Error type for the loader's fallible entry points.
//!
//! Conversion itself never fails: problems are logged and a placeholder is
//! substituted. Errors surface only from reading documents and images.

use std::io;

use gltf_core::GltfError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Gltf(#[from] GltfError),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, LoaderError>;
