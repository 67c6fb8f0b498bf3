//! Textures, sampler state and the texture pool.
//!
//! Decoded images are shared: the [`TexturePool`] caches images loaded from
//! disk by full path, so documents referencing the same file share one copy.
//! A [`Texture`] pairs an image with its own sampler state.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::RgbaImage;
use log::debug;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterType {
    /// Left to the renderer.
    #[default]
    Default,
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
    Clamp,
    Mirror,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SamplerState {
    pub minfilter: FilterType,
    pub magfilter: FilterType,
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
}

#[derive(Debug, Clone, Default)]
pub struct Texture {
    pub name: String,
    /// Where the image was loaded from, for pooled textures.
    pub fullpath: Option<PathBuf>,
    /// The file name as written in the document.
    pub filename: Option<PathBuf>,
    pub image: Option<Rc<RgbaImage>>,
    pub sampler: SamplerState,
}

impl Texture {
    pub fn has_fullpath(&self) -> bool {
        self.fullpath.is_some()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|image| image.dimensions())
    }
}

/// Decodes an image held in memory; the format is sniffed from its bytes.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// A cache of decoded images keyed by full path.
#[derive(Debug, Default)]
pub struct TexturePool {
    images: RefCell<HashMap<PathBuf, Rc<RgbaImage>>>,
}

impl TexturePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached image for `path`, loading it on first use. Failed
    /// loads are not cached.
    pub fn load(&self, path: &Path) -> Result<Rc<RgbaImage>> {
        if let Some(image) = self.images.borrow().get(path) {
            return Ok(Rc::clone(image));
        }
        debug!("Loading texture {}", path.display());
        let image = Rc::new(image::open(path)?.to_rgba8());
        self.images
            .borrow_mut()
            .insert(path.to_path_buf(), Rc::clone(&image));
        Ok(image)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.images.borrow().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.images.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.borrow().is_empty()
    }

    /// Drops images no texture refers to any more.
    pub fn release_unused(&self) -> usize {
        let mut images = self.images.borrow_mut();
        let before = images.len();
        images.retain(|_, image| Rc::strong_count(image) > 1);
        before - images.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &Path) {
        let image = RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]));
        image.save(path).unwrap();
    }

    #[test]
    fn test_pool_shares_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        write_png(&path);

        let pool = TexturePool::new();
        let first = pool.load(&path).unwrap();
        let second = pool.load(&path).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.dimensions(), (2, 3));
        assert_eq!(pool.len(), 1);

        drop(first);
        drop(second);
        assert_eq!(pool.release_unused(), 1);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_pool_does_not_cache_failures() {
        let dir = tempfile::tempdir().unwrap();
        let pool = TexturePool::new();
        assert!(pool.load(&dir.path().join("missing.png")).is_err());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_decode_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.png");
        write_png(&path);
        let bytes = std::fs::read(&path).unwrap();
        let image = decode_image(&bytes).unwrap();
        assert_eq!(image.get_pixel(1, 2).0, [10, 20, 30, 255]);
        assert!(decode_image(b"not an image").is_err());
    }
}
