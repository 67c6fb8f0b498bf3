//! Texture sampling state.
//!
//! Filter and wrap modes are stored as their raw GL codes so that a document
//! with an unknown code still round-trips; consumers map them and decide what
//! to do with codes they don't know.

use std::io;

use crate::error::Result;
use crate::object::{GltfObject, ObjectBase, RootObject};
use crate::parser::Parser;
use crate::root::GltfRoot;
use crate::table::RootArray;
use crate::writer::Writer;

pub const NEAREST: usize = 9728;
pub const LINEAR: usize = 9729;
pub const NEAREST_MIPMAP_NEAREST: usize = 9984;
pub const LINEAR_MIPMAP_NEAREST: usize = 9985;
pub const NEAREST_MIPMAP_LINEAR: usize = 9986;
pub const LINEAR_MIPMAP_LINEAR: usize = 9987;

pub const CLAMP_TO_EDGE: usize = 33071;
pub const MIRRORED_REPEAT: usize = 33648;
pub const REPEAT: usize = 10497;

#[derive(Debug)]
pub struct Sampler {
    pub name: String,
    pub mag_filter: Option<usize>,
    pub min_filter: Option<usize>,
    pub wrap_s: usize,
    pub wrap_t: usize,
    pub base: ObjectBase,
}

impl Default for Sampler {
    fn default() -> Self {
        Sampler {
            name: String::new(),
            mag_filter: None,
            min_filter: None,
            wrap_s: REPEAT,
            wrap_t: REPEAT,
            base: ObjectBase::default(),
        }
    }
}

impl GltfObject for Sampler {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "name" => self.name = parser.parse_string()?,
            "magFilter" => self.mag_filter = Some(parser.parse_index()?),
            "minFilter" => self.min_filter = Some(parser.parse_index()?),
            "wrapS" => self.wrap_s = parser.parse_index()?,
            "wrapT" => self.wrap_t = parser.parse_index()?,
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("magFilter", &self.mag_filter)?;
        w.write_property("minFilter", &self.min_filter)?;
        w.write_property("wrapS", &self.wrap_s)?;
        w.write_property("wrapT", &self.wrap_t)?;
        w.write_property("name", &self.name)?;
        self.base.write_properties(w)
    }
}

impl RootObject for Sampler {
    const TYPE_NAME: &'static str = "Sampler";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn table(root: &GltfRoot) -> &RootArray<Self> {
        &root.samplers
    }

    fn table_mut(root: &mut GltfRoot) -> &mut RootArray<Self> {
        &mut root.samplers
    }
}
