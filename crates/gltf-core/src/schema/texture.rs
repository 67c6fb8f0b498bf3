//! Textures: an image plus sampling state.

use std::io;

use crate::error::Result;
use crate::object::{GltfObject, ObjectBase, RootObject};
use crate::parser::Parser;
use crate::root::GltfRoot;
use crate::schema::{Image, Sampler};
use crate::table::{Handle, RootArray};
use crate::writer::Writer;

#[derive(Debug, Default)]
pub struct Texture {
    pub name: String,
    pub sampler: Option<Handle<Sampler>>,
    pub source: Option<Handle<Image>>,
    pub base: ObjectBase,
}

impl GltfObject for Texture {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "name" => self.name = parser.parse_string()?,
            "sampler" => self.sampler = Some(parser.parse_ref()?),
            "source" => self.source = Some(parser.parse_ref()?),
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("sampler", &self.sampler)?;
        w.write_property("source", &self.source)?;
        w.write_property("name", &self.name)?;
        self.base.write_properties(w)
    }
}

impl RootObject for Texture {
    const TYPE_NAME: &'static str = "Texture";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn table(root: &GltfRoot) -> &RootArray<Self> {
        &root.textures
    }

    fn table_mut(root: &mut GltfRoot) -> &mut RootArray<Self> {
        &mut root.textures
    }

    fn summary(&self) -> String {
        match &self.source {
            Some(source) => format!("from <Image #{}>", source.index()),
            None => String::new(),
        }
    }
}
