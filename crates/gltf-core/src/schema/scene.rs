//! Scenes: sets of root nodes.

use std::io;

use crate::error::Result;
use crate::object::{plural, GltfObject, ObjectBase, RootObject};
use crate::parser::Parser;
use crate::root::GltfRoot;
use crate::schema::Node;
use crate::table::{Handle, RootArray};
use crate::writer::Writer;

#[derive(Debug, Default)]
pub struct Scene {
    pub name: String,
    pub nodes: Vec<Handle<Node>>,
    pub base: ObjectBase,
}

impl GltfObject for Scene {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "name" => self.name = parser.parse_string()?,
            "nodes" => self.nodes = parser.parse_ref_array()?,
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("nodes", &self.nodes)?;
        w.write_property("name", &self.name)?;
        self.base.write_properties(w)
    }
}

impl RootObject for Scene {
    const TYPE_NAME: &'static str = "Scene";
    // Scenes are the roots of reachability; an unreferenced scene is still
    // part of the document.
    const COLLECTABLE: bool = false;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn table(root: &GltfRoot) -> &RootArray<Self> {
        &root.scenes
    }

    fn table_mut(root: &mut GltfRoot) -> &mut RootArray<Self> {
        &mut root.scenes
    }

    fn summary(&self) -> String {
        plural(self.nodes.len(), "node")
    }
}
