//! Skins for vertex skinning.

use std::io;

use crate::error::Result;
use crate::object::{plural, GltfObject, ObjectBase, RootObject};
use crate::parser::Parser;
use crate::root::GltfRoot;
use crate::schema::{Accessor, Node};
use crate::table::{Handle, RootArray};
use crate::writer::Writer;

#[derive(Debug, Default)]
pub struct Skin {
    pub name: String,
    /// MAT4 accessor with one inverse bind matrix per joint. Identity
    /// matrices when absent.
    pub inverse_bind_matrices: Option<Handle<Accessor>>,
    pub skeleton: Option<Handle<Node>>,
    pub joints: Vec<Handle<Node>>,
    pub base: ObjectBase,
}

impl GltfObject for Skin {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "name" => self.name = parser.parse_string()?,
            "inverseBindMatrices" => self.inverse_bind_matrices = Some(parser.parse_ref()?),
            "joints" => self.joints = parser.parse_ref_array()?,
            "skeleton" => self.skeleton = Some(parser.parse_ref()?),
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("inverseBindMatrices", &self.inverse_bind_matrices)?;
        w.write_property("joints", &self.joints)?;
        w.write_property("skeleton", &self.skeleton)?;
        w.write_property("name", &self.name)?;
        self.base.write_properties(w)
    }
}

impl RootObject for Skin {
    const TYPE_NAME: &'static str = "Skin";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn table(root: &GltfRoot) -> &RootArray<Self> {
        &root.skins
    }

    fn table_mut(root: &mut GltfRoot) -> &mut RootArray<Self> {
        &mut root.skins
    }

    fn summary(&self) -> String {
        plural(self.joints.len(), "joint")
    }
}
