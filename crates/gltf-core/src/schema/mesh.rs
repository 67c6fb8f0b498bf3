//! Meshes and their primitives.

use std::io;

use crate::error::Result;
use crate::object::{plural, GltfObject, ObjectBase, RootObject};
use crate::parser::Parser;
use crate::root::GltfRoot;
use crate::schema::{Accessor, Material};
use crate::table::{Handle, RootArray};
use crate::value::Dictionary;
use crate::writer::Writer;

/// Topology of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveMode {
    pub fn from_gl(code: usize) -> Option<Self> {
        match code {
            0 => Some(PrimitiveMode::Points),
            1 => Some(PrimitiveMode::Lines),
            2 => Some(PrimitiveMode::LineLoop),
            3 => Some(PrimitiveMode::LineStrip),
            4 => Some(PrimitiveMode::Triangles),
            5 => Some(PrimitiveMode::TriangleStrip),
            6 => Some(PrimitiveMode::TriangleFan),
            _ => None,
        }
    }

    pub fn gl_code(self) -> usize {
        match self {
            PrimitiveMode::Points => 0,
            PrimitiveMode::Lines => 1,
            PrimitiveMode::LineLoop => 2,
            PrimitiveMode::LineStrip => 3,
            PrimitiveMode::Triangles => 4,
            PrimitiveMode::TriangleStrip => 5,
            PrimitiveMode::TriangleFan => 6,
        }
    }
}

#[derive(Debug, Default)]
pub struct Mesh {
    pub name: String,
    pub primitives: Vec<Primitive>,
    /// Default morph target weights.
    pub weights: Vec<f64>,
    pub base: ObjectBase,
}

impl GltfObject for Mesh {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "name" => self.name = parser.parse_string()?,
            "primitives" => self.primitives = parser.parse_object_array()?,
            "weights" => self.weights = parser.parse_number_array()?,
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("primitives", &self.primitives)?;
        w.write_property("weights", &self.weights)?;
        w.write_property("name", &self.name)?;
        self.base.write_properties(w)
    }
}

impl RootObject for Mesh {
    const TYPE_NAME: &'static str = "Mesh";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn table(root: &GltfRoot) -> &RootArray<Self> {
        &root.meshes
    }

    fn table_mut(root: &mut GltfRoot) -> &mut RootArray<Self> {
        &mut root.meshes
    }

    fn summary(&self) -> String {
        plural(self.primitives.len(), "primitive")
    }
}

/// Geometry to be rendered with a single material.
#[derive(Debug, Default)]
pub struct Primitive {
    /// Vertex attribute semantic (`POSITION`, `TEXCOORD_0`, ...) to accessor.
    pub attributes: Dictionary<Handle<Accessor>>,
    pub indices: Option<Handle<Accessor>>,
    pub material: Option<Handle<Material>>,
    pub mode: PrimitiveMode,
    /// Morph targets, each a semantic-to-accessor map.
    pub targets: Vec<Dictionary<Handle<Accessor>>>,
    pub base: ObjectBase,
}

impl Primitive {
    /// Every accessor the primitive refers to.
    pub fn accessors(&self) -> impl Iterator<Item = &Handle<Accessor>> + '_ {
        self.attributes
            .values()
            .chain(self.indices.iter())
            .chain(self.targets.iter().flat_map(|target| target.values()))
    }
}

impl GltfObject for Primitive {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "attributes" => self.attributes = parser.parse_dictionary(|p| p.parse_ref())?,
            "indices" => self.indices = Some(parser.parse_ref()?),
            "material" => self.material = Some(parser.parse_ref()?),
            "mode" => {
                let code = parser.parse_index()?;
                self.mode = PrimitiveMode::from_gl(code).ok_or_else(|| {
                    parser.schema_error("mode", format!("unknown primitive mode {}", code))
                })?;
            }
            "targets" => {
                self.targets = parser.parse_array(|p| p.parse_dictionary(|p| p.parse_ref()))?
            }
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property_always("attributes", &self.attributes)?;
        w.write_property("indices", &self.indices)?;
        w.write_property("material", &self.material)?;
        if self.mode != PrimitiveMode::Triangles {
            w.write_property("mode", &self.mode.gl_code())?;
        }
        w.write_property("targets", &self.targets)?;
        self.base.write_properties(w)
    }
}
