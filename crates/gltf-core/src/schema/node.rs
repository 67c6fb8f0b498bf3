//! Nodes of the scene hierarchy.

use std::io;

use glam::{DMat4, DQuat, DVec3};

use crate::error::Result;
use crate::object::{plural, GltfObject, ObjectBase, RootObject};
use crate::parser::Parser;
use crate::root::GltfRoot;
use crate::schema::{Camera, Mesh, Skin};
use crate::table::{Handle, RootArray};
use crate::writer::Writer;

/// A node. Its transform is either a `matrix` or any combination of
/// `translation`, `rotation` and `scale`; absent components are identity.
///
/// The `children` lists of a malformed document may form cycles.
#[derive(Debug, Default)]
pub struct Node {
    pub name: String,
    pub camera: Option<Handle<Camera>>,
    pub children: Vec<Handle<Node>>,
    pub mesh: Option<Handle<Mesh>>,
    pub skin: Option<Handle<Skin>>,
    pub weights: Vec<f64>,
    pub matrix: Option<DMat4>,
    pub translation: Option<DVec3>,
    pub rotation: Option<DQuat>,
    pub scale: Option<DVec3>,
    pub base: ObjectBase,
}

impl Node {
    pub fn has_transform(&self) -> bool {
        self.matrix.is_some()
            || self.translation.is_some()
            || self.rotation.is_some()
            || self.scale.is_some()
    }

    /// The local transform; TRS components are composed as `T * R * S`.
    pub fn matrix(&self) -> DMat4 {
        if let Some(matrix) = self.matrix {
            return matrix;
        }
        DMat4::from_scale_rotation_translation(
            self.scale.unwrap_or(DVec3::ONE),
            self.rotation.unwrap_or(DQuat::IDENTITY),
            self.translation.unwrap_or(DVec3::ZERO),
        )
    }

    /// Replaces a `matrix` transform with equivalent TRS components. Returns
    /// whether the matrix could be represented exactly (no shear or
    /// projection). A singular matrix has no finite decomposition and is
    /// kept as it is.
    pub fn decompose_matrix(&mut self) -> bool {
        let Some(matrix) = self.matrix else {
            return true;
        };

        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        if !(scale.is_finite() && rotation.is_finite() && translation.is_finite()) {
            return false;
        }
        self.matrix = None;
        self.translation = (translation != DVec3::ZERO).then_some(translation);
        self.rotation = (rotation != DQuat::IDENTITY).then_some(rotation);
        self.scale = (scale != DVec3::ONE).then_some(scale);

        let recomposed = DMat4::from_scale_rotation_translation(scale, rotation, translation);
        let tolerance = 1e-9 * matrix.to_cols_array().iter().fold(1.0f64, |m, v| m.max(v.abs()));
        recomposed.abs_diff_eq(matrix, tolerance)
    }
}

impl GltfObject for Node {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "name" => self.name = parser.parse_string()?,
            "camera" => self.camera = Some(parser.parse_ref()?),
            "children" => self.children = parser.parse_ref_array()?,
            "mesh" => self.mesh = Some(parser.parse_ref()?),
            "skin" => self.skin = Some(parser.parse_ref()?),
            "weights" => self.weights = parser.parse_number_array()?,
            "matrix" => self.matrix = Some(parser.parse_mat4("matrix")?),
            "translation" => self.translation = Some(parser.parse_vec3("translation")?),
            "rotation" => self.rotation = Some(parser.parse_quat("rotation")?),
            "scale" => self.scale = Some(parser.parse_vec3("scale")?),
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("camera", &self.camera)?;
        w.write_property("children", &self.children)?;
        if self.mesh.is_some() {
            w.write_property("mesh", &self.mesh)?;
            w.write_property("skin", &self.skin)?;
            w.write_property("weights", &self.weights)?;
        }
        if self.matrix.is_some() {
            w.write_property("matrix", &self.matrix)?;
        } else {
            w.write_property("translation", &self.translation)?;
            w.write_property("scale", &self.scale)?;
            w.write_property("rotation", &self.rotation)?;
        }
        w.write_property("name", &self.name)?;
        self.base.write_properties(w)
    }
}

impl RootObject for Node {
    const TYPE_NAME: &'static str = "Node";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn table(root: &GltfRoot) -> &RootArray<Self> {
        &root.nodes
    }

    fn table_mut(root: &mut GltfRoot) -> &mut RootArray<Self> {
        &mut root.nodes
    }

    fn summary(&self) -> String {
        let children = plural(self.children.len(), "child").replace("childs", "children");
        if self.matrix.is_some() {
            format!("matrix, {}", children)
        } else if self.has_transform() {
            format!("TRS, {}", children)
        } else {
            children
        }
    }
}
