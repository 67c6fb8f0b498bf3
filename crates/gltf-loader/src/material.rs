//! Target-side surface material.

use glam::Vec4;

/// Metallic-roughness material parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: Vec4,
    pub metallic: f32,
    pub roughness: f32,
    /// RGB emission with alpha 1, if the source defines one.
    pub emission: Option<Vec4>,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            name: String::new(),
            base_color: Vec4::ONE,
            metallic: 1.0,
            roughness: 1.0,
            emission: None,
        }
    }
}
