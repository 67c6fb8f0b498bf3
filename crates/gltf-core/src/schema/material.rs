//! Metallic-roughness PBR materials.

use std::io;

use glam::{DVec3, DVec4};

use crate::error::Result;
use crate::object::{GltfObject, ObjectBase, RootObject};
use crate::parser::Parser;
use crate::root::GltfRoot;
use crate::schema::Texture;
use crate::table::{Handle, RootArray};
use crate::writer::Writer;

/// How the alpha channel is interpreted. Unrecognized modes are kept so they
/// can be written back; consumers treat them as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
    Other(String),
}

impl AlphaMode {
    pub fn from_name(name: &str) -> Self {
        match name {
            "OPAQUE" => AlphaMode::Opaque,
            "MASK" => AlphaMode::Mask,
            "BLEND" => AlphaMode::Blend,
            other => AlphaMode::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            AlphaMode::Opaque => "OPAQUE",
            AlphaMode::Mask => "MASK",
            AlphaMode::Blend => "BLEND",
            AlphaMode::Other(name) => name,
        }
    }
}

/// Reference to a texture plus the texture coordinate set to sample it with.
///
/// `scale` applies to normal textures and `strength` to occlusion textures;
/// both default to 1.
#[derive(Debug, Clone)]
pub struct TextureInfo {
    pub texture: Option<Handle<Texture>>,
    pub tex_coord: usize,
    pub scale: f64,
    pub strength: f64,
    pub base: ObjectBase,
}

impl Default for TextureInfo {
    fn default() -> Self {
        TextureInfo {
            texture: None,
            tex_coord: 0,
            scale: 1.0,
            strength: 1.0,
            base: ObjectBase::default(),
        }
    }
}

impl GltfObject for TextureInfo {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "index" => self.texture = Some(parser.parse_ref()?),
            "texCoord" => self.tex_coord = parser.parse_index()?,
            "scale" => self.scale = parser.parse_number()?,
            "strength" => self.strength = parser.parse_number()?,
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("index", &self.texture)?;
        if self.tex_coord != 0 {
            w.write_property("texCoord", &self.tex_coord)?;
        }
        if self.scale != 1.0 {
            w.write_property("scale", &self.scale)?;
        }
        if self.strength != 1.0 {
            w.write_property("strength", &self.strength)?;
        }
        self.base.write_properties(w)
    }
}

fn parse_texture_info(parser: &mut Parser<'_>) -> Result<Option<TextureInfo>> {
    let mut info = TextureInfo::default();
    parser.parse_object(&mut info)?;
    Ok(Some(info))
}

#[derive(Debug, Clone)]
pub struct PbrMetallicRoughness {
    pub base_color_factor: DVec4,
    pub base_color_texture: Option<TextureInfo>,
    pub metallic_factor: f64,
    pub roughness_factor: f64,
    pub metallic_roughness_texture: Option<TextureInfo>,
    pub base: ObjectBase,
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        PbrMetallicRoughness {
            base_color_factor: DVec4::ONE,
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
            base: ObjectBase::default(),
        }
    }
}

impl PbrMetallicRoughness {
    pub fn is_default(&self) -> bool {
        self.base_color_factor == DVec4::ONE
            && self.base_color_texture.is_none()
            && self.metallic_factor == 1.0
            && self.roughness_factor == 1.0
            && self.metallic_roughness_texture.is_none()
            && self.base.is_empty()
    }
}

impl GltfObject for PbrMetallicRoughness {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "baseColorFactor" => self.base_color_factor = parser.parse_vec4("baseColorFactor")?,
            "baseColorTexture" => self.base_color_texture = parse_texture_info(parser)?,
            "metallicFactor" => self.metallic_factor = parser.parse_number()?,
            "roughnessFactor" => self.roughness_factor = parser.parse_number()?,
            "metallicRoughnessTexture" => {
                self.metallic_roughness_texture = parse_texture_info(parser)?
            }
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        if self.base_color_factor != DVec4::ONE {
            w.write_property("baseColorFactor", &self.base_color_factor)?;
        }
        w.write_property("baseColorTexture", &self.base_color_texture)?;
        if self.metallic_factor != 1.0 {
            w.write_property("metallicFactor", &self.metallic_factor)?;
        }
        if self.roughness_factor != 1.0 {
            w.write_property("roughnessFactor", &self.roughness_factor)?;
        }
        w.write_property("metallicRoughnessTexture", &self.metallic_roughness_texture)?;
        self.base.write_properties(w)
    }
}

#[derive(Debug, Default)]
pub struct Material {
    pub name: String,
    pub pbr_metallic_roughness: PbrMetallicRoughness,
    pub normal_texture: Option<TextureInfo>,
    pub occlusion_texture: Option<TextureInfo>,
    pub emissive_texture: Option<TextureInfo>,
    /// `None` when not given (black).
    pub emissive_factor: Option<DVec3>,
    pub alpha_mode: AlphaMode,
    /// `None` when not given (0.5).
    pub alpha_cutoff: Option<f64>,
    pub double_sided: bool,
    pub base: ObjectBase,
}

impl Material {
    pub fn alpha_cutoff_or_default(&self) -> f64 {
        self.alpha_cutoff.unwrap_or(0.5)
    }

    /// Every texture this material refers to.
    pub fn textures(&self) -> impl Iterator<Item = &Handle<Texture>> + '_ {
        [
            &self.pbr_metallic_roughness.base_color_texture,
            &self.pbr_metallic_roughness.metallic_roughness_texture,
            &self.normal_texture,
            &self.occlusion_texture,
            &self.emissive_texture,
        ]
        .into_iter()
        .filter_map(|info| info.as_ref().and_then(|info| info.texture.as_ref()))
    }
}

impl GltfObject for Material {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "name" => self.name = parser.parse_string()?,
            "pbrMetallicRoughness" => parser.parse_object(&mut self.pbr_metallic_roughness)?,
            "normalTexture" => self.normal_texture = parse_texture_info(parser)?,
            "occlusionTexture" => self.occlusion_texture = parse_texture_info(parser)?,
            "emissiveTexture" => self.emissive_texture = parse_texture_info(parser)?,
            "emissiveFactor" => self.emissive_factor = Some(parser.parse_vec3("emissiveFactor")?),
            "alphaMode" => self.alpha_mode = AlphaMode::from_name(&parser.parse_string()?),
            "alphaCutoff" => self.alpha_cutoff = Some(parser.parse_number()?),
            "doubleSided" => self.double_sided = parser.parse_bool()?,
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        if !self.pbr_metallic_roughness.is_default() {
            w.write_property("pbrMetallicRoughness", &self.pbr_metallic_roughness)?;
        }
        w.write_property("normalTexture", &self.normal_texture)?;
        w.write_property("occlusionTexture", &self.occlusion_texture)?;
        w.write_property("emissiveTexture", &self.emissive_texture)?;
        w.write_property("emissiveFactor", &self.emissive_factor)?;
        if self.alpha_mode != AlphaMode::Opaque {
            w.write_property("alphaMode", self.alpha_mode.name())?;
        }
        w.write_property("alphaCutoff", &self.alpha_cutoff)?;
        if self.double_sided {
            w.write_property("doubleSided", &true)?;
        }
        w.write_property("name", &self.name)?;
        self.base.write_properties(w)
    }
}

impl RootObject for Material {
    const TYPE_NAME: &'static str = "Material";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn table(root: &GltfRoot) -> &RootArray<Self> {
        &root.materials
    }

    fn table_mut(root: &mut GltfRoot) -> &mut RootArray<Self> {
        &mut root.materials
    }

    fn summary(&self) -> String {
        let mut parts = vec![self.alpha_mode.name().to_string()];
        if self.double_sided {
            parts.push("double-sided".to_string());
        }
        parts.join(", ")
    }
}
