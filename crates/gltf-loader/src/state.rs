//! Render state attached to each geom.

use std::rc::Rc;

use crate::material::Material;
use crate::texture::Texture;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransparencyMode {
    #[default]
    None,
    /// Alpha-tested: fragments are either drawn or discarded.
    Binary,
    Alpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StageMode {
    #[default]
    Modulate,
    Normal,
}

/// A texturing slot. Stages are compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureStage {
    pub name: String,
    /// Index of the texture coordinate set sampled by this stage.
    pub texcoord: usize,
    pub mode: StageMode,
}

impl TextureStage {
    pub fn new(name: impl Into<String>, texcoord: usize, mode: StageMode) -> Self {
        TextureStage {
            name: name.into(),
            texcoord,
            mode,
        }
    }

    pub fn default_stage() -> Self {
        Self::new("default", 0, StageMode::Modulate)
    }

    /// Stage for a base color texture sampling coordinate set `texcoord`.
    pub fn color(texcoord: usize) -> Self {
        if texcoord == 0 {
            Self::default_stage()
        } else {
            Self::new(format!("color.{}", texcoord), texcoord, StageMode::Modulate)
        }
    }

    /// Stage for a normal map sampling coordinate set `texcoord`.
    pub fn normal(texcoord: usize) -> Self {
        if texcoord == 0 {
            Self::new("normal", 0, StageMode::Normal)
        } else {
            Self::new(format!("normal.{}", texcoord), texcoord, StageMode::Normal)
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextureBinding {
    pub stage: TextureStage,
    pub texture: Rc<Texture>,
}

#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub material: Option<Rc<Material>>,
    pub transparency: TransparencyMode,
    /// Fragments with alpha below this value are discarded.
    pub alpha_test: Option<f32>,
    /// Both faces are drawn.
    pub two_sided: bool,
    pub textures: Vec<TextureBinding>,
}

impl RenderState {
    pub fn is_empty(&self) -> bool {
        self.material.is_none()
            && self.transparency == TransparencyMode::None
            && self.alpha_test.is_none()
            && !self.two_sided
            && self.textures.is_empty()
    }

    /// Binds `texture` on `stage`, replacing whatever the stage held.
    pub fn add_texture(&mut self, stage: TextureStage, texture: Rc<Texture>) {
        self.textures.retain(|binding| binding.stage != stage);
        self.textures.push(TextureBinding { stage, texture });
    }

    pub fn texture_on(&self, stage_name: &str) -> Option<&TextureBinding> {
        self.textures.iter().find(|binding| binding.stage.name == stage_name)
    }
}
