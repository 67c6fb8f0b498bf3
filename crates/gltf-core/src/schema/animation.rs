//! Keyframe animations. Stored and written, never evaluated.

use std::io;

use crate::error::Result;
use crate::object::{plural, GltfObject, ObjectBase, RootObject};
use crate::parser::Parser;
use crate::root::GltfRoot;
use crate::schema::{Accessor, Node};
use crate::table::{Handle, RootArray};
use crate::writer::Writer;

#[derive(Debug, Default)]
pub struct Animation {
    pub name: String,
    pub channels: Vec<Channel>,
    pub samplers: Vec<AnimationSampler>,
    pub base: ObjectBase,
}

impl GltfObject for Animation {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "name" => self.name = parser.parse_string()?,
            "channels" => {
                let samplers = &mut self.samplers;
                let channels = &mut self.channels;
                channels.clear();
                parser.parse_array_with(|p, _| {
                    let mut channel = Channel::default();
                    p.parse_object_with(|p, key| channel.parse_in(p, key, samplers))?;
                    channels.push(channel);
                    Ok(())
                })?;
            }
            "samplers" => {
                // Channels may already have grown this list with placeholders.
                let samplers = &mut self.samplers;
                parser.parse_array_with(|p, index| {
                    if samplers.len() <= index {
                        samplers.resize_with(index + 1, Default::default);
                    }
                    p.parse_object(&mut samplers[index])
                })?;
            }
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("channels", &self.channels)?;
        w.write_property("samplers", &self.samplers)?;
        w.write_property("name", &self.name)?;
        self.base.write_properties(w)
    }
}

impl RootObject for Animation {
    const TYPE_NAME: &'static str = "Animation";

    /// Nothing in a document refers to an animation.
    const COLLECTABLE: bool = false;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn table(root: &GltfRoot) -> &RootArray<Self> {
        &root.animations
    }

    fn table_mut(root: &mut GltfRoot) -> &mut RootArray<Self> {
        &mut root.animations
    }

    fn summary(&self) -> String {
        format!(
            "{}, {}",
            plural(self.channels.len(), "channel"),
            plural(self.samplers.len(), "sampler")
        )
    }
}

/// Binds a sampler of the same animation to a node property.
#[derive(Debug, Default)]
pub struct Channel {
    /// Index into the enclosing animation's `samplers`.
    pub sampler: usize,
    pub target: ChannelTarget,
    pub base: ObjectBase,
}

impl Channel {
    /// Parses one property; the sampler index is resolved against the
    /// enclosing animation's samplers, growing them if needed.
    fn parse_in(
        &mut self,
        parser: &mut Parser<'_>,
        key: &str,
        samplers: &mut Vec<AnimationSampler>,
    ) -> Result<()> {
        if key == "sampler" {
            self.sampler = parser.parse_index()?;
            if samplers.len() <= self.sampler {
                samplers.resize_with(self.sampler + 1, Default::default);
            }
            return Ok(());
        }
        self.parse_property(parser, key)
    }
}

impl GltfObject for Channel {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "sampler" => self.sampler = parser.parse_index()?,
            "target" => parser.parse_object(&mut self.target)?,
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("sampler", &self.sampler)?;
        w.write_property("target", &self.target)?;
        self.base.write_properties(w)
    }
}

#[derive(Debug, Default)]
pub struct ChannelTarget {
    pub node: Option<Handle<Node>>,
    /// `translation`, `rotation`, `scale` or `weights`.
    pub path: String,
    pub base: ObjectBase,
}

impl GltfObject for ChannelTarget {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "node" => self.node = Some(parser.parse_ref()?),
            "path" => self.path = parser.parse_string()?,
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("node", &self.node)?;
        w.write_property_always("path", &self.path)?;
        self.base.write_properties(w)
    }
}

#[derive(Debug)]
pub struct AnimationSampler {
    pub input: Option<Handle<Accessor>>,
    /// `LINEAR`, `STEP` or `CUBICSPLINE`.
    pub interpolation: String,
    pub output: Option<Handle<Accessor>>,
    pub base: ObjectBase,
}

impl Default for AnimationSampler {
    fn default() -> Self {
        AnimationSampler {
            input: None,
            interpolation: "LINEAR".to_string(),
            output: None,
            base: ObjectBase::default(),
        }
    }
}

impl GltfObject for AnimationSampler {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "input" => self.input = Some(parser.parse_ref()?),
            "interpolation" => self.interpolation = parser.parse_string()?,
            "output" => self.output = Some(parser.parse_ref()?),
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("input", &self.input)?;
        if self.interpolation != "LINEAR" {
            w.write_property("interpolation", &self.interpolation)?;
        }
        w.write_property("output", &self.output)?;
        self.base.write_properties(w)
    }
}
