//! Perspective and orthographic cameras.

use std::io;

use crate::error::Result;
use crate::object::{GltfObject, ObjectBase, RootObject};
use crate::parser::Parser;
use crate::root::GltfRoot;
use crate::table::RootArray;
use crate::writer::Writer;

#[derive(Debug, Default)]
pub struct Camera {
    pub name: String,
    /// `"perspective"` or `"orthographic"`.
    pub camera_type: String,
    pub perspective: Option<Perspective>,
    pub orthographic: Option<Orthographic>,
    pub base: ObjectBase,
}

impl Camera {
    pub fn is_perspective(&self) -> bool {
        self.camera_type == "perspective"
    }

    pub fn is_orthographic(&self) -> bool {
        self.camera_type == "orthographic"
    }
}

impl GltfObject for Camera {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "name" => self.name = parser.parse_string()?,
            "type" => self.camera_type = parser.parse_string()?,
            "perspective" => {
                let mut perspective = Perspective::default();
                parser.parse_object(&mut perspective)?;
                self.perspective = Some(perspective);
            }
            "orthographic" => {
                let mut orthographic = Orthographic::default();
                parser.parse_object(&mut orthographic)?;
                self.orthographic = Some(orthographic);
            }
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("type", &self.camera_type)?;
        if self.is_orthographic() {
            w.write_property("orthographic", &self.orthographic)?;
        } else if self.is_perspective() {
            w.write_property("perspective", &self.perspective)?;
        }
        w.write_property("name", &self.name)?;
        self.base.write_properties(w)
    }
}

impl RootObject for Camera {
    const TYPE_NAME: &'static str = "Camera";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn table(root: &GltfRoot) -> &RootArray<Self> {
        &root.cameras
    }

    fn table_mut(root: &mut GltfRoot) -> &mut RootArray<Self> {
        &mut root.cameras
    }

    fn summary(&self) -> String {
        self.camera_type.clone()
    }
}

fn parse_positive(parser: &mut Parser<'_>, what: &'static str) -> Result<f64> {
    let value = parser.parse_number()?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(parser.schema_error(what, format!("must be positive, not {}", value)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Perspective {
    pub aspect_ratio: Option<f64>,
    pub yfov: f64,
    /// Infinite when not given.
    pub zfar: f64,
    pub znear: f64,
    pub base: ObjectBase,
}

impl Default for Perspective {
    fn default() -> Self {
        Perspective {
            aspect_ratio: None,
            yfov: 0.0,
            zfar: f64::INFINITY,
            znear: 0.0,
            base: ObjectBase::default(),
        }
    }
}

impl GltfObject for Perspective {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "aspectRatio" => self.aspect_ratio = Some(parse_positive(parser, "aspectRatio")?),
            "yfov" => self.yfov = parse_positive(parser, "yfov")?,
            "zfar" => self.zfar = parse_positive(parser, "zfar")?,
            "znear" => self.znear = parse_positive(parser, "znear")?,
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("aspectRatio", &self.aspect_ratio)?;
        w.write_property("yfov", &self.yfov)?;
        if self.zfar.is_finite() {
            w.write_property("zfar", &self.zfar)?;
        }
        w.write_property("znear", &self.znear)?;
        self.base.write_properties(w)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Orthographic {
    pub xmag: f64,
    pub ymag: f64,
    pub zfar: f64,
    pub znear: f64,
    pub base: ObjectBase,
}

impl GltfObject for Orthographic {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "xmag" => self.xmag = parser.parse_number()?,
            "ymag" => self.ymag = parser.parse_number()?,
            "zfar" => self.zfar = parser.parse_number()?,
            "znear" => self.znear = parser.parse_number()?,
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("xmag", &self.xmag)?;
        w.write_property("ymag", &self.ymag)?;
        w.write_property("zfar", &self.zfar)?;
        w.write_property("znear", &self.znear)?;
        self.base.write_properties(w)
    }
}
