//! Asset metadata.

use std::io;

use crate::error::Result;
use crate::object::{GltfObject, ObjectBase};
use crate::parser::Parser;
use crate::writer::Writer;

#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub version: String,
    pub min_version: String,
    pub generator: String,
    pub copyright: String,
    pub base: ObjectBase,
}

impl Default for Asset {
    fn default() -> Self {
        Asset {
            version: "2.0".to_string(),
            min_version: String::new(),
            generator: String::new(),
            copyright: String::new(),
            base: ObjectBase::default(),
        }
    }
}

/// Checks that `version` has the form `digits '.' digits`.
pub fn check_version(version: &str) -> std::result::Result<(), String> {
    let Some((major, minor)) = version.split_once('.') else {
        return Err(format!("expected dot in version string {:?}", version));
    };
    if major.is_empty() || !major.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("expected digits before dot in version string {:?}", version));
    }
    if minor.is_empty() || !minor.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("expected only digits after dot in version string {:?}", version));
    }
    Ok(())
}

fn parse_version(parser: &mut Parser<'_>) -> Result<String> {
    let version = parser.parse_string()?;
    check_version(&version).map_err(|message| parser.schema_error("version", message))?;
    Ok(version)
}

impl GltfObject for Asset {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "version" => self.version = parse_version(parser)?,
            "minVersion" => self.min_version = parse_version(parser)?,
            "generator" => self.generator = parser.parse_string()?,
            "copyright" => self.copyright = parser.parse_string()?,
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property_always("version", &self.version)?;
        w.write_property("copyright", &self.copyright)?;
        w.write_property("generator", &self.generator)?;
        w.write_property("minVersion", &self.min_version)?;
        self.base.write_properties(w)
    }
}
