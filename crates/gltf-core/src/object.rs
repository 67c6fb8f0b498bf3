//! The contracts every schema type implements.
//!
//! A [`GltfObject`] knows how to consume one JSON property at a time from the
//! [`Parser`] and how to emit its non-default properties to a [`Writer`]. A
//! [`RootObject`] additionally lives in one of the document's top-level tables.

use std::io;

use crate::error::Result;
use crate::parser::Parser;
use crate::root::GltfRoot;
use crate::table::RootArray;
use crate::value::{Dictionary, Value};
use crate::writer::Writer;

/// The `extras` and `extensions` every glTF object may carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectBase {
    pub extras: Dictionary<Value>,
    pub extensions: Dictionary<Dictionary<Value>>,
}

impl ObjectBase {
    /// Handles `extras` and `extensions`; any other key is skipped with a
    /// warning.
    pub fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "extras" => {
                self.extras = parser.parse_dictionary(|p| p.parse_value())?;
                Ok(())
            }
            "extensions" => {
                self.extensions =
                    parser.parse_dictionary(|p| p.parse_dictionary(|p| p.parse_value()))?;
                Ok(())
            }
            _ => parser.skip_unknown(key),
        }
    }

    pub fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("extras", &self.extras)?;
        w.write_property("extensions", &self.extensions)
    }

    pub fn is_empty(&self) -> bool {
        self.extras.is_empty() && self.extensions.is_empty()
    }

    /// Returns the data recorded for `extension`, if present.
    pub fn extension(&self, extension: &str) -> Option<&Dictionary<Value>> {
        self.extensions.get(extension)
    }
}

/// A schema type that can be parsed from and written to JSON.
pub trait GltfObject: Default {
    /// Consumes the value of property `key`. Unrecognized keys must be
    /// forwarded to [`ObjectBase::parse_property`].
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()>;

    /// Writes every property that differs from its default, extras and
    /// extensions last.
    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()>;

    /// Resets every field to its default.
    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A schema type stored in one of the document's top-level tables.
pub trait RootObject: GltfObject + 'static {
    /// Singular type name used in diagnostics, e.g. `"Node"`.
    const TYPE_NAME: &'static str;

    /// Whether unreferenced instances are removed by garbage collection.
    const COLLECTABLE: bool = true;

    fn name(&self) -> &str;

    fn set_name(&mut self, name: String);

    fn table(root: &GltfRoot) -> &RootArray<Self>;

    fn table_mut(root: &mut GltfRoot) -> &mut RootArray<Self>;

    /// Short type-specific summary appended to [`describe`].
    fn summary(&self) -> String {
        String::new()
    }
}

/// One-line description of a root entity, e.g. `Node #3 "arm", TRS, 2 children`.
pub fn describe<T: RootObject>(index: usize, object: &T) -> String {
    let mut text = format!("{} #{}", T::TYPE_NAME, index);
    if !object.name().is_empty() {
        text.push_str(&format!(" {:?}", object.name()));
    }
    let summary = object.summary();
    if !summary.is_empty() {
        text.push_str(", ");
        text.push_str(&summary);
    }
    text
}

/// Formats a count with a singular or plural noun.
pub(crate) fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
