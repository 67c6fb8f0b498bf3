//! Typed views of buffer data.

use std::fmt;
use std::io;

use crate::error::Result;
use crate::object::{GltfObject, ObjectBase, RootObject};
use crate::parser::Parser;
use crate::root::GltfRoot;
use crate::schema::BufferView;
use crate::table::{Handle, RootArray};
use crate::writer::Writer;

/// Numeric type of each component, identified by its GL enum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    UnsignedInt,
    #[default]
    Float,
}

impl ComponentType {
    pub const ALL: [ComponentType; 6] = [
        ComponentType::Byte,
        ComponentType::UnsignedByte,
        ComponentType::Short,
        ComponentType::UnsignedShort,
        ComponentType::UnsignedInt,
        ComponentType::Float,
    ];

    pub fn from_gl(code: usize) -> Option<Self> {
        match code {
            5120 => Some(ComponentType::Byte),
            5121 => Some(ComponentType::UnsignedByte),
            5122 => Some(ComponentType::Short),
            5123 => Some(ComponentType::UnsignedShort),
            5125 => Some(ComponentType::UnsignedInt),
            5126 => Some(ComponentType::Float),
            _ => None,
        }
    }

    pub fn gl_code(self) -> usize {
        match self {
            ComponentType::Byte => 5120,
            ComponentType::UnsignedByte => 5121,
            ComponentType::Short => 5122,
            ComponentType::UnsignedShort => 5123,
            ComponentType::UnsignedInt => 5125,
            ComponentType::Float => 5126,
        }
    }

    /// Size of one component in bytes.
    pub fn size(self) -> usize {
        match self {
            ComponentType::Byte | ComponentType::UnsignedByte => 1,
            ComponentType::Short | ComponentType::UnsignedShort => 2,
            ComponentType::UnsignedInt | ComponentType::Float => 4,
        }
    }

    pub fn is_float(self) -> bool {
        self == ComponentType::Float
    }
}

/// Element shape: scalar, vector or matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessorType {
    #[default]
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorType {
    pub const ALL: [AccessorType; 7] = [
        AccessorType::Scalar,
        AccessorType::Vec2,
        AccessorType::Vec3,
        AccessorType::Vec4,
        AccessorType::Mat2,
        AccessorType::Mat3,
        AccessorType::Mat4,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SCALAR" => Some(AccessorType::Scalar),
            "VEC2" => Some(AccessorType::Vec2),
            "VEC3" => Some(AccessorType::Vec3),
            "VEC4" => Some(AccessorType::Vec4),
            "MAT2" => Some(AccessorType::Mat2),
            "MAT3" => Some(AccessorType::Mat3),
            "MAT4" => Some(AccessorType::Mat4),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AccessorType::Scalar => "SCALAR",
            AccessorType::Vec2 => "VEC2",
            AccessorType::Vec3 => "VEC3",
            AccessorType::Vec4 => "VEC4",
            AccessorType::Mat2 => "MAT2",
            AccessorType::Mat3 => "MAT3",
            AccessorType::Mat4 => "MAT4",
        }
    }

    pub fn num_components(self) -> usize {
        match self {
            AccessorType::Scalar => 1,
            AccessorType::Vec2 => 2,
            AccessorType::Vec3 => 3,
            AccessorType::Vec4 | AccessorType::Mat2 => 4,
            AccessorType::Mat3 => 9,
            AccessorType::Mat4 => 16,
        }
    }
}

impl fmt::Display for AccessorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_component_type(parser: &mut Parser<'_>) -> Result<ComponentType> {
    let code = parser.parse_index()?;
    ComponentType::from_gl(code)
        .ok_or_else(|| parser.schema_error("componentType", format!("unknown value {}", code)))
}

/// An accessor: how to read `count` elements from a buffer view.
#[derive(Debug, Default)]
pub struct Accessor {
    pub name: String,
    pub buffer_view: Option<Handle<BufferView>>,
    pub byte_offset: usize,
    pub component_type: ComponentType,
    pub normalized: bool,
    pub count: usize,
    pub accessor_type: AccessorType,
    pub max: Vec<f64>,
    pub min: Vec<f64>,
    /// Stored and written, but not applied when reading data.
    pub sparse: Option<Sparse>,
    pub base: ObjectBase,
}

impl Accessor {
    pub fn component_size(&self) -> usize {
        self.component_type.size()
    }

    pub fn num_components(&self) -> usize {
        self.accessor_type.num_components()
    }

    /// Size in bytes of one tightly packed element.
    pub fn element_size(&self) -> usize {
        self.component_size() * self.num_components()
    }

    /// Size in bytes of all elements, tightly packed.
    pub fn data_size(&self) -> usize {
        self.element_size() * self.count
    }
}

impl GltfObject for Accessor {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "name" => self.name = parser.parse_string()?,
            "bufferView" => self.buffer_view = Some(parser.parse_ref()?),
            "byteOffset" => self.byte_offset = parser.parse_index()?,
            "componentType" => self.component_type = parse_component_type(parser)?,
            "normalized" => self.normalized = parser.parse_bool()?,
            "count" => self.count = parser.parse_index()?,
            "type" => {
                let name = parser.parse_string()?;
                self.accessor_type = AccessorType::from_name(&name).ok_or_else(|| {
                    parser.schema_error("type", format!("unknown accessor type {:?}", name))
                })?;
            }
            "max" | "min" => {
                let values = parser.parse_number_array()?;
                if values.is_empty() || values.len() > 16 {
                    return Err(parser.schema_error(
                        "accessor bounds",
                        format!("{} must have 1 to 16 entries, not {}", key, values.len()),
                    ));
                }
                if key == "max" {
                    self.max = values;
                } else {
                    self.min = values;
                }
            }
            "sparse" => {
                let mut sparse = Sparse::default();
                parser.parse_object(&mut sparse)?;
                self.sparse = Some(sparse);
            }
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        if self.buffer_view.is_some() {
            w.write_property("bufferView", &self.buffer_view)?;
            if self.byte_offset != 0 {
                w.write_property("byteOffset", &self.byte_offset)?;
            }
        }
        w.write_property("componentType", &self.component_type.gl_code())?;
        if self.normalized {
            w.write_property("normalized", &true)?;
        }
        w.write_property("count", &self.count)?;
        w.write_property("type", self.accessor_type.name())?;
        w.write_property("max", &self.max)?;
        w.write_property("min", &self.min)?;
        w.write_property("sparse", &self.sparse)?;
        w.write_property("name", &self.name)?;
        self.base.write_properties(w)
    }
}

impl RootObject for Accessor {
    const TYPE_NAME: &'static str = "Accessor";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn table(root: &GltfRoot) -> &RootArray<Self> {
        &root.accessors
    }

    fn table_mut(root: &mut GltfRoot) -> &mut RootArray<Self> {
        &mut root.accessors
    }

    fn summary(&self) -> String {
        format!(
            "{} x {} {:?}",
            self.count,
            self.accessor_type,
            self.component_type
        )
    }
}

/// Sparse substitution block of an accessor.
#[derive(Debug, Default)]
pub struct Sparse {
    pub count: usize,
    pub indices: SparseIndices,
    pub values: SparseValues,
    pub base: ObjectBase,
}

impl GltfObject for Sparse {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "count" => {
                self.count = parser.parse_index()?;
                if self.count == 0 {
                    return Err(parser.schema_error("sparse", "count must be positive"));
                }
            }
            "indices" => parser.parse_object(&mut self.indices)?,
            "values" => parser.parse_object(&mut self.values)?,
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("count", &self.count)?;
        w.write_property("indices", &self.indices)?;
        w.write_property("values", &self.values)?;
        self.base.write_properties(w)
    }
}

/// Location and type of the indices of a sparse block.
#[derive(Debug, Default)]
pub struct SparseIndices {
    pub buffer_view: Option<Handle<BufferView>>,
    pub byte_offset: usize,
    pub component_type: ComponentType,
    pub base: ObjectBase,
}

impl GltfObject for SparseIndices {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "bufferView" => self.buffer_view = Some(parser.parse_ref()?),
            "byteOffset" => self.byte_offset = parser.parse_index()?,
            "componentType" => self.component_type = parse_component_type(parser)?,
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("bufferView", &self.buffer_view)?;
        if self.byte_offset != 0 {
            w.write_property("byteOffset", &self.byte_offset)?;
        }
        w.write_property("componentType", &self.component_type.gl_code())?;
        self.base.write_properties(w)
    }
}

/// Location of the substituted values of a sparse block.
#[derive(Debug, Default)]
pub struct SparseValues {
    pub buffer_view: Option<Handle<BufferView>>,
    pub byte_offset: usize,
    pub base: ObjectBase,
}

impl GltfObject for SparseValues {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "bufferView" => self.buffer_view = Some(parser.parse_ref()?),
            "byteOffset" => self.byte_offset = parser.parse_index()?,
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("bufferView", &self.buffer_view)?;
        if self.byte_offset != 0 {
            w.write_property("byteOffset", &self.byte_offset)?;
        }
        self.base.write_properties(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_size_example() {
        let accessor = Accessor {
            component_type: ComponentType::UnsignedShort,
            accessor_type: AccessorType::Vec3,
            count: 10,
            ..Default::default()
        };
        assert_eq!(accessor.data_size(), 60);
    }

    #[test]
    fn test_gl_codes_round_trip() {
        for ct in ComponentType::ALL {
            assert_eq!(ComponentType::from_gl(ct.gl_code()), Some(ct));
        }
        assert_eq!(ComponentType::from_gl(5124), None);
        for t in AccessorType::ALL {
            assert_eq!(AccessorType::from_name(t.name()), Some(t));
        }
        assert_eq!(AccessorType::from_name("vec3"), None);
    }
}
