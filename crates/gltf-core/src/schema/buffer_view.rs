//! Byte ranges within buffers.

use std::io;

use crate::error::{GltfError, Result};
use crate::object::{GltfObject, ObjectBase, RootObject};
use crate::parser::Parser;
use crate::root::GltfRoot;
use crate::schema::Buffer;
use crate::table::{Handle, RootArray};
use crate::writer::Writer;

/// GL buffer binding a view is intended for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    ArrayBuffer,
    ElementArrayBuffer,
}

impl BufferTarget {
    pub fn from_gl(code: usize) -> Option<Self> {
        match code {
            34962 => Some(BufferTarget::ArrayBuffer),
            34963 => Some(BufferTarget::ElementArrayBuffer),
            _ => None,
        }
    }

    pub fn gl_code(self) -> usize {
        match self {
            BufferTarget::ArrayBuffer => 34962,
            BufferTarget::ElementArrayBuffer => 34963,
        }
    }
}

#[derive(Debug, Default)]
pub struct BufferView {
    pub name: String,
    pub buffer: Option<Handle<Buffer>>,
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: Option<usize>,
    pub target: Option<BufferTarget>,
    pub base: ObjectBase,
}

impl BufferView {
    /// The bytes of this view within its loaded buffer.
    pub fn data<'r>(&self, root: &'r GltfRoot) -> Result<&'r [u8]> {
        let buffer = self
            .buffer
            .as_ref()
            .and_then(|handle| root.buffers.get(handle))
            .ok_or(GltfError::DanglingReference("buffer"))?;
        let end = self.byte_offset + self.byte_length;
        buffer.data.get(self.byte_offset..end).ok_or_else(|| {
            GltfError::ByteRange(format!(
                "buffer view {:?} range {}..{} exceeds buffer of {} bytes",
                self.name,
                self.byte_offset,
                end,
                buffer.data.len()
            ))
        })
    }
}

impl GltfObject for BufferView {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "name" => self.name = parser.parse_string()?,
            "buffer" => self.buffer = Some(parser.parse_ref()?),
            "byteOffset" => self.byte_offset = parser.parse_index()?,
            "byteLength" => {
                self.byte_length = parser.parse_index()?;
                if self.byte_length == 0 {
                    return Err(parser.schema_error("byteLength", "must be at least 1"));
                }
            }
            "byteStride" => self.byte_stride = Some(parser.parse_index()?),
            "target" => {
                let code = parser.parse_index()?;
                let target = BufferTarget::from_gl(code).ok_or_else(|| {
                    parser.schema_error("target", format!("invalid target {} for buffer view", code))
                })?;
                self.target = Some(target);
            }
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("buffer", &self.buffer)?;
        if self.byte_offset != 0 {
            w.write_property("byteOffset", &self.byte_offset)?;
        }
        w.write_property("byteLength", &self.byte_length)?;
        w.write_property("byteStride", &self.byte_stride)?;
        w.write_property("target", &self.target.map(BufferTarget::gl_code))?;
        w.write_property("name", &self.name)?;
        self.base.write_properties(w)
    }
}

impl RootObject for BufferView {
    const TYPE_NAME: &'static str = "BufferView";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn table(root: &GltfRoot) -> &RootArray<Self> {
        &root.buffer_views
    }

    fn table_mut(root: &mut GltfRoot) -> &mut RootArray<Self> {
        &mut root.buffer_views
    }

    fn summary(&self) -> String {
        let Some(buffer) = &self.buffer else {
            return String::new();
        };
        let mut text = format!("<Buffer #{}>[", buffer.index());
        if self.byte_offset != 0 {
            text.push_str(&self.byte_offset.to_string());
        }
        text.push_str(&format!(":{}", self.byte_length));
        if let Some(stride) = self.byte_stride {
            text.push_str(&format!(":{}", stride));
        }
        text.push(']');
        text
    }
}
