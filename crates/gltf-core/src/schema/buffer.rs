//! Binary payloads, external or embedded.

use std::io::{self, Read};

use log::error;

use crate::error::{GltfError, Result};
use crate::object::{GltfObject, ObjectBase, RootObject};
use crate::parser::Parser;
use crate::root::GltfRoot;
use crate::table::RootArray;
use crate::uri::{SearchPath, UriReference};
use crate::writer::Writer;

/// A buffer. Its bytes come from `uri` (see [`Buffer::load`]) or, for the
/// first buffer of a GLB file, from the binary chunk.
#[derive(Debug, Default)]
pub struct Buffer {
    pub name: String,
    pub uri: Option<UriReference>,
    pub byte_length: usize,
    /// Loaded contents; not serialized as JSON.
    pub data: Vec<u8>,
    pub base: ObjectBase,
}

impl Buffer {
    pub fn is_loaded(&self) -> bool {
        !self.data.is_empty() || self.byte_length == 0
    }

    /// Loads the contents named by `uri`, resolving file names on
    /// `search_path`. A size that differs from `byte_length` is logged, and
    /// the loaded size wins.
    pub fn load(&mut self, search_path: &SearchPath) -> Result<()> {
        let Some(uri) = self.uri.as_mut() else {
            return Err(GltfError::NotFound("buffer without uri".to_string()));
        };
        if uri.has_filename() {
            uri.resolve(search_path).map_err(|e| {
                error!("Failed to find buffer {}", uri);
                e
            })?;
        }
        self.data = uri.read()?;

        if self.data.len() != self.byte_length {
            error!(
                "Number of bytes in buffer file {} ({}) did not match specified byteLength {}",
                uri,
                self.data.len(),
                self.byte_length
            );
        }
        Ok(())
    }

    /// Reads exactly `byte_length` bytes.
    pub fn read_from(&mut self, input: &mut dyn Read) -> Result<()> {
        let mut data = vec![0u8; self.byte_length];
        input.read_exact(&mut data).map_err(|e| {
            error!(
                "Expected to read {} bytes for buffer: {}",
                self.byte_length, e
            );
            GltfError::from(e)
        })?;
        self.data = data;
        Ok(())
    }
}

impl GltfObject for Buffer {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "name" => self.name = parser.parse_string()?,
            "uri" => self.uri = Some(UriReference::new(&parser.parse_string()?)),
            "byteLength" => {
                self.byte_length = parser.parse_index()?;
                if self.byte_length == 0 {
                    return Err(parser.schema_error("byteLength", "must be positive"));
                }
            }
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        if self.byte_length == 0 {
            error!("Buffer {:?} has invalid byte length 0", self.name);
        }
        w.write_property("uri", &self.uri)?;
        w.write_property("byteLength", &self.byte_length)?;
        w.write_property("name", &self.name)?;
        self.base.write_properties(w)
    }
}

impl RootObject for Buffer {
    const TYPE_NAME: &'static str = "Buffer";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn table(root: &GltfRoot) -> &RootArray<Self> {
        &root.buffers
    }

    fn table_mut(root: &mut GltfRoot) -> &mut RootArray<Self> {
        &mut root.buffers
    }

    fn summary(&self) -> String {
        match &self.uri {
            Some(uri) => format!("uri={}, {} bytes", uri, self.byte_length),
            None => format!("internal, {} bytes", self.byte_length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_data_uri_with_length_mismatch() {
        let mut buffer = Buffer {
            uri: Some(UriReference::data_uri("application/octet-stream", b"abcd")),
            byte_length: 8,
            ..Default::default()
        };
        buffer.load(&SearchPath::new()).unwrap();
        assert_eq!(buffer.data, b"abcd");
    }

    #[test]
    fn test_read_from_short_stream() {
        let mut buffer = Buffer {
            byte_length: 4,
            ..Default::default()
        };
        let mut input: &[u8] = b"ab";
        assert!(buffer.read_from(&mut input).is_err());
        let mut input: &[u8] = b"abcdef";
        buffer.read_from(&mut input).unwrap();
        assert_eq!(buffer.data, b"abcd");
    }
}
