//! Image sources for textures.

use std::io;

use log::error;

use crate::error::{GltfError, Result};
use crate::object::{GltfObject, ObjectBase, RootObject};
use crate::parser::Parser;
use crate::root::GltfRoot;
use crate::schema::BufferView;
use crate::table::{Handle, RootArray};
use crate::uri::UriReference;
use crate::writer::Writer;

/// An image, referenced either by URI or by a buffer view plus MIME type.
#[derive(Debug, Default)]
pub struct Image {
    pub name: String,
    pub uri: Option<UriReference>,
    pub mime_type: String,
    pub buffer_view: Option<Handle<BufferView>>,
    pub base: ObjectBase,
}

impl Image {
    /// Returns the encoded image bytes.
    pub fn open_read(&self, root: &GltfRoot) -> Result<Vec<u8>> {
        if let Some(uri) = &self.uri {
            return uri.read();
        }
        if let Some(handle) = &self.buffer_view {
            let view = root
                .buffer_views
                .get(handle)
                .ok_or(GltfError::DanglingReference("bufferView"))?;
            return view.data(root).map(<[u8]>::to_vec);
        }
        error!("Image {:?} should define either uri or bufferView", self.name);
        Err(GltfError::NotFound(format!("source of image {:?}", self.name)))
    }
}

impl GltfObject for Image {
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        match key {
            "name" => self.name = parser.parse_string()?,
            "uri" => self.uri = Some(UriReference::new(&parser.parse_string()?)),
            "mimeType" => self.mime_type = parser.parse_string()?,
            "bufferView" => self.buffer_view = Some(parser.parse_ref()?),
            _ => return self.base.parse_property(parser, key),
        }
        Ok(())
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property("uri", &self.uri)?;
        w.write_property("bufferView", &self.buffer_view)?;
        w.write_property("mimeType", &self.mime_type)?;
        w.write_property("name", &self.name)?;
        self.base.write_properties(w)
    }
}

impl RootObject for Image {
    const TYPE_NAME: &'static str = "Image";

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn table(root: &GltfRoot) -> &RootArray<Self> {
        &root.images
    }

    fn table_mut(root: &mut GltfRoot) -> &mut RootArray<Self> {
        &mut root.images
    }

    fn summary(&self) -> String {
        let mut text = match (&self.uri, &self.buffer_view) {
            (Some(uri), _) => format!("from {}", uri),
            (None, Some(_)) => "from buffer".to_string(),
            (None, None) => String::new(),
        };
        if !self.mime_type.is_empty() {
            text.push_str(&format!(" [{}]", self.mime_type));
        }
        text
    }
}
