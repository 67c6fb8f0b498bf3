//! The document root: one table per entity kind plus document-level metadata.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::{debug, error, info, warn};

use crate::error::{GltfError, Result};
use crate::glb;
use crate::object::{describe, GltfObject, ObjectBase, RootObject};
use crate::parser::Parser;
use crate::schema::{
    Accessor, Animation, Asset, Buffer, BufferView, Camera, Image, Material, Mesh, Node, Sampler,
    Scene, Skin, Texture,
};
use crate::table::{Handle, RootArray};
use crate::uri::{SearchPath, UriReference};
use crate::writer::{WriteOptions, Writer};

/// A glTF document.
///
/// Reading into a root that already has content keeps that content: entities
/// named by the input are replaced in place and the rest stay. Call
/// [`GltfRoot::clear`] first for a fresh read.
#[derive(Debug, Default)]
pub struct GltfRoot {
    pub asset: Asset,
    pub extensions_used: Vec<String>,
    pub extensions_required: Vec<String>,
    /// The default scene.
    pub scene: Option<Handle<Scene>>,

    pub accessors: RootArray<Accessor>,
    pub animations: RootArray<Animation>,
    pub buffers: RootArray<Buffer>,
    pub buffer_views: RootArray<BufferView>,
    pub cameras: RootArray<Camera>,
    pub images: RootArray<Image>,
    pub materials: RootArray<Material>,
    pub meshes: RootArray<Mesh>,
    pub nodes: RootArray<Node>,
    pub samplers: RootArray<Sampler>,
    pub scenes: RootArray<Scene>,
    pub skins: RootArray<Skin>,
    pub textures: RootArray<Texture>,

    pub base: ObjectBase,

    /// File the document was last read from, if any.
    pub filename: Option<PathBuf>,
    /// Modification time of that file when it was read.
    pub timestamp: Option<SystemTime>,
}

impl GltfRoot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all content. Handles into the old tables become dead.
    pub fn clear(&mut self) {
        self.asset = Asset::default();
        self.extensions_used.clear();
        self.extensions_required.clear();
        self.scene = None;

        self.accessors.clear();
        self.animations.clear();
        self.buffers.clear();
        self.buffer_views.clear();
        self.cameras.clear();
        self.images.clear();
        self.materials.clear();
        self.meshes.clear();
        self.nodes.clear();
        self.samplers.clear();
        self.scenes.clear();
        self.skins.clear();
        self.textures.clear();

        self.base = ObjectBase::default();
        self.filename = None;
        self.timestamp = None;
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// Reads JSON or GLB from `input`, detected from the first byte.
    ///
    /// External resources are not loaded; see [`GltfRoot::load_externals`].
    pub fn read(&mut self, input: &mut dyn BufRead) -> Result<()> {
        let filename = self
            .filename
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_default();

        match peek(input)? {
            Some(c) if c == b'{' || c.is_ascii_whitespace() => self.read_json(input, &filename),
            Some(0xEF) => {
                let mut bom = [0u8; 3];
                input.read_exact(&mut bom)?;
                match peek(input)? {
                    Some(c) if bom == [0xEF, 0xBB, 0xBF] && (c == b'{' || c.is_ascii_whitespace()) => {
                        warn!("Found UTF-8 BOM preceding JSON stream");
                        self.read_json(input, &filename)
                    }
                    _ => Err(not_gltf()),
                }
            }
            Some(b'g') => glb::read_glb(self, input, &filename),
            _ => Err(not_gltf()),
        }
    }

    fn read_json(&mut self, input: &mut dyn BufRead, filename: &str) -> Result<()> {
        let mut stream = input;
        let mut parser = Parser::new(&mut stream, self, filename);
        parser.parse_document()
    }

    /// Reads the named file, then loads its external buffers and resolves
    /// its image URIs relative to the file's directory.
    pub fn read_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            error!("Could not open {}: {}", path.display(), e);
            GltfError::from(e)
        })?;
        self.filename = Some(path.to_path_buf());
        self.timestamp = file.metadata().and_then(|meta| meta.modified()).ok();

        info!("Reading {}", path.display());
        self.read(&mut BufReader::new(file))?;

        let mut search_path = SearchPath::new();
        if let Some(dir) = path.parent() {
            search_path.append_directory(if dir.as_os_str().is_empty() {
                Path::new(".")
            } else {
                dir
            });
        }
        self.load_externals(&search_path)
    }

    /// Loads every buffer that has a URI and resolves every image URI.
    /// Attempts all of them before reporting how many failed.
    pub fn load_externals(&mut self, search_path: &SearchPath) -> Result<()> {
        let mut failed = 0;

        for index in 0..self.buffers.len() {
            let has_uri = self.buffers.at(index).map_or(false, |b| b.uri.is_some());
            if !has_uri {
                continue;
            }
            if let Some(buffer) = self.buffers.at_mut(index) {
                if let Err(e) = buffer.load(search_path) {
                    error!("Failed to load buffer #{}: {}", index, e);
                    failed += 1;
                }
            }
        }

        for index in 0..self.images.len() {
            let needs_resolve = self
                .images
                .at(index)
                .and_then(|image| image.uri.as_ref())
                .map_or(false, |uri| uri.has_filename());
            if !needs_resolve {
                continue;
            }
            if let Some(uri) = self.images.at_mut(index).and_then(|image| image.uri.as_mut()) {
                if let Err(e) = uri.resolve(search_path) {
                    error!("Failed to resolve image #{}: {}", index, e);
                    failed += 1;
                }
            }
        }

        if failed == 0 {
            Ok(())
        } else {
            Err(GltfError::Externals { failed })
        }
    }

    // ========================================================================
    // Writing
    // ========================================================================

    pub fn write_gltf(&self, out: &mut dyn Write, options: WriteOptions) -> Result<()> {
        Writer::new(out, options).write_document(self)?;
        out.flush()?;
        Ok(())
    }

    pub fn write_glb(&self, out: &mut dyn Write) -> Result<()> {
        glb::write_glb(self, out)
    }

    pub fn write_gltf_file(&self, path: impl AsRef<Path>, options: WriteOptions) -> Result<()> {
        let mut out = create_file(path.as_ref())?;
        self.write_gltf(&mut out, options)
    }

    pub fn write_glb_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut out = create_file(path.as_ref())?;
        self.write_glb(&mut out)
    }

    /// Renders the document in the debug format: indented, without commas or
    /// key quotes.
    pub fn describe(&self) -> String {
        let mut out = Vec::new();
        if let Err(e) = Writer::new(&mut out, WriteOptions::debug()).write_document(self) {
            error!("Failed to render document: {}", e);
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    /// One-line descriptions of every entity, table by table.
    pub fn entity_descriptions(&self) -> Vec<String> {
        fn add<T: RootObject>(lines: &mut Vec<String>, table: &RootArray<T>) {
            lines.extend(table.iter().enumerate().map(|(i, object)| describe(i, object)));
        }

        let mut lines = Vec::new();
        add(&mut lines, &self.accessors);
        add(&mut lines, &self.animations);
        add(&mut lines, &self.buffers);
        add(&mut lines, &self.buffer_views);
        add(&mut lines, &self.cameras);
        add(&mut lines, &self.images);
        add(&mut lines, &self.materials);
        add(&mut lines, &self.meshes);
        add(&mut lines, &self.nodes);
        add(&mut lines, &self.samplers);
        add(&mut lines, &self.scenes);
        add(&mut lines, &self.skins);
        add(&mut lines, &self.textures);
        lines
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// The scene to show by default: the `scene` property, else the first
    /// scene.
    pub fn default_scene(&self) -> Option<Handle<Scene>> {
        self.scene
            .clone()
            .filter(Handle::is_live)
            .or_else(|| self.scenes.handle(0))
    }

    /// Removes every entity nothing refers to, repeating until no more can be
    /// removed. Scenes and animations are kept. Returns the number removed.
    pub fn garbage_collect(&mut self) -> usize {
        fn collect<T: RootObject>(table: &mut RootArray<T>) -> usize {
            if T::COLLECTABLE {
                table.garbage_collect()
            } else {
                0
            }
        }

        let mut total = 0;
        loop {
            let count = collect(&mut self.accessors)
                + collect(&mut self.animations)
                + collect(&mut self.buffers)
                + collect(&mut self.buffer_views)
                + collect(&mut self.cameras)
                + collect(&mut self.images)
                + collect(&mut self.materials)
                + collect(&mut self.meshes)
                + collect(&mut self.nodes)
                + collect(&mut self.samplers)
                + collect(&mut self.scenes)
                + collect(&mut self.skins)
                + collect(&mut self.textures);
            if count == 0 {
                break;
            }
            total += count;
        }
        debug!("Garbage collection removed {} entities", total);
        total
    }

    /// Turns every loaded buffer into a base64 data URI buffer so the
    /// document can be written as a single JSON file. Returns the number of
    /// buffers changed.
    pub fn embed_buffers(&mut self) -> usize {
        self.embed_buffers_where(|buffer| !buffer.uri.as_ref().map_or(false, UriReference::is_data))
    }

    /// Embeds the loaded buffers that have no URI, such as the binary chunk
    /// of a GLB file. JSON output has no other way to carry their data.
    pub fn embed_binary_buffers(&mut self) -> usize {
        self.embed_buffers_where(|buffer| buffer.uri.is_none())
    }

    fn embed_buffers_where(&mut self, select: impl Fn(&Buffer) -> bool) -> usize {
        let mut count = 0;
        for index in 0..self.buffers.len() {
            let embeddable = self
                .buffers
                .at(index)
                .map_or(false, |buffer| !buffer.data.is_empty() && select(buffer));
            if !embeddable {
                continue;
            }
            if let Some(buffer) = self.buffers.at_mut(index) {
                buffer.uri = Some(UriReference::data_uri(
                    "application/octet-stream",
                    &buffer.data,
                ));
                buffer.byte_length = buffer.data.len();
                count += 1;
            }
        }
        count
    }
}

impl GltfObject for GltfRoot {
    /// Top-level properties always go to the parser's own document.
    fn parse_property(&mut self, parser: &mut Parser<'_>, key: &str) -> Result<()> {
        parser.parse_root_property(key)
    }

    fn write_properties(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_property_always("asset", &self.asset)?;
        w.write_property("extensionsUsed", &self.extensions_used)?;
        w.write_property("extensionsRequired", &self.extensions_required)?;
        w.write_property("accessors", &self.accessors)?;
        w.write_property("animations", &self.animations)?;
        w.write_property("buffers", &self.buffers)?;
        w.write_property("bufferViews", &self.buffer_views)?;
        w.write_property("cameras", &self.cameras)?;
        w.write_property("images", &self.images)?;
        w.write_property("materials", &self.materials)?;
        w.write_property("meshes", &self.meshes)?;
        w.write_property("nodes", &self.nodes)?;
        w.write_property("scene", &self.scene)?;
        w.write_property("samplers", &self.samplers)?;
        w.write_property("scenes", &self.scenes)?;
        w.write_property("skins", &self.skins)?;
        w.write_property("textures", &self.textures)?;
        self.base.write_properties(w)
    }

    fn clear(&mut self) {
        GltfRoot::clear(self);
    }
}

fn peek(input: &mut dyn BufRead) -> Result<Option<u8>> {
    Ok(input.fill_buf()?.first().copied())
}

fn not_gltf() -> GltfError {
    error!("This does not appear to be a glTF file.");
    GltfError::NotGltf
}

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        error!("Unable to open {} for writing: {}", path.display(), e);
        GltfError::from(e)
    })?;
    Ok(BufWriter::new(file))
}
