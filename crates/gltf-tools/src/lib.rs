//! Commands behind the `gltf-tool` binary.
//!
//! Each command takes paths and options and returns what it would print, so
//! the binary stays a thin argument parser.

use std::path::Path;

use gltf_core::{GltfError, GltfRoot, RootArray, RootObject, WriteOptions};
use gltf_loader::{CoordinateSystem, Loader, LoaderOptions, Result, SceneNode};
use log::{info, warn};

/// Options for [`convert`].
#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// JSON indent width; negative writes everything on one line.
    pub indent: i32,
    /// Turn external buffers into data URIs before writing JSON.
    pub embed: bool,
    /// Drop unreferenced entities before writing.
    pub gc: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            indent: 2,
            embed: false,
            gc: false,
        }
    }
}

/// Reads a document. External resources that fail to load are reported but
/// do not stop the command.
pub fn read_document(path: &Path) -> Result<GltfRoot> {
    let mut root = GltfRoot::new();
    match root.read_file(path) {
        Ok(()) => {}
        Err(GltfError::Externals { failed }) => {
            warn!("{}: {} external resource(s) could not be loaded", path.display(), failed);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(root)
}

fn is_glb(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("glb"))
}

fn count_line<T: RootObject>(out: &mut String, label: &str, table: &RootArray<T>) {
    if !table.is_empty() {
        out.push_str(&format!("  {:<12} {}\n", label, table.len()));
    }
}

/// Asset information, entity counts and extensions of a document.
pub fn info(root: &GltfRoot) -> String {
    let mut out = String::new();
    if let Some(filename) = &root.filename {
        out.push_str(&format!("{}\n", filename.display()));
    }
    let asset = &root.asset;
    out.push_str(&format!("version: {}\n", asset.version));
    if !asset.min_version.is_empty() {
        out.push_str(&format!("minVersion: {}\n", asset.min_version));
    }
    if !asset.generator.is_empty() {
        out.push_str(&format!("generator: {}\n", asset.generator));
    }
    if !asset.copyright.is_empty() {
        out.push_str(&format!("copyright: {}\n", asset.copyright));
    }

    out.push_str("entities:\n");
    count_line(&mut out, "accessors", &root.accessors);
    count_line(&mut out, "animations", &root.animations);
    count_line(&mut out, "buffers", &root.buffers);
    count_line(&mut out, "bufferViews", &root.buffer_views);
    count_line(&mut out, "cameras", &root.cameras);
    count_line(&mut out, "images", &root.images);
    count_line(&mut out, "materials", &root.materials);
    count_line(&mut out, "meshes", &root.meshes);
    count_line(&mut out, "nodes", &root.nodes);
    count_line(&mut out, "samplers", &root.samplers);
    count_line(&mut out, "scenes", &root.scenes);
    count_line(&mut out, "skins", &root.skins);
    count_line(&mut out, "textures", &root.textures);

    if !root.extensions_used.is_empty() {
        out.push_str(&format!("extensionsUsed: {}\n", root.extensions_used.join(", ")));
    }
    if !root.extensions_required.is_empty() {
        out.push_str(&format!("extensionsRequired: {}\n", root.extensions_required.join(", ")));
    }
    out
}

/// Writes `root` to `output`, as GLB if the extension is `.glb` and as JSON
/// otherwise.
pub fn write_document(root: &GltfRoot, output: &Path, indent: i32) -> Result<()> {
    if is_glb(output) {
        root.write_glb_file(output)?;
    } else {
        root.write_gltf_file(output, WriteOptions::json(indent))?;
    }
    info!("Wrote {}", output.display());
    Ok(())
}

pub fn convert(input: &Path, output: &Path, options: ConvertOptions) -> Result<()> {
    let mut root = read_document(input)?;
    if options.gc {
        let removed = root.garbage_collect();
        info!("Removed {} unreferenced entities", removed);
    }
    if options.embed && !is_glb(output) {
        let embedded = root.embed_buffers();
        info!("Embedded {} buffers", embedded);
    }
    embed_binary_chunk(&mut root, output);
    write_document(&root, output, options.indent)
}

/// JSON output cannot refer to a GLB binary chunk, so buffers without a URI
/// are written as data URIs instead.
fn embed_binary_chunk(root: &mut GltfRoot, output: &Path) {
    if is_glb(output) {
        return;
    }
    let embedded = root.embed_binary_buffers();
    if embedded > 0 {
        info!("Embedded {} buffers without a URI", embedded);
    }
}

/// Garbage-collects `input` into `output`. Returns the number of entities
/// removed.
pub fn gc(input: &Path, output: &Path) -> Result<usize> {
    let mut root = read_document(input)?;
    let removed = root.garbage_collect();
    embed_binary_chunk(&mut root, output);
    write_document(&root, output, 2)?;
    Ok(removed)
}

/// The debug rendering of a document followed by a one-line summary of each
/// entity.
pub fn dump(root: &GltfRoot) -> String {
    let mut out = root.describe();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    for line in root.entity_descriptions() {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Converts the default scene and renders the resulting tree.
pub fn scene(input: &Path, coordinate_system: CoordinateSystem) -> Result<String> {
    let root = read_document(input)?;
    let mut loader = Loader::new(LoaderOptions {
        coordinate_system,
        ..Default::default()
    });
    loader.update_all(&root);
    Ok(render_scene(&loader.root_node(), &loader))
}

fn render_scene(node: &SceneNode, loader: &Loader) -> String {
    let stats = loader.stats();
    let mut out = node.ls();
    out.push_str(&format!(
        "{} geoms in {} meshes ({})\n",
        node.count_geoms(),
        stats.meshes,
        loader.coordinate_system()
    ));
    if stats.cycles > 0 {
        out.push_str(&format!("{} node cycles skipped\n", stats.cycles));
    }
    out
}
