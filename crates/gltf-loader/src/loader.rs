//! Incremental conversion of a glTF document into a scene graph.
//!
//! The [`Loader`] caches what it produced for every node, mesh, material and
//! texture together with the effective modification stamp of the source at
//! the time (see [`crate::dependencies`]). Asking for an entity whose stamp is
//! unchanged returns the cached artifact; otherwise the artifact is rebuilt
//! in place, so nodes handed out earlier pick up the change.
//!
//! The loader does not hold on to the document. Every operation takes the
//! [`GltfRoot`] to read from, and the caller is free to mutate it between
//! calls. Cache entries are keyed by weak handles and are pruned once their
//! entity is gone.
//!
//! Conversion does not fail: problems are logged and the offending piece is
//! left out or replaced with a placeholder.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use glam::Mat4;
use log::{debug, error, warn};

use gltf_core::schema::sampler;
use gltf_core::{
    describe, Accessor, AlphaMode, ComponentType, GltfError, GltfRoot, Handle, PrimitiveMode,
    UpdateSeq, WeakHandle,
};

use crate::callbacks::{LoaderCallbacks, Next};
use crate::coordsys::CoordinateSystem;
use crate::dependencies;
use crate::error::{LoaderError, Result};
use crate::geom::{zeroed, Contents, Geom, GeomPrimitive, IndexBuffer, NumericType, PrimitiveType, VertexData, VertexFormat};
use crate::material::Material;
use crate::scene::SceneNode;
use crate::state::{RenderState, TextureStage, TransparencyMode};
use crate::texture::{decode_image, FilterType, SamplerState, Texture, TexturePool, WrapMode};

/// Vertex attribute semantics that are converted, with the column each one
/// becomes.
const VERTEX_COLUMNS: [(&str, &str, Contents); 8] = [
    ("POSITION", "vertex", Contents::Point),
    ("NORMAL", "normal", Contents::Normal),
    ("TANGENT", "tangent", Contents::Vector),
    ("COLOR_0", "color", Contents::Color),
    ("TEXCOORD_0", "texcoord", Contents::TexCoord),
    ("TEXCOORD_1", "texcoord.1", Contents::TexCoord),
    ("JOINTS_0", "transform_index", Contents::Index),
    ("WEIGHTS_0", "transform_weight", Contents::Other),
];

#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Coordinate system of the produced scene.
    pub coordinate_system: CoordinateSystem,
    /// Pool to load image files through; a private pool is used if unset.
    pub texture_pool: Option<Rc<TexturePool>>,
}

/// Number of artifacts (re)built since the loader was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub nodes: usize,
    pub meshes: usize,
    pub materials: usize,
    pub textures: usize,
    pub geoms: usize,
    /// Reentrant node updates refused because of a cycle.
    pub cycles: usize,
}

struct Converted<T> {
    artifact: Option<T>,
    modified: UpdateSeq,
    updating: bool,
}

impl<T> Default for Converted<T> {
    fn default() -> Self {
        Converted {
            artifact: None,
            modified: UpdateSeq::INITIAL,
            updating: false,
        }
    }
}

impl<T: Clone> Converted<T> {
    /// The artifact, if it was built from exactly this stamp.
    fn current(&self, stamp: UpdateSeq) -> Option<T> {
        self.artifact.clone().filter(|_| self.modified == stamp)
    }
}

pub struct Loader {
    coordinate_system: CoordinateSystem,
    cs_matrix: Mat4,
    inv_cs_matrix: Mat4,
    pool: Rc<TexturePool>,

    callbacks: Rc<Vec<Rc<dyn LoaderCallbacks>>>,
    sorts: Vec<i32>,

    nodes: HashMap<WeakHandle<gltf_core::Node>, Converted<SceneNode>>,
    meshes: HashMap<WeakHandle<gltf_core::Mesh>, Converted<SceneNode>>,
    materials: HashMap<WeakHandle<gltf_core::Material>, Converted<Rc<Material>>>,
    textures: HashMap<WeakHandle<gltf_core::Texture>, Converted<Rc<Texture>>>,

    root_node: SceneNode,
    any_updated: bool,
    stats: ConversionStats,
    /// Subtree stamps of the running [`Loader::update_all`] pass.
    stamp_cache: Option<dependencies::StampCache>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(LoaderOptions::default())
    }
}

impl Loader {
    pub fn new(options: LoaderOptions) -> Self {
        let cs = options.coordinate_system;
        Loader {
            coordinate_system: cs,
            cs_matrix: CoordinateSystem::convert_mat(CoordinateSystem::YupRight, cs),
            inv_cs_matrix: CoordinateSystem::convert_mat(cs, CoordinateSystem::YupRight),
            pool: options.texture_pool.unwrap_or_default(),
            callbacks: Rc::new(Vec::new()),
            sorts: Vec::new(),
            nodes: HashMap::new(),
            meshes: HashMap::new(),
            materials: HashMap::new(),
            textures: HashMap::new(),
            root_node: SceneNode::model_root(""),
            any_updated: false,
            stats: ConversionStats::default(),
            stamp_cache: None,
        }
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }

    pub fn texture_pool(&self) -> &Rc<TexturePool> {
        &self.pool
    }

    pub fn stats(&self) -> ConversionStats {
        self.stats
    }

    /// The model root that [`Loader::update_all`] fills with the default
    /// scene.
    pub fn root_node(&self) -> SceneNode {
        self.root_node.clone()
    }

    /// Adds `callbacks` to the chain. Links with a lower `sort` run first; a
    /// new link goes before existing links with the same sort.
    pub fn register_callbacks(&mut self, sort: i32, callbacks: Rc<dyn LoaderCallbacks>) {
        let at = self.sorts.partition_point(|s| *s < sort);
        self.sorts.insert(at, sort);
        Rc::make_mut(&mut self.callbacks).insert(at, callbacks);
    }

    pub fn num_callbacks(&self) -> usize {
        self.callbacks.len()
    }

    /// Forgets cached artifacts of entities that no longer exist. Returns the
    /// number of entries dropped.
    pub fn prune(&mut self) -> usize {
        let before = self.nodes.len() + self.meshes.len() + self.materials.len() + self.textures.len();
        self.nodes.retain(|key, _| key.is_live());
        self.meshes.retain(|key, _| key.is_live());
        self.materials.retain(|key, _| key.is_live());
        self.textures.retain(|key, _| key.is_live());
        before - (self.nodes.len() + self.meshes.len() + self.materials.len() + self.textures.len())
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Brings every mesh and node up to date and loads the default scene (or
    /// the first scene) into [`Loader::root_node`]. Returns whether anything
    /// was rebuilt.
    pub fn update_all(&mut self, root: &GltfRoot) -> bool {
        self.any_updated = false;
        self.prune();
        self.stamp_cache = Some(dependencies::StampCache::default());

        if let Some(filename) = &root.filename {
            let name = filename
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.root_node.set_name(name);
        }
        self.root_node
            .set_source(root.filename.as_deref(), root.timestamp);

        for mesh in root.meshes.handles() {
            self.update_mesh(root, &mesh);
        }
        for node in root.nodes.handles() {
            self.update_node(root, &node);
        }

        let root_node = self.root_node.clone();
        match root.default_scene() {
            Some(scene) => self.load_scene(root, &root_node, &scene),
            None => root_node.remove_all_children(),
        }
        self.stamp_cache = None;
        self.any_updated
    }

    /// Replaces the children of `scene_root` with the converted top-level
    /// nodes of `scene`.
    pub fn load_scene(&mut self, root: &GltfRoot, scene_root: &SceneNode, scene: &Handle<gltf_core::Scene>) {
        scene_root.remove_all_children();
        let Some(scene) = root.scenes.get(scene) else {
            return;
        };
        for node in &scene.nodes {
            if let Some(converted) = self.update_node(root, node) {
                scene_root.add_child(converted);
            }
        }
    }

    /// Returns the converted node, rebuilding it if the node or anything in
    /// its subtree changed. `None` if the node no longer exists, or if it is
    /// reached again while being converted and had never been converted
    /// before.
    pub fn update_node(&mut self, root: &GltfRoot, handle: &Handle<gltf_core::Node>) -> Option<SceneNode> {
        let node = root.nodes.get(handle)?;
        let stamp = match self.stamp_cache.as_mut() {
            Some(cache) => dependencies::node_stamp_cached(root, handle, cache),
            None => dependencies::node_stamp(root, handle),
        };

        let entry = self.nodes.entry(handle.downgrade()).or_default();
        if let Some(artifact) = entry.current(stamp) {
            return Some(artifact);
        }
        if entry.updating {
            error!(
                "Detected attempt to recursively update {}. Check that there are no cycles in the scene graph.",
                describe(handle.index(), node)
            );
            let artifact = entry.artifact.clone();
            self.stats.cycles += 1;
            return artifact;
        }

        entry.updating = true;
        let previous = entry.artifact.clone();
        if let Some(previous) = &previous {
            previous.remove_all_children();
        }

        let chain = Rc::clone(&self.callbacks);
        let artifact = Next::new(self, root, &chain).update_node(previous, node);

        let entry = self.nodes.entry(handle.downgrade()).or_default();
        entry.artifact = Some(artifact.clone());
        entry.modified = stamp;
        entry.updating = false;
        self.any_updated = true;
        self.stats.nodes += 1;
        Some(artifact)
    }

    /// Returns the geom node holding one geom per primitive of the mesh.
    pub fn update_mesh(&mut self, root: &GltfRoot, handle: &Handle<gltf_core::Mesh>) -> Option<SceneNode> {
        let mesh = root.meshes.get(handle)?;
        let stamp = dependencies::mesh_stamp(root, handle);

        let entry = self.meshes.entry(handle.downgrade()).or_default();
        if let Some(artifact) = entry.current(stamp) {
            return Some(artifact);
        }
        let geom_node = entry
            .artifact
            .get_or_insert_with(|| SceneNode::geom_node(mesh.name.as_str()))
            .clone();
        geom_node.set_name(mesh.name.as_str());
        geom_node.remove_all_geoms();

        let chain = Rc::clone(&self.callbacks);
        for primitive in &mesh.primitives {
            let Some(geom) = Next::new(self, root, &chain).make_geom(mesh, primitive) else {
                continue;
            };
            let state = Next::new(self, root, &chain).make_geom_state(mesh, primitive);
            geom_node.add_geom(Rc::new(geom), Rc::new(state));
            self.stats.geoms += 1;
        }

        if let Some(entry) = self.meshes.get_mut(&handle.downgrade()) {
            entry.modified = stamp;
        }
        self.any_updated = true;
        self.stats.meshes += 1;
        Some(geom_node)
    }

    pub fn update_material(
        &mut self,
        root: &GltfRoot,
        handle: &Handle<gltf_core::Material>,
    ) -> Option<Rc<Material>> {
        let material = root.materials.get(handle)?;
        let stamp = dependencies::material_stamp(root, handle);

        let entry = self.materials.entry(handle.downgrade()).or_default();
        if let Some(artifact) = entry.current(stamp) {
            return Some(artifact);
        }
        let previous = entry.artifact.take();

        let chain = Rc::clone(&self.callbacks);
        let artifact = Next::new(self, root, &chain).update_material(previous, material);

        let entry = self.materials.entry(handle.downgrade()).or_default();
        entry.artifact = Some(Rc::clone(&artifact));
        entry.modified = stamp;
        self.any_updated = true;
        self.stats.materials += 1;
        Some(artifact)
    }

    pub fn update_texture(
        &mut self,
        root: &GltfRoot,
        handle: &Handle<gltf_core::Texture>,
    ) -> Option<Rc<Texture>> {
        let texture = root.textures.get(handle)?;
        let stamp = dependencies::texture_stamp(root, handle);

        let entry = self.textures.entry(handle.downgrade()).or_default();
        if let Some(artifact) = entry.current(stamp) {
            return Some(artifact);
        }
        let previous = entry.artifact.take();

        let chain = Rc::clone(&self.callbacks);
        let artifact = Next::new(self, root, &chain).update_texture(previous, texture);

        let entry = self.textures.entry(handle.downgrade()).or_default();
        entry.artifact = Some(Rc::clone(&artifact));
        entry.modified = stamp;
        self.any_updated = true;
        self.stats.textures += 1;
        Some(artifact)
    }

    fn is_updating(&self, handle: &Handle<gltf_core::Node>) -> bool {
        self.nodes
            .get(&handle.downgrade())
            .map_or(false, |entry| entry.updating)
    }

    // =========================================================================
    // Built-in conversions, reached at the end of the callback chain
    // =========================================================================

    /// Converts a node: attaches its mesh's geom node, sets its transform in
    /// the target coordinate system and attaches its converted children.
    pub fn do_update_node(
        &mut self,
        root: &GltfRoot,
        previous: Option<SceneNode>,
        node: &gltf_core::Node,
    ) -> SceneNode {
        let scene_node = previous.unwrap_or_else(|| SceneNode::new(node.name.as_str()));
        scene_node.set_name(node.name.as_str());

        if let Some(mesh) = &node.mesh {
            if let Some(geom_node) = self.update_mesh(root, mesh) {
                scene_node.add_child(geom_node);
            }
        }

        let mat = node.matrix().as_mat4();
        scene_node.set_transform(self.cs_matrix * mat * self.inv_cs_matrix);

        for child in &node.children {
            // A child still being converted is one of our ancestors.
            let ancestor = self.is_updating(child);
            if let Some(converted) = self.update_node(root, child) {
                if !ancestor {
                    scene_node.add_child(converted);
                }
            }
        }
        scene_node
    }

    pub fn do_update_material(&mut self, previous: Option<Rc<Material>>, material: &gltf_core::Material) -> Rc<Material> {
        let mut artifact = previous.unwrap_or_default();
        let target = Rc::make_mut(&mut artifact);
        target.name = material.name.clone();

        let pbr = &material.pbr_metallic_roughness;
        target.base_color = pbr.base_color_factor.as_vec4();
        target.metallic = pbr.metallic_factor as f32;
        target.roughness = pbr.roughness_factor as f32;
        target.emission = material.emissive_factor.map(|e| e.as_vec3().extend(1.0));
        artifact
    }

    /// Converts a texture. Images named by file go through the texture pool;
    /// embedded images are decoded in memory. An image that fails to load
    /// yields a texture without an image, remembering the path it tried.
    pub fn do_update_texture(
        &mut self,
        root: &GltfRoot,
        previous: Option<Rc<Texture>>,
        texture: &gltf_core::Texture,
    ) -> Rc<Texture> {
        let mut artifact = previous.unwrap_or_default();
        let image = texture.source.as_ref().and_then(|h| root.images.get(h));

        match image {
            Some(image) => match image.uri.as_ref().filter(|uri| uri.has_filename()) {
                Some(uri) => {
                    let fullpath = uri.fullpath().map(Path::to_path_buf).or_else(|| uri.filename());
                    if artifact.fullpath != fullpath || !artifact.has_image() {
                        let mut reloaded = Texture {
                            fullpath: fullpath.clone(),
                            ..Texture::default()
                        };
                        if let Some(path) = &fullpath {
                            match self.pool.load(path) {
                                Ok(image) => reloaded.image = Some(image),
                                Err(e) => error!("Failed to load texture: {}: {}", uri, e),
                            }
                        }
                        artifact = Rc::new(reloaded);
                    }
                    Rc::make_mut(&mut artifact).filename = uri.filename();
                }
                None => {
                    if artifact.has_fullpath() {
                        artifact = Rc::default();
                    }
                    let decoded = image
                        .open_read(root)
                        .map_err(LoaderError::from)
                        .and_then(|bytes| decode_image(&bytes));
                    let target = Rc::make_mut(&mut artifact);
                    match decoded {
                        Ok(decoded) => target.image = Some(Rc::new(decoded)),
                        Err(e) => {
                            error!("Failed to load image {:?}: {}", image.name, e);
                            target.image = None;
                        }
                    }
                }
            },
            None => {
                if artifact.has_fullpath() {
                    artifact = Rc::default();
                }
            }
        }

        let target = Rc::make_mut(&mut artifact);
        target.name = texture.name.clone();
        target.sampler = SamplerState::default();
        if let Some(handle) = &texture.sampler {
            if let Some(source) = root.samplers.get(handle) {
                apply_sampler(&mut target.sampler, source, &describe(handle.index(), source));
            }
        }
        artifact
    }

    /// Builds the geometry of a primitive. Attributes are copied into one
    /// interleaved vertex array; a binormal column is derived when both
    /// normals and tangents are present.
    pub fn make_geom(
        &self,
        root: &GltfRoot,
        mesh: &gltf_core::Mesh,
        primitive: &gltf_core::Primitive,
    ) -> Option<Geom> {
        let mut format = VertexFormat::new();
        let mut num_rows = 0;
        let mut sources: Vec<(&str, &Accessor)> = Vec::new();
        for (semantic, column, contents) in VERTEX_COLUMNS {
            let Some(accessor) = primitive.attributes.get(semantic).and_then(|h| root.accessors.get(h)) else {
                continue;
            };
            format.add_column(
                column,
                accessor.num_components(),
                numeric_type(accessor.component_type),
                accessor.normalized,
                contents,
            );
            if let Err(e) = check_accessor(root, accessor) {
                error!("Mesh {:?}: cannot load {} column: {}", mesh.name, column, e);
                return None;
            }
            num_rows = num_rows.max(accessor.count);
            sources.push((column, accessor));
        }

        let derive_binormal = format.has_column("normal") && format.has_column("tangent");
        if derive_binormal {
            format.add_column("binormal", 3, NumericType::Float32, false, Contents::Vector);
        }

        let stride = format.stride();
        let Some(mut vdata) = VertexData::try_new(format, num_rows) else {
            error!("Mesh {:?}: cannot allocate {} vertices of {} bytes", mesh.name, num_rows, stride);
            return None;
        };
        for (column, accessor) in sources {
            let start = vdata.format().column(column).map_or(0, |c| c.start);
            if let Err(e) = load_accessor(root, accessor, vdata.data_mut(), start, stride) {
                error!("Mesh {:?}: cannot load {} column: {}", mesh.name, column, e);
                return None;
            }
        }
        if derive_binormal {
            derive_binormals(&mut vdata);
        }

        let primitive_type = match primitive.mode {
            PrimitiveMode::Points => PrimitiveType::Points,
            PrimitiveMode::Lines => PrimitiveType::Lines,
            PrimitiveMode::LineLoop | PrimitiveMode::LineStrip => PrimitiveType::LineStrips,
            PrimitiveMode::Triangles => PrimitiveType::Triangles,
            PrimitiveMode::TriangleStrip => PrimitiveType::TriangleStrips,
            PrimitiveMode::TriangleFan => PrimitiveType::TriangleFans,
        };

        let mut geom_primitive = match &primitive.indices {
            Some(handle) => {
                let Some(accessor) = root.accessors.get(handle) else {
                    error!("Mesh {:?}: index accessor does not exist", mesh.name);
                    return None;
                };
                let index_type = match accessor.component_type {
                    ComponentType::UnsignedByte => NumericType::Uint8,
                    ComponentType::UnsignedShort => NumericType::Uint16,
                    ComponentType::UnsignedInt => NumericType::Uint32,
                    other => {
                        error!("Mesh {:?}: invalid index type {:?}", mesh.name, other);
                        return None;
                    }
                };
                let size = index_type.byte_length();
                if let Err(e) = check_accessor(root, accessor) {
                    error!("Mesh {:?}: cannot load indices: {}", mesh.name, e);
                    return None;
                }
                let Some(mut data) = zeroed(accessor.count, size) else {
                    error!("Mesh {:?}: cannot allocate {} indices", mesh.name, accessor.count);
                    return None;
                };
                if let Err(e) = load_accessor(root, accessor, &mut data, 0, size) {
                    error!("Mesh {:?}: cannot load indices: {}", mesh.name, e);
                    return None;
                }
                GeomPrimitive::indexed(primitive_type, IndexBuffer { index_type, data })
            }
            None => GeomPrimitive::consecutive(primitive_type, 0, num_rows),
        };
        if primitive.mode == PrimitiveMode::LineLoop {
            geom_primitive.close_loop();
        }

        let mut geom = Geom::new(vdata, geom_primitive);
        geom.transform_vertices(&self.cs_matrix);
        Some(geom)
    }

    /// Derives the render state of a primitive from its material.
    pub fn make_geom_state(
        &mut self,
        root: &GltfRoot,
        _mesh: &gltf_core::Mesh,
        primitive: &gltf_core::Primitive,
    ) -> RenderState {
        let mut state = RenderState::default();
        let Some(handle) = &primitive.material else {
            return state;
        };
        let Some(material) = root.materials.get(handle) else {
            return state;
        };
        state.material = self.update_material(root, handle);

        state.transparency = match &material.alpha_mode {
            AlphaMode::Opaque => TransparencyMode::None,
            AlphaMode::Mask => TransparencyMode::Binary,
            AlphaMode::Blend => TransparencyMode::Alpha,
            AlphaMode::Other(name) => {
                error!("Invalid alpha mode '{}'", name);
                TransparencyMode::None
            }
        };
        if material.alpha_mode == AlphaMode::Mask {
            state.alpha_test = material.alpha_cutoff.map(|cutoff| cutoff as f32);
        }
        state.two_sided = material.double_sided;

        if let Some(info) = &material.pbr_metallic_roughness.base_color_texture {
            if let Some(texture) = info.texture.as_ref().and_then(|t| self.update_texture(root, t)) {
                state.add_texture(TextureStage::color(info.tex_coord), texture);
            }
        }
        if let Some(info) = &material.normal_texture {
            if let Some(texture) = info.texture.as_ref().and_then(|t| self.update_texture(root, t)) {
                state.add_texture(TextureStage::normal(info.tex_coord), texture);
            }
        }
        state
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn numeric_type(component_type: ComponentType) -> NumericType {
    match component_type {
        ComponentType::Byte => NumericType::Int8,
        ComponentType::UnsignedByte => NumericType::Uint8,
        ComponentType::Short => NumericType::Int16,
        ComponentType::UnsignedShort => NumericType::Uint16,
        ComponentType::UnsignedInt => NumericType::Uint32,
        ComponentType::Float => NumericType::Float32,
    }
}

/// End of `count` elements of `width` bytes placed `stride` apart from
/// `offset`, or `None` on overflow.
fn span_end(offset: usize, stride: usize, count: usize, width: usize) -> Option<usize> {
    if count == 0 {
        return Some(offset);
    }
    stride.checked_mul(count - 1)?.checked_add(width)?.checked_add(offset)
}

fn range_error(message: String) -> GltfError {
    GltfError::AccessorRange(message)
}

/// Checks that the elements of `accessor` lie within its buffer view and
/// the view within its buffer, and returns the bytes from the first element
/// on together with the source stride. The source stride is the view's
/// `byteStride`, or the element width if it has none. An accessor without a
/// buffer view has no source and yields `None`.
pub fn check_accessor<'r>(
    root: &'r GltfRoot,
    accessor: &Accessor,
) -> gltf_core::Result<Option<(&'r [u8], usize)>> {
    let Some(view_handle) = &accessor.buffer_view else {
        return Ok(None);
    };
    let view = root
        .buffer_views
        .get(view_handle)
        .ok_or(GltfError::DanglingReference("bufferView"))?;
    let buffer = view
        .buffer
        .as_ref()
        .and_then(|h| root.buffers.get(h))
        .ok_or(GltfError::DanglingReference("buffer"))?;

    let width = accessor.element_size();
    let count = accessor.count;
    let src_stride = view.byte_stride.filter(|s| *s != 0).unwrap_or(width);

    if width > src_stride {
        return Err(range_error(format!(
            "byteStride {} is smaller than the element size {}",
            src_stride, width
        )));
    }
    let view_end = view.byte_offset.checked_add(view.byte_length);
    if view_end.map_or(true, |end| end > buffer.data.len()) {
        return Err(range_error(format!(
            "buffer view {}..{} exceeds the {} bytes of its buffer",
            view.byte_offset,
            view.byte_offset.saturating_add(view.byte_length),
            buffer.data.len()
        )));
    }
    if span_end(accessor.byte_offset, src_stride, count, width).map_or(true, |end| end > view.byte_length) {
        return Err(range_error(format!(
            "{} elements of {} bytes at offset {} with stride {} exceed the buffer view length {}",
            count, width, accessor.byte_offset, src_stride, view.byte_length
        )));
    }
    Ok(Some((&buffer.data[view.byte_offset + accessor.byte_offset..], src_stride)))
}

/// Copies the elements of `accessor` into `dst`, the first at `offset` and
/// each subsequent one `dst_stride` bytes further.
///
/// Every range involved is checked before anything is copied: the source
/// ranges as in [`check_accessor`] and the destination within `dst`. An
/// accessor without a buffer view copies nothing, leaving its elements zero.
pub fn load_accessor(
    root: &GltfRoot,
    accessor: &Accessor,
    dst: &mut [u8],
    offset: usize,
    dst_stride: usize,
) -> gltf_core::Result<()> {
    let Some((src, src_stride)) = check_accessor(root, accessor)? else {
        return Ok(());
    };
    let width = accessor.element_size();
    let count = accessor.count;
    if dst_stride < width || span_end(offset, dst_stride, count, width).map_or(true, |end| end > dst.len()) {
        return Err(range_error(format!(
            "{} elements of {} bytes do not fit the destination of {} bytes",
            count,
            width,
            dst.len()
        )));
    }

    for i in 0..count {
        let s = i * src_stride;
        let d = offset + i * dst_stride;
        dst[d..d + width].copy_from_slice(&src[s..s + width]);
    }
    Ok(())
}

fn derive_binormals(vdata: &mut VertexData) {
    let mut warned = false;
    for row in 0..vdata.num_rows() {
        let (Some(normal), Some(tangent)) = (vdata.get_vec3("normal", row), vdata.get_vec4("tangent", row)) else {
            continue;
        };
        if cfg!(debug_assertions) && !warned && (tangent.w.abs() - 1.0).abs() > 1e-3 {
            warn!("glTF mesh tangent w values should be 1.0 or -1.0");
            warned = true;
        }
        vdata.set_vec3("binormal", row, normal.cross(tangent.truncate()) * tangent.w);
    }
}

fn filter_type(code: usize) -> Option<FilterType> {
    match code {
        sampler::NEAREST => Some(FilterType::Nearest),
        sampler::LINEAR => Some(FilterType::Linear),
        sampler::NEAREST_MIPMAP_NEAREST => Some(FilterType::NearestMipmapNearest),
        sampler::LINEAR_MIPMAP_NEAREST => Some(FilterType::LinearMipmapNearest),
        sampler::NEAREST_MIPMAP_LINEAR => Some(FilterType::NearestMipmapLinear),
        sampler::LINEAR_MIPMAP_LINEAR => Some(FilterType::LinearMipmapLinear),
        _ => None,
    }
}

fn wrap_mode(code: usize) -> Option<WrapMode> {
    match code {
        sampler::CLAMP_TO_EDGE => Some(WrapMode::Clamp),
        sampler::MIRRORED_REPEAT => Some(WrapMode::Mirror),
        sampler::REPEAT => Some(WrapMode::Repeat),
        _ => None,
    }
}

/// Maps sampler codes onto `state`. Invalid codes are logged and leave the
/// default in place.
fn apply_sampler(state: &mut SamplerState, source: &gltf_core::Sampler, what: &str) {
    if let Some(code) = source.mag_filter {
        match filter_type(code).filter(|f| matches!(f, FilterType::Nearest | FilterType::Linear)) {
            Some(filter) => state.magfilter = filter,
            None => error!("Invalid magFilter {} specified in {}", code, what),
        }
    }
    if let Some(code) = source.min_filter {
        match filter_type(code) {
            Some(filter) => state.minfilter = filter,
            None => error!("Invalid minFilter {} specified in {}", code, what),
        }
    }
    match wrap_mode(source.wrap_s) {
        Some(wrap) => state.wrap_u = wrap,
        None => error!("Invalid wrapS {} specified in {}", source.wrap_s, what),
    }
    match wrap_mode(source.wrap_t) {
        Some(wrap) => state.wrap_v = wrap,
        None => error!("Invalid wrapT {} specified in {}", source.wrap_t, what),
    }
}

/// Reads a glTF or GLB file and converts its default scene. Missing external
/// resources are logged and the rest of the document is still converted.
pub fn load_file(path: impl AsRef<Path>, options: LoaderOptions) -> Result<SceneNode> {
    let path = path.as_ref();
    let mut root = GltfRoot::new();
    match root.read_file(path) {
        Ok(()) => {}
        Err(GltfError::Externals { failed }) => {
            warn!("{}: {} external resource(s) could not be loaded", path.display(), failed);
        }
        Err(e) => return Err(e.into()),
    }

    let mut loader = Loader::new(options);
    loader.update_all(&root);
    debug!("Converted {}: {:?}", path.display(), loader.stats());
    Ok(loader.root_node())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_end() {
        assert_eq!(span_end(4, 8, 0, 4), Some(4));
        assert_eq!(span_end(4, 8, 3, 4), Some(24));
        assert_eq!(span_end(0, usize::MAX, 3, 1), None);
    }

    #[test]
    fn test_filter_codes() {
        assert_eq!(filter_type(9729), Some(FilterType::Linear));
        assert_eq!(filter_type(9987), Some(FilterType::LinearMipmapLinear));
        assert_eq!(filter_type(1234), None);
        assert_eq!(wrap_mode(33648), Some(WrapMode::Mirror));
    }

    #[test]
    fn test_invalid_sampler_codes_keep_defaults() {
        let mut state = SamplerState::default();
        let source = gltf_core::Sampler {
            mag_filter: Some(sampler::LINEAR_MIPMAP_LINEAR),
            min_filter: Some(sampler::NEAREST),
            wrap_s: 1,
            wrap_t: sampler::CLAMP_TO_EDGE,
            ..Default::default()
        };
        apply_sampler(&mut state, &source, "Sampler #0");
        assert_eq!(state.magfilter, FilterType::Default);
        assert_eq!(state.minfilter, FilterType::Nearest);
        assert_eq!(state.wrap_u, WrapMode::Repeat);
        assert_eq!(state.wrap_v, WrapMode::Clamp);
    }

    #[test]
    fn test_foreign_handle_is_dangling() {
        let mut other = GltfRoot::new();
        let foreign = Accessor {
            buffer_view: Some(other.buffer_views.resolve_or_create(0)),
            count: 1,
            ..Default::default()
        };
        let root = GltfRoot::new();
        let mut dst = [0u8; 8];
        assert!(matches!(
            load_accessor(&root, &foreign, &mut dst, 0, 4),
            Err(GltfError::DanglingReference("bufferView"))
        ));

        // No buffer view: nothing to copy.
        let detached = Accessor::default();
        assert!(load_accessor(&root, &detached, &mut dst, 0, 4).is_ok());
    }
}
