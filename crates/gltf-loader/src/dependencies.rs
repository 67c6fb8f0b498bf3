//! Effective modification stamps.
//!
//! A converted artifact depends on more than its source entity: a mesh's
//! geometry changes when an accessor, buffer view or buffer it reads from
//! changes, a node's subtree changes when any descendant does. The effective
//! stamp of an entity is the maximum stamp over everything its conversion
//! reads, so comparing it for equality detects staleness of the whole
//! dependency closure. Missing entities contribute nothing.

use std::collections::{HashMap, HashSet};

use gltf_core::{
    Accessor, BufferView, GltfRoot, Handle, Image, Material, Mesh, Node, Texture, UpdateSeq,
};

pub fn buffer_view_stamp(root: &GltfRoot, handle: &Handle<BufferView>) -> UpdateSeq {
    let Some(view) = root.buffer_views.get(handle) else {
        return UpdateSeq::INITIAL;
    };
    let own = root.buffer_views.modified(handle).unwrap_or_default();
    let buffer = view
        .buffer
        .as_ref()
        .and_then(|h| root.buffers.modified(h))
        .unwrap_or_default();
    own.max(buffer)
}

pub fn accessor_stamp(root: &GltfRoot, handle: &Handle<Accessor>) -> UpdateSeq {
    let Some(accessor) = root.accessors.get(handle) else {
        return UpdateSeq::INITIAL;
    };
    let own = root.accessors.modified(handle).unwrap_or_default();
    let view = accessor
        .buffer_view
        .as_ref()
        .map(|h| buffer_view_stamp(root, h))
        .unwrap_or_default();
    own.max(view)
}

pub fn image_stamp(root: &GltfRoot, handle: &Handle<Image>) -> UpdateSeq {
    let Some(image) = root.images.get(handle) else {
        return UpdateSeq::INITIAL;
    };
    let own = root.images.modified(handle).unwrap_or_default();
    let view = image
        .buffer_view
        .as_ref()
        .map(|h| buffer_view_stamp(root, h))
        .unwrap_or_default();
    own.max(view)
}

pub fn texture_stamp(root: &GltfRoot, handle: &Handle<Texture>) -> UpdateSeq {
    let Some(texture) = root.textures.get(handle) else {
        return UpdateSeq::INITIAL;
    };
    let mut stamp = root.textures.modified(handle).unwrap_or_default();
    if let Some(image) = &texture.source {
        stamp = stamp.max(image_stamp(root, image));
    }
    if let Some(sampler) = &texture.sampler {
        stamp = stamp.max(root.samplers.modified(sampler).unwrap_or_default());
    }
    stamp
}

pub fn material_stamp(root: &GltfRoot, handle: &Handle<Material>) -> UpdateSeq {
    let Some(material) = root.materials.get(handle) else {
        return UpdateSeq::INITIAL;
    };
    material
        .textures()
        .map(|texture| texture_stamp(root, texture))
        .fold(root.materials.modified(handle).unwrap_or_default(), UpdateSeq::max)
}

pub fn mesh_stamp(root: &GltfRoot, handle: &Handle<Mesh>) -> UpdateSeq {
    let Some(mesh) = root.meshes.get(handle) else {
        return UpdateSeq::INITIAL;
    };
    let mut stamp = root.meshes.modified(handle).unwrap_or_default();
    for primitive in &mesh.primitives {
        for accessor in primitive.accessors() {
            stamp = stamp.max(accessor_stamp(root, accessor));
        }
        if let Some(material) = &primitive.material {
            stamp = stamp.max(material_stamp(root, material));
        }
    }
    stamp
}

/// Subtree stamps already computed during one pass over a document that is
/// not modified in between. Only subtrees that were walked completely are
/// remembered; nodes on a cycle are recomputed every time.
#[derive(Debug, Default)]
pub struct StampCache {
    nodes: HashMap<usize, UpdateSeq>,
}

impl StampCache {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The stamp of a node's whole subtree. Each node is visited once, so
/// cyclic child lists terminate.
pub fn node_stamp(root: &GltfRoot, handle: &Handle<Node>) -> UpdateSeq {
    node_stamp_cached(root, handle, &mut StampCache::default())
}

/// Like [`node_stamp`], reusing and extending `cache`.
pub fn node_stamp_cached(root: &GltfRoot, handle: &Handle<Node>, cache: &mut StampCache) -> UpdateSeq {
    let mut visited = HashSet::new();
    subtree_stamp(root, handle, &mut visited, cache).0
}

/// Returns the stamp and whether the subtree was walked without running
/// into an already visited node.
fn subtree_stamp(
    root: &GltfRoot,
    handle: &Handle<Node>,
    visited: &mut HashSet<usize>,
    cache: &mut StampCache,
) -> (UpdateSeq, bool) {
    let index = handle.index();
    if let Some(stamp) = cache.nodes.get(&index) {
        return (*stamp, true);
    }
    if !visited.insert(index) {
        return (UpdateSeq::INITIAL, false);
    }
    let Some(node) = root.nodes.get(handle) else {
        return (UpdateSeq::INITIAL, true);
    };
    let mut stamp = root.nodes.modified(handle).unwrap_or_default();
    if let Some(mesh) = &node.mesh {
        stamp = stamp.max(mesh_stamp(root, mesh));
    }
    let mut complete = true;
    for child in &node.children {
        let (child_stamp, child_complete) = subtree_stamp(root, child, visited, cache);
        stamp = stamp.max(child_stamp);
        complete &= child_complete;
    }
    if complete {
        cache.nodes.insert(index, stamp);
    }
    (stamp, complete)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "asset": {"version": "2.0"},
        "nodes": [{"children": [1]}, {"mesh": 0}, {"children": [3]}, {"children": [2]}],
        "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "material": 0}]}],
        "materials": [{"pbrMetallicRoughness": {"baseColorTexture": {"index": 0}}}],
        "textures": [{"source": 0, "sampler": 0}],
        "samplers": [{}],
        "images": [{"uri": "a.png"}],
        "accessors": [{"bufferView": 0, "componentType": 5126, "count": 1, "type": "VEC3"}],
        "bufferViews": [{"buffer": 0, "byteLength": 12}],
        "buffers": [{"byteLength": 12}]
    }"#;

    fn load() -> GltfRoot {
        let mut root = GltfRoot::new();
        root.read(&mut DOC.as_bytes()).unwrap();
        root
    }

    #[test]
    fn test_buffer_change_reaches_node() {
        let mut root = load();
        let node = root.nodes.handle(0).unwrap();
        let before = node_stamp(&root, &node);
        assert_eq!(node_stamp(&root, &node), before);

        root.buffers.at_mut(0).unwrap().data = vec![0; 12];
        assert!(node_stamp(&root, &node) > before);
    }

    #[test]
    fn test_sampler_change_reaches_mesh() {
        let mut root = load();
        let mesh = root.meshes.handle(0).unwrap();
        let before = mesh_stamp(&root, &mesh);
        root.samplers.at_mut(0).unwrap().wrap_s = gltf_core::schema::sampler::CLAMP_TO_EDGE;
        assert!(mesh_stamp(&root, &mesh) > before);
    }

    #[test]
    fn test_cycle_terminates() {
        let mut root = load();
        let node = root.nodes.handle(2).unwrap();
        let before = node_stamp(&root, &node);
        root.nodes.at_mut(3).unwrap().name = "x".to_string();
        assert!(node_stamp(&root, &node) > before);
    }

    #[test]
    fn test_cached_stamps_match_fresh_ones() {
        let root = load();
        let mut cache = StampCache::default();
        for handle in root.nodes.handles() {
            assert_eq!(node_stamp_cached(&root, &handle, &mut cache), node_stamp(&root, &handle));
        }
        // Nodes 0 and 1 form a tree; 2 and 3 point at each other.
        assert_eq!(cache.len(), 2);
        for handle in root.nodes.handles() {
            assert_eq!(node_stamp_cached(&root, &handle, &mut cache), node_stamp(&root, &handle));
        }
    }

    #[test]
    fn test_shared_child_counts_for_both_parents() {
        let mut root = GltfRoot::new();
        root.read(
            &mut r#"{
                "asset": {"version": "2.0"},
                "nodes": [{"children": [1, 2]}, {"children": [3]}, {"children": [3]}, {}]
            }"#
            .as_bytes(),
        )
        .unwrap();
        let shared = root.nodes.handle(3).unwrap();
        let top = root.nodes.handle(0).unwrap();
        let second = root.nodes.handle(2).unwrap();
        root.nodes.touch(&shared);

        let mut cache = StampCache::default();
        let stamp = node_stamp_cached(&root, &top, &mut cache);
        assert_eq!(stamp, root.nodes.modified(&shared).unwrap());
        assert_eq!(node_stamp_cached(&root, &second, &mut cache), stamp);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_unrelated_change_ignored() {
        let mut root = load();
        let node = root.nodes.handle(1).unwrap();
        let before = node_stamp(&root, &node);
        root.nodes.at_mut(0).unwrap().name = "parent".to_string();
        root.nodes.at_mut(2).unwrap().name = "other".to_string();
        assert_eq!(node_stamp(&root, &node), before);
    }
}
