//! Conversion tests against small documents with embedded buffers.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Vec3, Vec4};
use gltf_core::{GltfRoot, SearchPath, UriReference};
use gltf_loader::{
    CoordinateSystem, Geom, Loader, LoaderCallbacks, LoaderOptions, Next, NumericType, PrimitiveType,
    RenderState, SceneNode, TransparencyMode,
};

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Positions, normals and tangents of one triangle followed by its indices.
fn triangle_buffer() -> Vec<u8> {
    let mut data = f32_bytes(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    data.extend(f32_bytes(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]));
    data.extend(f32_bytes(&[1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0]));
    for i in [0u16, 1, 2] {
        data.extend(i.to_le_bytes());
    }
    data.extend([0, 0]);
    data
}

const TRIANGLE: &str = r#"{
    "asset": {"version": "2.0"},
    "scene": 0,
    "scenes": [{"nodes": [0]}],
    "nodes": [
        {"name": "root", "children": [1], "translation": [0, 1, 0]},
        {"name": "tri", "mesh": 0}
    ],
    "meshes": [{
        "name": "triangle",
        "primitives": [{"attributes": {"POSITION": 0, "NORMAL": 1, "TANGENT": 2}, "indices": 3, "material": 0}]
    }],
    "materials": [{
        "name": "red",
        "pbrMetallicRoughness": {"baseColorFactor": [1, 0, 0, 1], "metallicFactor": 0.5},
        "emissiveFactor": [0, 0.5, 0],
        "alphaMode": "MASK",
        "alphaCutoff": 0.25,
        "doubleSided": true
    }],
    "accessors": [
        {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"},
        {"bufferView": 0, "byteOffset": 36, "componentType": 5126, "count": 3, "type": "VEC3"},
        {"bufferView": 0, "byteOffset": 72, "componentType": 5126, "count": 3, "type": "VEC4"},
        {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}
    ],
    "bufferViews": [
        {"buffer": 0, "byteLength": 120},
        {"buffer": 0, "byteOffset": 120, "byteLength": 6}
    ],
    "buffers": [{"byteLength": 128, "uri": "BUFFER"}]
}"#;

fn load(json: &str) -> GltfRoot {
    let uri = UriReference::data_uri("application/octet-stream", &triangle_buffer());
    let json = json.replace("BUFFER", uri.as_str());
    let mut root = GltfRoot::new();
    root.read(&mut json.as_bytes()).unwrap();
    root.load_externals(&SearchPath::new()).unwrap();
    root
}

fn only_geom(node: &SceneNode) -> (Rc<Geom>, Rc<RenderState>) {
    let geom_node = node.child(0).expect("geom node");
    assert!(geom_node.is_geom_node());
    let geoms = geom_node.geoms();
    assert_eq!(geoms.len(), 1);
    (geoms[0].geom.clone(), geoms[0].state.clone())
}

#[test]
fn test_converts_default_scene() {
    let root = load(TRIANGLE);
    let mut loader = Loader::default();
    assert!(loader.update_all(&root));

    let top = loader.root_node();
    assert!(top.is_model_root());
    assert_eq!(top.num_children(), 1);
    let scene_root = top.child(0).unwrap();
    assert_eq!(scene_root.name(), "root");
    // Y-up translation becomes Z-up.
    let origin = scene_root.transform().transform_point3(Vec3::ZERO);
    assert!(origin.abs_diff_eq(Vec3::Z, 1e-6));

    let tri = scene_root.child(0).unwrap();
    assert_eq!(tri.name(), "tri");
    let (geom, _) = only_geom(&tri);
    assert_eq!(geom.primitive.primitive_type(), PrimitiveType::Triangles);
    assert_eq!(geom.primitive.index_type(), Some(NumericType::Uint16));
    assert_eq!(geom.primitive.vertices().collect::<Vec<_>>(), vec![0, 1, 2]);

    let vdata = &geom.vertex_data;
    assert_eq!(vdata.num_rows(), 3);
    assert!(vdata.get_vec3("vertex", 2).unwrap().abs_diff_eq(Vec3::Z, 1e-6));
    assert!(vdata.get_vec3("normal", 0).unwrap().abs_diff_eq(Vec3::NEG_Y, 1e-6));
    // normal x tangent = +Y in glTF space, +Z after conversion.
    assert!(vdata.get_vec3("binormal", 1).unwrap().abs_diff_eq(Vec3::Z, 1e-6));
}

#[test]
fn test_material_state() {
    let root = load(TRIANGLE);
    let mut loader = Loader::default();
    loader.update_all(&root);

    let tri = loader.root_node().find("tri").unwrap();
    let (_, state) = only_geom(&tri);
    let material = state.material.as_ref().unwrap();
    assert_eq!(material.name, "red");
    assert_eq!(material.base_color, Vec4::new(1.0, 0.0, 0.0, 1.0));
    assert_eq!(material.metallic, 0.5);
    assert_eq!(material.roughness, 1.0);
    assert_eq!(material.emission, Some(Vec4::new(0.0, 0.5, 0.0, 1.0)));
    assert_eq!(state.transparency, TransparencyMode::Binary);
    assert_eq!(state.alpha_test, Some(0.25));
    assert!(state.two_sided);
    assert!(state.textures.is_empty());
}

#[test]
fn test_update_is_idempotent() {
    let root = load(TRIANGLE);
    let mut loader = Loader::default();
    loader.update_all(&root);
    let stats = loader.stats();
    assert_eq!(stats.nodes, 2);
    assert_eq!(stats.meshes, 1);
    assert_eq!(stats.materials, 1);

    let tri = root.nodes.handle(1).unwrap();
    let first = loader.update_node(&root, &tri).unwrap();
    let second = loader.update_node(&root, &tri).unwrap();
    assert!(first.ptr_eq(&second));
    assert!(!loader.update_all(&root));
    assert_eq!(loader.stats(), stats);
}

#[test]
fn test_mesh_change_propagates_to_node() {
    let mut root = load(TRIANGLE);
    let mut loader = Loader::default();
    loader.update_all(&root);
    let before = loader.stats();

    let tri = root.nodes.handle(1).unwrap();
    let converted = loader.update_node(&root, &tri).unwrap();
    assert_eq!(converted.count_geoms(), 1);

    let mesh = root.meshes.handle(0).unwrap();
    root.meshes.get_mut(&mesh).unwrap().primitives.clear();

    let rebuilt = loader.update_node(&root, &tri).unwrap();
    assert!(rebuilt.ptr_eq(&converted));
    assert_eq!(rebuilt.count_geoms(), 0);
    assert_eq!(loader.stats().meshes, before.meshes + 1);
    assert_eq!(loader.stats().nodes, before.nodes + 1);

    // The parent's subtree changed as well.
    assert!(loader.update_all(&root));
    assert_eq!(loader.stats().nodes, before.nodes + 2);
}

#[test]
fn test_buffer_change_rebuilds_geometry() {
    let mut root = load(TRIANGLE);
    let mut loader = Loader::new(LoaderOptions {
        coordinate_system: CoordinateSystem::YupRight,
        ..Default::default()
    });
    loader.update_all(&root);
    let tri = loader.root_node().find("tri").unwrap();
    let (geom, _) = only_geom(&tri);
    assert_eq!(geom.vertex_data.get_vec3("vertex", 1), Some(Vec3::X));

    let buffer = root.buffers.at_mut(0).unwrap();
    buffer.data[12..16].copy_from_slice(&5.0f32.to_le_bytes());

    assert!(loader.update_all(&root));
    let (geom, _) = only_geom(&tri);
    assert_eq!(geom.vertex_data.get_vec3("vertex", 1), Some(Vec3::new(5.0, 0.0, 0.0)));
    assert_eq!(loader.stats().materials, 1);
}

#[test]
fn test_cycle_guard() {
    let json = TRIANGLE.replace(
        r#"{"name": "tri", "mesh": 0}"#,
        r#"{"name": "tri", "mesh": 0, "children": [0]}"#,
    );
    let mut root = load(&json);
    let mut loader = Loader::default();
    loader.update_all(&root);
    assert!(loader.stats().cycles >= 1);

    let scene_root = loader.root_node().child(0).unwrap();
    let tri = scene_root.find("tri").unwrap();
    // Only the geom node; the edge back to the ancestor is dropped.
    assert_eq!(tri.num_children(), 1);
    assert!(tri.child(0).unwrap().is_geom_node());

    let cycles = loader.stats().cycles;
    let top = root.nodes.handle(0).unwrap();
    root.nodes.touch(&top);
    loader.update_all(&root);
    assert!(loader.stats().cycles > cycles);
    assert_eq!(tri.num_children(), 1);
    assert_eq!(loader.root_node().ls().lines().count(), 4);
}

#[test]
fn test_out_of_range_accessor_drops_geom() {
    let json = TRIANGLE.replace(
        r#"{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"}"#,
        r#"{"bufferView": 0, "componentType": 5126, "count": 30, "type": "VEC3"}"#,
    );
    let root = load(&json);
    let mut loader = Loader::default();
    loader.update_all(&root);

    let tri = loader.root_node().find("tri").unwrap();
    let geom_node = tri.child(0).unwrap();
    assert_eq!(geom_node.num_geoms(), 0);
    assert_eq!(loader.root_node().find("root").unwrap().num_children(), 1);
}

#[test]
fn test_oversized_accessor_without_view_drops_geom() {
    let json = TRIANGLE.replace(
        r#"{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"}"#,
        r#"{"componentType": 5126, "count": 4611686018427387904, "type": "VEC3"}"#,
    );
    let root = load(&json);
    let mut loader = Loader::default();
    loader.update_all(&root);

    let tri = loader.root_node().find("tri").unwrap();
    assert_eq!(tri.child(0).unwrap().num_geoms(), 0);
}

#[test]
fn test_out_of_range_indices_are_rejected_before_allocation() {
    let json = TRIANGLE.replace(
        r#"{"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}"#,
        r#"{"bufferView": 1, "componentType": 5123, "count": 9223372036854775807, "type": "SCALAR"}"#,
    );
    let root = load(&json);
    let mut loader = Loader::default();
    loader.update_all(&root);
    assert_eq!(loader.root_node().count_geoms(), 0);
}

#[test]
fn test_line_loop_without_indices() {
    let json = TRIANGLE.replace(
        r#""indices": 3, "material": 0"#,
        r#""mode": 2"#,
    );
    let root = load(&json);
    let mut loader = Loader::default();
    loader.update_all(&root);

    let tri = loader.root_node().find("tri").unwrap();
    let (geom, state) = only_geom(&tri);
    assert_eq!(geom.primitive.primitive_type(), PrimitiveType::LineStrips);
    assert_eq!(geom.primitive.vertices().collect::<Vec<_>>(), vec![0, 1, 2, 0]);
    assert!(state.is_empty());
}

#[test]
fn test_invalid_index_type_drops_geom() {
    let json = TRIANGLE.replace(
        r#"{"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}"#,
        r#"{"bufferView": 1, "componentType": 5122, "count": 3, "type": "SCALAR"}"#,
    );
    let root = load(&json);
    let mut loader = Loader::default();
    loader.update_all(&root);
    assert_eq!(loader.root_node().count_geoms(), 0);
}

#[test]
fn test_garbage_collected_entries_are_pruned() {
    let mut root = load(TRIANGLE);
    root.meshes.create("orphan");
    let mut loader = Loader::default();
    loader.update_all(&root);
    assert_eq!(loader.stats().meshes, 2);

    assert_eq!(root.garbage_collect(), 1);
    assert_eq!(loader.prune(), 1);
    assert!(!loader.update_all(&root));
}

#[test]
fn test_load_named_scene() {
    let json = TRIANGLE.replace(
        r#""scenes": [{"nodes": [0]}]"#,
        r#""scenes": [{"nodes": [0]}, {"nodes": [1]}]"#,
    );
    let root = load(&json);
    let mut loader = Loader::default();
    let target = SceneNode::model_root("second");
    target.add_child(SceneNode::new("stale"));
    loader.load_scene(&root, &target, &root.scenes.handle(1).unwrap());
    assert_eq!(target.num_children(), 1);
    assert_eq!(target.child(0).unwrap().name(), "tri");
}

#[derive(Default)]
struct Recorder {
    label: &'static str,
    calls: Rc<RefCell<Vec<String>>>,
}

impl LoaderCallbacks for Recorder {
    fn update_node(&self, next: Next<'_>, node: Option<SceneNode>, source: &gltf_core::Node) -> SceneNode {
        self.calls.borrow_mut().push(format!("{}:{}", self.label, source.name));
        next.update_node(node, source)
    }
}

/// Produces a fixed state without consulting the rest of the chain.
struct Unlit;

impl LoaderCallbacks for Unlit {
    fn make_geom_state(&self, _next: Next<'_>, _mesh: &gltf_core::Mesh, _primitive: &gltf_core::Primitive) -> RenderState {
        RenderState {
            two_sided: true,
            ..Default::default()
        }
    }
}

#[test]
fn test_callback_chain_order() {
    let root = load(TRIANGLE);
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut loader = Loader::default();
    loader.register_callbacks(
        10,
        Rc::new(Recorder {
            label: "late",
            calls: calls.clone(),
        }),
    );
    loader.register_callbacks(
        0,
        Rc::new(Recorder {
            label: "early",
            calls: calls.clone(),
        }),
    );
    loader.register_callbacks(5, Rc::new(Unlit));
    assert_eq!(loader.num_callbacks(), 3);

    loader.update_all(&root);
    assert_eq!(
        *calls.borrow(),
        vec!["early:root", "late:root", "early:tri", "late:tri"]
    );

    let tri = loader.root_node().find("tri").unwrap();
    let (_, state) = only_geom(&tri);
    assert!(state.material.is_none());
    assert!(state.two_sided);
    assert_eq!(loader.stats().materials, 0);
}
