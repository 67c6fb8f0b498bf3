//! GLB container tests

use byteorder::{LittleEndian, WriteBytesExt};
use gltf_core::{GltfError, GltfRoot, WriteOptions};

fn sample_root() -> GltfRoot {
    let mut root = GltfRoot::new();
    root.read(
        &mut r#"{
            "buffers": [{"byteLength": 7}],
            "bufferViews": [{"buffer": 0, "byteLength": 7}],
            "images": [{"bufferView": 0, "mimeType": "image/png"}]
        }"#
        .as_bytes(),
    )
    .unwrap();
    root.buffers.at_mut(0).unwrap().data = b"payload".to_vec();
    root
}

#[test]
fn test_glb_roundtrip() {
    let root = sample_root();
    let mut glb = Vec::new();
    root.write_glb(&mut glb).unwrap();
    assert_eq!(&glb[0..4], b"glTF");

    let mut back = GltfRoot::new();
    back.read(&mut glb.as_slice()).unwrap();
    assert_eq!(back.buffers.at(0).unwrap().data, b"payload");

    let image = back.images.at(0).unwrap();
    assert_eq!(image.open_read(&back).unwrap(), b"payload");
    assert_eq!(image.mime_type, "image/png");
}

#[test]
fn test_glb_without_binary_chunk() {
    let mut root = GltfRoot::new();
    root.nodes.create("only");
    let mut glb = Vec::new();
    root.write_glb(&mut glb).unwrap();

    let mut back = GltfRoot::new();
    back.read(&mut glb.as_slice()).unwrap();
    assert_eq!(back.nodes.at(0).unwrap().name, "only");
}

#[test]
fn test_glb_json_matches_compact_writer() {
    let root = sample_root();
    let mut glb = Vec::new();
    root.write_glb(&mut glb).unwrap();
    let json_length = u32::from_le_bytes([glb[12], glb[13], glb[14], glb[15]]) as usize;
    let chunk = std::str::from_utf8(&glb[20..20 + json_length]).unwrap();

    let mut compact = Vec::new();
    root.write_gltf(&mut compact, WriteOptions::compact()).unwrap();
    assert_eq!(chunk.trim_end(), std::str::from_utf8(&compact).unwrap());
}

#[test]
fn test_glb_binary_chunk_too_small() {
    let json = br#"{"buffers":[{"byteLength":8}]}  "#;
    let mut glb = Vec::new();
    let total = 12 + 8 + json.len() + 8 + 4;
    glb.write_u32::<LittleEndian>(0x4654_6C67).unwrap();
    glb.write_u32::<LittleEndian>(2).unwrap();
    glb.write_u32::<LittleEndian>(total as u32).unwrap();
    glb.write_u32::<LittleEndian>(json.len() as u32).unwrap();
    glb.write_u32::<LittleEndian>(0x4E4F_534A).unwrap();
    glb.extend_from_slice(json);
    glb.write_u32::<LittleEndian>(4).unwrap();
    glb.write_u32::<LittleEndian>(0x004E_4942).unwrap();
    glb.extend_from_slice(&[1, 2, 3, 4]);

    let mut root = GltfRoot::new();
    assert!(matches!(
        root.read(&mut glb.as_slice()),
        Err(GltfError::InvalidGlb(_))
    ));
}

#[test]
fn test_glb_with_uri_buffer_ignores_binary_chunk() {
    let mut root = GltfRoot::new();
    root.read(&mut r#"{"buffers":[{"byteLength":3,"uri":"data:,abc"}]}"#.as_bytes())
        .unwrap();
    let mut glb = Vec::new();
    root.write_glb(&mut glb).unwrap();
    let length = u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize;
    let json_length = u32::from_le_bytes([glb[12], glb[13], glb[14], glb[15]]) as usize;
    assert_eq!(length, 20 + json_length);
}
