//! External resource tests: buffers and images next to the document.

use std::fs;

use gltf_core::{GltfError, GltfRoot, SearchPath, WriteOptions};
use tempfile::TempDir;

fn write_document(dir: &TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_read_file_loads_buffers() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("data.bin"), [1u8, 2, 3, 4]).unwrap();
    fs::write(dir.path().join("tex.png"), b"not really a png").unwrap();
    let path = write_document(
        &dir,
        "scene.gltf",
        r#"{"buffers":[{"byteLength":4,"uri":"data.bin"}],"images":[{"uri":"tex.png"}]}"#,
    );

    let mut root = GltfRoot::new();
    root.read_file(&path).unwrap();
    assert_eq!(root.buffers.at(0).unwrap().data, vec![1, 2, 3, 4]);
    assert_eq!(root.filename.as_deref(), Some(path.as_path()));
    assert!(root.timestamp.is_some());

    let image = root.images.at(0).unwrap();
    let resolved = image.uri.as_ref().unwrap().fullpath().unwrap();
    assert_eq!(resolved, dir.path().join("tex.png"));
}

#[test]
fn test_percent_encoded_file_name() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("my data.bin"), [9u8; 2]).unwrap();
    let path = write_document(
        &dir,
        "a.gltf",
        r#"{"buffers":[{"byteLength":2,"uri":"my%20data.bin"}]}"#,
    );
    let mut root = GltfRoot::new();
    root.read_file(&path).unwrap();
    assert_eq!(root.buffers.at(0).unwrap().data, vec![9, 9]);
}

#[test]
fn test_missing_externals_are_counted() {
    let dir = TempDir::new().unwrap();
    let path = write_document(
        &dir,
        "broken.gltf",
        r#"{"buffers":[{"byteLength":4,"uri":"gone.bin"},{"byteLength":1,"uri":"data:,x"}],
            "images":[{"uri":"gone.png"}]}"#,
    );
    let mut root = GltfRoot::new();
    match root.read_file(&path) {
        Err(GltfError::Externals { failed }) => assert_eq!(failed, 2),
        other => panic!("unexpected result {:?}", other.map(|_| ())),
    }
    // The data URI buffer still loaded.
    assert_eq!(root.buffers.at(1).unwrap().data, b"x");
}

#[test]
fn test_search_path_order() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    fs::write(second.path().join("b.bin"), [5u8]).unwrap();

    let mut root = GltfRoot::new();
    root.read(&mut r#"{"buffers":[{"byteLength":1,"uri":"b.bin"}]}"#.as_bytes())
        .unwrap();
    let search_path: SearchPath = [first.path(), second.path()].into_iter().collect();
    root.load_externals(&search_path).unwrap();
    assert_eq!(root.buffers.at(0).unwrap().data, vec![5]);
}

#[test]
fn test_write_and_reread_file() {
    let dir = TempDir::new().unwrap();
    let mut root = GltfRoot::new();
    let buffer = root.buffers.create("blob");
    if let Some(b) = root.buffers.get_mut(&buffer) {
        b.data = vec![0xde, 0xad, 0xbe, 0xef];
        b.byte_length = 4;
    }
    root.embed_buffers();

    let json_path = dir.path().join("out.gltf");
    root.write_gltf_file(&json_path, WriteOptions::json(2)).unwrap();
    let glb_path = dir.path().join("out.glb");
    root.write_glb_file(&glb_path).unwrap();

    for path in [json_path, glb_path] {
        let mut back = GltfRoot::new();
        back.read_file(&path).unwrap();
        assert_eq!(back.buffers.at(0).unwrap().data, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(back.buffers.at(0).unwrap().name, "blob");
    }
}
