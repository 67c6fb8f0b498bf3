//! Parser and writer benchmarks
//!
//! Measures parsing and writing of generated documents with a growing number
//! of nodes, meshes and accessors.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gltf_core::{GltfRoot, WriteOptions};

/// Builds a document with `count` nodes, each with its own mesh and accessors.
fn generate_document(count: usize) -> String {
    let mut nodes = Vec::with_capacity(count);
    let mut meshes = Vec::with_capacity(count);
    let mut accessors = Vec::with_capacity(count * 2);
    for i in 0..count {
        nodes.push(format!(
            r#"{{"name":"node{i}","mesh":{i},"translation":[{x},0.5,-{x}],"rotation":[0,0.7071067811865476,0,0.7071067811865476]}}"#,
            i = i,
            x = i as f64 * 0.25
        ));
        meshes.push(format!(
            r#"{{"primitives":[{{"attributes":{{"POSITION":{p},"NORMAL":{p}}},"indices":{n}}}]}}"#,
            p = 2 * i,
            n = 2 * i + 1
        ));
        accessors.push(format!(
            r#"{{"bufferView":0,"componentType":5126,"count":24,"type":"VEC3","min":[-1,-1,-1],"max":[1,1,1]}}"#
        ));
        accessors.push(format!(
            r#"{{"bufferView":1,"componentType":5123,"count":36,"type":"SCALAR"}}"#
        ));
    }
    let children: Vec<String> = (0..count).map(|i| i.to_string()).collect();
    format!(
        r#"{{"asset":{{"version":"2.0"}},"scene":0,"scenes":[{{"nodes":[{}]}}],"nodes":[{}],"meshes":[{}],"accessors":[{}],
            "bufferViews":[{{"buffer":0,"byteLength":288}},{{"buffer":0,"byteOffset":288,"byteLength":72}}],
            "buffers":[{{"byteLength":360}}]}}"#,
        children.join(","),
        nodes.join(","),
        meshes.join(","),
        accessors.join(",")
    )
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for count in [10, 100, 1000] {
        let text = generate_document(count);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &text, |b, text| {
            b.iter(|| {
                let mut root = GltfRoot::new();
                root.read(&mut black_box(text.as_bytes())).unwrap();
                black_box(root)
            });
        });
    }

    group.finish();
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");

    for count in [10, 100, 1000] {
        let mut root = GltfRoot::new();
        root.read(&mut generate_document(count).as_bytes()).unwrap();

        for (label, options) in [
            ("compact", WriteOptions::compact()),
            ("indented", WriteOptions::json(2)),
        ] {
            group.bench_with_input(BenchmarkId::new(label, count), &root, |b, root| {
                b.iter(|| {
                    let mut out = Vec::new();
                    root.write_gltf(&mut out, options).unwrap();
                    black_box(out)
                });
            });
        }
    }

    group.finish();
}

fn bench_glb(c: &mut Criterion) {
    let mut root = GltfRoot::new();
    root.read(&mut generate_document(100).as_bytes()).unwrap();
    if let Some(buffer) = root.buffers.at_mut(0) {
        buffer.data = vec![0u8; 360];
    }
    let mut glb = Vec::new();
    root.write_glb(&mut glb).unwrap();

    c.bench_function("glb_read_100", |b| {
        b.iter(|| {
            let mut back = GltfRoot::new();
            back.read(&mut black_box(glb.as_slice())).unwrap();
            black_box(back)
        });
    });
}

criterion_group!(benches, bench_parse, bench_write, bench_glb);
criterion_main!(benches);
