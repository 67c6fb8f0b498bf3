//! Property-Based Tests
//!
//! URI escaping, number round trips, version strings and accessor sizing.

use gltf_core::uri::{encode, percent_decode};
use gltf_core::{
    check_version, Accessor, AccessorType, ComponentType, GltfRoot, Parser, WriteOptions, Writer,
};
use proptest::prelude::*;

fn parse_number(text: &str) -> f64 {
    let mut root = GltfRoot::new();
    let mut input = text.as_bytes();
    let mut parser = Parser::new(&mut input, &mut root, "");
    parser.parse_number().unwrap()
}

fn write_number(value: f64) -> String {
    let mut out = Vec::new();
    Writer::new(&mut out, WriteOptions::compact())
        .write_number(value)
        .unwrap();
    String::from_utf8(out).unwrap()
}

fn read_document(json: &str) -> GltfRoot {
    let mut root = GltfRoot::new();
    root.read(&mut json.as_bytes()).unwrap();
    root
}

fn write_document(root: &GltfRoot) -> String {
    let mut out = Vec::new();
    root.write_gltf(&mut out, WriteOptions::json(2)).unwrap();
    String::from_utf8(out).unwrap()
}

proptest! {
    #[test]
    fn proptest_encode_then_decode(text in "\\PC{0,40}") {
        let encoded = encode(&text);
        prop_assert!(encoded.bytes().all(|b| b.is_ascii_alphanumeric() || b"_,.-/%".contains(&b)));
        prop_assert_eq!(percent_decode(encoded.as_bytes()), text.as_bytes().to_vec());
    }

    #[test]
    fn proptest_integers_survive_writer_and_parser(n in -9_007_199_254_740_991i64..9_007_199_254_740_991i64) {
        let value = n as f64;
        let text = write_number(value);
        prop_assert!(!text.contains('.'));
        prop_assert_eq!(parse_number(&text), value);
    }

    #[test]
    fn proptest_finite_numbers_survive_writer_and_parser(
        value in prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO,
    ) {
        prop_assert_eq!(parse_number(&write_number(value)), value);
    }

    #[test]
    fn proptest_document_numbers_rewrite_identically(
        values in prop::array::uniform3(prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO),
    ) {
        let json = format!(
            r#"{{"asset":{{"version":"2.0"}},"nodes":[{{"translation":[{:e},{:e},{:e}]}}]}}"#,
            values[0], values[1], values[2]
        );
        let first = read_document(&json);
        let translation = first.nodes.at(0).unwrap().translation.unwrap();
        prop_assert_eq!(translation.to_array(), values);

        let written = write_document(&first);
        let rewritten = write_document(&read_document(&written));
        prop_assert_eq!(written, rewritten);
    }

    #[test]
    fn proptest_version_strings(major in 0u32..100, minor in 0u32..100, junk in "[a-z]{1,3}") {
        let valid = format!("{}.{}", major, minor);
        let major_only = format!("{}", major);
        let trailing_junk = format!("{}.{}{}", major, minor, junk);
        let leading_junk = format!("{}{}.{}", junk, major, minor);
        prop_assert!(check_version(&valid).is_ok());
        prop_assert!(check_version(&major_only).is_err());
        prop_assert!(check_version(&trailing_junk).is_err());
        prop_assert!(check_version(&leading_junk).is_err());
    }

    #[test]
    fn proptest_accessor_sizing(
        component in prop::sample::select(ComponentType::ALL.to_vec()),
        kind in prop::sample::select(AccessorType::ALL.to_vec()),
        count in 0usize..10_000,
    ) {
        let accessor = Accessor {
            component_type: component,
            accessor_type: kind,
            count,
            ..Default::default()
        };
        prop_assert_eq!(accessor.element_size(), component.size() * kind.num_components());
        prop_assert_eq!(accessor.data_size(), accessor.element_size() * count);
        prop_assert!(matches!(accessor.component_size(), 1 | 2 | 4));
    }
}
