//! Streaming recursive-descent JSON parser.
//!
//! The parser reads one byte at a time from an arbitrary stream with a single
//! byte of putback, tracking the line number for diagnostics and the number of
//! bytes consumed from the stream (the GLB reader needs the latter to find the
//! end of the JSON chunk). Schema objects drive it property by property
//! through [`GltfObject::parse_property`].

use std::io::{self, Read};
use std::mem;

use glam::{DMat4, DQuat, DVec3, DVec4};
use log::{error, warn};

use crate::error::{GltfError, Result};
use crate::object::{GltfObject, RootObject};
use crate::root::GltfRoot;
use crate::schema::{
    Accessor, Animation, Buffer, BufferView, Camera, Image, Material, Mesh, Node, Sampler,
    Scene, Skin, Texture,
};
use crate::table::Handle;
use crate::value::{Dictionary, Value};

/// Parses JSON into a [`GltfRoot`], resolving references through its tables.
pub struct Parser<'a> {
    input: &'a mut dyn Read,
    doc: &'a mut GltfRoot,
    putback: Option<u8>,
    line: usize,
    bytes_read: u64,
    path: Vec<String>,
    filename: String,
}

impl<'a> Parser<'a> {
    /// `input` should be buffered; the parser reads single bytes.
    pub fn new(input: &'a mut dyn Read, doc: &'a mut GltfRoot, filename: &str) -> Self {
        Parser {
            input,
            doc,
            putback: None,
            line: 1,
            bytes_read: 0,
            path: Vec::new(),
            filename: filename.to_string(),
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// Bytes consumed from the underlying stream. A byte that has been put
    /// back still counts.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn doc(&mut self) -> &mut GltfRoot {
        self.doc
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    fn location(&self, segments: &[String]) -> String {
        let mut text = String::new();
        for segment in segments {
            if !text.is_empty() && !segment.starts_with('[') {
                text.push('.');
            }
            text.push_str(segment);
        }
        text
    }

    fn prefix(&self) -> String {
        if self.filename.is_empty() {
            format!("At line {}:", self.line)
        } else {
            format!("At line {} of {}:", self.line, self.filename)
        }
    }

    /// Logs and returns a syntax error at the current line.
    pub fn syntax_error(&self, message: impl Into<String>) -> GltfError {
        let message = message.into();
        error!("{} {}", self.prefix(), message);
        GltfError::Syntax {
            line: self.line,
            message,
        }
    }

    /// Logs and returns a schema-validation error at the current line.
    pub fn schema_error(&self, what: &'static str, message: impl Into<String>) -> GltfError {
        let message = message.into();
        error!("{} invalid {}: {}", self.prefix(), what, message);
        GltfError::Schema {
            line: self.line,
            what,
            message,
        }
    }

    pub fn warning(&self, message: &str) {
        warn!("{} {}", self.prefix(), message);
    }

    /// Skips the value of a property the current object does not recognize.
    pub fn skip_unknown(&mut self, key: &str) -> Result<()> {
        let parent = self.path.len().saturating_sub(1);
        let location = self.location(&self.path[..parent]);
        if location.is_empty() {
            self.warning(&format!("Ignoring unrecognized property {:?}", key));
        } else {
            self.warning(&format!(
                "Ignoring unrecognized property {:?} of {}",
                key, location
            ));
        }
        self.skip_value()
    }

    // ========================================================================
    // Bytes
    // ========================================================================

    fn read_byte(&mut self) -> Result<Option<u8>> {
        if let Some(c) = self.putback.take() {
            if c == b'\n' {
                self.line += 1;
            }
            return Ok(Some(c));
        }
        let mut byte = [0u8; 1];
        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.bytes_read += 1;
        if byte[0] == b'\n' {
            self.line += 1;
        }
        Ok(Some(byte[0]))
    }

    fn next(&mut self) -> Result<u8> {
        match self.read_byte()? {
            Some(c) => Ok(c),
            None => Err(self.syntax_error("Unexpected end of file")),
        }
    }

    /// Like `next`, but end of input reads as a NUL byte. Used where a token
    /// may legitimately end the input.
    fn next_or_end(&mut self) -> Result<u8> {
        Ok(self.read_byte()?.unwrap_or(0))
    }

    fn put_back_unless_end(&mut self, c: u8) {
        if c != 0 {
            self.put_back(c);
        }
    }

    fn put_back(&mut self, c: u8) {
        if c == b'\n' {
            self.line -= 1;
        }
        self.putback = Some(c);
    }

    /// Returns the next byte that is not JSON whitespace.
    fn next_nonspace(&mut self) -> Result<u8> {
        loop {
            let c = self.next()?;
            if !is_space(c) {
                return Ok(c);
            }
        }
    }

    /// Consumes whitespace up to and including the first other byte, or up to
    /// end of input. Used at a chunk boundary.
    pub(crate) fn skip_trailing_space(&mut self, limit: u64) -> Result<Option<u8>> {
        while self.bytes_read < limit || self.putback.is_some() {
            match self.read_byte()? {
                Some(c) if is_space(c) => continue,
                other => return Ok(other),
            }
        }
        Ok(None)
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        let c = self.next_nonspace()?;
        if c == expected {
            Ok(())
        } else {
            Err(self.syntax_error(format!(
                "Expected '{}', not {}",
                expected as char,
                show(c)
            )))
        }
    }

    fn expect_literal(&mut self, rest: &str) -> Result<()> {
        for expected in rest.bytes() {
            let c = self.next()?;
            if c != expected {
                return Err(self.syntax_error(format!(
                    "Expected '{}', not {}",
                    expected as char,
                    show(c)
                )));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Containers
    // ========================================================================

    /// Parses `{ "key": value, ... }`, calling `f` with each key. `f` must
    /// consume exactly one value.
    pub fn parse_object_with<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&mut Self, &str) -> Result<()>,
    {
        self.expect(b'{')?;
        let c = self.next_nonspace()?;
        if c == b'}' {
            return Ok(());
        }
        self.put_back(c);
        loop {
            let key = self.parse_string()?;
            self.expect(b':')?;
            self.path.push(key.clone());
            let result = f(self, &key);
            self.path.pop();
            result?;

            match self.next_nonspace()? {
                b',' => continue,
                b'}' => return Ok(()),
                c => {
                    return Err(self.syntax_error(format!("Expected ',' or '}}', not {}", show(c))))
                }
            }
        }
    }

    /// Clears `object`, then parses its properties.
    pub fn parse_object<T: GltfObject>(&mut self, object: &mut T) -> Result<()> {
        object.clear();
        self.parse_object_with(|p, key| object.parse_property(p, key))
    }

    /// Parses `[ value, ... ]`, calling `f` with each element index. `f` must
    /// consume exactly one value.
    pub fn parse_array_with<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&mut Self, usize) -> Result<()>,
    {
        self.expect(b'[')?;
        let c = self.next_nonspace()?;
        if c == b']' {
            return Ok(());
        }
        self.put_back(c);
        let mut index = 0;
        loop {
            self.path.push(format!("[{}]", index));
            let result = f(self, index);
            self.path.pop();
            result?;
            index += 1;

            match self.next_nonspace()? {
                b',' => continue,
                b']' => return Ok(()),
                c => {
                    return Err(self.syntax_error(format!("Expected ',' or ']', not {}", show(c))))
                }
            }
        }
    }

    pub fn parse_array<T, F>(&mut self, mut f: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Self) -> Result<T>,
    {
        let mut items = Vec::new();
        self.parse_array_with(|p, _| {
            items.push(f(p)?);
            Ok(())
        })?;
        Ok(items)
    }

    pub fn parse_dictionary<V, F>(&mut self, mut f: F) -> Result<Dictionary<V>>
    where
        F: FnMut(&mut Self) -> Result<V>,
    {
        let mut dict = Dictionary::new();
        self.parse_object_with(|p, key| {
            let value = f(p)?;
            dict.insert(key.to_string(), value);
            Ok(())
        })?;
        Ok(dict)
    }

    pub fn parse_object_array<T: GltfObject>(&mut self) -> Result<Vec<T>> {
        self.parse_array(|p| {
            let mut object = T::default();
            p.parse_object(&mut object)?;
            Ok(object)
        })
    }

    pub fn parse_string_array(&mut self) -> Result<Vec<String>> {
        self.parse_array(|p| p.parse_string())
    }

    pub fn parse_number_array(&mut self) -> Result<Vec<f64>> {
        self.parse_array(|p| p.parse_number())
    }

    // ========================================================================
    // Scalars
    // ========================================================================

    /// Parses a string literal, decoding escapes. `\u` escapes are decoded
    /// including surrogate pairs; an unpaired surrogate becomes U+FFFD.
    pub fn parse_string(&mut self) -> Result<String> {
        self.expect(b'"')?;
        let mut bytes = Vec::new();
        loop {
            match self.next()? {
                b'"' => break,
                b'\\' => {
                    let c = self.next()?;
                    self.parse_escape(c, &mut bytes)?;
                }
                c => bytes.push(c),
            }
        }
        String::from_utf8(bytes).map_err(|_| self.syntax_error("Invalid UTF-8 in string"))
    }

    fn parse_escape(&mut self, c: u8, out: &mut Vec<u8>) -> Result<()> {
        let decoded = match c {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => self.parse_unicode_escape()?,
            c => {
                return Err(self.syntax_error(format!("Invalid escape sequence \\{}", c as char)))
            }
        };
        let mut buf = [0u8; 4];
        out.extend_from_slice(decoded.encode_utf8(&mut buf).as_bytes());
        Ok(())
    }

    fn parse_unicode_escape(&mut self) -> Result<char> {
        let unit = self.parse_hex4()?;
        if !(0xD800..0xDC00).contains(&unit) {
            return Ok(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER));
        }

        // High surrogate; the low half must follow as another \u escape.
        let c = self.next()?;
        if c != b'\\' {
            self.put_back(c);
            return Ok(char::REPLACEMENT_CHARACTER);
        }
        let c = self.next()?;
        if c != b'u' {
            return Err(self.syntax_error("Unpaired surrogate followed by escape sequence"));
        }
        let low = self.parse_hex4()?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(self.syntax_error(format!("Invalid low surrogate \\u{:04x}", low)));
        }
        let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
        Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn parse_hex4(&mut self) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..4 {
            let c = self.next()?;
            let digit = (c as char)
                .to_digit(16)
                .ok_or_else(|| self.syntax_error(format!("Expected hex digit, not {}", show(c))))?;
            value = (value << 4) | digit;
        }
        Ok(value)
    }

    /// Parses a JSON number. The grammar is checked byte by byte and the
    /// accepted text is then converted with correct rounding.
    pub fn parse_number(&mut self) -> Result<f64> {
        let mut text = String::new();
        let mut c = self.next_nonspace()?;
        if c == b'-' {
            text.push('-');
            c = self.next()?;
        }
        if !c.is_ascii_digit() {
            return Err(self.syntax_error(format!("Expected number, not {}", show(c))));
        }
        while c.is_ascii_digit() {
            text.push(char::from(c));
            c = self.next_or_end()?;
        }
        if c == b'.' {
            text.push('.');
            c = self.next()?;
            if !c.is_ascii_digit() {
                return Err(self.syntax_error(format!("Expected digit, not {}", show(c))));
            }
            while c.is_ascii_digit() {
                text.push(char::from(c));
                c = self.next_or_end()?;
            }
        }
        if c == b'e' || c == b'E' {
            text.push('e');
            c = self.next()?;
            if c == b'-' || c == b'+' {
                text.push(char::from(c));
                c = self.next()?;
            }
            if !c.is_ascii_digit() {
                return Err(self.syntax_error(format!("Expected digit, not {}", show(c))));
            }
            while c.is_ascii_digit() {
                text.push(char::from(c));
                c = self.next_or_end()?;
            }
        }
        self.put_back_unless_end(c);

        text.parse::<f64>()
            .map_err(|e| self.syntax_error(format!("Invalid number {}: {}", text, e)))
    }

    /// Parses a non-negative integer (no sign, fraction or exponent).
    pub fn parse_index(&mut self) -> Result<usize> {
        let mut c = self.next_nonspace()?;
        if !c.is_ascii_digit() {
            return Err(self.syntax_error(format!("Expected non-negative integer, not {}", show(c))));
        }
        let mut value = 0usize;
        while c.is_ascii_digit() {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(usize::from(c - b'0')))
                .ok_or_else(|| self.syntax_error("Integer too large"))?;
            c = self.next_or_end()?;
        }
        self.put_back_unless_end(c);
        Ok(value)
    }

    pub fn parse_bool(&mut self) -> Result<bool> {
        match self.next_nonspace()? {
            b't' => self.expect_literal("rue").map(|_| true),
            b'f' => self.expect_literal("alse").map(|_| false),
            c => Err(self.syntax_error(format!("Expected true or false, not {}", show(c)))),
        }
    }

    /// Parses any JSON value.
    pub fn parse_value(&mut self) -> Result<Value> {
        let c = self.next_nonspace()?;
        self.put_back(c);
        match c {
            b'{' => Ok(Value::Object(self.parse_dictionary(|p| p.parse_value())?)),
            b'[' => Ok(Value::Array(self.parse_array(|p| p.parse_value())?)),
            b'"' => Ok(Value::String(self.parse_string()?)),
            b't' | b'f' => Ok(Value::Bool(self.parse_bool()?)),
            b'n' => {
                self.next()?;
                self.expect_literal("ull")?;
                Ok(Value::Null)
            }
            b'-' | b'0'..=b'9' => Ok(Value::Number(self.parse_number()?)),
            c => Err(self.syntax_error(format!("Unexpected {}", show(c)))),
        }
    }

    /// Consumes one JSON value without materializing it.
    pub fn skip_value(&mut self) -> Result<()> {
        let c = self.next_nonspace()?;
        match c {
            b'{' => {
                self.put_back(c);
                self.parse_object_with(|p, _| p.skip_value())
            }
            b'[' => {
                self.put_back(c);
                self.parse_array_with(|p, _| p.skip_value())
            }
            b'"' => loop {
                match self.next()? {
                    b'"' => return Ok(()),
                    b'\\' => {
                        self.next()?;
                    }
                    _ => {}
                }
            },
            b't' => self.expect_literal("rue"),
            b'f' => self.expect_literal("alse"),
            b'n' => self.expect_literal("ull"),
            b'-' | b'0'..=b'9' => {
                self.put_back(c);
                self.parse_number().map(|_| ())
            }
            c => Err(self.syntax_error(format!("Unexpected {}", show(c)))),
        }
    }

    // ========================================================================
    // Typed helpers
    // ========================================================================

    fn parse_fixed<const N: usize>(&mut self, what: &'static str) -> Result<[f64; N]> {
        let values = self.parse_number_array()?;
        <[f64; N]>::try_from(values.as_slice()).map_err(|_| {
            self.schema_error(
                what,
                format!("expected {} numbers, got {}", N, values.len()),
            )
        })
    }

    pub fn parse_vec3(&mut self, what: &'static str) -> Result<DVec3> {
        self.parse_fixed::<3>(what).map(DVec3::from_array)
    }

    pub fn parse_vec4(&mut self, what: &'static str) -> Result<DVec4> {
        self.parse_fixed::<4>(what).map(DVec4::from_array)
    }

    /// Parses an `[x, y, z, w]` quaternion.
    pub fn parse_quat(&mut self, what: &'static str) -> Result<DQuat> {
        self.parse_fixed::<4>(what).map(DQuat::from_array)
    }

    /// Parses a column-major 4x4 matrix.
    pub fn parse_mat4(&mut self, what: &'static str) -> Result<DMat4> {
        self.parse_fixed::<16>(what).map(|m| DMat4::from_cols_array(&m))
    }

    /// Parses an index into `T`'s table, creating a placeholder entity if the
    /// index is past the end.
    pub fn parse_ref<T: RootObject>(&mut self) -> Result<Handle<T>> {
        let index = self.parse_index()?;
        Ok(T::table_mut(self.doc).resolve_or_create(index))
    }

    pub fn parse_ref_array<T: RootObject>(&mut self) -> Result<Vec<Handle<T>>> {
        self.parse_array(|p| p.parse_ref::<T>())
    }

    /// Parses a top-level array of `T`, filling entity `i` in place.
    pub fn parse_root_array<T: RootObject>(&mut self) -> Result<()> {
        self.parse_array_with(|p, index| {
            T::table_mut(p.doc).resolve_or_create(index);
            let mut object = T::table_mut(p.doc).take(index);
            let result = p.parse_object(&mut object);
            T::table_mut(p.doc).restore(index, object);
            result
        })
    }

    // ========================================================================
    // Document
    // ========================================================================

    /// Parses a whole document into the root. Existing content is kept;
    /// entities mentioned in the input are replaced in place.
    pub fn parse_document(&mut self) -> Result<()> {
        self.parse_object_with(|p, key| p.parse_root_property(key))
    }

    pub(crate) fn parse_root_property(&mut self, key: &str) -> Result<()> {
        match key {
            "asset" => {
                let mut asset = mem::take(&mut self.doc.asset);
                let result = self.parse_object(&mut asset);
                self.doc.asset = asset;
                result
            }
            "accessors" => self.parse_root_array::<Accessor>(),
            "animations" => self.parse_root_array::<Animation>(),
            "buffers" => self.parse_root_array::<Buffer>(),
            "bufferViews" => self.parse_root_array::<BufferView>(),
            "cameras" => self.parse_root_array::<Camera>(),
            "images" => self.parse_root_array::<Image>(),
            "materials" => self.parse_root_array::<Material>(),
            "meshes" => self.parse_root_array::<Mesh>(),
            "nodes" => self.parse_root_array::<Node>(),
            "samplers" => self.parse_root_array::<Sampler>(),
            "scenes" => self.parse_root_array::<Scene>(),
            "skins" => self.parse_root_array::<Skin>(),
            "textures" => self.parse_root_array::<Texture>(),
            "scene" => {
                let scene = self.parse_ref::<Scene>()?;
                self.doc.scene = Some(scene);
                Ok(())
            }
            "extensionsUsed" => {
                self.doc.extensions_used = self.parse_string_array()?;
                Ok(())
            }
            "extensionsRequired" => {
                self.doc.extensions_required = self.parse_string_array()?;
                Ok(())
            }
            _ => {
                let mut base = mem::take(&mut self.doc.base);
                let result = base.parse_property(self, key);
                self.doc.base = base;
                result
            }
        }
    }
}

fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n')
}

fn show(c: u8) -> String {
    if c.is_ascii_graphic() || c == b' ' {
        format!("'{}'", c as char)
    } else {
        format!("byte 0x{:02x}", c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_parser<T>(text: &str, f: impl FnOnce(&mut Parser<'_>) -> Result<T>) -> Result<T> {
        let mut doc = GltfRoot::new();
        let mut input = text.as_bytes();
        let mut parser = Parser::new(&mut input, &mut doc, "test.gltf");
        f(&mut parser)
    }

    #[test]
    fn test_parse_numbers() {
        let cases = [
            ("0", 0.0),
            ("-1", -1.0),
            ("3.25", 3.25),
            ("1e3", 1000.0),
            ("2.5E-2", 0.025),
            ("0.1", 0.1),
            ("0.7071067811865476", 0.7071067811865476),
            ("-12.5e+1", -125.0),
            ("1e-30", 1e-30),
            ("1e300", 1e300),
            ("9007199254740993", 9007199254740992.0),
            ("4.9406564584124654e-324", 5e-324),
        ];
        for (text, expected) in cases {
            let n = with_parser(text, |p| p.parse_number()).unwrap();
            assert_eq!(n, expected, "parsing {}", text);
        }
    }

    #[test]
    fn test_parse_number_rejects_malformed() {
        assert!(with_parser("-", |p| p.parse_number()).is_err());
        assert!(with_parser(".5 ", |p| p.parse_number()).is_err());
        assert!(with_parser("1. ", |p| p.parse_number()).is_err());
        assert!(with_parser("1e ", |p| p.parse_number()).is_err());
    }

    #[test]
    fn test_parse_index_grammar() {
        assert_eq!(with_parser(" 42,", |p| p.parse_index()).unwrap(), 42);
        assert!(with_parser("-1", |p| p.parse_index()).is_err());
        assert!(with_parser("x", |p| p.parse_index()).is_err());
        assert!(with_parser("99999999999999999999999", |p| p.parse_index()).is_err());
    }

    #[test]
    fn test_parse_string_escapes() {
        let s = with_parser(r#""a\"b\\c\/d\n\t""#, |p| p.parse_string()).unwrap();
        assert_eq!(s, "a\"b\\c/d\n\t");

        let s = with_parser(r#""é中""#, |p| p.parse_string()).unwrap();
        assert_eq!(s, "é中");

        let s = with_parser(r#""\ud83d\ude00""#, |p| p.parse_string()).unwrap();
        assert_eq!(s, "😀");

        let s = with_parser(r#""\ud83dx""#, |p| p.parse_string()).unwrap();
        assert_eq!(s, "\u{fffd}x");

        assert!(with_parser(r#""\q""#, |p| p.parse_string()).is_err());
        assert!(with_parser(r#""open"#, |p| p.parse_string()).is_err());
    }

    #[test]
    fn test_parse_value_generic() {
        let v = with_parser(r#"{"a": [1, true, null, "x"], "b": {}}"#, |p| p.parse_value())
            .unwrap();
        let obj = v.as_object().unwrap();
        let a = obj["a"].as_array().unwrap();
        assert_eq!(a.len(), 4);
        assert_eq!(a[0], Value::Number(1.0));
        assert_eq!(a[1], Value::Bool(true));
        assert!(a[2].is_null());
        assert_eq!(a[3].as_str_or(""), "x");
        assert!(obj["b"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_skip_value_leaves_stream_positioned() {
        let rest = with_parser(r#"{"x": [1, {"y": "\"}"}], "z": false} 7"#, |p| {
            p.skip_value()?;
            p.parse_index()
        })
        .unwrap();
        assert_eq!(rest, 7);
    }

    #[test]
    fn test_empty_containers() {
        let v = with_parser("[]", |p| p.parse_value()).unwrap();
        assert_eq!(v, Value::Array(Vec::new()));
        let v = with_parser("{ }", |p| p.parse_value()).unwrap();
        assert_eq!(v, Value::Object(Dictionary::new()));
    }

    #[test]
    fn test_line_tracking_in_errors() {
        let err = with_parser("{\n\"a\": 1\n\"b\": 2}", |p| p.skip_value()).unwrap_err();
        match err {
            GltfError::Syntax { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("Expected ',' or '}'"), "{}", message);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parse_fixed_size_arrays() {
        let v = with_parser("[1, 2, 3]", |p| p.parse_vec3("translation")).unwrap();
        assert_eq!(v, DVec3::new(1.0, 2.0, 3.0));
        assert!(matches!(
            with_parser("[1, 2]", |p| p.parse_vec3("translation")),
            Err(GltfError::Schema { .. })
        ));
    }

    #[test]
    fn test_bytes_read_counts_stream_bytes() {
        let mut doc = GltfRoot::new();
        let mut input: &[u8] = b"{}   ";
        let mut parser = Parser::new(&mut input, &mut doc, "");
        parser.skip_value().unwrap();
        assert_eq!(parser.bytes_read(), 2);
    }
}
