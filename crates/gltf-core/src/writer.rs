//! JSON writer mirroring the parser's grammar.
//!
//! Output layout is controlled by [`WriteOptions`]: a negative indent writes
//! everything on one line, zero puts each property on its own line without
//! indentation, and a positive value indents nested containers by that many
//! spaces. Commas and key quotes can be turned off for a more readable debug
//! rendering that is no longer JSON.

use std::io::{self, Write};

use glam::{DMat4, DQuat, DVec3, DVec4};
use log::warn;

use crate::object::GltfObject;
use crate::table::{Handle, RootArray};
use crate::value::{Dictionary, Value};

/// Formatting options for [`Writer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Negative: single line. Zero: newlines only. Positive: spaces per level.
    pub indent: i32,
    pub use_comma: bool,
    pub quote_keys: bool,
}

impl WriteOptions {
    pub fn json(indent: i32) -> Self {
        WriteOptions {
            indent,
            use_comma: true,
            quote_keys: true,
        }
    }

    pub fn compact() -> Self {
        Self::json(-1)
    }

    /// Two-space indent, no commas, unquoted keys.
    pub fn debug() -> Self {
        WriteOptions {
            indent: 2,
            use_comma: false,
            quote_keys: false,
        }
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::json(2)
    }
}

/// Something that can be written as a JSON value.
pub trait WriteJson {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()>;

    /// Whether a property holding this value is left out entirely.
    fn is_omitted(&self) -> bool {
        false
    }

    /// Scalars are written inline inside arrays; everything else gets its
    /// own line.
    fn is_scalar(&self) -> bool {
        true
    }
}

/// Streams JSON to an output, tracking nesting and separators.
pub struct Writer<'a> {
    out: &'a mut dyn Write,
    options: WriteOptions,
    level: usize,
    need_comma: bool,
}

impl<'a> Writer<'a> {
    pub fn new(out: &'a mut dyn Write, options: WriteOptions) -> Self {
        Writer {
            out,
            options,
            level: 0,
            need_comma: false,
        }
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Writes a complete top-level object, followed by a newline unless the
    /// output is compact.
    pub fn write_document<T: GltfObject>(&mut self, object: &T) -> io::Result<()> {
        self.write_object(object)?;
        if self.options.indent >= 0 {
            self.out.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn write_object<T: GltfObject>(&mut self, object: &T) -> io::Result<()> {
        self.begin_object()?;
        object.write_properties(self)?;
        self.end_object()
    }

    fn newline(&mut self) -> io::Result<()> {
        if self.options.indent < 0 {
            return Ok(());
        }
        self.out.write_all(b"\n")?;
        let width = self.options.indent as usize * self.level;
        write!(self.out, "{:width$}", "", width = width)
    }

    /// Emits the separator before a property or block element.
    fn separator(&mut self) -> io::Result<()> {
        if self.need_comma {
            if self.options.use_comma {
                self.out.write_all(b",")?;
            } else if self.options.indent < 0 {
                self.out.write_all(b" ")?;
            }
        }
        self.need_comma = true;
        self.newline()
    }

    pub fn begin_object(&mut self) -> io::Result<()> {
        self.out.write_all(b"{")?;
        self.level += 1;
        self.need_comma = false;
        Ok(())
    }

    pub fn end_object(&mut self) -> io::Result<()> {
        self.close(b"}")
    }

    fn begin_block_array(&mut self) -> io::Result<()> {
        self.out.write_all(b"[")?;
        self.level += 1;
        self.need_comma = false;
        Ok(())
    }

    fn close(&mut self, bracket: &[u8]) -> io::Result<()> {
        let had_content = self.need_comma;
        self.level -= 1;
        if had_content {
            self.newline()?;
        }
        self.out.write_all(bracket)?;
        self.need_comma = true;
        Ok(())
    }

    /// Writes a key and its separator; the caller writes the value next.
    pub fn write_key(&mut self, key: &str) -> io::Result<()> {
        self.separator()?;
        if self.options.quote_keys {
            self.write_string(key)?;
        } else {
            self.out.write_all(key.as_bytes())?;
        }
        if self.options.indent < 0 && self.options.quote_keys {
            self.out.write_all(b":")
        } else {
            self.out.write_all(b": ")
        }
    }

    /// Writes `key: value` unless the value is omitted.
    pub fn write_property<V: WriteJson + ?Sized>(&mut self, key: &str, value: &V) -> io::Result<()> {
        if value.is_omitted() {
            return Ok(());
        }
        self.write_key(key)?;
        value.write_json(self)
    }

    /// Writes `key: value` even if the value would normally be omitted.
    pub fn write_property_always<V: WriteJson + ?Sized>(
        &mut self,
        key: &str,
        value: &V,
    ) -> io::Result<()> {
        self.write_key(key)?;
        value.write_json(self)
    }

    pub fn write_null(&mut self) -> io::Result<()> {
        self.out.write_all(b"null")
    }

    pub fn write_bool(&mut self, value: bool) -> io::Result<()> {
        self.out
            .write_all(if value { b"true" as &[u8] } else { b"false" })
    }

    /// Shortest representation that reads back to the same value; integral
    /// values are written without a fraction. Magnitudes outside
    /// `1e-5..1e16` use exponent form.
    pub fn write_number(&mut self, value: f64) -> io::Result<()> {
        if value.is_finite() {
            let magnitude = value.abs();
            if magnitude != 0.0 && !(1e-5..1e16).contains(&magnitude) {
                write!(self.out, "{:e}", value)
            } else {
                write!(self.out, "{}", value)
            }
        } else {
            warn!("Writing non-finite number {} as null", value);
            self.write_null()
        }
    }

    pub fn write_string(&mut self, value: &str) -> io::Result<()> {
        self.out.write_all(b"\"")?;
        let mut start = 0;
        for (i, c) in value.char_indices() {
            let escaped = match c {
                '"' => Some("\\\""),
                '\\' => Some("\\\\"),
                '\u{8}' => Some("\\b"),
                '\u{c}' => Some("\\f"),
                '\n' => Some("\\n"),
                '\r' => Some("\\r"),
                '\t' => Some("\\t"),
                c if (c as u32) < 0x20 => None,
                _ => continue,
            };
            self.out.write_all(value[start..i].as_bytes())?;
            match escaped {
                Some(text) => self.out.write_all(text.as_bytes())?,
                None => write!(self.out, "\\u{:04x}", c as u32)?,
            }
            start = i + c.len_utf8();
        }
        self.out.write_all(value[start..].as_bytes())?;
        self.out.write_all(b"\"")
    }

    fn inline_separator(&mut self) -> io::Result<()> {
        if self.options.use_comma {
            self.out.write_all(b",")?;
        }
        if self.options.indent >= 0 || !self.options.use_comma {
            self.out.write_all(b" ")?;
        }
        Ok(())
    }

    /// Writes numbers on one line: `[1, 2, 3]`.
    pub fn write_number_array(&mut self, values: &[f64]) -> io::Result<()> {
        self.out.write_all(b"[")?;
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.inline_separator()?;
            }
            self.write_number(*value)?;
        }
        self.out.write_all(b"]")
    }

    /// Writes an array; scalars go on one line, anything else one element
    /// per line.
    pub fn write_array<T: WriteJson>(&mut self, items: &[T]) -> io::Result<()> {
        if items.iter().all(WriteJson::is_scalar) {
            self.out.write_all(b"[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    self.inline_separator()?;
                }
                item.write_json(self)?;
            }
            return self.out.write_all(b"]");
        }
        self.begin_block_array()?;
        for item in items {
            self.separator()?;
            item.write_json(self)?;
            self.need_comma = true;
        }
        self.close(b"]")
    }

    /// Writes a 4x4 matrix in column-major order, one column per line when
    /// indenting.
    pub fn write_matrix(&mut self, m: &DMat4) -> io::Result<()> {
        let values = m.to_cols_array();
        if self.options.indent < 0 {
            return self.write_number_array(&values);
        }
        self.begin_block_array()?;
        for column in values.chunks(4) {
            self.separator()?;
            for (i, value) in column.iter().enumerate() {
                if i > 0 {
                    self.inline_separator()?;
                }
                self.write_number(*value)?;
            }
        }
        self.close(b"]")
    }
}

// ============================================================================
// WriteJson implementations
// ============================================================================

impl WriteJson for bool {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_bool(*self)
    }
}

impl WriteJson for f64 {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_number(*self)
    }
}

impl WriteJson for usize {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_number(*self as f64)
    }
}

impl WriteJson for str {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_string(self)
    }
}

impl WriteJson for String {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_string(self)
    }

    fn is_omitted(&self) -> bool {
        self.is_empty()
    }
}

impl WriteJson for DVec3 {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_number_array(&self.to_array())
    }
}

impl WriteJson for DVec4 {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_number_array(&self.to_array())
    }
}

impl WriteJson for DQuat {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_number_array(&self.to_array())
    }
}

impl WriteJson for DMat4 {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_matrix(self)
    }
}

impl<T> WriteJson for Handle<T> {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_number(self.index() as f64)
    }
}

impl<T: WriteJson> WriteJson for Option<T> {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        match self {
            Some(value) => value.write_json(w),
            None => w.write_null(),
        }
    }

    fn is_omitted(&self) -> bool {
        self.is_none()
    }

    fn is_scalar(&self) -> bool {
        self.as_ref().map_or(true, WriteJson::is_scalar)
    }
}

impl<T: WriteJson> WriteJson for Vec<T> {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_array(self)
    }

    fn is_omitted(&self) -> bool {
        self.is_empty()
    }

    fn is_scalar(&self) -> bool {
        false
    }
}

impl<T: WriteJson> WriteJson for Dictionary<T> {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.begin_object()?;
        for (key, value) in self {
            w.write_property_always(key, value)?;
        }
        w.end_object()
    }

    fn is_omitted(&self) -> bool {
        self.is_empty()
    }

    fn is_scalar(&self) -> bool {
        false
    }
}

impl WriteJson for Value {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        match self {
            Value::Undefined | Value::Null => w.write_null(),
            Value::Bool(b) => w.write_bool(*b),
            Value::Number(n) => w.write_number(*n),
            Value::String(s) => w.write_string(s),
            Value::Array(items) => w.write_array(items),
            Value::Object(dict) => dict.write_json(w),
        }
    }

    fn is_omitted(&self) -> bool {
        self.is_undefined()
    }

    fn is_scalar(&self) -> bool {
        !matches!(self, Value::Array(_) | Value::Object(_))
    }
}

impl<T: GltfObject> WriteJson for T {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_object(self)
    }

    fn is_scalar(&self) -> bool {
        false
    }
}

impl<T: GltfObject> WriteJson for RootArray<T> {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.begin_block_array()?;
        for object in self.iter() {
            w.separator()?;
            w.write_object(object)?;
        }
        w.close(b"]")
    }

    fn is_omitted(&self) -> bool {
        self.is_empty()
    }

    fn is_scalar(&self) -> bool {
        false
    }
}
