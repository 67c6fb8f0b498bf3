//! Renderable geometry: vertex formats, packed vertex data and primitives.
//!
//! Vertex data is one interleaved array. Each column has a name, a numeric
//! type, a component count and a byte offset within the row; rows are
//! `stride` bytes apart.

use byteorder::{ByteOrder, LittleEndian};
use glam::{Mat4, Vec3, Vec4};
use num_traits::ToPrimitive;

/// Numeric type of a vertex column or index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Uint32,
    Float32,
}

impl NumericType {
    pub fn byte_length(self) -> usize {
        match self {
            NumericType::Int8 | NumericType::Uint8 => 1,
            NumericType::Int16 | NumericType::Uint16 => 2,
            NumericType::Uint32 | NumericType::Float32 => 4,
        }
    }

    pub fn is_integral(self) -> bool {
        self != NumericType::Float32
    }

    /// Reads one little-endian component as `f32`. Normalized integers map
    /// to `[0, 1]` or `[-1, 1]`.
    pub fn read_f32(self, bytes: &[u8], normalized: bool) -> f32 {
        match self {
            NumericType::Int8 => scale(bytes[0] as i8, i8::MAX, normalized),
            NumericType::Uint8 => scale(bytes[0], u8::MAX, normalized),
            NumericType::Int16 => scale(LittleEndian::read_i16(bytes), i16::MAX, normalized),
            NumericType::Uint16 => scale(LittleEndian::read_u16(bytes), u16::MAX, normalized),
            NumericType::Uint32 => scale(LittleEndian::read_u32(bytes), u32::MAX, normalized),
            NumericType::Float32 => LittleEndian::read_f32(bytes),
        }
    }

    /// Reads one little-endian unsigned component. Signed and float types
    /// have no index interpretation and read as zero.
    pub fn read_index(self, bytes: &[u8]) -> u32 {
        match self {
            NumericType::Uint8 => u32::from(bytes[0]),
            NumericType::Uint16 => u32::from(LittleEndian::read_u16(bytes)),
            NumericType::Uint32 => LittleEndian::read_u32(bytes),
            _ => 0,
        }
    }

    /// The smallest unsigned index type able to address `num_vertices`.
    pub fn index_type_for(num_vertices: usize) -> NumericType {
        if num_vertices <= usize::from(u8::MAX) + 1 {
            NumericType::Uint8
        } else if num_vertices <= usize::from(u16::MAX) + 1 {
            NumericType::Uint16
        } else {
            NumericType::Uint32
        }
    }
}

fn scale<T: ToPrimitive>(value: T, max: T, normalized: bool) -> f32 {
    let v = value.to_f32().unwrap_or(0.0);
    if normalized {
        (v / max.to_f32().unwrap_or(1.0)).max(-1.0)
    } else {
        v
    }
}

/// What a column holds, which decides how it responds to transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Contents {
    Point,
    Vector,
    Normal,
    Color,
    TexCoord,
    Index,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub num_components: usize,
    pub numeric_type: NumericType,
    pub normalized: bool,
    pub contents: Contents,
    /// Byte offset of the column within a row.
    pub start: usize,
}

impl Column {
    pub fn byte_length(&self) -> usize {
        self.num_components * self.numeric_type.byte_length()
    }
}

/// An interleaved vertex layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexFormat {
    columns: Vec<Column>,
    stride: usize,
}

impl VertexFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column at the end of the row. Returns `false` if a column of
    /// that name already exists.
    pub fn add_column(
        &mut self,
        name: &str,
        num_components: usize,
        numeric_type: NumericType,
        normalized: bool,
        contents: Contents,
    ) -> bool {
        if self.column(name).is_some() {
            return false;
        }
        let column = Column {
            name: name.to_string(),
            num_components,
            numeric_type,
            normalized,
            contents,
            start: self.stride,
        };
        self.stride += column.byte_length();
        self.columns.push(column);
        true
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn stride(&self) -> usize {
        self.stride
    }
}

/// A zero-filled buffer of `count` elements of `size` bytes, or `None` when
/// the length overflows or cannot be allocated.
pub(crate) fn zeroed(count: usize, size: usize) -> Option<Vec<u8>> {
    let len = count.checked_mul(size)?;
    let mut data = Vec::new();
    data.try_reserve_exact(len).ok()?;
    data.resize(len, 0);
    Some(data)
}

/// Rows of vertex data laid out according to a [`VertexFormat`].
#[derive(Debug, Clone, PartialEq)]
pub struct VertexData {
    format: VertexFormat,
    num_rows: usize,
    data: Vec<u8>,
}

impl VertexData {
    /// Zero-filled data with `num_rows` rows.
    ///
    /// # Panics
    ///
    /// Panics if the data size overflows `usize`; see [`VertexData::try_new`].
    pub fn new(format: VertexFormat, num_rows: usize) -> Self {
        let data = vec![0u8; format.stride() * num_rows];
        VertexData {
            format,
            num_rows,
            data,
        }
    }

    /// Like [`VertexData::new`], but returns `None` when the data size
    /// overflows or the allocation fails.
    pub fn try_new(format: VertexFormat, num_rows: usize) -> Option<Self> {
        let data = zeroed(num_rows, format.stride())?;
        Some(VertexData {
            format,
            num_rows,
            data,
        })
    }

    pub fn format(&self) -> &VertexFormat {
        &self.format
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Reads up to four components of `column` at `row`; missing
    /// components are 0, except w which is 1.
    pub fn get_vec4(&self, column: &str, row: usize) -> Option<Vec4> {
        let column = self.format.column(column)?;
        if row >= self.num_rows {
            return None;
        }
        let mut out = [0.0, 0.0, 0.0, 1.0];
        let size = column.numeric_type.byte_length();
        let base = row * self.format.stride() + column.start;
        for (i, value) in out.iter_mut().enumerate().take(column.num_components.min(4)) {
            let at = base + i * size;
            *value = column
                .numeric_type
                .read_f32(&self.data[at..at + size], column.normalized);
        }
        Some(Vec4::from_array(out))
    }

    pub fn get_vec3(&self, column: &str, row: usize) -> Option<Vec3> {
        self.get_vec4(column, row).map(Vec4::truncate)
    }

    /// Writes the first three components of a float column.
    pub fn set_vec3(&mut self, column: &str, row: usize, value: Vec3) -> bool {
        let Some(column) = self.format.column(column) else {
            return false;
        };
        if column.numeric_type != NumericType::Float32 || row >= self.num_rows {
            return false;
        }
        let base = row * self.format.stride() + column.start;
        for (i, v) in value.to_array().iter().enumerate().take(column.num_components) {
            LittleEndian::write_f32(&mut self.data[base + i * 4..base + i * 4 + 4], *v);
        }
        true
    }

    /// Applies `mat` to every float point, vector and normal column.
    pub fn transform_vertices(&mut self, mat: &Mat4) {
        if *mat == Mat4::IDENTITY {
            return;
        }
        let columns: Vec<(String, Contents)> = self
            .format
            .columns()
            .iter()
            .filter(|c| c.numeric_type == NumericType::Float32 && c.num_components >= 3)
            .map(|c| (c.name.clone(), c.contents))
            .collect();

        for (name, contents) in columns {
            for row in 0..self.num_rows {
                let Some(v) = self.get_vec3(&name, row) else {
                    continue;
                };
                let transformed = match contents {
                    Contents::Point => mat.transform_point3(v),
                    Contents::Vector | Contents::Normal => mat.transform_vector3(v),
                    _ => continue,
                };
                self.set_vec3(&name, row, transformed);
            }
        }
    }
}

/// How the vertices of a primitive are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Points,
    Lines,
    LineStrips,
    Triangles,
    TriangleStrips,
    TriangleFans,
}

/// A packed index buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexBuffer {
    pub index_type: NumericType,
    pub data: Vec<u8>,
}

impl IndexBuffer {
    pub fn len(&self) -> usize {
        self.data.len() / self.index_type.byte_length()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, i: usize) -> u32 {
        let size = self.index_type.byte_length();
        self.index_type.read_index(&self.data[i * size..(i + 1) * size])
    }

    pub fn push(&mut self, index: u32) {
        match self.index_type {
            NumericType::Uint8 => self.data.push(index as u8),
            NumericType::Uint16 => self.data.extend_from_slice(&(index as u16).to_le_bytes()),
            _ => self.data.extend_from_slice(&index.to_le_bytes()),
        }
    }
}

/// A primitive referencing rows of the owning geom's vertex data, either
/// through an index buffer or as a consecutive run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeomPrimitive {
    primitive_type: PrimitiveType,
    indices: Option<IndexBuffer>,
    first_vertex: usize,
    num_vertices: usize,
}

impl GeomPrimitive {
    pub fn indexed(primitive_type: PrimitiveType, indices: IndexBuffer) -> Self {
        GeomPrimitive {
            primitive_type,
            num_vertices: indices.len(),
            indices: Some(indices),
            first_vertex: 0,
        }
    }

    pub fn consecutive(primitive_type: PrimitiveType, first_vertex: usize, num_vertices: usize) -> Self {
        GeomPrimitive {
            primitive_type,
            indices: None,
            first_vertex,
            num_vertices,
        }
    }

    pub fn primitive_type(&self) -> PrimitiveType {
        self.primitive_type
    }

    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    pub fn index_type(&self) -> Option<NumericType> {
        self.indices.as_ref().map(|i| i.index_type)
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// The vertex row referenced by the `i`th vertex of the primitive.
    pub fn vertex(&self, i: usize) -> u32 {
        match &self.indices {
            Some(indices) => indices.get(i),
            None => (self.first_vertex + i) as u32,
        }
    }

    pub fn vertices(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.num_vertices).map(move |i| self.vertex(i))
    }

    /// Closes a line strip by repeating its first vertex at the end,
    /// converting a consecutive run to an index buffer if necessary.
    pub fn close_loop(&mut self) {
        if self.num_vertices == 0 {
            return;
        }
        let first = self.vertex(0);
        let mut indices = match self.indices.take() {
            Some(indices) => indices,
            None => {
                let mut indices = IndexBuffer {
                    index_type: NumericType::index_type_for(self.first_vertex + self.num_vertices),
                    data: Vec::new(),
                };
                for i in 0..self.num_vertices {
                    indices.push((self.first_vertex + i) as u32);
                }
                indices
            }
        };
        indices.push(first);
        self.num_vertices = indices.len();
        self.first_vertex = 0;
        self.indices = Some(indices);
    }

    /// Number of points, lines or triangles drawn.
    pub fn num_primitives(&self) -> usize {
        let n = self.num_vertices;
        match self.primitive_type {
            PrimitiveType::Points => n,
            PrimitiveType::Lines => n / 2,
            PrimitiveType::LineStrips => n.saturating_sub(1),
            PrimitiveType::Triangles => n / 3,
            PrimitiveType::TriangleStrips | PrimitiveType::TriangleFans => n.saturating_sub(2),
        }
    }
}

/// Vertex data plus the primitive drawing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Geom {
    pub vertex_data: VertexData,
    pub primitive: GeomPrimitive,
}

impl Geom {
    pub fn new(vertex_data: VertexData, primitive: GeomPrimitive) -> Self {
        Geom {
            vertex_data,
            primitive,
        }
    }

    pub fn transform_vertices(&mut self, mat: &Mat4) {
        self.vertex_data.transform_vertices(mat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position_format() -> VertexFormat {
        let mut format = VertexFormat::new();
        format.add_column("vertex", 3, NumericType::Float32, false, Contents::Point);
        format.add_column("normal", 3, NumericType::Float32, false, Contents::Normal);
        format.add_column("color", 4, NumericType::Uint8, true, Contents::Color);
        format
    }

    #[test]
    fn test_try_new_rejects_oversized_data() {
        assert!(VertexData::try_new(position_format(), usize::MAX / 4).is_none());
        let vdata = VertexData::try_new(position_format(), 3).unwrap();
        assert_eq!(vdata.data().len(), 3 * position_format().stride());
        assert!(vdata.data().iter().all(|b| *b == 0));
        assert!(zeroed(usize::MAX, 2).is_none());
    }

    #[test]
    fn test_format_packs_columns() {
        let format = position_format();
        assert_eq!(format.stride(), 28);
        assert_eq!(format.column("normal").unwrap().start, 12);
        assert_eq!(format.column("color").unwrap().start, 24);

        let mut format = format;
        assert!(!format.add_column("vertex", 2, NumericType::Float32, false, Contents::Point));
    }

    #[test]
    fn test_normalized_read() {
        let mut vdata = VertexData::new(position_format(), 1);
        vdata.data_mut()[24..28].copy_from_slice(&[255, 0, 51, 255]);
        let color = vdata.get_vec4("color", 0).unwrap();
        assert!((color - Vec4::new(1.0, 0.0, 0.2, 1.0)).abs().max_element() < 1e-6);
        assert_eq!(NumericType::Int8.read_f32(&[0x80], true), -1.0);
    }

    #[test]
    fn test_transform_skips_colors() {
        let mut vdata = VertexData::new(position_format(), 2);
        vdata.set_vec3("vertex", 1, Vec3::new(1.0, 2.0, 3.0));
        vdata.set_vec3("normal", 1, Vec3::Y);
        vdata.data_mut()[28 + 24..28 + 28].copy_from_slice(&[1, 2, 3, 4]);

        vdata.transform_vertices(&Mat4::from_translation(Vec3::X));
        assert_eq!(vdata.get_vec3("vertex", 0), Some(Vec3::X));
        assert_eq!(vdata.get_vec3("vertex", 1), Some(Vec3::new(2.0, 2.0, 3.0)));
        assert_eq!(vdata.get_vec3("normal", 1), Some(Vec3::Y));
        assert_eq!(&vdata.data()[28 + 24..28 + 28], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_close_loop() {
        let mut prim = GeomPrimitive::consecutive(PrimitiveType::LineStrips, 0, 3);
        prim.close_loop();
        assert_eq!(prim.index_type(), Some(NumericType::Uint8));
        assert_eq!(prim.vertices().collect::<Vec<_>>(), vec![0, 1, 2, 0]);
        assert_eq!(prim.num_primitives(), 3);

        let mut indices = IndexBuffer {
            index_type: NumericType::Uint16,
            data: Vec::new(),
        };
        for i in [4, 7, 9] {
            indices.push(i);
        }
        let mut prim = GeomPrimitive::indexed(PrimitiveType::LineStrips, indices);
        prim.close_loop();
        assert_eq!(prim.vertices().collect::<Vec<_>>(), vec![4, 7, 9, 4]);
    }

    #[test]
    fn test_index_type_for() {
        assert_eq!(NumericType::index_type_for(256), NumericType::Uint8);
        assert_eq!(NumericType::index_type_for(257), NumericType::Uint16);
        assert_eq!(NumericType::index_type_for(70000), NumericType::Uint32);
    }
}
