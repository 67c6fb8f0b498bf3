//! Binary glTF (GLB) container framing.
//!
//! A GLB file is a 12-byte header (`magic`, `version`, total `length`)
//! followed by chunks, each with a 4-byte length and a 4-byte type. Version 2
//! files carry a `JSON` chunk and an optional `BIN` chunk whose bytes
//! populate the first buffer. Version 1 files have a single content chunk of
//! type 0 followed by raw binary data that runs to the end of the file.

use std::io::{BufRead, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::error;

use crate::error::{GltfError, Result};
use crate::parser::Parser;
use crate::root::GltfRoot;
use crate::writer::{WriteOptions, Writer};

pub const GLB_MAGIC: u32 = 0x4654_6C67;
pub const CHUNK_JSON: u32 = 0x4E4F_534A;
pub const CHUNK_BIN: u32 = 0x004E_4942;

/// Size of the file header plus the first chunk header.
const HEADER_SIZE: u64 = 20;

fn invalid(message: impl Into<String>) -> GltfError {
    let message = message.into();
    error!("{}", message);
    GltfError::InvalidGlb(message)
}

/// Reads a GLB stream into `root`. The caller has already peeked the leading
/// `g`; the magic number is checked here.
pub(crate) fn read_glb(root: &mut GltfRoot, input: &mut dyn BufRead, filename: &str) -> Result<()> {
    if input.read_u32::<LittleEndian>()? != GLB_MAGIC {
        return Err(GltfError::NotGltf);
    }

    let version = input.read_u32::<LittleEndian>()?;
    if version != 1 && version != 2 {
        return Err(invalid(format!(
            "GLB versions 1 and 2 are supported, file is version {}",
            version
        )));
    }

    let length = u64::from(input.read_u32::<LittleEndian>()?);
    let json_length = u64::from(input.read_u32::<LittleEndian>()?);
    let chunk_type = input.read_u32::<LittleEndian>()?;
    if (version == 1 && chunk_type != 0) || (version == 2 && chunk_type != CHUNK_JSON) {
        return Err(invalid("Expected 'JSON' chunk in GLB file"));
    }

    // The parser stops at the closing brace of the document; whatever is left
    // of the chunk must be padding.
    {
        let mut stream = &mut *input;
        let mut parser = Parser::new(&mut stream, root, filename);
        parser.parse_document()?;

        if parser.bytes_read() > json_length {
            return Err(invalid("Length of JSON chunk too small to fit entire object"));
        }
        if let Some(c) = parser.skip_trailing_space(json_length)? {
            return Err(invalid(format!(
                "Unexpected {:?} at end of JSON chunk",
                c as char
            )));
        }
        if parser.bytes_read() != json_length || json_length + HEADER_SIZE > length {
            return Err(invalid("JSON chunk length mismatch"));
        }
    }

    if json_length + HEADER_SIZE == length {
        return Ok(());
    }
    let Some(buffer) = root.buffers.at(0) else {
        return Ok(());
    };
    if buffer.uri.is_some() {
        return Ok(());
    }
    let byte_length = buffer.byte_length as u64;

    let bin_length = if version == 1 {
        length - json_length - HEADER_SIZE
    } else {
        let bin_length = u64::from(input.read_u32::<LittleEndian>()?);
        if input.read_u32::<LittleEndian>()? != CHUNK_BIN {
            return Err(invalid("Expected BIN chunk"));
        }
        bin_length
    };

    if bin_length < byte_length {
        return Err(invalid(format!(
            "Binary chunk length ({}) not large enough for buffer 0 ({})",
            bin_length, byte_length
        )));
    }

    match root.buffers.at_mut(0) {
        Some(buffer) => buffer.read_from(input),
        None => Ok(()),
    }
}

/// Writes `root` as GLB version 2. The first buffer, if it has no URI, is
/// packed into the `BIN` chunk.
pub(crate) fn write_glb(root: &GltfRoot, out: &mut dyn Write) -> Result<()> {
    let mut json = Vec::new();
    Writer::new(&mut json, WriteOptions::compact()).write_document(root)?;
    while json.len() % 4 != 0 {
        json.push(b' ');
    }

    let bin = root
        .buffers
        .at(0)
        .filter(|buffer| buffer.uri.is_none())
        .map(|buffer| {
            if buffer.data.len() != buffer.byte_length {
                error!(
                    "Buffer 0 holds {} bytes but declares byteLength {}",
                    buffer.data.len(),
                    buffer.byte_length
                );
            }
            let mut data = buffer.data.clone();
            data.resize(buffer.byte_length, 0);
            while data.len() % 4 != 0 {
                data.push(0);
            }
            data
        });

    let mut length = 12 + 8 + json.len();
    if let Some(data) = &bin {
        length += 8 + data.len();
    }

    out.write_u32::<LittleEndian>(GLB_MAGIC)?;
    out.write_u32::<LittleEndian>(2)?;
    out.write_u32::<LittleEndian>(chunk_size(length)?)?;

    out.write_u32::<LittleEndian>(chunk_size(json.len())?)?;
    out.write_u32::<LittleEndian>(CHUNK_JSON)?;
    out.write_all(&json)?;

    if let Some(data) = &bin {
        out.write_u32::<LittleEndian>(chunk_size(data.len())?)?;
        out.write_u32::<LittleEndian>(CHUNK_BIN)?;
        out.write_all(data)?;
    }
    out.flush()?;
    Ok(())
}

fn chunk_size(size: usize) -> Result<u32> {
    u32::try_from(size).map_err(|_| invalid(format!("{} bytes do not fit in a GLB file", size)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(version: u32, length: u32, json: &[u8], chunk_type: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.write_u32::<LittleEndian>(GLB_MAGIC).unwrap();
        out.write_u32::<LittleEndian>(version).unwrap();
        out.write_u32::<LittleEndian>(length).unwrap();
        out.write_u32::<LittleEndian>(json.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(chunk_type).unwrap();
        out.extend_from_slice(json);
        out
    }

    #[test]
    fn test_magic_is_gltf() {
        assert_eq!(&GLB_MAGIC.to_le_bytes(), b"glTF");
        assert_eq!(&CHUNK_JSON.to_le_bytes(), b"JSON");
        assert_eq!(&CHUNK_BIN.to_le_bytes(), b"BIN\0");
    }

    #[test]
    fn test_json_only() {
        let json = br#"{"asset":{"version":"2.0"}}    "#;
        let data = header(2, 20 + json.len() as u32, json, CHUNK_JSON);
        let mut root = GltfRoot::new();
        read_glb(&mut root, &mut data.as_slice(), "").unwrap();
        assert_eq!(root.asset.version, "2.0");
    }

    #[test]
    fn test_rejects_garbage_padding() {
        let json = br#"{"asset":{"version":"2.0"}}   x"#;
        let data = header(2, 20 + json.len() as u32, json, CHUNK_JSON);
        let mut root = GltfRoot::new();
        assert!(matches!(
            read_glb(&mut root, &mut data.as_slice(), ""),
            Err(GltfError::InvalidGlb(_))
        ));
    }

    #[test]
    fn test_rejects_short_json_chunk() {
        let json = br#"{"asset":{"version":"2.0"}}"#;
        let mut data = header(2, 0, json, CHUNK_JSON);
        // Declare a JSON chunk shorter than the object.
        data[12..16].copy_from_slice(&10u32.to_le_bytes());
        data[8..12].copy_from_slice(&30u32.to_le_bytes());
        let mut root = GltfRoot::new();
        assert!(read_glb(&mut root, &mut data.as_slice(), "").is_err());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let data = header(3, 20, b"", CHUNK_JSON);
        let mut root = GltfRoot::new();
        assert!(matches!(
            read_glb(&mut root, &mut data.as_slice(), ""),
            Err(GltfError::InvalidGlb(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_chunk_type() {
        let json = br#"{"asset":{"version":"2.0"}}    "#;
        let data = header(2, 20 + json.len() as u32, json, CHUNK_BIN);
        let mut root = GltfRoot::new();
        assert!(read_glb(&mut root, &mut data.as_slice(), "").is_err());
    }

    #[test]
    fn test_version_1_binary_runs_to_end() {
        let json = br#"{"buffers":[{"byteLength":3}]}  "#;
        let length = 20 + json.len() as u32 + 4;
        let mut data = header(1, length, json, 0);
        data.extend_from_slice(&[7, 8, 9, 0]);
        let mut root = GltfRoot::new();
        read_glb(&mut root, &mut data.as_slice(), "").unwrap();
        assert_eq!(root.buffers.at(0).unwrap().data, vec![7, 8, 9]);
    }

    #[test]
    fn test_write_pads_chunks() {
        let mut root = GltfRoot::new();
        let handle = root.buffers.create("bin");
        if let Some(buffer) = root.buffers.get_mut(&handle) {
            buffer.byte_length = 5;
            buffer.data = vec![1, 2, 3, 4, 5];
        }
        let mut out = Vec::new();
        write_glb(&root, &mut out).unwrap();
        assert_eq!(out.len() % 4, 0);
        let length = u32::from_le_bytes([out[8], out[9], out[10], out[11]]) as usize;
        assert_eq!(length, out.len());
        let json_length = u32::from_le_bytes([out[12], out[13], out[14], out[15]]) as usize;
        assert_eq!(json_length % 4, 0);
        let bin_start = 20 + json_length;
        assert_eq!(&out[bin_start + 4..bin_start + 8], b"BIN\0");
        assert_eq!(&out[bin_start + 8..bin_start + 13], &[1, 2, 3, 4, 5]);
    }
}
