//! URI references (RFC 3986, section 4.2) as they appear in `uri` properties,
//! and the search path used to resolve relative file names.
//!
//! A reference is kept in its original encoded form so that it is written
//! back unchanged; the scheme, query and fragment are located once at parse
//! time.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::{alphabet, Engine as _};
use log::error;

use crate::error::{GltfError, Result};
use crate::writer::{WriteJson, Writer};

/// Accepts unpadded input and ignores trailing bits of a truncated payload.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

// ============================================================================
// SearchPath
// ============================================================================

/// An ordered list of directories in which relative file names are looked up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    directories: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_directory(&mut self, directory: impl Into<PathBuf>) {
        self.directories.push(directory.into());
    }

    pub fn prepend_directory(&mut self, directory: impl Into<PathBuf>) {
        self.directories.insert(0, directory.into());
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    /// Returns the first existing file called `name`. Absolute names resolve
    /// to themselves when they exist.
    pub fn find_file(&self, name: &Path) -> Option<PathBuf> {
        if name.is_absolute() {
            return name.is_file().then(|| name.to_path_buf());
        }
        self.directories
            .iter()
            .map(|directory| directory.join(name))
            .find(|candidate| candidate.is_file())
    }
}

impl fmt::Display for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, directory) in self.directories.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{}", directory.display())?;
        }
        Ok(())
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for SearchPath {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        SearchPath {
            directories: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// UriReference
// ============================================================================

/// A possibly relative URI such as `mesh.bin`, `file:///tmp/a%20b.png` or
/// `data:application/octet-stream;base64,AAAA`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriReference {
    uri: String,
    /// Start of the hierarchical part; 0 if there is no scheme.
    hier_start: usize,
    /// Position of `?`, or of the fragment if there is no query.
    query_start: usize,
    /// Position of `#`, or the length if there is no fragment.
    fragment_start: usize,
    fullpath: Option<PathBuf>,
}

impl UriReference {
    pub fn new(uri: &str) -> Self {
        let bytes = uri.as_bytes();
        let mut i = 0;
        while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        let hier_start = if i > 0 && i < bytes.len() && bytes[i] == b':' {
            i + 1
        } else {
            0
        };

        let mut i = hier_start;
        while i < bytes.len() && bytes[i] != b'?' && bytes[i] != b'#' {
            i += 1;
        }
        let query_start = i;
        if i < bytes.len() && bytes[i] == b'?' {
            while i < bytes.len() && bytes[i] != b'#' {
                i += 1;
            }
        }

        UriReference {
            uri: uri.to_string(),
            hier_start,
            query_start,
            fragment_start: i,
            fullpath: None,
        }
    }

    /// A `file://` URI naming `path`. Backslashes become forward slashes.
    pub fn from_path(path: &Path) -> Self {
        let source = path.to_string_lossy().replace('\\', "/");
        let encoded = format!("file://{}", encode(&source));
        let mut uri = Self::new(&encoded);
        uri.fullpath = Some(path.to_path_buf());
        uri
    }

    /// A base64 `data:` URI holding `data`.
    pub fn data_uri(mime_type: &str, data: &[u8]) -> Self {
        Self::new(&format!("data:{};base64,{}", mime_type, STANDARD.encode(data)))
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }

    pub fn is_empty(&self) -> bool {
        self.uri.is_empty()
    }

    pub fn has_scheme(&self) -> bool {
        self.hier_start > 0
    }

    /// The scheme without its trailing colon, e.g. `"data"`.
    pub fn scheme(&self) -> &str {
        if self.has_scheme() {
            &self.uri[..self.hier_start - 1]
        } else {
            ""
        }
    }

    pub fn is_data(&self) -> bool {
        self.scheme().eq_ignore_ascii_case("data")
    }

    /// Whether the reference names a file: no scheme, or `file:`.
    pub fn has_filename(&self) -> bool {
        !self.has_scheme() || self.scheme().eq_ignore_ascii_case("file")
    }

    /// The decoded file name, without any `//` authority prefix.
    pub fn filename(&self) -> Option<PathBuf> {
        if !self.has_filename() {
            return None;
        }
        let mut start = self.hier_start;
        if self.uri[start..self.query_start].starts_with("//") {
            start += 2;
        }
        let decoded = self.decode_part(start, self.query_start);
        Some(PathBuf::from(String::from_utf8_lossy(&decoded).into_owned()))
    }

    /// The location found by [`UriReference::resolve`].
    pub fn fullpath(&self) -> Option<&Path> {
        self.fullpath.as_deref()
    }

    pub fn has_query(&self) -> bool {
        self.query_start < self.fragment_start
    }

    pub fn query(&self) -> Option<String> {
        self.has_query().then(|| {
            let decoded = self.decode_part(self.query_start + 1, self.fragment_start);
            String::from_utf8_lossy(&decoded).into_owned()
        })
    }

    pub fn set_query(&mut self, query: &str) {
        let encoded = encode(query);
        self.uri = format!(
            "{}?{}{}",
            &self.uri[..self.query_start],
            encoded,
            &self.uri[self.fragment_start..]
        );
        self.fragment_start = self.query_start + encoded.len() + 1;
    }

    pub fn clear_query(&mut self) {
        self.uri.replace_range(self.query_start..self.fragment_start, "");
        self.fragment_start = self.query_start;
    }

    pub fn has_fragment(&self) -> bool {
        self.fragment_start < self.uri.len()
    }

    pub fn fragment(&self) -> Option<String> {
        self.has_fragment().then(|| {
            let decoded = self.decode_part(self.fragment_start + 1, self.uri.len());
            String::from_utf8_lossy(&decoded).into_owned()
        })
    }

    pub fn set_fragment(&mut self, fragment: &str) {
        self.uri.truncate(self.fragment_start);
        self.uri.push('#');
        self.uri.push_str(&encode(fragment));
    }

    pub fn clear_fragment(&mut self) {
        self.uri.truncate(self.fragment_start);
    }

    /// Locates the referenced file on `search_path` and records its full
    /// path. Data URIs need no resolution; other schemes cannot be resolved.
    pub fn resolve(&mut self, search_path: &SearchPath) -> Result<()> {
        let Some(filename) = self.filename() else {
            if self.is_data() {
                return Ok(());
            }
            error!("Don't know how to resolve URI {}", self);
            return Err(GltfError::InvalidUri {
                uri: self.to_string(),
                message: format!("unsupported scheme {:?}", self.scheme()),
            });
        };
        match search_path.find_file(&filename) {
            Some(path) => {
                self.fullpath = Some(path);
                Ok(())
            }
            None => {
                error!(
                    "Could not locate {} in {}",
                    filename.display(),
                    search_path
                );
                Err(GltfError::NotFound(filename.display().to_string()))
            }
        }
    }

    /// Returns the referenced bytes: the file contents (from the resolved
    /// full path when available) or the decoded data URI payload.
    pub fn read(&self) -> Result<Vec<u8>> {
        if let Some(filename) = self.filename() {
            let path = self.fullpath.clone().unwrap_or(filename);
            return fs::read(&path).map_err(|e| {
                error!("Failed to read {}: {}", path.display(), e);
                GltfError::from(e)
            });
        }
        if self.is_data() {
            return self.read_data();
        }
        error!("Don't know how to read URI {}", self);
        Err(GltfError::InvalidUri {
            uri: self.to_string(),
            message: format!("unsupported scheme {:?}", self.scheme()),
        })
    }

    /// Opens the referenced bytes as a stream.
    pub fn open_read(&self) -> Result<io::Cursor<Vec<u8>>> {
        self.read().map(io::Cursor::new)
    }

    /// The media type of a data URI, e.g. `image/png`.
    pub fn media_type(&self) -> Option<&str> {
        if !self.is_data() {
            return None;
        }
        let header = &self.uri[self.hier_start..self.query_start];
        let end = header.find(|c| c == ';' || c == ',').unwrap_or(header.len());
        Some(&header[..end]).filter(|mime| !mime.is_empty())
    }

    fn read_data(&self) -> Result<Vec<u8>> {
        let header_end = self.uri[self.hier_start..self.query_start]
            .find(',')
            .map(|i| self.hier_start + i)
            .ok_or_else(|| {
                error!("Expected ',' in data URI {}", self);
                GltfError::InvalidUri {
                    uri: self.to_string(),
                    message: "expected ',' in data URI".to_string(),
                }
            })?;
        let header = &self.uri[self.hier_start..header_end];
        let is_base64 = header
            .split(';')
            .skip(1)
            .any(|param| param.eq_ignore_ascii_case("base64"));

        let decoded = self.decode_part(header_end + 1, self.query_start);
        if !is_base64 {
            return Ok(decoded);
        }

        // Decoding stops at the first byte outside the base64 alphabet, which
        // also drops any padding.
        let mut valid = decoded
            .iter()
            .take_while(|&&b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
            .count();
        if valid % 4 == 1 {
            valid -= 1;
        }
        LENIENT
            .decode(&decoded[..valid])
            .map_err(|e| GltfError::InvalidUri {
                uri: self.to_string(),
                message: e.to_string(),
            })
    }

    fn decode_part(&self, begin: usize, end: usize) -> Vec<u8> {
        percent_decode(&self.uri.as_bytes()[begin..end])
    }
}

impl From<&str> for UriReference {
    fn from(uri: &str) -> Self {
        UriReference::new(uri)
    }
}

impl fmt::Display for UriReference {
    /// Long URIs (typically data URIs) are shortened to 60 characters and an
    /// ellipsis.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.uri.chars().count() > 63 {
            let head: String = self.uri.chars().take(60).collect();
            write!(f, "{}...", head)
        } else {
            f.write_str(&self.uri)
        }
    }
}

impl WriteJson for UriReference {
    fn write_json(&self, w: &mut Writer<'_>) -> io::Result<()> {
        w.write_string(&self.uri)
    }

    fn is_omitted(&self) -> bool {
        self.uri.is_empty()
    }
}

// ============================================================================
// Percent encoding
// ============================================================================

/// Escapes every byte except ASCII letters, digits and `_ , . - /` as `%xx`.
pub fn encode(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        match b {
            b'_' | b',' | b'.' | b'-' | b'/' => result.push(b as char),
            b if b.is_ascii_alphanumeric() => result.push(b as char),
            b => result.push_str(&format!("%{:02x}", b)),
        }
    }
    result
}

/// Decodes `%xx` escapes; malformed escapes are kept literally.
pub fn percent_decode(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if input[i] == b'%' && i + 2 < input.len() {
            if let (Some(h), Some(l)) = (hex_digit(input[i + 1]), hex_digit(input[i + 2])) {
                output.push((h << 4) | l);
                i += 3;
                continue;
            }
        }
        output.push(input[i]);
        i += 1;
    }
    output
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts() {
        let uri = UriReference::new("http://host/a/b?x=1#frag");
        assert_eq!(uri.scheme(), "http");
        assert!(!uri.has_filename());
        assert_eq!(uri.query().as_deref(), Some("x=1"));
        assert_eq!(uri.fragment().as_deref(), Some("frag"));

        let uri = UriReference::new("textures/wood%20grain.png");
        assert!(!uri.has_scheme());
        assert!(uri.has_filename());
        assert_eq!(uri.filename(), Some(PathBuf::from("textures/wood grain.png")));
        assert!(!uri.has_query());
        assert!(!uri.has_fragment());
    }

    #[test]
    fn test_file_uri() {
        let uri = UriReference::new("file:///tmp/a%2Cb.bin");
        assert!(uri.has_filename());
        assert_eq!(uri.filename(), Some(PathBuf::from("/tmp/a,b.bin")));

        let uri = UriReference::from_path(Path::new("/data/my model.bin"));
        assert_eq!(uri.as_str(), "file:///data/my%20model.bin");
        assert_eq!(uri.filename(), Some(PathBuf::from("/data/my model.bin")));
    }

    #[test]
    fn test_data_uri_base64() {
        let uri = UriReference::new("data:application/octet-stream;base64,SGVsbG8=");
        assert!(uri.is_data());
        assert_eq!(uri.media_type(), Some("application/octet-stream"));
        assert_eq!(uri.read().unwrap(), b"Hello");

        // Decoding stops at the first character outside the alphabet.
        let uri = UriReference::new("data:;base64,YWJj*ZGVm");
        assert_eq!(uri.read().unwrap(), b"abc");

        let uri = UriReference::data_uri("image/png", &[0, 1, 2, 250]);
        assert_eq!(uri.media_type(), Some("image/png"));
        assert_eq!(uri.read().unwrap(), vec![0, 1, 2, 250]);
    }

    #[test]
    fn test_data_uri_percent_encoded() {
        let uri = UriReference::new("data:text/plain,a%20b");
        assert_eq!(uri.read().unwrap(), b"a b");
        assert!(UriReference::new("data:text/plain").read().is_err());
    }

    #[test]
    fn test_query_and_fragment_editing() {
        let mut uri = UriReference::new("a.png#f");
        uri.set_query("v 2");
        assert_eq!(uri.as_str(), "a.png?v%202#f");
        assert_eq!(uri.query().as_deref(), Some("v 2"));
        assert_eq!(uri.fragment().as_deref(), Some("f"));

        uri.set_fragment("g");
        assert_eq!(uri.as_str(), "a.png?v%202#g");
        uri.clear_query();
        assert_eq!(uri.as_str(), "a.png#g");
        uri.clear_fragment();
        assert_eq!(uri.as_str(), "a.png");
    }

    #[test]
    fn test_display_truncates() {
        let long = format!("data:;base64,{}", "A".repeat(100));
        let shown = UriReference::new(&long).to_string();
        assert_eq!(shown.len(), 63);
        assert!(shown.ends_with("..."));
        assert_eq!(UriReference::new("short.bin").to_string(), "short.bin");
    }

    #[test]
    fn test_unsupported_scheme() {
        let mut uri = UriReference::new("https://example.com/a.bin");
        assert!(uri.resolve(&SearchPath::new()).is_err());
        assert!(uri.read().is_err());
        let mut data = UriReference::new("data:,x");
        assert!(data.resolve(&SearchPath::new()).is_ok());
    }
}
